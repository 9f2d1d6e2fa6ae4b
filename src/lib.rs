//! Camp API: REST endpoints for code camps and their talks over PostgreSQL.

pub mod config;
pub mod error;
pub mod handlers;
pub mod links;
pub mod mapping;
pub mod migration;
pub mod model;
pub mod openapi;
pub mod repository;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::{Settings, StoreKind};
pub use error::{AppError, ConfigError};
pub use links::LinkGenerator;
pub use mapping::CampProfile;
pub use migration::{apply_migrations, seed};
pub use repository::{CampRepository, ChangeSet, InMemoryCampRepository, PgCampRepository};
pub use routes::{app, camp_routes, common_routes};
pub use state::AppState;
pub use store::ensure_database_exists;
