//! Shared application state for all routes.

use crate::links::LinkGenerator;
use crate::mapping::CampProfile;
use crate::repository::CampRepository;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn CampRepository>,
    pub profile: CampProfile,
    pub links: LinkGenerator,
}

impl AppState {
    pub fn new(repo: Arc<dyn CampRepository>) -> Self {
        AppState {
            repo,
            profile: CampProfile::new(),
            links: LinkGenerator::default(),
        }
    }
}
