//! Camp repository: queries over camp aggregates plus a staged change set committed in one call.

mod memory;
mod postgres;

pub use memory::InMemoryCampRepository;
pub use postgres::PgCampRepository;

use crate::error::AppError;
use crate::model::Camp;
use async_trait::async_trait;
use chrono::NaiveDate;

/// One staged mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum Change {
    Add(Camp),
    Update(Camp),
    Delete(Camp),
}

impl Change {
    pub fn camp(&self) -> &Camp {
        match self {
            Change::Add(c) | Change::Update(c) | Change::Delete(c) => c,
        }
    }
}

/// Mutations staged by a handler and committed with [`CampRepository::save_changes`].
/// After a successful commit, added camps carry their store-assigned ids.
#[derive(Clone, Debug, Default)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new() -> Self {
        ChangeSet::default()
    }

    pub fn add(&mut self, camp: Camp) {
        self.changes.push(Change::Add(camp));
    }

    /// Stages `current` only if it differs from `original`.
    pub fn update(&mut self, original: &Camp, current: Camp) {
        if *original != current {
            self.changes.push(Change::Update(current));
        }
    }

    pub fn delete(&mut self, camp: Camp) {
        self.changes.push(Change::Delete(camp));
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Change> {
        self.changes.iter_mut()
    }

    /// First staged camp, in the state left by the last commit.
    pub fn first_camp(&self) -> Option<&Camp> {
        self.changes.first().map(Change::camp)
    }
}

/// Data access for camps. Implementations report store failures as [`AppError::Db`] and
/// duplicate monikers as [`AppError::Conflict`].
#[async_trait]
pub trait CampRepository: Send + Sync {
    async fn all_camps(&self, include_talks: bool) -> Result<Vec<Camp>, AppError>;

    /// Exact, case-sensitive moniker match.
    async fn camp_by_moniker(&self, moniker: &str, include_talks: bool) -> Result<Option<Camp>, AppError>;

    /// Camps whose event falls on `date`, latest first.
    async fn camps_by_event_date(&self, date: NaiveDate, include_talks: bool) -> Result<Vec<Camp>, AppError>;

    /// Commit all staged changes atomically. Returns whether anything was persisted.
    async fn save_changes(&self, changes: &mut ChangeSet) -> Result<bool, AppError>;

    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), AppError>;
}
