//! In-process store with the same contract as the PostgreSQL repository.

use super::{CampRepository, Change, ChangeSet};
use crate::error::AppError;
use crate::model::Camp;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::RwLock;

#[derive(Default)]
struct Tables {
    camps: Vec<Camp>,
    next_camp_id: i32,
    next_location_id: i32,
    next_talk_id: i32,
    next_speaker_id: i32,
}

impl Tables {
    fn next(counter: &mut i32) -> i32 {
        *counter += 1;
        *counter
    }

    /// Assign ids to everything in `camp` that has none yet.
    fn assign_ids(&mut self, camp: &mut Camp) {
        if camp.camp_id == 0 {
            camp.camp_id = Self::next(&mut self.next_camp_id);
        }
        if let Some(loc) = camp.location.as_mut() {
            if loc.location_id == 0 {
                loc.location_id = Self::next(&mut self.next_location_id);
            }
        }
        for talk in camp.talks.iter_mut() {
            if talk.talk_id == 0 {
                talk.talk_id = Self::next(&mut self.next_talk_id);
            }
            if let Some(speaker) = talk.speaker.as_mut() {
                if speaker.speaker_id == 0 {
                    speaker.speaker_id = Self::next(&mut self.next_speaker_id);
                }
            }
        }
    }

    fn moniker_taken(&self, moniker: &str, except_camp_id: i32) -> bool {
        self.camps
            .iter()
            .any(|c| c.moniker == moniker && c.camp_id != except_camp_id)
    }

    fn apply(&mut self, change: &mut Change) -> Result<bool, AppError> {
        match change {
            Change::Add(camp) => {
                if self.moniker_taken(&camp.moniker, 0) {
                    return Err(AppError::Conflict(format!("moniker {} already exists", camp.moniker)));
                }
                self.assign_ids(camp);
                self.camps.push(camp.clone());
                Ok(true)
            }
            Change::Update(camp) => {
                if self.moniker_taken(&camp.moniker, camp.camp_id) {
                    return Err(AppError::Conflict(format!("moniker {} already exists", camp.moniker)));
                }
                let Some(idx) = self.camps.iter().position(|c| c.camp_id == camp.camp_id) else {
                    return Ok(false);
                };
                self.assign_ids(camp);
                // Talks are owned by the store; an update never replaces them.
                let talks = std::mem::take(&mut self.camps[idx].talks);
                self.camps[idx] = Camp {
                    talks,
                    ..camp.clone()
                };
                Ok(true)
            }
            Change::Delete(camp) => {
                let before = self.camps.len();
                self.camps.retain(|c| c.camp_id != camp.camp_id);
                Ok(self.camps.len() < before)
            }
        }
    }
}

pub struct InMemoryCampRepository {
    tables: RwLock<Tables>,
}

impl Default for InMemoryCampRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCampRepository {
    pub fn new() -> Self {
        InMemoryCampRepository {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Store preloaded with `camps`; ids are assigned to any entity that has none.
    pub fn with_camps(camps: Vec<Camp>) -> Self {
        let mut tables = Tables::default();
        for mut camp in camps {
            tables.assign_ids(&mut camp);
            tables.camps.push(camp);
        }
        InMemoryCampRepository {
            tables: RwLock::new(tables),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> Result<T, AppError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| AppError::Internal("camp store lock poisoned".into()))?;
        Ok(f(&tables))
    }
}

fn project(camps: impl Iterator<Item = Camp>, include_talks: bool) -> Vec<Camp> {
    let mut out: Vec<Camp> = camps
        .map(|c| if include_talks { c } else { c.without_talks() })
        .collect();
    out.sort_by(|a, b| b.event_date.cmp(&a.event_date).then(a.camp_id.cmp(&b.camp_id)));
    out
}

#[async_trait]
impl CampRepository for InMemoryCampRepository {
    async fn all_camps(&self, include_talks: bool) -> Result<Vec<Camp>, AppError> {
        self.read(|t| project(t.camps.iter().cloned(), include_talks))
    }

    async fn camp_by_moniker(&self, moniker: &str, include_talks: bool) -> Result<Option<Camp>, AppError> {
        self.read(|t| {
            t.camps
                .iter()
                .find(|c| c.moniker == moniker)
                .map(|c| if include_talks { c.clone() } else { c.without_talks() })
        })
    }

    async fn camps_by_event_date(&self, date: NaiveDate, include_talks: bool) -> Result<Vec<Camp>, AppError> {
        self.read(|t| {
            project(
                t.camps.iter().filter(|c| c.event_date.date() == date).cloned(),
                include_talks,
            )
        })
    }

    async fn save_changes(&self, changes: &mut ChangeSet) -> Result<bool, AppError> {
        if changes.is_empty() {
            return Ok(false);
        }
        let mut tables = self
            .tables
            .write()
            .map_err(|_| AppError::Internal("camp store lock poisoned".into()))?;

        // Work on a copy so a failing change leaves the store untouched.
        let mut staged = Tables {
            camps: tables.camps.clone(),
            ..*tables
        };
        let mut persisted = false;
        for change in changes.iter_mut() {
            persisted |= staged.apply(change)?;
        }
        *tables = staged;
        tracing::debug!(changes = changes.len(), persisted, "memory store commit");
        Ok(persisted)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.read(|_| ())
    }
}
