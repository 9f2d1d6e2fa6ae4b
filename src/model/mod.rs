//! Persistence entities and their wire projections.

mod entity;
mod wire;

pub use entity::{Camp, Location, Speaker, Talk};
pub use wire::{default_event_date, parse_event_date, CampModel, SpeakerModel, TalkModel};
