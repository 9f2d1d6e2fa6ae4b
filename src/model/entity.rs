//! Entities as the store holds them. No validation lives here.

use chrono::NaiveDateTime;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Camp {
    /// Assigned by the store; zero until the camp is first persisted.
    pub camp_id: i32,
    pub name: String,
    pub moniker: String,
    pub event_date: NaiveDateTime,
    pub length: i32,
    pub location: Option<Location>,
    pub talks: Vec<Talk>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Location {
    pub location_id: i32,
    pub venue_name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    pub city_town: Option<String>,
    pub state_province: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Talk {
    pub talk_id: i32,
    pub title: String,
    pub abstract_text: String,
    pub level: i32,
    pub speaker: Option<Speaker>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Speaker {
    pub speaker_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub company: Option<String>,
    pub company_url: Option<String>,
    pub blog_url: Option<String>,
    pub twitter: Option<String>,
    pub github: Option<String>,
}

impl Camp {
    /// Copy without the talk collection, as returned when talks are not requested.
    pub fn without_talks(&self) -> Camp {
        Camp {
            talks: Vec::new(),
            ..self.clone()
        }
    }
}
