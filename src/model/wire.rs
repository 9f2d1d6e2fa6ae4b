//! Wire models exchanged over the API. Keys are camelCase; location fields are flattened with a `location` prefix.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// `0001-01-01T00:00:00`, used when a payload carries no event date.
pub fn default_event_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Accepts `YYYY-MM-DD` or an ISO date-time with or without fractional seconds and offset.
pub fn parse_event_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

fn de_event_date<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        None => Ok(default_event_date()),
        Some(s) => parse_event_date(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("eventDate '{}' is not a date", s))),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CampModel {
    pub camp_id: i32,
    pub name: String,
    pub moniker: String,
    #[serde(deserialize_with = "de_event_date")]
    #[schema(value_type = String, example = "2018-10-18T00:00:00")]
    pub event_date: NaiveDateTime,
    pub length: i32,
    pub location_venue: Option<String>,
    pub location_address1: Option<String>,
    pub location_address2: Option<String>,
    pub location_address3: Option<String>,
    pub location_city_town: Option<String>,
    pub location_state_province: Option<String>,
    pub location_postal_code: Option<String>,
    pub location_country: Option<String>,
    pub talks: Vec<TalkModel>,
}

impl Default for CampModel {
    fn default() -> Self {
        CampModel {
            camp_id: 0,
            name: String::new(),
            moniker: String::new(),
            event_date: default_event_date(),
            length: 1,
            location_venue: None,
            location_address1: None,
            location_address2: None,
            location_address3: None,
            location_city_town: None,
            location_state_province: None,
            location_postal_code: None,
            location_country: None,
            talks: Vec::new(),
        }
    }
}

impl CampModel {
    pub fn has_location(&self) -> bool {
        [
            &self.location_venue,
            &self.location_address1,
            &self.location_address2,
            &self.location_address3,
            &self.location_city_town,
            &self.location_state_province,
            &self.location_postal_code,
            &self.location_country,
        ]
        .iter()
        .any(|f| f.is_some())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TalkModel {
    pub talk_id: i32,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub level: i32,
    pub speaker: Option<SpeakerModel>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeakerModel {
    pub speaker_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub company: Option<String>,
    pub company_url: Option<String>,
    pub blog_url: Option<String>,
    pub twitter: Option<String>,
    #[serde(rename = "gitHub")]
    pub github: Option<String>,
}
