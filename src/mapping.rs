//! Entity ↔ wire model conversions.
//!
//! `CampProfile` is built once at startup and carried in [`crate::AppState`]. Overlay rules for
//! updates: name, moniker, event date and length are always copied from the payload; each
//! flattened location field is copied only when the payload carries it, so absent fields never
//! clear stored data. Camp ids and talks are never taken from a payload.

use crate::model::{Camp, CampModel, Location, Speaker, SpeakerModel, Talk, TalkModel};

/// Projects a source value into a new destination value.
pub trait MapInto<S, D> {
    fn map(&self, source: &S) -> D;
}

/// Copies a source value onto an existing destination.
pub trait MapOnto<S, D> {
    fn map_onto(&self, source: &S, dest: &mut D);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CampProfile;

impl CampProfile {
    pub fn new() -> Self {
        CampProfile
    }

    pub fn camp_model(&self, camp: &Camp) -> CampModel {
        self.map(camp)
    }

    pub fn camp_models(&self, camps: &[Camp]) -> Vec<CampModel> {
        camps.iter().map(|c| self.camp_model(c)).collect()
    }

    pub fn talk_model(&self, talk: &Talk) -> TalkModel {
        self.map(talk)
    }
}

impl MapInto<Camp, CampModel> for CampProfile {
    fn map(&self, camp: &Camp) -> CampModel {
        let loc = camp.location.clone().unwrap_or_default();
        CampModel {
            camp_id: camp.camp_id,
            name: camp.name.clone(),
            moniker: camp.moniker.clone(),
            event_date: camp.event_date,
            length: camp.length,
            location_venue: loc.venue_name,
            location_address1: loc.address1,
            location_address2: loc.address2,
            location_address3: loc.address3,
            location_city_town: loc.city_town,
            location_state_province: loc.state_province,
            location_postal_code: loc.postal_code,
            location_country: loc.country,
            talks: camp.talks.iter().map(|t| self.map(t)).collect(),
        }
    }
}

impl MapInto<Talk, TalkModel> for CampProfile {
    fn map(&self, talk: &Talk) -> TalkModel {
        TalkModel {
            talk_id: talk.talk_id,
            title: talk.title.clone(),
            abstract_text: talk.abstract_text.clone(),
            level: talk.level,
            speaker: talk.speaker.as_ref().map(|s| self.map(s)),
        }
    }
}

impl MapInto<Speaker, SpeakerModel> for CampProfile {
    fn map(&self, s: &Speaker) -> SpeakerModel {
        SpeakerModel {
            speaker_id: s.speaker_id,
            first_name: s.first_name.clone(),
            last_name: s.last_name.clone(),
            middle_name: s.middle_name.clone(),
            company: s.company.clone(),
            company_url: s.company_url.clone(),
            blog_url: s.blog_url.clone(),
            twitter: s.twitter.clone(),
            github: s.github.clone(),
        }
    }
}

/// New entity for a create request. Location exists only if the payload names any location field.
impl MapInto<CampModel, Camp> for CampProfile {
    fn map(&self, model: &CampModel) -> Camp {
        let mut camp = Camp {
            camp_id: 0,
            name: model.name.clone(),
            moniker: model.moniker.clone(),
            event_date: model.event_date,
            length: model.length,
            location: None,
            talks: Vec::new(),
        };
        if model.has_location() {
            camp.location = Some(Location::default());
            self.map_onto(model, &mut camp);
        }
        camp
    }
}

impl MapOnto<CampModel, Camp> for CampProfile {
    fn map_onto(&self, model: &CampModel, camp: &mut Camp) {
        camp.name = model.name.clone();
        camp.moniker = model.moniker.clone();
        camp.event_date = model.event_date;
        camp.length = model.length;
        if !model.has_location() {
            return;
        }
        let loc = camp.location.get_or_insert_with(Location::default);
        overlay(&mut loc.venue_name, &model.location_venue);
        overlay(&mut loc.address1, &model.location_address1);
        overlay(&mut loc.address2, &model.location_address2);
        overlay(&mut loc.address3, &model.location_address3);
        overlay(&mut loc.city_town, &model.location_city_town);
        overlay(&mut loc.state_province, &model.location_state_province);
        overlay(&mut loc.postal_code, &model.location_postal_code);
        overlay(&mut loc.country, &model.location_country);
    }
}

fn overlay(dest: &mut Option<String>, source: &Option<String>) {
    if let Some(v) = source {
        *dest = Some(v.clone());
    }
}
