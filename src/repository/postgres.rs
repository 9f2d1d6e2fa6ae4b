//! Camp repository on PostgreSQL. All tables live in the configured schema.

use super::{CampRepository, Change, ChangeSet};
use crate::error::AppError;
use crate::model::{Camp, Location, Speaker, Talk};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;

pub struct PgCampRepository {
    pool: PgPool,
    schema: String,
}

#[derive(sqlx::FromRow)]
struct CampRow {
    camp_id: i32,
    name: String,
    moniker: String,
    event_date: NaiveDateTime,
    length: i32,
    location_id: Option<i32>,
    venue_name: Option<String>,
    address1: Option<String>,
    address2: Option<String>,
    address3: Option<String>,
    city_town: Option<String>,
    state_province: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
}

impl From<CampRow> for Camp {
    fn from(r: CampRow) -> Self {
        let location = r.location_id.map(|location_id| Location {
            location_id,
            venue_name: r.venue_name,
            address1: r.address1,
            address2: r.address2,
            address3: r.address3,
            city_town: r.city_town,
            state_province: r.state_province,
            postal_code: r.postal_code,
            country: r.country,
        });
        Camp {
            camp_id: r.camp_id,
            name: r.name,
            moniker: r.moniker,
            event_date: r.event_date,
            length: r.length,
            location,
            talks: Vec::new(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct TalkRow {
    camp_id: i32,
    talk_id: i32,
    title: String,
    abstract_text: String,
    level: i32,
    speaker_id: Option<i32>,
    first_name: Option<String>,
    last_name: Option<String>,
    middle_name: Option<String>,
    company: Option<String>,
    company_url: Option<String>,
    blog_url: Option<String>,
    twitter: Option<String>,
    github: Option<String>,
}

impl From<TalkRow> for Talk {
    fn from(r: TalkRow) -> Self {
        let speaker = r.speaker_id.map(|speaker_id| Speaker {
            speaker_id,
            first_name: r.first_name.unwrap_or_default(),
            last_name: r.last_name.unwrap_or_default(),
            middle_name: r.middle_name,
            company: r.company,
            company_url: r.company_url,
            blog_url: r.blog_url,
            twitter: r.twitter,
            github: r.github,
        });
        Talk {
            talk_id: r.talk_id,
            title: r.title,
            abstract_text: r.abstract_text,
            level: r.level,
            speaker,
        }
    }
}

impl PgCampRepository {
    /// `schema` must already be validated as a plain identifier (see [`crate::config::validate_schema_name`]).
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        PgCampRepository {
            pool,
            schema: schema.into(),
        }
    }

    fn table(&self, name: &str) -> String {
        format!("{}.{}", self.schema, name)
    }

    fn select_camps(&self, filter: &str) -> String {
        format!(
            "SELECT c.camp_id, c.name, c.moniker, c.event_date, c.length, \
             l.location_id, l.venue_name, l.address1, l.address2, l.address3, \
             l.city_town, l.state_province, l.postal_code, l.country \
             FROM {} c LEFT JOIN {} l ON l.location_id = c.location_id \
             {} ORDER BY c.event_date DESC, c.camp_id",
            self.table("camps"),
            self.table("locations"),
            filter
        )
    }

    /// Batch-load talks for all `camps` in one query and attach them.
    async fn attach_talks(&self, camps: &mut [Camp]) -> Result<(), AppError> {
        if camps.is_empty() {
            return Ok(());
        }
        let ids: Vec<i32> = camps.iter().map(|c| c.camp_id).collect();
        let sql = format!(
            "SELECT t.camp_id, t.talk_id, t.title, t.abstract AS abstract_text, t.level, \
             s.speaker_id, s.first_name, s.last_name, s.middle_name, s.company, \
             s.company_url, s.blog_url, s.twitter, s.github \
             FROM {} t LEFT JOIN {} s ON s.speaker_id = t.speaker_id \
             WHERE t.camp_id = ANY($1) ORDER BY t.talk_id",
            self.table("talks"),
            self.table("speakers")
        );
        tracing::debug!(sql = %sql, camps = ids.len(), "query talks");
        let rows: Vec<TalkRow> = sqlx::query_as(&sql)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;
        let mut by_camp: HashMap<i32, Vec<Talk>> = HashMap::new();
        for row in rows {
            by_camp.entry(row.camp_id).or_default().push(row.into());
        }
        for camp in camps.iter_mut() {
            camp.talks = by_camp.remove(&camp.camp_id).unwrap_or_default();
        }
        Ok(())
    }

    async fn insert_location(&self, tx: &mut PgConnection, loc: &mut Location) -> Result<(), AppError> {
        let sql = format!(
            "INSERT INTO {} (venue_name, address1, address2, address3, city_town, state_province, postal_code, country) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING location_id",
            self.table("locations")
        );
        loc.location_id = sqlx::query_scalar(&sql)
            .bind(&loc.venue_name)
            .bind(&loc.address1)
            .bind(&loc.address2)
            .bind(&loc.address3)
            .bind(&loc.city_town)
            .bind(&loc.state_province)
            .bind(&loc.postal_code)
            .bind(&loc.country)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::from_store)?;
        Ok(())
    }

    async fn update_location(&self, tx: &mut PgConnection, loc: &Location) -> Result<(), AppError> {
        let sql = format!(
            "UPDATE {} SET venue_name = $1, address1 = $2, address2 = $3, address3 = $4, \
             city_town = $5, state_province = $6, postal_code = $7, country = $8 WHERE location_id = $9",
            self.table("locations")
        );
        sqlx::query(&sql)
            .bind(&loc.venue_name)
            .bind(&loc.address1)
            .bind(&loc.address2)
            .bind(&loc.address3)
            .bind(&loc.city_town)
            .bind(&loc.state_province)
            .bind(&loc.postal_code)
            .bind(&loc.country)
            .bind(loc.location_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::from_store)?;
        Ok(())
    }

    async fn insert_talk(&self, tx: &mut PgConnection, camp_id: i32, talk: &mut Talk) -> Result<(), AppError> {
        let mut speaker_id = None;
        if let Some(speaker) = talk.speaker.as_mut() {
            if speaker.speaker_id == 0 {
                let sql = format!(
                    "INSERT INTO {} (first_name, last_name, middle_name, company, company_url, blog_url, twitter, github) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING speaker_id",
                    self.table("speakers")
                );
                speaker.speaker_id = sqlx::query_scalar(&sql)
                    .bind(&speaker.first_name)
                    .bind(&speaker.last_name)
                    .bind(&speaker.middle_name)
                    .bind(&speaker.company)
                    .bind(&speaker.company_url)
                    .bind(&speaker.blog_url)
                    .bind(&speaker.twitter)
                    .bind(&speaker.github)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(AppError::from_store)?;
            }
            speaker_id = Some(speaker.speaker_id);
        }
        let sql = format!(
            "INSERT INTO {} (camp_id, speaker_id, title, abstract, level) VALUES ($1, $2, $3, $4, $5) RETURNING talk_id",
            self.table("talks")
        );
        talk.talk_id = sqlx::query_scalar(&sql)
            .bind(camp_id)
            .bind(speaker_id)
            .bind(&talk.title)
            .bind(&talk.abstract_text)
            .bind(talk.level)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::from_store)?;
        Ok(())
    }

    async fn add_camp(&self, tx: &mut PgConnection, camp: &mut Camp) -> Result<u64, AppError> {
        if let Some(loc) = camp.location.as_mut() {
            self.insert_location(tx, loc).await?;
        }
        let sql = format!(
            "INSERT INTO {} (name, moniker, event_date, length, location_id) VALUES ($1, $2, $3, $4, $5) RETURNING camp_id",
            self.table("camps")
        );
        camp.camp_id = sqlx::query_scalar(&sql)
            .bind(&camp.name)
            .bind(&camp.moniker)
            .bind(camp.event_date)
            .bind(camp.length)
            .bind(camp.location.as_ref().map(|l| l.location_id))
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::from_store)?;
        let camp_id = camp.camp_id;
        for talk in camp.talks.iter_mut() {
            self.insert_talk(tx, camp_id, talk).await?;
        }
        Ok(1)
    }

    async fn update_camp(&self, tx: &mut PgConnection, camp: &mut Camp) -> Result<u64, AppError> {
        if let Some(loc) = camp.location.as_mut() {
            if loc.location_id == 0 {
                self.insert_location(tx, loc).await?;
            } else {
                self.update_location(tx, loc).await?;
            }
        }
        let sql = format!(
            "UPDATE {} SET name = $1, moniker = $2, event_date = $3, length = $4, location_id = $5 WHERE camp_id = $6",
            self.table("camps")
        );
        let result = sqlx::query(&sql)
            .bind(&camp.name)
            .bind(&camp.moniker)
            .bind(camp.event_date)
            .bind(camp.length)
            .bind(camp.location.as_ref().map(|l| l.location_id))
            .bind(camp.camp_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::from_store)?;
        Ok(result.rows_affected())
    }

    /// Talks go with the camp (ON DELETE CASCADE); the camp's location row is removed as well.
    async fn delete_camp(&self, tx: &mut PgConnection, camp: &Camp) -> Result<u64, AppError> {
        let sql = format!(
            "DELETE FROM {} WHERE camp_id = $1 RETURNING location_id",
            self.table("camps")
        );
        let deleted: Option<Option<i32>> = sqlx::query_scalar(&sql)
            .bind(camp.camp_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::from_store)?;
        let Some(location_id) = deleted else {
            return Ok(0);
        };
        if let Some(location_id) = location_id {
            sqlx::query(&format!("DELETE FROM {} WHERE location_id = $1", self.table("locations")))
                .bind(location_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::from_store)?;
        }
        Ok(1)
    }
}

#[async_trait]
impl CampRepository for PgCampRepository {
    async fn all_camps(&self, include_talks: bool) -> Result<Vec<Camp>, AppError> {
        let sql = self.select_camps("");
        tracing::debug!(sql = %sql, include_talks, "query camps");
        let rows: Vec<CampRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        let mut camps: Vec<Camp> = rows.into_iter().map(Camp::from).collect();
        if include_talks {
            self.attach_talks(&mut camps).await?;
        }
        Ok(camps)
    }

    async fn camp_by_moniker(&self, moniker: &str, include_talks: bool) -> Result<Option<Camp>, AppError> {
        let sql = self.select_camps("WHERE c.moniker = $1");
        tracing::debug!(sql = %sql, moniker, "query camp");
        let row: Option<CampRow> = sqlx::query_as(&sql)
            .bind(moniker)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut camps = vec![Camp::from(row)];
        if include_talks {
            self.attach_talks(&mut camps).await?;
        }
        Ok(camps.pop())
    }

    async fn camps_by_event_date(&self, date: NaiveDate, include_talks: bool) -> Result<Vec<Camp>, AppError> {
        let sql = self.select_camps("WHERE c.event_date::date = $1");
        tracing::debug!(sql = %sql, %date, "query camps by date");
        let rows: Vec<CampRow> = sqlx::query_as(&sql)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;
        let mut camps: Vec<Camp> = rows.into_iter().map(Camp::from).collect();
        if include_talks {
            self.attach_talks(&mut camps).await?;
        }
        Ok(camps)
    }

    async fn save_changes(&self, changes: &mut ChangeSet) -> Result<bool, AppError> {
        if changes.is_empty() {
            return Ok(false);
        }
        let mut tx = self.pool.begin().await?;
        let mut affected = 0u64;
        for change in changes.iter_mut() {
            affected += match change {
                Change::Add(camp) => self.add_camp(&mut tx, camp).await?,
                Change::Update(camp) => self.update_camp(&mut tx, camp).await?,
                Change::Delete(camp) => self.delete_camp(&mut tx, camp).await?,
            };
        }
        tx.commit().await?;
        tracing::info!(changes = changes.len(), affected, "camp changes committed");
        Ok(affected > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}
