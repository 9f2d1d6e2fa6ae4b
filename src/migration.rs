//! Schema DDL for camps, locations, speakers and talks, plus optional sample data.
//! Statements are idempotent, so migrations run on every start.

use crate::error::AppError;
use crate::model::{Camp, Location, Speaker, Talk};
use crate::repository::{CampRepository, ChangeSet};
use chrono::NaiveDate;
use sqlx::PgPool;

fn ddl(schema: &str) -> Vec<String> {
    vec![
        format!("CREATE SCHEMA IF NOT EXISTS {}", schema),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {s}.locations (
                location_id SERIAL PRIMARY KEY,
                venue_name TEXT,
                address1 TEXT,
                address2 TEXT,
                address3 TEXT,
                city_town TEXT,
                state_province TEXT,
                postal_code TEXT,
                country TEXT
            )
            "#,
            s = schema
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {s}.camps (
                camp_id SERIAL PRIMARY KEY,
                name VARCHAR(100) NOT NULL,
                moniker TEXT NOT NULL UNIQUE,
                event_date TIMESTAMP NOT NULL,
                length INTEGER NOT NULL DEFAULT 1 CHECK (length BETWEEN 1 AND 100),
                location_id INTEGER REFERENCES {s}.locations (location_id) ON DELETE SET NULL
            )
            "#,
            s = schema
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {s}.speakers (
                speaker_id SERIAL PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                middle_name TEXT,
                company TEXT,
                company_url TEXT,
                blog_url TEXT,
                twitter TEXT,
                github TEXT
            )
            "#,
            s = schema
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {s}.talks (
                talk_id SERIAL PRIMARY KEY,
                camp_id INTEGER NOT NULL REFERENCES {s}.camps (camp_id) ON DELETE CASCADE,
                speaker_id INTEGER REFERENCES {s}.speakers (speaker_id) ON DELETE SET NULL,
                title TEXT NOT NULL,
                abstract TEXT NOT NULL DEFAULT '',
                level INTEGER NOT NULL DEFAULT 100
            )
            "#,
            s = schema
        ),
        format!("CREATE INDEX IF NOT EXISTS camps_event_date_idx ON {}.camps (event_date)", schema),
        format!("CREATE INDEX IF NOT EXISTS talks_camp_id_idx ON {}.talks (camp_id)", schema),
    ]
}

/// Create the schema and tables if they do not exist. `schema` must be a validated identifier.
pub async fn apply_migrations(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    for sql in ddl(schema) {
        tracing::debug!(sql = %sql.trim(), "migration");
        sqlx::query(&sql).execute(pool).await?;
    }
    tracing::info!(schema, "migrations applied");
    Ok(())
}

/// The Atlanta Code Camp with its venue, two talks and their speakers.
pub fn sample_camps() -> Vec<Camp> {
    let event_date = NaiveDate::from_ymd_opt(2018, 10, 18)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    vec![Camp {
        camp_id: 0,
        name: "Atlanta Code Camp".into(),
        moniker: "ATL2018".into(),
        event_date,
        length: 1,
        location: Some(Location {
            venue_name: Some("Atlanta Convention Center".into()),
            address1: Some("123 Main Street".into()),
            city_town: Some("Atlanta".into()),
            state_province: Some("GA".into()),
            postal_code: Some("12345".into()),
            country: Some("USA".into()),
            ..Location::default()
        }),
        talks: vec![
            Talk {
                title: "Entity Framework From Scratch".into(),
                abstract_text: "Working with Entity Framework from scratch".into(),
                level: 100,
                speaker: Some(Speaker {
                    first_name: "Shawn".into(),
                    last_name: "Wildermuth".into(),
                    blog_url: Some("http://wildermuth.com".into()),
                    company: Some("Wilder Minds LLC".into()),
                    company_url: Some("http://wilderminds.com".into()),
                    github: Some("shawnwildermuth".into()),
                    twitter: Some("shawnwildermuth".into()),
                    ..Speaker::default()
                }),
                ..Talk::default()
            },
            Talk {
                title: "Writing Sample Data Made Easy".into(),
                abstract_text: "Thinking of good sample data examples is tiring.".into(),
                level: 200,
                speaker: Some(Speaker {
                    first_name: "Resa".into(),
                    last_name: "Wildermuth".into(),
                    blog_url: Some("http://shawnandresa.com".into()),
                    company: Some("Wilder Minds LLC".into()),
                    company_url: Some("http://wilderminds.com".into()),
                    github: Some("resawildermuth".into()),
                    twitter: Some("resawildermuth".into()),
                    ..Speaker::default()
                }),
                ..Talk::default()
            },
        ],
    }]
}

/// Insert the sample camps whose monikers are not stored yet.
pub async fn seed(repo: &dyn CampRepository) -> Result<usize, AppError> {
    let mut changes = ChangeSet::new();
    for camp in sample_camps() {
        if repo.camp_by_moniker(&camp.moniker, false).await?.is_none() {
            changes.add(camp);
        }
    }
    let count = changes.len();
    if repo.save_changes(&mut changes).await? {
        tracing::info!(count, "seeded sample camps");
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryCampRepository;

    #[test]
    fn ddl_is_schema_qualified() {
        let stmts = ddl("events");
        assert!(stmts[0].contains("CREATE SCHEMA IF NOT EXISTS events"));
        assert!(stmts.iter().skip(1).all(|s| s.contains("events.")));
        assert!(stmts.iter().any(|s| s.contains("moniker TEXT NOT NULL UNIQUE")));
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let repo = InMemoryCampRepository::new();
        assert_eq!(seed(&repo).await.unwrap(), 1);
        assert_eq!(seed(&repo).await.unwrap(), 0);
        let camps = repo.all_camps(true).await.unwrap();
        assert_eq!(camps.len(), 1);
        assert_eq!(camps[0].talks.len(), 2);
    }
}
