use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::warn;
use rusqlite::{params, Connection, Row};

use crate::{
    db::{
        helpers::{format_datetime, parse_datetime, parse_optional_gender, parse_optional_unit, to_u32},
        Database,
    },
    models::BodyFatInputs,
    store::{InputPatch, PersistedInputs},
};

fn row_to_inputs(row: &Row) -> Result<PersistedInputs> {
    let gender: Option<String> = row.get("gender")?;
    let age: Option<i64> = row.get("age")?;
    let unit_preference: Option<String> = row.get("unit_preference")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(PersistedInputs {
        inputs: BodyFatInputs {
            gender: parse_optional_gender(gender)?,
            age: age.map(|value| to_u32(value, "age")).transpose()?,
            unit_preference: parse_optional_unit(unit_preference)?,
            height_cm: row.get("height_cm")?,
            weight_kg: row.get("weight_kg")?,
            neck_cm: row.get("neck_cm")?,
            abdomen_cm: row.get("abdomen_cm")?,
            waist_cm: row.get("waist_cm")?,
            hip_cm: row.get("hip_cm")?,
        },
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

fn select_inputs(conn: &Connection, session_id: &str) -> Result<Option<PersistedInputs>> {
    let mut stmt = conn.prepare(
        "SELECT gender, age, unit_preference, height_cm, weight_kg, neck_cm,
                abdomen_cm, waist_cm, hip_cm, updated_at
         FROM body_fat_inputs
         WHERE id = ?1",
    )?;

    let mut rows = stmt.query(params![session_id])?;
    let Some(row) = rows.next()? else {
        return Ok(None);
    };
    row_to_inputs(row).map(Some)
}

fn upsert_inputs(conn: &Connection, session_id: &str, record: &PersistedInputs) -> Result<()> {
    let inputs = &record.inputs;
    conn.execute(
        "INSERT INTO body_fat_inputs (id, gender, age, unit_preference, height_cm, weight_kg,
                                      neck_cm, abdomen_cm, waist_cm, hip_cm, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(id) DO UPDATE SET
             gender = excluded.gender,
             age = excluded.age,
             unit_preference = excluded.unit_preference,
             height_cm = excluded.height_cm,
             weight_kg = excluded.weight_kg,
             neck_cm = excluded.neck_cm,
             abdomen_cm = excluded.abdomen_cm,
             waist_cm = excluded.waist_cm,
             hip_cm = excluded.hip_cm,
             updated_at = excluded.updated_at",
        params![
            session_id,
            inputs.gender.map(|g| g.as_str()),
            inputs.age.map(i64::from),
            inputs.unit_preference.map(|u| u.as_str()),
            inputs.height_cm,
            inputs.weight_kg,
            inputs.neck_cm,
            inputs.abdomen_cm,
            inputs.waist_cm,
            inputs.hip_cm,
            format_datetime(&record.updated_at),
        ],
    )?;
    Ok(())
}

impl Database {
    /// Reads the session's record. A row that cannot be decoded is an error.
    pub async fn get_inputs(&self, session_id: &str) -> Result<Option<PersistedInputs>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            select_inputs(conn, &session_id)
                .with_context(|| format!("failed to load inputs for session {session_id}"))
        })
        .await
    }

    /// Merges `patch` over the stored row and writes it back in one transaction.
    ///
    /// An undecodable existing row is replaced as if it were absent.
    pub async fn merge_inputs(
        &self,
        session_id: &str,
        patch: InputPatch,
        now: DateTime<Utc>,
    ) -> Result<PersistedInputs> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open inputs transaction")?;

            let existing = match select_inputs(&tx, &session_id) {
                Ok(existing) => existing,
                Err(err) => {
                    warn!("Discarding unreadable inputs for session {session_id}: {err:#}");
                    None
                }
            };

            let merged = PersistedInputs::merged(existing.as_ref(), &patch, now);
            upsert_inputs(&tx, &session_id, &merged)
                .with_context(|| format!("failed to save inputs for session {session_id}"))?;
            tx.commit().context("failed to commit inputs")?;

            Ok(merged)
        })
        .await
    }
}
