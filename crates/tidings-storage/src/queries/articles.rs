// SPDX-FileCopyrightText: 2026 Tidings Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Article row operations.
//!
//! The article URL carries a unique index and is the dedup key: re-observing
//! a known URL is a no-op insert. Status transitions are written only here;
//! the worker decides, this module persists.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter};
use tidings_core::{Article, ArticleAnalysis, ArticleStatus, NewArticle, TidingsError};

use crate::database::{map_tr_err, Database};
use crate::timefmt;
use crate::vector;

const ARTICLE_COLUMNS: &str = "id, url, title, publish_date, source_id, status, used_browser,
     language, primary_location, completeness, content_quality,
     event_summary_points, thematic_keywords, topic_tags, key_entities, content_focus,
     embedding, content_file_key, fail_reason, processed_at, created_at";

fn conversion_err(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

fn json_list(idx: usize, raw: Option<String>) -> Result<Option<Vec<String>>, rusqlite::Error> {
    match raw {
        None => Ok(None),
        Some(s) => serde_json::from_str(&s)
            .map(Some)
            .map_err(|e| conversion_err(idx, e)),
    }
}

fn article_from_row(row: &rusqlite::Row<'_>) -> Result<Article, rusqlite::Error> {
    let status: String = row.get(5)?;
    let status = ArticleStatus::from_str(&status).map_err(|e| conversion_err(5, e))?;

    let completeness = match row.get::<_, Option<String>>(9)? {
        None => None,
        Some(s) => Some(FromStr::from_str(&s).map_err(|e| conversion_err(9, e))?),
    };
    let content_quality = match row.get::<_, Option<String>>(10)? {
        None => None,
        Some(s) => Some(FromStr::from_str(&s).map_err(|e| conversion_err(10, e))?),
    };
    let embedding = match row.get::<_, Option<Vec<u8>>>(16)? {
        None => None,
        Some(blob) => {
            Some(vector::decode_embedding(&blob).map_err(|e| conversion_err(16, e))?)
        }
    };

    Ok(Article {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        publish_date: timefmt::from_db_opt(row.get(3)?),
        source_id: row.get(4)?,
        status,
        used_browser: row.get::<_, i64>(6)? != 0,
        language: row.get(7)?,
        primary_location: row.get(8)?,
        completeness,
        content_quality,
        event_summary_points: json_list(11, row.get(11)?)?,
        thematic_keywords: json_list(12, row.get(12)?)?,
        topic_tags: json_list(13, row.get(13)?)?,
        key_entities: json_list(14, row.get(14)?)?,
        content_focus: json_list(15, row.get(15)?)?,
        embedding,
        content_file_key: row.get(17)?,
        fail_reason: row.get(18)?,
        processed_at: timefmt::from_db_opt(row.get(19)?),
        created_at: timefmt::from_db(&row.get::<_, String>(20)?).unwrap_or_else(Utc::now),
    })
}

/// Insert newly-observed articles, ignoring URLs already on file.
///
/// Uses `ON CONFLICT (url) DO NOTHING RETURNING id` so only truly-inserted
/// row ids come back; re-observation of a known URL is a no-op. All rows go
/// through one transaction.
pub async fn insert_new(
    db: &Database,
    rows: Vec<NewArticle>,
) -> Result<Vec<i64>, TidingsError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let mut inserted = Vec::new();
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO articles (source_id, url, title, publish_date)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT (url) DO NOTHING
                     RETURNING id",
                )?;
                for row in &rows {
                    let mut returned = stmt.query(params![
                        row.source_id,
                        row.url,
                        row.title,
                        row.publish_date.map(timefmt::to_db),
                    ])?;
                    if let Some(r) = returned.next()? {
                        inserted.push(r.get(0)?);
                    }
                }
            }
            tx.commit()?;
            Ok(inserted)
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch one article by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<Article>, TidingsError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?1"),
                params![id],
                article_from_row,
            );
            match result {
                Ok(article) => Ok(Some(article)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// The worker's Step-0 selection filter.
///
/// From the candidate ids, keep those not yet processed, not failed, and
/// published within the freshness window ending at `cutoff`. Everything
/// else (including re-delivered duplicates) is skipped silently, which is
/// what makes at-least-once delivery idempotent.
pub async fn select_enrichable(
    db: &Database,
    ids: Vec<i64>,
    cutoff: DateTime<Utc>,
) -> Result<Vec<Article>, TidingsError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let cutoff = timefmt::to_db(cutoff);
    db.connection()
        .call(move |conn| {
            let placeholders = vec!["?"; ids.len()].join(", ");
            let sql = format!(
                "SELECT {ARTICLE_COLUMNS} FROM articles
                 WHERE processed_at IS NULL
                   AND fail_reason IS NULL
                   AND publish_date > ?
                   AND id IN ({placeholders})
                 ORDER BY id ASC"
            );
            let mut values: Vec<Value> = Vec::with_capacity(ids.len() + 1);
            values.push(Value::Text(cutoff));
            values.extend(ids.iter().map(|id| Value::Integer(*id)));

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values), article_from_row)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
        .map_err(map_tr_err)
}

/// Record a successful content fetch.
pub async fn mark_content_fetched(
    db: &Database,
    id: i64,
    used_browser: bool,
) -> Result<(), TidingsError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE articles SET status = ?1, used_browser = ?2 WHERE id = ?3",
                params![
                    ArticleStatus::ContentFetched.to_string(),
                    used_browser as i64,
                    id
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Drive an article into a terminal failure (or skip) status.
///
/// Writes status, `fail_reason`, and `processed_at` in one statement so a
/// failed article can never be half-marked.
pub async fn mark_terminal(
    db: &Database,
    id: i64,
    status: ArticleStatus,
    fail_reason: &str,
    at: DateTime<Utc>,
) -> Result<(), TidingsError> {
    debug_assert!(status.is_terminal());
    let fail_reason = fail_reason.to_string();
    let at = timefmt::to_db(at);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE articles SET status = ?1, fail_reason = ?2, processed_at = ?3
                 WHERE id = ?4",
                params![status.to_string(), fail_reason, at, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// The worker's final commit: analysis fields, embedding, blob key, and
/// PROCESSED status land in a single update. Partial writes are forbidden,
/// so every column is set here and nowhere else.
pub async fn commit_processed(
    db: &Database,
    id: i64,
    analysis: &ArticleAnalysis,
    embedding: &[f32],
    content_file_key: &str,
    at: DateTime<Utc>,
) -> Result<(), TidingsError> {
    let blob = vector::encode_embedding(embedding)?;
    let analysis = analysis.clone();
    let content_file_key = content_file_key.to_string();
    let at = timefmt::to_db(at);

    let to_json = |list: &[String]| serde_json::to_string(list).expect("string list is valid JSON");
    let event_summary_points = to_json(&analysis.event_summary_points);
    let thematic_keywords = to_json(&analysis.thematic_keywords);
    let topic_tags = to_json(&analysis.topic_tags);
    let key_entities = to_json(&analysis.key_entities);
    let content_focus = to_json(&analysis.content_focus);

    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE articles SET
                     language = ?1,
                     primary_location = ?2,
                     completeness = ?3,
                     content_quality = ?4,
                     event_summary_points = ?5,
                     thematic_keywords = ?6,
                     topic_tags = ?7,
                     key_entities = ?8,
                     content_focus = ?9,
                     embedding = ?10,
                     content_file_key = ?11,
                     status = ?12,
                     processed_at = ?13,
                     fail_reason = NULL
                 WHERE id = ?14",
                params![
                    analysis.language,
                    analysis.primary_location,
                    analysis.completeness.to_string(),
                    analysis.content_quality.to_string(),
                    event_summary_points,
                    thematic_keywords,
                    topic_tags,
                    key_entities,
                    content_focus,
                    blob,
                    content_file_key,
                    ArticleStatus::Processed.to_string(),
                    at,
                    id
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
