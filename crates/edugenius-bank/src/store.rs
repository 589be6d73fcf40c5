//! SQLite question store.
//!
//! One table holds everything: metadata, answer, opaque JSON columns for
//! options/tags, and the embedding as a little-endian f32 blob. All access
//! goes through a mutex-guarded connection; each operation is a single
//! statement, so SQLite's own atomicity covers commit-or-rollback.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::Mutex;

use edugenius_core::error::{EduGeniusError, Result};
use edugenius_core::types::{Question, QuestionDraft, QuestionFilter, QuestionType};

pub struct QuestionStore {
    conn: Mutex<Connection>,
}

impl QuestionStore {
    /// Open (or create) the store at `path` and run migrations.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .map_err(|e| EduGeniusError::Database(format!("Failed to open {}: {e}", path.display())))?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL;").ok();

        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store, used by tests and throwaway sessions.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| EduGeniusError::Database(e.to_string()))?;
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run schema migrations.
    fn migrate(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "-- Question bank: one row per question, embedding stored inline
            CREATE TABLE IF NOT EXISTS question_bank (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subject TEXT NOT NULL,
                grade_level TEXT,
                difficulty INTEGER NOT NULL DEFAULT 3,
                question_type TEXT NOT NULL,
                topic TEXT,
                question_text TEXT NOT NULL,
                options TEXT,
                correct_answer TEXT NOT NULL,
                explanation TEXT,
                tags TEXT,
                embedding BLOB,
                usage_count INTEGER NOT NULL DEFAULT 0,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_question_bank_subject
                ON question_bank(subject);
            CREATE INDEX IF NOT EXISTS idx_question_bank_active
                ON question_bank(is_active);",
        )
        .map_err(|e| EduGeniusError::Database(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Insert a question and return its new id. The embedding may be empty
    /// (generation failed); the row is inserted regardless.
    pub fn insert(&self, draft: &QuestionDraft, embedding: &[f32]) -> Result<i64> {
        let options = match &draft.options {
            Some(map) => Some(
                serde_json::to_string(map)
                    .map_err(|e| EduGeniusError::Database(format!("Bad options JSON: {e}")))?,
            ),
            None => None,
        };
        let tags = match &draft.tags {
            Some(map) => Some(
                serde_json::to_string(map)
                    .map_err(|e| EduGeniusError::Database(format!("Bad tags JSON: {e}")))?,
            ),
            None => None,
        };
        let now = Utc::now().to_rfc3339();

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO question_bank
                (subject, grade_level, difficulty, question_type, topic, question_text,
                 options, correct_answer, explanation, tags, embedding,
                 usage_count, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 0, 1, ?12, ?13)",
            params![
                draft.subject,
                draft.grade_level,
                draft.difficulty,
                draft.question_type.as_str(),
                draft.topic,
                draft.question_text,
                options,
                draft.correct_answer,
                draft.explanation,
                tags,
                embedding_to_bytes(embedding),
                now,
                now,
            ],
        )
        .map_err(|e| EduGeniusError::Database(format!("Insert failed: {e}")))?;
        Ok(conn.last_insert_rowid())
    }

    /// Point lookup by id. Returns soft-deleted rows too; filtering on the
    /// active flag is a search/listing concern, not a lookup concern.
    pub fn get_by_id(&self, id: i64) -> Result<Option<Question>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, subject, grade_level, difficulty, question_type, topic,
                        question_text, options, correct_answer, explanation, tags,
                        embedding, usage_count, is_active, created_at, updated_at
                 FROM question_bank WHERE id = ?1",
            )
            .map_err(|e| EduGeniusError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![id], row_to_question)
            .map_err(|e| EduGeniusError::Database(e.to_string()))?;
        match rows.next() {
            Some(row) => Ok(Some(
                row.map_err(|e| EduGeniusError::Database(e.to_string()))?,
            )),
            None => Ok(None),
        }
    }

    /// Filtered scan over active questions, in primary-key order.
    ///
    /// Every supplied filter field must match exactly; `exclude_id` drops
    /// one id. `limit` of `None` returns the whole candidate set (the
    /// ranking step needs all of it).
    pub fn find(&self, filter: &QuestionFilter, limit: Option<usize>) -> Result<Vec<Question>> {
        let mut sql = String::from(
            "SELECT id, subject, grade_level, difficulty, question_type, topic,
                    question_text, options, correct_answer, explanation, tags,
                    embedding, usage_count, is_active, created_at, updated_at
             FROM question_bank WHERE is_active = 1",
        );
        let mut values: Vec<rusqlite::types::Value> = Vec::new();

        if let Some(subject) = &filter.subject {
            sql.push_str(" AND subject = ?");
            values.push(subject.clone().into());
        }
        if let Some(difficulty) = filter.difficulty {
            sql.push_str(" AND difficulty = ?");
            values.push(i64::from(difficulty).into());
        }
        if let Some(grade_level) = &filter.grade_level {
            sql.push_str(" AND grade_level = ?");
            values.push(grade_level.clone().into());
        }
        if let Some(topic) = &filter.topic {
            sql.push_str(" AND topic = ?");
            values.push(topic.clone().into());
        }
        if let Some(exclude_id) = filter.exclude_id {
            sql.push_str(" AND id != ?");
            values.push(exclude_id.into());
        }
        sql.push_str(" ORDER BY id");
        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            values.push((limit as i64).into());
        }

        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| EduGeniusError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(values), row_to_question)
            .map_err(|e| EduGeniusError::Database(e.to_string()))?;
        let mut questions = Vec::new();
        for row in rows {
            questions.push(row.map_err(|e| EduGeniusError::Database(e.to_string()))?);
        }
        Ok(questions)
    }

    /// Atomic usage-count increment. Concurrent calls serialize inside
    /// SQLite, so N calls always add exactly N. Returns false when the id
    /// does not exist.
    pub fn increment_usage(&self, id: i64) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE question_bank
                 SET usage_count = usage_count + 1, updated_at = ?1
                 WHERE id = ?2",
                params![now, id],
            )
            .map_err(|e| EduGeniusError::Database(e.to_string()))?;
        Ok(changed > 0)
    }

    /// Soft delete: flips the active flag, keeps the row. Idempotent.
    /// Returns false when the id does not exist.
    pub fn soft_delete(&self, id: i64) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE question_bank
                 SET is_active = 0, updated_at = ?1
                 WHERE id = ?2",
                params![now, id],
            )
            .map_err(|e| EduGeniusError::Database(e.to_string()))?;
        Ok(changed > 0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| EduGeniusError::Database(format!("Lock poisoned: {e}")))
    }
}

fn row_to_question(row: &rusqlite::Row<'_>) -> rusqlite::Result<Question> {
    let type_raw: String = row.get(4)?;
    let question_type = type_raw.parse::<QuestionType>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Question {
        id: row.get(0)?,
        subject: row.get(1)?,
        grade_level: row.get(2)?,
        difficulty: row.get(3)?,
        question_type,
        topic: row.get(5)?,
        question_text: row.get(6)?,
        options: row
            .get::<_, Option<String>>(7)?
            .and_then(|s| serde_json::from_str(&s).ok()),
        correct_answer: row.get(8)?,
        explanation: row.get(9)?,
        tags: row
            .get::<_, Option<String>>(10)?
            .and_then(|s| serde_json::from_str(&s).ok()),
        embedding: row
            .get::<_, Option<Vec<u8>>>(11)?
            .map(|b| bytes_to_embedding(&b))
            .unwrap_or_default(),
        usage_count: row.get(12)?,
        is_active: row.get::<_, i64>(13)? != 0,
        created_at: parse_timestamp(&row.get::<_, String>(14)?),
        updated_at: parse_timestamp(&row.get::<_, String>(15)?),
    })
}

/// Encode an embedding as little-endian f32 bytes for BLOB storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for v in embedding {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode a BLOB back into an embedding. A truncated blob drops its tail.
fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
