//! # EduGenius Bank
//!
//! The question bank: SQLite-backed storage plus the similar-question
//! retrieval engine (exact cosine over a metadata-filtered candidate set).
//!
//! `QuestionBank` is the facade the tool layer talks to. It owns a store
//! handle and an embedding provider, injected at construction — one
//! explicitly built instance per process or test, shared via `Arc`.

pub mod similarity;
pub mod store;

pub use store::QuestionStore;

use std::sync::Arc;

use edugenius_core::error::{EduGeniusError, Result};
use edugenius_core::traits::Embedder;
use edugenius_core::types::{Question, QuestionDraft, QuestionFilter, SearchResults};

pub struct QuestionBank {
    store: Arc<QuestionStore>,
    embedder: Arc<dyn Embedder>,
}

impl QuestionBank {
    pub fn new(store: Arc<QuestionStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    /// Text a question is embedded from. The topic rides along so
    /// knowledge-point labels influence similarity; an absent topic leaves
    /// a trailing space, which embedders ignore.
    fn embedding_text(question_text: &str, topic: Option<&str>) -> String {
        format!("{} {}", question_text, topic.unwrap_or(""))
    }

    /// Embed, degrading to an empty vector on provider failure.
    async fn embed_or_empty(&self, text: &str) -> Vec<f32> {
        match self.embedder.embed(text).await {
            Ok(vector) => vector,
            Err(e) => {
                tracing::warn!("⚠️ Embedding via {} failed: {e}", self.embedder.name());
                Vec::new()
            }
        }
    }

    /// Add a question and return its id.
    ///
    /// The embedding is computed once, here. If the provider fails, the
    /// row is stored with an empty embedding rather than rejected; it
    /// stays unscoreable until searches take their fallback path.
    pub async fn add_question(&self, draft: QuestionDraft) -> Result<i64> {
        validate_draft(&draft)?;
        let text = Self::embedding_text(&draft.question_text, draft.topic.as_deref());
        let embedding = self.embed_or_empty(&text).await;
        if embedding.is_empty() {
            tracing::warn!("⚠️ Storing question without an embedding");
        }
        let id = self.store.insert(&draft, &embedding)?;
        tracing::info!("📝 Question #{id} added ({})", draft.subject);
        Ok(id)
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<Question>> {
        self.store.get_by_id(id)
    }

    /// Listing without ranking: same conjunctive filters as search, rows
    /// in store order.
    pub fn list_by_subject(
        &self,
        subject: &str,
        grade_level: Option<&str>,
        difficulty: Option<i32>,
        limit: usize,
    ) -> Result<Vec<Question>> {
        let filter = QuestionFilter {
            subject: Some(subject.to_string()),
            grade_level: grade_level.map(String::from),
            difficulty,
            ..Default::default()
        };
        self.store.find(&filter, Some(limit))
    }

    /// Count one recommendation served. Returns false for unknown ids.
    pub fn increment_usage(&self, id: i64) -> Result<bool> {
        self.store.increment_usage(id)
    }

    /// Retire a question from search and listing, keeping the row.
    pub fn soft_delete(&self, id: i64) -> Result<bool> {
        let removed = self.store.soft_delete(id)?;
        if removed {
            tracing::info!("🗑️ Question #{id} retired");
        }
        Ok(removed)
    }

    /// Find questions semantically close to `query_text` among the active
    /// rows matching `filter`, best first.
    ///
    /// The degraded paths are part of the contract:
    /// - no candidates: `Ranked` and empty, not an error;
    /// - query embedding unavailable: `Unranked` with the first `limit`
    ///   candidates in store order, no scores;
    /// - store failure: `Err`, for the caller to render without crashing
    ///   the turn.
    pub async fn search_similar(
        &self,
        query_text: &str,
        filter: &QuestionFilter,
        limit: usize,
    ) -> Result<SearchResults> {
        let candidates = self.store.find(filter, None)?;
        if candidates.is_empty() {
            return Ok(SearchResults::Ranked(Vec::new()));
        }

        let query = self.embed_or_empty(query_text).await;
        if query.is_empty() {
            tracing::warn!(
                "⚠️ Query embedding unavailable — returning up to {limit} candidates unranked"
            );
            let fallback: Vec<Question> = candidates.into_iter().take(limit).collect();
            return Ok(SearchResults::Unranked(fallback));
        }

        let total = candidates.len();
        let hits = similarity::rank(candidates, &query, limit);
        tracing::debug!("🔍 Scored {total} candidate(s), kept {}", hits.len());
        Ok(SearchResults::Ranked(hits))
    }
}

fn validate_draft(draft: &QuestionDraft) -> Result<()> {
    if draft.subject.trim().is_empty() {
        return Err(EduGeniusError::Validation(
            "subject must not be empty".into(),
        ));
    }
    if draft.question_text.trim().is_empty() {
        return Err(EduGeniusError::Validation(
            "question_text must not be empty".into(),
        ));
    }
    if draft.correct_answer.trim().is_empty() {
        return Err(EduGeniusError::Validation(
            "correct_answer must not be empty".into(),
        ));
    }
    if !(1..=5).contains(&draft.difficulty) {
        return Err(EduGeniusError::Validation(format!(
            "difficulty must be within 1-5, got {}",
            draft.difficulty
        )));
    }
    Ok(())
}
