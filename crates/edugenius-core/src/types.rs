//! Core domain types shared across EduGenius crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::EduGeniusError;

/// Closed set of question formats handled by the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    TrueFalse,
    FillBlank,
    ShortAnswer,
    Essay,
}

impl QuestionType {
    /// Stable identifier used in storage and tool arguments.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleChoice => "single_choice",
            Self::MultipleChoice => "multiple_choice",
            Self::TrueFalse => "true_false",
            Self::FillBlank => "fill_blank",
            Self::ShortAnswer => "short_answer",
            Self::Essay => "essay",
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QuestionType {
    type Err = EduGeniusError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "single_choice" => Ok(Self::SingleChoice),
            "multiple_choice" => Ok(Self::MultipleChoice),
            "true_false" => Ok(Self::TrueFalse),
            "fill_blank" => Ok(Self::FillBlank),
            "short_answer" => Ok(Self::ShortAnswer),
            "essay" => Ok(Self::Essay),
            other => Err(EduGeniusError::Validation(format!(
                "Unknown question type: {other}"
            ))),
        }
    }
}

/// A question persisted in the bank.
///
/// `id` is assigned by the store and never changes. `embedding` is computed
/// once at creation; an empty vector means generation failed and the row is
/// unscoreable until the search fallback kicks in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub subject: String,
    pub grade_level: Option<String>,
    pub difficulty: i32,
    pub question_type: QuestionType,
    pub topic: Option<String>,
    pub question_text: String,
    /// Choice options; shape is consumer-defined and opaque to the engine.
    pub options: Option<Map<String, Value>>,
    pub correct_answer: String,
    pub explanation: Option<String>,
    /// Free-form labels; opaque to the engine.
    pub tags: Option<Map<String, Value>>,
    pub embedding: Vec<f32>,
    pub usage_count: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for adding a question. The store assigns id, counters, and
/// timestamps; the bank computes the embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub subject: String,
    pub question_text: String,
    pub question_type: QuestionType,
    pub correct_answer: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: i32,
    #[serde(default)]
    pub grade_level: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub options: Option<Map<String, Value>>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub tags: Option<Map<String, Value>>,
}

fn default_difficulty() -> i32 {
    3
}

/// Equality filters applied when building a search candidate set.
/// A `None` field places no constraint; all supplied fields must match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionFilter {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub difficulty: Option<i32>,
    #[serde(default)]
    pub grade_level: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    /// Excludes one id, e.g. the question the user just answered.
    #[serde(default)]
    pub exclude_id: Option<i64>,
}

/// A ranked hit: the question plus its similarity to the query, expressed
/// as a percentage rounded to two decimals.
#[derive(Debug, Clone)]
pub struct ScoredQuestion {
    pub question: Question,
    pub similarity: f32,
}

/// Outcome of a similarity search.
///
/// `Ranked` is the normal path: hits scored and sorted by descending
/// similarity (possibly empty when no candidate matched the filters).
/// `Unranked` is the degraded path taken when the query embedding was
/// unavailable: the first candidates in store order, no scores.
#[derive(Debug, Clone)]
pub enum SearchResults {
    Ranked(Vec<ScoredQuestion>),
    Unranked(Vec<Question>),
}

impl SearchResults {
    /// Number of questions carried, regardless of variant.
    pub fn len(&self) -> usize {
        match self {
            Self::Ranked(hits) => hits.len(),
            Self::Unranked(questions) => questions.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Questions in result order, paired with their score when ranked.
    pub fn hits(&self) -> Vec<(&Question, Option<f32>)> {
        match self {
            Self::Ranked(hits) => hits
                .iter()
                .map(|h| (&h.question, Some(h.similarity)))
                .collect(),
            Self::Unranked(questions) => questions.iter().map(|q| (q, None)).collect(),
        }
    }
}

/// JSON-schema description of a callable tool (OpenAI function format).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub output: String,
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_type_round_trip() {
        for qt in [
            QuestionType::SingleChoice,
            QuestionType::MultipleChoice,
            QuestionType::TrueFalse,
            QuestionType::FillBlank,
            QuestionType::ShortAnswer,
            QuestionType::Essay,
        ] {
            let parsed: QuestionType = qt.as_str().parse().unwrap();
            assert_eq!(parsed, qt);
        }
    }

    #[test]
    fn test_question_type_unknown_rejected() {
        assert!("multiple-choice".parse::<QuestionType>().is_err());
        assert!("".parse::<QuestionType>().is_err());
    }

    #[test]
    fn test_question_type_serde_snake_case() {
        let json = serde_json::to_string(&QuestionType::TrueFalse).unwrap();
        assert_eq!(json, "\"true_false\"");
        let back: QuestionType = serde_json::from_str("\"fill_blank\"").unwrap();
        assert_eq!(back, QuestionType::FillBlank);
    }

    #[test]
    fn test_draft_defaults_from_json() {
        let draft: QuestionDraft = serde_json::from_value(serde_json::json!({
            "subject": "math",
            "question_text": "What is 2+2?",
            "question_type": "single_choice",
            "correct_answer": "4"
        }))
        .unwrap();
        assert_eq!(draft.difficulty, 3);
        assert!(draft.topic.is_none());
        assert!(draft.options.is_none());
    }

    #[test]
    fn test_search_results_hits() {
        let results = SearchResults::Unranked(vec![]);
        assert!(results.is_empty());
        assert!(results.hits().is_empty());
    }
}
