//! Answer-with-practice tool — answer a learner's question, then recommend
//! similar questions from the bank to practice on.
//!
//! The answer always leads the output and is never blocked by the bank:
//! recommendation failures degrade to an explicit note. Usage counters move
//! only for questions the learner is actually shown.

use std::sync::Arc;

use async_trait::async_trait;
use edugenius_bank::QuestionBank;
use edugenius_core::error::{EduGeniusError, Result};
use edugenius_core::traits::{ChatModel, Tool};
use edugenius_core::types::{SearchResults, ToolDefinition, ToolResult};

use crate::bank_tool::{filter_from_args, question_summary};

const RECOMMEND_LIMIT: usize = 3;

pub struct AnswerWithPracticeTool {
    bank: Arc<QuestionBank>,
    chat: Arc<dyn ChatModel>,
}

impl AnswerWithPracticeTool {
    pub fn new(bank: Arc<QuestionBank>, chat: Arc<dyn ChatModel>) -> Self {
        Self { bank, chat }
    }
}

#[async_trait]
impl Tool for AnswerWithPracticeTool {
    fn name(&self) -> &str {
        "answer_with_practice"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "answer_with_practice".into(),
            description: "Answer a learner's question, then recommend up to three similar questions from the bank for extra practice.".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "question": {
                        "type": "string",
                        "description": "The learner's question"
                    },
                    "subject": {
                        "type": "string",
                        "description": "Restrict recommendations to this subject"
                    },
                    "grade_level": {
                        "type": "string",
                        "description": "Restrict recommendations to this grade level"
                    },
                    "difficulty": {
                        "type": "integer",
                        "description": "Restrict recommendations to this difficulty (1-5)"
                    }
                },
                "required": ["question"]
            }),
        }
    }

    async fn execute(&self, arguments: &str) -> Result<ToolResult> {
        let args: serde_json::Value =
            serde_json::from_str(arguments).map_err(|e| EduGeniusError::Tool(e.to_string()))?;

        let Some(question) = args["question"].as_str().filter(|q| !q.trim().is_empty()) else {
            return Err(EduGeniusError::Tool("Missing 'question'".into()));
        };

        // The answer comes first; without one there is nothing to practice for
        let answer = match self.chat.answer(question).await {
            Ok(a) => a,
            Err(e) => {
                tracing::warn!("⚠️ Chat answer failed: {e}");
                return Ok(ToolResult {
                    tool_call_id: String::new(),
                    output: format!("❌ Could not answer: {e}"),
                    success: false,
                });
            }
        };

        let filter = filter_from_args(&args);
        let mut out = format!("📖 **Answer**\n\n{answer}\n\n📚 **Practice more**\n\n");

        match self.bank.search_similar(question, &filter, RECOMMEND_LIMIT).await {
            Ok(results) if results.is_empty() => {
                out.push_str("No similar questions in the bank yet.\n");
            }
            Ok(results) => {
                if let SearchResults::Unranked(_) = results {
                    out.push_str("(similarity scoring unavailable; matches are unscored)\n");
                }
                for (i, (question, similarity)) in results.hits().into_iter().enumerate() {
                    // Counted here, not in search: only what the learner sees
                    if let Err(e) = self.bank.increment_usage(question.id) {
                        tracing::warn!("⚠️ Usage count for #{} not updated: {e}", question.id);
                    }
                    out.push_str(&format!(
                        "{}. {}\n",
                        i + 1,
                        question_summary(question, similarity)
                    ));
                }
            }
            Err(e) => {
                tracing::warn!("⚠️ Similar-question lookup failed: {e}");
                out.push_str("⚠️ Similar-question lookup failed; no recommendations this time.\n");
            }
        }

        Ok(ToolResult {
            tool_call_id: String::new(),
            output: out,
            success: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edugenius_bank::QuestionStore;
    use edugenius_core::traits::Embedder;
    use edugenius_core::types::{QuestionDraft, QuestionType};
    use serde_json::json;

    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        fn name(&self) -> &str {
            "stub"
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(match text.trim() {
                "alpha" => vec![1.0, 0.0],
                "beta" => vec![0.9, 0.1],
                "delta" => vec![0.8, 0.2],
                "epsilon" => vec![0.1, 0.9],
                _ => vec![0.0, 1.0],
            })
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        fn name(&self) -> &str {
            "failing"
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(EduGeniusError::Embedding("provider offline".into()))
        }
    }

    struct StubChat;

    #[async_trait]
    impl ChatModel for StubChat {
        fn name(&self) -> &str {
            "stub-chat"
        }

        async fn answer(&self, _prompt: &str) -> Result<String> {
            Ok("Multiply both sides by two.".into())
        }
    }

    struct FailingChat;

    #[async_trait]
    impl ChatModel for FailingChat {
        fn name(&self) -> &str {
            "failing-chat"
        }

        async fn answer(&self, _prompt: &str) -> Result<String> {
            Err(EduGeniusError::Provider("model unavailable".into()))
        }
    }

    fn draft(text: &str) -> QuestionDraft {
        QuestionDraft {
            subject: "math".into(),
            question_text: text.into(),
            question_type: QuestionType::ShortAnswer,
            correct_answer: "42".into(),
            difficulty: 3,
            grade_level: None,
            topic: None,
            options: None,
            explanation: None,
            tags: None,
        }
    }

    /// Four seeded questions; a query of "alpha" ranks epsilon last.
    async fn seeded_store() -> (Arc<QuestionStore>, Vec<i64>) {
        let store = Arc::new(QuestionStore::in_memory().unwrap());
        let bank = QuestionBank::new(Arc::clone(&store), Arc::new(StubEmbedder));
        let mut ids = Vec::new();
        for text in ["alpha", "beta", "delta", "epsilon"] {
            ids.push(bank.add_question(draft(text)).await.unwrap());
        }
        (store, ids)
    }

    fn tool_over(store: Arc<QuestionStore>, embedder: Arc<dyn Embedder>) -> AnswerWithPracticeTool {
        let bank = Arc::new(QuestionBank::new(store, embedder));
        AnswerWithPracticeTool::new(bank, Arc::new(StubChat))
    }

    #[tokio::test]
    async fn test_answer_precedes_recommendations() {
        let (store, ids) = seeded_store().await;
        let tool = tool_over(Arc::clone(&store), Arc::new(StubEmbedder));

        let result = tool
            .execute(&json!({"question": "alpha"}).to_string())
            .await
            .unwrap();
        assert!(result.success);

        let answer_at = result.output.find("Multiply both sides").unwrap();
        let practice_at = result.output.find("Practice more").unwrap();
        assert!(answer_at < practice_at);

        // Top three by similarity; the weakest match is left out
        assert!(result.output.contains(&format!("#{}", ids[0])));
        assert!(result.output.contains(&format!("#{}", ids[1])));
        assert!(result.output.contains(&format!("#{}", ids[2])));
        assert!(!result.output.contains(&format!("#{}", ids[3])));
    }

    #[tokio::test]
    async fn test_usage_counted_only_for_shown() {
        let (store, ids) = seeded_store().await;
        let tool = tool_over(Arc::clone(&store), Arc::new(StubEmbedder));

        tool.execute(&json!({"question": "alpha"}).to_string())
            .await
            .unwrap();

        let usage: Vec<i64> = ids
            .iter()
            .map(|id| store.get_by_id(*id).unwrap().unwrap().usage_count)
            .collect();
        assert_eq!(usage, vec![1, 1, 1, 0]);
    }

    #[tokio::test]
    async fn test_chat_failure_reports_and_counts_nothing() {
        let (store, ids) = seeded_store().await;
        let bank = Arc::new(QuestionBank::new(Arc::clone(&store), Arc::new(StubEmbedder)));
        let tool = AnswerWithPracticeTool::new(bank, Arc::new(FailingChat));

        let result = tool
            .execute(&json!({"question": "alpha"}).to_string())
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.contains("Could not answer"));

        for id in ids {
            assert_eq!(store.get_by_id(id).unwrap().unwrap().usage_count, 0);
        }
    }

    #[tokio::test]
    async fn test_empty_bank_still_answers() {
        let store = Arc::new(QuestionStore::in_memory().unwrap());
        let tool = tool_over(store, Arc::new(StubEmbedder));

        let result = tool
            .execute(&json!({"question": "alpha"}).to_string())
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.contains("Multiply both sides"));
        assert!(result.output.contains("No similar questions in the bank yet."));
    }

    #[tokio::test]
    async fn test_embedding_outage_shows_unscored_and_counts() {
        let (store, ids) = seeded_store().await;
        let tool = tool_over(Arc::clone(&store), Arc::new(FailingEmbedder));

        let result = tool
            .execute(&json!({"question": "alpha"}).to_string())
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.contains("unscored"));
        assert!(!result.output.contains("similarity:"));

        // Fallback shows the first three in store order; those still count
        let usage: Vec<i64> = ids
            .iter()
            .map(|id| store.get_by_id(*id).unwrap().unwrap().usage_count)
            .collect();
        assert_eq!(usage, vec![1, 1, 1, 0]);
    }

    #[tokio::test]
    async fn test_subject_filter_narrows_recommendations() {
        let (store, _ids) = seeded_store().await;
        let tool = tool_over(Arc::clone(&store), Arc::new(StubEmbedder));

        let result = tool
            .execute(&json!({"question": "alpha", "subject": "english"}).to_string())
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.contains("No similar questions in the bank yet."));
    }

    #[tokio::test]
    async fn test_missing_question_is_hard_error() {
        let store = Arc::new(QuestionStore::in_memory().unwrap());
        let tool = tool_over(store, Arc::new(StubEmbedder));
        assert!(tool.execute(&json!({}).to_string()).await.is_err());
        assert!(
            tool.execute(&json!({"question": "  "}).to_string())
                .await
                .is_err()
        );
    }
}
