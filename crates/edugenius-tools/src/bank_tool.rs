//! Question bank tool — add, search, fetch, list, and retire questions.
//!
//! One tool, dispatched on an `operation` argument. Domain failures (bad
//! input, missing rows, a store that cannot be reached) come back as
//! unsuccessful `ToolResult`s so the calling agent can relay them;
//! `Err` is reserved for malformed tool calls.

use std::sync::Arc;

use async_trait::async_trait;
use edugenius_bank::QuestionBank;
use edugenius_core::error::{EduGeniusError, Result};
use edugenius_core::traits::Tool;
use edugenius_core::types::{
    Question, QuestionDraft, QuestionFilter, SearchResults, ToolDefinition, ToolResult,
};

pub(crate) const DEFAULT_SEARCH_LIMIT: usize = 5;
const DEFAULT_LIST_LIMIT: usize = 20;

pub struct QuestionBankTool {
    bank: Arc<QuestionBank>,
}

impl QuestionBankTool {
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        Self { bank }
    }
}

#[async_trait]
impl Tool for QuestionBankTool {
    fn name(&self) -> &str {
        "question_bank"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "question_bank".into(),
            description: "Manage the practice question bank: add questions, find similar questions by meaning, fetch or list stored questions, and retire outdated ones.".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "operation": {
                        "type": "string",
                        "enum": ["add", "search", "get", "list", "remove"],
                        "description": "Operation to perform"
                    },
                    "subject": {
                        "type": "string",
                        "description": "Subject, e.g. 'math' or 'english'"
                    },
                    "grade_level": {
                        "type": "string",
                        "description": "Grade level, e.g. 'grade-7'"
                    },
                    "difficulty": {
                        "type": "integer",
                        "description": "Difficulty 1-5 (1=easiest, 5=hardest)"
                    },
                    "question_type": {
                        "type": "string",
                        "enum": ["single_choice", "multiple_choice", "true_false",
                                 "fill_blank", "short_answer", "essay"],
                        "description": "Question format"
                    },
                    "topic": {
                        "type": "string",
                        "description": "Knowledge point, e.g. 'quadratic equations'"
                    },
                    "question_text": {
                        "type": "string",
                        "description": "The question itself (for add)"
                    },
                    "options": {
                        "type": "object",
                        "description": "Choice labels mapped to option texts, for choice questions"
                    },
                    "correct_answer": {
                        "type": "string",
                        "description": "The correct answer (for add)"
                    },
                    "explanation": {
                        "type": "string",
                        "description": "Worked solution shown after answering"
                    },
                    "tags": {
                        "type": "object",
                        "description": "Freeform labels attached to the question"
                    },
                    "query": {
                        "type": "string",
                        "description": "Text to find similar questions for (for search)"
                    },
                    "exclude_id": {
                        "type": "integer",
                        "description": "Question id to leave out of search results"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of results"
                    },
                    "id": {
                        "type": "integer",
                        "description": "Question id (for get and remove)"
                    }
                },
                "required": ["operation"]
            }),
        }
    }

    async fn execute(&self, arguments: &str) -> Result<ToolResult> {
        let args: serde_json::Value =
            serde_json::from_str(arguments).map_err(|e| EduGeniusError::Tool(e.to_string()))?;

        let operation = args["operation"]
            .as_str()
            .ok_or_else(|| EduGeniusError::Tool("Missing 'operation'".into()))?;

        match operation {
            "add" => {
                let draft: QuestionDraft = match serde_json::from_value(args.clone()) {
                    Ok(d) => d,
                    Err(e) => {
                        return Ok(ToolResult {
                            tool_call_id: String::new(),
                            output: format!("❌ Invalid question: {e}"),
                            success: false,
                        });
                    }
                };
                match self.bank.add_question(draft).await {
                    Ok(id) => Ok(ToolResult {
                        tool_call_id: String::new(),
                        output: format!("✅ Question #{id} added to the bank."),
                        success: true,
                    }),
                    Err(e) => {
                        tracing::warn!("⚠️ Could not add question: {e}");
                        Ok(ToolResult {
                            tool_call_id: String::new(),
                            output: format!("❌ {e}"),
                            success: false,
                        })
                    }
                }
            }

            "search" => {
                let Some(query) = args["query"].as_str().filter(|q| !q.trim().is_empty()) else {
                    return Ok(ToolResult {
                        tool_call_id: String::new(),
                        output: "❌ 'query' is required for search.".into(),
                        success: false,
                    });
                };
                let filter = filter_from_args(&args);
                let limit = args["limit"]
                    .as_u64()
                    .unwrap_or(DEFAULT_SEARCH_LIMIT as u64) as usize;

                match self.bank.search_similar(query, &filter, limit).await {
                    Ok(results) => Ok(render_search(&results)),
                    Err(e) => {
                        tracing::warn!("⚠️ Question search failed: {e}");
                        Ok(ToolResult {
                            tool_call_id: String::new(),
                            output: format!("❌ Search failed: {e}"),
                            success: false,
                        })
                    }
                }
            }

            "get" => {
                let Some(id) = args["id"].as_i64() else {
                    return Ok(ToolResult {
                        tool_call_id: String::new(),
                        output: "❌ 'id' is required for get.".into(),
                        success: false,
                    });
                };
                match self.bank.get_by_id(id) {
                    Ok(Some(q)) => Ok(ToolResult {
                        tool_call_id: String::new(),
                        output: question_detail(&q),
                        success: true,
                    }),
                    Ok(None) => Ok(ToolResult {
                        tool_call_id: String::new(),
                        output: format!("❌ Question #{id} not found."),
                        success: false,
                    }),
                    Err(e) => {
                        tracing::warn!("⚠️ Could not fetch question #{id}: {e}");
                        Ok(ToolResult {
                            tool_call_id: String::new(),
                            output: format!("❌ {e}"),
                            success: false,
                        })
                    }
                }
            }

            "list" => {
                let Some(subject) = args["subject"].as_str().filter(|s| !s.trim().is_empty())
                else {
                    return Ok(ToolResult {
                        tool_call_id: String::new(),
                        output: "❌ 'subject' is required for list.".into(),
                        success: false,
                    });
                };
                let grade_level = args["grade_level"].as_str();
                let difficulty = args["difficulty"].as_i64().map(|d| d as i32);
                let limit = args["limit"].as_u64().unwrap_or(DEFAULT_LIST_LIMIT as u64) as usize;

                match self.bank.list_by_subject(subject, grade_level, difficulty, limit) {
                    Ok(questions) if questions.is_empty() => Ok(ToolResult {
                        tool_call_id: String::new(),
                        output: format!("📚 No questions stored for '{subject}'."),
                        success: true,
                    }),
                    Ok(questions) => {
                        let mut out =
                            format!("📚 {} question(s) in {subject}:\n\n", questions.len());
                        for (i, q) in questions.iter().enumerate() {
                            out.push_str(&format!("{}. {}\n", i + 1, question_summary(q, None)));
                        }
                        Ok(ToolResult {
                            tool_call_id: String::new(),
                            output: out,
                            success: true,
                        })
                    }
                    Err(e) => {
                        tracing::warn!("⚠️ Could not list questions: {e}");
                        Ok(ToolResult {
                            tool_call_id: String::new(),
                            output: format!("❌ {e}"),
                            success: false,
                        })
                    }
                }
            }

            "remove" => {
                let Some(id) = args["id"].as_i64() else {
                    return Ok(ToolResult {
                        tool_call_id: String::new(),
                        output: "❌ 'id' is required for remove.".into(),
                        success: false,
                    });
                };
                match self.bank.soft_delete(id) {
                    Ok(true) => Ok(ToolResult {
                        tool_call_id: String::new(),
                        output: format!("🗑️ Question #{id} removed from circulation."),
                        success: true,
                    }),
                    Ok(false) => Ok(ToolResult {
                        tool_call_id: String::new(),
                        output: format!("❌ Question #{id} not found."),
                        success: false,
                    }),
                    Err(e) => {
                        tracing::warn!("⚠️ Could not remove question #{id}: {e}");
                        Ok(ToolResult {
                            tool_call_id: String::new(),
                            output: format!("❌ {e}"),
                            success: false,
                        })
                    }
                }
            }

            _ => Err(EduGeniusError::Tool(format!(
                "Unknown operation: {operation}"
            ))),
        }
    }
}

pub(crate) fn filter_from_args(args: &serde_json::Value) -> QuestionFilter {
    QuestionFilter {
        subject: args["subject"].as_str().map(String::from),
        grade_level: args["grade_level"].as_str().map(String::from),
        difficulty: args["difficulty"].as_i64().map(|d| d as i32),
        topic: args["topic"].as_str().map(String::from),
        exclude_id: args["exclude_id"].as_i64(),
    }
}

fn render_search(results: &SearchResults) -> ToolResult {
    if results.is_empty() {
        return ToolResult {
            tool_call_id: String::new(),
            output: "🔍 No similar questions found.".into(),
            success: true,
        };
    }

    let mut out = match results {
        SearchResults::Ranked(hits) => {
            format!("🔍 Found {} similar question(s):\n\n", hits.len())
        }
        SearchResults::Unranked(questions) => format!(
            "⚠️ Similarity scoring unavailable — showing {} unscored match(es):\n\n",
            questions.len()
        ),
    };
    for (i, (question, similarity)) in results.hits().into_iter().enumerate() {
        out.push_str(&format!(
            "{}. {}\n",
            i + 1,
            question_summary(question, similarity)
        ));
    }
    ToolResult {
        tool_call_id: String::new(),
        output: out,
        success: true,
    }
}

/// One-line rendering shared by search, list, and recommendations.
pub(crate) fn question_summary(q: &Question, similarity: Option<f32>) -> String {
    let stars = "⭐".repeat(q.difficulty.clamp(1, 5) as usize);
    let mut line = format!(
        "#{} [{} {}] {}",
        q.id,
        q.subject,
        stars,
        truncate_chars(&q.question_text, 80)
    );
    if let Some(s) = similarity {
        line.push_str(&format!(" (similarity: {s:.2}%)"));
    }
    line
}

fn question_detail(q: &Question) -> String {
    let mut out = format!("📋 Question #{}\n", q.id);
    out.push_str(&format!("Subject: {}", q.subject));
    if let Some(grade) = &q.grade_level {
        out.push_str(&format!(" / {grade}"));
    }
    out.push('\n');
    out.push_str(&format!(
        "Type: {} • Difficulty: {} • Used {} time(s)\n",
        q.question_type,
        "⭐".repeat(q.difficulty.clamp(1, 5) as usize),
        q.usage_count
    ));
    if let Some(topic) = &q.topic {
        out.push_str(&format!("Topic: {topic}\n"));
    }
    out.push_str(&format!("\n{}\n", q.question_text));
    if let Some(options) = &q.options {
        out.push_str("\nOptions:\n");
        for (label, text) in options {
            let text = text.as_str().map(String::from).unwrap_or_else(|| text.to_string());
            out.push_str(&format!("  {label}. {text}\n"));
        }
    }
    out.push_str(&format!("\nAnswer: {}\n", q.correct_answer));
    if let Some(explanation) = &q.explanation {
        out.push_str(&format!("Explanation: {explanation}\n"));
    }
    if let Some(tags) = &q.tags {
        out.push_str(&format!(
            "Tags: {}\n",
            serde_json::Value::Object(tags.clone())
        ));
    }
    out.push_str(&format!("Added: {}\n", q.created_at.to_rfc3339()));
    out
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}
