//! # EduGenius Tools
//!
//! Agent-facing tools over the question bank. Each tool speaks the common
//! `Tool` trait: a JSON-schema definition for function calling, and an
//! `execute` that renders learner-ready text.

pub mod answer_tool;
pub mod bank_tool;
pub mod registry;

pub use answer_tool::AnswerWithPracticeTool;
pub use bank_tool::QuestionBankTool;

use std::sync::Arc;

use edugenius_bank::QuestionBank;
use edugenius_core::traits::{ChatModel, Tool};

/// Wire up the standard tool set over a shared bank and chat model.
pub fn default_tools(bank: Arc<QuestionBank>, chat: Arc<dyn ChatModel>) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(QuestionBankTool::new(Arc::clone(&bank))),
        Box::new(AnswerWithPracticeTool::new(bank, chat)),
    ]
}
