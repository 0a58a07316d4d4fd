pub mod generators;

use async_trait::async_trait;
use std::fmt;

use crate::report::{summary_text, PurposeTotal};

#[derive(Debug)]
pub enum GenerationError {
    RequestFailed(String),
    BadStatus(u16, String),
    EmptyResponse,
    Blocked(String),
}

impl std::error::Error for GenerationError {}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::RequestFailed(e) => {
                write!(f, "GenerationError: Request failed: {e}")
            }
            GenerationError::BadStatus(status, body) => {
                write!(f, "GenerationError: Service returned status {status}: {body}")
            }
            GenerationError::EmptyResponse => {
                write!(f, "GenerationError: Service returned no text")
            }
            GenerationError::Blocked(reason) => {
                write!(f, "GenerationError: Prompt was blocked: {reason}")
            }
        }
    }
}

/// A single-turn text completion. Implementations keep no conversation history between calls.
#[async_trait]
pub trait GenerateText: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

pub fn savings_advice_prompt(summary: &[PurposeTotal]) -> String {
    format!(
        "Given the following spending details: {}, what should I cut spending on? I don't want \
         a personalized response saying it's based on my priorities. I simply want a straight \
         answer on if I wanted to save money, ideally what could I cut on?",
        summary_text(summary),
    )
}

/// Asks the generator for savings advice on a spending summary. The reply is returned as-is,
/// minus surrounding whitespace.
pub async fn savings_advice(
    generator: &dyn GenerateText,
    summary: &[PurposeTotal],
) -> Result<String, GenerationError> {
    let reply = generator.generate(&savings_advice_prompt(summary)).await?;
    let reply = reply.trim();

    if reply.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    Ok(String::from(reply))
}
