use async_trait::async_trait;
use std::sync::Mutex;

use crate::advisor::{GenerateText, GenerationError};

const DEFAULT_REPLY: &str = "Budget Blender 3000: A compact blender for everyday smoothies; \
     Thrifty Toaster: A two-slice toaster with a crumb tray; \
     Saver Kettle: An electric kettle with auto shut-off";

/// Answers every prompt with a fixed reply and records the prompts it was given.
pub struct MockGenerator {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::with_reply(DEFAULT_REPLY)
    }
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(reply: &str) -> Self {
        Self {
            reply: Some(String::from(reply)),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A generator whose every call fails, for exercising degraded paths.
    pub fn failing() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl GenerateText for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(String::from(prompt));
        }

        log::debug!("MockGenerator received prompt: {prompt}");

        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(GenerationError::RequestFailed(String::from(
                "Mock generator is set to fail",
            ))),
        }
    }
}
