mod gemini;
mod mock_generator;

pub use gemini::{GeminiGenerator, GeminiSettings};
pub use mock_generator::MockGenerator;
