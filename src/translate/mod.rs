pub mod interface;
pub mod gemini;
pub mod openai_compatible;
pub mod factory;
pub mod pipeline;

pub use interface::*;
pub use factory::TranslatorFactory;
pub use pipeline::{TranslationPipeline, ERROR_PLACEHOLDER};
