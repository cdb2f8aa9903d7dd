pub mod interface;
pub mod adapter;
pub mod client;

pub use interface::*;
pub use adapter::{DictationAdapter, DictationUpdate};
pub use client::ClientSpeechCapability;
