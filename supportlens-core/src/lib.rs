pub mod analytics;
pub mod chat;
pub mod classifier;
pub mod completions;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod store;

pub use chat::ChatReply;
pub use completions::{
    AnthropicClient, AnthropicConfig, CompletionBackend, CompletionError, ANTHROPIC_VERSION,
};
pub use config::SupportLensConfig;
pub use error::SupportLensError;
pub use models::{Analytics, Category, CategoryStat, NewTrace, Trace};
