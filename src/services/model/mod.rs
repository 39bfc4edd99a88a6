//! Model backend abstraction.
//!
//! The generation model itself is an external collaborator: this crate
//! loads and invokes it through the [`VideoLanguageModel`] trait and never
//! implements any of the model internals.

pub mod mock;
pub mod runtime;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Error type for model backend operations.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Decoding knobs forwarded verbatim to the generation call.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GenerateParams {
    pub do_sample: bool,
    pub max_new_tokens: u32,
    pub top_p: f32,
    pub temperature: f32,
    pub use_cache: bool,
}

/// A loaded video-language model plus its input processor.
#[async_trait]
pub trait VideoLanguageModel: Send + Sync {
    /// Run one generation. `video` points at a local file the processor
    /// may sample frames from; the file outlives the call.
    async fn generate(
        &self,
        prompt: &str,
        video: Option<&Path>,
        params: &GenerateParams,
    ) -> Result<String, ModelError>;

    /// Compute device the model's weights reside on.
    fn device(&self) -> String;
}
