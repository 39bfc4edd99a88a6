//! Mock backend for tests and local development.

use super::{GenerateParams, ModelError, VideoLanguageModel};
use async_trait::async_trait;
use std::path::Path;

/// Mock model that echoes the prompt it was given.
pub struct MockModel {
    enabled: bool,
}

impl MockModel {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl VideoLanguageModel for MockModel {
    async fn generate(
        &self,
        prompt: &str,
        video: Option<&Path>,
        _params: &GenerateParams,
    ) -> Result<String, ModelError> {
        if !self.enabled {
            return Err(ModelError::NotConfigured(
                "Mock model not enabled".to_string(),
            ));
        }

        // Simulate some processing
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        Ok(match video {
            Some(path) => format!("Mock response for: {} [video: {}]", prompt, path.display()),
            None => format!("Mock response for: {}", prompt),
        })
    }

    fn device(&self) -> String {
        "cpu".to_string()
    }
}
