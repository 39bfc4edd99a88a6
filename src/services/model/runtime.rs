//! HTTP binding to the external model runtime.
//!
//! The runtime process owns the actual model weights and processor; this
//! binding forwards prompts (and the staged video file, when present) and
//! returns the generated text.

use super::{GenerateParams, ModelError, VideoLanguageModel};
use crate::config::ModelConfig;
use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;

/// Handle to a model loaded in the external runtime.
pub struct RuntimeModel {
    client: Client,
    base_url: String,
    model_id: String,
    device: String,
}

/// Runtime metadata reported at load time.
#[derive(Debug, Deserialize)]
struct RuntimeInfo {
    model_id: String,
    device: String,
}

#[derive(Debug, Deserialize)]
struct RuntimeGenerateResponse {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
struct RuntimeErrorBody {
    detail: String,
}

impl RuntimeModel {
    /// Connect to the runtime and instruct it to load the model and
    /// processor. Fails if the runtime is unreachable or reports a
    /// different model than requested.
    pub async fn connect(config: &ModelConfig) -> Result<Self, ModelError> {
        let base_url = config
            .runtime_url
            .clone()
            .ok_or_else(|| {
                ModelError::NotConfigured("runtime backend requires a runtime URL".to_string())
            })?
            .trim_end_matches('/')
            .to_string();

        // Generation is long-running and has no per-request deadline;
        // the client timeout only bounds a wedged connection.
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| ModelError::NotConfigured(e.to_string()))?;

        let response = client
            .post(format!("{}/load", base_url))
            .json(&serde_json::json!({
                "model_id": config.model_id,
                "max_n_frames": config.max_frames,
            }))
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ModelError::Runtime(format!(
                "runtime load failed with status {}",
                response.status()
            )));
        }

        let info: RuntimeInfo = response
            .json()
            .await
            .map_err(|e| ModelError::Runtime(format!("invalid runtime load response: {}", e)))?;

        tracing::info!(
            model_id = %info.model_id,
            device = %info.device,
            max_frames = config.max_frames,
            "Model runtime ready"
        );

        Ok(Self {
            client,
            base_url,
            model_id: info.model_id,
            device: info.device,
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/generate", self.base_url)
    }
}

#[async_trait]
impl VideoLanguageModel for RuntimeModel {
    async fn generate(
        &self,
        prompt: &str,
        video: Option<&Path>,
        params: &GenerateParams,
    ) -> Result<String, ModelError> {
        let params_json = serde_json::to_string(params)
            .map_err(|e| ModelError::Runtime(format!("failed to encode params: {}", e)))?;

        let mut form = multipart::Form::new()
            .text("model_id", self.model_id.clone())
            .text("prompt", prompt.to_string())
            .text("params", params_json);

        if let Some(path) = video {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("video")
                .to_string();
            let data = tokio::fs::read(path).await?;
            form = form.part(
                "video",
                multipart::Part::bytes(data).file_name(file_name),
            );
        }

        tracing::debug!(
            prompt_len = prompt.len(),
            has_video = video.is_some(),
            max_new_tokens = params.max_new_tokens,
            "Forwarding generation to model runtime"
        );

        let response = self
            .client
            .post(self.generate_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response
                .json::<RuntimeErrorBody>()
                .await
                .map(|b| b.detail)
                .unwrap_or_else(|_| format!("runtime returned status {}", status));
            return Err(ModelError::Runtime(detail));
        }

        let body: RuntimeGenerateResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Runtime(format!("invalid runtime response: {}", e)))?;

        Ok(body.generated_text)
    }

    fn device(&self) -> String {
        self.device.clone()
    }
}
