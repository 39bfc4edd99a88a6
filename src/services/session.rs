//! Process-wide model session.
//!
//! Loaded once during startup and immutable afterwards; handlers receive
//! it through `AppState` rather than a global.

use crate::config::{BackendKind, ModelConfig};
use crate::error::AppError;
use crate::services::model::mock::MockModel;
use crate::services::model::runtime::RuntimeModel;
use crate::services::model::VideoLanguageModel;
use std::sync::Arc;

/// Allocator toggle inherited by the model runtime. Expandable segments
/// keep long-lived CUDA allocations from fragmenting under large models.
const ALLOC_CONF_VAR: &str = "PYTORCH_CUDA_ALLOC_CONF";
const ALLOC_CONF_VALUE: &str = "expandable_segments:True";

pub struct ModelSession {
    loaded: Option<LoadedModel>,
}

pub struct LoadedModel {
    pub model: Arc<dyn VideoLanguageModel>,
    pub model_id: String,
}

impl ModelSession {
    /// Session with no model, as seen by requests arriving before
    /// startup completes.
    pub fn empty() -> Self {
        Self { loaded: None }
    }

    /// Session wrapping an already-constructed backend (test harnesses).
    pub fn with_model(model: Arc<dyn VideoLanguageModel>, model_id: impl Into<String>) -> Self {
        Self {
            loaded: Some(LoadedModel {
                model,
                model_id: model_id.into(),
            }),
        }
    }

    /// Load the configured backend. Called exactly once per process;
    /// a failure here is fatal and the process must not serve traffic.
    pub async fn load(config: &ModelConfig) -> Result<Self, AppError> {
        std::env::set_var(ALLOC_CONF_VAR, ALLOC_CONF_VALUE);

        tracing::info!(
            model_id = %config.model_id,
            max_frames = config.max_frames,
            backend = ?config.backend,
            "Loading model and processor"
        );

        let model: Arc<dyn VideoLanguageModel> = match config.backend {
            BackendKind::Runtime => Arc::new(
                RuntimeModel::connect(config)
                    .await
                    .map_err(|e| AppError::Config(anyhow::anyhow!("model load failed: {}", e)))?,
            ),
            BackendKind::Mock => Arc::new(MockModel::new(true)),
        };

        tracing::info!(device = %model.device(), "Model and processor loaded");

        Ok(Self::with_model(model, config.model_id.clone()))
    }

    pub fn loaded(&self) -> Option<&LoadedModel> {
        self.loaded.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }
}
