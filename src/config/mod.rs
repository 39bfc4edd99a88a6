use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub common: CommonConfig,
    pub model: ModelConfig,
    pub fetcher: FetcherConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommonConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Identifier passed to the model runtime at load time.
    pub model_id: String,
    /// Upper bound on video frames sampled per request by the runtime.
    pub max_frames: u32,
    pub backend: BackendKind,
    /// Base URL of the model runtime; required for the `runtime` backend.
    pub runtime_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Directory downloaded videos are staged in.
    pub temp_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Runtime,
    Mock,
}

fn default_port() -> u16 {
    8000
}

impl ServiceConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        // Common settings come from the layered config sources; the
        // model/fetcher settings use plain env lookups so prod-required
        // semantics stay explicit.
        let common: CommonConfig = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()?;

        let backend: BackendKind = get_env("APP__MODEL__BACKEND", Some("runtime"), is_prod)?
            .parse()
            .map_err(|e: String| AppError::Config(anyhow::anyhow!(e)))?;

        let runtime_url = match backend {
            BackendKind::Runtime => Some(get_env("APP__MODEL__RUNTIME_URL", None, is_prod)?),
            BackendKind::Mock => env::var("APP__MODEL__RUNTIME_URL").ok(),
        };

        Ok(ServiceConfig {
            common,
            model: ModelConfig {
                model_id: get_env(
                    "APP__MODEL__MODEL_ID",
                    Some("omni-research/Tarsier-34b"),
                    is_prod,
                )?,
                max_frames: get_env("APP__MODEL__MAX_FRAMES", Some("8"), is_prod)?
                    .parse()
                    .map_err(|e| {
                        AppError::Config(anyhow::anyhow!("Invalid APP__MODEL__MAX_FRAMES: {}", e))
                    })?,
                backend,
                runtime_url,
            },
            fetcher: FetcherConfig {
                temp_dir: env::var("APP__FETCHER__TEMP_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| env::temp_dir()),
            },
        })
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "runtime" => Ok(BackendKind::Runtime),
            "mock" => Ok(BackendKind::Mock),
            _ => Err(format!("Invalid model backend: {}", s)),
        }
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::Config(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::Config(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}
