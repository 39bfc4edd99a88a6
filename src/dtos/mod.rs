use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /generate`.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateRequest {
    pub instruction: String,

    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,

    #[serde(default)]
    pub do_sample: bool,

    #[serde(default)]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[validate(url(message = "video_url must be a well-formed URL"))]
    pub video_url: Option<String>,
}

fn default_max_new_tokens() -> u32 {
    512
}

fn default_top_p() -> f32 {
    1.0
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub generated_text: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub device: String,
}
