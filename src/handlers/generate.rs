use crate::dtos::{GenerateRequest, GenerateResponse};
use crate::error::AppError;
use crate::services::model::GenerateParams;
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use validator::Validate;

/// Marker token the processor expects at the head of a video prompt.
const VIDEO_MARKER: &str = "<video>";
const IMAGE_MARKER: &str = "<image>";

pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    request.validate()?;

    let Some(loaded) = state.session.loaded() else {
        return Err(AppError::ModelNotLoaded);
    };

    let params = GenerateParams {
        do_sample: request.do_sample,
        max_new_tokens: request.max_new_tokens,
        top_p: request.top_p,
        temperature: request.temperature,
        use_cache: true,
    };

    // The guard holds the temp file for the duration of the generation
    // call; dropping it on handler exit removes the file on success and
    // on every error path alike.
    let (prompt, video) = match &request.video_url {
        Some(url) => {
            let video = state.fetcher.fetch(url).await?;
            video.ensure_non_empty().await?;

            tracing::info!(
                model_id = %loaded.model_id,
                video_path = ?video.path(),
                "Processing video generation request"
            );

            (video_prompt(&request.instruction), Some(video))
        }
        None => {
            tracing::info!(model_id = %loaded.model_id, "Processing text generation request");
            (request.instruction.clone(), None)
        }
    };

    let generated_text = loaded
        .model
        .generate(&prompt, video.as_ref().map(|v| v.path()), &params)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Generation failed");
            AppError::Inference(e.to_string())
        })?;

    Ok(Json(GenerateResponse {
        generated_text,
        status: "success".to_string(),
    }))
}

/// Normalize a video prompt: strip any marker tokens the caller embedded,
/// then prepend the single leading video marker.
fn video_prompt(instruction: &str) -> String {
    let stripped = instruction
        .replace(IMAGE_MARKER, "")
        .replace(VIDEO_MARKER, "");
    format!("{}\n{}", VIDEO_MARKER, stripped)
}
