use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use vlm_service::config::{
    BackendKind, CommonConfig, FetcherConfig, ModelConfig, ServiceConfig,
};
use vlm_service::services::model::{GenerateParams, ModelError, VideoLanguageModel};
use vlm_service::services::ModelSession;
use vlm_service::startup::Application;

pub struct TestApp {
    pub address: String,
    pub temp_dir: PathBuf,
}

impl TestApp {
    /// Spawn the service with the given session on a random port.
    pub async fn spawn(session: ModelSession) -> Self {
        let temp_dir = PathBuf::from(format!("target/test-videos-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&temp_dir)
            .await
            .expect("Failed to create test temp dir");

        let config = ServiceConfig {
            common: CommonConfig { port: 0 },
            model: ModelConfig {
                model_id: "test-model".to_string(),
                max_frames: 8,
                backend: BackendKind::Mock,
                runtime_url: None,
            },
            fetcher: FetcherConfig {
                temp_dir: temp_dir.clone(),
            },
        };

        let app = Application::build(config, Arc::new(session))
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, temp_dir }
    }

    /// Number of files currently staged in this app's temp dir.
    pub async fn staged_video_count(&self) -> usize {
        let mut count = 0;
        let mut entries = tokio::fs::read_dir(&self.temp_dir)
            .await
            .expect("Failed to read test temp dir");
        while let Some(_entry) = entries.next_entry().await.expect("Failed to read dir entry") {
            count += 1;
        }
        count
    }

    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.temp_dir).await;
    }
}

/// One generation call observed by [`RecordingModel`].
pub struct RecordedCall {
    pub prompt: String,
    pub video_path: Option<PathBuf>,
    pub video_existed: bool,
    pub params: GenerateParams,
}

/// Test backend that records every call it receives.
#[derive(Default)]
pub struct RecordingModel {
    pub calls: Mutex<Vec<RecordedCall>>,
    pub fail: bool,
}

impl RecordingModel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        })
    }
}

#[async_trait]
impl VideoLanguageModel for RecordingModel {
    async fn generate(
        &self,
        prompt: &str,
        video: Option<&Path>,
        params: &GenerateParams,
    ) -> Result<String, ModelError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            video_path: video.map(|p| p.to_path_buf()),
            video_existed: video.map(|p| p.exists()).unwrap_or(false),
            params: params.clone(),
        });

        if self.fail {
            return Err(ModelError::Runtime("generation blew up".to_string()));
        }

        Ok(format!("generated for: {}", prompt))
    }

    fn device(&self) -> String {
        "cuda:0".to_string()
    }
}

#[derive(Clone)]
struct FixtureState {
    hits: Arc<AtomicUsize>,
}

/// Local HTTP server handing out video bytes for download tests.
pub struct VideoFixture {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl VideoFixture {
    pub async fn spawn() -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let state = FixtureState { hits: hits.clone() };

        let router = Router::new()
            .route("/clip.mp4", get(serve_clip))
            .route("/empty.mp4", get(serve_empty))
            .route("/missing.mp4", get(serve_missing))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fixture listener");
        let base_url = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());

        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        VideoFixture { base_url, hits }
    }

    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn serve_clip(State(state): State<FixtureState>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    (StatusCode::OK, vec![0u8; 4096])
}

async fn serve_empty(State(state): State<FixtureState>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    (StatusCode::OK, Vec::<u8>::new())
}

async fn serve_missing(State(state): State<FixtureState>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::NOT_FOUND
}
