pub mod model;
pub mod session;
pub mod video_fetcher;

pub use session::ModelSession;
pub use video_fetcher::{TempVideo, VideoFetcher};
