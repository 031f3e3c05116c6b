pub mod archive;
pub mod config;
pub mod crawler;
pub mod error;
pub mod extractor;
pub mod logger;
pub mod manga;
pub mod session;
pub mod utils;
pub mod viewer;

pub use archive::Archive;
pub use config::Config;
pub use crawler::{DownloadSettings, MangaCrawler};
pub use error::{Error, Result};
pub use manga::{ChapterIndex, ChapterOutcome, DownloadSummary};
pub use session::Session;
pub use viewer::Viewer;
