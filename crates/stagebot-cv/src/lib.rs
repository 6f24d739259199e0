//! Stagebot Computer Vision Layer
//!
//! Wraps the OpenCV template-matching primitive, the live screen source,
//! and the reference-image library behind small seams the engine polls.

pub mod assets;
pub mod convert;
pub mod error;
pub mod matcher;
pub mod screen;

// Re-export commonly used types
pub use assets::AssetLibrary;
pub use error::CvError;
pub use matcher::{MatchConfig, Matcher};
pub use screen::{LiveScreen, ScreenSource};

// Error handling
pub type Result<T> = anyhow::Result<T>;
