//! Typed domain errors.

use thiserror::Error;

/// The system's only named domain error. Raised when a click target given
/// as an image has zero matches on the current screen; nothing catches it,
/// so it terminates the process through `main`.
#[derive(Debug, Error)]
pub enum CvError {
    #[error("无法找到图片 {0}")]
    ImageNotFound(String),
}
