//! Error types for the costume overlay library.

use crate::geometry::Garment;
use crate::keypoint::BodyPart;
use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// The pose model returned no subject for this tick
    #[error("No pose detected")]
    NoPoseDetected,

    /// A body part required by a computation is absent from the frame
    #[error("Missing keypoint: {0}")]
    MissingKeypoint(BodyPart),

    /// The pose model reported a part name outside the known set
    #[error("Unknown body part: {0}")]
    UnknownPart(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A placement computation produced a non-finite value
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// No image registered for a garment of the given costume
    #[error("No asset for garment {garment} of costume {costume}")]
    MissingAsset {
        /// Costume id that was queried
        costume: String,
        /// Garment that was queried
        garment: Garment,
    },

    /// Costume id not present in the catalogue
    #[error("Unknown costume: {0}")]
    UnknownCostume(String),

    /// Pose model loading or inference error
    #[error("Model error: {0}")]
    ModelError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Garment image could not be read
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Pose record decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
