//! Pose model collaborator interface.
//!
//! The overlay never runs inference itself. A [`PoseModel`] returns the raw
//! pose records for the current camera frame and a [`PoseModelLoader`] builds
//! one for a named architecture. [`ReplayPoseModel`] plays back a JSON-lines
//! recording, one result array per line.

use crate::constants::{
    DEFAULT_IMAGE_SCALE_FACTOR, DEFAULT_MAX_POSE_DETECTIONS, DEFAULT_MIN_PART_CONFIDENCE, DEFAULT_NMS_RADIUS,
    DEFAULT_OUTPUT_STRIDE, SUPPORTED_ARCHITECTURES,
};
use crate::keypoint::RawPose;
use crate::{Error, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::io::BufRead;
use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;

/// Whether the model looks for one subject or several
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionAlgorithm {
    #[default]
    SinglePose,
    MultiPose,
}

impl fmt::Display for DetectionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionAlgorithm::SinglePose => f.write_str("single-pose"),
            DetectionAlgorithm::MultiPose => f.write_str("multi-pose"),
        }
    }
}

impl FromStr for DetectionAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "single-pose" => Ok(DetectionAlgorithm::SinglePose),
            "multi-pose" => Ok(DetectionAlgorithm::MultiPose),
            other => Err(Error::ConfigError(format!("Unknown detection algorithm: {other}"))),
        }
    }
}

/// Per-call inference parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseEstimationParams {
    pub image_scale_factor: f64,
    pub output_stride: u32,
    /// Request the horizontally flipped view
    pub flip_horizontal: bool,
    pub algorithm: DetectionAlgorithm,
    pub max_pose_detections: usize,
    pub min_part_confidence: f64,
    pub nms_radius: f64,
}

impl Default for PoseEstimationParams {
    fn default() -> Self {
        Self {
            image_scale_factor: DEFAULT_IMAGE_SCALE_FACTOR,
            output_stride: DEFAULT_OUTPUT_STRIDE,
            flip_horizontal: true,
            algorithm: DetectionAlgorithm::SinglePose,
            max_pose_detections: DEFAULT_MAX_POSE_DETECTIONS,
            min_part_confidence: DEFAULT_MIN_PART_CONFIDENCE,
            nms_radius: DEFAULT_NMS_RADIUS,
        }
    }
}

/// A loaded pose estimation model
pub trait PoseModel {
    /// Estimate poses in the current frame; an empty result means no subject
    ///
    /// # Errors
    ///
    /// Returns `Error::ModelError` if inference fails.
    fn estimate(&mut self, params: &PoseEstimationParams) -> Result<Vec<RawPose>>;

    /// Release model resources; the model is not used afterwards
    fn dispose(&mut self);
}

/// Builds models by architecture name
pub trait PoseModelLoader {
    /// # Errors
    ///
    /// Returns `Error::ModelError` if the model cannot be loaded.
    fn load(&self, architecture: &str) -> Result<Box<dyn PoseModel>>;
}

/// Reject architecture names the model family does not ship
///
/// # Errors
///
/// Returns `Error::ConfigError` for an unsupported name.
pub fn validate_architecture(architecture: &str) -> Result<()> {
    if SUPPORTED_ARCHITECTURES.contains(&architecture) {
        Ok(())
    } else {
        Err(Error::ConfigError(format!(
            "Unsupported architecture {architecture}, expected one of {SUPPORTED_ARCHITECTURES:?}"
        )))
    }
}

/// Plays back recorded pose model results in order
///
/// Handles made by [`ReplayPoseModel::handle`] share the playback position,
/// so a model reloaded mid-stream continues where the previous one stopped.
#[derive(Debug, Clone, Default)]
pub struct ReplayPoseModel {
    frames: Rc<Vec<Vec<RawPose>>>,
    cursor: Rc<Cell<usize>>,
    disposed: bool,
}

impl ReplayPoseModel {
    #[must_use]
    pub fn new(frames: Vec<Vec<RawPose>>) -> Self {
        Self {
            frames: Rc::new(frames),
            cursor: Rc::new(Cell::new(0)),
            disposed: false,
        }
    }

    /// Parse a JSON-lines recording; blank lines are empty results
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` on read failure and `Error::Json` on a malformed line.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut frames = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                frames.push(Vec::new());
            } else {
                frames.push(serde_json::from_str(trimmed)?);
            }
        }
        debug!("Parsed {} recorded frames", frames.len());
        Ok(Self::new(frames))
    }

    /// # Errors
    ///
    /// Same as [`ReplayPoseModel::from_reader`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// A fresh, undisposed model sharing this recording and position
    #[must_use]
    pub fn handle(&self) -> Self {
        Self {
            frames: Rc::clone(&self.frames),
            cursor: Rc::clone(&self.cursor),
            disposed: false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Recorded frames not yet played
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frames.len().saturating_sub(self.cursor.get())
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl PoseModel for ReplayPoseModel {
    fn estimate(&mut self, params: &PoseEstimationParams) -> Result<Vec<RawPose>> {
        if self.disposed {
            return Err(Error::ModelError("Model has been disposed".to_string()));
        }
        let index = self.cursor.get();
        let Some(frame) = self.frames.get(index) else {
            return Ok(Vec::new());
        };
        self.cursor.set(index + 1);
        let limit = match params.algorithm {
            DetectionAlgorithm::SinglePose => 1,
            DetectionAlgorithm::MultiPose => params.max_pose_detections,
        };
        Ok(frame.iter().take(limit).cloned().collect())
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }
}

/// Loader handing out the same recording for every supported architecture
#[derive(Debug, Clone, Default)]
pub struct ReplayLoader {
    recording: ReplayPoseModel,
}

impl ReplayLoader {
    #[must_use]
    pub fn new(recording: ReplayPoseModel) -> Self {
        Self { recording }
    }

    /// Frames left to hand out
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.recording.remaining()
    }
}

impl PoseModelLoader for ReplayLoader {
    fn load(&self, architecture: &str) -> Result<Box<dyn PoseModel>> {
        validate_architecture(architecture).map_err(|e| Error::ModelError(e.to_string()))?;
        info!("Loading replay model for architecture {architecture}");
        Ok(Box::new(self.recording.handle()))
    }
}
