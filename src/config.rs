//! Configuration management for the costume overlay

use crate::constants::{
    COSTUME_SWITCH_COOLDOWN_FACTOR, DEFAULT_ARCHITECTURE, DEFAULT_ASSET_ROOT, DEFAULT_BUCKET_MS, DEFAULT_COSTUME_ID,
    DEFAULT_COVERING_GROUP_THRESHOLD, DEFAULT_IMAGE_SCALE_FACTOR, DEFAULT_LOOKBACK_MS, DEFAULT_MAX_POSE_DETECTIONS,
    DEFAULT_MIN_PART_CONFIDENCE, DEFAULT_MIN_POSE_CONFIDENCE, DEFAULT_NMS_RADIUS, DEFAULT_OUTPUT_STRIDE,
    DEFAULT_RETENTION_MARGIN_MS, SUPPORTED_OUTPUT_STRIDES,
};
use crate::pose_model::{validate_architecture, DetectionAlgorithm, PoseEstimationParams};
use crate::tuning::{CostumeCatalogue, TuningOverrides};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pose model configuration
    pub detection: DetectionConfig,

    /// Gesture timing configuration
    pub gesture: GestureConfig,

    /// Garment gating configuration
    pub visibility: VisibilityConfig,

    /// Output layer toggles
    pub output: OutputConfig,

    /// Costume selection and catalogue
    pub costumes: CostumeConfig,
}

/// Pose model parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Single or multi pose detection
    pub algorithm: DetectionAlgorithm,

    /// Model architecture name
    pub architecture: String,

    /// Model output stride (8, 16 or 32)
    pub output_stride: u32,

    /// Input downscale factor (0.2-1.0)
    pub image_scale_factor: f64,

    /// Ask the model for the horizontally flipped view
    pub flip_horizontal: bool,

    /// Minimum overall pose score (0.0-1.0)
    pub min_pose_confidence: f64,

    /// Minimum keypoint score for rendering and gestures (0.0-1.0)
    pub min_part_confidence: f64,

    /// Maximum number of poses in multi-pose mode
    pub max_pose_detections: usize,

    /// Non-maximum suppression radius in pixels
    pub nms_radius: f64,
}

/// Gesture history timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// History bucket size in milliseconds
    pub bucket_ms: u64,

    /// How far back gestures look, in milliseconds
    pub lookback_ms: u64,

    /// History kept beyond the lookback window, in milliseconds
    pub retention_margin_ms: u64,
}

/// Garment gating parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Body groups that must render for hat and mask to replace the face covering
    pub covering_group_threshold: usize,
}

/// Host output layers
///
/// The overlay core never draws; these flags are carried for the renderer
/// that consumes each tick's placements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Show the camera frame
    pub show_video: bool,

    /// Draw the detected skeleton
    pub show_skeleton: bool,

    /// Draw the detected keypoints
    pub show_points: bool,
}

/// Costume selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostumeConfig {
    /// Costume active at startup
    pub default_costume: String,

    /// Directory holding one image folder per costume
    pub asset_root: PathBuf,

    /// Per-costume tuning overrides
    pub catalogue: CostumeCatalogue,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            algorithm: DetectionAlgorithm::SinglePose,
            architecture: DEFAULT_ARCHITECTURE.to_string(),
            output_stride: DEFAULT_OUTPUT_STRIDE,
            image_scale_factor: DEFAULT_IMAGE_SCALE_FACTOR,
            flip_horizontal: true,
            min_pose_confidence: DEFAULT_MIN_POSE_CONFIDENCE,
            min_part_confidence: DEFAULT_MIN_PART_CONFIDENCE,
            max_pose_detections: DEFAULT_MAX_POSE_DETECTIONS,
            nms_radius: DEFAULT_NMS_RADIUS,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            bucket_ms: DEFAULT_BUCKET_MS,
            lookback_ms: DEFAULT_LOOKBACK_MS,
            retention_margin_ms: DEFAULT_RETENTION_MARGIN_MS,
        }
    }
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            covering_group_threshold: DEFAULT_COVERING_GROUP_THRESHOLD,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            show_video: true,
            show_skeleton: false,
            show_points: false,
        }
    }
}

impl Default for CostumeConfig {
    fn default() -> Self {
        let mut catalogue = CostumeCatalogue::new();
        catalogue.insert(DEFAULT_COSTUME_ID, TuningOverrides::default());
        Self {
            default_costume: DEFAULT_COSTUME_ID.to_string(),
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            catalogue,
        }
    }
}

impl GestureConfig {
    /// Lookback distance in buckets
    #[must_use]
    pub fn lookback_buckets(&self) -> u64 {
        if self.bucket_ms == 0 {
            0
        } else {
            self.lookback_ms / self.bucket_ms
        }
    }

    #[must_use]
    pub fn retention_ms(&self) -> u64 {
        self.lookback_ms + self.retention_margin_ms
    }

    #[must_use]
    pub fn costume_switch_cooldown_ms(&self) -> u64 {
        self.lookback_ms * COSTUME_SWITCH_COOLDOWN_FACTOR
    }
}

impl OutputConfig {
    /// Names of the layers the host should draw besides the garments
    #[must_use]
    pub fn enabled_layers(&self) -> Vec<&'static str> {
        [
            ("video", self.show_video),
            ("skeleton", self.show_skeleton),
            ("points", self.show_points),
        ]
        .into_iter()
        .filter_map(|(name, enabled)| enabled.then_some(name))
        .collect()
    }
}

impl DetectionConfig {
    /// Inference parameters for one model call
    #[must_use]
    pub fn estimation_params(&self) -> PoseEstimationParams {
        PoseEstimationParams {
            image_scale_factor: self.image_scale_factor,
            output_stride: self.output_stride,
            flip_horizontal: self.flip_horizontal,
            algorithm: self.algorithm,
            max_pose_detections: self.max_pose_detections,
            min_part_confidence: self.min_part_confidence,
            nms_radius: self.nms_radius,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::ConfigError`
    /// if it does not parse.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the text does not parse.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` on serialization failure and `Error::Io`
    /// if the file cannot be written.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        // Validate thresholds
        let unit = 0.0..=1.0;
        if !unit.contains(&self.detection.min_pose_confidence) {
            return Err(Error::ConfigError(
                "Minimum pose confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !unit.contains(&self.detection.min_part_confidence) {
            return Err(Error::ConfigError(
                "Minimum part confidence must be between 0.0 and 1.0".to_string(),
            ));
        }

        // Validate model parameters
        validate_architecture(&self.detection.architecture)?;
        if !SUPPORTED_OUTPUT_STRIDES.contains(&self.detection.output_stride) {
            return Err(Error::ConfigError(format!(
                "Output stride must be one of {SUPPORTED_OUTPUT_STRIDES:?}"
            )));
        }
        if !(0.2..=1.0).contains(&self.detection.image_scale_factor) {
            return Err(Error::ConfigError(
                "Image scale factor must be between 0.2 and 1.0".to_string(),
            ));
        }
        if self.detection.max_pose_detections == 0 {
            return Err(Error::ConfigError(
                "Maximum pose detections must be greater than 0".to_string(),
            ));
        }

        // Validate gesture timing
        if self.gesture.bucket_ms == 0 {
            return Err(Error::ConfigError("Bucket size must be greater than 0".to_string()));
        }
        if self.gesture.lookback_ms == 0 || self.gesture.lookback_ms % self.gesture.bucket_ms != 0 {
            return Err(Error::ConfigError(
                "Lookback must be a positive multiple of the bucket size".to_string(),
            ));
        }

        // Validate costumes
        let costumes = &self.costumes;
        if !costumes.catalogue.is_empty() && !costumes.catalogue.contains(&costumes.default_costume) {
            return Err(Error::ConfigError(format!(
                "Default costume {} is not in the catalogue",
                costumes.default_costume
            )));
        }
        for id in costumes.catalogue.ids() {
            costumes.catalogue.tuning_for(id)?.validate()?;
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Costume Overlay Configuration

# Pose model
detection:
  algorithm: "single-pose"
  architecture: "1.01"
  output_stride: 16
  image_scale_factor: 0.5
  flip_horizontal: true
  min_pose_confidence: 0.1
  min_part_confidence: 0.5
  max_pose_detections: 2
  nms_radius: 20.0

# Gesture timing (milliseconds)
gesture:
  bucket_ms: 10
  lookback_ms: 1000
  retention_margin_ms: 100

# Garment gating
visibility:
  covering_group_threshold: 2

# Output layers
output:
  show_video: true
  show_skeleton: false
  show_points: false

# Costumes; only declared keys override the built-in coefficients
costumes:
  default_costume: "1"
  asset_root: "img"
  catalogue:
    "1": {}
    "2":
      hat_x_factor: 1.8
      sleeve_width_factor: 1.2
    "3":
      shirt_y_factor: 0.6
"#;
