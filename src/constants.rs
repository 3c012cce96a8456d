//! Constants used throughout the library

/// Default minimum keypoint confidence for rendering and gestures
pub const DEFAULT_MIN_PART_CONFIDENCE: f64 = 0.5;

/// Default minimum overall pose confidence
pub const DEFAULT_MIN_POSE_CONFIDENCE: f64 = 0.1;

/// Default multi-pose detection limits
pub const DEFAULT_MAX_POSE_DETECTIONS: usize = 2;
pub const DEFAULT_NMS_RADIUS: f64 = 20.0;

/// Default model input parameters
pub const DEFAULT_OUTPUT_STRIDE: u32 = 16;
pub const DEFAULT_IMAGE_SCALE_FACTOR: f64 = 0.5;
pub const DEFAULT_ARCHITECTURE: &str = "1.01";

/// Supported model architectures and output strides
pub const SUPPORTED_ARCHITECTURES: [&str; 4] = ["1.01", "1.00", "0.75", "0.50"];
pub const SUPPORTED_OUTPUT_STRIDES: [u32; 3] = [8, 16, 32];

/// History bucket size in milliseconds
pub const DEFAULT_BUCKET_MS: u64 = 10;

/// Gesture lookback window in milliseconds
pub const DEFAULT_LOOKBACK_MS: u64 = 1000;

/// Extra retention beyond the lookback window in milliseconds
pub const DEFAULT_RETENTION_MARGIN_MS: u64 = 100;

/// Costume switch cooldown as a multiple of the lookback window
pub const COSTUME_SWITCH_COOLDOWN_FACTOR: u64 = 2;

/// Number of other garment groups that must render for hat and mask to be used
pub const DEFAULT_COVERING_GROUP_THRESHOLD: usize = 2;

/// Smallest slope denominator magnitude
pub const SLOPE_EPSILON: f64 = 1e-6;

/// Hat coefficients
pub const HAT_X_FACTOR: f64 = 1.5;
pub const HAT_Y_FACTOR: f64 = 0.75;

/// Mask coefficients
pub const MASK_X_FACTOR: f64 = 0.5;
pub const MASK_Y_FACTOR: f64 = 0.45;

/// Shirt coefficients
pub const SHIRT_WIDTH_FACTOR: f64 = 1.0;
pub const SHIRT_Y_FACTOR: f64 = 0.5;

/// Sleeve coefficients
pub const SLEEVE_X_FACTOR: f64 = 2.0;
pub const SLEEVE_Y_FACTOR: f64 = 1.0;
pub const SLEEVE_WIDTH_FACTOR: f64 = 1.0;

/// Quarter turn applied to sleeve rotations
pub const SLEEVE_ROTATION_OFFSET_DEGREES: f64 = 90.0;

/// Pant leg coefficients
pub const PANT_LENGTH_FACTOR: f64 = 1.1;
pub const PANT_BIAS_DEGREES: f64 = 10.0;

/// Face covering ear padding factor
pub const COVERING_X_FACTOR: f64 = 0.5;

/// Default costume and asset layout
pub const DEFAULT_COSTUME_ID: &str = "1";
pub const DEFAULT_ASSET_ROOT: &str = "img";
pub const ASSET_EXTENSION: &str = "png";
