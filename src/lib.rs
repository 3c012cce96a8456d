//! Costume overlay library for dressing a tracked person in garment images.
//!
//! This library turns per-frame body keypoints from a pose model into:
//! - Placement transforms for hat, mask, shirt, sleeves and pant legs
//! - Confidence gating of garment groups
//! - Raised-arm gesture recognition over a one second lookback
//!
//! The overlay pipeline consists of:
//! 1. Pose estimation by an external model, replayed or live
//! 2. Ingestion of the tracked subject into a keypoint frame
//! 3. Garment placement for every group that passes the confidence gate
//! 4. Gesture classification against the frame one lookback window ago
//!
//! # Examples
//!
//! ## Placing a Garment
//!
//! ```
//! use costume_overlay::assets::AssetSize;
//! use costume_overlay::geometry::{compute_placement, Garment};
//! use costume_overlay::keypoint::{BodyPart, Keypoint, KeypointFrame};
//! use costume_overlay::tuning::GarmentTuning;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let frame = KeypointFrame::from_parts(
//!     0.9,
//!     [
//!         (BodyPart::LeftHip, Keypoint::new(280.0, 380.0, 0.9)),
//!         (BodyPart::LeftKnee, Keypoint::new(270.0, 480.0, 0.9)),
//!     ],
//! );
//!
//! let placement = compute_placement(
//!     Garment::LeftPant,
//!     &frame,
//!     &GarmentTuning::default(),
//!     AssetSize::new(60.0, 200.0),
//! )?;
//! println!("Left pant at {:?}, rotated {:.1}°", placement.anchor(), placement.rotation_degrees);
//! # Ok(())
//! # }
//! ```
//!
//! ## Running a Session
//!
//! ```no_run
//! use costume_overlay::assets::{AssetSize, StaticAssetRegistry};
//! use costume_overlay::config::Config;
//! use costume_overlay::pose_model::{ReplayLoader, ReplayPoseModel};
//! use costume_overlay::session::OverlaySession;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_file("overlay.yaml")?;
//! let recording = ReplayPoseModel::from_file("poses.jsonl")?;
//! let assets = StaticAssetRegistry::new().with_uniform("1", AssetSize::new(200.0, 200.0));
//!
//! let mut session = OverlaySession::new(config, Box::new(ReplayLoader::new(recording)), Box::new(assets))?;
//! for tick in 0..300u64 {
//!     let output = session.tick(tick * 33);
//!     if let Some(action) = output.action {
//!         println!("Gesture action: {:?}", action);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Keypoints, frames and pose-model record ingestion
pub mod keypoint;

/// Garment placement geometry
pub mod geometry;

/// Per-costume geometry coefficients
pub mod tuning;

/// Confidence gating of garment groups
pub mod visibility;

/// Time-bucketed frame history
pub mod history;

/// Raised-arm gesture recognition
pub mod gesture;

/// Pose model traits and recorded playback
pub mod pose_model;

/// Garment image sizes and paths
pub mod assets;

/// Per-frame overlay driver
pub mod session;

/// Error types and result handling
pub mod error;

/// Constants used throughout the library
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
