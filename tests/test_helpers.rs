//! Helper functions and utilities for tests

#![allow(dead_code)]

use costume_overlay::assets::{AssetSize, StaticAssetRegistry};
use costume_overlay::config::Config;
use costume_overlay::geometry::GarmentPlacement;
use costume_overlay::keypoint::{BodyPart, Keypoint, KeypointFrame, RawKeypoint, RawPose, RawPosition};
use costume_overlay::pose_model::{PoseEstimationParams, PoseModel, PoseModelLoader, ReplayLoader, ReplayPoseModel};
use costume_overlay::session::OverlaySession;
use costume_overlay::{Error, Result};
use std::cell::RefCell;
use std::rc::Rc;

/// Canvas width the fixtures are laid out on
pub const CANVAS_WIDTH: f64 = 640.0;

/// Tick spacing that lands every tick on a bucket boundary
pub const TICK_MS: u64 = 100;

/// Keypoint with a comfortable confidence
pub fn kp(x: f64, y: f64) -> Keypoint {
    Keypoint::new(x, y, 0.9)
}

/// Subject standing square to the camera, arms hanging, in the flipped view
pub fn upright_frame() -> KeypointFrame {
    KeypointFrame::from_parts(
        0.9,
        [
            (BodyPart::Nose, kp(320.0, 120.0)),
            (BodyPart::LeftEye, kp(305.0, 105.0)),
            (BodyPart::RightEye, kp(335.0, 105.0)),
            (BodyPart::LeftEar, kp(285.0, 110.0)),
            (BodyPart::RightEar, kp(355.0, 110.0)),
            (BodyPart::LeftShoulder, kp(260.0, 200.0)),
            (BodyPart::RightShoulder, kp(380.0, 200.0)),
            (BodyPart::LeftElbow, kp(250.0, 290.0)),
            (BodyPart::RightElbow, kp(390.0, 290.0)),
            (BodyPart::LeftWrist, kp(245.0, 370.0)),
            (BodyPart::RightWrist, kp(395.0, 370.0)),
            (BodyPart::LeftHip, kp(280.0, 380.0)),
            (BodyPart::RightHip, kp(360.0, 380.0)),
            (BodyPart::LeftKnee, kp(270.0, 480.0)),
            (BodyPart::RightKnee, kp(370.0, 480.0)),
            (BodyPart::LeftAnkle, kp(265.0, 580.0)),
            (BodyPart::RightAnkle, kp(375.0, 580.0)),
        ],
    )
}

/// Same frame with one part's confidence replaced
pub fn with_confidence(frame: KeypointFrame, part: BodyPart, confidence: f64) -> KeypointFrame {
    let Some(keypoint) = frame.get(part).copied() else {
        return frame;
    };
    frame.with_part(part, Keypoint::new(keypoint.x, keypoint.y, confidence))
}

/// Pose-model record for a frame
pub fn to_raw(frame: &KeypointFrame) -> RawPose {
    RawPose {
        score: frame.score(),
        keypoints: frame
            .iter()
            .map(|(part, keypoint)| RawKeypoint {
                part: part.name().to_string(),
                position: RawPosition {
                    x: keypoint.x,
                    y: keypoint.y,
                },
                score: keypoint.confidence,
            })
            .collect(),
    }
}

/// Recording with one single-pose result per frame; `None` is an empty result
pub fn recording(frames: &[Option<KeypointFrame>]) -> ReplayPoseModel {
    ReplayPoseModel::new(
        frames
            .iter()
            .map(|frame| frame.as_ref().map(to_raw).into_iter().collect())
            .collect(),
    )
}

/// Same image size for every garment of every costume
pub fn uniform_assets(costumes: &[&str]) -> StaticAssetRegistry {
    costumes.iter().fold(StaticAssetRegistry::new(), |registry, costume| {
        registry.with_uniform(costume, AssetSize::new(200.0, 200.0))
    })
}

/// Session replaying `frames` with uniform assets for `costumes`
pub fn session_with(config: Config, frames: &[Option<KeypointFrame>], costumes: &[&str]) -> Result<OverlaySession> {
    OverlaySession::with_seed(
        config,
        Box::new(ReplayLoader::new(recording(frames))),
        Box::new(uniform_assets(costumes)),
        7,
    )
}

/// Fail if any placement field is not finite
pub fn assert_placement_finite(placement: &GarmentPlacement) -> Result<()> {
    if placement.is_finite() {
        Ok(())
    } else {
        Err(Error::DegenerateGeometry(format!("{placement:?}")))
    }
}

/// Model whose every inference fails
pub struct BrokenModel;

impl PoseModel for BrokenModel {
    fn estimate(&mut self, _params: &PoseEstimationParams) -> Result<Vec<RawPose>> {
        Err(Error::ModelError("inference failed".to_string()))
    }

    fn dispose(&mut self) {}
}

/// Loader that records every request and fails for chosen architectures
pub struct FlakyLoader {
    pub inner: ReplayLoader,
    pub failing: Vec<&'static str>,
    pub broken: Vec<&'static str>,
    pub requests: Rc<RefCell<Vec<String>>>,
}

impl FlakyLoader {
    pub fn new(inner: ReplayLoader) -> Self {
        Self {
            inner,
            failing: Vec::new(),
            broken: Vec::new(),
            requests: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl PoseModelLoader for FlakyLoader {
    fn load(&self, architecture: &str) -> Result<Box<dyn PoseModel>> {
        self.requests.borrow_mut().push(architecture.to_string());
        if self.failing.iter().any(|&name| name == architecture) {
            return Err(Error::ModelError(format!("cannot load {architecture}")));
        }
        if self.broken.iter().any(|&name| name == architecture) {
            return Ok(Box::new(BrokenModel));
        }
        self.inner.load(architecture)
    }
}
