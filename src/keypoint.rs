//! Body keypoints and per-tick keypoint frames.
//!
//! A [`KeypointFrame`] is built once per tick from the pose model's raw
//! records and never mutated afterwards. Parts the model did not report stay
//! absent; they are never filled with zero coordinates.

use crate::pose_model::DetectionAlgorithm;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Body parts reported by the pose model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(usize)]
pub enum BodyPart {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl BodyPart {
    /// Number of known parts
    pub const COUNT: usize = 17;

    /// All parts in model index order
    pub const ALL: [BodyPart; BodyPart::COUNT] = [
        BodyPart::Nose,
        BodyPart::LeftEye,
        BodyPart::RightEye,
        BodyPart::LeftEar,
        BodyPart::RightEar,
        BodyPart::LeftShoulder,
        BodyPart::RightShoulder,
        BodyPart::LeftElbow,
        BodyPart::RightElbow,
        BodyPart::LeftWrist,
        BodyPart::RightWrist,
        BodyPart::LeftHip,
        BodyPart::RightHip,
        BodyPart::LeftKnee,
        BodyPart::RightKnee,
        BodyPart::LeftAnkle,
        BodyPart::RightAnkle,
    ];

    /// Part name as reported by the pose model
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            BodyPart::Nose => "nose",
            BodyPart::LeftEye => "leftEye",
            BodyPart::RightEye => "rightEye",
            BodyPart::LeftEar => "leftEar",
            BodyPart::RightEar => "rightEar",
            BodyPart::LeftShoulder => "leftShoulder",
            BodyPart::RightShoulder => "rightShoulder",
            BodyPart::LeftElbow => "leftElbow",
            BodyPart::RightElbow => "rightElbow",
            BodyPart::LeftWrist => "leftWrist",
            BodyPart::RightWrist => "rightWrist",
            BodyPart::LeftHip => "leftHip",
            BodyPart::RightHip => "rightHip",
            BodyPart::LeftKnee => "leftKnee",
            BodyPart::RightKnee => "rightKnee",
            BodyPart::LeftAnkle => "leftAnkle",
            BodyPart::RightAnkle => "rightAnkle",
        }
    }

    /// The same part on the other side of the body
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            BodyPart::Nose => BodyPart::Nose,
            BodyPart::LeftEye => BodyPart::RightEye,
            BodyPart::RightEye => BodyPart::LeftEye,
            BodyPart::LeftEar => BodyPart::RightEar,
            BodyPart::RightEar => BodyPart::LeftEar,
            BodyPart::LeftShoulder => BodyPart::RightShoulder,
            BodyPart::RightShoulder => BodyPart::LeftShoulder,
            BodyPart::LeftElbow => BodyPart::RightElbow,
            BodyPart::RightElbow => BodyPart::LeftElbow,
            BodyPart::LeftWrist => BodyPart::RightWrist,
            BodyPart::RightWrist => BodyPart::LeftWrist,
            BodyPart::LeftHip => BodyPart::RightHip,
            BodyPart::RightHip => BodyPart::LeftHip,
            BodyPart::LeftKnee => BodyPart::RightKnee,
            BodyPart::RightKnee => BodyPart::LeftKnee,
            BodyPart::LeftAnkle => BodyPart::RightAnkle,
            BodyPart::RightAnkle => BodyPart::LeftAnkle,
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BodyPart {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        BodyPart::ALL
            .iter()
            .copied()
            .find(|part| part.name() == s)
            .ok_or_else(|| Error::UnknownPart(s.to_string()))
    }
}

/// A 2D point in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Midpoint between two points
    #[must_use]
    pub fn midpoint(a: Point, b: Point) -> Self {
        Self::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }

    /// Euclidean distance to another point
    #[must_use]
    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Single tracked landmark
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    /// Canvas X coordinate
    pub x: f64,
    /// Canvas Y coordinate, growing downward
    pub y: f64,
    /// Detection confidence (0.0-1.0)
    pub confidence: f64,
}

impl Keypoint {
    #[must_use]
    pub fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self { x, y, confidence }
    }

    /// Whether the confidence reaches the threshold
    #[must_use]
    pub fn is_valid(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }

    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Snapshot of every reported body part for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct KeypointFrame {
    parts: [Option<Keypoint>; BodyPart::COUNT],
    score: f64,
}

impl Default for KeypointFrame {
    fn default() -> Self {
        Self {
            parts: [None; BodyPart::COUNT],
            score: 0.0,
        }
    }
}

impl KeypointFrame {
    /// Build a frame from explicit parts
    pub fn from_parts<I>(score: f64, parts: I) -> Self
    where
        I: IntoIterator<Item = (BodyPart, Keypoint)>,
    {
        let mut frame = Self {
            score,
            ..Self::default()
        };
        for (part, keypoint) in parts {
            frame.parts[part as usize] = Some(keypoint);
        }
        frame
    }

    /// Return a copy with one part replaced
    #[must_use]
    pub fn with_part(mut self, part: BodyPart, keypoint: Keypoint) -> Self {
        self.parts[part as usize] = Some(keypoint);
        self
    }

    /// Return a copy with one part removed
    #[must_use]
    pub fn without_part(mut self, part: BodyPart) -> Self {
        self.parts[part as usize] = None;
        self
    }

    /// Build a frame from one raw pose-model record
    ///
    /// # Errors
    ///
    /// Returns an error if a part name is unknown, reported twice, or carries
    /// non-finite coordinates or a score outside [0, 1].
    pub fn from_raw(pose: &RawPose) -> Result<Self> {
        let mut frame = Self {
            score: pose.score,
            ..Self::default()
        };
        for raw in &pose.keypoints {
            let part: BodyPart = raw.part.parse()?;
            if !raw.position.x.is_finite() || !raw.position.y.is_finite() {
                return Err(Error::InvalidInput(format!("Non-finite position for {part}")));
            }
            if !(0.0..=1.0).contains(&raw.score) {
                return Err(Error::InvalidInput(format!(
                    "Score {} for {part} outside [0, 1]",
                    raw.score
                )));
            }
            let slot = &mut frame.parts[part as usize];
            if slot.is_some() {
                return Err(Error::InvalidInput(format!("Part {part} reported twice")));
            }
            *slot = Some(Keypoint::new(raw.position.x, raw.position.y, raw.score));
        }
        Ok(frame)
    }

    /// Overall pose score reported by the model
    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[must_use]
    pub fn get(&self, part: BodyPart) -> Option<&Keypoint> {
        self.parts[part as usize].as_ref()
    }

    /// Get a part or fail with `MissingKeypoint`
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingKeypoint` if the part is absent.
    pub fn require(&self, part: BodyPart) -> Result<Keypoint> {
        self.get(part).copied().ok_or(Error::MissingKeypoint(part))
    }

    /// Position of a part
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingKeypoint` if the part is absent.
    pub fn point(&self, part: BodyPart) -> Result<Point> {
        self.require(part).map(|kp| kp.position())
    }

    /// Whether the part is present with confidence at or above the threshold
    #[must_use]
    pub fn is_confident(&self, part: BodyPart, threshold: f64) -> bool {
        self.get(part).is_some_and(|kp| kp.is_valid(threshold))
    }

    /// Whether every listed part passes [`Self::is_confident`]
    #[must_use]
    pub fn all_confident(&self, parts: &[BodyPart], threshold: f64) -> bool {
        parts.iter().all(|&part| self.is_confident(part, threshold))
    }

    /// Neck: shoulder-midpoint x, halfway between nose and shoulder-midpoint y
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingKeypoint` if the nose or a shoulder is absent.
    pub fn neck(&self) -> Result<Point> {
        let nose = self.point(BodyPart::Nose)?;
        let shoulders = self.arm_pivot()?;
        Ok(Point::new(shoulders.x, (nose.y + shoulders.y) / 2.0))
    }

    /// Shoulder midpoint
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingKeypoint` if a shoulder is absent.
    pub fn arm_pivot(&self) -> Result<Point> {
        Ok(Point::midpoint(
            self.point(BodyPart::LeftShoulder)?,
            self.point(BodyPart::RightShoulder)?,
        ))
    }

    /// Hip midpoint
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingKeypoint` if a hip is absent.
    pub fn mid_hip(&self) -> Result<Point> {
        Ok(Point::midpoint(
            self.point(BodyPart::LeftHip)?,
            self.point(BodyPart::RightHip)?,
        ))
    }

    /// Reflect horizontally about the canvas centre and swap left/right labels
    #[must_use]
    pub fn mirrored(&self, canvas_width: f64) -> Self {
        let mut mirrored = Self {
            score: self.score,
            ..Self::default()
        };
        for part in BodyPart::ALL {
            if let Some(kp) = self.get(part) {
                mirrored.parts[part.opposite() as usize] =
                    Some(Keypoint::new(canvas_width - kp.x, kp.y, kp.confidence));
            }
        }
        mirrored
    }

    /// Iterate over present parts
    pub fn iter(&self) -> impl Iterator<Item = (BodyPart, &Keypoint)> {
        BodyPart::ALL
            .iter()
            .filter_map(move |&part| self.get(part).map(|kp| (part, kp)))
    }
}

/// Keypoint position as reported by the pose model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPosition {
    pub x: f64,
    pub y: f64,
}

/// One keypoint record from the pose model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawKeypoint {
    pub part: String,
    pub position: RawPosition,
    pub score: f64,
}

/// One detected subject from the pose model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPose {
    pub score: f64,
    pub keypoints: Vec<RawKeypoint>,
}

/// Turn the pose model's result for one tick into a frame for the tracked subject
///
/// Single-pose mode tracks the first record, multi-pose mode the highest
/// scoring one.
///
/// # Errors
///
/// Returns `Error::NoPoseDetected` if there is no record or the selected
/// record scores below `min_pose_confidence`, and propagates ingestion errors
/// from [`KeypointFrame::from_raw`].
pub fn ingest(
    poses: &[RawPose],
    algorithm: DetectionAlgorithm,
    min_pose_confidence: f64,
) -> Result<KeypointFrame> {
    let selected = match algorithm {
        DetectionAlgorithm::SinglePose => poses.first(),
        DetectionAlgorithm::MultiPose => poses
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score)),
    };
    let pose = selected.ok_or(Error::NoPoseDetected)?;
    if pose.score < min_pose_confidence {
        log::debug!(
            "Pose score {:.3} below minimum {:.3}",
            pose.score,
            min_pose_confidence
        );
        return Err(Error::NoPoseDetected);
    }
    KeypointFrame::from_raw(pose)
}
