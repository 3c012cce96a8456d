//! Garment placement geometry.
//!
//! Each garment's placement is a pure function of one [`KeypointFrame`], the
//! active [`GarmentTuning`] and the garment image's intrinsic size. A
//! placement is rendered by translating to the anchor, rotating by
//! `rotation_degrees`, then drawing the image at the anchor-relative offset
//! returned by [`GarmentPlacement::draw_offset`].
//!
//! Frames are in the horizontally flipped view, so the subject's left side has
//! the smaller x and several garments come out with a negative width. A
//! negative extent draws the image mirrored along that axis.

/// Slope angles and the degenerate-denominator policy
pub mod angle;

/// Per-garment placement formulas
pub mod garments;

/// Affine transforms in canvas convention
pub mod transform;

use crate::assets::AssetSize;
use crate::keypoint::{BodyPart, KeypointFrame, Point};
use crate::tuning::GarmentTuning;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use transform::Affine2;

/// Costume pieces that can be placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Garment {
    Hat,
    Mask,
    FaceCovering,
    Shirt,
    LeftSleeve,
    RightSleeve,
    LeftPant,
    RightPant,
}

impl Garment {
    pub const ALL: [Garment; 8] = [
        Garment::Hat,
        Garment::Mask,
        Garment::FaceCovering,
        Garment::Shirt,
        Garment::LeftSleeve,
        Garment::RightSleeve,
        Garment::LeftPant,
        Garment::RightPant,
    ];

    /// File stem of the garment's image
    #[must_use]
    pub fn asset_name(self) -> &'static str {
        match self {
            Garment::Hat => "hat",
            Garment::Mask => "mask",
            Garment::FaceCovering => "covering",
            Garment::Shirt => "shirt",
            Garment::LeftSleeve => "left_sleeve",
            Garment::RightSleeve => "right_sleeve",
            Garment::LeftPant => "left_pant",
            Garment::RightPant => "right_pant",
        }
    }

    /// Every keypoint the garment's formula reads, derived points included
    #[must_use]
    pub fn required_parts(self) -> &'static [BodyPart] {
        use BodyPart::*;
        match self {
            Garment::Hat => &[
                LeftEye,
                RightEye,
                LeftEar,
                RightEar,
                Nose,
                LeftShoulder,
                RightShoulder,
            ],
            Garment::Mask => &[RightEye, LeftEar, RightEar, Nose],
            Garment::FaceCovering => &[LeftEye, RightEye, LeftEar, RightEar, Nose],
            Garment::Shirt => &[Nose, LeftShoulder, RightShoulder, RightHip],
            Garment::LeftSleeve => &[Nose, LeftShoulder, RightShoulder, LeftElbow],
            Garment::RightSleeve => &[Nose, LeftShoulder, RightShoulder, RightElbow],
            Garment::LeftPant => &[LeftHip, LeftKnee],
            Garment::RightPant => &[RightHip, RightKnee],
        }
    }
}

impl fmt::Display for Garment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.asset_name())
    }
}

/// Full transform needed to render one garment image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GarmentPlacement {
    /// Rotation pivot, X
    pub anchor_x: f64,
    /// Rotation pivot, Y
    pub anchor_y: f64,
    /// Image origin before rotation, X
    pub x: f64,
    /// Image origin before rotation, Y
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation_degrees: f64,
}

impl GarmentPlacement {
    #[must_use]
    pub fn new(anchor: Point, origin: Point, width: f64, height: f64, rotation_degrees: f64) -> Self {
        Self {
            anchor_x: anchor.x,
            anchor_y: anchor.y,
            x: origin.x,
            y: origin.y,
            width,
            height,
            rotation_degrees,
        }
    }

    #[must_use]
    pub fn anchor(&self) -> Point {
        Point::new(self.anchor_x, self.anchor_y)
    }

    /// Image offset relative to the anchor
    #[must_use]
    pub fn draw_offset(&self) -> Point {
        Point::new(self.x - self.anchor_x, self.y - self.anchor_y)
    }

    #[must_use]
    pub fn rotation_radians(&self) -> f64 {
        self.rotation_degrees.to_radians()
    }

    /// Translate to the anchor, then rotate about it
    #[must_use]
    pub fn transform(&self) -> Affine2 {
        Affine2::identity()
            .translate(self.anchor_x, self.anchor_y)
            .rotate(self.rotation_radians())
    }

    /// Map a point in image space (relative to the image origin) to the canvas
    #[must_use]
    pub fn map_local(&self, p: Point) -> Point {
        let offset = self.draw_offset();
        self.transform().apply(Point::new(offset.x + p.x, offset.y + p.y))
    }

    /// Canvas positions of the image corners, starting at the origin corner
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            self.map_local(Point::new(0.0, 0.0)),
            self.map_local(Point::new(self.width, 0.0)),
            self.map_local(Point::new(self.width, self.height)),
            self.map_local(Point::new(0.0, self.height)),
        ]
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        [
            self.anchor_x,
            self.anchor_y,
            self.x,
            self.y,
            self.width,
            self.height,
            self.rotation_degrees,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    /// Reject placements carrying non-finite values
    ///
    /// # Errors
    ///
    /// Returns `Error::DegenerateGeometry` if any field is NaN or infinite.
    pub fn checked(self, garment: Garment) -> Result<Self> {
        if self.is_finite() {
            Ok(self)
        } else {
            Err(Error::DegenerateGeometry(format!(
                "{garment} placement has non-finite values: {self:?}"
            )))
        }
    }
}

/// Compute the placement of one garment
///
/// Shirt and sleeves size themselves from keypoint spans and ignore `asset`.
///
/// # Errors
///
/// Returns `Error::MissingKeypoint` if a required part is absent,
/// `Error::InvalidInput` for an unusable asset size and
/// `Error::DegenerateGeometry` if the result is not finite.
pub fn compute_placement(
    garment: Garment,
    frame: &KeypointFrame,
    tuning: &GarmentTuning,
    asset: AssetSize,
) -> Result<GarmentPlacement> {
    let placement = match garment {
        Garment::Hat => garments::hat(frame, tuning, asset),
        Garment::Mask => garments::mask(frame, tuning, asset),
        Garment::FaceCovering => garments::face_covering(frame, tuning, asset),
        Garment::Shirt => garments::shirt(frame, tuning),
        Garment::LeftSleeve => garments::left_sleeve(frame, tuning),
        Garment::RightSleeve => garments::right_sleeve(frame, tuning),
        Garment::LeftPant => garments::left_pant(frame, tuning, asset),
        Garment::RightPant => garments::right_pant(frame, tuning, asset),
    }?;
    placement.checked(garment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_offset_is_anchor_relative() {
        let placement = GarmentPlacement::new(
            Point::new(100.0, 50.0),
            Point::new(80.0, 20.0),
            40.0,
            60.0,
            0.0,
        );
        assert_eq!(placement.draw_offset(), Point::new(-20.0, -30.0));
        let origin = placement.map_local(Point::new(0.0, 0.0));
        assert!((origin.x - 80.0).abs() < 1e-9);
        assert!((origin.y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_is_about_anchor() {
        let placement = GarmentPlacement::new(
            Point::new(10.0, 10.0),
            Point::new(10.0, 10.0),
            5.0,
            5.0,
            90.0,
        );
        let corners = placement.corners();
        assert!((corners[0].x - 10.0).abs() < 1e-9);
        assert!((corners[0].y - 10.0).abs() < 1e-9);
        // the image's +x edge now points down the canvas
        assert!((corners[1].x - 10.0).abs() < 1e-9);
        assert!((corners[1].y - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_checked_rejects_non_finite() {
        let placement = GarmentPlacement::new(
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            f64::NAN,
            1.0,
            0.0,
        );
        assert!(matches!(
            placement.checked(Garment::Hat),
            Err(Error::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_required_parts_cover_sides() {
        assert!(Garment::LeftSleeve
            .required_parts()
            .contains(&BodyPart::LeftElbow));
        assert!(Garment::RightPant.required_parts().contains(&BodyPart::RightKnee));
        assert!(!Garment::FaceCovering
            .required_parts()
            .contains(&BodyPart::LeftShoulder));
    }
}
