//! Placement formulas, one per garment.
//!
//! The shape of each formula (which points feed rotation, anchor and extent)
//! is fixed; the coefficients come from [`GarmentTuning`].

use super::angle::{slope_degrees, slope_magnitude_degrees};
use super::GarmentPlacement;
use crate::assets::AssetSize;
use crate::constants::SLEEVE_ROTATION_OFFSET_DEGREES;
use crate::keypoint::{BodyPart, KeypointFrame, Point};
use crate::tuning::GarmentTuning;
use crate::Result;

/// Hat: sized from the ear span, tilted with the eye axis, pivoting at the neck
pub fn hat(frame: &KeypointFrame, tuning: &GarmentTuning, asset: AssetSize) -> Result<GarmentPlacement> {
    let left_eye = frame.point(BodyPart::LeftEye)?;
    let right_eye = frame.point(BodyPart::RightEye)?;
    let left_ear = frame.point(BodyPart::LeftEar)?;
    let right_ear = frame.point(BodyPart::RightEar)?;
    let nose = frame.point(BodyPart::Nose)?;
    let neck = frame.neck()?;
    let ratio = asset.aspect_ratio()?;

    let pad = (right_eye.x - right_ear.x) * tuning.hat_x_factor;
    let x = right_ear.x - pad;
    let width = left_ear.x - x + pad;
    let height = width * ratio;
    let y = right_eye.y - (tuning.hat_y_factor * (nose.y - right_eye.y) + height);
    let rotation = slope_degrees(left_eye, right_eye);

    Ok(GarmentPlacement::new(neck, Point::new(x, y), width, height, rotation))
}

/// Mask: ear span with eye padding, bottom edge just above the nose
pub fn mask(frame: &KeypointFrame, tuning: &GarmentTuning, asset: AssetSize) -> Result<GarmentPlacement> {
    let right_eye = frame.point(BodyPart::RightEye)?;
    let left_ear = frame.point(BodyPart::LeftEar)?;
    let right_ear = frame.point(BodyPart::RightEar)?;
    let nose = frame.point(BodyPart::Nose)?;
    let ratio = asset.aspect_ratio()?;

    let x_adjustment = (right_eye.x - right_ear.x) * tuning.mask_x_factor;
    let y_adjustment = (right_eye.y - nose.y) * tuning.mask_y_factor;
    let x = right_ear.x - x_adjustment;
    let width = left_ear.x - x + x_adjustment;
    let height = width * ratio;
    let y = nose.y - (height + y_adjustment);

    let origin = Point::new(x, y);
    Ok(GarmentPlacement::new(origin, origin, width, height, 0.0))
}

/// Face covering: the close-up alternative to hat and mask, centred on the nose
pub fn face_covering(
    frame: &KeypointFrame,
    tuning: &GarmentTuning,
    asset: AssetSize,
) -> Result<GarmentPlacement> {
    let left_eye = frame.point(BodyPart::LeftEye)?;
    let right_eye = frame.point(BodyPart::RightEye)?;
    let left_ear = frame.point(BodyPart::LeftEar)?;
    let right_ear = frame.point(BodyPart::RightEar)?;
    let nose = frame.point(BodyPart::Nose)?;
    let ratio = asset.aspect_ratio()?;

    let pad = (right_eye.x - right_ear.x) * tuning.covering_x_factor;
    let x = right_ear.x - pad;
    let width = left_ear.x - x + pad;
    let height = width * ratio;
    let y = nose.y - height / 2.0;
    let rotation = slope_degrees(left_eye, right_eye);

    Ok(GarmentPlacement::new(nose, Point::new(x, y), width, height, rotation))
}

/// Shirt: shoulder span wide, from above the shoulders down to the hip
pub fn shirt(frame: &KeypointFrame, tuning: &GarmentTuning) -> Result<GarmentPlacement> {
    let nose = frame.point(BodyPart::Nose)?;
    let left_shoulder = frame.point(BodyPart::LeftShoulder)?;
    let right_shoulder = frame.point(BodyPart::RightShoulder)?;
    let right_hip = frame.point(BodyPart::RightHip)?;

    let y_adjustment = (right_shoulder.y - nose.y) * tuning.shirt_y_factor;
    let x = right_shoulder.x;
    let width = (left_shoulder.x - right_shoulder.x) * tuning.shirt_width_factor;
    let height = right_hip.y - right_shoulder.y + y_adjustment;
    let y = right_shoulder.y - y_adjustment;

    let origin = Point::new(x, y);
    Ok(GarmentPlacement::new(origin, origin, width, height, 0.0))
}

/// Vertical sleeve extent shared by both arms: `(top y, height)`
fn sleeve_extent(shoulder: Point, elbow: Point, neck: Point, tuning: &GarmentTuning) -> (f64, f64) {
    let y_adjustment = (shoulder.y - neck.y) / tuning.sleeve_y_factor;
    (shoulder.y - y_adjustment, shoulder.distance(elbow) + y_adjustment)
}

/// Left upper-arm sleeve, pivoting at the left shoulder
pub fn left_sleeve(frame: &KeypointFrame, tuning: &GarmentTuning) -> Result<GarmentPlacement> {
    let shoulder = frame.point(BodyPart::LeftShoulder)?;
    let elbow = frame.point(BodyPart::LeftElbow)?;
    let neck = frame.neck()?;
    let pivot = frame.arm_pivot()?;

    let rotation = slope_degrees(shoulder, elbow) - SLEEVE_ROTATION_OFFSET_DEGREES;
    let x_adjustment = shoulder.x - neck.x;
    let x = shoulder.x - x_adjustment / tuning.sleeve_x_factor;
    let width = shoulder.x - pivot.x * tuning.sleeve_width_factor;
    let (y, height) = sleeve_extent(shoulder, elbow, neck, tuning);

    Ok(GarmentPlacement::new(shoulder, Point::new(x, y), width, height, rotation))
}

/// Right upper-arm sleeve, the mirror image of [`left_sleeve`]
pub fn right_sleeve(frame: &KeypointFrame, tuning: &GarmentTuning) -> Result<GarmentPlacement> {
    let shoulder = frame.point(BodyPart::RightShoulder)?;
    let elbow = frame.point(BodyPart::RightElbow)?;
    let neck = frame.neck()?;
    let pivot = frame.arm_pivot()?;

    let rotation = slope_degrees(shoulder, elbow) + SLEEVE_ROTATION_OFFSET_DEGREES;
    let x_adjustment = shoulder.x - neck.x;
    let width = pivot.x * tuning.sleeve_width_factor - shoulder.x;
    let x = shoulder.x - x_adjustment / tuning.sleeve_x_factor - width;
    let (y, height) = sleeve_extent(shoulder, elbow, neck, tuning);

    Ok(GarmentPlacement::new(shoulder, Point::new(x, y), width, height, rotation))
}

/// Shared pant-leg layout; `bias` is added to the signed deviation from vertical
fn pant_leg(
    hip: Point,
    knee: Point,
    bias: f64,
    tuning: &GarmentTuning,
    asset: AssetSize,
) -> Result<GarmentPlacement> {
    let ratio = asset.aspect_ratio()?;
    let deviation = 90.0 - slope_magnitude_degrees(hip, knee);
    let dx = knee.x - hip.x;
    // sign supplied by the knee's side: rotating the image's downward edge toward the knee
    let side = if dx > 0.0 {
        -1.0
    } else if dx < 0.0 {
        1.0
    } else {
        0.0
    };
    let rotation = side * deviation + bias;

    let height = hip.distance(knee) * tuning.pant_length_factor;
    let width = height / ratio;
    let origin = Point::new(hip.x - width / 2.0, hip.y);

    Ok(GarmentPlacement::new(hip, origin, width, height, rotation))
}

/// Left pant leg, hanging from the left hip toward the left knee
pub fn left_pant(frame: &KeypointFrame, tuning: &GarmentTuning, asset: AssetSize) -> Result<GarmentPlacement> {
    let hip = frame.point(BodyPart::LeftHip)?;
    let knee = frame.point(BodyPart::LeftKnee)?;
    pant_leg(hip, knee, tuning.pant_bias_degrees, tuning, asset)
}

/// Right pant leg, the mirror image of [`left_pant`]
pub fn right_pant(frame: &KeypointFrame, tuning: &GarmentTuning, asset: AssetSize) -> Result<GarmentPlacement> {
    let hip = frame.point(BodyPart::RightHip)?;
    let knee = frame.point(BodyPart::RightKnee)?;
    pant_leg(hip, knee, -tuning.pant_bias_degrees, tuning, asset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoint::Keypoint;

    fn kp(x: f64, y: f64) -> Keypoint {
        Keypoint::new(x, y, 0.9)
    }

    /// Upright subject in the flipped view: subject's left at smaller x
    fn upright() -> KeypointFrame {
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
                (BodyPart::LeftHip, kp(280.0, 380.0)),
                (BodyPart::RightHip, kp(360.0, 380.0)),
                (BodyPart::LeftKnee, kp(270.0, 480.0)),
                (BodyPart::RightKnee, kp(370.0, 480.0)),
            ],
        )
    }

    #[test]
    fn test_hat_matches_reference_formula() {
        let frame = upright();
        let placement = hat(&frame, &GarmentTuning::default(), AssetSize::new(100.0, 50.0)).unwrap();
        // pad = (335 - 355) * 1.5 = -30
        assert_eq!(placement.x, 385.0);
        assert_eq!(placement.width, 285.0 - 385.0 - 30.0);
        assert_eq!(placement.height, placement.width * 0.5);
        assert_eq!(placement.y, 105.0 - (0.75 * 15.0 + placement.height));
        assert_eq!(placement.rotation_degrees, 0.0);
        assert_eq!(placement.anchor(), Point::new(320.0, 160.0));
    }

    #[test]
    fn test_mask_matches_reference_formula() {
        let frame = upright();
        let placement = mask(&frame, &GarmentTuning::default(), AssetSize::new(200.0, 100.0)).unwrap();
        // x_adj = -10, y_adj = -6.75
        assert_eq!(placement.x, 365.0);
        assert_eq!(placement.width, 285.0 - 365.0 - 10.0);
        assert_eq!(placement.height, -45.0);
        assert!((placement.y - (120.0 - (-45.0 - 6.75))).abs() < 1e-9);
        assert_eq!(placement.draw_offset(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_shirt_spans_shoulders_to_hip() {
        let frame = upright();
        let placement = shirt(&frame, &GarmentTuning::default()).unwrap();
        assert_eq!(placement.x, 380.0);
        assert_eq!(placement.width, -120.0);
        assert_eq!(placement.y, 200.0 - 40.0);
        assert_eq!(placement.height, 180.0 + 40.0);
        assert_eq!(placement.rotation_degrees, 0.0);
    }

    #[test]
    fn test_left_sleeve_pivots_at_shoulder() {
        let frame = upright();
        let placement = left_sleeve(&frame, &GarmentTuning::default()).unwrap();
        assert_eq!(placement.anchor(), Point::new(260.0, 200.0));
        // neck = (320, 160): x_adj = -60, x = 290; width = 260 - 320
        assert_eq!(placement.x, 290.0);
        assert_eq!(placement.width, -60.0);
        assert_eq!(placement.y, 160.0);
        let expected_height = (10.0f64).hypot(90.0) + 40.0;
        assert!((placement.height - expected_height).abs() < 1e-9);
        let expected_rotation = (-90.0f64 / 10.0).atan().to_degrees() - 90.0;
        assert!((placement.rotation_degrees - expected_rotation).abs() < 1e-9);
    }

    #[test]
    fn test_sleeves_mirror_each_other() {
        let frame = upright();
        let tuning = GarmentTuning::default();
        let left = left_sleeve(&frame, &tuning).unwrap();
        let right = right_sleeve(&frame, &tuning).unwrap();
        // the frame is symmetric about x = 320
        assert!((left.rotation_degrees + right.rotation_degrees).abs() < 1e-9);
        assert_eq!(left.width, right.width);
        let span = |p: &GarmentPlacement| (p.x.min(p.x + p.width), p.x.max(p.x + p.width));
        let (left_min, left_max) = span(&left);
        let (right_min, right_max) = span(&right);
        assert!((640.0 - left_max - right_min).abs() < 1e-9);
        assert!((640.0 - left_min - right_max).abs() < 1e-9);
    }

    #[test]
    fn test_pant_legs_splay_outward() {
        let frame = upright();
        let tuning = GarmentTuning::default();
        let asset = AssetSize::new(50.0, 100.0);
        let left = left_pant(&frame, &tuning, asset).unwrap();
        let right = right_pant(&frame, &tuning, asset).unwrap();
        assert!(left.rotation_degrees > 0.0);
        assert!(right.rotation_degrees < 0.0);
        assert!((left.rotation_degrees + right.rotation_degrees).abs() < 1e-9);
        let expected_height = (10.0f64).hypot(100.0) * 1.1;
        assert!((left.height - expected_height).abs() < 1e-9);
        assert!((left.width - expected_height / 2.0).abs() < 1e-9);
        assert_eq!(left.draw_offset().y, 0.0);
    }

    #[test]
    fn test_straight_leg_only_carries_bias() {
        let frame = upright()
            .with_part(BodyPart::LeftKnee, kp(280.0, 480.0));
        let tuning = GarmentTuning::default();
        let placement = left_pant(&frame, &tuning, AssetSize::new(50.0, 100.0)).unwrap();
        assert_eq!(placement.rotation_degrees, tuning.pant_bias_degrees);
    }

    #[test]
    fn test_face_covering_centres_on_nose() {
        let frame = upright();
        let placement =
            face_covering(&frame, &GarmentTuning::default(), AssetSize::new(100.0, 100.0)).unwrap();
        assert_eq!(placement.anchor(), Point::new(320.0, 120.0));
        assert_eq!(placement.y, 120.0 - placement.height / 2.0);
    }

    #[test]
    fn test_missing_part_is_reported() {
        let frame = upright().without_part(BodyPart::LeftElbow);
        assert!(matches!(
            left_sleeve(&frame, &GarmentTuning::default()),
            Err(crate::Error::MissingKeypoint(BodyPart::LeftElbow))
        ));
    }
}
