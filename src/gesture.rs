//! Raised-arm gesture recognition.
//!
//! Gestures compare the current frame with the frame recorded one lookback
//! window earlier. Predicates are evaluated in a fixed priority order and the
//! first match wins. A predicate whose parts fail the confidence threshold in
//! either frame is skipped, not counted as evidence against it.
//!
//! Canvas y grows downward, so "above" means a smaller y.

use crate::constants::DEFAULT_MIN_PART_CONFIDENCE;
use crate::history::CooldownTimer;
use crate::keypoint::{BodyPart, KeypointFrame};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Recognised gestures, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    /// Right wrist held above the right ear
    RightEarWristCrossing,
    /// Right wrist raised from below the shoulder to between shoulder and ear
    RightWristRaise,
    /// Left wrist held above the left ear
    LeftEarWristCrossing,
    /// Left wrist raised from below the shoulder to between shoulder and ear
    LeftWristRaise,
    /// Forearms raised and crossed over the chest
    ArmsCrossed,
}

/// What the host should do in response to a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureAction {
    RevealSecondaryVideo,
    /// Hide the secondary video and move the decorative layer back to its start
    HideSecondaryVideo,
    SwitchCostume,
    ClearCostume,
    /// Hide, pause and reposition every decorative, audio and video overlay
    ResetOverlays,
}

impl Gesture {
    /// Evaluation order; earlier entries win
    pub const PRIORITY: [Gesture; 5] = [
        Gesture::RightEarWristCrossing,
        Gesture::RightWristRaise,
        Gesture::LeftEarWristCrossing,
        Gesture::LeftWristRaise,
        Gesture::ArmsCrossed,
    ];

    #[must_use]
    pub fn required_parts(self) -> &'static [BodyPart] {
        use BodyPart::*;
        match self {
            Gesture::RightEarWristCrossing => &[RightWrist, RightEar],
            Gesture::RightWristRaise => &[RightWrist, RightShoulder, RightEar],
            Gesture::LeftEarWristCrossing => &[LeftWrist, LeftEar],
            Gesture::LeftWristRaise => &[LeftWrist, LeftShoulder, LeftEar],
            Gesture::ArmsCrossed => &[
                LeftWrist,
                RightWrist,
                LeftElbow,
                RightElbow,
                LeftShoulder,
                RightShoulder,
            ],
        }
    }

    #[must_use]
    pub fn action(self) -> GestureAction {
        match self {
            Gesture::RightEarWristCrossing => GestureAction::RevealSecondaryVideo,
            Gesture::RightWristRaise => GestureAction::HideSecondaryVideo,
            Gesture::LeftEarWristCrossing => GestureAction::SwitchCostume,
            Gesture::LeftWristRaise => GestureAction::ClearCostume,
            Gesture::ArmsCrossed => GestureAction::ResetOverlays,
        }
    }

    /// Geometric test on a frame pair, ignoring confidence and cooldown
    #[must_use]
    pub fn matches(self, current: &KeypointFrame, delayed: &KeypointFrame) -> bool {
        self.evaluate(current, delayed).unwrap_or(false)
    }

    fn evaluate(self, current: &KeypointFrame, delayed: &KeypointFrame) -> Option<bool> {
        use BodyPart::*;
        match self {
            Gesture::RightEarWristCrossing => ear_crossing(current, delayed, RightWrist, RightEar),
            Gesture::RightWristRaise => wrist_raise(current, delayed, RightWrist, RightShoulder, RightEar),
            Gesture::LeftEarWristCrossing => ear_crossing(current, delayed, LeftWrist, LeftEar),
            Gesture::LeftWristRaise => wrist_raise(current, delayed, LeftWrist, LeftShoulder, LeftEar),
            Gesture::ArmsCrossed => Some(arms_crossed(current)? && arms_crossed(delayed)?),
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Gesture::RightEarWristCrossing => "right ear-wrist crossing",
            Gesture::RightWristRaise => "right wrist raise",
            Gesture::LeftEarWristCrossing => "left ear-wrist crossing",
            Gesture::LeftWristRaise => "left wrist raise",
            Gesture::ArmsCrossed => "arms crossed",
        };
        f.write_str(name)
    }
}

fn y_of(frame: &KeypointFrame, part: BodyPart) -> Option<f64> {
    frame.get(part).map(|kp| kp.y)
}

fn x_of(frame: &KeypointFrame, part: BodyPart) -> Option<f64> {
    frame.get(part).map(|kp| kp.x)
}

/// Wrist above the ear in both frames
fn ear_crossing(current: &KeypointFrame, delayed: &KeypointFrame, wrist: BodyPart, ear: BodyPart) -> Option<bool> {
    let then = y_of(delayed, wrist)? < y_of(delayed, ear)?;
    let now = y_of(current, wrist)? < y_of(current, ear)?;
    Some(then && now)
}

/// Wrist below the shoulder before, between shoulder and ear now, never above the ear
fn wrist_raise(
    current: &KeypointFrame,
    delayed: &KeypointFrame,
    wrist: BodyPart,
    shoulder: BodyPart,
    ear: BodyPart,
) -> Option<bool> {
    let then_wrist = y_of(delayed, wrist)?;
    let now_wrist = y_of(current, wrist)?;
    let was_below_shoulder = then_wrist > y_of(delayed, shoulder)?;
    let is_above_shoulder = now_wrist < y_of(current, shoulder)?;
    let stayed_below_ear = then_wrist > y_of(delayed, ear)? && now_wrist > y_of(current, ear)?;
    Some(was_below_shoulder && is_above_shoulder && stayed_below_ear)
}

/// Both wrists between elbow and shoulder height, each past its elbow toward the other side
fn arms_crossed(frame: &KeypointFrame) -> Option<bool> {
    use BodyPart::*;
    let raised = |wrist, elbow, shoulder| -> Option<bool> {
        let y = y_of(frame, wrist)?;
        Some(y < y_of(frame, elbow)? && y > y_of(frame, shoulder)?)
    };
    let left_raised = raised(LeftWrist, LeftElbow, LeftShoulder)?;
    let right_raised = raised(RightWrist, RightElbow, RightShoulder)?;
    let crossed = x_of(frame, LeftWrist)? > x_of(frame, LeftElbow)?
        && x_of(frame, RightWrist)? < x_of(frame, RightElbow)?;
    Some(left_raised && right_raised && crossed)
}

/// First-match-wins gesture classifier with a costume-switch cooldown
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    min_score: f64,
    costume_switch: CooldownTimer,
}

impl GestureClassifier {
    #[must_use]
    pub fn new(min_score: f64, costume_switch_cooldown_ms: u64) -> Self {
        Self {
            min_score,
            costume_switch: CooldownTimer::new(costume_switch_cooldown_ms),
        }
    }

    #[must_use]
    pub fn min_score(&self) -> f64 {
        self.min_score
    }

    pub fn set_min_score(&mut self, min_score: f64) {
        self.min_score = min_score;
    }

    #[must_use]
    pub fn costume_switch_timer(&self) -> &CooldownTimer {
        &self.costume_switch
    }

    /// Classify one frame pair; `delayed` is `None` when no frame was recorded at the lookback bucket
    ///
    /// A costume switch that matches while cooling down still wins the
    /// priority order, so the tick reports no gesture at all.
    pub fn classify(
        &mut self,
        current: &KeypointFrame,
        delayed: Option<&KeypointFrame>,
        now_ms: u64,
    ) -> Option<Gesture> {
        let Some(delayed) = delayed else {
            debug!("No frame at lookback bucket, skipping gestures");
            return None;
        };

        for gesture in Gesture::PRIORITY {
            let parts = gesture.required_parts();
            if !current.all_confident(parts, self.min_score) || !delayed.all_confident(parts, self.min_score) {
                continue;
            }
            if !gesture.matches(current, delayed) {
                continue;
            }
            if gesture == Gesture::LeftEarWristCrossing && !self.costume_switch.try_fire(now_ms) {
                debug!("Costume switch cooling down");
                return None;
            }
            return Some(gesture);
        }
        None
    }

    pub fn reset(&mut self) {
        self.costume_switch.reset();
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(
            DEFAULT_MIN_PART_CONFIDENCE,
            crate::constants::DEFAULT_LOOKBACK_MS * crate::constants::COSTUME_SWITCH_COOLDOWN_FACTOR,
        )
    }
}
