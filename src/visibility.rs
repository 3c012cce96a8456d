//! Confidence gating of garment groups.
//!
//! A group renders only if every keypoint its garments read is present with
//! confidence at or above one global threshold. The head renders either hat
//! and mask or the face covering, picked by how many body groups rendered
//! this tick.

use crate::constants::{DEFAULT_COVERING_GROUP_THRESHOLD, DEFAULT_MIN_PART_CONFIDENCE};
use crate::geometry::Garment;
use crate::keypoint::{BodyPart, KeypointFrame};
use serde::{Deserialize, Serialize};

/// Garments that are gated together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GarmentGroup {
    Torso,
    Arms,
    Legs,
    Head,
}

impl GarmentGroup {
    /// Groups counted toward the head-mode decision, in evaluation order
    pub const BODY: [GarmentGroup; 3] = [GarmentGroup::Torso, GarmentGroup::Arms, GarmentGroup::Legs];

    #[must_use]
    pub fn garments(self) -> &'static [Garment] {
        match self {
            GarmentGroup::Torso => &[Garment::Shirt],
            GarmentGroup::Arms => &[Garment::LeftSleeve, Garment::RightSleeve],
            GarmentGroup::Legs => &[Garment::LeftPant, Garment::RightPant],
            GarmentGroup::Head => &[Garment::Hat, Garment::Mask],
        }
    }

    /// Union of the parts read by the group's garments
    #[must_use]
    pub fn required_parts(self) -> Vec<BodyPart> {
        parts_of(self.garments())
    }
}

/// Which head rendering is used this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadMode {
    HatAndMask,
    FaceCovering,
}

impl HeadMode {
    #[must_use]
    pub fn garments(self) -> &'static [Garment] {
        match self {
            HeadMode::HatAndMask => GarmentGroup::Head.garments(),
            HeadMode::FaceCovering => &[Garment::FaceCovering],
        }
    }
}

fn parts_of(garments: &[Garment]) -> Vec<BodyPart> {
    let mut parts: Vec<BodyPart> = Vec::new();
    for garment in garments {
        for &part in garment.required_parts() {
            if !parts.contains(&part) {
                parts.push(part);
            }
        }
    }
    parts
}

/// Confidence gate for garment rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityGate {
    min_score: f64,
    covering_group_threshold: usize,
}

impl Default for VisibilityGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PART_CONFIDENCE, DEFAULT_COVERING_GROUP_THRESHOLD)
    }
}

impl VisibilityGate {
    #[must_use]
    pub fn new(min_score: f64, covering_group_threshold: usize) -> Self {
        Self {
            min_score,
            covering_group_threshold,
        }
    }

    #[must_use]
    pub fn min_score(&self) -> f64 {
        self.min_score
    }

    #[must_use]
    pub fn is_garment_eligible(&self, frame: &KeypointFrame, garment: Garment) -> bool {
        frame.all_confident(garment.required_parts(), self.min_score)
    }

    /// Whether every part the group depends on passes the threshold
    #[must_use]
    pub fn is_eligible(&self, frame: &KeypointFrame, group: GarmentGroup) -> bool {
        group
            .garments()
            .iter()
            .all(|&garment| self.is_garment_eligible(frame, garment))
    }

    /// Hat and mask once enough other groups rendered, the face covering otherwise
    #[must_use]
    pub fn head_mode(&self, rendered_groups: usize) -> HeadMode {
        if rendered_groups >= self.covering_group_threshold {
            HeadMode::HatAndMask
        } else {
            HeadMode::FaceCovering
        }
    }

    /// Whether every garment of the head mode passes the threshold
    #[must_use]
    pub fn is_head_eligible(&self, frame: &KeypointFrame, mode: HeadMode) -> bool {
        mode.garments()
            .iter()
            .all(|&garment| self.is_garment_eligible(frame, garment))
    }
}
