//! Per-frame overlay driver.
//!
//! One [`OverlaySession::tick`] runs per camera frame: reload the model if
//! an architecture change is pending, estimate the pose, place the garments
//! that pass the visibility gate, classify a gesture against the frame one
//! lookback window ago and expire old history. No failure inside a tick is
//! fatal; the tick just reports less.

use crate::assets::{asset_path, AssetRegistry};
use crate::config::Config;
use crate::geometry::{compute_placement, Garment, GarmentPlacement};
use crate::gesture::{Gesture, GestureAction, GestureClassifier};
use crate::history::FrameHistory;
use crate::keypoint::{ingest, KeypointFrame};
use crate::pose_model::{validate_architecture, PoseModel, PoseModelLoader};
use crate::tuning::{CostumeCatalogue, GarmentTuning};
use crate::visibility::{GarmentGroup, HeadMode, VisibilityGate};
use crate::{Error, Result};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::PathBuf;

/// External changes applied between ticks
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SelectCostume(String),
    ClearCostume,
    /// Reload the pose model at the start of the next tick
    ChangeArchitecture(String),
    SetMinPartConfidence(f64),
}

/// Mutable overlay state read at the top of every tick
#[derive(Debug, Clone)]
pub struct OverlayContext {
    config: Config,
    active_costume: String,
    tuning: GarmentTuning,
    cleared: bool,
    pending_architecture: Option<String>,
}

fn resolve_tuning(catalogue: &CostumeCatalogue, id: &str) -> Result<GarmentTuning> {
    if catalogue.is_empty() {
        Ok(GarmentTuning::default())
    } else {
        catalogue.tuning_for(id)
    }
}

impl OverlayContext {
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the configuration does not validate.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let active_costume = config.costumes.default_costume.clone();
        let tuning = resolve_tuning(&config.costumes.catalogue, &active_costume)?;
        Ok(Self {
            config,
            active_costume,
            tuning,
            cleared: false,
            pending_architecture: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn active_costume(&self) -> &str {
        &self.active_costume
    }

    #[must_use]
    pub fn tuning(&self) -> &GarmentTuning {
        &self.tuning
    }

    /// Whether garments are currently hidden
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    #[must_use]
    pub fn pending_architecture(&self) -> Option<&str> {
        self.pending_architecture.as_deref()
    }

    /// Make a catalogue costume active, replacing the whole tuning
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownCostume` if the id is not in a non-empty catalogue.
    pub fn select_costume(&mut self, id: &str) -> Result<()> {
        self.tuning = resolve_tuning(&self.config.costumes.catalogue, id)?;
        self.active_costume = id.to_string();
        self.cleared = false;
        info!("Costume {id} selected");
        Ok(())
    }

    pub fn clear_costume(&mut self) {
        self.cleared = true;
        info!("Costume cleared");
    }

    /// Schedule a model reload for the next tick
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` for an unsupported architecture.
    pub fn request_architecture(&mut self, architecture: &str) -> Result<()> {
        validate_architecture(architecture)?;
        self.pending_architecture = Some(architecture.to_string());
        Ok(())
    }

    /// Take the pending architecture, clearing the flag
    pub fn take_pending_architecture(&mut self) -> Option<String> {
        self.pending_architecture.take()
    }

    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the value is outside [0, 1].
    pub fn set_min_part_confidence(&mut self, value: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidInput(format!(
                "Part confidence {value} must be between 0.0 and 1.0"
            )));
        }
        self.config.detection.min_part_confidence = value;
        Ok(())
    }

    /// # Errors
    ///
    /// Propagates the error of the underlying setter.
    pub fn apply(&mut self, command: Command) -> Result<()> {
        match command {
            Command::SelectCostume(id) => self.select_costume(&id),
            Command::ClearCostume => {
                self.clear_costume();
                Ok(())
            }
            Command::ChangeArchitecture(architecture) => self.request_architecture(&architecture),
            Command::SetMinPartConfidence(value) => self.set_min_part_confidence(value),
        }
    }
}

/// Timestamp of the `index`-th frame of a stream captured at `fps`
///
/// Derived from the index rather than accumulated, so the frame `fps` ticks
/// earlier is always exactly one second back and bucketed lookback lands on it.
/// `fps` must be non-zero.
#[must_use]
pub fn frame_timestamp_ms(index: u64, fps: u32) -> u64 {
    index * 1000 / u64::from(fps.max(1))
}

/// One garment ready for the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedGarment {
    pub garment: Garment,
    pub asset: PathBuf,
    pub placement: GarmentPlacement,
}

/// Result of one tick
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickOutput {
    /// Whether a subject was detected; otherwise only the camera frame is drawn
    pub frame_present: bool,
    pub placements: Vec<PlacedGarment>,
    /// Head rendering used, if the head rendered at all
    pub head_mode: Option<HeadMode>,
    pub gesture: Option<Gesture>,
    pub action: Option<GestureAction>,
}

impl TickOutput {
    fn passthrough() -> Self {
        Self::default()
    }

    /// Placement of one garment, if it rendered
    #[must_use]
    pub fn placement(&self, garment: Garment) -> Option<&GarmentPlacement> {
        self.placements
            .iter()
            .find(|placed| placed.garment == garment)
            .map(|placed| &placed.placement)
    }
}

/// Owns the model, the frame history and the gesture state across ticks
pub struct OverlaySession {
    context: OverlayContext,
    loader: Box<dyn PoseModelLoader>,
    assets: Box<dyn AssetRegistry>,
    model: Option<Box<dyn PoseModel>>,
    history: FrameHistory,
    classifier: GestureClassifier,
    rng: StdRng,
}

impl OverlaySession {
    /// Create a session and load the configured model
    ///
    /// # Errors
    ///
    /// Returns configuration errors and `Error::ModelError` if the initial
    /// model cannot be loaded.
    pub fn new(config: Config, loader: Box<dyn PoseModelLoader>, assets: Box<dyn AssetRegistry>) -> Result<Self> {
        Self::with_rng(config, loader, assets, StdRng::from_entropy())
    }

    /// Same as [`OverlaySession::new`] with a fixed costume-switch seed
    ///
    /// # Errors
    ///
    /// Same as [`OverlaySession::new`].
    pub fn with_seed(
        config: Config,
        loader: Box<dyn PoseModelLoader>,
        assets: Box<dyn AssetRegistry>,
        seed: u64,
    ) -> Result<Self> {
        Self::with_rng(config, loader, assets, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        config: Config,
        loader: Box<dyn PoseModelLoader>,
        assets: Box<dyn AssetRegistry>,
        rng: StdRng,
    ) -> Result<Self> {
        let context = OverlayContext::new(config)?;
        let gesture = &context.config.gesture;
        let history = FrameHistory::new(gesture.bucket_ms, gesture.retention_ms())?;
        let classifier = GestureClassifier::new(
            context.config.detection.min_part_confidence,
            gesture.costume_switch_cooldown_ms(),
        );

        info!("Loading pose model {}", context.config.detection.architecture);
        let model = loader.load(&context.config.detection.architecture)?;

        Ok(Self {
            context,
            loader,
            assets,
            model: Some(model),
            history,
            classifier,
            rng,
        })
    }

    #[must_use]
    pub fn context(&self) -> &OverlayContext {
        &self.context
    }

    #[must_use]
    pub fn history(&self) -> &FrameHistory {
        &self.history
    }

    #[must_use]
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Apply an external change; it takes effect on the next tick
    ///
    /// # Errors
    ///
    /// Propagates [`OverlayContext::apply`] errors.
    pub fn apply(&mut self, command: Command) -> Result<()> {
        self.context.apply(command)
    }

    /// Run one frame
    pub fn tick(&mut self, now_ms: u64) -> TickOutput {
        if let Some(architecture) = self.context.take_pending_architecture() {
            self.reload(&architecture);
        }

        let Some(frame) = self.estimate() else {
            return TickOutput::passthrough();
        };
        self.history.record(now_ms, frame.clone());

        let min_score = self.context.config.detection.min_part_confidence;
        let gate = VisibilityGate::new(min_score, self.context.config.visibility.covering_group_threshold);
        let (placements, head_mode) = if self.context.cleared {
            (Vec::new(), None)
        } else {
            self.place_garments(&frame, &gate)
        };

        self.classifier.set_min_score(min_score);
        let delay = self.context.config.gesture.lookback_buckets();
        let delayed = self.history.lookback(now_ms, delay);
        let gesture = self.classifier.classify(&frame, delayed, now_ms);
        let action = gesture.map(|gesture| {
            info!("Gesture: {gesture}");
            let action = gesture.action();
            self.dispatch(action);
            action
        });

        let expired = self.history.expire(now_ms);
        if expired > 0 {
            debug!("Expired {expired} history buckets");
        }

        TickOutput {
            frame_present: true,
            placements,
            head_mode,
            gesture,
            action,
        }
    }

    fn reload(&mut self, architecture: &str) {
        if let Some(mut old) = self.model.take() {
            old.dispose();
        }
        match self.loader.load(architecture) {
            Ok(model) => {
                info!("Reloaded pose model {architecture}");
                self.context.config.detection.architecture = architecture.to_string();
                self.model = Some(model);
            }
            Err(e) => warn!("Failed to load pose model {architecture}: {e}"),
        }
    }

    fn estimate(&mut self) -> Option<KeypointFrame> {
        let Some(model) = self.model.as_mut() else {
            debug!("No pose model loaded");
            return None;
        };
        let detection = &self.context.config.detection;
        let params = detection.estimation_params();
        let poses = match model.estimate(&params) {
            Ok(poses) => poses,
            Err(e) => {
                warn!("Pose estimation failed: {e}");
                return None;
            }
        };
        match ingest(&poses, params.algorithm, detection.min_pose_confidence) {
            Ok(frame) => Some(frame),
            Err(Error::NoPoseDetected) => {
                debug!("No pose detected");
                None
            }
            Err(e) => {
                warn!("Rejected pose: {e}");
                None
            }
        }
    }

    /// Place every garment of a group, or none of them
    fn place_all(&self, frame: &KeypointFrame, garments: &[Garment]) -> Result<Vec<PlacedGarment>> {
        let costume = self.context.active_costume.as_str();
        let root = &self.context.config.costumes.asset_root;
        garments
            .iter()
            .map(|&garment| -> Result<PlacedGarment> {
                let size = self.assets.require(costume, garment)?;
                let placement = compute_placement(garment, frame, &self.context.tuning, size)?;
                Ok(PlacedGarment {
                    garment,
                    asset: asset_path(root, costume, garment),
                    placement,
                })
            })
            .collect()
    }

    fn place_garments(&self, frame: &KeypointFrame, gate: &VisibilityGate) -> (Vec<PlacedGarment>, Option<HeadMode>) {
        let mut placements = Vec::new();
        let mut rendered_groups = 0;
        for group in GarmentGroup::BODY {
            if !gate.is_eligible(frame, group) {
                debug!("{group:?} hidden by confidence gate");
                continue;
            }
            match self.place_all(frame, group.garments()) {
                Ok(placed) => {
                    placements.extend(placed);
                    rendered_groups += 1;
                }
                Err(e) => warn!("Skipping {group:?}: {e}"),
            }
        }

        let mode = gate.head_mode(rendered_groups);
        if !gate.is_head_eligible(frame, mode) {
            debug!("Head hidden by confidence gate");
            return (placements, None);
        }
        match self.place_all(frame, mode.garments()) {
            Ok(placed) => {
                placements.extend(placed);
                (placements, Some(mode))
            }
            Err(e) => {
                warn!("Skipping head: {e}");
                (placements, None)
            }
        }
    }

    fn dispatch(&mut self, action: GestureAction) {
        match action {
            GestureAction::SwitchCostume => self.switch_costume(),
            GestureAction::ClearCostume => self.context.clear_costume(),
            other => debug!("Action {other:?} left to the host"),
        }
    }

    /// Pick a different catalogue costume at random
    fn switch_costume(&mut self) {
        let active = self.context.active_costume.clone();
        let others: Vec<String> = self
            .context
            .config
            .costumes
            .catalogue
            .ids()
            .filter(|&id| id != active)
            .map(str::to_string)
            .collect();
        let Some(next) = others.choose(&mut self.rng) else {
            debug!("No other costume to switch to");
            return;
        };
        if let Err(e) = self.context.select_costume(next) {
            warn!("Costume switch failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::TuningOverrides;

    fn config_with_costumes() -> Config {
        let mut config = Config::default();
        config.costumes.catalogue.insert(
            "2",
            TuningOverrides {
                hat_x_factor: Some(2.0),
                ..TuningOverrides::default()
            },
        );
        config
    }

    #[test]
    fn test_select_costume_replaces_tuning() {
        let mut context = OverlayContext::new(config_with_costumes()).unwrap();
        assert_eq!(context.active_costume(), "1");
        context.select_costume("2").unwrap();
        assert_eq!(context.tuning().hat_x_factor, 2.0);
        context.select_costume("1").unwrap();
        assert_eq!(*context.tuning(), GarmentTuning::default());
    }

    #[test]
    fn test_unknown_costume_keeps_state() {
        let mut context = OverlayContext::new(config_with_costumes()).unwrap();
        assert!(matches!(
            context.apply(Command::SelectCostume("7".to_string())),
            Err(Error::UnknownCostume(_))
        ));
        assert_eq!(context.active_costume(), "1");
    }

    #[test]
    fn test_clear_then_select_restores() {
        let mut context = OverlayContext::new(Config::default()).unwrap();
        context.apply(Command::ClearCostume).unwrap();
        assert!(context.is_cleared());
        context.apply(Command::SelectCostume("1".to_string())).unwrap();
        assert!(!context.is_cleared());
    }

    #[test]
    fn test_pending_architecture_is_one_shot() {
        let mut context = OverlayContext::new(Config::default()).unwrap();
        assert!(context.apply(Command::ChangeArchitecture("3.00".to_string())).is_err());
        context.apply(Command::ChangeArchitecture("0.75".to_string())).unwrap();
        assert_eq!(context.pending_architecture(), Some("0.75"));
        assert_eq!(context.take_pending_architecture().as_deref(), Some("0.75"));
        assert!(context.take_pending_architecture().is_none());
    }

    #[test]
    fn test_min_part_confidence_range() {
        let mut context = OverlayContext::new(Config::default()).unwrap();
        assert!(context.set_min_part_confidence(1.2).is_err());
        context.set_min_part_confidence(0.3).unwrap();
        assert_eq!(context.config().detection.min_part_confidence, 0.3);
    }
}
