//! Costume overlay replay tool for recorded pose streams.

use anyhow::{Context, Result};
use clap::Parser;
use costume_overlay::assets::{AssetSize, StaticAssetRegistry};
use costume_overlay::config::{Config, EXAMPLE_CONFIG};
use costume_overlay::pose_model::{ReplayLoader, ReplayPoseModel};
use costume_overlay::session::{frame_timestamp_ms, Command, OverlaySession};
use log::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON-lines pose recording, one model result array per line
    #[arg(short, long, required_unless_present = "print_config")]
    poses: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Costume to start with instead of the configured default
    #[arg(short, long)]
    costume: Option<String>,

    /// Replay rate in frames per second
    #[arg(long, default_value = "30")]
    fps: u32,

    /// Use this size for every garment image instead of reading the asset directory
    #[arg(long, value_parser = parse_size)]
    asset_size: Option<AssetSize>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Print an example configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn parse_size(value: &str) -> std::result::Result<AssetSize, String> {
    let (width, height) = value
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value}"))?;
    let width: f64 = width.parse().map_err(|e| format!("bad width: {e}"))?;
    let height: f64 = height.parse().map_err(|e| format!("bad height: {e}"))?;
    Ok(AssetSize::new(width, height))
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    if args.fps == 0 {
        anyhow::bail!("--fps must be greater than 0");
    }

    // Load configuration if provided
    let config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        Config::from_file(config_path).with_context(|| format!("Failed to load {config_path}"))?
    } else {
        Config::default()
    };

    let layers = config.output.enabled_layers();
    if layers.is_empty() {
        info!("Output layers: garments only");
    } else {
        info!("Output layers: garments, {}", layers.join(", "));
    }

    let assets = if let Some(size) = args.asset_size {
        config
            .costumes
            .catalogue
            .ids()
            .chain(std::iter::once(config.costumes.default_costume.as_str()))
            .fold(StaticAssetRegistry::new(), |registry, id| registry.with_uniform(id, size))
    } else {
        let root = &config.costumes.asset_root;
        info!("Reading garment images from {}", root.display());
        let registry = StaticAssetRegistry::from_dir(root, config.costumes.catalogue.ids())?;
        if registry.is_empty() {
            warn!("No garment images found under {}", root.display());
        }
        registry
    };

    let poses_path = args.poses.as_deref().context("--poses is required")?;
    let recording = ReplayPoseModel::from_file(poses_path).with_context(|| format!("Failed to read {poses_path}"))?;
    info!("Replaying {} frames from {}", recording.len(), poses_path);
    let progress = recording.handle();

    let mut session = OverlaySession::new(config, Box::new(ReplayLoader::new(recording)), Box::new(assets))?;
    if let Some(costume) = args.costume {
        session.apply(Command::SelectCostume(costume))?;
    }

    let mut index = 0u64;
    let mut detected = 0usize;
    let mut gestures = 0usize;
    while progress.remaining() > 0 && session.has_model() {
        let now_ms = frame_timestamp_ms(index, args.fps);
        let output = session.tick(now_ms);
        if output.frame_present {
            detected += 1;
        }
        for placed in &output.placements {
            debug!(
                "t={}ms {} at ({:.1}, {:.1}) {:.1}x{:.1} rot {:.1}°",
                now_ms,
                placed.garment,
                placed.placement.x,
                placed.placement.y,
                placed.placement.width,
                placed.placement.height,
                placed.placement.rotation_degrees
            );
        }
        if let (Some(gesture), Some(action)) = (output.gesture, output.action) {
            gestures += 1;
            info!("t={}ms {} -> {:?} (costume {})", now_ms, gesture, action, session.context().active_costume());
        }
        index += 1;
    }

    info!("Replay finished: {} frames with a subject, {} gestures", detected, gestures);

    Ok(())
}
