#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Path Defence session.
//!
//! The host drives the engine from a virtual clock at a fixed frame rate, so
//! every run with the same arguments produces the same outcome.

mod autoplay;
mod config;
mod presenter;

use std::{path::PathBuf, str::FromStr, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use path_defence_core::SessionState;
use path_defence_engine::{Session, SessionConfig, StatusLabels};
use path_defence_world::query;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use autoplay::AutoBuyer;
use presenter::LogPresenter;

/// Runs a headless Path Defence session and prints the final standings.
#[derive(Debug, Parser)]
#[command(name = "path-defence", version)]
struct Args {
    /// Simulated seconds to run.
    #[arg(long, default_value_t = 120)]
    seconds: u32,
    /// Ticks per simulated second.
    #[arg(long, default_value_t = 60)]
    fps: u32,
    /// TOML file with session settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Buy a tower at the pixel position before the first tick. Repeatable.
    #[arg(long = "tower", value_name = "X,Y")]
    towers: Vec<PixelPosition>,
    /// Let a seeded bot buy towers whenever resources allow.
    #[arg(long)]
    auto_buy: bool,
    /// Seed for the auto-buy bot.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Pause the session at this simulated second.
    #[arg(long)]
    pause_at: Option<u32>,
    /// Resume the session at this simulated second.
    #[arg(long)]
    resume_at: Option<u32>,
    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
    /// Log purchases and entity churn.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PixelPosition {
    x: f32,
    y: f32,
}

impl FromStr for PixelPosition {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (x, y) = value
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y but got `{value}`"))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<f32>()
                .map_err(|error| format!("invalid coordinate `{part}`: {error}"))
        };
        Ok(Self {
            x: parse(x)?,
            y: parse(y)?,
        })
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    state: SessionState,
    seconds: f64,
    frames: u64,
    towers: usize,
    #[serde(flatten)]
    labels: StatusLabels,
}

/// Entry point for the Path Defence command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = config::load(args.config.as_deref())?;
    let summary = run(&args, config)?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("failed to encode summary")?
        );
    } else {
        println!("state:     {:?}", summary.state);
        println!("seconds:   {:.2}", summary.seconds);
        println!("towers:    {}", summary.towers);
        println!("level:     {}", summary.labels.level);
        println!("lives:     {}", summary.labels.lives);
        println!("resources: {}", summary.labels.resources);
        println!("score:     {}", summary.labels.score);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();
}

fn run(args: &Args, config: SessionConfig) -> Result<Summary> {
    if args.fps == 0 {
        bail!("--fps must be positive");
    }
    let fps = u64::from(args.fps);

    let mut session = Session::new(config).context("failed to start session")?;
    for position in &args.towers {
        match session.buy_tower(position.x, position.y) {
            Ok(tower) => info!(tower = tower.get(), x = position.x, y = position.y, "tower placed"),
            Err(error) => warn!(%error, x = position.x, y = position.y, "tower not placed"),
        }
    }

    let mut bot = args.auto_buy.then(|| AutoBuyer::new(args.seed));
    let mut presenter = LogPresenter::default();
    let total_ticks = u64::from(args.seconds).saturating_mul(fps);
    let mut now = Duration::ZERO;

    for tick in 0..total_ticks {
        now = Duration::from_nanos(tick.saturating_mul(1_000_000_000) / fps);

        if tick % fps == 0 {
            let second = tick / fps;
            if args.pause_at.map(u64::from) == Some(second) {
                if let Err(error) = session.pause() {
                    warn!(%error, second, "pause ignored");
                }
            }
            if args.resume_at.map(u64::from) == Some(second) {
                if let Err(error) = session.resume() {
                    warn!(%error, second, "resume ignored");
                }
            }
            if let Some(bot) = bot.as_mut() {
                if let Some(tower) = bot.step(&mut session) {
                    info!(tower = tower.get(), second, "auto-buy placed tower");
                }
            }
        }

        session.tick(now, &mut presenter);
        if session.state() == SessionState::Stopped {
            break;
        }
    }

    if session.state() != SessionState::Stopped {
        session.stop().context("failed to stop session")?;
    }

    Ok(Summary {
        state: session.state(),
        seconds: now.as_secs_f64(),
        frames: presenter.frames(),
        towers: query::tower_count(session.world()),
        labels: session.labels(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["path-defence"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).expect("arguments parse")
    }

    #[test]
    fn pixel_positions_parse() {
        assert_eq!(
            "96, 160".parse::<PixelPosition>(),
            Ok(PixelPosition { x: 96.0, y: 160.0 })
        );
        assert!("96".parse::<PixelPosition>().is_err());
        assert!("a,1".parse::<PixelPosition>().is_err());
    }

    #[test]
    fn towers_flag_repeats() {
        let args = args(&["--tower", "96,160", "--tower", "160,160"]);
        assert_eq!(args.towers.len(), 2);
        assert_eq!(args.seconds, 120);
        assert_eq!(args.fps, 60);
    }

    #[test]
    fn short_run_reaches_the_first_level_up() {
        let args = args(&["--seconds", "12", "--fps", "10", "--tower", "96,160"]);
        let summary = run(&args, SessionConfig::default()).expect("run succeeds");

        assert_eq!(summary.state, SessionState::Stopped);
        assert_eq!(summary.frames, 120);
        assert_eq!(summary.towers, 1);
        assert_eq!(summary.labels.level, 2);
        assert_eq!(summary.labels.resources, 50);
    }

    #[test]
    fn paused_seconds_publish_no_frames() {
        let args = args(&[
            "--seconds", "5", "--fps", "10", "--pause-at", "1", "--resume-at", "3",
        ]);
        let summary = run(&args, SessionConfig::default()).expect("run succeeds");
        assert_eq!(summary.frames, 30);
        assert_eq!(summary.labels.countdown, 8);
    }

    #[test]
    fn zero_fps_is_rejected() {
        let args = args(&["--fps", "0"]);
        assert!(run(&args, SessionConfig::default()).is_err());
    }

    #[test]
    fn summary_serializes_flat() {
        let summary = Summary {
            state: SessionState::Stopped,
            seconds: 1.5,
            frames: 3,
            towers: 0,
            labels: StatusLabels {
                level: 1,
                lives: 20,
                resources: 100,
                score: 0,
                countdown: 9,
            },
        };
        let json = serde_json::to_value(&summary).expect("serializes");
        assert_eq!(json["lives"], 20);
        assert_eq!(json["state"], "Stopped");
    }
}
