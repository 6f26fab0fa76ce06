#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Bastion headlessly.
//!
//! The runner loads a tuning file, builds defences around the core with a
//! scripted autopilot and plays a bounded number of waves at a fixed frame
//! length, logging every wave summary.

mod autopilot;
mod config;
mod logging;

use std::{fmt, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use bastion_core::Phase;
use bastion_session::GameSession;
use bastion_world::query;
use clap::Parser;
use log::{debug, info, warn};

use autopilot::Autopilot;

/// Frames a single wave may take before the run is aborted.
const MAX_FRAMES_PER_WAVE: u64 = 1_000_000;

/// Headless Energy Core defence simulation
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML tuning file; the built-in tuning is used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Seed for every random decision of the session
    #[arg(short, long, default_value_t = 1)]
    seed: u64,
    /// Number of waves to play
    #[arg(short, long, default_value_t = 5)]
    waves: u32,
    /// Simulated milliseconds per frame
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Final state of a headless run.
#[derive(Debug)]
struct Report {
    waves_defended: u32,
    energy: u32,
    currency: String,
    integrity: u32,
    max_integrity: u32,
    fallen: bool,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = if self.fallen { "fallen" } else { "standing" };
        write!(
            f,
            "{} wave(s) defended; core {outcome} at {}/{}; {} {} banked",
            self.waves_defended, self.integrity, self.max_integrity, self.energy, self.currency
        )
    }
}

/// Entry point for the Bastion command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = config::load(args.config.as_deref())?;
    let report = run(GameSession::new(config, args.seed)?, &args)?;
    println!("{report}");
    Ok(())
}

fn run(mut session: GameSession, args: &Args) -> Result<Report> {
    let autopilot = Autopilot::around_core(&session);
    let frame = Duration::from_millis(args.tick_ms.max(1));
    let repair_cost = {
        let repair = &query::config(session.world()).repair;
        if repair.enabled {
            repair.cost
        } else {
            0
        }
    };

    let mut waves_defended = 0;
    for _ in 0..args.waves {
        let wave = session.wave_number();
        let placed = autopilot.build(&mut session, repair_cost);
        debug!("wave {wave}: autopilot placed {placed} structure(s)");
        if let Some(preview) = session.next_wave_preview() {
            info!(
                "wave {wave}: {} enemies ({} heavy) every {:?}, focus {:?}",
                preview.parameters.enemy_count,
                preview.parameters.heavy_count,
                preview.parameters.spawn_interval,
                preview.focus
            );
        }

        if let Err(reason) = session.start_wave() {
            bail!("wave {wave} could not start: {reason}");
        }

        let mut frames = 0;
        while matches!(session.phase(), Phase::Countdown | Phase::Wave) {
            if frames >= MAX_FRAMES_PER_WAVE {
                bail!("wave {wave} did not finish within {MAX_FRAMES_PER_WAVE} frames");
            }
            let _ = session.update(frame);
            frames += 1;
        }

        let summary = query::wave_summary(session.world());
        if session.phase() == Phase::GameOver {
            warn!(
                "wave {wave} overran the core: {} killed, {} reached the core",
                summary.killed, summary.reached_core
            );
            break;
        }

        info!(
            "wave {wave} defended in {frames} frames: {} killed, {} reached the core, reward {}",
            summary.killed,
            summary.reached_core,
            query::pending_reward(session.world())
        );
        session
            .acknowledge_wave_complete()
            .with_context(|| format!("wave {wave} could not be acknowledged"))?;
        if session.phase() == Phase::GameOver {
            warn!("core crumbled after wave {wave}");
            break;
        }
        waves_defended += 1;
        repair_if_damaged(&mut session);
    }

    let core = query::energy_core(session.world());
    Ok(Report {
        waves_defended,
        energy: session.energy(),
        currency: query::config(session.world()).economy.currency_name.clone(),
        integrity: core.current_integrity(),
        max_integrity: core.max_integrity(),
        fallen: core.is_destroyed(),
    })
}

fn repair_if_damaged(session: &mut GameSession) {
    let world = session.world();
    if query::repair_used(world) || query::energy_core(world).integrity_percentage() >= 0.5 {
        return;
    }
    match session.emergency_repair() {
        Ok(()) => info!(
            "emergency repair: core at {}/{}",
            query::energy_core(session.world()).current_integrity(),
            query::energy_core(session.world()).max_integrity()
        ),
        Err(reason) => debug!("emergency repair skipped: {reason}"),
    }
}
