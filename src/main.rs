use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use sg_conf::load_conf;
use tracing::{debug, info};

use crate::swarm::Swarm;

mod swarm;

const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
const GIT_SHA: &str = env!("GIT_SHA");

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(
        short,
        long,
        default_value = "conf.yaml",
        help = "Path of a YAML configuration file. Defaults are used if it does not exist."
    )]
    conf: PathBuf,

    #[arg(long, help = "Directory where a log file is written to.")]
    log_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = sg_log::init(args.log_dir.as_deref())?;

    info!(
        "Starting spatial hash grid demo {{ \"Version\": \"{}\", \"GitSha\": \"{}\" }}",
        CARGO_PKG_VERSION,
        GIT_SHA.trim()
    );

    let conf = load_conf(args.conf.as_path()).context("Failed to load configuration")?;
    let mut swarm = Swarm::new(conf.grid(), conf.demo());
    swarm.grid().log_debug_information();

    let mut relocated = 0;
    let mut candidate_pairs = 0;
    let mut ray_objects = 0;
    for tick in 0..conf.demo().ticks() {
        let stats = swarm.step();
        debug!("Step {tick} finished: {stats:?}");

        relocated += stats.relocated;
        candidate_pairs += stats.candidate_pairs;
        ray_objects += stats.ray_objects;
    }
    swarm.grid().log_debug_information();

    let ticks = conf.demo().ticks().max(1) as usize;
    info!(
        "Simulation finished {{ \"Ticks\": {}, \"Cells\": {}, \"RelocatedPerTick\": {}, \
         \"CandidatePairsPerTick\": {}, \"RayObjectsPerTick\": {} }}",
        conf.demo().ticks(),
        swarm.grid().cell_count(),
        relocated / ticks,
        candidate_pairs / ticks,
        ray_objects / ticks,
    );

    ensure!(swarm.despawn(), "The grid is inconsistent after despawning.");
    Ok(())
}
