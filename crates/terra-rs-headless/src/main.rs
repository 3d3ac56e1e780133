mod config;
mod session;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};

use config::SandboxConfig;
use terra_rs_game::game_world::GameWorld;
use terra_rs_world::grid::WorldGrid;

fn main() {
    let path = std::env::args().nth(1).unwrap_or_else(|| "sandbox.toml".into());
    let config = match SandboxConfig::load(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    // Logs go to stderr; stdout carries the JSON report.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(
        "terra-rs headless v{} (seed {}, {} columns, {} ticks)",
        env!("CARGO_PKG_VERSION"),
        config.world.seed,
        config.world.terrain.columns,
        config.session.ticks
    );

    let mut rng = StdRng::seed_from_u64(config.world.seed);
    let grid = WorldGrid::generate(&config.world.terrain, &mut rng);
    let mut game = GameWorld::with_hotbar(grid, config.game.clone());

    let report = session::run(&mut game, config.world.seed, &config.session);
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!("Failed to encode session report: {e}");
            std::process::exit(1);
        }
    }
    if !report.grid_consistent {
        std::process::exit(2);
    }
}
