//! Entry point for the bmodal demo binary.

mod args;
mod scenarios;
mod tracing_setup;

use anyhow::Result;
use bmodal::BModalConfig;

fn main() -> Result<()> {
    let config = BModalConfig::load_default().unwrap_or_else(|err| {
        eprintln!("Warning: failed to load bmodal.toml: {err}");
        eprintln!("Using default configuration");
        BModalConfig::default()
    });

    // Before anything logs.
    tracing_setup::init(&config.logging);

    let scenario = args::parse_args();
    log::info!("Starting bmodal, scenario {scenario}");

    // Overlays are `Rc`-based, so everything runs on this thread.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(scenarios::run(scenario, config))
}
