//! Command-line driver: fills particle histograms from a text event file
//!
//! Usage: `particle_hists [CONFIG] [EVENTS] [OUTPUT]`, which default to
//! `hists.cfg`, `events.txt` and `hists.data`. See `RunConfiguration` for the
//! configuration format and the `events` module for the event file format.

use particle_hists::{events, output, ParticleHists, Result, RunConfiguration};

use eyre::WrapErr;
use tracing_subscriber::EnvFilter;

use std::{env, time::Instant};

/// This will act as our main function, with suitable error handling
fn main() -> Result<()> {
    // Log at info level unless told otherwise by RUST_LOG
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut next_arg = |default: &str| args.next().unwrap_or_else(|| default.to_owned());
    let config_file = next_arg("hists.cfg");
    let events_file = next_arg("events.txt");
    let output_file = next_arg("hists.data");

    // ### CONFIGURATION READOUT ###

    let cfg = RunConfiguration::load(&config_file).wrap_err("Failed to load the configuration")?;
    let events = events::load_events(&events_file).wrap_err("Failed to load the events")?;
    tracing::info!(num_events = events.len(), file = %events_file, "events loaded");

    // ### HISTOGRAMMING ###

    // Start the clock after I/O, to avoid IO-induced timing fluctuations
    let saved_time = Instant::now();

    let mut hists = ParticleHists::new(&cfg.name, &cfg.detail_str, &cfg.prefix, &cfg.title)?;
    hists.initialize()?;
    for event in &events {
        hists
            .fill_collection(&event.particles, event.weight, Some(&event.info))
            .wrap_err_with(|| format!("Failed to process event {}", event.info.event_number))?;
    }

    let elapsed_time = saved_time.elapsed();
    tracing::info!(
        num_hists = hists.histograms().len(),
        elapsed_ms = elapsed_time.as_millis() as u64,
        "histograms filled"
    );

    // ### RESULTS STORAGE ###

    output::dump_histograms(hists.histograms(), &output_file, events.len(), elapsed_time)
        .wrap_err("Failed to output the results")?;

    // ...and we're done
    Ok(())
}
