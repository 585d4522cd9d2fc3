//! Lists NDI sources on the network until Ctrl-C.
//!
//! Run with: `cargo run --example list_sources -- [extra-ip ...]`

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use ndi_dyn::{Error, Finder, FinderOptions, NDI};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    ctrlc::set_handler(move || running_clone.store(false, Ordering::Relaxed))
        .expect("Error setting Ctrl-C handler");

    let ndi = NDI::load_default()?;
    println!("Loaded NDI {}", ndi.version()?);

    let mut options = FinderOptions::builder().show_local_sources(true);
    let extra_ips: Vec<String> = std::env::args().skip(1).collect();
    if !extra_ips.is_empty() {
        options = options.extra_ips(extra_ips.join(","));
    }
    let finder = Finder::new(&ndi, &options.build())?;

    while running.load(Ordering::Relaxed) {
        if !finder.wait_for_sources(Duration::from_secs(1)) {
            continue;
        }

        let sources = finder.current_sources()?;
        println!("Network sources ({} found).", sources.len());
        for (i, source) in sources.iter().enumerate() {
            println!("{}. {}", i + 1, source);
        }
    }

    Ok(())
}
