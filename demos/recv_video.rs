//! Connects to the first source whose name contains the given text and prints
//! what arrives.
//!
//! Run with: `cargo run --example recv_video -- "CAMERA"`

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use ndi_dyn::{
    Error, Finder, FinderOptions, Frame, NDI, Receiver, ReceiverColorFormat, ReceiverOptions,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let filter = std::env::args().nth(1).unwrap_or_default();

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    ctrlc::set_handler(move || running_clone.store(false, Ordering::Relaxed))
        .expect("Error setting Ctrl-C handler");

    let ndi = NDI::load_default()?;
    let finder = Finder::new(&ndi, &FinderOptions::default())?;

    println!("Looking for a source matching {filter:?}...");
    let source = loop {
        if !running.load(Ordering::Relaxed) {
            return Ok(());
        }
        finder.wait_for_sources(Duration::from_secs(1));
        if let Some(source) = finder
            .current_sources()?
            .into_iter()
            .find(|s| s.name.contains(&filter))
        {
            break source;
        }
    };
    drop(finder);

    println!("Receiving from {source}");
    let options = ReceiverOptions::builder(source)
        .color(ReceiverColorFormat::BGRX_BGRA)
        .build();
    let receiver = Receiver::new(&ndi, &options)?;

    while running.load(Ordering::Relaxed) {
        match receiver.capture(Duration::from_secs(1))? {
            Frame::None => println!("No data received."),
            Frame::Video(frame) => println!(
                "Video data received ({}x{}, stride {}).",
                frame.width(),
                frame.height(),
                frame.line_stride()
            ),
            Frame::Audio(frame) => println!(
                "Audio data received ({} samples, {} channels).",
                frame.num_samples(),
                frame.num_channels()
            ),
            Frame::Metadata(frame) => {
                println!("Meta data received: {}", frame.data().to_string_lossy())
            }
            Frame::StatusChange => println!("Receiver connection status changed."),
        }
    }

    let performance = receiver.performance();
    println!(
        "Received {} video frames ({} dropped).",
        performance.total.video, performance.dropped.video
    );
    Ok(())
}
