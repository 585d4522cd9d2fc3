//! Sends a moving BGRX test pattern as "ndi-go test" until Ctrl-C.
//!
//! The buffer is lent to the runtime without copying; dropping the token
//! hands it back before the next frame is drawn into it.
//!
//! Run with: `cargo run --example send_video`

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use ndi_dyn::{BorrowedVideoFrame, Error, PixelFormat, Sender, SenderOptions, NDI};
use tracing_subscriber::EnvFilter;

const WIDTH: i32 = 720;
const HEIGHT: i32 = 480;

fn draw(buffer: &mut [u8], frame_no: usize) {
    let offset = frame_no * 4;
    for (y, row) in buffer.chunks_exact_mut(WIDTH as usize * 4).enumerate() {
        for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
            let bar = ((x + offset) / 90) % 2 == 0;
            let shade = if bar { 0xE0 } else { 0x20 };
            pixel.copy_from_slice(&[shade, (y % 256) as u8, shade, 0xFF]);
        }
    }
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    ctrlc::set_handler(move || running_clone.store(false, Ordering::Relaxed))
        .expect("Error setting Ctrl-C handler");

    let ndi = NDI::load_default()?;
    let sender = Sender::new(&ndi, &SenderOptions::builder("ndi-go test").build())?;

    let mut buffer = vec![0u8; (WIDTH * HEIGHT * 4) as usize];

    let mut frame_no = 0usize;
    let mut batch_start = Instant::now();
    while running.load(Ordering::Relaxed) {
        draw(&mut buffer, frame_no);

        let frame =
            BorrowedVideoFrame::from_buffer(&buffer, WIDTH, HEIGHT, PixelFormat::BGRX, 30000, 1001)?;
        // Clocked sends block until the frame is due.
        drop(sender.send_video_async(&frame)?);

        frame_no += 1;
        if frame_no % 300 == 0 {
            let elapsed = batch_start.elapsed().as_secs_f32();
            println!(
                "300 frames sent at {:.2} fps, {} receiver(s) connected",
                300.0 / elapsed,
                sender.connections(Duration::ZERO)
            );
            batch_start = Instant::now();
        }
    }

    Ok(())
}
