//! Rust bindings for the NDI® runtime, loaded dynamically at run time.
//!
//! Nothing is linked at build time. [`NDI::load_default`] searches the runtime
//! directories named by the `NDI_RUNTIME_DIR_V*` environment variables (and
//! the loader's own search path), opens the shared library, resolves its
//! function table from the single `NDIlib_v3_load` export and initializes it.
//! Every wrapper type takes the resulting [`NDI`] handle, so the runtime stays
//! loaded until the last one is dropped.
//!
//! # Quick Start
//!
//! ```no_run
//! use ndi_dyn::{NDI, FinderOptions, Finder};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), ndi_dyn::Error> {
//! let ndi = NDI::load_default()?;
//! println!("NDI {}", ndi.version()?);
//!
//! let finder = Finder::new(&ndi, &FinderOptions::builder().show_local_sources(true).build())?;
//! finder.wait_for_sources(Duration::from_secs(5));
//! for source in finder.current_sources()? {
//!     println!("Found: {source}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Core Concepts
//!
//! ## Runtime
//!
//! Only one runtime can be loaded per process. A second [`NDI::load`] while the
//! first is alive fails with [`Error::AlreadyLoaded`]; clone the handle instead.
//! Where the library is looked for is configured with [`LibraryLocator`].
//!
//! ## Receiving
//!
//! [`Receiver::capture`] returns whichever frame arrives first. The frame
//! borrows the receiver and is handed back to the runtime when dropped; call
//! `to_owned()` on it to keep a copy.
//!
//! ## Sending
//!
//! [`Sender::send_video`] is synchronous. [`Sender::send_video_async`] lends the
//! buffer to the runtime without copying and returns an [`AsyncVideoToken`];
//! the buffer cannot be touched until the token is dropped:
//!
//! ```no_run
//! # use ndi_dyn::{NDI, Sender, SenderOptions, BorrowedVideoFrame, PixelFormat};
//! # fn main() -> Result<(), ndi_dyn::Error> {
//! # let ndi = NDI::load_default()?;
//! let sender = Sender::new(&ndi, &SenderOptions::builder("Test").build())?;
//! let buffer = vec![0u8; 1920 * 1080 * 4];
//! let frame = BorrowedVideoFrame::from_buffer(&buffer, 1920, 1080, PixelFormat::BGRA, 30, 1)?;
//! let token = sender.send_video_async(&frame)?;
//! drop(token);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! [`Finder`], [`Receiver`], [`Sender`] and [`Router`] are `Send` but not
//! `Sync`: a handle can move to another thread, but calls on it are not
//! synchronized. [`NDI`] itself is `Send + Sync` and cheap to clone.
//!
//! # Features
//!
//! - `tokio`: async wrappers in `ndi_dyn::tokio` that run blocking waits on
//!   Tokio's blocking thread pool.

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

mod api;
mod async_runtime;
mod capture;
mod error;

pub mod ffi;
pub mod finder;
pub mod frames;
pub mod locator;
pub mod receiver;
pub mod routing;
pub mod runtime;
pub mod sender;

pub use {
    error::*,
    finder::{Finder, FinderOptions, FinderOptionsBuilder, Source, SourceAddress},
    frames::{
        calculate_line_stride, AudioFrame, AudioFrameBuilder, AudioFrameRef, InterleavedAudio16s,
        InterleavedAudio32f, MetadataFrame, MetadataFrameRef, PixelFormat, ScanType, VideoFrame,
        VideoFrameBuilder, VideoFrameRef,
    },
    locator::LibraryLocator,
    receiver::{
        Frame, FrameCounts, Performance, QueueDepth, Receiver, ReceiverBandwidth,
        ReceiverColorFormat, ReceiverOptions, ReceiverOptionsBuilder, RecordingTimes, Tally,
    },
    routing::Router,
    runtime::NDI,
    sender::{AsyncVideoToken, BorrowedVideoFrame, Sender, SenderOptions, SenderOptionsBuilder},
};

#[cfg(feature = "tokio")]
pub use async_runtime::tokio;

/// Alias for Result with our Error type
pub type Result<T> = std::result::Result<T, crate::error::Error>;
