//! Error types for the ndi-dyn library.

use std::{ffi::NulError, path::PathBuf};
use thiserror::Error;

/// The main error type for NDI operations.
///
/// Calls that the runtime reports as a plain `false` (tally, metadata, routing)
/// are returned as `bool` rather than errors; only failures that leave the
/// caller without a usable result end up here.
#[derive(Debug, Error)]
pub enum Error {
    /// The shared library exists on the search path but could not be opened.
    #[error("Failed to load the NDI runtime from {}: {source}", path.display())]
    LibraryLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// None of the candidate locations contained a loadable runtime.
    #[error("No NDI runtime found (searched {} locations)", searched.len())]
    LibraryNotFound { searched: Vec<PathBuf> },

    /// The bootstrap symbol is missing or returned no function table.
    #[error("Failed to resolve {symbol}: {reason}")]
    ProcResolution { symbol: &'static str, reason: String },

    /// The function table is present but lacks required entries.
    ///
    /// Every missing entry is listed, not just the first one found.
    #[error("NDI runtime is missing required entry points: {}", .0.join(", "))]
    MissingEntryPoints(Vec<&'static str>),

    /// Another runtime is already loaded (or being loaded) in this process.
    #[error("An NDI runtime is already loaded in this process")]
    AlreadyLoaded,

    /// NDI runtime initialization failed.
    #[error("Failed to initialize the NDI runtime: {0}")]
    InitializationFailed(String),

    /// A create call returned a null handle.
    #[error("Failed to create {0}")]
    CreationFailed(String),

    /// A null pointer was returned by the runtime where a value was required.
    #[error("Encountered a null pointer in function: {0}")]
    NullPointer(String),

    /// Invalid UTF-8 data in a string from the runtime.
    #[error("Invalid UTF-8 string in data: {0}")]
    InvalidUtf8(String),

    /// Failed to create a C string due to null bytes.
    #[error("Invalid CString: {0}")]
    InvalidCString(#[from] NulError),

    /// Frame capture operation failed.
    #[error("Failed to capture frame: {0}")]
    CaptureFailed(String),

    /// Frame data is invalid or corrupted.
    #[error("Invalid frame data: {0}")]
    InvalidFrame(String),

    /// The loaded runtime predates the entry points this call needs.
    #[error("Not supported by the loaded NDI runtime: {0}")]
    Unsupported(&'static str),

    /// PTZ (Pan-Tilt-Zoom) camera control command failed.
    #[error("PTZ command failed: {0}")]
    PtzCommandFailed(String),

    /// A recording control command failed.
    #[error("Recording command failed: {0}")]
    RecordingFailed(String),

    /// Configuration parameters are invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A blocking call offloaded to a worker thread panicked or was cancelled.
    #[error("Worker task failed: {0}")]
    WorkerFailed(String),
}
