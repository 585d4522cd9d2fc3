//! NDI runtime loading, initialization and teardown.
//!
//! At most one runtime is active per process. [`NDI`] is the handle to it:
//! every finder, receiver, sender and router keeps a clone, so the runtime is
//! destroyed and the library unloaded only after the last of them is gone.

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use std::{
    ffi::CStr,
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use libloading::Library;

use crate::{
    api::Api,
    ffi::{self, NDIlib_v3, NDIlib_v3_load_fn},
    frames::{AudioFrame, InterleavedAudio16s, InterleavedAudio32f},
    locator::LibraryLocator,
    Error, Result,
};

/// Lifecycle of the process-wide runtime slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No runtime is loaded.
    Unloaded,
    /// A load is in progress on some thread.
    Loading,
    /// A runtime is loaded and initialized.
    Loaded,
}

/// Process-global single-instance guard for the runtime.
struct RuntimeManager {
    state: Mutex<State>,
}

impl RuntimeManager {
    fn new() -> Self {
        Self {
            state: Mutex::new(State::Unloaded),
        }
    }

    /// Claims the slot for a load attempt.
    ///
    /// Loads are not queued: a second attempt while one is in flight or
    /// complete is rejected with [`Error::AlreadyLoaded`].
    fn reserve(&'static self) -> Result<LoadSlot> {
        let mut state = self.state.lock();
        match *state {
            State::Unloaded => {
                *state = State::Loading;
                Ok(LoadSlot { manager: self })
            }
            State::Loading | State::Loaded => Err(Error::AlreadyLoaded),
        }
    }

    fn is_loaded(&self) -> bool {
        *self.state.lock() == State::Loaded
    }
}

static RUNTIME: Lazy<RuntimeManager> = Lazy::new(RuntimeManager::new);

/// Ownership of the runtime slot. Dropping it frees the slot, whether the
/// load got as far as [`commit`](LoadSlot::commit) or not.
struct LoadSlot {
    manager: &'static RuntimeManager,
}

impl LoadSlot {
    fn commit(&self) {
        *self.manager.state.lock() = State::Loaded;
    }
}

impl Drop for LoadSlot {
    fn drop(&mut self) {
        // Releasing an unloaded slot is a no-op; the state is simply reset.
        *self.manager.state.lock() = State::Unloaded;
    }
}

/// The loaded, initialized runtime.
///
/// Field order is teardown order: the library must stay mapped until
/// `destroy` has returned, and the slot is released last.
struct Runtime {
    api: Api,
    library: Option<Library>,
    source: Option<PathBuf>,
    _slot: LoadSlot,
}

impl Drop for Runtime {
    fn drop(&mut self) {
        tracing::debug!("destroying NDI runtime");
        unsafe { (self.api.destroy)() };
        if let Some(path) = &self.source {
            tracing::debug!(path = %path.display(), "unloading NDI runtime library");
        }
    }
}

/// Handle to the loaded NDI runtime.
///
/// `NDI` is the entry point for all NDI operations. Cloning is cheap (it is
/// reference counted) and every wrapper created from it holds a clone, so the
/// runtime cannot be torn down while any instance still uses it.
///
/// # Examples
///
/// ```no_run
/// use ndi_dyn::NDI;
///
/// # fn main() -> Result<(), ndi_dyn::Error> {
/// let ndi = NDI::load_default()?;
/// println!("NDI {}", ndi.version()?);
///
/// // A second load in the same process is rejected.
/// assert!(NDI::load_default().is_err());
///
/// ndi.unload();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct NDI {
    runtime: Arc<Runtime>,
}

impl fmt::Debug for NDI {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NDI")
            .field("source", &self.runtime.source)
            .field("handles", &Arc::strong_count(&self.runtime))
            .finish()
    }
}

impl NDI {
    /// Loads and initializes the runtime from an explicit library path.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyLoaded`] if a runtime is already active in this process.
    /// - [`Error::LibraryLoad`] if the file cannot be opened as a shared library.
    /// - [`Error::ProcResolution`] if `NDIlib_v3_load` is missing or returns null.
    /// - [`Error::MissingEntryPoints`] if the function table is incomplete.
    /// - [`Error::InitializationFailed`] if the runtime refuses to start.
    ///
    /// On any error nothing stays loaded and the slot is free for another attempt.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let slot = RUNTIME.reserve()?;
        let library = open_library(path)?;
        Self::from_library(library, path.to_path_buf(), slot)
    }

    /// Loads the runtime from the default search locations.
    ///
    /// Equivalent to `NDI::load_with(&LibraryLocator::new())`.
    pub fn load_default() -> Result<Self> {
        Self::load_with(&LibraryLocator::new())
    }

    /// Loads the runtime from the first candidate path that opens.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the locator yields no paths
    /// at all, and [`Error::LibraryNotFound`] if no candidate can be opened. Errors
    /// after a successful open (resolution, initialization) are returned as-is
    /// and no further candidates are tried.
    pub fn load_with(locator: &LibraryLocator) -> Result<Self> {
        let candidates = locator.candidates();
        if candidates.is_empty() {
            return Err(Error::InvalidConfiguration(
                "library locator yields no candidate paths".into(),
            ));
        }
        let slot = RUNTIME.reserve()?;

        for path in &candidates {
            match open_library(path) {
                Ok(library) => return Self::from_library(library, path.clone(), slot),
                Err(err) => tracing::debug!("skipping NDI runtime candidate: {err}"),
            }
        }

        Err(Error::LibraryNotFound {
            searched: candidates,
        })
    }

    /// Builds a runtime from a function table obtained without `libloading`,
    /// for example from a statically linked runtime's `NDIlib_v3_load`.
    ///
    /// The same single-instance, validation and initialization rules as
    /// [`NDI::load`] apply. The entries are copied; `table` itself need not
    /// outlive the call.
    ///
    /// # Safety
    ///
    /// Every non-null entry must point to a function with the documented
    /// signature that remains callable until the returned handle and all of
    /// its clones are dropped.
    pub unsafe fn from_table(table: &NDIlib_v3) -> Result<Self> {
        let slot = RUNTIME.reserve()?;
        Self::initialize(table, None, None, slot)
    }

    fn from_library(library: Library, path: PathBuf, slot: LoadSlot) -> Result<Self> {
        let load: NDIlib_v3_load_fn = unsafe {
            *library
                .get::<NDIlib_v3_load_fn>(ffi::NDIlib_v3_load_symbol)
                .map_err(|err| Error::ProcResolution {
                    symbol: "NDIlib_v3_load",
                    reason: err.to_string(),
                })?
        };

        let table = unsafe { load() };
        if table.is_null() {
            return Err(Error::ProcResolution {
                symbol: "NDIlib_v3_load",
                reason: "returned a null function table".into(),
            });
        }

        // SAFETY: the table lives in the library's static data, which stays
        // mapped because `library` moves into the runtime.
        unsafe { Self::initialize(&*table, Some(library), Some(path), slot) }
    }

    unsafe fn initialize(
        table: &NDIlib_v3,
        library: Option<Library>,
        source: Option<PathBuf>,
        slot: LoadSlot,
    ) -> Result<Self> {
        let api = Api::resolve(table)?;

        if !(api.initialize)() {
            let reason = if (api.is_supported_CPU)() {
                "NDIlib_initialize returned false"
            } else {
                "NDIlib_initialize returned false; this CPU is not supported"
            };
            return Err(Error::InitializationFailed(reason.into()));
        }

        slot.commit();
        tracing::info!(
            source = ?source,
            ptz = api.ptz.is_some(),
            recording = api.recording.is_some(),
            "NDI runtime initialized"
        );

        Ok(Self {
            runtime: Arc::new(Runtime {
                api,
                library,
                source,
                _slot: slot,
            }),
        })
    }

    /// Releases this handle.
    ///
    /// The runtime is destroyed and its library unloaded once every other
    /// clone and every instance created from it have been dropped as well.
    pub fn unload(self) {
        drop(self);
    }

    /// Checks whether a runtime is currently loaded in this process.
    pub fn is_loaded() -> bool {
        RUNTIME.is_loaded()
    }

    /// Checks if the current CPU is supported by the runtime.
    pub fn is_supported_cpu(&self) -> bool {
        unsafe { (self.api().is_supported_CPU)() }
    }

    /// Returns the version string of the runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime returns no string or it is not UTF-8.
    pub fn version(&self) -> Result<String> {
        unsafe {
            let version_ptr = (self.api().version)();
            if version_ptr.is_null() {
                return Err(Error::NullPointer("NDIlib_version".into()));
            }
            CStr::from_ptr(version_ptr)
                .to_str()
                .map(|s| s.to_owned())
                .map_err(|e| Error::InvalidUtf8(e.to_string()))
        }
    }

    /// Whether the loaded runtime exports the v3.01 PTZ entry points.
    pub fn supports_ptz(&self) -> bool {
        self.api().ptz.is_some()
    }

    /// Whether the loaded runtime exports the v3.01 recording entry points.
    pub fn supports_recording(&self) -> bool {
        self.api().recording.is_some()
    }

    /// Path the runtime library was loaded from, if it came from a file.
    pub fn library_path(&self) -> Option<&Path> {
        self.runtime.source.as_deref()
    }

    /// Converts planar float audio to interleaved 16-bit samples.
    ///
    /// `reference_level` is the headroom in dB that maps to full scale.
    pub fn audio_to_interleaved_16s(
        &self,
        frame: &AudioFrame,
        reference_level: i32,
    ) -> Result<InterleavedAudio16s> {
        frame.validate()?;
        let mut out = InterleavedAudio16s::with_layout(
            frame.sample_rate,
            frame.num_channels,
            frame.num_samples,
        )?;
        out.timecode = frame.timecode;
        out.reference_level = reference_level;

        let src = frame.to_raw();
        let mut dst = out.to_raw_mut();
        unsafe { (self.api().util_audio_to_interleaved_16s_v2)(&src, &mut dst) };
        Ok(out)
    }

    /// Converts interleaved 16-bit samples to planar float audio.
    pub fn audio_from_interleaved_16s(&self, frame: &InterleavedAudio16s) -> Result<AudioFrame> {
        frame.validate()?;
        let mut out = AudioFrame::builder()
            .sample_rate(frame.sample_rate)
            .channels(frame.num_channels)
            .samples(frame.num_samples)
            .timecode(frame.timecode)
            .build()?;

        let src = frame.to_raw();
        let mut dst = out.to_raw_mut();
        unsafe { (self.api().util_audio_from_interleaved_16s_v2)(&src, &mut dst) };
        Ok(out)
    }

    /// Converts planar float audio to interleaved float samples.
    pub fn audio_to_interleaved_32f(&self, frame: &AudioFrame) -> Result<InterleavedAudio32f> {
        frame.validate()?;
        let mut out = InterleavedAudio32f::with_layout(
            frame.sample_rate,
            frame.num_channels,
            frame.num_samples,
        )?;
        out.timecode = frame.timecode;

        let src = frame.to_raw();
        let mut dst = out.to_raw_mut();
        unsafe { (self.api().util_audio_to_interleaved_32f_v2)(&src, &mut dst) };
        Ok(out)
    }

    /// Converts interleaved float samples to planar float audio.
    pub fn audio_from_interleaved_32f(&self, frame: &InterleavedAudio32f) -> Result<AudioFrame> {
        frame.validate()?;
        let mut out = AudioFrame::builder()
            .sample_rate(frame.sample_rate)
            .channels(frame.num_channels)
            .samples(frame.num_samples)
            .timecode(frame.timecode)
            .build()?;

        let src = frame.to_raw();
        let mut dst = out.to_raw_mut();
        unsafe { (self.api().util_audio_from_interleaved_32f_v2)(&src, &mut dst) };
        Ok(out)
    }

    pub(crate) fn api(&self) -> &Api {
        &self.runtime.api
    }
}

fn open_library(path: &Path) -> Result<Library> {
    tracing::debug!(path = %path.display(), "opening NDI runtime library");
    // SAFETY: loading a library runs its initializers; the NDI runtime's are
    // the vendor's responsibility.
    unsafe { Library::new(path) }.map_err(|source| Error::LibraryLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Converts a timeout to the runtime's millisecond argument, saturating at `u32::MAX`.
pub(crate) fn to_ms(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX)
}
