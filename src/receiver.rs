//! NDI receiving: capture of video, audio and metadata, tally, PTZ and recording.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use std::{
    ffi::{CStr, CString},
    fmt,
    os::raw::c_char,
    thread,
    time::{Duration, Instant},
};

use crate::{
    api::{Api, PtzApi, RecordingApi},
    capture::{capture_kind, AudioKind, MetadataKind, RawFrameType, RecvGuard, VideoKind},
    ffi::*,
    finder::Source,
    frames::{AudioFrameRef, MetadataFrame, MetadataFrameRef, VideoFrameRef},
    runtime::to_ms,
    Error, Result, NDI,
};

/// Pixel formats the runtime delivers video in.
///
/// The second half of each name is used for frames carrying alpha.
#[allow(non_camel_case_types)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum ReceiverColorFormat {
    #[default]
    BGRX_BGRA = NDIlib_recv_color_format_BGRX_BGRA,
    UYVY_BGRA = NDIlib_recv_color_format_UYVY_BGRA,
    RGBX_RGBA = NDIlib_recv_color_format_RGBX_RGBA,
    UYVY_RGBA = NDIlib_recv_color_format_UYVY_RGBA,
    /// Whatever the runtime can deliver with the least conversion.
    Fastest = NDIlib_recv_color_format_fastest,
}

/// How much of the stream to request from the sender.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum ReceiverBandwidth {
    MetadataOnly = NDIlib_recv_bandwidth_metadata_only,
    AudioOnly = NDIlib_recv_bandwidth_audio_only,
    /// Lower resolution preview stream.
    Lowest = NDIlib_recv_bandwidth_lowest,
    #[default]
    Highest = NDIlib_recv_bandwidth_highest,
}

/// Settings for [`Receiver::new`].
#[derive(Debug, Clone)]
pub struct ReceiverOptions {
    pub source: Source,
    pub color: ReceiverColorFormat,
    pub bandwidth: ReceiverBandwidth,
    pub allow_video_fields: bool,
}

impl ReceiverOptions {
    /// Create a builder for configuring a receiver
    pub fn builder(source: Source) -> ReceiverOptionsBuilder {
        ReceiverOptionsBuilder::new(source)
    }
}

/// Builder for [`ReceiverOptions`].
///
/// Defaults: `BGRX_BGRA`, highest bandwidth, fields allowed.
#[derive(Debug, Clone)]
pub struct ReceiverOptionsBuilder {
    source: Source,
    color: Option<ReceiverColorFormat>,
    bandwidth: Option<ReceiverBandwidth>,
    allow_video_fields: Option<bool>,
}

impl ReceiverOptionsBuilder {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            color: None,
            bandwidth: None,
            allow_video_fields: None,
        }
    }

    /// Set the color format for received video
    #[must_use]
    pub fn color(mut self, fmt: ReceiverColorFormat) -> Self {
        self.color = Some(fmt);
        self
    }

    /// Set the bandwidth mode for the receiver
    #[must_use]
    pub fn bandwidth(mut self, bw: ReceiverBandwidth) -> Self {
        self.bandwidth = Some(bw);
        self
    }

    /// Configure whether to allow video fields
    #[must_use]
    pub fn allow_video_fields(mut self, allow: bool) -> Self {
        self.allow_video_fields = Some(allow);
        self
    }

    pub fn build(self) -> ReceiverOptions {
        ReceiverOptions {
            source: self.source,
            color: self.color.unwrap_or_default(),
            bandwidth: self.bandwidth.unwrap_or_default(),
            allow_video_fields: self.allow_video_fields.unwrap_or(true),
        }
    }
}

/// One result of [`Receiver::capture`].
#[derive(Debug)]
pub enum Frame<'rx> {
    /// Nothing arrived before the timeout.
    None,
    Video(VideoFrameRef<'rx>),
    Audio(AudioFrameRef<'rx>),
    Metadata(MetadataFrameRef<'rx>),
    /// The sender's settings changed; nothing to free.
    StatusChange,
}

/// Tally state reported to, or by, a sender.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub on_program: bool,
    pub on_preview: bool,
}

impl Tally {
    pub fn new(on_program: bool, on_preview: bool) -> Self {
        Tally {
            on_program,
            on_preview,
        }
    }

    pub(crate) fn to_raw(self) -> NDIlib_tally_t {
        NDIlib_tally_t {
            on_program: self.on_program,
            on_preview: self.on_preview,
        }
    }

    pub(crate) fn from_raw(raw: NDIlib_tally_t) -> Self {
        Self::new(raw.on_program, raw.on_preview)
    }
}

/// Frames queued for collection, per type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueueDepth {
    pub video: i32,
    pub audio: i32,
    pub metadata: i32,
}

/// Frame counters since the receiver connected.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameCounts {
    pub video: i64,
    pub audio: i64,
    pub metadata: i64,
}

impl From<NDIlib_recv_performance_t> for FrameCounts {
    fn from(raw: NDIlib_recv_performance_t) -> Self {
        FrameCounts {
            video: raw.video_frames,
            audio: raw.audio_frames,
            metadata: raw.metadata_frames,
        }
    }
}

/// Result of [`Receiver::performance`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Performance {
    pub total: FrameCounts,
    pub dropped: FrameCounts,
}

/// Progress of a recording, in 100 ns units.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecordingTimes {
    pub frames: i64,
    pub start_time: i64,
    pub last_time: i64,
}

/// A connection to one NDI source.
///
/// Captured frames borrow the receiver; they must be dropped before it is.
pub struct Receiver {
    ndi: NDI,
    instance: NDIlib_recv_instance_t,
    source: Source,
}

impl fmt::Debug for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("instance", &self.instance)
            .field("source", &self.source)
            .finish()
    }
}

impl Receiver {
    /// Creates a receiver and starts connecting to `options.source`.
    ///
    /// A null handle from the runtime is [`Error::CreationFailed`]; it does not
    /// mean the source is absent, which only shows up as zero connections.
    pub fn new(ndi: &NDI, options: &ReceiverOptions) -> Result<Self> {
        let source = options.source.to_raw()?;
        let create = NDIlib_recv_create_t {
            source_to_connect_to: source.raw,
            color_format: options.color.into(),
            bandwidth: options.bandwidth.into(),
            allow_video_fields: options.allow_video_fields,
        };

        let instance = unsafe { (ndi.api().recv_create_v2)(&create) };
        if instance.is_null() {
            tracing::warn!(source = %options.source, "NDIlib_recv_create_v2 returned null");
            return Err(Error::CreationFailed("receiver (NDIlib_recv_create_v2)".into()));
        }
        tracing::debug!(?instance, source = %options.source, "receiver created");

        Ok(Self {
            ndi: ndi.clone(),
            instance,
            source: options.source.clone(),
        })
    }

    /// The source this receiver was created for.
    pub fn source(&self) -> &Source {
        &self.source
    }

    pub(crate) fn api(&self) -> &Api {
        self.ndi.api()
    }

    pub(crate) fn raw(&self) -> NDIlib_recv_instance_t {
        self.instance
    }

    /// Waits up to `timeout` for any kind of frame.
    ///
    /// Only the frame type the runtime reports is wrapped and later freed.
    pub fn capture(&self, timeout: Duration) -> Result<Frame<'_>> {
        let mut video = NDIlib_video_frame_v2_t::default();
        let mut audio = NDIlib_audio_frame_v2_t::default();
        let mut metadata = NDIlib_metadata_frame_t::default();

        let frame_type = unsafe {
            (self.api().recv_capture_v2)(
                self.instance,
                &mut video,
                &mut audio,
                &mut metadata,
                to_ms(timeout),
            )
        };

        match RawFrameType::decode(frame_type)? {
            RawFrameType::None => Ok(Frame::None),
            RawFrameType::StatusChange => Ok(Frame::StatusChange),
            RawFrameType::Video => {
                let guard = unsafe { RecvGuard::<VideoKind>::new(self, video) };
                VideoFrameRef::new(guard).map(Frame::Video)
            }
            RawFrameType::Audio => {
                let guard = unsafe { RecvGuard::<AudioKind>::new(self, audio) };
                Ok(Frame::Audio(AudioFrameRef::new(guard)))
            }
            RawFrameType::Metadata => {
                let guard = unsafe { RecvGuard::<MetadataKind>::new(self, metadata) };
                Ok(Frame::Metadata(MetadataFrameRef::new(guard)))
            }
            RawFrameType::ErrorFrame => Err(Error::CaptureFailed(
                "the runtime reported an error frame (connection lost?)".into(),
            )),
        }
    }

    /// Waits for a video frame; audio and metadata are left queued.
    pub fn capture_video(&self, timeout: Duration) -> Result<Option<VideoFrameRef<'_>>> {
        capture_kind::<VideoKind>(self, timeout)?
            .map(VideoFrameRef::new)
            .transpose()
    }

    /// Waits for an audio frame; video and metadata are left queued.
    pub fn capture_audio(&self, timeout: Duration) -> Result<Option<AudioFrameRef<'_>>> {
        Ok(capture_kind::<AudioKind>(self, timeout)?.map(AudioFrameRef::new))
    }

    /// Waits for a metadata frame; video and audio are left queued.
    pub fn capture_metadata(&self, timeout: Duration) -> Result<Option<MetadataFrameRef<'_>>> {
        Ok(capture_kind::<MetadataKind>(self, timeout)?.map(MetadataFrameRef::new))
    }

    /// Sends tally state upstream. `false` means no sender is connected.
    pub fn set_tally(&self, tally: &Tally) -> bool {
        let raw = tally.to_raw();
        unsafe { (self.api().recv_set_tally)(self.instance, &raw) }
    }

    /// Sends a metadata frame to the sender. `Ok(false)` means not connected.
    pub fn send_metadata(&self, frame: &MetadataFrame) -> Result<bool> {
        let (_data, raw) = frame.to_raw()?;
        Ok(unsafe { (self.api().recv_send_metadata)(self.instance, &raw) })
    }

    /// Number of connected senders.
    ///
    /// The runtime answers immediately; a nonzero `timeout` polls until a
    /// connection appears or the deadline passes. A timeout too large to form
    /// a deadline waits for the first connection.
    pub fn connections(&self, timeout: Duration) -> usize {
        const POLL_INTERVAL: Duration = Duration::from_millis(10);

        let deadline = Instant::now().checked_add(timeout);
        loop {
            let count = unsafe { (self.api().recv_get_no_connections)(self.instance) };
            if count > 0 {
                return count as usize;
            }
            let pause = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return 0;
                    }
                    POLL_INTERVAL.min(remaining)
                }
                None => POLL_INTERVAL,
            };
            thread::sleep(pause);
        }
    }

    /// Frames waiting to be captured.
    pub fn queue(&self) -> QueueDepth {
        let mut raw = NDIlib_recv_queue_t::default();
        unsafe { (self.api().recv_get_queue)(self.instance, &mut raw) };
        QueueDepth {
            video: raw.video_frames,
            audio: raw.audio_frames,
            metadata: raw.metadata_frames,
        }
    }

    /// Total and dropped frame counters.
    pub fn performance(&self) -> Performance {
        let mut total = NDIlib_recv_performance_t::default();
        let mut dropped = NDIlib_recv_performance_t::default();
        unsafe { (self.api().recv_get_performance)(self.instance, &mut total, &mut dropped) };
        Performance {
            total: total.into(),
            dropped: dropped.into(),
        }
    }

    /// Metadata every new sender connection receives on connect.
    pub fn add_connection_metadata(&self, frame: &MetadataFrame) -> Result<()> {
        let (_data, raw) = frame.to_raw()?;
        unsafe { (self.api().recv_add_connection_metadata)(self.instance, &raw) };
        Ok(())
    }

    pub fn clear_connection_metadata(&self) {
        unsafe { (self.api().recv_clear_connection_metadata)(self.instance) };
    }

    fn ptz(&self) -> Result<&PtzApi> {
        self.api()
            .ptz
            .as_ref()
            .ok_or(Error::Unsupported("PTZ control (NDI 3.01)"))
    }

    fn ptz_command(
        &self,
        what: impl FnOnce() -> String,
        call: impl FnOnce(&PtzApi, NDIlib_recv_instance_t) -> bool,
    ) -> Result<()> {
        let ptz = self.ptz()?;
        if call(ptz, self.instance) {
            Ok(())
        } else {
            Err(Error::PtzCommandFailed(what()))
        }
    }

    /// Whether the connected source accepts PTZ commands.
    ///
    /// `false` on runtimes without the PTZ entry points.
    pub fn ptz_is_supported(&self) -> bool {
        self.ptz()
            .is_ok_and(|ptz| unsafe { (ptz.recv_ptz_is_supported)(self.instance) })
    }

    /// Zoom to an absolute position, 0.0 (wide) to 1.0 (tele).
    pub fn ptz_zoom(&self, zoom: f32) -> Result<()> {
        self.ptz_command(
            || format!("zoom to {zoom}"),
            |ptz, rx| unsafe { (ptz.recv_ptz_zoom)(rx, zoom) },
        )
    }

    /// Zoom at a speed, -1.0 (out) to 1.0 (in).
    pub fn ptz_zoom_speed(&self, speed: f32) -> Result<()> {
        self.ptz_command(
            || format!("zoom speed {speed}"),
            |ptz, rx| unsafe { (ptz.recv_ptz_zoom_speed)(rx, speed) },
        )
    }

    /// Pan and tilt to absolute positions, each -1.0 to 1.0.
    pub fn ptz_pan_tilt(&self, pan: f32, tilt: f32) -> Result<()> {
        self.ptz_command(
            || format!("pan/tilt to {pan}, {tilt}"),
            |ptz, rx| unsafe { (ptz.recv_ptz_pan_tilt)(rx, pan, tilt) },
        )
    }

    pub fn ptz_pan_tilt_speed(&self, pan_speed: f32, tilt_speed: f32) -> Result<()> {
        self.ptz_command(
            || format!("pan/tilt speed {pan_speed}, {tilt_speed}"),
            |ptz, rx| unsafe { (ptz.recv_ptz_pan_tilt_speed)(rx, pan_speed, tilt_speed) },
        )
    }

    /// Stores the current position as preset `preset` (0 to 99).
    pub fn ptz_store_preset(&self, preset: i32) -> Result<()> {
        self.ptz_command(
            || format!("store preset {preset}"),
            |ptz, rx| unsafe { (ptz.recv_ptz_store_preset)(rx, preset) },
        )
    }

    /// Moves to preset `preset` at `speed` (0.0 to 1.0).
    pub fn ptz_recall_preset(&self, preset: i32, speed: f32) -> Result<()> {
        self.ptz_command(
            || format!("recall preset {preset} at speed {speed}"),
            |ptz, rx| unsafe { (ptz.recv_ptz_recall_preset)(rx, preset, speed) },
        )
    }

    pub fn ptz_auto_focus(&self) -> Result<()> {
        self.ptz_command(
            || "auto focus".into(),
            |ptz, rx| unsafe { (ptz.recv_ptz_auto_focus)(rx) },
        )
    }

    /// Manual focus, 0.0 (infinity) to 1.0 (nearest).
    pub fn ptz_focus(&self, focus: f32) -> Result<()> {
        self.ptz_command(
            || format!("focus to {focus}"),
            |ptz, rx| unsafe { (ptz.recv_ptz_focus)(rx, focus) },
        )
    }

    pub fn ptz_focus_speed(&self, speed: f32) -> Result<()> {
        self.ptz_command(
            || format!("focus speed {speed}"),
            |ptz, rx| unsafe { (ptz.recv_ptz_focus_speed)(rx, speed) },
        )
    }

    pub fn ptz_white_balance_auto(&self) -> Result<()> {
        self.ptz_command(
            || "automatic white balance".into(),
            |ptz, rx| unsafe { (ptz.recv_ptz_white_balance_auto)(rx) },
        )
    }

    pub fn ptz_white_balance_indoor(&self) -> Result<()> {
        self.ptz_command(
            || "indoor white balance".into(),
            |ptz, rx| unsafe { (ptz.recv_ptz_white_balance_indoor)(rx) },
        )
    }

    pub fn ptz_white_balance_outdoor(&self) -> Result<()> {
        self.ptz_command(
            || "outdoor white balance".into(),
            |ptz, rx| unsafe { (ptz.recv_ptz_white_balance_outdoor)(rx) },
        )
    }

    /// Measures white balance once and holds it.
    pub fn ptz_white_balance_oneshot(&self) -> Result<()> {
        self.ptz_command(
            || "one-shot white balance".into(),
            |ptz, rx| unsafe { (ptz.recv_ptz_white_balance_oneshot)(rx) },
        )
    }

    /// Manual white balance, red and blue each 0.0 to 1.0.
    pub fn ptz_white_balance_manual(&self, red: f32, blue: f32) -> Result<()> {
        self.ptz_command(
            || format!("manual white balance red {red} blue {blue}"),
            |ptz, rx| unsafe { (ptz.recv_ptz_white_balance_manual)(rx, red, blue) },
        )
    }

    pub fn ptz_exposure_auto(&self) -> Result<()> {
        self.ptz_command(
            || "automatic exposure".into(),
            |ptz, rx| unsafe { (ptz.recv_ptz_exposure_auto)(rx) },
        )
    }

    /// Manual exposure, 0.0 (dark) to 1.0 (light).
    pub fn ptz_exposure_manual(&self, level: f32) -> Result<()> {
        self.ptz_command(
            || format!("manual exposure {level}"),
            |ptz, rx| unsafe { (ptz.recv_ptz_exposure_manual)(rx, level) },
        )
    }

    fn recording(&self) -> Result<&RecordingApi> {
        self.api()
            .recording
            .as_ref()
            .ok_or(Error::Unsupported("recording (NDI 3.01)"))
    }

    /// Whether the connected source can be recorded by the runtime.
    pub fn recording_is_supported(&self) -> bool {
        self.recording()
            .is_ok_and(|rec| unsafe { (rec.recv_recording_is_supported)(self.instance) })
    }

    /// Starts recording on the sender's machine. `filename_hint` is optional.
    pub fn recording_start(&self, filename_hint: Option<&str>) -> Result<()> {
        let rec = self.recording()?;
        let hint = filename_hint.map(CString::new).transpose()?;
        let p_hint = hint.as_ref().map_or(std::ptr::null(), |h| h.as_ptr());
        if unsafe { (rec.recv_recording_start)(self.instance, p_hint) } {
            tracing::info!(source = %self.source, "recording started");
            Ok(())
        } else {
            Err(Error::RecordingFailed("start".into()))
        }
    }

    pub fn recording_stop(&self) -> Result<()> {
        let rec = self.recording()?;
        if unsafe { (rec.recv_recording_stop)(self.instance) } {
            tracing::info!(source = %self.source, "recording stopped");
            Ok(())
        } else {
            Err(Error::RecordingFailed("stop".into()))
        }
    }

    /// Sets the recorded audio level in decibels.
    pub fn recording_set_audio_level(&self, level_db: f32) -> Result<()> {
        let rec = self.recording()?;
        if unsafe { (rec.recv_recording_set_audio_level)(self.instance, level_db) } {
            Ok(())
        } else {
            Err(Error::RecordingFailed(format!("set audio level to {level_db} dB")))
        }
    }

    pub fn recording_is_recording(&self) -> Result<bool> {
        let rec = self.recording()?;
        Ok(unsafe { (rec.recv_recording_is_recording)(self.instance) })
    }

    /// File currently being recorded to, if any.
    pub fn recording_filename(&self) -> Result<Option<String>> {
        let rec = self.recording()?;
        let p = unsafe { (rec.recv_recording_get_filename)(self.instance) };
        unsafe { self.take_string(rec.recv_free_string, p) }
    }

    /// Last recording error, if any.
    pub fn recording_error(&self) -> Result<Option<String>> {
        let rec = self.recording()?;
        let p = unsafe { (rec.recv_recording_get_error)(self.instance) };
        unsafe { self.take_string(rec.recv_free_string, p) }
    }

    /// `Ok(None)` when nothing is being recorded.
    pub fn recording_times(&self) -> Result<Option<RecordingTimes>> {
        let rec = self.recording()?;
        let mut raw = NDIlib_recv_recording_time_t::default();
        if unsafe { (rec.recv_recording_get_times)(self.instance, &mut raw) } {
            Ok(Some(RecordingTimes {
                frames: raw.no_frames,
                start_time: raw.start_time,
                last_time: raw.last_time,
            }))
        } else {
            Ok(None)
        }
    }

    /// URL of the source's web configuration page, if it has one.
    pub fn web_control(&self) -> Result<Option<String>> {
        let web = self
            .api()
            .web_control
            .as_ref()
            .ok_or(Error::Unsupported("web control (NDI 3.01)"))?;
        let p = unsafe { (web.recv_get_web_control)(self.instance) };
        unsafe { self.take_string(web.recv_free_string, p) }
    }

    /// Copies a runtime-owned string and hands it back with `free`.
    ///
    /// # Safety
    ///
    /// `p` must be null or a string this receiver's runtime allocated.
    unsafe fn take_string(
        &self,
        free: unsafe extern "C" fn(NDIlib_recv_instance_t, *const c_char),
        p: *const c_char,
    ) -> Result<Option<String>> {
        if p.is_null() {
            return Ok(None);
        }
        let copied = CStr::from_ptr(p).to_str().map(str::to_owned);
        free(self.instance, p);
        copied
            .map(Some)
            .map_err(|e| Error::InvalidUtf8(e.to_string()))
    }
}

impl Drop for Receiver {
    fn drop(&mut self) {
        tracing::debug!(instance = ?self.instance, "destroying receiver");
        unsafe { (self.api().recv_destroy)(self.instance) };
    }
}

/// # Safety
///
/// The handle is only used through `&self` methods that forward to the
/// runtime; moving it between threads is fine. Frames borrow the receiver, so
/// it cannot be dropped while one is alive. It is not `Sync`: callers that
/// share a receiver wrap it in a mutex, as the async wrapper does.
unsafe impl Send for Receiver {}
