//! NDI sending: video (sync and zero-copy async), audio, metadata and tally.

use std::{
    cell::Cell,
    ffi::{CStr, CString},
    fmt,
    marker::PhantomData,
    ptr,
    time::Duration,
};

use crate::{
    capture::RawFrameType,
    ffi::*,
    finder::{optional_cstring, ptr_or_null, Source},
    frames::{
        buffer_len, calculate_line_stride, AudioFrame, InterleavedAudio16s, InterleavedAudio32f,
        MetadataFrame, PixelFormat, ScanType, VideoFrame,
    },
    receiver::Tally,
    runtime::to_ms,
    Error, Result, NDI,
};

/// Settings for [`Sender::new`].
#[derive(Debug, Clone)]
pub struct SenderOptions {
    /// Source name; empty lets the runtime choose one.
    pub name: String,
    pub groups: Option<String>,
    /// Rate-limit video sends to the frame rate.
    pub clock_video: bool,
    /// Rate-limit audio sends to the sample rate.
    pub clock_audio: bool,
}

impl SenderOptions {
    /// Create a builder for configuring send options
    pub fn builder<S: Into<String>>(name: S) -> SenderOptionsBuilder {
        SenderOptionsBuilder::new(name)
    }
}

/// Builder for [`SenderOptions`]. Both clocks default to on.
#[derive(Debug, Clone)]
pub struct SenderOptionsBuilder {
    name: String,
    groups: Option<String>,
    clock_video: Option<bool>,
    clock_audio: Option<bool>,
}

impl SenderOptionsBuilder {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            groups: None,
            clock_video: None,
            clock_audio: None,
        }
    }

    /// Set the groups for this sender
    #[must_use]
    pub fn groups<S: Into<String>>(mut self, groups: S) -> Self {
        self.groups = Some(groups.into());
        self
    }

    /// Configure whether to clock video
    #[must_use]
    pub fn clock_video(mut self, clock: bool) -> Self {
        self.clock_video = Some(clock);
        self
    }

    /// Configure whether to clock audio
    #[must_use]
    pub fn clock_audio(mut self, clock: bool) -> Self {
        self.clock_audio = Some(clock);
        self
    }

    pub fn build(self) -> SenderOptions {
        SenderOptions {
            name: self.name,
            groups: self.groups,
            clock_video: self.clock_video.unwrap_or(true),
            clock_audio: self.clock_audio.unwrap_or(true),
        }
    }
}

/// A video frame over a caller-owned buffer, for zero-copy async sends.
pub struct BorrowedVideoFrame<'buf> {
    pub width: i32,
    pub height: i32,
    pub pixel_format: PixelFormat,
    pub frame_rate_n: i32,
    pub frame_rate_d: i32,
    pub picture_aspect_ratio: f32,
    pub scan_type: ScanType,
    pub timecode: i64,
    pub data: &'buf [u8],
    pub line_stride: i32,
    pub metadata: Option<&'buf CStr>,
    pub timestamp: i64,
}

impl<'buf> BorrowedVideoFrame<'buf> {
    /// A progressive, tightly packed frame over `data`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidFrame`] if `data` is too small for the geometry.
    pub fn from_buffer(
        data: &'buf [u8],
        width: i32,
        height: i32,
        pixel_format: PixelFormat,
        frame_rate_n: i32,
        frame_rate_d: i32,
    ) -> Result<Self> {
        let frame = BorrowedVideoFrame {
            width,
            height,
            pixel_format,
            frame_rate_n,
            frame_rate_d,
            picture_aspect_ratio: 16.0 / 9.0,
            scan_type: ScanType::Progressive,
            timecode: NDIlib_send_timecode_synthesize,
            data,
            line_stride: calculate_line_stride(pixel_format, width),
            metadata: None,
            timestamp: 0,
        };
        frame.validate()?;
        Ok(frame)
    }

    fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 || self.line_stride <= 0 {
            return Err(Error::InvalidFrame(format!(
                "invalid video geometry {}x{} (stride {})",
                self.width, self.height, self.line_stride
            )));
        }
        let needed = buffer_len(self.pixel_format, self.line_stride, self.width, self.height);
        if self.data.len() < needed {
            return Err(Error::InvalidFrame(format!(
                "video buffer holds {} bytes, {needed} required",
                self.data.len()
            )));
        }
        Ok(())
    }

    fn to_raw(&self) -> NDIlib_video_frame_v2_t {
        NDIlib_video_frame_v2_t {
            xres: self.width,
            yres: self.height,
            FourCC: self.pixel_format.into(),
            frame_rate_N: self.frame_rate_n,
            frame_rate_D: self.frame_rate_d,
            picture_aspect_ratio: self.picture_aspect_ratio,
            frame_format_type: self.scan_type.into(),
            timecode: self.timecode,
            p_data: self.data.as_ptr() as *mut u8,
            line_stride_in_bytes: self.line_stride,
            p_metadata: self.metadata.map_or(ptr::null(), CStr::as_ptr),
            timestamp: self.timestamp,
        }
    }
}

impl<'buf> From<&'buf VideoFrame> for BorrowedVideoFrame<'buf> {
    fn from(frame: &'buf VideoFrame) -> Self {
        BorrowedVideoFrame {
            width: frame.width,
            height: frame.height,
            pixel_format: frame.pixel_format,
            frame_rate_n: frame.frame_rate_n,
            frame_rate_d: frame.frame_rate_d,
            picture_aspect_ratio: frame.picture_aspect_ratio,
            scan_type: frame.scan_type,
            timecode: frame.timecode,
            data: &frame.data,
            line_stride: frame.line_stride,
            metadata: frame.metadata.as_deref(),
            timestamp: frame.timestamp,
        }
    }
}

/// Keeps the buffer of an async video send borrowed.
///
/// The runtime holds the most recent async buffer until the next async send or
/// a flush. Dropping the token of the most recent send flushes, so the buffer
/// is free to reuse once its token is gone.
#[must_use = "dropping the token immediately flushes the send"]
pub struct AsyncVideoToken<'buf> {
    sender: &'buf Sender,
    sequence: u64,
    _frame: PhantomData<&'buf [u8]>,
}

impl fmt::Debug for AsyncVideoToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncVideoToken")
            .field("sequence", &self.sequence)
            .finish()
    }
}

impl Drop for AsyncVideoToken<'_> {
    fn drop(&mut self) {
        if self.sender.latest_async.get() == Some(self.sequence) {
            self.sender.flush_async_blocking();
        }
    }
}

/// An NDI source on this machine.
pub struct Sender {
    ndi: NDI,
    instance: NDIlib_send_instance_t,
    name: String,
    _name: Option<CString>,
    _groups: Option<CString>,
    sequence: Cell<u64>,
    /// Sequence number of the async send the runtime still holds, if any.
    latest_async: Cell<Option<u64>>,
}

impl fmt::Debug for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender")
            .field("instance", &self.instance)
            .field("name", &self.name)
            .field("async_pending", &self.latest_async.get().is_some())
            .finish()
    }
}

impl Sender {
    /// Creates a sender and announces it on the network.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCString`] if the name or groups contain a NUL byte.
    /// - [`Error::CreationFailed`] if the runtime returns a null handle.
    pub fn new(ndi: &NDI, options: &SenderOptions) -> Result<Self> {
        let name = optional_cstring(Some(options.name.as_str()))?;
        let groups = optional_cstring(options.groups.as_deref())?;

        let create = NDIlib_send_create_t {
            p_ndi_name: ptr_or_null(&name),
            p_groups: ptr_or_null(&groups),
            clock_video: options.clock_video,
            clock_audio: options.clock_audio,
        };

        let instance = unsafe { (ndi.api().send_create)(&create) };
        if instance.is_null() {
            tracing::warn!(name = %options.name, "NDIlib_send_create returned null");
            return Err(Error::CreationFailed("sender (NDIlib_send_create)".into()));
        }
        tracing::debug!(?instance, name = %options.name, "sender created");

        Ok(Self {
            ndi: ndi.clone(),
            instance,
            name: options.name.clone(),
            _name: name,
            _groups: groups,
            sequence: Cell::new(0),
            latest_async: Cell::new(None),
        })
    }

    /// The name this sender was created with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sends a video frame; the runtime is done with the buffer on return.
    pub fn send_video(&self, frame: &VideoFrame) -> Result<()> {
        frame.validate()?;
        unsafe { (self.ndi.api().send_send_video_v2)(self.instance, &frame.to_raw()) };
        Ok(())
    }

    /// Sends a video frame without copying it.
    ///
    /// The buffer stays borrowed until the returned token is dropped (which
    /// flushes) or a later async send replaces it.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use ndi_dyn::{NDI, Sender, SenderOptions, BorrowedVideoFrame, PixelFormat};
    /// # fn main() -> Result<(), ndi_dyn::Error> {
    /// let ndi = NDI::load_default()?;
    /// let sender = Sender::new(&ndi, &SenderOptions::builder("MyCam").build())?;
    ///
    /// let mut buffer = vec![0u8; 1920 * 1080 * 4];
    /// for i in 0..60u8 {
    ///     buffer.fill(i);
    ///     let frame = BorrowedVideoFrame::from_buffer(&buffer, 1920, 1080, PixelFormat::BGRA, 30, 1)?;
    ///     let token = sender.send_video_async(&frame)?;
    ///     drop(token); // flushes; `buffer` may be written again
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn send_video_async<'b>(
        &'b self,
        frame: &BorrowedVideoFrame<'b>,
    ) -> Result<AsyncVideoToken<'b>> {
        frame.validate()?;
        let sequence = self.sequence.get().wrapping_add(1);
        self.sequence.set(sequence);

        unsafe { (self.ndi.api().send_send_video_async_v2)(self.instance, &frame.to_raw()) };
        self.latest_async.set(Some(sequence));

        Ok(AsyncVideoToken {
            sender: self,
            sequence,
            _frame: PhantomData,
        })
    }

    /// Waits until the runtime has released every async video buffer.
    pub fn flush_async_blocking(&self) {
        let null_frame = NDIlib_video_frame_v2_t::default();
        unsafe { (self.ndi.api().send_send_video_async_v2)(self.instance, &null_frame) };
        self.latest_async.set(None);
    }

    /// Sends planar float audio; the runtime is done with the buffer on return.
    pub fn send_audio(&self, frame: &AudioFrame) -> Result<()> {
        frame.validate()?;
        unsafe { (self.ndi.api().send_send_audio_v2)(self.instance, &frame.to_raw()) };
        Ok(())
    }

    /// Sends interleaved 16-bit audio, converted by the runtime.
    pub fn send_audio_interleaved_16s(&self, frame: &InterleavedAudio16s) -> Result<()> {
        frame.validate()?;
        unsafe {
            (self.ndi.api().util_send_send_audio_interleaved_16s)(self.instance, &frame.to_raw())
        };
        Ok(())
    }

    /// Sends interleaved float audio, converted by the runtime.
    pub fn send_audio_interleaved_32f(&self, frame: &InterleavedAudio32f) -> Result<()> {
        frame.validate()?;
        unsafe {
            (self.ndi.api().util_send_send_audio_interleaved_32f)(self.instance, &frame.to_raw())
        };
        Ok(())
    }

    pub fn send_metadata(&self, frame: &MetadataFrame) -> Result<()> {
        let (_data, raw) = frame.to_raw()?;
        unsafe { (self.ndi.api().send_send_metadata)(self.instance, &raw) };
        Ok(())
    }

    /// Waits up to `timeout` for metadata sent back by a receiver.
    ///
    /// The frame is copied and released before returning.
    pub fn capture_metadata(&self, timeout: Duration) -> Result<Option<MetadataFrame>> {
        let mut raw = NDIlib_metadata_frame_t::default();
        let frame_type =
            unsafe { (self.ndi.api().send_capture)(self.instance, &mut raw, to_ms(timeout)) };

        match RawFrameType::decode(frame_type)? {
            RawFrameType::Metadata => {
                let frame = unsafe { MetadataFrame::from_raw(&raw) };
                unsafe { (self.ndi.api().send_free_metadata)(self.instance, &raw) };
                Ok(Some(frame))
            }
            RawFrameType::ErrorFrame => Err(Error::CaptureFailed(
                "the runtime reported an error frame on the sender".into(),
            )),
            _ => Ok(None),
        }
    }

    /// Current tally, and whether it changed within `timeout`.
    pub fn tally(&self, timeout: Duration) -> (Tally, bool) {
        let mut raw = NDIlib_tally_t::default();
        let changed =
            unsafe { (self.ndi.api().send_get_tally)(self.instance, &mut raw, to_ms(timeout)) };
        (Tally::from_raw(raw), changed)
    }

    /// Number of connected receivers, waiting up to `timeout` for one to appear.
    pub fn connections(&self, timeout: Duration) -> usize {
        let count =
            unsafe { (self.ndi.api().send_get_no_connections)(self.instance, to_ms(timeout)) };
        count.max(0) as usize
    }

    /// Metadata every new receiver connection gets on connect.
    pub fn add_connection_metadata(&self, frame: &MetadataFrame) -> Result<()> {
        let (_data, raw) = frame.to_raw()?;
        unsafe { (self.ndi.api().send_add_connection_metadata)(self.instance, &raw) };
        Ok(())
    }

    pub fn clear_connection_metadata(&self) {
        unsafe { (self.ndi.api().send_clear_connection_metadata)(self.instance) };
    }

    /// Source receivers switch to if this sender goes away; `None` clears it.
    pub fn set_failover(&self, source: Option<&Source>) -> Result<()> {
        let raw = source.map(Source::to_raw).transpose()?;
        let p_source = raw.as_ref().map_or(ptr::null(), |r| &r.raw as *const _);
        unsafe { (self.ndi.api().send_set_failover)(self.instance, p_source) };
        Ok(())
    }
}

impl Drop for Sender {
    fn drop(&mut self) {
        if self.latest_async.get().is_some() {
            self.flush_async_blocking();
        }
        tracing::debug!(instance = ?self.instance, name = %self.name, "destroying sender");
        unsafe { (self.ndi.api().send_destroy)(self.instance) };
    }
}

/// # Safety
///
/// The handle is an opaque runtime pointer; moving it to another thread is
/// fine. The async bookkeeping uses `Cell`, so `Sender` is not `Sync`.
unsafe impl Send for Sender {}
