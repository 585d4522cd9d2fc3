//! Frame types for video, audio, and metadata.
//!
//! Owned frames ([`VideoFrame`], [`AudioFrame`], [`MetadataFrame`] and the
//! interleaved audio types) hold their own buffers and can be sent or kept
//! indefinitely. Borrowed frames ([`VideoFrameRef`], [`AudioFrameRef`],
//! [`MetadataFrameRef`]) are views over a buffer the runtime lent to a
//! [`Receiver`](crate::Receiver); they release it when dropped.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use std::{
    ffi::{CStr, CString},
    fmt,
    os::raw::c_char,
    ptr, slice,
};

use crate::{
    capture::{RecvAudioGuard, RecvMetadataGuard, RecvVideoGuard},
    ffi::*,
    Error, Result,
};

/// Video pixel format identifiers (FourCC codes).
///
/// These are the formats the v3 runtime understands. BGRA/RGBA carry full
/// quality; UYVY is the bandwidth-efficient native format of the transport.
///
/// This enum is marked `#[non_exhaustive]` so that newer runtime formats can be
/// added later. Always use a wildcard pattern when matching.
///
/// # Examples
///
/// ```
/// use ndi_dyn::PixelFormat;
///
/// let format = PixelFormat::BGRX;
/// assert_eq!(u32::from(format).to_le_bytes(), *b"BGRX");
///
/// match format {
///     PixelFormat::BGRA | PixelFormat::BGRX => println!("Blue-first RGB"),
///     PixelFormat::UYVY => println!("YUV 4:2:2"),
///     _ => println!("Other format"),
/// }
/// ```
#[derive(Debug, TryFromPrimitive, IntoPrimitive, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u32)]
pub enum PixelFormat {
    /// YCbCr 4:2:2 (16 bits per pixel).
    UYVY = NDIlib_FourCC_type_UYVY,
    /// YCbCr 4:2:2 followed by an alpha plane.
    UYVA = NDIlib_FourCC_type_UYVA,
    /// Planar YCrCb 4:2:0.
    YV12 = NDIlib_FourCC_type_YV12,
    /// Planar YCbCr 4:2:0.
    I420 = NDIlib_FourCC_type_I420,
    /// Semi-planar YCbCr 4:2:0.
    NV12 = NDIlib_FourCC_type_NV12,
    /// Blue-Green-Red-Alpha (32 bits per pixel).
    BGRA = NDIlib_FourCC_type_BGRA,
    /// Blue-Green-Red with padding (32 bits per pixel).
    BGRX = NDIlib_FourCC_type_BGRX,
    /// Red-Green-Blue-Alpha (32 bits per pixel).
    RGBA = NDIlib_FourCC_type_RGBA,
    /// Red-Green-Blue with padding (32 bits per pixel).
    RGBX = NDIlib_FourCC_type_RGBX,
}

/// Video scan type (progressive, interlaced, or a single field).
///
/// Marked `#[non_exhaustive]`; match with a wildcard.
#[derive(Debug, TryFromPrimitive, IntoPrimitive, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(i32)]
pub enum ScanType {
    /// Both fields interleaved in one frame.
    Interlaced = NDIlib_frame_format_type_interleaved,
    /// Progressive frame.
    Progressive = NDIlib_frame_format_type_progressive,
    /// Even field only.
    Field0 = NDIlib_frame_format_type_field_0,
    /// Odd field only.
    Field1 = NDIlib_frame_format_type_field_1,
}

/// Maximum accepted size of a received video buffer (100 MiB).
const MAX_VIDEO_BYTES: usize = 100 * 1024 * 1024;

/// Maximum accepted size of a received audio buffer (64 MiB).
const MAX_AUDIO_BYTES: usize = 64 * 1024 * 1024;

/// Rounds up for odd dimensions (1081 lines have 541 chroma lines).
#[inline]
fn ceil_div2(x: i32) -> i32 {
    (x + 1) / 2
}

/// Total buffer length of an uncompressed frame with the given Y stride.
///
/// - Packed formats: `stride * height`.
/// - UYVA: the UYVY plane followed by a `width * height` alpha plane.
/// - YV12/I420: Y plus two chroma planes of half stride and half height.
/// - NV12: Y plus one interleaved chroma plane of full stride and half height.
pub(crate) fn buffer_len(fmt: PixelFormat, y_stride: i32, width: i32, height: i32) -> usize {
    let y_size = (y_stride as usize) * (height as usize);
    let chroma_height = ceil_div2(height) as usize;

    match fmt {
        PixelFormat::YV12 | PixelFormat::I420 => {
            let chroma_stride = (y_stride / 2) as usize;
            y_size + 2 * chroma_stride * chroma_height
        }
        PixelFormat::NV12 => y_size + (y_stride as usize) * chroma_height,
        PixelFormat::UYVA => y_size + (width as usize) * (height as usize),
        _ => y_size,
    }
}

/// Line stride (bytes per row of the first plane) of a tightly packed frame.
///
/// Saturates at `i32::MAX` for widths no runtime could describe; such frames
/// then fail buffer validation.
pub fn calculate_line_stride(format: PixelFormat, width: i32) -> i32 {
    match format {
        PixelFormat::BGRA | PixelFormat::BGRX | PixelFormat::RGBA | PixelFormat::RGBX => {
            width.saturating_mul(4)
        }
        PixelFormat::UYVY | PixelFormat::UYVA => width.saturating_mul(2),
        PixelFormat::YV12 | PixelFormat::I420 | PixelFormat::NV12 => width,
    }
}

/// An owned video frame.
///
/// `data` holds `line_stride * height` bytes for packed formats (plus the
/// extra planes for UYVA and the 4:2:0 formats). `timecode` defaults to
/// [`NDIlib_send_timecode_synthesize`], which asks the runtime to fill it in.
pub struct VideoFrame {
    pub width: i32,
    pub height: i32,
    pub pixel_format: PixelFormat,
    pub frame_rate_n: i32,
    pub frame_rate_d: i32,
    pub picture_aspect_ratio: f32,
    pub scan_type: ScanType,
    pub timecode: i64,
    pub data: Vec<u8>,
    pub line_stride: i32,
    pub metadata: Option<CString>,
    pub timestamp: i64,
}

impl fmt::Debug for VideoFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoFrame")
            .field("size", &format_args!("{}x{}", self.width, self.height))
            .field("format", &self.pixel_format)
            .field("rate", &format_args!("{}/{}", self.frame_rate_n, self.frame_rate_d))
            .field("scan", &self.scan_type)
            .field("stride", &self.line_stride)
            .field("bytes", &self.data.len())
            .field("timecode", &self.timecode)
            .finish_non_exhaustive()
    }
}

impl VideoFrame {
    /// Create a builder for configuring a video frame
    pub fn builder() -> VideoFrameBuilder {
        VideoFrameBuilder::new()
    }

    /// Raw descriptor pointing into this frame's buffer.
    ///
    /// The runtime only reads through `p_data` when sending.
    pub(crate) fn to_raw(&self) -> NDIlib_video_frame_v2_t {
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
            p_metadata: self.metadata.as_ref().map_or(ptr::null(), |m| m.as_ptr()),
            timestamp: self.timestamp,
        }
    }

    /// Checks that `data` is large enough for the declared geometry.
    pub(crate) fn validate(&self) -> Result<()> {
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

    /// Copies a raw frame into an owned `VideoFrame`.
    ///
    /// # Safety
    ///
    /// `raw.p_data` must point to at least as many readable bytes as the
    /// frame's geometry implies, and `raw.p_metadata` must be null or a valid
    /// NUL-terminated string.
    pub unsafe fn from_raw(raw: &NDIlib_video_frame_v2_t) -> Result<VideoFrame> {
        if raw.p_data.is_null() {
            return Err(Error::InvalidFrame("Video frame has null data pointer".into()));
        }

        let pixel_format = PixelFormat::try_from(raw.FourCC).map_err(|_| {
            Error::InvalidFrame(format!("Unknown pixel format FourCC: 0x{:08X}", raw.FourCC))
        })?;

        let scan_type = ScanType::try_from(raw.frame_format_type).map_err(|_| {
            Error::InvalidFrame(format!("Unknown scan type: {}", raw.frame_format_type))
        })?;

        let line_stride = raw.line_stride_in_bytes;
        if line_stride <= 0 || raw.xres <= 0 || raw.yres <= 0 {
            return Err(Error::InvalidFrame(format!(
                "invalid video geometry {}x{} (stride {line_stride})",
                raw.xres, raw.yres
            )));
        }

        let data_size = buffer_len(pixel_format, line_stride, raw.xres, raw.yres);
        if data_size > MAX_VIDEO_BYTES {
            return Err(Error::InvalidFrame(format!(
                "Video frame exceeds maximum size: {data_size} bytes > {MAX_VIDEO_BYTES} bytes"
            )));
        }

        let data = slice::from_raw_parts(raw.p_data, data_size).to_vec();
        let metadata = if raw.p_metadata.is_null() {
            None
        } else {
            Some(CString::from(CStr::from_ptr(raw.p_metadata)))
        };

        Ok(VideoFrame {
            width: raw.xres,
            height: raw.yres,
            pixel_format,
            frame_rate_n: raw.frame_rate_N,
            frame_rate_d: raw.frame_rate_D,
            picture_aspect_ratio: raw.picture_aspect_ratio,
            scan_type,
            timecode: raw.timecode,
            data,
            line_stride,
            metadata,
            timestamp: raw.timestamp,
        })
    }
}

/// Builder for configuring a [`VideoFrame`].
///
/// Unset fields default to 1920x1080 BGRA progressive at 60/1, 16:9, with a
/// zeroed, tightly packed buffer.
#[derive(Debug, Clone, Default)]
pub struct VideoFrameBuilder {
    width: Option<i32>,
    height: Option<i32>,
    pixel_format: Option<PixelFormat>,
    frame_rate_n: Option<i32>,
    frame_rate_d: Option<i32>,
    picture_aspect_ratio: Option<f32>,
    scan_type: Option<ScanType>,
    timecode: Option<i64>,
    data: Option<Vec<u8>>,
    line_stride: Option<i32>,
    metadata: Option<String>,
    timestamp: Option<i64>,
}

impl VideoFrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the video resolution
    #[must_use]
    pub fn resolution(mut self, width: i32, height: i32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    #[must_use]
    pub fn pixel_format(mut self, pixel_format: PixelFormat) -> Self {
        self.pixel_format = Some(pixel_format);
        self
    }

    /// Set the frame rate as a fraction (e.g., 30000/1001 for 29.97fps)
    #[must_use]
    pub fn frame_rate(mut self, numerator: i32, denominator: i32) -> Self {
        self.frame_rate_n = Some(numerator);
        self.frame_rate_d = Some(denominator);
        self
    }

    #[must_use]
    pub fn aspect_ratio(mut self, ratio: f32) -> Self {
        self.picture_aspect_ratio = Some(ratio);
        self
    }

    #[must_use]
    pub fn scan_type(mut self, scan_type: ScanType) -> Self {
        self.scan_type = Some(scan_type);
        self
    }

    #[must_use]
    pub fn timecode(mut self, tc: i64) -> Self {
        self.timecode = Some(tc);
        self
    }

    /// Use `data` as the pixel buffer instead of a zeroed one.
    #[must_use]
    pub fn data(mut self, data: Vec<u8>) -> Self {
        self.data = Some(data);
        self
    }

    /// Override the line stride (for padded rows).
    #[must_use]
    pub fn line_stride(mut self, stride: i32) -> Self {
        self.line_stride = Some(stride);
        self
    }

    #[must_use]
    pub fn metadata<S: Into<String>>(mut self, meta: S) -> Self {
        self.metadata = Some(meta.into());
        self
    }

    #[must_use]
    pub fn timestamp(mut self, ts: i64) -> Self {
        self.timestamp = Some(ts);
        self
    }

    /// Build the VideoFrame
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFrame`] if the geometry is not positive or a
    /// supplied buffer is too small, and [`Error::InvalidCString`] if the
    /// metadata contains a NUL byte.
    pub fn build(self) -> Result<VideoFrame> {
        let width = self.width.unwrap_or(1920);
        let height = self.height.unwrap_or(1080);
        let pixel_format = self.pixel_format.unwrap_or(PixelFormat::BGRA);
        let line_stride = self
            .line_stride
            .unwrap_or_else(|| calculate_line_stride(pixel_format, width));

        let data = match self.data {
            Some(data) => data,
            None if width > 0 && height > 0 && line_stride > 0 => {
                let len = buffer_len(pixel_format, line_stride, width, height);
                if len > MAX_VIDEO_BYTES {
                    return Err(Error::InvalidFrame(format!(
                        "Video frame exceeds maximum size: {len} bytes > {MAX_VIDEO_BYTES} bytes"
                    )));
                }
                vec![0u8; len]
            }
            None => Vec::new(),
        };

        let frame = VideoFrame {
            width,
            height,
            pixel_format,
            frame_rate_n: self.frame_rate_n.unwrap_or(60),
            frame_rate_d: self.frame_rate_d.unwrap_or(1),
            picture_aspect_ratio: self.picture_aspect_ratio.unwrap_or(16.0 / 9.0),
            scan_type: self.scan_type.unwrap_or(ScanType::Progressive),
            timecode: self.timecode.unwrap_or(NDIlib_send_timecode_synthesize),
            data,
            line_stride,
            metadata: self.metadata.map(CString::new).transpose()?,
            timestamp: self.timestamp.unwrap_or(0),
        };
        frame.validate()?;
        Ok(frame)
    }
}

/// An owned planar 32-bit float audio frame.
///
/// Samples are stored channel after channel: all of channel 0, then all of
/// channel 1, and so on, each `num_samples` long.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    pub sample_rate: i32,
    pub num_channels: i32,
    pub num_samples: i32,
    pub timecode: i64,
    data: Vec<f32>,
    pub metadata: Option<CString>,
    pub timestamp: i64,
}

impl AudioFrame {
    /// Create a builder for configuring an audio frame
    pub fn builder() -> AudioFrameBuilder {
        AudioFrameBuilder::new()
    }

    /// All samples, channel after channel.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable access to all samples, channel after channel.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Samples of one channel, or `None` if `channel` is out of range.
    pub fn channel(&self, channel: usize) -> Option<&[f32]> {
        let samples = self.num_samples as usize;
        let start = channel.checked_mul(samples)?;
        self.data.get(start..start.checked_add(samples)?)
    }

    fn channel_stride_in_bytes(&self) -> i32 {
        self.num_samples * std::mem::size_of::<f32>() as i32
    }

    /// Checks that `data` holds every sample the layout fields describe.
    pub(crate) fn validate(&self) -> Result<()> {
        let (channels, samples) =
            audio_layout(self.sample_rate, self.num_channels, self.num_samples)?;
        if self.data.len() < channels * samples {
            return Err(Error::InvalidFrame(format!(
                "Audio frame holds {} samples, {channels} channels x {samples} required",
                self.data.len()
            )));
        }
        Ok(())
    }

    pub(crate) fn to_raw(&self) -> NDIlib_audio_frame_v2_t {
        NDIlib_audio_frame_v2_t {
            sample_rate: self.sample_rate,
            no_channels: self.num_channels,
            no_samples: self.num_samples,
            timecode: self.timecode,
            p_data: self.data.as_ptr() as *mut f32,
            channel_stride_in_bytes: self.channel_stride_in_bytes(),
            p_metadata: self.metadata.as_ref().map_or(ptr::null(), |m| m.as_ptr()),
            timestamp: self.timestamp,
        }
    }

    /// Descriptor the runtime may write samples through.
    pub(crate) fn to_raw_mut(&mut self) -> NDIlib_audio_frame_v2_t {
        let mut raw = self.to_raw();
        raw.p_data = self.data.as_mut_ptr();
        raw
    }

    /// Copies a raw frame, honoring its channel stride.
    ///
    /// # Safety
    ///
    /// `raw.p_data` must point to `no_channels` runs of `no_samples` floats
    /// spaced `channel_stride_in_bytes` apart, and `raw.p_metadata` must be
    /// null or a valid NUL-terminated string.
    pub unsafe fn from_raw(raw: &NDIlib_audio_frame_v2_t) -> Result<AudioFrame> {
        if raw.p_data.is_null() {
            return Err(Error::InvalidFrame("Audio frame has null data pointer".into()));
        }
        let (channels, samples) = audio_layout(raw.sample_rate, raw.no_channels, raw.no_samples)?;

        if raw.channel_stride_in_bytes < 0 {
            return Err(Error::InvalidFrame(format!(
                "Negative audio channel stride: {}",
                raw.channel_stride_in_bytes
            )));
        }
        let stride_in_samples = raw.channel_stride_in_bytes as usize / std::mem::size_of::<f32>();
        if stride_in_samples < samples {
            return Err(Error::InvalidFrame(format!(
                "Audio channel stride {} bytes is shorter than {samples} samples",
                raw.channel_stride_in_bytes
            )));
        }

        let mut data = Vec::with_capacity(channels * samples);
        for channel in 0..channels {
            let start = raw.p_data.add(channel * stride_in_samples);
            data.extend_from_slice(slice::from_raw_parts(start, samples));
        }

        let metadata = if raw.p_metadata.is_null() {
            None
        } else {
            Some(CString::from(CStr::from_ptr(raw.p_metadata)))
        };

        Ok(AudioFrame {
            sample_rate: raw.sample_rate,
            num_channels: raw.no_channels,
            num_samples: raw.no_samples,
            timecode: raw.timecode,
            data,
            metadata,
            timestamp: raw.timestamp,
        })
    }
}

/// Validates an audio layout and returns `(channels, samples)`.
fn audio_layout(sample_rate: i32, channels: i32, samples: i32) -> Result<(usize, usize)> {
    if sample_rate <= 0 {
        return Err(Error::InvalidFrame(format!("Invalid sample rate: {sample_rate}")));
    }
    if channels <= 0 {
        return Err(Error::InvalidFrame(format!("Invalid number of channels: {channels}")));
    }
    if samples <= 0 {
        return Err(Error::InvalidFrame(format!("Invalid number of samples: {samples}")));
    }

    let (channels, samples) = (channels as usize, samples as usize);
    channels
        .checked_mul(samples)
        .and_then(|n| n.checked_mul(std::mem::size_of::<f32>()))
        .filter(|&n| n <= MAX_AUDIO_BYTES)
        .ok_or_else(|| {
            Error::InvalidFrame(format!(
                "Audio frame of {channels} channels x {samples} samples exceeds {MAX_AUDIO_BYTES} bytes"
            ))
        })?;
    Ok((channels, samples))
}

/// Builder for configuring an [`AudioFrame`].
///
/// Defaults: 48 kHz, 2 channels, 1024 samples, silence.
#[derive(Debug, Clone, Default)]
pub struct AudioFrameBuilder {
    sample_rate: Option<i32>,
    num_channels: Option<i32>,
    num_samples: Option<i32>,
    timecode: Option<i64>,
    data: Option<Vec<f32>>,
    metadata: Option<String>,
    timestamp: Option<i64>,
}

impl AudioFrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sample_rate(mut self, rate: i32) -> Self {
        self.sample_rate = Some(rate);
        self
    }

    #[must_use]
    pub fn channels(mut self, channels: i32) -> Self {
        self.num_channels = Some(channels);
        self
    }

    /// Set the number of samples per channel
    #[must_use]
    pub fn samples(mut self, samples: i32) -> Self {
        self.num_samples = Some(samples);
        self
    }

    #[must_use]
    pub fn timecode(mut self, tc: i64) -> Self {
        self.timecode = Some(tc);
        self
    }

    /// Set the samples, channel after channel (`[C0S0, C0S1, ..., C1S0, ...]`).
    #[must_use]
    pub fn data(mut self, data: Vec<f32>) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn metadata<S: Into<String>>(mut self, meta: S) -> Self {
        self.metadata = Some(meta.into());
        self
    }

    #[must_use]
    pub fn timestamp(mut self, ts: i64) -> Self {
        self.timestamp = Some(ts);
        self
    }

    /// Build the AudioFrame
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFrame`] for a non-positive layout or when the
    /// supplied data does not hold exactly `channels * samples` values.
    pub fn build(self) -> Result<AudioFrame> {
        let sample_rate = self.sample_rate.unwrap_or(48000);
        let num_channels = self.num_channels.unwrap_or(2);
        let num_samples = self.num_samples.unwrap_or(1024);
        let (channels, samples) = audio_layout(sample_rate, num_channels, num_samples)?;

        let data = match self.data {
            Some(data) if data.len() != channels * samples => {
                return Err(Error::InvalidFrame(format!(
                    "Audio data holds {} samples, {} channels x {} samples expected",
                    data.len(),
                    channels,
                    samples
                )))
            }
            Some(data) => data,
            None => vec![0.0; channels * samples],
        };

        Ok(AudioFrame {
            sample_rate,
            num_channels,
            num_samples,
            timecode: self.timecode.unwrap_or(NDIlib_send_timecode_synthesize),
            data,
            metadata: self.metadata.map(CString::new).transpose()?,
            timestamp: self.timestamp.unwrap_or(0),
        })
    }
}

/// Interleaved signed 16-bit audio (`[C0S0, C1S0, C0S1, C1S1, ...]`).
///
/// `reference_level` is the headroom in dB; 0 maps +4 dBu to full scale and
/// 20 leaves 20 dB of headroom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterleavedAudio16s {
    pub sample_rate: i32,
    pub num_channels: i32,
    pub num_samples: i32,
    pub timecode: i64,
    pub reference_level: i32,
    pub data: Vec<i16>,
}

impl InterleavedAudio16s {
    /// Silent frame with the given layout.
    pub fn with_layout(sample_rate: i32, num_channels: i32, num_samples: i32) -> Result<Self> {
        let (channels, samples) = audio_layout(sample_rate, num_channels, num_samples)?;
        Ok(Self {
            sample_rate,
            num_channels,
            num_samples,
            timecode: NDIlib_send_timecode_synthesize,
            reference_level: 0,
            data: vec![0; channels * samples],
        })
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let (channels, samples) =
            audio_layout(self.sample_rate, self.num_channels, self.num_samples)?;
        if self.data.len() < channels * samples {
            return Err(Error::InvalidFrame(format!(
                "Interleaved audio holds {} samples, {} required",
                self.data.len(),
                channels * samples
            )));
        }
        Ok(())
    }

    pub(crate) fn to_raw(&self) -> NDIlib_audio_frame_interleaved_16s_t {
        NDIlib_audio_frame_interleaved_16s_t {
            sample_rate: self.sample_rate,
            no_channels: self.num_channels,
            no_samples: self.num_samples,
            timecode: self.timecode,
            reference_level: self.reference_level,
            p_data: self.data.as_ptr() as *mut i16,
        }
    }

    pub(crate) fn to_raw_mut(&mut self) -> NDIlib_audio_frame_interleaved_16s_t {
        let mut raw = self.to_raw();
        raw.p_data = self.data.as_mut_ptr();
        raw
    }
}

/// Interleaved 32-bit float audio (`[C0S0, C1S0, C0S1, C1S1, ...]`).
#[derive(Debug, Clone, PartialEq)]
pub struct InterleavedAudio32f {
    pub sample_rate: i32,
    pub num_channels: i32,
    pub num_samples: i32,
    pub timecode: i64,
    pub data: Vec<f32>,
}

impl InterleavedAudio32f {
    /// Silent frame with the given layout.
    pub fn with_layout(sample_rate: i32, num_channels: i32, num_samples: i32) -> Result<Self> {
        let (channels, samples) = audio_layout(sample_rate, num_channels, num_samples)?;
        Ok(Self {
            sample_rate,
            num_channels,
            num_samples,
            timecode: NDIlib_send_timecode_synthesize,
            data: vec![0.0; channels * samples],
        })
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let (channels, samples) =
            audio_layout(self.sample_rate, self.num_channels, self.num_samples)?;
        if self.data.len() < channels * samples {
            return Err(Error::InvalidFrame(format!(
                "Interleaved audio holds {} samples, {} required",
                self.data.len(),
                channels * samples
            )));
        }
        Ok(())
    }

    pub(crate) fn to_raw(&self) -> NDIlib_audio_frame_interleaved_32f_t {
        NDIlib_audio_frame_interleaved_32f_t {
            sample_rate: self.sample_rate,
            no_channels: self.num_channels,
            no_samples: self.num_samples,
            timecode: self.timecode,
            p_data: self.data.as_ptr() as *mut f32,
        }
    }

    pub(crate) fn to_raw_mut(&mut self) -> NDIlib_audio_frame_interleaved_32f_t {
        let mut raw = self.to_raw();
        raw.p_data = self.data.as_mut_ptr();
        raw
    }
}

/// An owned metadata frame, typically a short XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFrame {
    pub data: String,
    pub timecode: i64,
}

impl MetadataFrame {
    pub fn new() -> Self {
        Self::with_data(String::new(), NDIlib_send_timecode_synthesize)
    }

    pub fn with_data<S: Into<String>>(data: S, timecode: i64) -> Self {
        MetadataFrame {
            data: data.into(),
            timecode,
        }
    }

    /// Raw descriptor plus the C string it points into; keep both together.
    ///
    /// `length` counts the terminating NUL, as the runtime expects.
    pub(crate) fn to_raw(&self) -> Result<(CString, NDIlib_metadata_frame_t)> {
        let c_data = CString::new(self.data.as_str())?;
        let raw = NDIlib_metadata_frame_t {
            length: c_data.as_bytes_with_nul().len() as i32,
            timecode: self.timecode,
            p_data: c_data.as_ptr() as *mut c_char,
        };
        Ok((c_data, raw))
    }

    /// Copies a raw metadata frame (lossy on invalid UTF-8).
    ///
    /// # Safety
    ///
    /// `raw.p_data` must be null or a valid NUL-terminated string.
    pub(crate) unsafe fn from_raw(raw: &NDIlib_metadata_frame_t) -> Self {
        let data = if raw.p_data.is_null() {
            String::new()
        } else {
            CStr::from_ptr(raw.p_data).to_string_lossy().into_owned()
        };
        MetadataFrame {
            data,
            timecode: raw.timecode,
        }
    }
}

impl Default for MetadataFrame {
    fn default() -> Self {
        Self::new()
    }
}

/// A captured video frame, borrowed from the runtime.
///
/// The pixel buffer belongs to the runtime and is released with
/// `NDIlib_recv_free_video_v2` when this value is dropped. The `'rx` lifetime
/// ties it to the [`Receiver`](crate::Receiver) that captured it.
///
/// # Examples
///
/// ```no_run
/// # use ndi_dyn::{NDI, ReceiverOptions, Receiver, Source};
/// # use std::time::Duration;
/// # fn main() -> Result<(), ndi_dyn::Error> {
/// # let ndi = NDI::load_default()?;
/// # let source = Source::new("HOST (Camera)");
/// # let receiver = Receiver::new(&ndi, &ReceiverOptions::builder(source).build())?;
/// if let Some(frame) = receiver.capture_video(Duration::from_millis(1000))? {
///     println!("{}x{} frame, stride {}", frame.width(), frame.height(), frame.line_stride());
///     let owned = frame.to_owned()?;
///     // `frame` is released here; `owned` keeps a copy
/// #   drop(owned);
/// }
/// # Ok(())
/// # }
/// ```
pub struct VideoFrameRef<'rx> {
    guard: RecvVideoGuard<'rx>,
    pixel_format: PixelFormat,
}

impl<'rx> VideoFrameRef<'rx> {
    /// Validates the FourCC of a captured frame.
    ///
    /// On an unknown FourCC the guard is dropped, which still frees the frame.
    pub(crate) fn new(guard: RecvVideoGuard<'rx>) -> Result<Self> {
        let fourcc = guard.frame().FourCC;
        let pixel_format = PixelFormat::try_from(fourcc).map_err(|_| {
            Error::InvalidFrame(format!("Unknown pixel format FourCC: 0x{fourcc:08X}"))
        })?;
        Ok(Self {
            guard,
            pixel_format,
        })
    }

    pub fn width(&self) -> i32 {
        self.guard.frame().xres
    }

    pub fn height(&self) -> i32 {
        self.guard.frame().yres
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    pub fn frame_rate_n(&self) -> i32 {
        self.guard.frame().frame_rate_N
    }

    pub fn frame_rate_d(&self) -> i32 {
        self.guard.frame().frame_rate_D
    }

    pub fn picture_aspect_ratio(&self) -> f32 {
        self.guard.frame().picture_aspect_ratio
    }

    /// Scan type, or `None` if the runtime reported an unknown value.
    pub fn scan_type(&self) -> Option<ScanType> {
        ScanType::try_from(self.guard.frame().frame_format_type).ok()
    }

    pub fn timecode(&self) -> i64 {
        self.guard.frame().timecode
    }

    /// Sender timestamp in 100 ns units, or `None` when the sender gave none.
    pub fn timestamp(&self) -> Option<i64> {
        let ts = self.guard.frame().timestamp;
        (ts != NDIlib_recv_timestamp_undefined).then_some(ts)
    }

    pub fn line_stride(&self) -> i32 {
        self.guard.frame().line_stride_in_bytes
    }

    pub fn metadata(&self) -> Option<&CStr> {
        let p_metadata = self.guard.frame().p_metadata;
        if p_metadata.is_null() {
            None
        } else {
            Some(unsafe { CStr::from_ptr(p_metadata) })
        }
    }

    /// The runtime's pixel buffer, including every plane.
    ///
    /// Empty if the frame's geometry is not positive.
    pub fn data(&self) -> &[u8] {
        let frame = self.guard.frame();
        if frame.p_data.is_null()
            || frame.line_stride_in_bytes <= 0
            || frame.xres <= 0
            || frame.yres <= 0
        {
            return &[];
        }
        let len = buffer_len(
            self.pixel_format,
            frame.line_stride_in_bytes,
            frame.xres,
            frame.yres,
        );
        unsafe { slice::from_raw_parts(frame.p_data, len) }
    }

    /// Copies the frame into an owned [`VideoFrame`].
    pub fn to_owned(&self) -> Result<VideoFrame> {
        unsafe { VideoFrame::from_raw(self.guard.frame()) }
    }
}

impl fmt::Debug for VideoFrameRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoFrameRef")
            .field("size", &format_args!("{}x{}", self.width(), self.height()))
            .field("format", &self.pixel_format())
            .field("rate", &format_args!("{}/{}", self.frame_rate_n(), self.frame_rate_d()))
            .field("stride", &self.line_stride())
            .field("timecode", &self.timecode())
            .finish_non_exhaustive()
    }
}

/// A captured planar float audio frame, borrowed from the runtime.
///
/// Released with `NDIlib_recv_free_audio_v2` on drop.
pub struct AudioFrameRef<'rx> {
    guard: RecvAudioGuard<'rx>,
}

impl<'rx> AudioFrameRef<'rx> {
    pub(crate) fn new(guard: RecvAudioGuard<'rx>) -> Self {
        Self { guard }
    }

    pub fn sample_rate(&self) -> i32 {
        self.guard.frame().sample_rate
    }

    pub fn num_channels(&self) -> i32 {
        self.guard.frame().no_channels
    }

    /// Samples per channel.
    pub fn num_samples(&self) -> i32 {
        self.guard.frame().no_samples
    }

    pub fn timecode(&self) -> i64 {
        self.guard.frame().timecode
    }

    pub fn timestamp(&self) -> Option<i64> {
        let ts = self.guard.frame().timestamp;
        (ts != NDIlib_recv_timestamp_undefined).then_some(ts)
    }

    pub fn channel_stride_in_bytes(&self) -> i32 {
        self.guard.frame().channel_stride_in_bytes
    }

    pub fn metadata(&self) -> Option<&CStr> {
        let p_metadata = self.guard.frame().p_metadata;
        if p_metadata.is_null() {
            None
        } else {
            Some(unsafe { CStr::from_ptr(p_metadata) })
        }
    }

    /// Samples of one channel, read in place.
    pub fn channel(&self, channel: usize) -> Option<&[f32]> {
        let frame = self.guard.frame();
        if frame.p_data.is_null() || channel >= frame.no_channels.max(0) as usize {
            return None;
        }
        let samples = frame.no_samples.max(0) as usize;
        let stride = frame.channel_stride_in_bytes.max(0) as usize / std::mem::size_of::<f32>();
        if stride < samples {
            return None;
        }
        Some(unsafe { slice::from_raw_parts(frame.p_data.add(channel * stride), samples) })
    }

    /// Copies the frame into an owned, tightly packed [`AudioFrame`].
    pub fn to_owned(&self) -> Result<AudioFrame> {
        unsafe { AudioFrame::from_raw(self.guard.frame()) }
    }
}

impl fmt::Debug for AudioFrameRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioFrameRef")
            .field("rate", &self.sample_rate())
            .field("channels", &self.num_channels())
            .field("samples", &self.num_samples())
            .field("timecode", &self.timecode())
            .finish_non_exhaustive()
    }
}

/// A captured metadata frame, borrowed from the runtime.
///
/// Released with `NDIlib_recv_free_metadata` on drop.
pub struct MetadataFrameRef<'rx> {
    guard: RecvMetadataGuard<'rx>,
}

impl<'rx> MetadataFrameRef<'rx> {
    pub(crate) fn new(guard: RecvMetadataGuard<'rx>) -> Self {
        Self { guard }
    }

    pub fn timecode(&self) -> i64 {
        self.guard.frame().timecode
    }

    /// The metadata text in place; empty if the runtime sent none.
    pub fn data(&self) -> &CStr {
        let p_data = self.guard.frame().p_data;
        if p_data.is_null() {
            c""
        } else {
            unsafe { CStr::from_ptr(p_data) }
        }
    }

    pub fn to_owned(&self) -> MetadataFrame {
        unsafe { MetadataFrame::from_raw(self.guard.frame()) }
    }
}

impl fmt::Debug for MetadataFrameRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MetadataFrameRef").field(&self.data()).finish()
    }
}
