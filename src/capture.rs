//! Frame capture and the RAII guard that releases captured frames.
//!
//! The `CaptureKind` trait carries what differs between video, audio and
//! metadata capture: the raw frame type, which out-parameter of
//! `recv_capture_v2` it fills and which free call releases it. `RecvGuard`
//! owns one populated frame and calls that free exactly once when dropped.
//!
//! Only the kind the runtime actually reported is wrapped in a guard. The other
//! out-parameters stay untouched and are never freed, because freeing a frame
//! the runtime did not populate is undefined behaviour.

use num_enum::TryFromPrimitive;

use std::ptr;

use crate::{api::Api, ffi::*, runtime::to_ms, Error, Receiver, Result};

/// Frame-type-specific capture behaviour, implemented by [`VideoKind`],
/// [`AudioKind`] and [`MetadataKind`].
pub(crate) trait CaptureKind {
    /// Raw C frame struct filled by the capture call.
    type RawFrame: Default + Copy;

    /// Frame type the runtime reports when it populated `RawFrame`.
    const FRAME_TYPE: RawFrameType;

    /// Places `frame` in the matching out-parameter slot; the others stay null.
    fn out_params(
        frame: &mut Self::RawFrame,
    ) -> (
        *mut NDIlib_video_frame_v2_t,
        *mut NDIlib_audio_frame_v2_t,
        *mut NDIlib_metadata_frame_t,
    );

    /// Releases a captured frame.
    ///
    /// # Safety
    ///
    /// `instance` must be the receiver that captured `frame`, and the capture
    /// must have reported `FRAME_TYPE`.
    unsafe fn free_frame(api: &Api, instance: NDIlib_recv_instance_t, frame: &Self::RawFrame);
}

/// Video capture marker.
pub(crate) struct VideoKind;

impl CaptureKind for VideoKind {
    type RawFrame = NDIlib_video_frame_v2_t;
    const FRAME_TYPE: RawFrameType = RawFrameType::Video;

    fn out_params(
        frame: &mut Self::RawFrame,
    ) -> (
        *mut NDIlib_video_frame_v2_t,
        *mut NDIlib_audio_frame_v2_t,
        *mut NDIlib_metadata_frame_t,
    ) {
        (frame, ptr::null_mut(), ptr::null_mut())
    }

    unsafe fn free_frame(api: &Api, instance: NDIlib_recv_instance_t, frame: &Self::RawFrame) {
        (api.recv_free_video_v2)(instance, frame);
    }
}

/// Audio capture marker.
pub(crate) struct AudioKind;

impl CaptureKind for AudioKind {
    type RawFrame = NDIlib_audio_frame_v2_t;
    const FRAME_TYPE: RawFrameType = RawFrameType::Audio;

    fn out_params(
        frame: &mut Self::RawFrame,
    ) -> (
        *mut NDIlib_video_frame_v2_t,
        *mut NDIlib_audio_frame_v2_t,
        *mut NDIlib_metadata_frame_t,
    ) {
        (ptr::null_mut(), frame, ptr::null_mut())
    }

    unsafe fn free_frame(api: &Api, instance: NDIlib_recv_instance_t, frame: &Self::RawFrame) {
        (api.recv_free_audio_v2)(instance, frame);
    }
}

/// Metadata capture marker.
pub(crate) struct MetadataKind;

impl CaptureKind for MetadataKind {
    type RawFrame = NDIlib_metadata_frame_t;
    const FRAME_TYPE: RawFrameType = RawFrameType::Metadata;

    fn out_params(
        frame: &mut Self::RawFrame,
    ) -> (
        *mut NDIlib_video_frame_v2_t,
        *mut NDIlib_audio_frame_v2_t,
        *mut NDIlib_metadata_frame_t,
    ) {
        (ptr::null_mut(), ptr::null_mut(), frame)
    }

    unsafe fn free_frame(api: &Api, instance: NDIlib_recv_instance_t, frame: &Self::RawFrame) {
        (api.recv_free_metadata)(instance, frame);
    }
}

/// Value returned by `recv_capture_v2`.
#[derive(Debug, TryFromPrimitive, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub(crate) enum RawFrameType {
    None = NDIlib_frame_type_none,
    Video = NDIlib_frame_type_video,
    Audio = NDIlib_frame_type_audio,
    Metadata = NDIlib_frame_type_metadata,
    ErrorFrame = NDIlib_frame_type_error,
    StatusChange = NDIlib_frame_type_status_change,
}

impl RawFrameType {
    pub(crate) fn decode(value: NDIlib_frame_type_e) -> Result<Self> {
        Self::try_from(value)
            .map_err(|_| Error::CaptureFailed(format!("unknown frame type {value}")))
    }
}

/// RAII guard over one captured frame.
///
/// The `'rx` borrow of the [`Receiver`] keeps the receiver (and with it the
/// runtime) alive for as long as the frame is, so the free call always has a
/// valid instance to go to.
pub(crate) struct RecvGuard<'rx, K: CaptureKind> {
    receiver: &'rx Receiver,
    frame: K::RawFrame,
}

impl<'rx, K: CaptureKind> RecvGuard<'rx, K> {
    /// # Safety
    ///
    /// `frame` must have been populated by a capture on `receiver` that
    /// reported `K::FRAME_TYPE`.
    pub(crate) unsafe fn new(receiver: &'rx Receiver, frame: K::RawFrame) -> Self {
        Self { receiver, frame }
    }

    pub(crate) fn frame(&self) -> &K::RawFrame {
        &self.frame
    }
}

impl<K: CaptureKind> Drop for RecvGuard<'_, K> {
    fn drop(&mut self) {
        // SAFETY: the constructor's contract guarantees a populated frame.
        unsafe { K::free_frame(self.receiver.api(), self.receiver.raw(), &self.frame) };
    }
}

/// Captures a single frame kind, passing null for every other out-parameter.
///
/// A status change or an empty poll both yield `Ok(None)`; an error frame
/// becomes [`Error::CaptureFailed`].
pub(crate) fn capture_kind<K: CaptureKind>(
    receiver: &Receiver,
    timeout: std::time::Duration,
) -> Result<Option<RecvGuard<'_, K>>> {
    let mut frame = K::RawFrame::default();
    let (video, audio, metadata) = K::out_params(&mut frame);

    let frame_type = unsafe {
        (receiver.api().recv_capture_v2)(receiver.raw(), video, audio, metadata, to_ms(timeout))
    };

    match RawFrameType::decode(frame_type)? {
        t if t == K::FRAME_TYPE => Ok(Some(unsafe { RecvGuard::new(receiver, frame) })),
        RawFrameType::ErrorFrame => Err(Error::CaptureFailed(
            "the runtime reported an error frame (connection lost?)".into(),
        )),
        _ => Ok(None),
    }
}

pub(crate) type RecvVideoGuard<'rx> = RecvGuard<'rx, VideoKind>;
pub(crate) type RecvAudioGuard<'rx> = RecvGuard<'rx, AudioKind>;
pub(crate) type RecvMetadataGuard<'rx> = RecvGuard<'rx, MetadataKind>;
