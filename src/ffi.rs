//! Raw C layout of the NDI v3 runtime.
//!
//! Everything in this module mirrors `Processing.NDI.Lib.h` and
//! `Processing.NDI.DynamicLoad.h` byte for byte. Enum-typed fields are kept as
//! plain integers so that an unexpected value coming back from the runtime can
//! never produce an invalid Rust enum; the typed wrappers in
//! [`frames`](crate::frames) and [`receiver`](crate::receiver) validate them.
//!
//! Sizes are asserted at compile time for 64-bit targets and each field offset
//! is checked by the unit tests at the bottom of this file.

#![allow(non_camel_case_types, non_snake_case, non_upper_case_globals)]

use std::os::raw::{c_char, c_int, c_void};

/// Opaque finder handle.
pub type NDIlib_find_instance_t = *mut c_void;
/// Opaque receiver handle.
pub type NDIlib_recv_instance_t = *mut c_void;
/// Opaque sender handle.
pub type NDIlib_send_instance_t = *mut c_void;
/// Opaque routing handle.
pub type NDIlib_routing_instance_t = *mut c_void;

pub type NDIlib_frame_type_e = c_int;
pub const NDIlib_frame_type_none: NDIlib_frame_type_e = 0;
pub const NDIlib_frame_type_video: NDIlib_frame_type_e = 1;
pub const NDIlib_frame_type_audio: NDIlib_frame_type_e = 2;
pub const NDIlib_frame_type_metadata: NDIlib_frame_type_e = 3;
pub const NDIlib_frame_type_error: NDIlib_frame_type_e = 4;
pub const NDIlib_frame_type_status_change: NDIlib_frame_type_e = 100;

pub type NDIlib_frame_format_type_e = c_int;
pub const NDIlib_frame_format_type_interleaved: NDIlib_frame_format_type_e = 0;
pub const NDIlib_frame_format_type_progressive: NDIlib_frame_format_type_e = 1;
pub const NDIlib_frame_format_type_field_0: NDIlib_frame_format_type_e = 2;
pub const NDIlib_frame_format_type_field_1: NDIlib_frame_format_type_e = 3;

pub type NDIlib_recv_color_format_e = c_int;
pub const NDIlib_recv_color_format_BGRX_BGRA: NDIlib_recv_color_format_e = 0;
pub const NDIlib_recv_color_format_UYVY_BGRA: NDIlib_recv_color_format_e = 1;
pub const NDIlib_recv_color_format_RGBX_RGBA: NDIlib_recv_color_format_e = 2;
pub const NDIlib_recv_color_format_UYVY_RGBA: NDIlib_recv_color_format_e = 3;
pub const NDIlib_recv_color_format_fastest: NDIlib_recv_color_format_e = 100;

pub type NDIlib_recv_bandwidth_e = c_int;
pub const NDIlib_recv_bandwidth_metadata_only: NDIlib_recv_bandwidth_e = -10;
pub const NDIlib_recv_bandwidth_audio_only: NDIlib_recv_bandwidth_e = 10;
pub const NDIlib_recv_bandwidth_lowest: NDIlib_recv_bandwidth_e = 0;
pub const NDIlib_recv_bandwidth_highest: NDIlib_recv_bandwidth_e = 100;

pub type NDIlib_FourCC_type_e = u32;

/// Packs four ASCII bytes into a little-endian FourCC code.
pub const fn make_fourcc(fourcc: &[u8; 4]) -> u32 {
    (fourcc[0] as u32)
        | ((fourcc[1] as u32) << 8)
        | ((fourcc[2] as u32) << 16)
        | ((fourcc[3] as u32) << 24)
}

pub const NDIlib_FourCC_type_UYVY: NDIlib_FourCC_type_e = make_fourcc(b"UYVY");
pub const NDIlib_FourCC_type_UYVA: NDIlib_FourCC_type_e = make_fourcc(b"UYVA");
pub const NDIlib_FourCC_type_YV12: NDIlib_FourCC_type_e = make_fourcc(b"YV12");
pub const NDIlib_FourCC_type_I420: NDIlib_FourCC_type_e = make_fourcc(b"I420");
pub const NDIlib_FourCC_type_NV12: NDIlib_FourCC_type_e = make_fourcc(b"NV12");
pub const NDIlib_FourCC_type_BGRA: NDIlib_FourCC_type_e = make_fourcc(b"BGRA");
pub const NDIlib_FourCC_type_BGRX: NDIlib_FourCC_type_e = make_fourcc(b"BGRX");
pub const NDIlib_FourCC_type_RGBA: NDIlib_FourCC_type_e = make_fourcc(b"RGBA");
pub const NDIlib_FourCC_type_RGBX: NDIlib_FourCC_type_e = make_fourcc(b"RGBX");

/// Passing this as a timecode asks the runtime to synthesize one.
pub const NDIlib_send_timecode_synthesize: i64 = i64::MAX;
/// Returned as a timestamp when the sender did not provide one.
pub const NDIlib_recv_timestamp_undefined: i64 = i64::MAX;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct NDIlib_source_t {
    pub p_ndi_name: *const c_char,
    /// Either `ip:port` or a URL, depending on the source.
    pub p_ip_address: *const c_char,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct NDIlib_find_create_t {
    pub show_local_sources: bool,
    pub p_groups: *const c_char,
    pub p_extra_ips: *const c_char,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct NDIlib_send_create_t {
    pub p_ndi_name: *const c_char,
    pub p_groups: *const c_char,
    pub clock_video: bool,
    pub clock_audio: bool,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct NDIlib_recv_create_t {
    pub source_to_connect_to: NDIlib_source_t,
    pub color_format: NDIlib_recv_color_format_e,
    pub bandwidth: NDIlib_recv_bandwidth_e,
    pub allow_video_fields: bool,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct NDIlib_routing_create_t {
    pub p_ndi_name: *const c_char,
    pub p_groups: *const c_char,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct NDIlib_video_frame_v2_t {
    pub xres: c_int,
    pub yres: c_int,
    pub FourCC: NDIlib_FourCC_type_e,
    pub frame_rate_N: c_int,
    pub frame_rate_D: c_int,
    pub picture_aspect_ratio: f32,
    pub frame_format_type: NDIlib_frame_format_type_e,
    pub timecode: i64,
    pub p_data: *mut u8,
    pub line_stride_in_bytes: c_int,
    pub p_metadata: *const c_char,
    pub timestamp: i64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct NDIlib_audio_frame_v2_t {
    pub sample_rate: c_int,
    pub no_channels: c_int,
    pub no_samples: c_int,
    pub timecode: i64,
    pub p_data: *mut f32,
    pub channel_stride_in_bytes: c_int,
    pub p_metadata: *const c_char,
    pub timestamp: i64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct NDIlib_audio_frame_interleaved_16s_t {
    pub sample_rate: c_int,
    pub no_channels: c_int,
    pub no_samples: c_int,
    pub timecode: i64,
    pub reference_level: c_int,
    pub p_data: *mut i16,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct NDIlib_audio_frame_interleaved_32f_t {
    pub sample_rate: c_int,
    pub no_channels: c_int,
    pub no_samples: c_int,
    pub timecode: i64,
    pub p_data: *mut f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct NDIlib_metadata_frame_t {
    /// Length in bytes including the NUL terminator, or 0 to let the runtime measure it.
    pub length: c_int,
    pub timecode: i64,
    pub p_data: *mut c_char,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct NDIlib_tally_t {
    pub on_program: bool,
    pub on_preview: bool,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct NDIlib_recv_performance_t {
    pub video_frames: i64,
    pub audio_frames: i64,
    pub metadata_frames: i64,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct NDIlib_recv_queue_t {
    pub video_frames: c_int,
    pub audio_frames: c_int,
    pub metadata_frames: c_int,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct NDIlib_recv_recording_time_t {
    pub no_frames: i64,
    pub start_time: i64,
    pub last_time: i64,
}

// Structs holding pointers cannot derive Default; every one of them is valid
// when zeroed, which is also what the C headers' default constructors produce
// for the fields we care about.
macro_rules! zeroed_default {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Default for $ty {
                fn default() -> Self {
                    // SAFETY: plain-old-data; null pointers and zero integers are valid.
                    unsafe { std::mem::zeroed() }
                }
            }
        )+
    };
}

zeroed_default!(
    NDIlib_source_t,
    NDIlib_find_create_t,
    NDIlib_send_create_t,
    NDIlib_recv_create_t,
    NDIlib_routing_create_t,
    NDIlib_video_frame_v2_t,
    NDIlib_audio_frame_v2_t,
    NDIlib_audio_frame_interleaved_16s_t,
    NDIlib_audio_frame_interleaved_32f_t,
    NDIlib_metadata_frame_t,
);

/// Slot of an entry point the crate never calls. Only its size matters.
pub type DeprecatedFn = Option<unsafe extern "C" fn()>;

/// The function table returned by `NDIlib_v3_load`.
///
/// Entries are grouped by the runtime release that introduced them; the order
/// is part of the ABI and must never change. A runtime older than a tier
/// leaves that tier's entries null.
#[repr(C)]
#[derive(Default, Clone, Copy)]
pub struct NDIlib_v3 {
    // v1.5
    pub initialize: Option<unsafe extern "C" fn() -> bool>,
    pub destroy: Option<unsafe extern "C" fn()>,
    pub version: Option<unsafe extern "C" fn() -> *const c_char>,
    pub is_supported_CPU: Option<unsafe extern "C" fn() -> bool>,
    pub find_create: DeprecatedFn,
    pub find_create_v2: Option<
        unsafe extern "C" fn(p_create_settings: *const NDIlib_find_create_t) -> NDIlib_find_instance_t,
    >,
    pub find_destroy: Option<unsafe extern "C" fn(p_instance: NDIlib_find_instance_t)>,
    pub find_get_sources: Option<
        unsafe extern "C" fn(
            p_instance: NDIlib_find_instance_t,
            p_no_sources: *mut u32,
            timeout_in_ms: u32,
        ) -> *const NDIlib_source_t,
    >,
    pub send_create: Option<
        unsafe extern "C" fn(p_create_settings: *const NDIlib_send_create_t) -> NDIlib_send_instance_t,
    >,
    pub send_destroy: Option<unsafe extern "C" fn(p_instance: NDIlib_send_instance_t)>,
    pub send_send_video: DeprecatedFn,
    pub send_send_video_async: DeprecatedFn,
    pub send_send_audio: DeprecatedFn,
    pub send_send_metadata: Option<
        unsafe extern "C" fn(p_instance: NDIlib_send_instance_t, p_metadata: *const NDIlib_metadata_frame_t),
    >,
    pub send_capture: Option<
        unsafe extern "C" fn(
            p_instance: NDIlib_send_instance_t,
            p_metadata: *mut NDIlib_metadata_frame_t,
            timeout_in_ms: u32,
        ) -> NDIlib_frame_type_e,
    >,
    pub send_free_metadata: Option<
        unsafe extern "C" fn(p_instance: NDIlib_send_instance_t, p_metadata: *const NDIlib_metadata_frame_t),
    >,
    pub send_get_tally: Option<
        unsafe extern "C" fn(
            p_instance: NDIlib_send_instance_t,
            p_tally: *mut NDIlib_tally_t,
            timeout_in_ms: u32,
        ) -> bool,
    >,
    pub send_get_no_connections:
        Option<unsafe extern "C" fn(p_instance: NDIlib_send_instance_t, timeout_in_ms: u32) -> c_int>,
    pub send_clear_connection_metadata: Option<unsafe extern "C" fn(p_instance: NDIlib_send_instance_t)>,
    pub send_add_connection_metadata: Option<
        unsafe extern "C" fn(p_instance: NDIlib_send_instance_t, p_metadata: *const NDIlib_metadata_frame_t),
    >,
    pub send_set_failover: Option<
        unsafe extern "C" fn(p_instance: NDIlib_send_instance_t, p_failover_source: *const NDIlib_source_t),
    >,
    pub recv_create_v2: Option<
        unsafe extern "C" fn(p_create_settings: *const NDIlib_recv_create_t) -> NDIlib_recv_instance_t,
    >,
    pub recv_create: DeprecatedFn,
    pub recv_destroy: Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t)>,
    pub recv_capture: DeprecatedFn,
    pub recv_free_video: DeprecatedFn,
    pub recv_free_audio: DeprecatedFn,
    pub recv_free_metadata: Option<
        unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t, p_metadata: *const NDIlib_metadata_frame_t),
    >,
    pub recv_send_metadata: Option<
        unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t, p_metadata: *const NDIlib_metadata_frame_t) -> bool,
    >,
    pub recv_set_tally: Option<
        unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t, p_tally: *const NDIlib_tally_t) -> bool,
    >,
    pub recv_get_performance: Option<
        unsafe extern "C" fn(
            p_instance: NDIlib_recv_instance_t,
            p_total: *mut NDIlib_recv_performance_t,
            p_dropped: *mut NDIlib_recv_performance_t,
        ),
    >,
    pub recv_get_queue: Option<
        unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t, p_total: *mut NDIlib_recv_queue_t),
    >,
    pub recv_clear_connection_metadata: Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t)>,
    pub recv_add_connection_metadata: Option<
        unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t, p_metadata: *const NDIlib_metadata_frame_t),
    >,
    pub recv_get_no_connections: Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t) -> c_int>,
    pub routing_create: Option<
        unsafe extern "C" fn(p_create_settings: *const NDIlib_routing_create_t) -> NDIlib_routing_instance_t,
    >,
    pub routing_destroy: Option<unsafe extern "C" fn(p_instance: NDIlib_routing_instance_t)>,
    pub routing_change: Option<
        unsafe extern "C" fn(p_instance: NDIlib_routing_instance_t, p_source: *const NDIlib_source_t) -> bool,
    >,
    pub routing_clear: Option<unsafe extern "C" fn(p_instance: NDIlib_routing_instance_t) -> bool>,
    pub util_send_send_audio_interleaved_16s: Option<
        unsafe extern "C" fn(
            p_instance: NDIlib_send_instance_t,
            p_audio_data: *const NDIlib_audio_frame_interleaved_16s_t,
        ),
    >,
    pub util_audio_to_interleaved_16s: DeprecatedFn,
    pub util_audio_from_interleaved_16s: DeprecatedFn,

    // v2
    pub find_wait_for_sources:
        Option<unsafe extern "C" fn(p_instance: NDIlib_find_instance_t, timeout_in_ms: u32) -> bool>,
    pub find_get_current_sources: Option<
        unsafe extern "C" fn(p_instance: NDIlib_find_instance_t, p_no_sources: *mut u32) -> *const NDIlib_source_t,
    >,
    pub util_audio_to_interleaved_32f: DeprecatedFn,
    pub util_audio_from_interleaved_32f: DeprecatedFn,
    pub util_send_send_audio_interleaved_32f: Option<
        unsafe extern "C" fn(
            p_instance: NDIlib_send_instance_t,
            p_audio_data: *const NDIlib_audio_frame_interleaved_32f_t,
        ),
    >,

    // v3
    pub recv_free_video_v2: Option<
        unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t, p_video_data: *const NDIlib_video_frame_v2_t),
    >,
    pub recv_free_audio_v2: Option<
        unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t, p_audio_data: *const NDIlib_audio_frame_v2_t),
    >,
    pub recv_capture_v2: Option<
        unsafe extern "C" fn(
            p_instance: NDIlib_recv_instance_t,
            p_video_data: *mut NDIlib_video_frame_v2_t,
            p_audio_data: *mut NDIlib_audio_frame_v2_t,
            p_metadata: *mut NDIlib_metadata_frame_t,
            timeout_in_ms: u32,
        ) -> NDIlib_frame_type_e,
    >,
    pub send_send_video_v2: Option<
        unsafe extern "C" fn(p_instance: NDIlib_send_instance_t, p_video_data: *const NDIlib_video_frame_v2_t),
    >,
    pub send_send_video_async_v2: Option<
        unsafe extern "C" fn(p_instance: NDIlib_send_instance_t, p_video_data: *const NDIlib_video_frame_v2_t),
    >,
    pub send_send_audio_v2: Option<
        unsafe extern "C" fn(p_instance: NDIlib_send_instance_t, p_audio_data: *const NDIlib_audio_frame_v2_t),
    >,
    pub util_audio_to_interleaved_16s_v2: Option<
        unsafe extern "C" fn(
            p_src: *const NDIlib_audio_frame_v2_t,
            p_dst: *mut NDIlib_audio_frame_interleaved_16s_t,
        ),
    >,
    pub util_audio_from_interleaved_16s_v2: Option<
        unsafe extern "C" fn(
            p_src: *const NDIlib_audio_frame_interleaved_16s_t,
            p_dst: *mut NDIlib_audio_frame_v2_t,
        ),
    >,
    pub util_audio_to_interleaved_32f_v2: Option<
        unsafe extern "C" fn(
            p_src: *const NDIlib_audio_frame_v2_t,
            p_dst: *mut NDIlib_audio_frame_interleaved_32f_t,
        ),
    >,
    pub util_audio_from_interleaved_32f_v2: Option<
        unsafe extern "C" fn(
            p_src: *const NDIlib_audio_frame_interleaved_32f_t,
            p_dst: *mut NDIlib_audio_frame_v2_t,
        ),
    >,

    // v3.01
    pub recv_free_string:
        Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t, p_string: *const c_char)>,
    pub recv_ptz_is_supported: Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t) -> bool>,
    pub recv_recording_is_supported: Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t) -> bool>,
    pub recv_get_web_control:
        Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t) -> *const c_char>,
    pub recv_ptz_zoom: Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t, zoom_value: f32) -> bool>,
    pub recv_ptz_zoom_speed:
        Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t, zoom_speed: f32) -> bool>,
    pub recv_ptz_pan_tilt: Option<
        unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t, pan_value: f32, tilt_value: f32) -> bool,
    >,
    pub recv_ptz_pan_tilt_speed: Option<
        unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t, pan_speed: f32, tilt_speed: f32) -> bool,
    >,
    pub recv_ptz_store_preset:
        Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t, preset_no: c_int) -> bool>,
    pub recv_ptz_recall_preset: Option<
        unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t, preset_no: c_int, speed: f32) -> bool,
    >,
    pub recv_ptz_auto_focus: Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t) -> bool>,
    pub recv_ptz_focus: Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t, focus_value: f32) -> bool>,
    pub recv_ptz_focus_speed:
        Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t, focus_speed: f32) -> bool>,
    pub recv_ptz_white_balance_auto: Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t) -> bool>,
    pub recv_ptz_white_balance_indoor: Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t) -> bool>,
    pub recv_ptz_white_balance_outdoor: Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t) -> bool>,
    pub recv_ptz_white_balance_oneshot: Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t) -> bool>,
    pub recv_ptz_white_balance_manual:
        Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t, red: f32, blue: f32) -> bool>,
    pub recv_ptz_exposure_auto: Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t) -> bool>,
    pub recv_ptz_exposure_manual:
        Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t, exposure_level: f32) -> bool>,
    pub recv_recording_start:
        Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t, p_filename_hint: *const c_char) -> bool>,
    pub recv_recording_stop: Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t) -> bool>,
    pub recv_recording_set_audio_level:
        Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t, level_dB: f32) -> bool>,
    pub recv_recording_is_recording: Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t) -> bool>,
    pub recv_recording_get_filename:
        Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t) -> *const c_char>,
    pub recv_recording_get_error:
        Option<unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t) -> *const c_char>,
    pub recv_recording_get_times: Option<
        unsafe extern "C" fn(p_instance: NDIlib_recv_instance_t, p_times: *mut NDIlib_recv_recording_time_t) -> bool,
    >,
}

/// Signature of the bootstrap symbol exported by every v3-compatible runtime.
pub type NDIlib_v3_load_fn = unsafe extern "C" fn() -> *const NDIlib_v3;

/// Name of the bootstrap symbol, NUL-terminated for `libloading`.
pub const NDIlib_v3_load_symbol: &[u8] = b"NDIlib_v3_load\0";

/// Number of entries in [`NDIlib_v3`].
pub const NDIlib_v3_entry_count: usize = 84;

const _: () = assert!(
    std::mem::size_of::<NDIlib_v3>() == NDIlib_v3_entry_count * std::mem::size_of::<usize>()
);

#[cfg(target_pointer_width = "64")]
const _: () = {
    use std::mem::size_of;
    assert!(size_of::<NDIlib_source_t>() == 16);
    assert!(size_of::<NDIlib_find_create_t>() == 24);
    assert!(size_of::<NDIlib_send_create_t>() == 24);
    assert!(size_of::<NDIlib_recv_create_t>() == 32);
    assert!(size_of::<NDIlib_routing_create_t>() == 16);
    assert!(size_of::<NDIlib_video_frame_v2_t>() == 72);
    assert!(size_of::<NDIlib_audio_frame_v2_t>() == 56);
    assert!(size_of::<NDIlib_audio_frame_interleaved_16s_t>() == 40);
    assert!(size_of::<NDIlib_audio_frame_interleaved_32f_t>() == 32);
    assert!(size_of::<NDIlib_metadata_frame_t>() == 24);
    assert!(size_of::<NDIlib_tally_t>() == 2);
    assert!(size_of::<NDIlib_recv_performance_t>() == 24);
    assert!(size_of::<NDIlib_recv_queue_t>() == 12);
    assert!(size_of::<NDIlib_recv_recording_time_t>() == 24);
    assert!(size_of::<NDIlib_v3>() == 672);
};
