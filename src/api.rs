//! Validated view of the runtime's function table.
//!
//! [`NDIlib_v3`] stores every entry as an `Option`. [`Api::resolve`] checks the
//! table once, at load time, and produces plain function pointers so that no
//! call site ever has to deal with a missing entry. The v3.01 additions (PTZ,
//! recording, web control) are optional tiers: an older runtime loads fine and
//! those calls report [`Error::Unsupported`](crate::Error::Unsupported).

use std::os::raw::{c_char, c_int};

use crate::{ffi::*, Error, Result};

/// Builds `$ty` from the named table entries, or lists every one that is null.
macro_rules! resolve_entries {
    ($table:expr => $ty:ident { $($field:ident),+ $(,)? } $(extra { $($extra:ident: $value:expr),* $(,)? })?) => {{
        let table: &NDIlib_v3 = $table;
        match ($(table.$field,)+) {
            ($(Some($field),)+) => Ok($ty { $($field,)+ $($($extra: $value,)*)? }),
            _ => {
                let mut missing: Vec<&'static str> = Vec::new();
                $(
                    if table.$field.is_none() {
                        missing.push(concat!("NDIlib_", stringify!($field)));
                    }
                )+
                Err(missing)
            }
        }
    }};
}

/// Entry points every supported runtime (v3 and newer) provides.
#[allow(non_snake_case)]
#[derive(Clone, Copy)]
pub(crate) struct Api {
    pub initialize: unsafe extern "C" fn() -> bool,
    pub destroy: unsafe extern "C" fn(),
    pub version: unsafe extern "C" fn() -> *const c_char,
    pub is_supported_CPU: unsafe extern "C" fn() -> bool,

    pub find_create_v2: unsafe extern "C" fn(*const NDIlib_find_create_t) -> NDIlib_find_instance_t,
    pub find_destroy: unsafe extern "C" fn(NDIlib_find_instance_t),
    pub find_get_sources:
        unsafe extern "C" fn(NDIlib_find_instance_t, *mut u32, u32) -> *const NDIlib_source_t,
    pub find_wait_for_sources: unsafe extern "C" fn(NDIlib_find_instance_t, u32) -> bool,
    pub find_get_current_sources:
        unsafe extern "C" fn(NDIlib_find_instance_t, *mut u32) -> *const NDIlib_source_t,

    pub send_create: unsafe extern "C" fn(*const NDIlib_send_create_t) -> NDIlib_send_instance_t,
    pub send_destroy: unsafe extern "C" fn(NDIlib_send_instance_t),
    pub send_send_video_v2: unsafe extern "C" fn(NDIlib_send_instance_t, *const NDIlib_video_frame_v2_t),
    pub send_send_video_async_v2:
        unsafe extern "C" fn(NDIlib_send_instance_t, *const NDIlib_video_frame_v2_t),
    pub send_send_audio_v2: unsafe extern "C" fn(NDIlib_send_instance_t, *const NDIlib_audio_frame_v2_t),
    pub send_send_metadata: unsafe extern "C" fn(NDIlib_send_instance_t, *const NDIlib_metadata_frame_t),
    pub send_capture:
        unsafe extern "C" fn(NDIlib_send_instance_t, *mut NDIlib_metadata_frame_t, u32) -> NDIlib_frame_type_e,
    pub send_free_metadata: unsafe extern "C" fn(NDIlib_send_instance_t, *const NDIlib_metadata_frame_t),
    pub send_get_tally: unsafe extern "C" fn(NDIlib_send_instance_t, *mut NDIlib_tally_t, u32) -> bool,
    pub send_get_no_connections: unsafe extern "C" fn(NDIlib_send_instance_t, u32) -> c_int,
    pub send_clear_connection_metadata: unsafe extern "C" fn(NDIlib_send_instance_t),
    pub send_add_connection_metadata:
        unsafe extern "C" fn(NDIlib_send_instance_t, *const NDIlib_metadata_frame_t),
    pub send_set_failover: unsafe extern "C" fn(NDIlib_send_instance_t, *const NDIlib_source_t),
    pub util_send_send_audio_interleaved_16s:
        unsafe extern "C" fn(NDIlib_send_instance_t, *const NDIlib_audio_frame_interleaved_16s_t),
    pub util_send_send_audio_interleaved_32f:
        unsafe extern "C" fn(NDIlib_send_instance_t, *const NDIlib_audio_frame_interleaved_32f_t),

    pub recv_create_v2: unsafe extern "C" fn(*const NDIlib_recv_create_t) -> NDIlib_recv_instance_t,
    pub recv_destroy: unsafe extern "C" fn(NDIlib_recv_instance_t),
    pub recv_capture_v2: unsafe extern "C" fn(
        NDIlib_recv_instance_t,
        *mut NDIlib_video_frame_v2_t,
        *mut NDIlib_audio_frame_v2_t,
        *mut NDIlib_metadata_frame_t,
        u32,
    ) -> NDIlib_frame_type_e,
    pub recv_free_video_v2: unsafe extern "C" fn(NDIlib_recv_instance_t, *const NDIlib_video_frame_v2_t),
    pub recv_free_audio_v2: unsafe extern "C" fn(NDIlib_recv_instance_t, *const NDIlib_audio_frame_v2_t),
    pub recv_free_metadata: unsafe extern "C" fn(NDIlib_recv_instance_t, *const NDIlib_metadata_frame_t),
    pub recv_send_metadata:
        unsafe extern "C" fn(NDIlib_recv_instance_t, *const NDIlib_metadata_frame_t) -> bool,
    pub recv_set_tally: unsafe extern "C" fn(NDIlib_recv_instance_t, *const NDIlib_tally_t) -> bool,
    pub recv_get_performance: unsafe extern "C" fn(
        NDIlib_recv_instance_t,
        *mut NDIlib_recv_performance_t,
        *mut NDIlib_recv_performance_t,
    ),
    pub recv_get_queue: unsafe extern "C" fn(NDIlib_recv_instance_t, *mut NDIlib_recv_queue_t),
    pub recv_clear_connection_metadata: unsafe extern "C" fn(NDIlib_recv_instance_t),
    pub recv_add_connection_metadata:
        unsafe extern "C" fn(NDIlib_recv_instance_t, *const NDIlib_metadata_frame_t),
    pub recv_get_no_connections: unsafe extern "C" fn(NDIlib_recv_instance_t) -> c_int,

    pub routing_create: unsafe extern "C" fn(*const NDIlib_routing_create_t) -> NDIlib_routing_instance_t,
    pub routing_destroy: unsafe extern "C" fn(NDIlib_routing_instance_t),
    pub routing_change: unsafe extern "C" fn(NDIlib_routing_instance_t, *const NDIlib_source_t) -> bool,
    pub routing_clear: unsafe extern "C" fn(NDIlib_routing_instance_t) -> bool,

    pub util_audio_to_interleaved_16s_v2:
        unsafe extern "C" fn(*const NDIlib_audio_frame_v2_t, *mut NDIlib_audio_frame_interleaved_16s_t),
    pub util_audio_from_interleaved_16s_v2:
        unsafe extern "C" fn(*const NDIlib_audio_frame_interleaved_16s_t, *mut NDIlib_audio_frame_v2_t),
    pub util_audio_to_interleaved_32f_v2:
        unsafe extern "C" fn(*const NDIlib_audio_frame_v2_t, *mut NDIlib_audio_frame_interleaved_32f_t),
    pub util_audio_from_interleaved_32f_v2:
        unsafe extern "C" fn(*const NDIlib_audio_frame_interleaved_32f_t, *mut NDIlib_audio_frame_v2_t),

    pub ptz: Option<PtzApi>,
    pub recording: Option<RecordingApi>,
    pub web_control: Option<WebControlApi>,
}

/// v3.01 PTZ camera control.
#[derive(Clone, Copy)]
pub(crate) struct PtzApi {
    pub recv_ptz_is_supported: unsafe extern "C" fn(NDIlib_recv_instance_t) -> bool,
    pub recv_ptz_zoom: unsafe extern "C" fn(NDIlib_recv_instance_t, f32) -> bool,
    pub recv_ptz_zoom_speed: unsafe extern "C" fn(NDIlib_recv_instance_t, f32) -> bool,
    pub recv_ptz_pan_tilt: unsafe extern "C" fn(NDIlib_recv_instance_t, f32, f32) -> bool,
    pub recv_ptz_pan_tilt_speed: unsafe extern "C" fn(NDIlib_recv_instance_t, f32, f32) -> bool,
    pub recv_ptz_store_preset: unsafe extern "C" fn(NDIlib_recv_instance_t, c_int) -> bool,
    pub recv_ptz_recall_preset: unsafe extern "C" fn(NDIlib_recv_instance_t, c_int, f32) -> bool,
    pub recv_ptz_auto_focus: unsafe extern "C" fn(NDIlib_recv_instance_t) -> bool,
    pub recv_ptz_focus: unsafe extern "C" fn(NDIlib_recv_instance_t, f32) -> bool,
    pub recv_ptz_focus_speed: unsafe extern "C" fn(NDIlib_recv_instance_t, f32) -> bool,
    pub recv_ptz_white_balance_auto: unsafe extern "C" fn(NDIlib_recv_instance_t) -> bool,
    pub recv_ptz_white_balance_indoor: unsafe extern "C" fn(NDIlib_recv_instance_t) -> bool,
    pub recv_ptz_white_balance_outdoor: unsafe extern "C" fn(NDIlib_recv_instance_t) -> bool,
    pub recv_ptz_white_balance_oneshot: unsafe extern "C" fn(NDIlib_recv_instance_t) -> bool,
    pub recv_ptz_white_balance_manual: unsafe extern "C" fn(NDIlib_recv_instance_t, f32, f32) -> bool,
    pub recv_ptz_exposure_auto: unsafe extern "C" fn(NDIlib_recv_instance_t) -> bool,
    pub recv_ptz_exposure_manual: unsafe extern "C" fn(NDIlib_recv_instance_t, f32) -> bool,
}

/// v3.01 recording control. Strings it returns are released with `recv_free_string`.
#[derive(Clone, Copy)]
pub(crate) struct RecordingApi {
    pub recv_free_string: unsafe extern "C" fn(NDIlib_recv_instance_t, *const c_char),
    pub recv_recording_is_supported: unsafe extern "C" fn(NDIlib_recv_instance_t) -> bool,
    pub recv_recording_start: unsafe extern "C" fn(NDIlib_recv_instance_t, *const c_char) -> bool,
    pub recv_recording_stop: unsafe extern "C" fn(NDIlib_recv_instance_t) -> bool,
    pub recv_recording_set_audio_level: unsafe extern "C" fn(NDIlib_recv_instance_t, f32) -> bool,
    pub recv_recording_is_recording: unsafe extern "C" fn(NDIlib_recv_instance_t) -> bool,
    pub recv_recording_get_filename: unsafe extern "C" fn(NDIlib_recv_instance_t) -> *const c_char,
    pub recv_recording_get_error: unsafe extern "C" fn(NDIlib_recv_instance_t) -> *const c_char,
    pub recv_recording_get_times:
        unsafe extern "C" fn(NDIlib_recv_instance_t, *mut NDIlib_recv_recording_time_t) -> bool,
}

/// v3.01 web control URL lookup.
#[derive(Clone, Copy)]
pub(crate) struct WebControlApi {
    pub recv_free_string: unsafe extern "C" fn(NDIlib_recv_instance_t, *const c_char),
    pub recv_get_web_control: unsafe extern "C" fn(NDIlib_recv_instance_t) -> *const c_char,
}

impl Api {
    /// Validates `table`, reporting every missing required entry at once.
    pub(crate) fn resolve(table: &NDIlib_v3) -> Result<Self> {
        let ptz = resolve_entries!(table => PtzApi {
            recv_ptz_is_supported,
            recv_ptz_zoom,
            recv_ptz_zoom_speed,
            recv_ptz_pan_tilt,
            recv_ptz_pan_tilt_speed,
            recv_ptz_store_preset,
            recv_ptz_recall_preset,
            recv_ptz_auto_focus,
            recv_ptz_focus,
            recv_ptz_focus_speed,
            recv_ptz_white_balance_auto,
            recv_ptz_white_balance_indoor,
            recv_ptz_white_balance_outdoor,
            recv_ptz_white_balance_oneshot,
            recv_ptz_white_balance_manual,
            recv_ptz_exposure_auto,
            recv_ptz_exposure_manual,
        })
        .ok();

        let recording = resolve_entries!(table => RecordingApi {
            recv_free_string,
            recv_recording_is_supported,
            recv_recording_start,
            recv_recording_stop,
            recv_recording_set_audio_level,
            recv_recording_is_recording,
            recv_recording_get_filename,
            recv_recording_get_error,
            recv_recording_get_times,
        })
        .ok();

        let web_control = resolve_entries!(table => WebControlApi {
            recv_free_string,
            recv_get_web_control,
        })
        .ok();

        resolve_entries!(table => Api {
            initialize,
            destroy,
            version,
            is_supported_CPU,
            find_create_v2,
            find_destroy,
            find_get_sources,
            find_wait_for_sources,
            find_get_current_sources,
            send_create,
            send_destroy,
            send_send_video_v2,
            send_send_video_async_v2,
            send_send_audio_v2,
            send_send_metadata,
            send_capture,
            send_free_metadata,
            send_get_tally,
            send_get_no_connections,
            send_clear_connection_metadata,
            send_add_connection_metadata,
            send_set_failover,
            util_send_send_audio_interleaved_16s,
            util_send_send_audio_interleaved_32f,
            recv_create_v2,
            recv_destroy,
            recv_capture_v2,
            recv_free_video_v2,
            recv_free_audio_v2,
            recv_free_metadata,
            recv_send_metadata,
            recv_set_tally,
            recv_get_performance,
            recv_get_queue,
            recv_clear_connection_metadata,
            recv_add_connection_metadata,
            recv_get_no_connections,
            routing_create,
            routing_destroy,
            routing_change,
            routing_clear,
            util_audio_to_interleaved_16s_v2,
            util_audio_from_interleaved_16s_v2,
            util_audio_to_interleaved_32f_v2,
            util_audio_from_interleaved_32f_v2,
        } extra {
            ptz: ptz,
            recording: recording,
            web_control: web_control,
        })
        .map_err(Error::MissingEntryPoints)
    }
}
