//! An in-process stand-in for the NDI runtime.
//!
//! Every entry of the function table is backed by a Rust function operating on
//! one global [`FakeState`]. Senders keep the frames sent to them in queues;
//! a receiver created for `"FAKE-HOST (<name>)"` captures from the sender
//! named `<name>`. Every buffer handed out by a capture call is recorded so
//! tests can check it is freed exactly once.

#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    ffi::{c_void, CStr, CString},
    os::raw::{c_char, c_int},
    ptr, slice,
};

use ndi_dyn::{ffi::*, NDI};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, MutexGuard};

pub const FAKE_HOST: &str = "FAKE-HOST";
pub const FAKE_ADDRESS: &str = "127.0.0.1:5961";

/// Full source name the fake runtime announces for a sender called `name`.
pub fn source_name(name: &str) -> String {
    format!("{FAKE_HOST} ({name})")
}

#[derive(Clone)]
pub struct SentVideo {
    pub raw: NDIlib_video_frame_v2_t,
    pub data: Vec<u8>,
    pub metadata: Option<CString>,
}

#[derive(Clone)]
pub struct SentAudio {
    pub sample_rate: c_int,
    pub channels: c_int,
    pub samples: c_int,
    pub timecode: i64,
    /// Planar, `samples` per channel.
    pub data: Vec<f32>,
}

#[derive(Default)]
pub struct FakeSender {
    pub name: String,
    pub video: VecDeque<SentVideo>,
    pub audio: VecDeque<SentAudio>,
    pub metadata: VecDeque<String>,
    /// Metadata sent upstream by receivers.
    pub upstream: VecDeque<String>,
    pub tally: NDIlib_tally_t,
    pub tally_changed: bool,
    pub async_pending: bool,
    pub failover: Option<String>,
    pub connection_metadata: Vec<String>,
}

#[derive(Default)]
pub struct FakeReceiver {
    pub source: String,
    pub captured: NDIlib_recv_performance_t,
    pub connection_metadata: Vec<String>,
}

/// A buffer lent to the crate by a capture or string-returning call.
enum Lent {
    Video(Vec<u8>, Option<CString>),
    Audio(Vec<f32>),
    Metadata(CString),
    Str(CString),
}

pub struct FakeState {
    pub calls: HashMap<&'static str, usize>,
    pub fail_initialize: bool,
    pub cpu_supported: bool,
    pub fail_create: bool,
    /// Returned by the next receiver capture instead of a frame.
    pub inject_frame_type: Option<NDIlib_frame_type_e>,
    /// Discovery entries appended with a null name and address.
    pub unnamed_sources: usize,
    pub ptz_accepts: bool,
    pub ptz_log: Vec<String>,
    pub recording: bool,
    pub senders: HashMap<usize, FakeSender>,
    pub receivers: HashMap<usize, FakeReceiver>,
    pub routes: HashMap<usize, Option<String>>,
    pub bad_frees: usize,
    lent: HashMap<usize, Lent>,
    next_handle: usize,
    source_names: Vec<(CString, CString)>,
    source_table: Vec<NDIlib_source_t>,
}

// SAFETY: the raw pointers inside only point into buffers owned by the state.
unsafe impl Send for FakeState {}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            calls: HashMap::new(),
            fail_initialize: false,
            cpu_supported: true,
            fail_create: false,
            inject_frame_type: None,
            unnamed_sources: 0,
            ptz_accepts: true,
            ptz_log: Vec::new(),
            recording: false,
            senders: HashMap::new(),
            receivers: HashMap::new(),
            routes: HashMap::new(),
            bad_frees: 0,
            lent: HashMap::new(),
            next_handle: 0x1000,
            source_names: Vec::new(),
            source_table: Vec::new(),
        }
    }
}

impl FakeState {
    pub fn count(&self, call: &str) -> usize {
        self.calls.get(call).copied().unwrap_or(0)
    }

    /// Buffers handed out by captures that have not been freed yet.
    pub fn outstanding(&self) -> usize {
        self.lent.len()
    }

    pub fn sender_named(&self, name: &str) -> Option<&FakeSender> {
        self.senders.values().find(|s| s.name == name)
    }

    fn hit(&mut self, call: &'static str) {
        *self.calls.entry(call).or_default() += 1;
    }

    fn handle(&mut self) -> *mut c_void {
        self.next_handle += 0x10;
        self.next_handle as *mut c_void
    }

    fn lend(&mut self, ptr: usize, buffer: Lent) {
        self.lent.insert(ptr, buffer);
    }

    fn reclaim(&mut self, ptr: usize) {
        if self.lent.remove(&ptr).is_none() {
            self.bad_frees += 1;
        }
    }

    fn sender_for_receiver(&mut self, instance: NDIlib_recv_instance_t) -> Option<&mut FakeSender> {
        let source = self.receivers.get(&(instance as usize))?.source.clone();
        self.senders
            .values_mut()
            .find(|s| source_name(&s.name) == source)
    }
}

static STATE: Lazy<Mutex<FakeState>> = Lazy::new(|| Mutex::new(FakeState::default()));
static SERIAL: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Serializes tests in one binary and resets the fake runtime.
///
/// Keep the guard alive until every handle created by the test is dropped.
pub fn setup() -> MutexGuard<'static, ()> {
    let guard = SERIAL.lock();
    *STATE.lock() = FakeState::default();
    guard
}

/// Inspects or adjusts the fake runtime. Do not call crate methods inside `f`.
pub fn with_state<R>(f: impl FnOnce(&mut FakeState) -> R) -> R {
    f(&mut STATE.lock())
}

pub fn count(call: &str) -> usize {
    with_state(|s| s.count(call))
}

/// Loads the fake runtime with every tier present.
pub fn load() -> NDI {
    unsafe { NDI::from_table(&table()) }.expect("fake runtime loads")
}

unsafe fn string(p: *const c_char) -> Option<String> {
    (!p.is_null()).then(|| CStr::from_ptr(p).to_string_lossy().into_owned())
}

// Lifecycle

unsafe extern "C" fn initialize() -> bool {
    let mut s = STATE.lock();
    s.hit("initialize");
    !s.fail_initialize
}

unsafe extern "C" fn destroy() {
    STATE.lock().hit("destroy");
}

unsafe extern "C" fn version() -> *const c_char {
    c"FAKE NDI 3.8.0".as_ptr()
}

unsafe extern "C" fn is_supported_cpu() -> bool {
    STATE.lock().cpu_supported
}

// Find

unsafe extern "C" fn find_create_v2(_settings: *const NDIlib_find_create_t) -> NDIlib_find_instance_t {
    let mut s = STATE.lock();
    s.hit("find_create");
    if s.fail_create {
        return ptr::null_mut();
    }
    s.handle()
}

unsafe extern "C" fn find_destroy(_instance: NDIlib_find_instance_t) {
    STATE.lock().hit("find_destroy");
}

unsafe extern "C" fn find_wait_for_sources(_instance: NDIlib_find_instance_t, _timeout: u32) -> bool {
    !STATE.lock().senders.is_empty()
}

unsafe extern "C" fn find_get_current_sources(
    _instance: NDIlib_find_instance_t,
    count: *mut u32,
) -> *const NDIlib_source_t {
    let mut s = STATE.lock();
    let mut names: Vec<String> = s.senders.values().map(|snd| source_name(&snd.name)).collect();
    names.sort();
    s.source_names = names
        .into_iter()
        .map(|name| {
            (
                CString::new(name).unwrap(),
                CString::new(FAKE_ADDRESS).unwrap(),
            )
        })
        .collect();
    let mut table: Vec<_> = s
        .source_names
        .iter()
        .map(|(name, address)| NDIlib_source_t {
            p_ndi_name: name.as_ptr(),
            p_ip_address: address.as_ptr(),
        })
        .collect();
    table.extend((0..s.unnamed_sources).map(|_| NDIlib_source_t::default()));
    s.source_table = table;
    *count = s.source_table.len() as u32;
    if s.source_table.is_empty() {
        ptr::null()
    } else {
        s.source_table.as_ptr()
    }
}

unsafe extern "C" fn find_get_sources(
    instance: NDIlib_find_instance_t,
    count: *mut u32,
    _timeout: u32,
) -> *const NDIlib_source_t {
    find_get_current_sources(instance, count)
}

// Send

unsafe extern "C" fn send_create(settings: *const NDIlib_send_create_t) -> NDIlib_send_instance_t {
    let mut s = STATE.lock();
    s.hit("send_create");
    if s.fail_create {
        return ptr::null_mut();
    }
    let name = string((*settings).p_ndi_name).unwrap_or_else(|| "unnamed".into());
    let handle = s.handle();
    s.senders.insert(
        handle as usize,
        FakeSender {
            name,
            ..Default::default()
        },
    );
    handle
}

unsafe extern "C" fn send_destroy(instance: NDIlib_send_instance_t) {
    let mut s = STATE.lock();
    s.hit("send_destroy");
    s.senders.remove(&(instance as usize));
}

unsafe fn copy_video(frame: &NDIlib_video_frame_v2_t) -> SentVideo {
    let len = (frame.line_stride_in_bytes * frame.yres) as usize;
    SentVideo {
        raw: *frame,
        data: slice::from_raw_parts(frame.p_data, len).to_vec(),
        metadata: string(frame.p_metadata).map(|m| CString::new(m).unwrap()),
    }
}

unsafe extern "C" fn send_send_video_v2(instance: NDIlib_send_instance_t, frame: *const NDIlib_video_frame_v2_t) {
    let video = copy_video(&*frame);
    let mut s = STATE.lock();
    s.hit("send_video");
    if let Some(sender) = s.senders.get_mut(&(instance as usize)) {
        sender.video.push_back(video);
    }
}

unsafe extern "C" fn send_send_video_async_v2(
    instance: NDIlib_send_instance_t,
    frame: *const NDIlib_video_frame_v2_t,
) {
    let frame = &*frame;
    let mut s = STATE.lock();
    if frame.p_data.is_null() {
        s.hit("send_video_async_flush");
        if let Some(sender) = s.senders.get_mut(&(instance as usize)) {
            sender.async_pending = false;
        }
        return;
    }
    s.hit("send_video_async");
    let video = copy_video(frame);
    if let Some(sender) = s.senders.get_mut(&(instance as usize)) {
        sender.video.push_back(video);
        sender.async_pending = true;
    }
}

unsafe extern "C" fn send_send_audio_v2(instance: NDIlib_send_instance_t, frame: *const NDIlib_audio_frame_v2_t) {
    let frame = &*frame;
    let samples = frame.no_samples as usize;
    let stride = frame.channel_stride_in_bytes as usize / 4;
    let mut data = Vec::with_capacity(frame.no_channels as usize * samples);
    for ch in 0..frame.no_channels as usize {
        data.extend_from_slice(slice::from_raw_parts(frame.p_data.add(ch * stride), samples));
    }
    let mut s = STATE.lock();
    s.hit("send_audio");
    if let Some(sender) = s.senders.get_mut(&(instance as usize)) {
        sender.audio.push_back(SentAudio {
            sample_rate: frame.sample_rate,
            channels: frame.no_channels,
            samples: frame.no_samples,
            timecode: frame.timecode,
            data,
        });
    }
}

fn planar_from_interleaved(interleaved: &[f32], channels: usize, samples: usize) -> Vec<f32> {
    let mut planar = vec![0.0; channels * samples];
    for (i, value) in interleaved.iter().enumerate().take(channels * samples) {
        planar[(i % channels) * samples + i / channels] = *value;
    }
    planar
}

fn level_scale(reference_level: c_int) -> f32 {
    10f32.powf(reference_level as f32 / 20.0)
}

unsafe extern "C" fn util_send_send_audio_interleaved_16s(
    instance: NDIlib_send_instance_t,
    frame: *const NDIlib_audio_frame_interleaved_16s_t,
) {
    let frame = &*frame;
    let (channels, samples) = (frame.no_channels as usize, frame.no_samples as usize);
    let scale = level_scale(frame.reference_level) / 32767.0;
    let floats: Vec<f32> = slice::from_raw_parts(frame.p_data, channels * samples)
        .iter()
        .map(|&v| v as f32 * scale)
        .collect();
    let mut s = STATE.lock();
    s.hit("send_audio_16s");
    if let Some(sender) = s.senders.get_mut(&(instance as usize)) {
        sender.audio.push_back(SentAudio {
            sample_rate: frame.sample_rate,
            channels: frame.no_channels,
            samples: frame.no_samples,
            timecode: frame.timecode,
            data: planar_from_interleaved(&floats, channels, samples),
        });
    }
}

unsafe extern "C" fn util_send_send_audio_interleaved_32f(
    instance: NDIlib_send_instance_t,
    frame: *const NDIlib_audio_frame_interleaved_32f_t,
) {
    let frame = &*frame;
    let (channels, samples) = (frame.no_channels as usize, frame.no_samples as usize);
    let floats = slice::from_raw_parts(frame.p_data, channels * samples);
    let mut s = STATE.lock();
    s.hit("send_audio_32f");
    if let Some(sender) = s.senders.get_mut(&(instance as usize)) {
        sender.audio.push_back(SentAudio {
            sample_rate: frame.sample_rate,
            channels: frame.no_channels,
            samples: frame.no_samples,
            timecode: frame.timecode,
            data: planar_from_interleaved(floats, channels, samples),
        });
    }
}

unsafe extern "C" fn send_send_metadata(instance: NDIlib_send_instance_t, frame: *const NDIlib_metadata_frame_t) {
    let data = string((*frame).p_data).unwrap_or_default();
    let mut s = STATE.lock();
    s.hit("send_metadata");
    if let Some(sender) = s.senders.get_mut(&(instance as usize)) {
        sender.metadata.push_back(data);
    }
}

unsafe extern "C" fn send_capture(
    instance: NDIlib_send_instance_t,
    frame: *mut NDIlib_metadata_frame_t,
    _timeout: u32,
) -> NDIlib_frame_type_e {
    let mut s = STATE.lock();
    let Some(data) = s
        .senders
        .get_mut(&(instance as usize))
        .and_then(|sender| sender.upstream.pop_front())
    else {
        return NDIlib_frame_type_none;
    };
    let data = CString::new(data).unwrap();
    *frame = NDIlib_metadata_frame_t {
        length: data.as_bytes_with_nul().len() as c_int,
        timecode: 0,
        p_data: data.as_ptr() as *mut c_char,
    };
    s.lend(data.as_ptr() as usize, Lent::Metadata(data));
    NDIlib_frame_type_metadata
}

unsafe extern "C" fn send_free_metadata(_instance: NDIlib_send_instance_t, frame: *const NDIlib_metadata_frame_t) {
    let mut s = STATE.lock();
    s.hit("send_free_metadata");
    s.reclaim((*frame).p_data as usize);
}

unsafe extern "C" fn send_get_tally(
    instance: NDIlib_send_instance_t,
    tally: *mut NDIlib_tally_t,
    _timeout: u32,
) -> bool {
    let mut s = STATE.lock();
    let Some(sender) = s.senders.get_mut(&(instance as usize)) else {
        return false;
    };
    *tally = sender.tally;
    std::mem::take(&mut sender.tally_changed)
}

unsafe extern "C" fn send_get_no_connections(instance: NDIlib_send_instance_t, _timeout: u32) -> c_int {
    let s = STATE.lock();
    let Some(sender) = s.senders.get(&(instance as usize)) else {
        return 0;
    };
    let name = source_name(&sender.name);
    s.receivers.values().filter(|r| r.source == name).count() as c_int
}

unsafe extern "C" fn send_clear_connection_metadata(instance: NDIlib_send_instance_t) {
    if let Some(sender) = STATE.lock().senders.get_mut(&(instance as usize)) {
        sender.connection_metadata.clear();
    }
}

unsafe extern "C" fn send_add_connection_metadata(
    instance: NDIlib_send_instance_t,
    frame: *const NDIlib_metadata_frame_t,
) {
    let data = string((*frame).p_data).unwrap_or_default();
    if let Some(sender) = STATE.lock().senders.get_mut(&(instance as usize)) {
        sender.connection_metadata.push(data);
    }
}

unsafe extern "C" fn send_set_failover(instance: NDIlib_send_instance_t, source: *const NDIlib_source_t) {
    let failover = if source.is_null() {
        None
    } else {
        string((*source).p_ndi_name)
    };
    if let Some(sender) = STATE.lock().senders.get_mut(&(instance as usize)) {
        sender.failover = failover;
    }
}

// Receive

unsafe extern "C" fn recv_create_v2(settings: *const NDIlib_recv_create_t) -> NDIlib_recv_instance_t {
    let source = string((*settings).source_to_connect_to.p_ndi_name).unwrap_or_default();
    let mut s = STATE.lock();
    s.hit("recv_create");
    if s.fail_create {
        return ptr::null_mut();
    }
    let handle = s.handle();
    s.receivers.insert(
        handle as usize,
        FakeReceiver {
            source,
            ..Default::default()
        },
    );
    handle
}

unsafe extern "C" fn recv_destroy(instance: NDIlib_recv_instance_t) {
    let mut s = STATE.lock();
    s.hit("recv_destroy");
    s.receivers.remove(&(instance as usize));
}

unsafe extern "C" fn recv_capture_v2(
    instance: NDIlib_recv_instance_t,
    video: *mut NDIlib_video_frame_v2_t,
    audio: *mut NDIlib_audio_frame_v2_t,
    metadata: *mut NDIlib_metadata_frame_t,
    _timeout: u32,
) -> NDIlib_frame_type_e {
    let mut s = STATE.lock();
    s.hit("recv_capture");
    if let Some(frame_type) = s.inject_frame_type.take() {
        return frame_type;
    }
    let Some(sender) = s.sender_for_receiver(instance) else {
        return NDIlib_frame_type_none;
    };

    if !video.is_null() {
        if let Some(sent) = sender.video.pop_front() {
            let mut raw = sent.raw;
            raw.p_data = sent.data.as_ptr() as *mut u8;
            raw.p_metadata = sent.metadata.as_ref().map_or(ptr::null(), |m| m.as_ptr());
            raw.timestamp = 1;
            *video = raw;
            s.lend(raw.p_data as usize, Lent::Video(sent.data, sent.metadata));
            if let Some(rx) = s.receivers.get_mut(&(instance as usize)) {
                rx.captured.video_frames += 1;
            }
            return NDIlib_frame_type_video;
        }
    }
    if !audio.is_null() {
        if let Some(sent) = sender.audio.pop_front() {
            *audio = NDIlib_audio_frame_v2_t {
                sample_rate: sent.sample_rate,
                no_channels: sent.channels,
                no_samples: sent.samples,
                timecode: sent.timecode,
                p_data: sent.data.as_ptr() as *mut f32,
                channel_stride_in_bytes: sent.samples * 4,
                p_metadata: ptr::null(),
                timestamp: NDIlib_recv_timestamp_undefined,
            };
            s.lend(sent.data.as_ptr() as usize, Lent::Audio(sent.data));
            if let Some(rx) = s.receivers.get_mut(&(instance as usize)) {
                rx.captured.audio_frames += 1;
            }
            return NDIlib_frame_type_audio;
        }
    }
    if !metadata.is_null() {
        if let Some(sent) = sender.metadata.pop_front() {
            let data = CString::new(sent).unwrap();
            *metadata = NDIlib_metadata_frame_t {
                length: data.as_bytes_with_nul().len() as c_int,
                timecode: 0,
                p_data: data.as_ptr() as *mut c_char,
            };
            s.lend(data.as_ptr() as usize, Lent::Metadata(data));
            if let Some(rx) = s.receivers.get_mut(&(instance as usize)) {
                rx.captured.metadata_frames += 1;
            }
            return NDIlib_frame_type_metadata;
        }
    }
    NDIlib_frame_type_none
}

unsafe extern "C" fn recv_free_video_v2(_instance: NDIlib_recv_instance_t, frame: *const NDIlib_video_frame_v2_t) {
    let mut s = STATE.lock();
    s.hit("recv_free_video");
    s.reclaim((*frame).p_data as usize);
}

unsafe extern "C" fn recv_free_audio_v2(_instance: NDIlib_recv_instance_t, frame: *const NDIlib_audio_frame_v2_t) {
    let mut s = STATE.lock();
    s.hit("recv_free_audio");
    s.reclaim((*frame).p_data as usize);
}

unsafe extern "C" fn recv_free_metadata(_instance: NDIlib_recv_instance_t, frame: *const NDIlib_metadata_frame_t) {
    let mut s = STATE.lock();
    s.hit("recv_free_metadata");
    s.reclaim((*frame).p_data as usize);
}

unsafe extern "C" fn recv_send_metadata(instance: NDIlib_recv_instance_t, frame: *const NDIlib_metadata_frame_t) -> bool {
    let data = string((*frame).p_data).unwrap_or_default();
    let mut s = STATE.lock();
    match s.sender_for_receiver(instance) {
        Some(sender) => {
            sender.upstream.push_back(data);
            true
        }
        None => false,
    }
}

unsafe extern "C" fn recv_set_tally(instance: NDIlib_recv_instance_t, tally: *const NDIlib_tally_t) -> bool {
    let tally = *tally;
    let mut s = STATE.lock();
    match s.sender_for_receiver(instance) {
        Some(sender) => {
            sender.tally = tally;
            sender.tally_changed = true;
            true
        }
        None => false,
    }
}

unsafe extern "C" fn recv_get_performance(
    instance: NDIlib_recv_instance_t,
    total: *mut NDIlib_recv_performance_t,
    dropped: *mut NDIlib_recv_performance_t,
) {
    let s = STATE.lock();
    if let Some(rx) = s.receivers.get(&(instance as usize)) {
        *total = rx.captured;
    }
    *dropped = NDIlib_recv_performance_t::default();
}

unsafe extern "C" fn recv_get_queue(instance: NDIlib_recv_instance_t, queue: *mut NDIlib_recv_queue_t) {
    let mut s = STATE.lock();
    *queue = match s.sender_for_receiver(instance) {
        Some(sender) => NDIlib_recv_queue_t {
            video_frames: sender.video.len() as c_int,
            audio_frames: sender.audio.len() as c_int,
            metadata_frames: sender.metadata.len() as c_int,
        },
        None => NDIlib_recv_queue_t::default(),
    };
}

unsafe extern "C" fn recv_clear_connection_metadata(instance: NDIlib_recv_instance_t) {
    if let Some(rx) = STATE.lock().receivers.get_mut(&(instance as usize)) {
        rx.connection_metadata.clear();
    }
}

unsafe extern "C" fn recv_add_connection_metadata(
    instance: NDIlib_recv_instance_t,
    frame: *const NDIlib_metadata_frame_t,
) {
    let data = string((*frame).p_data).unwrap_or_default();
    if let Some(rx) = STATE.lock().receivers.get_mut(&(instance as usize)) {
        rx.connection_metadata.push(data);
    }
}

unsafe extern "C" fn recv_get_no_connections(instance: NDIlib_recv_instance_t) -> c_int {
    STATE.lock().sender_for_receiver(instance).is_some() as c_int
}

// Routing

unsafe extern "C" fn routing_create(_settings: *const NDIlib_routing_create_t) -> NDIlib_routing_instance_t {
    let mut s = STATE.lock();
    s.hit("routing_create");
    let handle = s.handle();
    s.routes.insert(handle as usize, None);
    handle
}

unsafe extern "C" fn routing_destroy(instance: NDIlib_routing_instance_t) {
    let mut s = STATE.lock();
    s.hit("routing_destroy");
    s.routes.remove(&(instance as usize));
}

unsafe extern "C" fn routing_change(instance: NDIlib_routing_instance_t, source: *const NDIlib_source_t) -> bool {
    let name = string((*source).p_ndi_name);
    let mut s = STATE.lock();
    match s.routes.get_mut(&(instance as usize)) {
        Some(route) => {
            *route = name;
            true
        }
        None => false,
    }
}

unsafe extern "C" fn routing_clear(instance: NDIlib_routing_instance_t) -> bool {
    match STATE.lock().routes.get_mut(&(instance as usize)) {
        Some(route) => {
            *route = None;
            true
        }
        None => false,
    }
}

// Audio utilities

unsafe fn planar_samples(frame: &NDIlib_audio_frame_v2_t, ch: usize, i: usize) -> *mut f32 {
    frame
        .p_data
        .add(ch * frame.channel_stride_in_bytes as usize / 4 + i)
}

unsafe extern "C" fn util_audio_to_interleaved_16s_v2(
    src: *const NDIlib_audio_frame_v2_t,
    dst: *mut NDIlib_audio_frame_interleaved_16s_t,
) {
    STATE.lock().hit("audio_to_16s");
    let (src, dst) = (&*src, &mut *dst);
    let channels = src.no_channels as usize;
    let scale = 32767.0 / level_scale(dst.reference_level);
    for i in 0..src.no_samples as usize {
        for ch in 0..channels {
            let v = *planar_samples(src, ch, i) * scale;
            *dst.p_data.add(i * channels + ch) = v.clamp(-32768.0, 32767.0).round() as i16;
        }
    }
}

unsafe extern "C" fn util_audio_from_interleaved_16s_v2(
    src: *const NDIlib_audio_frame_interleaved_16s_t,
    dst: *mut NDIlib_audio_frame_v2_t,
) {
    STATE.lock().hit("audio_from_16s");
    let (src, dst) = (&*src, &*dst);
    let channels = src.no_channels as usize;
    let scale = level_scale(src.reference_level) / 32767.0;
    for i in 0..src.no_samples as usize {
        for ch in 0..channels {
            *planar_samples(dst, ch, i) = *src.p_data.add(i * channels + ch) as f32 * scale;
        }
    }
}

unsafe extern "C" fn util_audio_to_interleaved_32f_v2(
    src: *const NDIlib_audio_frame_v2_t,
    dst: *mut NDIlib_audio_frame_interleaved_32f_t,
) {
    STATE.lock().hit("audio_to_32f");
    let (src, dst) = (&*src, &mut *dst);
    let channels = src.no_channels as usize;
    for i in 0..src.no_samples as usize {
        for ch in 0..channels {
            *dst.p_data.add(i * channels + ch) = *planar_samples(src, ch, i);
        }
    }
}

unsafe extern "C" fn util_audio_from_interleaved_32f_v2(
    src: *const NDIlib_audio_frame_interleaved_32f_t,
    dst: *mut NDIlib_audio_frame_v2_t,
) {
    STATE.lock().hit("audio_from_32f");
    let (src, dst) = (&*src, &*dst);
    let channels = src.no_channels as usize;
    for i in 0..src.no_samples as usize {
        for ch in 0..channels {
            *planar_samples(dst, ch, i) = *src.p_data.add(i * channels + ch);
        }
    }
}

// v3.01: PTZ, recording, web control

fn ptz(command: String) -> bool {
    let mut s = STATE.lock();
    s.ptz_log.push(command);
    s.ptz_accepts
}

unsafe extern "C" fn recv_ptz_is_supported(_: NDIlib_recv_instance_t) -> bool {
    true
}
unsafe extern "C" fn recv_ptz_zoom(_: NDIlib_recv_instance_t, v: f32) -> bool {
    ptz(format!("zoom {v}"))
}
unsafe extern "C" fn recv_ptz_zoom_speed(_: NDIlib_recv_instance_t, v: f32) -> bool {
    ptz(format!("zoom_speed {v}"))
}
unsafe extern "C" fn recv_ptz_pan_tilt(_: NDIlib_recv_instance_t, p: f32, t: f32) -> bool {
    ptz(format!("pan_tilt {p} {t}"))
}
unsafe extern "C" fn recv_ptz_pan_tilt_speed(_: NDIlib_recv_instance_t, p: f32, t: f32) -> bool {
    ptz(format!("pan_tilt_speed {p} {t}"))
}
unsafe extern "C" fn recv_ptz_store_preset(_: NDIlib_recv_instance_t, n: c_int) -> bool {
    ptz(format!("store_preset {n}"))
}
unsafe extern "C" fn recv_ptz_recall_preset(_: NDIlib_recv_instance_t, n: c_int, speed: f32) -> bool {
    ptz(format!("recall_preset {n} {speed}"))
}
unsafe extern "C" fn recv_ptz_auto_focus(_: NDIlib_recv_instance_t) -> bool {
    ptz("auto_focus".into())
}
unsafe extern "C" fn recv_ptz_focus(_: NDIlib_recv_instance_t, v: f32) -> bool {
    ptz(format!("focus {v}"))
}
unsafe extern "C" fn recv_ptz_focus_speed(_: NDIlib_recv_instance_t, v: f32) -> bool {
    ptz(format!("focus_speed {v}"))
}
unsafe extern "C" fn recv_ptz_white_balance_auto(_: NDIlib_recv_instance_t) -> bool {
    ptz("wb_auto".into())
}
unsafe extern "C" fn recv_ptz_white_balance_indoor(_: NDIlib_recv_instance_t) -> bool {
    ptz("wb_indoor".into())
}
unsafe extern "C" fn recv_ptz_white_balance_outdoor(_: NDIlib_recv_instance_t) -> bool {
    ptz("wb_outdoor".into())
}
unsafe extern "C" fn recv_ptz_white_balance_oneshot(_: NDIlib_recv_instance_t) -> bool {
    ptz("wb_oneshot".into())
}
unsafe extern "C" fn recv_ptz_white_balance_manual(_: NDIlib_recv_instance_t, r: f32, b: f32) -> bool {
    ptz(format!("wb_manual {r} {b}"))
}
unsafe extern "C" fn recv_ptz_exposure_auto(_: NDIlib_recv_instance_t) -> bool {
    ptz("exposure_auto".into())
}
unsafe extern "C" fn recv_ptz_exposure_manual(_: NDIlib_recv_instance_t, v: f32) -> bool {
    ptz(format!("exposure_manual {v}"))
}

unsafe extern "C" fn recv_free_string(_instance: NDIlib_recv_instance_t, p: *const c_char) {
    let mut s = STATE.lock();
    s.hit("recv_free_string");
    s.reclaim(p as usize);
}

fn lend_string(value: &str) -> *const c_char {
    let value = CString::new(value).unwrap();
    let p = value.as_ptr();
    STATE.lock().lend(p as usize, Lent::Str(value));
    p
}

unsafe extern "C" fn recv_get_web_control(_: NDIlib_recv_instance_t) -> *const c_char {
    lend_string("http://127.0.0.1/")
}

unsafe extern "C" fn recv_recording_is_supported(_: NDIlib_recv_instance_t) -> bool {
    true
}
unsafe extern "C" fn recv_recording_start(_: NDIlib_recv_instance_t, _hint: *const c_char) -> bool {
    let mut s = STATE.lock();
    let started = !s.recording;
    s.recording = true;
    started
}
unsafe extern "C" fn recv_recording_stop(_: NDIlib_recv_instance_t) -> bool {
    std::mem::take(&mut STATE.lock().recording)
}
unsafe extern "C" fn recv_recording_set_audio_level(_: NDIlib_recv_instance_t, _db: f32) -> bool {
    STATE.lock().recording
}
unsafe extern "C" fn recv_recording_is_recording(_: NDIlib_recv_instance_t) -> bool {
    STATE.lock().recording
}
unsafe extern "C" fn recv_recording_get_filename(_: NDIlib_recv_instance_t) -> *const c_char {
    if STATE.lock().recording {
        lend_string("recording.mov")
    } else {
        ptr::null()
    }
}
unsafe extern "C" fn recv_recording_get_error(_: NDIlib_recv_instance_t) -> *const c_char {
    ptr::null()
}
unsafe extern "C" fn recv_recording_get_times(
    _: NDIlib_recv_instance_t,
    times: *mut NDIlib_recv_recording_time_t,
) -> bool {
    if !STATE.lock().recording {
        return false;
    }
    *times = NDIlib_recv_recording_time_t {
        no_frames: 10,
        start_time: 0,
        last_time: 3_336_667,
    };
    true
}

/// The v3 table without the 3.01 additions.
pub fn base_table() -> NDIlib_v3 {
    NDIlib_v3 {
        initialize: Some(initialize),
        destroy: Some(destroy),
        version: Some(version),
        is_supported_CPU: Some(is_supported_cpu),
        find_create_v2: Some(find_create_v2),
        find_destroy: Some(find_destroy),
        find_get_sources: Some(find_get_sources),
        find_wait_for_sources: Some(find_wait_for_sources),
        find_get_current_sources: Some(find_get_current_sources),
        send_create: Some(send_create),
        send_destroy: Some(send_destroy),
        send_send_video_v2: Some(send_send_video_v2),
        send_send_video_async_v2: Some(send_send_video_async_v2),
        send_send_audio_v2: Some(send_send_audio_v2),
        send_send_metadata: Some(send_send_metadata),
        send_capture: Some(send_capture),
        send_free_metadata: Some(send_free_metadata),
        send_get_tally: Some(send_get_tally),
        send_get_no_connections: Some(send_get_no_connections),
        send_clear_connection_metadata: Some(send_clear_connection_metadata),
        send_add_connection_metadata: Some(send_add_connection_metadata),
        send_set_failover: Some(send_set_failover),
        util_send_send_audio_interleaved_16s: Some(util_send_send_audio_interleaved_16s),
        util_send_send_audio_interleaved_32f: Some(util_send_send_audio_interleaved_32f),
        recv_create_v2: Some(recv_create_v2),
        recv_destroy: Some(recv_destroy),
        recv_capture_v2: Some(recv_capture_v2),
        recv_free_video_v2: Some(recv_free_video_v2),
        recv_free_audio_v2: Some(recv_free_audio_v2),
        recv_free_metadata: Some(recv_free_metadata),
        recv_send_metadata: Some(recv_send_metadata),
        recv_set_tally: Some(recv_set_tally),
        recv_get_performance: Some(recv_get_performance),
        recv_get_queue: Some(recv_get_queue),
        recv_clear_connection_metadata: Some(recv_clear_connection_metadata),
        recv_add_connection_metadata: Some(recv_add_connection_metadata),
        recv_get_no_connections: Some(recv_get_no_connections),
        routing_create: Some(routing_create),
        routing_destroy: Some(routing_destroy),
        routing_change: Some(routing_change),
        routing_clear: Some(routing_clear),
        util_audio_to_interleaved_16s_v2: Some(util_audio_to_interleaved_16s_v2),
        util_audio_from_interleaved_16s_v2: Some(util_audio_from_interleaved_16s_v2),
        util_audio_to_interleaved_32f_v2: Some(util_audio_to_interleaved_32f_v2),
        util_audio_from_interleaved_32f_v2: Some(util_audio_from_interleaved_32f_v2),
        ..Default::default()
    }
}

/// The full table, including PTZ, recording and web control.
pub fn table() -> NDIlib_v3 {
    NDIlib_v3 {
        recv_free_string: Some(recv_free_string),
        recv_ptz_is_supported: Some(recv_ptz_is_supported),
        recv_recording_is_supported: Some(recv_recording_is_supported),
        recv_get_web_control: Some(recv_get_web_control),
        recv_ptz_zoom: Some(recv_ptz_zoom),
        recv_ptz_zoom_speed: Some(recv_ptz_zoom_speed),
        recv_ptz_pan_tilt: Some(recv_ptz_pan_tilt),
        recv_ptz_pan_tilt_speed: Some(recv_ptz_pan_tilt_speed),
        recv_ptz_store_preset: Some(recv_ptz_store_preset),
        recv_ptz_recall_preset: Some(recv_ptz_recall_preset),
        recv_ptz_auto_focus: Some(recv_ptz_auto_focus),
        recv_ptz_focus: Some(recv_ptz_focus),
        recv_ptz_focus_speed: Some(recv_ptz_focus_speed),
        recv_ptz_white_balance_auto: Some(recv_ptz_white_balance_auto),
        recv_ptz_white_balance_indoor: Some(recv_ptz_white_balance_indoor),
        recv_ptz_white_balance_outdoor: Some(recv_ptz_white_balance_outdoor),
        recv_ptz_white_balance_oneshot: Some(recv_ptz_white_balance_oneshot),
        recv_ptz_white_balance_manual: Some(recv_ptz_white_balance_manual),
        recv_ptz_exposure_auto: Some(recv_ptz_exposure_auto),
        recv_ptz_exposure_manual: Some(recv_ptz_exposure_manual),
        recv_recording_start: Some(recv_recording_start),
        recv_recording_stop: Some(recv_recording_stop),
        recv_recording_set_audio_level: Some(recv_recording_set_audio_level),
        recv_recording_is_recording: Some(recv_recording_is_recording),
        recv_recording_get_filename: Some(recv_recording_get_filename),
        recv_recording_get_error: Some(recv_recording_get_error),
        recv_recording_get_times: Some(recv_recording_get_times),
        ..base_table()
    }
}
