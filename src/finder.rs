//! NDI source discovery.

use std::{
    ffi::{CStr, CString},
    fmt::{self, Display, Formatter},
    os::raw::c_char,
    ptr, slice,
    time::Duration,
};

use crate::{ffi::*, runtime::to_ms, Error, Result, NDI};

/// Configuration for NDI source discovery.
///
/// # Examples
///
/// ```
/// use ndi_dyn::FinderOptions;
///
/// // Find all sources including local ones
/// let options = FinderOptions::builder()
///     .show_local_sources(true)
///     .build();
///
/// // Find sources in specific groups
/// let options = FinderOptions::builder()
///     .groups("Public,Studio")
///     .build();
///
/// // Find sources on other subnets
/// let options = FinderOptions::builder()
///     .extra_ips("192.168.1.20,10.0.0.7")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct FinderOptions {
    /// Whether to include sources on this machine.
    pub show_local_sources: bool,
    /// Comma-separated groups to search; `None` or empty means the default groups.
    pub groups: Option<String>,
    /// Comma-separated addresses to query directly, outside multicast discovery.
    pub extra_ips: Option<String>,
}

impl Default for FinderOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl FinderOptions {
    pub fn builder() -> FinderOptionsBuilder {
        FinderOptionsBuilder::new()
    }
}

/// Builder for [`FinderOptions`]. Local sources are shown unless disabled.
#[derive(Debug, Clone, Default)]
pub struct FinderOptionsBuilder {
    show_local_sources: Option<bool>,
    groups: Option<String>,
    extra_ips: Option<String>,
}

impl FinderOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure whether to show local sources
    #[must_use]
    pub fn show_local_sources(mut self, show: bool) -> Self {
        self.show_local_sources = Some(show);
        self
    }

    /// Set the groups to search
    #[must_use]
    pub fn groups<S: Into<String>>(mut self, groups: S) -> Self {
        self.groups = Some(groups.into());
        self
    }

    /// Set extra IP addresses to search
    #[must_use]
    pub fn extra_ips<S: Into<String>>(mut self, ips: S) -> Self {
        self.extra_ips = Some(ips.into());
        self
    }

    pub fn build(self) -> FinderOptions {
        FinderOptions {
            show_local_sources: self.show_local_sources.unwrap_or(true),
            groups: self.groups,
            extra_ips: self.extra_ips,
        }
    }
}

/// Converts an optional setting to a C string; `None` and `""` both become null.
pub(crate) fn optional_cstring(value: Option<&str>) -> Result<Option<CString>> {
    value
        .filter(|s| !s.is_empty())
        .map(CString::new)
        .transpose()
        .map_err(Error::InvalidCString)
}

pub(crate) fn ptr_or_null(value: &Option<CString>) -> *const c_char {
    value.as_ref().map_or(ptr::null(), |s| s.as_ptr())
}

/// Discovers NDI sources on the network.
///
/// # Examples
///
/// ```no_run
/// use ndi_dyn::{NDI, Finder, FinderOptions};
/// use std::time::Duration;
///
/// # fn main() -> Result<(), ndi_dyn::Error> {
/// let ndi = NDI::load_default()?;
/// let finder = Finder::new(&ndi, &FinderOptions::default())?;
///
/// while !finder.wait_for_sources(Duration::from_secs(1)) {}
/// for source in finder.current_sources()? {
///     println!("{source}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct Finder {
    ndi: NDI,
    instance: NDIlib_find_instance_t,
    _groups: Option<CString>,
    _extra_ips: Option<CString>,
}

impl fmt::Debug for Finder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Finder")
            .field("instance", &self.instance)
            .finish()
    }
}

impl Finder {
    /// Creates a new source finder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CreationFailed`] if the runtime returns a null handle,
    /// and [`Error::InvalidCString`] if an option contains a NUL byte.
    pub fn new(ndi: &NDI, settings: &FinderOptions) -> Result<Self> {
        let groups = optional_cstring(settings.groups.as_deref())?;
        let extra_ips = optional_cstring(settings.extra_ips.as_deref())?;

        let create_settings = NDIlib_find_create_t {
            show_local_sources: settings.show_local_sources,
            p_groups: ptr_or_null(&groups),
            p_extra_ips: ptr_or_null(&extra_ips),
        };

        let instance = unsafe { (ndi.api().find_create_v2)(&create_settings) };
        if instance.is_null() {
            tracing::warn!("NDIlib_find_create_v2 returned null");
            return Err(Error::CreationFailed("finder (NDIlib_find_create_v2)".into()));
        }
        tracing::debug!(?instance, "finder created");

        Ok(Self {
            ndi: ndi.clone(),
            instance,
            _groups: groups,
            _extra_ips: extra_ips,
        })
    }

    /// Blocks until the source list changes or `timeout` expires.
    ///
    /// Returns `true` if the list changed.
    pub fn wait_for_sources(&self, timeout: Duration) -> bool {
        unsafe { (self.ndi.api().find_wait_for_sources)(self.instance, to_ms(timeout)) }
    }

    /// Snapshot of the currently known sources, without waiting.
    ///
    /// The runtime's list is only valid until the next discovery call, so it
    /// is copied out immediately.
    pub fn current_sources(&self) -> Result<Vec<Source>> {
        let mut num_sources = 0u32;
        let sources =
            unsafe { (self.ndi.api().find_get_current_sources)(self.instance, &mut num_sources) };
        Ok(unsafe { copy_sources(sources, num_sources) })
    }

    /// Waits up to `timeout` for at least one source, then returns the list.
    ///
    /// This is the v1.5 call; prefer [`wait_for_sources`](Self::wait_for_sources)
    /// followed by [`current_sources`](Self::current_sources).
    pub fn sources(&self, timeout: Duration) -> Result<Vec<Source>> {
        let mut num_sources = 0u32;
        let sources = unsafe {
            (self.ndi.api().find_get_sources)(self.instance, &mut num_sources, to_ms(timeout))
        };
        Ok(unsafe { copy_sources(sources, num_sources) })
    }
}

unsafe fn copy_sources(sources: *const NDIlib_source_t, count: u32) -> Vec<Source> {
    if sources.is_null() || count == 0 {
        return Vec::new();
    }
    slice::from_raw_parts(sources, count as usize)
        .iter()
        .map(|raw| Source::from_raw(raw))
        .collect()
}

impl Drop for Finder {
    fn drop(&mut self) {
        tracing::debug!(instance = ?self.instance, "destroying finder");
        unsafe { (self.ndi.api().find_destroy)(self.instance) };
    }
}

/// # Safety
///
/// The handle is an opaque pointer owned by this value; moving it to another
/// thread is fine. Calls on one handle are not synchronized, so `Finder` is
/// not `Sync`.
unsafe impl Send for Finder {}

/// Network address of an NDI source.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub enum SourceAddress {
    /// No address available.
    #[default]
    None,
    /// URL address.
    Url(String),
    /// `ip:port` address.
    Ip(String),
}

impl SourceAddress {
    fn parse(address: String) -> Self {
        if address.is_empty() {
            SourceAddress::None
        } else if address.contains("://") {
            SourceAddress::Url(address)
        } else {
            SourceAddress::Ip(address)
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            SourceAddress::Ip(s) | SourceAddress::Url(s) => Some(s),
            SourceAddress::None => None,
        }
    }

    /// Check if this address contains the given host or IP (substring match).
    ///
    /// ```
    /// use ndi_dyn::SourceAddress;
    ///
    /// let addr = SourceAddress::Ip("192.168.1.100:5961".to_string());
    /// assert!(addr.contains_host("192.168.1.100"));
    /// ```
    pub fn contains_host(&self, host: &str) -> bool {
        self.as_str().is_some_and(|addr| addr.contains(host))
    }

    /// Port number, if the address carries one.
    ///
    /// ```
    /// use ndi_dyn::SourceAddress;
    ///
    /// assert_eq!(SourceAddress::Ip("10.0.0.5:5961".into()).port(), Some(5961));
    /// assert_eq!(SourceAddress::Ip("10.0.0.5".into()).port(), None);
    /// assert_eq!(SourceAddress::Url("http://cam.local:8080/x".into()).port(), Some(8080));
    /// ```
    pub fn port(&self) -> Option<u16> {
        let authority = match self {
            SourceAddress::Ip(ip) => ip.as_str(),
            SourceAddress::Url(url) => {
                let rest = url.split_once("://").map_or(url.as_str(), |(_, rest)| rest);
                rest.split('/').next().unwrap_or(rest)
            }
            SourceAddress::None => return None,
        };
        let (_, port) = authority.rsplit_once(':')?;
        port.parse().ok()
    }
}

impl Display for SourceAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or(""))
    }
}

/// An NDI source, as discovered or as named by the caller.
///
/// Names take the form `MACHINE (Source)`.
///
/// ```
/// use ndi_dyn::{Source, SourceAddress};
///
/// let source = Source {
///     name: "LAPTOP (Camera 1)".to_string(),
///     address: SourceAddress::Ip("192.168.1.100:5961".to_string()),
/// };
/// assert_eq!(source.to_string(), "LAPTOP (Camera 1)@192.168.1.100:5961");
/// assert_eq!(source.host(), Some("192.168.1.100"));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Source {
    pub name: String,
    pub address: SourceAddress,
}

/// A raw source descriptor together with the strings it points into.
pub(crate) struct RawSource {
    _name: CString,
    _address: Option<CString>,
    pub raw: NDIlib_source_t,
}

impl Source {
    /// A source known by name only; the runtime resolves the address.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            address: SourceAddress::None,
        }
    }

    /// Check if the name or address contains `host`.
    pub fn matches_host(&self, host: &str) -> bool {
        self.name.contains(host) || self.address.contains_host(host)
    }

    /// Host part of the address, without scheme, port or path.
    pub fn host(&self) -> Option<&str> {
        let host = match &self.address {
            SourceAddress::Ip(ip) => ip.rsplit_once(':').map_or(ip.as_str(), |(host, _)| host),
            SourceAddress::Url(url) => {
                let rest = url.split_once("://").map_or(url.as_str(), |(_, rest)| rest);
                let authority = rest.split('/').next().unwrap_or(rest);
                authority
                    .rsplit_once(':')
                    .map_or(authority, |(host, _)| host)
            }
            SourceAddress::None => return None,
        };
        (!host.is_empty()).then_some(host)
    }

    /// Copies a runtime source descriptor. A null name reads as empty.
    ///
    /// # Safety
    ///
    /// Both pointers must be null or valid NUL-terminated strings.
    pub(crate) unsafe fn from_raw(raw: &NDIlib_source_t) -> Self {
        let name = if raw.p_ndi_name.is_null() {
            String::new()
        } else {
            CStr::from_ptr(raw.p_ndi_name).to_string_lossy().into_owned()
        };
        let address = if raw.p_ip_address.is_null() {
            SourceAddress::None
        } else {
            SourceAddress::parse(CStr::from_ptr(raw.p_ip_address).to_string_lossy().into_owned())
        };
        Source { name, address }
    }

    pub(crate) fn to_raw(&self) -> Result<RawSource> {
        let name = CString::new(self.name.as_str())?;
        let address = self.address.as_str().map(CString::new).transpose()?;

        let raw = NDIlib_source_t {
            p_ndi_name: name.as_ptr(),
            p_ip_address: ptr_or_null(&address),
        };
        Ok(RawSource {
            _name: name,
            _address: address,
            raw,
        })
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.address {
            SourceAddress::None => write!(f, "{}", self.name),
            address => write!(f, "{}@{}", self.name, address),
        }
    }
}
