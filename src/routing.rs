//! NDI routing: a virtual source that forwards another source.

use std::{ffi::CString, fmt};

use crate::{
    finder::{optional_cstring, ptr_or_null, Source},
    ffi::*,
    Error, Result, NDI,
};

/// A named source on the network whose content is switched between other
/// sources without receiving or re-encoding the video.
///
/// ```no_run
/// use ndi_dyn::{NDI, Router, Source};
///
/// # fn main() -> Result<(), ndi_dyn::Error> {
/// let ndi = NDI::load_default()?;
/// let router = Router::new(&ndi, "Program", None)?;
/// router.change(&Source::new("STUDIO (Camera 2)"))?;
/// # Ok(())
/// # }
/// ```
pub struct Router {
    ndi: NDI,
    instance: NDIlib_routing_instance_t,
    _name: Option<CString>,
    _groups: Option<CString>,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("instance", &self.instance)
            .finish()
    }
}

impl Router {
    /// Creates a routing source named `name` in `groups` (default groups if `None`).
    pub fn new(ndi: &NDI, name: &str, groups: Option<&str>) -> Result<Self> {
        let name_c = optional_cstring(Some(name))?;
        let groups = optional_cstring(groups)?;
        let create = NDIlib_routing_create_t {
            p_ndi_name: ptr_or_null(&name_c),
            p_groups: ptr_or_null(&groups),
        };

        let instance = unsafe { (ndi.api().routing_create)(&create) };
        if instance.is_null() {
            tracing::warn!(name, "NDIlib_routing_create returned null");
            return Err(Error::CreationFailed("router (NDIlib_routing_create)".into()));
        }
        tracing::debug!(?instance, name, "router created");

        Ok(Self {
            ndi: ndi.clone(),
            instance,
            _name: name_c,
            _groups: groups,
        })
    }

    /// Routes `source` to this router's output.
    pub fn change(&self, source: &Source) -> Result<bool> {
        let raw = source.to_raw()?;
        Ok(unsafe { (self.ndi.api().routing_change)(self.instance, &raw.raw) })
    }

    /// Stops forwarding; receivers see no video until the next `change`.
    pub fn clear(&self) -> bool {
        unsafe { (self.ndi.api().routing_clear)(self.instance) }
    }
}

impl Drop for Router {
    fn drop(&mut self) {
        tracing::debug!(instance = ?self.instance, "destroying router");
        unsafe { (self.ndi.api().routing_destroy)(self.instance) };
    }
}

/// # Safety
///
/// Same contract as the other handles: movable between threads, not shared.
unsafe impl Send for Router {}
