//! Async wrappers for Tokio.
//!
//! Every runtime wait is a blocking native call. These wrappers run it on
//! Tokio's blocking pool with `spawn_blocking`, so awaiting them never stalls
//! the executor. Dropping the returned future abandons the wait: the native
//! call still runs to its timeout on the worker, and its result is discarded.
//!
//! Captured frames are copied before they cross back to the async task, so the
//! runtime's buffer is always released on the worker.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "tokio")]
//! # {
//! use ndi_dyn::{NDI, Receiver, ReceiverOptions, Source, tokio::AsyncReceiver};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ndi_dyn::Error> {
//!     let ndi = NDI::load_default()?;
//!     let options = ReceiverOptions::builder(Source::new("HOST (Camera)")).build();
//!     let receiver = AsyncReceiver::new(Receiver::new(&ndi, &options)?);
//!
//!     if let Some(frame) = receiver.capture_video(Duration::from_secs(5)).await? {
//!         println!("Captured {}x{} frame", frame.width, frame.height);
//!     }
//!     Ok(())
//! }
//! # }
//! ```

#[cfg(feature = "tokio")]
pub mod tokio {
    //! Tokio integration.

    use std::{sync::Arc, time::Duration};

    use parking_lot::Mutex;

    use crate::{
        frames::{AudioFrame, MetadataFrame, VideoFrame},
        Error, Finder, Receiver, Result, Source,
    };

    async fn run_blocking<T, R, F>(inner: &Arc<Mutex<T>>, call: F) -> Result<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: FnOnce(&T) -> Result<R> + Send + 'static,
    {
        let inner = Arc::clone(inner);
        ::tokio::task::spawn_blocking(move || call(&inner.lock()))
            .await
            .map_err(|err| Error::WorkerFailed(err.to_string()))?
    }

    /// A [`Receiver`] whose captures run on Tokio's blocking pool.
    ///
    /// Clones share one receiver; calls on it are serialized by a mutex.
    #[derive(Clone)]
    pub struct AsyncReceiver {
        inner: Arc<Mutex<Receiver>>,
    }

    impl AsyncReceiver {
        pub fn new(receiver: Receiver) -> Self {
            Self {
                inner: Arc::new(Mutex::new(receiver)),
            }
        }

        /// Async [`Receiver::capture_video`], returning an owned copy.
        pub async fn capture_video(&self, timeout: Duration) -> Result<Option<VideoFrame>> {
            run_blocking(&self.inner, move |rx| {
                rx.capture_video(timeout)?
                    .map(|frame| frame.to_owned())
                    .transpose()
            })
            .await
        }

        /// Async [`Receiver::capture_audio`], returning an owned copy.
        pub async fn capture_audio(&self, timeout: Duration) -> Result<Option<AudioFrame>> {
            run_blocking(&self.inner, move |rx| {
                rx.capture_audio(timeout)?
                    .map(|frame| frame.to_owned())
                    .transpose()
            })
            .await
        }

        /// Async [`Receiver::capture_metadata`], returning an owned copy.
        pub async fn capture_metadata(&self, timeout: Duration) -> Result<Option<MetadataFrame>> {
            run_blocking(&self.inner, move |rx| {
                Ok(rx.capture_metadata(timeout)?.map(|frame| frame.to_owned()))
            })
            .await
        }

        /// Async [`Receiver::connections`].
        pub async fn connections(&self, timeout: Duration) -> Result<usize> {
            run_blocking(&self.inner, move |rx| Ok(rx.connections(timeout))).await
        }

        /// Runs `f` against the receiver on the blocking pool.
        pub async fn with_receiver<R, F>(&self, f: F) -> Result<R>
        where
            R: Send + 'static,
            F: FnOnce(&Receiver) -> Result<R> + Send + 'static,
        {
            run_blocking(&self.inner, f).await
        }
    }

    /// A [`Finder`] whose waits run on Tokio's blocking pool.
    #[derive(Clone)]
    pub struct AsyncFinder {
        inner: Arc<Mutex<Finder>>,
    }

    impl AsyncFinder {
        pub fn new(finder: Finder) -> Self {
            Self {
                inner: Arc::new(Mutex::new(finder)),
            }
        }

        /// Async [`Finder::wait_for_sources`].
        pub async fn wait_for_sources(&self, timeout: Duration) -> Result<bool> {
            run_blocking(&self.inner, move |finder| Ok(finder.wait_for_sources(timeout))).await
        }

        /// Waits up to `timeout` for a change, then returns the current list.
        pub async fn sources(&self, timeout: Duration) -> Result<Vec<Source>> {
            run_blocking(&self.inner, move |finder| {
                finder.wait_for_sources(timeout);
                finder.current_sources()
            })
            .await
        }
    }
}
