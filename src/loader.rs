//! Asynchronous image decoding for image-based fish.
//!
//! Decoding runs on one worker thread; results come back over a channel and
//! are pumped into the scene between frames. The scene decides whether a
//! result is still wanted (the descriptor may have been removed while the
//! decode was in flight).

use anyhow::{Context, Result};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use crate::descriptor::{FishId, ImageSource};

/// Decoded RGBA8 pixels ready for texture upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// A pending decode request emitted by the reconciler.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub id: FishId,
    pub source: ImageSource,
}

/// Decode synchronously. Used by the worker thread, the headless path, and
/// tests.
pub fn decode(source: &ImageSource) -> Result<LoadedImage> {
    let dynamic = match source {
        ImageSource::Path(path) => {
            image::open(path).with_context(|| format!("failed to open {}", path.display()))?
        }
        ImageSource::Bytes(bytes) => {
            image::load_from_memory(bytes).context("failed to decode image bytes")?
        }
    };
    let rgba = dynamic.to_rgba8();
    Ok(LoadedImage {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

/// Background decoder: feed it `LoadRequest`s, poll completions each frame.
pub struct ImageLoader {
    jobs: Sender<LoadRequest>,
    results: Receiver<(FishId, Result<LoadedImage>)>,
    worker: Option<JoinHandle<()>>,
}

impl ImageLoader {
    pub fn new() -> Self {
        let (jobs, job_rx) = mpsc::channel::<LoadRequest>();
        let (result_tx, results) = mpsc::channel();
        let worker = std::thread::spawn(move || {
            while let Ok(request) = job_rx.recv() {
                let outcome = decode(&request.source);
                if result_tx.send((request.id, outcome)).is_err() {
                    break;
                }
            }
        });
        Self {
            jobs,
            results,
            worker: Some(worker),
        }
    }

    pub fn request(&self, request: LoadRequest) {
        log::debug!("queueing image decode for {}", request.id);
        // A dead worker only happens during shutdown; requests are then moot.
        let _ = self.jobs.send(request);
    }

    /// Drain every completed decode without blocking.
    pub fn poll(&self) -> Vec<(FishId, Result<LoadedImage>)> {
        self.results.try_iter().collect()
    }
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ImageLoader {
    fn drop(&mut self) {
        // Swap in a closed sender so the worker's recv() returns Err and it
        // exits its loop.
        let (dead_tx, _) = mpsc::channel();
        self.jobs = dead_tx;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
