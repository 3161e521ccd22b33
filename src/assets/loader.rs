use std::{
    collections::{HashMap, VecDeque},
    path::{Path, PathBuf},
    sync::Arc,
    thread::JoinHandle,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::{
    assets::{cache::TextureCache, texture::Texture},
    foundation::error::{PostchainError, PostchainResult},
    render::target::FilterMode,
};

/// Handle of one requested load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoadId(pub u64);

type OnSuccess = Box<dyn FnOnce(Arc<Texture>)>;
type OnError = Box<dyn FnOnce(&PostchainError)>;

struct LoadRequest {
    id: LoadId,
    path: PathBuf,
    filter: FilterMode,
}

struct LoadOutcome {
    id: LoadId,
    path: PathBuf,
    filter: FilterMode,
    result: PostchainResult<Texture>,
}

struct PendingLoad {
    on_success: OnSuccess,
    on_error: OnError,
}

/// Decodes image files on a background thread.
///
/// Requests go to a dedicated worker over a channel. Decoded results come back over a second
/// channel and are only dispatched by [`TextureLoader::poll`] (or [`TextureLoader::wait_all`]),
/// so callbacks always run on the thread that owns the loader, between frames. Failed loads are
/// reported once to `on_error` and never retried.
pub struct TextureLoader {
    request_tx: Option<Sender<LoadRequest>>,
    result_rx: Receiver<LoadOutcome>,
    worker: Option<JoinHandle<()>>,
    pending: HashMap<LoadId, PendingLoad>,
    cached: VecDeque<(LoadId, Arc<Texture>)>,
    next_id: u64,
}

impl TextureLoader {
    /// Start the worker thread.
    pub fn new() -> PostchainResult<Self> {
        let (request_tx, request_rx) = crossbeam_channel::unbounded::<LoadRequest>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<LoadOutcome>();

        let worker = std::thread::Builder::new()
            .name("postchain-texture-loader".to_string())
            .spawn(move || {
                while let Ok(req) = request_rx.recv() {
                    let result = Texture::from_path(&req.path, req.filter);
                    let outcome = LoadOutcome {
                        id: req.id,
                        path: req.path,
                        filter: req.filter,
                        result,
                    };
                    if result_tx.send(outcome).is_err() {
                        break;
                    }
                }
            })
            .map_err(|e| PostchainError::asset(format!("spawn texture loader thread: {e}")))?;

        Ok(Self {
            request_tx: Some(request_tx),
            result_rx,
            worker: Some(worker),
            pending: HashMap::new(),
            cached: VecDeque::new(),
            next_id: 1,
        })
    }

    /// Request `path` decoded with `filter`.
    ///
    /// A cache hit skips the worker but is still delivered through the next `poll`.
    pub fn load(
        &mut self,
        cache: &TextureCache,
        path: impl AsRef<Path>,
        filter: FilterMode,
        on_success: impl FnOnce(Arc<Texture>) + 'static,
        on_error: impl FnOnce(&PostchainError) + 'static,
    ) -> PostchainResult<LoadId> {
        let path = path.as_ref().to_path_buf();
        let id = LoadId(self.next_id);
        self.next_id += 1;

        let pending = PendingLoad {
            on_success: Box::new(on_success),
            on_error: Box::new(on_error),
        };

        if let Some(tex) = cache.get(&path, filter) {
            tracing::debug!(path = %path.display(), "texture cache hit");
            self.pending.insert(id, pending);
            self.cached.push_back((id, tex));
            return Ok(id);
        }

        let tx = self
            .request_tx
            .as_ref()
            .ok_or_else(|| PostchainError::asset("texture loader is shut down"))?;
        tx.send(LoadRequest {
            id,
            path: path.clone(),
            filter,
        })
        .map_err(|_| PostchainError::asset("texture loader worker exited"))?;
        tracing::debug!(id = id.0, path = %path.display(), "texture load queued");
        self.pending.insert(id, pending);
        Ok(id)
    }

    /// Loads requested but not yet dispatched.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Dispatch every completed load without blocking. Returns the number of callbacks run.
    pub fn poll(&mut self, cache: &mut TextureCache) -> usize {
        let mut dispatched = 0;
        while let Some((id, tex)) = self.cached.pop_front() {
            if let Some(p) = self.pending.remove(&id) {
                (p.on_success)(tex);
                dispatched += 1;
            }
        }
        while let Ok(outcome) = self.result_rx.try_recv() {
            dispatched += self.dispatch(cache, outcome);
        }
        dispatched
    }

    /// Block until every pending load has been dispatched or `timeout` elapses.
    pub fn wait_all(&mut self, cache: &mut TextureCache, timeout: Duration) -> PostchainResult<usize> {
        let deadline = Instant::now() + timeout;
        let mut dispatched = self.poll(cache);
        while !self.pending.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.result_rx.recv_timeout(remaining) {
                Ok(outcome) => dispatched += self.dispatch(cache, outcome),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(PostchainError::asset(format!(
                        "timed out waiting for {} texture load(s)",
                        self.pending.len()
                    )));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(PostchainError::asset("texture loader worker exited"));
                }
            }
        }
        Ok(dispatched)
    }

    fn dispatch(&mut self, cache: &mut TextureCache, outcome: LoadOutcome) -> usize {
        let Some(p) = self.pending.remove(&outcome.id) else {
            return 0;
        };
        match outcome.result {
            Ok(texture) => {
                tracing::debug!(
                    path = %outcome.path.display(),
                    width = texture.width,
                    height = texture.height,
                    "texture loaded"
                );
                let tex = cache.insert(outcome.path, outcome.filter, texture);
                (p.on_success)(tex);
            }
            Err(err) => {
                let err = PostchainError::asset(format!(
                    "load '{}': {err}",
                    outcome.path.display()
                ));
                tracing::warn!(error = %err, "texture load failed");
                (p.on_error)(&err);
            }
        }
        1
    }
}

impl Drop for TextureLoader {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.request_tx = None;
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::error!("texture loader thread panicked");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
