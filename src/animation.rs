/*
 * Animated-image playback worker. This is the only code in the crate that
 * runs off the event-loop thread. It shares two things with the loop: the
 * `animating` flag and a condition variable that lets `stop` cut a frame delay
 * short. Everything else (widget state, pools, registry) stays on the loop
 * thread; the worker reaches the widget only through a `RepaintSink`.
 */
use crate::backend::RepaintSink;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationSpec {
    pub frame_count: usize,
    pub frame_delay: Duration,
    /// Play until stopped when `None`.
    pub duration: Option<Duration>,
}

impl AnimationSpec {
    pub fn new(frame_count: usize, frame_delay: Duration) -> Self {
        Self {
            frame_count,
            frame_delay,
            duration: None,
        }
    }

    pub fn for_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

struct Shared {
    animating: AtomicBool,
    frame: AtomicUsize,
    lock: Mutex<()>,
    wake: Condvar,
}

pub(crate) struct Animator {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl fmt::Debug for Animator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animator")
            .field("animating", &self.is_animating())
            .field("frame", &self.current_frame())
            .finish()
    }
}

impl Animator {
    pub(crate) fn start(spec: AnimationSpec, sink: Arc<dyn RepaintSink>) -> Self {
        let shared = Arc::new(Shared {
            animating: AtomicBool::new(true),
            frame: AtomicUsize::new(0),
            lock: Mutex::new(()),
            wake: Condvar::new(),
        });
        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("ductkit-animator".to_string())
            .spawn(move || run_worker(worker_shared, spec, sink));
        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(err) => {
                log::warn!("Animator: Failed to spawn worker: {err}");
                shared.animating.store(false, Ordering::SeqCst);
                None
            }
        };
        Self { shared, worker }
    }

    pub(crate) fn is_animating(&self) -> bool {
        self.shared.animating.load(Ordering::SeqCst)
    }

    pub(crate) fn current_frame(&self) -> usize {
        self.shared.frame.load(Ordering::SeqCst)
    }

    /*
     * Clears the flag under the lock before signalling, so a worker that is
     * about to wait cannot miss the wake-up. Joins the worker; a worker in the
     * middle of a frame delay returns immediately.
     */
    pub(crate) fn stop(&mut self) {
        {
            let _guard = self
                .shared
                .lock
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            self.shared.animating.store(false, Ordering::SeqCst);
            self.shared.wake.notify_all();
        }
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            log::warn!("Animator: Worker panicked.");
        }
    }
}

impl Drop for Animator {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(shared: Arc<Shared>, spec: AnimationSpec, sink: Arc<dyn RepaintSink>) {
    let started = Instant::now();
    let frame_count = spec.frame_count.max(1);
    loop {
        if !shared.animating.load(Ordering::SeqCst) {
            break;
        }
        let next = (shared.frame.load(Ordering::SeqCst) + 1) % frame_count;
        shared.frame.store(next, Ordering::SeqCst);
        sink.request_repaint();

        let guard = shared.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let wait = shared
            .wake
            .wait_timeout_while(guard, spec.frame_delay, |_| {
                shared.animating.load(Ordering::SeqCst)
            });
        drop(wait);

        if !shared.animating.load(Ordering::SeqCst) {
            break;
        }
        if spec.duration.is_some_and(|limit| started.elapsed() >= limit) {
            shared.animating.store(false, Ordering::SeqCst);
            break;
        }
    }
    log::trace!("Animator: Worker finished.");
}
