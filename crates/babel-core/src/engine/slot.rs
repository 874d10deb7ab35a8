use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Single-capacity guard around "a child process is active".
///
/// The slot is either free or held by exactly one [`SlotGuard`]. Acquisition
/// never blocks: a held slot simply refuses the request. While held, the slot
/// also keeps the holder's abort token so that [`JobSlot::abort`] can reach the
/// running job without knowing anything else about it.
#[derive(Debug, Default)]
pub struct JobSlot {
    holder: Mutex<Option<CancellationToken>>,
    acquisitions: AtomicU64,
    releases: AtomicU64,
}

impl JobSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the slot, or returns `None` immediately if it is already locked.
    ///
    /// A fresh abort token is created for every acquisition, so an abort aimed
    /// at a previous job can never leak into the next one.
    pub fn try_acquire(self: &Arc<Self>) -> Option<SlotGuard> {
        let mut holder = self.lock();
        if holder.is_some() {
            return None;
        }
        let abort = CancellationToken::new();
        *holder = Some(abort.clone());
        let count = self.acquisitions.fetch_add(1, Ordering::AcqRel) + 1;
        debug!("Job slot locked (acquisition #{}).", count);
        Some(SlotGuard {
            slot: Arc::clone(self),
            abort,
            released: false,
        })
    }

    pub fn is_locked(&self) -> bool {
        self.lock().is_some()
    }

    /// Sets the abort flag of the current holder. Returns `false` when free.
    pub fn abort(&self) -> bool {
        match self.lock().as_ref() {
            Some(abort) => {
                abort.cancel();
                true
            }
            None => false,
        }
    }

    pub fn acquisitions(&self) -> u64 {
        self.acquisitions.load(Ordering::Acquire)
    }

    pub fn releases(&self) -> u64 {
        self.releases.load(Ordering::Acquire)
    }

    fn release(&self) {
        let mut holder = self.lock();
        *holder = None;
        let count = self.releases.fetch_add(1, Ordering::AcqRel) + 1;
        debug!("Job slot released (release #{}).", count);
    }

    fn lock(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.holder.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Proof of holding the [`JobSlot`]. Releasing happens exactly once, either
/// through [`SlotGuard::release`] or when the guard is dropped.
#[derive(Debug)]
pub struct SlotGuard {
    slot: Arc<JobSlot>,
    abort: CancellationToken,
    released: bool,
}

impl SlotGuard {
    pub fn abort_token(&self) -> &CancellationToken {
        &self.abort
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.is_cancelled()
    }

    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.slot.release();
        }
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.release_once();
    }
}
