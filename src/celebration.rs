use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Celebration {
    pub habit: String,
    pub total: u32,
    pub message: String,
}

/// The celebration currently on display. It clears itself after `duration`
/// through a background task that is aborted whenever the banner changes.
pub struct Banner {
    duration: Duration,
    slot: Arc<Mutex<Option<Celebration>>>,
    dismiss: Option<JoinHandle<()>>,
}

impl Banner {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            slot: Arc::new(Mutex::new(None)),
            dismiss: None,
        }
    }

    pub fn current(&self) -> Option<Celebration> {
        lock(&self.slot).clone()
    }

    /// Must be called from within a tokio runtime.
    pub fn show(&mut self, celebration: Celebration) {
        self.cancel();
        *lock(&self.slot) = Some(celebration);

        let slot = Arc::clone(&self.slot);
        let duration = self.duration;
        self.dismiss = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            *lock(&slot) = None;
        }));
    }

    pub fn clear(&mut self) {
        self.cancel();
        *lock(&self.slot) = None;
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.dismiss.take() {
            handle.abort();
        }
    }
}

impl Drop for Banner {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn lock(slot: &Mutex<Option<Celebration>>) -> MutexGuard<'_, Option<Celebration>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
