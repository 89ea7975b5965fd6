use crate::core::directory::UserId;
use log::debug;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Deadline that ran out without being cancelled or rearmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    pub admin_id: UserId,
    pub generation: u64,
}

struct Armed {
    generation: u64,
    handle: JoinHandle<()>,
}

/// One-shot publish-mode deadlines, at most one per admin.
///
/// Arming spawns a sleeping task; when it wakes it sends an [`Expiry`] down
/// the channel handed out by [`InactivityTimer::new`]. The receiver must
/// confirm the expiry with [`InactivityTimer::claim`] before acting on it, so
/// an expiry that was already in flight when the admin acted is dropped.
pub struct InactivityTimer {
    armed: Mutex<HashMap<UserId, Armed>>,
    next_generation: AtomicU64,
    duration: Duration,
    tx: mpsc::UnboundedSender<Expiry>,
}

impl InactivityTimer {
    pub fn new(duration: Duration) -> (Self, mpsc::UnboundedReceiver<Expiry>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let timer = Self {
            armed: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(1),
            duration,
            tx,
        };
        (timer, rx)
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Arms the configured timeout for `admin_id`.
    pub fn rearm(&self, admin_id: UserId) {
        self.arm(admin_id, self.duration);
    }

    /// Cancels any pending deadline for `admin_id` and schedules a new one.
    pub fn arm(&self, admin_id: UserId, duration: Duration) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let tx = self.tx.clone();
        let mut armed = self.lock();

        if let Some(previous) = armed.remove(&admin_id) {
            previous.handle.abort();
        }

        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = tx.send(Expiry {
                admin_id,
                generation,
            });
        });
        armed.insert(admin_id, Armed { generation, handle });
        debug!("Publish timer armed for {} ({:?})", admin_id, duration);
    }

    /// Returns `true` if a deadline was pending.
    pub fn cancel(&self, admin_id: UserId) -> bool {
        match self.lock().remove(&admin_id) {
            Some(armed) => {
                armed.handle.abort();
                debug!("Publish timer cancelled for {}", admin_id);
                true
            }
            None => false,
        }
    }

    /// Consumes the deadline if `expiry` is still the current one.
    pub fn claim(&self, expiry: Expiry) -> bool {
        let mut armed = self.lock();
        match armed.get(&expiry.admin_id) {
            Some(current) if current.generation == expiry.generation => {
                armed.remove(&expiry.admin_id);
                true
            }
            _ => false,
        }
    }

    pub fn is_armed(&self, admin_id: UserId) -> bool {
        self.lock().contains_key(&admin_id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<UserId, Armed>> {
        // The map stays consistent even if a holder panicked.
        self.armed.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for InactivityTimer {
    fn drop(&mut self) {
        for (_, armed) in self.lock().drain() {
            armed.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(15 * 60);

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_deadline() {
        let (timer, mut rx) = InactivityTimer::new(TIMEOUT);
        timer.rearm(1);

        tokio::time::sleep(TIMEOUT - Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(2)).await;
        let expiry = rx.recv().await.unwrap();
        assert_eq!(expiry.admin_id, 1);
        assert!(timer.claim(expiry));
        assert!(!timer.is_armed(1));
        assert!(!timer.claim(expiry));
    }

    #[tokio::test(start_paused = true)]
    async fn rearm_replaces_previous_deadline() {
        let (timer, mut rx) = InactivityTimer::new(TIMEOUT);
        timer.rearm(1);
        tokio::time::sleep(Duration::from_secs(600)).await;
        timer.rearm(1);

        // The first deadline would have fired here.
        tokio::time::sleep(Duration::from_secs(600)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(301)).await;
        let expiry = rx.recv().await.unwrap();
        assert!(timer.claim(expiry));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_idempotent() {
        let (timer, mut rx) = InactivityTimer::new(TIMEOUT);
        timer.rearm(1);
        assert!(timer.cancel(1));
        assert!(!timer.cancel(1));
        assert!(!timer.cancel(2));

        tokio::time::sleep(TIMEOUT * 2).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn stale_expiry_is_not_claimed() {
        let (timer, _rx) = InactivityTimer::new(TIMEOUT);
        timer.rearm(1);
        let stale = Expiry {
            admin_id: 1,
            generation: 0,
        };
        assert!(!timer.claim(stale));
        assert!(timer.is_armed(1));
    }

    #[tokio::test(start_paused = true)]
    async fn timers_are_independent_per_admin() {
        let (timer, mut rx) = InactivityTimer::new(TIMEOUT);
        timer.arm(1, Duration::from_secs(10));
        timer.arm(2, Duration::from_secs(20));
        timer.cancel(1);

        let expiry = rx.recv().await.unwrap();
        assert_eq!(expiry.admin_id, 2);
        assert!(timer.claim(expiry));
    }
}
