// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inactivity auto-lock.
//!
//! An [`ActivityClock`] records the last interaction signal. The
//! [`AutoLockMonitor`] follows the session's state channel and runs a periodic
//! check only while the session is unlocked. When idle time reaches the
//! session's threshold it calls [`VaultSession::expire`] with the epoch it
//! observed, so a check scheduled before a re-unlock can never lock the new
//! session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use passvault_core::SessionState;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::session::VaultSession;

/// Kinds of user interaction that count as activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Pointer,
    Key,
    Scroll,
    Touch,
}

#[derive(Debug)]
struct ClockInner {
    base: Instant,
    last_ms: AtomicU64,
}

/// Shared "last activity" timestamp.
#[derive(Debug, Clone)]
pub struct ActivityClock {
    inner: Arc<ClockInner>,
}

impl Default for ActivityClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ClockInner {
                base: Instant::now(),
                last_ms: AtomicU64::new(0),
            }),
        }
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.inner.base.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Mark now as the last activity.
    pub fn touch(&self) {
        self.inner
            .last_ms
            .fetch_max(self.elapsed_ms(), Ordering::AcqRel);
    }

    pub fn record(&self, interaction: Interaction) {
        debug!(?interaction, "activity");
        self.touch();
    }

    /// Time since the last recorded activity.
    pub fn idle(&self) -> Duration {
        let last = self.inner.last_ms.load(Ordering::Acquire);
        Duration::from_millis(self.elapsed_ms().saturating_sub(last))
    }
}

/// Background task that locks an idle session.
///
/// Dropping the monitor cancels it; [`shutdown`](Self::shutdown) also waits
/// for the task to finish.
pub struct AutoLockMonitor {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl AutoLockMonitor {
    /// Spawn the monitor on the current tokio runtime.
    pub fn spawn(session: Arc<VaultSession>, clock: ActivityClock, tick: Duration) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(supervise(session, clock, tick, cancel.clone()));
        Self {
            cancel,
            handle: Some(handle),
        }
    }

    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            warn!(error = %e, "auto-lock monitor task failed");
        }
    }
}

impl Drop for AutoLockMonitor {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn supervise(
    session: Arc<VaultSession>,
    clock: ActivityClock,
    tick: Duration,
    cancel: CancellationToken,
) {
    let mut changes = session.subscribe();
    loop {
        let current = *changes.borrow_and_update();
        if current.state == SessionState::Unlocked {
            clock.touch();
            debug!(epoch = current.epoch, "auto-lock armed");
            let mut interval = tokio::time::interval_at(Instant::now() + tick, tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    changed = changes.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        break;
                    }
                    _ = interval.tick() => {
                        let idle = clock.idle();
                        if idle >= session.auto_lock_threshold()
                            && session.expire(current.epoch).await
                        {
                            warn!(idle_secs = idle.as_secs(), "session locked after inactivity");
                        }
                    }
                }
            }
            debug!(epoch = current.epoch, "auto-lock disarmed");
        } else {
            tokio::select! {
                _ = cancel.cancelled() => return,
                changed = changes.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passvault_config::model::VaultConfig;
    use passvault_core::KdfParams;
    use passvault_storage::MemoryStore;
    use secrecy::SecretString;

    use crate::engine::FieldCipherEngine;

    const TICK: Duration = Duration::from_secs(1);

    async fn unlocked_session(minutes: u32) -> Arc<VaultSession> {
        let config = VaultConfig {
            auto_lock_minutes: minutes,
            ..VaultConfig::default()
        };
        let engine = FieldCipherEngine::new(KdfParams {
            memory_cost: 32768,
            iterations: 2,
            parallelism: 1,
        });
        let session = VaultSession::open(Arc::new(MemoryStore::new()), Arc::new(engine), &config)
            .await
            .unwrap();
        session
            .setup(SecretString::from("longpassword1".to_string()), None)
            .await
            .unwrap();
        Arc::new(session)
    }

    #[tokio::test(start_paused = true)]
    async fn clock_tracks_idle_time() {
        let clock = ActivityClock::new();
        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(clock.idle() >= Duration::from_secs(30));
        clock.record(Interaction::Pointer);
        assert_eq!(clock.idle(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_session_locks_within_one_tick() {
        let session = unlocked_session(1).await;
        let monitor = AutoLockMonitor::spawn(session.clone(), ActivityClock::new(), TICK);
        let mut changes = session.subscribe();

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(session.state(), SessionState::Unlocked);

        tokio::time::timeout(
            TICK * 2,
            changes.wait_for(|c| c.state == SessionState::Locked),
        )
        .await
        .expect("session should lock once the threshold passes")
        .unwrap();
        monitor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn activity_postpones_lock() {
        let session = unlocked_session(1).await;
        let clock = ActivityClock::new();
        let monitor = AutoLockMonitor::spawn(session.clone(), clock.clone(), TICK);

        for _ in 0..5 {
            tokio::time::sleep(Duration::from_secs(45)).await;
            clock.record(Interaction::Key);
        }
        assert_eq!(session.state(), SessionState::Unlocked);
        monitor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn locked_session_is_left_alone_and_rearms_on_unlock() {
        let session = unlocked_session(1).await;
        let clock = ActivityClock::new();
        let monitor = AutoLockMonitor::spawn(session.clone(), clock.clone(), TICK);

        session.logout().await.unwrap();
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(session.state(), SessionState::Locked);

        session
            .unlock(SecretString::from("longpassword1".to_string()))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(session.state(), SessionState::Unlocked);

        let mut changes = session.subscribe();
        tokio::time::timeout(
            Duration::from_secs(40),
            changes.wait_for(|c| c.state == SessionState::Locked),
        )
        .await
        .expect("re-armed monitor should lock")
        .unwrap();
        monitor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_the_monitor() {
        let session = unlocked_session(1).await;
        let monitor = AutoLockMonitor::spawn(session.clone(), ActivityClock::new(), TICK);
        monitor.shutdown().await;

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(session.state(), SessionState::Unlocked);
    }
}
