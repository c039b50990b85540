use crate::stores::user_store::UserStore;
use crate::utils::time::current_timestamp;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct Metrics {
    pub registrations: AtomicU64,
    pub logins: AtomicU64,
    pub failed_logins: AtomicU64,
    pub logouts: AtomicU64,
    pub auth_failures: AtomicU64,
    pub start_time: i64,
}

#[derive(Debug, Clone, Serialize, serde::Deserialize)]
pub struct MetricsSnapshot {
    pub registrations: u64,
    pub logins: u64,
    pub failed_logins: u64,
    pub logouts: u64,
    /// Rejected `X-API-TOKEN` checks (missing, invalid or expired)
    pub auth_failures: u64,
    pub users: usize,
    pub active_sessions: usize,
    pub uptime_seconds: i64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            registrations: AtomicU64::new(0),
            logins: AtomicU64::new(0),
            failed_logins: AtomicU64::new(0),
            logouts: AtomicU64::new(0),
            auth_failures: AtomicU64::new(0),
            start_time: current_timestamp(),
        }
    }

    pub fn increment_registrations(&self) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_logins(&self) {
        self.logins.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed_logins(&self) {
        self.failed_logins.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_logouts(&self) {
        self.logouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_auth_failures(&self) {
        self.auth_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// `active_sessions` counts issued tokens that have not been cleared yet;
    /// expired-but-unused tokens are included until someone presents them.
    pub fn get_snapshot(&self, user_store: &UserStore) -> MetricsSnapshot {
        MetricsSnapshot {
            registrations: self.registrations.load(Ordering::Relaxed),
            logins: self.logins.load(Ordering::Relaxed),
            failed_logins: self.failed_logins.load(Ordering::Relaxed),
            logouts: self.logouts.load(Ordering::Relaxed),
            auth_failures: self.auth_failures.load(Ordering::Relaxed),
            users: user_store.len(),
            active_sessions: user_store.active_sessions(),
            uptime_seconds: current_timestamp() - self.start_time,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
