use std::{
    fmt::Debug,
    future::Future,
    sync::Arc,
    time::{Duration, SystemTime},
};

use aws_credential_types::Credentials;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::constants::DEFAULT_EXPIRY_BUFFER;

// Allows us to abstract time for tests.
pub trait TimeSource: Debug + Send + Sync {
    fn now(&self) -> SystemTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Unassumed,
    Valid,
    Expired,
}

/// Holds one set of credentials and reloads them lazily.
///
/// Reads go through the `RwLock`. A reload takes the `refresh` gate and checks
/// the cache again before loading, so concurrent callers that miss together
/// share a single load. Credentials count as expired once they are within
/// `expiry_buffer` of their expiration.
#[derive(Debug)]
pub struct CredentialsCache {
    time: Arc<dyn TimeSource>,
    cached: RwLock<Option<Credentials>>,
    refresh: Mutex<()>,
    expiry_buffer: Duration,
}

impl Default for CredentialsCache {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), DEFAULT_EXPIRY_BUFFER)
    }
}

impl CredentialsCache {
    pub fn new(time: Arc<dyn TimeSource>, expiry_buffer: Duration) -> Self {
        Self {
            time,
            cached: RwLock::new(None),
            refresh: Mutex::new(()),
            expiry_buffer,
        }
    }

    pub async fn state(&self) -> CacheState {
        let now = self.time.now();
        match self.cached.read().await.as_ref() {
            None => CacheState::Unassumed,
            Some(creds) if self.is_fresh(creds, now) => CacheState::Valid,
            Some(_) => CacheState::Expired,
        }
    }

    /// Return the cached credentials, or run `load` and cache its result.
    /// A failed load leaves the previous entry in place.
    pub async fn get_or_load<F, Fut, E>(&self, load: F) -> Result<Credentials, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Credentials, E>>,
    {
        if let Some(creds) = self.fresh().await {
            trace!("Using cached credentials");
            return Ok(creds);
        }

        let _refresh = self.refresh.lock().await;

        // Another caller may have finished a load while we waited on the gate.
        if let Some(creds) = self.fresh().await {
            trace!("Credentials refreshed by a concurrent caller");
            return Ok(creds);
        }

        let state = self.state().await;
        debug!(state = ?state, "Loading credentials");
        let creds = load().await?;
        *self.cached.write().await = Some(creds.clone());
        Ok(creds)
    }

    async fn fresh(&self) -> Option<Credentials> {
        let now = self.time.now();
        self.cached
            .read()
            .await
            .as_ref()
            .filter(|creds| self.is_fresh(creds, now))
            .cloned()
    }

    fn is_fresh(&self, creds: &Credentials, now: SystemTime) -> bool {
        match creds.expiry() {
            Some(expiry) => now + self.expiry_buffer < expiry,
            None => true,
        }
    }
}
