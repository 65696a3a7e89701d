//! In-memory store of builder sessions. Nothing here outlives the process.
//!
//! A closed tab never sends a discard, so sessions idle for longer than the store's
//! TTL are evicted: on every `create`, and by a periodic sweep started from `main`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::builder::wizard::Wizard;
use crate::errors::AppError;

pub struct Session {
    pub wizard: Wizard,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            wizard: Wizard::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Idle for at least `ttl` at `now`. A session mid-export is never idle.
    fn is_idle(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        if self.wizard.is_exporting() {
            return false;
        }
        (now - self.updated_at).to_std().is_ok_and(|idle| idle >= ttl)
    }
}

/// Sessions untouched for this long are evicted.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(3600);

/// Shared handle to all live sessions. Cloning shares the same map.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
    capacity: usize,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            capacity,
            idle_ttl: DEFAULT_IDLE_TTL,
        }
    }

    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Starts a fresh session with an empty document on the first step.
    pub async fn create(&self) -> Result<Uuid, AppError> {
        let mut sessions = self.inner.write().await;
        evict_idle(&mut sessions, self.idle_ttl);
        if sessions.len() >= self.capacity {
            return Err(AppError::ServiceUnavailable(format!(
                "session limit of {} reached",
                self.capacity
            )));
        }
        let id = Uuid::new_v4();
        sessions.insert(id, Session::new());
        info!("Created builder session {id} ({} live)", sessions.len());
        Ok(id)
    }

    /// Runs `f` against an immutable view of the session.
    pub async fn read<T>(&self, id: Uuid, f: impl FnOnce(&Session) -> T) -> Result<T, AppError> {
        let sessions = self.inner.read().await;
        let session = sessions.get(&id).ok_or_else(|| not_found(id))?;
        Ok(f(session))
    }

    /// Runs `f` against the whole session under the write lock and bumps `updated_at`.
    pub async fn update_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Result<T, AppError> {
        let mut sessions = self.inner.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        session.updated_at = Utc::now();
        Ok(f(session))
    }

    /// Runs `f` against the session's wizard and bumps `updated_at`.
    pub async fn update<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Wizard) -> T,
    ) -> Result<T, AppError> {
        self.update_session(id, |session| f(&mut session.wizard)).await
    }

    pub async fn discard(&self, id: Uuid) -> Result<(), AppError> {
        let removed = self.inner.write().await.remove(&id);
        match removed {
            Some(_) => {
                info!("Discarded builder session {id}");
                Ok(())
            }
            None => Err(not_found(id)),
        }
    }

    /// Drops every session idle for longer than the TTL. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        evict_idle(&mut *self.inner.write().await, self.idle_ttl)
    }

    /// Sweeps idle sessions every `every` until the runtime shuts down.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle().await;
                debug!("Idle sweep evicted {evicted} session(s)");
            }
        })
    }
}

fn evict_idle(sessions: &mut HashMap<Uuid, Session>, ttl: Duration) -> usize {
    let now = Utc::now();
    let before = sessions.len();
    sessions.retain(|id, session| {
        let idle = session.is_idle(now, ttl);
        if idle {
            info!("Evicting builder session {id}, idle since {}", session.updated_at);
        }
        !idle
    });
    before - sessions.len()
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Builder session {id} not found"))
}
