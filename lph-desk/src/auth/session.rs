//! Session management
//!
//! A session ties a bearer id to the acting user, that user's transient copy
//! of the collections they may read, and the refresher that keeps the task
//! list current. Sessions expire after a period without requests.

use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info};

use lph_core::{AppUser, Collections, ContextSnapshot, EntityKind, Record, Role};

use crate::refresher::Refresher;

/// One logged-in (or guest) viewer
#[derive(Debug)]
pub struct Session {
    id: String,
    last_seen: Mutex<Instant>,
    user: RwLock<AppUser>,
    collections: RwLock<Collections>,
    refresher: Mutex<Option<Refresher>>,
}

impl Session {
    /// New session with a fresh opaque id. The password hash is dropped.
    pub fn new(mut user: AppUser, collections: Collections) -> Self {
        user.password_hash.clear();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            last_seen: Mutex::new(Instant::now()),
            user: RwLock::new(user),
            collections: RwLock::new(collections),
            refresher: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Record activity, pushing expiry back
    pub fn touch(&self) {
        if let Ok(mut last_seen) = self.last_seen.lock() {
            *last_seen = Instant::now();
        }
    }

    pub fn idle_for(&self) -> Duration {
        self.last_seen
            .lock()
            .map(|last_seen| last_seen.elapsed())
            .unwrap_or(Duration::MAX)
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.idle_for() >= ttl
    }

    pub async fn user(&self) -> AppUser {
        self.user.read().await.clone()
    }

    pub async fn role(&self) -> Role {
        self.user.read().await.role
    }

    pub async fn set_user(&self, mut user: AppUser) {
        user.password_hash.clear();
        *self.user.write().await = user;
    }

    pub async fn collections(&self) -> RwLockReadGuard<'_, Collections> {
        self.collections.read().await
    }

    pub async fn replace_collections(&self, collections: Collections) {
        *self.collections.write().await = collections;
    }

    pub async fn replace_kind(&self, kind: EntityKind, records: Vec<Record>) {
        self.collections.write().await.replace(kind, records);
    }

    /// Viewer-scoped snapshot, rebuilt on every call
    pub async fn snapshot(&self) -> ContextSnapshot {
        let role = self.role().await;
        let collections = self.collections.read().await;
        ContextSnapshot::build(role, &collections)
    }

    /// Install the session's refresher, cancelling any previous one
    pub fn attach_refresher(&self, refresher: Refresher) {
        if let Ok(mut slot) = self.refresher.lock() {
            if let Some(previous) = slot.replace(refresher) {
                previous.cancel();
            }
        }
    }

    pub fn cancel_refresher(&self) {
        if let Ok(mut slot) = self.refresher.lock() {
            if let Some(refresher) = slot.take() {
                debug!(session_id = %self.id, refresher = refresher.name(), "Cancelling refresher");
                refresher.cancel();
            }
        }
    }

    /// Whether a refresher is attached and still running
    pub fn is_polling(&self) -> bool {
        self.refresher
            .lock()
            .map(|slot| slot.as_ref().is_some_and(|r| !r.is_cancelled() && !r.is_finished()))
            .unwrap_or(false)
    }
}

/// Live sessions by id
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, Arc<Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: Arc<Session>) {
        self.sessions.insert(session.id().to_string(), session);
    }

    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn remove(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.remove(id).map(|(_, session)| session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop every session idle for at least `ttl`, stopping its refresher
    pub fn cleanup(&self, ttl: Duration) -> usize {
        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter(|entry| entry.value().is_expired(ttl))
            .map(|entry| entry.key().clone())
            .collect();

        let count = expired.len();
        for id in expired {
            if let Some(session) = self.remove(&id) {
                session.cancel_refresher();
            }
        }
        if count > 0 {
            info!("Cleaned up {} expired sessions", count);
        }
        count
    }
}
