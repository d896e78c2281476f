//! The back-office service container
//!
//! [`Desk`] owns the record store, the live sessions and the assistant.
//! Every read and mutation enters through a session id; the session's role
//! is checked against [`lph_core::policy`] before the store is touched.

use chrono::Utc;
use serde::Serialize;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use lph_assistant::AssistantService;
use lph_core::entity::record_id;
use lph_core::ledger::{self, BalanceDrift};
use lph_core::policy::{self, Action, Gated};
use lph_core::{
    AppUser, Attribution, AuthError, Collections, ContextSnapshot, DashboardStats, DeskError,
    Entity, EntityKind, FinanceEntry, NewTask, Record, Result, Role, Task, TaskBoard, TaskStatus,
};
use lph_store::{RecordStore, WriteGuard};

use crate::auth::{hash_password, verify_password, Session, SessionStore};
use crate::refresher::Refresher;

/// Default task refresh period
pub const TASK_REFRESH: Duration = Duration::from_secs(60);

/// Default idle time after which a session expires
pub const SESSION_TTL: Duration = Duration::from_secs(3600);

/// Credentials for the admin created on an empty user directory
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct DeskConfig {
    pub task_refresh: Duration,
    pub session_ttl: Duration,
    pub bootstrap_admin: Option<AdminSeed>,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            task_refresh: TASK_REFRESH,
            session_ttl: SESSION_TTL,
            bootstrap_admin: None,
        }
    }
}

/// Dashboard figures with the assistant's summary of them
#[derive(Debug, Clone, Serialize)]
pub struct Insight {
    pub summary: String,
    pub stats: DashboardStats,
}

pub struct Desk {
    store: Arc<dyn RecordStore>,
    sessions: SessionStore,
    assistant: AssistantService,
    config: DeskConfig,
}

impl Desk {
    pub fn new(
        store: Arc<dyn RecordStore>,
        assistant: AssistantService,
        config: DeskConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            sessions: SessionStore::new(),
            assistant,
            config,
        })
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn assistant(&self) -> &AssistantService {
        &self.assistant
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Create the configured admin if the user directory is empty
    pub async fn bootstrap_admin(&self) -> Result<Option<AppUser>> {
        let Some(seed) = &self.config.bootstrap_admin else {
            return Ok(None);
        };

        let users = self.store.list(EntityKind::AppUser).await?;
        if !users.is_empty() {
            debug!(users = users.len(), "User directory not empty, skipping bootstrap admin");
            return Ok(None);
        }

        let admin = AppUser {
            id: String::new(),
            username: seed.username.clone(),
            full_name: Some("Administrator".to_string()),
            role: Role::Admin,
            password_hash: hash_password(&seed.password)?,
        };
        let stored = self.store.upsert_as(&admin).await?;
        info!(username = %stored.username, "Bootstrap admin created");
        Ok(Some(stored))
    }

    /// Check credentials and open a session.
    ///
    /// Unknown usernames and wrong passwords fail identically.
    pub async fn login(self: &Arc<Self>, username: &str, password: &str) -> Result<Arc<Session>> {
        let username = username.trim();
        let users = self.store.list_as::<AppUser>().await?;
        let Some(user) = users.into_iter().find(|u| u.username.trim() == username) else {
            debug!(username, "Login for unknown username");
            return Err(AuthError::InvalidCredentials.into());
        };

        match verify_password(password, &user.password_hash) {
            Ok(true) => {}
            Ok(false) => {
                debug!(username, "Login with wrong password");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => {
                warn!(username, error = %e, "Stored password hash is unusable");
                return Err(AuthError::InvalidCredentials.into());
            }
        }

        self.open_session(user).await
    }

    /// Open a PUBLIC session with no stored identity
    pub async fn guest_access(self: &Arc<Self>) -> Result<Arc<Session>> {
        self.open_session(AppUser::guest()).await
    }

    /// End a session and stop its refresher. Unknown ids are ignored.
    pub fn logout(&self, session_id: &str) {
        if let Some(session) = self.sessions.remove(session_id) {
            session.cancel_refresher();
            info!(session_id, "Session closed");
        }
    }

    /// Live session by id. Each lookup counts as activity; an idle session
    /// past its TTL is closed instead.
    pub fn session(&self, session_id: &str) -> Result<Arc<Session>> {
        let session = self
            .sessions
            .get(session_id)
            .ok_or(AuthError::SessionExpired)?;

        if session.is_expired(self.config.session_ttl) {
            self.expire(&session);
            return Err(AuthError::SessionExpired.into());
        }
        session.touch();
        Ok(session)
    }

    fn expire(&self, session: &Session) {
        if self.sessions.remove(session.id()).is_some() {
            session.cancel_refresher();
            info!(
                session_id = session.id(),
                idle_secs = session.idle_for().as_secs(),
                "Session expired"
            );
        }
    }

    async fn open_session(self: &Arc<Self>, user: AppUser) -> Result<Arc<Session>> {
        self.sessions.cleanup(self.config.session_ttl);

        let collections = self.load_collections(user.role).await?;
        let session = Arc::new(Session::new(user, collections));

        session.attach_refresher(self.spawn_refresher(&session));
        self.sessions.insert(Arc::clone(&session));

        let user = session.user().await;
        info!(
            session_id = session.id(),
            username = %user.username,
            role = %user.role,
            "Session opened"
        );
        Ok(session)
    }

    fn spawn_refresher(self: &Arc<Self>, session: &Arc<Session>) -> Refresher {
        let desk = Arc::downgrade(self);
        let weak_session = Arc::downgrade(session);

        Refresher::spawn(
            format!("session-{}", session.id()),
            self.config.task_refresh,
            move || {
                let desk = desk.clone();
                let session = weak_session.clone();
                async move {
                    match (desk.upgrade(), session.upgrade()) {
                        (Some(desk), Some(session)) => desk.poll_session(&session).await,
                        _ => ControlFlow::Break(()),
                    }
                }
            },
        )
    }

    /// One refresher tick: re-validate the role, then reload tasks
    pub async fn poll_session(&self, session: &Session) -> ControlFlow<()> {
        if !self.sessions.contains(session.id()) {
            return ControlFlow::Break(());
        }
        if session.is_expired(self.config.session_ttl) {
            self.expire(session);
            return ControlFlow::Break(());
        }

        let user = session.user().await;
        if !user.is_guest() {
            match self.store.get_as::<AppUser>(&user.id).await {
                Ok(Some(fresh)) if fresh.role != user.role => {
                    info!(
                        session_id = session.id(),
                        username = %fresh.username,
                        from = %user.role,
                        to = %fresh.role,
                        "Role changed, reloading session"
                    );
                    let role = fresh.role;
                    session.set_user(fresh).await;
                    match self.load_collections(role).await {
                        Ok(collections) => session.replace_collections(collections).await,
                        Err(e) => {
                            warn!(session_id = session.id(), error = %e, "Session reload failed");
                            // Never keep data the new role may not read
                            session.replace_collections(Collections::new()).await;
                        }
                    }
                    return ControlFlow::Continue(());
                }
                Ok(Some(fresh)) => {
                    if fresh.username != user.username || fresh.full_name != user.full_name {
                        session.set_user(fresh).await;
                    }
                }
                Ok(None) => {
                    info!(session_id = session.id(), username = %user.username, "User removed, ending session");
                    self.sessions.remove(session.id());
                    return ControlFlow::Break(());
                }
                Err(e) => {
                    warn!(session_id = session.id(), error = %e, "Role check failed");
                }
            }
        }

        if let Err(e) = self.reload(session, EntityKind::Task).await {
            warn!(session_id = session.id(), error = %e, "Task refresh failed");
        }
        ControlFlow::Continue(())
    }

    /// Every collection `role` may read
    async fn load_collections(&self, role: Role) -> Result<Collections> {
        let mut collections = Collections::new();
        for kind in EntityKind::ALL {
            if policy::collection_access(role, kind).is_granted() {
                collections.replace(kind, self.store.list(kind).await?);
            }
        }
        Ok(collections)
    }

    /// Refresh one collection of the session's copy, if readable
    async fn reload(&self, session: &Session, kind: EntityKind) -> Result<()> {
        let role = session.role().await;
        if !policy::collection_access(role, kind).is_granted() {
            return Ok(());
        }
        let records = self.store.list(kind).await?;
        session.replace_kind(kind, records).await;
        Ok(())
    }

    async fn reload_after_write(&self, session: &Session, kind: EntityKind) {
        if let Err(e) = self.reload(session, kind).await {
            warn!(session_id = session.id(), %kind, error = %e, "Reload after write failed");
        }
    }

    // =========================================================================
    // Collections
    // =========================================================================

    /// Redacted listing, or the sentinel when the role may not read `kind`
    pub async fn list(&self, session_id: &str, kind: EntityKind) -> Result<Gated<Vec<Record>>> {
        let session = self.session(session_id)?;
        let role = session.role().await;

        if policy::collection_access(role, kind).is_granted() {
            self.reload(&session, kind).await?;
        }

        let collections = session.collections().await;
        Ok(policy::gate_collection(role, kind, collections.records(kind)))
    }

    /// Create (no `id`) or update (with `id`) a record.
    ///
    /// Updates merge over the stored record. Attribution is stamped here;
    /// client-supplied attribution is ignored. Returns the stored record as
    /// the caller may see it.
    pub async fn upsert(
        &self,
        session_id: &str,
        kind: EntityKind,
        mut record: Record,
    ) -> Result<Record> {
        if kind == EntityKind::Task {
            return Err(DeskError::invalid("Tasks are changed through task operations"));
        }

        let session = self.session(session_id)?;
        let user = session.user().await;
        let role = user.role;

        let id = record_id(&record).map(str::to_string);
        let is_create = id.is_none();
        let action = if is_create { Action::Create } else { Action::Update };
        policy::authorize(role, kind, action)?;

        let password = match record.remove("password") {
            Some(serde_json::Value::String(p)) if !p.is_empty() => Some(p),
            _ => None,
        };
        record.remove("passwordHash");
        if kind == EntityKind::FinanceEntry && !is_create {
            // Stored balances are fixed at posting time
            record.remove("balance");
        }
        if kind.has_attribution() {
            Attribution::stamp(&mut record, user.actor_name(), is_create, Utc::now());
        }

        let mut merged = match &id {
            Some(id) => {
                let mut existing = self
                    .store
                    .get(kind, id)
                    .await?
                    .ok_or_else(|| DeskError::NotFound(format!("{kind} '{id}' not found")))?;
                for (field, value) in record {
                    existing.insert(field, value);
                }
                existing
            }
            None => record,
        };

        if kind == EntityKind::AppUser {
            self.prepare_user(&mut merged, id.as_deref(), password).await?;
        }

        let mut merged = kind.conform(merged)?;
        kind.check_required(&merged)?;

        if kind == EntityKind::FinanceEntry && is_create {
            let existing = self.store.list_as::<FinanceEntry>().await?;
            let entry = FinanceEntry::from_record(merged)?;
            merged = ledger::post(&existing, entry)?.to_record();
        }

        let stored = self.store.upsert(kind, merged).await?;
        info!(
            %kind,
            id = record_id(&stored).unwrap_or_default(),
            actor = user.actor_name(),
            action = %action,
            "Record saved"
        );

        self.reload_after_write(&session, kind).await;
        Ok(policy::redact(role, kind, &stored))
    }

    /// Hash a supplied password and enforce unique usernames
    async fn prepare_user(
        &self,
        user: &mut Record,
        id: Option<&str>,
        password: Option<String>,
    ) -> Result<()> {
        match password {
            Some(password) => {
                user.insert(
                    "passwordHash".to_string(),
                    serde_json::Value::String(hash_password(&password)?),
                );
            }
            None if id.is_none() => {
                return Err(DeskError::invalid("A password is required for new users"));
            }
            None => {}
        }

        let username = user
            .get("username")
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        user.insert(
            "username".to_string(),
            serde_json::Value::String(username.clone()),
        );
        let taken = self
            .store
            .list_as::<AppUser>()
            .await?
            .into_iter()
            .any(|other| other.username.trim() == username && Some(other.id.as_str()) != id);
        if taken {
            return Err(DeskError::invalid(format!("Username '{username}' is already taken")));
        }
        Ok(())
    }

    /// Delete a record (ADMIN only)
    pub async fn delete(&self, session_id: &str, kind: EntityKind, id: &str) -> Result<()> {
        let session = self.session(session_id)?;
        let user = session.user().await;
        policy::authorize(user.role, kind, Action::Delete)?;

        if self.store.get(kind, id).await?.is_none() {
            return Err(DeskError::NotFound(format!("{kind} '{id}' not found")));
        }
        self.store.delete(kind, id).await?;
        info!(%kind, id, actor = user.actor_name(), "Record deleted");

        self.reload_after_write(&session, kind).await;
        Ok(())
    }

    /// Finance entries whose stored balance disagrees with the running total
    pub async fn ledger_drift(&self, session_id: &str) -> Result<Gated<Vec<BalanceDrift>>> {
        let session = self.session(session_id)?;
        let role = session.role().await;
        let gated = match policy::collection_access(role, EntityKind::FinanceEntry) {
            policy::Access::Granted => {
                Gated::Granted(ledger::drift(&self.store.list_as::<FinanceEntry>().await?))
            }
            policy::Access::Denied(sentinel) => Gated::Denied(sentinel),
        };
        Ok(gated)
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    /// Board view from the session's task copy
    pub async fn task_board(&self, session_id: &str) -> Result<Gated<TaskBoard>> {
        let session = self.session(session_id)?;
        let role = session.role().await;
        let collections = session.collections().await;

        Ok(
            policy::gate_collection(role, EntityKind::Task, collections.records(EntityKind::Task))
                .map(|_| TaskBoard::from_tasks(&collections.typed::<Task>())),
        )
    }

    pub async fn create_task(&self, session_id: &str, input: NewTask) -> Result<Task> {
        let session = self.session(session_id)?;
        let user = session.user().await;
        policy::authorize(user.role, EntityKind::Task, Action::Create)?;

        let task = Task::create(input, user.actor_name(), Utc::now())?;
        let stored = self.store.upsert_as(&task).await?;
        info!(task_id = %stored.id, actor = user.actor_name(), "Task created");

        self.reload_after_write(&session, EntityKind::Task).await;
        Ok(stored)
    }

    /// Take a pending task. Re-claiming one's own task changes nothing.
    pub async fn claim_task(&self, session_id: &str, task_id: &str) -> Result<Task> {
        let session = self.session(session_id)?;
        let user = session.user().await;
        policy::authorize(user.role, EntityKind::Task, Action::Update)?;

        let mut task = self.load_task(task_id).await?;
        if !task.claim(user.actor_name(), Utc::now())? {
            return Ok(task);
        }

        let guard = WriteGuard::new().field("status", TaskStatus::Pending.as_str());
        let stored = self
            .write_task(&task, &["status", "inProgressBy", "inProgressAt"], &guard)
            .await?;
        info!(task_id, actor = user.actor_name(), "Task claimed");

        self.reload_after_write(&session, EntityKind::Task).await;
        Ok(stored)
    }

    /// Finish a task the caller holds
    pub async fn complete_task(&self, session_id: &str, task_id: &str) -> Result<Task> {
        let session = self.session(session_id)?;
        let user = session.user().await;
        policy::authorize(user.role, EntityKind::Task, Action::Update)?;

        let mut task = self.load_task(task_id).await?;
        task.complete(user.actor_name(), Utc::now())?;

        let guard = WriteGuard::new()
            .field("status", TaskStatus::InProgress.as_str())
            .field("inProgressBy", user.actor_name());
        let stored = self
            .write_task(&task, &["status", "completedBy", "completedAt"], &guard)
            .await?;
        info!(task_id, actor = user.actor_name(), "Task completed");

        self.reload_after_write(&session, EntityKind::Task).await;
        Ok(stored)
    }

    /// Flip the pin of a task that is not completed
    pub async fn toggle_pin(&self, session_id: &str, task_id: &str) -> Result<Task> {
        let session = self.session(session_id)?;
        let user = session.user().await;
        policy::authorize(user.role, EntityKind::Task, Action::Update)?;

        let mut task = self.load_task(task_id).await?;
        let prior = task.status;
        let pinned = task.toggle_pin()?;

        let guard = WriteGuard::new().field("status", prior.as_str());
        let stored = self.write_task(&task, &["isPinned"], &guard).await?;
        debug!(task_id, pinned, actor = user.actor_name(), "Task pin toggled");

        self.reload_after_write(&session, EntityKind::Task).await;
        Ok(stored)
    }

    pub async fn delete_task(&self, session_id: &str, task_id: &str) -> Result<()> {
        self.delete(session_id, EntityKind::Task, task_id).await
    }

    async fn load_task(&self, task_id: &str) -> Result<Task> {
        self.store
            .get_as::<Task>(task_id)
            .await?
            .ok_or_else(|| DeskError::NotFound(format!("task '{task_id}' not found")))
    }

    /// Persist only `fields` of `task`, conditional on `guard`
    async fn write_task(&self, task: &Task, fields: &[&str], guard: &WriteGuard) -> Result<Task> {
        let full = task.to_record();
        let patch: Record = full
            .into_iter()
            .filter(|(field, _)| field == "id" || fields.contains(&field.as_str()))
            .collect();

        let stored = self.store.upsert_if(EntityKind::Task, patch, guard).await?;
        Task::from_record(stored)
    }

    // =========================================================================
    // Context and assistant
    // =========================================================================

    pub async fn context(&self, session_id: &str) -> Result<ContextSnapshot> {
        Ok(self.session(session_id)?.snapshot().await)
    }

    /// Dashboard figures for the viewer plus the assistant's summary
    pub async fn insight(&self, session_id: &str) -> Result<Insight> {
        let session = self.session(session_id)?;
        let role = session.role().await;
        let stats = {
            let collections = session.collections().await;
            DashboardStats::compute(role, &collections)
        };

        let summary = self.assistant.summarize(&stats).await;
        Ok(Insight { summary, stats })
    }

    /// Answer a question over the viewer's snapshot only
    pub async fn chat(&self, session_id: &str, message: &str) -> Result<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(DeskError::invalid("Message must not be empty"));
        }

        let snapshot = self.context(session_id).await?;
        Ok(self.assistant.chat(message, &snapshot).await)
    }
}
