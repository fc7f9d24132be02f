//! Domain store over copy-on-write collection snapshots.

use crate::api::client::ActionClient;
use crate::api::transport::ActionTransport;
use crate::auth::token_cache::TokenSource;
use crate::model::event::{Event, EventStatus, NewEvent};
use crate::model::paper::{NewPaper, PaperStatus, ResearchPaper};
use crate::model::project::{NewProject, Project, ProjectProgress, ProjectStatus, ProjectUpdate};
use crate::model::user::{NewUser, User};
use crate::model::UnitId;
use crate::store::operation::{CommitPolicy, StoreOperation};
use crate::store::seed::StoreSeed;
use arc_swap::{ArcSwap, ArcSwapOption};
use chrono::{SecondsFormat, Utc};
use log::{debug, error, info, warn};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const PAPER_FILE_PLACEHOLDER: &str = "#";
const DEFAULT_FALLBACK_SUBMITTER: &str = "system";

/// Collection touched by a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Papers,
    Events,
    Projects,
    Users,
}

impl CollectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Papers => "papers",
            Self::Events => "events",
            Self::Projects => "projects",
            Self::Users => "users",
        }
    }
}

/// Consistent view over all four collections.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub papers: Arc<Vec<ResearchPaper>>,
    pub events: Arc<Vec<Event>>,
    pub projects: Arc<Vec<Project>>,
    pub users: Arc<Vec<User>>,
}

/// Store tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Placeholder bearer token used when the token source is empty.
    pub fallback_token: Option<String>,
    /// Submitter recorded by `create_approved_event` without a session user.
    pub fallback_submitter_id: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            fallback_token: None,
            fallback_submitter_id: DEFAULT_FALLBACK_SUBMITTER.to_string(),
        }
    }
}

type ChangeListener = Arc<dyn Fn(CollectionKind) + Send + Sync>;

/// Session-scoped owner of the portal collections.
///
/// Local-only operations never fail observably: without a session user they
/// silently do nothing. Remote-confirmed operations return `true` only when
/// the change was committed.
pub struct DomainStore<T: ActionTransport, K: TokenSource> {
    client: ActionClient<T>,
    tokens: K,
    options: StoreOptions,
    papers: ArcSwap<Vec<ResearchPaper>>,
    events: ArcSwap<Vec<Event>>,
    projects: ArcSwap<Vec<Project>>,
    users: ArcSwap<Vec<User>>,
    session_user: ArcSwapOption<User>,
    revision: AtomicU64,
    listeners: Mutex<Vec<ChangeListener>>,
}

impl<T: ActionTransport, K: TokenSource> DomainStore<T, K> {
    pub fn new(seed: StoreSeed, client: ActionClient<T>, tokens: K, options: StoreOptions) -> Self {
        info!(
            "event=store_init module=store status=ok papers={} events={} projects={} users={}",
            seed.papers.len(),
            seed.events.len(),
            seed.projects.len(),
            seed.users.len()
        );
        Self {
            client,
            tokens,
            options,
            papers: ArcSwap::from_pointee(seed.papers),
            events: ArcSwap::from_pointee(seed.events),
            projects: ArcSwap::from_pointee(seed.projects),
            users: ArcSwap::from_pointee(seed.users),
            session_user: ArcSwapOption::empty(),
            revision: AtomicU64::new(0),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn client(&self) -> &ActionClient<T> {
        &self.client
    }

    pub fn tokens(&self) -> &K {
        &self.tokens
    }

    pub fn papers(&self) -> Arc<Vec<ResearchPaper>> {
        self.papers.load_full()
    }

    pub fn events(&self) -> Arc<Vec<Event>> {
        self.events.load_full()
    }

    pub fn projects(&self) -> Arc<Vec<Project>> {
        self.projects.load_full()
    }

    pub fn users(&self) -> Arc<Vec<User>> {
        self.users.load_full()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            papers: self.papers(),
            events: self.events(),
            projects: self.projects(),
            users: self.users(),
        }
    }

    /// Number of committed snapshot swaps so far.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Registers a listener called after every committed snapshot swap.
    pub fn subscribe(&self, listener: impl Fn(CollectionKind) + Send + Sync + 'static) {
        match self.listeners.lock() {
            Ok(mut listeners) => listeners.push(Arc::new(listener)),
            Err(poisoned) => poisoned.into_inner().push(Arc::new(listener)),
        }
    }

    /// Sets (or clears) the identity acting through this store.
    pub fn set_session_user(&self, user: Option<User>) {
        info!(
            "event=session_user module=store status=ok present={}",
            user.is_some()
        );
        self.session_user.store(user.map(Arc::new));
    }

    pub fn session_user(&self) -> Option<Arc<User>> {
        self.session_user.load_full()
    }

    /// Case-insensitive lookup in the current users snapshot.
    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        let needle = email.trim().to_lowercase();
        self.users()
            .iter()
            .find(|user| user.email.to_lowercase() == needle)
            .cloned()
    }

    /// Prepends a new `PENDING` paper submitted by the session user.
    pub fn submit_paper(&self, draft: NewPaper) {
        let op = StoreOperation::SubmitPaper;
        let Some(user) = self.require_session_user(op) else {
            return;
        };
        let paper = ResearchPaper {
            id: format!("paper-{}", Uuid::new_v4()),
            title: draft.title,
            authors: draft.authors,
            publication_year: draft.publication_year,
            department: draft.department,
            abstract_text: draft.abstract_text,
            file_url: PAPER_FILE_PLACEHOLDER.to_string(),
            doi: draft.doi,
            status: PaperStatus::Pending,
            submitted_by: user.id.clone(),
            co_authors: draft.co_authors,
            submission_date: Some(now_timestamp()),
        };
        self.commit(op, CollectionKind::Papers, &self.papers, |papers| {
            papers.insert(0, paper.clone());
            true
        });
    }

    /// Overwrites a paper's status; unknown ids leave papers unchanged.
    pub fn update_paper_status(&self, paper_id: &str, status: PaperStatus) {
        self.commit(
            StoreOperation::UpdatePaperStatus,
            CollectionKind::Papers,
            &self.papers,
            |papers| match papers.iter_mut().find(|paper| paper.id == paper_id) {
                Some(paper) => {
                    paper.status = status;
                    true
                }
                None => false,
            },
        );
    }

    /// Prepends an already `APPROVED` event for privileged actors.
    pub fn create_approved_event(&self, draft: NewEvent, coe_id: impl Into<UnitId>) {
        let submitted_by = self
            .session_user()
            .map(|user| user.id.clone())
            .unwrap_or_else(|| self.options.fallback_submitter_id.clone());
        let event = new_event(draft, EventStatus::Approved, submitted_by, coe_id.into());
        self.commit(
            StoreOperation::CreateApprovedEvent,
            CollectionKind::Events,
            &self.events,
            |events| {
                events.insert(0, event.clone());
                true
            },
        );
    }

    /// Prepends a `PENDING` event proposed by the session user.
    pub fn propose_event(&self, draft: NewEvent, coe_id: impl Into<UnitId>) {
        let op = StoreOperation::ProposeEvent;
        let Some(user) = self.require_session_user(op) else {
            return;
        };
        let event = new_event(draft, EventStatus::Pending, user.id.clone(), coe_id.into());
        self.commit(op, CollectionKind::Events, &self.events, |events| {
            events.insert(0, event.clone());
            true
        });
    }

    /// Overwrites an event's status; unknown ids leave events unchanged.
    pub fn update_event_status(&self, event_id: &str, status: EventStatus) {
        self.commit(
            StoreOperation::UpdateEventStatus,
            CollectionKind::Events,
            &self.events,
            |events| match events.iter_mut().find(|event| event.id == event_id) {
                Some(event) => {
                    event.status = status;
                    event.updated_at = Some(now_timestamp());
                    true
                }
                None => false,
            },
        );
    }

    /// Adds the session user to the event's registered set if absent.
    pub fn register_for_event(&self, event_id: &str) {
        let op = StoreOperation::RegisterForEvent;
        let Some(user) = self.require_session_user(op) else {
            return;
        };
        self.commit(op, CollectionKind::Events, &self.events, |events| {
            events
                .iter_mut()
                .find(|event| event.id == event_id)
                .is_some_and(|event| event.register(&user.id))
        });
    }

    /// Submits a project remotely and materializes it under the id the
    /// remote side assigned.
    ///
    /// Returns `false` without touching projects when there is no session
    /// user, no token, the call fails, or the reply lacks a usable id.
    pub fn add_project(&self, draft: NewProject) -> bool {
        let op = StoreOperation::AddProject;
        let CommitPolicy::RemoteConfirmed(action) = op.commit_policy() else {
            return false;
        };
        let Some(user) = self.require_session_user(op) else {
            return false;
        };
        let Some(token) = self.resolve_token(op) else {
            return false;
        };

        let Ok(reply) = self.client.call(action, &draft, &token) else {
            return false;
        };
        let Some(project_id) = reply.str_field("projectId") else {
            error!(
                "event=store_commit module=store status=error op={} error_code=missing_project_id",
                op.as_str()
            );
            return false;
        };
        let project = Project {
            image_url: format!("https://picsum.photos/seed/{project_id}/600/400"),
            id: project_id,
            title: draft.title,
            description: draft.description,
            team: vec![user.name.clone()],
            status: ProjectStatus::Ongoing,
            labs: draft.labs,
            patents: draft.patents,
            funding: draft.funding,
            coe_id: draft.coe_id,
            level: draft.level,
            progress: ProjectProgress::Proposed,
            department: draft.department,
            proposer_id: user.id.clone(),
            assigned_student_ids: Vec::new(),
            reviewed_by_uid: None,
            reviewed_at: None,
            rejection_reason: None,
        };
        // Uniqueness is checked against the snapshot being swapped.
        let inserted = self.commit(op, CollectionKind::Projects, &self.projects, |projects| {
            if projects.iter().any(|existing| existing.id == project.id) {
                return false;
            }
            projects.insert(0, project.clone());
            true
        });
        if !inserted {
            error!(
                "event=store_commit module=store status=error op={} error_code=duplicate_project_id project_id={}",
                op.as_str(),
                project.id
            );
        }
        inserted
    }

    /// Merges `update` into the project with `project_id`.
    ///
    /// Review decisions (`Assigned`/`Rejected`) are confirmed remotely first;
    /// a failed confirmation returns `false` and skips the merge.
    pub fn update_project(&self, project_id: &str, update: ProjectUpdate) -> bool {
        let op = update.operation();
        if let CommitPolicy::RemoteConfirmed(action) = op.commit_policy() {
            let Some(token) = self.resolve_token(op) else {
                return false;
            };
            let status = update
                .progress
                .map(ProjectProgress::as_str)
                .unwrap_or_default();
            let payload = json!({ "projectId": project_id, "status": status });
            if self.client.call(action, &payload, &token).is_err() {
                return false;
            }
        }

        let merged = self.commit(op, CollectionKind::Projects, &self.projects, |projects| {
            match projects.iter_mut().find(|project| project.id == project_id) {
                Some(project) => {
                    update.apply_to(project);
                    true
                }
                None => false,
            }
        });
        if !merged {
            warn!(
                "event=store_commit module=store status=skipped op={} reason=unknown_project_id project_id={}",
                op.as_str(),
                project_id
            );
        }
        true
    }

    /// Prepends a new user record owned by `coe_id`.
    pub fn add_user(&self, draft: NewUser, coe_id: impl Into<UnitId>) {
        let id = format!("user-{}", Uuid::new_v4());
        let user = User {
            avatar_url: Some(format!("https://picsum.photos/seed/{id}/100/100")),
            id,
            name: draft.name,
            email: draft.email,
            role: draft.role,
            department: draft.department,
            coe_id: Some(coe_id.into()),
            description: draft.description,
            last_role_change_at: None,
            created_by_uid: draft.created_by_uid,
            is_active: draft.is_active,
            force_password_reset: draft.force_password_reset,
        };
        self.commit(
            StoreOperation::AddUser,
            CollectionKind::Users,
            &self.users,
            |users| {
                users.insert(0, user.clone());
                true
            },
        );
    }

    fn require_session_user(&self, op: StoreOperation) -> Option<Arc<User>> {
        let user = self.session_user();
        if user.is_none() {
            debug!(
                "event=store_commit module=store status=skipped op={} reason=no_session_user",
                op.as_str()
            );
        }
        user
    }

    fn resolve_token(&self, op: StoreOperation) -> Option<String> {
        let token = self
            .tokens
            .bearer_token()
            .or_else(|| self.options.fallback_token.clone());
        if token.is_none() {
            error!(
                "event=store_commit module=store status=error op={} error_code=token_missing",
                op.as_str()
            );
        }
        token
    }

    /// Replaces one collection snapshot with an edited copy.
    ///
    /// `edit` returns whether it changed anything; unchanged edits keep the
    /// current snapshot. Concurrent writers retry against the newest
    /// snapshot, so the last successful swap wins.
    fn commit<V: Clone>(
        &self,
        op: StoreOperation,
        kind: CollectionKind,
        slot: &ArcSwap<Vec<V>>,
        mut edit: impl FnMut(&mut Vec<V>) -> bool,
    ) -> bool {
        loop {
            let current = slot.load_full();
            let mut next = Vec::clone(&current);
            if !edit(&mut next) {
                debug!(
                    "event=store_commit module=store status=unchanged op={} collection={}",
                    op.as_str(),
                    kind.as_str()
                );
                return false;
            }
            let previous = slot.compare_and_swap(&current, Arc::new(next));
            if Arc::ptr_eq(&*previous, &current) {
                break;
            }
        }

        let revision = self.revision.fetch_add(1, Ordering::AcqRel) + 1;
        info!(
            "event=store_commit module=store status=ok op={} collection={} revision={}",
            op.as_str(),
            kind.as_str(),
            revision
        );
        self.notify(kind);
        true
    }

    fn notify(&self, kind: CollectionKind) {
        let listeners = match self.listeners.lock() {
            Ok(listeners) => listeners.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        for listener in listeners {
            listener(kind);
        }
    }
}

fn new_event(draft: NewEvent, status: EventStatus, submitted_by: String, coe_id: UnitId) -> Event {
    Event {
        id: format!("evt-{}", Uuid::new_v4()),
        title: draft.title,
        date: draft.date,
        time: draft.time,
        location: draft.location,
        description: draft.description,
        kind: draft.kind,
        registered_users: Vec::new(),
        status,
        submitted_by,
        coe_id: Some(coe_id),
        is_cancelled: false,
        created_at: Some(now_timestamp()),
        updated_at: None,
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
