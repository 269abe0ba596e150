//! Session-scoped state. Each browser session owns its own ledger, the PDFs
//! generated in it, and its note-only drafts. A session ends when the client
//! deletes it or after it has been idle for longer than the configured TTL;
//! everything it owns is dropped with it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::ledger::{LedgerError, SubmissionLedger};
use crate::models::submission::SubmissionRecord;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session limit of {0} reached; try again later")]
    Capacity(usize),
}

/// Bounds on how many sessions exist and how long an idle one survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub idle_ttl: Duration,
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(60 * 60),
            max_sessions: 1000,
        }
    }
}

#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub ledger: Mutex<SubmissionLedger>,
    pub documents: Mutex<HashMap<Uuid, Bytes>>,
    pub drafts: Mutex<HashMap<Uuid, Bytes>>,
    last_active: Mutex<Instant>,
}

impl Session {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            ledger: Mutex::new(SubmissionLedger::new()),
            documents: Mutex::new(HashMap::new()),
            drafts: Mutex::new(HashMap::new()),
            last_active: Mutex::new(Instant::now()),
        }
    }

    async fn touch(&self) {
        *self.last_active.lock().await = Instant::now();
    }

    async fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(*self.last_active.lock().await)
    }

    /// Records a submission and its PDF together.
    ///
    /// Both locks are held across the two inserts (ledger first, the same
    /// order readers use), so a reader never sees the record without its
    /// document. On a rejected append the document is not stored.
    pub async fn store_submission(
        &self,
        record: SubmissionRecord,
        pdf: Bytes,
    ) -> Result<(), LedgerError> {
        let mut ledger = self.ledger.lock().await;
        let mut documents = self.documents.lock().await;
        let id = record.id;
        ledger.append(record)?;
        documents.insert(id, pdf);
        Ok(())
    }

    /// PDF of a submission recorded in this session's ledger.
    pub async fn submission_document(&self, id: Uuid) -> Option<Bytes> {
        let ledger = self.ledger.lock().await;
        ledger.get(id)?;
        self.documents.lock().await.get(&id).cloned()
    }
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Arc<Session>>>,
    limits: SessionLimits,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: SessionLimits) -> Self {
        Self {
            sessions: RwLock::default(),
            limits,
        }
    }

    /// Opens a new session. Idle sessions are swept first; if the store is
    /// still full the request is refused.
    pub async fn create(&self) -> Result<Arc<Session>, SessionError> {
        self.evict_idle().await;

        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.limits.max_sessions {
            return Err(SessionError::Capacity(self.limits.max_sessions));
        }
        let session = Arc::new(Session::new());
        sessions.insert(session.id, Arc::clone(&session));
        Ok(session)
    }

    /// Live session by id. Counts as activity; an expired session is
    /// reported missing even before the sweeper removes it.
    pub async fn get(&self, id: Uuid) -> Option<Arc<Session>> {
        let session = self.sessions.read().await.get(&id).cloned()?;
        if session.idle_for(Instant::now()).await > self.limits.idle_ttl {
            return None;
        }
        session.touch().await;
        Some(session)
    }

    /// Ends a session, dropping its ledger and documents.
    pub async fn remove(&self, id: Uuid) -> Option<Arc<Session>> {
        self.sessions.write().await.remove(&id)
    }

    /// Drops every session idle for longer than the TTL. Returns how many
    /// were removed.
    pub async fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        let mut expired = Vec::new();
        for (id, session) in sessions.iter() {
            if session.idle_for(now).await > self.limits.idle_ttl {
                expired.push(*id);
            }
        }
        for id in &expired {
            sessions.remove(id);
        }

        if !expired.is_empty() {
            info!("Evicted {} idle session(s)", expired.len());
        }
        expired.len()
    }

    pub fn limits(&self) -> SessionLimits {
        self.limits
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::form::FormInput;

    fn record() -> SubmissionRecord {
        SubmissionRecord {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            form: FormInput::sample(),
            truncated_document: "=== PATIENT ===".to_string(),
            signed: false,
        }
    }

    fn limits(idle_secs: u64, max_sessions: usize) -> SessionLimits {
        SessionLimits {
            idle_ttl: Duration::from_secs(idle_secs),
            max_sessions,
        }
    }

    #[tokio::test]
    async fn test_created_session_can_be_fetched() {
        let store = SessionStore::new();
        let session = store.create().await.unwrap();
        let fetched = store.get(session.id).await.unwrap();
        assert!(Arc::ptr_eq(&session, &fetched));
        assert!(fetched.ledger.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_session_is_none() {
        let store = SessionStore::new();
        assert!(store.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let a = store.create().await.unwrap();
        let b = store.create().await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.len().await, 2);

        a.store_submission(record(), Bytes::from_static(b"%PDF-"))
            .await
            .unwrap();
        assert!(b.documents.lock().await.is_empty());
        assert!(b.ledger.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_removed_session_is_gone() {
        let store = SessionStore::new();
        let session = store.create().await.unwrap();

        assert!(store.remove(session.id).await.is_some());
        assert!(store.get(session.id).await.is_none());
        assert!(store.remove(session.id).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_session_expires_and_is_evicted() {
        let store = SessionStore::with_limits(limits(60, 10));
        let idle = store.create().await.unwrap();
        let busy = store.create().await.unwrap();

        tokio::time::advance(Duration::from_secs(40)).await;
        assert!(store.get(busy.id).await.is_some());
        tokio::time::advance(Duration::from_secs(40)).await;

        assert!(store.get(idle.id).await.is_none());
        assert!(store.get(busy.id).await.is_some());
        assert_eq!(store.evict_idle().await, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_refuses_sessions_beyond_the_cap() {
        let store = SessionStore::with_limits(limits(60, 2));
        store.create().await.unwrap();
        store.create().await.unwrap();

        assert_eq!(store.create().await.unwrap_err(), SessionError::Capacity(2));

        // Idle sessions are swept before the cap is checked.
        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(store.create().await.is_ok());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_submission_and_document_are_stored_together() {
        let store = SessionStore::new();
        let session = store.create().await.unwrap();
        let r = record();
        let id = r.id;

        session
            .store_submission(r, Bytes::from_static(b"%PDF-1"))
            .await
            .unwrap();

        assert_eq!(session.ledger.lock().await.len(), 1);
        assert_eq!(
            session.submission_document(id).await.unwrap(),
            Bytes::from_static(b"%PDF-1")
        );
    }

    #[tokio::test]
    async fn test_rejected_append_stores_no_document() {
        let store = SessionStore::new();
        let session = store.create().await.unwrap();
        let r = record();
        let dup = r.clone();

        session
            .store_submission(r, Bytes::from_static(b"%PDF-1"))
            .await
            .unwrap();
        let err = session
            .store_submission(dup.clone(), Bytes::from_static(b"%PDF-2"))
            .await
            .unwrap_err();

        assert_eq!(err, LedgerError::DuplicateId(dup.id));
        assert_eq!(
            session.submission_document(dup.id).await.unwrap(),
            Bytes::from_static(b"%PDF-1")
        );
    }

    #[tokio::test]
    async fn test_document_of_unrecorded_id_is_none() {
        let store = SessionStore::new();
        let session = store.create().await.unwrap();
        let stray = Uuid::new_v4();
        session
            .documents
            .lock()
            .await
            .insert(stray, Bytes::from_static(b"%PDF-"));

        assert!(session.submission_document(stray).await.is_none());
    }
}
