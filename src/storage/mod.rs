//! Storage collaborator interface.
//!
//! Persistence is owned by an external collaborator (the application's
//! database layer); the engines only consume this trait. Focus sessions are
//! the single persisted record; reminders live in memory for the process
//! lifetime by design. [`MemorySessionStore`] backs tests and is a usable
//! default for hosts without their own store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use thiserror::Error;
use uuid::Uuid;

use crate::types::FocusSession;

/// Errors that can occur in the storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading persisted records failed.
    #[error("セッションの読み込みに失敗しました: {0}")]
    ReadFailed(String),

    /// Writing a record failed.
    #[error("セッションの保存に失敗しました: {0}")]
    WriteFailed(String),

    /// No record exists for the given id.
    #[error("セッションが見つかりません: {0}")]
    NotFound(Uuid),
}

/// The storage surface the engines consume.
///
/// `add_focus_session` is called exactly once per qualifying stop;
/// `remove_focus_session` is the user-facing delete exposed to UI
/// collaborators and never called by the engines themselves.
pub trait SessionStore: Send + Sync {
    /// Returns all persisted focus sessions, newest last.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be read.
    fn focus_sessions(&self) -> Result<Vec<FocusSession>, StorageError>;

    /// Persists a focus session record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn add_focus_session(&self, session: &FocusSession) -> Result<(), StorageError>;

    /// Deletes a persisted focus session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no such record exists.
    fn remove_focus_session(&self, id: Uuid) -> Result<(), StorageError>;
}

/// In-memory session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<Vec<FocusSession>>,
    fail_writes: AtomicBool,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent writes fail, for degraded-path tests.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of persisted sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    /// True if no session has been persisted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    fn focus_sessions(&self) -> Result<Vec<FocusSession>, StorageError> {
        Ok(self.sessions.lock().unwrap().clone())
    }

    fn add_focus_session(&self, session: &FocusSession) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteFailed("Mock failure".to_string()));
        }
        self.sessions.lock().unwrap().push(session.clone());
        Ok(())
    }

    fn remove_focus_session(&self, id: Uuid) -> Result<(), StorageError> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| s.id != id);
        if sessions.len() == before {
            return Err(StorageError::NotFound(id));
        }
        Ok(())
    }
}
