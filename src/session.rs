//! # Preference Store Module
//!
//! ## Purpose
//! Holds the active preference set for each conversation session. Keyed by a
//! session identifier so concurrent users cannot corrupt each other's state;
//! lifecycle is tied to the process.
//!
//! ## Input/Output Specification
//! - **Input**: Session identifier, preference sets
//! - **Output**: The session's current preferences (empty if never set)
//! - **Replacement**: Always wholesale; preferences are never partially
//!   mutated in place
//!
//! ## Concurrency
//! Each session owns an async mutex. A turn locks it for the whole
//! read-modify-write (merge-then-store) sequence, so two concurrent turns for
//! the same session cannot interleave and lose an update. Turns for different
//! sessions proceed independently.

use crate::TripPreferences;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Session-keyed preference store
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<TripPreferences>>>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Get the session's slot, creating an empty one if absent.
    ///
    /// Callers hold the slot's lock across their whole merge-then-store
    /// sequence; this is what serializes turns within a session.
    pub async fn slot(&self, session_id: &str) -> Arc<Mutex<TripPreferences>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(slot) = sessions.get(session_id) {
                return slot.clone();
            }
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(TripPreferences::default())))
            .clone()
    }

    /// Get a copy of the session's current preferences (empty if never set)
    pub async fn get(&self, session_id: &str) -> TripPreferences {
        let sessions = self.sessions.read().await;
        match sessions.get(session_id) {
            Some(slot) => slot.lock().await.clone(),
            None => TripPreferences::default(),
        }
    }

    /// Replace the session's preferences wholesale
    pub async fn set(&self, session_id: &str, prefs: TripPreferences) {
        let slot = self.slot(session_id).await;
        *slot.lock().await = prefs;
    }

    /// Reset the session to the empty preference set
    pub async fn clear(&self, session_id: &str) {
        let sessions = self.sessions.read().await;
        if let Some(slot) = sessions.get(session_id) {
            *slot.lock().await = TripPreferences::default();
        }
    }

    /// Number of sessions currently held
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// True when no session has been touched yet
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
