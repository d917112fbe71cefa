//! In-memory optimization sessions.
//!
//! One session owns an uploaded résumé (raw bytes + extracted text +
//! optional HTML reconstruction), the job description, and the suggestion
//! list for the lifetime of one optimization run. The store is a plain
//! `RwLock<HashMap>` shared through `AppState`; each request takes the
//! lock briefly and the core never sees it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::edits::models::Suggestion;
use crate::overlay::geometry::BoundingBox;

/// Where an accepted suggestion should land in the overlay export. Captured
/// at review time; edits without one fall back to the DOM path or are
/// reported unmatched.
#[derive(Debug, Clone)]
pub struct Placement {
    pub page_index: usize,
    pub bbox: Option<BoundingBox>,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub pdf_bytes: Bytes,
    pub extracted_text: String,
    pub page_count: usize,
    pub jd_text: String,
    /// HTML reconstruction from the structured-document collaborator, when
    /// one was supplied alongside the upload.
    pub html_document: Option<String>,
    pub suggestions: Vec<Suggestion>,
    pub placements: HashMap<Uuid, Placement>,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: Session) {
        self.inner
            .write()
            .expect("session store lock poisoned")
            .insert(session.id, session);
    }

    pub fn get(&self, id: Uuid) -> Option<Session> {
        self.inner
            .read()
            .expect("session store lock poisoned")
            .get(&id)
            .cloned()
    }

    /// Applies `f` to the stored session. Returns `None` when the id is
    /// unknown, otherwise `f`'s result.
    pub fn with_mut<T>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
        self.inner
            .write()
            .expect("session store lock poisoned")
            .get_mut(&id)
            .map(f)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_session() -> Session {
        Session {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            pdf_bytes: Bytes::from_static(b"%PDF-"),
            extracted_text: "text".to_string(),
            page_count: 1,
            jd_text: "jd".to_string(),
            html_document: None,
            suggestions: vec![],
            placements: HashMap::new(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let store = SessionStore::new();
        let session = make_session();
        let id = session.id;
        store.insert(session);
        assert!(store.get(id).is_some());
        assert!(store.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_with_mut_updates_in_place() {
        let store = SessionStore::new();
        let session = make_session();
        let id = session.id;
        store.insert(session);

        let updated = store.with_mut(id, |s| {
            s.jd_text = "new jd".to_string();
            s.jd_text.clone()
        });
        assert_eq!(updated.as_deref(), Some("new jd"));
        assert_eq!(store.get(id).unwrap().jd_text, "new jd");
    }

    #[test]
    fn test_with_mut_unknown_id_is_none() {
        let store = SessionStore::new();
        assert!(store.with_mut(Uuid::new_v4(), |_| ()).is_none());
    }
}
