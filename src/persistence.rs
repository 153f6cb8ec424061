//! Saved-round persistence behind a key-value storage seam.
//!
//! The record shape matches what the browser game has always written to
//! `localStorage`, so existing saves keep resuming:
//! `{score, usedArtists, currentLeft, currentRight, pendingChoice}`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::catalog::Artist;
use crate::error::PersistenceError;
use crate::round::{RoundState, Side};

/// Key-value storage with `localStorage` semantics.
pub trait StorageBackend {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}

/// In-memory storage. Clones share the same map, so two sessions built from
/// clones of one store behave like two page loads over one `localStorage`.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    inner: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.borrow().get(key).cloned()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.inner.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.inner.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.inner.borrow_mut().remove(key);
        Ok(())
    }
}

/// On-disk form of a round.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRound {
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub used_artists: Vec<String>,
    #[serde(default)]
    pub current_left: Option<Artist>,
    #[serde(default)]
    pub current_right: Option<Artist>,
    #[serde(default)]
    pub pending_choice: Option<Side>,
}

impl SavedRound {
    pub fn from_state(state: &RoundState) -> Self {
        Self {
            score: state.score,
            used_artists: state.used_names.clone(),
            current_left: Some(state.left.clone()),
            current_right: Some(state.right.clone()),
            pending_choice: state.pending_choice,
        }
    }

    /// Rebuild a live round. `Ok(None)` when the save has no complete pair.
    pub fn into_state(self) -> Result<Option<RoundState>, PersistenceError> {
        let (Some(left), Some(right)) = (self.current_left, self.current_right) else {
            return Ok(None);
        };
        if left.name == right.name {
            return Err(PersistenceError::Inconsistent(format!(
                "artist '{}' faces itself",
                left.name
            )));
        }
        Ok(Some(RoundState {
            score: self.score,
            left,
            right,
            used_names: self.used_artists,
            game_over: false,
            revealed: self.pending_choice.is_some(),
            pending_choice: self.pending_choice,
        }))
    }
}

pub struct PersistenceGateway<S> {
    backend: S,
    key: String,
}

impl<S: StorageBackend> PersistenceGateway<S> {
    pub fn new(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn save(&mut self, state: &RoundState) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(&SavedRound::from_state(state))?;
        self.backend.set(&self.key, &json)
    }

    /// Load the saved round. `Ok(None)` when nothing (or no complete pair) is
    /// stored; `Err` when the stored text cannot be understood.
    pub fn load(&self) -> Result<Option<RoundState>, PersistenceError> {
        let Some(json) = self.backend.get(&self.key)? else {
            return Ok(None);
        };
        let saved: SavedRound = serde_json::from_str(&json)?;
        saved.into_state()
    }

    pub fn clear(&mut self) -> Result<(), PersistenceError> {
        self.backend.remove(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> RoundState {
        RoundState {
            score: 4,
            left: Artist::new("Zell", 585554, "img/img_artista/zell.png"),
            right: Artist::new("lolo", 125645, "img/img_artista/lolo.png"),
            used_names: vec!["Knak".into(), "Zell".into(), "lolo".into()],
            game_over: false,
            revealed: true,
            pending_choice: Some(Side::Right),
        }
    }

    #[test]
    fn test_round_trip_keeps_pending_choice() {
        let mut gw = PersistenceGateway::new(MemoryStorage::new(), "k");
        gw.save(&state()).unwrap();
        let loaded = gw.load().unwrap().unwrap();
        assert_eq!(loaded, state());
    }

    #[test]
    fn test_record_uses_legacy_field_names() {
        let store = MemoryStorage::new();
        let mut gw = PersistenceGateway::new(store.clone(), "k");
        gw.save(&state()).unwrap();
        let raw = store.raw("k").unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v["pendingChoice"], "right");
        assert_eq!(v["currentLeft"]["monthly_listeners"], 585554);
        assert_eq!(v["usedArtists"][0], "Knak");
    }

    #[test]
    fn test_legacy_save_without_pending_loads_unrevealed() {
        let mut store = MemoryStorage::new();
        store
            .set(
                "k",
                r#"{"score":2,"usedArtists":["a","b"],
                    "currentLeft":{"name":"a","monthly_listeners":10,"img":"a.png"},
                    "currentRight":{"name":"b","monthly_listeners":20,"img":"b.png"},
                    "pendingChoice":null}"#,
            )
            .unwrap();
        let gw = PersistenceGateway::new(store, "k");
        let s = gw.load().unwrap().unwrap();
        assert_eq!(s.score, 2);
        assert!(!s.revealed);
        assert_eq!(s.pending_choice, None);
    }

    #[test]
    fn test_incomplete_pair_is_absent() {
        let mut store = MemoryStorage::new();
        store.set("k", r#"{"score":3,"currentLeft":null}"#).unwrap();
        let gw = PersistenceGateway::new(store, "k");
        assert!(gw.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_and_self_facing_saves_error() {
        let mut store = MemoryStorage::new();
        store.set("k", "{oops").unwrap();
        let gw = PersistenceGateway::new(store.clone(), "k");
        assert!(matches!(gw.load(), Err(PersistenceError::Corrupt(_))));

        store
            .set(
                "k",
                r#"{"currentLeft":{"name":"a","monthly_listeners":1,"img":""},
                    "currentRight":{"name":"a","monthly_listeners":1,"img":""}}"#,
            )
            .unwrap();
        assert!(matches!(gw.load(), Err(PersistenceError::Inconsistent(_))));
    }

    #[test]
    fn test_clear() {
        let mut gw = PersistenceGateway::new(MemoryStorage::new(), "k");
        gw.save(&state()).unwrap();
        gw.clear().unwrap();
        assert!(gw.load().unwrap().is_none());
    }
}
