//! In-memory edit locks: at most one owner may write a locked document.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// Stable owner id used to scope edit locks to a specific client/session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockOwnerId(String);

impl LockOwnerId {
    /// Construct an owner id from a caller-provided identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Return this owner id as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for LockOwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock-manager runtime errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditLockError {
    /// Another owner holds the document.
    #[error("document '{document_id}' is being edited by another session")]
    Held { document_id: String },
    /// Release attempted by an owner that does not hold the document.
    #[error("owner '{owner_id}' does not hold the lock for document '{document_id}'")]
    NotHeld {
        document_id: String,
        owner_id: LockOwnerId,
    },
    /// Internal mutex state is poisoned.
    #[error("edit lock state is poisoned")]
    Poisoned,
}

/// Tracks which owner, if any, holds each document.
#[derive(Default)]
pub struct EditLockManager {
    holders: Mutex<HashMap<String, LockOwnerId>>,
}

impl EditLockManager {
    fn state(&self) -> Result<MutexGuard<'_, HashMap<String, LockOwnerId>>, EditLockError> {
        self.holders.lock().map_err(|_| EditLockError::Poisoned)
    }

    /// Acquire the edit lock for `document_id`.
    ///
    /// Acquisition is idempotent for the current holder.
    ///
    /// # Errors
    /// Returns [`EditLockError::Held`] when another owner holds the document.
    pub fn acquire(&self, document_id: &str, owner_id: &LockOwnerId) -> Result<(), EditLockError> {
        let mut holders = self.state()?;
        match holders.get(document_id) {
            Some(holder) if holder != owner_id => Err(EditLockError::Held {
                document_id: document_id.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                holders.insert(document_id.to_string(), owner_id.clone());
                Ok(())
            }
        }
    }

    /// Release the edit lock held by `owner_id`.
    ///
    /// # Errors
    /// Returns [`EditLockError::NotHeld`] when `owner_id` is not the holder.
    pub fn release(&self, document_id: &str, owner_id: &LockOwnerId) -> Result<(), EditLockError> {
        let mut holders = self.state()?;
        match holders.get(document_id) {
            Some(holder) if holder == owner_id => {
                holders.remove(document_id);
                Ok(())
            }
            _ => Err(EditLockError::NotHeld {
                document_id: document_id.to_string(),
                owner_id: owner_id.clone(),
            }),
        }
    }

    /// Check whether `owner_id` may write `document_id`.
    ///
    /// Unlocked documents accept writes from anyone, including anonymous callers.
    ///
    /// # Errors
    /// Returns [`EditLockError::Held`] when another owner holds the document.
    pub fn check_can_edit(
        &self,
        document_id: &str,
        owner_id: Option<&LockOwnerId>,
    ) -> Result<(), EditLockError> {
        let holders = self.state()?;
        match holders.get(document_id) {
            Some(holder) if Some(holder) != owner_id => Err(EditLockError::Held {
                document_id: document_id.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Current holder of `document_id`, if any.
    pub fn holder(&self, document_id: &str) -> Option<LockOwnerId> {
        self.state().ok()?.get(document_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::{EditLockError, EditLockManager, LockOwnerId};

    #[test]
    fn only_one_owner_can_hold_a_document() {
        let locks = EditLockManager::default();
        let ada = LockOwnerId::new("ada");
        let bob = LockOwnerId::new("bob");

        locks.acquire("doc", &ada).expect("ada acquires");
        locks.acquire("doc", &ada).expect("idempotent");
        assert_eq!(
            locks.acquire("doc", &bob),
            Err(EditLockError::Held {
                document_id: "doc".to_string()
            })
        );
        assert_eq!(locks.holder("doc"), Some(ada.clone()));

        locks.release("doc", &ada).expect("release");
        locks.acquire("doc", &bob).expect("bob acquires after release");
    }

    #[test]
    fn release_by_non_holder_is_rejected() {
        let locks = EditLockManager::default();
        let ada = LockOwnerId::new("ada");
        let err = locks.release("doc", &ada).expect_err("not held");
        assert!(matches!(err, EditLockError::NotHeld { .. }));
    }

    #[test]
    fn edit_check_allows_holder_and_unlocked_documents() {
        let locks = EditLockManager::default();
        let ada = LockOwnerId::new("ada");
        let bob = LockOwnerId::new("bob");

        locks.check_can_edit("doc", None).expect("unlocked");
        locks.acquire("doc", &ada).expect("acquire");
        locks.check_can_edit("doc", Some(&ada)).expect("holder");
        assert!(locks.check_can_edit("doc", Some(&bob)).is_err());
        assert!(locks.check_can_edit("doc", None).is_err());
        locks.check_can_edit("other", Some(&bob)).expect("other doc");
    }
}
