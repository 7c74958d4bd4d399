use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::types::ListingKey;

type LockMap = HashMap<ListingKey, Arc<AsyncMutex<()>>>;
type Acquire = Pin<Box<dyn Future<Output = OwnedMutexGuard<()>> + Send>>;

/// Per-listing async locks
///
/// Entries exist only while a task holds or waits for the lock of a key.
#[derive(Clone, Default)]
pub struct KeyLocks {
    locks: Arc<Mutex<LockMap>>,
}

/// Held lock of one listing key, released on drop
pub struct KeyGuard {
    // Fields drop in order: the lock goes before the entry is checked
    _guard: OwnedMutexGuard<()>,
    _release: Release,
}

/// A task waiting for a key, possibly cancelled before it gets it
struct Waiting {
    acquire: Acquire,
    release: Release,
}

/// Forgets the entry of `key` on drop once no guard or waiter refers to it
struct Release {
    key: ListingKey,
    locks: Arc<Mutex<LockMap>>,
}

impl KeyLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other task holds the lock for `key`
    ///
    /// Dropping the returned future while it waits leaves no entry behind.
    pub async fn lock(&self, key: &ListingKey) -> KeyGuard {
        let entry = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(key.clone()).or_default().clone()
        };

        let mut waiting = Waiting {
            acquire: Box::pin(entry.lock_owned()),
            release: Release {
                key: key.clone(),
                locks: self.locks.clone(),
            },
        };
        let guard = (&mut waiting.acquire).await;

        KeyGuard {
            _guard: guard,
            _release: waiting.release,
        }
    }

    /// Number of keys currently locked or awaited
    #[must_use]
    pub fn active_keys(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for Release {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Guards and waiters hold a clone of the entry, so a count of one means nobody else needs it
        if locks
            .get(&self.key)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            locks.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn test_same_key_waits_for_release() {
        let locks = KeyLocks::new();
        let key = ListingKey::from_title("Bike");

        let first = locks.lock(&key).await;
        let second = tokio::time::timeout(Duration::from_millis(20), locks.lock(&key)).await;
        assert!(second.is_err());

        drop(first);
        let second = tokio::time::timeout(Duration::from_millis(20), locks.lock(&key)).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let locks = KeyLocks::new();

        let _bike = locks.lock(&ListingKey::from_title("Bike")).await;
        let car = tokio::time::timeout(
            Duration::from_millis(20),
            locks.lock(&ListingKey::from_title("Car")),
        )
        .await;

        assert!(car.is_ok());
    }

    #[tokio::test]
    async fn test_released_keys_are_forgotten() {
        let locks = KeyLocks::new();

        let guard = locks.lock(&ListingKey::from_title("Bike")).await;
        assert_eq!(locks.active_keys(), 1);

        drop(guard);
        assert_eq!(locks.active_keys(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_waiter_leaves_no_entry() {
        let locks = KeyLocks::new();
        let key = ListingKey::from_title("Bike");

        let holder = locks.lock(&key).await;
        let mut waiter = Box::pin(locks.lock(&key));
        assert!(futures::poll!(&mut waiter).is_pending());

        drop(holder);
        assert_eq!(locks.active_keys(), 1);

        drop(waiter);
        assert_eq!(locks.active_keys(), 0);
    }

    #[tokio::test]
    async fn test_waiter_cancelled_while_held_leaves_no_entry() {
        let locks = KeyLocks::new();
        let key = ListingKey::from_title("Bike");

        let holder = locks.lock(&key).await;
        let waiter = tokio::time::timeout(Duration::from_millis(10), locks.lock(&key)).await;
        assert!(waiter.is_err());
        assert_eq!(locks.active_keys(), 1);

        drop(holder);
        assert_eq!(locks.active_keys(), 0);

        let again = tokio::time::timeout(Duration::from_millis(20), locks.lock(&key)).await;
        assert!(again.is_ok());
    }
}
