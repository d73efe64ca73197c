use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per session id. Holders of the guard may load, modify and
/// save that session's cart or wishlist without losing concurrent writes.
#[derive(Clone, Default)]
pub struct SessionLocks {
    held: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, session: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut held = self.held.lock().await;
            // entries nobody holds or waits on
            held.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(held.entry(session.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))))
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_session_waits() {
        let locks = SessionLocks::new();
        let guard = locks.acquire("s1").await;
        let other = locks.clone();
        let waiter = tokio::spawn(async move {
            let _g = other.acquire("s1").await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());
        // a different session is not blocked
        drop(locks.acquire("s2").await);
        drop(guard);
        waiter.await.unwrap();
    }
}
