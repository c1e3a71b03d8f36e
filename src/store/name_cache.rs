//! Session-scoped address -> name cache
//!
//! Each address is resolved at most once per session. Concurrent lookups of
//! the same address share a single in-flight request.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy_primitives::Address;
use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use crate::infrastructure::provider::NameResolver;

type InFlight = Shared<BoxFuture<'static, Option<String>>>;

enum Slot {
    Pending(InFlight),
    Settled(Option<String>),
}

/// What the cache knows about an address without asking the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedName {
    /// Never resolved, or still in flight
    Unresolved,
    /// Resolved; `None` means the address has no name
    Resolved(Option<String>),
}

pub struct NameCache {
    resolver: Arc<dyn NameResolver>,
    slots: Mutex<HashMap<Address, Slot>>,
}

impl NameCache {
    pub fn new(resolver: Arc<dyn NameResolver>) -> Self {
        Self {
            resolver,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<Address, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Name of `address`, resolving it on first use.
    ///
    /// Resolver failures are logged and remembered as "no name".
    pub async fn lookup(&self, address: Address) -> Option<String> {
        let in_flight = {
            let mut slots = self.slots();
            match slots.get(&address) {
                Some(Slot::Settled(name)) => {
                    debug!(%address, "name cache hit");
                    return name.clone();
                }
                Some(Slot::Pending(shared)) => shared.clone(),
                None => {
                    debug!(%address, "name cache miss");
                    let shared = Self::request(Arc::clone(&self.resolver), address);
                    slots.insert(address, Slot::Pending(shared.clone()));
                    shared
                }
            }
        };

        let name = in_flight.await;
        self.slots().insert(address, Slot::Settled(name.clone()));
        name
    }

    fn request(resolver: Arc<dyn NameResolver>, address: Address) -> InFlight {
        async move {
            match resolver.lookup_name(address).await {
                Ok(name) => name,
                Err(e) => {
                    warn!(%address, error = %e, "name lookup failed");
                    None
                }
            }
        }
        .boxed()
        .shared()
    }

    pub fn peek(&self, address: &Address) -> CachedName {
        match self.slots().get(address) {
            Some(Slot::Settled(name)) => CachedName::Resolved(name.clone()),
            _ => CachedName::Unresolved,
        }
    }

    pub fn has(&self, address: &Address) -> bool {
        matches!(self.slots().get(address), Some(Slot::Settled(_)))
    }

    /// Number of settled entries
    pub fn len(&self) -> usize {
        self.slots()
            .values()
            .filter(|slot| matches!(slot, Slot::Settled(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::error::ResolveError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingResolver {
        calls: AtomicUsize,
        delay: Duration,
        fail: bool,
    }

    impl CountingResolver {
        fn new(delay: Duration, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                delay,
                fail,
            })
        }
    }

    #[async_trait::async_trait]
    impl NameResolver for CountingResolver {
        async fn lookup_name(&self, address: Address) -> Result<Option<String>, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(ResolveError::Rpc("boom".into()));
            }
            if address == Address::repeat_byte(1) {
                Ok(Some("alice.eth".into()))
            } else {
                Ok(None)
            }
        }

        async fn resolve_name(&self, _name: &str) -> Result<Option<Address>, ResolveError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_second_lookup_uses_cache() {
        let resolver = CountingResolver::new(Duration::ZERO, false);
        let cache = NameCache::new(resolver.clone());
        let alice = Address::repeat_byte(1);

        assert_eq!(cache.peek(&alice), CachedName::Unresolved);
        assert_eq!(cache.lookup(alice).await.as_deref(), Some("alice.eth"));
        assert_eq!(cache.lookup(alice).await.as_deref(), Some("alice.eth"));
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
        assert!(cache.has(&alice));
    }

    #[tokio::test]
    async fn test_absent_name_is_cached() {
        let resolver = CountingResolver::new(Duration::ZERO, false);
        let cache = NameCache::new(resolver.clone());
        let nobody = Address::repeat_byte(2);

        assert_eq!(cache.lookup(nobody).await, None);
        assert_eq!(cache.peek(&nobody), CachedName::Resolved(None));
        assert_eq!(cache.lookup(nobody).await, None);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_lookups_share_request() {
        let resolver = CountingResolver::new(Duration::from_millis(20), false);
        let cache = NameCache::new(resolver.clone());
        let alice = Address::repeat_byte(1);

        let (a, b, c) = tokio::join!(cache.lookup(alice), cache.lookup(alice), cache.lookup(alice));
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_absorbed() {
        let resolver = CountingResolver::new(Duration::ZERO, true);
        let cache = NameCache::new(resolver.clone());
        let alice = Address::repeat_byte(1);

        assert_eq!(cache.lookup(alice).await, None);
        assert_eq!(cache.peek(&alice), CachedName::Resolved(None));
        assert_eq!(cache.lookup(alice).await, None);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_cache() {
        let cache = NameCache::new(CountingResolver::new(Duration::ZERO, false));
        assert!(cache.is_empty());
        assert_eq!(cache.peek(&Address::ZERO), CachedName::Unresolved);
    }
}
