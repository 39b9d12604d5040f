//! The process-wide default publisher.

use std::sync::{Arc, LazyLock, OnceLock};

use crate::config::PublisherConfig;
use crate::error::{EventsError, EventsResult};
use crate::publisher::Publisher;

/// Target of the global publisher: the library itself.
///
/// Handlers subscribed on [`global()`] without an explicit context receive
/// this marker as their receiver.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Courier;

static GLOBAL_CONFIG: OnceLock<PublisherConfig> = OnceLock::new();

static GLOBAL: LazyLock<Publisher> = LazyLock::new(|| {
    let config = GLOBAL_CONFIG.get_or_init(PublisherConfig::default).clone();
    Publisher::for_target_with_config(Arc::new(Courier), config)
});

/// The default publisher, created on first use and alive for the rest of the
/// process.
///
/// Advice channels are published here unless an advisor is given another
/// publisher.
#[must_use]
pub fn global() -> &'static Publisher {
    &GLOBAL
}

/// Set the configuration of the global publisher.
///
/// # Errors
///
/// Returns [`EventsError::AlreadyConfigured`] if the global publisher has
/// already been configured or used.
pub fn configure_global(config: PublisherConfig) -> EventsResult<()> {
    GLOBAL_CONFIG
        .set(config)
        .map_err(|_| EventsError::AlreadyConfigured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_global_is_singleton() {
        let a = global();
        let b = global();
        assert!(a.same_registry(b));
        assert!(a.target().is::<Courier>());
    }

    #[test]
    fn test_global_rejects_late_configuration() {
        let _ = global();
        assert!(matches!(
            configure_global(PublisherConfig::default()),
            Err(EventsError::AlreadyConfigured)
        ));
    }

    #[test]
    fn test_global_publish_round_trip() {
        let count = Arc::new(AtomicUsize::new(0));
        let hits = Arc::clone(&count);
        let subscription = global().subscribe("courier.events.global.test", move |receiver, _| {
            if receiver.is::<Courier>() {
                hits.fetch_add(1, Ordering::SeqCst);
            }
        });

        global()
            .publish("courier.events.global.test", args![])
            .unwrap();
        subscription.detach();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
