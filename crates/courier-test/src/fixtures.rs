//! Test fixtures.

use std::io;
use std::sync::{Arc, Mutex, Once, PoisonError};

use uuid::Uuid;

/// Create a channel name no other test will use.
///
/// Tests that publish on the shared global publisher run in parallel; unique
/// channel names keep them from observing each other.
#[must_use]
pub fn test_channel(prefix: &str) -> String {
    format!("{prefix}.{}", Uuid::new_v4().simple())
}

/// Install a test-friendly tracing subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to `warn`. Output is captured by the test
/// harness.
pub fn init_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` under a trace-level subscriber scoped to this thread and return
/// everything it logged, without colors or timestamps.
pub fn capture_logs<F: FnOnce()>(f: F) -> String {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .without_time()
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, f);
    buffer.contents()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels_are_unique() {
        let a = test_channel("courier.test");
        let b = test_channel("courier.test");
        assert_ne!(a, b);
        assert!(a.starts_with("courier.test."));
    }

    #[test]
    fn test_capture_logs_collects_events() {
        let logs = capture_logs(|| tracing::trace!(answer = 42, "captured"));
        assert!(logs.contains("captured"));
        assert!(logs.contains("answer=42"));
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_test_logging();
        init_test_logging();
    }
}
