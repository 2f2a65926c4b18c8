//! Lightweight performance instrumentation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);

#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

impl Drop for Scope {
    fn drop(&mut self) {
        if !is_enabled() {
            return;
        }
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(target: "gitgraph_md::perf", "{}: {:.2} ms", self.name, elapsed_ms);
    }
}

pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Record a named event with free-form detail at debug level.
pub fn log_event(name: &str, detail: impl AsRef<str>) {
    tracing::debug!(target: "gitgraph_md::perf", "{name}: {}", detail.as_ref());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_enabled_toggles_runtime_flag() {
        set_enabled(true);
        assert!(is_enabled());

        set_enabled(false);
        assert!(!is_enabled());
    }

    #[test]
    fn test_scope_drops_quietly_when_disabled() {
        set_enabled(false);
        let scope = scope("test.scope");
        assert_eq!(scope.name, "test.scope");
        drop(scope);
    }
}
