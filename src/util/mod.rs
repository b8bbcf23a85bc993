use std::sync::atomic::{AtomicUsize, Ordering};

pub mod document;
pub mod numeric;

static ID_COUNTER: AtomicUsize = AtomicUsize::new(1);

/// Process-wide monotonic ids for items that arrive without one.
pub fn generate_id(prefix: &str) -> String {
    let value = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{value}")
}
