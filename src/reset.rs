//! Deferred switch resets.
//!
//! Each trigger schedules its own task. Tasks are never cancelled or merged: two
//! triggers of the same switch inside the delay produce two resets, and both
//! write `false`.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Delay between a switch turning on and its automatic reset.
pub const RESET_DELAY: Duration = Duration::from_millis(3000);

#[derive(Default)]
pub struct ResetTimers {
    pending: Arc<Mutex<HashMap<String, usize>>>,
}

impl ResetTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `reset` for `name` after `delay` on a spawned task.
    pub fn schedule<F>(&self, name: &str, delay: Duration, reset: F)
    where
        F: FnOnce() + Send + 'static,
    {
        *self.pending.lock().entry(name.to_string()).or_default() += 1;

        let pending = self.pending.clone();
        let name = name.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            reset();

            let mut pending = pending.lock();
            if let Some(count) = pending.get_mut(&name) {
                *count -= 1;
                if *count == 0 {
                    pending.remove(&name);
                }
            }
        });
    }

    /// Resets scheduled for `name` that have not fired yet.
    pub fn pending(&self, name: &str) -> usize {
        self.pending.lock().get(name).copied().unwrap_or(0)
    }
}
