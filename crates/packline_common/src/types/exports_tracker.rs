use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Records whether any module was required without being an entry while the
/// `exports` option was left unset.
///
/// Write-then-read contract: `Bundler::require` marks the tracker as calls
/// arrive; the wrap stage reads it exactly once, when the first output chunk
/// is about to be emitted. Every pipeline gets a fresh tracker, so `reset`
/// also clears accumulated export state.
#[derive(Debug, Default, Clone)]
pub struct ExportsTracker(Arc<AtomicBool>);

impl ExportsTracker {
  pub fn mark(&self) {
    self.0.store(true, Ordering::Relaxed);
  }

  pub fn is_set(&self) -> bool {
    self.0.load(Ordering::Relaxed)
  }
}
