use packline_error::BuildError;

use crate::{Row, RowId};

/// Notifications produced inside a running pipeline and re-emitted by the
/// bundler to its observers.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
  /// A row's identifier was rewritten by the label stage.
  Label { prev: RowId, next: RowId },
  /// A row passed the dep-announcement stage, after labeling and before
  /// serialization.
  Dep(Row),
}

/// Typed observer surface of the bundler. Implement only the notifications
/// you care about; every method defaults to a no-op.
pub trait BundleObserver: Send {
  fn on_label(&mut self, _prev: &RowId, _next: &RowId) {}

  fn on_dep(&mut self, _row: &Row) {}

  fn on_reset(&mut self) {}

  fn on_error(&mut self, _error: &BuildError) {}
}
