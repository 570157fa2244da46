use packline_common::{PipelineEvent, Row, RowBatch, RowStage, StageContext};
use packline_error::BuildResult;
use smallvec::smallvec;

/// Transparent pass-through that announces each labeled row before it
/// reaches serialization. Exists for introspection and tooling; bundle
/// correctness does not depend on it.
pub struct EmitDeps;

impl RowStage for EmitDeps {
  fn process(&mut self, row: Row, cx: &mut StageContext) -> BuildResult<RowBatch> {
    cx.emit(PipelineEvent::Dep(row.clone()));
    Ok(smallvec![row])
  }
}
