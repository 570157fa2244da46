use packline_common::{PipelineEvent, Row, RowBatch, RowId, RowStage, StageContext};
use packline_error::BuildResult;
use smallvec::smallvec;

/// Assigns final identifiers: rows still named after their own file are
/// rewritten to their dense index, and every row's dependency map is
/// swapped for the pre-resolved index mapping. Rows exposed under an
/// explicit alias keep their name so external code can require them by it.
#[derive(Default)]
pub struct Labeler;

impl RowStage for Labeler {
  fn process(&mut self, mut row: Row, cx: &mut StageContext) -> BuildResult<RowBatch> {
    if row.uses_file_id() {
      if let Some(index) = row.index {
        let prev = std::mem::replace(&mut row.id, RowId::Idx(index));
        cx.emit(PipelineEvent::Label { prev, next: row.id.clone() });
      }
    }
    let index_deps = row.index_deps.take().unwrap_or_default();
    row.deps = index_deps.into_iter().map(|(specifier, idx)| (specifier, RowId::Idx(idx))).collect();
    Ok(smallvec![row])
  }
}
