use arcstr::ArcStr;
use packline_common::{Row, RowBatch, RowStage, StageContext};
use packline_error::BuildResult;
use smallvec::smallvec;

/// In debug mode, attaches a synthetic source root and a forward-slash copy
/// of the file path for downstream source mapping. Never touches `id`,
/// `index`, or `deps`.
pub struct DebugAnnotator {
  enabled: bool,
}

impl DebugAnnotator {
  pub fn new(enabled: bool) -> Self {
    Self { enabled }
  }
}

impl RowStage for DebugAnnotator {
  fn process(&mut self, mut row: Row, _cx: &mut StageContext) -> BuildResult<RowBatch> {
    if self.enabled {
      row.source_root = Some(arcstr::literal!("file://localhost"));
      if let Some(file) = &row.file {
        row.source_file = Some(ArcStr::from(file.replace('\\', "/")));
      }
    }
    Ok(smallvec![row])
  }
}
