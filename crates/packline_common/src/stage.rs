use packline_error::BuildResult;
use smallvec::SmallVec;
use tokio::sync::mpsc::UnboundedSender;

use crate::{PipelineEvent, Row};

/// One piece of serialized output produced behind the pack stage.
pub type Chunk = Vec<u8>;

/// Most stages map one input to one output, so batches stay inline.
pub type RowBatch = SmallVec<[Row; 1]>;
pub type ChunkBatch = SmallVec<[Chunk; 1]>;

/// Handed to every stage invocation. Events never travel the data path and
/// never apply backpressure; they are drained by the bundler once the run
/// settles.
pub struct StageContext {
  events: UnboundedSender<PipelineEvent>,
}

impl StageContext {
  pub fn new(events: UnboundedSender<PipelineEvent>) -> Self {
    Self { events }
  }

  pub fn emit(&self, event: PipelineEvent) {
    // A dropped receiver means the bundler gave up on the run; nothing left
    // to notify.
    let _ = self.events.send(event);
  }
}

/// A transformation over the row half of the pipeline.
///
/// Stages see one row at a time. The pipeline driver forwards every
/// returned row downstream, awaiting channel capacity, before the next row
/// is delivered, so a suspended consumer suspends the whole upstream chain.
pub trait RowStage: Send {
  fn process(&mut self, row: Row, cx: &mut StageContext) -> BuildResult<RowBatch>;

  /// Called once after the input side is exhausted. Buffering stages (the
  /// sorter) release their rows here.
  fn finish(&mut self, _cx: &mut StageContext) -> BuildResult<RowBatch> {
    Ok(RowBatch::new())
  }
}

/// The boundary stage: consumes the final labeled rows, produces serialized
/// output chunks.
pub trait PackStage: Send {
  fn process(&mut self, row: Row, cx: &mut StageContext) -> BuildResult<ChunkBatch>;

  fn finish(&mut self, cx: &mut StageContext) -> BuildResult<ChunkBatch>;
}

/// A transformation over serialized output.
pub trait ChunkStage: Send {
  fn process(&mut self, chunk: Chunk, cx: &mut StageContext) -> BuildResult<ChunkBatch>;

  fn finish(&mut self, _cx: &mut StageContext) -> BuildResult<ChunkBatch> {
    Ok(ChunkBatch::new())
  }
}
