use packline_common::{Chunk, ChunkStage, PackStage, PipelineEvent, Row, RowStage, StageContext};
use packline_error::BuildResult;
use smallvec::SmallVec;
use tokio::sync::mpsc::{Receiver, Sender, UnboundedSender};
use tokio::task::JoinHandle;

/// Per-hop channel bound. Keeps a fast producer from buffering the whole
/// module set ahead of a slow consumer.
pub(crate) const CHANNEL_CAPACITY: usize = 1024;

/// Unifies the three stage traits behind one driver loop.
pub(crate) trait Drivable<In, Out>: Send {
  fn step(&mut self, item: In, cx: &mut StageContext) -> BuildResult<SmallVec<[Out; 1]>>;

  fn flush(&mut self, cx: &mut StageContext) -> BuildResult<SmallVec<[Out; 1]>>;
}

impl Drivable<Row, Row> for Box<dyn RowStage> {
  fn step(&mut self, item: Row, cx: &mut StageContext) -> BuildResult<SmallVec<[Row; 1]>> {
    self.process(item, cx)
  }

  fn flush(&mut self, cx: &mut StageContext) -> BuildResult<SmallVec<[Row; 1]>> {
    self.finish(cx)
  }
}

impl Drivable<Row, Chunk> for Box<dyn PackStage> {
  fn step(&mut self, item: Row, cx: &mut StageContext) -> BuildResult<SmallVec<[Chunk; 1]>> {
    self.process(item, cx)
  }

  fn flush(&mut self, cx: &mut StageContext) -> BuildResult<SmallVec<[Chunk; 1]>> {
    self.finish(cx)
  }
}

impl Drivable<Chunk, Chunk> for Box<dyn ChunkStage> {
  fn step(&mut self, item: Chunk, cx: &mut StageContext) -> BuildResult<SmallVec<[Chunk; 1]>> {
    self.process(item, cx)
  }

  fn flush(&mut self, cx: &mut StageContext) -> BuildResult<SmallVec<[Chunk; 1]>> {
    self.finish(cx)
  }
}

/// One task per stage. Every produced item is forwarded (awaiting channel
/// capacity) before the next input is accepted, so a suspended consumer
/// suspends the whole upstream chain.
pub(crate) fn spawn_driver<In, Out>(
  mut stage: impl Drivable<In, Out> + 'static,
  mut input: Receiver<In>,
  output: Sender<Out>,
  events: UnboundedSender<PipelineEvent>,
) -> JoinHandle<BuildResult<()>>
where
  In: Send + 'static,
  Out: Send + 'static,
{
  tokio::spawn(async move {
    let mut cx = StageContext::new(events);
    while let Some(item) = input.recv().await {
      for produced in stage.step(item, &mut cx)? {
        if output.send(produced).await.is_err() {
          // Downstream hung up, which only happens when a later stage
          // failed; stop quietly and let the join surface that error.
          return Ok(());
        }
      }
    }
    for produced in stage.flush(&mut cx)? {
      if output.send(produced).await.is_err() {
        return Ok(());
      }
    }
    Ok(())
  })
}
