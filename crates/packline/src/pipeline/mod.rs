mod builder;
mod driver;

use arcstr::ArcStr;
use packline_common::{Chunk, ChunkStage, PackStage, PipelineEvent, Row, RowStage};
use packline_error::{BuildError, BuildResult};
use rustc_hash::FxHashMap;
use tokio::sync::mpsc::{self, Receiver, UnboundedSender};
use tokio::task::JoinHandle;

pub use builder::build_pipeline;
use driver::{spawn_driver, CHANNEL_CAPACITY};

/// One stage, typed by the half of the stream it operates on: rows in
/// front of the pack boundary, chunks behind it.
pub enum Stage {
  Row(Box<dyn RowStage>),
  Pack(Box<dyn PackStage>),
  Chunk(Box<dyn ChunkStage>),
}

pub struct Segment {
  name: Option<ArcStr>,
  stage: Stage,
}

impl Segment {
  pub fn named(name: impl Into<ArcStr>, stage: Stage) -> Self {
    Self { name: Some(name.into()), stage }
  }

  pub fn anonymous(stage: Stage) -> Self {
    Self { name: None, stage }
  }

  pub fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }
}

/// An ordered, named sequence of transformation stages plus the buffered
/// input end. Stages stay inert (and replaceable) until the bundler spins
/// the pipeline up; from then on the input end is closed for good.
pub struct Pipeline {
  segments: Vec<Segment>,
  positions: FxHashMap<ArcStr, usize>,
  feed: Vec<Row>,
  closed: bool,
}

pub(crate) struct RunningPipeline {
  pub output: Receiver<Chunk>,
  pub tasks: Vec<JoinHandle<BuildResult<()>>>,
}

impl Pipeline {
  pub fn from_segments(segments: Vec<Segment>) -> Self {
    let mut pipeline =
      Self { segments, positions: FxHashMap::default(), feed: Vec::new(), closed: false };
    pipeline.rebuild_positions();
    pipeline
  }

  fn rebuild_positions(&mut self) {
    self.positions.clear();
    for (position, segment) in self.segments.iter().enumerate() {
      if let Some(name) = &segment.name {
        // First occurrence wins for duplicated names.
        self.positions.entry(name.clone()).or_insert(position);
      }
    }
  }

  pub fn is_closed(&self) -> bool {
    self.closed
  }

  pub fn position(&self, name: &str) -> Option<usize> {
    self.positions.get(name).copied()
  }

  fn locate(&self, name: &str) -> BuildResult<usize> {
    self
      .position(name)
      .ok_or_else(|| BuildError::msg(format!("pipeline has no segment named '{name}'")))
  }

  fn guard_open(&self) -> BuildResult<()> {
    if self.closed {
      return Err(BuildError::msg("pipeline is already spun up; stages can no longer change"));
    }
    Ok(())
  }

  pub fn insert_before(&mut self, name: &str, segment: Segment) -> BuildResult<()> {
    self.guard_open()?;
    let position = self.locate(name)?;
    self.segments.insert(position, segment);
    self.rebuild_positions();
    Ok(())
  }

  pub fn insert_after(&mut self, name: &str, segment: Segment) -> BuildResult<()> {
    self.guard_open()?;
    let position = self.locate(name)?;
    self.segments.insert(position + 1, segment);
    self.rebuild_positions();
    Ok(())
  }

  /// Swap the stage occupying `name`; the segment keeps its name and slot.
  pub fn replace(&mut self, name: &str, stage: Stage) -> BuildResult<()> {
    self.guard_open()?;
    let position = self.locate(name)?;
    self.segments[position].stage = stage;
    Ok(())
  }

  /// Queue a row at the input end. Rows sit in the buffer until the
  /// pipeline is spun up by `bundle()`.
  pub fn write(&mut self, row: Row) -> BuildResult<()> {
    self.guard_open()?;
    self.feed.push(row);
    Ok(())
  }

  /// Infallible input for the bundler, which owns the open/closed
  /// invariant.
  pub(crate) fn feed(&mut self, row: Row) {
    debug_assert!(!self.closed);
    self.feed.push(row);
  }

  pub(crate) fn pending_rows(&self) -> usize {
    self.feed.len()
  }

  /// Close the input end and bring the stages to life: one driver task per
  /// segment, neighbors connected by bounded channels.
  pub(crate) fn run(
    &mut self,
    events: UnboundedSender<PipelineEvent>,
  ) -> BuildResult<RunningPipeline> {
    self.guard_open()?;
    self.closed = true;
    let mut segments = std::mem::take(&mut self.segments);
    self.positions.clear();
    let feed = std::mem::take(&mut self.feed);

    let pack_position = segments
      .iter()
      .position(|segment| matches!(segment.stage, Stage::Pack(_)))
      .ok_or_else(|| BuildError::msg("pipeline has no pack stage"))?;
    if segments[..pack_position].iter().any(|s| !matches!(s.stage, Stage::Row(_)))
      || segments[pack_position + 1..].iter().any(|s| !matches!(s.stage, Stage::Chunk(_)))
    {
      return Err(BuildError::msg(
        "pipeline stages out of order: row stages must precede the pack stage, chunk stages must follow it",
      ));
    }

    log::debug!("spinning up pipeline with {} segments, {} queued rows", segments.len(), feed.len());

    let mut tasks: Vec<JoinHandle<BuildResult<()>>> = Vec::with_capacity(segments.len() + 1);

    let (feed_tx, mut rows_rx) = mpsc::channel::<Row>(CHANNEL_CAPACITY);
    tasks.push(tokio::spawn(async move {
      for row in feed {
        if feed_tx.send(row).await.is_err() {
          break;
        }
      }
      Ok(())
    }));

    let mut chunk_segments = segments.split_off(pack_position);
    let pack_segment = chunk_segments.remove(0);

    for segment in segments {
      let Stage::Row(stage) = segment.stage else { unreachable!("validated above") };
      let (tx, rx) = mpsc::channel::<Row>(CHANNEL_CAPACITY);
      tasks.push(spawn_driver(stage, rows_rx, tx, events.clone()));
      rows_rx = rx;
    }

    let Stage::Pack(pack) = pack_segment.stage else { unreachable!("validated above") };
    let (tx, mut chunks_rx) = mpsc::channel::<Chunk>(CHANNEL_CAPACITY);
    tasks.push(spawn_driver(pack, rows_rx, tx, events.clone()));

    for segment in chunk_segments {
      let Stage::Chunk(stage) = segment.stage else { unreachable!("validated above") };
      let (tx, rx) = mpsc::channel::<Chunk>(CHANNEL_CAPACITY);
      tasks.push(spawn_driver(stage, chunks_rx, tx, events.clone()));
      chunks_rx = rx;
    }

    Ok(RunningPipeline { output: chunks_rx, tasks })
  }
}
