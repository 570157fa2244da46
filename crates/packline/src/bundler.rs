use std::sync::Arc;

use packline_common::{
  BundleObserver, BundlerOptions, ExportsTracker, InputItem, NormalizedBundlerOptions,
  PipelineEvent, Row,
};
use packline_error::{BuildError, BuildResult};

use crate::pipeline::{build_pipeline, Pipeline, RunningPipeline};
use crate::types::SharedOptions;
use crate::utils::normalize_options::normalize_options;

/// Owns one live pipeline at a time and re-emits its internal notifications
/// as observable events.
///
/// Rows queued by [`require`](Self::require) and [`add`](Self::add) flow
/// once [`bundle`](Self::bundle) closes the input end; afterwards the only
/// way to start another run is [`reset`](Self::reset).
pub struct Bundler {
  /// Raw construction options, kept for `reset` merging.
  options: BundlerOptions,
  shared: SharedOptions,
  pipeline: Pipeline,
  exports: ExportsTracker,
  observers: Vec<Box<dyn BundleObserver>>,
}

fn input_row(item: &InputItem, entry: bool) -> Row {
  let mut row = Row::from_file(item.import.as_str());
  if let Some(expose) = &item.expose {
    row = row.expose(expose.as_str());
  }
  row.entry(entry)
}

impl Bundler {
  pub fn new(options: BundlerOptions) -> Self {
    let raw_options = options.clone();
    let shared: SharedOptions = Arc::new(normalize_options(options));
    let exports = ExportsTracker::default();
    let pipeline = build_pipeline(&shared, exports.clone());

    let mut bundler =
      Self { options: raw_options, shared, pipeline, exports, observers: Vec::new() };
    bundler.seed();
    bundler
  }

  /// Convenience shape: entry files plus a separate options object. The
  /// files are appended after any entries the options already name.
  pub fn with_entries<I>(entries: I, mut options: BundlerOptions) -> Self
  where
    I: IntoIterator,
    I::Item: Into<InputItem>,
  {
    let mut merged = options.entries.take().unwrap_or_default();
    merged.extend(entries.into_iter().map(Into::into));
    options.entries = Some(merged);
    Self::new(options)
  }

  /// Queue the entries and requires named in the options, entries first.
  fn seed(&mut self) {
    let entries = self.shared.entries.clone();
    let requires = self.shared.require.clone();
    for item in &entries {
      self.enqueue(input_row(item, true));
    }
    for item in &requires {
      self.enqueue(input_row(item, false));
    }
  }

  fn enqueue(&mut self, row: Row) {
    // Write-then-read contract with the wrap stage: a non-entry require
    // while `exports` is unset means the bundle must hand out its require
    // function.
    if !row.entry && self.shared.exports.is_none() {
      self.exports.mark();
    }
    log::debug!("queueing row '{}'", row.debug_handle());
    self.pipeline.feed(row);
  }

  fn guard_open(&self, operation: &str) -> BuildResult<()> {
    if self.pipeline.is_closed() {
      return Err(BuildError::msg(format!(
        "{operation} after bundle(): the pipeline input end is closed. Call reset() to start a new run"
      )));
    }
    Ok(())
  }

  /// Register a module as available without auto-executing it. Accepts a
  /// bare specifier or a pre-built [`Row`].
  pub fn require(&mut self, module: impl Into<Row>) -> BuildResult<&mut Self> {
    self.guard_open("require()")?;
    self.enqueue(module.into());
    Ok(self)
  }

  /// Register an entry module: same as [`require`](Self::require), but its
  /// code runs as soon as the bundle loads.
  pub fn add(&mut self, module: impl Into<Row>) -> BuildResult<&mut Self> {
    self.guard_open("add()")?;
    self.enqueue(module.into().entry(true));
    Ok(self)
  }

  pub fn on(&mut self, observer: impl BundleObserver + 'static) -> &mut Self {
    self.observers.push(Box::new(observer));
    self
  }

  pub fn pipeline(&self) -> &Pipeline {
    &self.pipeline
  }

  pub fn pipeline_mut(&mut self) -> &mut Pipeline {
    &mut self.pipeline
  }

  pub fn options(&self) -> &NormalizedBundlerOptions {
    &self.shared
  }

  pub fn is_closed(&self) -> bool {
    self.pipeline.is_closed()
  }

  /// Discard the current pipeline and build a fresh one from the original
  /// options with `overrides` merged on top. Previously queued rows are not
  /// replayed; export-detection state starts over as well.
  pub fn reset(&mut self, overrides: BundlerOptions) {
    self.options = self.options.clone().merge(overrides);
    let shared: SharedOptions = Arc::new(normalize_options(self.options.clone()));
    self.exports = ExportsTracker::default();
    self.pipeline = build_pipeline(&shared, self.exports.clone());
    self.shared = shared;
    log::debug!("pipeline reset");

    let mut observers = std::mem::take(&mut self.observers);
    for observer in &mut observers {
      observer.on_reset();
    }
    self.observers = observers;
  }

  /// Close the input end, drive the pipeline to completion, and return the
  /// concatenated artifact bytes.
  pub async fn bundle(&mut self) -> BuildResult<Vec<u8>> {
    if let Err(error) = self.guard_open("bundle()") {
      self.notify_error(&error);
      return Err(error);
    }
    log::debug!("bundling {} queued rows", self.pipeline.pending_rows());

    let (events_tx, mut events_rx) = tokio::sync::mpsc::unbounded_channel();
    let RunningPipeline { mut output, tasks } = match self.pipeline.run(events_tx) {
      Ok(running) => running,
      Err(error) => {
        self.notify_error(&error);
        return Err(error);
      }
    };

    let mut artifact = Vec::new();
    while let Some(chunk) = output.recv().await {
      artifact.extend(chunk);
    }

    let mut errors = Vec::new();
    for result in futures::future::join_all(tasks).await {
      match result {
        Ok(Ok(())) => {}
        Ok(Err(error)) => errors.extend(error),
        Err(join_error) => errors.push(anyhow::anyhow!("pipeline stage panicked: {join_error}")),
      }
    }

    // Every driver has exited, so the event channel is drained dry here.
    let mut observers = std::mem::take(&mut self.observers);
    while let Some(event) = events_rx.recv().await {
      for observer in &mut observers {
        match &event {
          PipelineEvent::Label { prev, next } => observer.on_label(prev, next),
          PipelineEvent::Dep(row) => observer.on_dep(row),
        }
      }
    }
    self.observers = observers;

    if !errors.is_empty() {
      let error = BuildError::from(errors);
      self.notify_error(&error);
      return Err(error);
    }
    Ok(artifact)
  }

  /// Guard preserving the removed call shape that took options at bundle
  /// time: it fails synchronously, before any pipeline activity.
  pub fn bundle_with_options(&mut self, _options: BundlerOptions) -> BuildResult<Vec<u8>> {
    Err(BuildError::msg(
      "bundle() no longer accepts option arguments. Pass options to Bundler::new() or Bundler::reset() instead",
    ))
  }

  fn notify_error(&mut self, error: &BuildError) {
    let mut observers = std::mem::take(&mut self.observers);
    for observer in &mut observers {
      observer.on_error(error);
    }
    self.observers = observers;
  }
}
