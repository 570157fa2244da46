use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use packline::{
  BundleObserver, Bundler, BundlerOptions, InputItem, ModuleRecord, Row, RowId, Segment, Stage,
};
use pretty_assertions::assert_eq;

fn fixture_modules() -> Vec<ModuleRecord> {
  vec![
    ModuleRecord::new("./main.js", "console.log(require('./greet')('world'));").dep("./greet"),
    ModuleRecord::new(
      "./greet.js",
      "var inflect = require('./lib/inflect');\nmodule.exports = function (name) { return inflect('hello ' + name); };",
    )
    .dep("./lib/inflect"),
    ModuleRecord::new("./lib/inflect.js", "module.exports = function (s) { return s + '!'; };"),
  ]
}

fn options() -> BundlerOptions {
  BundlerOptions { modules: Some(fixture_modules()), ..BundlerOptions::default() }
}

#[derive(Default, Clone)]
struct Recorder {
  labels: Arc<Mutex<Vec<(String, String)>>>,
  deps: Arc<Mutex<Vec<Row>>>,
  resets: Arc<AtomicUsize>,
  errors: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
  fn labels(&self) -> Vec<(String, String)> {
    self.labels.lock().unwrap().clone()
  }

  fn deps(&self) -> Vec<Row> {
    self.deps.lock().unwrap().clone()
  }
}

impl BundleObserver for Recorder {
  fn on_label(&mut self, prev: &RowId, next: &RowId) {
    self.labels.lock().unwrap().push((prev.to_string(), next.to_string()));
  }

  fn on_dep(&mut self, row: &Row) {
    self.deps.lock().unwrap().push(row.clone());
  }

  fn on_reset(&mut self) {
    self.resets.fetch_add(1, Ordering::SeqCst);
  }

  fn on_error(&mut self, error: &packline::BuildError) {
    self.errors.lock().unwrap().push(error.to_string());
  }
}

fn text(artifact: &[u8]) -> String {
  String::from_utf8(artifact.to_vec()).unwrap()
}

#[tokio::test]
async fn labels_every_file_row_with_a_distinct_index() {
  let mut bundler = Bundler::new(BundlerOptions {
    entries: Some(vec!["./main.js".into()]),
    ..options()
  });
  let recorder = Recorder::default();
  bundler.on(recorder.clone());
  bundler.bundle().await.unwrap();

  let labels = recorder.labels();
  assert_eq!(labels.len(), 3);
  let mut indices: Vec<String> = labels.iter().map(|(_, next)| next.clone()).collect();
  indices.sort();
  indices.dedup();
  assert_eq!(indices.len(), 3);
  assert!(labels.iter().any(|(prev, next)| prev == "./main.js" && next == "0"));
}

#[tokio::test]
async fn exposed_rows_keep_their_alias_with_rewritten_deps() {
  let mut bundler = Bundler::new(BundlerOptions {
    require: Some(vec![InputItem { expose: Some("greet".to_string()), import: "./greet.js".to_string() }]),
    ..options()
  });
  let recorder = Recorder::default();
  bundler.on(recorder.clone());
  let artifact = bundler.bundle().await.unwrap();

  assert!(text(&artifact).contains("\"greet\":[function(require,module,exports){"));
  let deps = recorder.deps();
  let exposed = deps.iter().find(|row| row.id.is_name("greet")).unwrap();
  assert!(exposed.deps.values().all(|target| matches!(target, RowId::Idx(_))));
}

#[tokio::test]
async fn require_only_bundles_assign_the_loader_to_require() {
  let mut bundler = Bundler::new(options());
  bundler.require("./greet.js").unwrap();
  let artifact = bundler.bundle().await.unwrap();

  assert!(text(&artifact).starts_with("require="));
}

#[tokio::test]
async fn entry_only_bundles_get_no_prefix() {
  let mut bundler = Bundler::new(options());
  bundler.add("./main.js").unwrap();
  let artifact = bundler.bundle().await.unwrap();

  assert!(text(&artifact).starts_with("(function(){"));
}

#[tokio::test]
async fn an_explicit_exports_option_suppresses_the_prefix() {
  let mut bundler = Bundler::new(BundlerOptions { exports: Some(true), ..options() });
  bundler.require("./greet.js").unwrap();
  let artifact = bundler.bundle().await.unwrap();

  assert!(text(&artifact).starts_with("(function(){"));
}

#[tokio::test]
async fn the_external_require_name_is_respected() {
  let mut bundler = Bundler::new(BundlerOptions {
    external_require_name: Some("loadDep".to_string()),
    ..options()
  });
  bundler.require("./greet.js").unwrap();
  let artifact = bundler.bundle().await.unwrap();

  assert!(text(&artifact).starts_with("loadDep="));
}

#[tokio::test]
async fn standalone_wraps_in_umd_regardless_of_the_require_mix() {
  let mut bundler = Bundler::new(BundlerOptions {
    standalone: Some("Foo".to_string()),
    ..options()
  });
  bundler.require("./greet.js").unwrap();
  bundler.add("./main.js").unwrap();
  let artifact = bundler.bundle().await.unwrap();

  let out = text(&artifact);
  assert!(out.starts_with("(function(f){"));
  assert!(out.contains("g.Foo=f()"));
  assert!(out.contains("return (function(){"));
  assert!(out.ends_with("\n});"));
}

#[tokio::test]
async fn bundle_with_options_is_rejected_before_any_pipeline_activity() {
  let mut bundler = Bundler::new(options());
  bundler.add("./main.js").unwrap();

  let error = bundler
    .bundle_with_options(BundlerOptions { debug: Some(true), ..BundlerOptions::default() })
    .unwrap_err();
  assert!(error.to_string().contains("no longer accepts option arguments"));

  // The guard is fatal to that call only; the queued run is still intact.
  let artifact = bundler.bundle().await.unwrap();
  assert!(text(&artifact).contains("console.log"));
}

#[tokio::test]
async fn a_closed_bundler_rejects_further_work() {
  let mut bundler = Bundler::new(options());
  bundler.add("./main.js").unwrap();
  bundler.bundle().await.unwrap();

  assert!(bundler.is_closed());
  assert!(bundler.require("./greet.js").is_err());
  let error = bundler.bundle().await.unwrap_err();
  assert!(error.to_string().contains("reset()"));
}

#[tokio::test]
async fn reset_discards_queued_rows_and_fires_once() {
  let mut bundler = Bundler::new(options());
  let recorder = Recorder::default();
  bundler.on(recorder.clone());
  bundler.add("./main.js").unwrap();

  bundler.reset(BundlerOptions { debug: Some(true), ..BundlerOptions::default() });
  assert_eq!(recorder.resets.load(Ordering::SeqCst), 1);

  bundler.add("./greet.js").unwrap();
  let artifact = bundler.bundle().await.unwrap();
  let out = text(&artifact);

  assert!(!out.contains("console.log"));
  // The merged debug override reached the fresh pipeline.
  assert!(out.contains("//# sourceURL=file://localhost/./greet.js"));
}

#[tokio::test]
async fn entries_can_be_passed_next_to_the_options() {
  let mut bundler = Bundler::with_entries(["./main.js"], options());
  let artifact = bundler.bundle().await.unwrap();

  assert!(text(&artifact).contains("console.log"));
  assert!(text(&artifact).ends_with(",{},[0])"));
}

#[tokio::test]
async fn equivalent_bundlers_produce_identical_bytes() {
  let build = || async {
    let mut bundler = Bundler::new(BundlerOptions {
      entries: Some(vec!["./main.js".into()]),
      require: Some(vec!["./lib/inflect.js".into()]),
      ..options()
    });
    bundler.bundle().await.unwrap()
  };

  assert_eq!(build().await, build().await);
}

#[tokio::test]
async fn unresolvable_specifiers_fail_the_whole_run() {
  let mut bundler = Bundler::new(BundlerOptions {
    modules: Some(vec![ModuleRecord::new("./broken.js", "require('./gone');").dep("./gone")]),
    ..BundlerOptions::default()
  });
  let recorder = Recorder::default();
  bundler.on(recorder.clone());
  bundler.add("./broken.js").unwrap();

  let error = bundler.bundle().await.unwrap_err();
  assert!(error.to_string().contains("Cannot find module './gone'"));
  assert_eq!(recorder.errors.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn debug_mode_annotates_rows_and_the_artifact() {
  let mut bundler = Bundler::new(BundlerOptions {
    entries: Some(vec!["./main.js".into()]),
    debug: Some(true),
    ..options()
  });
  let recorder = Recorder::default();
  bundler.on(recorder.clone());
  let artifact = bundler.bundle().await.unwrap();

  assert!(recorder.deps().iter().all(|row| row.source_root.is_some()));
  assert!(text(&artifact).contains("//# sourceURL=file://localhost/./main.js"));
}

#[tokio::test]
async fn virtual_rows_ride_along_with_declared_deps() {
  let mut bundler = Bundler::new(options());
  bundler
    .require(Row::from_source("shim", "module.exports = require('greet');").dep("greet", "./greet.js"))
    .unwrap();
  let artifact = bundler.bundle().await.unwrap();

  assert!(text(&artifact).contains("\"shim\":[function(require,module,exports){"));
}

#[tokio::test]
async fn spliced_stages_participate_in_the_run() {
  use packline::{RowBatch, RowStage, StageContext};

  /// Appends a marker row once the real rows have flowed past.
  struct Banner;

  impl RowStage for Banner {
    fn process(
      &mut self,
      row: packline::Row,
      _cx: &mut StageContext,
    ) -> packline::BuildResult<RowBatch> {
      Ok(RowBatch::from_iter([row]))
    }

    fn finish(&mut self, _cx: &mut StageContext) -> packline::BuildResult<RowBatch> {
      Ok(RowBatch::from_iter([Row::from_source("banner", "/* packed by packline */")]))
    }
  }

  let mut bundler = Bundler::new(options());
  bundler.add("./main.js").unwrap();
  bundler
    .pipeline_mut()
    .insert_after("label", Segment::anonymous(Stage::Row(Box::new(Banner))))
    .unwrap();
  let artifact = bundler.bundle().await.unwrap();

  assert!(text(&artifact).contains("\"banner\":[function(require,module,exports){"));
}
