use packline_common::{Chunk, ChunkBatch, ChunkStage, ExportsTracker, StageContext};
use packline_error::BuildResult;
use packline_utils::concat_string;
use smallvec::smallvec;

use crate::types::SharedOptions;

/// Whether the artifact needs a prefix depends on the whole `require`/`add`
/// call sequence, so the decision is deferred to the moment the first
/// serialized chunk arrives, then locked in.
enum WrapState {
  PendingFirstChunk,
  Wrapped,
}

pub struct OutputWrapper {
  state: WrapState,
  standalone: Option<String>,
  external_require_name: String,
  exports: ExportsTracker,
}

impl OutputWrapper {
  pub fn new(options: &SharedOptions, exports: ExportsTracker) -> Self {
    Self {
      state: WrapState::PendingFirstChunk,
      standalone: options.standalone.clone(),
      external_require_name: options.external_require_name.clone(),
      exports,
    }
  }
}

impl ChunkStage for OutputWrapper {
  fn process(&mut self, chunk: Chunk, _cx: &mut StageContext) -> BuildResult<ChunkBatch> {
    match self.state {
      WrapState::Wrapped => Ok(smallvec![chunk]),
      WrapState::PendingFirstChunk => {
        self.state = WrapState::Wrapped;
        if let Some(name) = &self.standalone {
          // The packed loader expression becomes the UMD factory's return
          // value.
          let mut prefix = packline_umd::prelude(name);
          prefix.push_str("return ");
          Ok(smallvec![prefix.into_bytes(), chunk])
        } else if self.exports.is_set() {
          let prefix = concat_string!(self.external_require_name, "=");
          Ok(smallvec![prefix.into_bytes(), chunk])
        } else {
          Ok(smallvec![chunk])
        }
      }
    }
  }

  fn finish(&mut self, _cx: &mut StageContext) -> BuildResult<ChunkBatch> {
    if matches!(self.state, WrapState::Wrapped) && self.standalone.is_some() {
      return Ok(smallvec![packline_umd::postlude().as_bytes().to_vec()]);
    }
    Ok(ChunkBatch::new())
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use packline_common::{ChunkStage, ExportsTracker, NormalizedBundlerOptions, StageContext};

  use super::OutputWrapper;

  fn cx() -> StageContext {
    let (events, _) = tokio::sync::mpsc::unbounded_channel();
    StageContext::new(events)
  }

  fn options(standalone: Option<&str>, external_require_name: &str) -> Arc<NormalizedBundlerOptions> {
    Arc::new(NormalizedBundlerOptions {
      standalone: standalone.map(ToString::to_string),
      external_require_name: external_require_name.to_string(),
      ..NormalizedBundlerOptions::default()
    })
  }

  fn drain(wrapper: &mut OutputWrapper, chunks: &[&str]) -> String {
    let mut cx = cx();
    let mut out = Vec::new();
    for chunk in chunks {
      for piece in wrapper.process(chunk.as_bytes().to_vec(), &mut cx).unwrap() {
        out.extend(piece);
      }
    }
    for piece in wrapper.finish(&mut cx).unwrap() {
      out.extend(piece);
    }
    String::from_utf8(out).unwrap()
  }

  #[test]
  fn standalone_takes_precedence_and_closes_the_factory() {
    let exports = ExportsTracker::default();
    exports.mark();
    let mut wrapper = OutputWrapper::new(&options(Some("Foo"), "require"), exports);
    let out = drain(&mut wrapper, &["(expr)", "(more)"]);

    assert!(out.starts_with("(function(f){"));
    assert!(out.contains("return (expr)(more)"));
    assert!(out.ends_with("\n});"));
  }

  #[test]
  fn accumulated_exports_prefix_only_the_first_chunk() {
    let exports = ExportsTracker::default();
    exports.mark();
    let mut wrapper = OutputWrapper::new(&options(None, "require"), exports);

    assert_eq!(drain(&mut wrapper, &["(a)", "(b)"]), "require=(a)(b)");
  }

  #[test]
  fn no_exports_means_no_prefix() {
    let mut wrapper = OutputWrapper::new(&options(None, "require"), ExportsTracker::default());

    assert_eq!(drain(&mut wrapper, &["(a)", "(b)"]), "(a)(b)");
  }

  #[test]
  fn the_external_require_name_is_configurable() {
    let exports = ExportsTracker::default();
    exports.mark();
    let mut wrapper = OutputWrapper::new(&options(None, "loadDep"), exports);

    assert_eq!(drain(&mut wrapper, &["(a)"]), "loadDep=(a)");
  }
}
