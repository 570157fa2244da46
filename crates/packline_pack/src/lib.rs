//! Default pack stage: serializes the ordered, labeled rows into one
//! self-contained CommonJS-style module-loader expression.
//!
//! Output shape: `PRELUDE({ id: [body, deps], ... }, {}, [entry ids])`.
//! The whole artifact stays a single expression so the wrap stage can turn
//! it into an assignment or a UMD factory return value by prefixing text.

use packline_common::{Chunk, ChunkBatch, PackStage, Row, RowId, StageContext};
use packline_error::{BuildError, BuildResult};
use packline_utils::concat_string;
use rustc_hash::FxHashSet;
use smallvec::smallvec;

/// Module loader applied to the module map, the module cache, and the entry
/// id list; evaluates to the inner require function.
const PRELUDE: &str = "(function(){function outer(modules,cache,entries){function req(id){if(!cache[id]){if(!modules[id]){throw new Error(\"Cannot find module '\"+id+\"'\")}var m=cache[id]={exports:{}};modules[id][0].call(m.exports,function(spec){var mapped=modules[id][1][spec];return req(mapped!==undefined?mapped:spec)},m,m.exports)}return cache[id].exports}for(var i=0;i<entries.length;i++)req(entries[i]);return req}return outer})()";

#[derive(Default)]
pub struct JsPacker {
  opened: bool,
  entries: Vec<RowId>,
  seen: FxHashSet<RowId>,
}

fn render_id(id: &RowId) -> String {
  match id {
    RowId::Name(name) => {
      serde_json::to_string(name.as_str()).expect("strings always serialize")
    }
    RowId::Idx(idx) => itoa::Buffer::new().format(idx.raw()).to_string(),
  }
}

fn render_row(row: &Row) -> String {
  let mut out = concat_string!(render_id(&row.id), ":[function(require,module,exports){\n");
  out.push_str(&row.source);
  if let Some(source_file) = &row.source_file {
    out.push_str("\n//# sourceURL=");
    if let Some(source_root) = &row.source_root {
      out.push_str(source_root);
      out.push('/');
    }
    out.push_str(source_file);
  }
  out.push_str("\n},{");
  for (position, (specifier, target)) in row.deps.iter().enumerate() {
    if position > 0 {
      out.push(',');
    }
    out.push_str(
      &serde_json::to_string(specifier.as_str()).expect("strings always serialize"),
    );
    out.push(':');
    out.push_str(&render_id(target));
  }
  out.push_str("}]");
  out
}

impl JsPacker {
  fn render_entries(&self) -> String {
    let mut out = String::from("[");
    for (position, id) in self.entries.iter().enumerate() {
      if position > 0 {
        out.push(',');
      }
      out.push_str(&render_id(id));
    }
    out.push(']');
    out
  }
}

impl PackStage for JsPacker {
  fn process(&mut self, row: Row, _cx: &mut StageContext) -> BuildResult<ChunkBatch> {
    if !self.seen.insert(row.id.clone()) {
      return Err(BuildError::msg(format!(
        "duplicate row id '{}' ({})",
        row.id,
        row.debug_handle()
      )));
    }
    if row.entry {
      self.entries.push(row.id.clone());
    }

    let mut chunk = if self.opened { String::from(",\n") } else { concat_string!(PRELUDE, "({\n") };
    self.opened = true;
    chunk.push_str(&render_row(&row));
    Ok(smallvec![Chunk::from(chunk.into_bytes())])
  }

  fn finish(&mut self, _cx: &mut StageContext) -> BuildResult<ChunkBatch> {
    let tail = if self.opened {
      concat_string!("\n},{},", self.render_entries(), ")")
    } else {
      concat_string!(PRELUDE, "({},{},", self.render_entries(), ")")
    };
    Ok(smallvec![Chunk::from(tail.into_bytes())])
  }
}
