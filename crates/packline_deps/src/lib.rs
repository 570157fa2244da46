//! Default resolve stage: expands the rows written by the caller into the
//! full transitive module set.
//!
//! Resolution is purely tabular. Callers register every module body up
//! front ([`ModuleRecord`]) and the stage walks declared specifiers from
//! there, assigning each discovered module a dense index in discovery
//! order. File-system walking and source parsing live outside this
//! workspace; a resolver that performs either can be spliced into the
//! `deps` slot of the pipeline.

use std::collections::VecDeque;
use std::path::Path;

use arcstr::ArcStr;
use packline_common::{
  ModuleRecord, NormalizedBundlerOptions, Row, RowBatch, RowId, RowIdx, RowStage, StageContext,
};
use packline_error::{BuildError, BuildResult};
use packline_utils::concat_string;
use packline_utils::indexmap::FxIndexMap;
use packline_utils::path_ext::PathExt;
use rustc_hash::FxHashMap;

pub struct GraphResolver {
  table: FxIndexMap<ArcStr, ModuleRecord>,
  /// Normalized spelling of every table key, mapped back to the canonical
  /// one, so `./a.js` and `lib/../a.js` find the same record.
  normalized: FxHashMap<String, ArcStr>,
  extensions: Vec<String>,
  /// Identity of every row handed out so far. Keyed by canonical file for
  /// file-backed rows and by id for virtual rows.
  discovered: FxHashMap<ArcStr, RowIdx>,
  next_index: u32,
}

impl GraphResolver {
  pub fn new(options: &NormalizedBundlerOptions) -> Self {
    let mut table = FxIndexMap::default();
    let mut normalized = FxHashMap::default();
    for record in &options.modules {
      normalized.insert(Path::new(record.file.as_str()).normalized_slash(), record.file.clone());
      if table.insert(record.file.clone(), record.clone()).is_some() {
        log::warn!("module table registers '{}' twice, keeping the later record", record.file);
      }
    }
    Self {
      table,
      normalized,
      extensions: options.extensions.clone(),
      discovered: FxHashMap::default(),
      next_index: 0,
    }
  }

  fn alloc_index(&mut self, key: &ArcStr) -> RowIdx {
    let idx = RowIdx::from_raw(self.next_index);
    self.next_index += 1;
    self.discovered.insert(key.clone(), idx);
    idx
  }

  /// Resolve a specifier to the canonical key of a table record: exact
  /// match first, then with each configured extension appended, then the
  /// same two trials on the normalized spelling (joined against the
  /// importer's directory for relative specifiers).
  fn resolve_specifier(&self, specifier: &str, importer: Option<&ArcStr>) -> Option<ArcStr> {
    if let Some((key, _)) = self.table.get_key_value(specifier) {
      return Some(key.clone());
    }
    for ext in &self.extensions {
      if let Some((key, _)) = self.table.get_key_value(concat_string!(specifier, ext).as_str()) {
        return Some(key.clone());
      }
    }

    let joined = match importer {
      Some(from) if specifier.starts_with('.') => {
        Path::new(from.as_str()).parent().unwrap_or_else(|| Path::new("")).join(specifier)
      }
      _ => Path::new(specifier).to_path_buf(),
    };
    let normalized = joined.normalized_slash();
    if let Some(key) = self.normalized.get(&normalized) {
      return Some(key.clone());
    }
    for ext in &self.extensions {
      if let Some(key) = self.normalized.get(&concat_string!(normalized, ext)) {
        return Some(key.clone());
      }
    }
    None
  }

  fn admit_input(
    &mut self,
    mut row: Row,
    queue: &mut VecDeque<ArcStr>,
    out: &mut RowBatch,
  ) -> BuildResult<()> {
    if let Some(file) = row.file.clone() {
      let canonical = match self.resolve_specifier(&file, None) {
        Some(canonical) => canonical,
        // A file row carrying its own body needs no table record.
        None if !row.source.is_empty() => file.clone(),
        None => {
          return Err(BuildError::msg(format!("Cannot find module '{file}'")));
        }
      };
      if canonical != file {
        if row.uses_file_id() {
          row.id = RowId::Name(canonical.clone());
        }
        row.file = Some(canonical.clone());
      }
      if self.discovered.contains_key(&canonical) {
        log::debug!("skipping duplicate require of '{canonical}'");
        return Ok(());
      }
      row.index = Some(self.alloc_index(&canonical));
      if row.source.is_empty() {
        if let Some(record) = self.table.get(&canonical) {
          row.source = record.source.clone();
        }
      }
      let declared = if row.deps.is_empty() {
        self
          .table
          .get(&canonical)
          .map(|record| record.deps.iter().map(|dep| (dep.clone(), None)).collect())
          .unwrap_or_default()
      } else {
        declared_of(&row)
      };
      self.link_deps(&mut row, declared, queue)?;
      out.push(row);
    } else {
      let key = match &row.id {
        RowId::Name(name) => name.clone(),
        RowId::Idx(idx) => {
          return Err(BuildError::msg(format!("virtual row written with numeric id {idx:?}")));
        }
      };
      if self.discovered.contains_key(&key) {
        return Err(BuildError::msg(format!("duplicate row id '{key}'")));
      }
      row.index = Some(self.alloc_index(&key));
      let declared = declared_of(&row);
      self.link_deps(&mut row, declared, queue)?;
      out.push(row);
    }
    Ok(())
  }

  fn link_deps(
    &mut self,
    row: &mut Row,
    declared: Vec<(ArcStr, Option<ArcStr>)>,
    queue: &mut VecDeque<ArcStr>,
  ) -> BuildResult<()> {
    let importer = row.file.clone();
    let mut deps = FxIndexMap::default();
    let mut index_deps = FxIndexMap::default();
    let mut errors = Vec::new();

    for (specifier, declared_target) in declared {
      let raw = declared_target.as_ref().unwrap_or(&specifier);
      let (target, idx) = match self.resolve_specifier(raw, importer.as_ref()) {
        Some(file) => {
          let idx = match self.discovered.get(&file) {
            Some(idx) => *idx,
            None => {
              let idx = self.alloc_index(&file);
              queue.push_back(file.clone());
              idx
            }
          };
          (file, idx)
        }
        // A previously written virtual row, addressable only by its id.
        None => match self.discovered.get_key_value(raw.as_str()) {
          Some((key, idx)) => (key.clone(), *idx),
          None => {
            errors.push(anyhow::anyhow!(
              "Cannot find module '{specifier}' from '{}'",
              row.debug_handle()
            ));
            continue;
          }
        },
      };
      deps.insert(specifier.clone(), RowId::Name(target));
      index_deps.insert(specifier, idx);
    }

    if !errors.is_empty() {
      return Err(errors.into());
    }
    row.deps = deps;
    row.index_deps = Some(index_deps);
    Ok(())
  }
}

fn declared_of(row: &Row) -> Vec<(ArcStr, Option<ArcStr>)> {
  row
    .deps
    .iter()
    .map(|(specifier, target)| (specifier.clone(), target.as_name().cloned()))
    .collect()
}

impl RowStage for GraphResolver {
  fn process(&mut self, row: Row, _cx: &mut StageContext) -> BuildResult<RowBatch> {
    let mut out = RowBatch::new();
    let mut queue = VecDeque::new();
    self.admit_input(row, &mut queue, &mut out)?;

    while let Some(file) = queue.pop_front() {
      let record =
        self.table.get(&file).cloned().expect("queued files come from the module table");
      let mut dep_row = Row::from_file(file.clone());
      dep_row.index = self.discovered.get(&file).copied();
      dep_row.source = record.source;
      let declared = record.deps.iter().map(|dep| (dep.clone(), None)).collect();
      self.link_deps(&mut dep_row, declared, &mut queue)?;
      out.push(dep_row);
    }
    Ok(out)
  }
}
