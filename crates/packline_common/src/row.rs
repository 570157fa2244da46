use arcstr::ArcStr;
use packline_utils::indexmap::FxIndexMap;

use crate::{RowId, RowIdx};

/// One module descriptor flowing through the bundle pipeline.
///
/// This is the wire shape shared with the external collaborators: the
/// resolve stage produces fully populated rows, the pack stage consumes
/// them. `deps` maps dependency specifiers to raw ids until the label stage
/// swaps in the pre-resolved `index_deps`.
#[derive(Debug, Clone)]
pub struct Row {
  pub id: RowId,
  pub file: Option<ArcStr>,
  pub index: Option<RowIdx>,
  pub entry: bool,
  pub expose: Option<ArcStr>,
  pub source: ArcStr,
  pub deps: FxIndexMap<ArcStr, RowId>,
  pub index_deps: Option<FxIndexMap<ArcStr, RowIdx>>,
  pub source_root: Option<ArcStr>,
  pub source_file: Option<ArcStr>,
}

impl Row {
  /// A file-backed row; the id defaults to the file itself.
  pub fn from_file(file: impl Into<ArcStr>) -> Self {
    let file = file.into();
    Self::with_id(RowId::Name(file.clone()), Some(file))
  }

  /// A virtual row that carries its own body and is addressed purely by id.
  pub fn from_source(id: impl Into<ArcStr>, source: impl Into<ArcStr>) -> Self {
    let mut row = Self::with_id(RowId::Name(id.into()), None);
    row.source = source.into();
    row
  }

  fn with_id(id: RowId, file: Option<ArcStr>) -> Self {
    Self {
      id,
      file,
      index: None,
      entry: false,
      expose: None,
      source: ArcStr::new(),
      deps: FxIndexMap::default(),
      index_deps: None,
      source_root: None,
      source_file: None,
    }
  }

  /// Alias this row so other modules can require it by name. The alias
  /// replaces the file path as the row's id, which also exempts the row
  /// from index labeling.
  pub fn expose(mut self, name: impl Into<ArcStr>) -> Self {
    let name = name.into();
    self.id = RowId::Name(name.clone());
    self.expose = Some(name);
    self
  }

  pub fn entry(mut self, entry: bool) -> Self {
    self.entry = entry;
    self
  }

  /// Declare a dependency of a virtual row: `specifier` resolves to the
  /// module registered under `target`.
  pub fn dep(mut self, specifier: impl Into<ArcStr>, target: impl Into<ArcStr>) -> Self {
    self.deps.insert(specifier.into(), RowId::Name(target.into()));
    self
  }

  /// True while the row is still identified by its own file path, i.e. it
  /// was never given an explicit alias.
  pub fn uses_file_id(&self) -> bool {
    match (&self.id, &self.file) {
      (RowId::Name(name), Some(file)) => name == file,
      _ => false,
    }
  }

  /// Human-readable handle for diagnostics: the file if known, the id
  /// otherwise.
  pub fn debug_handle(&self) -> String {
    self.file.as_ref().map_or_else(|| self.id.to_string(), ToString::to_string)
  }
}

impl From<&str> for Row {
  fn from(file: &str) -> Self {
    Self::from_file(file)
  }
}

impl From<String> for Row {
  fn from(file: String) -> Self {
    Self::from_file(file)
  }
}

impl From<ArcStr> for Row {
  fn from(file: ArcStr) -> Self {
    Self::from_file(file)
  }
}
