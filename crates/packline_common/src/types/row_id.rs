use std::fmt;

use arcstr::ArcStr;

use crate::RowIdx;

/// Identifier a module is addressable by at runtime.
///
/// A row starts out named after its file path (or a caller supplied alias)
/// and is rewritten to its dense index by the label stage, unless the row
/// was exposed under an explicit name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowId {
  Name(ArcStr),
  Idx(RowIdx),
}

impl RowId {
  pub fn as_name(&self) -> Option<&ArcStr> {
    match self {
      Self::Name(name) => Some(name),
      Self::Idx(_) => None,
    }
  }

  pub fn is_name(&self, name: &str) -> bool {
    matches!(self, Self::Name(own) if own == name)
  }
}

impl fmt::Display for RowId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Name(name) => write!(f, "{name}"),
      Self::Idx(idx) => write!(f, "{}", idx.raw()),
    }
  }
}

impl From<ArcStr> for RowId {
  fn from(name: ArcStr) -> Self {
    Self::Name(name)
  }
}

impl From<RowIdx> for RowId {
  fn from(idx: RowIdx) -> Self {
    Self::Idx(idx)
  }
}
