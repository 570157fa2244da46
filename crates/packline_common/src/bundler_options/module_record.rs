use arcstr::ArcStr;

/// Source of one module made available to the default resolve stage.
///
/// The bundler core never touches the file system; callers register module
/// bodies and their immediate dependency specifiers up front and the
/// resolve stage walks the graph from there.
#[derive(Debug, Default, Clone)]
pub struct ModuleRecord {
  pub file: ArcStr,
  pub source: ArcStr,
  /// Specifiers this module requires, verbatim.
  pub deps: Vec<ArcStr>,
}

impl ModuleRecord {
  pub fn new(file: impl Into<ArcStr>, source: impl Into<ArcStr>) -> Self {
    Self { file: file.into(), source: source.into(), deps: Vec::new() }
  }

  pub fn dep(mut self, specifier: impl Into<ArcStr>) -> Self {
    self.deps.push(specifier.into());
    self
  }
}
