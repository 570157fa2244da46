pub mod input_item;
pub mod module_record;
pub mod normalized_bundler_options;

use crate::{InputItem, ModuleRecord};

/// Resolvable suffixes tried by the default resolve stage, always ahead of
/// any caller supplied extensions.
pub const DEFAULT_EXTENSIONS: [&str; 2] = [".js", ".json"];

#[derive(Default, Debug, Clone)]
pub struct BundlerOptions {
  // --- Input
  /// Modules whose code runs as soon as the bundle loads.
  pub entries: Option<Vec<InputItem>>,
  /// Modules packaged without being auto-executed.
  pub require: Option<Vec<InputItem>>,
  /// The in-memory module table the default resolve stage draws from.
  pub modules: Option<Vec<ModuleRecord>>,
  /// Extra resolvable suffixes, appended after [`DEFAULT_EXTENSIONS`].
  pub extensions: Option<Vec<String>>,

  // --- Output
  /// When set (to either value), suppresses the automatic detection of
  /// whether the bundle must export its require function.
  pub exports: Option<bool>,
  /// Expose the bundle as a standalone library under this name.
  pub standalone: Option<String>,
  /// Binding the packaged require function is assigned to when the bundle
  /// auto-exports and no standalone name is set.
  pub external_require_name: Option<String>,
  /// Attach source-map friendly path metadata to every row.
  pub debug: Option<bool>,
}

impl BundlerOptions {
  /// Field-wise merge for `reset`: anything set in `overrides` wins over
  /// the original construction options.
  pub fn merge(self, overrides: Self) -> Self {
    Self {
      entries: overrides.entries.or(self.entries),
      require: overrides.require.or(self.require),
      modules: overrides.modules.or(self.modules),
      extensions: overrides.extensions.or(self.extensions),
      exports: overrides.exports.or(self.exports),
      standalone: overrides.standalone.or(self.standalone),
      external_require_name: overrides.external_require_name.or(self.external_require_name),
      debug: overrides.debug.or(self.debug),
    }
  }
}
