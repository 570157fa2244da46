use crate::{InputItem, ModuleRecord};

/// [`crate::BundlerOptions`] with every default applied. One frozen copy is
/// shared per pipeline, so later mutation of the caller's raw options never
/// reaches an in-flight run.
#[derive(Debug, Default)]
pub struct NormalizedBundlerOptions {
  pub entries: Vec<InputItem>,
  pub require: Vec<InputItem>,
  pub modules: Vec<ModuleRecord>,
  /// Default extensions first, caller extensions after.
  pub extensions: Vec<String>,
  pub exports: Option<bool>,
  pub standalone: Option<String>,
  pub external_require_name: String,
  pub debug: bool,
}
