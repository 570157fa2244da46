use packline_common::{BundlerOptions, NormalizedBundlerOptions, DEFAULT_EXTENSIONS};

pub fn normalize_options(raw_options: BundlerOptions) -> NormalizedBundlerOptions {
  let mut extensions: Vec<String> =
    DEFAULT_EXTENSIONS.iter().map(|ext| (*ext).to_string()).collect();
  extensions.extend(raw_options.extensions.unwrap_or_default());

  NormalizedBundlerOptions {
    entries: raw_options.entries.unwrap_or_default(),
    require: raw_options.require.unwrap_or_default(),
    modules: raw_options.modules.unwrap_or_default(),
    extensions,
    exports: raw_options.exports,
    standalone: raw_options.standalone,
    external_require_name: raw_options
      .external_require_name
      .unwrap_or_else(|| "require".to_string()),
    debug: raw_options.debug.unwrap_or(false),
  }
}

#[test]
fn caller_extensions_come_after_the_defaults() {
  let normalized = normalize_options(BundlerOptions {
    extensions: Some(vec![".coffee".to_string()]),
    ..BundlerOptions::default()
  });

  assert_eq!(normalized.extensions, vec![".js", ".json", ".coffee"]);
  assert_eq!(normalized.external_require_name, "require");
}
