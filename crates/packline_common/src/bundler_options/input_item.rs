use std::borrow::Cow;

/// One entry or require request supplied through the options.
#[derive(Debug, Default, Clone)]
pub struct InputItem {
  /// Alias other modules can require this one by.
  pub expose: Option<String>,
  pub import: String,
}

impl From<&str> for InputItem {
  fn from(value: &str) -> Self {
    Self { expose: None, import: value.to_string() }
  }
}

impl From<String> for InputItem {
  fn from(value: String) -> Self {
    Self { expose: None, import: value }
  }
}

impl From<Cow<'_, str>> for InputItem {
  fn from(value: Cow<'_, str>) -> Self {
    Self { expose: None, import: value.to_string() }
  }
}
