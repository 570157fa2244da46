use sugar_path::SugarPath;

pub trait PathExt {
  fn expect_to_slash(&self) -> String;

  /// Lexically normalized, forward-slash rendition of the path. Lets module
  /// table keys written in different but equivalent spellings (`./a.js`,
  /// `a.js`, `lib/../a.js`) compare equal.
  fn normalized_slash(&self) -> String;
}

impl PathExt for std::path::Path {
  fn expect_to_slash(&self) -> String {
    self
      .to_slash()
      .unwrap_or_else(|| panic!("Failed to convert {:?} to slash str", self.display()))
      .into_owned()
  }

  fn normalized_slash(&self) -> String {
    self.normalize().expect_to_slash()
  }
}

#[test]
fn test_normalized_slash() {
  use std::path::Path;

  assert_eq!(Path::new("./lib/a.js").normalized_slash(), "lib/a.js");
  assert_eq!(Path::new("lib/../a.js").normalized_slash(), "a.js");
  assert_eq!(Path::new("a.js").normalized_slash(), "a.js");
}
