use crate::concat_string;

pub fn is_identifier_name(name: &str) -> bool {
  let mut chars = name.chars();
  let Some(first) = chars.next() else {
    return false;
  };
  if !(first.is_ascii_alphabetic() || matches!(first, '_' | '$')) {
    return false;
  }
  chars.all(|char| char.is_ascii_alphanumeric() || matches!(char, '_' | '$'))
}

/// Rewrite an arbitrary name into a valid JS identifier. Invalid characters
/// become `_`; a leading digit gets an underscore prefix.
pub fn legalize_identifier(name: &str) -> String {
  let mut legalized = String::with_capacity(name.len());
  for (index, char) in name.chars().enumerate() {
    if char.is_ascii_alphanumeric() || matches!(char, '_' | '$') {
      if index == 0 && char.is_ascii_digit() {
        legalized.push('_');
      }
      legalized.push(char);
    } else {
      legalized.push('_');
    }
  }
  if legalized.is_empty() {
    legalized.push('_');
  }
  legalized
}

pub fn property_access_str(obj: &str, prop: &str) -> String {
  if is_identifier_name(prop) {
    concat_string!(obj, ".", prop)
  } else {
    concat_string!(obj, "[", serde_json::to_string(prop).unwrap(), "]")
  }
}

#[test]
fn test_is_identifier_name() {
  assert!(is_identifier_name("foo"));
  assert!(is_identifier_name("$loader_2"));
  assert!(!is_identifier_name("1aaaa"));
  assert!(!is_identifier_name("a-b"));
  assert!(!is_identifier_name(""));
}

#[test]
fn test_legalize_identifier() {
  assert_eq!(legalize_identifier("my-lib"), "my_lib");
  assert_eq!(legalize_identifier("3d"), "_3d");
  assert_eq!(legalize_identifier("ok$"), "ok$");
}

#[test]
fn test_property_access_str() {
  assert_eq!(property_access_str("g", "Foo"), "g.Foo");
  assert_eq!(property_access_str("g", "my-lib"), "g[\"my-lib\"]");
}
