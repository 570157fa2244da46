//! UMD wrapper text for standalone bundles.
//!
//! `prelude` opens a factory that registers its return value as a CommonJS
//! export, an AMD module, or a property on the detected global, in that
//! order. The wrap stage splices `return <loader expression>` between the
//! two halves, so the packaged loader becomes the library value.

use packline_utils::concat_string;
use packline_utils::ecmascript::{legalize_identifier, property_access_str};

/// Everything up to and including the opening of the factory function body.
pub fn prelude(name: &str) -> String {
  concat_string!(
    "(function(f){if(typeof exports===\"object\"&&typeof module!==\"undefined\")\
     {module.exports=f()}else if(typeof define===\"function\"&&define.amd)\
     {define([],f)}else{var g;if(typeof window!==\"undefined\"){g=window}\
     else if(typeof global!==\"undefined\"){g=global}\
     else if(typeof self!==\"undefined\"){g=self}else{g=this}",
    global_assignment(name),
    "=f()}})(function(){"
  )
}

/// Closes the factory opened by [`prelude`].
pub fn postlude() -> &'static str {
  "\n});"
}

/// Assignment target for the no-module-system branch. Dots in the name
/// become a namespace chain: `A.B` assigns to `g.A.B`, creating `g.A` when
/// missing.
fn global_assignment(name: &str) -> String {
  let mut parts = name.split('.').map(legalize_identifier);
  let first = parts.next().unwrap_or_else(|| "_".to_string());
  let mut setup = String::new();
  let mut target = String::from("g");
  let mut current = first;
  for next in parts {
    let step = property_access_str(&target, &current);
    setup.push_str(&concat_string!(step, "=", step, "||{};"));
    target = step;
    current = next;
  }
  concat_string!(setup, property_access_str(&target, &current))
}

#[cfg(test)]
mod tests {
  use super::{global_assignment, postlude, prelude};

  #[test]
  fn prelude_opens_a_factory_expression() {
    let text = prelude("Foo");
    assert!(text.starts_with("(function(f){"));
    assert!(text.contains("module.exports=f()"));
    assert!(text.contains("define([],f)"));
    assert!(text.contains("g.Foo=f()"));
    assert!(text.ends_with("(function(){"));
  }

  #[test]
  fn postlude_closes_the_factory() {
    assert_eq!(postlude(), "\n});");
  }

  #[test]
  fn dotted_names_become_namespace_chains() {
    assert_eq!(global_assignment("A.B"), "g.A=g.A||{};g.A.B");
  }

  #[test]
  fn names_are_legalized_before_assignment() {
    assert_eq!(global_assignment("my-lib"), "g.my_lib");
  }
}
