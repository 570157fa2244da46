use std::fmt;
use std::ops::{Deref, DerefMut};

/// Aggregate of everything that went wrong during one bundle run.
///
/// A single pipeline stage may report several causes at once (the resolve
/// stage collects one error per unresolvable specifier before giving up),
/// so the carrier is a list rather than a single error.
#[derive(Debug)]
pub struct BuildError(pub Vec<anyhow::Error>);

pub type BuildResult<T> = anyhow::Result<T, BuildError>;

impl BuildError {
  /// A single-cause error from a plain message. Used for usage errors that
  /// are raised synchronously, before any stream activity.
  pub fn msg(message: impl Into<String>) -> Self {
    let message: String = message.into();
    Self(vec![anyhow::anyhow!(message)])
  }

  pub fn into_inner(self) -> Vec<anyhow::Error> {
    self.0
  }
}

impl Deref for BuildError {
  type Target = Vec<anyhow::Error>;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl DerefMut for BuildError {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.0
  }
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (index, error) in self.0.iter().enumerate() {
      if index > 0 {
        writeln!(f)?;
      }
      write!(f, "{error}")?;
    }
    Ok(())
  }
}

impl From<anyhow::Error> for BuildError {
  fn from(error: anyhow::Error) -> Self {
    Self(vec![error])
  }
}

impl From<Vec<anyhow::Error>> for BuildError {
  fn from(errors: Vec<anyhow::Error>) -> Self {
    Self(errors)
  }
}

impl IntoIterator for BuildError {
  type Item = anyhow::Error;
  type IntoIter = std::vec::IntoIter<anyhow::Error>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.into_iter()
  }
}
