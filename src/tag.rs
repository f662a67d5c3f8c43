use ahash::AHashMap;

use crate::error::ShaderCompileError;

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ THE STRUCTURED TAG MODEL ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// A generic structured value: nested maps, lists and primitives. This is
/// the cache-file and IPC payload shape the IR round-trips through. Map
/// entry order carries no meaning.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
  Int(i64),
  Float(f64),
  Bool(bool),
  Str(String),
  List(Vec<Tag>),
  Map(AHashMap<String, Tag>),
}

impl Tag {
  pub fn str(value: &str) -> Tag {
    Tag::Str(value.to_owned())
  }

  /// A map tag built from key/value pairs, for terse encoder code.
  pub fn map<const N: usize>(entries: [(&str, Tag); N]) -> Tag {
    Tag::Map(entries.into_iter().map(|(k, v)| (k.to_owned(), v)).collect())
  }

  // accessors below fail with a `MalformedArtifact` naming what was
  // expected, so a reader aborts with a useful message instead of a panic

  pub fn as_int(&self, what: &str) -> Result<i64, ShaderCompileError> {
    match self {
      Tag::Int(v) => Ok(*v),
      _ => Err(ShaderCompileError::malformed(format!("expected integer for {what}"))),
    }
  }

  pub fn as_float(&self, what: &str) -> Result<f64, ShaderCompileError> {
    match self {
      Tag::Float(v) => Ok(*v),
      _ => Err(ShaderCompileError::malformed(format!("expected float for {what}"))),
    }
  }

  pub fn as_bool(&self, what: &str) -> Result<bool, ShaderCompileError> {
    match self {
      Tag::Bool(v) => Ok(*v),
      _ => Err(ShaderCompileError::malformed(format!("expected bool for {what}"))),
    }
  }

  pub fn as_str(&self, what: &str) -> Result<&str, ShaderCompileError> {
    match self {
      Tag::Str(v) => Ok(v),
      _ => Err(ShaderCompileError::malformed(format!("expected string for {what}"))),
    }
  }

  pub fn as_list(&self, what: &str) -> Result<&[Tag], ShaderCompileError> {
    match self {
      Tag::List(v) => Ok(v),
      _ => Err(ShaderCompileError::malformed(format!("expected list for {what}"))),
    }
  }

  pub fn as_map(&self, what: &str) -> Result<&AHashMap<String, Tag>, ShaderCompileError> {
    match self {
      Tag::Map(v) => Ok(v),
      _ => Err(ShaderCompileError::malformed(format!("expected map for {what}"))),
    }
  }

  /// Required-field lookup on a map tag.
  pub fn field(&self, name: &str) -> Result<&Tag, ShaderCompileError> {
    self
      .as_map(name)?
      .get(name)
      .ok_or_else(|| ShaderCompileError::malformed(format!("missing field '{name}'")))
  }

  /// Optional-field lookup on a map tag: absent is `None`, a present value
  /// is handed through for decoding.
  pub fn field_opt(&self, name: &str) -> Result<Option<&Tag>, ShaderCompileError> {
    Ok(self.as_map(name)?.get(name))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn map_entry_order_is_irrelevant() {
    let a = Tag::map([("x", Tag::Int(1)), ("y", Tag::Int(2))]);
    let b = Tag::map([("y", Tag::Int(2)), ("x", Tag::Int(1))]);
    assert_eq!(a, b);
  }

  #[test]
  fn missing_field_fails_with_its_name() {
    let tag = Tag::map([("x", Tag::Int(1))]);
    let err = tag.field("y").unwrap_err();
    assert!(matches!(err, ShaderCompileError::MalformedArtifact { detail } if detail.contains("'y'")));
  }

  #[test]
  fn accessors_reject_mistyped_values() {
    assert!(Tag::Int(3).as_str("anything").is_err());
    assert!(Tag::str("3").as_int("anything").is_err());
  }
}
