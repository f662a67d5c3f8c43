use thiserror::Error;

use crate::parse_tree::NodeInfo;

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ DEFINE CUSTOM ERROR ENUMS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// All the ways a compilation unit can fail. Every variant aborts the whole
/// compilation at the point of detection; no partial `CompiledShader` is ever
/// returned and nothing is silently repaired.
///
/// Variants raised while walking the parse tree carry the offending node's
/// position and text so the caller can point at the source.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum ShaderCompileError {
  #[error("unknown type name '{name}' at line {}, column {}", .at.line_col.0, .at.line_col.1)]
  InvalidTypeName { name: String, at: NodeInfo },

  #[error("unknown precision qualifier '{name}' at line {}, column {}", .at.line_col.0, .at.line_col.1)]
  InvalidPrecisionName { name: String, at: NodeInfo },

  #[error("array length '{}' at line {}, column {} is not a non-negative integer constant", .at.text, .at.line_col.0, .at.line_col.1)]
  InvalidArrayLength { at: NodeInfo },

  #[error("'{name}' is already declared in this scope (line {}, column {})", .at.line_col.0, .at.line_col.1)]
  DuplicateDeclaration { name: String, at: NodeInfo },

  #[error("'{name}' is not defined (line {}, column {})", .at.line_col.0, .at.line_col.1)]
  UndefinedIdentifier { name: String, at: NodeInfo },

  #[error("no function matches '{signature}' at line {}, column {}", .at.line_col.0, .at.line_col.1)]
  UnresolvedFunction { signature: String, at: NodeInfo },

  #[error("call '{signature}' at line {}, column {} matches more than one overload", .at.line_col.0, .at.line_col.1)]
  AmbiguousFunction { signature: String, at: NodeInfo },

  #[error("type mismatch at line {}, column {}: {detail}", .at.line_col.0, .at.line_col.1)]
  TypeMismatch { detail: String, at: NodeInfo },

  #[error("branches at line {}, column {} declare conflicting variables", .at.line_col.0, .at.line_col.1)]
  ScopeMismatch { at: NodeInfo },

  #[error("uniform slot {index} is claimed twice")]
  UniformIndexCollision { index: usize },

  #[error("malformed serialized shader: {detail}")]
  MalformedArtifact { detail: String },
}

impl ShaderCompileError {
  /// A `TypeMismatch` with a prebuilt detail string, for the common case of
  /// operand types that do not line up.
  pub fn mismatch(detail: impl Into<String>, at: &NodeInfo) -> Self {
    ShaderCompileError::TypeMismatch { detail: detail.into(), at: at.clone() }
  }

  /// A `MalformedArtifact` naming the field that failed to read.
  pub fn malformed(detail: impl Into<String>) -> Self {
    ShaderCompileError::MalformedArtifact { detail: detail.into() }
  }
}
