use std::fmt;
use std::str::FromStr;

use strum::{Display, EnumIter, EnumString};

use crate::error::ShaderCompileError;
use crate::parse_tree::{Declarator, DeclaratorNode, ExportedTypeNode, Token};

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ WHAT IS A TYPE? ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// GPU numeric precision qualifier. Defaults to `Mediump` wherever the
/// source omits a precision specifier.
#[derive(Display, EnumString, Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Precision {
  #[strum(serialize = "lowp")]
  Lowp,
  #[strum(serialize = "mediump")]
  #[default]
  Mediump,
  #[strum(serialize = "highp")]
  Highp,
}

/// The closed set of scalar, vector, matrix and sampler type names the
/// language knows. The strum derives are the single name <-> enum mapping;
/// both type resolution and serialization go through them.
#[derive(Display, EnumString, EnumIter, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Types {
  #[strum(serialize = "bool")]
  Bool,
  #[strum(serialize = "int")]
  Int,
  #[strum(serialize = "float")]
  Float,
  #[strum(serialize = "vec2")]
  Vec2,
  #[strum(serialize = "vec3")]
  Vec3,
  #[strum(serialize = "vec4")]
  Vec4,
  #[strum(serialize = "ivec2")]
  IVec2,
  #[strum(serialize = "ivec3")]
  IVec3,
  #[strum(serialize = "ivec4")]
  IVec4,
  #[strum(serialize = "mat2")]
  Mat2,
  #[strum(serialize = "mat3")]
  Mat3,
  #[strum(serialize = "mat4")]
  Mat4,
  #[strum(serialize = "sampler2D")]
  Sampler2D,
  #[strum(serialize = "samplerCube")]
  SamplerCube,
}

impl Types {
  /// Resolve a type-specifier token to a `Types` value. This is the single
  /// place an unrecognized type name becomes a compile error.
  pub fn resolve(tok: &Token) -> Result<Types, ShaderCompileError> {
    Types::from_str(tok.text()).map_err(|_| ShaderCompileError::InvalidTypeName {
      name: tok.text().to_owned(),
      at: tok.info.clone(),
    })
  }

  /// Number of components for vector types, `None` for everything else.
  pub fn vector_size(&self) -> Option<usize> {
    match self {
      Types::Vec2 | Types::IVec2 => Some(2),
      Types::Vec3 | Types::IVec3 => Some(3),
      Types::Vec4 | Types::IVec4 => Some(4),
      _ => None,
    }
  }

  /// The scalar type of a vector's components, or of the scalar itself.
  pub fn component_type(&self) -> Option<Types> {
    match self {
      Types::Float | Types::Vec2 | Types::Vec3 | Types::Vec4 => Some(Types::Float),
      Types::Int | Types::IVec2 | Types::IVec3 | Types::IVec4 => Some(Types::Int),
      Types::Bool => Some(Types::Bool),
      _ => None,
    }
  }

  /// The vector (or scalar, for size one) of `size` components over the
  /// given scalar. Only float and int vectors exist.
  pub fn vector_of(scalar: Types, size: usize) -> Option<Types> {
    match (scalar, size) {
      (Types::Float, 1) => Some(Types::Float),
      (Types::Float, 2) => Some(Types::Vec2),
      (Types::Float, 3) => Some(Types::Vec3),
      (Types::Float, 4) => Some(Types::Vec4),
      (Types::Int, 1) => Some(Types::Int),
      (Types::Int, 2) => Some(Types::IVec2),
      (Types::Int, 3) => Some(Types::IVec3),
      (Types::Int, 4) => Some(Types::IVec4),
      _ => None,
    }
  }

  pub fn is_sampler(&self) -> bool {
    matches!(self, Types::Sampler2D | Types::SamplerCube)
  }
}

impl Precision {
  /// Resolve a precision-specifier token, the single place an unrecognized
  /// precision name becomes a compile error.
  pub fn resolve(tok: &Token) -> Result<Precision, ShaderCompileError> {
    Precision::from_str(tok.text()).map_err(|_| ShaderCompileError::InvalidPrecisionName {
      name: tok.text().to_owned(),
      at: tok.info.clone(),
    })
  }
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ FULL AND EXPORTED TYPES ~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// Array-ness of a declared type. `Fixed` lengths come from folding the
/// integer-constant child of an array declarator; `Unsized` marks array
/// parameters whose length is supplied by outer context.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ArraySize {
  Fixed(u32),
  Unsized,
}

/// The full type of a local declaration: base type, optional array size,
/// constness and precision. Precision and exact array length are local
/// compilation details and do not cross function or shader boundaries.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Type {
  pub types: Types,
  pub array_size: Option<ArraySize>,
  pub constant: bool,
  pub precision: Precision,
}

impl Type {
  pub fn new(types: Types) -> Self {
    Self { types, array_size: None, constant: false, precision: Precision::default() }
  }

  /// Resolve a declarator parse node to a full `Type`, dispatching on the
  /// two concrete declarator shapes.
  pub fn of_declarator(decl: &Declarator) -> Result<Type, ShaderCompileError> {
    match decl {
      Declarator::Field(node) => Self::of_field(node),
      Declarator::Array(node) => Self::of_array(node),
    }
  }

  /// Field declarator rule: scan the modifiers for `const` (order among the
  /// children does not matter), default precision to mediump, resolve the
  /// type name. No array size.
  fn of_field(node: &DeclaratorNode) -> Result<Type, ShaderCompileError> {
    Ok(Type {
      types: Types::resolve(&node.type_specifier)?,
      array_size: None,
      constant: node.has_const(),
      precision: match &node.precision {
        Some(tok) => Precision::resolve(tok)?,
        None => Precision::default(),
      },
    })
  }

  /// Array declarator rule: as the field rule, plus the integer-constant
  /// length child, which must fold to a non-negative literal integer.
  fn of_array(node: &DeclaratorNode) -> Result<Type, ShaderCompileError> {
    let length_tok = node.array_length.as_ref().ok_or_else(|| {
      ShaderCompileError::InvalidArrayLength { at: node.info.clone() }
    })?;
    let length = length_tok
      .text()
      .parse::<u32>()
      .map_err(|_| ShaderCompileError::InvalidArrayLength { at: length_tok.info.clone() })?;
    Ok(Type { array_size: Some(ArraySize::Fixed(length)), ..Self::of_field(node)? })
  }

  /// The subset of this type visible across a call boundary.
  pub fn exported(&self) -> TypeExported {
    TypeExported { types: self.types, is_array: self.array_size.is_some() }
  }
}

/// The part of a type that takes part in call signatures: base type and
/// whether it is an array.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TypeExported {
  pub types: Types,
  pub is_array: bool,
}

impl TypeExported {
  pub fn new(types: Types) -> Self {
    Self { types, is_array: false }
  }

  /// Resolve an exported-type parse node. Array-ness is structural: more
  /// than one child token present.
  pub fn of_node(node: &ExportedTypeNode) -> Result<TypeExported, ShaderCompileError> {
    let name_tok = node.children.first().ok_or_else(|| ShaderCompileError::InvalidTypeName {
      name: node.info.text.clone(),
      at: node.info.clone(),
    })?;
    Ok(TypeExported { types: Types::resolve(name_tok)?, is_array: node.is_array() })
  }

  /// Whether a value of this type may be passed where `target` is expected.
  /// Total and deterministic: exact equality, or the single implicit
  /// widening `int -> float` (never across array-ness, never for vectors).
  pub fn widens_to(&self, target: &TypeExported) -> bool {
    if self == target {
      return true;
    }
    !self.is_array
      && !target.is_array
      && self.types == Types::Int
      && target.types == Types::Float
  }
}

impl fmt::Display for TypeExported {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_array {
      write!(f, "{}[]", self.types)
    } else {
      write!(f, "{}", self.types)
    }
  }
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ TESTS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parse_tree::NodeInfo;

  fn field(type_name: &str, precision: Option<&str>, modifiers: &[&str]) -> Declarator {
    Declarator::Field(DeclaratorNode {
      info: NodeInfo::default(),
      modifiers: modifiers.iter().map(|m| Token::new(1, 1, m)).collect(),
      precision: precision.map(|p| Token::new(1, 1, p)),
      type_specifier: Token::new(1, 1, type_name),
      array_length: None,
    })
  }

  #[test]
  fn precision_defaults_to_mediump() {
    let ty = Type::of_declarator(&field("vec3", None, &[])).unwrap();
    assert_eq!(ty.precision, Precision::Mediump);
    assert_eq!(ty.types, Types::Vec3);
    assert!(!ty.constant);
  }

  #[test]
  fn const_modifier_is_order_independent() {
    let leading = Type::of_declarator(&field("float", None, &["const", "uniform"])).unwrap();
    let trailing = Type::of_declarator(&field("float", None, &["uniform", "const"])).unwrap();
    assert!(leading.constant);
    assert!(trailing.constant);
  }

  #[test]
  fn unknown_type_name_is_rejected() {
    let err = Type::of_declarator(&field("flot", None, &[])).unwrap_err();
    assert!(matches!(err, ShaderCompileError::InvalidTypeName { name, .. } if name == "flot"));
  }

  #[test]
  fn unknown_precision_name_is_rejected() {
    let err = Type::of_declarator(&field("float", Some("ultrap"), &[])).unwrap_err();
    assert!(matches!(err, ShaderCompileError::InvalidPrecisionName { name, .. } if name == "ultrap"));
  }

  #[test]
  fn array_length_must_be_an_integer_constant() {
    let decl = Declarator::Array(DeclaratorNode {
      info: NodeInfo::default(),
      modifiers: vec![],
      precision: None,
      type_specifier: Token::new(1, 1, "float"),
      array_length: Some(Token::new(1, 9, "count")),
    });
    let err = Type::of_declarator(&decl).unwrap_err();
    assert!(matches!(err, ShaderCompileError::InvalidArrayLength { .. }));
  }

  #[test]
  fn array_length_folds_to_fixed_size() {
    let decl = Declarator::Array(DeclaratorNode {
      info: NodeInfo::default(),
      modifiers: vec![],
      precision: None,
      type_specifier: Token::new(1, 1, "vec4"),
      array_length: Some(Token::new(1, 9, "16")),
    });
    let ty = Type::of_declarator(&decl).unwrap();
    assert_eq!(ty.array_size, Some(ArraySize::Fixed(16)));
    assert!(ty.exported().is_array);
  }

  #[test]
  fn exported_type_arrayness_is_structural() {
    let scalar = ExportedTypeNode {
      info: NodeInfo::default(),
      children: vec![Token::new(1, 1, "vec2")],
    };
    let array = ExportedTypeNode {
      info: NodeInfo::default(),
      children: vec![Token::new(1, 1, "vec2"), Token::new(1, 5, "[]")],
    };
    assert!(!TypeExported::of_node(&scalar).unwrap().is_array);
    assert!(TypeExported::of_node(&array).unwrap().is_array);
  }

  #[test]
  fn widening_is_int_to_float_only() {
    let int = TypeExported::new(Types::Int);
    let float = TypeExported::new(Types::Float);
    let vec2 = TypeExported::new(Types::Vec2);
    assert!(int.widens_to(&float));
    assert!(!float.widens_to(&int));
    assert!(!int.widens_to(&vec2));
    assert!(float.widens_to(&float));
  }
}
