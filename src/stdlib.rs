use ahash::AHashMap;
use strum::{EnumIter, IntoEnumIterator};

use crate::ast::{BinaryOp, Expression, FunctionExportedSignature, FunctionParameterSignature};
use crate::types::{TypeExported, Types};

/// A per-target algebraic rewrite applied to the arguments of a resolved
/// call. Returns `None` when the rule does not apply to these arguments and
/// the call should be emitted as-is.
pub type Simplification = fn(&[Expression]) -> Option<Expression>;

/// All built-in functions of the standard library.
///
/// Representing them as an enum with exhaustive `match` methods means a new
/// built-in added here makes the compiler point at every place that needs a
/// signature or rule for it, instead of leaving a map entry dangling.
#[derive(EnumIter, PartialEq, Eq, Hash, Debug, Copy, Clone)]
pub enum BuiltIn {
  Sin,
  Cos,
  Pow,
  Sqrt,
  Abs,
  Floor,
  Fract,
  Min,
  Max,
  Clamp,
  Mix,
  Dot,
  Cross,
  Normalize,
  Length,
  Texture2D,
  TextureCube,
  Vec2Ctor,
  Vec3Ctor,
  Vec4Ctor,
}

const GEN_TYPES: [Types; 4] = [Types::Float, Types::Vec2, Types::Vec3, Types::Vec4];

impl BuiltIn {
  fn name(&self) -> &'static str {
    match self {
      BuiltIn::Sin => "sin",
      BuiltIn::Cos => "cos",
      BuiltIn::Pow => "pow",
      BuiltIn::Sqrt => "sqrt",
      BuiltIn::Abs => "abs",
      BuiltIn::Floor => "floor",
      BuiltIn::Fract => "fract",
      BuiltIn::Min => "min",
      BuiltIn::Max => "max",
      BuiltIn::Clamp => "clamp",
      BuiltIn::Mix => "mix",
      BuiltIn::Dot => "dot",
      BuiltIn::Cross => "cross",
      BuiltIn::Normalize => "normalize",
      BuiltIn::Length => "length",
      BuiltIn::Texture2D => "texture2D",
      BuiltIn::TextureCube => "textureCube",
      BuiltIn::Vec2Ctor => "vec2",
      BuiltIn::Vec3Ctor => "vec3",
      BuiltIn::Vec4Ctor => "vec4",
    }
  }

  /// Every overload this built-in contributes to the resolution table.
  fn signatures(&self) -> Vec<FunctionExportedSignature> {
    let name = self.name();
    let float = TypeExported::new(Types::Float);
    let gen = |arity: usize| -> Vec<FunctionExportedSignature> {
      // component-wise functions: one overload per genType, same in as out
      GEN_TYPES
        .iter()
        .map(|t| {
          let ty = TypeExported::new(*t);
          FunctionExportedSignature::new(name, vec![ty; arity], ty)
        })
        .collect()
    };
    match self {
      BuiltIn::Sin
      | BuiltIn::Cos
      | BuiltIn::Sqrt
      | BuiltIn::Abs
      | BuiltIn::Floor
      | BuiltIn::Fract
      | BuiltIn::Normalize => gen(1),
      BuiltIn::Pow | BuiltIn::Min | BuiltIn::Max => gen(2),
      BuiltIn::Clamp => gen(3),
      BuiltIn::Mix => {
        // mix(T, T, T) plus the scalar-interpolant form mix(T, T, float)
        let mut sigs = gen(3);
        for t in &GEN_TYPES[1..] {
          let ty = TypeExported::new(*t);
          sigs.push(FunctionExportedSignature::new(name, vec![ty, ty, float], ty));
        }
        sigs
      }
      BuiltIn::Dot => GEN_TYPES
        .iter()
        .map(|t| {
          let ty = TypeExported::new(*t);
          FunctionExportedSignature::new(name, vec![ty, ty], float)
        })
        .collect(),
      BuiltIn::Cross => {
        let vec3 = TypeExported::new(Types::Vec3);
        vec![FunctionExportedSignature::new(name, vec![vec3, vec3], vec3)]
      }
      BuiltIn::Length => GEN_TYPES
        .iter()
        .map(|t| FunctionExportedSignature::new(name, vec![TypeExported::new(*t)], float))
        .collect(),
      BuiltIn::Texture2D => vec![FunctionExportedSignature::new(
        name,
        vec![TypeExported::new(Types::Sampler2D), TypeExported::new(Types::Vec2)],
        TypeExported::new(Types::Vec4),
      )],
      BuiltIn::TextureCube => vec![FunctionExportedSignature::new(
        name,
        vec![TypeExported::new(Types::SamplerCube), TypeExported::new(Types::Vec3)],
        TypeExported::new(Types::Vec4),
      )],
      BuiltIn::Vec2Ctor => {
        let vec2 = TypeExported::new(Types::Vec2);
        vec![
          FunctionExportedSignature::new(name, vec![float, float], vec2),
          FunctionExportedSignature::new(name, vec![float], vec2),
        ]
      }
      BuiltIn::Vec3Ctor => {
        let vec2 = TypeExported::new(Types::Vec2);
        let vec3 = TypeExported::new(Types::Vec3);
        vec![
          FunctionExportedSignature::new(name, vec![float, float, float], vec3),
          FunctionExportedSignature::new(name, vec![vec2, float], vec3),
          FunctionExportedSignature::new(name, vec![float], vec3),
        ]
      }
      BuiltIn::Vec4Ctor => {
        let vec2 = TypeExported::new(Types::Vec2);
        let vec3 = TypeExported::new(Types::Vec3);
        let vec4 = TypeExported::new(Types::Vec4);
        vec![
          FunctionExportedSignature::new(name, vec![float, float, float, float], vec4),
          FunctionExportedSignature::new(name, vec![vec3, float], vec4),
          FunctionExportedSignature::new(name, vec![vec2, vec2], vec4),
          FunctionExportedSignature::new(name, vec![float], vec4),
        ]
      }
    }
  }
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ THE STANDARD LIBRARY VALUE ~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// The standard library as an explicitly constructed, immutable value.
/// Passed into the IR assembler and the `ShaderContext` builder; there is no
/// process-wide singleton behind it.
#[derive(Debug, Clone)]
pub struct StdLib {
  signatures: AHashMap<FunctionParameterSignature, FunctionExportedSignature>,
}

impl StdLib {
  pub fn new() -> Self {
    let mut signatures = AHashMap::new();
    for built_in in BuiltIn::iter() {
      for sig in built_in.signatures() {
        signatures.insert(sig.parameters.clone(), sig);
      }
    }
    Self { signatures }
  }

  pub fn get(&self, key: &FunctionParameterSignature) -> Option<&FunctionExportedSignature> {
    self.signatures.get(key)
  }

  pub fn signatures(
    &self,
  ) -> impl Iterator<Item = (&FunctionParameterSignature, &FunctionExportedSignature)> {
    self.signatures.iter()
  }

  /// Rewrites that are safe on every target. Callers building a
  /// `ShaderContext` typically start from these and add target-specific
  /// rules on top.
  pub fn default_simplifications(&self) -> AHashMap<FunctionExportedSignature, Simplification> {
    let mut rules: AHashMap<FunctionExportedSignature, Simplification> = AHashMap::new();
    for t in GEN_TYPES {
      let ty = TypeExported::new(t);
      rules.insert(
        FunctionExportedSignature::new("pow", vec![ty, ty], ty),
        simplify_pow_square as Simplification,
      );
    }
    rules
  }
}

impl Default for StdLib {
  fn default() -> Self {
    Self::new()
  }
}

/// `pow(x, 2)` rewrites to `x * x`, for targets where `pow` is slow on
/// integral exponents.
fn simplify_pow_square(args: &[Expression]) -> Option<Expression> {
  let is_two = match args.get(1)? {
    Expression::FloatLiteral(v) => *v == 2.0,
    Expression::IntLiteral(v) => *v == 2,
    _ => false,
  };
  if !is_two {
    return None;
  }
  let x = args.first()?.clone();
  Some(Expression::Binary {
    op: BinaryOp::Multiply,
    lhs: Box::new(x.clone()),
    rhs: Box::new(x),
  })
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ TESTS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
