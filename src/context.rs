use ahash::AHashMap;

use crate::ast::{Expression, FunctionExportedSignature, FunctionParameterSignature};
use crate::shader::CompiledShader;
use crate::stdlib::Simplification;

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ PER-TARGET IR PROJECTION ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// A per-target projection of one [`CompiledShader`], handed to a backend
/// code generator: the function resolution table, the target's algebraic
/// simplification rules, and the bindings that resolve each property to a
/// concrete expression. Immutable once built; one shader can be projected
/// into any number of contexts without recompiling.
pub struct ShaderContext {
  functions: AHashMap<FunctionParameterSignature, FunctionExportedSignature>,
  function_simplifications: AHashMap<FunctionExportedSignature, Simplification>,
  properties: AHashMap<String, Expression>,
}

impl ShaderContext {
  /// Build a context from a compiled shader, a simplification rule table
  /// and a property-binding table. No validation happens here; the shader
  /// was validated at assembly and the tables are the caller's contract.
  pub fn new(
    shader: &CompiledShader,
    function_simplifications: AHashMap<FunctionExportedSignature, Simplification>,
    properties: AHashMap<String, Expression>,
  ) -> Self {
    Self { functions: shader.function_map().clone(), function_simplifications, properties }
  }

  pub fn functions(
    &self,
  ) -> &AHashMap<FunctionParameterSignature, FunctionExportedSignature> {
    &self.functions
  }

  /// Apply the target's rewrite rule for `signature` to `args`, if one is
  /// registered and it applies.
  pub fn simplify(
    &self,
    signature: &FunctionExportedSignature,
    args: &[Expression],
  ) -> Option<Expression> {
    self.function_simplifications.get(signature).and_then(|rule| rule(args))
  }

  /// The expression a named property resolves to on this target.
  pub fn property(&self, name: &str) -> Option<&Expression> {
    self.properties.get(name)
  }
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ TESTS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::BinaryOp;
  use crate::stdlib::StdLib;
  use crate::types::{TypeExported, Types};

  fn empty_shader(stdlib: &StdLib) -> CompiledShader {
    CompiledShader::new(vec![], vec![], None, None, None, vec![], vec![], stdlib).unwrap()
  }

  #[test]
  fn properties_resolve_per_context() {
    let stdlib = StdLib::new();
    let shader = empty_shader(&stdlib);
    let mut bright = AHashMap::new();
    bright.insert("ambient".to_owned(), Expression::FloatLiteral(1.0));
    let mut dark = AHashMap::new();
    dark.insert("ambient".to_owned(), Expression::FloatLiteral(0.1));
    let context_a = ShaderContext::new(&shader, AHashMap::new(), bright);
    let context_b = ShaderContext::new(&shader, AHashMap::new(), dark);
    assert_eq!(context_a.property("ambient"), Some(&Expression::FloatLiteral(1.0)));
    assert_eq!(context_b.property("ambient"), Some(&Expression::FloatLiteral(0.1)));
    assert_eq!(context_a.property("missing"), None);
  }

  #[test]
  fn simplification_rules_rewrite_calls() {
    let stdlib = StdLib::new();
    let shader = empty_shader(&stdlib);
    let context =
      ShaderContext::new(&shader, stdlib.default_simplifications(), AHashMap::new());
    let float = TypeExported::new(Types::Float);
    let pow = FunctionExportedSignature::new("pow", vec![float, float], float);
    let args = vec![Expression::Variable("x".to_owned()), Expression::IntLiteral(2)];
    assert_eq!(
      context.simplify(&pow, &args),
      Some(Expression::Binary {
        op: BinaryOp::Multiply,
        lhs: Box::new(Expression::Variable("x".to_owned())),
        rhs: Box::new(Expression::Variable("x".to_owned())),
      })
    );
    // rule registered but not applicable: the call is left alone
    let args = vec![Expression::Variable("x".to_owned()), Expression::IntLiteral(5)];
    assert_eq!(context.simplify(&pow, &args), None);
  }

  #[test]
  fn context_carries_the_shader_function_table() {
    let stdlib = StdLib::new();
    let shader = empty_shader(&stdlib);
    let context = ShaderContext::new(&shader, AHashMap::new(), AHashMap::new());
    let key = FunctionParameterSignature::new("cross", vec![
      TypeExported::new(Types::Vec3),
      TypeExported::new(Types::Vec3),
    ]);
    assert!(context.functions().contains_key(&key));
  }
}
