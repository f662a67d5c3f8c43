use ahash::AHashMap;
use log::debug;

use crate::ast::{
  CallFunction, Declaration, FunctionExportedSignature, FunctionParameterSignature, Property,
  ShaderFunction, ShaderSignature, Uniform,
};
use crate::error::ShaderCompileError;
use crate::parse_tree::NodeInfo;
use crate::stdlib::StdLib;

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ THE ROOT IR ARTIFACT ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// The backend-agnostic result of compiling one shader source: every
/// declaration, user function, entry point, output, uniform slot and
/// property, validated and immutable. Safe to share across threads and
/// backends once constructed.
#[derive(Debug, Clone)]
pub struct CompiledShader {
  pub declarations: Vec<Declaration>,
  pub functions: Vec<CallFunction>,
  pub shader_vertex: Option<ShaderFunction>,
  pub shader_fragment: Option<ShaderFunction>,
  pub outputs: Option<ShaderSignature>,
  pub properties: Vec<Property>,
  /// Sparse slot array, length `max assigned index + 1`, unused slots `None`.
  uniform_slots: Vec<Option<Uniform>>,
  /// Derived resolution table, rebuilt eagerly on construction: user
  /// functions first, then the standard library overlaid without replacing
  /// existing keys.
  function_map: AHashMap<FunctionParameterSignature, FunctionExportedSignature>,
}

impl CompiledShader {
  /// Assemble and validate the IR. `uniforms` pairs each uniform with its
  /// assigned slot index; a slot claimed twice fails at insertion.
  #[allow(clippy::too_many_arguments)]
  pub fn new(
    declarations: Vec<Declaration>,
    functions: Vec<CallFunction>,
    shader_vertex: Option<ShaderFunction>,
    shader_fragment: Option<ShaderFunction>,
    outputs: Option<ShaderSignature>,
    uniforms: Vec<(usize, Uniform)>,
    properties: Vec<Property>,
    stdlib: &StdLib,
  ) -> Result<Self, ShaderCompileError> {
    let uniform_slots = build_uniform_slots(uniforms)?;

    // user functions are inserted first so that a user function sharing an
    // exact signature with a stdlib entry is preserved
    let mut function_map = AHashMap::new();
    for function in &functions {
      function_map
        .insert(function.signature.parameters.clone(), function.signature.clone());
    }
    for (key, sig) in stdlib.signatures() {
      function_map.entry(key.clone()).or_insert_with(|| sig.clone());
    }
    debug!(
      "assembled shader IR: {} declarations, {} functions, {} uniform slots",
      declarations.len(),
      functions.len(),
      uniform_slots.len()
    );

    Ok(Self {
      declarations,
      functions,
      shader_vertex,
      shader_fragment,
      outputs,
      properties,
      uniform_slots,
      function_map,
    })
  }

  /// A defensive copy of the uniform slot array. Backends index into this
  /// by the slots assigned at compile time.
  pub fn uniforms(&self) -> Vec<Option<Uniform>> {
    self.uniform_slots.clone()
  }

  /// The uniforms that are actually present, paired with their slots.
  pub fn uniform_entries(&self) -> impl Iterator<Item = (usize, &Uniform)> {
    self
      .uniform_slots
      .iter()
      .enumerate()
      .filter_map(|(index, slot)| slot.as_ref().map(|uniform| (index, uniform)))
  }

  pub fn function_map(
    &self,
  ) -> &AHashMap<FunctionParameterSignature, FunctionExportedSignature> {
    &self.function_map
  }

  /// Resolve a call site against this shader's function table, with user
  /// functions taking precedence over the standard library.
  pub fn resolve(
    &self,
    call: &FunctionParameterSignature,
    at: &NodeInfo,
  ) -> Result<FunctionExportedSignature, ShaderCompileError> {
    resolve_call(&self.function_map, call, at)
  }
}

impl PartialEq for CompiledShader {
  /// Structural equality of every stored field. `function_map` is derived
  /// deterministically from `functions` and the stdlib, so it is skipped.
  fn eq(&self, other: &Self) -> bool {
    self.declarations == other.declarations
      && self.functions == other.functions
      && self.shader_vertex == other.shader_vertex
      && self.shader_fragment == other.shader_fragment
      && self.outputs == other.outputs
      && self.properties == other.properties
      && self.uniform_slots == other.uniform_slots
  }
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ UNIFORM SLOT ARRAY ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// Build the sparse slot array: length is one past the greatest assigned
/// index, gaps stay `None`, and a collision is fatal at insertion time.
fn build_uniform_slots(
  uniforms: Vec<(usize, Uniform)>,
) -> Result<Vec<Option<Uniform>>, ShaderCompileError> {
  let len = uniforms.iter().map(|(index, _)| index + 1).max().unwrap_or(0);
  let mut slots: Vec<Option<Uniform>> = vec![None; len];
  for (index, uniform) in uniforms {
    if slots[index].is_some() {
      return Err(ShaderCompileError::UniformIndexCollision { index });
    }
    slots[index] = Some(uniform);
  }
  Ok(slots)
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ OVERLOAD RESOLUTION ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// Resolve a call-site signature against a function table.
///
/// An exact key match wins outright. Otherwise every overload of the same
/// name and arity reachable through implicit widening is a candidate:
/// exactly one candidate resolves, none is an unresolved-function error and
/// several are rejected as ambiguous rather than ranked.
pub fn resolve_call(
  map: &AHashMap<FunctionParameterSignature, FunctionExportedSignature>,
  call: &FunctionParameterSignature,
  at: &NodeInfo,
) -> Result<FunctionExportedSignature, ShaderCompileError> {
  if let Some(sig) = map.get(call) {
    return Ok(sig.clone());
  }
  let candidates: Vec<&FunctionExportedSignature> = map
    .iter()
    .filter(|(key, _)| {
      key.name == call.name
        && key.parameters.len() == call.parameters.len()
        && call
          .parameters
          .iter()
          .zip(key.parameters.iter())
          .all(|(actual, formal)| actual.widens_to(formal))
    })
    .map(|(_, sig)| sig)
    .collect();
  match candidates.len() {
    0 => Err(ShaderCompileError::UnresolvedFunction {
      signature: call.to_string(),
      at: at.clone(),
    }),
    1 => Ok(candidates[0].clone()),
    _ => Err(ShaderCompileError::AmbiguousFunction {
      signature: call.to_string(),
      at: at.clone(),
    }),
  }
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ TESTS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::Statement;
  use crate::types::{TypeExported, Types};

  fn float() -> TypeExported {
    TypeExported::new(Types::Float)
  }

  fn int() -> TypeExported {
    TypeExported::new(Types::Int)
  }

  fn user_function(name: &str, params: Vec<TypeExported>, returns: TypeExported) -> CallFunction {
    let parameter_names = (0..params.len()).map(|i| format!("p{}", i)).collect();
    CallFunction {
      signature: FunctionExportedSignature::new(name, params, returns),
      parameter_names,
      body: vec![Statement::Return(None)],
    }
  }

  fn shader_with(functions: Vec<CallFunction>, uniforms: Vec<(usize, Uniform)>) -> CompiledShader {
    CompiledShader::new(vec![], functions, None, None, None, uniforms, vec![], &StdLib::new())
      .unwrap()
  }

  #[test]
  fn uniform_slots_length_is_one_past_max_index() {
    let shader = shader_with(
      vec![],
      vec![(0, Uniform::new("transform", TypeExported::new(Types::Mat4))),
           (3, Uniform::new("tint", TypeExported::new(Types::Vec4)))],
    );
    let slots = shader.uniforms();
    assert_eq!(slots.len(), 4);
    assert!(slots[0].is_some());
    assert!(slots[1].is_none());
    assert!(slots[2].is_none());
    assert!(slots[3].is_some());
  }

  #[test]
  fn uniform_slot_collision_is_fatal() {
    let result = CompiledShader::new(
      vec![],
      vec![],
      None,
      None,
      None,
      vec![(1, Uniform::new("a", float())), (1, Uniform::new("b", float()))],
      vec![],
      &StdLib::new(),
    );
    assert_eq!(result.unwrap_err(), ShaderCompileError::UniformIndexCollision { index: 1 });
  }

  #[test]
  fn user_function_beats_stdlib_on_exact_signature() {
    // a user `sin(float) -> vec4` shares its parameter tuple with the
    // stdlib's `sin(float) -> float`; the user entry must survive
    let shader = shader_with(vec![user_function("sin", vec![float()], TypeExported::new(Types::Vec4))], vec![]);
    let call = FunctionParameterSignature::new("sin", vec![float()]);
    let resolved = shader.resolve(&call, &NodeInfo::default()).unwrap();
    assert_eq!(resolved.returns, TypeExported::new(Types::Vec4));
  }

  #[test]
  fn widening_resolves_int_literal_arguments() {
    let shader = shader_with(vec![], vec![]);
    let call = FunctionParameterSignature::new("pow", vec![float(), int()]);
    let resolved = shader.resolve(&call, &NodeInfo::default()).unwrap();
    assert_eq!(resolved.returns, float());
  }

  #[test]
  fn overlapping_widenings_are_rejected_as_ambiguous() {
    let shader = shader_with(
      vec![
        user_function("g", vec![float(), int()], float()),
        user_function("g", vec![int(), float()], float()),
      ],
      vec![],
    );
    let call = FunctionParameterSignature::new("g", vec![int(), int()]);
    let err = shader.resolve(&call, &NodeInfo::default()).unwrap_err();
    assert!(matches!(err, ShaderCompileError::AmbiguousFunction { .. }));
  }

  #[test]
  fn unknown_call_is_unresolved() {
    let shader = shader_with(vec![], vec![]);
    let call = FunctionParameterSignature::new("warp", vec![float()]);
    let err = shader.resolve(&call, &NodeInfo::default()).unwrap_err();
    assert!(matches!(err, ShaderCompileError::UnresolvedFunction { .. }));
  }
}
