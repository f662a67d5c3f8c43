//! The compiler walk: turns a parse tree into a validated `CompiledShader`.
//!
//! Single-threaded and synchronous. Any error unwinds the whole compilation;
//! no partial artifact is ever produced.

use std::str::FromStr;

use ahash::AHashMap;
use log::{debug, info};

use crate::ast::{
  BinaryOp, CallFunction, Declaration, Expression, FunctionExportedSignature,
  FunctionParameterSignature, Property, ShaderFunction, ShaderSignature, SignatureField, Stage,
  Statement, UnaryOp, Uniform,
};
use crate::error::ShaderCompileError;
use crate::parse_tree::{
  EntryPointNode, ExprNode, FunctionNode, NodeInfo, ProgramNode, StageNode, StatementNode,
};
use crate::scope::{Identifier, Scope};
use crate::shader::{resolve_call, CompiledShader};
use crate::stdlib::StdLib;
use crate::types::{Type, TypeExported, Types};

type FunctionTable = AHashMap<FunctionParameterSignature, FunctionExportedSignature>;

/// Compile a parse tree against a standard library. This is the main entry
/// point of the crate.
pub fn compile(
  program: &ProgramNode,
  stdlib: &StdLib,
) -> Result<CompiledShader, ShaderCompileError> {
  info!(
    "compiling shader: {} declarations, {} functions, {} entry points",
    program.declarations.len(),
    program.functions.len(),
    program.entry_points.len()
  );

  let mut global = Scope::new();

  // user function signatures are collected before any body is checked so
  // that bodies may call functions declared later in the unit
  let mut table: FunctionTable = AHashMap::new();
  for function in &program.functions {
    let signature = function_signature(function)?;
    if table.insert(signature.parameters.clone(), signature).is_some() {
      return Err(ShaderCompileError::DuplicateDeclaration {
        name: function.name.clone(),
        at: function.info.clone(),
      });
    }
  }
  for (key, sig) in stdlib.signatures() {
    table.entry(key.clone()).or_insert_with(|| sig.clone());
  }

  // uniforms claim dense slots in declaration order and are visible as
  // identifiers everywhere
  let mut uniforms = Vec::new();
  for (index, node) in program.uniforms.iter().enumerate() {
    let ty = TypeExported::of_node(&node.exported_type)?;
    declare(&mut global, &node.name, ty, &node.info)?;
    uniforms.push((index, Uniform::new(&node.name, ty)));
  }

  // properties resolve to expressions only at context-build time, but their
  // names and types take part in checking like any other binding
  let mut properties = Vec::new();
  for node in &program.properties {
    let ty = TypeExported::of_node(&node.exported_type)?;
    declare(&mut global, &node.name, ty, &node.info)?;
    properties.push(Property::new(&node.name, ty));
  }

  let mut declarations = Vec::new();
  for node in &program.declarations {
    let ty = Type::of_declarator(&node.declarator)?;
    let init = match &node.init {
      Some(expr) => {
        let (typed, found) = check_expr(expr, &global, &table)?;
        require_assignable(found, ty.exported(), expr.info())?;
        Some(typed)
      }
      None => None,
    };
    declare(&mut global, &node.name, ty.exported(), &node.info)?;
    declarations.push(Declaration { name: node.name.clone(), ty, init });
  }

  let mut functions = Vec::new();
  for node in &program.functions {
    functions.push(check_function(node, &global, &table)?);
  }
  debug!("checked {} user function bodies", functions.len());

  let mut shader_vertex = None;
  let mut shader_fragment = None;
  for node in &program.entry_points {
    let checked = check_entry_point(node, &global, &table)?;
    let slot = match checked.stage {
      Stage::Vertex => &mut shader_vertex,
      Stage::Fragment => &mut shader_fragment,
    };
    if slot.is_some() {
      return Err(ShaderCompileError::DuplicateDeclaration {
        name: checked.stage.to_string(),
        at: node.info.clone(),
      });
    }
    *slot = Some(checked);
  }

  let outputs = if program.outputs.is_empty() {
    None
  } else {
    let mut fields = Vec::new();
    for node in &program.outputs {
      let ty = TypeExported::of_node(&node.exported_type)?;
      fields.push(SignatureField::new(&node.name, ty));
    }
    Some(ShaderSignature { inputs: vec![], outputs: fields })
  };

  CompiledShader::new(
    declarations,
    functions,
    shader_vertex,
    shader_fragment,
    outputs,
    uniforms,
    properties,
    stdlib,
  )
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ DECLARATIONS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

fn declare(
  scope: &mut Scope<'_>,
  name: &str,
  ty: TypeExported,
  at: &NodeInfo,
) -> Result<(), ShaderCompileError> {
  scope.add(name, ty).ok_or_else(|| ShaderCompileError::DuplicateDeclaration {
    name: name.to_owned(),
    at: at.clone(),
  })?;
  Ok(())
}

fn require_assignable(
  found: TypeExported,
  expected: TypeExported,
  at: &NodeInfo,
) -> Result<(), ShaderCompileError> {
  if found.widens_to(&expected) {
    return Ok(());
  }
  Err(ShaderCompileError::mismatch(
    format!("expected {expected}, found {found}"),
    at,
  ))
}

fn function_signature(
  node: &FunctionNode,
) -> Result<FunctionExportedSignature, ShaderCompileError> {
  let mut parameters = Vec::new();
  for param in &node.parameters {
    parameters.push(TypeExported::of_node(&param.exported_type)?);
  }
  let returns = TypeExported::of_node(&node.return_type)?;
  Ok(FunctionExportedSignature::new(&node.name, parameters, returns))
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ FUNCTIONS AND ENTRY POINTS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~

fn check_function(
  node: &FunctionNode,
  global: &Scope<'_>,
  table: &FunctionTable,
) -> Result<CallFunction, ShaderCompileError> {
  let signature = function_signature(node)?;
  let mut scope = Scope::child(global);
  // parameter identifiers are built before scope entry and bound
  // unconditionally, shadowing any global of the same name
  for (param, ty) in node.parameters.iter().zip(&signature.parameters.parameters) {
    scope.add_identifier(Identifier::new(&param.name, *ty));
  }
  let body = check_block(&node.body, &mut scope, table, Some(signature.returns))?;
  Ok(CallFunction {
    signature,
    parameter_names: node.parameters.iter().map(|p| p.name.clone()).collect(),
    body,
  })
}

fn check_entry_point(
  node: &EntryPointNode,
  global: &Scope<'_>,
  table: &FunctionTable,
) -> Result<ShaderFunction, ShaderCompileError> {
  let stage = match node.stage {
    StageNode::Vertex => Stage::Vertex,
    StageNode::Fragment => Stage::Fragment,
  };
  let mut scope = Scope::child(global);
  let mut inputs = Vec::new();
  for input in &node.inputs {
    let ty = TypeExported::of_node(&input.exported_type)?;
    declare(&mut scope, &input.name, ty, &input.info)?;
    inputs.push(SignatureField::new(&input.name, ty));
  }
  let mut outputs = Vec::new();
  for output in &node.outputs {
    let ty = TypeExported::of_node(&output.exported_type)?;
    declare(&mut scope, &output.name, ty, &output.info)?;
    outputs.push(SignatureField::new(&output.name, ty));
  }
  // entry points return through their outputs, not through a return value
  let body = check_block(&node.body, &mut scope, table, None)?;
  Ok(ShaderFunction { stage, signature: ShaderSignature { inputs, outputs }, body })
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ STATEMENTS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// Check a statement list inside `scope`. Statements that follow an `if`
/// continue in a scope merged over the branch scope and the current one, so
/// bindings the branches agree on stay visible.
fn check_block(
  statements: &[StatementNode],
  scope: &mut Scope<'_>,
  table: &FunctionTable,
  returns: Option<TypeExported>,
) -> Result<Vec<Statement>, ShaderCompileError> {
  let Some((first, rest)) = statements.split_first() else {
    return Ok(vec![]);
  };
  match first {
    StatementNode::Declare { info, name, declarator, init } => {
      let ty = Type::of_declarator(declarator)?;
      let init = match init {
        Some(expr) => {
          let (typed, found) = check_expr(expr, scope, table)?;
          require_assignable(found, ty.exported(), expr.info())?;
          Some(typed)
        }
        None => None,
      };
      declare(scope, name, ty.exported(), info)?;
      let mut out = vec![Statement::Declare { name: name.clone(), ty, init }];
      out.extend(check_block(rest, scope, table, returns)?);
      Ok(out)
    }
    StatementNode::Assign { info, target, value } => {
      let expected = scope
        .get(target)
        .map(|ident| ident.ty)
        .ok_or_else(|| ShaderCompileError::UndefinedIdentifier {
          name: target.clone(),
          at: info.clone(),
        })?;
      let (typed, found) = check_expr(value, scope, table)?;
      require_assignable(found, expected, value.info())?;
      let mut out = vec![Statement::Assign { target: target.clone(), value: typed }];
      out.extend(check_block(rest, scope, table, returns)?);
      Ok(out)
    }
    StatementNode::Return { info, value } => {
      let typed = match (value, returns) {
        (Some(expr), Some(expected)) => {
          let (typed, found) = check_expr(expr, scope, table)?;
          require_assignable(found, expected, expr.info())?;
          Some(typed)
        }
        (None, None) => None,
        (Some(expr), None) => {
          return Err(ShaderCompileError::mismatch(
            "entry points return through their outputs",
            expr.info(),
          ))
        }
        (None, Some(expected)) => {
          return Err(ShaderCompileError::mismatch(
            format!("return value of type {expected} required"),
            info,
          ))
        }
      };
      let mut out = vec![Statement::Return(typed)];
      out.extend(check_block(rest, scope, table, returns)?);
      Ok(out)
    }
    StatementNode::If { info, condition, then_branch, else_branch } => {
      let (typed_condition, condition_ty) = check_expr(condition, scope, table)?;
      if condition_ty != TypeExported::new(Types::Bool) {
        return Err(ShaderCompileError::mismatch(
          format!("condition must be bool, found {condition_ty}"),
          condition.info(),
        ));
      }
      let mut then_scope = Scope::child(scope);
      let typed_then = check_block(then_branch, &mut then_scope, table, returns)?;
      let mut else_scope = Scope::child(scope);
      let typed_else = check_block(else_branch, &mut else_scope, table, returns)?;
      // both branches must agree on what they declared before their scopes
      // are merged into the flow that follows
      if !then_scope.check(&else_scope) {
        return Err(ShaderCompileError::ScopeMismatch { at: info.clone() });
      }
      let statement = Statement::If {
        condition: typed_condition,
        then_branch: typed_then,
        else_branch: typed_else,
      };
      let mut merged = Scope::merged(vec![&then_scope, &*scope]);
      let mut out = vec![statement];
      out.extend(check_block(rest, &mut merged, table, returns)?);
      Ok(out)
    }
    StatementNode::Expr { info: _, expr } => {
      let (typed, _) = check_expr(expr, scope, table)?;
      let mut out = vec![Statement::Expr(typed)];
      out.extend(check_block(rest, scope, table, returns)?);
      Ok(out)
    }
  }
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ EXPRESSIONS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// Type an untyped expression node, yielding the typed IR expression and
/// its exported type.
fn check_expr(
  expr: &ExprNode,
  scope: &Scope<'_>,
  table: &FunctionTable,
) -> Result<(Expression, TypeExported), ShaderCompileError> {
  match expr {
    ExprNode::FloatLiteral { value, .. } => {
      Ok((Expression::FloatLiteral(*value), TypeExported::new(Types::Float)))
    }
    ExprNode::IntLiteral { value, .. } => {
      Ok((Expression::IntLiteral(*value), TypeExported::new(Types::Int)))
    }
    ExprNode::BoolLiteral { value, .. } => {
      Ok((Expression::BoolLiteral(*value), TypeExported::new(Types::Bool)))
    }
    ExprNode::Variable { info, name } => {
      let ident = scope.get(name).ok_or_else(|| ShaderCompileError::UndefinedIdentifier {
        name: name.clone(),
        at: info.clone(),
      })?;
      Ok((Expression::Variable(name.clone()), ident.ty))
    }
    ExprNode::Call { info, name, args } => {
      let mut typed_args = Vec::new();
      let mut arg_types = Vec::new();
      for arg in args {
        let (typed, ty) = check_expr(arg, scope, table)?;
        typed_args.push(typed);
        arg_types.push(ty);
      }
      let call = FunctionParameterSignature::new(name, arg_types);
      let resolved = resolve_call(table, &call, info)?;
      Ok((Expression::Call { name: name.clone(), args: typed_args }, resolved.returns))
    }
    ExprNode::Binary { info, op, lhs, rhs } => {
      let op = BinaryOp::from_str(op)
        .map_err(|_| ShaderCompileError::mismatch(format!("unknown operator '{op}'"), info))?;
      let (typed_lhs, lhs_ty) = check_expr(lhs, scope, table)?;
      let (typed_rhs, rhs_ty) = check_expr(rhs, scope, table)?;
      let ty = binary_result(op, lhs_ty, rhs_ty, info)?;
      Ok((
        Expression::Binary { op, lhs: Box::new(typed_lhs), rhs: Box::new(typed_rhs) },
        ty,
      ))
    }
    ExprNode::Unary { info, op, operand } => {
      let op = UnaryOp::from_str(op)
        .map_err(|_| ShaderCompileError::mismatch(format!("unknown operator '{op}'"), info))?;
      let (typed, operand_ty) = check_expr(operand, scope, table)?;
      let ty = match op {
        UnaryOp::Negate
          if operand_ty.types.component_type().is_some()
            && operand_ty.types != Types::Bool
            && !operand_ty.is_array =>
        {
          operand_ty
        }
        UnaryOp::Not if operand_ty == TypeExported::new(Types::Bool) => operand_ty,
        _ => {
          return Err(ShaderCompileError::mismatch(
            format!("operator '{op}' does not apply to {operand_ty}"),
            info,
          ))
        }
      };
      Ok((Expression::Unary { op, operand: Box::new(typed) }, ty))
    }
    ExprNode::Member { info, base, field } => {
      let (typed_base, base_ty) = check_expr(base, scope, table)?;
      let ty = swizzle_result(base_ty, field, info)?;
      Ok((Expression::Member { base: Box::new(typed_base), field: field.clone() }, ty))
    }
  }
}

/// Result type of a binary operation, or a mismatch error. Total and
/// deterministic over the closed type set.
fn binary_result(
  op: BinaryOp,
  lhs: TypeExported,
  rhs: TypeExported,
  at: &NodeInfo,
) -> Result<TypeExported, ShaderCompileError> {
  let mismatch = || {
    ShaderCompileError::mismatch(format!("operator '{op}' does not apply to {lhs} and {rhs}"), at)
  };
  if lhs.is_array || rhs.is_array {
    return Err(mismatch());
  }
  let bool_ty = TypeExported::new(Types::Bool);
  if op.is_logical() {
    return if lhs == bool_ty && rhs == bool_ty { Ok(bool_ty) } else { Err(mismatch()) };
  }
  if op.is_comparison() {
    let comparable = lhs == rhs || lhs.widens_to(&rhs) || rhs.widens_to(&lhs);
    return if comparable && lhs != bool_ty { Ok(bool_ty) } else { Err(mismatch()) };
  }
  // arithmetic from here on
  arithmetic_result(op, lhs.types, rhs.types)
    .map(TypeExported::new)
    .ok_or_else(mismatch)
}

fn arithmetic_result(op: BinaryOp, lhs: Types, rhs: Types) -> Option<Types> {
  use Types::*;
  if lhs == rhs && lhs.component_type().is_some() && lhs != Bool {
    return Some(lhs);
  }
  match (lhs, rhs) {
    // the single implicit widening
    (Int, Float) | (Float, Int) => Some(Float),
    // scalar broadcast against float vectors
    (Float, Vec2) | (Vec2, Float) => Some(Vec2),
    (Float, Vec3) | (Vec3, Float) => Some(Vec3),
    (Float, Vec4) | (Vec4, Float) => Some(Vec4),
    (Int, IVec2) | (IVec2, Int) => Some(IVec2),
    (Int, IVec3) | (IVec3, Int) => Some(IVec3),
    (Int, IVec4) | (IVec4, Int) => Some(IVec4),
    // matrix application and composition multiply only
    (Mat2, Vec2) if op == BinaryOp::Multiply => Some(Vec2),
    (Mat3, Vec3) if op == BinaryOp::Multiply => Some(Vec3),
    (Mat4, Vec4) if op == BinaryOp::Multiply => Some(Vec4),
    (Mat2, Mat2) | (Mat3, Mat3) | (Mat4, Mat4) if op == BinaryOp::Multiply => Some(lhs),
    _ => None,
  }
}

/// Type of a swizzle access like `v.xyz`. Components must come from one
/// letter set and stay within the base vector's size.
fn swizzle_result(
  base: TypeExported,
  field: &str,
  at: &NodeInfo,
) -> Result<TypeExported, ShaderCompileError> {
  let error = || {
    ShaderCompileError::mismatch(format!("'{field}' is not a component of {base}"), at)
  };
  if base.is_array {
    return Err(error());
  }
  let size = base.types.vector_size().ok_or_else(error)?;
  let scalar = base.types.component_type().ok_or_else(error)?;
  if field.is_empty() || field.len() > 4 {
    return Err(error());
  }
  let set = if field.chars().all(|c| "xyzw".contains(c)) {
    "xyzw"
  } else if field.chars().all(|c| "rgba".contains(c)) {
    "rgba"
  } else {
    return Err(error());
  };
  for c in field.chars() {
    let index = set.find(c).unwrap_or(usize::MAX);
    if index >= size {
      return Err(error());
    }
  }
  Types::vector_of(scalar, field.len()).map(TypeExported::new).ok_or_else(error)
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ TESTS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parse_tree::{
    DeclarationNode, Declarator, DeclaratorNode, ExportedTypeNode, ParameterNode, PropertyNode,
    Token, UniformNode,
  };

  fn info() -> NodeInfo {
    NodeInfo::default()
  }

  fn exported(name: &str) -> ExportedTypeNode {
    ExportedTypeNode { info: info(), children: vec![Token::new(1, 1, name)] }
  }

  fn field_declarator(type_name: &str) -> Declarator {
    Declarator::Field(DeclaratorNode {
      info: info(),
      modifiers: vec![],
      precision: None,
      type_specifier: Token::new(1, 1, type_name),
      array_length: None,
    })
  }

  fn declaration(name: &str, type_name: &str, init: Option<ExprNode>) -> DeclarationNode {
    DeclarationNode { info: info(), name: name.to_owned(), declarator: field_declarator(type_name), init }
  }

  fn uniform(name: &str, type_name: &str) -> UniformNode {
    UniformNode { info: info(), name: name.to_owned(), exported_type: exported(type_name) }
  }

  fn variable(name: &str) -> ExprNode {
    ExprNode::Variable { info: info(), name: name.to_owned() }
  }

  fn float_lit(value: f64) -> ExprNode {
    ExprNode::FloatLiteral { info: info(), value }
  }

  fn parameter(name: &str, type_name: &str) -> ParameterNode {
    ParameterNode { info: info(), name: name.to_owned(), exported_type: exported(type_name) }
  }

  #[test]
  fn compiles_a_small_program() {
    let program = ProgramNode {
      declarations: vec![declaration("gain", "float", Some(float_lit(0.5)))],
      uniforms: vec![uniform("transform", "mat4"), uniform("diffuse", "sampler2D")],
      properties: vec![PropertyNode {
        info: info(),
        name: "ambient".to_owned(),
        exported_type: exported("vec3"),
      }],
      functions: vec![FunctionNode {
        info: info(),
        name: "scaled".to_owned(),
        parameters: vec![parameter("x", "float")],
        return_type: exported("float"),
        body: vec![StatementNode::Return {
          info: info(),
          value: Some(ExprNode::Binary {
            info: info(),
            op: "*".to_owned(),
            lhs: Box::new(variable("x")),
            rhs: Box::new(variable("gain")),
          }),
        }],
      }],
      entry_points: vec![EntryPointNode {
        info: info(),
        stage: StageNode::Fragment,
        inputs: vec![parameter("uv", "vec2")],
        outputs: vec![parameter("color", "vec4")],
        body: vec![StatementNode::Assign {
          info: info(),
          target: "color".to_owned(),
          value: ExprNode::Call {
            info: info(),
            name: "texture2D".to_owned(),
            args: vec![variable("diffuse"), variable("uv")],
          },
        }],
      }],
      outputs: vec![parameter("color", "vec4")],
    };
    let shader = compile(&program, &StdLib::new()).unwrap();
    assert_eq!(shader.declarations.len(), 1);
    assert_eq!(shader.functions.len(), 1);
    assert!(shader.shader_fragment.is_some());
    assert!(shader.shader_vertex.is_none());
    // dense slots in declaration order
    let slots = shader.uniforms();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].as_ref().unwrap().name, "transform");
    assert_eq!(slots[1].as_ref().unwrap().name, "diffuse");
  }

  #[test]
  fn duplicate_top_level_declaration_fails() {
    let program = ProgramNode {
      declarations: vec![
        declaration("x", "float", None),
        declaration("x", "vec2", None),
      ],
      ..ProgramNode::default()
    };
    let err = compile(&program, &StdLib::new()).unwrap_err();
    assert!(matches!(err, ShaderCompileError::DuplicateDeclaration { name, .. } if name == "x"));
  }

  #[test]
  fn undefined_variable_fails() {
    let program = ProgramNode {
      declarations: vec![declaration("x", "float", Some(variable("missing")))],
      ..ProgramNode::default()
    };
    let err = compile(&program, &StdLib::new()).unwrap_err();
    assert!(matches!(err, ShaderCompileError::UndefinedIdentifier { name, .. } if name == "missing"));
  }

  #[test]
  fn branches_must_declare_matching_scopes() {
    let branch_decl = |type_name: &str| StatementNode::Declare {
      info: info(),
      name: "local".to_owned(),
      declarator: field_declarator(type_name),
      init: None,
    };
    let body = vec![StatementNode::If {
      info: info(),
      condition: ExprNode::BoolLiteral { info: info(), value: true },
      then_branch: vec![branch_decl("float")],
      else_branch: vec![branch_decl("vec3")],
    }];
    let program = ProgramNode {
      entry_points: vec![EntryPointNode {
        info: info(),
        stage: StageNode::Fragment,
        inputs: vec![],
        outputs: vec![parameter("color", "vec4")],
        body,
      }],
      ..ProgramNode::default()
    };
    let err = compile(&program, &StdLib::new()).unwrap_err();
    assert!(matches!(err, ShaderCompileError::ScopeMismatch { .. }));
  }

  #[test]
  fn agreeing_branch_declarations_stay_visible_afterwards() {
    let branch_assign = |value: f64| {
      vec![
        StatementNode::Declare {
          info: info(),
          name: "shade".to_owned(),
          declarator: field_declarator("float"),
          init: Some(float_lit(value)),
        },
      ]
    };
    let body = vec![
      StatementNode::If {
        info: info(),
        condition: ExprNode::BoolLiteral { info: info(), value: true },
        then_branch: branch_assign(1.0),
        else_branch: branch_assign(0.0),
      },
      StatementNode::Assign {
        info: info(),
        target: "color".to_owned(),
        value: ExprNode::Call {
          info: info(),
          name: "vec4".to_owned(),
          args: vec![variable("shade")],
        },
      },
    ];
    let program = ProgramNode {
      entry_points: vec![EntryPointNode {
        info: info(),
        stage: StageNode::Fragment,
        inputs: vec![],
        outputs: vec![parameter("color", "vec4")],
        body,
      }],
      ..ProgramNode::default()
    };
    compile(&program, &StdLib::new()).unwrap();
  }

  #[test]
  fn condition_must_be_bool() {
    let body = vec![StatementNode::If {
      info: info(),
      condition: float_lit(1.0),
      then_branch: vec![],
      else_branch: vec![],
    }];
    let program = ProgramNode {
      entry_points: vec![EntryPointNode {
        info: info(),
        stage: StageNode::Vertex,
        inputs: vec![],
        outputs: vec![],
        body,
      }],
      ..ProgramNode::default()
    };
    let err = compile(&program, &StdLib::new()).unwrap_err();
    assert!(matches!(err, ShaderCompileError::TypeMismatch { .. }));
  }

  #[test]
  fn swizzles_type_by_component_count() {
    let scope = Scope::new();
    let table = FunctionTable::new();
    let mut with_v = Scope::child(&scope);
    with_v.add("v", TypeExported::new(Types::Vec3));
    let node = ExprNode::Member {
      info: info(),
      base: Box::new(variable("v")),
      field: "xy".to_owned(),
    };
    let (_, ty) = check_expr(&node, &with_v, &table).unwrap();
    assert_eq!(ty, TypeExported::new(Types::Vec2));
    // .w is out of range on a vec3
    let node = ExprNode::Member {
      info: info(),
      base: Box::new(variable("v")),
      field: "w".to_owned(),
    };
    assert!(check_expr(&node, &with_v, &table).is_err());
  }

  #[test]
  fn matrix_application_types_as_vector() {
    let mut scope = Scope::new();
    scope.add("m", TypeExported::new(Types::Mat4));
    scope.add("p", TypeExported::new(Types::Vec4));
    let node = ExprNode::Binary {
      info: info(),
      op: "*".to_owned(),
      lhs: Box::new(variable("m")),
      rhs: Box::new(variable("p")),
    };
    let (_, ty) = check_expr(&node, &scope, &FunctionTable::new()).unwrap();
    assert_eq!(ty, TypeExported::new(Types::Vec4));
    // addition of matrix and vector is rejected
    let node = ExprNode::Binary {
      info: info(),
      op: "+".to_owned(),
      lhs: Box::new(variable("m")),
      rhs: Box::new(variable("p")),
    };
    assert!(check_expr(&node, &scope, &FunctionTable::new()).is_err());
  }
}
