//! Round-trips the IR through the generic structured tag format.
//!
//! One named field per IR member, uniforms compacted to a string-keyed map
//! that skips empty slots. Reading is atomic: any missing or mistyped field
//! aborts the whole read, never yielding a partially populated shader.

use std::str::FromStr;

use log::debug;

use crate::ast::{
  BinaryOp, CallFunction, Declaration, Expression, FunctionExportedSignature, Property,
  ShaderFunction, ShaderSignature, SignatureField, Stage, Statement, UnaryOp, Uniform,
};
use crate::error::ShaderCompileError;
use crate::shader::CompiledShader;
use crate::stdlib::StdLib;
use crate::tag::Tag;
use crate::types::{ArraySize, Precision, Type, TypeExported, Types};

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ WRITING ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// Serialize a compiled shader to a tag document suitable for caching.
pub fn serialize(shader: &CompiledShader) -> Tag {
  let mut fields: Vec<(&str, Tag)> = vec![
    ("declarations", Tag::List(shader.declarations.iter().map(declaration_to_tag).collect())),
    ("functions", Tag::List(shader.functions.iter().map(function_to_tag).collect())),
    ("uniforms", uniforms_to_tag(shader)),
    ("properties", Tag::List(shader.properties.iter().map(property_to_tag).collect())),
  ];
  if let Some(vertex) = &shader.shader_vertex {
    fields.push(("shaderVertex", shader_function_to_tag(vertex)));
  }
  if let Some(fragment) = &shader.shader_fragment {
    fields.push(("shaderFragment", shader_function_to_tag(fragment)));
  }
  if let Some(outputs) = &shader.outputs {
    fields.push(("outputs", shader_signature_to_tag(outputs)));
  }
  Tag::Map(fields.into_iter().map(|(k, v)| (k.to_owned(), v)).collect())
}

/// Uniform slots compact to a map from stringified slot index to uniform,
/// skipping empty slots; the wire format never stores gaps explicitly.
fn uniforms_to_tag(shader: &CompiledShader) -> Tag {
  Tag::Map(
    shader
      .uniform_entries()
      .map(|(index, uniform)| (index.to_string(), uniform_to_tag(uniform)))
      .collect(),
  )
}

fn exported_to_tag(ty: &TypeExported) -> Tag {
  Tag::map([("type", Tag::Str(ty.types.to_string())), ("array", Tag::Bool(ty.is_array))])
}

fn type_to_tag(ty: &Type) -> Tag {
  let mut fields = vec![
    ("type", Tag::Str(ty.types.to_string())),
    ("precision", Tag::Str(ty.precision.to_string())),
    ("const", Tag::Bool(ty.constant)),
  ];
  match ty.array_size {
    Some(ArraySize::Fixed(len)) => fields.push(("arraySize", Tag::Int(len as i64))),
    Some(ArraySize::Unsized) => fields.push(("arraySize", Tag::str("unsized"))),
    None => {}
  }
  Tag::Map(fields.into_iter().map(|(k, v)| (k.to_owned(), v)).collect())
}

fn expression_to_tag(expr: &Expression) -> Tag {
  match expr {
    Expression::FloatLiteral(value) => {
      Tag::map([("kind", Tag::str("float")), ("value", Tag::Float(*value))])
    }
    Expression::IntLiteral(value) => {
      Tag::map([("kind", Tag::str("int")), ("value", Tag::Int(*value))])
    }
    Expression::BoolLiteral(value) => {
      Tag::map([("kind", Tag::str("bool")), ("value", Tag::Bool(*value))])
    }
    Expression::Variable(name) => {
      Tag::map([("kind", Tag::str("var")), ("name", Tag::str(name))])
    }
    Expression::Call { name, args } => Tag::map([
      ("kind", Tag::str("call")),
      ("name", Tag::str(name)),
      ("args", Tag::List(args.iter().map(expression_to_tag).collect())),
    ]),
    Expression::Binary { op, lhs, rhs } => Tag::map([
      ("kind", Tag::str("binary")),
      ("op", Tag::Str(op.to_string())),
      ("lhs", expression_to_tag(lhs)),
      ("rhs", expression_to_tag(rhs)),
    ]),
    Expression::Unary { op, operand } => Tag::map([
      ("kind", Tag::str("unary")),
      ("op", Tag::Str(op.to_string())),
      ("operand", expression_to_tag(operand)),
    ]),
    Expression::Member { base, field } => Tag::map([
      ("kind", Tag::str("member")),
      ("base", expression_to_tag(base)),
      ("field", Tag::str(field)),
    ]),
  }
}

fn statement_to_tag(statement: &Statement) -> Tag {
  match statement {
    Statement::Declare { name, ty, init } => {
      let mut fields = vec![
        ("kind", Tag::str("declare")),
        ("name", Tag::str(name)),
        ("type", type_to_tag(ty)),
      ];
      if let Some(init) = init {
        fields.push(("init", expression_to_tag(init)));
      }
      Tag::Map(fields.into_iter().map(|(k, v)| (k.to_owned(), v)).collect())
    }
    Statement::Assign { target, value } => Tag::map([
      ("kind", Tag::str("assign")),
      ("target", Tag::str(target)),
      ("value", expression_to_tag(value)),
    ]),
    Statement::Return(value) => match value {
      Some(expr) => Tag::map([("kind", Tag::str("return")), ("value", expression_to_tag(expr))]),
      None => Tag::map([("kind", Tag::str("return"))]),
    },
    Statement::If { condition, then_branch, else_branch } => Tag::map([
      ("kind", Tag::str("if")),
      ("condition", expression_to_tag(condition)),
      ("then", Tag::List(then_branch.iter().map(statement_to_tag).collect())),
      ("else", Tag::List(else_branch.iter().map(statement_to_tag).collect())),
    ]),
    Statement::Expr(expr) => {
      Tag::map([("kind", Tag::str("expr")), ("expr", expression_to_tag(expr))])
    }
  }
}

fn declaration_to_tag(declaration: &Declaration) -> Tag {
  let mut fields = vec![
    ("name", Tag::str(&declaration.name)),
    ("type", type_to_tag(&declaration.ty)),
  ];
  if let Some(init) = &declaration.init {
    fields.push(("init", expression_to_tag(init)));
  }
  Tag::Map(fields.into_iter().map(|(k, v)| (k.to_owned(), v)).collect())
}

fn signature_to_tag(signature: &FunctionExportedSignature) -> Tag {
  Tag::map([
    ("name", Tag::str(signature.name())),
    (
      "parameters",
      Tag::List(signature.parameters.parameters.iter().map(exported_to_tag).collect()),
    ),
    ("returns", exported_to_tag(&signature.returns)),
  ])
}

fn function_to_tag(function: &CallFunction) -> Tag {
  Tag::map([
    ("signature", signature_to_tag(&function.signature)),
    (
      "parameterNames",
      Tag::List(function.parameter_names.iter().map(|n| Tag::str(n)).collect()),
    ),
    ("body", Tag::List(function.body.iter().map(statement_to_tag).collect())),
  ])
}

fn signature_field_to_tag(field: &SignatureField) -> Tag {
  Tag::map([("name", Tag::str(&field.name)), ("type", exported_to_tag(&field.ty))])
}

fn shader_signature_to_tag(signature: &ShaderSignature) -> Tag {
  Tag::map([
    ("inputs", Tag::List(signature.inputs.iter().map(signature_field_to_tag).collect())),
    ("outputs", Tag::List(signature.outputs.iter().map(signature_field_to_tag).collect())),
  ])
}

fn shader_function_to_tag(function: &ShaderFunction) -> Tag {
  Tag::map([
    ("stage", Tag::Str(function.stage.to_string())),
    ("signature", shader_signature_to_tag(&function.signature)),
    ("body", Tag::List(function.body.iter().map(statement_to_tag).collect())),
  ])
}

fn uniform_to_tag(uniform: &Uniform) -> Tag {
  Tag::map([("name", Tag::str(&uniform.name)), ("type", exported_to_tag(&uniform.ty))])
}

fn property_to_tag(property: &Property) -> Tag {
  Tag::map([("name", Tag::str(&property.name)), ("type", exported_to_tag(&property.ty))])
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ READING ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// Deserialize a compiled shader from a tag document. The read is atomic:
/// any malformed element yields an error and no shader.
pub fn deserialize(tag: &Tag, stdlib: &StdLib) -> Result<CompiledShader, ShaderCompileError> {
  let declarations = tag
    .field("declarations")?
    .as_list("declarations")?
    .iter()
    .map(declaration_from_tag)
    .collect::<Result<Vec<_>, _>>()?;
  let functions = tag
    .field("functions")?
    .as_list("functions")?
    .iter()
    .map(function_from_tag)
    .collect::<Result<Vec<_>, _>>()?;
  let shader_vertex =
    tag.field_opt("shaderVertex")?.map(shader_function_from_tag).transpose()?;
  let shader_fragment =
    tag.field_opt("shaderFragment")?.map(shader_function_from_tag).transpose()?;
  let outputs = tag.field_opt("outputs")?.map(shader_signature_from_tag).transpose()?;
  let uniforms = uniforms_from_tag(tag.field("uniforms")?)?;
  let properties = tag
    .field("properties")?
    .as_list("properties")?
    .iter()
    .map(property_from_tag)
    .collect::<Result<Vec<_>, _>>()?;
  debug!("deserialized shader IR with {} uniform entries", uniforms.len());
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

/// Rebuild the sparse slot assignment from the compacted map: every key is
/// a stringified slot index, unlisted indices default back to empty slots.
fn uniforms_from_tag(tag: &Tag) -> Result<Vec<(usize, Uniform)>, ShaderCompileError> {
  tag
    .as_map("uniforms")?
    .iter()
    .map(|(key, value)| {
      let index = key.parse::<usize>().map_err(|_| {
        ShaderCompileError::malformed(format!("uniform slot key '{key}' is not an index"))
      })?;
      Ok((index, uniform_from_tag(value)?))
    })
    .collect()
}

fn types_from_tag(tag: &Tag) -> Result<Types, ShaderCompileError> {
  let name = tag.as_str("type name")?;
  Types::from_str(name)
    .map_err(|_| ShaderCompileError::malformed(format!("unknown type name '{name}'")))
}

fn exported_from_tag(tag: &Tag) -> Result<TypeExported, ShaderCompileError> {
  Ok(TypeExported {
    types: types_from_tag(tag.field("type")?)?,
    is_array: tag.field("array")?.as_bool("array")?,
  })
}

fn type_from_tag(tag: &Tag) -> Result<Type, ShaderCompileError> {
  let precision_name = tag.field("precision")?.as_str("precision")?;
  let precision = Precision::from_str(precision_name).map_err(|_| {
    ShaderCompileError::malformed(format!("unknown precision '{precision_name}'"))
  })?;
  let array_size = match tag.field_opt("arraySize")? {
    None => None,
    Some(Tag::Int(len)) if *len >= 0 => Some(ArraySize::Fixed(*len as u32)),
    Some(Tag::Str(s)) if s == "unsized" => Some(ArraySize::Unsized),
    Some(_) => return Err(ShaderCompileError::malformed("invalid arraySize")),
  };
  Ok(Type {
    types: types_from_tag(tag.field("type")?)?,
    array_size,
    constant: tag.field("const")?.as_bool("const")?,
    precision,
  })
}

fn expression_from_tag(tag: &Tag) -> Result<Expression, ShaderCompileError> {
  let kind = tag.field("kind")?.as_str("kind")?;
  match kind {
    "float" => Ok(Expression::FloatLiteral(tag.field("value")?.as_float("value")?)),
    "int" => Ok(Expression::IntLiteral(tag.field("value")?.as_int("value")?)),
    "bool" => Ok(Expression::BoolLiteral(tag.field("value")?.as_bool("value")?)),
    "var" => Ok(Expression::Variable(tag.field("name")?.as_str("name")?.to_owned())),
    "call" => Ok(Expression::Call {
      name: tag.field("name")?.as_str("name")?.to_owned(),
      args: tag
        .field("args")?
        .as_list("args")?
        .iter()
        .map(expression_from_tag)
        .collect::<Result<Vec<_>, _>>()?,
    }),
    "binary" => {
      let op_name = tag.field("op")?.as_str("op")?;
      Ok(Expression::Binary {
        op: BinaryOp::from_str(op_name).map_err(|_| {
          ShaderCompileError::malformed(format!("unknown binary operator '{op_name}'"))
        })?,
        lhs: Box::new(expression_from_tag(tag.field("lhs")?)?),
        rhs: Box::new(expression_from_tag(tag.field("rhs")?)?),
      })
    }
    "unary" => {
      let op_name = tag.field("op")?.as_str("op")?;
      Ok(Expression::Unary {
        op: UnaryOp::from_str(op_name).map_err(|_| {
          ShaderCompileError::malformed(format!("unknown unary operator '{op_name}'"))
        })?,
        operand: Box::new(expression_from_tag(tag.field("operand")?)?),
      })
    }
    "member" => Ok(Expression::Member {
      base: Box::new(expression_from_tag(tag.field("base")?)?),
      field: tag.field("field")?.as_str("field")?.to_owned(),
    }),
    other => Err(ShaderCompileError::malformed(format!("unknown expression kind '{other}'"))),
  }
}

fn statement_from_tag(tag: &Tag) -> Result<Statement, ShaderCompileError> {
  let kind = tag.field("kind")?.as_str("kind")?;
  match kind {
    "declare" => Ok(Statement::Declare {
      name: tag.field("name")?.as_str("name")?.to_owned(),
      ty: type_from_tag(tag.field("type")?)?,
      init: tag.field_opt("init")?.map(expression_from_tag).transpose()?,
    }),
    "assign" => Ok(Statement::Assign {
      target: tag.field("target")?.as_str("target")?.to_owned(),
      value: expression_from_tag(tag.field("value")?)?,
    }),
    "return" => Ok(Statement::Return(
      tag.field_opt("value")?.map(expression_from_tag).transpose()?,
    )),
    "if" => Ok(Statement::If {
      condition: expression_from_tag(tag.field("condition")?)?,
      then_branch: tag
        .field("then")?
        .as_list("then")?
        .iter()
        .map(statement_from_tag)
        .collect::<Result<Vec<_>, _>>()?,
      else_branch: tag
        .field("else")?
        .as_list("else")?
        .iter()
        .map(statement_from_tag)
        .collect::<Result<Vec<_>, _>>()?,
    }),
    "expr" => Ok(Statement::Expr(expression_from_tag(tag.field("expr")?)?)),
    other => Err(ShaderCompileError::malformed(format!("unknown statement kind '{other}'"))),
  }
}

fn declaration_from_tag(tag: &Tag) -> Result<Declaration, ShaderCompileError> {
  Ok(Declaration {
    name: tag.field("name")?.as_str("name")?.to_owned(),
    ty: type_from_tag(tag.field("type")?)?,
    init: tag.field_opt("init")?.map(expression_from_tag).transpose()?,
  })
}

fn signature_from_tag(tag: &Tag) -> Result<FunctionExportedSignature, ShaderCompileError> {
  Ok(FunctionExportedSignature::new(
    tag.field("name")?.as_str("name")?,
    tag
      .field("parameters")?
      .as_list("parameters")?
      .iter()
      .map(exported_from_tag)
      .collect::<Result<Vec<_>, _>>()?,
    exported_from_tag(tag.field("returns")?)?,
  ))
}

fn function_from_tag(tag: &Tag) -> Result<CallFunction, ShaderCompileError> {
  Ok(CallFunction {
    signature: signature_from_tag(tag.field("signature")?)?,
    parameter_names: tag
      .field("parameterNames")?
      .as_list("parameterNames")?
      .iter()
      .map(|t| Ok(t.as_str("parameter name")?.to_owned()))
      .collect::<Result<Vec<_>, ShaderCompileError>>()?,
    body: tag
      .field("body")?
      .as_list("body")?
      .iter()
      .map(statement_from_tag)
      .collect::<Result<Vec<_>, _>>()?,
  })
}

fn signature_field_from_tag(tag: &Tag) -> Result<SignatureField, ShaderCompileError> {
  Ok(SignatureField {
    name: tag.field("name")?.as_str("name")?.to_owned(),
    ty: exported_from_tag(tag.field("type")?)?,
  })
}

fn shader_signature_from_tag(tag: &Tag) -> Result<ShaderSignature, ShaderCompileError> {
  Ok(ShaderSignature {
    inputs: tag
      .field("inputs")?
      .as_list("inputs")?
      .iter()
      .map(signature_field_from_tag)
      .collect::<Result<Vec<_>, _>>()?,
    outputs: tag
      .field("outputs")?
      .as_list("outputs")?
      .iter()
      .map(signature_field_from_tag)
      .collect::<Result<Vec<_>, _>>()?,
  })
}

fn shader_function_from_tag(tag: &Tag) -> Result<ShaderFunction, ShaderCompileError> {
  let stage_name = tag.field("stage")?.as_str("stage")?;
  Ok(ShaderFunction {
    stage: Stage::from_str(stage_name)
      .map_err(|_| ShaderCompileError::malformed(format!("unknown stage '{stage_name}'")))?,
    signature: shader_signature_from_tag(tag.field("signature")?)?,
    body: tag
      .field("body")?
      .as_list("body")?
      .iter()
      .map(statement_from_tag)
      .collect::<Result<Vec<_>, _>>()?,
  })
}

fn uniform_from_tag(tag: &Tag) -> Result<Uniform, ShaderCompileError> {
  Ok(Uniform {
    name: tag.field("name")?.as_str("name")?.to_owned(),
    ty: exported_from_tag(tag.field("type")?)?,
  })
}

fn property_from_tag(tag: &Tag) -> Result<Property, ShaderCompileError> {
  Ok(Property {
    name: tag.field("name")?.as_str("name")?.to_owned(),
    ty: exported_from_tag(tag.field("type")?)?,
  })
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ TESTS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::Statement;
  use crate::types::Types;

  fn float() -> TypeExported {
    TypeExported::new(Types::Float)
  }

  fn sample_shader(uniforms: Vec<(usize, Uniform)>) -> CompiledShader {
    let body = vec![Statement::Return(Some(Expression::Binary {
      op: BinaryOp::Multiply,
      lhs: Box::new(Expression::Variable("x".to_owned())),
      rhs: Box::new(Expression::FloatLiteral(2.0)),
    }))];
    CompiledShader::new(
      vec![Declaration {
        name: "gain".to_owned(),
        ty: Type { constant: true, ..Type::new(Types::Float) },
        init: Some(Expression::FloatLiteral(0.5)),
      }],
      vec![CallFunction {
        signature: FunctionExportedSignature::new("doubled", vec![float()], float()),
        parameter_names: vec!["x".to_owned()],
        body,
      }],
      None,
      Some(ShaderFunction {
        stage: Stage::Fragment,
        signature: ShaderSignature {
          inputs: vec![SignatureField::new("uv", TypeExported::new(Types::Vec2))],
          outputs: vec![SignatureField::new("color", TypeExported::new(Types::Vec4))],
        },
        body: vec![Statement::Assign {
          target: "color".to_owned(),
          value: Expression::Call {
            name: "vec4".to_owned(),
            args: vec![Expression::FloatLiteral(1.0)],
          },
        }],
      }),
      Some(ShaderSignature {
        inputs: vec![],
        outputs: vec![SignatureField::new("color", TypeExported::new(Types::Vec4))],
      }),
      uniforms,
      vec![Property::new("ambient", TypeExported::new(Types::Vec3))],
      &StdLib::new(),
    )
    .unwrap()
  }

  #[test]
  fn round_trip_reproduces_the_shader() {
    let shader = sample_shader(vec![
      (0, Uniform::new("transform", TypeExported::new(Types::Mat4))),
      (3, Uniform::new("diffuse", TypeExported::new(Types::Sampler2D))),
    ]);
    let restored = deserialize(&serialize(&shader), &StdLib::new()).unwrap();
    assert_eq!(restored, shader);
    // gaps survive the round trip: indices 1 and 2 stay empty
    let slots = restored.uniforms();
    assert_eq!(slots.len(), 4);
    assert!(slots[1].is_none());
    assert!(slots[2].is_none());
  }

  #[test]
  fn uniform_compaction_skips_empty_slots() {
    let shader = sample_shader(vec![
      (2, Uniform::new("a", float())),
      (5, Uniform::new("b", float())),
    ]);
    let tag = serialize(&shader);
    let uniforms = tag.field("uniforms").unwrap().as_map("uniforms").unwrap();
    assert_eq!(uniforms.len(), 2);
    assert!(uniforms.contains_key("2"));
    assert!(uniforms.contains_key("5"));
    let restored = deserialize(&tag, &StdLib::new()).unwrap();
    assert_eq!(restored.uniforms().len(), 6);
  }

  #[test]
  fn missing_required_field_aborts_the_read() {
    let shader = sample_shader(vec![]);
    let tag = serialize(&shader);
    let Tag::Map(mut fields) = tag else { panic!("serialized shader is not a map") };
    fields.remove("functions");
    let err = deserialize(&Tag::Map(fields), &StdLib::new()).unwrap_err();
    assert!(matches!(err, ShaderCompileError::MalformedArtifact { .. }));
  }

  #[test]
  fn non_integer_uniform_key_aborts_the_read() {
    let shader = sample_shader(vec![]);
    let tag = serialize(&shader);
    let Tag::Map(mut fields) = tag else { panic!("serialized shader is not a map") };
    fields.insert(
      "uniforms".to_owned(),
      Tag::map([("zero", uniform_to_tag(&Uniform::new("u", float())))]),
    );
    let err = deserialize(&Tag::Map(fields), &StdLib::new()).unwrap_err();
    assert!(matches!(err, ShaderCompileError::MalformedArtifact { .. }));
  }

  #[test]
  fn expressions_round_trip_structurally() {
    let expr = Expression::Unary {
      op: UnaryOp::Negate,
      operand: Box::new(Expression::Member {
        base: Box::new(Expression::Variable("normal".to_owned())),
        field: "xyz".to_owned(),
      }),
    };
    assert_eq!(expression_from_tag(&expression_to_tag(&expr)).unwrap(), expr);
  }
}
