use std::fmt;

use strum::{Display, EnumString};

use crate::types::{Type, TypeExported};

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ OPERATORS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// A binary operator in infix notation. The strum derives double as the
/// wire names used when expressions are serialized.
#[derive(Display, EnumString, Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOp {
  #[strum(serialize = "+")]
  Add,
  #[strum(serialize = "-")]
  Subtract,
  #[strum(serialize = "*")]
  Multiply,
  #[strum(serialize = "/")]
  Divide,
  #[strum(serialize = "<")]
  Less,
  #[strum(serialize = "<=")]
  LessEqual,
  #[strum(serialize = ">")]
  Greater,
  #[strum(serialize = ">=")]
  GreaterEqual,
  #[strum(serialize = "==")]
  Equal,
  #[strum(serialize = "!=")]
  NotEqual,
  #[strum(serialize = "&&")]
  And,
  #[strum(serialize = "||")]
  Or,
}

impl BinaryOp {
  pub fn is_comparison(&self) -> bool {
    matches!(
      self,
      BinaryOp::Less
        | BinaryOp::LessEqual
        | BinaryOp::Greater
        | BinaryOp::GreaterEqual
        | BinaryOp::Equal
        | BinaryOp::NotEqual
    )
  }

  pub fn is_logical(&self) -> bool {
    matches!(self, BinaryOp::And | BinaryOp::Or)
  }
}

/// A unary operator in prefix notation.
#[derive(Display, EnumString, Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnaryOp {
  #[strum(serialize = "-")]
  Negate,
  #[strum(serialize = "!")]
  Not,
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ EXPRESSIONS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// A fully typed expression as stored in the IR. Backends read these when
/// emitting target source; the compiler walk produces them from the parse
/// tree's untyped expression nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
  FloatLiteral(f64),
  IntLiteral(i64),
  BoolLiteral(bool),
  Variable(String),
  Call { name: String, args: Vec<Expression> },
  Binary { op: BinaryOp, lhs: Box<Expression>, rhs: Box<Expression> },
  Unary { op: UnaryOp, operand: Box<Expression> },
  Member { base: Box<Expression>, field: String },
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ STATEMENTS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// A typed statement inside a function or entry-point body.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
  Declare { name: String, ty: Type, init: Option<Expression> },
  Assign { target: String, value: Expression },
  Return(Option<Expression>),
  If { condition: Expression, then_branch: Vec<Statement>, else_branch: Vec<Statement> },
  Expr(Expression),
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ SIGNATURES ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// The call-site shape of a function: its name plus the ordered parameter
/// types. This is the key of every function-resolution map, so overloads
/// coexist freely as long as their parameter-type tuples differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionParameterSignature {
  pub name: String,
  pub parameters: Vec<TypeExported>,
}

impl FunctionParameterSignature {
  pub fn new(name: &str, parameters: Vec<TypeExported>) -> Self {
    Self { name: name.to_owned(), parameters }
  }
}

impl fmt::Display for FunctionParameterSignature {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let params: Vec<String> = self.parameters.iter().map(|p| p.to_string()).collect();
    write!(f, "{}({})", self.name, params.join(", "))
  }
}

/// What a call site resolves to: the parameter signature plus the return
/// type visible across the call boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionExportedSignature {
  pub parameters: FunctionParameterSignature,
  pub returns: TypeExported,
}

impl FunctionExportedSignature {
  pub fn new(name: &str, parameters: Vec<TypeExported>, returns: TypeExported) -> Self {
    Self { parameters: FunctionParameterSignature::new(name, parameters), returns }
  }

  pub fn name(&self) -> &str {
    &self.parameters.name
  }
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ FUNCTIONS AND SHADERS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// A user-defined function: its exported signature, the names of its
/// parameters in order, and its body.
#[derive(Debug, Clone, PartialEq)]
pub struct CallFunction {
  pub signature: FunctionExportedSignature,
  pub parameter_names: Vec<String>,
  pub body: Vec<Statement>,
}

/// One named, typed field of a shader stage signature.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureField {
  pub name: String,
  pub ty: TypeExported,
}

impl SignatureField {
  pub fn new(name: &str, ty: TypeExported) -> Self {
    Self { name: name.to_owned(), ty }
  }
}

/// The named, typed inputs and outputs of a shader stage entry point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShaderSignature {
  pub inputs: Vec<SignatureField>,
  pub outputs: Vec<SignatureField>,
}

/// The stage an entry point belongs to.
#[derive(Display, EnumString, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stage {
  #[strum(serialize = "vertex")]
  Vertex,
  #[strum(serialize = "fragment")]
  Fragment,
}

/// An entry point: a stage bound to a signature and a body.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderFunction {
  pub stage: Stage,
  pub signature: ShaderSignature,
  pub body: Vec<Statement>,
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ UNIFORMS AND PROPERTIES ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// An engine-bound external value addressed by a dense integer slot index.
/// The index itself lives in the `CompiledShader`'s slot array, not here.
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform {
  pub name: String,
  pub ty: TypeExported,
}

impl Uniform {
  pub fn new(name: &str, ty: TypeExported) -> Self {
    Self { name: name.to_owned(), ty }
  }
}

/// A named symbolic value resolved to a concrete [`Expression`] only when a
/// `ShaderContext` is built. This is what lets one compiled shader be
/// specialized per rendering context without recompilation.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
  pub name: String,
  pub ty: TypeExported,
}

impl Property {
  pub fn new(name: &str, ty: TypeExported) -> Self {
    Self { name: name.to_owned(), ty }
  }
}

/// A top-level variable declaration as stored in the IR.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
  pub name: String,
  pub ty: Type,
  pub init: Option<Expression>,
}
