//! The parse-tree contract handed over by the external parser.
//!
//! The crate never tokenizes source text. Whatever front-end produced the
//! concrete syntax hands us these nodes, each carrying its position and
//! matched text so that compile errors can point back into the source.

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ LEAVES ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// Position and matched text of a parse-tree node, kept on every node for
/// diagnostics. The counterpart of the parser's own span type.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
  pub line_col: (usize, usize),
  pub text: String,
}

impl NodeInfo {
  pub fn new(line: usize, col: usize, text: &str) -> Self {
    Self { line_col: (line, col), text: text.to_owned() }
  }
}

impl Default for NodeInfo {
  fn default() -> Self {
    Self { line_col: (0, 0), text: String::new() }
  }
}

/// A leaf token such as a modifier keyword or an integer constant.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
  pub info: NodeInfo,
}

impl Token {
  pub fn new(line: usize, col: usize, text: &str) -> Self {
    Self { info: NodeInfo::new(line, col, text) }
  }

  pub fn text(&self) -> &str {
    &self.info.text
  }
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ DECLARATORS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// The two concrete declarator shapes the parser produces. The set is closed,
/// so dispatch is a pattern match rather than a trait object.
#[derive(Debug, Clone, PartialEq)]
pub enum Declarator {
  Field(DeclaratorNode),
  Array(DeclaratorNode),
}

impl Declarator {
  pub fn node(&self) -> &DeclaratorNode {
    match self {
      Declarator::Field(node) => node,
      Declarator::Array(node) => node,
    }
  }

  pub fn info(&self) -> &NodeInfo {
    &self.node().info
  }
}

/// A declarator context node: modifier tokens in source order, an optional
/// precision-specifier child, the type-specifier child and, for array
/// declarators, the integer-constant length child.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaratorNode {
  pub info: NodeInfo,
  pub modifiers: Vec<Token>,
  pub precision: Option<Token>,
  pub type_specifier: Token,
  pub array_length: Option<Token>,
}

impl DeclaratorNode {
  /// Whether a `const` modifier token is present among the direct children.
  /// Position among the modifiers does not matter, presence does.
  pub fn has_const(&self) -> bool {
    self.modifiers.iter().any(|tok| tok.text() == "const")
  }
}

/// An exported-type context node as it appears in function signatures.
/// Array-ness is structural: more than one child token present.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedTypeNode {
  pub info: NodeInfo,
  pub children: Vec<Token>,
}

impl ExportedTypeNode {
  pub fn is_array(&self) -> bool {
    self.children.len() > 1
  }
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ EXPRESSIONS AND STATEMENTS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// An untyped expression node. The compiler walk turns these into typed
/// [`crate::ast::Expression`]s, erroring out where no type can be assigned.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
  FloatLiteral { info: NodeInfo, value: f64 },
  IntLiteral { info: NodeInfo, value: i64 },
  BoolLiteral { info: NodeInfo, value: bool },
  Variable { info: NodeInfo, name: String },
  Call { info: NodeInfo, name: String, args: Vec<ExprNode> },
  Binary { info: NodeInfo, op: String, lhs: Box<ExprNode>, rhs: Box<ExprNode> },
  Unary { info: NodeInfo, op: String, operand: Box<ExprNode> },
  Member { info: NodeInfo, base: Box<ExprNode>, field: String },
}

impl ExprNode {
  pub fn info(&self) -> &NodeInfo {
    match self {
      ExprNode::FloatLiteral { info, .. }
      | ExprNode::IntLiteral { info, .. }
      | ExprNode::BoolLiteral { info, .. }
      | ExprNode::Variable { info, .. }
      | ExprNode::Call { info, .. }
      | ExprNode::Binary { info, .. }
      | ExprNode::Unary { info, .. }
      | ExprNode::Member { info, .. } => info,
    }
  }
}

/// An untyped statement node.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementNode {
  Declare { info: NodeInfo, name: String, declarator: Declarator, init: Option<ExprNode> },
  Assign { info: NodeInfo, target: String, value: ExprNode },
  Return { info: NodeInfo, value: Option<ExprNode> },
  If {
    info: NodeInfo,
    condition: ExprNode,
    then_branch: Vec<StatementNode>,
    else_branch: Vec<StatementNode>,
  },
  Expr { info: NodeInfo, expr: ExprNode },
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ TOP-LEVEL NODES ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// A top-level variable declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationNode {
  pub info: NodeInfo,
  pub name: String,
  pub declarator: Declarator,
  pub init: Option<ExprNode>,
}

/// A uniform declaration. Slots are assigned densely in declaration order
/// during compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformNode {
  pub info: NodeInfo,
  pub name: String,
  pub exported_type: ExportedTypeNode,
}

/// A property declaration: a named placeholder bound to a concrete
/// expression only when a `ShaderContext` is built.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyNode {
  pub info: NodeInfo,
  pub name: String,
  pub exported_type: ExportedTypeNode,
}

/// A named parameter of a user function.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterNode {
  pub info: NodeInfo,
  pub name: String,
  pub exported_type: ExportedTypeNode,
}

/// A user function definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionNode {
  pub info: NodeInfo,
  pub name: String,
  pub parameters: Vec<ParameterNode>,
  pub return_type: ExportedTypeNode,
  pub body: Vec<StatementNode>,
}

/// The shader stage an entry point belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageNode {
  Vertex,
  Fragment,
}

/// An entry-point definition for one shader stage.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryPointNode {
  pub info: NodeInfo,
  pub stage: StageNode,
  pub inputs: Vec<ParameterNode>,
  pub outputs: Vec<ParameterNode>,
  pub body: Vec<StatementNode>,
}

/// The root of the parse tree as handed over by the parser: everything the
/// compiler walk consumes in one compilation unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramNode {
  pub declarations: Vec<DeclarationNode>,
  pub uniforms: Vec<UniformNode>,
  pub properties: Vec<PropertyNode>,
  pub functions: Vec<FunctionNode>,
  pub entry_points: Vec<EntryPointNode>,
  pub outputs: Vec<ParameterNode>,
}
