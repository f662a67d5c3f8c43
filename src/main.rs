use shadec::parse_tree::{
  EntryPointNode, ExprNode, NodeInfo, ParameterNode, ProgramNode, StageNode, StatementNode, Token,
  UniformNode,
};
use shadec::parse_tree::ExportedTypeNode;
use shadec::{compile, deserialize, serialize, StdLib};

fn info() -> NodeInfo {
  NodeInfo::default()
}

fn exported(name: &str) -> ExportedTypeNode {
  ExportedTypeNode { info: info(), children: vec![Token::new(1, 1, name)] }
}

/// A textured fragment shader, as its parse tree would arrive from the
/// front-end parser.
fn demo_program() -> ProgramNode {
  ProgramNode {
    uniforms: vec![UniformNode {
      info: info(),
      name: "diffuse".to_owned(),
      exported_type: exported("sampler2D"),
    }],
    entry_points: vec![EntryPointNode {
      info: info(),
      stage: StageNode::Fragment,
      inputs: vec![ParameterNode {
        info: info(),
        name: "uv".to_owned(),
        exported_type: exported("vec2"),
      }],
      outputs: vec![ParameterNode {
        info: info(),
        name: "color".to_owned(),
        exported_type: exported("vec4"),
      }],
      body: vec![StatementNode::Assign {
        info: info(),
        target: "color".to_owned(),
        value: ExprNode::Call {
          info: info(),
          name: "texture2D".to_owned(),
          args: vec![
            ExprNode::Variable { info: info(), name: "diffuse".to_owned() },
            ExprNode::Variable { info: info(), name: "uv".to_owned() },
          ],
        },
      }],
    }],
    ..ProgramNode::default()
  }
}

fn main() {
  let stdlib = StdLib::new();
  match compile(&demo_program(), &stdlib) {
    Ok(shader) => {
      let tag = serialize(&shader);
      let restored = deserialize(&tag, &stdlib).expect("round trip");
      println!("compiled shader round-trips: {}", restored == shader);
      println!("{:#?}", tag);
    }
    Err(err) => println!("{}", err),
  }
}
