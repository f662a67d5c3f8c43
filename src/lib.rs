//! Front- and mid-end of a shading-language compiler.
//!
//! The crate consumes an already-built parse tree of a C-like shader source
//! and produces a validated, backend-agnostic [`CompiledShader`]: scopes are
//! resolved, types and precisions inferred, array sizes constant-folded,
//! calls matched against user functions and the standard library, and dense
//! uniform slots assigned. The IR round-trips through a generic structured
//! tag format for caching and is projected per target into a
//! [`ShaderContext`] for backend code generators.
//!
//! Compilation is synchronous and single-threaded; everything it produces is
//! immutable and freely shared afterwards.

pub mod ast;
pub mod compiler;
pub mod context;
pub mod error;
pub mod parse_tree;
pub mod scope;
pub mod serialize;
pub mod shader;
pub mod stdlib;
pub mod tag;
pub mod types;

pub use compiler::compile;
pub use context::ShaderContext;
pub use error::ShaderCompileError;
pub use serialize::{deserialize, serialize};
pub use shader::CompiledShader;
pub use stdlib::StdLib;
