// SPDX-License-Identifier: MIT

//! Expression language compiler
//!
//! Compiles expressions like:
//! - `${amount > 100}`
//! - `#{task.assignee}`
//! - `Dear ${user.name}, your order ${fn:upper(order.id)} shipped`
//!
//! into immutable [`Tree`]s, and caches them in a [`TreeStore`].

mod ast;
mod bindings;
mod cache;
mod parser;
mod scanner;
mod store;
mod tree;

pub use ast::{format_float, unescape_text, AccessKey, BinaryOp, Literal, Node, UnaryOp};
pub use bindings::{Bindings, FunctionMapper, FunctionRef, FunctionSignature, VariableMapper};
pub use cache::{BoundedCache, ConcurrentCache, TreeCache};
pub use parser::{Feature, Parser, ParserConfig, MAX_DEPTH, MAX_NESTING};
pub use scanner::{Scanner, Symbol, Token};
pub use store::{parse, Builder, TreeBuilder, TreeStore};
pub use tree::Tree;
