// SPDX-License-Identifier: MIT

//! Abstract Syntax Tree for EL expressions

use super::bindings::Bindings;
use std::fmt;

/// An expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Text outside of any eval block, in its raw source spelling
    Text { raw: String },
    /// A `${...}` (dynamic) or `#{...}` (deferred) block
    Eval { deferred: bool, child: Box<Node> },
    /// Literal value
    Literal(Literal),
    /// Variable reference; `index` points into the tree's identifier list
    Identifier { name: String, index: usize },
    /// Property or index access: `base.name` / `base[expr]`
    Access {
        base: Box<Node>,
        key: AccessKey,
        lvalue: bool,
    },
    /// Parenthesized expression
    Bracket(Box<Node>),
    /// Unary operation
    Unary { op: UnaryOp, operand: Box<Node> },
    /// Binary operation
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// `cond ? then : otherwise`
    Ternary {
        cond: Box<Node>,
        then: Box<Node>,
        otherwise: Box<Node>,
    },
    /// Function call `ns:name(args)`; `index` points into the tree's function list
    Call {
        namespace: Option<String>,
        name: String,
        index: usize,
        args: Vec<Node>,
    },
    /// Method invocation `base.name(args)` / `base[expr](args)`
    Method { target: Box<Node>, args: Vec<Node> },
    /// Interleaved text and eval blocks
    Composite(Vec<Node>),
}

/// Access key of an [`Node::Access`]
#[derive(Debug, Clone, PartialEq)]
pub enum AccessKey {
    /// `.name`
    Property(String),
    /// `[expr]`
    Index(Box<Node>),
}

/// Literal values in expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    /// Digits of an integer beyond `i64`, without leading zeros
    BigInteger(String),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-`
    Minus,
    /// `!` / `not`
    Not,
    /// `empty`
    Empty,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Minus => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
            UnaryOp::Empty => write!(f, "empty"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Mod => write!(f, "%"),
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Lt => write!(f, "<"),
            BinaryOp::Gt => write!(f, ">"),
            BinaryOp::Le => write!(f, "<="),
            BinaryOp::Ge => write!(f, ">="),
            BinaryOp::Eq => write!(f, "=="),
            BinaryOp::Ne => write!(f, "!="),
            BinaryOp::And => write!(f, "&&"),
            BinaryOp::Or => write!(f, "||"),
        }
    }
}

/// Canonical float spelling: always `integer.fraction`
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let s = value.to_string();
    if s.contains('.') {
        s
    } else {
        format!("{}.0", s)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::BigInteger(digits) => write!(f, "{}", digits),
            Literal::Float(v) => write!(f, "{}", format_float(*v)),
            Literal::String(s) => {
                write!(f, "'")?;
                for c in s.chars() {
                    if c == '\\' || c == '\'' {
                        write!(f, "\\")?;
                    }
                    write!(f, "{}", c)?;
                }
                write!(f, "'")
            }
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Null => write!(f, "null"),
        }
    }
}

/// Interpret the escapes of a text node: `\${`, `\#{` and `\\`.
/// Any other backslash is kept.
pub fn unescape_text(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            match (chars.get(i + 1), chars.get(i + 2)) {
                (Some('\\'), _) => {
                    out.push('\\');
                    i += 2;
                    continue;
                }
                (Some(&d), Some('{')) if d == '$' || d == '#' => {
                    out.push(d);
                    i += 2;
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
        i += 1;
    }
    out
}

fn append_args(out: &mut String, args: &[Node], bindings: Option<&Bindings>) {
    out.push('(');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        arg.append_structure(out, bindings);
    }
    out.push(')');
}

impl Node {
    /// Whether the node can be the target of an assignment
    pub fn is_left_value(&self) -> bool {
        match self {
            Node::Identifier { .. } => true,
            Node::Access { lvalue, .. } => *lvalue,
            Node::Eval { child, .. } => child.is_left_value(),
            Node::Text { .. }
            | Node::Literal(_)
            | Node::Bracket(_)
            | Node::Unary { .. }
            | Node::Binary { .. }
            | Node::Ternary { .. }
            | Node::Call { .. }
            | Node::Method { .. }
            | Node::Composite(_) => false,
        }
    }

    pub fn is_literal_text(&self) -> bool {
        matches!(self, Node::Text { .. })
    }

    /// Append the canonical spelling of this node
    pub fn append_structure(&self, out: &mut String, bindings: Option<&Bindings>) {
        match self {
            Node::Text { raw } => out.push_str(raw),
            Node::Eval { deferred, child } => {
                out.push_str(if *deferred { "#{" } else { "${" });
                child.append_structure(out, bindings);
                out.push('}');
            }
            Node::Literal(literal) => out.push_str(&literal.to_string()),
            Node::Identifier { name, index } => {
                if bindings.is_some_and(|b| b.is_variable_bound(*index)) {
                    out.push_str("<var>");
                } else {
                    out.push_str(name);
                }
            }
            Node::Access { base, key, .. } => {
                base.append_structure(out, bindings);
                match key {
                    AccessKey::Property(name) => {
                        out.push('.');
                        out.push_str(name);
                    }
                    AccessKey::Index(index) => {
                        out.push('[');
                        index.append_structure(out, bindings);
                        out.push(']');
                    }
                }
            }
            Node::Bracket(inner) => {
                out.push('(');
                inner.append_structure(out, bindings);
                out.push(')');
            }
            Node::Unary { op, operand } => {
                out.push_str(&op.to_string());
                out.push(' ');
                operand.append_structure(out, bindings);
            }
            Node::Binary { op, left, right } => {
                left.append_structure(out, bindings);
                out.push(' ');
                out.push_str(&op.to_string());
                out.push(' ');
                right.append_structure(out, bindings);
            }
            Node::Ternary {
                cond,
                then,
                otherwise,
            } => {
                cond.append_structure(out, bindings);
                out.push_str(" ? ");
                then.append_structure(out, bindings);
                out.push_str(" : ");
                otherwise.append_structure(out, bindings);
            }
            Node::Call {
                namespace,
                name,
                index,
                args,
            } => {
                if bindings.is_some_and(|b| b.is_function_bound(*index)) {
                    out.push_str("<fn>");
                } else {
                    if let Some(ns) = namespace {
                        out.push_str(ns);
                        out.push(':');
                    }
                    out.push_str(name);
                }
                append_args(out, args, bindings);
            }
            Node::Method { target, args } => {
                target.append_structure(out, bindings);
                append_args(out, args, bindings);
            }
            Node::Composite(parts) => {
                for part in parts {
                    part.append_structure(out, bindings);
                }
            }
        }
    }
}
