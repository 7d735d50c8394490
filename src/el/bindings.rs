// SPDX-License-Identifier: MIT

//! Function and variable bindings
//!
//! The EL core never executes functions or reads variables itself. Callers
//! hand in mappers, and [`Tree::bind`](super::Tree::bind) records what they
//! resolve so an evaluator can walk the tree with the resolved handles.

use serde_json::Value;

/// Signature of a function a caller makes available to expressions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    /// Qualified name, `ns:name` or `name`
    pub name: String,
    /// Number of declared parameters
    pub params: usize,
    /// Whether the last parameter accepts any number of arguments
    pub varargs: bool,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, params: usize) -> Self {
        Self {
            name: name.into(),
            params,
            varargs: false,
        }
    }

    pub fn variadic(name: impl Into<String>, params: usize) -> Self {
        Self {
            name: name.into(),
            params,
            varargs: true,
        }
    }
}

/// A function call site registered by the parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRef {
    pub namespace: Option<String>,
    pub name: String,
    /// Number of arguments at the call site
    pub arity: usize,
    /// Whether variadic signatures may absorb extra arguments
    pub varargs: bool,
}

impl FunctionRef {
    /// `ns:name`, or `name` without a namespace
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}:{}", ns, self.name),
            None => self.name.clone(),
        }
    }
}

/// Resolves function names to signatures
pub trait FunctionMapper {
    /// `prefix` is the namespace, empty when the call has none
    fn resolve_function(&self, prefix: &str, local_name: &str) -> Option<FunctionSignature>;
}

/// Resolves variable names at bind time
pub trait VariableMapper {
    fn resolve_variable(&self, name: &str) -> Option<Value>;
}

/// Result of binding a tree. Indexes match the tree's identifier and
/// function lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    functions: Vec<Option<FunctionSignature>>,
    variables: Vec<Option<Value>>,
}

impl Bindings {
    pub fn new(functions: Vec<Option<FunctionSignature>>, variables: Vec<Option<Value>>) -> Self {
        Self {
            functions,
            variables,
        }
    }

    pub fn is_function_bound(&self, index: usize) -> bool {
        self.function(index).is_some()
    }

    pub fn is_variable_bound(&self, index: usize) -> bool {
        self.variable(index).is_some()
    }

    pub fn function(&self, index: usize) -> Option<&FunctionSignature> {
        self.functions.get(index).and_then(Option::as_ref)
    }

    pub fn variable(&self, index: usize) -> Option<&Value> {
        self.variables.get(index).and_then(Option::as_ref)
    }
}
