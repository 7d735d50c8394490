// SPDX-License-Identifier: MIT

//! Compiled expression tree

use super::ast::Node;
use super::bindings::{Bindings, FunctionMapper, FunctionRef, VariableMapper};
use crate::error::{BindError, ElError};
use std::fmt;

/// A parsed expression. Immutable after construction and shared read-only
/// across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    root: Node,
    deferred: bool,
    literal_text: bool,
    identifiers: Vec<String>,
    functions: Vec<FunctionRef>,
}

impl Tree {
    pub(crate) fn new(
        root: Node,
        deferred: bool,
        identifiers: Vec<String>,
        functions: Vec<FunctionRef>,
    ) -> Self {
        let literal_text = root.is_literal_text();
        Self {
            root,
            deferred,
            literal_text,
            identifiers,
            functions,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// True when the source contains no eval block
    pub fn is_literal_text(&self) -> bool {
        self.literal_text
    }

    /// True when the expression uses `#{...}` blocks
    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    pub fn is_left_value(&self) -> bool {
        self.root.is_left_value()
    }

    /// Distinct identifier names in order of first occurrence
    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    /// Distinct function call sites in order of first occurrence
    pub fn functions(&self) -> &[FunctionRef] {
        &self.functions
    }

    /// Canonical spelling of the expression. Alias keywords become their
    /// symbolic operators and whitespace is normalized, so equivalent inputs
    /// produce equal ids. With `bindings`, bound identifiers print as
    /// `<var>` and bound functions as `<fn>`.
    pub fn structural_id(&self, bindings: Option<&Bindings>) -> String {
        let mut out = String::new();
        self.root.append_structure(&mut out, bindings);
        out
    }

    /// Resolve every function call site and identifier through the given
    /// mappers.
    ///
    /// Each function must resolve and accept the call's argument count;
    /// identifiers are optional and stay unbound when the mapper does not
    /// know them.
    pub fn bind(
        &self,
        functions: Option<&dyn FunctionMapper>,
        variables: Option<&dyn VariableMapper>,
    ) -> Result<Bindings, ElError> {
        let mut resolved = Vec::with_capacity(self.functions.len());
        for function in &self.functions {
            let signature = functions
                .and_then(|mapper| {
                    mapper.resolve_function(
                        function.namespace.as_deref().unwrap_or(""),
                        &function.name,
                    )
                })
                .ok_or_else(|| BindError::UnknownFunction(function.qualified_name()))?;
            let accepted = if function.varargs && signature.varargs {
                function.arity + 1 >= signature.params
            } else {
                function.arity == signature.params
            };
            if !accepted {
                return Err(BindError::ArgumentCount {
                    name: function.qualified_name(),
                    expected: signature.params,
                    actual: function.arity,
                }
                .into());
            }
            resolved.push(Some(signature));
        }

        let variables = self
            .identifiers
            .iter()
            .map(|name| variables.and_then(|mapper| mapper.resolve_variable(name)))
            .collect();

        Ok(Bindings::new(resolved, variables))
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.structural_id(None))
    }
}
