// SPDX-License-Identifier: MIT

//! Precedence-climbing expression parser
//!
//! Grammar, lowest precedence first (all binary tiers left-associative):
//! - `expr  ::= or ('?' expr ':' expr)?`
//! - `or    ::= and (('||' | 'or') and)*`
//! - `and   ::= eq (('&&' | 'and') eq)*`
//! - `eq    ::= cmp (('==' | '!=' | 'eq' | 'ne') cmp)*`
//! - `cmp   ::= add (('<' | '>' | '<=' | '>=' | 'lt' | 'gt' | 'le' | 'ge') add)*`
//! - `add   ::= mul (('+' | '-') mul)*`
//! - `mul   ::= unary (('*' | '/' | '%' | 'div' | 'mod') unary)*`
//! - `unary ::= ('-' | '!' | 'not' | 'empty') unary | value`
//! - `value ::= (literal | nonliteral) ('.' IDENTIFIER | '[' expr ']')*`

use super::ast::{AccessKey, BinaryOp, Literal, Node, UnaryOp};
use super::bindings::FunctionRef;
use super::scanner::{Scanner, Symbol, Token};
use super::tree::Tree;
use crate::error::{ElError, ParseError, ScanError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

/// First set of `expr`, used in diagnostics
const EXPR_FIRST: &str =
    "<IDENTIFIER>|<STRING>|<FLOAT>|<INTEGER>|'true'|'false'|'null'|'-'|'!'|'empty'|'('";

/// Bound on parser recursion: nested expressions and unary operators
pub const MAX_NESTING: usize = 128;

/// Bound on tree depth: nesting plus binary folds and access steps
pub const MAX_DEPTH: usize = 1000;

/// Optional language features
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Allow `a.b(x)` and `a[b](x)`
    MethodInvocations,
    /// Let variadic functions take more arguments than declared parameters
    Varargs,
}

impl std::str::FromStr for Feature {
    type Err = ElError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "method_invocations" => Ok(Feature::MethodInvocations),
            "varargs" => Ok(Feature::Varargs),
            other => Err(ElError::config(format!("unknown feature '{}'", other))),
        }
    }
}

/// Grammar configuration, built once and passed to every parse
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserConfig {
    features: BTreeSet<Feature>,
}

impl ParserConfig {
    pub fn new(features: impl IntoIterator<Item = Feature>) -> Self {
        Self {
            features: features.into_iter().collect(),
        }
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    pub fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.features.iter().copied()
    }
}

/// Recursive-descent parser producing a [`Tree`]
pub struct Parser<'c> {
    config: &'c ParserConfig,
    scanner: Scanner,
    token: Token,
    lookahead: VecDeque<Token>,
    identifiers: Vec<String>,
    functions: Vec<FunctionRef>,
    nesting: usize,
    depth: usize,
}

impl<'c> Parser<'c> {
    pub fn new(config: &'c ParserConfig, input: &str) -> Self {
        Self {
            config,
            scanner: Scanner::new(input),
            token: Token {
                symbol: Symbol::Eof,
                image: String::new(),
                position: 0,
            },
            lookahead: VecDeque::new(),
            identifiers: Vec::new(),
            functions: Vec::new(),
            nesting: 0,
            depth: 0,
        }
    }

    /// Parse `input` with `config`
    pub fn parse(config: &ParserConfig, input: &str) -> Result<Tree, ElError> {
        Parser::new(config, input).tree()
    }

    fn fail(&self, expected: impl Into<String>) -> ElError {
        ParseError::new(self.token.position, self.token.describe(), expected).into()
    }

    fn consume_token(&mut self) -> Result<Token, ElError> {
        let next = match self.lookahead.pop_front() {
            Some(token) => token,
            None => self.scanner.next_token()?,
        };
        Ok(std::mem::replace(&mut self.token, next))
    }

    fn consume(&mut self, expected: Symbol) -> Result<Token, ElError> {
        if self.token.symbol != expected {
            return Err(self.fail(expected.to_string()));
        }
        self.consume_token()
    }

    /// Recurse one level, failing at the current token past `MAX_NESTING`
    fn enter(&mut self) -> Result<(), ElError> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(self.fail(format!("at most {} nesting levels", MAX_NESTING)));
        }
        self.deepen()
    }

    fn leave(&mut self) {
        self.nesting -= 1;
        self.depth -= 1;
    }

    /// Grow the tree one level without recursing
    fn deepen(&mut self) -> Result<(), ElError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.fail(format!("at most {} tree levels", MAX_DEPTH)));
        }
        Ok(())
    }

    /// Symbol `index + 1` tokens ahead of the current one
    fn lookahead(&mut self, index: usize) -> Result<Symbol, ElError> {
        while self.lookahead.len() <= index {
            let token = self.scanner.next_token()?;
            self.lookahead.push_back(token);
        }
        Ok(self.lookahead[index].symbol)
    }

    /// Parse the whole input
    pub fn tree(mut self) -> Result<Tree, ElError> {
        self.consume_token()?;
        let text = self.text()?;
        if self.token.symbol == Symbol::Eof {
            let root = text.unwrap_or(Node::Text { raw: String::new() });
            return Ok(self.finish(root, false));
        }
        let deferred = match self.token.symbol {
            Symbol::StartEvalDynamic => false,
            Symbol::StartEvalDeferred => true,
            _ => {
                return Err(self.fail(format!(
                    "{}|{}",
                    Symbol::StartEvalDeferred,
                    Symbol::StartEvalDynamic
                )))
            }
        };
        let first = self.eval(deferred)?;
        if self.token.symbol == Symbol::Eof && text.is_none() {
            return Ok(self.finish(first, deferred));
        }
        let mut parts: Vec<Node> = text.into_iter().collect();
        parts.push(first);
        parts.extend(self.text()?);
        while self.token.symbol != Symbol::Eof {
            // every block must use the delimiter of the first one
            parts.push(self.eval(deferred)?);
            parts.extend(self.text()?);
        }
        Ok(self.finish(Node::Composite(parts), deferred))
    }

    fn finish(self, root: Node, deferred: bool) -> Tree {
        Tree::new(root, deferred, self.identifiers, self.functions)
    }

    fn text(&mut self) -> Result<Option<Node>, ElError> {
        if self.token.symbol != Symbol::Text {
            return Ok(None);
        }
        let raw = self.consume_token()?.image;
        Ok(Some(Node::Text { raw }))
    }

    fn eval(&mut self, deferred: bool) -> Result<Node, ElError> {
        let start = if deferred {
            Symbol::StartEvalDeferred
        } else {
            Symbol::StartEvalDynamic
        };
        self.consume(start)?;
        let child = self.expr()?;
        self.consume(Symbol::EndEval)?;
        Ok(Node::Eval {
            deferred,
            child: Box::new(child),
        })
    }

    fn expr(&mut self) -> Result<Node, ElError> {
        self.enter()?;
        let node = self.ternary()?;
        self.leave();
        Ok(node)
    }

    fn ternary(&mut self) -> Result<Node, ElError> {
        let cond = self.or()?;
        if self.token.symbol != Symbol::Question {
            return Ok(cond);
        }
        self.consume_token()?;
        let then = self.expr()?;
        self.consume(Symbol::Colon)?;
        let otherwise = self.expr()?;
        Ok(Node::Ternary {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    /// One left-associative tier: fold operands of the next tier while the
    /// current token is an operator of this tier
    fn binary_tier(
        &mut self,
        operand: fn(&mut Self) -> Result<Node, ElError>,
        operator: fn(Symbol) -> Option<BinaryOp>,
    ) -> Result<Node, ElError> {
        let mut left = operand(self)?;
        let mut folds = 0;
        while let Some(op) = operator(self.token.symbol) {
            self.deepen()?;
            folds += 1;
            self.consume_token()?;
            let right = operand(self)?;
            left = Node::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        self.depth -= folds;
        Ok(left)
    }

    fn or(&mut self) -> Result<Node, ElError> {
        self.binary_tier(Self::and, |symbol| match symbol {
            Symbol::Or => Some(BinaryOp::Or),
            _ => None,
        })
    }

    fn and(&mut self) -> Result<Node, ElError> {
        self.binary_tier(Self::eq, |symbol| match symbol {
            Symbol::And => Some(BinaryOp::And),
            _ => None,
        })
    }

    fn eq(&mut self) -> Result<Node, ElError> {
        self.binary_tier(Self::cmp, |symbol| match symbol {
            Symbol::Eq => Some(BinaryOp::Eq),
            Symbol::Ne => Some(BinaryOp::Ne),
            _ => None,
        })
    }

    fn cmp(&mut self) -> Result<Node, ElError> {
        self.binary_tier(Self::add, |symbol| match symbol {
            Symbol::Lt => Some(BinaryOp::Lt),
            Symbol::Gt => Some(BinaryOp::Gt),
            Symbol::Le => Some(BinaryOp::Le),
            Symbol::Ge => Some(BinaryOp::Ge),
            _ => None,
        })
    }

    fn add(&mut self) -> Result<Node, ElError> {
        self.binary_tier(Self::mul, |symbol| match symbol {
            Symbol::Plus => Some(BinaryOp::Add),
            Symbol::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn mul(&mut self) -> Result<Node, ElError> {
        self.binary_tier(Self::unary, |symbol| match symbol {
            Symbol::Mul => Some(BinaryOp::Mul),
            Symbol::Div => Some(BinaryOp::Div),
            Symbol::Mod => Some(BinaryOp::Mod),
            _ => None,
        })
    }

    fn unary(&mut self) -> Result<Node, ElError> {
        let op = match self.token.symbol {
            Symbol::Minus => UnaryOp::Minus,
            Symbol::Not => UnaryOp::Not,
            Symbol::Empty => UnaryOp::Empty,
            _ => return self.value(),
        };
        self.consume_token()?;
        self.enter()?;
        let operand = self.unary()?;
        self.leave();
        Ok(Node::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn value(&mut self) -> Result<Node, ElError> {
        let mut value = match self.nonliteral()? {
            Some(node) => node,
            None => match self.literal()? {
                Some(node) => node,
                None => return Err(self.fail(EXPR_FIRST)),
            },
        };
        let mut steps = 0;
        loop {
            let key = match self.token.symbol {
                Symbol::Dot => {
                    self.consume_token()?;
                    AccessKey::Property(self.consume(Symbol::Identifier)?.image)
                }
                Symbol::LBrack => {
                    self.consume_token()?;
                    let index = self.expr()?;
                    self.consume(Symbol::RBrack)?;
                    AccessKey::Index(Box::new(index))
                }
                _ => break,
            };
            self.deepen()?;
            steps += 1;
            // a bare literal base is not assignable, a bracketed one is
            let lvalue = !matches!(value, Node::Literal(_));
            let access = Node::Access {
                base: Box::new(value),
                key,
                lvalue,
            };
            value = if self.token.symbol == Symbol::LParen
                && self.config.is_enabled(Feature::MethodInvocations)
            {
                Node::Method {
                    target: Box::new(access),
                    args: self.params()?,
                }
            } else {
                access
            };
        }
        self.depth -= steps;
        Ok(value)
    }

    fn nonliteral(&mut self) -> Result<Option<Node>, ElError> {
        match self.token.symbol {
            Symbol::Identifier => {
                let mut name = self.consume_token()?.image;
                let mut namespace = None;
                if self.token.symbol == Symbol::Colon
                    && self.lookahead(0)? == Symbol::Identifier
                    && self.lookahead(1)? == Symbol::LParen
                {
                    self.consume_token()?;
                    namespace = Some(std::mem::replace(
                        &mut name,
                        self.consume_token()?.image,
                    ));
                }
                if self.token.symbol == Symbol::LParen {
                    let args = self.params()?;
                    Ok(Some(self.function(namespace, name, args)))
                } else {
                    Ok(Some(self.identifier(name)))
                }
            }
            Symbol::LParen => {
                self.consume_token()?;
                let inner = self.expr()?;
                self.consume(Symbol::RParen)?;
                Ok(Some(Node::Bracket(Box::new(inner))))
            }
            _ => Ok(None),
        }
    }

    fn literal(&mut self) -> Result<Option<Node>, ElError> {
        let literal = match self.token.symbol {
            Symbol::True => Literal::Boolean(true),
            Symbol::False => Literal::Boolean(false),
            Symbol::Null => Literal::Null,
            Symbol::String => Literal::String(self.token.image.clone()),
            Symbol::Integer => match self.token.image.parse() {
                Ok(value) => Literal::Integer(value),
                Err(_) => {
                    Literal::BigInteger(self.token.image.trim_start_matches('0').to_string())
                }
            },
            Symbol::Float => Literal::Float(self.token.image.parse().map_err(|_| {
                ScanError::new(
                    self.token.position,
                    "malformed float literal",
                    self.token.image.clone(),
                )
            })?),
            _ => return Ok(None),
        };
        self.consume_token()?;
        Ok(Some(Node::Literal(literal)))
    }

    fn params(&mut self) -> Result<Vec<Node>, ElError> {
        self.consume(Symbol::LParen)?;
        let mut args = Vec::new();
        if self.token.symbol != Symbol::RParen {
            args.push(self.expr()?);
            while self.token.symbol == Symbol::Comma {
                self.consume_token()?;
                args.push(self.expr()?);
            }
        }
        self.consume(Symbol::RParen)?;
        Ok(args)
    }

    fn identifier(&mut self, name: String) -> Node {
        let index = match self.identifiers.iter().position(|n| *n == name) {
            Some(index) => index,
            None => {
                self.identifiers.push(name.clone());
                self.identifiers.len() - 1
            }
        };
        Node::Identifier { name, index }
    }

    fn function(&mut self, namespace: Option<String>, name: String, args: Vec<Node>) -> Node {
        let reference = FunctionRef {
            namespace: namespace.clone(),
            name: name.clone(),
            arity: args.len(),
            varargs: self.config.is_enabled(Feature::Varargs),
        };
        let index = match self.functions.iter().position(|f| *f == reference) {
            Some(index) => index,
            None => {
                self.functions.push(reference);
                self.functions.len() - 1
            }
        };
        Node::Call {
            namespace,
            name,
            index,
            args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Tree {
        Parser::parse(&ParserConfig::default(), input).unwrap()
    }

    fn parse_err(input: &str) -> ParseError {
        match Parser::parse(&ParserConfig::default(), input) {
            Err(ElError::Parse(e)) => e,
            other => panic!("expected parse error for {}, got {:?}", input, other),
        }
    }

    /// Root expression inside a single `${...}`
    fn expr(input: &str) -> Node {
        match parse(input).root() {
            Node::Eval { child, .. } => (**child).clone(),
            other => panic!("expected eval root, got {:?}", other),
        }
    }

    fn root_op(input: &str) -> BinaryOp {
        match expr(input) {
            Node::Binary { op, .. } => op,
            other => panic!("expected binary root for {}, got {:?}", input, other),
        }
    }

    #[test]
    fn test_parse_identifier() {
        assert_eq!(
            expr("${a}"),
            Node::Identifier {
                name: "a".to_string(),
                index: 0
            }
        );
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(expr("${1}"), Node::Literal(Literal::Integer(1)));
        assert_eq!(expr("${1.5}"), Node::Literal(Literal::Float(1.5)));
        assert_eq!(expr("${.5e1}"), Node::Literal(Literal::Float(5.0)));
        assert_eq!(expr("${'x'}"), Node::Literal(Literal::String("x".to_string())));
        assert_eq!(expr("${true}"), Node::Literal(Literal::Boolean(true)));
        assert_eq!(expr("${false}"), Node::Literal(Literal::Boolean(false)));
        assert_eq!(expr("${null}"), Node::Literal(Literal::Null));
    }

    #[test]
    fn test_left_associative_multiplicative() {
        match expr("${a * a / a}") {
            Node::Binary { op, left, .. } => {
                assert_eq!(op, BinaryOp::Div);
                assert!(matches!(*left, Node::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_adjacent_tier_precedence() {
        // lower tier operator ends up at the root regardless of position
        let tiers: [&[(&str, BinaryOp)]; 6] = [
            &[("||", BinaryOp::Or), ("or", BinaryOp::Or)],
            &[("&&", BinaryOp::And), ("and", BinaryOp::And)],
            &[
                ("==", BinaryOp::Eq),
                ("!=", BinaryOp::Ne),
                ("eq", BinaryOp::Eq),
                ("ne", BinaryOp::Ne),
            ],
            &[
                ("<", BinaryOp::Lt),
                (">", BinaryOp::Gt),
                ("<=", BinaryOp::Le),
                (">=", BinaryOp::Ge),
                ("lt", BinaryOp::Lt),
                ("gt", BinaryOp::Gt),
                ("le", BinaryOp::Le),
                ("ge", BinaryOp::Ge),
            ],
            &[("+", BinaryOp::Add), ("-", BinaryOp::Sub)],
            &[
                ("*", BinaryOp::Mul),
                ("/", BinaryOp::Div),
                ("%", BinaryOp::Mod),
                ("div", BinaryOp::Div),
                ("mod", BinaryOp::Mod),
            ],
        ];
        for pair in tiers.windows(2) {
            for (low, low_op) in pair[0] {
                for (high, _) in pair[1] {
                    let input = format!("${{a {} a {} a}}", low, high);
                    assert_eq!(root_op(&input), *low_op, "{}", input);
                    let input = format!("${{a {} a {} a}}", high, low);
                    assert_eq!(root_op(&input), *low_op, "{}", input);
                }
            }
        }
        for tier in tiers {
            for (first, _) in tier {
                for (second, second_op) in tier {
                    let input = format!("${{a {} a {} a}}", first, second);
                    assert_eq!(root_op(&input), *second_op, "{}", input);
                }
            }
        }
    }

    #[test]
    fn test_unary_binds_tighter_than_mul() {
        match expr("${-a * b}") {
            Node::Binary { op, left, .. } => {
                assert_eq!(op, BinaryOp::Mul);
                assert!(matches!(*left, Node::Unary { op: UnaryOp::Minus, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            expr("${not empty a}"),
            Node::Unary {
                op: UnaryOp::Not,
                ..
            }
        ));
    }

    #[test]
    fn test_ternary_is_right_recursive() {
        match expr("${a ? b : c ? d : e}") {
            Node::Ternary { otherwise, .. } => {
                assert!(matches!(*otherwise, Node::Ternary { .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_access_chain() {
        match expr("${a.b[c]}") {
            Node::Access { base, key, lvalue } => {
                assert!(lvalue);
                assert!(matches!(key, AccessKey::Index(_)));
                assert!(matches!(
                    *base,
                    Node::Access {
                        key: AccessKey::Property(_),
                        ..
                    }
                ));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(
            expr("${f()}"),
            Node::Call {
                namespace: None,
                name: "f".to_string(),
                index: 0,
                args: vec![],
            }
        );
        match expr("${ns:f(a, 1)}") {
            Node::Call {
                namespace, args, ..
            } => {
                assert_eq!(namespace.as_deref(), Some("ns"));
                assert_eq!(args.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_namespace_lookahead_inside_ternary() {
        match expr("${a ? a:f() : b}") {
            Node::Ternary { then, .. } => {
                assert!(matches!(*then, Node::Call { namespace: Some(_), .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            expr("${a ? b : c}"),
            Node::Ternary { .. }
        ));
    }

    #[test]
    fn test_ternary_missing_colon() {
        let err = parse_err("${a?a:f()}");
        assert_eq!(err.position, 9);
        assert_eq!(err.encountered, "'}'");
        assert_eq!(err.expected, "':'");
    }

    #[test]
    fn test_mixed_delimiters() {
        let err = parse_err("#{a}${a}");
        assert_eq!(err.position, 4);
        assert_eq!(err.encountered, "'${'");
        assert_eq!(err.expected, "'#{'");

        let err = parse_err("${a}#{a}");
        assert_eq!(err.expected, "'${'");
    }

    #[test]
    fn test_composites() {
        let tree = parse("${a}${a}");
        assert!(matches!(tree.root(), Node::Composite(parts) if parts.len() == 2));
        assert!(!tree.is_deferred());

        let tree = parse("#{a}#{a}");
        assert!(tree.is_deferred());

        let tree = parse("x ${a} y ${a}");
        assert!(matches!(tree.root(), Node::Composite(parts) if parts.len() == 4));
    }

    #[test]
    fn test_empty_input() {
        let tree = parse("");
        assert_eq!(
            tree.root(),
            &Node::Text {
                raw: String::new()
            }
        );
        assert!(tree.is_literal_text());
    }

    #[test]
    fn test_missing_expression() {
        let err = parse_err("${}");
        assert_eq!(err.position, 2);
        assert_eq!(err.expected, EXPR_FIRST);
    }

    #[test]
    fn test_unterminated_block() {
        let err = parse_err("${a");
        assert_eq!(err.encountered, "<EOF>");
        assert_eq!(err.expected, "'}'");
    }

    #[test]
    fn test_reserved_tokens_are_rejected() {
        let err = parse_err("${a instanceof b}");
        assert_eq!(err.encountered, "'instanceof'");
        let err = parse_err("${a -> b}");
        assert_eq!(err.encountered, "'->'");
    }

    #[test]
    fn test_trailing_tokens() {
        let err = parse_err("${a b}");
        assert_eq!(err.position, 4);
        assert_eq!(err.encountered, "'b'");
        assert_eq!(err.expected, "'}'");
    }

    #[test]
    fn test_property_must_be_identifier() {
        let err = parse_err("${a.'b'}");
        assert_eq!(err.expected, "<IDENTIFIER>");
    }

    #[test]
    fn test_method_invocations_feature() {
        let err = parse_err("${a.b(1)}");
        assert_eq!(err.position, 5);
        assert_eq!(err.encountered, "'('");

        let config = ParserConfig::new([Feature::MethodInvocations]);
        let tree = Parser::parse(&config, "${a.b(1)[c](d)}").unwrap();
        match tree.root() {
            Node::Eval { child, .. } => match child.as_ref() {
                Node::Method { target, args } => {
                    assert_eq!(args.len(), 1);
                    assert!(matches!(
                        target.as_ref(),
                        Node::Access {
                            key: AccessKey::Index(_),
                            ..
                        }
                    ));
                }
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_inventories() {
        let tree = parse("${a + b + a + f(a) + ns:f(b) + f(b)}");
        assert_eq!(tree.identifiers(), ["a", "b"]);
        let names: Vec<String> = tree.functions().iter().map(|f| f.qualified_name()).collect();
        assert_eq!(names, vec!["f", "ns:f"]);
    }

    #[test]
    fn test_feature_from_str() {
        assert_eq!("varargs".parse::<Feature>().unwrap(), Feature::Varargs);
        assert_eq!(
            " method_invocations".parse::<Feature>().unwrap(),
            Feature::MethodInvocations
        );
        assert!("lambdas".parse::<Feature>().is_err());
    }

    #[test]
    fn test_integers_beyond_i64() {
        assert_eq!(
            expr("${9223372036854775807}"),
            Node::Literal(Literal::Integer(i64::MAX))
        );
        assert_eq!(
            expr("${9223372036854775808}"),
            Node::Literal(Literal::BigInteger("9223372036854775808".to_string()))
        );

        let tree = parse("${99999999999999999999 + 1}");
        assert_eq!(tree.structural_id(None), "${99999999999999999999 + 1}");
        assert_eq!(
            parse("${00099999999999999999999}").structural_id(None),
            "${99999999999999999999}"
        );
    }

    #[test]
    fn test_deep_nesting_is_a_parse_error() {
        let inputs = [
            format!("${{{}a{}}}", "(".repeat(50_000), ")".repeat(50_000)),
            format!("${{{}a}}", "-".repeat(50_000)),
            format!("${{{}a{}}}", "a[".repeat(50_000), "]".repeat(50_000)),
            format!("${{a{}}}", " + a".repeat(50_000)),
            format!("${{a{}}}", ".b".repeat(50_000)),
        ];
        for input in &inputs {
            let err = parse_err(input);
            assert!(err.expected.starts_with("at most "), "{}", err.expected);
        }
        assert_eq!(
            parse_err(&inputs[0]).expected,
            format!("at most {} nesting levels", MAX_NESTING)
        );
        assert_eq!(
            parse_err(&inputs[3]).expected,
            format!("at most {} tree levels", MAX_DEPTH)
        );
    }

    #[test]
    fn test_nesting_within_limit() {
        let nested = format!("${{{}a{}}}", "(".repeat(100), ")".repeat(100));
        assert!(Parser::parse(&ParserConfig::default(), &nested).is_ok());

        let sum = format!("${{a{}}}", " + a".repeat(500));
        assert_eq!(parse(&sum).identifiers(), ["a"]);

        // siblings do not add up
        let terms = vec!["((a))"; 200].join(" + ");
        assert!(Parser::parse(&ParserConfig::default(), &format!("${{{}}}", terms)).is_ok());
    }
}
