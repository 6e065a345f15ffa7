//! Serde model of a grammar document.

use serde::{Deserialize, Serialize};

/// A complete grammar file.
///
/// # Example
/// ```
/// let grammar: cmdgraph_grammar::Grammar = serde_json::from_str(r#"{
///     "schema_version": "1.0.0",
///     "commands": [
///         { "literal": "ping", "executes": { "return": 1 } }
///     ]
/// }"#).unwrap();
/// assert_eq!(grammar.commands[0].name(), "ping");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Grammar {
    /// Document schema version, `major.minor.patch`. Only major `1` is accepted.
    pub schema_version: String,
    /// Top-level commands. Each must be a literal.
    #[serde(default)]
    pub commands: Vec<NodeSpec>,
}

/// One node of the command tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeSpec {
    /// Literal keyword or typed argument.
    #[serde(flatten)]
    pub kind: NodeSpecKind,
    /// Nodes that may follow this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
    /// Handler run when input ends here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executes: Option<Action>,
    /// Permission the source must hold to use this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires: Option<String>,
    /// Path of node names to continue parsing at. `[]` is the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<Vec<String>>,
    /// Whether the redirect forks execution.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fork: bool,
    /// Source transformation applied when following the redirect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<Modifier>,
    /// Static completions for an argument node.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl NodeSpec {
    /// The literal keyword or argument name.
    pub fn name(&self) -> &str {
        match &self.kind {
            NodeSpecKind::Literal { literal } => literal,
            NodeSpecKind::Argument { argument, .. } => argument,
        }
    }

    /// Whether this is a literal node.
    pub fn is_literal(&self) -> bool {
        matches!(self.kind, NodeSpecKind::Literal { .. })
    }
}

/// Distinguishes `{"literal": ...}` from `{"argument": ..., "type": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum NodeSpecKind {
    /// Matches a fixed keyword.
    Literal {
        /// The keyword.
        literal: String,
    },
    /// Parses a typed value.
    Argument {
        /// Name the value is stored under.
        argument: String,
        /// Value parser.
        #[serde(rename = "type")]
        ty: ArgType,
    },
}

/// Value parser of an argument node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    /// `true` or `false`.
    Bool,
    /// One unquoted word.
    Word,
    /// A word or a quoted phrase.
    String,
    /// The rest of the input.
    Greedy,
    /// 32-bit integer.
    Integer(Bounds<i32>),
    /// 64-bit integer.
    Long(Bounds<i64>),
    /// 32-bit float.
    Float(Bounds<f32>),
    /// 64-bit float.
    Double(Bounds<f64>),
}

/// Optional inclusive numeric bounds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Bounds<T> {
    /// Lower bound (inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<T>,
    /// Upper bound (inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<T>,
}

/// What a node's handler does.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Return a constant.
    Return(i32),
    /// Return the named argument as a number: integers as-is, floats
    /// truncated, booleans as 0/1, strings as their length.
    Argument(String),
    /// Fail with a message.
    Fail(String),
}

/// How a redirect derives the next sources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    /// One source per comma-separated element of a string argument.
    Split(String),
    /// One source renamed to the argument's value.
    As(String),
}
