//! Pipeline configuration.

use std::collections::BTreeSet;

/// Member names an evaluator refuses to read, dotted or computed.
///
/// Each of these leads from ordinary data to constructor or prototype
/// machinery in JavaScript-like hosts.
pub const DEFAULT_DENIED_MEMBERS: &[&str] = &[
    "constructor",
    "__proto__",
    "prototype",
    "__defineGetter__",
    "__defineSetter__",
    "__lookupGetter__",
    "__lookupSetter__",
];

/// Options for [`crate::Parser`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParserOptions {
    /// Maximum nesting of sub-expressions (parentheses, array and object
    /// literals, unary chains, call arguments) before parsing is rejected.
    pub max_depth: usize,
    /// Maximum height of the syntax tree. Every operator and every `.x`,
    /// `[x]` or `(..)` step adds a level, so `1 + 1 + 1` has height 3.
    /// Compilation and evaluation recurse once per level.
    pub max_height: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            max_depth: 64,
            max_height: 256,
        }
    }
}

/// Options for [`crate::Compiler`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerOptions {
    pub denied_members: BTreeSet<String>,
}

impl CompilerOptions {
    /// Adds a member name to the deny-list.
    pub fn deny(mut self, name: impl Into<String>) -> Self {
        self.denied_members.insert(name.into());
        self
    }
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            denied_members: DEFAULT_DENIED_MEMBERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Options for the whole source-to-evaluator pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    pub parser: ParserOptions,
    pub compiler: CompilerOptions,
}
