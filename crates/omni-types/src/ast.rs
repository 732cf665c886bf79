//! AST node types for OmniLang policy documents.
//!
//! A [`Policy`] is built once by the document parser and is read-only
//! afterwards. Sequences preserve source order; rule bodies form a tree.

use serde::{Deserialize, Serialize};

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// One parsed `.omni` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub intent: Option<String>,
    pub actors: Vec<Actor>,
    pub context: Option<Context>,
    pub assumptions: Vec<String>,
    pub rules: Vec<RuleNode>,
    pub constraints: Vec<TaggedEntry>,
    pub impacts: Vec<TaggedEntry>,
    pub traces: Vec<TaggedEntry>,
    pub reviews: Vec<Review>,
}

impl Policy {
    /// Iterate every leaf rule, depth-first, including those nested in loops.
    pub fn leaf_rules(&self) -> Vec<&Rule> {
        fn walk<'a>(nodes: &'a [RuleNode], out: &mut Vec<&'a Rule>) {
            for node in nodes {
                match node {
                    RuleNode::Rule(rule) => out.push(rule),
                    RuleNode::Loop(lp) => walk(&lp.body, out),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.rules, &mut out);
        out
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Sections
// ══════════════════════════════════════════════════════════════════════════════

/// `- Primary: Operator`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub role: String,
    pub is_primary: bool,
}

/// `CONTEXT:` entries. Keys other than Domain/Location/Phase land in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub domain: Option<String>,
    pub location: Option<String>,
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<(String, String)>,
}

/// A `CONSTRAINT`, `IMPACT` or `TRACE` item: `- Legal: GDPR compliant`.
///
/// `kind` is `"Unknown"` when the item has no tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedEntry {
    pub kind: String,
    pub description: String,
}

impl TaggedEntry {
    pub const UNKNOWN_KIND: &'static str = "Unknown";
}

/// A `REVIEW` item. At most one of the fields is recovered per line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub interval: Option<String>,
    pub criteria: Option<String>,
}

// ══════════════════════════════════════════════════════════════════════════════
// Rules
// ══════════════════════════════════════════════════════════════════════════════

/// An item of a `RULE:` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RuleNode {
    Rule(Rule),
    Loop(LoopRule),
}

/// `IF <condition> THEN <action>`
///
/// The condition is kept as unparsed expression text; the evaluator parses it
/// at run time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub condition: String,
    pub action: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoopKind {
    For,
    While,
}

impl std::fmt::Display for LoopKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopKind::For => f.write_str("FOR"),
            LoopKind::While => f.write_str("WHILE"),
        }
    }
}

/// `FOR x IN xs { ... }` or `WHILE cond { ... }`.
///
/// `iterator`/`collection` are set for FOR loops, `condition` for WHILE loops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopRule {
    pub kind: LoopKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    pub body: Vec<RuleNode>,
}

impl LoopRule {
    /// Header text as written in the document, e.g. `FOR item IN items`.
    pub fn header(&self) -> String {
        match self.kind {
            LoopKind::For => format!(
                "FOR {} IN {}",
                self.iterator.as_deref().unwrap_or("_"),
                self.collection.as_deref().unwrap_or("_")
            ),
            LoopKind::While => format!("WHILE {}", self.condition.as_deref().unwrap_or("")),
        }
    }
}
