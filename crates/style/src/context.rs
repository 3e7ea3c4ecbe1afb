//! Match contexts: the snapshot of a node's position in the component tree
//! that rules are tested against.
//!
//! The engine never owns nodes. A host either builds a [`MatchContext`]
//! directly, parses one from a path string, or implements [`StyleNode`] for
//! its own node type and calls [`MatchContext::from_node`].

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use common::{ParseError, StyleError};
use selector::{SimpleSelector, parse_selector};

// ─────────────────────────────────────────────────────────────────────────────
// ContextNode
// ─────────────────────────────────────────────────────────────────────────────

/// One node on a context path: its name plus the variants it currently has.
///
/// Variants are kept as an ordered set, so a node carrying the single scalar
/// variant `"active"` is identical to one carrying `["active"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextNode {
    name: String,
    variants: BTreeSet<String>,
}

impl ContextNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: BTreeSet::new(),
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variants.insert(variant.into());
        self
    }

    pub fn with_variants<I, S>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variants.extend(variants.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variants(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(String::as_str)
    }

    pub fn has_variant(&self, variant: &str) -> bool {
        self.variants.contains(variant)
    }

    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    fn renamed(&self, name: &str) -> Self {
        Self {
            name: name.to_owned(),
            variants: self.variants.clone(),
        }
    }
}

impl From<SimpleSelector> for ContextNode {
    fn from(term: SimpleSelector) -> Self {
        ContextNode::new(term.name()).with_variants(term.variants().iter().cloned())
    }
}

impl fmt::Display for ContextNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for v in &self.variants {
            write!(f, ".{v}")?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// StyleNode: live node interface
// ─────────────────────────────────────────────────────────────────────────────

/// Variants as a live node reports them: absent, a single scalar, or a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeVariants<'a> {
    #[default]
    None,
    One(&'a str),
    Many(&'a [String]),
}

/// The narrow view of a host node the engine needs to build a context.
pub trait StyleNode {
    fn style_name(&self) -> &str;

    fn style_parent(&self) -> Option<&Self>;

    fn style_variants(&self) -> NodeVariants<'_> {
        NodeVariants::None
    }
}

fn context_node_of<N: StyleNode + ?Sized>(node: &N) -> ContextNode {
    let base = ContextNode::new(node.style_name());
    match node.style_variants() {
        NodeVariants::None => base,
        NodeVariants::One(v) => base.with_variant(v),
        NodeVariants::Many(vs) => base.with_variants(vs.iter().cloned()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MatchContext
// ─────────────────────────────────────────────────────────────────────────────

/// A node (the subject) and its ancestor chain, outer → inner.
///
/// `MatchContext` is `Hash + Eq`; it doubles as the resolution cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchContext {
    ancestors: Vec<ContextNode>,
    subject: ContextNode,
}

impl MatchContext {
    /// A context for a root node.
    pub fn new(subject: ContextNode) -> Self {
        Self {
            ancestors: Vec::new(),
            subject,
        }
    }

    pub fn with_ancestors(ancestors: Vec<ContextNode>, subject: ContextNode) -> Self {
        Self { ancestors, subject }
    }

    /// Parse a space-separated path such as `App Button.active Text`.
    /// The last segment is the subject.
    pub fn parse(path: &str) -> Result<Self, StyleError> {
        let selector = parse_selector(path).map_err(|e| StyleError::context(path, e))?;
        let mut nodes: Vec<ContextNode> = selector.into_terms().into_iter().map(Into::into).collect();
        let subject = nodes
            .pop()
            .ok_or_else(|| StyleError::context(path, ParseError::EmptySelector))?;
        Ok(Self::with_ancestors(nodes, subject))
    }

    /// Build the context of a live node by walking its parents.
    pub fn from_node<N: StyleNode>(node: &N) -> Self {
        let subject = context_node_of(node);
        let mut ancestors = Vec::new();
        let mut current = node.style_parent();
        while let Some(parent) = current {
            ancestors.push(context_node_of(parent));
            current = parent.style_parent();
        }
        ancestors.reverse();
        Self { ancestors, subject }
    }

    /// The context of a child of the current subject.
    pub fn child(&self, node: ContextNode) -> Self {
        let mut ancestors = Vec::with_capacity(self.ancestors.len() + 1);
        ancestors.extend(self.ancestors.iter().cloned());
        ancestors.push(self.subject.clone());
        Self {
            ancestors,
            subject: node,
        }
    }

    /// The same position in the tree, with the subject renamed to `name`.
    /// Mixins are resolved through this so scoped mixin rules
    /// (`Intro defaultFont`) see the referencing node's ancestry.
    pub fn for_mixin(&self, name: &str) -> Self {
        Self {
            ancestors: self.ancestors.clone(),
            subject: self.subject.renamed(name),
        }
    }

    pub fn name(&self) -> &str {
        self.subject.name()
    }

    pub fn subject(&self) -> &ContextNode {
        &self.subject
    }

    /// Ancestors, outer → inner, excluding the subject.
    pub fn ancestors(&self) -> &[ContextNode] {
        &self.ancestors
    }

    pub fn depth(&self) -> usize {
        self.ancestors.len() + 1
    }
}

impl FromStr for MatchContext {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MatchContext::parse(s)
    }
}

impl fmt::Display for MatchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for a in &self.ancestors {
            write!(f, "{a} ")?;
        }
        write!(f, "{}", self.subject)
    }
}
