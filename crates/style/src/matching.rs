//! Selector matching: determine whether a match context satisfies a selector.
//!
//! Compound selectors are matched **right-to-left**: the anchor term must match
//! the subject itself, then the remaining terms are consumed while walking the
//! ancestor chain from the innermost ancestor outwards. Ancestors that do not
//! match the pending term are skipped (descendant combinator semantics).

use selector::{CompoundSelector, SimpleSelector};

use crate::context::{ContextNode, MatchContext};

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Test whether `ctx` matches the full compound selector.
pub fn matches_selector(selector: &CompoundSelector, ctx: &MatchContext) -> bool {
    if !matches_simple(selector.anchor(), ctx.subject()) {
        return false;
    }

    let mut pending = selector.ancestors().iter().rev().peekable();
    for ancestor in ctx.ancestors().iter().rev() {
        match pending.peek() {
            Some(term) => {
                if matches_simple(term, ancestor) {
                    pending.next();
                }
            }
            None => break,
        }
    }

    pending.peek().is_none()
}

/// Test whether a single node matches a simple selector: names are equal and
/// the node carries every variant the term lists.
pub fn matches_simple(term: &SimpleSelector, node: &ContextNode) -> bool {
    term.name() == node.name() && term.variants().iter().all(|v| node.has_variant(v))
}
