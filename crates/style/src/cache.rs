//! Resolution cache, valid for exactly one rule-set generation.
//!
//! Every mutation of the rule store bumps the stylesheet generation. The cache
//! remembers the generation it was filled under and drops everything the
//! first time it is synced against a different one. There is no partial
//! invalidation: mixins make precise dependency tracking not worth it.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::context::MatchContext;
use crate::rule::{ResolvedPayload, RuleId};

/// A memoized mixin expansion and the length of the longest mixin chain
/// below it, so a hit can be rejected where the chain would run too deep.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub payload: ResolvedPayload,
    pub depth: usize,
}

#[derive(Debug)]
pub struct ResolutionCache {
    generation: u64,
    max_entries: usize,
    /// Full resolutions, keyed by context.
    contexts: HashMap<MatchContext, Arc<ResolvedPayload>>,
    /// Mixin-expanded payload of one rule in one context.
    expansions: HashMap<(RuleId, MatchContext), Expansion>,
}

impl ResolutionCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            generation: 0,
            max_entries: max_entries.max(1),
            contexts: HashMap::new(),
            expansions: HashMap::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drop every entry if they were computed under another generation.
    pub fn sync(&mut self, generation: u64) {
        if self.generation != generation {
            trace!(from = self.generation, to = generation, "cache generation changed");
            self.clear();
            self.generation = generation;
        }
    }

    pub fn get(&self, ctx: &MatchContext) -> Option<Arc<ResolvedPayload>> {
        let hit = self.contexts.get(ctx).cloned();
        trace!(context = %ctx, hit = hit.is_some(), "context cache lookup");
        hit
    }

    pub fn put(&mut self, ctx: MatchContext, payload: Arc<ResolvedPayload>) {
        if self.contexts.len() >= self.max_entries && !self.contexts.contains_key(&ctx) {
            debug!(entries = self.contexts.len(), "context cache full, clearing");
            self.contexts.clear();
        }
        self.contexts.insert(ctx, payload);
    }

    pub fn get_expansion(&self, rule: RuleId, ctx: &MatchContext) -> Option<&Expansion> {
        // Tuple keys cannot be borrowed piecewise, so probe with an owned key.
        self.expansions.get(&(rule, ctx.clone()))
    }

    pub fn put_expansion(&mut self, rule: RuleId, ctx: MatchContext, expansion: Expansion) {
        if self.expansions.len() >= self.max_entries {
            debug!(entries = self.expansions.len(), "expansion cache full, clearing");
            self.expansions.clear();
        }
        self.expansions.insert((rule, ctx), expansion);
    }

    pub fn clear(&mut self) {
        self.contexts.clear();
        self.expansions.clear();
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty() && self.expansions.is_empty()
    }
}
