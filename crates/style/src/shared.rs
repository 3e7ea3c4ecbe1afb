//! A stylesheet handle that can be cloned across threads.
//!
//! Writers take the lock exclusively, so inserting a rule and invalidating
//! the cache happen as one step; no reader can observe a result computed
//! against the previous rule set after the write returns.

use std::sync::Arc;

use common::{PropMap, StyleError};
use parking_lot::RwLock;

use crate::context::MatchContext;
use crate::rule::{Rank, ResolvedPayload, RulePayload};
use crate::sheet::Stylesheet;
use crate::store::InsertOutcome;

#[derive(Debug, Clone, Default)]
pub struct SharedStylesheet {
    inner: Arc<RwLock<Stylesheet>>,
}

impl SharedStylesheet {
    pub fn new(sheet: Stylesheet) -> Self {
        Self {
            inner: Arc::new(RwLock::new(sheet)),
        }
    }

    pub fn insert_rule(
        &self,
        selector: &str,
        payload: RulePayload,
        rank: Rank,
    ) -> Result<InsertOutcome, StyleError> {
        self.inner.write().insert_rule(selector, payload, rank)
    }

    pub fn add_rule(&self, selector: &str, payload: RulePayload) -> Result<InsertOutcome, StyleError> {
        self.insert_rule(selector, payload, Rank::Explicit)
    }

    pub fn add_default_rule(&self, selector: &str, payload: RulePayload) -> Result<InsertOutcome, StyleError> {
        self.insert_rule(selector, payload, Rank::Default)
    }

    pub fn add_rules<I, S>(&self, rules: I) -> Result<(), StyleError>
    where
        I: IntoIterator<Item = (S, RulePayload)>,
        S: AsRef<str>,
    {
        self.inner.write().insert_rules(rules, Rank::Explicit)
    }

    pub fn add_default_rules<I, S>(&self, rules: I) -> Result<(), StyleError>
    where
        I: IntoIterator<Item = (S, RulePayload)>,
        S: AsRef<str>,
    {
        self.inner.write().insert_rules(rules, Rank::Default)
    }

    pub fn resolve(&self, ctx: &MatchContext) -> Result<Arc<ResolvedPayload>, StyleError> {
        self.inner.read().resolve(ctx)
    }

    pub fn get_props(&self, ctx: &MatchContext, own: Option<&PropMap>) -> Result<PropMap, StyleError> {
        self.inner.read().get_props(ctx, own)
    }

    pub fn generation(&self) -> u64 {
        self.inner.read().generation()
    }

    /// Run `f` with shared access to the underlying stylesheet.
    pub fn with_sheet<R>(&self, f: impl FnOnce(&Stylesheet) -> R) -> R {
        f(&self.inner.read())
    }
}

impl From<Stylesheet> for SharedStylesheet {
    fn from(sheet: Stylesheet) -> Self {
        Self::new(sheet)
    }
}
