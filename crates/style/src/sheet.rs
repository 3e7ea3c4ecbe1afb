//! Stylesheet: the rule store plus its generation counter and cache, and
//! the read entry point [`Stylesheet::get_props`].

use std::sync::Arc;

use common::{PropMap, StyleError};
use parking_lot::Mutex;
use selector::{CompoundSelector, parse_selector};
use tracing::debug;

use crate::cache::ResolutionCache;
use crate::config::EngineConfig;
use crate::context::MatchContext;
use crate::merge::merge_own_props;
use crate::resolve::Resolver;
use crate::rule::{Rank, ResolvedPayload, Rule, RulePayload};
use crate::store::{InsertOutcome, RuleStore};

#[derive(Debug)]
pub struct Stylesheet {
    store: RuleStore,
    generation: u64,
    config: EngineConfig,
    cache: Mutex<ResolutionCache>,
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            store: RuleStore::new(),
            generation: 0,
            cache: Mutex::new(ResolutionCache::new(config.max_cache_entries)),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Incremented on every mutation of the rule set.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a rule at `rank`. A rule with the same selector and rank is
    /// replaced in place.
    pub fn insert_rule(
        &mut self,
        selector: &str,
        payload: RulePayload,
        rank: Rank,
    ) -> Result<InsertOutcome, StyleError> {
        let parsed = parse_rule_selector(selector)?;
        let outcome = self.store.insert(parsed, payload, rank);
        self.bump_generation();
        Ok(outcome)
    }

    /// Add an explicit (rank 1) rule.
    pub fn add_rule(&mut self, selector: &str, payload: RulePayload) -> Result<InsertOutcome, StyleError> {
        self.insert_rule(selector, payload, Rank::Explicit)
    }

    /// Add a default (rank 0) rule.
    pub fn add_default_rule(
        &mut self,
        selector: &str,
        payload: RulePayload,
    ) -> Result<InsertOutcome, StyleError> {
        self.insert_rule(selector, payload, Rank::Default)
    }

    /// Add explicit rules in iteration order.
    pub fn add_rules<I, S>(&mut self, rules: I) -> Result<(), StyleError>
    where
        I: IntoIterator<Item = (S, RulePayload)>,
        S: AsRef<str>,
    {
        self.insert_rules(rules, Rank::Explicit)
    }

    /// Add default rules in iteration order.
    pub fn add_default_rules<I, S>(&mut self, rules: I) -> Result<(), StyleError>
    where
        I: IntoIterator<Item = (S, RulePayload)>,
        S: AsRef<str>,
    {
        self.insert_rules(rules, Rank::Default)
    }

    /// Bulk insert. Every selector is parsed before anything is inserted, so
    /// a malformed selector leaves the stylesheet untouched. The generation is
    /// bumped once for the whole batch.
    pub fn insert_rules<I, S>(&mut self, rules: I, rank: Rank) -> Result<(), StyleError>
    where
        I: IntoIterator<Item = (S, RulePayload)>,
        S: AsRef<str>,
    {
        let parsed = rules
            .into_iter()
            .map(|(selector, payload)| {
                parse_rule_selector(selector.as_ref()).map(|parsed| (parsed, payload))
            })
            .collect::<Result<Vec<_>, StyleError>>()?;
        if parsed.is_empty() {
            return Ok(());
        }
        for (selector, payload) in parsed {
            self.store.insert(selector, payload, rank);
        }
        self.bump_generation();
        Ok(())
    }

    fn bump_generation(&mut self) {
        self.generation += 1;
        self.cache.get_mut().clear();
        debug!(generation = self.generation, rules = self.store.len(), "rule set changed");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn rules_anchored_at(&self, name: &str) -> &[Rule] {
        self.store.rules_anchored_at(name)
    }

    pub fn rule_count(&self) -> usize {
        self.store.len()
    }

    /// Resolve the merged rule payload for `ctx`, before own props are
    /// applied. With caching enabled, repeated calls within one generation
    /// return the same allocation.
    ///
    /// The cache lock is taken per lookup and store, never across a whole
    /// resolution, so concurrent readers only serialize on cache access.
    pub fn resolve(&self, ctx: &MatchContext) -> Result<Arc<ResolvedPayload>, StyleError> {
        let depth = self.config.max_mixin_depth;
        if !self.config.cache_enabled {
            return Resolver::new(&self.store, depth).resolve(ctx).map(Arc::new);
        }

        {
            let mut cache = self.cache.lock();
            cache.sync(self.generation);
            if let Some(hit) = cache.get(ctx) {
                return Ok(hit);
            }
        }
        let resolved = Arc::new(
            Resolver::new(&self.store, depth)
                .with_cache(&self.cache)
                .resolve(ctx)?,
        );

        let mut cache = self.cache.lock();
        cache.sync(self.generation);
        // Another reader may have finished the same context first.
        if let Some(hit) = cache.get(ctx) {
            return Ok(hit);
        }
        cache.put(ctx.clone(), Arc::clone(&resolved));
        Ok(resolved)
    }

    /// Resolve `ctx` and merge the result under `own` props.
    pub fn get_props(&self, ctx: &MatchContext, own: Option<&PropMap>) -> Result<PropMap, StyleError> {
        let resolved = self.resolve(ctx)?;
        Ok(merge_own_props(own, &resolved))
    }

    /// [`get_props`](Self::get_props) for a textual path such as
    /// `App Button.active Text`.
    pub fn get_props_for_path(&self, path: &str, own: Option<&PropMap>) -> Result<PropMap, StyleError> {
        self.get_props(&MatchContext::parse(path)?, own)
    }
}

fn parse_rule_selector(selector: &str) -> Result<CompoundSelector, StyleError> {
    parse_selector(selector).map_err(|e| StyleError::selector(selector, e))
}
