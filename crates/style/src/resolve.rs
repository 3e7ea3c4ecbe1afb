//! Rule resolution: find every rule matching a context, expand mixins, and
//! merge the results in priority order.
//!
//! Merging is first-write-wins per key throughout: buckets are visited
//! highest priority first, so a key set by a stronger rule is never
//! overwritten by a weaker one. Inside a rule, its own props and style are
//! seeded before its mixins, so the rule beats its mixins; mixins are merged
//! in declaration order.

use common::StyleError;
use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::cache::{Expansion, ResolutionCache};
use crate::context::MatchContext;
use crate::rule::{ResolvedPayload, Rule};
use crate::store::RuleStore;

pub struct Resolver<'a> {
    store: &'a RuleStore,
    max_mixin_depth: usize,
    cache: Option<&'a Mutex<ResolutionCache>>,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a RuleStore, max_mixin_depth: usize) -> Self {
        Self {
            store,
            max_mixin_depth,
            cache: None,
        }
    }

    /// Memoize per-rule mixin expansions in `cache`. The caller is responsible
    /// for having synced the cache to the store's generation. The lock is
    /// only held for individual lookups and stores.
    pub fn with_cache(mut self, cache: &'a Mutex<ResolutionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Resolve the merged payload for `ctx`. Unknown names resolve to an empty
    /// payload; missing mixins contribute nothing.
    pub fn resolve(&self, ctx: &MatchContext) -> Result<ResolvedPayload, StyleError> {
        let mut out = ResolvedPayload::default();
        let mut stack = Vec::new();
        self.collect(ctx, &mut out, &mut stack)?;
        Ok(out)
    }

    /// Merge every rule anchored at `ctx.name()` that matches `ctx` into `out`.
    /// Returns the longest mixin chain expanded below `ctx`.
    fn collect(
        &self,
        ctx: &MatchContext,
        out: &mut ResolvedPayload,
        stack: &mut Vec<String>,
    ) -> Result<usize, StyleError> {
        let mut depth = 0;
        for rule in self.store.rules_anchored_at(ctx.name()) {
            if !rule.matches(ctx) {
                continue;
            }
            trace!(selector = %rule.selector(), context = %ctx, "rule matched");
            if rule.mixins().is_empty() {
                merge_own(out, rule);
            } else {
                let expanded = self.expand(rule, ctx, stack)?;
                out.merge_absent(&expanded.payload);
                depth = depth.max(expanded.depth);
            }
        }
        Ok(depth)
    }

    /// The rule's own payload with its mixins merged underneath.
    fn expand(
        &self,
        rule: &Rule,
        ctx: &MatchContext,
        stack: &mut Vec<String>,
    ) -> Result<Expansion, StyleError> {
        if let Some(hit) = self.cached_expansion(rule, ctx) {
            if stack.len() + hit.depth <= self.max_mixin_depth {
                return Ok(hit);
            }
            trace!(selector = %rule.selector(), depth = hit.depth, "cached expansion too deep here");
        }

        let mut acc = rule.own_payload();
        let mut depth = 0;
        for name in rule.mixins() {
            if stack.iter().any(|n| n == name) {
                let mut chain = stack.clone();
                chain.push(name.clone());
                warn!(chain = ?chain, "cyclic mixin reference");
                return Err(StyleError::CyclicMixin { chain });
            }
            if stack.len() >= self.max_mixin_depth {
                warn!(mixin = %name, limit = self.max_mixin_depth, "mixin expansion too deep");
                return Err(StyleError::MixinDepthExceeded {
                    name: name.clone(),
                    limit: self.max_mixin_depth,
                });
            }

            stack.push(name.clone());
            let result = self.collect(&ctx.for_mixin(name), &mut acc, stack);
            stack.pop();
            depth = depth.max(result? + 1);
        }

        let expansion = Expansion {
            payload: acc,
            depth,
        };
        if let Some(cache) = self.cache {
            cache
                .lock()
                .put_expansion(rule.id(), ctx.clone(), expansion.clone());
        }
        Ok(expansion)
    }

    fn cached_expansion(&self, rule: &Rule, ctx: &MatchContext) -> Option<Expansion> {
        let cache = self.cache?.lock();
        cache.get_expansion(rule.id(), ctx).cloned()
    }
}

fn merge_own(out: &mut ResolvedPayload, rule: &Rule) {
    let payload = rule.payload();
    if let Some(props) = &payload.props {
        out.props.get_or_insert_with(Default::default).merge_absent(props);
    }
    if let Some(style) = &payload.style {
        out.style.get_or_insert_with(Default::default).merge_absent(style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Rank, RulePayload};
    use common::{PropMap, prop_map};
    use selector::parse_selector;

    fn add(store: &mut RuleStore, selector: &str, payload: RulePayload, rank: Rank) {
        store.insert(parse_selector(selector).unwrap(), payload, rank);
    }

    fn style(map: PropMap) -> RulePayload {
        RulePayload::new().with_style(map)
    }

    fn resolve(store: &RuleStore, path: &str) -> Result<ResolvedPayload, StyleError> {
        Resolver::new(store, 32).resolve(&MatchContext::parse(path).unwrap())
    }

    #[test]
    fn unknown_name_is_empty() {
        let store = RuleStore::new();
        let out = resolve(&store, "App Text").unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn higher_priority_rule_wins_per_key() {
        let mut store = RuleStore::new();
        add(&mut store, "Text", style(prop_map! { "fontSize" => 8, "color" => "black" }), Rank::Default);
        add(&mut store, "App Text", style(prop_map! { "fontSize" => 10 }), Rank::Default);
        let out = resolve(&store, "App Other Text").unwrap();
        assert_eq!(out.style, Some(prop_map! { "fontSize" => 10, "color" => "black" }));
        assert!(out.props.is_none());
    }

    #[test]
    fn own_values_beat_mixin_values() {
        let mut store = RuleStore::new();
        add(&mut store, "base", style(prop_map! { "fontSize" => 10, "color" => "red" }), Rank::Explicit);
        add(
            &mut store,
            "Text",
            style(prop_map! { "color" => "blue" }).with_mixins(["base"]),
            Rank::Explicit,
        );
        let out = resolve(&store, "Text").unwrap();
        assert_eq!(out.style, Some(prop_map! { "fontSize" => 10, "color" => "blue" }));
    }

    #[test]
    fn mixins_merge_in_declaration_order() {
        let mut store = RuleStore::new();
        add(&mut store, "first", style(prop_map! { "w" => 1 }), Rank::Explicit);
        add(&mut store, "second", style(prop_map! { "w" => 2, "h" => 2 }), Rank::Explicit);
        add(&mut store, "Box", RulePayload::new().with_mixins(["first", "second"]), Rank::Explicit);
        let out = resolve(&store, "Box").unwrap();
        assert_eq!(out.style, Some(prop_map! { "w" => 1, "h" => 2 }));
    }

    #[test]
    fn missing_mixin_contributes_nothing() {
        let mut store = RuleStore::new();
        add(&mut store, "Text", RulePayload::new().with_mixins(["nowhere"]), Rank::Default);
        let out = resolve(&store, "Text").unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn mixins_resolve_in_referencing_context() {
        let mut store = RuleStore::new();
        add(&mut store, "font", style(prop_map! { "fontSize" => 10 }), Rank::Explicit);
        add(&mut store, "Intro font", style(prop_map! { "fontSize" => 20 }), Rank::Explicit);
        add(&mut store, "Text", RulePayload::new().with_mixins(["font"]), Rank::Default);
        assert_eq!(
            resolve(&store, "App Text").unwrap().style,
            Some(prop_map! { "fontSize" => 10 })
        );
        assert_eq!(
            resolve(&store, "App Intro Text").unwrap().style,
            Some(prop_map! { "fontSize" => 20 })
        );
    }

    #[test]
    fn mixin_follows_subject_variants() {
        let mut store = RuleStore::new();
        add(&mut store, "font", style(prop_map! { "fontWeight" => "normal" }), Rank::Explicit);
        add(&mut store, "font.active", style(prop_map! { "fontWeight" => "bold" }), Rank::Explicit);
        add(&mut store, "Text", RulePayload::new().with_mixins(["font"]), Rank::Default);
        assert_eq!(
            resolve(&store, "Text.active").unwrap().style,
            Some(prop_map! { "fontWeight" => "bold" })
        );
        assert_eq!(
            resolve(&store, "Text").unwrap().style,
            Some(prop_map! { "fontWeight" => "normal" })
        );
    }

    #[test]
    fn nested_mixins_expand_transitively() {
        let mut store = RuleStore::new();
        add(&mut store, "bold", style(prop_map! { "fontWeight" => "bold" }).with_mixins(["defaultFont"]), Rank::Explicit);
        add(&mut store, "defaultFont", style(prop_map! { "fontSize" => 10, "fontFamily" => "Helvetica" }), Rank::Explicit);
        add(&mut store, "Text2", RulePayload::new().with_mixins(["bold"]), Rank::Explicit);
        assert_eq!(
            resolve(&store, "App Text2").unwrap().style,
            Some(prop_map! { "fontSize" => 10, "fontFamily" => "Helvetica", "fontWeight" => "bold" })
        );
    }

    #[test]
    fn cyclic_mixins_fail() {
        let mut store = RuleStore::new();
        add(&mut store, "a", RulePayload::new().with_mixins(["b"]), Rank::Explicit);
        add(&mut store, "b", RulePayload::new().with_mixins(["a"]), Rank::Explicit);
        add(&mut store, "Text", RulePayload::new().with_mixins(["a"]), Rank::Explicit);
        assert_eq!(
            resolve(&store, "Text"),
            Err(StyleError::CyclicMixin {
                chain: vec!["a".into(), "b".into(), "a".into()]
            })
        );
    }

    #[test]
    fn self_referencing_mixin_fails() {
        let mut store = RuleStore::new();
        add(&mut store, "Text", RulePayload::new().with_mixins(["Text"]), Rank::Explicit);
        assert_eq!(
            resolve(&store, "Text"),
            Err(StyleError::CyclicMixin {
                chain: vec!["Text".into(), "Text".into()]
            })
        );
    }

    #[test]
    fn depth_limit_is_enforced() {
        let mut store = RuleStore::new();
        add(&mut store, "a", RulePayload::new().with_mixins(["b"]), Rank::Explicit);
        add(&mut store, "b", RulePayload::new().with_mixins(["c"]), Rank::Explicit);
        add(&mut store, "c", style(prop_map! { "x" => 1 }), Rank::Explicit);
        add(&mut store, "Text", RulePayload::new().with_mixins(["a"]), Rank::Explicit);
        let ctx = MatchContext::parse("Text").unwrap();
        assert_eq!(
            Resolver::new(&store, 2).resolve(&ctx),
            Err(StyleError::MixinDepthExceeded {
                name: "c".into(),
                limit: 2
            })
        );
        assert!(Resolver::new(&store, 3).resolve(&ctx).is_ok());
    }

    #[test]
    fn expansion_cache_gives_same_result() {
        let mut store = RuleStore::new();
        add(&mut store, "font", style(prop_map! { "fontSize" => 10 }), Rank::Explicit);
        add(&mut store, "Text", style(prop_map! { "m" => 2 }).with_mixins(["font"]), Rank::Default);
        let ctx = MatchContext::parse("App Text").unwrap();
        let uncached = Resolver::new(&store, 32).resolve(&ctx).unwrap();

        let cache = Mutex::new(ResolutionCache::new(16));
        let first = Resolver::new(&store, 32).with_cache(&cache).resolve(&ctx).unwrap();
        assert!(!cache.lock().is_empty());
        let second = Resolver::new(&store, 32).with_cache(&cache).resolve(&ctx).unwrap();
        assert_eq!(first, uncached);
        assert_eq!(second, uncached);
    }

    #[test]
    fn cached_expansion_respects_depth_limit() {
        let mut store = RuleStore::new();
        add(&mut store, "a", RulePayload::new().with_mixins(["b"]), Rank::Explicit);
        add(&mut store, "b", RulePayload::new().with_mixins(["c"]), Rank::Explicit);
        add(&mut store, "c", style(prop_map! { "x" => 1 }), Rank::Explicit);
        add(&mut store, "Text", RulePayload::new().with_mixins(["a"]), Rank::Explicit);
        let shallow = MatchContext::parse("b").unwrap();
        let deep = MatchContext::parse("Text").unwrap();

        let cache = Mutex::new(ResolutionCache::new(16));
        let resolver = Resolver::new(&store, 2).with_cache(&cache);
        assert_eq!(
            resolver.resolve(&shallow).unwrap().style,
            Some(prop_map! { "x" => 1 })
        );
        let expected = Err(StyleError::MixinDepthExceeded {
            name: "c".into(),
            limit: 2,
        });
        assert_eq!(resolver.resolve(&deep), expected);
        assert_eq!(Resolver::new(&store, 2).resolve(&deep), expected);
    }

    #[test]
    fn cached_expansion_is_reused_within_depth_limit() {
        let mut store = RuleStore::new();
        add(&mut store, "b", RulePayload::new().with_mixins(["c"]), Rank::Explicit);
        add(&mut store, "c", style(prop_map! { "x" => 1 }), Rank::Explicit);
        add(&mut store, "Text", RulePayload::new().with_mixins(["b"]), Rank::Explicit);

        let cache = Mutex::new(ResolutionCache::new(16));
        let resolver = Resolver::new(&store, 2).with_cache(&cache);
        resolver.resolve(&MatchContext::parse("b").unwrap()).unwrap();
        let hit = cache
            .lock()
            .get_expansion(store.rules_anchored_at("b")[0].id(), &MatchContext::parse("b").unwrap())
            .cloned()
            .unwrap();
        assert_eq!(hit.depth, 1);
        assert_eq!(
            resolver.resolve(&MatchContext::parse("Text").unwrap()).unwrap().style,
            Some(prop_map! { "x" => 1 })
        );
    }
}
