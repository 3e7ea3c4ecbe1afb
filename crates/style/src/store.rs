//! Rule store: rules bucketed by anchor name, each bucket kept in priority
//! order: rank descending, then specificity descending, then insertion order.

use std::collections::HashMap;

use selector::CompoundSelector;
use tracing::debug;

use crate::rule::{Rank, Rule, RuleId, RulePayload};

/// What [`RuleStore::insert`] did with the new rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(RuleId),
    /// An existing rule with the same selector and rank was replaced in place.
    Replaced { old: RuleId, new: RuleId },
}

impl InsertOutcome {
    pub fn id(self) -> RuleId {
        match self {
            Self::Inserted(id) | Self::Replaced { new: id, .. } => id,
        }
    }
}

#[derive(Debug, Default)]
pub struct RuleStore {
    buckets: HashMap<String, Vec<Rule>>,
    next_id: u64,
    len: usize,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, replacing any rule with an identical selector and rank.
    pub fn insert(&mut self, selector: CompoundSelector, payload: RulePayload, rank: Rank) -> InsertOutcome {
        let id = RuleId(self.next_id);
        self.next_id += 1;
        let rule = Rule::new(id, selector, rank, payload);

        let bucket = self.buckets.entry(rule.key().to_owned()).or_default();
        let outcome = match bucket.iter().position(|r| r.same_slot(&rule)) {
            Some(i) => {
                let old = bucket[i].id();
                debug!(selector = %rule.selector(), ?rank, "replacing rule");
                bucket[i] = rule;
                InsertOutcome::Replaced { old, new: id }
            }
            None => {
                debug!(selector = %rule.selector(), ?rank, "adding rule");
                bucket.push(rule);
                self.len += 1;
                InsertOutcome::Inserted(id)
            }
        };

        // Stable: equal (rank, specificity) keep their relative insertion order.
        bucket.sort_by(|a, b| {
            b.rank()
                .cmp(&a.rank())
                .then(b.specificity().cmp(&a.specificity()))
        });

        outcome
    }

    /// All rules anchored at `name`, highest priority first. No context
    /// filtering is applied.
    pub fn rules_anchored_at(&self, name: &str) -> &[Rule] {
        self.buckets.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.buckets.values().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::prop_map;
    use selector::parse_selector;

    fn insert(store: &mut RuleStore, selector: &str, rank: Rank) -> InsertOutcome {
        store.insert(parse_selector(selector).unwrap(), RulePayload::new(), rank)
    }

    fn order(store: &RuleStore, name: &str) -> Vec<String> {
        store
            .rules_anchored_at(name)
            .iter()
            .map(|r| format!("{:?}:{}", r.rank(), r.selector()))
            .collect()
    }

    #[test]
    fn buckets_by_anchor_name() {
        let mut store = RuleStore::new();
        insert(&mut store, "View", Rank::Explicit);
        insert(&mut store, "App View", Rank::Explicit);
        insert(&mut store, "Text", Rank::Default);
        assert_eq!(store.len(), 3);
        assert_eq!(store.bucket_count(), 2);
        assert_eq!(store.rules_anchored_at("View").len(), 2);
        assert!(store.rules_anchored_at("Missing").is_empty());
    }

    #[test]
    fn sorted_by_rank_then_specificity() {
        let mut store = RuleStore::new();
        insert(&mut store, "Text", Rank::Explicit);
        insert(&mut store, "App Button Text", Rank::Default);
        insert(&mut store, "Button.active Text", Rank::Default);
        insert(&mut store, "App Text", Rank::Explicit);
        assert_eq!(
            order(&store, "Text"),
            [
                "Explicit:App Text",
                "Explicit:Text",
                "Default:Button.active Text",
                "Default:App Button Text",
            ]
        );
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut store = RuleStore::new();
        insert(&mut store, "Title Text", Rank::Default);
        insert(&mut store, "Button Text", Rank::Default);
        insert(&mut store, "Text", Rank::Default);
        insert(&mut store, "Intro Text", Rank::Default);
        assert_eq!(
            order(&store, "Text"),
            [
                "Default:Title Text",
                "Default:Button Text",
                "Default:Intro Text",
                "Default:Text",
            ]
        );
    }

    #[test]
    fn identical_selector_and_rank_replaces() {
        let mut store = RuleStore::new();
        let first = insert(&mut store, "defaultFont", Rank::Explicit);
        let outcome = store.insert(
            parse_selector("defaultFont").unwrap(),
            RulePayload::new().with_style(prop_map! { "fontSize" => 8 }),
            Rank::Explicit,
        );
        assert_eq!(
            outcome,
            InsertOutcome::Replaced {
                old: first.id(),
                new: outcome.id()
            }
        );
        assert_eq!(store.len(), 1);
        let rules = store.rules_anchored_at("defaultFont");
        assert_eq!(rules[0].payload().style, Some(prop_map! { "fontSize" => 8 }));
    }

    #[test]
    fn same_selector_different_rank_coexists() {
        let mut store = RuleStore::new();
        insert(&mut store, "View", Rank::Default);
        insert(&mut store, "View", Rank::Explicit);
        assert_eq!(order(&store, "View"), ["Explicit:View", "Default:View"]);
    }
}
