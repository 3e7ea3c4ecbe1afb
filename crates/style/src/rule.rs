//! Rules: a selector bound to a payload of props, style and mixin names.

use common::PropMap;
use selector::{CompoundSelector, Specificity};

use crate::context::MatchContext;
use crate::matching::matches_selector;

// ─────────────────────────────────────────────────────────────────────────────
// Rank
// ─────────────────────────────────────────────────────────────────────────────

/// Priority class of a rule. Any explicit rule beats any default rule,
/// whatever their specificities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Default = 0,
    Explicit = 1,
}

// ─────────────────────────────────────────────────────────────────────────────
// RulePayload
// ─────────────────────────────────────────────────────────────────────────────

/// What a rule contributes when it matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RulePayload {
    /// Plain props. A `style` key here is ignored when merging; use `style`.
    pub props: Option<PropMap>,
    pub style: Option<PropMap>,
    /// Names of rules merged in as if inlined, in declaration order.
    pub mixins: Vec<String>,
}

impl RulePayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_props(mut self, props: PropMap) -> Self {
        self.props = Some(props);
        self
    }

    pub fn with_style(mut self, style: PropMap) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_mixins<I, S>(mut self, mixins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mixins.extend(mixins.into_iter().map(Into::into));
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ResolvedPayload
// ─────────────────────────────────────────────────────────────────────────────

/// Merged props and style for one context. `None` means no matching rule set
/// the corresponding map at all, which is distinct from an empty map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedPayload {
    pub props: Option<PropMap>,
    pub style: Option<PropMap>,
}

impl ResolvedPayload {
    pub fn is_empty(&self) -> bool {
        self.props.is_none() && self.style.is_none()
    }

    /// Merge `other` into `self`; keys already present here win.
    pub fn merge_absent(&mut self, other: &ResolvedPayload) {
        if let Some(props) = &other.props {
            self.props.get_or_insert_with(PropMap::new).merge_absent(props);
        }
        if let Some(style) = &other.style {
            self.style.get_or_insert_with(PropMap::new).merge_absent(style);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rule
// ─────────────────────────────────────────────────────────────────────────────

/// Identity assigned by the rule store. A replaced rule gets a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub u64);

#[derive(Debug, Clone)]
pub struct Rule {
    id: RuleId,
    selector: CompoundSelector,
    rank: Rank,
    payload: RulePayload,
}

impl Rule {
    pub fn new(id: RuleId, selector: CompoundSelector, rank: Rank, payload: RulePayload) -> Self {
        Self {
            id,
            selector,
            rank,
            payload,
        }
    }

    pub fn id(&self) -> RuleId {
        self.id
    }

    /// The store bucket this rule lives in: its anchor term's name.
    pub fn key(&self) -> &str {
        self.selector.name()
    }

    pub fn selector(&self) -> &CompoundSelector {
        &self.selector
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn specificity(&self) -> Specificity {
        self.selector.specificity()
    }

    pub fn payload(&self) -> &RulePayload {
        &self.payload
    }

    pub fn mixins(&self) -> &[String] {
        &self.payload.mixins
    }

    pub fn matches(&self, ctx: &MatchContext) -> bool {
        matches_selector(&self.selector, ctx)
    }

    /// The rule's own props and style, before mixin expansion.
    pub fn own_payload(&self) -> ResolvedPayload {
        ResolvedPayload {
            props: self.payload.props.clone(),
            style: self.payload.style.clone(),
        }
    }

    /// True when both rules would occupy the same store slot.
    pub(crate) fn same_slot(&self, other: &Rule) -> bool {
        self.rank == other.rank && self.selector == other.selector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::prop_map;
    use selector::parse_selector;

    fn rule(selector: &str, rank: Rank) -> Rule {
        Rule::new(RuleId(0), parse_selector(selector).unwrap(), rank, RulePayload::new())
    }

    #[test]
    fn key_is_anchor_name() {
        assert_eq!(rule("App Button.active Text", Rank::Explicit).key(), "Text");
    }

    #[test]
    fn explicit_outranks_default() {
        assert!(Rank::Explicit > Rank::Default);
        assert_eq!(Rank::Explicit as u8, 1);
    }

    #[test]
    fn same_slot_needs_selector_and_rank() {
        let a = rule("App  View", Rank::Explicit);
        assert!(a.same_slot(&rule("App View", Rank::Explicit)));
        assert!(!a.same_slot(&rule("App View", Rank::Default)));
        assert!(!a.same_slot(&rule("View", Rank::Explicit)));
    }

    #[test]
    fn resolved_merge_keeps_existing_keys() {
        let mut acc = ResolvedPayload {
            props: None,
            style: Some(prop_map! { "fontSize" => 20 }),
        };
        acc.merge_absent(&ResolvedPayload {
            props: Some(prop_map! { "p" => 1 }),
            style: Some(prop_map! { "fontSize" => 10, "fontFamily" => "Helvetica" }),
        });
        assert_eq!(acc.props, Some(prop_map! { "p" => 1 }));
        assert_eq!(
            acc.style,
            Some(prop_map! { "fontSize" => 20, "fontFamily" => "Helvetica" })
        );
    }

    #[test]
    fn payload_builder() {
        let p = RulePayload::new()
            .with_style(prop_map! { "horizontalMargin" => 2 })
            .with_mixins(["defaultFont"]);
        assert_eq!(p.mixins, vec!["defaultFont".to_string()]);
        assert!(p.props.is_none());
    }
}
