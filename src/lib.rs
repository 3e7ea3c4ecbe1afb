//! # stylable
//!
//! Resolves the props of a node in a component tree from declarative,
//! selector-scoped rules.
//!
//! ```
//! use stylable::prelude::*;
//!
//! let mut sheet = Stylesheet::new();
//! sheet.add_default_rule(
//!     "Text",
//!     RulePayload::new()
//!         .with_style(prop_map! { "horizontalMargin" => 2 })
//!         .with_mixins(["defaultFont"]),
//! )?;
//! sheet.add_rules([
//!     ("defaultFont", RulePayload::new().with_style(prop_map! { "fontSize" => 10 })),
//!     ("Intro defaultFont", RulePayload::new().with_style(prop_map! { "fontSize" => 20 })),
//! ])?;
//!
//! let props = sheet.get_props_for_path("App Intro Text", None)?;
//! let style = props.get(STYLE_KEY).and_then(Value::as_map).unwrap();
//! assert_eq!(style.get("fontSize"), Some(&Value::Int(20)));
//! # Ok::<(), StyleError>(())
//! ```

pub use common::{ParseError, PropMap, StyleError, Value, prop_map};
pub use selector::{CompoundSelector, SimpleSelector, Specificity, parse_selector};
pub use style::{
    ContextNode, EngineConfig, Expansion, InsertOutcome, MatchContext, NodeVariants, Rank,
    ResolutionCache, ResolvedPayload, Resolver, Rule, RuleId, RulePayload, RuleStore, STYLE_KEY,
    SharedStylesheet, StyleNode, Stylesheet, matches_selector, matches_simple, merge_own_props,
};

pub mod prelude {
    pub use crate::{
        ContextNode, EngineConfig, MatchContext, PropMap, Rank, RulePayload, STYLE_KEY,
        SharedStylesheet, StyleError, StyleNode, Stylesheet, Value, prop_map,
    };
}
