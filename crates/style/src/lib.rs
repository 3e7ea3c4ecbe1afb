//! # Style Engine
//!
//! Rule storage, selector matching, mixin expansion and merge for
//! component-tree styling. A host registers rules on a [`Stylesheet`] and asks
//! it for the props of a node described by a [`MatchContext`].

pub mod cache;
pub mod config;
pub mod context;
pub mod matching;
pub mod merge;
pub mod resolve;
pub mod rule;
pub mod shared;
pub mod sheet;
pub mod store;

pub use cache::{Expansion, ResolutionCache};
pub use config::EngineConfig;
pub use context::{ContextNode, MatchContext, NodeVariants, StyleNode};
pub use matching::{matches_selector, matches_simple};
pub use merge::{STYLE_KEY, merge_own_props};
pub use resolve::Resolver;
pub use rule::{Rank, ResolvedPayload, Rule, RuleId, RulePayload};
pub use shared::SharedStylesheet;
pub use sheet::Stylesheet;
pub use store::{InsertOutcome, RuleStore};
