//! # Selector Grammar
//!
//! Parses `App Button.active Text`-style selectors into a
//! [`CompoundSelector`] and computes [`Specificity`]. Matching lives in the
//! `style` crate; this crate only knows the grammar.

pub mod token;
pub mod selector;

pub use token::{SelectorToken, SelectorTokenizer};
pub use selector::{CompoundSelector, SimpleSelector, Specificity, parse_selector};
