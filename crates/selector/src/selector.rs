use core::fmt;
use core::ops::Add;
use core::str::FromStr;

use common::ParseError;

use crate::token::{SelectorToken, SelectorTokenizer};

/// Selector specificity: `(variant_count << 8) + 1` per term, summed over
/// every term of a compound selector.
///
/// One variant qualifier therefore outweighs up to 255 extra ancestor terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Specificity(u32);

impl Specificity {
    pub const ZERO: Self = Self(0);

    const VARIANT_SHIFT: u32 = 8;

    /// Specificity of a single term carrying `variant_count` qualifiers.
    pub fn of_term(variant_count: usize) -> Self {
        let count = u32::try_from(variant_count).unwrap_or(u32::MAX);
        Self(count.saturating_mul(1 << Self::VARIANT_SHIFT).saturating_add(1))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Add for Specificity {
    type Output = Specificity;

    fn add(self, other: Specificity) -> Specificity {
        Specificity(self.0.saturating_add(other.0))
    }
}

/// One path segment of a selector, e.g. `Button.active.hover`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimpleSelector {
    name: String,
    variants: Vec<String>,
}

impl SimpleSelector {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
        }
    }

    pub fn with_variants<I, S>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variants.extend(variants.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Variant qualifiers in source order. Empty when the term is unqualified.
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    pub fn specificity(&self) -> Specificity {
        Specificity::of_term(self.variants.len())
    }
}

impl fmt::Display for SimpleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for v in &self.variants {
            write!(f, ".{v}")?;
        }
        Ok(())
    }
}

/// A whitespace-separated chain of simple selectors. The rightmost term is
/// the anchor and names the node the selector applies to; the others must
/// appear, in order, somewhere among its ancestors.
///
/// Always holds at least one term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompoundSelector {
    terms: Vec<SimpleSelector>,
    specificity: Specificity,
}

impl CompoundSelector {
    /// Build a selector from terms ordered outer → inner.
    pub fn from_terms(terms: Vec<SimpleSelector>) -> Result<Self, ParseError> {
        if terms.is_empty() {
            return Err(ParseError::EmptySelector);
        }
        let specificity = terms
            .iter()
            .map(SimpleSelector::specificity)
            .fold(Specificity::ZERO, Add::add);
        Ok(Self { terms, specificity })
    }

    /// The anchor term (rightmost).
    pub fn anchor(&self) -> &SimpleSelector {
        &self.terms[self.terms.len() - 1]
    }

    /// Name of the anchor term; the key a rule is stored under.
    pub fn name(&self) -> &str {
        self.anchor().name()
    }

    /// All terms, outer → inner, anchor last.
    pub fn terms(&self) -> &[SimpleSelector] {
        &self.terms
    }

    /// The non-anchor terms, outer → inner.
    pub fn ancestors(&self) -> &[SimpleSelector] {
        &self.terms[..self.terms.len() - 1]
    }

    pub fn is_simple(&self) -> bool {
        self.terms.len() == 1
    }

    pub fn specificity(&self) -> Specificity {
        self.specificity
    }

    pub fn into_terms(self) -> Vec<SimpleSelector> {
        self.terms
    }
}

impl fmt::Display for CompoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}

impl FromStr for CompoundSelector {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_selector(s)
    }
}

/// Parse a selector such as `App View.one Text`.
///
/// Empty input, a qualifier without a name (`.active`) and an empty
/// qualifier (`View.` / `View..one`) are rejected.
pub fn parse_selector(input: &str) -> Result<CompoundSelector, ParseError> {
    let tokens = SelectorTokenizer::new(input).tokenize_all();
    let mut terms = Vec::new();
    let mut pos = skip_whitespace(&tokens, 0);

    while pos < tokens.len() {
        let (term, new_pos) = parse_simple_selector(&tokens, pos, input.len())?;
        terms.push(term);
        pos = skip_whitespace(&tokens, new_pos);
    }

    CompoundSelector::from_terms(terms)
}

fn skip_whitespace(tokens: &[SelectorToken], mut pos: usize) -> usize {
    while pos < tokens.len() && tokens[pos] == SelectorToken::Whitespace {
        pos += 1;
    }
    pos
}

/// Parse `name(.variant)*` starting at `start`.
fn parse_simple_selector(
    tokens: &[SelectorToken],
    start: usize,
    input_len: usize,
) -> Result<(SimpleSelector, usize), ParseError> {
    let mut term = match tokens.get(start) {
        Some(SelectorToken::Ident { value, .. }) => SimpleSelector::new(value.as_str()),
        Some(SelectorToken::Dot { offset }) => {
            return Err(ParseError::MissingName { offset: *offset });
        }
        _ => return Err(ParseError::MissingName { offset: input_len }),
    };
    let mut pos = start + 1;

    while let Some(SelectorToken::Dot { offset }) = tokens.get(pos) {
        pos += 1;
        match tokens.get(pos) {
            Some(SelectorToken::Ident { value, .. }) => {
                term.variants.push(value.clone());
                pos += 1;
            }
            _ => return Err(ParseError::EmptyVariant { offset: offset + 1 }),
        }
    }

    Ok((term, pos))
}
