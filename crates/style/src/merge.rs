//! Final merge of resolved rule output onto a node's own props.

use common::{PropMap, Value};

use crate::rule::ResolvedPayload;

/// Key under which style maps travel in a props bag.
pub const STYLE_KEY: &str = "style";

/// Combine `resolved` with the caller's own props.
///
/// Own props always win over rule props. Style is not merged key by key when
/// the caller supplies its own: the result is a list `[resolved, own...]` so
/// the consumer composes it with later entries on top. Without an own style
/// the resolved style map is returned as-is.
///
/// [`STYLE_KEY`] is reserved: a `style` entry inside rule props is ignored,
/// style only travels through the payload's `style` field.
pub fn merge_own_props(own: Option<&PropMap>, resolved: &ResolvedPayload) -> PropMap {
    let mut out = own.cloned().unwrap_or_default();

    if let Some(props) = &resolved.props {
        for (key, value) in props.iter().filter(|(key, _)| *key != STYLE_KEY) {
            out.insert_if_absent(key, value.clone());
        }
    }

    if let Some(style) = &resolved.style {
        let rule_style = Value::Map(style.clone());
        let composed = match own.and_then(|o| o.get(STYLE_KEY)) {
            None => rule_style,
            Some(Value::List(entries)) => {
                let mut list = Vec::with_capacity(entries.len() + 1);
                list.push(rule_style);
                list.extend(entries.iter().cloned());
                Value::List(list)
            }
            Some(own_style) => Value::List(vec![rule_style, own_style.clone()]),
        };
        out.insert(STYLE_KEY, composed);
    }

    out
}
