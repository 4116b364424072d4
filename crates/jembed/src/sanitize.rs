use std::sync::OnceLock;

use regex::Regex;

use crate::input::InputItem;

fn noise_runs() -> &'static Regex {
    static NOISE: OnceLock<Regex> = OnceLock::new();
    NOISE.get_or_init(|| {
        Regex::new(r"[\p{S}\p{P}\p{Z}\p{C}]+").expect("noise-run pattern is valid")
    })
}

/// Collapse every maximal run of symbol, punctuation, separator and
/// control characters into a single space. Idempotent; an empty result
/// is valid.
pub fn sanitize_text(s: &str) -> String {
    noise_runs().replace_all(s, " ").into_owned()
}

/// Sanitize one item before submission. Labeled items are cleaned only
/// when the label is `text`; any other label passes through unchanged.
pub fn sanitize_item(item: &InputItem) -> InputItem {
    match item {
        InputItem::Text(s) => InputItem::Text(sanitize_text(s)),
        InputItem::LabeledText { field, value } if field == "text" => InputItem::LabeledText {
            field: field.clone(),
            value: sanitize_text(value),
        },
        other => other.clone(),
    }
}
