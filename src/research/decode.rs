//! Best-effort decoding of structured values out of free-form model output.
//!
//! Models are asked for JSON arrays but routinely wrap them in prose or code
//! fences. [`decode_array_or`] pulls the array out when it can and otherwise
//! substitutes a caller-supplied default, tagging which path was taken.

use serde::de::DeserializeOwned;

/// Outcome of a best-effort decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decode<T> {
    /// The model output parsed as expected.
    Decoded(T),
    /// Parsing failed; the deterministic default was substituted.
    FallbackUsed(T),
}

impl<T> Decode<T> {
    pub fn into_inner(self) -> T {
        match self {
            Decode::Decoded(value) | Decode::FallbackUsed(value) => value,
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Decode::Decoded(value) | Decode::FallbackUsed(value) => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Decode::FallbackUsed(_))
    }
}

/// Extract the first JSON array in `text` and deserialize its elements.
pub fn decode_array<T: DeserializeOwned>(text: &str) -> Option<Vec<T>> {
    candidate_spans(text)
        .into_iter()
        .find_map(|span| parse_span::<T>(span))
}

/// [`decode_array`], substituting `fallback()` when nothing parses.
pub fn decode_array_or<T, F>(text: &str, fallback: F) -> Decode<Vec<T>>
where
    T: DeserializeOwned,
    F: FnOnce() -> Vec<T>,
{
    match decode_array(text) {
        Some(values) => Decode::Decoded(values),
        None => Decode::FallbackUsed(fallback()),
    }
}

fn parse_span<T: DeserializeOwned>(span: &str) -> Option<Vec<T>> {
    if let Ok(values) = serde_json::from_str::<Vec<T>>(span) {
        return Some(values);
    }
    // Python-style lists: ['a', 'b']
    if span.contains('\'') && !span.contains('"') {
        let swapped = span.replace('\'', "\"");
        return serde_json::from_str::<Vec<T>>(&swapped).ok();
    }
    None
}

/// Outermost `[...]` first, then the first balanced `[...]`.
fn candidate_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) else {
        return spans;
    };
    if end > start {
        spans.push(&text[start..=end]);
    }
    if let Some(balanced_end) = balanced_end(text, start) {
        if balanced_end != end {
            spans.push(&text[start..=balanced_end]);
        }
    }
    spans
}

fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}
