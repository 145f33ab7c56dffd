//! Structured-to-Markdown rendering.
//!
//! Turns arbitrary JSON into deterministic, readable Markdown:
//! - mappings become headings (depth capped at level 5),
//! - scalars become `Label: value` lines,
//! - scalar lists collapse onto one line when short, bullets otherwise,
//! - long strings wrap at 72 columns with a two-space indent.
//!
//! Within each mapping, scalar keys render first, then nested mappings,
//! then lists, each group in original key order.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};

/// Column limit for single-line lists and unwrapped strings.
pub const MAX_WIDTH: usize = 72;

/// Deepest heading level emitted.
const MAX_HEADING_LEVEL: usize = 5;

/// Shape of a value as seen by the renderer.
#[derive(Debug, Clone, Copy)]
enum Node<'a> {
    Scalar(&'a Value),
    Mapping(&'a Map<String, Value>),
    Sequence(&'a [Value]),
}

impl<'a> From<&'a Value> for Node<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => Self::Mapping(map),
            Value::Array(items) => Self::Sequence(items),
            scalar => Self::Scalar(scalar),
        }
    }
}

/// Render parsed JSON as Markdown.
///
/// A top-level array renders each element under a `Record N` key.
#[must_use]
pub fn to_markdown(data: &Value) -> String {
    let mut out = Lines::default();

    match data {
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                let key = format!("Record {}", idx + 1);
                let mut path = vec![key.as_str()];
                out.process(item, &mut path);
            }
        }
        Value::Object(_) => out.process(data, &mut Vec::new()),
        Value::Null => {}
        scalar => out.push(&scalar_text(scalar)),
    }

    out.finish()
}

/// Render JSON text as Markdown.
pub fn to_markdown_str(json: &str) -> Result<String, serde_json::Error> {
    let value: Value = serde_json::from_str(json)?;
    Ok(to_markdown(&value))
}

/// Render any serializable value as Markdown.
pub fn to_markdown_from<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(data)?;
    Ok(to_markdown(&value))
}

/// Human label for a key: `nct_id` -> `Nct Id`, `NCTNumber` -> `Nct Number`.
#[must_use]
pub fn label(key: &str) -> String {
    let chars: Vec<char> = key.replace('_', " ").chars().collect();
    let mut spaced = String::with_capacity(chars.len() + 4);

    for (idx, &c) in chars.iter().enumerate() {
        if idx > 0 && c.is_ascii_uppercase() {
            let prev = chars[idx - 1];
            let next_is_lower = chars.get(idx + 1).is_some_and(char::is_ascii_lowercase);
            let acronym_end = prev.is_ascii_uppercase() && next_is_lower;
            let camel_hump = prev.is_ascii_lowercase() || prev.is_ascii_digit();
            if acronym_end || camel_hump {
                spaced.push(' ');
            }
        }
        spaced.push(c);
    }

    spaced
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

const fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

/// Output buffer. Every line is stored with trailing whitespace removed.
#[derive(Default)]
struct Lines {
    lines: Vec<String>,
}

impl Lines {
    fn push(&mut self, line: &str) {
        self.lines.push(line.trim_end().to_string());
    }

    fn finish(self) -> String {
        let mut text = self.lines.join("\n").trim().to_string();
        text.push('\n');
        text
    }

    fn process<'a>(&mut self, value: &'a Value, path: &mut Vec<&'a str>) {
        match Node::from(value) {
            Node::Mapping(map) => self.mapping(map, path),
            Node::Sequence(items) => self.sequence(items, path),
            Node::Scalar(Value::Null) => {}
            Node::Scalar(scalar) => match path.last().copied() {
                Some(key) => self.key_value(key, scalar),
                None => self.push(&scalar_text(scalar)),
            },
        }
    }

    fn mapping<'a>(&mut self, map: &'a Map<String, Value>, path: &mut Vec<&'a str>) {
        if let Some(key) = path.last().copied() {
            let level = path.len().min(MAX_HEADING_LEVEL);
            let heading = format!("{} {}", "#".repeat(level), label(key));
            self.push("");
            self.push(&heading);
        }

        let scalars = map.iter().filter(|(_, v)| matches!(Node::from(*v), Node::Scalar(_)));
        let mappings = map.iter().filter(|(_, v)| v.is_object());
        let sequences = map.iter().filter(|(_, v)| v.is_array());

        for (key, value) in scalars.chain(mappings).chain(sequences) {
            path.push(key.as_str());
            self.process(value, path);
            path.pop();
        }
    }

    fn sequence<'a>(&mut self, items: &'a [Value], path: &mut Vec<&'a str>) {
        let all_scalars = items.iter().all(is_scalar);

        let mut seen = HashSet::new();
        let unique: Vec<&Value> = items
            .iter()
            .filter(|item| seen.insert(item.to_string()))
            .collect();

        if all_scalars {
            if let Some(key) = path.last().copied() {
                self.scalar_list(key, &unique);
                return;
            }
        }
        for item in unique {
            self.process(item, path);
        }
    }

    fn scalar_list(&mut self, key: &str, items: &[&Value]) {
        let label = label(key);
        let texts: Vec<String> = items.iter().map(|item| scalar_text(item)).collect();
        let single_line = format!("{}: {}", label, texts.join(", "));

        if single_line.chars().count() <= MAX_WIDTH {
            self.push(&single_line);
        } else {
            self.push(&format!("{label}:"));
            for text in texts {
                self.push(&format!("- {text}"));
            }
        }
    }

    fn key_value(&mut self, key: &str, value: &Value) {
        let label = label(key);
        match value {
            Value::String(text) if text.chars().count() > MAX_WIDTH => {
                self.push(&format!("{label}:"));
                for wrapped in wrap_preserve_newlines(text, MAX_WIDTH) {
                    self.push(&format!("  {wrapped}"));
                }
            }
            other => self.push(&format!("{}: {}", label, scalar_text(other))),
        }
    }
}

/// Wrap each source line independently; blank source lines stay blank.
fn wrap_preserve_newlines(text: &str, width: usize) -> Vec<String> {
    let mut wrapped = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            wrapped.push(String::new());
        } else {
            wrapped.extend(wrap_line(line, width));
        }
    }
    wrapped
}

/// Greedy word wrap over whitespace runs and hyphenated word parts.
///
/// Whitespace runs collapse to one space. A leading space is kept on the
/// first line only. Words wider than `width` fill what is left of the current
/// line and continue on the next, preferring a break after a hyphen.
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut chunks = split_chunks(line);
    chunks.reverse();

    let mut lines = Vec::new();
    while !chunks.is_empty() {
        if !lines.is_empty() && chunks.last().is_some_and(|c| c == " ") {
            chunks.pop();
        }

        let mut current: Vec<String> = Vec::new();
        let mut current_len = 0;
        while let Some(chunk) = chunks.last() {
            let len = chunk.chars().count();
            if current_len + len > width {
                break;
            }
            current_len += len;
            current.extend(chunks.pop());
        }

        if let Some(chunk) = chunks.pop() {
            if chunk.chars().count() > width {
                let (head, tail) = split_long_word(&chunk, width - current_len);
                if !head.is_empty() {
                    current.push(head);
                }
                if !tail.is_empty() {
                    chunks.push(tail);
                }
            } else {
                chunks.push(chunk);
            }
        }

        if current.last().is_some_and(|c| c == " ") {
            current.pop();
        }
        if !current.is_empty() {
            lines.push(current.concat());
        }
    }
    lines
}

/// Split a line into single-space chunks and word parts.
fn split_chunks(line: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    if line.starts_with(char::is_whitespace) {
        chunks.push(" ".to_string());
    }
    for (idx, word) in line.split_whitespace().enumerate() {
        if idx > 0 {
            chunks.push(" ".to_string());
        }
        chunks.extend(hyphen_parts(word));
    }
    if line.ends_with(char::is_whitespace) && !line.trim().is_empty() {
        chunks.push(" ".to_string());
    }
    chunks
}

/// Break a word after hyphens that join two letter runs: `tumor-infiltrating`
/// splits, `BRAF-V600E`, `COVID-19` and `x-ray` do not.
fn hyphen_parts(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let letter = |idx: usize| {
        matches!(chars.get(idx), Some(&c) if c.is_alphabetic() || c == '_')
    };
    let hyphen = |idx: usize| chars.get(idx) == Some(&'-');

    let mut parts = Vec::new();
    let mut start = 0;
    for idx in 0..chars.len() {
        if !hyphen(idx) {
            continue;
        }
        let after_letters = idx >= 2 && letter(idx - 1) && letter(idx - 2);
        let after_compound =
            idx >= 3 && letter(idx - 1) && hyphen(idx - 2) && letter(idx - 3);
        let before_letters =
            letter(idx + 1) && (letter(idx + 2) || (hyphen(idx + 2) && letter(idx + 3)));
        if (after_letters || after_compound) && before_letters {
            parts.push(chars[start..=idx].iter().collect());
            start = idx + 1;
        }
    }
    parts.push(chars[start..].iter().collect());
    parts
}

/// Cut an oversized word to `space_left` columns, or just after the last
/// hyphen that fits when something other than hyphens precedes it.
fn split_long_word(word: &str, space_left: usize) -> (String, String) {
    let chars: Vec<char> = word.chars().collect();
    let mut end = space_left.min(chars.len());

    if let Some(pos) = chars[..end].iter().rposition(|&c| c == '-') {
        if pos > 0 && chars[..pos].iter().any(|&c| c != '-') {
            end = pos + 1;
        }
    }
    (chars[..end].iter().collect(), chars[end..].iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_label_fixtures() {
        assert_eq!(label("nct_id"), "Nct Id");
        assert_eq!(label("protocol_section"), "Protocol Section");
        assert_eq!(label("4dct"), "4dct");
        assert_eq!(label("allcaps"), "Allcaps");
        assert_eq!(label("NCTNumber"), "Nct Number");
        assert_eq!(label("some_key_name"), "Some Key Name");
        assert_eq!(label("study_url"), "Study Url");
        assert_eq!(label("somekey"), "Somekey");
    }

    #[test]
    fn test_label_camel_case() {
        assert_eq!(label("overallStatus"), "Overall Status");
        assert_eq!(label("hgvs10Protein"), "Hgvs10 Protein");
        assert_eq!(label("  spaced__out "), "Spaced Out");
    }

    #[test]
    fn test_wrap_line_greedy() {
        let text = "alpha beta gamma delta";
        assert_eq!(wrap_line(text, 11), vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn test_wrap_line_collapses_whitespace() {
        assert_eq!(wrap_line("a   b\t\tc", 72), vec!["a b c"]);
    }

    #[test]
    fn test_wrap_line_splits_long_words() {
        assert_eq!(wrap_line("ab abcdefghij", 5), vec!["ab ab", "cdefg", "hij"]);
        assert_eq!(wrap_line("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_line_breaks_after_hyphen() {
        let line = format!("{} tumor-infiltrating lymphocytes", "x".repeat(60));
        assert_eq!(
            wrap_line(&line, 72),
            vec![
                format!("{} tumor-", "x".repeat(60)),
                "infiltrating lymphocytes".to_string()
            ]
        );
    }

    #[test]
    fn test_hyphen_parts() {
        assert_eq!(
            hyphen_parts("tumor-infiltrating"),
            vec!["tumor-", "infiltrating"]
        );
        assert_eq!(
            hyphen_parts("self-driving-car"),
            vec!["self-", "driving-", "car"]
        );
        assert_eq!(hyphen_parts("BRAF-V600E"), vec!["BRAF-V600E"]);
        assert_eq!(hyphen_parts("COVID-19"), vec!["COVID-19"]);
        assert_eq!(hyphen_parts("x-ray"), vec!["x-ray"]);
    }

    #[test]
    fn test_long_word_prefers_last_hyphen() {
        assert_eq!(wrap_line("ab 12-3456789", 8), vec!["ab 12-", "3456789"]);
        assert_eq!(wrap_line("--------x", 4), vec!["----", "----", "x"]);
    }

    #[test]
    fn test_leading_space_kept_on_first_line_only() {
        assert_eq!(
            wrap_line("  alpha beta gamma", 11),
            vec![" alpha beta", "gamma"]
        );
    }

    #[test]
    fn test_wrap_preserves_blank_lines() {
        let wrapped = wrap_preserve_newlines("first\n\n   \nsecond", 72);
        assert_eq!(wrapped, vec!["first", "", "", "second"]);
    }

    #[test]
    fn test_top_level_scalar() {
        assert_eq!(to_markdown(&json!("hello")), "hello\n");
        assert_eq!(to_markdown(&json!(42)), "42\n");
        assert_eq!(to_markdown(&Value::Null), "\n");
    }

    #[test]
    fn test_booleans_render_lowercase() {
        assert_eq!(
            to_markdown(&json!({"has_results": true})),
            "Has Results: true\n"
        );
    }

    #[test]
    fn test_empty_list_renders_bare_label() {
        assert_eq!(to_markdown(&json!({"phases": []})), "Phases:\n");
    }

    #[test]
    fn test_list_of_mappings_repeats_heading() {
        let data = json!({"refs": [{"pmid": "1"}, {"pmid": "2"}, {"pmid": "1"}]});
        assert_eq!(to_markdown(&data), "# Refs\nPmid: 1\n\n# Refs\nPmid: 2\n");
    }

    #[test]
    fn test_mixed_list_with_null_recurses() {
        let data = json!({"tags": ["a", null, "b"]});
        assert_eq!(to_markdown(&data), "Tags: a\nTags: b\n");
    }

    #[test]
    fn test_malformed_json_text() {
        assert!(to_markdown_str("{\"a\": ").is_err());
    }
}
