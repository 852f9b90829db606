//! Best-effort recovery of structured readings from model output.
//!
//! Models are asked for bare JSON but routinely wrap it in prose or code
//! fences. [`extract_structured`] tries, in order, the first fenced block and
//! the first balanced `{...}` span, and validates the result against the
//! six-position shape.

use super::model::StructuredReading;
use crate::spread::UNIVERSAL6_POSITIONS;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n?(.*?)```").expect("valid fence regex"));

static SECTION_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[Position \d+\]|\[Card \d+\]|Position \d+:|Card \d+:")
        .expect("valid section regex")
});

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid paragraph regex"));

/// Why a response could not be read as a [`StructuredReading`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Neither a fenced block nor a brace-delimited span was found.
    #[error("no JSON object found in response")]
    NoJson,

    /// A candidate was found but is not valid JSON for the expected type.
    #[error("invalid JSON: {0}")]
    Json(String),

    /// Valid JSON that does not describe a six-position reading.
    #[error("unexpected reading shape: {0}")]
    Shape(String),
}

/// Extracts and validates a structured six-card reading from raw model text.
pub fn extract_structured(raw: &str) -> Result<StructuredReading, ParseError> {
    let mut candidates = Vec::with_capacity(2);
    if let Some(fenced) = fenced_block(raw) {
        candidates.push(fenced);
    }
    if let Some(span) = first_object_span(raw) {
        candidates.push(span);
    }
    if candidates.is_empty() {
        return Err(ParseError::NoJson);
    }

    let mut last_error = ParseError::NoJson;
    for candidate in candidates {
        match serde_json::from_str::<StructuredReading>(candidate.trim()) {
            Ok(reading) => {
                validate_shape(&reading)?;
                return Ok(reading);
            }
            Err(err) => last_error = ParseError::Json(err.to_string()),
        }
    }
    Err(last_error)
}

/// Body of the first fenced code block, if any.
fn fenced_block(raw: &str) -> Option<&str> {
    FENCED_BLOCK
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|body| !body.trim().is_empty())
}

/// The first top-level `{...}` span, honouring string literals and escapes.
fn first_object_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
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
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

fn validate_shape(reading: &StructuredReading) -> Result<(), ParseError> {
    let expected = UNIVERSAL6_POSITIONS.len();
    if reading.positions.len() != expected {
        return Err(ParseError::Shape(format!(
            "expected {expected} positions, got {}",
            reading.positions.len()
        )));
    }

    let mut seen = [false; 6];
    for entry in &reading.positions {
        let index = usize::from(entry.position);
        if !(1..=expected).contains(&index) {
            return Err(ParseError::Shape(format!(
                "position {} out of range",
                entry.position
            )));
        }
        if std::mem::replace(&mut seen[index - 1], true) {
            return Err(ParseError::Shape(format!(
                "position {} listed twice",
                entry.position
            )));
        }
    }

    if reading.overall.trim().is_empty() {
        return Err(ParseError::Shape("overall synthesis is empty".into()));
    }
    Ok(())
}

/// Splits an unstructured multi-card narrative into `count` display sections.
///
/// Explicit markers (`Position 3:`, `[Card 2]`, ...) win. Without markers,
/// blank-line separated paragraphs are spread evenly over the sections; if
/// there are fewer paragraphs than sections every section gets the full text.
pub fn split_sections(text: &str, count: usize) -> Vec<String> {
    if count == 0 {
        return Vec::new();
    }

    if SECTION_MARKER.is_match(text) {
        return SECTION_MARKER
            .split(text)
            .map(str::trim)
            .filter(|section| !section.is_empty())
            .map(str::to_string)
            .collect();
    }

    let paragraphs: Vec<&str> = PARAGRAPH_BREAK.split(text).collect();
    if paragraphs.len() < count {
        return vec![text.to_string(); count];
    }

    let per_section = paragraphs.len().div_ceil(count);
    (0..count)
        .map(|i| {
            let start = (i * per_section).min(paragraphs.len());
            let end = (start + per_section).min(paragraphs.len());
            paragraphs[start..end].join("\n\n")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn six_positions_json(overall: &str) -> String {
        let positions: Vec<String> = (1..=6)
            .map(|n| {
                format!(
                    r#"{{"position": {n}, "card": "Card {n}", "description": "d{n}", "interpretation": "i{n} {{braces}} \"quoted\""}}"#
                )
            })
            .collect();
        format!(
            r#"{{"positions": [{}], "overall": "{overall}"}}"#,
            positions.join(", ")
        )
    }

    #[test]
    fn test_extracts_from_fenced_block() {
        let raw = format!(
            "Here is your reading:\n```json\n{}\n```\nBlessings.",
            six_positions_json("All is well")
        );
        let reading = extract_structured(&raw).unwrap();
        assert_eq!(reading.positions.len(), 6);
        assert_eq!(reading.overall, "All is well");
        assert_eq!(reading.positions[0].interpretation, "i1 {braces} \"quoted\"");
    }

    #[test]
    fn test_extracts_from_bare_fence_without_language() {
        let raw = format!("```\n{}\n```", six_positions_json("Done"));
        assert!(extract_structured(&raw).is_ok());
    }

    #[test]
    fn test_extracts_first_brace_span_from_prose() {
        let raw = format!(
            "Sure! {} Hope this helps {{not json}}",
            six_positions_json("Trust yourself")
        );
        let reading = extract_structured(&raw).unwrap();
        assert_eq!(reading.overall, "Trust yourself");
        assert_eq!(reading.positions[5].position, 6);
    }

    #[test]
    fn test_broken_fence_falls_through_to_brace_span() {
        let raw = format!(
            "```json\n{{ oops\n```\n{}",
            six_positions_json("Second chance")
        );
        // The fenced body is invalid, the brace span starts at the broken
        // object as well, so the reading cannot be recovered.
        assert!(matches!(extract_structured(&raw), Err(ParseError::Json(_))));

        let raw = format!("```text\nno braces here\n```\n{}", six_positions_json("Ok"));
        assert_eq!(extract_structured(&raw).unwrap().overall, "Ok");
    }

    #[test]
    fn test_plain_prose_has_no_json() {
        assert_eq!(
            extract_structured("The cards speak of change."),
            Err(ParseError::NoJson)
        );
    }

    #[test]
    fn test_unbalanced_braces_are_not_json() {
        assert_eq!(extract_structured("{ \"positions\": ["), Err(ParseError::NoJson));
    }

    #[test]
    fn test_shape_is_validated() {
        let raw = r#"{"positions": [{"position": 1, "card": "The Fool", "interpretation": "x"}], "overall": "y"}"#;
        assert!(matches!(extract_structured(raw), Err(ParseError::Shape(_))));

        let raw = six_positions_json("   ");
        assert!(matches!(extract_structured(&raw), Err(ParseError::Shape(_))));

        let raw = six_positions_json("fine").replace(r#""position": 6"#, r#""position": 1"#);
        assert!(matches!(extract_structured(&raw), Err(ParseError::Shape(_))));

        let raw = six_positions_json("fine").replace(r#""position": 6"#, r#""position": 7"#);
        assert!(matches!(extract_structured(&raw), Err(ParseError::Shape(_))));
    }

    #[test]
    fn test_split_sections_by_markers() {
        let text = "Intro\nPosition 1: calm\nPosition 2: storm";
        let sections = split_sections(text, 6);
        assert_eq!(sections, vec!["Intro", "calm", "storm"]);
    }

    #[test]
    fn test_split_sections_distributes_paragraphs() {
        let text = "a\n\nb\n\nc\n\nd";
        assert_eq!(split_sections(text, 2), vec!["a\n\nb", "c\n\nd"]);
        assert_eq!(split_sections(text, 3), vec!["a\n\nb", "c\n\nd", ""]);
    }

    #[test]
    fn test_split_sections_repeats_short_text() {
        let sections = split_sections("one paragraph only", 6);
        assert_eq!(sections.len(), 6);
        assert!(sections.iter().all(|s| s == "one paragraph only"));
        assert!(split_sections("x", 0).is_empty());
    }
}
