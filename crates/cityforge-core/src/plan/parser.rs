//! Tolerant plan extraction from raw model output.
//!
//! Models wrap JSON in prose and markdown fences. The extractor prefers a
//! fenced code block, then falls back to the widest `{...}` span in the
//! text. Decode failures surface as [`PlanParseError`]; the caller is
//! required to substitute the fallback plan rather than propagate.

use thiserror::Error;

use super::types::CityPlan;

/// Errors from extracting and decoding a plan.
#[derive(Debug, Error)]
pub enum PlanParseError {
    #[error("no JSON object found in model response")]
    NoJsonFound,

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Locate the JSON object span in raw model output.
///
/// Preference order: the body of the first ```-fenced block (an optional
/// language tag on the opening fence is skipped), then the span from the
/// first `{` to the last `}` in the whole text.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    if let Some(body) = fenced_block(raw) {
        if let Some(span) = brace_span(body) {
            return Some(span);
        }
    }
    brace_span(raw)
}

/// Decode a [`CityPlan`] out of raw model output.
pub fn parse_city_plan(raw: &str) -> Result<CityPlan, PlanParseError> {
    let span = extract_json_object(raw).ok_or(PlanParseError::NoJsonFound)?;
    let plan = serde_json::from_str(span)?;
    Ok(plan)
}

/// Body of the first fenced code block, if any.
fn fenced_block(raw: &str) -> Option<&str> {
    let start = raw.find("```")?;
    let after_fence = &raw[start + 3..];
    // Skip the language tag line (e.g. "json").
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(&body[..end])
}

/// Widest `{...}` span: first opening brace to last closing brace.
fn brace_span(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    if end > start {
        Some(&s[start..=end])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_PLAN: &str = r##"{
        "analysis": "compact test city",
        "phases": [
            {
                "phase": 1,
                "name": "Public Infrastructure",
                "buildings": [
                    {
                        "name": "Main Avenue",
                        "type": "park",
                        "position": {"x": 0, "y": 0, "z": 0},
                        "size": {"width": 30, "height": 0.3, "depth": 4},
                        "color": "#555555"
                    }
                ]
            }
        ]
    }"##;

    #[test]
    fn parses_bare_json() {
        let plan = parse_city_plan(MINIMAL_PLAN).expect("should parse");
        assert_eq!(plan.phases.len(), 1);
        assert_eq!(plan.phases[0].buildings[0].name, "Main Avenue");
    }

    #[test]
    fn parses_json_in_tagged_fence() {
        let raw = format!("Here is the plan you asked for:\n\n```json\n{MINIMAL_PLAN}\n```\n\nLet me know!");
        let plan = parse_city_plan(&raw).expect("should parse fenced JSON");
        assert_eq!(plan.analysis, "compact test city");
    }

    #[test]
    fn parses_json_in_untagged_fence() {
        let raw = format!("```\n{MINIMAL_PLAN}\n```");
        let plan = parse_city_plan(&raw).expect("should parse untagged fence");
        assert_eq!(plan.phases.len(), 1);
    }

    #[test]
    fn parses_json_buried_in_prose() {
        let raw = format!("I thought about this carefully. {MINIMAL_PLAN} Hope that helps.");
        let plan = parse_city_plan(&raw).expect("should parse prose-wrapped JSON");
        assert_eq!(plan.phases[0].phase, 1);
    }

    #[test]
    fn extraction_embed_roundtrip() {
        // extract(embed(plan)) decodes to exactly the embedded plan.
        let plan = parse_city_plan(MINIMAL_PLAN).unwrap();
        let embedded = format!(
            "Sure thing!\n```json\n{}\n```",
            serde_json::to_string_pretty(&plan).unwrap()
        );
        let reparsed = parse_city_plan(&embedded).unwrap();
        assert_eq!(plan, reparsed);
    }

    #[test]
    fn rejects_plain_prose() {
        let err = parse_city_plan("I'm sorry, I can't produce a plan right now.").unwrap_err();
        assert!(matches!(err, PlanParseError::NoJsonFound));
    }

    #[test]
    fn rejects_empty_input() {
        let err = parse_city_plan("").unwrap_err();
        assert!(matches!(err, PlanParseError::NoJsonFound));
    }

    #[test]
    fn rejects_json_missing_required_fields() {
        // An object without "phases" fails the minimal shape.
        let err = parse_city_plan(r#"{"analysis": "no phases here"}"#).unwrap_err();
        assert!(matches!(err, PlanParseError::Json(_)));
    }

    #[test]
    fn rejects_unknown_structure_kind() {
        let raw = r#"{
            "phases": [
                {"phase": 1, "name": "P", "buildings": [{"name": "X", "type": "stadium"}]}
            ]
        }"#;
        let err = parse_city_plan(raw).unwrap_err();
        assert!(matches!(err, PlanParseError::Json(_)));
    }

    #[test]
    fn rejects_truncated_json() {
        let truncated = &MINIMAL_PLAN[..MINIMAL_PLAN.len() / 2];
        let err = parse_city_plan(truncated).unwrap_err();
        // A truncated object either loses its closing brace (no span) or
        // decodes with a syntax error; both must fail, never a partial plan.
        assert!(matches!(
            err,
            PlanParseError::NoJsonFound | PlanParseError::Json(_)
        ));
    }

    #[test]
    fn fence_without_json_falls_back_to_whole_text() {
        let raw = format!("```\nnot json at all\n```\n{MINIMAL_PLAN}");
        let plan = parse_city_plan(&raw).expect("should fall back to brace span");
        assert_eq!(plan.phases.len(), 1);
    }
}
