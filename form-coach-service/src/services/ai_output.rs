//! Normalisation applied to raw model text before it is parsed as JSON.

use serde_json::Value;

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

/// Strip a surrounding Markdown code fence from model output.
///
/// The text is trimmed first. A leading "```json" (or bare "```") and the
/// whitespace after it are removed, as is a trailing "```" with the whitespace
/// before it. Only a lowercase `json` tag is recognised; any other tag stays
/// in the text. Text that does not open with a fence is only trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();

    let body = if let Some(rest) = trimmed.strip_prefix(JSON_FENCE) {
        rest
    } else if let Some(rest) = trimmed.strip_prefix(FENCE) {
        rest
    } else {
        return trimmed;
    };

    let body = body.trim_start();
    match body.strip_suffix(FENCE) {
        Some(inner) => inner.trim_end(),
        None => body,
    }
}

/// Strip any code fence and parse the remainder as JSON.
pub fn parse_model_json(raw: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(strip_code_fence(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_json_is_only_trimmed() {
        assert_eq!(strip_code_fence("  {\"a\":1}\n"), "{\"a\":1}");
    }

    #[test]
    fn strips_json_tagged_fence() {
        let raw = "```json\n{\"overall_score\": 80}\n```";
        assert_eq!(strip_code_fence(raw), "{\"overall_score\": 80}");
    }

    #[test]
    fn strips_untagged_fence() {
        let raw = "\n```\n{\"overall_score\": 80}\n```\n";
        assert_eq!(strip_code_fence(raw), "{\"overall_score\": 80}");
    }

    #[test]
    fn opening_fence_without_closing_fence() {
        assert_eq!(strip_code_fence("```json {\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn other_language_tags_are_left_in_place() {
        assert_eq!(strip_code_fence("```JSON\n{}\n```"), "JSON\n{}");
        assert!(parse_model_json("```JSON\n{}\n```").is_err());
    }

    #[test]
    fn closing_fence_alone_is_not_stripped() {
        assert_eq!(strip_code_fence("{}\n```"), "{}\n```");
    }

    #[test]
    fn bare_fence_becomes_empty() {
        assert_eq!(strip_code_fence("```json```"), "");
        assert_eq!(strip_code_fence("```"), "");
    }

    #[test]
    fn fenced_and_unfenced_parse_identically() {
        let body = "{\"overall_score\": 71, \"metrics\": []}";
        let fenced = format!("```json\n{}\n```", body);
        assert_eq!(
            parse_model_json(&fenced).unwrap(),
            parse_model_json(body).unwrap()
        );
        assert_eq!(
            parse_model_json(body).unwrap(),
            json!({ "overall_score": 71, "metrics": [] })
        );
    }

    #[test]
    fn prose_fails_to_parse() {
        let err = parse_model_json("Sure! Here is your analysis.").unwrap_err();
        assert!(err.is_syntax());
    }
}
