//! Clean-up of raw oracle output before it is parsed or stored.

use crate::constants::UNTITLED_REPORT;

/// Remove every code-fence marker from `raw` and trim the result.
///
/// A marker is a run of three backticks, optionally followed by a `json` language tag in any
/// case. Models often wrap JSON answers in a fenced block even when told not to.
pub fn strip_code_fences(raw: &str) -> String {
    const FENCE: &str = "```";
    const TAG: &str = "json";

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find(FENCE) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + FENCE.len()..];
        if rest
            .get(..TAG.len())
            .is_some_and(|tag| tag.eq_ignore_ascii_case(TAG))
        {
            rest = &rest[TAG.len()..];
        }
    }
    out.push_str(rest);

    out.trim().to_string()
}

/// Reduce a title completion to a single clean line.
///
/// Keeps the first non-blank line and strips surrounding quotes and Markdown emphasis or heading
/// markers. Falls back to a fixed placeholder when nothing is left.
pub fn clean_title(raw: &str) -> String {
    let title = raw
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
        .trim_start_matches('#')
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '*' || c.is_whitespace());

    if title.is_empty() {
        UNTITLED_REPORT.to_string()
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fenced_block() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(raw), "{\"a\": 1}");
    }

    #[test]
    fn strips_bare_fences_and_whitespace() {
        let raw = "\n\n```\n{\"a\": 1}\n```  \n";
        assert_eq!(strip_code_fences(raw), "{\"a\": 1}");
    }

    #[test]
    fn strips_uppercase_tag() {
        assert_eq!(strip_code_fences("```JSON\n[]\n```"), "[]");
    }

    #[test]
    fn leaves_unfenced_text_alone_except_trim() {
        assert_eq!(strip_code_fences("  {\"a\": \"b\"}  "), "{\"a\": \"b\"}");
    }

    #[test]
    fn does_not_touch_single_backticks() {
        assert_eq!(strip_code_fences("`x`"), "`x`");
    }

    #[test]
    fn prose_survives_so_parsing_can_reject_it() {
        let raw = "I'm sorry, I cannot produce that note.";
        assert_eq!(strip_code_fences(raw), raw);
    }

    #[test]
    fn clean_title_keeps_plain_title() {
        assert_eq!(clean_title("Tension Headache"), "Tension Headache");
    }

    #[test]
    fn clean_title_strips_markdown_and_quotes() {
        assert_eq!(clean_title("## **\"Tension Headache\"**\n"), "Tension Headache");
    }

    #[test]
    fn clean_title_takes_first_non_blank_line() {
        assert_eq!(
            clean_title("\n\nAcute Migraine\nThis title reflects..."),
            "Acute Migraine"
        );
    }

    #[test]
    fn clean_title_falls_back_when_empty() {
        assert_eq!(clean_title("  \n ** \n"), UNTITLED_REPORT);
    }
}
