// Free-text tag classification into the fixed cause taxonomy.
//
// Tags are decoded (escaped code points become plain Unicode), lowercased,
// trimmed, and then tested against an ordered rule list. The first rule
// whose pattern matches at a word start decides the category; a tag that
// matches nothing, or is not text at all, is dropped.
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::borrow::Cow;
use tracing::debug;

use crate::config::CauseRule;
use crate::error::{OutageError, Result};
use crate::types::CauseCategory;

// Escape syntaxes seen in scraped text: JSON/Python `\uXXXX` (including
// surrogate pairs), `\u{...}`, `\UXXXXXXXX`, `\xHH` and HTML numeric entities.
static ESCAPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\\u([dD][89abAB][0-9a-fA-F]{2})\\u([dD][c-fC-F][0-9a-fA-F]{2})",
        r"|\\u\{([0-9a-fA-F]{1,6})\}",
        r"|\\u([0-9a-fA-F]{4})",
        r"|\\U([0-9a-fA-F]{8})",
        r"|\\x([0-9a-fA-F]{2})",
        r"|&#[xX]([0-9a-fA-F]{1,6});",
        r"|&#([0-9]{1,7});",
    ))
    .expect("escape regex is valid")
});

fn hex_char(hex: &str) -> Option<char> {
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

fn decode_capture(caps: &Captures<'_>) -> Option<char> {
    if let (Some(hi), Some(lo)) = (caps.get(1), caps.get(2)) {
        let hi = u32::from_str_radix(hi.as_str(), 16).ok()?;
        let lo = u32::from_str_radix(lo.as_str(), 16).ok()?;
        return char::from_u32(0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00));
    }
    if let Some(m) = caps.get(3).or(caps.get(4)).or(caps.get(5)).or(caps.get(6)).or(caps.get(7)) {
        return hex_char(m.as_str());
    }
    let dec = caps.get(8)?;
    dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
}

/// Replace escaped code points with the characters they stand for.
///
/// Sequences that do not denote a valid scalar value are left untouched.
pub fn decode_escapes(text: &str) -> Cow<'_, str> {
    ESCAPE_RE.replace_all(text, |caps: &Captures<'_>| match decode_capture(caps) {
        Some(c) => c.to_string(),
        None => caps[0].to_string(),
    })
}

/// Decoded, lowercased, trimmed form used for matching.
pub fn normalize_tag(text: &str) -> String {
    decode_escapes(text).to_lowercase().trim().to_string()
}

#[derive(Debug, Clone)]
pub struct CauseClassifier {
    rules: Vec<(Regex, CauseCategory)>,
}

impl CauseClassifier {
    /// Compile the ordered rule table. Each pattern only matches at a word
    /// boundary, so `"huol"` accepts "huoltotyöt" but not "ehuolto".
    pub fn new(rules: &[CauseRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                let re = Regex::new(&format!(r"(?i)\b(?:{})", rule.pattern)).map_err(
                    |source| OutageError::InvalidPattern {
                        pattern: rule.pattern.clone(),
                        source,
                    },
                )?;
                Ok((re, rule.category))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn classify(&self, tag: &str) -> Option<CauseCategory> {
        let normalized = normalize_tag(tag);
        let hit = self
            .rules
            .iter()
            .find(|(re, _)| re.is_match(&normalized))
            .map(|(_, category)| *category);
        if hit.is_none() {
            debug!(tag, "dropping unclassifiable tag");
        }
        hit
    }

    /// Classify a tag of unknown shape. Only text values are considered.
    pub fn classify_value(&self, tag: &Value) -> Option<CauseCategory> {
        match tag.as_str() {
            Some(text) => self.classify(text),
            None => {
                debug!(?tag, "dropping non-text tag");
                None
            }
        }
    }

    /// Accepted categories of a tag list, in tag order, duplicates kept.
    pub fn classify_all(&self, tags: &[Value]) -> Vec<CauseCategory> {
        tags.iter().filter_map(|t| self.classify_value(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use serde_json::json;

    fn classifier() -> CauseClassifier {
        CauseClassifier::new(&EngineConfig::default().cause_rules).unwrap()
    }

    #[test]
    fn test_default_rules() {
        let c = classifier();
        assert_eq!(c.classify("Huoltotyöt"), Some(CauseCategory::Maintenance));
        assert_eq!(c.classify("Kaivuutyöt — vesijohto"), Some(CauseCategory::Digging));
        assert_eq!(c.classify("Saneeraus"), Some(CauseCategory::Renovation));
        assert_eq!(c.classify("Korjaustyöt"), Some(CauseCategory::Repair));
        assert_eq!(c.classify("Vauriokorjaus"), Some(CauseCategory::DamageRepair));
        assert_eq!(c.classify("xyz"), None);
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let c = classifier();
        assert_eq!(c.classify("  HUOLTOKATKO \n"), Some(CauseCategory::Maintenance));
        assert_eq!(c.classify("verkon Saneeraus"), Some(CauseCategory::Renovation));
    }

    #[test]
    fn test_prefix_must_start_a_word() {
        let c = classifier();
        assert_eq!(c.classify("ehuolto"), None);
        assert_eq!(c.classify("sähkö-huolto"), Some(CauseCategory::Maintenance));
    }

    #[test]
    fn test_earlier_rule_wins() {
        // Matches both "vaurio" and "korj"; korj is listed first.
        let c = classifier();
        assert_eq!(c.classify("vauriokorjaus korjaus"), Some(CauseCategory::Repair));

        let reordered = CauseClassifier::new(&[
            CauseRule {
                pattern: "vaurio".into(),
                category: CauseCategory::DamageRepair,
            },
            CauseRule {
                pattern: "korj".into(),
                category: CauseCategory::Repair,
            },
        ])
        .unwrap();
        assert_eq!(
            reordered.classify("vauriokorjaus korjaus"),
            Some(CauseCategory::DamageRepair)
        );
    }

    #[test]
    fn test_escaped_text_is_decoded() {
        let c = classifier();
        assert_eq!(c.classify(r"Huoltoty\u00f6t"), Some(CauseCategory::Maintenance));
        assert_eq!(decode_escapes(r"Huoltoty\u00f6t"), "Huoltotyöt");
        assert_eq!(decode_escapes(r"ty\xf6t"), "työt");
        assert_eq!(decode_escapes("ty&#246;t &#xE4;"), "työt ä");
        assert_eq!(decode_escapes(r"\u{1F50C}"), "\u{1F50C}");
        assert_eq!(decode_escapes(r"\ud83d\udd0c"), "\u{1F50C}");
    }

    #[test]
    fn test_invalid_escape_left_as_is() {
        assert_eq!(decode_escapes(r"\ud800 alone"), r"\ud800 alone");
        assert_eq!(decode_escapes("plain"), "plain");
    }

    #[test]
    fn test_non_text_values_are_dropped() {
        let c = classifier();
        assert_eq!(c.classify_value(&Value::Null), None);
        assert_eq!(c.classify_value(&json!(42)), None);
        assert_eq!(c.classify_value(&json!(["Huolto"])), None);
        assert_eq!(c.classify_value(&json!("Huolto")), Some(CauseCategory::Maintenance));
    }

    #[test]
    fn test_classify_all_keeps_duplicates_in_order() {
        let c = classifier();
        let tags = vec![json!("Korjaus"), json!("xyz"), Value::Null, json!("korjaustyöt")];
        assert_eq!(
            c.classify_all(&tags),
            vec![CauseCategory::Repair, CauseCategory::Repair]
        );
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = CauseClassifier::new(&[CauseRule {
            pattern: "(".into(),
            category: CauseCategory::Repair,
        }])
        .unwrap_err();
        assert!(matches!(err, OutageError::InvalidPattern { .. }));
    }
}
