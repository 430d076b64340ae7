use super::{SentimentCategory, SentimentDistribution, SentimentItem};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Line markers that make a line eligible for the line scan
const LINE_MARKERS: [&str; 2] = ["sentiment:", "sentiment is"];

/// Per-line keywords, in priority order
const LINE_KEYWORDS: [(&str, SentimentCategory); 3] = [
    ("positive", SentimentCategory::Positive),
    ("negative", SentimentCategory::Negative),
    ("neutral", SentimentCategory::Neutral),
];

const POSITIVE_WORDS: [&str; 10] = [
    "positive", "bullish", "optimistic", "strong", "good", "gains", "up", "growth", "beat", "exceeds",
];

const NEGATIVE_WORDS: [&str; 10] = [
    "negative", "bearish", "pessimistic", "weak", "bad", "losses", "down", "decline", "miss",
    "disappoints",
];

const NEUTRAL_WORDS: [&str; 5] = ["neutral", "mixed", "stable", "unchanged", "moderate"];

/// Upper bound applied to keyword counts once any category exceeds it
const KEYWORD_CLAMP: u32 = 10;

/// Classifier output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SentimentReport {
    /// Headline records, passed through for direct enumeration
    Structured(Vec<SentimentItem>),
    /// Aggregated counts derived from free text
    Distribution(SentimentDistribution),
}

impl SentimentReport {
    pub fn distribution(&self) -> Option<&SentimentDistribution> {
        match self {
            SentimentReport::Distribution(dist) => Some(dist),
            SentimentReport::Structured(_) => None,
        }
    }

    pub fn items(&self) -> Option<&[SentimentItem]> {
        match self {
            SentimentReport::Structured(items) => Some(items),
            SentimentReport::Distribution(_) => None,
        }
    }
}

/// Classify a raw sentiment payload of unknown shape
pub fn classify(raw: &Value) -> SentimentReport {
    if let Some(items) = structured_items(raw) {
        return SentimentReport::Structured(items);
    }

    match raw {
        Value::String(text) => {
            if let Some(items) = decode_structured(text) {
                return SentimentReport::Structured(items);
            }
            SentimentReport::Distribution(classify_text(text))
        }
        other => {
            debug!(kind = value_kind(other), "sentiment payload carries no text");
            SentimentReport::Distribution(classify_text(""))
        }
    }
}

/// Derive a distribution from free text: line scan, then keyword frequency,
/// then the Neutral default
pub fn classify_text(text: &str) -> SentimentDistribution {
    let mut dist = scan_lines(text);

    if dist.is_empty() {
        dist = keyword_frequency(&text.to_lowercase());
        dist.clamp_if_max_exceeds(KEYWORD_CLAMP);
    }

    if dist.is_empty() {
        dist.neutral = 1;
    }

    dist
}

fn structured_items(value: &Value) -> Option<Vec<SentimentItem>> {
    match value {
        Value::Array(entries) if !entries.is_empty() => {
            Some(entries.iter().cloned().map(SentimentItem::new).collect())
        }
        _ => None,
    }
}

fn decode_structured(text: &str) -> Option<Vec<SentimentItem>> {
    if text.trim().is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(text) {
        Ok(decoded) => {
            let items = structured_items(&decoded);
            if items.is_none() {
                debug!(kind = value_kind(&decoded), "decoded sentiment report is not a headline list");
            }
            items
        }
        Err(e) => {
            debug!(error = %e, "sentiment report is not encoded JSON, scanning as text");
            None
        }
    }
}

fn scan_lines(text: &str) -> SentimentDistribution {
    let mut dist = SentimentDistribution::default();

    for line in text.split('\n') {
        let line = line.to_lowercase();
        if !LINE_MARKERS.iter().any(|marker| line.contains(marker)) {
            continue;
        }

        if let Some((_, category)) = LINE_KEYWORDS.iter().find(|(word, _)| line.contains(word)) {
            dist.increment(*category, 1);
        }
    }

    dist
}

fn keyword_frequency(lowered: &str) -> SentimentDistribution {
    let mut dist = SentimentDistribution::default();

    for (words, category) in [
        (&POSITIVE_WORDS[..], SentimentCategory::Positive),
        (&NEGATIVE_WORDS[..], SentimentCategory::Negative),
        (&NEUTRAL_WORDS[..], SentimentCategory::Neutral),
    ] {
        for word in words {
            let hits = u32::try_from(lowered.matches(word).count()).unwrap_or(u32::MAX);
            dist.increment(category, hits);
        }
    }

    dist
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dist(raw: &str) -> SentimentDistribution {
        match classify(&json!(raw)) {
            SentimentReport::Distribution(d) => d,
            SentimentReport::Structured(items) => panic!("expected distribution, got {items:?}"),
        }
    }

    #[test]
    fn test_structured_list_passes_through() {
        let raw = json!([{"headline": "H1", "sentiment": "Positive", "justification": "J"}]);
        let report = classify(&raw);

        let items = report.items().expect("structured");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].headline().as_deref(), Some("H1"));
        assert_eq!(items[0].sentiment().as_deref(), Some("Positive"));
        assert_eq!(items[0].justification().as_deref(), Some("J"));
        assert_eq!(items[0].as_value(), &raw[0]);
        assert!(report.distribution().is_none());
    }

    #[test]
    fn test_structured_list_keeps_order_and_missing_fields() {
        let raw = json!([
            {"headline": "Second", "sentiment": "Negative"},
            {"headline": "First"},
            {}
        ]);
        let items = classify(&raw).items().expect("structured").to_vec();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].headline_or_na(), "Second");
        assert_eq!(items[0].justification_or_na(), "N/A");
        assert_eq!(items[1].sentiment_or_na(), "N/A");
        assert_eq!(items[2].as_value(), &json!({}));
    }

    #[test]
    fn test_structured_list_with_odd_field_types_is_kept() {
        let raw = json!([
            {"headline": "H1", "sentiment": "Positive", "justification": "J"},
            {"headline": 42, "sentiment": "Negative", "justification": "J2"}
        ]);
        let items = classify(&raw).items().expect("structured").to_vec();

        assert_eq!(items.len(), 2);
        assert_eq!(items[1].headline_or_na(), "42");
        assert_eq!(items[1].sentiment_or_na(), "Negative");
    }

    #[test]
    fn test_structured_list_keeps_extra_keys() {
        let raw = json!([{"headline": "H1", "sentiment": "Positive", "score": 0.9}]);
        let report = classify(&raw);
        let items = report.items().expect("structured");

        assert_eq!(items[0].as_value(), &raw[0]);
        assert_eq!(items[0].field("score").as_deref(), Some("0.9"));
    }

    #[test]
    fn test_list_of_scalars_is_structured() {
        let items = classify(&json!([1, 2, 3])).items().expect("structured").to_vec();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].headline_or_na(), "N/A");

        let decoded = classify(&json!("[\"a\", \"b\"]"));
        assert_eq!(decoded.items().map(<[SentimentItem]>::len), Some(2));
    }

    #[test]
    fn test_encoded_list_is_structured() {
        let encoded = r#"[{"headline":"Chip demand soars","sentiment":"Positive","justification":"Orders up"}]"#;
        let items = classify(&json!(encoded)).items().expect("structured").to_vec();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].headline_or_na(), "Chip demand soars");
    }

    #[test]
    fn test_encoded_empty_list_falls_through() {
        assert_eq!(dist("[]"), SentimentDistribution::new(0, 0, 1));
    }

    #[test]
    fn test_malformed_json_falls_back_to_text() {
        let text = "[{\"headline\": broken\nOverall sentiment: negative";
        assert_eq!(dist(text), SentimentDistribution::new(0, 1, 0));
    }

    #[test]
    fn test_single_marker_line() {
        let d = dist("Today's sentiment: positive for the stock");
        assert_eq!(d, SentimentDistribution::new(1, 0, 0));
        assert_eq!(d.dominant(), SentimentCategory::Positive);
    }

    #[test]
    fn test_line_priority_positive_first() {
        let d = dist("Sentiment is neutral to negative, arguably positive");
        assert_eq!(d, SentimentDistribution::new(1, 0, 0));
    }

    #[test]
    fn test_multiple_lines_all_contribute() {
        let text = "1. Apple beats estimates\n   Sentiment: Positive\n\
                    2. Supply chain worries\n   Sentiment: Negative\n\
                    3. Analyst day recap\n   SENTIMENT IS NEUTRAL\n\
                    4. Another beat\n   sentiment: positive";
        assert_eq!(dist(text), SentimentDistribution::new(2, 1, 1));
    }

    #[test]
    fn test_line_scan_is_not_clamped() {
        let text = "sentiment: positive\n".repeat(12);
        assert_eq!(dist(&text), SentimentDistribution::new(12, 0, 0));
    }

    #[test]
    fn test_marker_line_without_category_contributes_nothing() {
        let d = dist("Sentiment: unclear\nNothing else to report");
        assert_eq!(d, SentimentDistribution::new(0, 0, 1));
    }

    #[test]
    fn test_keyword_fallback() {
        let d = dist("Analysts are bullish although margins may decline");
        assert!(d.positive >= 1);
        assert!(d.negative >= 1);
    }

    #[test]
    fn test_keyword_counts_every_occurrence() {
        let d = dist("Strong quarter. strong guidance. STRONG buyback. Outlook is mixed.");
        assert_eq!(d, SentimentDistribution::new(3, 0, 1));
    }

    #[test]
    fn test_keyword_matches_are_substrings() {
        // "up" is found inside "support"
        assert_eq!(dist("Investors support the plan"), SentimentDistribution::new(1, 0, 0));
    }

    #[test]
    fn test_empty_and_whitespace_default_to_neutral() {
        assert_eq!(dist(""), SentimentDistribution::new(0, 0, 1));
        assert_eq!(dist("   \n\t  "), SentimentDistribution::new(0, 0, 1));
        assert_eq!(dist("").dominant(), SentimentCategory::Neutral);
    }

    #[test]
    fn test_keyword_clamp() {
        let text = "positive ".repeat(20);
        let d = dist(&text);
        assert_eq!(d.positive, 10);
        assert_eq!(d.negative, 0);
        assert_eq!(d.neutral, 0);
    }

    #[test]
    fn test_keyword_clamp_applies_to_all_categories() {
        let text = format!("{}{}", "good ".repeat(15), "weak ".repeat(12));
        assert_eq!(dist(&text), SentimentDistribution::new(10, 10, 0));
    }

    #[test]
    fn test_non_text_payloads_default() {
        assert_eq!(
            classify(&Value::Null),
            SentimentReport::Distribution(SentimentDistribution::new(0, 0, 1))
        );
        assert_eq!(
            classify(&json!([])),
            SentimentReport::Distribution(SentimentDistribution::new(0, 0, 1))
        );
        assert_eq!(
            classify(&json!({"summary": "strong growth"})),
            SentimentReport::Distribution(SentimentDistribution::new(0, 0, 1))
        );
    }
}
