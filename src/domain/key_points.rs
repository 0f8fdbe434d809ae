//! Key-point rules: prompt construction, post-processing of generated output,
//! and the deterministic keyword-scored fallback used when generation is unavailable.

use crate::domain::KeywordTable;
use std::collections::HashSet;
use tracing::debug;

/// Returned by the generative path when nothing usable survives filtering.
pub const NO_KEY_POINTS_SENTINEL: &str = "No clear key points found";
/// Returned by the fallback when no sentence-like content exists.
pub const ANALYSIS_COMPLETED_SENTINEL: &str = "Review text analysis completed";

pub const MAX_KEY_POINTS: usize = 5;
/// Upper bound on a key point, in characters.
pub const MAX_KEY_POINT_CHARS: usize = 300;

/// Fragments this short (after trimming) are not sentences.
const MIN_SENTENCE_CHARS: usize = 5;
/// A lone sentence shorter than this is returned as-is without scoring.
const SHORT_CIRCUIT_CHARS: usize = 100;
/// Sentences shorter than this lose a point.
const SHORT_SENTENCE_CHARS: usize = 20;
/// Number of longest sentences taken when nothing scores.
const LONGEST_FALLBACK_COUNT: usize = 3;

const SENTIMENT_WEIGHT: i32 = 2;
const FEATURE_WEIGHT: i32 = 1;
const PRODUCT_BONUS: i32 = 1;
const SHORT_PENALTY: i32 = 1;

/// Build the instruction sent to the generative backend. The review is embedded verbatim.
pub fn build_prompt(text: &str, product: Option<&str>) -> String {
    let product_context = product
        .filter(|p| !p.trim().is_empty())
        .map(|p| format!(" for '{}'", p.trim()))
        .unwrap_or_default();
    format!(
        "Analyze the following product review{product_context} and extract 3-5 brief, bulleted key points.\n\
         Focus on product features, quality, and user sentiment.\n\
         Return ONLY the bullet points, one per line, without asterisks or numbering.\n\
         If the review is gibberish or has no meaningful content, return \"{NO_KEY_POINTS_SENTINEL}\".\n\
         \n\
         Review: \"{text}\""
    )
}

/// Turn a generated response into key points.
///
/// Strips leading `*`/`-` markers, drops lines of 3 characters or fewer and the sentinel,
/// removes duplicates and keeps at most five. Never returns an empty list.
pub fn parse_generated(response: &str) -> Vec<String> {
    let mut points: Vec<String> = Vec::new();
    for line in response.lines() {
        let point = line
            .trim_start_matches(|c: char| c == '*' || c == '-' || c.is_whitespace())
            .trim();
        if point.chars().count() <= 3 || is_sentinel(point) {
            continue;
        }
        let point = truncate_chars(point, MAX_KEY_POINT_CHARS);
        if !points.contains(&point) {
            points.push(point);
        }
        if points.len() >= MAX_KEY_POINTS {
            break;
        }
    }
    if points.is_empty() {
        return vec![NO_KEY_POINTS_SENTINEL.to_string()];
    }
    points
}

/// Matches the sentinel even when the model quotes it or ends it with a period.
fn is_sentinel(line: &str) -> bool {
    line.trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c.is_whitespace())
        .eq_ignore_ascii_case(NO_KEY_POINTS_SENTINEL)
}

/// A segmented sentence. `body` is the trimmed text between terminators and drives
/// length checks and matching; `text` is the body plus its terminating punctuation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Sentence {
    body: String,
    text: String,
    len: usize,
}

#[derive(Debug)]
struct ScoredSentence<'a> {
    sentence: &'a Sentence,
    score: i32,
}

/// Split on runs of `.`, `!`, `?`. Fragments of five characters or fewer are dropped.
fn segment(text: &str) -> Vec<Sentence> {
    fn push(out: &mut Vec<Sentence>, body: &str, terminators: &str) {
        let body = body.trim();
        let len = body.chars().count();
        if len > MIN_SENTENCE_CHARS {
            out.push(Sentence {
                body: body.to_string(),
                text: format!("{}{}", body, terminators),
                len,
            });
        }
    }

    let mut sentences = Vec::new();
    let mut body = String::new();
    let mut terminators = String::new();
    for c in text.chars() {
        if matches!(c, '.' | '!' | '?') {
            terminators.push(c);
            continue;
        }
        if !terminators.is_empty() {
            push(&mut sentences, &body, &terminators);
            body.clear();
            terminators.clear();
        }
        body.push(c);
    }
    push(&mut sentences, &body, &terminators);
    sentences
}

fn score_sentence(sentence: &Sentence, product: Option<&str>, keywords: &KeywordTable) -> i32 {
    let lowered = sentence.body.to_lowercase();
    let mut score = 0;
    for kw in keywords.sentiment_keywords() {
        if lowered.contains(kw) {
            score += SENTIMENT_WEIGHT;
        }
    }
    for kw in keywords.feature_keywords() {
        if lowered.contains(kw) {
            score += FEATURE_WEIGHT;
        }
    }
    if let Some(product) = product {
        if lowered.contains(&product.to_lowercase()) {
            score += PRODUCT_BONUS;
        }
    }
    if sentence.len < SHORT_SENTENCE_CHARS {
        score -= SHORT_PENALTY;
    }
    score
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn fits(sentence: &Sentence) -> bool {
    sentence.len < MAX_KEY_POINT_CHARS && sentence.text.chars().count() <= MAX_KEY_POINT_CHARS
}

/// Collected points. Sentences differing only in their closing punctuation count as duplicates.
#[derive(Debug, Default)]
struct KeyPoints {
    points: Vec<String>,
    seen: HashSet<String>,
}

impl KeyPoints {
    fn push(&mut self, sentence: &Sentence) {
        if self.seen.insert(capitalize_first(&sentence.body)) {
            self.points.push(capitalize_first(&sentence.text));
        }
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Local key-point extraction. Deterministic; never returns an empty list.
pub fn extract_fallback(text: &str, product: Option<&str>, keywords: &KeywordTable) -> Vec<String> {
    let product = product.map(str::trim).filter(|p| !p.is_empty());
    let sentences = segment(text.trim());

    if let [only] = sentences.as_slice() {
        if only.len < SHORT_CIRCUIT_CHARS && fits(only) {
            return vec![only.text.clone()];
        }
    }

    let mut scored: Vec<ScoredSentence<'_>> = sentences
        .iter()
        .map(|sentence| ScoredSentence {
            sentence,
            score: score_sentence(sentence, product, keywords),
        })
        .collect();
    // Stable: equal scores keep input order.
    scored.sort_by(|a, b| b.score.cmp(&a.score));

    let mut points = KeyPoints::default();
    for candidate in &scored {
        if candidate.score <= 0 || !fits(candidate.sentence) {
            continue;
        }
        points.push(candidate.sentence);
        if points.len() >= MAX_KEY_POINTS {
            break;
        }
    }

    if points.is_empty() && !sentences.is_empty() {
        debug!(
            sentences = sentences.len(),
            "no sentence scored; taking longest sentences"
        );
        let mut by_len: Vec<&Sentence> = sentences.iter().collect();
        by_len.sort_by(|a, b| b.len.cmp(&a.len));
        for sentence in by_len.into_iter().take(LONGEST_FALLBACK_COUNT) {
            if fits(sentence) {
                points.push(sentence);
            }
        }
    }

    if points.is_empty() {
        return vec![ANALYSIS_COMPLETED_SENTINEL.to_string()];
    }
    points.points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str, product: Option<&str>) -> Vec<String> {
        extract_fallback(text, product, &KeywordTable::default())
    }

    #[test]
    fn test_single_sentence_returned_verbatim() {
        assert_eq!(extract("Great battery.", None), vec!["Great battery."]);
        // Not re-capitalized on the short-circuit path.
        assert_eq!(extract("  meh, it works  ", None), vec!["meh, it works"]);
    }

    #[test]
    fn test_keyword_sentence_ranked_first() {
        let text = "The battery life is excellent. It arrived late. The box was plain.";
        let points = extract(text, None);
        assert_eq!(points, vec!["The battery life is excellent."]);
    }

    #[test]
    fn test_scoring_weights() {
        let kw = KeywordTable::default();
        let s = &segment("The battery life is excellent.")[0];
        assert_eq!(score_sentence(s, None, &kw), 3);

        let plain = &segment("The box was plain.")[0];
        assert_eq!(score_sentence(plain, None, &kw), -1);

        let named = &segment("My Pixel camera is great")[0];
        // great (+2), camera (+1), product (+1)
        assert_eq!(score_sentence(named, Some("pixel"), &kw), 4);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let text = "The screen is really great here. The camera is really great too.";
        let points = extract(text, None);
        assert_eq!(
            points,
            vec![
                "The screen is really great here.",
                "The camera is really great too."
            ]
        );
    }

    #[test]
    fn test_no_signal_takes_three_longest_capitalized() {
        let text = "the weather was cloudy today. we walked along the river for hours. \
                    dinner came later. then everybody went home and slept.";
        let points = extract(text, None);
        assert_eq!(
            points,
            vec![
                "We walked along the river for hours.",
                "Then everybody went home and slept.",
                "The weather was cloudy today."
            ]
        );
    }

    #[test]
    fn test_absolute_fallback_when_no_sentences() {
        assert_eq!(extract("Good. Ok!", None), vec![ANALYSIS_COMPLETED_SENTINEL]);
        assert_eq!(extract("?!?!", None), vec![ANALYSIS_COMPLETED_SENTINEL]);
    }

    #[test]
    fn test_caps_at_five_and_dedupes() {
        let text = "great battery life overall! great battery life overall! \
                    the screen is excellent and bright. camera quality is amazing indeed. \
                    shipping was fast and good. the price is worth every cent. \
                    the design is nice and modern.";
        let points = extract(text, None);
        assert_eq!(points.len(), MAX_KEY_POINTS);
        let mut unique = points.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), points.len());
        assert!(points.iter().all(|p| p.chars().next().unwrap().is_uppercase()));
    }

    #[test]
    fn test_dedupe_ignores_closing_punctuation() {
        let text = "The battery life is excellent! The battery life is excellent. \
                    Camera quality is great?";
        let points = extract(text, None);
        assert_eq!(
            points,
            vec!["Camera quality is great?", "The battery life is excellent!"]
        );

        let quiet = "we stayed at home all day! we stayed at home all day. nothing else happened";
        assert_eq!(
            extract(quiet, None),
            vec!["We stayed at home all day!", "Nothing else happened"]
        );
    }

    #[test]
    fn test_output_bounds_hold_for_varied_input() {
        let long_tail = format!("amazing {}", "x".repeat(400));
        let inputs = [
            "Great battery.",
            "ok",
            "?!?!",
            "Good. Good! Good?",
            "the weather was cloudy today. we walked along the river for hours.",
            "Bagus! Bagus. Bagus? Barangnya bagus dan pengiriman cepat sekali.",
            "Screen is great! screen is great. SCREEN IS GREAT? The price is worth it.",
            long_tail.as_str(),
            "great battery life overall! the screen is excellent and bright. \
             camera quality is amazing indeed. shipping was fast and good. \
             the price is worth every cent. the design is nice and modern. \
             the sound is good and clear.",
        ];
        for input in inputs {
            let points = extract(input, Some("screen"));
            assert!(
                (1..=MAX_KEY_POINTS).contains(&points.len()),
                "{input:?} -> {points:?}"
            );
            let unique: HashSet<&String> = points.iter().collect();
            assert_eq!(unique.len(), points.len(), "{input:?} -> {points:?}");
            for point in &points {
                assert!(!point.is_empty());
                assert!(point.chars().count() <= MAX_KEY_POINT_CHARS);
            }
        }
    }

    #[test]
    fn test_long_sentences_excluded() {
        let long = format!("great {}", "word ".repeat(80));
        let text = format!("{}. The camera is good overall.", long);
        let points = extract(&text, None);
        assert_eq!(points, vec!["The camera is good overall."]);
    }

    #[test]
    fn test_indonesian_keywords_score() {
        let text = "Barangnya bagus banget dan pengiriman cepat. Saya beli kemarin sore.";
        let points = extract(text, None);
        assert_eq!(points[0], "Barangnya bagus banget dan pengiriman cepat.");
    }

    #[test]
    fn test_deterministic() {
        let text = "The battery life is excellent. It arrived late. The box was plain.";
        assert_eq!(extract(text, Some("Phone")), extract(text, Some("Phone")));
    }

    #[test]
    fn test_parse_generated_strips_markers() {
        let response = "* Great sound quality\n- Battery lasts two days\n\n  ** Comfortable fit\nok\n";
        assert_eq!(
            parse_generated(response),
            vec![
                "Great sound quality",
                "Battery lasts two days",
                "Comfortable fit"
            ]
        );
    }

    #[test]
    fn test_parse_generated_sentinel_and_limit() {
        assert_eq!(
            parse_generated("No clear key points found"),
            vec![NO_KEY_POINTS_SENTINEL]
        );
        assert_eq!(parse_generated("   \n - \n"), vec![NO_KEY_POINTS_SENTINEL]);
        assert_eq!(
            parse_generated("\"No clear key points found.\"\n- No clear key points found."),
            vec![NO_KEY_POINTS_SENTINEL]
        );
        assert_eq!(
            parse_generated("No clear key points found\n- Sound is crisp"),
            vec!["Sound is crisp"]
        );

        let many = (1..=8)
            .map(|i| format!("- Point number {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let points = parse_generated(&many);
        assert_eq!(points.len(), MAX_KEY_POINTS);
        assert_eq!(points[4], "Point number 5");
    }

    #[test]
    fn test_build_prompt_embeds_product() {
        let prompt = build_prompt("Loud and clear.", Some("Wireless Headphones"));
        assert!(prompt.contains("review for 'Wireless Headphones'"));
        assert!(prompt.contains("Review: \"Loud and clear.\""));

        let bare = build_prompt("Loud and clear.", None);
        assert!(bare.contains("product review and extract"));
    }
}
