//! Keyword density scoring and highlighting.
//!
//! Everything here is a pure function of its inputs: the same text and
//! keyword list always produce the same score and the same markup.

use regex::{Captures, Regex, RegexBuilder};

/// Average keyword density (percent) the target score is derived from.
pub const TARGET_KEYWORD_DENSITY: f64 = 3.5;

/// Upper bound for a 0-100 score.
pub const MAX_SCORE: u8 = 100;

/// Markup placed around each highlighted match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub open: &'static str,
    pub close: &'static str,
}

impl Marker {
    /// `<mark>` wrapping used by the editor view.
    pub const MARK: Marker = Marker {
        open: "<mark>",
        close: "</mark>",
    };

    /// Styled span emitted by the optimisation endpoint.
    pub const SPAN: Marker = Marker {
        open: "<span class='highlighted-keyword'>",
        close: "</span>",
    };
}

impl Default for Marker {
    fn default() -> Self {
        Self::MARK
    }
}

/// Strip `**` emphasis markers that rewrite models like to add.
pub fn clean_keyword(keyword: &str) -> String {
    keyword.replace("**", "")
}

pub fn clean_keywords<S: AsRef<str>>(keywords: &[S]) -> Vec<String> {
    keywords.iter().map(|k| clean_keyword(k.as_ref())).collect()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Case-insensitive whole-word pattern for a literal keyword.
///
/// Word boundaries are only anchored on sides that begin or end with a word
/// character; `\b` next to a symbol (as in `C++`) would never match.
pub fn keyword_pattern(keyword: &str) -> Option<Regex> {
    let keyword = clean_keyword(keyword);
    if keyword.trim().is_empty() {
        return None;
    }

    let starts_word = keyword.chars().next().is_some_and(is_word_char);
    let ends_word = keyword.chars().last().is_some_and(is_word_char);
    let pattern = format!(
        "{}{}{}",
        if starts_word { r"\b" } else { "" },
        regex::escape(&keyword),
        if ends_word { r"\b" } else { "" },
    );

    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!("Skipping keyword {:?}: {}", keyword, e);
            None
        }
    }
}

/// Total whole-word matches of every keyword in `text`.
pub fn keyword_matches<S: AsRef<str>>(text: &str, keywords: &[S]) -> usize {
    keywords
        .iter()
        .filter_map(|k| keyword_pattern(k.as_ref()))
        .map(|re| re.find_iter(text).count())
        .sum()
}

/// Keyword density in percent. Not finite when `text` has no words.
pub fn keyword_density<S: AsRef<str>>(text: &str, keywords: &[S]) -> f64 {
    let words = word_count(text) as f64;
    let matches = keyword_matches(text, keywords) as f64;
    matches / words * 100.0
}

/// Clamp a raw percentage into a 0-100 score. Non-finite input scores 0.
pub fn clamp_score(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.clamp(0.0, MAX_SCORE as f64).round() as u8
}

/// Editor score: twice the keyword density, capped at 100.
pub fn seo_score<S: AsRef<str>>(text: &str, keywords: &[S]) -> u8 {
    clamp_score(keyword_density(text, keywords) * 2.0)
}

/// Score a text of this length would reach at the target keyword density.
///
/// Halves round away from zero (300 words score 11, not 10).
pub fn target_seo_score(text: &str) -> u8 {
    clamp_score(word_count(text) as f64 * TARGET_KEYWORD_DENSITY / 100.0)
}

/// Density of keywords in the optimised text, measured against the length of
/// the original text. Keywords are counted as case-insensitive substrings.
pub fn optimized_seo_score<S: AsRef<str>>(original: &str, optimized: &str, keywords: &[S]) -> u8 {
    let words = word_count(original);
    if words == 0 {
        return 0;
    }

    let haystack = optimized.to_lowercase();
    let occurrences: usize = keywords
        .iter()
        .map(|k| clean_keyword(k.as_ref()).to_lowercase())
        .filter(|k| !k.is_empty())
        .map(|k| haystack.matches(k.as_str()).count())
        .sum();

    clamp_score(occurrences as f64 / words as f64 * 100.0)
}

/// Wrap every keyword match in `<mark>` tags.
pub fn highlight<S: AsRef<str>>(text: &str, keywords: &[S]) -> String {
    highlight_with(text, keywords, &Marker::MARK)
}

/// Wrap every keyword match in `marker`, keeping the matched casing.
///
/// Keywords are applied in order, each as a full pass over the output of the
/// previous one. Text wrapped by an earlier keyword can be wrapped again.
pub fn highlight_with<S: AsRef<str>>(text: &str, keywords: &[S], marker: &Marker) -> String {
    keywords
        .iter()
        .filter_map(|k| keyword_pattern(k.as_ref()))
        .fold(text.to_string(), |acc, re| {
            re.replace_all(&acc, |caps: &Captures<'_>| {
                format!("{}{}{}", marker.open, &caps[0], marker.close)
            })
            .into_owned()
        })
}

/// Like [`highlight_with`], but a match directly after `>` or directly before
/// `<` is left alone, so a keyword already wrapped as part of a longer one is
/// not wrapped twice.
pub fn highlight_outside_tags<S: AsRef<str>>(text: &str, keywords: &[S], marker: &Marker) -> String {
    keywords
        .iter()
        .filter_map(|k| keyword_pattern(k.as_ref()))
        .fold(text.to_string(), |acc, re| {
            let mut out = String::with_capacity(acc.len());
            let mut last = 0;
            for m in re.find_iter(&acc) {
                if acc[..m.start()].ends_with('>') || acc[m.end()..].starts_with('<') {
                    continue;
                }
                out.push_str(&acc[last..m.start()]);
                out.push_str(marker.open);
                out.push_str(m.as_str());
                out.push_str(marker.close);
                last = m.end();
            }
            out.push_str(&acc[last..]);
            out
        })
}

/// Add `keyword` to `content` unless it is already present as a whole word.
///
/// The keyword goes right after the first sentence terminator, or at the end
/// when the content has none.
pub fn insert_keyword(content: &str, keyword: &str) -> String {
    let keyword = clean_keyword(keyword);
    let Some(re) = keyword_pattern(&keyword) else {
        return content.to_string();
    };
    if re.is_match(content) {
        return content.to_string();
    }

    match content.find(['.', '?', '!']) {
        Some(idx) => {
            let (head, tail) = content.split_at(idx + 1);
            format!("{head} {keyword}{tail}")
        }
        None => format!("{content} {keyword}"),
    }
}

/// Stored phrases like "apprenticeships in staffordshire" are reduced to the
/// part after the last standalone "in".
///
/// Empty segments are skipped, so a trailing "in" keeps the text before it
/// ("courses in" gives "courses") instead of producing an empty keyword.
pub fn normalize_db_keyword(keyword: &str) -> String {
    static SPLIT: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    let re = SPLIT.get_or_init(|| {
        RegexBuilder::new(r"\bin\b")
            .case_insensitive(true)
            .build()
            .expect("static pattern is valid")
    });

    re.split(keyword)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .last()
        .unwrap_or(keyword.trim())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_score() {
        let text = "the cat sat on the cat mat";
        assert_eq!(word_count(text), 7);
        assert_eq!(keyword_matches(text, &["cat"]), 2);
        let density = keyword_density(text, &["cat"]);
        assert!((density - 28.571).abs() < 0.01);
        assert_eq!(seo_score(text, &["cat"]), 57);
    }

    #[test]
    fn test_empty_keywords_score_zero() {
        let none: [&str; 0] = [];
        assert_eq!(seo_score("some perfectly ordinary text", &none), 0);
    }

    #[test]
    fn test_zero_words_score_zero() {
        assert!(!keyword_density("   ", &["cat"]).is_finite());
        assert_eq!(seo_score("", &["cat"]), 0);
        assert_eq!(seo_score("  \n\t ", &["cat"]), 0);
    }

    #[test]
    fn test_score_caps_at_hundred() {
        assert_eq!(seo_score("cat cat dog", &["cat"]), 100);
    }

    #[test]
    fn test_matches_are_whole_word_and_case_insensitive() {
        assert_eq!(keyword_matches("Cat catalog CAT concat", &["cat"]), 2);
    }

    #[test]
    fn test_keywords_are_cleaned_before_matching() {
        assert_eq!(keyword_matches("the cat sat", &["**cat**"]), 1);
        assert_eq!(clean_keyword("**degree** apprenticeships"), "degree apprenticeships");
    }

    #[test]
    fn test_highlight_preserves_case() {
        assert_eq!(highlight("The Cat sat", &["cat"]), "The <mark>Cat</mark> sat");
    }

    #[test]
    fn test_highlight_metacharacters() {
        let text = "I write C++ and c++ daily, not C.";
        assert_eq!(keyword_matches(text, &["C++"]), 2);
        assert_eq!(
            highlight(text, &["C++"]),
            "I write <mark>C++</mark> and <mark>c++</mark> daily, not C."
        );
        assert_eq!(keyword_matches("price is $5.00 (approx)", &["$5.00", "(approx)"]), 2);
        assert_eq!(keyword_matches("a.b axb", &["a.b"]), 1);
    }

    #[test]
    fn test_highlight_applies_keywords_in_order_without_nesting_guard() {
        assert_eq!(
            highlight("cat", &["cat", "cat"]),
            "<mark><mark>cat</mark></mark>"
        );
        // "mark" matches inside the tags added by the first pass
        assert_eq!(
            highlight("cat", &["cat", "mark"]),
            "<<mark>mark</mark>>cat</<mark>mark</mark>>"
        );
    }

    #[test]
    fn test_highlight_with_span() {
        assert_eq!(
            highlight_with("Study apprenticeships now", &["apprenticeships"], &Marker::SPAN),
            "Study <span class='highlighted-keyword'>apprenticeships</span> now"
        );
    }

    #[test]
    fn test_highlight_outside_tags_skips_wrapped_keywords() {
        let keywords = ["degree apprenticeships", "apprenticeships"];
        assert_eq!(
            highlight_outside_tags("We offer degree apprenticeships. Apply", &keywords, &Marker::SPAN),
            "We offer <span class='highlighted-keyword'>degree apprenticeships</span>. Apply"
        );
        // A standalone occurrence of the shorter keyword is still wrapped.
        assert_eq!(
            highlight_outside_tags("degree apprenticeships and apprenticeships", &keywords, &Marker::MARK),
            "<mark>degree apprenticeships</mark> and <mark>apprenticeships</mark>"
        );
    }

    #[test]
    fn test_blank_keyword_is_ignored() {
        assert_eq!(highlight("abc", &["", "****", " "]), "abc");
        assert_eq!(keyword_matches("abc", &[""]), 0);
    }

    #[test]
    fn test_target_score() {
        let text = vec!["word"; 200].join(" ");
        assert_eq!(target_seo_score(&text), 7);
        // 10.5 rounds up
        let text = vec!["word"; 300].join(" ");
        assert_eq!(target_seo_score(&text), 11);
        let huge = vec!["word"; 5000].join(" ");
        assert_eq!(target_seo_score(&huge), 100);
        assert_eq!(target_seo_score(""), 0);
    }

    #[test]
    fn test_optimized_score() {
        let original = "one two three four five six seven eight nine ten";
        let optimized = "one Apprenticeships two apprenticeships three";
        assert_eq!(optimized_seo_score(original, optimized, &["apprenticeships"]), 20);
        assert_eq!(optimized_seo_score("", optimized, &["apprenticeships"]), 0);
    }

    #[test]
    fn test_insert_keyword() {
        assert_eq!(
            insert_keyword("Hello world. Bye now.", "degree"),
            "Hello world. degree Bye now."
        );
        assert_eq!(insert_keyword("Hello world", "degree"), "Hello world degree");
        assert_eq!(insert_keyword("A Degree course.", "degree"), "A Degree course.");
        assert_eq!(insert_keyword("Why? Because.", "**skills**"), "Why? skills Because.");
    }

    #[test]
    fn test_normalize_db_keyword() {
        assert_eq!(normalize_db_keyword("apprenticeships in Staffordshire"), "Staffordshire");
        assert_eq!(normalize_db_keyword("  online degree  "), "online degree");
        assert_eq!(normalize_db_keyword("jobs In london"), "london");
        assert_eq!(normalize_db_keyword("training"), "training");
        assert_eq!(normalize_db_keyword("courses in"), "courses");
    }
}
