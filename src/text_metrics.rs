//! Tokenization, word counting, syllable estimation and readability scoring.

use scraper::Html;
use serde::{Deserialize, Serialize};

/// Collapses every run of whitespace into a single space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical form of a keyword term: lowercased and whitespace-collapsed.
pub fn normalize_term(term: &str) -> String {
    collapse_whitespace(term).to_lowercase()
}

/// Returns the visible text of `raw`, dropping markup when it looks like HTML.
pub fn plain_text(raw: &str) -> String {
    if !(raw.contains('<') && raw.contains('>')) {
        return raw.to_string();
    }

    let fragment = Html::parse_fragment(raw);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    collapse_whitespace(&text)
}

/// Lowercases `text`, replaces punctuation with spaces and splits into words.
/// Apostrophes are removed so that "restaurant's" stays one word.
pub fn normalize_words(text: &str) -> Vec<String> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != '\'' && *c != '\u{2019}')
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase();

    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Tokens of two characters or fewer carry no keyword signal.
pub fn is_significant(token: &str) -> bool {
    token.chars().count() > 2
}

pub fn word_count(text: &str) -> usize {
    normalize_words(text).len()
}

/// Counts non-overlapping occurrences of `phrase` inside `tokens`.
pub fn phrase_occurrences(tokens: &[String], phrase: &[String]) -> usize {
    if phrase.is_empty() || tokens.len() < phrase.len() {
        return 0;
    }

    let mut count = 0;
    let mut i = 0;
    while i + phrase.len() <= tokens.len() {
        if tokens[i..i + phrase.len()] == *phrase {
            count += 1;
            i += phrase.len();
        } else {
            i += 1;
        }
    }
    count
}

pub fn sentence_count(text: &str) -> usize {
    let count = text
        .split(['.', '!', '?'])
        .filter(|segment| segment.chars().any(char::is_alphanumeric))
        .count();

    if count == 0 && word_count(text) > 0 {
        1
    } else {
        count
    }
}

/// Estimates syllables with the vowel-group heuristic.
pub fn count_syllables(word: &str) -> usize {
    let word: String = word
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect();

    if word.is_empty() {
        return 0;
    }
    if word.len() <= 3 {
        return 1;
    }

    let stripped = strip_silent_suffix(&word);
    let stripped = stripped.strip_prefix('y').unwrap_or(stripped);

    let mut groups = 0;
    let mut previous_vowel = false;
    for c in stripped.chars() {
        let vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !previous_vowel {
            groups += 1;
        }
        previous_vowel = vowel;
    }

    groups.max(1)
}

// "-es", "-ed" and a trailing "e" are usually silent unless preceded by "l" or a vowel.
fn strip_silent_suffix(word: &str) -> &str {
    let is_kept = |c: Option<char>| matches!(c, Some('l' | 'a' | 'e' | 'i' | 'o' | 'u' | 'y'));

    if let Some(stem) = word.strip_suffix("es")
        && !is_kept(stem.chars().last())
    {
        return stem;
    }
    if let Some(stem) = word.strip_suffix("ed") {
        return stem;
    }
    if let Some(stem) = word.strip_suffix('e')
        && !is_kept(stem.chars().last())
    {
        return stem;
    }
    word
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityScore {
    pub score: f64,
    pub level: String,
    pub words: usize,
    pub sentences: usize,
    pub avg_words_per_sentence: f64,
    pub avg_syllables_per_word: f64,
}

/// Flesch reading ease, clamped to 0-100.
pub fn flesch_reading_ease(text: &str) -> f64 {
    readability(text).score
}

pub fn readability(text: &str) -> ReadabilityScore {
    let words = normalize_words(text);
    if words.is_empty() {
        return ReadabilityScore {
            level: "N/A".to_string(),
            ..Default::default()
        };
    }

    let sentences = sentence_count(text).max(1);
    let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();

    let avg_words_per_sentence = words.len() as f64 / sentences as f64;
    let avg_syllables_per_word = syllables as f64 / words.len() as f64;
    let score = (206.835 - 1.015 * avg_words_per_sentence - 84.6 * avg_syllables_per_word)
        .clamp(0.0, 100.0);

    ReadabilityScore {
        score,
        level: readability_level(score).to_string(),
        words: words.len(),
        sentences,
        avg_words_per_sentence,
        avg_syllables_per_word,
    }
}

fn readability_level(score: f64) -> &'static str {
    match score {
        s if s >= 90.0 => "Very Easy",
        s if s >= 80.0 => "Easy",
        s if s >= 70.0 => "Fairly Easy",
        s if s >= 60.0 => "Standard",
        s if s >= 50.0 => "Fairly Difficult",
        s if s >= 30.0 => "Difficult",
        _ => "Very Difficult",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_words_strips_punctuation() {
        let words = normalize_words("Hello, World! It's a KOT-based system.");
        assert_eq!(
            words,
            vec!["hello", "world", "its", "a", "kot", "based", "system"]
        );
    }

    #[test]
    fn test_plain_text_strips_markup() {
        let text = plain_text("<p>Fast <strong>billing</strong></p><p>for cafes</p>");
        assert_eq!(text, "Fast billing for cafes");
        assert_eq!(plain_text("no markup here"), "no markup here");
    }

    #[test]
    fn test_phrase_occurrences_non_overlapping() {
        let tokens = normalize_words("billing billing billing");
        let phrase = normalize_words("billing billing");
        assert_eq!(phrase_occurrences(&tokens, &phrase), 1);

        let tokens = normalize_words("restaurant billing and more restaurant billing");
        let phrase = normalize_words("restaurant billing");
        assert_eq!(phrase_occurrences(&tokens, &phrase), 2);
    }

    #[test]
    fn test_count_syllables() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("table"), 2);
        assert_eq!(count_syllables("restaurant"), 3);
        assert_eq!(count_syllables("billing"), 2);
        assert_eq!(count_syllables("makes"), 1);
        assert_eq!(count_syllables(""), 0);
    }

    #[test]
    fn test_sentence_count() {
        assert_eq!(sentence_count("One. Two! Three?"), 3);
        assert_eq!(sentence_count("no terminator"), 1);
        assert_eq!(sentence_count(""), 0);
    }

    #[test]
    fn test_readability_bounds() {
        let easy = readability("The cat sat. The dog ran. We had fun.");
        assert!(easy.score > 80.0);
        assert!(easy.score <= 100.0);

        let empty = readability("   ");
        assert_eq!(empty.score, 0.0);
        assert_eq!(empty.level, "N/A");
    }
}
