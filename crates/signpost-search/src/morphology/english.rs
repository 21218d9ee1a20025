//! Rule-based English analyzer.
//!
//! Reduces inflected forms to a shared stem rather than a dictionary
//! lemma: `require`, `requires`, `required` and `requiring` all become
//! `requir`. Words without an inflectional suffix get both a noun and a
//! verb reading, since English converts freely between the two.

use super::{Analysis, Category, MorphAnalyzer};

const FUNCTION_WORDS: &[&str] = &[
    "the", "and", "for", "with", "you", "your", "are", "was", "were", "that", "this", "these",
    "those", "from", "have", "has", "had", "not", "but", "can", "could", "what", "how", "where",
    "when", "who", "whom", "which", "our", "their", "there", "they", "them", "into", "about",
    "any", "all", "its", "she", "him", "her", "his", "will", "would", "should", "may", "might",
    "must", "shall", "does", "did", "been", "being", "than", "then", "also", "just", "out",
];

const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "able", "ible", "less", "ive", "ical"];

const SIBILANT_PLURALS: &[&str] = &["sses", "shes", "ches", "xes", "zes"];

/// English analyzer for Latin-script tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishAnalyzer;

impl MorphAnalyzer for EnglishAnalyzer {
    fn language(&self) -> &str {
        "en"
    }

    fn analyze(&self, token: &str) -> Vec<Analysis> {
        if !token.chars().all(|c| c.is_ascii_lowercase() || c == '\'') {
            return vec![Analysis::unknown(token)];
        }

        let word = token
            .strip_suffix("'s")
            .unwrap_or(token)
            .trim_end_matches('\'');

        if FUNCTION_WORDS.contains(&word) {
            return vec![Analysis::known(word, Category::Function)];
        }

        let word = word.replace('\'', "");
        readings(&word)
    }
}

fn readings(word: &str) -> Vec<Analysis> {
    let len = word.len();

    // `apply` and `family` are not adverbs.
    if len > 5 && !word.ends_with("ply") && !word.ends_with("ily") {
        if let Some(stem) = word.strip_suffix("ly") {
            return vec![Analysis::known(canonical(stem), Category::Adverb)];
        }
    }

    if ADJECTIVE_SUFFIXES
        .iter()
        .any(|suffix| word.ends_with(suffix) && len > suffix.len() + 2)
    {
        return vec![Analysis::known(canonical(word), Category::Adjective)];
    }

    if len > 5 {
        if let Some(stem) = word.strip_suffix("ing") {
            let stem = undouble(stem);
            return vec![
                Analysis::known(canonical(&stem), Category::Verb),
                Analysis::known(canonical(&stem), Category::Noun),
            ];
        }
    }

    if len > 4 {
        if let Some(stem) = word.strip_suffix("ied") {
            return vec![Analysis::known(format!("{}y", stem), Category::Verb)];
        }
        if let Some(stem) = word.strip_suffix("ed") {
            let stem = undouble(stem);
            return vec![Analysis::known(canonical(&stem), Category::Verb)];
        }
        if let Some(stem) = word.strip_suffix("ies") {
            return noun_and_verb(&format!("{}y", stem));
        }
    }

    if SIBILANT_PLURALS.iter().any(|suffix| word.ends_with(suffix)) && len > 4 {
        return noun_and_verb(&canonical(&word[..len - 2]));
    }

    let singular_s = ["ss", "us", "is"].iter().any(|suffix| word.ends_with(suffix));
    if len > 3 && word.ends_with('s') && !singular_s {
        return noun_and_verb(&canonical(&word[..len - 1]));
    }

    noun_and_verb(&canonical(word))
}

fn noun_and_verb(lemma: &str) -> Vec<Analysis> {
    vec![
        Analysis::known(lemma, Category::Noun),
        Analysis::known(lemma, Category::Verb),
    ]
}

/// Drop a silent trailing `e` so that `vaccine` and `vaccines` share a stem.
fn canonical(stem: &str) -> String {
    match stem.strip_suffix('e') {
        Some(rest) if rest.len() >= 3 => rest.to_string(),
        _ => stem.to_string(),
    }
}

/// `stopp` -> `stop`, but `fill` and `pass` stay as they are.
fn undouble(stem: &str) -> String {
    let bytes = stem.as_bytes();
    let n = bytes.len();
    if n >= 3 && bytes[n - 1] == bytes[n - 2] && !b"lszaeiou".contains(&bytes[n - 1]) {
        stem[..n - 1].to_string()
    } else {
        stem.to_string()
    }
}
