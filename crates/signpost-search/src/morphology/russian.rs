//! Suffix-stripping Russian analyzer.
//!
//! Endings are removed per category, longest match first, leaving a stem
//! shared by the inflected forms of a word (`маска`, `маски`, `масками`
//! all reduce to `маск`). A token may yield a noun, a verb and an adjective
//! reading at once; all of them are returned.

use super::{Analysis, Category, MorphAnalyzer};

const MIN_STEM_CHARS: usize = 3;

const FUNCTION_WORDS: &[&str] = &[
    "что", "как", "для", "это", "или", "они", "она", "оно", "его", "вас", "нас", "вам", "нам",
    "мне", "где", "когда", "если", "чтобы", "при", "над", "под", "без", "про", "так", "уже",
    "еще", "тоже", "только", "все", "там", "тут", "кто", "чем",
];

const ADJECTIVE_ENDINGS: &[&str] = &[
    "ими", "ыми", "его", "ого", "ему", "ому", "ее", "ие", "ые", "ое", "ей", "ий", "ый", "ой",
    "ем", "им", "ым", "ом", "их", "ых", "ую", "юю", "ая", "яя", "ою", "ею",
];

/// Endings kept apart from a preceding `а`/`я`, which stays in the stem.
const VERB_ENDINGS_AFTER_A: &[&str] = &[
    "нно", "ете", "йте", "ешь", "ла", "на", "ли", "ем", "ло", "но", "ет", "ют", "ны", "ть", "й",
    "л", "н",
];

const VERB_ENDINGS: &[&str] = &[
    "ейте", "уйте", "ила", "ыла", "ена", "ите", "или", "ыли", "ило", "ыло", "ено", "ует", "уют",
    "ены", "ить", "ыть", "ишь", "ей", "уй", "ил", "ыл", "им", "ым", "ен", "ят", "ит", "ыт", "ую",
    "ю",
];

const NOUN_ENDINGS: &[&str] = &[
    "иями", "ями", "ами", "ией", "иям", "ием", "иях", "ев", "ов", "ие", "ье", "еи", "ии", "ей",
    "ой", "ий", "ям", "ем", "ам", "ом", "ах", "ях", "ию", "ью", "ия", "ья", "а", "е", "и", "й",
    "о", "у", "ы", "ь", "ю", "я",
];

/// Russian analyzer for Cyrillic tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct RussianAnalyzer;

impl MorphAnalyzer for RussianAnalyzer {
    fn language(&self) -> &str {
        "ru"
    }

    fn analyze(&self, token: &str) -> Vec<Analysis> {
        if !token.chars().all(is_cyrillic) {
            return vec![Analysis::unknown(token)];
        }
        if FUNCTION_WORDS.contains(&token) {
            return vec![Analysis::known(token, Category::Function)];
        }

        if let Some(base) = strip_reflexive(token) {
            let stem = verb_stem(base).unwrap_or_else(|| base.to_string());
            return vec![Analysis::known(stem, Category::Verb)];
        }

        let mut readings = Vec::new();
        if let Some(stem) = strip_longest(token, NOUN_ENDINGS) {
            readings.push(Analysis::known(stem, Category::Noun));
        }
        if let Some(stem) = verb_stem(token) {
            readings.push(Analysis::known(stem, Category::Verb));
        }
        if let Some(stem) = strip_longest(token, ADJECTIVE_ENDINGS) {
            readings.push(Analysis::known(stem, Category::Adjective));
        }
        if readings.is_empty() {
            readings.push(Analysis::known(token, Category::Noun));
        }
        readings
    }
}

fn is_cyrillic(c: char) -> bool {
    matches!(c, 'а'..='я' | 'ё' | 'і' | 'ї' | 'є' | 'ґ' | '\'')
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn strip_longest(token: &str, endings: &[&str]) -> Option<String> {
    endings
        .iter()
        .filter_map(|ending| token.strip_suffix(ending).map(|stem| (ending, stem)))
        .filter(|(_, stem)| char_len(stem) >= MIN_STEM_CHARS)
        .max_by_key(|(ending, _)| char_len(ending))
        .map(|(_, stem)| stem.to_string())
}

fn verb_stem(token: &str) -> Option<String> {
    let after_a = VERB_ENDINGS_AFTER_A
        .iter()
        .filter_map(|ending| token.strip_suffix(ending).map(|stem| (ending, stem)))
        .filter(|(_, stem)| stem.ends_with('а') || stem.ends_with('я'))
        .filter(|(_, stem)| char_len(stem) >= MIN_STEM_CHARS)
        .max_by_key(|(ending, _)| char_len(ending))
        .map(|(_, stem)| stem.to_string());

    after_a.or_else(|| strip_longest(token, VERB_ENDINGS))
}

fn strip_reflexive(token: &str) -> Option<&str> {
    token
        .strip_suffix("ся")
        .or_else(|| token.strip_suffix("сь"))
        .filter(|base| char_len(base) > MIN_STEM_CHARS)
}
