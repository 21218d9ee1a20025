//! Morphological analysis capability.
//!
//! An analyzer maps a normalized token to the lemma and grammatical
//! category of every plausible reading. [`Morphology`] combines several
//! analyzers (one per language) into the set of [`WordTag`]s used as
//! search keys.

pub mod english;
pub mod russian;

use std::fmt;

use crate::error::SearchError;

pub use english::EnglishAnalyzer;
pub use russian::RussianAnalyzer;

/// Coarse part of speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Noun,
    Verb,
    Adjective,
    Adverb,
    /// Closed-class words: pronouns, prepositions, conjunctions, articles.
    Function,
    /// Anything an analyzer could not place, including foreign-script words.
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Noun => write!(f, "noun"),
            Category::Verb => write!(f, "verb"),
            Category::Adjective => write!(f, "adj"),
            Category::Adverb => write!(f, "adv"),
            Category::Function => write!(f, "func"),
            Category::Other => write!(f, "other"),
        }
    }
}

/// One reading of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub lemma: String,
    pub category: Category,
    /// False for an unknown-word fallback.
    pub known: bool,
}

impl Analysis {
    pub fn known(lemma: impl Into<String>, category: Category) -> Self {
        Self {
            lemma: lemma.into(),
            category,
            known: true,
        }
    }

    pub fn unknown(lemma: impl Into<String>) -> Self {
        Self {
            lemma: lemma.into(),
            category: Category::Other,
            known: false,
        }
    }
}

/// Search key: two surface words with the same tag are the same term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WordTag {
    pub lemma: String,
    pub category: Category,
}

impl WordTag {
    pub fn new(lemma: impl Into<String>, category: Category) -> Self {
        Self {
            lemma: lemma.into(),
            category,
        }
    }
}

impl fmt::Display for WordTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.lemma, self.category)
    }
}

/// Analyzer for a single language.
///
/// Implementations must behave as pure functions of the token.
pub trait MorphAnalyzer: Send + Sync {
    /// Language code, e.g. `en`.
    fn language(&self) -> &str;

    /// Every plausible reading of an already-normalized token.
    fn analyze(&self, token: &str) -> Vec<Analysis>;
}

/// The set of analyzers in use.
pub struct Morphology {
    analyzers: Vec<Box<dyn MorphAnalyzer>>,
}

impl fmt::Debug for Morphology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Morphology")
            .field("languages", &self.languages())
            .finish()
    }
}

impl Morphology {
    pub fn new(analyzers: Vec<Box<dyn MorphAnalyzer>>) -> Result<Self, SearchError> {
        if analyzers.is_empty() {
            return Err(SearchError::NoAnalyzers);
        }
        Ok(Self { analyzers })
    }

    /// Built-in analyzers for the given language codes, in order.
    pub fn for_languages<S: AsRef<str>>(languages: &[S]) -> Result<Self, SearchError> {
        let mut analyzers: Vec<Box<dyn MorphAnalyzer>> = Vec::new();
        for lang in languages {
            match lang.as_ref() {
                "en" => analyzers.push(Box::new(EnglishAnalyzer)),
                "ru" => analyzers.push(Box::new(RussianAnalyzer)),
                other => return Err(SearchError::UnknownLanguage(other.to_string())),
            }
        }
        Self::new(analyzers)
    }

    pub fn languages(&self) -> Vec<&str> {
        self.analyzers.iter().map(|a| a.language()).collect()
    }

    /// Resolve a normalized token to its search keys.
    ///
    /// Known-word readings from any analyzer suppress unknown-word
    /// fallbacks from the others. Within one language, several readings of
    /// the same category collapse to one: the reading whose lemma equals the
    /// token if there is one, otherwise the first. Remaining readings are
    /// all kept, in analyzer order, without duplicates.
    pub fn word_tags(&self, token: &str) -> Vec<WordTag> {
        let readings: Vec<(usize, Analysis)> = self
            .analyzers
            .iter()
            .enumerate()
            .flat_map(|(i, analyzer)| analyzer.analyze(token).into_iter().map(move |a| (i, a)))
            .collect();

        let any_known = readings.iter().any(|(_, a)| a.known);

        let mut chosen: Vec<(usize, Analysis)> = Vec::new();
        for (lang, reading) in readings {
            if any_known && !reading.known {
                continue;
            }
            match chosen
                .iter_mut()
                .find(|(l, a)| *l == lang && a.category == reading.category)
            {
                Some((_, existing)) => {
                    if existing.lemma != token && reading.lemma == token {
                        *existing = reading;
                    }
                }
                None => chosen.push((lang, reading)),
            }
        }

        let mut tags: Vec<WordTag> = Vec::with_capacity(chosen.len());
        for (_, reading) in chosen {
            let tag = WordTag::new(reading.lemma, reading.category);
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }
}
