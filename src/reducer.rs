//! Text reduction
//!
//! The advisor treats a reducer as a black box and only measures how many
//! words it removes. [`FillerPhraseReducer`] is the built-in heuristic; an
//! LLM-backed reducer plugs in through the same trait.

use crate::Result;

/// Transforms text into a shorter equivalent
pub trait TextReducer: Send + Sync {
    fn reduce(&self, text: &str) -> Result<String>;
}

impl<F> TextReducer for F
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn reduce(&self, text: &str) -> Result<String> {
        self(text)
    }
}

/// Whitespace-separated word count
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Conversational filler that carries no information
const FILLER_PHRASES: &[&str] = &[
    "i would like to know",
    "i want to understand",
    "could you please tell me",
    "i need information about",
    "can you help me understand",
    "please provide details on",
    "i was wondering if",
    "if you don't mind",
    "i'd appreciate it if",
    "it would be great if you could",
    "i'm curious about",
    "would it be possible to",
    "do you think you could",
    "i'm trying to figure out",
    "i would be grateful if",
    "if it's not too much to ask",
    "i'd like to know more about",
    "could you explain to me",
    "please help me with",
    "if you have time",
    "i'm looking for",
    "pretty much",
    "kind of",
    "sort of",
    "a bit",
    "a little",
    "in my opinion",
    "i think",
    "i believe",
    "as far as i know",
];

/// Single-word qualifiers
const QUALIFIERS: &[&str] = &[
    "very",
    "really",
    "quite",
    "basically",
    "actually",
    "definitely",
    "certainly",
    "probably",
    "honestly",
    "truly",
    "simply",
    "just",
    "so",
    "super",
    "extremely",
    "incredibly",
    "absolutely",
    "totally",
    "entirely",
    "completely",
    "utterly",
    "rather",
    "somewhat",
];

/// Drops filler phrases and redundant qualifiers, word by word
#[derive(Debug, Clone)]
pub struct FillerPhraseReducer {
    phrases: Vec<Vec<String>>,
}

impl Default for FillerPhraseReducer {
    fn default() -> Self {
        let mut phrases: Vec<Vec<String>> = FILLER_PHRASES
            .iter()
            .chain(QUALIFIERS.iter())
            .map(|p| p.split_whitespace().map(str::to_string).collect())
            .collect();
        // Longest match first.
        phrases.sort_by(|a, b| b.len().cmp(&a.len()));
        Self { phrases }
    }
}

impl FillerPhraseReducer {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches_at(&self, normalized: &[String], at: usize) -> Option<usize> {
        self.phrases.iter().find_map(|phrase| {
            let end = at + phrase.len();
            (end <= normalized.len() && normalized[at..end] == phrase[..]).then_some(phrase.len())
        })
    }
}

/// Lowercase and strip surrounding punctuation so "Really," matches "really"
fn normalize_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
        .to_lowercase()
}

impl TextReducer for FillerPhraseReducer {
    fn reduce(&self, text: &str) -> Result<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let normalized: Vec<String> = words.iter().map(|w| normalize_word(w)).collect();

        let mut kept = Vec::with_capacity(words.len());
        let mut i = 0;
        while i < words.len() {
            match self.matches_at(&normalized, i) {
                Some(len) => i += len,
                None => {
                    kept.push(words[i]);
                    i += 1;
                }
            }
        }
        Ok(kept.join(" "))
    }
}
