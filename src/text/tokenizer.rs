//! Free text → normalized token stream.

use std::collections::HashSet;

use rust_stemmers::{Algorithm, Stemmer};

use super::stopwords;

/// A normalized word: lowercase, stemmed, non-empty, free of ASCII
/// punctuation and whitespace.
pub type Token = String;

/// ASCII punctuation removed before splitting.
pub const PUNCTUATION: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;

/// Stateless English tokenizer.
///
/// The stopword set and stemmer are fixed at construction and only read
/// afterwards, so one instance can be shared across threads.
pub struct Tokenizer {
    stemmer: Stemmer,
    stopwords: HashSet<String>,
}

impl Tokenizer {
    /// English stopwords and the English Snowball (Porter2) stemmer.
    pub fn english() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
            stopwords: stopwords::ENGLISH.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Add more stopwords on top of the built-in list.
    pub fn with_extra_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stopwords
            .extend(words.into_iter().map(|w| w.as_ref().to_lowercase()));
        self
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub fn stopword_count(&self) -> usize {
        self.stopwords.len()
    }

    /// Tokenize `text`. `None` and empty input yield no tokens.
    ///
    /// 1. Drop every ASCII punctuation character.
    /// 2. Turn tabs, newlines and any other Unicode whitespace into spaces.
    /// 3. Split on spaces, skipping empty pieces.
    /// 4. Lowercase, drop stopwords, stem.
    pub fn tokenize<'a>(&self, text: impl Into<Option<&'a str>>) -> Vec<Token> {
        let text = match text.into() {
            Some(t) if !t.is_empty() => t,
            _ => return Vec::new(),
        };

        let cleaned: String = text
            .chars()
            .filter(|c| !is_punctuation(*c))
            // Every whitespace char separates, not only tab and newline: a bare
            // `\r` or U+00A0 would otherwise end up inside a token.
            .map(|c| if c.is_whitespace() { ' ' } else { c })
            .collect();

        cleaned
            .split(' ')
            .filter(|w| !w.is_empty())
            .filter_map(|word| {
                let lower = word.to_lowercase();
                if self.stopwords.contains(&lower) {
                    return None;
                }
                let stem = self.stemmer.stem(&lower).into_owned();
                (!stem.is_empty()).then_some(stem)
            })
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::english()
    }
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer")
            .field("stopwords", &self.stopwords.len())
            .finish_non_exhaustive()
    }
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokenize(text: &str) -> Vec<Token> {
        Tokenizer::english().tokenize(text)
    }

    #[test]
    fn test_punctuation_constant_matches_ascii_set() {
        assert_eq!(PUNCTUATION.len(), 32);
        assert!(PUNCTUATION.chars().all(is_punctuation));
    }

    #[test]
    fn test_empty_and_none() {
        let tokenizer = Tokenizer::english();
        assert!(tokenizer.tokenize(None).is_empty());
        assert!(tokenizer.tokenize("").is_empty());
        assert!(tokenizer.tokenize("   \t\n ").is_empty());
    }

    #[test]
    fn test_stopword_exclusion() {
        assert_eq!(tokenize("the quick the fox"), vec!["quick", "fox"]);
    }

    #[test]
    fn test_stemming() {
        assert_eq!(
            tokenize("The quick brown fox jumps over the lazy dog"),
            vec!["quick", "brown", "fox", "jump", "lazi", "dog"]
        );
        assert_eq!(tokenize("running"), vec!["run"]);
    }

    #[test]
    fn test_punctuation_is_removed_not_split() {
        // Removing punctuation glues the halves together.
        assert_eq!(tokenize("e-mail"), vec!["email"]);
        assert_eq!(tokenize("Hello, World!!!"), vec!["hello", "world"]);
        assert_eq!(tokenize("...!?"), Vec::<Token>::new());
    }

    #[test]
    fn test_contractions_lose_apostrophe_before_stopword_check() {
        // "don't" becomes "dont", which is not in the list
        assert_eq!(tokenize("don't"), vec!["dont"]);
    }

    #[test]
    fn test_tabs_newlines_and_crlf_separate_words() {
        assert_eq!(tokenize("cheap\tpills\r\nnow\nfox"), vec!["cheap", "pill", "fox"]);
    }

    #[test]
    fn test_uppercase_stopwords_are_removed() {
        assert_eq!(tokenize("THE Fox AND the Dog"), vec!["fox", "dog"]);
    }

    #[test]
    fn test_deterministic() {
        let tokenizer = Tokenizer::english();
        let text = "Congratulations!! You have WON a free cruise; reply now to claim.";
        assert_eq!(tokenizer.tokenize(text), tokenizer.tokenize(text));
    }

    #[test]
    fn test_idempotent_on_clean_input() {
        let clean = "quick brown fox dog";
        assert_eq!(
            tokenize(clean),
            clean.split(' ').map(String::from).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_tokens_have_no_punctuation_or_whitespace() {
        let tokens = tokenize("Re: [URGENT]  50% OFF -- \"best\" deals\u{a0}today!");
        assert!(!tokens.is_empty());
        for token in &tokens {
            assert!(!token.is_empty());
            assert!(!token.chars().any(|c| c.is_whitespace() || is_punctuation(c)));
        }
    }

    #[test]
    fn test_extra_stopwords() {
        let tokenizer = Tokenizer::english().with_extra_stopwords(["Fox"]);
        assert!(tokenizer.is_stopword("fox"));
        assert_eq!(tokenizer.tokenize("the quick fox"), vec!["quick"]);
        assert_eq!(tokenizer.stopword_count(), stopwords::ENGLISH.len() + 1);
    }
}
