//! Free-text search over asset records.
//!
//! A search string is split into three kinds of terms:
//!
//! - quoted phrases (`"web profile"`), which must all be found
//! - negated words (`-beta`), none of which may be found
//! - plain words (`liberty`), any one of which is enough
//!
//! Terms are looked up as case-insensitive substrings of the searchable attributes listed in
//! [`SEARCH_FIELDS`]. Every phrase and word that is found adds one to the match score.

use bson::{Bson, Document};

use crate::evaluator::resolve;

/// Attributes inspected by a search.
pub const SEARCH_FIELDS: [&str; 4] = ["name", "description", "shortDescription", "tags"];

/// Attribute under which a record's match score is stamped during a search query.
pub const MATCH_SCORE_FIELD: &str = "$matchScore";

const SCORE_WIDTH: usize = 5;

/// A search string broken into its terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub phrases: Vec<String>,
    pub words: Vec<String>,
    pub negations: Vec<String>,
}

/// Outcome of evaluating a record against a [`SearchQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    pub matches: bool,
    pub score: u32,
}

impl SearchMatch {
    fn rejected() -> Self {
        Self { matches: false, score: 0 }
    }

    /// The score as a zero-padded string, so that lexicographic order equals numeric order.
    pub fn score_string(&self) -> String {
        format!("{:0width$}", self.score, width = SCORE_WIDTH)
    }
}

impl SearchQuery {
    /// Tokenizes a search string.
    ///
    /// Outside quotes, runs of letters, digits and `-` form tokens and any other character
    /// separates them. A double quote starts a phrase, and everything up to the next double
    /// quote belongs to it. A phrase missing its closing quote is treated as a word.
    pub fn parse(search: &str) -> Self {
        let mut tokenizer = Tokenizer::default();

        for c in search.chars() {
            if c == '"' {
                if tokenizer.quoted {
                    tokenizer.push(c);
                    tokenizer.finish_token();
                } else {
                    tokenizer.finish_token();
                    tokenizer.quoted = true;
                    tokenizer.push(c);
                }
            } else if c.is_alphanumeric() || c == '-' || tokenizer.quoted {
                tokenizer.push(c);
            } else {
                tokenizer.finish_token();
            }
        }

        tokenizer.finish_token();
        tokenizer.query
    }

    /// Returns `true` when the query has no terms at all.
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty() && self.words.is_empty() && self.negations.is_empty()
    }

    /// Decides whether `record` is found by this query and computes its match score.
    ///
    /// A record containing any negated term is rejected outright. Otherwise every phrase
    /// must be present; the record then matches if it has at least one phrase, or if any
    /// word is present.
    pub fn evaluate(&self, record: &Document) -> SearchMatch {
        let searchable = SearchableText::extract(record);

        if self.negations.iter().any(|term| searchable.contains(term)) {
            return SearchMatch::rejected();
        }

        let mut score = 0;

        for phrase in &self.phrases {
            if !searchable.contains(phrase) {
                return SearchMatch::rejected();
            }
            score += 1;
        }

        let mut matches = !self.phrases.is_empty();

        for word in &self.words {
            if searchable.contains(word) {
                matches = true;
                score += 1;
            }
        }

        SearchMatch { matches, score }
    }
}

#[derive(Default)]
struct Tokenizer {
    query: SearchQuery,
    token: String,
    in_token: bool,
    quoted: bool,
}

impl Tokenizer {
    fn push(&mut self, c: char) {
        self.token.push(c);
        self.in_token = true;
    }

    fn finish_token(&mut self) {
        if !self.in_token {
            return;
        }

        let token = std::mem::take(&mut self.token);
        self.in_token = false;
        self.quoted = false;

        let (bucket, term) = if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
            (&mut self.query.phrases, &token[1..token.len() - 1])
        } else if token == "\"" {
            return;
        } else if let Some(negated) = token.strip_prefix('-') {
            (&mut self.query.negations, negated)
        } else {
            (&mut self.query.words, token.as_str())
        };

        if !term.is_empty() {
            bucket.push(term.to_string());
        }
    }
}

/// Lowercased text of the searchable attributes of one record.
struct SearchableText {
    values: Vec<String>,
}

impl SearchableText {
    fn extract(record: &Document) -> Self {
        let mut values = Vec::new();

        for field in SEARCH_FIELDS {
            match resolve(record, field).as_deref() {
                Some(Bson::String(text)) => values.push(text.to_lowercase()),
                Some(Bson::Array(items)) => values.extend(
                    items
                        .iter()
                        .filter_map(Bson::as_str)
                        .map(str::to_lowercase),
                ),
                _ => {}
            }
        }

        Self { values }
    }

    fn contains(&self, term: &str) -> bool {
        let term = term.to_lowercase();

        self.values
            .iter()
            .any(|value| value.contains(&term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn finds(record: &Document, search: &str) -> bool {
        SearchQuery::parse(search).evaluate(record).matches
    }

    #[test]
    fn parses_words_phrases_and_negations() {
        let query = SearchQuery::parse("foo bar -baz \"hello world\"");

        assert_eq!(query.words, vec!["foo", "bar"]);
        assert_eq!(query.negations, vec!["baz"]);
        assert_eq!(query.phrases, vec!["hello world"]);
    }

    #[test]
    fn punctuation_separates_words() {
        let query = SearchQuery::parse("web,profile;  liberty-core!");

        assert_eq!(query.words, vec!["web", "profile", "liberty-core"]);
        assert!(query.phrases.is_empty());
    }

    #[test]
    fn phrases_keep_delimiters_and_end_the_previous_token() {
        let query = SearchQuery::parse("abc\"x, y\"def");

        assert_eq!(query.words, vec!["abc", "def"]);
        assert_eq!(query.phrases, vec!["x, y"]);
    }

    #[test]
    fn empty_tokens_are_discarded() {
        let query = SearchQuery::parse("\"\" - \" ");

        assert!(query.phrases.is_empty());
        assert!(query.negations.is_empty());
        assert_eq!(query.words, vec!["\" "]);
        assert!(SearchQuery::parse("   ").is_empty());
        assert!(SearchQuery::parse("\"").is_empty());
    }

    #[test]
    fn unterminated_phrase_becomes_a_word() {
        let query = SearchQuery::parse("\"open ended");

        assert!(query.phrases.is_empty());
        assert_eq!(query.words, vec!["\"open ended"]);
    }

    #[test]
    fn words_match_any_searchable_field() {
        let asset1 = doc! { "name": "wibble", "description": "I am cool" };
        let asset2 = doc! { "name": "helper", "description": "I help with the wibble" };
        let asset3 = doc! { "name": "baz", "description": "I am baz" };

        assert!(finds(&asset1, "wibble"));
        assert!(finds(&asset2, "wibble"));
        assert!(!finds(&asset3, "wibble"));

        assert!(finds(&asset1, "Wibble Baz"));
        assert!(finds(&asset2, "Wibble Baz"));
        assert!(finds(&asset3, "Wibble Baz"));
    }

    #[test]
    fn search_is_case_insensitive() {
        let asset = doc! { "name": "wibble" };

        assert!(finds(&asset, "Wibble"));
        assert!(finds(&doc! { "name": "WIBBLE" }, "wibble"));
    }

    #[test]
    fn phrases_must_match_contiguously() {
        let asset1 = doc! { "name": "wibble", "description": "I am cool" };
        let asset2 = doc! { "name": "helper", "description": "I help with the wibble" };

        assert!(!finds(&asset1, "\"the Wibble\""));
        assert!(finds(&asset2, "\"the Wibble\""));
        assert!(!finds(&asset2, "\"with wibble\""));
    }

    #[test]
    fn negations_take_precedence() {
        let asset1 = doc! { "name": "wibble", "description": "I am cool" };
        let asset2 = doc! { "name": "helper", "description": "I help with the wibble" };

        assert!(finds(&asset1, "wibble -help"));
        assert!(!finds(&asset2, "wibble -help"));
        assert!(!finds(&asset2, "\"the wibble\" -helper"));
    }

    #[test]
    fn only_negations_match_nothing() {
        let asset = doc! { "name": "wibble" };

        assert!(!finds(&asset, "-other"));
    }

    #[test]
    fn tags_and_short_description_are_searched() {
        let asset = doc! {
            "name": "feature",
            "shortDescription": "Servlet support",
            "tags": ["web", "Liberty"],
            "provider": { "name": "wibble" },
        };

        assert!(finds(&asset, "servlet"));
        assert!(finds(&asset, "liberty"));
        assert!(!finds(&asset, "wibble"));
    }

    #[test]
    fn score_counts_found_terms() {
        let asset = doc! { "name": "Liberty core", "description": "the web profile runtime" };

        let result = SearchQuery::parse("liberty web missing \"web profile\"").evaluate(&asset);

        assert!(result.matches);
        assert_eq!(result.score, 3);
        assert_eq!(result.score_string(), "00003");
    }

    #[test]
    fn failed_phrase_rejects_even_with_matching_words() {
        let asset = doc! { "name": "Liberty core" };

        let result = SearchQuery::parse("liberty \"no such phrase\"").evaluate(&asset);

        assert!(!result.matches);
    }
}
