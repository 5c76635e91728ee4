//! Keyword classifier
//!
//! Pure and deterministic: no I/O, no shared state. Text and terms are
//! normalized the same way (lowercased, every non-alphanumeric character
//! turned into a single space) and a term matches when it appears as a
//! whole word, or whole run of words, in the normalized text. Cost is
//! proportional to text length times list size.

mod default_terms;

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Outcome of classifying one message
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Classification {
    pub flagged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_term: Option<String>,
}

impl Classification {
    pub fn clean() -> Self {
        Self::default()
    }

    fn hit(category: &str, term: &str) -> Self {
        Self {
            flagged: true,
            category: Some(category.to_string()),
            matched_term: Some(term.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum KeywordListError {
    #[error("keyword list is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("keyword list has no usable terms")]
    Empty,
}

#[derive(Debug, Clone)]
struct Term {
    /// Term as configured, reported back on a match
    original: String,
    /// Normalized and padded with one space on each side
    needle: String,
}

#[derive(Debug, Clone)]
struct Category {
    name: String,
    terms: Vec<Term>,
}

/// Case-insensitive keyword matcher over categorized term lists
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    categories: Vec<Category>,
}

impl KeywordClassifier {
    /// Build from `(category, terms)` pairs. Categories are checked in the
    /// order given; terms that normalize to nothing are dropped.
    pub fn new<I, C, T, S>(categories: I) -> Result<Self, KeywordListError>
    where
        I: IntoIterator<Item = (C, T)>,
        C: Into<String>,
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let categories = build_categories(categories);
        if categories.is_empty() {
            return Err(KeywordListError::Empty);
        }

        Ok(Self { categories })
    }

    /// Parse a JSON object mapping category name to a list of terms:
    /// `{"bullying": ["loser", "nobody likes you"]}`
    pub fn from_json(json: &str) -> Result<Self, KeywordListError> {
        let map: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        Self::new(map)
    }

    /// The built-in list used when no list is configured
    pub fn builtin() -> Self {
        Self {
            categories: build_categories(
                default_terms::DEFAULT_TERMS
                    .iter()
                    .map(|(c, t)| (*c, t.iter())),
            ),
        }
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    pub fn term_count(&self) -> usize {
        self.categories.iter().map(|c| c.terms.len()).sum()
    }

    /// Classify `text`. The first matching term (category order, then term
    /// order) is reported.
    pub fn classify(&self, text: &str) -> Classification {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return Classification::clean();
        }
        let haystack = format!(" {normalized} ");

        for category in &self.categories {
            if let Some(term) = category.terms.iter().find(|t| haystack.contains(&t.needle)) {
                return Classification::hit(&category.name, &term.original);
            }
        }

        Classification::clean()
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Lowercase, map non-alphanumerics to spaces, collapse runs of spaces
fn build_categories<I, C, T, S>(categories: I) -> Vec<Category>
where
    I: IntoIterator<Item = (C, T)>,
    C: Into<String>,
    T: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    categories
        .into_iter()
        .map(|(name, terms)| Category {
            name: name.into(),
            terms: terms
                .into_iter()
                .filter_map(|t| {
                    let normalized = normalize(t.as_ref());
                    (!normalized.is_empty()).then(|| Term {
                        original: t.as_ref().trim().to_string(),
                        needle: format!(" {normalized} "),
                    })
                })
                .collect(),
        })
        .filter(|c| !c.terms.is_empty())
        .collect()
}

fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_space = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> KeywordClassifier {
        KeywordClassifier::new([
            ("self-harm", vec!["kill myself", "cut myself"]),
            ("bullying", vec!["loser", "nobody likes you"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Hello,   WORLD!! "), "hello world");
        assert_eq!(normalize("...."), "");
        assert_eq!(normalize("don't"), "don t");
    }

    #[test]
    fn test_case_insensitive_match() {
        let result = classifier().classify("You are such a LOSER.");
        assert_eq!(
            result,
            Classification {
                flagged: true,
                category: Some("bullying".into()),
                matched_term: Some("loser".into()),
            }
        );
    }

    #[test]
    fn test_whole_word_only() {
        let c = classifier();
        assert!(!c.classify("the closer we get").flagged);
        assert!(!c.classify("losers").flagged);
        assert!(c.classify("loser!").flagged);
    }

    #[test]
    fn test_multi_word_phrase_across_punctuation() {
        let result = classifier().classify("i want to kill...   myself");
        assert!(result.flagged);
        assert_eq!(result.category.as_deref(), Some("self-harm"));
        assert_eq!(result.matched_term.as_deref(), Some("kill myself"));

        assert!(!classifier().classify("kill the lights, myself included").flagged);
    }

    #[test]
    fn test_category_order_wins() {
        let result = classifier().classify("loser, I'll cut myself");
        assert_eq!(result.category.as_deref(), Some("self-harm"));
    }

    #[test]
    fn test_clean_text() {
        let c = classifier();
        assert_eq!(c.classify("see you at soccer practice"), Classification::clean());
        assert_eq!(c.classify(""), Classification::clean());
        assert_eq!(c.classify("!!!"), Classification::clean());
    }

    #[test]
    fn test_from_json() {
        let c = KeywordClassifier::from_json(r#"{"drugs": ["Weed", "  "], "empty": []}"#).unwrap();
        assert_eq!(c.term_count(), 1);
        assert_eq!(c.category_names().collect::<Vec<_>>(), vec!["drugs"]);
        assert_eq!(c.classify("got any weed").matched_term.as_deref(), Some("Weed"));

        assert!(matches!(
            KeywordClassifier::from_json("{}"),
            Err(KeywordListError::Empty)
        ));
        assert!(matches!(
            KeywordClassifier::from_json("not json"),
            Err(KeywordListError::Parse(_))
        ));
    }

    #[test]
    fn test_builtin_list_is_usable() {
        let c = KeywordClassifier::builtin();
        assert!(c.term_count() > 0);
        assert!(c.classify("i want to kill myself").flagged);
        assert!(!c.classify("what time is dinner").flagged);
    }

    #[test]
    fn test_builtin_covers_every_category() {
        let c = KeywordClassifier::builtin();
        let names: Vec<&str> = c.category_names().collect();
        assert_eq!(names.len(), default_terms::DEFAULT_TERMS.len());
        for (category, terms) in default_terms::DEFAULT_TERMS {
            assert!(names.contains(category));
            let hit = c.classify(&format!("well {} then", terms[0]));
            assert!(hit.flagged, "{category} term {} did not match", terms[0]);
        }
    }
}
