use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

static LANG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lang");

/// Words generated per second of a timed test, so the text outlasts the clock
pub const WORDS_PER_TIMED_SECOND: usize = 4;

#[derive(Debug, Error)]
pub enum TextError {
    #[error("word list '{0}' not found")]
    UnknownWordList(String),
    #[error("word list '{name}' is not valid: {source}")]
    InvalidWordList {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("word list '{0}' is empty")]
    EmptyWordList(String),
    #[error("the supplied text is empty")]
    EmptyText,
}

#[derive(Deserialize, Clone, Debug)]
pub struct WordList {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl WordList {
    pub fn load(name: &str) -> Result<Self, TextError> {
        let file = LANG_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| TextError::UnknownWordList(name.to_string()))?;

        let contents = file
            .contents_utf8()
            .ok_or_else(|| TextError::UnknownWordList(name.to_string()))?;

        Self::from_json(name, contents)
    }

    pub fn english() -> Result<Self, TextError> {
        Self::load("english")
    }

    pub fn from_json(name: &str, json: &str) -> Result<Self, TextError> {
        let list: WordList =
            serde_json::from_str(json).map_err(|source| TextError::InvalidWordList {
                name: name.to_string(),
                source,
            })?;

        if list.words.is_empty() {
            return Err(TextError::EmptyWordList(name.to_string()));
        }
        Ok(list)
    }

    /// `count` words drawn with replacement, joined by single spaces
    pub fn pick<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> String {
        (0..count)
            .filter_map(|_| self.words.choose(&mut *rng))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn pick_random(&self, count: usize) -> String {
        self.pick(count, &mut rand::thread_rng())
    }
}

/// Collapses every whitespace run to a single space and trims both ends.
pub fn normalize(text: &str) -> Result<String, TextError> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return Err(TextError::EmptyText);
    }
    Ok(normalized)
}

/// Number of words to generate for a timed test
pub fn words_for_secs(secs: u64) -> usize {
    (secs as usize).saturating_mul(WORDS_PER_TIMED_SECOND).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_english_loads() {
        let list = WordList::english().unwrap();

        assert_eq!(list.name, "english");
        assert!(!list.words.is_empty());
        assert_eq!(list.size as usize, list.words.len());
    }

    #[test]
    fn test_unknown_list() {
        assert_matches!(
            WordList::load("klingon"),
            Err(TextError::UnknownWordList(name)) if name == "klingon"
        );
    }

    #[test]
    fn test_from_json() {
        let json_data = r#"
        {
            "name": "test",
            "size": 3,
            "words": ["hello", "world", "test"]
        }
        "#;

        let list = WordList::from_json("test", json_data).unwrap();
        assert_eq!(list.words, vec!["hello", "world", "test"]);
    }

    #[test]
    fn test_from_json_rejects_garbage_and_empty() {
        assert_matches!(
            WordList::from_json("bad", "{not json"),
            Err(TextError::InvalidWordList { .. })
        );
        assert_matches!(
            WordList::from_json("empty", r#"{"name": "empty", "size": 0, "words": []}"#),
            Err(TextError::EmptyWordList(_))
        );
    }

    #[test]
    fn test_pick_word_count_and_spacing() {
        let list = WordList::english().unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let text = list.pick(25, &mut rng);

        assert_eq!(text.split(' ').count(), 25);
        assert!(!text.starts_with(' ') && !text.ends_with(' '));
        assert!(!text.contains("  "));
        assert!(text.split(' ').all(|w| list.words.iter().any(|x| x == w)));
    }

    #[test]
    fn test_pick_more_than_list_size() {
        let list = WordList::from_json("tiny", r#"{"name": "tiny", "size": 1, "words": ["a"]}"#)
            .unwrap();

        assert_eq!(list.pick_random(4), "a a a a");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize("  the quick\n\tbrown   fox \n").unwrap(),
            "the quick brown fox"
        );
        assert_matches!(normalize(" \n\t "), Err(TextError::EmptyText));
    }

    #[test]
    fn test_words_for_secs() {
        assert_eq!(words_for_secs(15), 60);
        assert_eq!(words_for_secs(30), 120);
    }
}
