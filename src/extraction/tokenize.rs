//! Tokenization helpers shared by the extractors.

use unicode_segmentation::UnicodeSegmentation;

/// Split text on Unicode word boundaries (UAX #29).
///
/// Whitespace is dropped; punctuation stays, one token per mark, so
/// `"Hi, you."` yields `["Hi", ",", "you", "."]`.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_word_bounds()
        .filter(|segment| !segment.chars().all(char::is_whitespace))
        .collect()
}

/// Word tokens only, without punctuation.
pub fn words(text: &str) -> Vec<&str> {
    text.unicode_words().collect()
}

/// Contiguous n-grams of `tokens`, joined with `_`.
///
/// Returns nothing for `n == 0` or fewer than `n` tokens.
pub fn ngrams<S: AsRef<str>>(tokens: &[S], n: usize) -> Vec<String> {
    if n == 0 || tokens.len() < n {
        return Vec::new();
    }
    tokens
        .windows(n)
        .map(|window| {
            window
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>()
                .join("_")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_keeps_punctuation() {
        assert_eq!(tokenize("Hi, you."), vec!["Hi", ",", "you", "."]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_words() {
        assert_eq!(words("Hi, you."), vec!["Hi", "you"]);
    }

    #[test]
    fn test_ngrams() {
        let tokens = ["a", "b", "c"];
        assert_eq!(ngrams(&tokens, 2), vec!["a_b", "b_c"]);
        assert_eq!(ngrams(&tokens, 3), vec!["a_b_c"]);
        assert!(ngrams(&tokens, 4).is_empty());
        assert!(ngrams(&tokens, 0).is_empty());
    }
}
