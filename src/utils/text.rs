use unicode_normalization::char::canonical_combining_class;
use unicode_normalization::UnicodeNormalization;

/// Folds accented text to ASCII. Returns `None` when there is nothing to fold.
pub fn convert_diacritics(input: &str) -> Option<String> {
    if input.is_empty() {
        return None;
    }
    if !input.nfd().any(|c| canonical_combining_class(c) != 0) {
        return None;
    }
    Some(input.nfkd().filter(char::is_ascii).collect())
}
