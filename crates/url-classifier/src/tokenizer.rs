// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! URL tokenization
//!
//! Splits a URL on path separators and then on dots. Empty tokens produced by
//! consecutive separators are kept; the fitted vocabulary was built from
//! token strings with the same shape.

/// Path separator
const PATH_SEPARATOR: char = '/';
/// Separator within a path segment
const DOT_SEPARATOR: char = '.';
/// Separator placed between tokens in the joined string
const TOKEN_JOINER: &str = " ";

/// Split a URL into its ordered token sequence
pub fn tokens(url: &str) -> Vec<&str> {
    url.split(PATH_SEPARATOR)
        .flat_map(|segment| segment.split(DOT_SEPARATOR))
        .collect()
}

/// Join tokens into the space-delimited string the vectorizer consumes
pub fn join(tokens: &[&str]) -> String {
    tokens.join(TOKEN_JOINER)
}

/// Tokenize a URL into the space-delimited token string the vectorizer consumes
pub fn tokenize(url: &str) -> String {
    join(&tokens(url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_slash_then_dot() {
        assert_eq!(tokens("a/b.c"), vec!["a", "b", "c"]);
        assert_eq!(tokenize("a/b.c"), "a b c");
    }

    #[test]
    fn join_matches_tokenize() {
        let url = "http://www.example.com/a..b/";
        assert_eq!(join(&tokens(url)), tokenize(url));
        assert_eq!(join(&[]), "");
    }

    #[test]
    fn full_url() {
        assert_eq!(
            tokenize("http://example.com/home"),
            "http:  example com home"
        );
        assert_eq!(
            tokens("http://paypal-login-secure.badsite.ru/verify"),
            vec!["http:", "", "paypal-login-secure", "badsite", "ru", "verify"]
        );
    }

    #[test]
    fn empty_input() {
        assert_eq!(tokens(""), vec![""]);
        assert_eq!(tokenize(""), "");
    }

    #[test]
    fn no_separators_is_unchanged() {
        assert_eq!(tokens("localhost"), vec!["localhost"]);
        assert_eq!(tokenize("localhost"), "localhost");
        assert_eq!(tokenize("123"), "123");
    }

    #[test]
    fn consecutive_separators_keep_empty_tokens() {
        assert_eq!(tokens("a//b"), vec!["a", "", "b"]);
        assert_eq!(tokenize("a//b"), "a  b");
        assert_eq!(tokens("a..b"), vec!["a", "", "b"]);
        assert_eq!(tokens("/"), vec!["", ""]);
        assert_eq!(tokens("./"), vec!["", "", ""]);
    }

    #[test]
    fn duplicates_and_order_preserved() {
        assert_eq!(tokens("b.a/b.a"), vec!["b", "a", "b", "a"]);
    }

    #[test]
    fn tokenization_is_deterministic() {
        let inputs = [
            "",
            "https://secure-login.example.co.uk/a/b?x=1",
            "..//..",
            "unicode.例え/パス",
        ];
        for input in inputs {
            assert_eq!(tokenize(input), tokenize(input));
            assert_eq!(tokens(input).len(), tokens(input).len());
        }
    }
}
