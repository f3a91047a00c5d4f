//! Extract a numeric relevance score from free-form oracle output.

use std::sync::LazyLock;

use regex::Regex;

/// First run of ASCII digits. `\d` would also match non-ASCII digits.
static FIRST_INTEGER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new("[0-9]+").ok());

/// The first integer in `response`, if any.
///
/// `None` when there are no digits or the number does not fit in `u32`.
/// Values are not clamped to the requested 1–10 scale.
pub fn parse_score(response: &str) -> Option<u32> {
    let re = FIRST_INTEGER.as_ref()?;
    re.find(response)?.as_str().parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_integer_wins() {
        assert_eq!(parse_score("Score: 7/10"), Some(7));
        assert_eq!(parse_score("8"), Some(8));
        assert_eq!(parse_score("  10 - very relevant, 2 caveats"), Some(10));
    }

    #[test]
    fn no_digits_is_none() {
        assert_eq!(parse_score("very relevant"), None);
        assert_eq!(parse_score(""), None);
    }

    #[test]
    fn overflow_is_none() {
        assert_eq!(parse_score("99999999999999999999"), None);
    }

    #[test]
    fn non_ascii_digits_are_ignored() {
        assert_eq!(parse_score("٣ then 4"), Some(4));
    }

    #[test]
    fn leading_zeros_parse() {
        assert_eq!(parse_score("Relevance: 007"), Some(7));
    }
}
