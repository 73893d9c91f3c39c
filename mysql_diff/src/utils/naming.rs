//! Naming utilities for mysql_diff
//!
//! This module derives index names and quotes identifiers for generated SQL.

/// Derive an index name from a key's column-spec
///
/// Each comma-separated token loses its backticks and parentheses, and the
/// tokens are joined with `_`: `` `created_on`,`updated_on` `` becomes
/// `created_on_updated_on`. Trailing empty tokens are ignored.
pub fn index_name_from_column_spec(column_spec: &str) -> String {
    let mut tokens: Vec<String> = column_spec
        .split(',')
        .map(|token| token.replace(['`', '(', ')'], ""))
        .collect();

    while tokens.last().map_or(false, |token| token.is_empty()) {
        tokens.pop();
    }

    tokens.join("_")
}

/// Quote an identifier with MySQL backticks
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("`created_on`,`updated_on`", "created_on_updated_on")]
    #[case("`email`,`name`", "email_name")]
    #[case("`id`", "id")]
    #[case("`title`(10)", "title10")]
    #[case("`a`,", "a")]
    #[case("", "")]
    fn test_index_name_from_column_spec(#[case] spec: &str, #[case] expected: &str) {
        assert_eq!(index_name_from_column_spec(spec), expected);
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("users"), "`users`");
    }
}
