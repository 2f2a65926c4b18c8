//! Splitting a block body into logical lines and fields.

/// Literal two-character marker some editors leave behind for escaped spaces.
const ESCAPED_WHITESPACE: &str = "\\s";

/// Split raw block text into trimmed, non-empty lines.
///
/// Backticks are removed, `\r\n` is normalized and escaped-whitespace
/// markers are collapsed before trimming.
pub fn logical_lines(text: &str) -> Vec<String> {
    text.replace('`', "")
        .replace("\r\n", "\n")
        .split('\n')
        .map(|line| line.replace(ESCAPED_WHITESPACE, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Split a commit row into fields.
///
/// Fields are separated by whitespace unless enclosed in single quotes.
/// Quote state toggles on every `'`, so an unbalanced quote keeps the rest of
/// the row quoted. Empty fields are dropped.
pub fn fields(row: &str) -> Vec<String> {
    let bytes = row.as_bytes();
    let last = bytes.len().saturating_sub(1);
    let mut cells: Vec<&str> = Vec::new();
    let mut outside = true;
    let mut start = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        if outside && matches!(byte, b' ' | b'\t') {
            if i == start {
                start += 1;
            } else {
                cells.push(&row[start..i]);
                start = i + 1;
            }
            continue;
        }
        if byte == b'\'' {
            if outside && i == start {
                start += 1;
            }
            outside = !outside;
            if outside && i != start {
                cells.push(&row[start..i]);
                start = i + 1;
                continue;
            }
        }
        if i == last && start <= i {
            cells.push(&row[start..]);
        }
    }

    cells
        .into_iter()
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_lines_trims_and_drops_blank_lines() {
        let lines = logical_lines("  [main]\r\n\n   a first  \n\t\n b second\n");
        assert_eq!(lines, vec!["[main]", "a first", "b second"]);
    }

    #[test]
    fn test_logical_lines_strips_backticks_and_escaped_whitespace() {
        let lines = logical_lines("```\n\\s\\s a msg\\s\n```");
        assert_eq!(lines, vec!["a msg"]);
    }

    #[test]
    fn test_logical_lines_empty_input_yields_nothing() {
        assert!(logical_lines("").is_empty());
        assert!(logical_lines(" \n\r\n ").is_empty());
    }

    #[test]
    fn test_fields_split_on_whitespace() {
        assert_eq!(fields("fsdf afsdk"), vec!["fsdf", "afsdk"]);
        assert_eq!(fields("1  k  2020-01-01"), vec!["1", "k", "2020-01-01"]);
    }

    #[test]
    fn test_fields_quotes_make_whitespace_literal() {
        assert_eq!(fields("h1<h2 'my msg' 2020-01-01"), vec![
            "h1<h2",
            "my msg",
            "2020-01-01"
        ]);
        assert_eq!(fields("'1' k"), vec!["1", "k"]);
    }

    #[test]
    fn test_fields_double_quotes_are_not_special() {
        assert_eq!(fields("1 \"k\""), vec!["1", "\"k\""]);
    }

    #[test]
    fn test_fields_unbalanced_quote_swallows_rest_of_row() {
        assert_eq!(fields("'1 k"), vec!["1 k"]);
        assert_eq!(fields("'1  k 2020-01-01' '"), vec!["1  k 2020-01-01"]);
    }

    #[test]
    fn test_fields_reopened_quote_keeps_left_to_right_state() {
        assert_eq!(fields("'1  k 2020-01-01' ' df  "), vec!["1  k 2020-01-01", "df"]);
        assert_eq!(fields("'1  k 2020-01-01'' df  "), vec!["1  k 2020-01-01", "df"]);
    }

    #[test]
    fn test_fields_quote_inside_token() {
        assert_eq!(fields("a'b c' d"), vec!["a'b c", "d"]);
    }
}
