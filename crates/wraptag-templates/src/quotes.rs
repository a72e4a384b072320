use std::str::CharIndices;

/// Byte offsets of the characters accepted by `is_delimiter` that sit outside
/// quoted regions. A backslash inside quotes escapes the following character.
pub(crate) struct Unquoted<'a, F> {
    chars: CharIndices<'a>,
    is_delimiter: F,
    open: Option<char>,
}

pub(crate) fn unquoted<F: Fn(char) -> bool>(s: &str, is_delimiter: F) -> Unquoted<'_, F> {
    Unquoted {
        chars: s.char_indices(),
        is_delimiter,
        open: None,
    }
}

impl<F: Fn(char) -> bool> Iterator for Unquoted<'_, F> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((idx, ch)) = self.chars.next() {
            match self.open {
                Some(_) if ch == '\\' => {
                    self.chars.next();
                }
                Some(open) => {
                    if ch == open {
                        self.open = None;
                    }
                }
                None if ch == '"' || ch == '\'' => self.open = Some(ch),
                None if (self.is_delimiter)(ch) => return Some((idx, ch)),
                None => {}
            }
        }
        None
    }
}

/// Split `s` on unquoted whitespace, the way tag contents are split into bits.
pub(crate) fn smart_split(s: &str) -> Vec<String> {
    let mut bits = Vec::new();
    let mut start = 0;
    for (idx, ch) in unquoted(s, char::is_whitespace) {
        if idx > start {
            bits.push(s[start..idx].to_string());
        }
        start = idx + ch.len_utf8();
    }
    if start < s.len() {
        bits.push(s[start..].to_string());
    }
    bits
}

/// Cut `s` at every unquoted `delimiter`, keeping empty pieces.
pub(crate) fn split_unquoted(s: &str, delimiter: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in unquoted(s, |ch| ch == delimiter) {
        pieces.push(&s[start..idx]);
        start = idx + delimiter.len_utf8();
    }
    pieces.push(&s[start..]);
    pieces
}

/// Byte index of the first unquoted `delimiter` in `s`.
pub(crate) fn find_unquoted(s: &str, delimiter: char) -> Option<usize> {
    unquoted(s, |ch| ch == delimiter).next().map(|(idx, _)| idx)
}

/// Contents of a string literal with its backslash escapes removed, or `None`
/// when `s` is not wrapped in a matching pair of quotes.
pub(crate) fn unquote(s: &str) -> Option<String> {
    let quote = s.chars().next().filter(|ch| matches!(ch, '"' | '\''))?;
    if s.len() < 2 || !s.ends_with(quote) {
        return None;
    }

    let mut text = String::with_capacity(s.len() - 2);
    let mut chars = s[1..s.len() - 1].chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => text.extend(chars.next()),
            _ => text.push(ch),
        }
    }
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipes_inside_quotes_are_skipped() {
        assert_eq!(
            split_unquoted("title|upper|default:'x|y'", '|'),
            vec!["title", "upper", "default:'x|y'"]
        );
    }

    #[test]
    fn test_escaped_quote_stays_open() {
        assert_eq!(split_unquoted(r#""a\"b"|c"#, '|'), vec![r#""a\"b""#, "c"]);
    }

    #[test]
    fn test_split_keeps_empty_pieces() {
        assert_eq!(split_unquoted("a||b", '|'), vec!["a", "", "b"]);
        assert_eq!(split_unquoted("", '|'), vec![""]);
    }

    #[test]
    fn test_smart_split_simple() {
        assert_eq!(
            smart_split("button 1 2 title=x"),
            vec!["button", "1", "2", "title=x"]
        );
    }

    #[test]
    fn test_smart_split_quoted() {
        assert_eq!(
            smart_split(r#"card   title="hello world"  as c"#),
            vec!["card", r#"title="hello world""#, "as", "c"]
        );
        assert_eq!(
            smart_split(r#"tip text="it\"s fine""#),
            vec!["tip", r#"text="it\"s fine""#]
        );
    }

    #[test]
    fn test_smart_split_blank() {
        assert!(smart_split("").is_empty());
        assert!(smart_split("   ").is_empty());
    }

    #[test]
    fn test_find_first_equals() {
        assert_eq!(find_unquoted(r#"title="a=b""#, '='), Some(5));
        assert_eq!(find_unquoted(r#""a=b""#, '='), None);
        assert_eq!(find_unquoted("a=b=c", '='), Some(1));
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote(r#""hello""#), Some("hello".to_string()));
        assert_eq!(unquote("'hi'"), Some("hi".to_string()));
        assert_eq!(unquote(r#""it\"s""#), Some("it\"s".to_string()));
        assert_eq!(unquote(r#""mismatch'"#), None);
        assert_eq!(unquote("plain"), None);
        assert_eq!(unquote("\""), None);
    }
}
