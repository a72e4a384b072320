use serde::Serialize;

use crate::quotes::smart_split;

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub enum TokenKind {
    Block(String),
    Comment(String),
    Error(String),
    Text(String),
    Variable(String),
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    line: usize,
    offset: usize,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, line: usize, offset: usize) -> Self {
        Self { kind, line, offset }
    }

    /// Convenience constructor for a block token, mostly useful in tests.
    #[must_use]
    pub fn block(contents: &str) -> Self {
        Self::new(TokenKind::Block(contents.trim().to_string()), 1, 0)
    }

    #[must_use]
    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Inner text of the construct, without delimiters.
    #[must_use]
    pub fn contents(&self) -> &str {
        match &self.kind {
            TokenKind::Block(s)
            | TokenKind::Comment(s)
            | TokenKind::Error(s)
            | TokenKind::Text(s)
            | TokenKind::Variable(s) => s,
        }
    }

    /// Source text of the token, delimiters included.
    #[must_use]
    pub fn lexeme(&self) -> String {
        match &self.kind {
            TokenKind::Block(s) => format!("{{% {s} %}}"),
            TokenKind::Variable(s) => format!("{{{{ {s} }}}}"),
            TokenKind::Comment(s) => format!("{{# {s} #}}"),
            TokenKind::Error(s) | TokenKind::Text(s) => s.clone(),
        }
    }

    /// Whitespace-separated bits of the contents, keeping quoted strings together.
    ///
    /// The first bit of a block token is the tag name.
    #[must_use]
    pub fn split_contents(&self) -> Vec<String> {
        smart_split(self.contents())
    }

    /// Tag name of a block token.
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Block(s) => s.split_whitespace().next(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_contents_keeps_quotes() {
        let token = Token::block(r#"button title="Save changes" 1 as btn"#);
        assert_eq!(
            token.split_contents(),
            vec!["button", r#"title="Save changes""#, "1", "as", "btn"]
        );
        assert_eq!(token.command(), Some("button"));
    }

    #[test]
    fn test_lexeme() {
        let token = Token::new(TokenKind::Variable("title".to_string()), 3, 10);
        assert_eq!(token.lexeme(), "{{ title }}");
        assert_eq!(token.line(), 3);
        assert_eq!(token.offset(), 10);
        assert_eq!(token.command(), None);
    }
}
