use crate::tokens::Token;
use crate::tokens::TokenKind;

type Construct = fn(String) -> TokenKind;

const CONSTRUCTS: [(&str, &str, Construct); 3] = [
    ("{%", "%}", TokenKind::Block),
    ("{{", "}}", TokenKind::Variable),
    ("{#", "#}", TokenKind::Comment),
];

/// Splits template source into text, variable, block and comment tokens.
///
/// Construct contents are trimmed. An opener without its closing delimiter
/// turns the rest of the source into a single [`TokenKind::Error`].
pub struct Lexer {
    source: String,
}

impl Lexer {
    #[must_use]
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.to_string(),
        }
    }

    #[must_use]
    pub fn tokenize(self) -> Vec<Token> {
        let source = self.source.as_str();
        let mut tokens = Vec::new();
        let mut offset = 0;
        let mut line = 1;

        while offset < source.len() {
            let rest = &source[offset..];
            let (kind, len) = match construct_at(rest) {
                Some((open, close, construct)) => lex_construct(rest, open, close, construct),
                None => lex_text(rest),
            };
            tokens.push(Token::new(kind, line, offset));
            line += rest[..len].matches('\n').count();
            offset += len;
        }

        tokens
    }
}

fn construct_at(rest: &str) -> Option<(&'static str, &'static str, Construct)> {
    CONSTRUCTS
        .iter()
        .find(|(open, _, _)| rest.starts_with(*open))
        .copied()
}

fn lex_construct(rest: &str, open: &str, close: &str, construct: Construct) -> (TokenKind, usize) {
    let inner = &rest[open.len()..];
    match inner.find(close) {
        Some(end) => (
            construct(inner[..end].trim().to_string()),
            open.len() + end + close.len(),
        ),
        None => (TokenKind::Error(rest.to_string()), rest.len()),
    }
}

/// Text runs up to the next construct opener. A leading `{` that opens
/// nothing stays in the text.
fn lex_text(rest: &str) -> (TokenKind, usize) {
    let len = rest
        .match_indices('{')
        .map(|(idx, _)| idx)
        .find(|&idx| idx > 0 && construct_at(&rest[idx..]).is_some())
        .unwrap_or(rest.len());
    (TokenKind::Text(rest[..len].to_string()), len)
}
