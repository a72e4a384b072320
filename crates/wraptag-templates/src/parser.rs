use std::sync::Arc;

use crate::engine::Engine;
use crate::error::TemplateError;
use crate::expression::FilterExpression;
use crate::nodelist::NodeList;
use crate::nodelist::TextNode;
use crate::nodelist::VariableNode;
use crate::tokens::Token;
use crate::tokens::TokenKind;

/// Turns a token stream into a [`NodeList`], handing block tags to the
/// compile functions registered in the engine's libraries.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    engine: Arc<Engine>,
}

impl Parser {
    #[must_use]
    pub fn new(tokens: Vec<Token>, engine: Arc<Engine>) -> Self {
        Parser {
            tokens,
            current: 0,
            engine,
        }
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Parse until a block tag whose name is in `until`, leaving that token
    /// unconsumed. With an empty `until` the whole stream is parsed.
    pub fn parse(&mut self, until: &[&str]) -> Result<NodeList, TemplateError> {
        let mut nodelist = NodeList::default();

        while let Some(token) = self.tokens.get(self.current).cloned() {
            match token.kind() {
                TokenKind::Text(text) => {
                    self.current += 1;
                    nodelist.push(Box::new(TextNode::new(text.clone())));
                }
                TokenKind::Comment(_) => {
                    self.current += 1;
                }
                TokenKind::Variable(contents) => {
                    self.current += 1;
                    if contents.is_empty() {
                        return Err(TemplateError::Syntax(format!(
                            "Empty variable tag on line {}",
                            token.line()
                        )));
                    }
                    let expression = self.compile_filter(contents)?;
                    nodelist.push(Box::new(VariableNode::new(expression)));
                }
                TokenKind::Error(text) => {
                    return Err(TemplateError::Syntax(format!(
                        "Unclosed tag on line {}: '{}'",
                        token.line(),
                        text
                    )));
                }
                TokenKind::Block(_) => {
                    let Some(command) = token.command() else {
                        return Err(TemplateError::Syntax(format!(
                            "Empty block tag on line {}",
                            token.line()
                        )));
                    };
                    if until.contains(&command) {
                        return Ok(nodelist);
                    }
                    self.current += 1;

                    let Some(compile) = self.engine.find_tag(command) else {
                        let mut message =
                            format!("Invalid block tag on line {}: '{}'", token.line(), command);
                        if !until.is_empty() {
                            message.push_str(&format!(", expected '{}'", until.join("' or '")));
                        }
                        return Err(TemplateError::Syntax(message));
                    };
                    tracing::trace!("compiling tag '{}' on line {}", command, token.line());
                    let node = compile(self, &token)?;
                    nodelist.push(node);
                }
            }
        }

        if !until.is_empty() {
            return Err(TemplateError::Syntax(format!(
                "Unclosed tag, looking for one of: {}",
                until.join(", ")
            )));
        }

        Ok(nodelist)
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.current).cloned();
        if token.is_some() {
            self.current += 1;
        }
        token
    }

    /// Compile a filter expression against the engine's filters.
    pub fn compile_filter(&self, token: &str) -> Result<FilterExpression, TemplateError> {
        FilterExpression::parse(token, |name| self.engine.find_filter(name))
    }
}
