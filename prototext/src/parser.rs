use crate::{
    common::*,
    document::{Document, Field, Scalar, Value},
    error::Error,
    lexer::{Lexer, Pos, Token},
};

/// Parses a text-format document.
pub fn parse(text: &str) -> Result<Document, Error> {
    Parser::new(text)?.parse_document()
}

impl FromStr for Document {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse(text)
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: Option<(Token, Pos)>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Result<Self, Error> {
        let mut lexer = Lexer::new(text);
        let lookahead = lexer.next_token()?;
        Ok(Self { lexer, lookahead })
    }

    fn peek(&self) -> Option<&Token> {
        self.lookahead.as_ref().map(|(token, _)| token)
    }

    fn bump(&mut self) -> Result<Option<(Token, Pos)>, Error> {
        let current = self.lookahead.take();
        self.lookahead = self.lexer.next_token()?;
        Ok(current)
    }

    fn error_here(&self, message: impl Into<String>) -> Error {
        let pos = match &self.lookahead {
            Some((_, pos)) => *pos,
            None => self.lexer.pos(),
        };
        Error::Parse {
            line: pos.line,
            column: pos.column,
            message: message.into(),
        }
    }

    fn parse_document(&mut self) -> Result<Document, Error> {
        let document = self.parse_fields(false)?;
        Ok(document)
    }

    fn parse_fields(&mut self, nested: bool) -> Result<Document, Error> {
        let mut document = Document::new();
        loop {
            // optional field separators
            while matches!(self.peek(), Some(Token::Comma) | Some(Token::Semi)) {
                self.bump()?;
            }

            match self.peek() {
                None => {
                    if nested {
                        return Err(self.error_here("unexpected end of input inside message"));
                    }
                    return Ok(document);
                }
                Some(Token::RBrace) => {
                    if !nested {
                        return Err(self.error_here("unexpected '}'"));
                    }
                    self.bump()?;
                    return Ok(document);
                }
                Some(Token::Ident(_)) => {
                    let name = match self.bump()? {
                        Some((Token::Ident(name), _)) => name,
                        _ => return Err(self.error_here("expected field name")),
                    };
                    let field = self.parse_field_body(name)?;
                    document.push(field);
                }
                Some(other) => {
                    let message = format!("expected a field name, found {}", other.describe());
                    return Err(self.error_here(message));
                }
            }
        }
    }

    fn parse_field_body(&mut self, name: String) -> Result<Field, Error> {
        match self.peek() {
            Some(Token::LBrace) => {
                self.bump()?;
                let message = self.parse_fields(true)?;
                Ok(Field {
                    name,
                    value: Value::Message(message),
                })
            }
            Some(Token::Colon) => {
                self.bump()?;
                // `name: { ... }` is an accepted message form
                if matches!(self.peek(), Some(Token::LBrace)) {
                    self.bump()?;
                    let message = self.parse_fields(true)?;
                    Ok(Field {
                        name,
                        value: Value::Message(message),
                    })
                } else {
                    let scalar = self.parse_scalar()?;
                    Ok(Field {
                        name,
                        value: Value::Scalar(scalar),
                    })
                }
            }
            _ => Err(self.error_here(format!("expected ':' or '{{' after field '{}'", name))),
        }
    }

    fn parse_scalar(&mut self) -> Result<Scalar, Error> {
        match self.bump()? {
            Some((Token::Str(text), _)) => {
                // adjacent string literals concatenate
                let mut text = text;
                while matches!(self.peek(), Some(Token::Str(_))) {
                    if let Some((Token::Str(more), _)) = self.bump()? {
                        text.push_str(&more);
                    }
                }
                Ok(Scalar::Str(text))
            }
            Some((Token::Int(value), _)) => Ok(Scalar::Int(value)),
            Some((Token::Float(value), _)) => Ok(Scalar::Float(value)),
            Some((Token::Ident(ident), _)) => match ident.as_str() {
                "true" => Ok(Scalar::Bool(true)),
                "false" => Ok(Scalar::Bool(false)),
                _ => Ok(Scalar::Enum(ident)),
            },
            Some((token, pos)) => Err(Error::Parse {
                line: pos.line,
                column: pos.column,
                message: format!("expected a value, found {}", token.describe()),
            }),
            None => Err(self.error_here("expected a value, found end of input")),
        }
    }
}
