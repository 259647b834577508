use crate::{common::*, error::Error};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    LBrace,
    RBrace,
    Colon,
    Comma,
    Semi,
}

impl Token {
    pub fn describe(&self) -> String {
        match self {
            Self::Ident(name) => format!("identifier '{}'", name),
            Self::Str(_) => "a string literal".into(),
            Self::Int(_) | Self::Float(_) => "a number".into(),
            Self::LBrace => "'{'".into(),
            Self::RBrace => "'}'".into(),
            Self::Colon => "':'".into(),
            Self::Comma => "','".into(),
            Self::Semi => "';'".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    pub fn pos(&self) -> Pos {
        Pos {
            line: self.line,
            column: self.column,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn error(&self, pos: Pos, message: impl Into<String>) -> Error {
        Error::Parse {
            line: pos.line,
            column: pos.column,
            message: message.into(),
        }
    }

    pub fn next_token(&mut self) -> Result<Option<(Token, Pos)>, Error> {
        loop {
            match self.chars.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.bump();
                }
                Some('#') => {
                    while let Some(ch) = self.bump() {
                        if ch == '\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }

        let pos = self.pos();
        let ch = match self.chars.peek() {
            Some(&ch) => ch,
            None => return Ok(None),
        };

        let token = match ch {
            '{' => {
                self.bump();
                Token::LBrace
            }
            '}' => {
                self.bump();
                Token::RBrace
            }
            ':' => {
                self.bump();
                Token::Colon
            }
            ',' => {
                self.bump();
                Token::Comma
            }
            ';' => {
                self.bump();
                Token::Semi
            }
            '"' | '\'' => {
                self.bump();
                self.string(pos, ch)?
            }
            ch if ch.is_ascii_digit() || ch == '-' || ch == '+' || ch == '.' => self.number(pos)?,
            ch if ch.is_alphabetic() || ch == '_' => self.ident(),
            other => {
                return Err(self.error(pos, format!("unexpected character '{}'", other)));
            }
        };

        Ok(Some((token, pos)))
    }

    fn ident(&mut self) -> Token {
        let mut text = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                text.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        Token::Ident(text)
    }

    fn number(&mut self, pos: Pos) -> Result<Token, Error> {
        let mut text = String::new();
        let mut is_float = false;

        while let Some(&ch) = self.chars.peek() {
            match ch {
                '0'..='9' => {
                    text.push(ch);
                    self.bump();
                }
                '+' | '-' if text.is_empty() => {
                    text.push(ch);
                    self.bump();
                }
                '.' => {
                    is_float = true;
                    text.push(ch);
                    self.bump();
                }
                'e' | 'E' => {
                    is_float = true;
                    text.push(ch);
                    self.bump();
                    if let Some(&sign) = self.chars.peek() {
                        if sign == '+' || sign == '-' {
                            text.push(sign);
                            self.bump();
                        }
                    }
                }
                _ => break,
            }
        }

        if is_float {
            let value: f64 = text
                .parse()
                .map_err(|_| self.error(pos, format!("malformed number '{}'", text)))?;
            Ok(Token::Float(value))
        } else if let Ok(value) = text.parse::<i64>() {
            Ok(Token::Int(value))
        } else {
            // out-of-range integer literals degrade to float
            let value: f64 = text
                .parse()
                .map_err(|_| self.error(pos, format!("malformed number '{}'", text)))?;
            Ok(Token::Float(value))
        }
    }

    fn string(&mut self, pos: Pos, quote: char) -> Result<Token, Error> {
        let mut text = String::new();
        loop {
            let ch = self
                .bump()
                .ok_or_else(|| self.error(pos, "unterminated string literal"))?;
            if ch == quote {
                break;
            }
            match ch {
                '\\' => {
                    let escape = self
                        .bump()
                        .ok_or_else(|| self.error(pos, "unterminated string literal"))?;
                    let replacement = match escape {
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        '0' => '\0',
                        '\\' => '\\',
                        '"' => '"',
                        '\'' => '\'',
                        other => {
                            return Err(
                                self.error(pos, format!("unsupported escape '\\{}'", other))
                            );
                        }
                    };
                    text.push(replacement);
                }
                other => text.push(other),
            }
        }
        Ok(Token::Str(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(text);
        let mut tokens = vec![];
        while let Some((token, _)) = lexer.next_token().unwrap() {
            tokens.push(token);
        }
        tokens
    }

    #[test]
    fn punctuation_and_idents() {
        assert_eq!(
            tokens("item { id: 1 }"),
            vec![
                Token::Ident("item".into()),
                Token::LBrace,
                Token::Ident("id".into()),
                Token::Colon,
                Token::Int(1),
                Token::RBrace,
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            tokens("0 -7 0.25 -1.5e-3 1e5"),
            vec![
                Token::Int(0),
                Token::Int(-7),
                Token::Float(0.25),
                Token::Float(-1.5e-3),
                Token::Float(1e5),
            ]
        );
    }

    #[test]
    fn huge_integer_degrades_to_float() {
        assert_eq!(
            tokens("99999999999999999999"),
            vec![Token::Float(99999999999999999999.0)]
        );
    }

    #[test]
    fn strings_and_escapes() {
        assert_eq!(
            tokens(r#""plain" "a\"b" "tab\there" 'single'"#),
            vec![
                Token::Str("plain".into()),
                Token::Str("a\"b".into()),
                Token::Str("tab\there".into()),
                Token::Str("single".into()),
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            tokens("# leading\nid: 1 # trailing\n# last"),
            vec![Token::Ident("id".into()), Token::Colon, Token::Int(1)]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut lexer = Lexer::new("\"oops");
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn positions_track_lines() {
        let mut lexer = Lexer::new("a\n  b");
        let (_, pos) = lexer.next_token().unwrap().unwrap();
        assert_eq!(pos, Pos { line: 1, column: 1 });
        let (_, pos) = lexer.next_token().unwrap().unwrap();
        assert_eq!(pos, Pos { line: 2, column: 3 });
    }
}
