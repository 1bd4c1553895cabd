use std::fmt;

use crate::{ast::Token, diagnostics::ErrorListener};

/// Location in the source text.
///
/// `offset` and `column` count characters; `line` starts at 1, `column` at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Position {
            offset,
            line,
            column,
        }
    }

    /// Position of the first character.
    pub fn start() -> Self {
        Position::new(0, 1, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    token_start: Position,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 0,
            token_start: Position::start(),
        }
    }

    /// Where the token most recently returned by [`next_token`](Self::next_token) starts.
    pub fn token_start(&self) -> Position {
        self.token_start
    }

    fn here(&self) -> Position {
        Position::new(self.position, self.line, self.column)
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            if ch == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
            self.position += 1;
        }
    }

    fn text_since(&self, start: Position) -> String {
        self.input[start.offset..self.position].iter().collect()
    }

    /// Skips whitespace and `/* ... */` comments.
    fn skip_trivia(&mut self, listener: &mut dyn ErrorListener) {
        loop {
            while let Some(ch) = self.current_char() {
                if ch.is_whitespace() {
                    self.advance();
                } else {
                    break;
                }
            }

            if self.current_char() == Some('/') && self.peek_char(1) == Some('*') {
                let start = self.here();
                self.advance();
                self.advance();
                loop {
                    match self.current_char() {
                        None => {
                            listener.syntax_error(start, "unterminated comment".to_string());
                            return;
                        }
                        Some('*') if self.peek_char(1) == Some('/') => {
                            self.advance();
                            self.advance();
                            break;
                        }
                        Some(_) => self.advance(),
                    }
                }
            } else {
                return;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_hex4(&mut self) -> Option<u32> {
        let mut code = 0;
        for _ in 0..4 {
            let digit = self.current_char()?.to_digit(16)?;
            code = code * 16 + digit;
            self.advance();
        }
        Some(code)
    }

    /// Reads the code point of a `\u` escape; the `\u` is already consumed.
    fn read_unicode_escape(&mut self) -> Option<char> {
        let high = self.read_hex4()?;
        if (0xD800..0xDC00).contains(&high) {
            if self.current_char() == Some('\\') && self.peek_char(1) == Some('u') {
                self.advance();
                self.advance();
                let low = self.read_hex4()?;
                if (0xDC00..0xE000).contains(&low) {
                    return char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00));
                }
            }
            return None;
        }
        char::from_u32(high)
    }

    fn read_string(&mut self, quote: char, listener: &mut dyn ErrorListener) -> Token {
        let start = self.here();
        let mut result = String::new();
        self.advance(); // Consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Token::String(result);
                }
                '\\' => {
                    let escape_at = self.here();
                    self.advance(); // Consume backslash
                    let Some(escaped) = self.current_char() else {
                        break;
                    };
                    self.advance();
                    match escaped {
                        'n' => result.push('\n'),
                        't' => result.push('\t'),
                        'r' => result.push('\r'),
                        'b' => result.push('\u{0008}'),
                        'f' => result.push('\u{000C}'),
                        '"' | '\'' | '\\' | '/' => result.push(escaped),
                        'u' => match self.read_unicode_escape() {
                            Some(c) => result.push(c),
                            None => {
                                listener.syntax_error(
                                    escape_at,
                                    "invalid unicode escape sequence".to_string(),
                                );
                                result.push(char::REPLACEMENT_CHARACTER);
                            }
                        },
                        other => {
                            listener.syntax_error(
                                escape_at,
                                format!("invalid escape sequence '\\{}'", other),
                            );
                            result.push(other);
                        }
                    }
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        let text = self.text_since(start);
        listener.syntax_error(start, format!("unterminated string literal {}", text));
        Token::Error(text)
    }

    fn read_backtick_name(&mut self, listener: &mut dyn ErrorListener) -> Token {
        let start = self.here();
        let mut name = String::new();
        self.advance(); // Consume opening backtick

        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == '`' {
                return Token::Name(name);
            }
            name.push(ch);
        }

        let text = self.text_since(start);
        listener.syntax_error(start, format!("unterminated quoted name {}", text));
        Token::Error(text)
    }

    fn read_number(&mut self, listener: &mut dyn ErrorListener) -> Token {
        let start = self.here();
        let mut number = String::new();
        let mut is_float = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if matches!(self.current_char(), Some('e' | 'E')) {
            let digits_at = match self.peek_char(1) {
                Some('+' | '-') => 2,
                _ => 1,
            };
            if self.peek_char(digits_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                for _ in 0..digits_at {
                    number.extend(self.current_char());
                    self.advance();
                }
                while let Some(ch) = self.current_char().filter(|c| c.is_ascii_digit()) {
                    number.push(ch);
                    self.advance();
                }
            }
        }

        if !is_float && let Ok(n) = number.parse::<i64>() {
            return Token::Integer(n);
        }
        match number.parse::<f64>() {
            Ok(n) if n.is_finite() => Token::Float(n),
            _ => {
                listener.syntax_error(start, format!("number out of range '{}'", number));
                Token::Error(number)
            }
        }
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    fn double(&mut self, token: Token) -> Token {
        self.advance();
        self.advance();
        token
    }

    fn unrecognized(&mut self, listener: &mut dyn ErrorListener) -> Token {
        let start = self.here();
        self.advance();
        let text = self.text_since(start);
        listener.syntax_error(start, format!("token recognition error at: '{}'", text));
        Token::Error(text)
    }

    /// Returns the next token. Malformed input is reported to `listener` and
    /// comes back as [`Token::Error`]; the lexer always makes progress.
    pub fn next_token(&mut self, listener: &mut dyn ErrorListener) -> Token {
        self.skip_trivia(listener);
        self.token_start = self.here();

        match self.current_char() {
            None => Token::Eof,
            Some('$') => match self.peek_char(1) {
                Some('$') => self.double(Token::DollarDollar),
                Some(c) if c.is_alphabetic() || c == '_' => {
                    self.advance();
                    Token::Variable(self.read_identifier())
                }
                _ => self.single(Token::Dollar),
            },
            Some('~') => {
                if self.peek_char(1) == Some('>') {
                    self.double(Token::Chain)
                } else {
                    self.unrecognized(listener)
                }
            }
            Some('!') => {
                if self.peek_char(1) == Some('=') {
                    self.double(Token::NotEq)
                } else {
                    self.unrecognized(listener)
                }
            }
            Some(':') => {
                if self.peek_char(1) == Some('=') {
                    self.double(Token::ColonEqual)
                } else {
                    self.single(Token::Colon)
                }
            }
            Some('<') => {
                if self.peek_char(1) == Some('=') {
                    self.double(Token::LtEq)
                } else {
                    self.single(Token::Lt)
                }
            }
            Some('>') => {
                if self.peek_char(1) == Some('=') {
                    self.double(Token::GtEq)
                } else {
                    self.single(Token::Gt)
                }
            }
            Some('*') => {
                if self.peek_char(1) == Some('*') {
                    self.double(Token::StarStar)
                } else {
                    self.single(Token::Star)
                }
            }
            Some('.') => {
                if self.peek_char(1) == Some('.') {
                    self.double(Token::DotDot)
                } else {
                    self.single(Token::Dot)
                }
            }
            Some('=') => self.single(Token::Eq),
            Some('&') => self.single(Token::Ampersand),
            Some('+') => self.single(Token::Plus),
            Some('-') => self.single(Token::Minus),
            Some('/') => self.single(Token::Slash),
            Some('%') => self.single(Token::Percent),
            Some('?') => self.single(Token::Question),
            Some(',') => self.single(Token::Comma),
            Some(';') => self.single(Token::Semicolon),
            Some('(') => self.single(Token::LParen),
            Some(')') => self.single(Token::RParen),
            Some('[') => self.single(Token::LBracket),
            Some(']') => self.single(Token::RBracket),
            Some('{') => self.single(Token::LBrace),
            Some('}') => self.single(Token::RBrace),
            Some('"') => self.read_string('"', listener),
            Some('\'') => self.read_string('\'', listener),
            Some('`') => self.read_backtick_name(listener),
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();

                match ident.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "in" => Token::In,
                    "true" => Token::Boolean(true),
                    "false" => Token::Boolean(false),
                    "null" => Token::Null,
                    "function" => Token::Function,
                    _ => Token::Name(ident),
                }
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number(listener),
            Some(_) => self.unrecognized(listener),
        }
    }
}
