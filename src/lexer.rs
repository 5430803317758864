use crate::error::{EngineError, Span};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    // Single-character tokens
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Comma,
    Minus,
    Plus,
    Slash,
    Star,
    Percent,

    // One or two character tokens
    Power,
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals
    Identifier,
    String,
    Integer,
    Float,

    // Special
    Eof,
}

/// Token with an owned lexeme; the whole line is short-lived so copying is
/// the simple choice.
#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: String, span: Span) -> Self {
        Self {
            token_type,
            lexeme,
            span,
        }
    }
}

pub struct Lexer {
    source: String,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
}

impl Lexer {
    pub fn new(source: String) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            start: 0,
            current: 0,
        }
    }

    pub fn scan_tokens(&mut self) -> Result<Vec<Token>, EngineError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }

        self.tokens.push(Token::new(
            TokenType::Eof,
            "".to_string(),
            Span::single(self.current),
        ));

        Ok(self.tokens.clone())
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn scan_token(&mut self) -> Result<(), EngineError> {
        let c = self.advance();

        match c {
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '[' => self.add_token(TokenType::LeftBracket),
            ']' => self.add_token(TokenType::RightBracket),
            ',' => self.add_token(TokenType::Comma),
            '-' => self.add_token(TokenType::Minus),
            '+' => self.add_token(TokenType::Plus),
            '/' => self.add_token(TokenType::Slash),
            '%' => self.add_token(TokenType::Percent),
            // `^` and `**` both scan to the exponentiation token.
            '^' => self.add_token(TokenType::Power),
            '*' => {
                let token_type = if self.match_char('*') {
                    TokenType::Power
                } else {
                    TokenType::Star
                };
                self.add_token(token_type);
            }
            '!' => {
                let token_type = if self.match_char('=') {
                    TokenType::BangEqual
                } else {
                    TokenType::Bang
                };
                self.add_token(token_type);
            }
            '=' => {
                let token_type = if self.match_char('=') {
                    TokenType::EqualEqual
                } else {
                    TokenType::Equal
                };
                self.add_token(token_type);
            }
            '<' => {
                let token_type = if self.match_char('=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                };
                self.add_token(token_type);
            }
            '>' => {
                let token_type = if self.match_char('=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                self.add_token(token_type);
            }
            ' ' | '\r' | '\t' => {
                // Ignore whitespace
            }
            '"' | '\'' => self.string(c)?,
            c if c.is_ascii_digit() => self.number()?,
            c if c.is_alphabetic() || c == '_' => self.identifier(),
            _ => {
                return Err(EngineError::lex_error(
                    Span::single(self.current - 1),
                    format!("Unexpected token '{}'", c),
                ));
            }
        }

        Ok(())
    }

    fn advance(&mut self) -> char {
        if self.current >= self.source.len() {
            return '\0';
        }

        let c = self.source[self.current..].chars().next().unwrap_or('\0');
        self.current += c.len_utf8();
        c
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    fn peek(&self) -> char {
        if self.current >= self.source.len() {
            return '\0';
        }
        self.source[self.current..].chars().next().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        let mut chars = self.source[self.current..].chars();
        chars.next();
        chars.next().unwrap_or('\0')
    }

    fn string(&mut self, quote: char) -> Result<(), EngineError> {
        while self.peek() != quote && !self.is_at_end() {
            self.advance();
        }

        if self.is_at_end() {
            return Err(EngineError::lex_error(
                Span::new(self.start, self.current),
                "Unterminated string".to_string(),
            ));
        }

        // Consume the closing quote
        self.advance();

        // The string value is the slice between the quotes
        let start_content = self.start + 1;
        let end_content = self.current - 1;
        let string_slice = &self.source[start_content..end_content];

        self.add_token_with_content(TokenType::String, string_slice.to_string());
        Ok(())
    }

    fn number(&mut self) -> Result<(), EngineError> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        let mut is_float = false;

        // Look for fractional part
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            is_float = true;
            // Consume the "."
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let number_slice = &self.source[self.start..self.current];

        if is_float {
            if number_slice.parse::<f64>().is_err() {
                return Err(EngineError::lex_error(
                    Span::new(self.start, self.current),
                    format!("Invalid number: {}", number_slice),
                ));
            }
            self.add_token_with_content(TokenType::Float, number_slice.to_string());
        } else {
            if number_slice.parse::<i64>().is_err() {
                return Err(EngineError::lex_error(
                    Span::new(self.start, self.current),
                    format!("Invalid number: {}", number_slice),
                ));
            }
            self.add_token_with_content(TokenType::Integer, number_slice.to_string());
        }

        Ok(())
    }

    fn identifier(&mut self) {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        self.add_token(TokenType::Identifier);
    }

    fn add_token(&mut self, token_type: TokenType) {
        let text = &self.source[self.start..self.current];
        self.add_token_with_content(token_type, text.to_string());
    }

    fn add_token_with_content(&mut self, token_type: TokenType, lexeme: String) {
        self.tokens.push(Token::new(
            token_type,
            lexeme,
            Span::new(self.start, self.current),
        ));
    }
}
