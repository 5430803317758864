use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::{EngineError, Span};
use crate::lexer::{Token, TokenType};
use crate::value::Value;

/// Recursive-descent parser for a single expression. Diagnostics use the
/// `Unexpected token '…'` / `Unexpected end of input` vocabulary, which is
/// also the native engine's raw syntax-error surface.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    /// Parses the whole token stream as one expression; trailing tokens are
    /// a syntax error.
    pub fn parse_expression(&mut self) -> Result<Expr, EngineError> {
        if self.is_at_end() {
            return Err(EngineError::parse_error(
                self.peek().span.clone(),
                "Unexpected end of input".to_string(),
            ));
        }

        let expr = self.expression()?;

        if !self.is_at_end() {
            let token = self.peek();
            return Err(EngineError::parse_error(
                token.span.clone(),
                format!("Unexpected token '{}'", token.lexeme),
            ));
        }

        Ok(expr)
    }

    fn expression(&mut self) -> Result<Expr, EngineError> {
        self.equality()
    }

    fn equality(&mut self) -> Result<Expr, EngineError> {
        let mut expr = self.comparison()?;

        while self.match_types(&[TokenType::BangEqual, TokenType::EqualEqual]) {
            let operator = match self.previous().token_type {
                TokenType::BangEqual => BinaryOp::NotEqual,
                TokenType::EqualEqual => BinaryOp::Equal,
                _ => unreachable!(),
            };

            let start = expr.span().start;
            let right = self.comparison()?;
            let end = right.span().end;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span: Span::new(start, end),
            };
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, EngineError> {
        let mut expr = self.term()?;

        while self.match_types(&[
            TokenType::Greater,
            TokenType::GreaterEqual,
            TokenType::Less,
            TokenType::LessEqual,
        ]) {
            let operator = match self.previous().token_type {
                TokenType::Greater => BinaryOp::Greater,
                TokenType::GreaterEqual => BinaryOp::GreaterEqual,
                TokenType::Less => BinaryOp::Less,
                TokenType::LessEqual => BinaryOp::LessEqual,
                _ => unreachable!(),
            };

            let start = expr.span().start;
            let right = self.term()?;
            let end = right.span().end;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span: Span::new(start, end),
            };
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, EngineError> {
        let mut expr = self.factor()?;

        while self.match_types(&[TokenType::Minus, TokenType::Plus]) {
            let operator = match self.previous().token_type {
                TokenType::Minus => BinaryOp::Subtract,
                TokenType::Plus => BinaryOp::Add,
                _ => unreachable!(),
            };

            let start = expr.span().start;
            let right = self.factor()?;
            let end = right.span().end;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span: Span::new(start, end),
            };
        }

        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, EngineError> {
        let mut expr = self.unary()?;

        while self.match_types(&[TokenType::Slash, TokenType::Star, TokenType::Percent]) {
            let operator = match self.previous().token_type {
                TokenType::Slash => BinaryOp::Divide,
                TokenType::Star => BinaryOp::Multiply,
                TokenType::Percent => BinaryOp::Modulo,
                _ => unreachable!(),
            };

            let start = expr.span().start;
            let right = self.unary()?;
            let end = right.span().end;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span: Span::new(start, end),
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, EngineError> {
        if self.match_types(&[TokenType::Bang, TokenType::Minus]) {
            let operator = match self.previous().token_type {
                TokenType::Bang => UnaryOp::Not,
                TokenType::Minus => UnaryOp::Negate,
                _ => unreachable!(),
            };

            let start = self.previous().span.start;
            let right = self.unary()?;
            let end = right.span().end;

            return Ok(Expr::Unary {
                operator,
                operand: Box::new(right),
                span: Span::new(start, end),
            });
        }

        self.power()
    }

    // Exponentiation binds tighter than unary minus and is right-associative,
    // so `-2^2` is `-(2^2)` and `2^-2` parses.
    fn power(&mut self) -> Result<Expr, EngineError> {
        let expr = self.call()?;

        if self.match_types(&[TokenType::Power]) {
            let start = expr.span().start;
            let right = self.unary()?;
            let end = right.span().end;

            return Ok(Expr::Binary {
                left: Box::new(expr),
                operator: BinaryOp::Power,
                right: Box::new(right),
                span: Span::new(start, end),
            });
        }

        Ok(expr)
    }

    fn call(&mut self) -> Result<Expr, EngineError> {
        let expr = self.primary()?;

        if self.check(&TokenType::LeftParen) {
            if let Expr::Variable { name, span } = &expr {
                self.advance(); // consume the '('
                return self.finish_call(name.clone(), span.clone());
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, name: String, name_span: Span) -> Result<Expr, EngineError> {
        let mut args = Vec::new();

        if !self.check(&TokenType::RightParen) {
            loop {
                if self.is_at_end() {
                    return Err(EngineError::parse_error(
                        Span::single(self.peek().span.start),
                        "Unexpected end of input".to_string(),
                    ));
                }

                args.push(self.expression()?);

                if !self.match_types(&[TokenType::Comma]) {
                    break;
                }
            }
        }

        let closing = self.consume(TokenType::RightParen)?;

        Ok(Expr::Call {
            name,
            args,
            span: Span::new(name_span.start, closing.span.end),
        })
    }

    fn primary(&mut self) -> Result<Expr, EngineError> {
        if self.match_types(&[TokenType::Integer]) {
            let token = self.previous();
            let value = token.lexeme.parse::<i64>().map_err(|_| {
                EngineError::parse_error(
                    token.span.clone(),
                    format!("Unexpected token '{}'", token.lexeme),
                )
            })?;
            return Ok(Expr::Literal {
                value: Value::Int(value),
                span: self.previous().span.clone(),
            });
        }

        if self.match_types(&[TokenType::Float]) {
            let token = self.previous();
            let value = token.lexeme.parse::<f64>().map_err(|_| {
                EngineError::parse_error(
                    token.span.clone(),
                    format!("Unexpected token '{}'", token.lexeme),
                )
            })?;
            return Ok(Expr::Literal {
                value: Value::Float(value),
                span: self.previous().span.clone(),
            });
        }

        if self.match_types(&[TokenType::String]) {
            return Ok(Expr::Literal {
                value: Value::Str(self.previous().lexeme.clone()),
                span: self.previous().span.clone(),
            });
        }

        if self.match_types(&[TokenType::Identifier]) {
            return Ok(Expr::Variable {
                name: self.previous().lexeme.clone(),
                span: self.previous().span.clone(),
            });
        }

        if self.match_types(&[TokenType::LeftParen]) {
            let start = self.previous().span.start;
            let expr = self.expression()?;
            let closing = self.consume(TokenType::RightParen)?;

            return Ok(Expr::Grouping {
                expr: Box::new(expr),
                span: Span::new(start, closing.span.end),
            });
        }

        if self.match_types(&[TokenType::LeftBracket]) {
            let start = self.previous().span.start;
            let mut elements = Vec::new();

            if !self.check(&TokenType::RightBracket) {
                loop {
                    elements.push(self.expression()?);
                    if !self.match_types(&[TokenType::Comma]) {
                        break;
                    }
                }
            }

            let closing = self.consume(TokenType::RightBracket)?;

            return Ok(Expr::List {
                elements,
                span: Span::new(start, closing.span.end),
            });
        }

        let token = self.peek();
        if token.token_type == TokenType::Eof {
            Err(EngineError::parse_error(
                token.span.clone(),
                "Unexpected end of input".to_string(),
            ))
        } else {
            Err(EngineError::parse_error(
                token.span.clone(),
                format!("Unexpected token '{}'", token.lexeme),
            ))
        }
    }

    fn match_types(&mut self, types: &[TokenType]) -> bool {
        for token_type in types {
            if self.check(token_type) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, token_type: &TokenType) -> bool {
        if self.is_at_end() {
            false
        } else {
            &self.peek().token_type == token_type
        }
    }

    fn consume(&mut self, token_type: TokenType) -> Result<Token, EngineError> {
        if self.check(&token_type) {
            return Ok(self.advance());
        }

        let token = self.peek();
        if token.token_type == TokenType::Eof {
            Err(EngineError::parse_error(
                token.span.clone(),
                "Unexpected end of input".to_string(),
            ))
        } else {
            Err(EngineError::parse_error(
                token.span.clone(),
                format!("Unexpected token '{}'", token.lexeme),
            ))
        }
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous().clone()
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }
}

/// Convenience used by both engines: lex and parse one expression text.
pub fn parse_source(source: &str) -> Result<Expr, EngineError> {
    let mut lexer = crate::lexer::Lexer::new(source.to_string());
    let tokens = lexer.scan_tokens()?;
    let mut parser = Parser::new(tokens);
    parser.parse_expression()
}
