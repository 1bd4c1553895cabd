use crate::{
    ast::{BinOp, Expr, Node, Step, Token, UnaryOp},
    diagnostics::ErrorListener,
    lexer::{Lexer, Position},
};
use std::mem;
use tracing::trace;

/// How deeply sub-expressions may nest before the parser gives up.
pub const MAX_NESTING: usize = 100;

/// Recursive-descent parser.
///
/// Problems are reported to the listener and recovered from; the parser
/// always produces a tree, with [`Expr::Error`] nodes where it had to give up
/// on a construct.
pub struct Parser<'l> {
    lexer: Lexer,
    current_token: Token,
    current_pos: Position,
    listener: &'l mut dyn ErrorListener,
    nesting: usize,
    abandoned: bool,
}

/// Tokenizes and parses `text`, reporting every problem to `listener`.
pub fn tokenize_and_parse(text: &str, listener: &mut dyn ErrorListener) -> Node {
    Parser::new(Lexer::new(text), listener).parse()
}

impl<'l> Parser<'l> {
    pub fn new(mut lexer: Lexer, listener: &'l mut dyn ErrorListener) -> Self {
        let current_token = lexer.next_token(&mut *listener);
        let current_pos = lexer.token_start();
        Parser {
            lexer,
            current_token,
            current_pos,
            listener,
            nesting: 0,
            abandoned: false,
        }
    }

    fn advance(&mut self) {
        self.current_token = self.lexer.next_token(&mut *self.listener);
        self.current_pos = self.lexer.token_start();
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    fn report(&mut self, position: Position, message: String) {
        if self.abandoned {
            return;
        }
        trace!(line = position.line, column = position.column, "{}", message);
        self.listener.syntax_error(position, message);
    }

    /// Consumes `expected` or reports it missing. Nothing is consumed on failure.
    fn expect(&mut self, expected: Token, what: &str) -> bool {
        if self.check(&expected) {
            self.advance();
            return true;
        }
        let message = format!("mismatched input '{}' expecting {}", self.current_token, what);
        self.report(self.current_pos, message);
        false
    }

    /// Runs `parse` one nesting level deeper, or stops parsing altogether
    /// once [`MAX_NESTING`] is reached.
    fn nested(&mut self, parse: impl FnOnce(&mut Self) -> Node) -> Node {
        if self.nesting >= MAX_NESTING {
            return self.abandon();
        }
        self.nesting += 1;
        let node = parse(self);
        self.nesting -= 1;
        node
    }

    /// Reports the nesting error once. The rest of the input is never read
    /// and nothing after this point is reported.
    fn abandon(&mut self) -> Node {
        let pos = self.current_pos;
        self.report(pos, "expression nested too deeply".to_string());
        self.abandoned = true;
        let token = mem::replace(&mut self.current_token, Token::Eof);
        Node::new(Expr::Error(token), pos)
    }

    fn binary(op: BinOp, left: Node, right: Node) -> Node {
        let pos = left.pos;
        Node::new(
            Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            pos,
        )
    }

    /// Parse primary expressions: literals, names, references, calls,
    /// blocks, constructors and lambdas
    fn parse_primary(&mut self) -> Node {
        let pos = self.current_pos;
        let expr = match mem::replace(&mut self.current_token, Token::Eof) {
            // Literals
            Token::Float(n) => {
                self.advance();
                Expr::Float(n)
            }
            Token::Integer(n) => {
                self.advance();
                Expr::Integer(n)
            }
            Token::String(s) => {
                self.advance();
                Expr::String(s)
            }
            Token::Boolean(b) => {
                self.advance();
                Expr::Boolean(b)
            }
            Token::Null => {
                self.advance();
                Expr::Null
            }

            // Navigation
            Token::Name(name) => {
                self.advance();
                Expr::Name(name)
            }
            Token::Star => {
                self.advance();
                Expr::Wildcard
            }
            Token::StarStar => {
                self.advance();
                Expr::Descendants
            }

            // References
            Token::Dollar => {
                self.advance();
                Expr::Context
            }
            Token::DollarDollar => {
                self.advance();
                Expr::Root
            }
            Token::Variable(name) => {
                self.advance();
                if self.check(&Token::LParen) {
                    self.advance();
                    let args = self.parse_list(Token::RParen, "')'", Self::parse_expression);
                    Expr::Call { name, args }
                } else {
                    Expr::Variable(name)
                }
            }

            Token::LParen => {
                self.advance();
                return self.parse_body(pos, Token::RParen, "')'");
            }
            Token::LBracket => {
                self.advance();
                Expr::Array(self.parse_list(Token::RBracket, "']'", Self::parse_array_entry))
            }
            Token::LBrace => {
                self.advance();
                self.parse_object()
            }
            Token::Function => {
                self.advance();
                self.parse_lambda()
            }

            // Already reported by the lexer
            Token::Error(text) => {
                self.advance();
                Expr::Error(Token::Error(text))
            }

            token => {
                self.report(pos, format!("mismatched input '{}' expecting an expression", token));
                if token != Token::Eof {
                    self.advance();
                }
                Expr::Error(token)
            }
        };
        Node::new(expr, pos)
    }

    /// Comma separated entries up to `close`, which is consumed.
    fn parse_list(
        &mut self,
        close: Token,
        what: &str,
        mut entry: impl FnMut(&mut Self) -> Node,
    ) -> Vec<Node> {
        let mut items = vec![];
        if self.check(&close) {
            self.advance();
            return items;
        }

        loop {
            items.push(entry(self));
            if self.check(&Token::Comma) {
                self.advance();
                continue;
            }
            self.expect(close, what);
            break;
        }
        items
    }

    fn parse_array_entry(&mut self) -> Node {
        let from = self.parse_expression();
        if !self.check(&Token::DotDot) {
            return from;
        }
        self.advance();
        let to = self.parse_expression();
        let pos = from.pos;
        Node::new(
            Expr::Range {
                from: Box::new(from),
                to: Box::new(to),
            },
            pos,
        )
    }

    fn parse_object(&mut self) -> Expr {
        let mut pairs = vec![];

        if self.check(&Token::RBrace) {
            self.advance();
            return Expr::Object(pairs);
        }

        loop {
            let key = self.parse_expression();
            if !self.expect(Token::Colon, "':'") {
                break;
            }
            let value = self.parse_expression();
            pairs.push((key, value));

            if self.check(&Token::Comma) {
                self.advance();
                continue;
            }
            self.expect(Token::RBrace, "'}'");
            break;
        }
        Expr::Object(pairs)
    }

    /// `;` separated expressions up to `close`. A single expression without
    /// a separator is returned as itself (grouping), anything else as a block.
    fn parse_body(&mut self, pos: Position, close: Token, what: &str) -> Node {
        let mut exprs = vec![];
        let mut separated = false;

        while !self.check(&close) && !self.check(&Token::Eof) {
            exprs.push(self.parse_expression());
            if self.check(&Token::Semicolon) {
                self.advance();
                separated = true;
            } else {
                break;
            }
        }
        self.expect(close, what);

        if exprs.len() == 1 && !separated {
            if let Some(inner) = exprs.pop() {
                return inner;
            }
        }
        Node::new(Expr::Block(exprs), pos)
    }

    fn parse_lambda(&mut self) -> Expr {
        let mut params = vec![];

        if self.expect(Token::LParen, "'('") && !self.check(&Token::RParen) {
            loop {
                match mem::replace(&mut self.current_token, Token::Eof) {
                    Token::Variable(name) => {
                        self.advance();
                        params.push(name);
                    }
                    token => {
                        self.current_token = token;
                        let message = format!(
                            "mismatched input '{}' expecting a parameter",
                            self.current_token
                        );
                        self.report(self.current_pos, message);
                        break;
                    }
                }
                if self.check(&Token::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(Token::RParen, "')'");

        let body_pos = self.current_pos;
        let body = if self.expect(Token::LBrace, "'{'") {
            self.parse_body(body_pos, Token::RBrace, "'}'")
        } else {
            Node::new(Expr::Error(Token::LBrace), body_pos)
        };

        Expr::Lambda {
            params,
            body: Box::new(body),
        }
    }

    /// Step after a `.`; quoted strings name members here.
    fn parse_step(&mut self) -> Node {
        if let Token::String(_) = self.current_token {
            let pos = self.current_pos;
            if let Token::String(name) = mem::replace(&mut self.current_token, Token::Eof) {
                self.advance();
                return Node::new(Expr::Name(name), pos);
            }
        }
        self.parse_primary()
    }

    /// Parse path expressions: `.` steps and `[...]` predicate stages
    fn parse_path(&mut self) -> Node {
        let first = self.parse_primary();
        let pos = first.pos;
        let mut steps = vec![Step {
            node: first,
            stages: vec![],
        }];

        loop {
            if self.check(&Token::Dot) {
                self.advance(); // consume '.'
                let node = self.parse_step();
                steps.push(Step {
                    node,
                    stages: vec![],
                });
            } else if self.check(&Token::LBracket) {
                let stage_pos = self.current_pos;
                self.advance(); // consume '['

                let stage = if self.check(&Token::RBracket) {
                    self.report(
                        self.current_pos,
                        "mismatched input ']' expecting an expression".to_string(),
                    );
                    Node::new(Expr::Error(Token::RBracket), stage_pos)
                } else {
                    self.parse_expression()
                };
                self.expect(Token::RBracket, "']'");

                if let Some(step) = steps.last_mut() {
                    step.stages.push(stage);
                }
            } else {
                break;
            }
        }

        if steps.len() == 1 && steps[0].stages.is_empty() && !steps[0].node.expr.is_navigation() {
            if let Some(step) = steps.pop() {
                return step.node;
            }
        }
        Node::new(Expr::Path(steps), pos)
    }

    fn parse_unary(&mut self) -> Node {
        if self.check(&Token::Minus) {
            let pos = self.current_pos;
            self.advance();
            let operand = self.nested(Self::parse_unary); // Right-associative
            return Node::new(
                Expr::UnaryOp {
                    op: UnaryOp::Negate,
                    operand: Box::new(operand),
                },
                pos,
            );
        }
        self.parse_path()
    }

    fn parse_multiplicative(&mut self) -> Node {
        let mut left = self.parse_unary();

        loop {
            let op = match &self.current_token {
                Token::Star => BinOp::Multiply,
                Token::Slash => BinOp::Divide,
                Token::Percent => BinOp::Modulo,
                _ => break,
            };

            self.advance();
            let right = self.parse_unary();
            left = Self::binary(op, left, right);
        }
        left
    }

    fn parse_additive(&mut self) -> Node {
        let mut left = self.parse_multiplicative();

        loop {
            let op = match &self.current_token {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Subtract,
                Token::Ampersand => BinOp::Concat,
                _ => break,
            };

            self.advance();
            let right = self.parse_multiplicative();
            left = Self::binary(op, left, right);
        }
        left
    }

    /// Comparisons, membership and function chaining share one level.
    fn parse_comparison(&mut self) -> Node {
        let mut left = self.parse_additive();

        loop {
            let op = match &self.current_token {
                Token::Eq => Some(BinOp::Equal),
                Token::NotEq => Some(BinOp::NotEqual),
                Token::Lt => Some(BinOp::LessThan),
                Token::Gt => Some(BinOp::GreaterThan),
                Token::LtEq => Some(BinOp::LessEqual),
                Token::GtEq => Some(BinOp::GreaterEqual),
                Token::In => Some(BinOp::In),
                Token::Chain => None,
                _ => break,
            };

            self.advance();
            let right = self.parse_additive();

            left = match op {
                Some(op) => Self::binary(op, left, right),
                None => {
                    let pos = left.pos;
                    Node::new(
                        Expr::Chain {
                            left: Box::new(left),
                            right: Box::new(right),
                        },
                        pos,
                    )
                }
            };
        }
        left
    }

    fn parse_and(&mut self) -> Node {
        let mut left = self.parse_comparison();

        while self.check(&Token::And) {
            self.advance();
            let right = self.parse_comparison();
            left = Self::binary(BinOp::And, left, right);
        }
        left
    }

    fn parse_or(&mut self) -> Node {
        let mut left = self.parse_and();

        while self.check(&Token::Or) {
            self.advance();
            let right = self.parse_and();
            left = Self::binary(BinOp::Or, left, right);
        }
        left
    }

    fn parse_conditional(&mut self) -> Node {
        let condition = self.parse_or();
        if !self.check(&Token::Question) {
            return condition;
        }
        self.advance();

        let then = self.nested(Self::parse_conditional);
        let otherwise = if self.check(&Token::Colon) {
            self.advance();
            Some(Box::new(self.nested(Self::parse_conditional)))
        } else {
            None
        };

        let pos = condition.pos;
        Node::new(
            Expr::Conditional {
                condition: Box::new(condition),
                then: Box::new(then),
                otherwise,
            },
            pos,
        )
    }

    fn parse_assignment(&mut self) -> Node {
        let target = self.parse_conditional();
        if !self.check(&Token::ColonEqual) {
            return target;
        }
        let op_pos = self.current_pos;
        self.advance();
        let value = self.nested(Self::parse_assignment);

        match target.expr {
            Expr::Variable(name) => Node::new(
                Expr::Assign {
                    name,
                    value: Box::new(value),
                },
                target.pos,
            ),
            _ => {
                self.report(
                    op_pos,
                    "the left side of ':=' must be a variable".to_string(),
                );
                Node::new(Expr::Error(Token::ColonEqual), op_pos)
            }
        }
    }

    pub fn parse_expression(&mut self) -> Node {
        self.nested(Self::parse_assignment)
    }

    /// Parses a complete expression. Trailing input is reported once and skipped.
    pub fn parse(&mut self) -> Node {
        let node = self.parse_expression();

        if !self.check(&Token::Eof) {
            if !matches!(self.current_token, Token::Error(_)) {
                let message = format!("extraneous input '{}' expecting <EOF>", self.current_token);
                self.report(self.current_pos, message);
            }
            while !self.check(&Token::Eof) {
                self.advance();
            }
        }
        node
    }
}
