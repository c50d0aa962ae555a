//! Recursive-descent parser with one function per precedence level.

use crate::ast::{
    BinaryOperator, Expression, LogicalOperator, Program, Property, PropertyKey, UnaryOperator,
};
use crate::error::ParseError;
use crate::options::ParserOptions;
use crate::token::{Primitive, Token};

type Level<'a> = fn(&mut Parser<'a>) -> Result<Node, ParseError>;

/// Parses a token sequence into a [`Program`] with default options.
pub fn parse(tokens: &[Token]) -> Result<Program, ParseError> {
    Parser::new(tokens).parse()
}

/// An expression and the height of its tree; a leaf has height 1.
struct Node {
    expr: Expression,
    height: usize,
}

/// Cursor over an immutable token buffer.
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    options: ParserOptions,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser::with_options(tokens, ParserOptions::default())
    }

    pub fn with_options(tokens: &'a [Token], options: ParserOptions) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
            options,
        }
    }

    /// Parses the whole buffer. Every token must be consumed.
    pub fn parse(mut self) -> Result<Program, ParseError> {
        let mut body = vec![self.expression()?.expr];
        while self.eat(";") {
            while self.eat(";") {}
            if self.is_at_end() {
                break;
            }
            body.push(self.expression()?.expr);
        }

        if let Some(token) = self.peek() {
            return Err(ParseError::UnexpectedToken {
                text: token.text.clone(),
                pos: token.pos,
            });
        }
        tracing::trace!(expressions = body.len(), "parsed program");
        Ok(Program { body })
    }

    fn expression(&mut self) -> Result<Node, ParseError> {
        self.nested(Self::ternary)
    }

    fn ternary(&mut self) -> Result<Node, ParseError> {
        let test = self.logical_or()?;
        if !self.eat("?") {
            return Ok(test);
        }
        let consequent = self.expression()?;
        self.expect(":")?;
        let alternate = self.expression()?;
        let height = test.height.max(consequent.height).max(alternate.height);
        self.node(
            Expression::Conditional {
                test: Box::new(test.expr),
                consequent: Box::new(consequent.expr),
                alternate: Box::new(alternate.expr),
            },
            height,
        )
    }

    fn logical_or(&mut self) -> Result<Node, ParseError> {
        self.logical("||", LogicalOperator::Or, Self::logical_and)
    }

    fn logical_and(&mut self) -> Result<Node, ParseError> {
        self.logical("&&", LogicalOperator::And, Self::equality)
    }

    fn equality(&mut self) -> Result<Node, ParseError> {
        self.binary(&["==", "!=", "===", "!=="], Self::relational)
    }

    fn relational(&mut self) -> Result<Node, ParseError> {
        self.binary(&["<", ">", "<=", ">="], Self::additive)
    }

    fn additive(&mut self) -> Result<Node, ParseError> {
        self.binary(&["+", "-"], Self::multiplicative)
    }

    fn multiplicative(&mut self) -> Result<Node, ParseError> {
        self.binary(&["*", "/", "%"], Self::unary)
    }

    fn unary(&mut self) -> Result<Node, ParseError> {
        let operator = self
            .peek_punctuation()
            .and_then(UnaryOperator::from_token);
        match operator {
            Some(operator) => {
                self.pos += 1;
                let argument = self.nested(Self::unary)?;
                self.node(
                    Expression::Unary {
                        operator,
                        argument: Box::new(argument.expr),
                    },
                    argument.height,
                )
            }
            None => self.postfix(),
        }
    }

    fn postfix(&mut self) -> Result<Node, ParseError> {
        let mut node = self.primary()?;
        loop {
            node = if self.eat(".") {
                let name = self.member_name()?;
                self.node(
                    Expression::Member {
                        object: Box::new(node.expr),
                        property: Box::new(Expression::Identifier(name)),
                        computed: false,
                    },
                    node.height,
                )?
            } else if self.eat("[") {
                let property = self.expression()?;
                self.expect("]")?;
                self.node(
                    Expression::Member {
                        object: Box::new(node.expr),
                        property: Box::new(property.expr),
                        computed: true,
                    },
                    node.height.max(property.height),
                )?
            } else if self.eat("(") {
                let (arguments, height) = self.arguments()?;
                self.node(
                    Expression::Call {
                        callee: Box::new(node.expr),
                        arguments,
                    },
                    node.height.max(height),
                )?
            } else {
                return Ok(node);
            };
        }
    }

    fn primary(&mut self) -> Result<Node, ParseError> {
        if self.eat("(") {
            let node = self.expression()?;
            self.expect(")")?;
            return Ok(node);
        }
        if self.is("[") {
            return self.array();
        }
        if self.is("{") {
            return self.object();
        }

        let token = self.next().ok_or(ParseError::IncompleteExpression)?;
        if token.is_identifier {
            return Ok(leaf(Expression::Identifier(token.text.clone())));
        }
        match &token.value {
            Some(value) => Ok(leaf(Expression::Literal(value.clone()))),
            None => Err(ParseError::UnexpectedToken {
                text: token.text.clone(),
                pos: token.pos,
            }),
        }
    }

    /// `[a, , b, ]`: every comma not preceded by an element leaves a hole;
    /// a single comma before `]` adds nothing.
    fn array(&mut self) -> Result<Node, ParseError> {
        self.expect("[")?;
        let mut elements = Vec::new();
        let mut height = 0;
        loop {
            if self.is("]") {
                break;
            }
            if self.eat(",") {
                elements.push(None);
                continue;
            }
            let element = self.expression()?;
            height = height.max(element.height);
            elements.push(Some(element.expr));
            if self.is("]") {
                break;
            }
            self.expect(",")?;
        }
        self.expect("]")?;
        self.node(Expression::Array(elements), height)
    }

    fn object(&mut self) -> Result<Node, ParseError> {
        self.expect("{")?;
        let mut properties = Vec::new();
        let mut height = 0;
        loop {
            if self.is("}") {
                break;
            }
            let key = self.property_key()?;
            self.expect(":")?;
            let value = self.expression()?;
            height = height.max(value.height);
            properties.push(Property {
                key,
                value: value.expr,
            });
            if self.is("}") {
                break;
            }
            self.expect(",")?;
        }
        self.expect("}")?;
        self.node(Expression::Object(properties), height)
    }

    fn property_key(&mut self) -> Result<PropertyKey, ParseError> {
        let token = self.next().ok_or(ParseError::Expected {
            expected: "property key",
            found: None,
            pos: None,
        })?;
        if token.is_identifier || is_keyword(token) {
            return Ok(PropertyKey::Identifier(token.text.clone()));
        }
        match &token.value {
            Some(value @ (Primitive::String(_) | Primitive::Number(_))) => {
                Ok(PropertyKey::Literal(value.to_key()))
            }
            _ => Err(ParseError::Expected {
                expected: "property key",
                found: Some(token.text.clone()),
                pos: Some(token.pos),
            }),
        }
    }

    fn member_name(&mut self) -> Result<String, ParseError> {
        match self.next() {
            Some(token) if token.is_identifier || is_keyword(token) => Ok(token.text.clone()),
            Some(token) => Err(ParseError::Expected {
                expected: "identifier",
                found: Some(token.text.clone()),
                pos: Some(token.pos),
            }),
            None => Err(ParseError::Expected {
                expected: "identifier",
                found: None,
                pos: None,
            }),
        }
    }

    /// Arguments after an opening `(`, through the closing `)`, with the
    /// tallest argument's height.
    fn arguments(&mut self) -> Result<(Vec<Expression>, usize), ParseError> {
        let mut arguments = Vec::new();
        let mut height = 0;
        if self.eat(")") {
            return Ok((arguments, height));
        }
        loop {
            let argument = self.expression()?;
            height = height.max(argument.height);
            arguments.push(argument.expr);
            if !self.eat(",") {
                break;
            }
        }
        self.expect(")")?;
        Ok((arguments, height))
    }

    fn logical(
        &mut self,
        text: &str,
        operator: LogicalOperator,
        operand: Level<'a>,
    ) -> Result<Node, ParseError> {
        let mut left = operand(self)?;
        while self.eat(text) {
            let right = operand(self)?;
            let height = left.height.max(right.height);
            left = self.node(
                Expression::Logical {
                    operator,
                    left: Box::new(left.expr),
                    right: Box::new(right.expr),
                },
                height,
            )?;
        }
        Ok(left)
    }

    fn binary(&mut self, operators: &[&str], operand: Level<'a>) -> Result<Node, ParseError> {
        let mut left = operand(self)?;
        loop {
            let operator = self
                .peek_punctuation()
                .filter(|text| operators.contains(text))
                .and_then(BinaryOperator::from_token);
            let Some(operator) = operator else {
                return Ok(left);
            };
            self.pos += 1;
            let right = operand(self)?;
            let height = left.height.max(right.height);
            left = self.node(
                Expression::Binary {
                    operator,
                    left: Box::new(left.expr),
                    right: Box::new(right.expr),
                },
                height,
            )?;
        }
    }

    /// Wraps `expr` one level above its tallest child, enforcing
    /// `max_height`. Left-folded operator chains and postfix chains grow
    /// the tree without recursing here, so this is what keeps them bounded.
    fn node(&self, expr: Expression, children: usize) -> Result<Node, ParseError> {
        let height = children + 1;
        if height > self.options.max_height {
            return Err(ParseError::TooDeep {
                limit: self.options.max_height,
            });
        }
        Ok(Node { expr, height })
    }

    /// Runs `level` one nesting step deeper, enforcing `max_depth`.
    fn nested(&mut self, level: Level<'a>) -> Result<Node, ParseError> {
        if self.depth >= self.options.max_depth {
            return Err(ParseError::TooDeep {
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let result = level(self);
        self.depth -= 1;
        result
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Text of the next token if it is punctuation or an operator.
    fn peek_punctuation(&self) -> Option<&'a str> {
        self.peek()
            .filter(|t| !t.is_identifier && t.value.is_none())
            .map(|t| t.text.as_str())
    }

    fn is(&self, text: &str) -> bool {
        self.peek_punctuation() == Some(text)
    }

    fn eat(&mut self, text: &str) -> bool {
        if self.is(text) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &'static str) -> Result<(), ParseError> {
        if self.eat(expected) {
            return Ok(());
        }
        Err(ParseError::Expected {
            expected,
            found: self.peek().map(|t| t.text.clone()),
            pos: self.peek().map(|t| t.pos),
        })
    }
}

/// `true`, `false`, `null` and `undefined` are valid member and key names.
fn is_keyword(token: &Token) -> bool {
    !token.is_identifier && Primitive::from_keyword(&token.text).is_some()
}

fn leaf(expr: Expression) -> Node {
    Node { expr, height: 1 }
}
