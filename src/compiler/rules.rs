use crate::opcode::OpCode;
use crate::tokenizer::TokenKind;

/// Operator precedence levels (higher = tighter binding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    None,
    Assignment, // =
    Equality,   // == !=
    Comparison, // < > <= >=
    Term,       // + -
    Factor,     // * / %
    Exponent,   // ^
    Unary,      // ! -
    Primary,
}

impl Precedence {
    pub fn next(self) -> Precedence {
        match self {
            Precedence::None => Precedence::Assignment,
            Precedence::Assignment => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Exponent,
            Precedence::Exponent => Precedence::Unary,
            Precedence::Unary => Precedence::Primary,
            Precedence::Primary => Precedence::Primary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    // Switch for `^` in the rule table
    #[allow(dead_code)]
    Right,
}

/// What to do when a token starts an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    Grouping,
    Number,
    String,
    Literal(OpCode),
    Unary(OpCode),
}

/// What to do when a token follows a complete left operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Infix {
    Binary(OpCode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseRule {
    pub prefix: Option<Prefix>,
    pub infix: Option<Infix>,
    pub precedence: Precedence,
    pub associativity: Associativity,
}

impl ParseRule {
    const NONE: ParseRule = ParseRule::prefix(None);

    const fn prefix(prefix: Option<Prefix>) -> Self {
        Self {
            prefix,
            infix: None,
            precedence: Precedence::None,
            associativity: Associativity::Left,
        }
    }

    const fn binary(prefix: Option<Prefix>, code: OpCode, precedence: Precedence) -> Self {
        Self {
            prefix,
            infix: Some(Infix::Binary(code)),
            precedence,
            associativity: Associativity::Left,
        }
    }

    /// The level the right operand of this operator is parsed at.
    pub fn operand_precedence(&self) -> Precedence {
        match self.associativity {
            Associativity::Left => self.precedence.next(),
            Associativity::Right => self.precedence,
        }
    }
}

pub fn rule(kind: TokenKind) -> ParseRule {
    use TokenKind::*;

    match kind {
        LeftParen => ParseRule::prefix(Some(Prefix::Grouping)),
        Minus => ParseRule::binary(
            Some(Prefix::Unary(OpCode::Negate)),
            OpCode::Subtract,
            Precedence::Term,
        ),
        Plus => ParseRule::binary(None, OpCode::Add, Precedence::Term),
        Slash => ParseRule::binary(None, OpCode::Divide, Precedence::Factor),
        Star => ParseRule::binary(None, OpCode::Multiply, Precedence::Factor),
        Percent => ParseRule::binary(None, OpCode::Reminder, Precedence::Factor),
        // Left associative: 2^3^2 is (2^3)^2
        Caret => ParseRule::binary(None, OpCode::Exponentiate, Precedence::Exponent),
        Bang => ParseRule::prefix(Some(Prefix::Unary(OpCode::Not))),
        BangEqual => ParseRule::binary(None, OpCode::NotEqual, Precedence::Equality),
        EqualEqual => ParseRule::binary(None, OpCode::Equal, Precedence::Equality),
        Greater => ParseRule::binary(None, OpCode::Greater, Precedence::Comparison),
        GreaterEqual => ParseRule::binary(None, OpCode::GreaterEqual, Precedence::Comparison),
        Less => ParseRule::binary(None, OpCode::Less, Precedence::Comparison),
        LessEqual => ParseRule::binary(None, OpCode::LessEqual, Precedence::Comparison),
        String => ParseRule::prefix(Some(Prefix::String)),
        Number => ParseRule::prefix(Some(Prefix::Number)),
        False => ParseRule::prefix(Some(Prefix::Literal(OpCode::False))),
        True => ParseRule::prefix(Some(Prefix::Literal(OpCode::True))),
        Nil => ParseRule::prefix(Some(Prefix::Literal(OpCode::Nil))),
        RightParen | LeftBrace | RightBrace | Comma | Dot | Semicolon | Equal | Identifier
        | Fn | Return | Newline | Error | Eof => ParseRule::NONE,
    }
}
