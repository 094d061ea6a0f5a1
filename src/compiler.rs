use crate::chunk::Chunk;
use crate::config::{Binding, Recovery};
use crate::error::{CompileError, Diagnostic, Location};
use crate::opcode::OpCode;
use crate::tokenizer::{Token, TokenKind, Tokenizer};
use crate::value::Value;
use log::debug;
use rules::{rule, Infix, Precedence, Prefix};

mod rules;

/// Single pass compiler: pulls tokens and emits bytecode straight into a chunk,
/// no syntax tree is built in between.
#[derive(Debug)]
pub struct Compiler<'a> {
    tokenizer: Tokenizer<'a>,
    previous: Token<'a>,
    current: Token<'a>,
    chunk: Chunk,
    recovery: Recovery,
    binding: Binding,
    diagnostics: Vec<Diagnostic>,
    had_error: bool,
    // Suppresses cascading diagnostics after a syntax error
    panic_mode: bool,
}

/// Compiles with the default configuration.
pub fn compile(source: &str) -> Result<Chunk, CompileError> {
    Compiler::new(source, Recovery::default()).compile()
}

impl<'a> Compiler<'a> {
    pub fn new(source: &'a str, recovery: Recovery) -> Self {
        let start = Token::new(TokenKind::Eof, "", 1);

        Self {
            tokenizer: Tokenizer::new(source),
            previous: start,
            current: start,
            chunk: Chunk::new(),
            recovery,
            binding: Binding::default(),
            diagnostics: Vec::new(),
            had_error: false,
            panic_mode: false,
        }
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = binding;
        self
    }

    pub fn compile(mut self) -> Result<Chunk, CompileError> {
        // Loads the first token in current, skipping blank lines
        self.advance();
        while self.current.is_kind(TokenKind::Newline) {
            self.advance();
        }

        while !self.match_kind(TokenKind::Eof) {
            self.declaration();
        }

        // The value of the last expression statement becomes the result of the program
        if self.chunk.last_code() == Some(OpCode::Pop) {
            self.chunk.patch_last(OpCode::Return);
        }

        if self.had_error {
            debug!("compilation failed with {} error(s)", self.diagnostics.len());
            return Err(CompileError {
                diagnostics: self.diagnostics,
            });
        }

        debug!(
            "compiled {} bytes, {} constants",
            self.chunk.len(),
            self.chunk.constants_len()
        );
        Ok(self.chunk)
    }

    // declarations: only statements for now
    fn declaration(&mut self) {
        self.statement();

        if self.panic_mode && self.recovery == Recovery::Statement {
            self.synchronize();
        }
    }

    fn statement(&mut self) {
        if self.match_kind(TokenKind::Return) {
            self.return_statement();
        } else {
            self.expression_statement();
        }
    }

    fn return_statement(&mut self) {
        if self.match_kind(TokenKind::Newline) {
            self.emit_return();
            return;
        }

        if self.check(TokenKind::Semicolon)
            || self.check(TokenKind::RightBrace)
            || self.check(TokenKind::Eof)
        {
            self.emit_return();
            self.expect_terminator();
            return;
        }

        // `return fn ...` ends with a brace, no separator needed
        let needs_terminator = !self.check(TokenKind::Fn);

        self.expression();
        self.emit_op_code(OpCode::Return);

        if needs_terminator {
            self.expect_terminator();
        }
    }

    // Evaluates the expression and throws away the result
    fn expression_statement(&mut self) {
        self.expression();
        self.emit_op_code(OpCode::Pop);
        self.expect_terminator();
    }

    fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment);
    }

    fn parse_precedence(&mut self, precedence: Precedence) {
        self.advance();

        // prefix / nud position
        let Some(prefix) = rule(self.previous.kind()).prefix else {
            self.error("Expect expression.");
            return;
        };

        let can_assign = precedence < Precedence::Assignment;
        self.prefix(prefix);

        while self.absorbs(precedence, rule(self.current.kind()).precedence) {
            self.advance();
            if let Some(infix) = rule(self.previous.kind()).infix {
                self.infix(infix);
            }
        }

        if can_assign && self.match_kind(TokenKind::Equal) {
            self.error("Invalid assignment target.");
            // Still parse the value so errors inside it get reported
            self.expression();
        }
    }

    fn absorbs(&self, precedence: Precedence, level: Precedence) -> bool {
        match self.binding {
            Binding::Strict => precedence < level,
            Binding::Inclusive => precedence <= level,
        }
    }

    fn prefix(&mut self, prefix: Prefix) {
        match prefix {
            Prefix::Grouping => self.grouping(),
            Prefix::Number => self.number(),
            Prefix::String => self.string(),
            Prefix::Literal(code) => self.emit_op_code(code),
            Prefix::Unary(code) => self.unary(code),
        }
    }

    fn infix(&mut self, infix: Infix) {
        match infix {
            Infix::Binary(code) => self.binary(code),
        }
    }

    fn grouping(&mut self) {
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after expression.");
    }

    fn number(&mut self) {
        match self.previous.lexeme().parse::<f64>() {
            Ok(it) => self.emit_constant(Value::Number(it)),
            Err(_) => self.error("Invalid number literal."),
        }
    }

    fn string(&mut self) {
        // Drop the quotes, escapes are taken literally
        let mut chars = self.previous.lexeme().chars();
        chars.next();
        chars.next_back();

        self.emit_constant(Value::from(chars.as_str()));
    }

    fn unary(&mut self, code: OpCode) {
        self.parse_precedence(Precedence::Unary);
        self.emit_op_code(code);
    }

    fn binary(&mut self, code: OpCode) {
        let rule = rule(self.previous.kind());

        self.parse_precedence(rule.operand_precedence());
        self.emit_op_code(code);
    }

    fn emit_op_code(&mut self, code: OpCode) {
        self.chunk.write_code(code, self.previous.line());
    }

    fn emit_constant(&mut self, value: Value) {
        if let Err(err) = self.chunk.write_constant(value, self.previous.line()) {
            self.error(&err.to_string());
        }
    }

    fn emit_return(&mut self) {
        self.emit_op_code(OpCode::Nil);
        self.emit_op_code(OpCode::Return);
    }

    fn expect_terminator(&mut self) {
        // All newlines after a '}' were already consumed
        if self.previous.is_kind(TokenKind::RightBrace) {
            return;
        }

        if self.current.is_kind(TokenKind::RightBrace) {
            return;
        }

        if self.previous.is_kind(TokenKind::Eof) || self.current.is_kind(TokenKind::Eof) {
            return;
        }

        if !self.match_kind(TokenKind::Semicolon) {
            self.consume(TokenKind::Newline, "Expect newline or ';'.");
        }
    }

    fn advance(&mut self) {
        self.previous = self.current;
        self.current = self.next_valid_token();
        self.skip_newlines();
    }

    // Reports error tokens and returns the first proper one
    fn next_valid_token(&mut self) -> Token<'a> {
        loop {
            let token = self.tokenizer.next_token();
            if !token.is_kind(TokenKind::Error) {
                return token;
            }
            self.error_at(token, token.lexeme());
        }
    }

    // Line breaks carry no meaning after these tokens
    fn skip_newlines(&mut self) {
        use TokenKind::*;

        if matches!(
            self.previous.kind(),
            Newline | LeftBrace | RightBrace | Semicolon | Dot
        ) {
            while self.current.is_kind(Newline) {
                self.current = self.next_valid_token();
            }
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        if kind == TokenKind::Newline && self.previous.is_kind(TokenKind::RightBrace) {
            return true;
        }

        self.current.is_kind(kind)
    }

    // if the current token is what is expected, consume it
    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if !self.check(kind) {
            return false;
        }

        self.advance();
        true
    }

    fn consume(&mut self, kind: TokenKind, message: &str) {
        if self.check(kind) {
            self.advance();
            return;
        }

        self.error_at_current(message);
    }

    // Skips tokens until the start of the next statement
    // Error tokens passed on the way stay suppressed
    fn synchronize(&mut self) {
        while !self.current.is_kind(TokenKind::Eof) {
            if matches!(
                self.previous.kind(),
                TokenKind::Newline | TokenKind::Semicolon | TokenKind::RightBrace
            ) {
                break;
            }

            if self.current.is_kind(TokenKind::Return) {
                break;
            }

            self.advance();
        }

        self.panic_mode = false;
    }

    fn error(&mut self, message: &str) {
        self.error_at(self.previous, message);
    }

    fn error_at_current(&mut self, message: &str) {
        self.error_at(self.current, message);
    }

    fn error_at(&mut self, token: Token<'a>, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.had_error = true;

        let location = match token.kind() {
            TokenKind::Eof => Location::End,
            TokenKind::Newline => Location::Newline,
            _ => Location::Lexeme(token.lexeme().to_string()),
        };

        let diagnostic = Diagnostic {
            line: token.line(),
            location,
            message: message.to_string(),
        };
        debug!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}
