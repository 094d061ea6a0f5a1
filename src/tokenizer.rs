#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum TokenKind {
    // Single-character tokens.
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,
    Caret,
    Percent,
    // One or two character tokens.
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    // Literals.
    Identifier,
    String,
    Number,
    // Keywords.
    False,
    Fn,
    Nil,
    Return,
    True,

    Newline,
    Error,
    Eof,
}

/// A slice of the source tagged with its kind and line.
///
/// For `Error` tokens the lexeme is the message describing what went wrong.
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Token<'a> {
    kind: TokenKind,
    lexeme: &'a str,
    line: usize,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, lexeme: &'a str, line: usize) -> Self {
        Self { kind, lexeme, line }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn lexeme(&self) -> &'a str {
        self.lexeme
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn is_kind(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Pull based scanner, hands out one token at a time.
#[derive(Debug)]
pub struct Tokenizer<'a> {
    source: &'a str,
    start: usize,
    current: usize,
    line: usize,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            start: 0,
            current: 0,
            line: 1,
            finished: false,
        }
    }

    /// Scans everything up to and including the `Eof` token.
    pub fn tokenize(self) -> Vec<Token<'a>> {
        self.collect()
    }

    /// Returns the next token, `Eof` once the source is exhausted.
    pub fn next_token(&mut self) -> Token<'a> {
        use TokenKind::*;

        self.skip_whitespace();
        self.start = self.current;

        let Some(c) = self.advance() else {
            return Token::new(Eof, "", self.line);
        };

        match c {
            '\n' => {
                let token = self.make_token(Newline);
                self.line += 1;
                token
            }
            '(' => self.make_token(LeftParen),
            ')' => self.make_token(RightParen),
            '{' => self.make_token(LeftBrace),
            '}' => self.make_token(RightBrace),
            ';' => self.make_token(Semicolon),
            ',' => self.make_token(Comma),
            '.' => self.make_token(Dot),
            '-' => self.make_token(Minus),
            '+' => self.make_token(Plus),
            '/' => self.make_token(Slash),
            '*' => self.make_token(Star),
            '^' => self.make_token(Caret),
            '%' => self.make_token(Percent),

            '!' => self.make_double_token('=', BangEqual, Bang),
            '=' => self.make_double_token('=', EqualEqual, Equal),
            '<' => self.make_double_token('=', LessEqual, Less),
            '>' => self.make_double_token('=', GreaterEqual, Greater),

            '"' => self.string(),
            it if it.is_ascii_digit() => self.number(),
            it if it.is_ascii_alphabetic() || it == '_' => self.identifier(),
            _ => self.error_token("Unexpected character."),
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.current..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.current..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.current += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                // Comments run until the end of the line, the newline itself is a token
                '/' if self.peek_next() == Some('/') => {
                    while self.peek().is_some_and(|it| it != '\n') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token<'a> {
        Token::new(kind, &self.source[self.start..self.current], self.line)
    }

    fn make_double_token(&mut self, second: char, double: TokenKind, single: TokenKind) -> Token<'a> {
        if self.peek() == Some(second) {
            self.advance();
            self.make_token(double)
        } else {
            self.make_token(single)
        }
    }

    fn error_token(&self, message: &'static str) -> Token<'a> {
        Token::new(TokenKind::Error, message, self.line)
    }

    fn string(&mut self) -> Token<'a> {
        // The token reports the line the string starts on
        let line = self.line;

        loop {
            match self.advance() {
                Some('"') => break,
                Some('\n') => self.line += 1,
                Some(_) => {}
                None => return Token::new(TokenKind::Error, "Unterminated string.", line),
            }
        }

        Token::new(
            TokenKind::String,
            &self.source[self.start..self.current],
            line,
        )
    }

    fn number(&mut self) -> Token<'a> {
        while self.peek().is_some_and(|it| it.is_ascii_digit()) {
            self.advance();
        }

        // A dot only belongs to the number when digits follow it
        if self.peek() == Some('.') && self.peek_next().is_some_and(|it| it.is_ascii_digit()) {
            self.advance();
            while self.peek().is_some_and(|it| it.is_ascii_digit()) {
                self.advance();
            }
        }

        self.make_token(TokenKind::Number)
    }

    fn identifier(&mut self) -> Token<'a> {
        while self
            .peek()
            .is_some_and(|it| it.is_ascii_alphanumeric() || it == '_')
        {
            self.advance();
        }

        let kind = match &self.source[self.start..self.current] {
            "false" => TokenKind::False,
            "fn" => TokenKind::Fn,
            "nil" => TokenKind::Nil,
            "return" => TokenKind::Return,
            "true" => TokenKind::True,
            _ => TokenKind::Identifier,
        };

        self.make_token(kind)
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    /// Yields every token including a final `Eof`, then stops.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let token = self.next_token();
        if token.is_kind(TokenKind::Eof) {
            self.finished = true;
        }
        Some(token)
    }
}
