//! Lexer - tokenizes script source into tokens

use crate::error::{syntax_error, unexpected_eof};
use core_types::{JsError, SourcePosition};

/// Reserved words recognised by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// var keyword
    Var,
    /// let keyword
    Let,
    /// const keyword
    Const,
    /// function keyword
    Function,
    /// return keyword
    Return,
    /// if keyword
    If,
    /// else keyword
    Else,
    /// while keyword
    While,
    /// do keyword
    Do,
    /// for keyword
    For,
    /// in keyword
    In,
    /// break keyword
    Break,
    /// continue keyword
    Continue,
    /// new keyword
    New,
    /// this keyword
    This,
    /// true keyword
    True,
    /// false keyword
    False,
    /// null keyword
    Null,
    /// typeof keyword
    Typeof,
    /// void keyword
    Void,
    /// delete keyword
    Delete,
    /// instanceof keyword
    Instanceof,
    /// try keyword
    Try,
    /// catch keyword
    Catch,
    /// finally keyword
    Finally,
    /// throw keyword
    Throw,
}

impl Keyword {
    fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "var" => Keyword::Var,
            "let" => Keyword::Let,
            "const" => Keyword::Const,
            "function" => Keyword::Function,
            "return" => Keyword::Return,
            "if" => Keyword::If,
            "else" => Keyword::Else,
            "while" => Keyword::While,
            "do" => Keyword::Do,
            "for" => Keyword::For,
            "in" => Keyword::In,
            "break" => Keyword::Break,
            "continue" => Keyword::Continue,
            "new" => Keyword::New,
            "this" => Keyword::This,
            "true" => Keyword::True,
            "false" => Keyword::False,
            "null" => Keyword::Null,
            "typeof" => Keyword::Typeof,
            "void" => Keyword::Void,
            "delete" => Keyword::Delete,
            "instanceof" => Keyword::Instanceof,
            "try" => Keyword::Try,
            "catch" => Keyword::Catch,
            "finally" => Keyword::Finally,
            "throw" => Keyword::Throw,
            _ => return None,
        })
    }

    /// The source spelling of the keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Var => "var",
            Keyword::Let => "let",
            Keyword::Const => "const",
            Keyword::Function => "function",
            Keyword::Return => "return",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::Do => "do",
            Keyword::For => "for",
            Keyword::In => "in",
            Keyword::Break => "break",
            Keyword::Continue => "continue",
            Keyword::New => "new",
            Keyword::This => "this",
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::Null => "null",
            Keyword::Typeof => "typeof",
            Keyword::Void => "void",
            Keyword::Delete => "delete",
            Keyword::Instanceof => "instanceof",
            Keyword::Try => "try",
            Keyword::Catch => "catch",
            Keyword::Finally => "finally",
            Keyword::Throw => "throw",
        }
    }
}

/// Operators and delimiters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punctuator {
    /// (
    LParen,
    /// )
    RParen,
    /// {
    LBrace,
    /// }
    RBrace,
    /// [
    LBracket,
    /// ]
    RBracket,
    /// ;
    Semicolon,
    /// ,
    Comma,
    /// .
    Dot,
    /// :
    Colon,
    /// ?
    Question,
    /// =
    Assign,
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// **
    StarStar,
    /// ==
    EqEq,
    /// ===
    EqEqEq,
    /// !=
    NotEq,
    /// !==
    NotEqEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// &&
    AndAnd,
    /// ||
    OrOr,
    /// !
    Not,
    /// &
    And,
    /// |
    Or,
    /// ^
    Xor,
    /// ~
    Tilde,
    /// <<
    LtLt,
    /// >>
    GtGt,
    /// >>>
    GtGtGt,
    /// +=
    PlusEq,
    /// -=
    MinusEq,
    /// *=
    StarEq,
    /// /=
    SlashEq,
    /// %=
    PercentEq,
    /// ++
    PlusPlus,
    /// --
    MinusMinus,
}

impl Punctuator {
    /// The source spelling of the punctuator.
    pub fn as_str(self) -> &'static str {
        match self {
            Punctuator::LParen => "(",
            Punctuator::RParen => ")",
            Punctuator::LBrace => "{",
            Punctuator::RBrace => "}",
            Punctuator::LBracket => "[",
            Punctuator::RBracket => "]",
            Punctuator::Semicolon => ";",
            Punctuator::Comma => ",",
            Punctuator::Dot => ".",
            Punctuator::Colon => ":",
            Punctuator::Question => "?",
            Punctuator::Assign => "=",
            Punctuator::Plus => "+",
            Punctuator::Minus => "-",
            Punctuator::Star => "*",
            Punctuator::Slash => "/",
            Punctuator::Percent => "%",
            Punctuator::StarStar => "**",
            Punctuator::EqEq => "==",
            Punctuator::EqEqEq => "===",
            Punctuator::NotEq => "!=",
            Punctuator::NotEqEq => "!==",
            Punctuator::Lt => "<",
            Punctuator::LtEq => "<=",
            Punctuator::Gt => ">",
            Punctuator::GtEq => ">=",
            Punctuator::AndAnd => "&&",
            Punctuator::OrOr => "||",
            Punctuator::Not => "!",
            Punctuator::And => "&",
            Punctuator::Or => "|",
            Punctuator::Xor => "^",
            Punctuator::Tilde => "~",
            Punctuator::LtLt => "<<",
            Punctuator::GtGt => ">>",
            Punctuator::GtGtGt => ">>>",
            Punctuator::PlusEq => "+=",
            Punctuator::MinusEq => "-=",
            Punctuator::StarEq => "*=",
            Punctuator::SlashEq => "/=",
            Punctuator::PercentEq => "%=",
            Punctuator::PlusPlus => "++",
            Punctuator::MinusMinus => "--",
        }
    }
}

/// Token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier (variable name, property name)
    Identifier(String),
    /// Number literal
    Number(f64),
    /// String literal, escapes already decoded
    String(String),
    /// Keyword
    Keyword(Keyword),
    /// Punctuator/operator
    Punctuator(Punctuator),
    /// End of input
    EOF,
}

impl Token {
    /// Describes the token the way syntax errors mention it.
    pub fn describe(&self) -> String {
        match self {
            Token::Identifier(_) => "identifier".to_string(),
            Token::Number(_) => "number".to_string(),
            Token::String(_) => "string".to_string(),
            Token::Keyword(k) => format!("token '{}'", k.as_str()),
            Token::Punctuator(p) => format!("token '{}'", p.as_str()),
            Token::EOF => "end of input".to_string(),
        }
    }
}

/// A token with its start position and ASI information
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    /// The token
    pub token: Token,
    /// Where the token starts
    pub position: SourcePosition,
    /// Whether a line terminator precedes the token
    pub newline_before: bool,
}

/// Lexer for script source code
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    line: u32,
    column: u32,
    line_terminator_before_token: bool,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            line_terminator_before_token: false,
        }
    }

    /// Tokenizes the whole input. The last token is always [`Token::EOF`].
    pub fn tokenize(mut self) -> Result<Vec<SpannedToken>, JsError> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_token()?;
            let done = spanned.token == Token::EOF;
            tokens.push(spanned);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Scans the next token
    pub fn next_token(&mut self) -> Result<SpannedToken, JsError> {
        self.line_terminator_before_token = false;
        self.skip_whitespace_and_comments()?;
        let position = self.current_position();
        let token = self.scan_token()?;
        Ok(SpannedToken {
            token,
            position,
            newline_before: self.line_terminator_before_token,
        })
    }

    fn scan_token(&mut self) -> Result<Token, JsError> {
        if self.is_at_end() {
            return Ok(Token::EOF);
        }
        let start_pos = self.current_position();
        let ch = self.advance();

        let punct = match ch {
            '(' => Punctuator::LParen,
            ')' => Punctuator::RParen,
            '{' => Punctuator::LBrace,
            '}' => Punctuator::RBrace,
            '[' => Punctuator::LBracket,
            ']' => Punctuator::RBracket,
            ';' => Punctuator::Semicolon,
            ',' => Punctuator::Comma,
            ':' => Punctuator::Colon,
            '?' => Punctuator::Question,
            '~' => Punctuator::Tilde,
            '^' => Punctuator::Xor,
            '.' => {
                if self.peek().is_ascii_digit() {
                    return self.scan_number(ch);
                }
                Punctuator::Dot
            }
            '=' => {
                if self.match_char('=') {
                    if self.match_char('=') {
                        Punctuator::EqEqEq
                    } else {
                        Punctuator::EqEq
                    }
                } else {
                    Punctuator::Assign
                }
            }
            '!' => {
                if self.match_char('=') {
                    if self.match_char('=') {
                        Punctuator::NotEqEq
                    } else {
                        Punctuator::NotEq
                    }
                } else {
                    Punctuator::Not
                }
            }
            '+' => {
                if self.match_char('+') {
                    Punctuator::PlusPlus
                } else if self.match_char('=') {
                    Punctuator::PlusEq
                } else {
                    Punctuator::Plus
                }
            }
            '-' => {
                if self.match_char('-') {
                    Punctuator::MinusMinus
                } else if self.match_char('=') {
                    Punctuator::MinusEq
                } else {
                    Punctuator::Minus
                }
            }
            '*' => {
                if self.match_char('*') {
                    Punctuator::StarStar
                } else if self.match_char('=') {
                    Punctuator::StarEq
                } else {
                    Punctuator::Star
                }
            }
            '/' => {
                if self.match_char('=') {
                    Punctuator::SlashEq
                } else {
                    Punctuator::Slash
                }
            }
            '%' => {
                if self.match_char('=') {
                    Punctuator::PercentEq
                } else {
                    Punctuator::Percent
                }
            }
            '<' => {
                if self.match_char('<') {
                    Punctuator::LtLt
                } else if self.match_char('=') {
                    Punctuator::LtEq
                } else {
                    Punctuator::Lt
                }
            }
            '>' => {
                if self.match_char('>') {
                    if self.match_char('>') {
                        Punctuator::GtGtGt
                    } else {
                        Punctuator::GtGt
                    }
                } else if self.match_char('=') {
                    Punctuator::GtEq
                } else {
                    Punctuator::Gt
                }
            }
            '&' => {
                if self.match_char('&') {
                    Punctuator::AndAnd
                } else {
                    Punctuator::And
                }
            }
            '|' => {
                if self.match_char('|') {
                    Punctuator::OrOr
                } else {
                    Punctuator::Or
                }
            }
            '"' | '\'' => return self.scan_string(ch),
            _ if ch.is_ascii_digit() => return self.scan_number(ch),
            _ if is_id_start(ch) => return Ok(self.scan_identifier(ch)),
            _ => {
                return Err(syntax_error(
                    format!("Invalid or unexpected token '{}'", ch),
                    Some(start_pos),
                ))
            }
        };
        Ok(Token::Punctuator(punct))
    }

    fn scan_string(&mut self, quote: char) -> Result<Token, JsError> {
        let start_pos = self.current_position();
        let mut value = String::new();
        loop {
            if self.is_at_end() {
                return Err(syntax_error("Invalid or unexpected token", Some(start_pos)));
            }
            let ch = self.advance();
            match ch {
                c if c == quote => break,
                '\n' | '\r' => {
                    return Err(syntax_error("Invalid or unexpected token", Some(start_pos)))
                }
                '\\' => {
                    if self.is_at_end() {
                        return Err(unexpected_eof(Some(self.current_position())));
                    }
                    let escaped = self.advance();
                    match escaped {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        'b' => value.push('\u{0008}'),
                        'f' => value.push('\u{000C}'),
                        'v' => value.push('\u{000B}'),
                        '0' if !self.peek().is_ascii_digit() => value.push('\0'),
                        'x' => {
                            let code = self.scan_hex_digits(2, start_pos)?;
                            value.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                        }
                        'u' => {
                            let code = if self.match_char('{') {
                                let mut code = 0u32;
                                while !self.match_char('}') {
                                    let digit = self.advance_hex_digit(start_pos)?;
                                    code = code.saturating_mul(16).saturating_add(digit);
                                }
                                code
                            } else {
                                self.scan_hex_digits(4, start_pos)?
                            };
                            value.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                        }
                        '\r' => {
                            self.match_char('\n');
                            self.new_line();
                        }
                        '\n' | '\u{2028}' | '\u{2029}' => self.new_line(),
                        other => value.push(other),
                    }
                }
                other => value.push(other),
            }
        }
        Ok(Token::String(value))
    }

    fn advance_hex_digit(&mut self, start_pos: SourcePosition) -> Result<u32, JsError> {
        if self.is_at_end() {
            return Err(syntax_error("Invalid hexadecimal escape sequence", Some(start_pos)));
        }
        self.advance()
            .to_digit(16)
            .ok_or_else(|| syntax_error("Invalid hexadecimal escape sequence", Some(start_pos)))
    }

    fn scan_hex_digits(&mut self, count: usize, start_pos: SourcePosition) -> Result<u32, JsError> {
        let mut code = 0u32;
        for _ in 0..count {
            code = code * 16 + self.advance_hex_digit(start_pos)?;
        }
        Ok(code)
    }

    fn scan_number(&mut self, first: char) -> Result<Token, JsError> {
        let start_pos = self.current_position();
        if first == '0' {
            let radix = match self.peek() {
                'x' | 'X' => Some(16),
                'o' | 'O' => Some(8),
                'b' | 'B' => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.advance();
                let mut digits = String::new();
                while self.peek().is_digit(radix) {
                    digits.push(self.advance());
                }
                if digits.is_empty() || is_id_start(self.peek()) {
                    return Err(syntax_error("Invalid or unexpected token", Some(start_pos)));
                }
                let value = u64::from_str_radix(&digits, radix)
                    .map(|v| v as f64)
                    .unwrap_or(f64::INFINITY);
                return Ok(Token::Number(value));
            }
        }

        let mut text = String::new();
        text.push(first);
        while self.peek().is_ascii_digit() {
            text.push(self.advance());
        }
        if first != '.' && self.peek() == '.' {
            text.push(self.advance());
            while self.peek().is_ascii_digit() {
                text.push(self.advance());
            }
        }
        if matches!(self.peek(), 'e' | 'E') {
            text.push(self.advance());
            if matches!(self.peek(), '+' | '-') {
                text.push(self.advance());
            }
            if !self.peek().is_ascii_digit() {
                return Err(syntax_error("Invalid or unexpected token", Some(start_pos)));
            }
            while self.peek().is_ascii_digit() {
                text.push(self.advance());
            }
        }
        if is_id_start(self.peek()) {
            return Err(syntax_error("Invalid or unexpected token", Some(start_pos)));
        }
        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| syntax_error("Invalid or unexpected token", Some(start_pos)))
    }

    fn scan_identifier(&mut self, first: char) -> Token {
        let mut word = String::new();
        word.push(first);
        while is_id_continue(self.peek()) {
            word.push(self.advance());
        }
        match Keyword::from_word(&word) {
            Some(keyword) => Token::Keyword(keyword),
            None => Token::Identifier(word),
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), JsError> {
        while !self.is_at_end() {
            match self.peek() {
                ' ' | '\t' | '\u{000B}' | '\u{000C}' | '\u{00A0}' | '\u{FEFF}' => {
                    self.advance();
                }
                '\n' | '\u{2028}' | '\u{2029}' => {
                    self.advance();
                    self.new_line();
                }
                '\r' => {
                    self.advance();
                    self.match_char('\n');
                    self.new_line();
                }
                '/' if self.peek_next() == Some('/') => {
                    while !self.is_at_end() && !matches!(self.peek(), '\n' | '\r') {
                        self.advance();
                    }
                }
                '/' if self.peek_next() == Some('*') => {
                    let start_pos = self.current_position();
                    self.advance();
                    self.advance();
                    loop {
                        if self.is_at_end() {
                            return Err(syntax_error(
                                "Invalid or unexpected token",
                                Some(start_pos),
                            ));
                        }
                        if self.peek() == '*' && self.peek_next() == Some('/') {
                            self.advance();
                            self.advance();
                            break;
                        }
                        let ch = self.advance();
                        if ch == '\n' || (ch == '\r' && self.peek() != '\n') {
                            self.new_line();
                        }
                    }
                }
                c if c.is_whitespace() => {
                    self.advance();
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.column = 1;
        self.line_terminator_before_token = true;
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.chars.len()
    }

    fn peek(&self) -> char {
        self.chars.get(self.position).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.position + 1).copied()
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.position];
        self.position += 1;
        self.column += 1;
        ch
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == expected && !self.is_at_end() {
            self.advance();
            true
        } else {
            false
        }
    }

    fn current_position(&self) -> SourcePosition {
        SourcePosition {
            line: self.line,
            column: self.column,
            offset: self.position,
        }
    }
}

fn is_id_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphabetic()
}

fn is_id_continue(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphanumeric() || c == '\u{200C}' || c == '\u{200D}'
}
