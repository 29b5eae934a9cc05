use log::debug;
use serde::Serialize;
use std::fmt;
use std::mem;

/// The different kinds of tokens recognized by the Rubel scanner.
///
/// Variants without data represent punctuation, operators or keywords.
/// `BOOLEAN`, `INTEGER`, `REAL` and `STRING` carry their literal values.
/// `IDENTIFIER` is used for user‑defined names.
/// `EOF` marks the end of input.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Serialize)]
pub enum TokenType {
    /// '('
    LEFT_PAREN,

    /// ')'
    RIGHT_PAREN,

    /// '['
    LEFT_BRACKET,

    /// ']'
    RIGHT_BRACKET,

    /// ','
    COMMA,

    /// '-'
    MINUS,

    /// '+'
    PLUS,

    /// '/'
    SLASH,

    /// '*'
    STAR,

    /// '='
    EQUAL,

    /// '=='
    EQUAL_EQUAL,

    /// '!='
    BANG_EQUAL,

    /// '>'
    GREATER,

    /// '>='
    GREATER_EQUAL,

    /// '<'
    LESS,

    /// '<='
    LESS_EQUAL,

    /// A user‑defined identifier
    IDENTIFIER,

    /// `$T` or `$F`
    BOOLEAN(bool),

    /// An integer literal
    INTEGER(i64),

    /// A real literal (`digits.digits`)
    REAL(f64),

    /// A string literal (contents without quotes)
    STRING(String),

    /// 'use'
    USE,

    /// 'module'
    MODULE,

    /// 'let'
    LET,

    /// 'const'
    CONST,

    /// 'proc'
    PROC,

    /// 'if'
    IF,

    /// 'otherwise'
    OTHERWISE,

    /// 'while'
    WHILE,

    /// 'end'
    END,

    /// 'return'
    RETURN,

    /// 'break'
    BREAK,

    /// End‑of‑file marker
    EOF,
}

impl TokenType {
    /// Variant name without payload, as printed by `tokenize`.
    pub fn name(&self) -> &'static str {
        match self {
            TokenType::LEFT_PAREN => "LEFT_PAREN",
            TokenType::RIGHT_PAREN => "RIGHT_PAREN",
            TokenType::LEFT_BRACKET => "LEFT_BRACKET",
            TokenType::RIGHT_BRACKET => "RIGHT_BRACKET",
            TokenType::COMMA => "COMMA",
            TokenType::MINUS => "MINUS",
            TokenType::PLUS => "PLUS",
            TokenType::SLASH => "SLASH",
            TokenType::STAR => "STAR",
            TokenType::EQUAL => "EQUAL",
            TokenType::EQUAL_EQUAL => "EQUAL_EQUAL",
            TokenType::BANG_EQUAL => "BANG_EQUAL",
            TokenType::GREATER => "GREATER",
            TokenType::GREATER_EQUAL => "GREATER_EQUAL",
            TokenType::LESS => "LESS",
            TokenType::LESS_EQUAL => "LESS_EQUAL",
            TokenType::IDENTIFIER => "IDENTIFIER",
            TokenType::BOOLEAN(_) => "BOOLEAN",
            TokenType::INTEGER(_) => "INTEGER",
            TokenType::REAL(_) => "REAL",
            TokenType::STRING(_) => "STRING",
            TokenType::USE => "USE",
            TokenType::MODULE => "MODULE",
            TokenType::LET => "LET",
            TokenType::CONST => "CONST",
            TokenType::PROC => "PROC",
            TokenType::IF => "IF",
            TokenType::OTHERWISE => "OTHERWISE",
            TokenType::WHILE => "WHILE",
            TokenType::END => "END",
            TokenType::RETURN => "RETURN",
            TokenType::BREAK => "BREAK",
            TokenType::EOF => "EOF",
        }
    }
}

impl PartialEq for TokenType {
    /// Two TokenTypes are equal if they share the same variant
    /// (ignoring any inner data). Uses `mem::discriminant` to compare.
    fn eq(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }
}

/// A scanned token, including its type, the original lexeme,
/// and the line number where it was found.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Token<'a> {
    /// The category of this token.
    pub token_type: TokenType,

    /// The exact substring from the source that produced this token.
    pub lexeme: &'a str,

    /// 1‑based line number in the source.
    pub line: usize,
}

impl<'a> Token<'a> {
    /// Create a new Token with the given type, lexeme, and line.
    pub fn new(token_type: TokenType, lexeme: &'a str, line: usize) -> Self {
        debug!(
            "Creating new token: type={:?}, lexeme={}, line={}",
            token_type, lexeme, line
        );

        Self {
            token_type,
            lexeme,
            line,
        }
    }
}

impl<'a> fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant: &'static str = self.token_type.name();

        match &self.token_type {
            TokenType::STRING(s) => write!(f, "{} {} {}", variant, self.lexeme, s),

            TokenType::INTEGER(n) => {
                let mut buf: itoa::Buffer = itoa::Buffer::new();
                write!(f, "{} {} {}", variant, self.lexeme, buf.format(*n))
            }

            TokenType::REAL(n) => {
                // 3 → "3.0", 3.14 → "3.14"
                if n.fract() == 0.0 {
                    write!(f, "{} {} {:.1}", variant, self.lexeme, n)
                } else {
                    write!(f, "{} {} {}", variant, self.lexeme, n)
                }
            }

            TokenType::BOOLEAN(b) => write!(f, "{} {} {}", variant, self.lexeme, b),

            _ => write!(f, "{} {} null", variant, self.lexeme),
        }
    }
}
