//! Token definitions for Java declaration lexing.

use std::fmt;

use crate::span::Span;

/// Token types produced by the lexer.
///
/// Only keywords that shape declarations get their own variant. Contextual
/// words such as `record`, `permits`, `sealed` and `var` are lexed as
/// [`Token::Identifier`] and recognized by the parser where they matter.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // Keywords
    Package,
    Import,
    Class,
    Interface,
    Enum,
    Extends,
    Implements,
    Public,
    Protected,
    Private,
    Static,
    Final,
    Abstract,
    Transient,
    Volatile,
    Synchronized,
    Native,
    Strictfp,
    Default,

    // Literals
    Identifier(&'src str),
    StringLiteral(&'src str),
    TextBlock(&'src str),
    CharLiteral(&'src str),
    NumberLiteral(&'src str),

    // Operators
    Less,        // <
    Greater,     // >
    Question,    // ?
    Equals,      // =
    Colon,       // :
    DoubleColon, // ::
    Arrow_,      // ->
    Ellipsis,    // ...
    Dot,         // .
    At,          // @
    Symbol(&'src str),

    // Punctuation
    LeftBrace,    // {
    RightBrace,   // }
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    Semicolon,    // ;
    Comma,        // ,

    // Comments
    LineComment(&'src str),
    BlockComment(&'src str),

    // Whitespace
    Whitespace,
    Newline,
}

impl<'src> Token<'src> {
    /// Maps a word to its keyword token, or to an identifier.
    pub fn from_word(word: &'src str) -> Self {
        match word {
            "package" => Token::Package,
            "import" => Token::Import,
            "class" => Token::Class,
            "interface" => Token::Interface,
            "enum" => Token::Enum,
            "extends" => Token::Extends,
            "implements" => Token::Implements,
            "public" => Token::Public,
            "protected" => Token::Protected,
            "private" => Token::Private,
            "static" => Token::Static,
            "final" => Token::Final,
            "abstract" => Token::Abstract,
            "transient" => Token::Transient,
            "volatile" => Token::Volatile,
            "synchronized" => Token::Synchronized,
            "native" => Token::Native,
            "strictfp" => Token::Strictfp,
            "default" => Token::Default,
            _ => Token::Identifier(word),
        }
    }

    /// Returns `true` for whitespace, newlines and comments.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            Token::Whitespace | Token::Newline | Token::LineComment(_) | Token::BlockComment(_)
        )
    }

    /// Returns the identifier text, if this is an identifier.
    pub fn identifier(&self) -> Option<&'src str> {
        match self {
            Token::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Returns `true` if this token is the identifier `word`.
    pub fn is_word(&self, word: &str) -> bool {
        self.identifier() == Some(word)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Package => "package",
            Token::Import => "import",
            Token::Class => "class",
            Token::Interface => "interface",
            Token::Enum => "enum",
            Token::Extends => "extends",
            Token::Implements => "implements",
            Token::Public => "public",
            Token::Protected => "protected",
            Token::Private => "private",
            Token::Static => "static",
            Token::Final => "final",
            Token::Abstract => "abstract",
            Token::Transient => "transient",
            Token::Volatile => "volatile",
            Token::Synchronized => "synchronized",
            Token::Native => "native",
            Token::Strictfp => "strictfp",
            Token::Default => "default",
            Token::Identifier(text)
            | Token::StringLiteral(text)
            | Token::TextBlock(text)
            | Token::CharLiteral(text)
            | Token::NumberLiteral(text)
            | Token::Symbol(text)
            | Token::LineComment(text)
            | Token::BlockComment(text) => text,
            Token::Less => "<",
            Token::Greater => ">",
            Token::Question => "?",
            Token::Equals => "=",
            Token::Colon => ":",
            Token::DoubleColon => "::",
            Token::Arrow_ => "->",
            Token::Ellipsis => "...",
            Token::Dot => ".",
            Token::At => "@",
            Token::LeftBrace => "{",
            Token::RightBrace => "}",
            Token::LeftParen => "(",
            Token::RightParen => ")",
            Token::LeftBracket => "[",
            Token::RightBracket => "]",
            Token::Semicolon => ";",
            Token::Comma => ",",
            Token::Whitespace => " ",
            Token::Newline => "\n",
        };
        f.write_str(text)
    }
}

/// A token with position information for winnow integration
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl fmt::Display for PositionedToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token)
    }
}
