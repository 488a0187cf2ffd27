//! Lexical analyzer for Java source text.
//!
//! The lexer converts source text into a stream of [`Token`]s for parsing.
//! Only the shape of the input matters here: literals keep their raw text,
//! comments and whitespace are kept as trivia, and operators the parser
//! never looks at collapse into [`Token::Symbol`].
//!
//! The public entry point is [`tokenize`], which performs error-recovering
//! lexical analysis and collects all diagnostics in a single pass.

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, not, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{any, literal, none_of, one_of, take_until, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Diagnostic information attached to a committed lexer failure.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    pub code: ErrorCode,
    pub message: &'static str,
    pub help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    pub start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// Parse a backslash escape inside a quoted literal; the escaped char is not interpreted.
fn escape(input: &mut Input<'_>) -> IResult<()> {
    ('\\', any).void().parse_next(input)
}

/// Parse a line comment starting with `//`.
fn line_comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    preceded("//", take_while(0.., |c| c != '\n'))
        .map(Token::LineComment)
        .parse_next(input)
}

/// Parse a block or Javadoc comment.
fn block_comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();
    "/*".parse_next(input)?;

    cut_err(terminated(take_until(0.., "*/"), "*/"))
        .context(LexerDiagnostic {
            code: ErrorCode::E003,
            message: "unterminated block comment",
            help: Some("add a closing `*/`"),
            start,
        })
        .map(Token::BlockComment)
        .parse_next(input)
}

/// Parse a `"""` text block. Its body may span lines and contain lone quotes.
fn text_block<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();
    "\"\"\"".parse_next(input)?;

    let body = repeat::<_, _, (), _, _>(
        0..,
        alt((
            escape,
            none_of(['"', '\\']).void(),
            ('"', not("\"\"")).void(),
        )),
    )
    .take();

    cut_err(terminated(body, "\"\"\""))
        .context(LexerDiagnostic {
            code: ErrorCode::E005,
            message: "unterminated text block",
            help: Some("close the text block with `\"\"\"`"),
            start,
        })
        .map(Token::TextBlock)
        .parse_next(input)
}

/// Parse a single-line string literal with double quotes.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();
    '"'.parse_next(input)?;

    let body =
        repeat::<_, _, (), _, _>(0.., alt((escape, none_of(['"', '\\', '\n', '\r']).void())))
            .take();

    // Commit after the opening quote so the span covers the whole literal.
    cut_err(terminated(body, '"'))
        .context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            help: Some("add closing `\"`"),
            start,
        })
        .map(Token::StringLiteral)
        .parse_next(input)
}

/// Parse a character literal such as `'a'`, `'\n'` or `'A'`.
fn char_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();
    '\''.parse_next(input)?;

    let body =
        repeat::<_, _, (), _, _>(1.., alt((escape, none_of(['\'', '\\', '\n', '\r']).void())))
            .take();

    cut_err(terminated(body, '\''))
        .context(LexerDiagnostic {
            code: ErrorCode::E004,
            message: "unterminated character literal",
            help: Some("add closing `'`"),
            start,
        })
        .map(Token::CharLiteral)
        .parse_next(input)
}

/// Parse a numeric literal loosely: a digit followed by any literal characters.
///
/// Covers `42`, `0xFF`, `1_000L`, `3.14f` and `1e10`. Signed exponents split
/// into several tokens, which is harmless because initializers are skipped.
fn number_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    (
        one_of(|c: char| c.is_ascii_digit()),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '.'),
    )
        .take()
        .map(Token::NumberLiteral)
        .parse_next(input)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Parse a keyword or identifier.
fn word<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., is_word_char)
        .verify(|s: &str| s.chars().next().is_some_and(|c| !c.is_ascii_digit()))
        .map(Token::from_word)
        .parse_next(input)
}

/// Parse multi-character operators (longest first).
fn multi_char_operator<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        literal("...").value(Token::Ellipsis),
        literal("::").value(Token::DoubleColon),
        literal("->").value(Token::Arrow_),
    ))
    .parse_next(input)
}

/// Parse single character tokens the parser cares about.
fn single_char_token<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        '<'.value(Token::Less),
        '>'.value(Token::Greater),
        '?'.value(Token::Question),
        '='.value(Token::Equals),
        ':'.value(Token::Colon),
        '.'.value(Token::Dot),
        '@'.value(Token::At),
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
        '('.value(Token::LeftParen),
        ')'.value(Token::RightParen),
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        ';'.value(Token::Semicolon),
        ','.value(Token::Comma),
    ))
    .parse_next(input)
}

/// Parse any remaining operator character.
fn symbol<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    one_of(['+', '-', '*', '/', '%', '!', '~', '&', '|', '^'])
        .take()
        .map(Token::Symbol)
        .parse_next(input)
}

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Parse whitespace (spaces, tabs, carriage returns but not newlines).
///
/// A byte order mark counts as whitespace so spans stay relative to the
/// text as read from disk.
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., |c: char| c == BYTE_ORDER_MARK || (c.is_whitespace() && c != '\n'))
        .value(Token::Whitespace)
        .parse_next(input)
}

fn newline<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    '\n'.value(Token::Newline).parse_next(input)
}

/// Parse a single token with position tracking.
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        line_comment,        // Must come before symbol '/'
        block_comment,       // Must come before symbol '/'
        text_block,          // Must come before string literal
        string_literal,
        char_literal,
        multi_char_operator, // Must come before single char operators
        number_literal,      // Must come before word
        word,
        single_char_token,
        symbol,
        newline,             // Must come before whitespace
        whitespace,
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    Ok(PositionedToken::new(token, Span::new(start_pos..end_pos)))
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Tokenize the input, collecting tokens and errors.
    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            match positioned_token(&mut input) {
                Ok(token) => self.tokens.push(token),
                Err(e) => {
                    let error_pos = input.current_token_start();
                    self.diagnostics.emit(Self::convert_err_mode(e, error_pos));

                    // Skip one char and keep going so every bad character is reported.
                    if !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        self.diagnostics.finish().map(|()| self.tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Falls back to E002 (unexpected character) when no lexer context
    /// was attached to the failure.
    fn convert_err_mode(err: ErrMode<ContextError<LexerDiagnostic>>, error_pos: usize) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(Span::new(*start..error_pos), code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let span = Span::new(error_pos..error_pos.saturating_add(1));
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_label(span, ErrorCode::E002.description())
    }
}

/// Split Java source into tokens, collecting every lexical error.
///
/// # Returns
///
/// - `Ok(tokens)` - All tokens, trivia included, in source order
/// - `Err(ParseError)` - One or more errors occurred; contains all diagnostics
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let mut lexer = Lexer::new();
    lexer.tokenize(LocatingSlice::new(input));
    lexer.finish()
}
