//! Parser for Java declaration tokens.
//!
//! This module turns the significant tokens produced by the
//! [`lexer`](super::lexer) into a [`CompilationUnit`]. Only the declaration
//! skeleton is read: packages, type headers, fields, record components and
//! enum constants. Method bodies, initializers and everything else with
//! balanced brackets is skipped without being interpreted.

use winnow::{
    Parser as _,
    error::{AddContext, ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use classmap_core::{
    declaration::{CompilationUnit, Field, Modifiers, RecordComponent, TypeBody, TypeDecl, Visibility},
    fqn::simple_name,
};

use crate::{
    error::{Diagnostic, ErrorCode},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of what the parser expected
    Label(&'static str),
}

type Input<'src> = TokenSlice<'src, PositionedToken<'src>>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;

/// Create a committed error describing what was expected at the current position.
fn error_at(input: &Input<'_>, expected: &'static str) -> ErrMode<ContextError<Context>> {
    ErrMode::Cut(ContextError::new().add_context(
        input,
        &input.checkpoint(),
        Context::Label(expected),
    ))
}

/// Look `n` significant tokens ahead without consuming anything.
fn peek_nth<'src>(input: &mut Input<'src>, n: usize) -> Option<&'src Token<'src>> {
    let checkpoint = input.checkpoint();
    let mut token = None;
    for _ in 0..=n {
        token = input.next_token();
        if token.is_none() {
            break;
        }
    }
    input.reset(&checkpoint);
    token.map(|t| &t.token)
}

fn peek<'src>(input: &mut Input<'src>) -> Option<&'src Token<'src>> {
    peek_nth(input, 0)
}

fn at<'src>(input: &mut Input<'src>, expected: &Token<'src>) -> bool {
    peek(input) == Some(expected)
}

/// Consume the next token if it is `expected`.
fn eat<'src>(input: &mut Input<'src>, expected: &Token<'src>) -> bool {
    let found = at(input, expected);
    if found {
        input.next_token();
    }
    found
}

fn expect<'src>(input: &mut Input<'src>, expected: Token<'src>, label: &'static str) -> IResult<Span> {
    any.verify(move |t: &PositionedToken<'src>| t.token == expected)
        .map(|t: &PositionedToken<'src>| t.span)
        .context(Context::Label(label))
        .parse_next(input)
}

fn identifier<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    any.verify_map(|t: &PositionedToken<'src>| t.identifier())
        .context(Context::Label("identifier"))
        .parse_next(input)
}

/// Parse a dotted name such as `com.acme.model`.
fn qualified_name(input: &mut Input<'_>) -> IResult<String> {
    let mut name = identifier(input)?.to_string();
    while at(input, &Token::Dot) && matches!(peek_nth(input, 1), Some(Token::Identifier(_))) {
        input.next_token();
        name.push('.');
        name.push_str(identifier(input)?);
    }
    Ok(name)
}

/// Skip one bracketed group starting at the current opener, nesting included.
fn skip_balanced(input: &mut Input<'_>) -> IResult<()> {
    let mut depth = 0usize;
    loop {
        let Some(token) = input.next_token() else {
            return Err(error_at(input, "closing bracket"));
        };
        match token.token {
            Token::LeftParen | Token::LeftBrace | Token::LeftBracket => depth += 1,
            Token::RightParen | Token::RightBrace | Token::RightBracket => {
                depth = depth.saturating_sub(1)
            }
            _ => {}
        }
        if depth == 0 {
            return Ok(());
        }
    }
}

/// Skip a `<...>` type parameter list if one starts here.
fn type_parameters(input: &mut Input<'_>) -> IResult<()> {
    if !at(input, &Token::Less) {
        return Ok(());
    }
    let mut depth = 0usize;
    loop {
        let Some(token) = input.next_token() else {
            return Err(error_at(input, "`>`"));
        };
        match token.token {
            Token::Less => depth += 1,
            Token::Greater => depth -= 1,
            _ => {}
        }
        if depth == 0 {
            return Ok(());
        }
    }
}

fn skip_past_semicolon(input: &mut Input<'_>) -> IResult<()> {
    loop {
        match input.next_token() {
            Some(token) if token.token == Token::Semicolon => return Ok(()),
            Some(_) => {}
            None => return Err(error_at(input, "`;`")),
        }
    }
}

/// Parse an annotation usage and return its simple name. Arguments are skipped.
fn annotation(input: &mut Input<'_>) -> IResult<String> {
    expect(input, Token::At, "annotation")?;
    let name = qualified_name(input)?;
    if at(input, &Token::LeftParen) {
        skip_balanced(input)?;
    }
    Ok(simple_name(&name).to_string())
}

fn at_annotation_usage(input: &mut Input<'_>) -> bool {
    at(input, &Token::At) && peek_nth(input, 1) != Some(&Token::Interface)
}

fn skip_type_annotations(input: &mut Input<'_>) -> IResult<()> {
    while at_annotation_usage(input) {
        annotation(input)?;
    }
    Ok(())
}

/// Returns `true` if `token` can follow the contextual `sealed` modifier.
fn continues_declaration(token: Option<&Token<'_>>) -> bool {
    matches!(
        token,
        Some(
            Token::Class
                | Token::Interface
                | Token::Abstract
                | Token::Public
                | Token::Protected
                | Token::Private
                | Token::Static
                | Token::Strictfp
                | Token::At
                | Token::Identifier("record" | "non")
        )
    )
}

/// Parse modifiers and annotation usages in any order.
fn modifiers(input: &mut Input<'_>) -> IResult<(Modifiers, Vec<String>)> {
    let mut modifiers = Modifiers::default();
    let mut annotations = Vec::new();
    loop {
        match peek(input) {
            Some(Token::Public) => modifiers.visibility = Visibility::Public,
            Some(Token::Protected) => modifiers.visibility = Visibility::Protected,
            Some(Token::Private) => modifiers.visibility = Visibility::Private,
            Some(Token::Static) => modifiers.is_static = true,
            Some(Token::Final) => modifiers.is_final = true,
            Some(Token::Abstract) => modifiers.is_abstract = true,
            Some(Token::Transient) => modifiers.is_transient = true,
            Some(Token::Volatile) => modifiers.is_volatile = true,
            Some(Token::Synchronized | Token::Native | Token::Strictfp | Token::Default) => {}
            Some(Token::At) if at_annotation_usage(input) => {
                annotations.push(annotation(input)?);
                continue;
            }
            Some(Token::Identifier("sealed")) if continues_declaration(peek_nth(input, 1)) => {}
            Some(Token::Identifier("non"))
                if peek_nth(input, 1) == Some(&Token::Symbol("-"))
                    && peek_nth(input, 2) == Some(&Token::Identifier("sealed")) =>
            {
                // `non-sealed` is three tokens
                input.next_token();
                input.next_token();
            }
            _ => break,
        }
        input.next_token();
    }
    Ok((modifiers, annotations))
}

/// Parse a type use and rebuild its text, e.g. `Map<String,List<Order>>` or `a.b.C[]`.
fn type_ref(input: &mut Input<'_>) -> IResult<String> {
    skip_type_annotations(input)?;
    let mut text = identifier(input)?.to_string();
    loop {
        match peek(input) {
            Some(Token::Dot)
                if matches!(peek_nth(input, 1), Some(Token::Identifier(_) | Token::At)) =>
            {
                input.next_token();
                skip_type_annotations(input)?;
                text.push('.');
                text.push_str(identifier(input)?);
            }
            Some(Token::Less) => type_arguments(input, &mut text)?,
            Some(Token::LeftBracket) if peek_nth(input, 1) == Some(&Token::RightBracket) => {
                input.next_token();
                input.next_token();
                text.push_str("[]");
            }
            Some(Token::Ellipsis) => {
                input.next_token();
                text.push_str("...");
                break;
            }
            _ => break,
        }
    }
    Ok(text)
}

fn type_arguments(input: &mut Input<'_>, text: &mut String) -> IResult<()> {
    expect(input, Token::Less, "`<`")?;
    text.push('<');
    if eat(input, &Token::Greater) {
        text.push('>');
        return Ok(());
    }
    loop {
        skip_type_annotations(input)?;
        if eat(input, &Token::Question) {
            text.push('?');
            match peek(input) {
                Some(Token::Extends) => {
                    input.next_token();
                    text.push_str(" extends ");
                    text.push_str(&type_ref(input)?);
                }
                Some(Token::Identifier("super")) => {
                    input.next_token();
                    text.push_str(" super ");
                    text.push_str(&type_ref(input)?);
                }
                _ => {}
            }
        } else {
            text.push_str(&type_ref(input)?);
        }

        if eat(input, &Token::Comma) {
            text.push(',');
            continue;
        }
        expect(input, Token::Greater, "`>`")?;
        text.push('>');
        return Ok(());
    }
}

fn type_list(input: &mut Input<'_>) -> IResult<Vec<String>> {
    let mut names = vec![type_ref(input)?];
    while eat(input, &Token::Comma) {
        names.push(type_ref(input)?);
    }
    Ok(names)
}

/// Skip a `permits A, B` clause of a sealed type.
fn permits(input: &mut Input<'_>) -> IResult<()> {
    if peek(input) == Some(&Token::Identifier("permits")) {
        input.next_token();
        type_list(input)?;
    }
    Ok(())
}

fn at_record_declaration(input: &mut Input<'_>) -> bool {
    peek(input) == Some(&Token::Identifier("record"))
        && matches!(peek_nth(input, 1), Some(Token::Identifier(_)))
        && matches!(peek_nth(input, 2), Some(Token::LeftParen | Token::Less))
}

fn at_type_declaration(input: &mut Input<'_>) -> bool {
    match peek(input) {
        Some(Token::Class | Token::Interface | Token::Enum) => true,
        Some(Token::At) => peek_nth(input, 1) == Some(&Token::Interface),
        Some(Token::Identifier("record")) => at_record_declaration(input),
        _ => false,
    }
}

/// Parse a class, interface, enum, record or annotation type declaration.
fn type_declaration(input: &mut Input<'_>) -> IResult<TypeDecl> {
    let (modifiers, annotations) = modifiers(input)?;
    let decl = match peek(input) {
        Some(Token::Class) => class_declaration(input)?,
        Some(Token::Interface) => interface_declaration(input)?,
        Some(Token::Enum) => enum_declaration(input)?,
        Some(Token::At) => annotation_declaration(input)?,
        Some(Token::Identifier("record")) if at_record_declaration(input) => {
            record_declaration(input)?
        }
        _ => return Err(error_at(input, "type declaration")),
    };
    Ok(annotations
        .into_iter()
        .fold(decl.with_modifiers(modifiers), |decl, name| {
            decl.with_annotation(name)
        }))
}

fn class_declaration(input: &mut Input<'_>) -> IResult<TypeDecl> {
    expect(input, Token::Class, "`class`")?;
    let mut decl = TypeDecl::class(identifier(input)?);
    type_parameters(input)?;
    if eat(input, &Token::Extends) {
        decl = decl.with_extends(type_ref(input)?);
    }
    if eat(input, &Token::Implements) {
        for name in type_list(input)? {
            decl = decl.with_implements(name);
        }
    }
    permits(input)?;
    class_body(input, &mut decl)?;
    Ok(decl)
}

fn interface_declaration(input: &mut Input<'_>) -> IResult<TypeDecl> {
    expect(input, Token::Interface, "`interface`")?;
    let mut decl = TypeDecl::interface(identifier(input)?);
    type_parameters(input)?;
    if eat(input, &Token::Extends) {
        for name in type_list(input)? {
            decl = decl.with_extends(name);
        }
    }
    permits(input)?;
    class_body(input, &mut decl)?;
    Ok(decl)
}

fn enum_declaration(input: &mut Input<'_>) -> IResult<TypeDecl> {
    expect(input, Token::Enum, "`enum`")?;
    let mut decl = TypeDecl::enumeration(identifier(input)?);
    if eat(input, &Token::Implements) {
        for name in type_list(input)? {
            decl = decl.with_implements(name);
        }
    }
    enum_body(input, &mut decl)?;
    Ok(decl)
}

fn record_declaration(input: &mut Input<'_>) -> IResult<TypeDecl> {
    identifier(input)?; // `record`
    let mut decl = TypeDecl::record(identifier(input)?);
    type_parameters(input)?;

    expect(input, Token::LeftParen, "`(`")?;
    if !eat(input, &Token::RightParen) {
        loop {
            let (_, annotations) = modifiers(input)?;
            let type_name = type_ref(input)?;
            let name = identifier(input)?;
            let component = annotations
                .into_iter()
                .fold(RecordComponent::new(name, type_name), |component, name| {
                    component.with_annotation(name)
                });
            decl = decl.with_component(component);

            if eat(input, &Token::Comma) {
                continue;
            }
            expect(input, Token::RightParen, "`)`")?;
            break;
        }
    }

    if eat(input, &Token::Implements) {
        for name in type_list(input)? {
            decl = decl.with_implements(name);
        }
    }
    class_body(input, &mut decl)?;
    Ok(decl)
}

fn annotation_declaration(input: &mut Input<'_>) -> IResult<TypeDecl> {
    expect(input, Token::At, "`@`")?;
    expect(input, Token::Interface, "`interface`")?;
    let mut decl = TypeDecl::annotation(identifier(input)?);
    class_body(input, &mut decl)?;
    Ok(decl)
}

fn class_body(input: &mut Input<'_>, decl: &mut TypeDecl) -> IResult<()> {
    expect(input, Token::LeftBrace, "`{`")?;
    members(input, decl)
}

/// Parse members up to and including the closing `}` of a body.
fn members(input: &mut Input<'_>, decl: &mut TypeDecl) -> IResult<()> {
    loop {
        match peek(input) {
            None => return Err(error_at(input, "`}`")),
            Some(Token::RightBrace) => {
                input.next_token();
                return Ok(());
            }
            Some(Token::Semicolon) => {
                input.next_token();
            }
            Some(Token::LeftBrace) => skip_balanced(input)?,
            Some(Token::Static) if peek_nth(input, 1) == Some(&Token::LeftBrace) => {
                input.next_token();
                skip_balanced(input)?;
            }
            Some(_) => member(input, decl)?,
        }
    }
}

fn member(input: &mut Input<'_>, decl: &mut TypeDecl) -> IResult<()> {
    let start = input.checkpoint();
    let (modifiers, annotations) = modifiers(input)?;

    if at_type_declaration(input) {
        input.reset(&start);
        let nested = type_declaration(input)?;
        decl.nested_mut().push(nested);
        return Ok(());
    }

    type_parameters(input)?;
    match (peek(input), peek_nth(input, 1)) {
        // Constructor
        (Some(Token::Identifier(_)), Some(Token::LeftParen)) => {
            input.next_token();
            skip_balanced(input)?;
            return skip_method_rest(input);
        }
        // Compact record constructor
        (Some(Token::Identifier(name)), Some(Token::LeftBrace)) if *name == decl.name() => {
            input.next_token();
            return skip_balanced(input);
        }
        _ => {}
    }

    let type_name = type_ref(input)?;
    let name = identifier(input)?;
    if at(input, &Token::LeftParen) {
        skip_balanced(input)?;
        return skip_method_rest(input);
    }
    field_declarators(input, decl, &type_name, name, modifiers, &annotations)
}

/// Skip whatever follows a method's parameter list: `throws`, `default` values and the body.
fn skip_method_rest(input: &mut Input<'_>) -> IResult<()> {
    loop {
        match peek(input) {
            None => return Err(error_at(input, "method body or `;`")),
            Some(Token::Semicolon) => {
                input.next_token();
                return Ok(());
            }
            Some(Token::LeftBrace) => return skip_balanced(input),
            Some(Token::LeftParen | Token::LeftBracket) => skip_balanced(input)?,
            Some(_) => {
                input.next_token();
            }
        }
    }
}

/// Parse `name [= init] {, name [= init]} ;` after a field type.
fn field_declarators(
    input: &mut Input<'_>,
    decl: &mut TypeDecl,
    type_name: &str,
    first: &str,
    modifiers: Modifiers,
    annotations: &[String],
) -> IResult<()> {
    let mut name = first;
    loop {
        let mut declared = type_name.to_string();
        while at(input, &Token::LeftBracket) && peek_nth(input, 1) == Some(&Token::RightBracket) {
            input.next_token();
            input.next_token();
            declared.push_str("[]");
        }

        let field = annotations
            .iter()
            .fold(Field::new(name, declared).with_modifiers(modifiers), |field, annotation| {
                field.with_annotation(annotation.as_str())
            });
        push_field(decl, field);

        if at(input, &Token::Equals) {
            skip_initializer(input)?;
        }
        if eat(input, &Token::Comma) {
            name = identifier(input)?;
            continue;
        }
        expect(input, Token::Semicolon, "`;`")?;
        return Ok(());
    }
}

fn push_field(decl: &mut TypeDecl, field: Field) {
    match decl.body_mut() {
        TypeBody::Class { fields, .. }
        | TypeBody::Interface { fields, .. }
        | TypeBody::Enum { fields, .. } => fields.push(field),
        TypeBody::Record { .. } | TypeBody::Annotation => {
            log::trace!(field = field.name(); "Ignoring static member of record or annotation type");
        }
    }
}

/// Returns how many tokens the type argument list starting at the current
/// `<` spans, or `None` if the `<` is a comparison.
///
/// Only type-like tokens may appear before the matching `>`, so `LIMIT < 5`
/// and `a < b, c = d` are comparisons while `new HashMap<K, List<V>>()` and
/// `Map.<K, V>of()` are not.
fn type_arguments_len(input: &mut Input<'_>) -> Option<usize> {
    let checkpoint = input.checkpoint();
    let mut angles = 0usize;
    let mut len = 0usize;
    let closed = loop {
        let Some(token) = input.next_token() else {
            break false;
        };
        len += 1;
        match &token.token {
            Token::Less => angles += 1,
            Token::Greater => {
                angles -= 1;
                if angles == 0 {
                    break true;
                }
            }
            Token::Identifier(_)
            | Token::Dot
            | Token::Comma
            | Token::Question
            | Token::Extends
            | Token::At
            | Token::LeftBracket
            | Token::RightBracket => {}
            _ => break false,
        }
    };
    input.reset(&checkpoint);
    closed.then_some(len)
}

/// Skip `= expression` up to the `,` or `;` that ends the declarator.
fn skip_initializer(input: &mut Input<'_>) -> IResult<()> {
    expect(input, Token::Equals, "`=`")?;
    let mut depth = 0usize;
    let mut previous: Option<&Token<'_>> = None;
    loop {
        let Some(token) = peek(input) else {
            return Err(error_at(input, "`;`"));
        };
        match token {
            Token::Semicolon if depth == 0 => return Ok(()),
            Token::Comma if depth == 0 => return Ok(()),
            Token::LeftParen | Token::LeftBrace | Token::LeftBracket => depth += 1,
            Token::RightParen | Token::RightBrace | Token::RightBracket => {
                if depth == 0 {
                    return Err(error_at(input, "`;`"));
                }
                depth -= 1;
            }
            Token::Less if matches!(previous, Some(Token::Identifier(_) | Token::Dot)) => {
                if let Some(len) = type_arguments_len(input) {
                    for _ in 0..len {
                        input.next_token();
                    }
                    previous = Some(&Token::Greater);
                    continue;
                }
            }
            _ => {}
        }
        input.next_token();
        previous = Some(token);
    }
}

fn push_constant(decl: &mut TypeDecl, name: &str) {
    if let TypeBody::Enum { constants, .. } = decl.body_mut() {
        constants.push(name.to_string());
    }
}

/// Parse enum constants, then any members after the `;` separator.
fn enum_body(input: &mut Input<'_>, decl: &mut TypeDecl) -> IResult<()> {
    expect(input, Token::LeftBrace, "`{`")?;
    loop {
        if eat(input, &Token::RightBrace) {
            return Ok(());
        }
        if eat(input, &Token::Semicolon) {
            return members(input, decl);
        }

        modifiers(input)?;
        let name = identifier(input)?;
        push_constant(decl, name);
        if at(input, &Token::LeftParen) {
            skip_balanced(input)?;
        }
        if at(input, &Token::LeftBrace) {
            skip_balanced(input)?;
        }

        if !eat(input, &Token::Comma) {
            if eat(input, &Token::Semicolon) {
                return members(input, decl);
            }
            expect(input, Token::RightBrace, "`}`")?;
            return Ok(());
        }
    }
}

/// Parse a whole file: package, imports and top-level type declarations.
fn compilation_unit(input: &mut Input<'_>) -> IResult<CompilationUnit> {
    // Annotations may precede the package declaration in package-info files.
    let start = input.checkpoint();
    modifiers(input)?;
    let package = if eat(input, &Token::Package) {
        let name = qualified_name(input)?;
        expect(input, Token::Semicolon, "`;`")?;
        name
    } else {
        input.reset(&start);
        String::new()
    };

    let mut unit = CompilationUnit::new(package);
    loop {
        match peek(input) {
            None => return Ok(unit),
            Some(Token::Import) => skip_past_semicolon(input)?,
            Some(Token::Semicolon) => {
                input.next_token();
            }
            Some(_) => unit.push_type(type_declaration(input)?),
        }
    }
}

/// Convert a winnow error into a diagnostic pointing at the offending token.
///
/// Running out of tokens is reported as E101, anything else as E100.
fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken<'_>],
    current_remaining: usize,
) -> Diagnostic {
    let offset = tokens.len() - current_remaining;
    let expected = match &error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => {
            e.context().map(|Context::Label(label)| *label).next()
        }
        ErrMode::Incomplete(_) => None,
    };
    let label = expected.map_or_else(|| "unexpected token".to_string(), |e| format!("expected {e}"));

    match tokens.get(offset) {
        Some(token) => {
            let message = match expected {
                Some(e) => format!("unexpected token `{}`, expected {e}", token.token),
                None => format!("unexpected token `{}`", token.token),
            };
            Diagnostic::error(message)
                .with_code(ErrorCode::E100)
                .with_label(token.span, label)
                .with_help("only declarations are read; check the syntax around this token")
        }
        None => {
            let end = tokens.last().map(|t| t.span.end()).unwrap_or_default();
            let diag = Diagnostic::error("incomplete input, more tokens expected")
                .with_code(ErrorCode::E101)
                .with_label(Span::new(end..end), label)
                .with_help("the file ends inside a declaration");
            match innermost_unclosed_brace(tokens) {
                Some(open) => diag.with_secondary_label(open, "this block is never closed"),
                None => diag,
            }
        }
    }
}

/// Build a compilation unit from significant (non-trivia) tokens.
/// Returns the span of the last `{` that has no matching `}`.
fn innermost_unclosed_brace(tokens: &[PositionedToken<'_>]) -> Option<Span> {
    let mut open = Vec::new();
    for token in tokens {
        match token.token {
            Token::LeftBrace => open.push(token.span),
            Token::RightBrace => {
                open.pop();
            }
            _ => {}
        }
    }
    open.pop()
}

pub(crate) fn build_unit<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<CompilationUnit, Diagnostic> {
    let mut token_slice = TokenSlice::new(tokens);

    match compilation_unit(&mut token_slice) {
        Ok(unit) => Ok(unit),
        Err(e) => {
            let current_remaining = token_slice.eof_offset();
            Err(convert_error(e, tokens, current_remaining))
        }
    }
}
