//! # classmap parser
//!
//! Extracts the declaration skeleton of a Java compilation unit: its
//! package, and every class, interface, enum, record and annotation type
//! with their supertypes, fields, record components, enum constants and
//! nested types. Method bodies and initializers are skipped, so the parser
//! is tolerant of any statement syntax as long as brackets balance.
//!
//! ## Usage
//!
//! ```
//! # use classmap_parser::{parse, ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         package com.acme;
//!
//!         public class Order extends Entity implements Serializable {
//!             private Customer customer;
//!             public Customer getCustomer() { return customer; }
//!         }
//!     "#;
//!
//!     let unit = parse(source)?;
//!     assert_eq!(unit.package(), "com.acme");
//!     assert_eq!(unit.types()[0].fields()[0].type_name(), "Customer");
//!     Ok(())
//! }
//! ```

pub mod error;
mod lexer;
mod parser;
mod span;
pub mod tokens;

pub use error::ParseError;
pub use lexer::tokenize;
pub use span::Span;

use classmap_core::declaration::CompilationUnit;
use log::trace;

/// Parse Java source text into a [`CompilationUnit`].
///
/// The pipeline has two steps:
///
/// 1. **Tokenize** - Convert source text to tokens, collecting every lexical error
/// 2. **Parse** - Read declarations from the significant tokens
///
/// # Errors
///
/// Returns a [`ParseError`] carrying one or more diagnostics with error
/// codes and source spans when the text is not well-formed enough to read
/// its declarations.
///
/// # Example
///
/// ```
/// # use classmap_parser::parse;
/// let unit = parse("record Point(int x, int y) {}").unwrap();
/// assert_eq!(unit.package(), "");
/// assert_eq!(unit.types()[0].components().len(), 2);
///
/// assert!(parse("class Broken {").is_err());
/// ```
pub fn parse(source: &str) -> Result<CompilationUnit, ParseError> {
    let tokens = lexer::tokenize(source)?;
    let significant: Vec<_> = tokens.into_iter().filter(|t| !t.is_trivia()).collect();
    trace!(tokens = significant.len(); "Tokenized source");

    let unit = parser::build_unit(&significant)?;
    trace!(
        package = unit.package(),
        types = unit.types().len();
        "Parsed compilation unit"
    );
    Ok(unit)
}
