//! Classmap - PlantUML class diagrams from Java declarations.
//!
//! Parsing, indexing, relationship resolution and PlantUML export. Every
//! declared type becomes a diagram node; inheritance, nesting and field
//! associations between indexed types become edges.

pub mod config;
pub mod export;
pub mod index;
pub mod progress;
pub mod resolve;
pub mod statement;

mod emit;
mod error;

pub use classmap_core::{declaration, fqn};

pub use emit::emit;
pub use error::ClassmapError;

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use log::{debug, info, trace};

use config::AppConfig;
use declaration::CompilationUnit;
use export::plantuml::PlantUmlSink;
use index::DeclaredIndex;
use progress::{NoProgress, ProgressSink};

/// Builder for parsing Java sources and rendering class diagrams.
///
/// This provides an API for processing Java sources through parsing,
/// indexing, and rendering stages.
///
/// # Examples
///
/// ```rust,no_run
/// use classmap::{DiagramBuilder, config::AppConfig};
///
/// let source = "package shop; public class Order { private Customer customer; }";
///
/// // With custom config
/// let config = AppConfig::default().with_title("Shop");
/// let builder = DiagramBuilder::new(config);
///
/// // Parse source to a compilation unit
/// let unit = builder.parse(source)
///     .expect("Failed to parse");
///
/// // Render the units to PlantUML
/// let puml = builder.render(&[unit])
///     .expect("Failed to render");
///
/// // Or use default config
/// let builder = DiagramBuilder::default();
/// ```
#[derive(Default)]
pub struct DiagramBuilder {
    config: AppConfig,
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including diagram settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration this builder renders with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse one Java source file into a compilation unit.
    ///
    /// # Arguments
    ///
    /// * `source` - Java source code as a string
    ///
    /// # Errors
    ///
    /// Returns `ClassmapError::Parse` for lexical or syntax errors in the
    /// declaration structure.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use classmap::{DiagramBuilder, config::AppConfig};
    ///
    /// let builder = DiagramBuilder::new(AppConfig::default());
    /// let unit = builder.parse("package p; class A {}")
    ///     .expect("Failed to parse source");
    /// assert_eq!(unit.package(), "p");
    /// ```
    pub fn parse(&self, source: &str) -> Result<CompilationUnit, ClassmapError> {
        debug!("Parsing compilation unit");

        let unit = classmap_parser::parse(source)
            .map_err(|err| ClassmapError::new_parse_error(err, source))?;

        trace!(package = unit.package(), types = unit.types().len(); "Parsed compilation unit");
        Ok(unit)
    }

    /// Read and parse a Java source file.
    ///
    /// The returned unit remembers `path`, and parse errors carry it too.
    ///
    /// # Errors
    ///
    /// Returns `ClassmapError::Io` if the file cannot be read and
    /// `ClassmapError::Parse` if it does not parse.
    pub fn parse_file(&self, path: &Path) -> Result<CompilationUnit, ClassmapError> {
        debug!(path:? = path; "Reading source file");
        let source = fs::read_to_string(path)?;

        self.parse(&source)
            .map(|unit| unit.with_path(path))
            .map_err(|err| err.with_path(path))
    }

    /// Build the declared-type index over `units`.
    ///
    /// # Errors
    ///
    /// Returns `ClassmapError::Index` if a unit is malformed.
    pub fn index<'a>(
        &self,
        units: &'a [CompilationUnit],
    ) -> Result<DeclaredIndex<'a>, ClassmapError> {
        Ok(DeclaredIndex::build(units)?)
    }

    /// Render `units` to a PlantUML string.
    ///
    /// # Errors
    ///
    /// Returns `ClassmapError` for malformed units or export failures.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use classmap::DiagramBuilder;
    ///
    /// let builder = DiagramBuilder::default();
    /// let units = vec![
    ///     builder.parse("package pa; interface A {}").expect("Failed to parse"),
    ///     builder.parse("package pb; class B implements pa.A {}").expect("Failed to parse"),
    /// ];
    ///
    /// let puml = builder.render(&units)
    ///     .expect("Failed to render diagram");
    ///
    /// println!("{}", puml);
    /// ```
    pub fn render(&self, units: &[CompilationUnit]) -> Result<String, ClassmapError> {
        let mut buffer = Vec::new();
        self.render_to(units, &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| ClassmapError::Export(err.to_string()))
    }

    /// Render `units` as PlantUML into `out`.
    ///
    /// # Errors
    ///
    /// Returns `ClassmapError` for malformed units or write failures.
    pub fn render_to<W: Write>(
        &self,
        units: &[CompilationUnit],
        out: W,
    ) -> Result<(), ClassmapError> {
        self.render_with(units, out, &mut NoProgress)
    }

    /// Render `units` as PlantUML into `out`, reporting progress.
    ///
    /// # Errors
    ///
    /// Returns `ClassmapError` for malformed units or write failures.
    pub fn render_with<W: Write>(
        &self,
        units: &[CompilationUnit],
        out: W,
        progress: &mut dyn ProgressSink,
    ) -> Result<(), ClassmapError> {
        info!(units = units.len(); "Building declared-type index");
        let index = DeclaredIndex::build_with(units, progress)?;
        info!(types = index.len(); "Index built");

        let mut sink = PlantUmlSink::new(out, self.config.diagram());
        emit(&index, &mut sink, progress).map_err(export_error)?;

        info!("Diagram rendered successfully");
        Ok(())
    }
}

fn export_error(err: io::Error) -> ClassmapError {
    match err.kind() {
        io::ErrorKind::InvalidInput => ClassmapError::Export(err.to_string()),
        _ => ClassmapError::Io(err),
    }
}
