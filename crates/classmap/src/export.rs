//! Diagram sinks.
//!
//! This module provides the [`DiagramSink`] trait that receives the statement
//! stream. It is the final stage in the classmap pipeline.
//!
//! # Pipeline Position
//!
//! ```text
//! Java Source
//!     ↓ parse
//! Compilation Units
//!     ↓ index
//! Declared-Type Index
//!     ↓ resolve
//! Declarations + Relationships
//!     ↓ export (this module)
//! Output
//! ```
//!
//! # Available Sinks
//!
//! - [`plantuml`]: PlantUML text via [`plantuml::PlantUmlSink`]
//! - [`StatementCollector`]: keeps the statements in memory

/// PlantUML export backend.
pub mod plantuml;

use std::io;

use crate::{
    resolve::Relationship,
    statement::{Declaration, Statement},
};

/// Receiver of the declaration and relationship stream.
///
/// Calls arrive in a fixed order: every [`declare`](Self::declare) first,
/// grouped by package, then every [`relate`](Self::relate), and finally one
/// [`finish`](Self::finish).
pub trait DiagramSink {
    /// Announces a declared type.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the sink cannot write the declaration.
    fn declare(&mut self, declaration: &Declaration) -> io::Result<()>;

    /// Adds an edge between two previously declared types.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the sink cannot write the relationship.
    fn relate(&mut self, relationship: &Relationship) -> io::Result<()>;

    /// Ends the stream. No further calls follow.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if closing or flushing the output fails.
    fn finish(&mut self) -> io::Result<()>;
}

/// A [`DiagramSink`] that records every statement in memory.
#[derive(Debug, Default)]
pub struct StatementCollector {
    statements: Vec<Statement>,
    finished: bool,
}

impl StatementCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the statements received so far.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn into_statements(self) -> Vec<Statement> {
        self.statements
    }

    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.statements.iter().filter_map(|statement| match statement {
            Statement::Declare(declaration) => Some(declaration),
            Statement::Relate(_) => None,
        })
    }

    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.statements.iter().filter_map(|statement| match statement {
            Statement::Relate(relationship) => Some(relationship),
            Statement::Declare(_) => None,
        })
    }

    /// Returns `true` once [`DiagramSink::finish`] was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl DiagramSink for StatementCollector {
    fn declare(&mut self, declaration: &Declaration) -> io::Result<()> {
        self.statements.push(Statement::Declare(declaration.clone()));
        Ok(())
    }

    fn relate(&mut self, relationship: &Relationship) -> io::Result<()> {
        self.statements.push(Statement::Relate(relationship.clone()));
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.finished = true;
        Ok(())
    }
}
