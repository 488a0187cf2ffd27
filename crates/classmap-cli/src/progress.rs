//! Run statistics for the CLI.

use std::path::Path;

use log::{debug, info};

use classmap::{
    declaration::{CompilationUnit, TypeKind},
    fqn::Fqn,
    progress::ProgressSink,
    resolve::{RelationKind, Relationship},
};

/// Counts what a single CLI run did.
///
/// The dashboard is created by [`run`](crate::run) and returned when the run
/// completes. Every event is logged at `debug`.
#[derive(Debug, Default, Clone)]
pub struct Dashboard {
    files: usize,
    skipped_files: usize,
    units: usize,
    types: usize,
    duplicates: usize,
    unresolved: usize,
    relationships: usize,
}

impl Dashboard {
    /// Records a source file about to be parsed.
    pub fn on_file(&mut self, path: &Path) {
        self.files += 1;
        debug!(path = path.display().to_string(); "Parsing source file");
    }

    /// Records a source file that failed to parse and was skipped.
    pub fn on_skipped(&mut self, path: &Path) {
        self.skipped_files += 1;
        debug!(path = path.display().to_string(); "Source file skipped");
    }

    pub fn files(&self) -> usize {
        self.files
    }

    pub fn skipped_files(&self) -> usize {
        self.skipped_files
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn types(&self) -> usize {
        self.types
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn unresolved(&self) -> usize {
        self.unresolved
    }

    pub fn relationships(&self) -> usize {
        self.relationships
    }

    /// Logs the totals at `info`.
    pub fn log_summary(&self) {
        info!(
            files = self.files,
            skipped_files = self.skipped_files,
            units = self.units,
            types = self.types,
            duplicates = self.duplicates,
            unresolved = self.unresolved,
            relationships = self.relationships;
            "Run summary"
        );
    }
}

impl ProgressSink for Dashboard {
    fn on_unit(&mut self, unit: &CompilationUnit) {
        self.units += 1;
        debug!(package = unit.package(), types = unit.types().len(); "Indexing unit");
    }

    fn on_type(&mut self, fqn: &Fqn, kind: TypeKind) {
        self.types += 1;
        debug!(fqn = fqn.as_str(), kind:% = kind; "Type indexed");
    }

    fn on_duplicate(&mut self, fqn: &Fqn) {
        self.duplicates += 1;
        debug!(fqn = fqn.as_str(); "Duplicate type replaced");
    }

    fn on_unresolved(&mut self, source: &Fqn, raw: &str, kind: RelationKind) {
        self.unresolved += 1;
        debug!(source = source.as_str(), raw = raw, kind:% = kind; "Reference left unresolved");
    }

    fn on_relationship(&mut self, relationship: &Relationship) {
        self.relationships += 1;
        debug!(relationship:% = relationship; "Relationship derived");
    }
}
