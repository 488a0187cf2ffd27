//! The declared-type index.
//!
//! [`DeclaredIndex`] is a flat table of every type declared in a set of
//! compilation units, nested types included, keyed by [`Fqn`]. It is the only
//! source of truth for name resolution: a reference that does not resolve to
//! an indexed type produces no relationship.
//!
//! # Example
//!
//! ```
//! use classmap::index::DeclaredIndex;
//! use classmap_core::declaration::{CompilationUnit, TypeDecl};
//!
//! let units = vec![
//!     CompilationUnit::new("p").with_type(TypeDecl::class("A")),
//!     CompilationUnit::new("q").with_type(TypeDecl::class("B")),
//! ];
//! let index = DeclaredIndex::build(&units).expect("valid units");
//!
//! let b = index.resolve_type_name("p", "B").expect("unique simple name");
//! assert_eq!(b, "q.B");
//! ```

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, trace, warn};
use thiserror::Error;

use classmap_core::{
    declaration::{CompilationUnit, TypeDecl},
    fqn::{Fqn, simple_name},
};

use crate::progress::{NoProgress, ProgressSink};

/// Malformed declaration model handed to [`DeclaredIndex::build`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("type declared in package `{package}` has an empty name")]
    EmptyTypeName { package: String },

    #[error("type name `{name}` in package `{package}` is not a simple identifier")]
    InvalidTypeName { package: String, name: String },

    #[error("package name `{package}` has an empty segment")]
    InvalidPackage { package: String },
}

/// Index of every declared type, keyed by fully-qualified name.
///
/// The index borrows the declarations from the compilation units it was
/// built from. Packages are kept in lexicographic order and so are the FQNs
/// inside each package, which makes every traversal deterministic.
#[derive(Debug)]
pub struct DeclaredIndex<'a> {
    by_fqn: IndexMap<Fqn, &'a TypeDecl>,
    package_of: HashMap<Fqn, &'a str>,
    types_by_package: IndexMap<String, Vec<Fqn>>,
    unique_simple_names: HashMap<String, Fqn>,
}

impl<'a> DeclaredIndex<'a> {
    /// Builds the index from `units` without progress reporting.
    ///
    /// # Errors
    ///
    /// Returns an [`IndexError`] when a unit carries a malformed package name
    /// or a declaration has an unusable simple name.
    pub fn build(units: &'a [CompilationUnit]) -> Result<Self, IndexError> {
        Self::build_with(units, &mut NoProgress)
    }

    /// Builds the index from `units`, reporting each unit, type and
    /// duplicate to `progress`.
    ///
    /// Declarations are collected with an explicit worklist, so nesting depth
    /// is not bounded by the call stack. When two declarations share an FQN
    /// the later one replaces the earlier one.
    ///
    /// # Errors
    ///
    /// See [`DeclaredIndex::build`].
    pub fn build_with(
        units: &'a [CompilationUnit],
        progress: &mut dyn ProgressSink,
    ) -> Result<Self, IndexError> {
        let mut by_fqn: IndexMap<Fqn, &'a TypeDecl> = IndexMap::new();
        let mut package_of: HashMap<Fqn, &'a str> = HashMap::new();

        for unit in units {
            let package = unit.package();
            validate_package(package)?;
            progress.on_unit(unit);
            trace!(package = package, types = unit.types().len(); "Indexing compilation unit");

            let mut worklist: Vec<(Option<Fqn>, &'a TypeDecl)> =
                unit.types().iter().rev().map(|decl| (None, decl)).collect();

            while let Some((owner, decl)) = worklist.pop() {
                validate_type_name(package, decl.name())?;

                let fqn = match owner {
                    Some(owner) => owner.nested(decl.name()),
                    None => Fqn::top_level(package, decl.name()),
                };

                worklist.extend(
                    decl.nested()
                        .iter()
                        .rev()
                        .map(|nested| (Some(fqn.clone()), nested)),
                );

                if by_fqn.insert(fqn.clone(), decl).is_some() {
                    warn!(fqn = fqn.as_str(); "Duplicate type declaration replaces the earlier one");
                    progress.on_duplicate(&fqn);
                }
                package_of.insert(fqn.clone(), package);
                progress.on_type(&fqn, decl.kind());
            }
        }

        let mut types_by_package: IndexMap<String, Vec<Fqn>> = IndexMap::new();
        for fqn in by_fqn.keys() {
            let package = package_of.get(fqn).copied().unwrap_or_default();
            types_by_package
                .entry(package.to_string())
                .or_default()
                .push(fqn.clone());
        }
        types_by_package.sort_keys();
        for fqns in types_by_package.values_mut() {
            fqns.sort();
        }

        let unique_simple_names = unique_simple_names(by_fqn.keys());

        debug!(
            types = by_fqn.len(),
            packages = types_by_package.len(),
            unique_simple_names = unique_simple_names.len();
            "Declared-type index built"
        );

        Ok(Self {
            by_fqn,
            package_of,
            types_by_package,
            unique_simple_names,
        })
    }

    /// Returns the declaration indexed under `fqn`.
    pub fn get(&self, fqn: &str) -> Option<&'a TypeDecl> {
        self.by_fqn.get(fqn).copied()
    }

    /// Returns the indexed key equal to `fqn`.
    pub fn fqn(&self, fqn: &str) -> Option<&Fqn> {
        self.by_fqn.get_key_value(fqn).map(|(key, _)| key)
    }

    /// Returns `true` if a type is indexed under `fqn`.
    pub fn contains(&self, fqn: &str) -> bool {
        self.by_fqn.contains_key(fqn)
    }

    /// Returns the package of the compilation unit that declared `fqn`.
    ///
    /// Nested types report their outermost enclosing unit's package, which is
    /// not what splitting the FQN at its last dot would give.
    pub fn package_of(&self, fqn: &str) -> Option<&'a str> {
        self.package_of.get(fqn).copied()
    }

    /// Iterates packages in lexicographic order with their sorted FQNs.
    pub fn packages(&self) -> impl Iterator<Item = (&str, &[Fqn])> {
        self.types_by_package
            .iter()
            .map(|(package, fqns)| (package.as_str(), fqns.as_slice()))
    }

    /// Iterates every indexed type as `(package, fqn, declaration)`, in
    /// package order and then FQN order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Fqn, &'a TypeDecl)> {
        self.packages().flat_map(move |(package, fqns)| {
            fqns.iter()
                .filter_map(move |fqn| self.get(fqn.as_str()).map(|decl| (package, fqn, decl)))
        })
    }

    /// Returns the number of indexed types.
    pub fn len(&self) -> usize {
        self.by_fqn.len()
    }

    /// Returns `true` if no type is indexed.
    pub fn is_empty(&self) -> bool {
        self.by_fqn.is_empty()
    }

    /// Returns the FQN of the only indexed type called `name`.
    ///
    /// Names shared by two or more types are never mapped.
    pub fn unique_simple_name(&self, name: &str) -> Option<&Fqn> {
        self.unique_simple_names.get(name)
    }

    /// Returns the diagram identifier for `fqn`.
    ///
    /// A type whose structural owner is itself indexed is rendered as
    /// `owner_SimpleName`; every other type keeps its dotted FQN.
    pub fn rendered_name(&self, fqn: &Fqn) -> String {
        match fqn.owner() {
            Some(owner) if self.contains(owner) => format!("{owner}_{}", fqn.simple_name()),
            _ => fqn.to_string(),
        }
    }

    /// Resolves a raw type reference made from `owner_package`.
    ///
    /// The reference is normalized with [`normalize_type_name`] and then
    /// looked up, in order, as an indexed FQN (only when it is qualified), as
    /// a type of `owner_package`, and as a unique simple name. `None` means
    /// the reference is unresolved.
    pub fn resolve_type_name(&self, owner_package: &str, raw: &str) -> Option<Fqn> {
        let name = normalize_type_name(raw);
        if name.is_empty() {
            return None;
        }

        if name.contains('.') {
            if let Some(fqn) = self.fqn(&name) {
                return Some(fqn.clone());
            }
        }

        let simple = simple_name(&name);
        let same_package = Fqn::top_level(owner_package, simple);
        if let Some(fqn) = self.fqn(same_package.as_str()) {
            return Some(fqn.clone());
        }

        self.unique_simple_name(simple).cloned()
    }
}

/// Strips the decorations a raw type reference may carry.
///
/// Every balanced `<...>` segment is removed, at any depth, together with
/// `[]` pairs, a trailing varargs `...` and all whitespace.
///
/// # Examples
///
/// ```
/// use classmap::index::normalize_type_name;
///
/// assert_eq!(normalize_type_name("Map<String, List<Order>>"), "Map");
/// assert_eq!(normalize_type_name(" Order[] [] "), "Order");
/// assert_eq!(normalize_type_name("com.acme.Line..."), "com.acme.Line");
/// ```
pub fn normalize_type_name(raw: &str) -> String {
    let mut depth = 0usize;
    let mut name = String::with_capacity(raw.len());

    for c in raw.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth > 0 || c.is_whitespace() => {}
            _ => name.push(c),
        }
    }

    let name = name.replace("[]", "");
    match name.strip_suffix("...") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

fn unique_simple_names<'k>(fqns: impl Iterator<Item = &'k Fqn>) -> HashMap<String, Fqn> {
    let mut seen: HashMap<&'k str, Option<&'k Fqn>> = HashMap::new();
    for fqn in fqns {
        seen.entry(fqn.simple_name())
            .and_modify(|slot| *slot = None)
            .or_insert(Some(fqn));
    }

    seen.into_iter()
        .filter_map(|(name, fqn)| fqn.map(|fqn| (name.to_string(), fqn.clone())))
        .collect()
}

fn validate_package(package: &str) -> Result<(), IndexError> {
    if package.is_empty() {
        return Ok(());
    }
    let malformed = package
        .split('.')
        .any(|segment| segment.is_empty() || segment.chars().any(char::is_whitespace));
    if malformed {
        return Err(IndexError::InvalidPackage {
            package: package.to_string(),
        });
    }
    Ok(())
}

fn validate_type_name(package: &str, name: &str) -> Result<(), IndexError> {
    if name.is_empty() {
        return Err(IndexError::EmptyTypeName {
            package: package.to_string(),
        });
    }
    if name.contains('.') || name.chars().any(char::is_whitespace) {
        return Err(IndexError::InvalidTypeName {
            package: package.to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}
