//! Type declaration model.
//!
//! This module contains the read-only representation of declared types that
//! the parser produces and the index consumes. Every declaration carries its
//! kind-specific payload in a [`TypeBody`] variant, so consumers match on the
//! body instead of inspecting the kind at run time.
//!
//! # Pipeline Position
//!
//! ```text
//! Java Source
//!     ↓ classmap-parser
//! Compilation Units (these types)
//!     ↓ index
//! Declared-Type Index
//!     ↓ resolve
//! Relationships
//!     ↓ emit
//! PlantUML
//! ```

use std::{fmt, path::PathBuf};

/// The syntactic category of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

impl TypeKind {
    /// Returns the diagram keyword used to declare this kind of type.
    pub fn keyword(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Record => "record",
            TypeKind::Annotation => "annotation",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Member visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    /// No access modifier was written.
    #[default]
    Package,
    Private,
}

/// Declaration modifiers that matter structurally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub is_transient: bool,
    pub is_volatile: bool,
}

impl Modifiers {
    /// Creates modifiers with the given visibility and no flags set.
    pub fn new(visibility: Visibility) -> Self {
        Self {
            visibility,
            ..Self::default()
        }
    }

    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn with_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_transient(mut self) -> Self {
        self.is_transient = true;
        self
    }

    pub fn with_volatile(mut self) -> Self {
        self.is_volatile = true;
        self
    }
}

/// A single field declarator.
///
/// `int a, b;` produces two fields sharing the same type string.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    type_name: String,
    modifiers: Modifiers,
    annotations: Vec<String>,
}

impl Field {
    /// Creates a field with a raw, possibly generic or array type string.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            modifiers: Modifiers::default(),
            annotations: Vec::new(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the type exactly as written, e.g. `List<Order>` or `byte[]`.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn annotations(&self) -> &[String] {
        &self.annotations
    }
}

/// A record component from a record header.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordComponent {
    name: String,
    type_name: String,
    annotations: Vec<String>,
}

impl RecordComponent {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            annotations: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn annotations(&self) -> &[String] {
        &self.annotations
    }
}

/// Kind-specific payload of a type declaration.
///
/// Supertype and interface names are raw strings as written in the source:
/// possibly unqualified, possibly carrying type arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeBody {
    Class {
        extends: Vec<String>,
        implements: Vec<String>,
        fields: Vec<Field>,
    },
    Interface {
        extends: Vec<String>,
        fields: Vec<Field>,
    },
    Enum {
        implements: Vec<String>,
        constants: Vec<String>,
        fields: Vec<Field>,
    },
    Record {
        implements: Vec<String>,
        components: Vec<RecordComponent>,
    },
    Annotation,
}

impl TypeBody {
    /// Returns the kind this payload belongs to.
    pub fn kind(&self) -> TypeKind {
        match self {
            TypeBody::Class { .. } => TypeKind::Class,
            TypeBody::Interface { .. } => TypeKind::Interface,
            TypeBody::Enum { .. } => TypeKind::Enum,
            TypeBody::Record { .. } => TypeKind::Record,
            TypeBody::Annotation => TypeKind::Annotation,
        }
    }

    /// Creates an empty payload for `kind`.
    pub fn empty(kind: TypeKind) -> Self {
        match kind {
            TypeKind::Class => TypeBody::Class {
                extends: Vec::new(),
                implements: Vec::new(),
                fields: Vec::new(),
            },
            TypeKind::Interface => TypeBody::Interface {
                extends: Vec::new(),
                fields: Vec::new(),
            },
            TypeKind::Enum => TypeBody::Enum {
                implements: Vec::new(),
                constants: Vec::new(),
                fields: Vec::new(),
            },
            TypeKind::Record => TypeBody::Record {
                implements: Vec::new(),
                components: Vec::new(),
            },
            TypeKind::Annotation => TypeBody::Annotation,
        }
    }
}

/// One declared class, interface, enum, record or annotation type.
///
/// # Examples
///
/// ```
/// use classmap_core::declaration::{Field, TypeDecl, TypeKind};
///
/// let order = TypeDecl::class("Order")
///     .with_extends("Entity")
///     .with_implements("Serializable")
///     .with_field(Field::new("customer", "Customer"))
///     .with_nested(TypeDecl::record("Line"));
///
/// assert_eq!(order.kind(), TypeKind::Class);
/// assert_eq!(order.extends(), ["Entity"]);
/// assert_eq!(order.nested().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    name: String,
    modifiers: Modifiers,
    annotations: Vec<String>,
    body: TypeBody,
    nested: Vec<TypeDecl>,
}

impl TypeDecl {
    /// Creates a declaration with the given simple name and payload.
    pub fn new(name: impl Into<String>, body: TypeBody) -> Self {
        Self {
            name: name.into(),
            modifiers: Modifiers::default(),
            annotations: Vec::new(),
            body,
            nested: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeBody::empty(TypeKind::Class))
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeBody::empty(TypeKind::Interface))
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::new(name, TypeBody::empty(TypeKind::Enum))
    }

    pub fn record(name: impl Into<String>) -> Self {
        Self::new(name, TypeBody::empty(TypeKind::Record))
    }

    pub fn annotation(name: impl Into<String>) -> Self {
        Self::new(name, TypeBody::empty(TypeKind::Annotation))
    }

    /// Adds a supertype name. Only classes and interfaces have one.
    pub fn with_extends(mut self, raw: impl Into<String>) -> Self {
        match &mut self.body {
            TypeBody::Class { extends, .. } | TypeBody::Interface { extends, .. } => {
                extends.push(raw.into())
            }
            TypeBody::Enum { .. } | TypeBody::Record { .. } | TypeBody::Annotation => {}
        }
        self
    }

    /// Adds an implemented interface name to a class, enum or record.
    pub fn with_implements(mut self, raw: impl Into<String>) -> Self {
        match &mut self.body {
            TypeBody::Class { implements, .. }
            | TypeBody::Enum { implements, .. }
            | TypeBody::Record { implements, .. } => implements.push(raw.into()),
            TypeBody::Interface { .. } | TypeBody::Annotation => {}
        }
        self
    }

    /// Adds a field to a class, interface or enum.
    pub fn with_field(mut self, field: Field) -> Self {
        if let Some(fields) = self.fields_mut() {
            fields.push(field);
        }
        self
    }

    /// Adds a record component. Only records have components.
    pub fn with_component(mut self, component: RecordComponent) -> Self {
        if let TypeBody::Record { components, .. } = &mut self.body {
            components.push(component);
        }
        self
    }

    /// Adds an enum constant. Only enums have constants.
    pub fn with_constant(mut self, constant: impl Into<String>) -> Self {
        if let TypeBody::Enum { constants, .. } = &mut self.body {
            constants.push(constant.into());
        }
        self
    }

    pub fn with_nested(mut self, nested: TypeDecl) -> Self {
        self.nested.push(nested);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    /// Returns the simple name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.body.kind()
    }

    pub fn body(&self) -> &TypeBody {
        &self.body
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Returns the simple names of the annotations on this declaration.
    pub fn annotations(&self) -> &[String] {
        &self.annotations
    }

    /// Returns the directly nested declarations in source order.
    pub fn nested(&self) -> &[TypeDecl] {
        &self.nested
    }

    /// Returns declared supertype names; empty for enums, records and annotations.
    pub fn extends(&self) -> &[String] {
        match &self.body {
            TypeBody::Class { extends, .. } | TypeBody::Interface { extends, .. } => extends,
            TypeBody::Enum { .. } | TypeBody::Record { .. } | TypeBody::Annotation => &[],
        }
    }

    /// Returns implemented interface names; empty for interfaces and annotations.
    pub fn implements(&self) -> &[String] {
        match &self.body {
            TypeBody::Class { implements, .. }
            | TypeBody::Enum { implements, .. }
            | TypeBody::Record { implements, .. } => implements,
            TypeBody::Interface { .. } | TypeBody::Annotation => &[],
        }
    }

    pub fn fields(&self) -> &[Field] {
        match &self.body {
            TypeBody::Class { fields, .. }
            | TypeBody::Interface { fields, .. }
            | TypeBody::Enum { fields, .. } => fields,
            TypeBody::Record { .. } | TypeBody::Annotation => &[],
        }
    }

    pub fn components(&self) -> &[RecordComponent] {
        match &self.body {
            TypeBody::Record { components, .. } => components,
            _ => &[],
        }
    }

    pub fn constants(&self) -> &[String] {
        match &self.body {
            TypeBody::Enum { constants, .. } => constants,
            _ => &[],
        }
    }

    /// Mutable access to the payload, used by the parser while a body is built.
    pub fn body_mut(&mut self) -> &mut TypeBody {
        &mut self.body
    }

    /// Mutable access to the nested declarations.
    pub fn nested_mut(&mut self) -> &mut Vec<TypeDecl> {
        &mut self.nested
    }

    fn fields_mut(&mut self) -> Option<&mut Vec<Field>> {
        match &mut self.body {
            TypeBody::Class { fields, .. }
            | TypeBody::Interface { fields, .. }
            | TypeBody::Enum { fields, .. } => Some(fields),
            TypeBody::Record { .. } | TypeBody::Annotation => None,
        }
    }
}

/// One parsed source file: a package and its top-level declarations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompilationUnit {
    package: String,
    types: Vec<TypeDecl>,
    path: Option<PathBuf>,
}

impl CompilationUnit {
    /// Creates a unit for `package`; an empty string is the unnamed package.
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            types: Vec::new(),
            path: None,
        }
    }

    pub fn with_type(mut self, decl: TypeDecl) -> Self {
        self.types.push(decl);
        self
    }

    /// Records the file this unit was parsed from.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn push_type(&mut self, decl: TypeDecl) {
        self.types.push(decl);
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn types(&self) -> &[TypeDecl] {
        &self.types
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}
