//! The statement stream handed to a [`DiagramSink`](crate::export::DiagramSink).
//!
//! Every indexed type is announced with a [`Declaration`] before any
//! [`Relationship`] refers to it.

use classmap_core::{
    declaration::{TypeBody, TypeDecl, TypeKind, Visibility},
    fqn::Fqn,
};

use crate::{index::DeclaredIndex, resolve::Relationship};

/// One item of the emitted stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Declare(Declaration),
    Relate(Relationship),
}

/// Announces one indexed type.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub fqn: Fqn,
    /// Package of the declaring compilation unit; empty for the unnamed package.
    pub package: String,
    pub kind: TypeKind,
    /// Identifier to draw; nested types use `owner_SimpleName`.
    pub rendered_name: String,
    pub is_abstract: bool,
    /// Annotation names on the type.
    pub stereotypes: Vec<String>,
    pub members: Vec<Member>,
}

/// A structural member drawn inside a type block.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Field {
        name: String,
        type_name: String,
        visibility: Visibility,
        is_static: bool,
        is_final: bool,
        is_transient: bool,
        is_volatile: bool,
    },
    Component {
        name: String,
        type_name: String,
    },
    Constant {
        name: String,
    },
}

impl Declaration {
    /// Describes `decl`, indexed under `fqn` in `package`.
    ///
    /// Enum constants come first, then record components, then fields, each
    /// in declaration order.
    pub fn describe(index: &DeclaredIndex<'_>, package: &str, fqn: &Fqn, decl: &TypeDecl) -> Self {
        let modifiers = decl.modifiers();
        let is_abstract = modifiers.is_abstract && decl.kind() == TypeKind::Class;

        let mut members: Vec<Member> = decl
            .constants()
            .iter()
            .map(|name| Member::Constant { name: name.clone() })
            .collect();

        if let TypeBody::Record { components, .. } = decl.body() {
            members.extend(components.iter().map(|component| Member::Component {
                name: component.name().to_string(),
                type_name: component.type_name().to_string(),
            }));
        }

        members.extend(decl.fields().iter().map(|field| {
            let modifiers = field.modifiers();
            Member::Field {
                name: field.name().to_string(),
                type_name: field.type_name().to_string(),
                visibility: modifiers.visibility,
                is_static: modifiers.is_static,
                is_final: modifiers.is_final,
                is_transient: modifiers.is_transient,
                is_volatile: modifiers.is_volatile,
            }
        }));

        Self {
            fqn: fqn.clone(),
            package: package.to_string(),
            kind: decl.kind(),
            rendered_name: index.rendered_name(fqn),
            is_abstract,
            stereotypes: decl.annotations().to_vec(),
            members,
        }
    }
}
