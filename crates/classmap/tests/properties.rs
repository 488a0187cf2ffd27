//! Property tests over randomly generated declaration sets.

use std::collections::HashSet;

use proptest::{prelude::*, test_runner::TestCaseError};

use classmap::{
    DiagramBuilder, emit,
    declaration::{CompilationUnit, Field, RecordComponent, TypeDecl},
    export::StatementCollector,
    index::DeclaredIndex,
    progress::NoProgress,
    resolve::{RelationKind, RelationshipResolver},
    statement::Statement,
};

// ===================
// Strategies
// ===================

fn name_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["A", "B", "Order", "Line", "Customer"])
}

fn type_ref_strategy() -> impl Strategy<Value = String> {
    (
        name_strategy(),
        prop::sample::select(vec!["", "p.", "q.", "java.util."]),
        prop::sample::select(vec!["", "[]", "<T>", "<Map<K, V>>[]", "..."]),
    )
        .prop_map(|(name, prefix, suffix)| format!("{prefix}{name}{suffix}"))
}

fn decl_strategy() -> impl Strategy<Value = TypeDecl> {
    (
        name_strategy(),
        0..5usize,
        prop::collection::vec(type_ref_strategy(), 0..3),
        prop::collection::vec(type_ref_strategy(), 0..4),
        prop::collection::vec(name_strategy(), 0..3),
    )
        .prop_map(|(name, kind, supertypes, members, nested)| {
            let mut decl = match kind {
                0 => TypeDecl::class(name),
                1 => TypeDecl::interface(name),
                2 => TypeDecl::enumeration(name),
                3 => TypeDecl::record(name),
                _ => TypeDecl::annotation(name),
            };
            for supertype in supertypes {
                decl = decl.with_extends(supertype.clone()).with_implements(supertype);
            }
            for (i, type_name) in members.into_iter().enumerate() {
                decl = decl
                    .with_field(Field::new(format!("f{i}"), type_name.clone()))
                    .with_component(RecordComponent::new(format!("c{i}"), type_name));
            }
            for inner in nested {
                decl = decl.with_nested(
                    TypeDecl::class(inner).with_field(Field::new("owner", name)),
                );
            }
            decl
        })
}

fn units_strategy() -> impl Strategy<Value = Vec<CompilationUnit>> {
    prop::collection::vec(
        (
            prop::sample::select(vec!["", "p", "q", "p.sub"]),
            prop::collection::vec(decl_strategy(), 1..4),
        ),
        0..5,
    )
    .prop_map(|units| {
        units
            .into_iter()
            .map(|(package, decls)| {
                decls
                    .into_iter()
                    .fold(CompilationUnit::new(package), CompilationUnit::with_type)
            })
            .collect()
    })
}

// ===================
// Properties
// ===================

fn statements(units: &[CompilationUnit]) -> Result<Vec<Statement>, TestCaseError> {
    let index = DeclaredIndex::build(units).map_err(|err| TestCaseError::fail(err.to_string()))?;
    let mut collector = StatementCollector::new();
    emit(&index, &mut collector, &mut NoProgress)
        .map_err(|err| TestCaseError::fail(err.to_string()))?;
    Ok(collector.into_statements())
}

fn check_determinism(units: &[CompilationUnit]) -> Result<(), TestCaseError> {
    prop_assert_eq!(statements(units)?, statements(units)?);

    let builder = DiagramBuilder::default();
    let first = builder.render(units).map_err(|err| TestCaseError::fail(err.to_string()))?;
    let second = builder.render(units).map_err(|err| TestCaseError::fail(err.to_string()))?;
    prop_assert_eq!(first, second);
    Ok(())
}

fn check_fqn_uniqueness(units: &[CompilationUnit]) -> Result<(), TestCaseError> {
    let index = DeclaredIndex::build(units).map_err(|err| TestCaseError::fail(err.to_string()))?;

    let mut seen = HashSet::new();
    for (package, fqn, _) in index.iter() {
        prop_assert!(seen.insert(fqn.clone()), "{} listed twice", fqn);
        prop_assert_eq!(index.package_of(fqn.as_str()), Some(package));
    }
    prop_assert_eq!(seen.len(), index.len());

    let listed: usize = index.packages().map(|(_, fqns)| fqns.len()).sum();
    prop_assert_eq!(listed, index.len());
    Ok(())
}

fn check_no_self_edges(units: &[CompilationUnit]) -> Result<(), TestCaseError> {
    let index = DeclaredIndex::build(units).map_err(|err| TestCaseError::fail(err.to_string()))?;

    for edge in RelationshipResolver::new(&index).resolve_all() {
        prop_assert_ne!(edge.source(), edge.target(), "self edge of kind {}", edge.kind());
        prop_assert!(index.contains(edge.source().as_str()));
        prop_assert!(index.contains(edge.target().as_str()));
    }
    Ok(())
}

fn check_unique_simple_names(units: &[CompilationUnit]) -> Result<(), TestCaseError> {
    let index = DeclaredIndex::build(units).map_err(|err| TestCaseError::fail(err.to_string()))?;

    for (_, fqn, _) in index.iter() {
        let sharing = index
            .iter()
            .filter(|(_, other, _)| other.simple_name() == fqn.simple_name())
            .count();
        match index.unique_simple_name(fqn.simple_name()) {
            Some(unique) => {
                prop_assert_eq!(sharing, 1);
                prop_assert_eq!(unique, fqn);
            }
            None => prop_assert!(sharing > 1),
        }
    }
    Ok(())
}

fn check_stream_order(units: &[CompilationUnit]) -> Result<(), TestCaseError> {
    let statements = statements(units)?;

    let first_relate = statements
        .iter()
        .position(|statement| matches!(statement, Statement::Relate(_)))
        .unwrap_or(statements.len());
    prop_assert!(
        statements[first_relate..]
            .iter()
            .all(|statement| matches!(statement, Statement::Relate(_)))
    );

    let kinds: Vec<RelationKind> = statements[first_relate..]
        .iter()
        .filter_map(|statement| match statement {
            Statement::Relate(edge) => Some(edge.kind()),
            Statement::Declare(_) => None,
        })
        .collect();
    let pass = |kind: &RelationKind| match kind {
        RelationKind::Extends | RelationKind::Implements => 0,
        RelationKind::Owns => 1,
        RelationKind::Associates => 2,
    };
    prop_assert!(kinds.windows(2).all(|pair| pass(&pair[0]) <= pass(&pair[1])));
    Ok(())
}

fn check_blocks_balance(units: &[CompilationUnit]) -> Result<(), TestCaseError> {
    let puml = DiagramBuilder::default()
        .render(units)
        .map_err(|err| TestCaseError::fail(err.to_string()))?;

    prop_assert_eq!(
        puml.matches("@classmap:begin").count(),
        puml.matches("@classmap:end").count()
    );
    prop_assert!(puml.starts_with("@startuml"));
    prop_assert!(puml.ends_with("@enduml\n"));
    Ok(())
}

// ===================
// Proptest Wrappers
// ===================

proptest! {
    #[test]
    fn emission_is_deterministic(units in units_strategy()) {
        check_determinism(&units)?;
    }

    #[test]
    fn fqns_are_unique(units in units_strategy()) {
        check_fqn_uniqueness(&units)?;
    }

    #[test]
    fn no_self_edges(units in units_strategy()) {
        check_no_self_edges(&units)?;
    }

    #[test]
    fn unique_simple_names_are_unambiguous(units in units_strategy()) {
        check_unique_simple_names(&units)?;
    }

    #[test]
    fn declarations_precede_relationships(units in units_strategy()) {
        check_stream_order(&units)?;
    }

    #[test]
    fn plantuml_blocks_balance(units in units_strategy()) {
        check_blocks_balance(&units)?;
    }
}
