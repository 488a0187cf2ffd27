//! Example: Rendering a diagram from hand-built declarations
//!
//! This example shows how to build compilation units directly, without
//! parsing Java source, and collect the statement stream before rendering it
//! as PlantUML.

use classmap::{
    DiagramBuilder, emit,
    declaration::{CompilationUnit, Field, Modifiers, RecordComponent, TypeDecl, Visibility},
    export::StatementCollector,
    index::DeclaredIndex,
    progress::NoProgress,
    statement::Statement,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Building declarations by hand...\n");

    let private = Modifiers::new(Visibility::Private);

    let units = vec![
        CompilationUnit::new("shop.model")
            .with_type(TypeDecl::interface("Priced"))
            .with_type(
                TypeDecl::class("Order")
                    .with_implements("Priced")
                    .with_field(Field::new("customer", "Customer").with_modifiers(private))
                    .with_field(Field::new("lines", "List<Line>").with_modifiers(private))
                    .with_nested(
                        TypeDecl::record("Line")
                            .with_component(RecordComponent::new("product", "shop.catalog.Product"))
                            .with_component(RecordComponent::new("quantity", "int")),
                    ),
            )
            .with_type(TypeDecl::class("Customer")),
        CompilationUnit::new("shop.catalog").with_type(
            TypeDecl::class("Product")
                .with_implements("shop.model.Priced")
                .with_field(Field::new("sku", "String").with_modifiers(private)),
        ),
    ];

    // Inspect the statement stream
    let index = DeclaredIndex::build(&units)?;
    let mut collector = StatementCollector::new();
    emit(&index, &mut collector, &mut NoProgress)?;

    for statement in collector.statements() {
        match statement {
            Statement::Declare(declaration) => {
                println!("declare {} {}", declaration.kind, declaration.rendered_name)
            }
            Statement::Relate(relationship) => println!("relate  {relationship}"),
        }
    }

    // Render the same units as PlantUML
    let puml = DiagramBuilder::default().render(&units)?;
    println!("\n{puml}");

    Ok(())
}
