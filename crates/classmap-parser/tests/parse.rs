use classmap_core::declaration::{TypeKind, Visibility};
use classmap_parser::{error::ErrorCode, parse};

#[test]
fn test_full_entity_file() {
    let source = r#"
        /*
         * Licensed under the Apache License.
         */
        package com.acme.shop.model;

        import java.io.Serializable;
        import java.util.*;

        /**
         * An order placed by a customer.
         */
        @Entity
        @Table(name = "orders")
        public class Order extends AbstractEntity<Long> implements Serializable, Comparable<Order> {

            private static final long serialVersionUID = 42L;

            @ManyToOne(fetch = FetchType.LAZY)
            private Customer customer;

            @OneToMany(mappedBy = "order", cascade = CascadeType.ALL)
            private final List<OrderLine> lines = new ArrayList<>();

            private transient volatile String cachedLabel;

            protected Order() {
            }

            public Order(Customer customer) {
                this.customer = Objects.requireNonNull(customer, "customer");
            }

            @Override
            public int compareTo(Order other) {
                if (other == null) { return 1; }
                return Long.compare(getId(), other.getId());
            }

            public enum Status { NEW, PAID, SHIPPED }

            public static class Builder {
                private Customer customer;
                public Builder customer(Customer c) { this.customer = c; return this; }
            }
        }
    "#;

    let unit = parse(source).expect("Failed to parse");
    assert_eq!(unit.package(), "com.acme.shop.model");
    assert_eq!(unit.types().len(), 1);

    let order = &unit.types()[0];
    assert_eq!(order.name(), "Order");
    assert_eq!(order.kind(), TypeKind::Class);
    assert_eq!(order.annotations(), ["Entity", "Table"]);
    assert_eq!(order.modifiers().visibility, Visibility::Public);
    assert_eq!(order.extends(), ["AbstractEntity<Long>"]);
    assert_eq!(order.implements(), ["Serializable", "Comparable<Order>"]);

    let fields = order.fields();
    assert_eq!(fields.len(), 4);
    assert_eq!(fields[1].name(), "customer");
    assert_eq!(fields[1].annotations(), ["ManyToOne"]);
    assert_eq!(fields[2].type_name(), "List<OrderLine>");
    assert!(fields[2].modifiers().is_final);
    assert!(fields[3].modifiers().is_transient);
    assert!(fields[3].modifiers().is_volatile);

    let nested: Vec<(&str, TypeKind)> = order
        .nested()
        .iter()
        .map(|decl| (decl.name(), decl.kind()))
        .collect();
    assert_eq!(
        nested,
        [("Status", TypeKind::Enum), ("Builder", TypeKind::Class)]
    );
    assert_eq!(order.nested()[0].constants(), ["NEW", "PAID", "SHIPPED"]);
    assert_eq!(order.nested()[1].fields().len(), 1);
}

#[test]
fn test_several_top_level_types_in_one_file() {
    let source = r#"
        package pa;

        interface Shape { double area(); }

        final class Circle implements Shape {
            private double r;
            public double area() { return Math.PI * r * r; }
        }

        record Square(double side) implements Shape {
            public double area() { return side * side; }
        }
    "#;

    let unit = parse(source).expect("Failed to parse");
    let kinds: Vec<TypeKind> = unit.types().iter().map(|t| t.kind()).collect();
    assert_eq!(kinds, [TypeKind::Interface, TypeKind::Class, TypeKind::Record]);
    assert_eq!(unit.types()[2].implements(), ["Shape"]);
}

#[test]
fn test_strings_and_comments_do_not_confuse_brace_skipping() {
    let source = r#"
        class Tricky {
            String open = "{ not a brace";
            char close = '}';
            String block = """
                } still text {
                """;
            // }
            /* } */
            void m() { String s = "}"; }
            int after;
        }
    "#;

    let unit = parse(source).expect("Failed to parse");
    let names: Vec<&str> = unit.types()[0].fields().iter().map(|f| f.name()).collect();
    assert_eq!(names, ["open", "close", "block", "after"]);
}

#[test]
fn test_lexer_errors_are_all_reported() {
    let err = parse("class A { String s = \"oops;\n int # x; }").unwrap_err();
    let codes: Vec<ErrorCode> = err.diagnostics().iter().filter_map(|d| d.code()).collect();
    assert_eq!(codes, [ErrorCode::E001, ErrorCode::E002]);
}

#[test]
fn test_parse_error_has_code_span_and_help() {
    let err = parse("package p;\nclass A implements {}").unwrap_err();
    assert_eq!(err.diagnostics().len(), 1);

    let diag = &err.diagnostics()[0];
    assert_eq!(diag.code(), Some(ErrorCode::E100));
    assert!(diag.help().is_some());
    assert_eq!(diag.labels()[0].span().start(), 30);
}

#[test]
fn test_truncated_file_is_incomplete() {
    let err = parse("package p;\npublic class A {\n  void m() {").unwrap_err();
    assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E101));
}

#[test]
fn test_empty_file() {
    let unit = parse("// nothing here\n").expect("Failed to parse");
    assert_eq!(unit.package(), "");
    assert!(unit.types().is_empty());
}

#[test]
fn test_byte_order_mark_is_accepted() {
    let unit = parse("\u{feff}package p;\n\npublic class A { private B b; }\n")
        .expect("Failed to parse");
    assert_eq!(unit.package(), "p");
    assert_eq!(unit.types()[0].name(), "A");
    assert_eq!(unit.types()[0].fields()[0].type_name(), "B");
}

#[test]
fn test_errors_after_byte_order_mark_point_into_the_file() {
    let source = "\u{feff}package p; class {";
    let err = parse(source).unwrap_err();
    let span = err.diagnostics()[0].labels()[0].span();
    assert!(span.start() >= source.find("class").unwrap());
}
