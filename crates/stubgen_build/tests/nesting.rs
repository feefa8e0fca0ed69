mod support;

use stubgen_build::{InMemoryLocator, ReconstructionConfig, Reconstructor};
use stubgen_docs::{InMemoryDocumentationStore, MemberKey};
use stubgen_model::{Modifier, ModifierSet, TypeKind, TypeModel};
use support::*;

fn reconstruct(locator: &InMemoryLocator, name: &str) -> TypeModel {
    let docs = InMemoryDocumentationStore::new();
    let config = ReconstructionConfig::default();
    Reconstructor::new(locator, &docs, &config)
        .reconstruct(name)
        .unwrap()
}

fn simple_names(model: &TypeModel) -> Vec<&str> {
    model
        .nested_types
        .iter()
        .map(|nested| nested.name.simple_name())
        .collect()
}

#[test]
fn nesting_metadata_overrides_declared_modifiers() {
    let locator = InMemoryLocator::new()
        .with_class(
            "p.Outer",
            ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/Outer")
                .inner_class("p/Outer$Inner", Some("p/Outer"), Some("Inner"), ACC_STATIC)
                .bytes(),
        )
        .with_class(
            "p.Outer$Inner",
            ClassFile::new(ACC_PUBLIC | ACC_FINAL | ACC_SUPER, "p/Outer$Inner").bytes(),
        );

    let outer = reconstruct(&locator, "p.Outer");
    let inner = outer.nested_type("Inner").unwrap();
    assert_eq!(inner.modifiers, ModifierSet::from([Modifier::Static]));
    assert!(inner.modifiers.is_package_private());
    assert_eq!(inner.name.canonical_name(), "p.Outer.Inner");
}

#[test]
fn own_nesting_entry_is_authoritative_when_reconstructed_directly() {
    let locator = InMemoryLocator::new().with_class(
        "p.Outer$Inner",
        ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/Outer$Inner")
            .inner_class(
                "p/Outer$Inner",
                Some("p/Outer"),
                Some("Inner"),
                ACC_PROTECTED | ACC_STATIC | ACC_ABSTRACT,
            )
            .bytes(),
    );

    let inner = reconstruct(&locator, "p.Outer$Inner");
    assert_eq!(
        inner.modifiers,
        ModifierSet::from([Modifier::Protected, Modifier::Static, Modifier::Abstract])
    );
}

#[test]
fn self_referential_nesting_terminates() {
    let locator = InMemoryLocator::new()
        .with_class(
            "p.A",
            ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/A")
                .inner_class("p/A$B", Some("p/A"), Some("B"), ACC_PUBLIC | ACC_STATIC)
                .bytes(),
        )
        .with_class(
            "p.A$B",
            ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/A$B")
                .inner_class("p/A$B", Some("p/A"), Some("B"), ACC_PUBLIC | ACC_STATIC)
                // Claims its own ancestor as a member class.
                .inner_class("p/A", Some("p/A$B"), Some("A"), ACC_PUBLIC | ACC_STATIC)
                .inner_class("p/A$B$C", Some("p/A$B"), Some("C"), ACC_PUBLIC | ACC_STATIC)
                .bytes(),
        )
        .with_class(
            "p.A$B$C",
            ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/A$B$C")
                .inner_class("p/A$B$C", Some("p/A$B"), Some("C"), ACC_PUBLIC | ACC_STATIC)
                .inner_class("p/A$B", Some("p/A$B$C"), Some("B"), ACC_PUBLIC | ACC_STATIC)
                .bytes(),
        );

    let a = reconstruct(&locator, "p.A");
    assert_eq!(simple_names(&a), vec!["B"]);
    let b = &a.nested_types[0];
    assert_eq!(simple_names(b), vec!["C"]);
    assert!(b.nested_types[0].nested_types.is_empty());
}

#[test]
fn anonymous_private_synthetic_and_helper_types_are_not_attached() {
    let locator = InMemoryLocator::new()
        .with_class(
            "p.Host",
            ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/Host")
                .inner_class("p/Host$1", None, None, 0)
                .inner_class("p/Host$Secret", Some("p/Host"), Some("Secret"), ACC_PRIVATE | ACC_STATIC)
                .inner_class("p/Host$Gen", Some("p/Host"), Some("Gen"), ACC_STATIC | ACC_SYNTHETIC)
                .inner_class(
                    "p/Host$Trait$Helper",
                    Some("p/Host"),
                    Some("Trait$Helper"),
                    ACC_PUBLIC | ACC_STATIC,
                )
                .inner_class("p/Host$Visible", Some("p/Host"), Some("Visible"), ACC_PUBLIC | ACC_INTERFACE | ACC_STATIC | ACC_ABSTRACT)
                .inner_class("p/Other$Foreign", Some("p/Other"), Some("Foreign"), ACC_PUBLIC | ACC_STATIC)
                .bytes(),
        )
        .with_class(
            "p.Host$Visible",
            ClassFile::new(ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT, "p/Host$Visible").bytes(),
        );

    let host = reconstruct(&locator, "p.Host");
    assert_eq!(simple_names(&host), vec!["Visible"]);
    let visible = &host.nested_types[0];
    assert_eq!(visible.kind, TypeKind::Interface);
    assert_eq!(
        visible.modifiers,
        ModifierSet::from([Modifier::Public, Modifier::Static])
    );
}

#[test]
fn unresolvable_nested_type_is_skipped() {
    let locator = InMemoryLocator::new()
        .with_class(
            "p.Shell",
            ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/Shell")
                .inner_class("p/Shell$Missing", Some("p/Shell"), Some("Missing"), ACC_PUBLIC | ACC_STATIC)
                .inner_class("p/Shell$Broken", Some("p/Shell"), Some("Broken"), ACC_PUBLIC | ACC_STATIC)
                .inner_class("p/Shell$Fine", Some("p/Shell"), Some("Fine"), ACC_PUBLIC | ACC_STATIC)
                .bytes(),
        )
        .with_class(
            "p.Shell$Broken",
            ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/Shell$Broken")
                .signature("<>Ljava/lang/Object;")
                .bytes(),
        )
        .with_class(
            "p.Shell$Fine",
            ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/Shell$Fine").bytes(),
        );

    let shell = reconstruct(&locator, "p.Shell");
    assert_eq!(simple_names(&shell), vec!["Fine"]);
}

#[test]
fn nested_documentation_uses_binary_names() {
    let locator = InMemoryLocator::new()
        .with_class(
            "p.Outer",
            ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/Outer")
                .inner_class("p/Outer$Inner", Some("p/Outer"), Some("Inner"), ACC_PUBLIC | ACC_STATIC)
                .bytes(),
        )
        .with_class(
            "p.Outer$Inner",
            ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/Outer$Inner")
                .field(Field::new(ACC_PUBLIC, "size", "I"))
                .bytes(),
        );
    let docs = InMemoryDocumentationStore::new()
        .with_entry("p.Outer$Inner", &MemberKey::Type, "The inner type.")
        .with_entry("p.Outer$Inner", &MemberKey::field("size"), "How big.");
    let config = ReconstructionConfig::default();
    let outer = Reconstructor::new(&locator, &docs, &config)
        .reconstruct("p.Outer")
        .unwrap();

    let inner = outer.nested_type("Inner").unwrap();
    assert_eq!(inner.documentation.as_deref(), Some("The inner type."));
    assert_eq!(
        inner.field("size").unwrap().documentation.as_deref(),
        Some("How big.")
    );
    assert!(outer.documentation.is_none());
}
