mod support;

use stubgen_build::{InMemoryLocator, ReconstructError, ReconstructionConfig, Reconstructor};
use stubgen_classfile::parse_method_descriptor;
use stubgen_docs::{InMemoryDocumentationStore, MemberKey};
use stubgen_model::{
    AnnotationValue, ClassName, Literal, Modifier, ModifierSet, PrimitiveType, TypeKind,
    TypeModel, TypeReference, WildcardKind,
};
use support::*;

fn class(package: &str, simple: &str) -> TypeReference {
    TypeReference::class(ClassName::top_level(package, simple))
}

fn reconstruct_with(
    locator: &InMemoryLocator,
    docs: &InMemoryDocumentationStore,
    config: &ReconstructionConfig,
    name: &str,
) -> Result<TypeModel, ReconstructError> {
    Reconstructor::new(locator, docs, config).reconstruct(name)
}

fn reconstruct(locator: &InMemoryLocator, name: &str) -> Result<TypeModel, ReconstructError> {
    reconstruct_with(
        locator,
        &InMemoryDocumentationStore::new(),
        &ReconstructionConfig::default(),
        name,
    )
}

fn single(binary_name: &str, class_file: ClassFile) -> InMemoryLocator {
    InMemoryLocator::new().with_class(binary_name, class_file.bytes())
}

#[test]
fn non_generic_types_match_descriptors() {
    let locator = single(
        "p.Plain",
        ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/Plain")
            .field(Field::new(ACC_PUBLIC, "count", "I"))
            .method(
                Method::new(ACC_PUBLIC, "join", "([Ljava/lang/String;J)Ljava/lang/String;")
                    .local("this", "Lp/Plain;", 0)
                    .local("parts", "[Ljava/lang/String;", 1)
                    .local("limit", "J", 2),
            ),
    );
    let model = reconstruct(&locator, "p.Plain").unwrap();

    assert_eq!(model.kind, TypeKind::Class);
    assert_eq!(model.superclass, None);
    assert_eq!(
        model.field("count").unwrap().ty,
        TypeReference::Primitive(PrimitiveType::Int)
    );

    let join = model.method("join").unwrap();
    let descriptor = parse_method_descriptor("([Ljava/lang/String;J)Ljava/lang/String;").unwrap();
    let types: Vec<_> = join.parameters.iter().map(|p| p.ty.clone()).collect();
    assert_eq!(types, descriptor.parameters);
    assert_eq!(join.return_type.as_ref(), Some(&descriptor.return_type));
    assert_eq!(join.parameter_names(), vec!["parts", "limit"]);
    assert!(join.type_parameters.is_empty());
}

#[test]
fn generic_signatures_refine_descriptor_types() {
    let locator = single(
        "p.Gen",
        ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/Gen")
            .signature("<E:Ljava/lang/Object;>Ljava/util/AbstractList<TE;>;")
            .superclass("java/util/AbstractList")
            .method(
                Method::new(ACC_PUBLIC, "sum", "(Ljava/util/List;)Ljava/lang/Object;")
                    .signature("<T:Ljava/lang/Object;>(Ljava/util/List<+Ljava/lang/Number;>;)TT;")
                    .parameters(&["values"]),
            )
            .method(
                Method::new(ACC_PUBLIC, "mixed", "(Ljava/util/List;I)V")
                    .signature("(Ljava/util/List<Ljava/lang/String;>;)V")
                    .parameters(&["names", "size"]),
            ),
    );
    let model = reconstruct(&locator, "p.Gen").unwrap();

    assert_eq!(model.type_parameters.len(), 1);
    assert_eq!(model.type_parameters[0].name, "E");
    assert_eq!(
        model.superclass,
        Some(TypeReference::parameterized(
            ClassName::top_level("java.util", "AbstractList"),
            vec![TypeReference::type_variable("E")],
        ))
    );

    let sum = model.method("sum").unwrap();
    assert_eq!(sum.type_parameters[0].name, "T");
    assert_eq!(sum.return_type, Some(TypeReference::type_variable("T")));
    match &sum.parameters[0].ty {
        TypeReference::Class { name, type_args } => {
            assert_eq!(name.canonical_name(), "java.util.List");
            assert_eq!(
                type_args,
                &vec![TypeReference::Wildcard {
                    kind: WildcardKind::Extends,
                    bound: Some(Box::new(class("java.lang", "Number"))),
                }]
            );
        }
        other => panic!("expected a class type, got {other:?}"),
    }

    // The signature names one parameter; the second comes from the descriptor.
    let mixed = model.method("mixed").unwrap();
    assert_eq!(mixed.parameter_names(), vec!["names", "size"]);
    assert_eq!(
        mixed.parameters[0].ty,
        TypeReference::parameterized(
            ClassName::top_level("java.util", "List"),
            vec![class("java.lang", "String")],
        )
    );
    assert_eq!(
        mixed.parameters[1].ty,
        TypeReference::Primitive(PrimitiveType::Int)
    );
}

#[test]
fn inclusion_policy_filters_members() {
    let internal = Annotation::new("Lgroovy/transform/Internal;");
    let locator = single(
        "p.Policy",
        ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/Policy")
            .field(Field::new(ACC_PUBLIC, "visible", "I"))
            .field(Field::new(ACC_PRIVATE, "hidden", "I"))
            .field(Field::new(ACC_PUBLIC | ACC_SYNTHETIC, "generated", "I"))
            .field(Field::new(ACC_PUBLIC, "$staticClassInfo", "I"))
            .method(Method::new(ACC_PUBLIC, "<init>", "()V"))
            .method(Method::new(ACC_STATIC, "<clinit>", "()V"))
            .method(Method::new(ACC_PROTECTED, "inherited", "()V"))
            .method(Method::new(0, "packageOnly", "()V"))
            .method(Method::new(ACC_PUBLIC | ACC_BRIDGE | ACC_SYNTHETIC, "compareTo", "(Ljava/lang/Object;)I"))
            .method(Method::new(ACC_PUBLIC, "lambda$run$0", "()V"))
            .method(Method::new(ACC_PUBLIC, "getMetaClass", "()Lgroovy/lang/MetaClass;"))
            .method(Method::new(ACC_PUBLIC, "secret", "()V").annotation(internal)),
    );
    let model = reconstruct(&locator, "p.Policy").unwrap();

    let names: Vec<&str> = model.members.iter().map(|member| member.name()).collect();
    assert_eq!(names, vec!["visible", "<init>", "inherited"]);
    assert!(model.constructors().next().unwrap().return_type.is_none());
}

#[test]
fn enum_models_hide_compiler_members() {
    let locator = single(
        "p.Color",
        ClassFile::new(ACC_PUBLIC | ACC_FINAL | ACC_SUPER | ACC_ENUM, "p/Color")
            .superclass("java/lang/Enum")
            .signature("Ljava/lang/Enum<Lp/Color;>;")
            .field(Field::new(ACC_PUBLIC | ACC_STATIC | ACC_FINAL | ACC_ENUM, "RED", "Lp/Color;"))
            .field(Field::new(ACC_PUBLIC | ACC_STATIC | ACC_FINAL | ACC_ENUM, "GREEN", "Lp/Color;"))
            .field(Field::new(ACC_PRIVATE | ACC_STATIC | ACC_FINAL | ACC_SYNTHETIC, "$VALUES", "[Lp/Color;"))
            .field(Field::new(ACC_PUBLIC | ACC_STATIC | ACC_FINAL, "MAX_VALUE", "Lp/Color;"))
            .method(Method::new(ACC_PUBLIC | ACC_STATIC, "values", "()[Lp/Color;"))
            .method(Method::new(ACC_PUBLIC | ACC_STATIC, "valueOf", "(Ljava/lang/String;)Lp/Color;"))
            .method(Method::new(ACC_PUBLIC, "<init>", "(Ljava/lang/String;I)V"))
            .method(Method::new(ACC_PUBLIC, "next", "()Lp/Color;"))
            .method(Method::new(ACC_PUBLIC, "previous", "()Lp/Color;"))
            .method(Method::new(ACC_STATIC, "<clinit>", "()V"))
            .method(Method::new(ACC_PUBLIC, "describe", "()Ljava/lang/String;")),
    );
    let model = reconstruct(&locator, "p.Color").unwrap();

    assert_eq!(model.kind, TypeKind::Enum);
    assert_eq!(model.superclass, None);
    assert_eq!(model.modifiers, ModifierSet::from([Modifier::Public]));

    let constants: Vec<&str> = model
        .fields()
        .filter(|field| field.enum_constant)
        .map(|field| field.name.as_str())
        .collect();
    assert_eq!(constants, vec!["RED", "GREEN"]);
    assert_eq!(model.fields().count(), 2);

    let methods: Vec<&str> = model.executables().map(|exec| exec.name.as_str()).collect();
    assert_eq!(methods, vec!["describe"]);
}

#[test]
fn marker_supertypes_never_appear() {
    let locator = InMemoryLocator::new()
        .with_class(
            "p.Dynamic",
            ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/Dynamic")
                .interface("groovy/lang/GroovyObject")
                .interface("java/io/Serializable")
                .bytes(),
        )
        .with_class(
            "p.Marker",
            ClassFile::new(ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT | ACC_ANNOTATION, "p/Marker")
                .interface("java/lang/annotation/Annotation")
                .method(
                    Method::new(ACC_PUBLIC | ACC_ABSTRACT, "value", "()Ljava/lang/String;")
                        .default_value(Element::str("none")),
                )
                .method(
                    Method::new(ACC_PUBLIC | ACC_ABSTRACT, "level", "()I")
                        .default_value(Element::Int(b'I', 3)),
                )
                .bytes(),
        );

    let dynamic = reconstruct(&locator, "p.Dynamic").unwrap();
    assert_eq!(
        dynamic.superinterfaces,
        vec![class("java.io", "Serializable")]
    );

    let marker = reconstruct(&locator, "p.Marker").unwrap();
    assert_eq!(marker.kind, TypeKind::Annotation);
    assert_eq!(marker.superclass, None);
    assert!(marker.superinterfaces.is_empty());
    assert_eq!(marker.modifiers, ModifierSet::from([Modifier::Public]));

    let value = marker.method("value").unwrap();
    assert_eq!(
        value.default_value,
        Some(AnnotationValue::Literal(Literal::String("none".into())))
    );
    assert_eq!(
        value.modifiers,
        ModifierSet::from([Modifier::Public, Modifier::Abstract])
    );
    assert_eq!(
        marker.method("level").unwrap().default_value,
        Some(AnnotationValue::Literal(Literal::Int(3)))
    );
}

#[test]
fn annotation_values_keep_their_shape_and_order() {
    let meta = Annotation::new("Lp/Meta;")
        .with("name", Element::str("n"))
        .with("speed", Element::Enum("Lp/Speed;".into(), "FAST".into()))
        .with("type", Element::Class("Ljava/lang/String;".into()))
        .with("none", Element::Class("V".into()))
        .with("nested", Element::Nested(Annotation::new("Lp/Inner;").with("x", Element::Int(b'I', 1))))
        .with("tags", Element::Array(vec![Element::str("a"), Element::str("b")]))
        .with("flag", Element::Int(b'Z', 1))
        .with("separator", Element::Int(b'C', '\n' as i32))
        .with("big", Element::Long(7));
    let locator = single(
        "p.Annotated",
        ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/Annotated")
            .field(Field::new(ACC_PUBLIC, "value", "Ljava/lang/String;").annotation(meta))
            .field(
                Field::new(ACC_PUBLIC | ACC_STATIC | ACC_FINAL, "BIG", "J")
                    .constant(Constant::Long(5)),
            )
            .field(
                Field::new(ACC_PUBLIC | ACC_STATIC | ACC_FINAL, "TAB", "C")
                    .constant(Constant::Int(9)),
            )
            .field(
                Field::new(ACC_PUBLIC | ACC_STATIC | ACC_FINAL, "NAME", "Ljava/lang/String;")
                    .constant(Constant::Str("widget".into())),
            ),
    );
    let model = reconstruct(&locator, "p.Annotated").unwrap();

    let annotation = &model.field("value").unwrap().annotations[0];
    assert_eq!(annotation.ty, ClassName::top_level("p", "Meta"));
    let keys: Vec<&str> = annotation.entries.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["name", "speed", "type", "none", "nested", "tags", "flag", "separator", "big"]
    );
    assert_eq!(
        annotation.get("speed"),
        Some(&AnnotationValue::EnumConstant {
            ty: ClassName::top_level("p", "Speed"),
            constant: "FAST".into(),
        })
    );
    assert_eq!(
        annotation.get("type"),
        Some(&AnnotationValue::ClassRef(class("java.lang", "String")))
    );
    assert_eq!(
        annotation.get("none"),
        Some(&AnnotationValue::ClassRef(TypeReference::void()))
    );
    match annotation.get("nested") {
        Some(AnnotationValue::Nested(inner)) => {
            assert_eq!(inner.ty, ClassName::top_level("p", "Inner"));
            assert_eq!(
                inner.get("x"),
                Some(&AnnotationValue::Literal(Literal::Int(1)))
            );
        }
        other => panic!("expected nested annotation, got {other:?}"),
    }
    assert_eq!(
        annotation.get("tags"),
        Some(&AnnotationValue::Array(vec![
            AnnotationValue::Literal(Literal::String("a".into())),
            AnnotationValue::Literal(Literal::String("b".into())),
        ]))
    );
    assert_eq!(
        annotation.get("flag"),
        Some(&AnnotationValue::Literal(Literal::Boolean(true)))
    );
    assert_eq!(
        annotation.get("separator"),
        Some(&AnnotationValue::Literal(Literal::Char {
            value: '\n',
            escaped: "\\n".into(),
        }))
    );
    assert_eq!(
        annotation.get("big"),
        Some(&AnnotationValue::Literal(Literal::Long(7)))
    );

    assert_eq!(model.field("BIG").unwrap().constant, Some(Literal::Long(5)));
    assert_eq!(
        model.field("TAB").unwrap().constant,
        Some(Literal::Char {
            value: '\t',
            escaped: "\\t".into(),
        })
    );
    assert_eq!(
        model.field("NAME").unwrap().constant,
        Some(Literal::String("widget".into()))
    );
}

#[test]
fn interface_and_trait_methods_become_default() {
    let implemented = Annotation::new("Lorg/codehaus/groovy/transform/trait/Traits$Implemented;");
    let locator = single(
        "p.Api",
        ClassFile::new(ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT, "p/Api")
            .method(Method::new(ACC_PUBLIC | ACC_ABSTRACT, "run", "()V"))
            .method(Method::new(ACC_PUBLIC, "greet", "()V"))
            .method(Method::new(ACC_PUBLIC | ACC_STATIC, "create", "()Lp/Api;"))
            .method(Method::new(ACC_PUBLIC | ACC_ABSTRACT, "mixin", "()V").annotation(implemented)),
    );
    let model = reconstruct(&locator, "p.Api").unwrap();

    assert_eq!(model.kind, TypeKind::Interface);
    assert_eq!(model.modifiers, ModifierSet::from([Modifier::Public]));
    assert_eq!(
        model.method("run").unwrap().modifiers,
        ModifierSet::from([Modifier::Public, Modifier::Abstract])
    );
    assert_eq!(
        model.method("greet").unwrap().modifiers,
        ModifierSet::from([Modifier::Public, Modifier::Default])
    );
    assert_eq!(
        model.method("create").unwrap().modifiers,
        ModifierSet::from([Modifier::Public, Modifier::Static])
    );
    let mixin = model.method("mixin").unwrap();
    assert_eq!(
        mixin.modifiers,
        ModifierSet::from([Modifier::Public, Modifier::Default])
    );
    assert!(mixin.annotations.is_empty());
}

#[test]
fn thrown_types_and_parameter_annotations() {
    let not_null = Annotation::new("Lp/NotNull;");
    let locator = single(
        "p.Outer$Inner",
        ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/Outer$Inner")
            .method(
                Method::new(ACC_PUBLIC, "<init>", "(Lp/Outer;I)V")
                    .parameter_annotations(vec![vec![not_null]]),
            )
            .method(
                Method::new(ACC_PUBLIC, "load", "()V")
                    .throws("java/io/IOException"),
            )
            .method(
                Method::new(ACC_PUBLIC, "parse", "()V")
                    .signature("<X:Ljava/lang/Exception;>()V^TX;")
                    .throws("java/lang/Exception"),
            ),
    );
    let model = reconstruct(&locator, "p.Outer$Inner").unwrap();

    let constructor = model.constructors().next().unwrap();
    assert_eq!(constructor.parameter_names(), vec!["arg0", "arg1"]);
    assert!(constructor.parameters[0].annotations.is_empty());
    assert_eq!(
        constructor.parameters[1].annotations[0].ty,
        ClassName::top_level("p", "NotNull")
    );

    assert_eq!(
        model.method("load").unwrap().thrown,
        vec![class("java.io", "IOException")]
    );
    assert_eq!(
        model.method("parse").unwrap().thrown,
        vec![TypeReference::type_variable("X")]
    );
}

#[test]
fn malformed_member_signature_skips_only_that_member() {
    let locator = single(
        "p.Partial",
        ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/Partial")
            .field(Field::new(ACC_PUBLIC, "broken", "Ljava/util/List;").signature("Ljava/util/List<"))
            .method(Method::new(ACC_PUBLIC, "bad", "()V").signature("(Lbroken"))
            .method(Method::new(ACC_PUBLIC, "good", "()V")),
    );
    let model = reconstruct(&locator, "p.Partial").unwrap();

    let names: Vec<&str> = model.members.iter().map(|member| member.name()).collect();
    assert_eq!(names, vec!["good"]);
}

#[test]
fn malformed_type_signature_fails_the_type() {
    let locator = single(
        "p.Broken",
        ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/Broken").signature("Lbad"),
    );
    let error = reconstruct(&locator, "p.Broken").unwrap_err();
    assert!(matches!(error, ReconstructError::Grammar { ref declaration, .. } if declaration == "p.Broken"));
}

#[test]
fn default_value_outside_annotation_type_is_an_invariant_violation() {
    let locator = single(
        "p.Odd",
        ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/Odd").method(
            Method::new(ACC_PUBLIC, "value", "()I").default_value(Element::Int(b'I', 1)),
        ),
    );
    let error = reconstruct(&locator, "p.Odd").unwrap_err();
    match error {
        ReconstructError::InvariantViolation(violation) => {
            assert_eq!(violation.declaration, "p.Odd#value");
        }
        other => panic!("expected invariant violation, got {other:?}"),
    }
}

#[test]
fn stale_param_tags_are_stripped_when_names_are_known() {
    let locator = single(
        "p.Doc",
        ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/Doc")
            .method(Method::new(ACC_PUBLIC, "put", "(II)V").parameters(&["a", "b"]))
            .method(Method::new(ACC_PUBLIC, "keep", "(I)V")),
    );
    let docs = InMemoryDocumentationStore::new()
        .with_entry("p.Doc", &MemberKey::Type, "The type.\n")
        .with_entry(
            "p.Doc",
            &MemberKey::method("put", ["int", "int"]),
            "Does it.\n@param a desc1\n@param old desc2",
        )
        .with_entry(
            "p.Doc",
            &MemberKey::method("keep", ["int"]),
            "Keeps it.\n@param gone unknown",
        );
    let model =
        reconstruct_with(&locator, &docs, &ReconstructionConfig::default(), "p.Doc").unwrap();

    assert_eq!(model.documentation.as_deref(), Some("The type."));
    assert_eq!(
        model.method("put").unwrap().documentation.as_deref(),
        Some("Does it.\n@param a desc1")
    );
    // Names were synthesized, so nothing can be judged stale.
    assert_eq!(
        model.method("keep").unwrap().documentation.as_deref(),
        Some("Keeps it.\n@param gone unknown")
    );
}

#[test]
fn generic_member_keys_fall_back_to_erasure() {
    let locator = single(
        "p.Box",
        ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/Box")
            .method(
                Method::new(ACC_PUBLIC, "accept", "(Ljava/lang/Object;)V")
                    .signature("<T:Ljava/lang/Object;>(TT;)V")
                    .parameters(&["value"]),
            )
            .method(
                Method::new(ACC_PUBLIC, "accept", "(Ljava/util/List;)V")
                    .signature("(Ljava/util/List<Ljava/lang/String;>;)V")
                    .parameters(&["values"]),
            ),
    );
    let docs = InMemoryDocumentationStore::new()
        .with_entry(
            "p.Box",
            &MemberKey::method("accept", ["java.lang.Object"]),
            "Accepts one.",
        )
        .with_entry(
            "p.Box",
            &MemberKey::method("accept", ["java.util.List"]),
            "Accepts many.",
        );
    let model =
        reconstruct_with(&locator, &docs, &ReconstructionConfig::default(), "p.Box").unwrap();

    let docs: Vec<Option<&str>> = model
        .executables()
        .map(|exec| exec.documentation.as_deref())
        .collect();
    assert_eq!(docs, vec![Some("Accepts one."), Some("Accepts many.")]);
}

#[test]
fn inline_documentation_wins_and_templates_render() {
    let locator = single(
        "p.Factory",
        ClassFile::new(ACC_PUBLIC | ACC_SUPER, "p/Factory")
            .annotation(Annotation::doc("Builds {{product}} instances."))
            .method(
                Method::new(ACC_PUBLIC, "make", "(I)V")
                    .parameters(&["size"])
                    .annotation(Annotation::doc(
                        "Makes a {{product}}. {{param:size?Uses size.:No size.}}\n@param size how big",
                    )),
            ),
    );
    let docs = InMemoryDocumentationStore::new().with_entry(
        "p.Factory",
        &MemberKey::Type,
        "Stored text loses.",
    );
    let config = ReconstructionConfig::default().with_template_value("product", "Widget");
    let model = reconstruct_with(&locator, &docs, &config, "p.Factory").unwrap();

    assert_eq!(
        model.documentation.as_deref(),
        Some("Builds Widget instances.")
    );
    assert!(model.annotations.is_empty());

    let make = model.method("make").unwrap();
    assert_eq!(
        make.documentation.as_deref(),
        Some("Makes a Widget. Uses size.\n@param size how big")
    );
    assert!(make.annotations.is_empty());
}
