//! Conversions between class file names and [`ClassName`].

use stubgen_model::{ClassName, TypeKind};

/// Interface the dynamic-language compiler adds to every class it emits.
pub const DYNAMIC_OBJECT_MARKER: &str = "groovy.lang.GroovyObject";

/// Implicit superinterface of every annotation type.
pub const ANNOTATION_MARKER: &str = "java.lang.annotation.Annotation";

/// Splits an internal name (`a/b/Outer$Inner`) into package and nesting chain.
///
/// A `$` only separates nesting levels when both sides are non-empty, so
/// names such as `$Proxy1` or `Foo$` stay a single simple name.
pub fn class_name_from_internal(internal: &str) -> ClassName {
    let (package, simple) = match internal.rsplit_once('/') {
        Some((package, simple)) => (package.replace('/', "."), simple),
        None => (String::new(), internal),
    };
    ClassName::new(package, split_nesting(simple))
}

/// Same as [`class_name_from_internal`] for dotted binary names.
pub fn class_name_from_binary(binary: &str) -> ClassName {
    class_name_from_internal(&binary.replace('.', "/"))
}

fn split_nesting(simple: &str) -> Vec<String> {
    let parts: Vec<&str> = simple.split('$').collect();
    if parts.len() > 1 && parts.iter().all(|part| !part.is_empty()) {
        parts.into_iter().map(str::to_string).collect()
    } else {
        vec![simple.to_string()]
    }
}

/// Whether a supertype is compiler-injected noise for a type of `kind`.
///
/// `markers` lists canonical names elided on every kind; the annotation
/// marker is only elided on annotation types.
pub fn is_elided_supertype<S: AsRef<str>>(
    kind: TypeKind,
    supertype: &ClassName,
    markers: &[S],
) -> bool {
    let canonical = supertype.canonical_name();
    if kind == TypeKind::Annotation && canonical == ANNOTATION_MARKER {
        return true;
    }
    markers.iter().any(|marker| marker.as_ref() == canonical)
}
