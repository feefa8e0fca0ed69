//! Member inclusion policy and construction of field and executable specs.

use crate::config::ReconstructionConfig;
use crate::error::ReconstructError;
use crate::values::{annotation_instance, annotation_type, annotation_value, field_constant};
use stubgen_classfile::access::{
    has, ACC_ABSTRACT, ACC_BRIDGE, ACC_ENUM, ACC_FINAL, ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC,
    ACC_STATIC, ACC_SYNTHETIC,
};
use stubgen_classfile::names::class_name_from_internal;
use stubgen_classfile::{
    parse_field_descriptor, parse_field_signature, parse_method_descriptor,
    parse_method_signature, ClassParseError, FieldInfo, MethodInfo, RawAnnotation,
};
use stubgen_model::{
    AnnotationInstance, AnnotationValue, ExecutableSpec, FieldSpec, InvariantViolation, Modifier,
    ModifierSet, Parameter, TypeKind, TypeReference, CONSTRUCTOR_NAME,
};
use tracing::{debug, trace, warn};

/// Marker the trait compiler puts on interface methods that carry a body.
pub const TRAIT_IMPLEMENTED_MARKER: &str =
    "org.codehaus.groovy.transform.trait.Traits$Implemented";

const STATIC_INITIALIZER: &str = "<clinit>";
const ENUM_EXCLUDED_METHODS: &[&str] = &[CONSTRUCTOR_NAME, "values", "valueOf", "next", "previous"];
const ENUM_EXCLUDED_FIELDS: &[&str] = &["MIN_VALUE", "MAX_VALUE"];

/// What the builder needs to know about the type that declares a member.
pub(crate) struct MemberContext<'a> {
    pub config: &'a ReconstructionConfig,
    pub kind: TypeKind,
    /// Canonical name, used in diagnostics.
    pub declaring: &'a str,
}

impl MemberContext<'_> {
    fn declaration(&self, member: &str) -> String {
        format!("{}#{member}", self.declaring)
    }

    fn class_file_error(&self, member: &str, source: ClassParseError) -> ReconstructError {
        ReconstructError::ClassFile {
            declaration: self.declaration(member),
            source,
        }
    }
}

/// Annotations converted for the model, with the inline documentation
/// annotation taken out.
#[derive(Debug, Default)]
pub(crate) struct ConvertedAnnotations {
    pub annotations: Vec<AnnotationInstance>,
    pub documentation: Option<String>,
    pub trait_implemented: bool,
}

pub(crate) fn convert_annotations(
    config: &ReconstructionConfig,
    raw: &[RawAnnotation],
) -> Result<ConvertedAnnotations, ClassParseError> {
    let mut converted = ConvertedAnnotations::default();
    for annotation in raw {
        let ty = annotation_type(annotation)?;
        let canonical = ty.canonical_name();
        let binary = ty.binary_name();
        if config.is_doc_annotation(&canonical, &binary) {
            if let Some(value) = annotation.element("value") {
                converted.documentation = annotation_value(value)?.as_str().map(str::to_string);
            }
            continue;
        }
        if binary == TRAIT_IMPLEMENTED_MARKER {
            converted.trait_implemented = true;
            continue;
        }
        converted.annotations.push(annotation_instance(annotation)?);
    }
    Ok(converted)
}

fn has_internal_marker(
    config: &ReconstructionConfig,
    raw: &[RawAnnotation],
) -> Result<bool, ClassParseError> {
    for annotation in raw {
        let ty = annotation_type(annotation)?;
        if config.is_internal_annotation(&ty.canonical_name(), &ty.binary_name()) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn is_visible(flags: u16) -> bool {
    has(flags, ACC_PUBLIC) || has(flags, ACC_PROTECTED)
}

/// Modifiers shared by fields and methods.
fn member_modifiers(flags: u16) -> ModifierSet {
    let mut modifiers = ModifierSet::new();
    if has(flags, ACC_PUBLIC) {
        modifiers.insert(Modifier::Public);
    }
    if has(flags, ACC_PROTECTED) {
        modifiers.insert(Modifier::Protected);
    }
    if has(flags, ACC_PRIVATE) {
        modifiers.insert(Modifier::Private);
    }
    if has(flags, ACC_STATIC) {
        modifiers.insert(Modifier::Static);
    }
    if has(flags, ACC_FINAL) {
        modifiers.insert(Modifier::Final);
    }
    if has(flags, ACC_ABSTRACT) {
        modifiers.insert(Modifier::Abstract);
    }
    modifiers
}

fn include_field(ctx: &MemberContext<'_>, field: &FieldInfo) -> Result<bool, ReconstructError> {
    let reason = if field.has_flag(ACC_SYNTHETIC) {
        "synthetic"
    } else if !is_visible(field.access_flags) {
        "not visible"
    } else if field.name.contains('$') {
        "generated name"
    } else if ctx.kind == TypeKind::Enum && ENUM_EXCLUDED_FIELDS.contains(&field.name.as_str()) {
        "enum range field"
    } else if has_internal_marker(ctx.config, &field.annotations)
        .map_err(|source| ctx.class_file_error(&field.name, source))?
    {
        "internal"
    } else {
        return Ok(true);
    };
    debug!(member = %ctx.declaration(&field.name), reason, "field skipped");
    Ok(false)
}

/// Builds the model for a field, or `None` when the field is filtered out or
/// its signature cannot be read.
pub(crate) fn build_field(
    ctx: &MemberContext<'_>,
    field: &FieldInfo,
) -> Result<Option<BuiltField>, ReconstructError> {
    if !include_field(ctx, field)? {
        return Ok(None);
    }
    trace!(member = %ctx.declaration(&field.name), "building field");

    let erased = parse_field_descriptor(&field.descriptor)
        .map_err(|source| ctx.class_file_error(&field.name, source))?;
    let ty = match &field.signature {
        Some(signature) => match parse_field_signature(signature) {
            Ok(ty) => ty,
            Err(error) => {
                warn!(member = %ctx.declaration(&field.name), %error, "skipping field with malformed signature");
                return Ok(None);
            }
        },
        None => erased.clone(),
    };
    let constant = field
        .constant_value
        .as_ref()
        .map(|value| field_constant(&erased, value))
        .transpose()
        .map_err(|source| ctx.class_file_error(&field.name, source))?;
    let converted = convert_annotations(ctx.config, &field.annotations)
        .map_err(|source| ctx.class_file_error(&field.name, source))?;

    let mut spec = FieldSpec::new(field.name.clone(), ty);
    spec.modifiers = member_modifiers(field.access_flags);
    spec.annotations = converted.annotations;
    spec.enum_constant = field.has_flag(ACC_ENUM);
    spec.constant = constant;
    Ok(Some(BuiltField {
        spec,
        inline_documentation: converted.documentation,
    }))
}

pub(crate) struct BuiltField {
    pub spec: FieldSpec,
    pub inline_documentation: Option<String>,
}

/// An executable member plus what documentation reattachment needs to know.
pub(crate) struct BuiltExecutable {
    pub spec: ExecutableSpec,
    /// Whether parameter names came from the class file rather than being
    /// synthesized.
    pub names_recovered: bool,
    /// Descriptor parameter types, for the erased documentation key.
    pub erased_parameters: Vec<TypeReference>,
    pub inline_documentation: Option<String>,
}

fn include_method(ctx: &MemberContext<'_>, method: &MethodInfo) -> Result<bool, ReconstructError> {
    let name = method.name.as_str();
    let reason = if method.has_flag(ACC_SYNTHETIC) {
        "synthetic"
    } else if method.has_flag(ACC_BRIDGE) {
        "bridge"
    } else if name == STATIC_INITIALIZER {
        "static initializer"
    } else if !is_visible(method.access_flags) {
        "not visible"
    } else if name.contains('$') {
        "generated name"
    } else if ctx.config.excluded_methods.iter().any(|excluded| excluded == name) {
        "excluded by configuration"
    } else if ctx.kind == TypeKind::Enum && ENUM_EXCLUDED_METHODS.contains(&name) {
        "enum accessor"
    } else if has_internal_marker(ctx.config, &method.annotations)
        .map_err(|source| ctx.class_file_error(name, source))?
    {
        "internal"
    } else {
        return Ok(true);
    };
    debug!(member = %ctx.declaration(name), reason, "method skipped");
    Ok(false)
}

pub(crate) fn build_executable(
    ctx: &MemberContext<'_>,
    method: &MethodInfo,
) -> Result<Option<BuiltExecutable>, ReconstructError> {
    if !include_method(ctx, method)? {
        return Ok(None);
    }
    let name = method.name.as_str();
    trace!(member = %ctx.declaration(name), "building executable");

    let descriptor = parse_method_descriptor(&method.descriptor)
        .map_err(|source| ctx.class_file_error(name, source))?;
    let signature = match method.signature.as_deref().map(parse_method_signature) {
        Some(Ok(signature)) => Some(signature),
        Some(Err(error)) => {
            warn!(member = %ctx.declaration(name), %error, "skipping method with malformed signature");
            return Ok(None);
        }
        None => None,
    };

    let (type_parameters, parameter_types, return_type, mut thrown) = match signature {
        Some(signature) => (
            signature.type_parameters,
            reconcile_parameters(ctx, name, signature.parameters, &descriptor.parameters),
            signature.return_type,
            signature.thrown,
        ),
        None => (
            Vec::new(),
            descriptor.parameters.clone(),
            descriptor.return_type.clone(),
            Vec::new(),
        ),
    };
    if thrown.is_empty() {
        thrown = method
            .exceptions
            .iter()
            .map(|internal| TypeReference::class(class_name_from_internal(internal)))
            .collect();
    }

    let recovered = if descriptor.parameters.is_empty() {
        Some(Vec::new())
    } else {
        method.parameter_names(&descriptor)
    };
    let names_recovered = recovered.is_some();
    let names = recovered.unwrap_or_else(|| {
        (0..descriptor.parameters.len())
            .map(|index| format!("arg{index}"))
            .collect()
    });

    let mut parameters: Vec<Parameter> = names
        .into_iter()
        .zip(parameter_types)
        .map(|(name, ty)| Parameter::new(name, ty))
        .collect();
    attach_parameter_annotations(ctx, name, &mut parameters, &method.parameter_annotations)?;

    let converted = convert_annotations(ctx.config, &method.annotations)
        .map_err(|source| ctx.class_file_error(name, source))?;

    let mut spec = if name == CONSTRUCTOR_NAME {
        ExecutableSpec::constructor()
    } else {
        ExecutableSpec::method(name, return_type)
    };
    spec.modifiers = executable_modifiers(ctx.kind, method.access_flags, converted.trait_implemented);
    spec.annotations = converted.annotations;
    spec.type_parameters = type_parameters;
    spec.parameters = parameters;
    spec.thrown = thrown;
    spec.default_value = default_value(ctx, method, &spec)?;

    Ok(Some(BuiltExecutable {
        spec,
        names_recovered,
        erased_parameters: descriptor.parameters,
        inline_documentation: converted.documentation,
    }))
}

/// Matches generic parameter types to the descriptor's arity: missing
/// trailing entries fall back to the erased type, extra entries are dropped.
fn reconcile_parameters(
    ctx: &MemberContext<'_>,
    name: &str,
    mut generic: Vec<TypeReference>,
    erased: &[TypeReference],
) -> Vec<TypeReference> {
    if generic.len() < erased.len() {
        debug!(
            member = %ctx.declaration(name),
            generic = generic.len(),
            erased = erased.len(),
            "padding generic parameters with erased types"
        );
        generic.extend_from_slice(&erased[generic.len()..]);
    } else if generic.len() > erased.len() {
        warn!(
            member = %ctx.declaration(name),
            generic = generic.len(),
            erased = erased.len(),
            "signature declares more parameters than the descriptor"
        );
        generic.truncate(erased.len());
    }
    generic
}

/// Parameter annotation tables may omit leading synthetic parameters; a
/// shorter table lines up with the trailing parameters.
fn attach_parameter_annotations(
    ctx: &MemberContext<'_>,
    name: &str,
    parameters: &mut [Parameter],
    table: &[Vec<RawAnnotation>],
) -> Result<(), ReconstructError> {
    let offset = parameters.len().saturating_sub(table.len());
    for (parameter, raw) in parameters[offset..].iter_mut().zip(table) {
        parameter.annotations = convert_annotations(ctx.config, raw)
            .map_err(|source| ctx.class_file_error(name, source))?
            .annotations;
    }
    Ok(())
}

fn executable_modifiers(kind: TypeKind, flags: u16, trait_implemented: bool) -> ModifierSet {
    let mut modifiers = member_modifiers(flags);
    let in_interface = matches!(kind, TypeKind::Interface | TypeKind::Annotation);
    if in_interface && !has(flags, ACC_ABSTRACT) && !has(flags, ACC_STATIC) {
        modifiers.insert(Modifier::Default);
    }
    if trait_implemented {
        modifiers.remove(Modifier::Abstract);
        modifiers.insert(Modifier::Default);
    }
    modifiers
}

fn default_value(
    ctx: &MemberContext<'_>,
    method: &MethodInfo,
    spec: &ExecutableSpec,
) -> Result<Option<AnnotationValue>, ReconstructError> {
    let Some(raw) = &method.annotation_default else {
        return Ok(None);
    };
    if ctx.kind != TypeKind::Annotation {
        return Err(InvariantViolation::new(
            ctx.declaration(&method.name),
            "default value outside an annotation type",
        )
        .into());
    }
    if !spec.parameters.is_empty() {
        return Err(InvariantViolation::new(
            ctx.declaration(&method.name),
            "annotation element with a default value takes parameters",
        )
        .into());
    }
    annotation_value(raw)
        .map(Some)
        .map_err(|source| ctx.class_file_error(&method.name, source))
}
