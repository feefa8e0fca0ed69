use crate::config::ReconstructionConfig;
use crate::documentation::DocumentationContext;
use crate::error::ReconstructError;
use crate::locator::ClassLocator;
use crate::members::{build_executable, build_field, convert_annotations, MemberContext};
use crate::nested::ReconstructionCache;
use stubgen_classfile::access::{
    has, ACC_ABSTRACT, ACC_FINAL, ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC, ACC_STATIC,
};
use stubgen_classfile::names::{class_name_from_internal, is_elided_supertype};
use stubgen_classfile::{parse_class_signature, CompiledModule};
use stubgen_docs::DocumentationStore;
use stubgen_model::{
    ClassName, MemberSpec, Modifier, ModifierSet, TypeKind, TypeModel, TypeReference,
};
use tracing::{debug, info_span};

/// Rebuilds [`TypeModel`]s from class files and reattaches their
/// documentation.
///
/// Every call to [`reconstruct`](Self::reconstruct) starts from an empty
/// cache, so a reconstructor can be shared between threads.
pub struct Reconstructor<'a> {
    pub(crate) locator: &'a dyn ClassLocator,
    pub(crate) docs: &'a dyn DocumentationStore,
    pub(crate) config: &'a ReconstructionConfig,
}

impl<'a> Reconstructor<'a> {
    pub fn new(
        locator: &'a dyn ClassLocator,
        docs: &'a dyn DocumentationStore,
        config: &'a ReconstructionConfig,
    ) -> Self {
        Self {
            locator,
            docs,
            config,
        }
    }

    pub fn config(&self) -> &ReconstructionConfig {
        self.config
    }

    /// Reconstructs the type with the given binary name (`a.b.Outer$Inner`)
    /// and everything nested in it.
    pub fn reconstruct(&self, binary_name: &str) -> Result<TypeModel, ReconstructError> {
        let module = self.locator.resolve(binary_name)?;
        self.reconstruct_module(&module)
    }

    /// Same as [`reconstruct`](Self::reconstruct) for a class file that is
    /// already parsed.
    pub fn reconstruct_module(&self, module: &CompiledModule) -> Result<TypeModel, ReconstructError> {
        let mut cache = ReconstructionCache::default();
        self.build(module, None, &mut cache)
    }

    /// `flags` overrides the access flags of the type, as recorded by the
    /// enclosing type's nesting metadata.
    pub(crate) fn build(
        &self,
        module: &CompiledModule,
        flags: Option<u16>,
        cache: &mut ReconstructionCache,
    ) -> Result<TypeModel, ReconstructError> {
        let binary_name = module.binary_name();
        let span = info_span!("reconstruct", type_name = %binary_name);
        let _guard = span.enter();

        cache.begin(&binary_name);
        let result = self.build_type(module, flags, &binary_name, cache);
        cache.finish(&binary_name);
        result
    }

    fn build_type(
        &self,
        module: &CompiledModule,
        flags: Option<u16>,
        binary_name: &str,
        cache: &mut ReconstructionCache,
    ) -> Result<TypeModel, ReconstructError> {
        let kind = type_kind(module);
        let name = module.class_name();
        let canonical = name.canonical_name();
        let flags = flags
            .or_else(|| module.own_inner_entry().map(|entry| entry.access_flags))
            .unwrap_or(module.access_flags);

        let mut model = TypeModel::new(kind, name);
        model.modifiers = type_modifiers(kind, flags);
        self.attach_supertypes(&mut model, module, &canonical)?;

        let converted = convert_annotations(self.config, &module.annotations).map_err(|source| {
            ReconstructError::ClassFile {
                declaration: canonical.clone(),
                source,
            }
        })?;
        model.annotations = converted.annotations;

        let docs = DocumentationContext {
            store: self.docs,
            config: self.config,
            type_name: binary_name,
        };
        model.documentation = docs.type_documentation(converted.documentation);

        let ctx = MemberContext {
            config: self.config,
            kind,
            declaring: &canonical,
        };
        for field in &module.fields {
            if let Some(built) = build_field(&ctx, field)? {
                let mut spec = built.spec;
                spec.documentation = docs.field_documentation(&spec.name, built.inline_documentation);
                model.members.push(MemberSpec::Field(spec));
            }
        }
        for method in &module.methods {
            if let Some(built) = build_executable(&ctx, method)? {
                let documentation = docs.executable_documentation(&built);
                let mut spec = built.spec;
                spec.documentation = documentation;
                model.members.push(MemberSpec::Executable(spec));
            }
        }
        debug!(members = model.members.len(), "members built");

        model.validate()?;
        model.nested_types = self.nested_types(module, cache);
        Ok(model)
    }

    fn attach_supertypes(
        &self,
        model: &mut TypeModel,
        module: &CompiledModule,
        canonical: &str,
    ) -> Result<(), ReconstructError> {
        let (superclass, interfaces) = match &module.signature {
            Some(signature) => {
                let parsed =
                    parse_class_signature(signature).map_err(|source| ReconstructError::Grammar {
                        declaration: canonical.to_string(),
                        source,
                    })?;
                model.type_parameters = parsed.type_parameters;
                (Some(parsed.superclass), parsed.interfaces)
            }
            None => (
                module
                    .super_class
                    .as_deref()
                    .map(|internal| TypeReference::class(class_name_from_internal(internal))),
                module
                    .interfaces
                    .iter()
                    .map(|internal| TypeReference::class(class_name_from_internal(internal)))
                    .collect(),
            ),
        };

        let kind = model.kind;
        let markers = &self.config.marker_interfaces;
        let elided = |ty: &TypeReference| {
            ty.class_name()
                .is_some_and(|name| is_elided_supertype(kind, name, markers))
        };

        if kind == TypeKind::Class {
            let object = ClassName::object();
            model.superclass = superclass
                .filter(|ty| ty.class_name() != Some(&object))
                .filter(|ty| !elided(ty));
        }
        model.superinterfaces = interfaces.into_iter().filter(|ty| !elided(ty)).collect();
        Ok(())
    }
}

fn type_kind(module: &CompiledModule) -> TypeKind {
    if module.is_annotation() {
        TypeKind::Annotation
    } else if module.is_interface() {
        TypeKind::Interface
    } else if module.is_enum() {
        TypeKind::Enum
    } else {
        TypeKind::Class
    }
}

fn type_modifiers(kind: TypeKind, flags: u16) -> ModifierSet {
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
    match kind {
        TypeKind::Class => {
            if has(flags, ACC_FINAL) {
                modifiers.insert(Modifier::Final);
            }
            if has(flags, ACC_ABSTRACT) {
                modifiers.insert(Modifier::Abstract);
            }
        }
        // Implied by the kind itself.
        TypeKind::Interface | TypeKind::Annotation | TypeKind::Enum => {}
    }
    modifiers
}
