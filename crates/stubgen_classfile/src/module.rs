use crate::access::{self, ACC_ANNOTATION, ACC_ENUM, ACC_INTERFACE, ACC_STATIC, ACC_SYNTHETIC};
use crate::annotation::{
    read_annotations, read_element_value, read_parameter_annotations, ConstantValue, ElementValue,
    RawAnnotation,
};
use crate::descriptor::MethodDescriptor;
use crate::error::ClassParseError;
use crate::names::class_name_from_internal;
use crate::pool::ConstantPool;
use crate::reader::ClassReader;
use stubgen_model::ClassName;

/// The declarations of one compiled class file.
///
/// Class names are kept in internal form (`a/b/Outer$Inner`).
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledModule {
    pub major_version: u16,
    pub access_flags: u16,
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub signature: Option<String>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub annotations: Vec<RawAnnotation>,
    pub inner_classes: Vec<InnerClassEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub constant_value: Option<ConstantValue>,
    pub annotations: Vec<RawAnnotation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub exceptions: Vec<String>,
    /// Contents of the `MethodParameters` attribute, when compiled with
    /// `-parameters`.
    pub parameters: Option<Vec<MethodParameter>>,
    pub local_variables: Vec<LocalVariable>,
    pub annotations: Vec<RawAnnotation>,
    pub parameter_annotations: Vec<Vec<RawAnnotation>>,
    pub annotation_default: Option<ElementValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodParameter {
    pub name: Option<String>,
    pub access_flags: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable {
    pub start_pc: u16,
    pub name: String,
    pub descriptor: String,
    pub index: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassEntry {
    pub inner_class: String,
    pub outer_class: Option<String>,
    /// Absent for anonymous classes.
    pub inner_name: Option<String>,
    pub access_flags: u16,
}

impl CompiledModule {
    pub fn parse(bytes: &[u8]) -> Result<Self, ClassParseError> {
        let mut reader = ClassReader::new(bytes);
        reader.expect_magic()?;
        let _minor_version = reader.read_u2()?;
        let major_version = reader.read_u2()?;
        let pool = ConstantPool::parse(&mut reader)?;

        let mut access_flags = reader.read_u2()?;
        let this_class = pool.class_name(reader.read_u2()?)?;
        let super_class = pool.optional_class_name(reader.read_u2()?)?;

        let interfaces_count = reader.read_u2()?;
        let mut interfaces = Vec::with_capacity(interfaces_count as usize);
        for _ in 0..interfaces_count {
            interfaces.push(pool.class_name(reader.read_u2()?)?);
        }

        let fields_count = reader.read_u2()?;
        let mut fields = Vec::with_capacity(fields_count as usize);
        for _ in 0..fields_count {
            fields.push(FieldInfo::parse(&mut reader, &pool)?);
        }

        let methods_count = reader.read_u2()?;
        let mut methods = Vec::with_capacity(methods_count as usize);
        for _ in 0..methods_count {
            methods.push(MethodInfo::parse(&mut reader, &pool)?);
        }

        let mut signature = None;
        let mut annotations = Vec::new();
        let mut invisible = Vec::new();
        let mut inner_classes = Vec::new();
        for_each_attribute(&mut reader, &pool, |name, body| {
            match name {
                "Signature" => signature = Some(pool.utf8(body.read_u2()?)?.to_string()),
                "Synthetic" => access_flags |= ACC_SYNTHETIC,
                "RuntimeVisibleAnnotations" => annotations = read_annotations(body, &pool)?,
                "RuntimeInvisibleAnnotations" => invisible = read_annotations(body, &pool)?,
                "InnerClasses" => inner_classes = read_inner_classes(body, &pool)?,
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        annotations.extend(invisible);

        Ok(Self {
            major_version,
            access_flags,
            this_class,
            super_class,
            interfaces,
            signature,
            fields,
            methods,
            annotations,
            inner_classes,
        })
    }

    pub fn class_name(&self) -> ClassName {
        class_name_from_internal(&self.this_class)
    }

    /// Dotted runtime name, e.g. `a.b.Outer$Inner`.
    pub fn binary_name(&self) -> String {
        self.this_class.replace('/', ".")
    }

    pub fn has_flag(&self, flag: u16) -> bool {
        access::has(self.access_flags, flag)
    }

    pub fn is_interface(&self) -> bool {
        self.has_flag(ACC_INTERFACE)
    }

    pub fn is_annotation(&self) -> bool {
        self.has_flag(ACC_ANNOTATION)
    }

    pub fn is_enum(&self) -> bool {
        self.has_flag(ACC_ENUM)
    }

    /// The `InnerClasses` entry describing this class itself, if it is nested.
    pub fn own_inner_entry(&self) -> Option<&InnerClassEntry> {
        self.inner_classes
            .iter()
            .find(|entry| entry.inner_class == self.this_class)
    }

    /// Named member classes declared directly inside this class, in
    /// class-file order.
    pub fn member_classes(&self) -> impl Iterator<Item = &InnerClassEntry> {
        self.inner_classes.iter().filter(move |entry| {
            entry.inner_name.is_some()
                && entry.outer_class.as_deref() == Some(self.this_class.as_str())
        })
    }
}

impl FieldInfo {
    fn parse(reader: &mut ClassReader<'_>, pool: &ConstantPool) -> Result<Self, ClassParseError> {
        let mut access_flags = reader.read_u2()?;
        let name = pool.utf8(reader.read_u2()?)?.to_string();
        let descriptor = pool.utf8(reader.read_u2()?)?.to_string();

        let mut signature = None;
        let mut constant_value = None;
        let mut annotations = Vec::new();
        let mut invisible = Vec::new();
        for_each_attribute(reader, pool, |attribute, body| {
            match attribute {
                "Signature" => signature = Some(pool.utf8(body.read_u2()?)?.to_string()),
                "ConstantValue" => constant_value = Some(pool.constant_value(body.read_u2()?)?),
                "Synthetic" => access_flags |= ACC_SYNTHETIC,
                "RuntimeVisibleAnnotations" => annotations = read_annotations(body, pool)?,
                "RuntimeInvisibleAnnotations" => invisible = read_annotations(body, pool)?,
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        annotations.extend(invisible);

        Ok(Self {
            access_flags,
            name,
            descriptor,
            signature,
            constant_value,
            annotations,
        })
    }

    pub fn has_flag(&self, flag: u16) -> bool {
        access::has(self.access_flags, flag)
    }
}

impl MethodInfo {
    fn parse(reader: &mut ClassReader<'_>, pool: &ConstantPool) -> Result<Self, ClassParseError> {
        let mut access_flags = reader.read_u2()?;
        let name = pool.utf8(reader.read_u2()?)?.to_string();
        let descriptor = pool.utf8(reader.read_u2()?)?.to_string();

        let mut signature = None;
        let mut exceptions = Vec::new();
        let mut parameters = None;
        let mut local_variables = Vec::new();
        let mut annotations = Vec::new();
        let mut invisible = Vec::new();
        let mut parameter_annotations = Vec::new();
        let mut invisible_parameters = Vec::new();
        let mut annotation_default = None;
        for_each_attribute(reader, pool, |attribute, body| {
            match attribute {
                "Signature" => signature = Some(pool.utf8(body.read_u2()?)?.to_string()),
                "Synthetic" => access_flags |= ACC_SYNTHETIC,
                "Exceptions" => {
                    let count = body.read_u2()?;
                    for _ in 0..count {
                        exceptions.push(pool.class_name(body.read_u2()?)?);
                    }
                }
                "MethodParameters" => {
                    let count = body.read_u1()?;
                    let mut entries = Vec::with_capacity(count as usize);
                    for _ in 0..count {
                        let name = pool.optional_utf8(body.read_u2()?)?;
                        let access_flags = body.read_u2()?;
                        entries.push(MethodParameter { name, access_flags });
                    }
                    parameters = Some(entries);
                }
                "Code" => local_variables.extend(read_code_locals(body, pool)?),
                "RuntimeVisibleAnnotations" => annotations = read_annotations(body, pool)?,
                "RuntimeInvisibleAnnotations" => invisible = read_annotations(body, pool)?,
                "RuntimeVisibleParameterAnnotations" => {
                    parameter_annotations = read_parameter_annotations(body, pool)?
                }
                "RuntimeInvisibleParameterAnnotations" => {
                    invisible_parameters = read_parameter_annotations(body, pool)?
                }
                "AnnotationDefault" => annotation_default = Some(read_element_value(body, pool)?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        annotations.extend(invisible);
        merge_parameter_annotations(&mut parameter_annotations, invisible_parameters);

        Ok(Self {
            access_flags,
            name,
            descriptor,
            signature,
            exceptions,
            parameters,
            local_variables,
            annotations,
            parameter_annotations,
            annotation_default,
        })
    }

    pub fn has_flag(&self, flag: u16) -> bool {
        access::has(self.access_flags, flag)
    }

    /// Source names of the parameters, when the class file records them.
    ///
    /// `MethodParameters` wins over the local variable table. A table that
    /// does not name every parameter counts as absent.
    pub fn parameter_names(&self, descriptor: &MethodDescriptor) -> Option<Vec<String>> {
        let arity = descriptor.parameters.len();
        if let Some(parameters) = &self.parameters {
            if parameters.len() == arity {
                let names: Option<Vec<String>> =
                    parameters.iter().map(|param| param.name.clone()).collect();
                if names.is_some() {
                    return names;
                }
            }
        }

        if self.local_variables.is_empty() {
            return None;
        }

        let mut slot: u16 = if self.has_flag(ACC_STATIC) { 0 } else { 1 };
        let mut names = Vec::with_capacity(arity);
        for size in descriptor.parameter_slots() {
            let variable = self
                .local_variables
                .iter()
                .filter(|variable| variable.index == slot)
                .min_by_key(|variable| variable.start_pc)?;
            names.push(variable.name.clone());
            slot = slot.checked_add(size)?;
        }
        Some(names)
    }
}

/// Visible and invisible parameter annotations, merged per positional index.
fn merge_parameter_annotations(
    visible: &mut Vec<Vec<RawAnnotation>>,
    invisible: Vec<Vec<RawAnnotation>>,
) {
    if visible.len() < invisible.len() {
        visible.resize_with(invisible.len(), Vec::new);
    }
    for (slot, extra) in visible.iter_mut().zip(invisible) {
        slot.extend(extra);
    }
}

/// Walks an attribute table. `handle` returns `false` for attributes it does
/// not understand, which are skipped by length; understood attributes must
/// consume their whole body.
fn for_each_attribute<'a, F>(
    reader: &mut ClassReader<'a>,
    pool: &ConstantPool,
    mut handle: F,
) -> Result<(), ClassParseError>
where
    F: FnMut(&str, &mut ClassReader<'a>) -> Result<bool, ClassParseError>,
{
    let count = reader.read_u2()?;
    for _ in 0..count {
        let name = pool.utf8(reader.read_u2()?)?;
        let length = reader.read_u4()? as usize;
        let mut body = ClassReader::new(reader.read_slice(length)?);
        if handle(name, &mut body)? && !body.is_empty() {
            return Err(ClassParseError::AttributeLength {
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn read_inner_classes(
    body: &mut ClassReader<'_>,
    pool: &ConstantPool,
) -> Result<Vec<InnerClassEntry>, ClassParseError> {
    let count = body.read_u2()?;
    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let inner_class = pool.class_name(body.read_u2()?)?;
        let outer_class = pool.optional_class_name(body.read_u2()?)?;
        let inner_name = pool.optional_utf8(body.read_u2()?)?;
        let access_flags = body.read_u2()?;
        entries.push(InnerClassEntry {
            inner_class,
            outer_class,
            inner_name,
            access_flags,
        });
    }
    Ok(entries)
}

/// Skips over bytecode and returns the entries of any `LocalVariableTable`.
fn read_code_locals(
    body: &mut ClassReader<'_>,
    pool: &ConstantPool,
) -> Result<Vec<LocalVariable>, ClassParseError> {
    let _max_stack = body.read_u2()?;
    let _max_locals = body.read_u2()?;
    let code_length = body.read_u4()? as usize;
    body.skip(code_length)?;
    let exception_table_length = body.read_u2()? as usize;
    body.skip(exception_table_length * 8)?;

    let mut locals = Vec::new();
    for_each_attribute(body, pool, |name, table| {
        if name != "LocalVariableTable" {
            return Ok(false);
        }
        let count = table.read_u2()?;
        for _ in 0..count {
            let start_pc = table.read_u2()?;
            let _length = table.read_u2()?;
            let name = pool.utf8(table.read_u2()?)?.to_string();
            let descriptor = pool.utf8(table.read_u2()?)?.to_string();
            let index = table.read_u2()?;
            locals.push(LocalVariable {
                start_pc,
                name,
                descriptor,
                index,
            });
        }
        Ok(true)
    })?;
    Ok(locals)
}
