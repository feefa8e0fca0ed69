//! Assembles class files for reconstruction tests.
#![allow(dead_code)]

use std::collections::HashMap;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_BRIDGE: u16 = 0x0040;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_SYNTHETIC: u16 = 0x1000;
pub const ACC_ANNOTATION: u16 = 0x2000;
pub const ACC_ENUM: u16 = 0x4000;

#[derive(Default)]
struct Pool {
    bytes: Vec<u8>,
    count: u16,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
}

impl Pool {
    fn push(&mut self, entry: &[u8], slots: u16) -> u16 {
        let index = self.count + 1;
        self.bytes.extend_from_slice(entry);
        self.count += slots;
        index
    }

    fn utf8(&mut self, text: &str) -> u16 {
        if let Some(index) = self.utf8.get(text) {
            return *index;
        }
        let mut entry = vec![1];
        entry.extend_from_slice(&(text.len() as u16).to_be_bytes());
        entry.extend_from_slice(text.as_bytes());
        let index = self.push(&entry, 1);
        self.utf8.insert(text.to_string(), index);
        index
    }

    fn class(&mut self, internal: &str) -> u16 {
        if let Some(index) = self.classes.get(internal) {
            return *index;
        }
        let name = self.utf8(internal);
        let mut entry = vec![7];
        entry.extend_from_slice(&name.to_be_bytes());
        let index = self.push(&entry, 1);
        self.classes.insert(internal.to_string(), index);
        index
    }

    fn integer(&mut self, value: i32) -> u16 {
        let mut entry = vec![3];
        entry.extend_from_slice(&value.to_be_bytes());
        self.push(&entry, 1)
    }

    fn long(&mut self, value: i64) -> u16 {
        let mut entry = vec![5];
        entry.extend_from_slice(&value.to_be_bytes());
        self.push(&entry, 2)
    }

    fn double(&mut self, value: f64) -> u16 {
        let mut entry = vec![6];
        entry.extend_from_slice(&value.to_bits().to_be_bytes());
        self.push(&entry, 2)
    }

    fn string(&mut self, text: &str) -> u16 {
        let utf8 = self.utf8(text);
        let mut entry = vec![8];
        entry.extend_from_slice(&utf8.to_be_bytes());
        self.push(&entry, 1)
    }
}

fn u2(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn attribute(out: &mut Vec<u8>, pool: &mut Pool, name: &str, body: &[u8]) {
    let name = pool.utf8(name);
    u2(out, name);
    out.extend_from_slice(&(body.len() as u32).to_be_bytes());
    out.extend_from_slice(body);
}

#[derive(Debug, Clone)]
pub enum Element {
    Str(String),
    /// Integer-backed constant with its tag: `I`, `Z`, `B`, `S` or `C`.
    Int(u8, i32),
    Long(i64),
    Double(f64),
    Enum(String, String),
    Class(String),
    Nested(Annotation),
    Array(Vec<Element>),
}

impl Element {
    pub fn str(text: &str) -> Self {
        Element::Str(text.to_string())
    }

    fn write(&self, out: &mut Vec<u8>, pool: &mut Pool) {
        match self {
            Element::Str(text) => {
                out.push(b's');
                u2(out, pool.utf8(text));
            }
            Element::Int(tag, value) => {
                out.push(*tag);
                u2(out, pool.integer(*value));
            }
            Element::Long(value) => {
                out.push(b'J');
                u2(out, pool.long(*value));
            }
            Element::Double(value) => {
                out.push(b'D');
                u2(out, pool.double(*value));
            }
            Element::Enum(descriptor, name) => {
                out.push(b'e');
                u2(out, pool.utf8(descriptor));
                u2(out, pool.utf8(name));
            }
            Element::Class(descriptor) => {
                out.push(b'c');
                u2(out, pool.utf8(descriptor));
            }
            Element::Nested(annotation) => {
                out.push(b'@');
                annotation.write(out, pool);
            }
            Element::Array(items) => {
                out.push(b'[');
                u2(out, items.len() as u16);
                for item in items {
                    item.write(out, pool);
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Annotation {
    pub descriptor: String,
    pub elements: Vec<(String, Element)>,
}

impl Annotation {
    pub fn new(descriptor: &str) -> Self {
        Self {
            descriptor: descriptor.to_string(),
            elements: Vec::new(),
        }
    }

    /// The inline documentation annotation with the given text.
    pub fn doc(text: &str) -> Self {
        Self::new("Lcom/blackbuild/annodocimal/annotations/AnnoDoc;").with("value", Element::str(text))
    }

    pub fn with(mut self, name: &str, value: Element) -> Self {
        self.elements.push((name.to_string(), value));
        self
    }

    fn write(&self, out: &mut Vec<u8>, pool: &mut Pool) {
        u2(out, pool.utf8(&self.descriptor));
        u2(out, self.elements.len() as u16);
        for (name, value) in &self.elements {
            u2(out, pool.utf8(name));
            value.write(out, pool);
        }
    }
}

fn annotations_attribute(out: &mut Vec<u8>, pool: &mut Pool, annotations: &[Annotation]) -> bool {
    if annotations.is_empty() {
        return false;
    }
    let mut body = Vec::new();
    u2(&mut body, annotations.len() as u16);
    for annotation in annotations {
        annotation.write(&mut body, pool);
    }
    attribute(out, pool, "RuntimeVisibleAnnotations", &body);
    true
}

#[derive(Debug, Clone)]
pub enum Constant {
    Int(i32),
    Long(i64),
    Str(String),
}

#[derive(Debug, Clone)]
pub struct Field {
    access: u16,
    name: String,
    descriptor: String,
    signature: Option<String>,
    constant: Option<Constant>,
    annotations: Vec<Annotation>,
}

impl Field {
    pub fn new(access: u16, name: &str, descriptor: &str) -> Self {
        Self {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: None,
            constant: None,
            annotations: Vec::new(),
        }
    }

    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    pub fn constant(mut self, constant: Constant) -> Self {
        self.constant = Some(constant);
        self
    }

    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    fn write(&self, out: &mut Vec<u8>, pool: &mut Pool) {
        u2(out, self.access);
        u2(out, pool.utf8(&self.name));
        u2(out, pool.utf8(&self.descriptor));
        let mut attributes = Vec::new();
        let mut count = 0;
        if let Some(signature) = &self.signature {
            let mut body = Vec::new();
            u2(&mut body, pool.utf8(signature));
            attribute(&mut attributes, pool, "Signature", &body);
            count += 1;
        }
        if let Some(constant) = &self.constant {
            let index = match constant {
                Constant::Int(value) => pool.integer(*value),
                Constant::Long(value) => pool.long(*value),
                Constant::Str(text) => pool.string(text),
            };
            let mut body = Vec::new();
            u2(&mut body, index);
            attribute(&mut attributes, pool, "ConstantValue", &body);
            count += 1;
        }
        if annotations_attribute(&mut attributes, pool, &self.annotations) {
            count += 1;
        }
        u2(out, count);
        out.extend_from_slice(&attributes);
    }
}

#[derive(Debug, Clone)]
pub struct Method {
    access: u16,
    name: String,
    descriptor: String,
    signature: Option<String>,
    exceptions: Vec<String>,
    parameter_names: Option<Vec<String>>,
    locals: Vec<(String, String, u16)>,
    annotations: Vec<Annotation>,
    parameter_annotations: Vec<Vec<Annotation>>,
    default: Option<Element>,
}

impl Method {
    pub fn new(access: u16, name: &str, descriptor: &str) -> Self {
        Self {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: None,
            exceptions: Vec::new(),
            parameter_names: None,
            locals: Vec::new(),
            annotations: Vec::new(),
            parameter_annotations: Vec::new(),
            default: None,
        }
    }

    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    pub fn throws(mut self, internal: &str) -> Self {
        self.exceptions.push(internal.to_string());
        self
    }

    /// Records names in a `MethodParameters` attribute.
    pub fn parameters(mut self, names: &[&str]) -> Self {
        self.parameter_names = Some(names.iter().map(|name| name.to_string()).collect());
        self
    }

    /// Adds a `LocalVariableTable` entry inside a `Code` attribute.
    pub fn local(mut self, name: &str, descriptor: &str, index: u16) -> Self {
        self.locals
            .push((name.to_string(), descriptor.to_string(), index));
        self
    }

    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn parameter_annotations(mut self, table: Vec<Vec<Annotation>>) -> Self {
        self.parameter_annotations = table;
        self
    }

    pub fn default_value(mut self, value: Element) -> Self {
        self.default = Some(value);
        self
    }

    fn write(&self, out: &mut Vec<u8>, pool: &mut Pool) {
        u2(out, self.access);
        u2(out, pool.utf8(&self.name));
        u2(out, pool.utf8(&self.descriptor));
        let mut attributes = Vec::new();
        let mut count = 0;
        if let Some(signature) = &self.signature {
            let mut body = Vec::new();
            u2(&mut body, pool.utf8(signature));
            attribute(&mut attributes, pool, "Signature", &body);
            count += 1;
        }
        if !self.exceptions.is_empty() {
            let mut body = Vec::new();
            u2(&mut body, self.exceptions.len() as u16);
            for exception in &self.exceptions {
                u2(&mut body, pool.class(exception));
            }
            attribute(&mut attributes, pool, "Exceptions", &body);
            count += 1;
        }
        if let Some(names) = &self.parameter_names {
            let mut body = vec![names.len() as u8];
            for name in names {
                u2(&mut body, pool.utf8(name));
                u2(&mut body, 0);
            }
            attribute(&mut attributes, pool, "MethodParameters", &body);
            count += 1;
        }
        if !self.locals.is_empty() {
            let mut table = Vec::new();
            u2(&mut table, self.locals.len() as u16);
            for (name, descriptor, index) in &self.locals {
                u2(&mut table, 0);
                u2(&mut table, 1);
                u2(&mut table, pool.utf8(name));
                u2(&mut table, pool.utf8(descriptor));
                u2(&mut table, *index);
            }
            let mut code = Vec::new();
            u2(&mut code, 1);
            u2(&mut code, 8);
            code.extend_from_slice(&1u32.to_be_bytes());
            // return
            code.push(0xb1);
            u2(&mut code, 0);
            u2(&mut code, 1);
            attribute(&mut code, pool, "LocalVariableTable", &table);
            attribute(&mut attributes, pool, "Code", &code);
            count += 1;
        }
        if annotations_attribute(&mut attributes, pool, &self.annotations) {
            count += 1;
        }
        if !self.parameter_annotations.is_empty() {
            let mut body = vec![self.parameter_annotations.len() as u8];
            for annotations in &self.parameter_annotations {
                u2(&mut body, annotations.len() as u16);
                for annotation in annotations {
                    annotation.write(&mut body, pool);
                }
            }
            attribute(&mut attributes, pool, "RuntimeVisibleParameterAnnotations", &body);
            count += 1;
        }
        if let Some(default) = &self.default {
            let mut body = Vec::new();
            default.write(&mut body, pool);
            attribute(&mut attributes, pool, "AnnotationDefault", &body);
            count += 1;
        }
        u2(out, count);
        out.extend_from_slice(&attributes);
    }
}

struct InnerEntry {
    inner: String,
    outer: Option<String>,
    name: Option<String>,
    access: u16,
}

/// A class file under construction; `bytes` serializes it.
pub struct ClassFile {
    access: u16,
    this_class: String,
    super_class: Option<String>,
    interfaces: Vec<String>,
    signature: Option<String>,
    fields: Vec<Field>,
    methods: Vec<Method>,
    annotations: Vec<Annotation>,
    inner_classes: Vec<InnerEntry>,
}

impl ClassFile {
    pub fn new(access: u16, internal_name: &str) -> Self {
        Self {
            access,
            this_class: internal_name.to_string(),
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            signature: None,
            fields: Vec::new(),
            methods: Vec::new(),
            annotations: Vec::new(),
            inner_classes: Vec::new(),
        }
    }

    pub fn superclass(mut self, internal: &str) -> Self {
        self.super_class = Some(internal.to_string());
        self
    }

    pub fn interface(mut self, internal: &str) -> Self {
        self.interfaces.push(internal.to_string());
        self
    }

    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn inner_class(
        mut self,
        inner: &str,
        outer: Option<&str>,
        name: Option<&str>,
        access: u16,
    ) -> Self {
        self.inner_classes.push(InnerEntry {
            inner: inner.to_string(),
            outer: outer.map(str::to_string),
            name: name.map(str::to_string),
            access,
        });
        self
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut pool = Pool::default();
        let mut body = Vec::new();

        u2(&mut body, self.access);
        u2(&mut body, pool.class(&self.this_class));
        let super_index = self
            .super_class
            .as_deref()
            .map(|name| pool.class(name))
            .unwrap_or(0);
        u2(&mut body, super_index);
        u2(&mut body, self.interfaces.len() as u16);
        for interface in &self.interfaces {
            u2(&mut body, pool.class(interface));
        }

        u2(&mut body, self.fields.len() as u16);
        for field in &self.fields {
            field.write(&mut body, &mut pool);
        }
        u2(&mut body, self.methods.len() as u16);
        for method in &self.methods {
            method.write(&mut body, &mut pool);
        }

        let mut attributes = Vec::new();
        let mut count = 0;
        if let Some(signature) = &self.signature {
            let mut attr = Vec::new();
            u2(&mut attr, pool.utf8(signature));
            attribute(&mut attributes, &mut pool, "Signature", &attr);
            count += 1;
        }
        if annotations_attribute(&mut attributes, &mut pool, &self.annotations) {
            count += 1;
        }
        if !self.inner_classes.is_empty() {
            let mut attr = Vec::new();
            u2(&mut attr, self.inner_classes.len() as u16);
            for entry in &self.inner_classes {
                u2(&mut attr, pool.class(&entry.inner));
                let outer = entry.outer.as_deref().map(|name| pool.class(name)).unwrap_or(0);
                u2(&mut attr, outer);
                let name = entry.name.as_deref().map(|name| pool.utf8(name)).unwrap_or(0);
                u2(&mut attr, name);
                u2(&mut attr, entry.access);
            }
            attribute(&mut attributes, &mut pool, "InnerClasses", &attr);
            count += 1;
        }
        u2(&mut body, count);
        body.extend_from_slice(&attributes);

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        u2(&mut out, 0);
        u2(&mut out, 52);
        u2(&mut out, pool.count + 1);
        out.extend_from_slice(&pool.bytes);
        out.extend_from_slice(&body);
        out
    }
}
