//! Access flag bits shared by classes, fields, methods and inner class entries.

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
/// Same bit as `ACC_SUPER` on classes.
pub const ACC_SYNCHRONIZED: u16 = 0x0020;
/// Same bit as `ACC_VOLATILE` on fields.
pub const ACC_BRIDGE: u16 = 0x0040;
/// Same bit as `ACC_TRANSIENT` on fields.
pub const ACC_VARARGS: u16 = 0x0080;
pub const ACC_NATIVE: u16 = 0x0100;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_STRICT: u16 = 0x0800;
pub const ACC_SYNTHETIC: u16 = 0x1000;
pub const ACC_ANNOTATION: u16 = 0x2000;
pub const ACC_ENUM: u16 = 0x4000;
/// Same bit as `ACC_MODULE` on classes.
pub const ACC_MANDATED: u16 = 0x8000;

pub const fn has(flags: u16, flag: u16) -> bool {
    flags & flag != 0
}
