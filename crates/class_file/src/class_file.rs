use std::{fmt, io::Read};

use crate::{
    access_flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags},
    attributes::Attributes,
    cursor::{Scalar, U2, U4},
    parser::Parser,
    ConstantPool, Result,
};

pub const MAGIC: u32 = 0xCAFEBABE;

#[derive(Debug)]
pub struct ClassFile {
    pub magic: U4,
    pub minor_version: U2,
    pub major_version: U2,
    pub constant_pool_count: U2,
    pub constant_pool: ConstantPool,
    pub access_flags: Scalar<ClassAccessFlags>,
    pub this_class: U2,
    pub super_class: U2,
    pub interfaces_count: U2,
    pub interfaces: Vec<U2>,
    pub fields_count: U2,
    pub fields: Vec<FieldInfo>,
    pub methods_count: U2,
    pub methods: Vec<MethodInfo>,
    pub attributes: Attributes,
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<ClassFile> {
        Parser::new(bytes).parse()
    }

    pub fn read(mut r: impl Read) -> Result<ClassFile> {
        let mut bytes = Vec::new();
        r.read_to_end(&mut bytes)?;
        Self::parse(&bytes)
    }

    pub fn version(&self) -> ClassVersion {
        ClassVersion {
            major: self.major_version.value,
            minor: self.minor_version.value,
        }
    }

    pub fn class_name(&self) -> Result<&str> {
        self.constant_pool.get_class_name(self.this_class.value)
    }

    /// The direct superclass. `java/lang/Object` itself reports `java/lang/Object`.
    pub fn super_class_name(&self) -> Result<&str> {
        self.constant_pool
            .resolve_super_class(self.super_class.value)
    }

    pub fn interface_names(&self) -> Result<Vec<&str>> {
        self.interfaces
            .iter()
            .map(|index| self.constant_pool.get_class_name(index.value))
            .collect()
    }

    pub fn field_name(&self, field: &FieldInfo) -> Result<&str> {
        self.constant_pool.get_utf8(field.name_index.value)
    }

    pub fn field_descriptor(&self, field: &FieldInfo) -> Result<&str> {
        self.constant_pool.get_utf8(field.descriptor_index.value)
    }

    pub fn method_name(&self, method: &MethodInfo) -> Result<&str> {
        self.constant_pool.get_utf8(method.name_index.value)
    }

    pub fn method_descriptor(&self, method: &MethodInfo) -> Result<&str> {
        self.constant_pool.get_utf8(method.descriptor_index.value)
    }

    /// The first method called `name`, if any.
    pub fn find_method(&self, name: &str) -> Option<&MethodInfo> {
        self.methods
            .iter()
            .find(|method| self.method_name(method).map_or(false, |n| n == name))
    }

    pub fn source_file(&self) -> Result<Option<&str>> {
        self.attributes
            .source_file_index()
            .map(|index| self.constant_pool.get_utf8(index))
            .transpose()
    }

    /// Offset of the first byte after the class file.
    pub fn end(&self) -> usize {
        self.attributes
            .iter()
            .map(|attribute| attribute.end())
            .max()
            .unwrap_or_else(|| self.attributes.count.end())
    }
}

#[derive(Debug)]
pub struct FieldInfo {
    pub access_flags: Scalar<FieldAccessFlags>,
    pub name_index: U2,
    pub descriptor_index: U2,
    pub attributes: Attributes,
}

#[derive(Debug)]
pub struct MethodInfo {
    pub access_flags: Scalar<MethodAccessFlags>,
    pub name_index: U2,
    pub descriptor_index: U2,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClassVersion {
    pub major: u16,
    pub minor: u16,
}

impl ClassVersion {
    /// Java release that introduced this major version, e.g. `"17"` for 61.
    pub fn release(&self) -> Option<String> {
        match self.major {
            45 => Some("1.1".to_owned()),
            46..=48 => Some(format!("1.{}", self.major - 44)),
            49.. => Some((self.major - 44).to_string()),
            _ => None,
        }
    }

    /// Class files compiled with `--enable-preview` carry a minor version of 65535.
    pub fn is_preview(&self) -> bool {
        self.major >= 56 && self.minor == 0xFFFF
    }
}

impl fmt::Display for ClassVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod class_version_tests {
    use super::*;

    #[test]
    fn it_should_map_major_versions_to_releases() {
        let release = |major| ClassVersion { major, minor: 0 }.release();

        assert_eq!(release(45).as_deref(), Some("1.1"));
        assert_eq!(release(48).as_deref(), Some("1.4"));
        assert_eq!(release(52).as_deref(), Some("8"));
        assert_eq!(release(61).as_deref(), Some("17"));
        assert_eq!(release(44), None);
    }

    #[test]
    fn it_should_detect_preview_class_files() {
        assert!(ClassVersion { major: 65, minor: 0xFFFF }.is_preview());
        assert!(!ClassVersion { major: 61, minor: 0 }.is_preview());
        assert_eq!(ClassVersion { major: 61, minor: 0 }.to_string(), "61.0");
    }
}
