use std::fmt;

use crate::{
    cursor::{Scalar, U1, U2},
    ClassFileError, Result,
};

/// The value of `super_class` in `java/lang/Object`, the only class without a superclass.
pub const OBJECT_SENTINEL: &str = "java/lang/Object";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConstantTag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    FieldRef = 9,
    MethodRef = 10,
    InterfaceMethodRef = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    Dynamic = 17,
    InvokeDynamic = 18,
    Module = 19,
    Package = 20,
}

impl ConstantTag {
    pub fn name(self) -> &'static str {
        match self {
            ConstantTag::Utf8 => "Utf8",
            ConstantTag::Integer => "Integer",
            ConstantTag::Float => "Float",
            ConstantTag::Long => "Long",
            ConstantTag::Double => "Double",
            ConstantTag::Class => "Class",
            ConstantTag::String => "String",
            ConstantTag::FieldRef => "Fieldref",
            ConstantTag::MethodRef => "Methodref",
            ConstantTag::InterfaceMethodRef => "InterfaceMethodref",
            ConstantTag::NameAndType => "NameAndType",
            ConstantTag::MethodHandle => "MethodHandle",
            ConstantTag::MethodType => "MethodType",
            ConstantTag::Dynamic => "Dynamic",
            ConstantTag::InvokeDynamic => "InvokeDynamic",
            ConstantTag::Module => "Module",
            ConstantTag::Package => "Package",
        }
    }

    /// Long and Double take up two pool slots.
    pub fn is_double_width(self) -> bool {
        matches!(self, ConstantTag::Long | ConstantTag::Double)
    }
}

impl TryFrom<u8> for ConstantTag {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Ok(match value {
            1 => ConstantTag::Utf8,
            3 => ConstantTag::Integer,
            4 => ConstantTag::Float,
            5 => ConstantTag::Long,
            6 => ConstantTag::Double,
            7 => ConstantTag::Class,
            8 => ConstantTag::String,
            9 => ConstantTag::FieldRef,
            10 => ConstantTag::MethodRef,
            11 => ConstantTag::InterfaceMethodRef,
            12 => ConstantTag::NameAndType,
            15 => ConstantTag::MethodHandle,
            16 => ConstantTag::MethodType,
            17 => ConstantTag::Dynamic,
            18 => ConstantTag::InvokeDynamic,
            19 => ConstantTag::Module,
            20 => ConstantTag::Package,
            _ => return Err(value),
        })
    }
}

impl fmt::Display for ConstantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReferenceKind {
    GetField = 1,
    GetStatic = 2,
    PutField = 3,
    PutStatic = 4,
    InvokeVirtual = 5,
    InvokeStatic = 6,
    InvokeSpecial = 7,
    NewInvokeSpecial = 8,
    InvokeInterface = 9,
}

impl ReferenceKind {
    pub fn label(self) -> &'static str {
        match self {
            ReferenceKind::GetField => "REF_getField",
            ReferenceKind::GetStatic => "REF_getStatic",
            ReferenceKind::PutField => "REF_putField",
            ReferenceKind::PutStatic => "REF_putStatic",
            ReferenceKind::InvokeVirtual => "REF_invokeVirtual",
            ReferenceKind::InvokeStatic => "REF_invokeStatic",
            ReferenceKind::InvokeSpecial => "REF_invokeSpecial",
            ReferenceKind::NewInvokeSpecial => "REF_newInvokeSpecial",
            ReferenceKind::InvokeInterface => "REF_invokeInterface",
        }
    }

    /// The pool entry kinds a method handle of this kind may point at.
    fn targets(self) -> &'static [ConstantTag] {
        match self {
            ReferenceKind::GetField
            | ReferenceKind::GetStatic
            | ReferenceKind::PutField
            | ReferenceKind::PutStatic => &[ConstantTag::FieldRef],
            ReferenceKind::InvokeVirtual | ReferenceKind::NewInvokeSpecial => {
                &[ConstantTag::MethodRef]
            }
            ReferenceKind::InvokeStatic | ReferenceKind::InvokeSpecial => {
                &[ConstantTag::MethodRef, ConstantTag::InterfaceMethodRef]
            }
            ReferenceKind::InvokeInterface => &[ConstantTag::InterfaceMethodRef],
        }
    }
}

impl TryFrom<u8> for ReferenceKind {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Ok(match value {
            1 => ReferenceKind::GetField,
            2 => ReferenceKind::GetStatic,
            3 => ReferenceKind::PutField,
            4 => ReferenceKind::PutStatic,
            5 => ReferenceKind::InvokeVirtual,
            6 => ReferenceKind::InvokeStatic,
            7 => ReferenceKind::InvokeSpecial,
            8 => ReferenceKind::NewInvokeSpecial,
            9 => ReferenceKind::InvokeInterface,
            _ => return Err(value),
        })
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct RefInfo {
    pub class_index: U2,
    pub name_and_type_index: U2,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: U2,
    pub descriptor_index: U2,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodHandleInfo {
    pub reference_kind: U1,
    pub reference_index: U2,
}

/// Payload of both `Dynamic` and `InvokeDynamic`.
#[derive(Debug, PartialEq, Clone)]
pub struct DynamicInfo {
    pub bootstrap_method_attr_index: U2,
    pub name_and_type_index: U2,
}

#[derive(Debug, PartialEq, Clone)]
pub enum CpInfo {
    Utf8 { length: U2, value: String },
    Integer(Scalar<i32>),
    Float(Scalar<f32>),
    Long(Scalar<i64>),
    Double(Scalar<f64>),
    Class { name_index: U2 },
    String { string_index: U2 },
    FieldRef(RefInfo),
    MethodRef(RefInfo),
    InterfaceMethodRef(RefInfo),
    NameAndType(NameAndTypeInfo),
    MethodHandle(MethodHandleInfo),
    MethodType { descriptor_index: U2 },
    Dynamic(DynamicInfo),
    InvokeDynamic(DynamicInfo),
    Module { name_index: U2 },
    Package { name_index: U2 },
}

impl CpInfo {
    pub fn tag(&self) -> ConstantTag {
        match self {
            CpInfo::Utf8 { .. } => ConstantTag::Utf8,
            CpInfo::Integer(_) => ConstantTag::Integer,
            CpInfo::Float(_) => ConstantTag::Float,
            CpInfo::Long(_) => ConstantTag::Long,
            CpInfo::Double(_) => ConstantTag::Double,
            CpInfo::Class { .. } => ConstantTag::Class,
            CpInfo::String { .. } => ConstantTag::String,
            CpInfo::FieldRef(_) => ConstantTag::FieldRef,
            CpInfo::MethodRef(_) => ConstantTag::MethodRef,
            CpInfo::InterfaceMethodRef(_) => ConstantTag::InterfaceMethodRef,
            CpInfo::NameAndType(_) => ConstantTag::NameAndType,
            CpInfo::MethodHandle(_) => ConstantTag::MethodHandle,
            CpInfo::MethodType { .. } => ConstantTag::MethodType,
            CpInfo::Dynamic(_) => ConstantTag::Dynamic,
            CpInfo::InvokeDynamic(_) => ConstantTag::InvokeDynamic,
            CpInfo::Module { .. } => ConstantTag::Module,
            CpInfo::Package { .. } => ConstantTag::Package,
        }
    }

    /// Size of the payload following the tag byte.
    pub fn payload_len(&self) -> usize {
        match self {
            CpInfo::Utf8 { length, .. } => 2 + length.value as usize,
            CpInfo::Class { .. }
            | CpInfo::String { .. }
            | CpInfo::MethodType { .. }
            | CpInfo::Module { .. }
            | CpInfo::Package { .. } => 2,
            CpInfo::MethodHandle(_) => 3,
            CpInfo::Integer(_)
            | CpInfo::Float(_)
            | CpInfo::FieldRef(_)
            | CpInfo::MethodRef(_)
            | CpInfo::InterfaceMethodRef(_)
            | CpInfo::NameAndType(_)
            | CpInfo::Dynamic(_)
            | CpInfo::InvokeDynamic(_) => 4,
            CpInfo::Long(_) | CpInfo::Double(_) => 8,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct CpEntry {
    pub index: u16,
    pub tag: U1,
    pub info: CpInfo,
}

impl CpEntry {
    /// Number of bytes the entry occupies in the class file, tag included.
    pub fn len(&self) -> usize {
        1 + self.info.payload_len()
    }
}

/// The constant pool, indexed the way the class file indexes it.
///
/// Slot 0 and the upper halves of Long and Double entries are stored as `None`.
#[derive(Debug, Default, PartialEq)]
pub struct ConstantPool {
    entries: Vec<Option<CpEntry>>,
}

impl ConstantPool {
    /// Creates a pool from `constant_pool_count` slots, slot 0 included.
    pub(crate) fn new(entries: Vec<Option<CpEntry>>) -> Self {
        Self { entries }
    }

    /// The declared `constant_pool_count`.
    pub fn count(&self) -> u16 {
        self.entries.len().max(1) as u16
    }

    pub fn is_placeholder(&self, index: u16) -> bool {
        index != 0 && matches!(self.entries.get(index as usize), Some(None))
    }

    /// All real entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = &CpEntry> {
        self.entries.iter().flatten()
    }

    pub fn get(&self, index: u16) -> Result<&CpEntry> {
        match self.entries.get(index as usize) {
            Some(Some(entry)) if index != 0 => Ok(entry),
            Some(None) if index != 0 => Err(ClassFileError::PlaceholderIndex(index)),
            _ => Err(ClassFileError::IndexOutOfRange {
                index,
                count: self.count(),
            }),
        }
    }

    /// Gets the entry at `index`, requiring it to be one of `expected`.
    pub fn get_of(&self, index: u16, expected: &[ConstantTag]) -> Result<&CpEntry> {
        let entry = self.get(index)?;
        if !expected.contains(&entry.info.tag()) {
            return Err(mismatch(index, expected, &entry.info));
        }
        Ok(entry)
    }

    pub fn get_utf8(&self, index: u16) -> Result<&str> {
        match &self.get(index)?.info {
            CpInfo::Utf8 { value, .. } => Ok(value),
            other => Err(mismatch(index, &[ConstantTag::Utf8], other)),
        }
    }

    /// Name of the class referenced by a `Class` entry.
    pub fn get_class_name(&self, index: u16) -> Result<&str> {
        match &self.get(index)?.info {
            CpInfo::Class { name_index } => self.get_utf8(name_index.value),
            other => Err(mismatch(index, &[ConstantTag::Class], other)),
        }
    }

    pub fn get_name_and_type(&self, index: u16) -> Result<(&str, &str)> {
        match &self.get(index)?.info {
            CpInfo::NameAndType(NameAndTypeInfo {
                name_index,
                descriptor_index,
            }) => Ok((
                self.get_utf8(name_index.value)?,
                self.get_utf8(descriptor_index.value)?,
            )),
            other => Err(mismatch(index, &[ConstantTag::NameAndType], other)),
        }
    }

    /// Resolves `index` to the text it symbolically stands for.
    ///
    /// Strings resolve to their text, member references to `Class.name:descriptor`,
    /// method handles to their reference kind label followed by the resolved target.
    pub fn resolve(&self, index: u16) -> Result<String> {
        let entry = self.get(index)?;
        Ok(match &entry.info {
            CpInfo::Utf8 { value, .. } => value.clone(),
            CpInfo::Integer(v) => v.value.to_string(),
            CpInfo::Float(v) => format!("{}f", v.value),
            CpInfo::Long(v) => format!("{}l", v.value),
            CpInfo::Double(v) => format!("{}d", v.value),
            CpInfo::Class { name_index } => self.get_utf8(name_index.value)?.to_owned(),
            CpInfo::String { string_index } => self.get_utf8(string_index.value)?.to_owned(),
            CpInfo::FieldRef(r) | CpInfo::MethodRef(r) | CpInfo::InterfaceMethodRef(r) => {
                let class = self.get_class_name(r.class_index.value)?;
                let (name, descriptor) = self.get_name_and_type(r.name_and_type_index.value)?;
                format!("{class}.{name}:{descriptor}")
            }
            CpInfo::NameAndType(NameAndTypeInfo {
                name_index,
                descriptor_index,
            }) => format!(
                "{}:{}",
                self.get_utf8(name_index.value)?,
                self.get_utf8(descriptor_index.value)?
            ),
            CpInfo::MethodHandle(handle) => {
                let kind = ReferenceKind::try_from(handle.reference_kind.value).map_err(|kind| {
                    ClassFileError::UnknownReferenceKind { kind, index }
                })?;
                format!(
                    "{} {}",
                    kind.label(),
                    self.resolve(handle.reference_index.value)?
                )
            }
            CpInfo::MethodType { descriptor_index } => {
                self.get_utf8(descriptor_index.value)?.to_owned()
            }
            CpInfo::Dynamic(d) | CpInfo::InvokeDynamic(d) => {
                let (name, descriptor) = self.get_name_and_type(d.name_and_type_index.value)?;
                format!("#{}:{name}:{descriptor}", d.bootstrap_method_attr_index.value)
            }
            CpInfo::Module { name_index } | CpInfo::Package { name_index } => {
                self.get_utf8(name_index.value)?.to_owned()
            }
        })
    }

    /// Resolves a `super_class` value, where 0 stands for the root of the class hierarchy.
    pub fn resolve_super_class(&self, index: u16) -> Result<&str> {
        if index == 0 {
            return Ok(OBJECT_SENTINEL);
        }
        self.get_class_name(index)
    }

    /// Checks every cross reference inside the pool against the kind it must point at.
    pub fn validate(&self) -> Result<()> {
        for entry in self.iter() {
            match &entry.info {
                CpInfo::Utf8 { .. }
                | CpInfo::Integer(_)
                | CpInfo::Float(_)
                | CpInfo::Long(_)
                | CpInfo::Double(_) => {}
                CpInfo::Class { name_index }
                | CpInfo::Module { name_index }
                | CpInfo::Package { name_index } => {
                    self.get_of(name_index.value, &[ConstantTag::Utf8])?;
                }
                CpInfo::String { string_index } => {
                    self.get_of(string_index.value, &[ConstantTag::Utf8])?;
                }
                CpInfo::MethodType { descriptor_index } => {
                    self.get_of(descriptor_index.value, &[ConstantTag::Utf8])?;
                }
                CpInfo::FieldRef(r) | CpInfo::MethodRef(r) | CpInfo::InterfaceMethodRef(r) => {
                    self.get_of(r.class_index.value, &[ConstantTag::Class])?;
                    self.get_of(r.name_and_type_index.value, &[ConstantTag::NameAndType])?;
                }
                CpInfo::NameAndType(nt) => {
                    self.get_of(nt.name_index.value, &[ConstantTag::Utf8])?;
                    self.get_of(nt.descriptor_index.value, &[ConstantTag::Utf8])?;
                }
                CpInfo::MethodHandle(handle) => {
                    let kind = ReferenceKind::try_from(handle.reference_kind.value).map_err(
                        |kind| ClassFileError::UnknownReferenceKind {
                            kind,
                            index: entry.index,
                        },
                    )?;
                    self.get_of(handle.reference_index.value, kind.targets())?;
                }
                CpInfo::Dynamic(d) | CpInfo::InvokeDynamic(d) => {
                    self.get_of(d.name_and_type_index.value, &[ConstantTag::NameAndType])?;
                }
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ConstantPool {
    type Item = &'a CpEntry;
    type IntoIter = std::iter::Flatten<std::slice::Iter<'a, Option<CpEntry>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter().flatten()
    }
}

fn mismatch(index: u16, expected: &[ConstantTag], found: &CpInfo) -> ClassFileError {
    ClassFileError::StructuralReferenceMismatch {
        index,
        expected: expected_name(expected),
        found: found.tag().name(),
    }
}

fn expected_name(expected: &[ConstantTag]) -> &'static str {
    match expected {
        [tag] => tag.name(),
        [ConstantTag::MethodRef, ConstantTag::InterfaceMethodRef] => {
            "Methodref or InterfaceMethodref"
        }
        [ConstantTag::Integer, ConstantTag::Float, ConstantTag::Long, ConstantTag::Double, ConstantTag::String] => {
            "Integer, Float, Long, Double or String"
        }
        _ => "another kind",
    }
}
