// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.4

use crate::{
    constant_pool::{
        ConstantTag, CpEntry, CpInfo, DynamicInfo, MethodHandleInfo, NameAndTypeInfo, RefInfo,
    },
    cursor::U2,
    ClassFileError, ConstantPool, Result,
};

use super::Parser;

impl<'a> Parser<'a> {
    /// Reads `constant_pool_count - 1` slots and checks the references between them.
    pub(super) fn parse_constant_pool(&mut self, constant_pool_count: U2) -> Result<ConstantPool> {
        let count = constant_pool_count.value as usize;
        if count == 0 {
            return Err(ClassFileError::IndexOutOfRange { index: 0, count: 0 });
        }

        let mut entries = Vec::with_capacity(count);
        entries.push(None);
        while entries.len() < count {
            let entry = self.parse_cp_entry(entries.len() as u16)?;
            let double_width = entry.info.tag().is_double_width();

            entries.push(Some(entry));
            if double_width {
                entries.push(None);
            }
        }
        // A Long or Double in the last slot has no room for its upper half.
        if entries.len() > count {
            return Err(ClassFileError::IndexOutOfRange {
                index: count as u16,
                count: constant_pool_count.value,
            });
        }

        let constant_pool = ConstantPool::new(entries);
        constant_pool.validate()?;
        Ok(constant_pool)
    }

    fn parse_cp_entry(&mut self, index: u16) -> Result<CpEntry> {
        let tag = self.cursor.read_u1()?;
        let kind = ConstantTag::try_from(tag.value).map_err(|value| {
            ClassFileError::UnknownConstantTag {
                tag: value,
                index,
                offset: tag.offset,
            }
        })?;

        let info = match kind {
            ConstantTag::Utf8 => self.parse_utf8(index)?,
            ConstantTag::Integer => CpInfo::Integer(self.cursor.read_i4()?),
            ConstantTag::Float => CpInfo::Float(self.cursor.read_f4()?),
            ConstantTag::Long => CpInfo::Long(self.cursor.read_i8()?),
            ConstantTag::Double => CpInfo::Double(self.cursor.read_f8()?),
            ConstantTag::Class => CpInfo::Class {
                name_index: self.cursor.read_u2()?,
            },
            ConstantTag::String => CpInfo::String {
                string_index: self.cursor.read_u2()?,
            },
            ConstantTag::FieldRef => CpInfo::FieldRef(self.parse_ref_info()?),
            ConstantTag::MethodRef => CpInfo::MethodRef(self.parse_ref_info()?),
            ConstantTag::InterfaceMethodRef => CpInfo::InterfaceMethodRef(self.parse_ref_info()?),
            ConstantTag::NameAndType => CpInfo::NameAndType(NameAndTypeInfo {
                name_index: self.cursor.read_u2()?,
                descriptor_index: self.cursor.read_u2()?,
            }),
            ConstantTag::MethodHandle => CpInfo::MethodHandle(MethodHandleInfo {
                reference_kind: self.cursor.read_u1()?,
                reference_index: self.cursor.read_u2()?,
            }),
            ConstantTag::MethodType => CpInfo::MethodType {
                descriptor_index: self.cursor.read_u2()?,
            },
            ConstantTag::Dynamic => CpInfo::Dynamic(self.parse_dynamic_info()?),
            ConstantTag::InvokeDynamic => CpInfo::InvokeDynamic(self.parse_dynamic_info()?),
            ConstantTag::Module => CpInfo::Module {
                name_index: self.cursor.read_u2()?,
            },
            ConstantTag::Package => CpInfo::Package {
                name_index: self.cursor.read_u2()?,
            },
        };

        Ok(CpEntry { index, tag, info })
    }

    /// Utf8 entries hold modified UTF-8: `NUL` as two bytes and supplementary
    /// characters as surrogate pairs.
    fn parse_utf8(&mut self, index: u16) -> Result<CpInfo> {
        let length = self.cursor.read_u2()?;
        let bytes = self.cursor.read_bytes(length.value as usize)?;
        let value = cesu8::from_java_cesu8(bytes)
            .map_err(|_| ClassFileError::MalformedUtf8 { index })?
            .into_owned();

        Ok(CpInfo::Utf8 { length, value })
    }

    fn parse_ref_info(&mut self) -> Result<RefInfo> {
        Ok(RefInfo {
            class_index: self.cursor.read_u2()?,
            name_and_type_index: self.cursor.read_u2()?,
        })
    }

    fn parse_dynamic_info(&mut self) -> Result<DynamicInfo> {
        Ok(DynamicInfo {
            bootstrap_method_attr_index: self.cursor.read_u2()?,
            name_and_type_index: self.cursor.read_u2()?,
        })
    }
}
