// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.7.16

use crate::{
    attributes::{
        Annotation, ElementValue, ElementValuePair, LocalVarTarget, TargetInfo, TypeAnnotation,
        TypePathEntry, TypePathKind,
    },
    constant_pool::ConstantTag,
    cursor::Scalar,
    ClassFileError, ConstantPool, Result,
};

use super::Parser;

impl<'a> Parser<'a> {
    pub(super) fn parse_annotations(&mut self, pool: &ConstantPool) -> Result<Vec<Annotation>> {
        self.parse_table(|p| p.parse_annotation(pool))
    }

    pub(super) fn parse_parameter_annotations(
        &mut self,
        pool: &ConstantPool,
    ) -> Result<Vec<Vec<Annotation>>> {
        let num_parameters = self.cursor.read_u1()?;
        (0..num_parameters.value)
            .map(|_| self.parse_annotations(pool))
            .collect()
    }

    pub(super) fn parse_type_annotations(
        &mut self,
        pool: &ConstantPool,
    ) -> Result<Vec<TypeAnnotation>> {
        self.parse_table(|p| p.parse_type_annotation(pool))
    }

    fn parse_annotation(&mut self, pool: &ConstantPool) -> Result<Annotation> {
        let type_index = self.cursor.read_u2()?;
        pool.get_of(type_index.value, &[ConstantTag::Utf8])?;
        let element_value_pairs = self.parse_table(|p| {
            let element_name_index = p.cursor.read_u2()?;
            pool.get_of(element_name_index.value, &[ConstantTag::Utf8])?;

            Ok(ElementValuePair {
                element_name_index,
                value: p.parse_element_value(pool)?,
            })
        })?;

        Ok(Annotation {
            type_index,
            element_value_pairs,
        })
    }

    pub(super) fn parse_element_value(&mut self, pool: &ConstantPool) -> Result<ElementValue> {
        let tag = self.cursor.read_u1()?;

        Ok(match tag.value {
            b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => {
                let const_value_index = self.cursor.read_u2()?;
                let expected = match tag.value {
                    b'D' => ConstantTag::Double,
                    b'F' => ConstantTag::Float,
                    b'J' => ConstantTag::Long,
                    b's' => ConstantTag::Utf8,
                    _ => ConstantTag::Integer,
                };
                pool.get_of(const_value_index.value, &[expected])?;

                ElementValue::Const {
                    tag,
                    const_value_index,
                }
            }
            b'e' => {
                let type_name_index = self.cursor.read_u2()?;
                let const_name_index = self.cursor.read_u2()?;
                pool.get_of(type_name_index.value, &[ConstantTag::Utf8])?;
                pool.get_of(const_name_index.value, &[ConstantTag::Utf8])?;

                ElementValue::Enum {
                    tag,
                    type_name_index,
                    const_name_index,
                }
            }
            b'c' => {
                let class_info_index = self.cursor.read_u2()?;
                pool.get_of(class_info_index.value, &[ConstantTag::Utf8])?;

                ElementValue::Class {
                    tag,
                    class_info_index,
                }
            }
            b'@' => ElementValue::Annotation {
                tag,
                annotation: Box::new(self.nested(|p| p.parse_annotation(pool))?),
            },
            b'[' => {
                let num_values = self.cursor.read_u2()?;
                let values = (0..num_values.value)
                    .map(|_| self.nested(|p| p.parse_element_value(pool)))
                    .collect::<Result<Vec<_>>>()?;

                ElementValue::Array {
                    tag,
                    num_values,
                    values,
                }
            }
            unknown => {
                return Err(ClassFileError::UnknownElementValueTag {
                    tag: unknown as char,
                    offset: tag.offset,
                })
            }
        })
    }

    fn parse_type_annotation(&mut self, pool: &ConstantPool) -> Result<TypeAnnotation> {
        let target_type = self.cursor.read_u1()?;
        let target_info = match target_type.value {
            0x00 | 0x01 => TargetInfo::TypeParameter {
                type_parameter_index: self.cursor.read_u1()?,
            },
            0x10 => TargetInfo::SuperType {
                supertype_index: self.cursor.read_u2()?,
            },
            0x11 | 0x12 => TargetInfo::TypeParameterBound {
                type_parameter_index: self.cursor.read_u1()?,
                bound_index: self.cursor.read_u1()?,
            },
            0x13..=0x15 => TargetInfo::Empty,
            0x16 => TargetInfo::FormalParameter {
                formal_parameter_index: self.cursor.read_u1()?,
            },
            0x17 => TargetInfo::Throws {
                throws_type_index: self.cursor.read_u2()?,
            },
            0x40 | 0x41 => TargetInfo::LocalVar(self.parse_table(|p| {
                Ok(LocalVarTarget {
                    start_pc: p.cursor.read_u2()?,
                    length: p.cursor.read_u2()?,
                    index: p.cursor.read_u2()?,
                })
            })?),
            0x42 => TargetInfo::Catch {
                exception_table_index: self.cursor.read_u2()?,
            },
            0x43..=0x46 => TargetInfo::Offset {
                offset: self.cursor.read_u2()?,
            },
            0x47..=0x4B => TargetInfo::TypeArgument {
                offset: self.cursor.read_u2()?,
                type_argument_index: self.cursor.read_u1()?,
            },
            unknown => {
                return Err(ClassFileError::UnknownAttributeTargetType {
                    target_type: unknown,
                    offset: target_type.offset,
                })
            }
        };

        let path_length = self.cursor.read_u1()?;
        let target_path = (0..path_length.value)
            .map(|_| self.parse_type_path_entry())
            .collect::<Result<Vec<_>>>()?;

        Ok(TypeAnnotation {
            target_type,
            target_info,
            target_path,
            annotation: self.parse_annotation(pool)?,
        })
    }

    fn parse_type_path_entry(&mut self) -> Result<TypePathEntry> {
        let kind = self.cursor.read_u1()?;
        let type_path_kind = match kind.value {
            0 => TypePathKind::Array,
            1 => TypePathKind::Nested,
            2 => TypePathKind::Wildcard,
            3 => TypePathKind::TypeArgument,
            unknown => {
                return Err(ClassFileError::UnknownTypePathKind {
                    kind: unknown,
                    offset: kind.offset,
                })
            }
        };

        Ok(TypePathEntry {
            type_path_kind: Scalar::new(type_path_kind, kind.offset),
            type_argument_index: self.cursor.read_u1()?,
        })
    }
}
