// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.7

use std::{collections::HashMap, sync::OnceLock};

use log::trace;

use crate::{
    access_flags::{
        ExportsFlags, InnerClassAccessFlags, ModuleFlags, ParameterAccessFlags, RequiresFlags,
    },
    attributes::{
        Attribute, AttributeInfo, Attributes, BootstrapMethod, Code, ExceptionTableEntry,
        InnerClass, LineNumber, LocalVariable, MethodParameter, Module, PackageDirective,
        Provides, RecordComponent, Requires,
    },
    constant_pool::ConstantTag,
    cursor::U2,
    ClassFileError, ConstantPool, Result,
};

use super::Parser;

/// Decodes the payload of one attribute. The `u32` is the declared attribute length.
type AttributeDecoder = fn(&mut Parser<'_>, &ConstantPool, u32) -> Result<AttributeInfo>;

fn decoders() -> &'static HashMap<&'static str, AttributeDecoder> {
    static DECODERS: OnceLock<HashMap<&'static str, AttributeDecoder>> = OnceLock::new();

    DECODERS.get_or_init(|| {
        let mut table: HashMap<&'static str, AttributeDecoder> = HashMap::new();
        table.insert("ConstantValue", constant_value);
        table.insert("Code", code);
        table.insert("StackMapTable", stack_map_table);
        table.insert("Exceptions", exceptions);
        table.insert("InnerClasses", inner_classes);
        table.insert("EnclosingMethod", enclosing_method);
        table.insert("Synthetic", |_, _, _| Ok(AttributeInfo::Synthetic));
        table.insert("Signature", signature);
        table.insert("SourceFile", source_file);
        table.insert("SourceDebugExtension", source_debug_extension);
        table.insert("LineNumberTable", line_number_table);
        table.insert("LocalVariableTable", |p, pool, _| {
            local_variables(p, pool).map(AttributeInfo::LocalVariableTable)
        });
        table.insert("LocalVariableTypeTable", |p, pool, _| {
            local_variables(p, pool).map(AttributeInfo::LocalVariableTypeTable)
        });
        table.insert("Deprecated", |_, _, _| Ok(AttributeInfo::Deprecated));
        table.insert("RuntimeVisibleAnnotations", |p, pool, _| {
            p.parse_annotations(pool)
                .map(AttributeInfo::RuntimeVisibleAnnotations)
        });
        table.insert("RuntimeInvisibleAnnotations", |p, pool, _| {
            p.parse_annotations(pool)
                .map(AttributeInfo::RuntimeInvisibleAnnotations)
        });
        table.insert("RuntimeVisibleParameterAnnotations", |p, pool, _| {
            p.parse_parameter_annotations(pool)
                .map(AttributeInfo::RuntimeVisibleParameterAnnotations)
        });
        table.insert("RuntimeInvisibleParameterAnnotations", |p, pool, _| {
            p.parse_parameter_annotations(pool)
                .map(AttributeInfo::RuntimeInvisibleParameterAnnotations)
        });
        table.insert("RuntimeVisibleTypeAnnotations", |p, pool, _| {
            p.parse_type_annotations(pool)
                .map(AttributeInfo::RuntimeVisibleTypeAnnotations)
        });
        table.insert("RuntimeInvisibleTypeAnnotations", |p, pool, _| {
            p.parse_type_annotations(pool)
                .map(AttributeInfo::RuntimeInvisibleTypeAnnotations)
        });
        table.insert("AnnotationDefault", |p, pool, _| {
            p.parse_element_value(pool)
                .map(AttributeInfo::AnnotationDefault)
        });
        table.insert("BootstrapMethods", bootstrap_methods);
        table.insert("MethodParameters", method_parameters);
        table.insert("Module", module);
        table.insert("ModulePackages", |p, pool, _| {
            Ok(AttributeInfo::ModulePackages {
                package_index: index_table(p, pool, ConstantTag::Package)?,
            })
        });
        table.insert("ModuleMainClass", |p, pool, _| {
            Ok(AttributeInfo::ModuleMainClass {
                main_class_index: checked_index(p, pool, ConstantTag::Class)?,
            })
        });
        table.insert("NestHost", |p, pool, _| {
            Ok(AttributeInfo::NestHost {
                host_class_index: checked_index(p, pool, ConstantTag::Class)?,
            })
        });
        table.insert("NestMembers", |p, pool, _| {
            Ok(AttributeInfo::NestMembers {
                classes: index_table(p, pool, ConstantTag::Class)?,
            })
        });
        table.insert("Record", record);
        table.insert("PermittedSubclasses", |p, pool, _| {
            Ok(AttributeInfo::PermittedSubclasses {
                classes: index_table(p, pool, ConstantTag::Class)?,
            })
        });
        table
    })
}

impl<'a> Parser<'a> {
    /// Reads a u2 attribute count followed by that many attributes.
    pub(super) fn parse_attributes(&mut self, pool: &ConstantPool) -> Result<Attributes> {
        let count = self.cursor.read_u2()?;
        let mut attributes = Attributes::new(count);
        for _ in 0..count.value {
            attributes.insert(self.parse_attribute(pool)?);
        }
        Ok(attributes)
    }

    fn parse_attribute(&mut self, pool: &ConstantPool) -> Result<Attribute> {
        let name_index = self.cursor.read_u2()?;
        let name = pool.get_utf8(name_index.value)?.to_owned();
        let length = self.cursor.read_u4()?;

        let info = match decoders().get(name.as_str()) {
            Some(decode) => {
                trace!(
                    "Decoding {name} attribute of {} bytes at offset {}",
                    length.value,
                    name_index.offset
                );
                let start = self.cursor.position();
                let info = decode(self, pool, length.value)?;

                let consumed = self.cursor.position() - start;
                if consumed != length.value as usize {
                    return Err(ClassFileError::AttributeLengthMismatch {
                        name,
                        declared: length.value,
                        consumed,
                    });
                }
                info
            }
            None => {
                trace!(
                    "Skipping unknown {name} attribute of {} bytes at offset {}",
                    length.value,
                    name_index.offset
                );
                self.cursor.skip(length.value as usize)?;
                AttributeInfo::Unknown
            }
        };

        Ok(Attribute {
            name_index,
            name,
            length,
            info,
        })
    }
}

/// Reads a u2 pool index that must point at an entry of kind `tag`.
fn checked_index(p: &mut Parser<'_>, pool: &ConstantPool, tag: ConstantTag) -> Result<U2> {
    let index = p.cursor.read_u2()?;
    pool.get_of(index.value, &[tag])?;
    Ok(index)
}

/// Like `checked_index`, but 0 stands for "none".
fn optional_index(p: &mut Parser<'_>, pool: &ConstantPool, tag: ConstantTag) -> Result<U2> {
    let index = p.cursor.read_u2()?;
    if index.value != 0 {
        pool.get_of(index.value, &[tag])?;
    }
    Ok(index)
}

fn index_table(p: &mut Parser<'_>, pool: &ConstantPool, tag: ConstantTag) -> Result<Vec<U2>> {
    p.parse_table(|p| checked_index(p, pool, tag))
}

fn constant_value(p: &mut Parser<'_>, pool: &ConstantPool, _: u32) -> Result<AttributeInfo> {
    let constantvalue_index = p.cursor.read_u2()?;
    pool.get_of(
        constantvalue_index.value,
        &[
            ConstantTag::Integer,
            ConstantTag::Float,
            ConstantTag::Long,
            ConstantTag::Double,
            ConstantTag::String,
        ],
    )?;

    Ok(AttributeInfo::ConstantValue {
        constantvalue_index,
    })
}

fn code(p: &mut Parser<'_>, pool: &ConstantPool, _: u32) -> Result<AttributeInfo> {
    let max_stack = p.cursor.read_u2()?;
    let max_locals = p.cursor.read_u2()?;
    let code_length = p.cursor.read_u4()?;

    let base = p.cursor.offset();
    let bytes = p.cursor.read_bytes(code_length.value as usize)?;
    let instructions = Parser::with_base(bytes, base).parse_instructions(code_length.value)?;
    trace!(
        "Decoded {} instructions from {} bytes of code at offset {base}",
        instructions.len(),
        code_length.value
    );

    let exception_table = p.parse_table(|p| {
        Ok(ExceptionTableEntry {
            start_pc: p.cursor.read_u2()?,
            end_pc: p.cursor.read_u2()?,
            handler_pc: p.cursor.read_u2()?,
            catch_type: optional_index(p, pool, ConstantTag::Class)?,
        })
    })?;
    let attributes = p.nested(|p| p.parse_attributes(pool))?;

    Ok(AttributeInfo::Code(Code {
        max_stack,
        max_locals,
        code_length,
        instructions,
        exception_table,
        attributes,
    }))
}

fn stack_map_table(p: &mut Parser<'_>, pool: &ConstantPool, _: u32) -> Result<AttributeInfo> {
    let number_of_entries = p.cursor.read_u2()?;
    let entries = (0..number_of_entries.value)
        .map(|_| p.parse_stack_map_frame(pool))
        .collect::<Result<Vec<_>>>()?;

    Ok(AttributeInfo::StackMapTable {
        number_of_entries,
        entries,
    })
}

fn exceptions(p: &mut Parser<'_>, pool: &ConstantPool, _: u32) -> Result<AttributeInfo> {
    Ok(AttributeInfo::Exceptions {
        exception_index_table: index_table(p, pool, ConstantTag::Class)?,
    })
}

fn inner_classes(p: &mut Parser<'_>, pool: &ConstantPool, _: u32) -> Result<AttributeInfo> {
    let classes = p.parse_table(|p| {
        Ok(InnerClass {
            inner_class_info_index: checked_index(p, pool, ConstantTag::Class)?,
            outer_class_info_index: optional_index(p, pool, ConstantTag::Class)?,
            inner_name_index: optional_index(p, pool, ConstantTag::Utf8)?,
            inner_class_access_flags: p.read_flags(InnerClassAccessFlags::from_bits_truncate)?,
        })
    })?;

    Ok(AttributeInfo::InnerClasses(classes))
}

fn enclosing_method(p: &mut Parser<'_>, pool: &ConstantPool, _: u32) -> Result<AttributeInfo> {
    Ok(AttributeInfo::EnclosingMethod {
        class_index: checked_index(p, pool, ConstantTag::Class)?,
        method_index: optional_index(p, pool, ConstantTag::NameAndType)?,
    })
}

fn signature(p: &mut Parser<'_>, pool: &ConstantPool, _: u32) -> Result<AttributeInfo> {
    Ok(AttributeInfo::Signature {
        signature_index: checked_index(p, pool, ConstantTag::Utf8)?,
    })
}

fn source_file(p: &mut Parser<'_>, pool: &ConstantPool, _: u32) -> Result<AttributeInfo> {
    Ok(AttributeInfo::SourceFile {
        sourcefile_index: checked_index(p, pool, ConstantTag::Utf8)?,
    })
}

/// The payload has no structure of its own, so bytes that are not modified UTF-8 are kept lossily.
fn source_debug_extension(p: &mut Parser<'_>, _: &ConstantPool, length: u32) -> Result<AttributeInfo> {
    let bytes = p.cursor.read_bytes(length as usize)?;
    let debug_extension = match cesu8::from_java_cesu8(bytes) {
        Ok(text) => text.into_owned(),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    };

    Ok(AttributeInfo::SourceDebugExtension(debug_extension))
}

fn line_number_table(p: &mut Parser<'_>, _: &ConstantPool, _: u32) -> Result<AttributeInfo> {
    let line_numbers = p.parse_table(|p| {
        Ok(LineNumber {
            start_pc: p.cursor.read_u2()?,
            line_number: p.cursor.read_u2()?,
        })
    })?;

    Ok(AttributeInfo::LineNumberTable(line_numbers))
}

fn local_variables(p: &mut Parser<'_>, pool: &ConstantPool) -> Result<Vec<LocalVariable>> {
    p.parse_table(|p| {
        Ok(LocalVariable {
            start_pc: p.cursor.read_u2()?,
            length: p.cursor.read_u2()?,
            name_index: checked_index(p, pool, ConstantTag::Utf8)?,
            descriptor_index: checked_index(p, pool, ConstantTag::Utf8)?,
            index: p.cursor.read_u2()?,
        })
    })
}

fn bootstrap_methods(p: &mut Parser<'_>, pool: &ConstantPool, _: u32) -> Result<AttributeInfo> {
    let methods = p.parse_table(|p| {
        let bootstrap_method_ref = checked_index(p, pool, ConstantTag::MethodHandle)?;
        let bootstrap_arguments = p.parse_table(|p| {
            let argument = p.cursor.read_u2()?;
            pool.get(argument.value)?;
            Ok(argument)
        })?;

        Ok(BootstrapMethod {
            bootstrap_method_ref,
            bootstrap_arguments,
        })
    })?;

    Ok(AttributeInfo::BootstrapMethods(methods))
}

fn method_parameters(p: &mut Parser<'_>, pool: &ConstantPool, _: u32) -> Result<AttributeInfo> {
    // The only attribute table counted with a single byte.
    let parameters_count = p.cursor.read_u1()?;
    let parameters = (0..parameters_count.value)
        .map(|_| {
            Ok(MethodParameter {
                name_index: optional_index(p, pool, ConstantTag::Utf8)?,
                access_flags: p.read_flags(ParameterAccessFlags::from_bits_truncate)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(AttributeInfo::MethodParameters(parameters))
}

fn module(p: &mut Parser<'_>, pool: &ConstantPool, _: u32) -> Result<AttributeInfo> {
    let module_name_index = checked_index(p, pool, ConstantTag::Module)?;
    let module_flags = p.read_flags(ModuleFlags::from_bits_truncate)?;
    let module_version_index = optional_index(p, pool, ConstantTag::Utf8)?;

    let requires = p.parse_table(|p| {
        Ok(Requires {
            requires_index: checked_index(p, pool, ConstantTag::Module)?,
            requires_flags: p.read_flags(RequiresFlags::from_bits_truncate)?,
            requires_version_index: optional_index(p, pool, ConstantTag::Utf8)?,
        })
    })?;
    let exports = p.parse_table(|p| package_directive(p, pool))?;
    let opens = p.parse_table(|p| package_directive(p, pool))?;
    let uses_index = index_table(p, pool, ConstantTag::Class)?;
    let provides = p.parse_table(|p| {
        Ok(Provides {
            provides_index: checked_index(p, pool, ConstantTag::Class)?,
            provides_with_index: index_table(p, pool, ConstantTag::Class)?,
        })
    })?;

    Ok(AttributeInfo::Module(Module {
        module_name_index,
        module_flags,
        module_version_index,
        requires,
        exports,
        opens,
        uses_index,
        provides,
    }))
}

fn package_directive(p: &mut Parser<'_>, pool: &ConstantPool) -> Result<PackageDirective> {
    Ok(PackageDirective {
        package_index: checked_index(p, pool, ConstantTag::Package)?,
        flags: p.read_flags(ExportsFlags::from_bits_truncate)?,
        to_index: index_table(p, pool, ConstantTag::Module)?,
    })
}

fn record(p: &mut Parser<'_>, pool: &ConstantPool, _: u32) -> Result<AttributeInfo> {
    let components = p.parse_table(|p| {
        Ok(RecordComponent {
            name_index: checked_index(p, pool, ConstantTag::Utf8)?,
            descriptor_index: checked_index(p, pool, ConstantTag::Utf8)?,
            attributes: p.nested(|p| p.parse_attributes(pool))?,
        })
    })?;

    Ok(AttributeInfo::Record(components))
}

#[cfg(test)]
mod parse_attributes_tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        constant_pool::{CpEntry, CpInfo},
        cursor::Scalar,
        instruction::opcode,
        parser::MAX_NESTING_DEPTH,
    };

    fn utf8(value: &str) -> CpInfo {
        CpInfo::Utf8 {
            length: Scalar::new(value.len() as u16, 0),
            value: value.to_owned(),
        }
    }

    /// A pool of single-width entries numbered from 1.
    fn pool(infos: Vec<CpInfo>) -> ConstantPool {
        let mut entries = vec![None];
        for (i, info) in infos.into_iter().enumerate() {
            entries.push(Some(CpEntry {
                index: i as u16 + 1,
                tag: Scalar::new(info.tag() as u8, 0),
                info,
            }));
        }
        ConstantPool::new(entries)
    }

    fn attribute(name_index: u16, body: &[u8]) -> Vec<u8> {
        let mut bytes = name_index.to_be_bytes().to_vec();
        bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
        bytes.extend_from_slice(body);
        bytes
    }

    fn table(attributes: &[Vec<u8>]) -> Vec<u8> {
        let mut bytes = (attributes.len() as u16).to_be_bytes().to_vec();
        attributes.iter().for_each(|a| bytes.extend_from_slice(a));
        bytes
    }

    #[test]
    fn it_should_skip_unknown_attributes() {
        let pool = pool(vec![utf8("Custom"), utf8("Synthetic")]);
        let bytes = table(&[attribute(1, &[1, 2, 3, 4, 5]), attribute(2, &[])]);

        let mut parser = Parser::new(&bytes);
        let attributes = parser.parse_attributes(&pool).unwrap();

        let custom = attributes.get("Custom").unwrap();
        assert_eq!(custom.info, AttributeInfo::Unknown);
        assert_eq!(custom.length.value, 5);
        assert_eq!(custom.end(), 13);

        let synthetic = attributes.get("Synthetic").unwrap();
        assert_eq!(synthetic.name_index.offset, 13);
        assert_eq!(synthetic.info, AttributeInfo::Synthetic);
        assert!(parser.cursor.is_empty());
    }

    #[test]
    fn it_should_decode_a_code_attribute() {
        let pool = pool(vec![utf8("Code")]);
        #[rustfmt::skip]
        let body = [
            0x00, 0x01,                         // max_stack
            0x00, 0x01,                         // max_locals
            0x00, 0x00, 0x00, 0x02,             // code_length
            opcode::ALOAD_0, opcode::ARETURN,
            0x00, 0x00,                         // exception_table_length
            0x00, 0x00,                         // attributes_count
        ];
        let bytes = table(&[attribute(1, &body)]);

        let attributes = Parser::new(&bytes).parse_attributes(&pool).unwrap();
        let code = attributes.code().unwrap();

        assert_eq!(code.code_length.value, 2);
        assert_eq!(code.instructions.len(), 2);
        assert_eq!(code.instructions[0].offset, 16);
        assert_eq!(code.instructions[1].offset, 17);
        assert_eq!(code.instruction_at(1).unwrap().mnemonic(), "areturn");
    }

    #[test]
    fn it_should_reject_a_constant_value_of_the_wrong_kind() {
        let pool = pool(vec![utf8("ConstantValue"), CpInfo::Class { name_index: Scalar::new(1, 0) }]);
        let bytes = table(&[attribute(1, &[0x00, 0x02])]);

        assert!(matches!(
            Parser::new(&bytes).parse_attributes(&pool),
            Err(ClassFileError::StructuralReferenceMismatch {
                index: 2,
                found: "Class",
                ..
            })
        ));
    }

    #[test]
    fn it_should_reject_exceptions_that_are_not_classes() {
        let pool = pool(vec![utf8("Exceptions")]);
        let bytes = table(&[attribute(1, &[0x00, 0x01, 0x00, 0x01])]);

        assert!(matches!(
            Parser::new(&bytes).parse_attributes(&pool),
            Err(ClassFileError::StructuralReferenceMismatch {
                index: 1,
                expected: "Class",
                found: "Utf8"
            })
        ));
    }

    #[test]
    fn it_should_reject_a_payload_shorter_than_declared() {
        let pool = pool(vec![utf8("SourceFile"), utf8("Foo.java")]);
        let bytes = table(&[attribute(1, &[0x00, 0x02, 0xFF])]);

        assert!(matches!(
            Parser::new(&bytes).parse_attributes(&pool),
            Err(ClassFileError::AttributeLengthMismatch {
                declared: 3,
                consumed: 2,
                ..
            })
        ));
    }

    #[test]
    fn it_should_overwrite_duplicate_attributes_in_place() {
        let pool = pool(vec![
            utf8("SourceFile"),
            utf8("A.java"),
            utf8("B.java"),
            utf8("Deprecated"),
        ]);
        let bytes = table(&[
            attribute(1, &[0x00, 0x02]),
            attribute(4, &[]),
            attribute(1, &[0x00, 0x03]),
        ]);

        let attributes = Parser::new(&bytes).parse_attributes(&pool).unwrap();

        assert_eq!(attributes.count.value, 3);
        assert_eq!(attributes.len(), 2);
        assert_eq!(
            attributes.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
            vec!["SourceFile", "Deprecated"]
        );
        assert_eq!(attributes.source_file_index(), Some(3));
    }

    #[test]
    fn it_should_decode_method_parameters_with_a_byte_count() {
        let pool = pool(vec![utf8("MethodParameters"), utf8("arg")]);
        let bytes = table(&[attribute(1, &[0x02, 0x00, 0x01, 0x00, 0x10, 0x00, 0x00, 0x80, 0x00])]);

        let attributes = Parser::new(&bytes).parse_attributes(&pool).unwrap();
        let AttributeInfo::MethodParameters(parameters) = &attributes.get("MethodParameters").unwrap().info
        else {
            panic!("expected method parameters");
        };

        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0].access_flags.value.to_string(), "final");
        assert_eq!(parameters[1].name_index.value, 0);
        assert_eq!(parameters[1].access_flags.value.to_string(), "mandated");
    }

    #[test]
    fn it_should_decode_a_module() {
        let pool = pool(vec![
            utf8("Module"),
            utf8("com.example"),
            CpInfo::Module { name_index: Scalar::new(2, 0) },
            utf8("java.base"),
            CpInfo::Module { name_index: Scalar::new(4, 0) },
            utf8("com/example/api"),
            CpInfo::Package { name_index: Scalar::new(6, 0) },
        ]);
        #[rustfmt::skip]
        let body = [
            0x00, 0x03, 0x00, 0x20, 0x00, 0x00, // open module com.example
            0x00, 0x01,                         // requires java.base mandated
            0x00, 0x05, 0x80, 0x00, 0x00, 0x00,
            0x00, 0x01,                         // exports com/example/api
            0x00, 0x07, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,                         // opens
            0x00, 0x00,                         // uses
            0x00, 0x00,                         // provides
        ];
        let bytes = table(&[attribute(1, &body)]);

        let attributes = Parser::new(&bytes).parse_attributes(&pool).unwrap();
        let AttributeInfo::Module(module) = &attributes.get("Module").unwrap().info else {
            panic!("expected a module");
        };

        assert_eq!(module.module_flags.value.to_string(), "open");
        assert_eq!(module.requires[0].requires_index.value, 5);
        assert_eq!(module.exports[0].package_index.value, 7);
        assert!(module.exports[0].to_index.is_empty());
    }

    /// `levels` attributes, each holding the next one in its own attribute table.
    fn nest(levels: usize, wrap: impl Fn(&[Vec<u8>]) -> Vec<u8>) -> Vec<u8> {
        let innermost: Vec<Vec<u8>> = vec![];
        let outermost = (0..levels).fold(innermost, |inner, _| vec![attribute(1, &wrap(&inner))]);
        table(&outermost)
    }

    fn code_body(attributes: &[Vec<u8>]) -> Vec<u8> {
        let mut body = vec![0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, opcode::RETURN, 0x00, 0x00];
        body.extend(table(attributes));
        body
    }

    #[test]
    fn it_should_decode_code_nested_up_to_the_limit() {
        let pool = pool(vec![utf8("Code")]);
        let bytes = nest(MAX_NESTING_DEPTH as usize, code_body);

        let mut parser = Parser::new(&bytes);
        let attributes = parser.parse_attributes(&pool).unwrap();
        let mut code = attributes.code();
        let mut levels = 0;
        while let Some(inner) = code {
            code = inner.attributes.code();
            levels += 1;
        }

        assert_eq!(levels, MAX_NESTING_DEPTH);
        assert!(parser.cursor.is_empty());
    }

    #[test]
    fn it_should_stop_at_code_nested_too_deep() {
        let pool = pool(vec![utf8("Code")]);
        let bytes = nest(200, code_body);

        assert!(matches!(
            Parser::new(&bytes).parse_attributes(&pool),
            Err(ClassFileError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                ..
            })
        ));
    }

    #[test]
    fn it_should_stop_at_records_nested_too_deep() {
        let pool = pool(vec![utf8("Record"), utf8("value"), utf8("I")]);
        let bytes = nest(200, |attributes| {
            let mut body = vec![0x00, 0x01, 0x00, 0x02, 0x00, 0x03];
            body.extend(table(attributes));
            body
        });

        assert!(matches!(
            Parser::new(&bytes).parse_attributes(&pool),
            Err(ClassFileError::NestingTooDeep { .. })
        ));
    }
}
