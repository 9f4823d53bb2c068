mod annotations;
mod attributes;
mod bytecode;
mod constant_pool;
mod stack_map;

use log::debug;

use crate::{
    access_flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags},
    class_file::{FieldInfo, MethodInfo, MAGIC},
    constant_pool::ConstantTag,
    cursor::{ByteCursor, Scalar, U2, U4},
    ClassFile, ClassFileError, ConstantPool, Result,
};

/// How deep element values and nested attribute tables may recurse.
pub const MAX_NESTING_DEPTH: u16 = 64;

/// Decodes one class file from a borrowed buffer in a single forward pass.
pub struct Parser<'a> {
    cursor: ByteCursor<'a>,
    depth: u16,
}

impl<'a> Parser<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            cursor: ByteCursor::new(bytes),
            depth: 0,
        }
    }

    /// A parser over a slice that starts at `base` in the class file.
    fn with_base(bytes: &'a [u8], base: usize) -> Self {
        Self {
            cursor: ByteCursor::with_base(bytes, base),
            depth: 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.cursor.offset()
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        let magic = self.parse_magic_identifier()?;
        let minor_version = self.cursor.read_u2()?;
        let major_version = self.cursor.read_u2()?;

        let constant_pool_count = self.cursor.read_u2()?;
        let constant_pool = self.parse_constant_pool(constant_pool_count)?;
        debug!(
            "Decoded {} constant pool entries, class body starts at offset {}",
            constant_pool.iter().count(),
            self.offset()
        );

        let access_flags = self.read_flags(ClassAccessFlags::from_bits_truncate)?;
        let this_class = self.parse_this_class(&constant_pool)?;
        let super_class = self.cursor.read_u2()?;
        if super_class.value != 0 {
            constant_pool.get_of(super_class.value, &[ConstantTag::Class])?;
        }

        let interfaces_count = self.cursor.read_u2()?;
        let interfaces = (0..interfaces_count.value)
            .map(|_| -> Result<U2> {
                let interface = self.cursor.read_u2()?;
                constant_pool.get_of(interface.value, &[ConstantTag::Class])?;
                Ok(interface)
            })
            .collect::<Result<Vec<_>>>()?;

        let fields_count = self.cursor.read_u2()?;
        let fields = (0..fields_count.value)
            .map(|_| self.parse_field_info(&constant_pool))
            .collect::<Result<Vec<_>>>()?;

        let methods_count = self.cursor.read_u2()?;
        let methods = (0..methods_count.value)
            .map(|_| self.parse_method_info(&constant_pool))
            .collect::<Result<Vec<_>>>()?;

        let attributes = self.parse_attributes(&constant_pool)?;

        if !self.cursor.is_empty() {
            return Err(ClassFileError::TrailingBytes {
                offset: self.offset(),
                remaining: self.cursor.remaining(),
            });
        }

        debug!(
            "Decoded class file version {}.{}: {} fields, {} methods, {} attributes",
            major_version.value,
            minor_version.value,
            fields.len(),
            methods.len(),
            attributes.len()
        );

        Ok(ClassFile {
            magic,
            minor_version,
            major_version,
            constant_pool_count,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces_count,
            interfaces,
            fields_count,
            fields,
            methods_count,
            methods,
            attributes,
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<U4> {
        let magic = self.cursor.read_u4()?;
        match magic.value {
            MAGIC => Ok(magic),
            magic_identifier => Err(ClassFileError::MagicMismatch(magic_identifier)),
        }
    }

    /// `this_class` must never be 0. An empty pool leaves it unresolved, any
    /// other pool must hold a Class entry there.
    fn parse_this_class(&mut self, pool: &ConstantPool) -> Result<U2> {
        let this_class = self.cursor.read_u2()?;
        if this_class.value == 0 || pool.count() > 1 {
            pool.get_of(this_class.value, &[ConstantTag::Class])?;
        }
        Ok(this_class)
    }

    /// Reads a member's name and descriptor indices, both of which must be Utf8.
    fn parse_member_names(&mut self, pool: &ConstantPool) -> Result<(U2, U2)> {
        let name_index = self.cursor.read_u2()?;
        let descriptor_index = self.cursor.read_u2()?;
        pool.get_of(name_index.value, &[ConstantTag::Utf8])?;
        pool.get_of(descriptor_index.value, &[ConstantTag::Utf8])?;
        Ok((name_index, descriptor_index))
    }

    fn parse_field_info(&mut self, pool: &ConstantPool) -> Result<FieldInfo> {
        let access_flags = self.read_flags(FieldAccessFlags::from_bits_truncate)?;
        let (name_index, descriptor_index) = self.parse_member_names(pool)?;
        let attributes = self.parse_attributes(pool)?;

        Ok(FieldInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_method_info(&mut self, pool: &ConstantPool) -> Result<MethodInfo> {
        let access_flags = self.read_flags(MethodAccessFlags::from_bits_truncate)?;
        let (name_index, descriptor_index) = self.parse_member_names(pool)?;
        let attributes = self.parse_attributes(pool)?;

        Ok(MethodInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    /// Reads a u2 flag word. Bits without a meaning in the flag set are dropped.
    fn read_flags<F>(&mut self, from_bits: fn(u16) -> F) -> Result<Scalar<F>> {
        let U2 { value, offset } = self.cursor.read_u2()?;
        Ok(Scalar::new(from_bits(value), offset))
    }

    /// Runs `decode` one level deeper, failing instead once the nesting limit is reached.
    fn nested<T>(&mut self, decode: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ClassFileError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                offset: self.offset(),
            });
        }

        self.depth += 1;
        let result = decode(self);
        self.depth -= 1;
        result
    }

    /// Reads a u2 count followed by that many items.
    fn parse_table<T>(&mut self, mut item: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let count = self.cursor.read_u2()?;
        (0..count.value).map(|_| item(self)).collect()
    }
}
