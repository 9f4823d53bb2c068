// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html

pub mod access_flags;
pub mod attributes;
mod class_file;
pub mod constant_pool;
pub mod cursor;
mod error;
pub mod instruction;
mod parser;
pub mod stack_map;

pub use self::class_file::{ClassFile, ClassVersion, FieldInfo, MethodInfo, MAGIC};
pub use attributes::{Attribute, AttributeInfo, Attributes, Code};
pub use constant_pool::{ConstantPool, ConstantTag, CpEntry, CpInfo};
pub use cursor::{ByteCursor, Scalar, U1, U2, U4};
pub use error::ClassFileError;
pub use instruction::Instruction;
pub use parser::{Parser, MAX_NESTING_DEPTH};
pub use stack_map::{StackMapFrame, VerificationTypeInfo};

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;
