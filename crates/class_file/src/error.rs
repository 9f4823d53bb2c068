use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Invalid magic identifier: 0x{0:X}")]
    MagicMismatch(u32),
    #[error("Invalid cp info tag {tag} for pool index {index} at offset {offset}")]
    UnknownConstantTag { tag: u8, index: u16, offset: usize },
    #[error("Invalid type annotation target type 0x{target_type:02X} at offset {offset}")]
    UnknownAttributeTargetType { target_type: u8, offset: usize },
    #[error("Invalid opcode 0x{opcode:02X} at pc {pc} (offset {offset})")]
    UnknownOpcode { opcode: u8, pc: u32, offset: usize },
    #[error("Invalid stack map frame type {frame_type} at offset {offset}")]
    UnknownFrameTag { frame_type: u8, offset: usize },
    #[error("Invalid verification type tag {tag} at offset {offset}")]
    UnknownVerificationTypeTag { tag: u8, offset: usize },
    #[error("Invalid element value tag {tag:?} at offset {offset}")]
    UnknownElementValueTag { tag: char, offset: usize },
    #[error("Invalid method handle reference kind {kind} at pool index {index}")]
    UnknownReferenceKind { kind: u8, index: u16 },
    #[error("Invalid type path kind {kind} at offset {offset}")]
    UnknownTypePathKind { kind: u8, offset: usize },
    #[error("Pool index {index}: expected {expected}, found {found}")]
    StructuralReferenceMismatch {
        index: u16,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Pool index {index} is out of range (constant_pool_count is {count})")]
    IndexOutOfRange { index: u16, count: u16 },
    #[error("Pool index {0} is the unusable upper half of a Long or Double")]
    PlaceholderIndex(u16),
    #[error("Instruction stream consumed {consumed} bytes, but code_length is {declared}")]
    MalformedCodeLength { declared: u32, consumed: u32 },
    #[error("Malformed switch at pc {pc}: {reason}")]
    MalformedSwitch { pc: u32, reason: String },
    #[error("Attribute {name} declared {declared} bytes, but {consumed} were decoded")]
    AttributeLengthMismatch {
        name: String,
        declared: u32,
        consumed: usize,
    },
    #[error("Pool index {index} is not valid modified UTF-8")]
    MalformedUtf8 { index: u16 },
    #[error("Structures nest deeper than {limit} levels at offset {offset}")]
    NestingTooDeep { limit: u16, offset: usize },
    #[error("{remaining} unexpected bytes after the class file at offset {offset}")]
    TrailingBytes { offset: usize, remaining: usize },
}
