// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-6.html#jvms-6.5

use byteorder::{BigEndian, ByteOrder};

/// How the operand bytes following an opcode are sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
    Fixed(u8),
    /// One opcode byte, then 2 operand bytes (4 for `iinc`).
    Wide,
    /// Padding, default, low, high, then `high - low + 1` jump offsets.
    TableSwitch,
    /// Padding, default, npairs, then `npairs` match/offset pairs.
    LookupSwitch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub mnemonic: &'static str,
    pub operands: Operands,
}

macro_rules! opcodes {
    ($($name:ident = $value:literal, $mnemonic:literal, $operands:expr;)*) => {
        pub mod opcode {
            $( pub const $name: u8 = $value; )*
        }

        static OPCODE_TABLE: [Option<OpcodeInfo>; 256] = {
            let mut table = [None; 256];
            $( table[$value as usize] = Some(OpcodeInfo { mnemonic: $mnemonic, operands: $operands }); )*
            table
        };
    };
}

use Operands::*;

opcodes! {
    NOP = 0x00, "nop", Fixed(0);
    ACONST_NULL = 0x01, "aconst_null", Fixed(0);
    ICONST_M1 = 0x02, "iconst_m1", Fixed(0);
    ICONST_0 = 0x03, "iconst_0", Fixed(0);
    ICONST_1 = 0x04, "iconst_1", Fixed(0);
    ICONST_2 = 0x05, "iconst_2", Fixed(0);
    ICONST_3 = 0x06, "iconst_3", Fixed(0);
    ICONST_4 = 0x07, "iconst_4", Fixed(0);
    ICONST_5 = 0x08, "iconst_5", Fixed(0);
    LCONST_0 = 0x09, "lconst_0", Fixed(0);
    LCONST_1 = 0x0a, "lconst_1", Fixed(0);
    FCONST_0 = 0x0b, "fconst_0", Fixed(0);
    FCONST_1 = 0x0c, "fconst_1", Fixed(0);
    FCONST_2 = 0x0d, "fconst_2", Fixed(0);
    DCONST_0 = 0x0e, "dconst_0", Fixed(0);
    DCONST_1 = 0x0f, "dconst_1", Fixed(0);
    BIPUSH = 0x10, "bipush", Fixed(1);
    SIPUSH = 0x11, "sipush", Fixed(2);
    LDC = 0x12, "ldc", Fixed(1);
    LDC_W = 0x13, "ldc_w", Fixed(2);
    LDC2_W = 0x14, "ldc2_w", Fixed(2);
    ILOAD = 0x15, "iload", Fixed(1);
    LLOAD = 0x16, "lload", Fixed(1);
    FLOAD = 0x17, "fload", Fixed(1);
    DLOAD = 0x18, "dload", Fixed(1);
    ALOAD = 0x19, "aload", Fixed(1);
    ILOAD_0 = 0x1a, "iload_0", Fixed(0);
    ILOAD_1 = 0x1b, "iload_1", Fixed(0);
    ILOAD_2 = 0x1c, "iload_2", Fixed(0);
    ILOAD_3 = 0x1d, "iload_3", Fixed(0);
    LLOAD_0 = 0x1e, "lload_0", Fixed(0);
    LLOAD_1 = 0x1f, "lload_1", Fixed(0);
    LLOAD_2 = 0x20, "lload_2", Fixed(0);
    LLOAD_3 = 0x21, "lload_3", Fixed(0);
    FLOAD_0 = 0x22, "fload_0", Fixed(0);
    FLOAD_1 = 0x23, "fload_1", Fixed(0);
    FLOAD_2 = 0x24, "fload_2", Fixed(0);
    FLOAD_3 = 0x25, "fload_3", Fixed(0);
    DLOAD_0 = 0x26, "dload_0", Fixed(0);
    DLOAD_1 = 0x27, "dload_1", Fixed(0);
    DLOAD_2 = 0x28, "dload_2", Fixed(0);
    DLOAD_3 = 0x29, "dload_3", Fixed(0);
    ALOAD_0 = 0x2a, "aload_0", Fixed(0);
    ALOAD_1 = 0x2b, "aload_1", Fixed(0);
    ALOAD_2 = 0x2c, "aload_2", Fixed(0);
    ALOAD_3 = 0x2d, "aload_3", Fixed(0);
    IALOAD = 0x2e, "iaload", Fixed(0);
    LALOAD = 0x2f, "laload", Fixed(0);
    FALOAD = 0x30, "faload", Fixed(0);
    DALOAD = 0x31, "daload", Fixed(0);
    AALOAD = 0x32, "aaload", Fixed(0);
    BALOAD = 0x33, "baload", Fixed(0);
    CALOAD = 0x34, "caload", Fixed(0);
    SALOAD = 0x35, "saload", Fixed(0);
    ISTORE = 0x36, "istore", Fixed(1);
    LSTORE = 0x37, "lstore", Fixed(1);
    FSTORE = 0x38, "fstore", Fixed(1);
    DSTORE = 0x39, "dstore", Fixed(1);
    ASTORE = 0x3a, "astore", Fixed(1);
    ISTORE_0 = 0x3b, "istore_0", Fixed(0);
    ISTORE_1 = 0x3c, "istore_1", Fixed(0);
    ISTORE_2 = 0x3d, "istore_2", Fixed(0);
    ISTORE_3 = 0x3e, "istore_3", Fixed(0);
    LSTORE_0 = 0x3f, "lstore_0", Fixed(0);
    LSTORE_1 = 0x40, "lstore_1", Fixed(0);
    LSTORE_2 = 0x41, "lstore_2", Fixed(0);
    LSTORE_3 = 0x42, "lstore_3", Fixed(0);
    FSTORE_0 = 0x43, "fstore_0", Fixed(0);
    FSTORE_1 = 0x44, "fstore_1", Fixed(0);
    FSTORE_2 = 0x45, "fstore_2", Fixed(0);
    FSTORE_3 = 0x46, "fstore_3", Fixed(0);
    DSTORE_0 = 0x47, "dstore_0", Fixed(0);
    DSTORE_1 = 0x48, "dstore_1", Fixed(0);
    DSTORE_2 = 0x49, "dstore_2", Fixed(0);
    DSTORE_3 = 0x4a, "dstore_3", Fixed(0);
    ASTORE_0 = 0x4b, "astore_0", Fixed(0);
    ASTORE_1 = 0x4c, "astore_1", Fixed(0);
    ASTORE_2 = 0x4d, "astore_2", Fixed(0);
    ASTORE_3 = 0x4e, "astore_3", Fixed(0);
    IASTORE = 0x4f, "iastore", Fixed(0);
    LASTORE = 0x50, "lastore", Fixed(0);
    FASTORE = 0x51, "fastore", Fixed(0);
    DASTORE = 0x52, "dastore", Fixed(0);
    AASTORE = 0x53, "aastore", Fixed(0);
    BASTORE = 0x54, "bastore", Fixed(0);
    CASTORE = 0x55, "castore", Fixed(0);
    SASTORE = 0x56, "sastore", Fixed(0);
    POP = 0x57, "pop", Fixed(0);
    POP2 = 0x58, "pop2", Fixed(0);
    DUP = 0x59, "dup", Fixed(0);
    DUP_X1 = 0x5a, "dup_x1", Fixed(0);
    DUP_X2 = 0x5b, "dup_x2", Fixed(0);
    DUP2 = 0x5c, "dup2", Fixed(0);
    DUP2_X1 = 0x5d, "dup2_x1", Fixed(0);
    DUP2_X2 = 0x5e, "dup2_x2", Fixed(0);
    SWAP = 0x5f, "swap", Fixed(0);
    IADD = 0x60, "iadd", Fixed(0);
    LADD = 0x61, "ladd", Fixed(0);
    FADD = 0x62, "fadd", Fixed(0);
    DADD = 0x63, "dadd", Fixed(0);
    ISUB = 0x64, "isub", Fixed(0);
    LSUB = 0x65, "lsub", Fixed(0);
    FSUB = 0x66, "fsub", Fixed(0);
    DSUB = 0x67, "dsub", Fixed(0);
    IMUL = 0x68, "imul", Fixed(0);
    LMUL = 0x69, "lmul", Fixed(0);
    FMUL = 0x6a, "fmul", Fixed(0);
    DMUL = 0x6b, "dmul", Fixed(0);
    IDIV = 0x6c, "idiv", Fixed(0);
    LDIV = 0x6d, "ldiv", Fixed(0);
    FDIV = 0x6e, "fdiv", Fixed(0);
    DDIV = 0x6f, "ddiv", Fixed(0);
    IREM = 0x70, "irem", Fixed(0);
    LREM = 0x71, "lrem", Fixed(0);
    FREM = 0x72, "frem", Fixed(0);
    DREM = 0x73, "drem", Fixed(0);
    INEG = 0x74, "ineg", Fixed(0);
    LNEG = 0x75, "lneg", Fixed(0);
    FNEG = 0x76, "fneg", Fixed(0);
    DNEG = 0x77, "dneg", Fixed(0);
    ISHL = 0x78, "ishl", Fixed(0);
    LSHL = 0x79, "lshl", Fixed(0);
    ISHR = 0x7a, "ishr", Fixed(0);
    LSHR = 0x7b, "lshr", Fixed(0);
    IUSHR = 0x7c, "iushr", Fixed(0);
    LUSHR = 0x7d, "lushr", Fixed(0);
    IAND = 0x7e, "iand", Fixed(0);
    LAND = 0x7f, "land", Fixed(0);
    IOR = 0x80, "ior", Fixed(0);
    LOR = 0x81, "lor", Fixed(0);
    IXOR = 0x82, "ixor", Fixed(0);
    LXOR = 0x83, "lxor", Fixed(0);
    IINC = 0x84, "iinc", Fixed(2);
    I2L = 0x85, "i2l", Fixed(0);
    I2F = 0x86, "i2f", Fixed(0);
    I2D = 0x87, "i2d", Fixed(0);
    L2I = 0x88, "l2i", Fixed(0);
    L2F = 0x89, "l2f", Fixed(0);
    L2D = 0x8a, "l2d", Fixed(0);
    F2I = 0x8b, "f2i", Fixed(0);
    F2L = 0x8c, "f2l", Fixed(0);
    F2D = 0x8d, "f2d", Fixed(0);
    D2I = 0x8e, "d2i", Fixed(0);
    D2L = 0x8f, "d2l", Fixed(0);
    D2F = 0x90, "d2f", Fixed(0);
    I2B = 0x91, "i2b", Fixed(0);
    I2C = 0x92, "i2c", Fixed(0);
    I2S = 0x93, "i2s", Fixed(0);
    LCMP = 0x94, "lcmp", Fixed(0);
    FCMPL = 0x95, "fcmpl", Fixed(0);
    FCMPG = 0x96, "fcmpg", Fixed(0);
    DCMPL = 0x97, "dcmpl", Fixed(0);
    DCMPG = 0x98, "dcmpg", Fixed(0);
    IFEQ = 0x99, "ifeq", Fixed(2);
    IFNE = 0x9a, "ifne", Fixed(2);
    IFLT = 0x9b, "iflt", Fixed(2);
    IFGE = 0x9c, "ifge", Fixed(2);
    IFGT = 0x9d, "ifgt", Fixed(2);
    IFLE = 0x9e, "ifle", Fixed(2);
    IF_ICMPEQ = 0x9f, "if_icmpeq", Fixed(2);
    IF_ICMPNE = 0xa0, "if_icmpne", Fixed(2);
    IF_ICMPLT = 0xa1, "if_icmplt", Fixed(2);
    IF_ICMPGE = 0xa2, "if_icmpge", Fixed(2);
    IF_ICMPGT = 0xa3, "if_icmpgt", Fixed(2);
    IF_ICMPLE = 0xa4, "if_icmple", Fixed(2);
    IF_ACMPEQ = 0xa5, "if_acmpeq", Fixed(2);
    IF_ACMPNE = 0xa6, "if_acmpne", Fixed(2);
    GOTO = 0xa7, "goto", Fixed(2);
    JSR = 0xa8, "jsr", Fixed(2);
    RET = 0xa9, "ret", Fixed(1);
    TABLESWITCH = 0xaa, "tableswitch", TableSwitch;
    LOOKUPSWITCH = 0xab, "lookupswitch", LookupSwitch;
    IRETURN = 0xac, "ireturn", Fixed(0);
    LRETURN = 0xad, "lreturn", Fixed(0);
    FRETURN = 0xae, "freturn", Fixed(0);
    DRETURN = 0xaf, "dreturn", Fixed(0);
    ARETURN = 0xb0, "areturn", Fixed(0);
    RETURN = 0xb1, "return", Fixed(0);
    GETSTATIC = 0xb2, "getstatic", Fixed(2);
    PUTSTATIC = 0xb3, "putstatic", Fixed(2);
    GETFIELD = 0xb4, "getfield", Fixed(2);
    PUTFIELD = 0xb5, "putfield", Fixed(2);
    INVOKEVIRTUAL = 0xb6, "invokevirtual", Fixed(2);
    INVOKESPECIAL = 0xb7, "invokespecial", Fixed(2);
    INVOKESTATIC = 0xb8, "invokestatic", Fixed(2);
    INVOKEINTERFACE = 0xb9, "invokeinterface", Fixed(4);
    INVOKEDYNAMIC = 0xba, "invokedynamic", Fixed(4);
    NEW = 0xbb, "new", Fixed(2);
    NEWARRAY = 0xbc, "newarray", Fixed(1);
    ANEWARRAY = 0xbd, "anewarray", Fixed(2);
    ARRAYLENGTH = 0xbe, "arraylength", Fixed(0);
    ATHROW = 0xbf, "athrow", Fixed(0);
    CHECKCAST = 0xc0, "checkcast", Fixed(2);
    INSTANCEOF = 0xc1, "instanceof", Fixed(2);
    MONITORENTER = 0xc2, "monitorenter", Fixed(0);
    MONITOREXIT = 0xc3, "monitorexit", Fixed(0);
    WIDE = 0xc4, "wide", Wide;
    MULTIANEWARRAY = 0xc5, "multianewarray", Fixed(3);
    IFNULL = 0xc6, "ifnull", Fixed(2);
    IFNONNULL = 0xc7, "ifnonnull", Fixed(2);
    GOTO_W = 0xc8, "goto_w", Fixed(4);
    JSR_W = 0xc9, "jsr_w", Fixed(4);
}

/// Looks up a defined opcode. Reserved and unassigned opcodes yield `None`.
pub fn opcode_info(opcode: u8) -> Option<&'static OpcodeInfo> {
    OPCODE_TABLE[opcode as usize].as_ref()
}

/// Whether `opcode` may follow a `wide` prefix.
pub fn is_widenable(opcode: u8) -> bool {
    matches!(
        opcode,
        opcode::ILOAD
            | opcode::LLOAD
            | opcode::FLOAD
            | opcode::DLOAD
            | opcode::ALOAD
            | opcode::ISTORE
            | opcode::LSTORE
            | opcode::FSTORE
            | opcode::DSTORE
            | opcode::ASTORE
            | opcode::RET
            | opcode::IINC
    )
}

/// Number of padding bytes after a switch opcode at `pc`, so that the switch data
/// starts on a 4-byte boundary of the code array.
pub fn switch_padding(pc: u32) -> u8 {
    ((4 - (pc + 1) % 4) % 4) as u8
}

/// One decoded instruction.
///
/// `operands` holds every byte after the opcode, switch padding included, so
/// `1 + operands.len()` is the instruction's size in the code array.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Offset from the start of the code array.
    pub pc: u32,
    /// Offset of the opcode in the class file.
    pub offset: usize,
    pub opcode: u8,
    pub operands: Vec<u8>,
    pub padding: u8,
}

impl Instruction {
    pub fn len(&self) -> usize {
        1 + self.operands.len()
    }

    pub fn mnemonic(&self) -> &'static str {
        opcode_info(self.opcode).map_or("<unknown>", |info| info.mnemonic)
    }

    pub fn is_wide(&self) -> bool {
        self.opcode == opcode::WIDE
    }

    /// The opcode a `wide` prefix applies to.
    pub fn widened_opcode(&self) -> Option<u8> {
        self.is_wide().then(|| self.operands.first().copied()).flatten()
    }

    /// The constant pool index this instruction refers to, if any.
    pub fn pool_index(&self) -> Option<u16> {
        match self.opcode {
            opcode::LDC => self.operands.first().map(|&index| index as u16),
            opcode::LDC_W
            | opcode::LDC2_W
            | opcode::GETSTATIC
            | opcode::PUTSTATIC
            | opcode::GETFIELD
            | opcode::PUTFIELD
            | opcode::INVOKEVIRTUAL
            | opcode::INVOKESPECIAL
            | opcode::INVOKESTATIC
            | opcode::INVOKEINTERFACE
            | opcode::INVOKEDYNAMIC
            | opcode::NEW
            | opcode::ANEWARRAY
            | opcode::CHECKCAST
            | opcode::INSTANCEOF
            | opcode::MULTIANEWARRAY => self.operands.get(0..2).map(BigEndian::read_u16),
            _ => None,
        }
    }

    /// The jump table of a `tableswitch` or `lookupswitch`.
    pub fn switch_table(&self) -> Option<SwitchTable> {
        let data = self.operands.get(self.padding as usize..)?;
        let words = data
            .chunks_exact(4)
            .map(BigEndian::read_i32)
            .collect::<Vec<_>>();

        match self.opcode {
            opcode::TABLESWITCH => match words.as_slice() {
                [default, low, high, offsets @ ..] => Some(SwitchTable::Table {
                    default: *default,
                    low: *low,
                    high: *high,
                    offsets: offsets.to_vec(),
                }),
                _ => None,
            },
            opcode::LOOKUPSWITCH => match words.as_slice() {
                [default, _npairs, pairs @ ..] => Some(SwitchTable::Lookup {
                    default: *default,
                    pairs: pairs.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect(),
                }),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Jump offsets are relative to the pc of the switch instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchTable {
    Table {
        default: i32,
        low: i32,
        high: i32,
        offsets: Vec<i32>,
    },
    Lookup {
        default: i32,
        pairs: Vec<(i32, i32)>,
    },
}

#[cfg(test)]
mod instruction_tests {
    use super::*;

    #[test]
    fn it_should_know_every_defined_opcode() {
        assert_eq!(opcode_info(opcode::ALOAD_0).unwrap().mnemonic, "aload_0");
        assert_eq!(opcode_info(opcode::JSR_W).unwrap().operands, Fixed(4));
        assert_eq!(
            (0..=255u8).filter(|&op| opcode_info(op).is_some()).count(),
            202
        );
    }

    #[test]
    fn it_should_not_know_reserved_opcodes() {
        assert!(opcode_info(0xca).is_none());
        assert!(opcode_info(0xfe).is_none());
        assert!(opcode_info(0xff).is_none());
    }

    #[test]
    fn it_should_align_switch_data_to_four_bytes() {
        for pc in 0..16 {
            let padding = switch_padding(pc);
            assert!(padding <= 3);
            assert_eq!((pc + 1 + padding as u32) % 4, 0);
        }
        assert_eq!(switch_padding(0), 3);
        assert_eq!(switch_padding(3), 0);
    }

    #[test]
    fn it_should_decode_a_lookup_switch_table() {
        let instruction = Instruction {
            pc: 1,
            offset: 0,
            opcode: opcode::LOOKUPSWITCH,
            operands: vec![
                0, 0, // padding
                0, 0, 0, 20, // default
                0, 0, 0, 1, // npairs
                0, 0, 0, 7, 0, 0, 0, 12,
            ],
            padding: 2,
        };

        assert_eq!(
            instruction.switch_table(),
            Some(SwitchTable::Lookup {
                default: 20,
                pairs: vec![(7, 12)],
            })
        );
        assert_eq!(instruction.len(), 19);
    }

    #[test]
    fn it_should_read_pool_indices_from_operands() {
        let instruction = Instruction {
            pc: 0,
            offset: 0,
            opcode: opcode::INVOKESPECIAL,
            operands: vec![0x00, 0x08],
            padding: 0,
        };

        assert_eq!(instruction.pool_index(), Some(8));
        assert_eq!(instruction.mnemonic(), "invokespecial");
    }
}
