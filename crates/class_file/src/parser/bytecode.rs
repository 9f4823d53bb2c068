use byteorder::{BigEndian, ByteOrder};

use crate::{
    instruction::{is_widenable, opcode, opcode_info, switch_padding, Instruction, Operands},
    ClassFileError, Result,
};

use super::Parser;

impl<'a> Parser<'a> {
    /// Decodes the whole buffer of this parser as a code array of `code_length` bytes.
    pub(super) fn parse_instructions(&mut self, code_length: u32) -> Result<Vec<Instruction>> {
        let mut instructions = Vec::new();
        while !self.cursor.is_empty() {
            instructions.push(self.parse_instruction(code_length)?);
        }
        Ok(instructions)
    }

    fn parse_instruction(&mut self, code_length: u32) -> Result<Instruction> {
        let pc = self.cursor.position() as u32;
        let opcode = self.cursor.read_u1()?;
        let unknown_opcode = |value| ClassFileError::UnknownOpcode {
            opcode: value,
            pc,
            offset: opcode.offset,
        };
        let info = opcode_info(opcode.value).ok_or_else(|| unknown_opcode(opcode.value))?;

        let mut padding = 0;
        let operands = match info.operands {
            Operands::Fixed(len) => self.take_operands(code_length, len as usize)?.to_vec(),
            Operands::Wide => {
                let widened = self.take_operands(code_length, 1)?[0];
                if !is_widenable(widened) {
                    return Err(unknown_opcode(widened));
                }
                let len = if widened == opcode::IINC { 4 } else { 2 };

                let mut operands = vec![widened];
                operands.extend_from_slice(self.take_operands(code_length, len)?);
                operands
            }
            Operands::TableSwitch => {
                padding = switch_padding(pc);
                let header = self.take_operands(code_length, padding as usize + 12)?;
                let low = BigEndian::read_i32(&header[padding as usize + 4..]);
                let high = BigEndian::read_i32(&header[padding as usize + 8..]);
                if low > high {
                    return Err(ClassFileError::MalformedSwitch {
                        pc,
                        reason: format!("low {low} is greater than high {high}"),
                    });
                }
                let offsets_len = (high as i64 - low as i64 + 1) as usize * 4;

                let mut operands = header.to_vec();
                operands.extend_from_slice(self.take_operands(code_length, offsets_len)?);
                operands
            }
            Operands::LookupSwitch => {
                padding = switch_padding(pc);
                let header = self.take_operands(code_length, padding as usize + 8)?;
                let npairs = BigEndian::read_i32(&header[padding as usize + 4..]);
                if npairs < 0 {
                    return Err(ClassFileError::MalformedSwitch {
                        pc,
                        reason: format!("negative npairs {npairs}"),
                    });
                }

                let mut operands = header.to_vec();
                operands.extend_from_slice(self.take_operands(code_length, npairs as usize * 8)?);
                operands
            }
        };

        Ok(Instruction {
            pc,
            offset: opcode.offset,
            opcode: opcode.value,
            operands,
            padding,
        })
    }

    /// Borrows the next `len` operand bytes, failing if they run past the end of the code array.
    fn take_operands(&mut self, code_length: u32, len: usize) -> Result<&'a [u8]> {
        if len > self.cursor.remaining() {
            let consumed = self.cursor.position() + len;
            return Err(ClassFileError::MalformedCodeLength {
                declared: code_length,
                consumed: u32::try_from(consumed).unwrap_or(u32::MAX),
            });
        }
        self.cursor.read_bytes(len)
    }
}

#[cfg(test)]
mod parse_instructions_tests {
    use super::*;

    fn parse(code: &[u8]) -> Result<Vec<Instruction>> {
        Parser::with_base(code, 100).parse_instructions(code.len() as u32)
    }

    fn total_len(instructions: &[Instruction]) -> usize {
        instructions.iter().map(Instruction::len).sum()
    }

    #[test]
    fn it_should_parse_zero_operand_instructions() {
        let instructions = parse(&[opcode::ALOAD_0, opcode::RETURN]).unwrap();

        assert_eq!(instructions.len(), 2);
        assert_eq!(instructions[0].mnemonic(), "aload_0");
        assert_eq!((instructions[1].pc, instructions[1].offset), (1, 101));
        assert!(instructions.iter().all(|i| i.operands.is_empty()));
        assert_eq!(total_len(&instructions), 2);
    }

    #[test]
    fn it_should_parse_fixed_operands() {
        #[rustfmt::skip]
        let code = [
            opcode::ALOAD_0,
            opcode::INVOKESPECIAL, 0x00, 0x01,
            opcode::BIPUSH, 0x2A,
            opcode::INVOKEINTERFACE, 0x00, 0x02, 0x01, 0x00,
            opcode::RETURN,
        ];
        let instructions = parse(&code).unwrap();

        assert_eq!(
            instructions.iter().map(|i| i.pc).collect::<Vec<_>>(),
            vec![0, 1, 4, 6, 11]
        );
        assert_eq!(instructions[1].operands, vec![0x00, 0x01]);
        assert_eq!(total_len(&instructions), code.len());
    }

    #[test]
    fn it_should_parse_wide_instructions() {
        #[rustfmt::skip]
        let code = [
            opcode::WIDE, opcode::ILOAD, 0x01, 0x00,
            opcode::WIDE, opcode::IINC, 0x01, 0x00, 0xFF, 0xFF,
        ];
        let instructions = parse(&code).unwrap();

        assert_eq!(instructions.len(), 2);
        assert_eq!(instructions[0].len(), 4);
        assert_eq!(instructions[1].len(), 6);
        assert_eq!(instructions[1].widened_opcode(), Some(opcode::IINC));
    }

    #[test]
    fn it_should_reject_a_wide_prefix_on_other_opcodes() {
        assert!(matches!(
            parse(&[opcode::NOP, opcode::WIDE, opcode::GOTO, 0, 0]),
            Err(ClassFileError::UnknownOpcode {
                opcode: opcode::GOTO,
                pc: 1,
                offset: 101
            })
        ));
    }

    #[test]
    fn it_should_pad_a_table_switch_to_the_code_array() {
        #[rustfmt::skip]
        let code = [
            opcode::ILOAD_1,
            opcode::TABLESWITCH, 0x00, 0x00,    // pc 1, 2 bytes of padding
            0x00, 0x00, 0x00, 0x1C,             // default
            0x00, 0x00, 0x00, 0x01,             // low
            0x00, 0x00, 0x00, 0x02,             // high
            0x00, 0x00, 0x00, 0x1B,
            0x00, 0x00, 0x00, 0x1C,
            opcode::RETURN,
        ];
        let instructions = parse(&code).unwrap();
        let switch = &instructions[1];

        assert_eq!(switch.padding, 2);
        assert_eq!((switch.pc + 1 + switch.padding as u32) % 4, 0);
        assert_eq!(switch.len(), 23);
        assert_eq!(
            switch.switch_table(),
            Some(crate::instruction::SwitchTable::Table {
                default: 28,
                low: 1,
                high: 2,
                offsets: vec![27, 28],
            })
        );
        assert_eq!(instructions[2].pc, 24);
        assert_eq!(total_len(&instructions), code.len());
    }

    #[test]
    fn it_should_parse_a_lookup_switch_without_padding() {
        #[rustfmt::skip]
        let code = [
            opcode::ICONST_0, opcode::ICONST_0, opcode::ILOAD_1,
            opcode::LOOKUPSWITCH,               // pc 3, no padding
            0x00, 0x00, 0x00, 0x0C,             // default
            0x00, 0x00, 0x00, 0x00,             // npairs
        ];
        let instructions = parse(&code).unwrap();

        assert_eq!(instructions[3].padding, 0);
        assert_eq!(instructions[3].len(), 9);
        assert_eq!(total_len(&instructions), code.len());
    }

    #[test]
    fn it_should_size_a_padded_lookup_switch_by_its_pairs() {
        #[rustfmt::skip]
        let code = [
            opcode::LOOKUPSWITCH, 0x00, 0x00, 0x00, // pc 0, 3 bytes of padding
            0x00, 0x00, 0x00, 0x1C,             // default
            0x00, 0x00, 0x00, 0x02,             // npairs
            0x00, 0x00, 0x00, 0x01,             // 1 => 28
            0x00, 0x00, 0x00, 0x1C,
            0xFF, 0xFF, 0xFF, 0xFB,             // -5 => 29
            0x00, 0x00, 0x00, 0x1D,
            opcode::ICONST_0,
            opcode::IRETURN,
        ];
        let instructions = parse(&code).unwrap();
        let switch = &instructions[0];

        assert_eq!(switch.padding, 3);
        assert_eq!(switch.len(), 1 + 3 + 8 + 2 * 8);
        assert_eq!(
            switch.switch_table(),
            Some(crate::instruction::SwitchTable::Lookup {
                default: 28,
                pairs: vec![(1, 28), (-5, 29)],
            })
        );
        assert_eq!((instructions[1].pc, instructions[1].offset), (28, 128));
        assert_eq!(instructions[2].pc, 29);
        assert_eq!(total_len(&instructions), code.len());
    }

    #[test]
    fn it_should_reject_a_negative_lookup_switch_pair_count() {
        #[rustfmt::skip]
        let code = [
            opcode::NOP,
            opcode::LOOKUPSWITCH, 0x00, 0x00,   // pc 1, 2 bytes of padding
            0x00, 0x00, 0x00, 0x00,             // default
            0xFF, 0xFF, 0xFF, 0xFF,             // npairs -1
        ];

        assert!(matches!(
            parse(&code),
            Err(ClassFileError::MalformedSwitch { pc: 1, .. })
        ));
    }

    #[test]
    fn it_should_reject_an_inverted_table_switch_range() {
        #[rustfmt::skip]
        let code = [
            opcode::TABLESWITCH, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x02,
            0x00, 0x00, 0x00, 0x01,
        ];

        assert!(matches!(
            parse(&code),
            Err(ClassFileError::MalformedSwitch { pc: 0, .. })
        ));
    }

    #[test]
    fn it_should_reject_operands_past_the_code_length() {
        assert!(matches!(
            parse(&[opcode::ALOAD_0, opcode::SIPUSH, 0x01]),
            Err(ClassFileError::MalformedCodeLength {
                declared: 3,
                consumed: 4
            })
        ));
    }

    #[test]
    fn it_should_reject_reserved_opcodes() {
        assert!(matches!(
            parse(&[opcode::NOP, 0xCA]),
            Err(ClassFileError::UnknownOpcode {
                opcode: 0xCA,
                pc: 1,
                offset: 101
            })
        ));
    }
}
