use crate::{
    constant_pool::ConstantTag,
    stack_map::{StackMapFrame, VerificationType, VerificationTypeInfo},
    ClassFileError, ConstantPool, Result,
};

use super::Parser;

impl<'a> Parser<'a> {
    pub(super) fn parse_stack_map_frame(&mut self, pool: &ConstantPool) -> Result<StackMapFrame> {
        let frame_type = self.cursor.read_u1()?;

        Ok(match frame_type.value {
            0..=63 => StackMapFrame::Same { frame_type },
            64..=127 => StackMapFrame::SameLocals1StackItem {
                frame_type,
                stack: self.parse_verification_type_info(pool)?,
            },
            247 => StackMapFrame::SameLocals1StackItemExtended {
                frame_type,
                offset_delta: self.cursor.read_u2()?,
                stack: self.parse_verification_type_info(pool)?,
            },
            248..=250 => StackMapFrame::Chop {
                frame_type,
                offset_delta: self.cursor.read_u2()?,
            },
            251 => StackMapFrame::SameExtended {
                frame_type,
                offset_delta: self.cursor.read_u2()?,
            },
            252..=254 => {
                let offset_delta = self.cursor.read_u2()?;
                let locals = (251..frame_type.value)
                    .map(|_| self.parse_verification_type_info(pool))
                    .collect::<Result<Vec<_>>>()?;

                StackMapFrame::Append {
                    frame_type,
                    offset_delta,
                    locals,
                }
            }
            255 => {
                let offset_delta = self.cursor.read_u2()?;
                let number_of_locals = self.cursor.read_u2()?;
                let locals = (0..number_of_locals.value)
                    .map(|_| self.parse_verification_type_info(pool))
                    .collect::<Result<Vec<_>>>()?;
                let number_of_stack_items = self.cursor.read_u2()?;
                let stack = (0..number_of_stack_items.value)
                    .map(|_| self.parse_verification_type_info(pool))
                    .collect::<Result<Vec<_>>>()?;

                StackMapFrame::Full {
                    frame_type,
                    offset_delta,
                    number_of_locals,
                    locals,
                    number_of_stack_items,
                    stack,
                }
            }
            reserved => {
                return Err(ClassFileError::UnknownFrameTag {
                    frame_type: reserved,
                    offset: frame_type.offset,
                })
            }
        })
    }

    fn parse_verification_type_info(&mut self, pool: &ConstantPool) -> Result<VerificationTypeInfo> {
        let tag = self.cursor.read_u1()?;
        let kind = VerificationType::try_from(tag.value).map_err(|value| {
            ClassFileError::UnknownVerificationTypeTag {
                tag: value,
                offset: tag.offset,
            }
        })?;

        let reference = if kind.has_reference() {
            let reference = self.cursor.read_u2()?;
            if kind == VerificationType::Object {
                pool.get_of(reference.value, &[ConstantTag::Class])?;
            }
            Some(reference)
        } else {
            None
        };

        Ok(VerificationTypeInfo {
            tag,
            kind,
            reference,
        })
    }
}

#[cfg(test)]
mod parse_stack_map_frame_tests {
    use super::*;
    use crate::cursor::Scalar;

    fn parse(bytes: &[u8]) -> Result<StackMapFrame> {
        Parser::new(bytes).parse_stack_map_frame(&ConstantPool::default())
    }

    #[test]
    fn it_should_select_the_shape_by_tag_range() {
        assert!(matches!(parse(&[0]).unwrap(), StackMapFrame::Same { .. }));
        assert!(matches!(parse(&[63]).unwrap(), StackMapFrame::Same { .. }));
        assert!(matches!(
            parse(&[64, 1]).unwrap(),
            StackMapFrame::SameLocals1StackItem { .. }
        ));
        assert!(matches!(
            parse(&[247, 0, 9, 2]).unwrap(),
            StackMapFrame::SameLocals1StackItemExtended { .. }
        ));
        assert!(matches!(
            parse(&[248, 0, 9]).unwrap(),
            StackMapFrame::Chop { .. }
        ));
        assert!(matches!(
            parse(&[251, 0, 9]).unwrap(),
            StackMapFrame::SameExtended { .. }
        ));
    }

    #[test]
    fn it_should_read_one_local_per_append_step() {
        let frame = parse(&[252, 0x00, 0x05, 1]).unwrap();

        assert_eq!(
            frame,
            StackMapFrame::Append {
                frame_type: Scalar::new(252, 0),
                offset_delta: Scalar::new(5, 1),
                locals: vec![VerificationTypeInfo {
                    tag: Scalar::new(1, 3),
                    kind: VerificationType::Integer,
                    reference: None,
                }],
            }
        );

        let StackMapFrame::Append { locals, .. } = parse(&[254, 0, 5, 1, 2, 4]).unwrap() else {
            panic!("expected an append frame");
        };
        assert_eq!(locals.len(), 3);
    }

    #[test]
    fn it_should_read_counted_lists_of_a_full_frame() {
        #[rustfmt::skip]
        let bytes = [
            255, 0x00, 0x10,
            0x00, 0x02, 1, 8, 0x00, 0x04,       // locals: int, uninitialized(4)
            0x00, 0x01, 5,                      // stack: null
        ];
        let frame = parse(&bytes).unwrap();

        let StackMapFrame::Full { locals, stack, .. } = &frame else {
            panic!("expected a full frame");
        };
        assert_eq!(frame.offset_delta(), 16);
        assert_eq!(locals[1].reference, Some(Scalar::new(4, 7)));
        assert_eq!(stack[0].kind, VerificationType::Null);
    }

    #[test]
    fn it_should_reject_reserved_frame_types() {
        assert!(matches!(
            parse(&[128]),
            Err(ClassFileError::UnknownFrameTag {
                frame_type: 128,
                offset: 0
            })
        ));
        assert!(matches!(
            parse(&[246]),
            Err(ClassFileError::UnknownFrameTag { frame_type: 246, .. })
        ));
    }

    #[test]
    fn it_should_reject_unknown_verification_types() {
        assert!(matches!(
            parse(&[64, 9]),
            Err(ClassFileError::UnknownVerificationTypeTag { tag: 9, offset: 1 })
        ));
    }

    #[test]
    fn it_should_check_object_references_against_the_pool() {
        assert!(matches!(
            parse(&[64, 7, 0x00, 0x01]),
            Err(ClassFileError::IndexOutOfRange { index: 1, count: 1 })
        ));
    }
}
