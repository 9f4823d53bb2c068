// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.7.4

use crate::cursor::{U1, U2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VerificationType {
    Top = 0,
    Integer = 1,
    Float = 2,
    Double = 3,
    Long = 4,
    Null = 5,
    UninitializedThis = 6,
    /// Carries a `Class` pool index.
    Object = 7,
    /// Carries the pc of the `new` instruction that created the object.
    Uninitialized = 8,
}

impl VerificationType {
    pub fn has_reference(self) -> bool {
        matches!(self, VerificationType::Object | VerificationType::Uninitialized)
    }
}

impl TryFrom<u8> for VerificationType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => VerificationType::Top,
            1 => VerificationType::Integer,
            2 => VerificationType::Float,
            3 => VerificationType::Double,
            4 => VerificationType::Long,
            5 => VerificationType::Null,
            6 => VerificationType::UninitializedThis,
            7 => VerificationType::Object,
            8 => VerificationType::Uninitialized,
            _ => return Err(value),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerificationTypeInfo {
    pub tag: U1,
    pub kind: VerificationType,
    pub reference: Option<U2>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StackMapFrame {
    /// 0-63, the frame type is the offset delta.
    Same { frame_type: U1 },
    /// 64-127, the offset delta is `frame_type - 64`.
    SameLocals1StackItem {
        frame_type: U1,
        stack: VerificationTypeInfo,
    },
    /// 247
    SameLocals1StackItemExtended {
        frame_type: U1,
        offset_delta: U2,
        stack: VerificationTypeInfo,
    },
    /// 248-250, drops the last `251 - frame_type` locals.
    Chop { frame_type: U1, offset_delta: U2 },
    /// 251
    SameExtended { frame_type: U1, offset_delta: U2 },
    /// 252-254, adds `frame_type - 251` locals.
    Append {
        frame_type: U1,
        offset_delta: U2,
        locals: Vec<VerificationTypeInfo>,
    },
    /// 255
    Full {
        frame_type: U1,
        offset_delta: U2,
        number_of_locals: U2,
        locals: Vec<VerificationTypeInfo>,
        number_of_stack_items: U2,
        stack: Vec<VerificationTypeInfo>,
    },
}

impl StackMapFrame {
    pub fn frame_type(&self) -> U1 {
        match self {
            StackMapFrame::Same { frame_type }
            | StackMapFrame::SameLocals1StackItem { frame_type, .. }
            | StackMapFrame::SameLocals1StackItemExtended { frame_type, .. }
            | StackMapFrame::Chop { frame_type, .. }
            | StackMapFrame::SameExtended { frame_type, .. }
            | StackMapFrame::Append { frame_type, .. }
            | StackMapFrame::Full { frame_type, .. } => *frame_type,
        }
    }

    pub fn offset_delta(&self) -> u16 {
        match self {
            StackMapFrame::Same { frame_type } => frame_type.value as u16,
            StackMapFrame::SameLocals1StackItem { frame_type, .. } => {
                frame_type.value as u16 - 64
            }
            StackMapFrame::SameLocals1StackItemExtended { offset_delta, .. }
            | StackMapFrame::Chop { offset_delta, .. }
            | StackMapFrame::SameExtended { offset_delta, .. }
            | StackMapFrame::Append { offset_delta, .. }
            | StackMapFrame::Full { offset_delta, .. } => offset_delta.value,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StackMapFrame::Same { .. } => "same",
            StackMapFrame::SameLocals1StackItem { .. } => "same_locals_1_stack_item",
            StackMapFrame::SameLocals1StackItemExtended { .. } => {
                "same_locals_1_stack_item_frame_extended"
            }
            StackMapFrame::Chop { .. } => "chop",
            StackMapFrame::SameExtended { .. } => "same_frame_extended",
            StackMapFrame::Append { .. } => "append",
            StackMapFrame::Full { .. } => "full_frame",
        }
    }
}

#[cfg(test)]
mod stack_map_frame_tests {
    use super::*;
    use crate::cursor::Scalar;

    #[test]
    fn it_should_derive_implicit_offset_deltas() {
        let same = StackMapFrame::Same {
            frame_type: Scalar::new(12, 0),
        };
        let same_locals = StackMapFrame::SameLocals1StackItem {
            frame_type: Scalar::new(70, 0),
            stack: VerificationTypeInfo {
                tag: Scalar::new(1, 1),
                kind: VerificationType::Integer,
                reference: None,
            },
        };

        assert_eq!(same.offset_delta(), 12);
        assert_eq!(same_locals.offset_delta(), 6);
    }

    #[test]
    fn it_should_give_only_object_and_uninitialized_a_reference() {
        let with_reference = (0..=8)
            .filter_map(|tag| VerificationType::try_from(tag).ok())
            .filter(|kind| kind.has_reference())
            .collect::<Vec<_>>();

        assert_eq!(
            with_reference,
            vec![VerificationType::Object, VerificationType::Uninitialized]
        );
    }
}
