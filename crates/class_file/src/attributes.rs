// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.7

use indexmap::IndexMap;
use log::warn;

use crate::{
    access_flags::{
        ExportsFlags, InnerClassAccessFlags, ModuleFlags, ParameterAccessFlags, RequiresFlags,
    },
    cursor::{Scalar, U1, U2, U4},
    instruction::Instruction,
    stack_map::StackMapFrame,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name_index: U2,
    pub name: String,
    pub length: U4,
    pub info: AttributeInfo,
}

impl Attribute {
    /// Offset of the first byte after the attribute.
    pub fn end(&self) -> usize {
        self.length.end() + self.length.value as usize
    }
}

/// An attribute table, keyed by attribute name in the order the names first appeared.
#[derive(Debug, Clone, PartialEq)]
pub struct Attributes {
    pub count: U2,
    entries: IndexMap<String, Attribute>,
}

impl Attributes {
    pub(crate) fn new(count: U2) -> Self {
        Self {
            count,
            entries: IndexMap::with_capacity(count.value as usize),
        }
    }

    /// Adds an attribute. A later attribute with the same name replaces the earlier one.
    pub(crate) fn insert(&mut self, attribute: Attribute) {
        if let Some(previous) = self.entries.insert(attribute.name.clone(), attribute) {
            warn!(
                "Duplicate {} attribute, the one at offset {} was overwritten",
                previous.name, previous.name_index.offset
            );
        }
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn code(&self) -> Option<&Code> {
        match &self.get("Code")?.info {
            AttributeInfo::Code(code) => Some(code),
            _ => None,
        }
    }

    pub fn stack_map_table(&self) -> Option<&[StackMapFrame]> {
        match &self.get("StackMapTable")?.info {
            AttributeInfo::StackMapTable { entries, .. } => Some(entries),
            _ => None,
        }
    }

    pub fn source_file_index(&self) -> Option<u16> {
        match &self.get("SourceFile")?.info {
            AttributeInfo::SourceFile { sourcefile_index } => Some(sourcefile_index.value),
            _ => None,
        }
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = indexmap::map::Values<'a, String, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeInfo {
    ConstantValue {
        constantvalue_index: U2,
    },
    Code(Code),
    StackMapTable {
        number_of_entries: U2,
        entries: Vec<StackMapFrame>,
    },
    Exceptions {
        exception_index_table: Vec<U2>,
    },
    InnerClasses(Vec<InnerClass>),
    EnclosingMethod {
        class_index: U2,
        method_index: U2,
    },
    Synthetic,
    Signature {
        signature_index: U2,
    },
    SourceFile {
        sourcefile_index: U2,
    },
    SourceDebugExtension(String),
    LineNumberTable(Vec<LineNumber>),
    LocalVariableTable(Vec<LocalVariable>),
    /// Same shape as `LocalVariableTable`, `descriptor_index` holds the field signature.
    LocalVariableTypeTable(Vec<LocalVariable>),
    Deprecated,
    RuntimeVisibleAnnotations(Vec<Annotation>),
    RuntimeInvisibleAnnotations(Vec<Annotation>),
    RuntimeVisibleParameterAnnotations(Vec<Vec<Annotation>>),
    RuntimeInvisibleParameterAnnotations(Vec<Vec<Annotation>>),
    RuntimeVisibleTypeAnnotations(Vec<TypeAnnotation>),
    RuntimeInvisibleTypeAnnotations(Vec<TypeAnnotation>),
    AnnotationDefault(ElementValue),
    BootstrapMethods(Vec<BootstrapMethod>),
    MethodParameters(Vec<MethodParameter>),
    Module(Module),
    ModulePackages {
        package_index: Vec<U2>,
    },
    ModuleMainClass {
        main_class_index: U2,
    },
    NestHost {
        host_class_index: U2,
    },
    NestMembers {
        classes: Vec<U2>,
    },
    Record(Vec<RecordComponent>),
    PermittedSubclasses {
        classes: Vec<U2>,
    },
    /// An attribute this decoder has no routine for. Its bytes were skipped.
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    pub max_stack: U2,
    pub max_locals: U2,
    pub code_length: U4,
    pub instructions: Vec<Instruction>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Attributes,
}

impl Code {
    pub fn instruction_at(&self, pc: u32) -> Option<&Instruction> {
        self.instructions
            .binary_search_by_key(&pc, |instruction| instruction.pc)
            .ok()
            .map(|index| &self.instructions[index])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionTableEntry {
    pub start_pc: U2,
    pub end_pc: U2,
    pub handler_pc: U2,
    /// 0 catches everything.
    pub catch_type: U2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InnerClass {
    pub inner_class_info_index: U2,
    pub outer_class_info_index: U2,
    pub inner_name_index: U2,
    pub inner_class_access_flags: Scalar<InnerClassAccessFlags>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineNumber {
    pub start_pc: U2,
    pub line_number: U2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariable {
    pub start_pc: U2,
    pub length: U2,
    pub name_index: U2,
    pub descriptor_index: U2,
    pub index: U2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapMethod {
    pub bootstrap_method_ref: U2,
    pub bootstrap_arguments: Vec<U2>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodParameter {
    /// 0 for a parameter without a name.
    pub name_index: U2,
    pub access_flags: Scalar<ParameterAccessFlags>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordComponent {
    pub name_index: U2,
    pub descriptor_index: U2,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub module_name_index: U2,
    pub module_flags: Scalar<ModuleFlags>,
    pub module_version_index: U2,
    pub requires: Vec<Requires>,
    pub exports: Vec<PackageDirective>,
    pub opens: Vec<PackageDirective>,
    pub uses_index: Vec<U2>,
    pub provides: Vec<Provides>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Requires {
    pub requires_index: U2,
    pub requires_flags: Scalar<RequiresFlags>,
    pub requires_version_index: U2,
}

/// An `exports` or `opens` directive.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageDirective {
    pub package_index: U2,
    pub flags: Scalar<ExportsFlags>,
    /// Module indices. Empty for an unqualified directive.
    pub to_index: Vec<U2>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Provides {
    pub provides_index: U2,
    pub provides_with_index: Vec<U2>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub type_index: U2,
    pub element_value_pairs: Vec<ElementValuePair>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementValuePair {
    pub element_name_index: U2,
    pub value: ElementValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    /// Tags `B C D F I J S Z s`.
    Const { tag: U1, const_value_index: U2 },
    Enum {
        tag: U1,
        type_name_index: U2,
        const_name_index: U2,
    },
    Class { tag: U1, class_info_index: U2 },
    Annotation { tag: U1, annotation: Box<Annotation> },
    Array {
        tag: U1,
        num_values: U2,
        values: Vec<ElementValue>,
    },
}

impl ElementValue {
    pub fn tag(&self) -> char {
        match self {
            ElementValue::Const { tag, .. }
            | ElementValue::Enum { tag, .. }
            | ElementValue::Class { tag, .. }
            | ElementValue::Annotation { tag, .. }
            | ElementValue::Array { tag, .. } => tag.value as char,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub target_type: U1,
    pub target_info: TargetInfo,
    pub target_path: Vec<TypePathEntry>,
    pub annotation: Annotation,
}

/// Where in a declaration or expression an annotated type appears, chosen by `target_type`.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetInfo {
    /// 0x00, 0x01
    TypeParameter { type_parameter_index: U1 },
    /// 0x10, 65535 for the superclass.
    SuperType { supertype_index: U2 },
    /// 0x11, 0x12
    TypeParameterBound {
        type_parameter_index: U1,
        bound_index: U1,
    },
    /// 0x13 - 0x15
    Empty,
    /// 0x16
    FormalParameter { formal_parameter_index: U1 },
    /// 0x17
    Throws { throws_type_index: U2 },
    /// 0x40, 0x41
    LocalVar(Vec<LocalVarTarget>),
    /// 0x42
    Catch { exception_table_index: U2 },
    /// 0x43 - 0x46
    Offset { offset: U2 },
    /// 0x47 - 0x4B
    TypeArgument { offset: U2, type_argument_index: U1 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVarTarget {
    pub start_pc: U2,
    pub length: U2,
    pub index: U2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TypePathKind {
    Array = 0,
    Nested = 1,
    Wildcard = 2,
    TypeArgument = 3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypePathEntry {
    pub type_path_kind: Scalar<TypePathKind>,
    pub type_argument_index: U1,
}
