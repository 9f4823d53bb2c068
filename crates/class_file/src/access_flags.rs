// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.1-200-E.1

use std::fmt;

use bitflags::bitflags;

/// Declares a flag set together with the keyword each flag renders as.
///
/// Several flags share a bit across contexts (`ACC_SUPER` on a class is
/// `ACC_SYNCHRONIZED` on a method), which is why every context gets its own type.
macro_rules! access_flags {
    ($(#[$meta:meta])* $name:ident { $($flag:ident = $value:literal => $keyword:literal,)* }) => {
        bitflags! {
            $(#[$meta])*
            pub struct $name: u16 {
                $( const $flag = $value; )*
            }
        }

        impl $name {
            const KEYWORDS: &'static [($name, &'static str)] = &[$( ($name::$flag, $keyword), )*];

            /// Keywords of the set flags, lowest bit first.
            pub fn keywords(&self) -> Vec<&'static str> {
                Self::KEYWORDS
                    .iter()
                    .filter(|(flag, _)| self.contains(*flag))
                    .map(|(_, keyword)| *keyword)
                    .collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.keywords().join(" "))
            }
        }
    };
}

access_flags! {
    ClassAccessFlags {
        PUBLIC = 0x0001 => "public",
        FINAL = 0x0010 => "final",
        SUPER = 0x0020 => "super",
        INTERFACE = 0x0200 => "interface",
        ABSTRACT = 0x0400 => "abstract",
        SYNTHETIC = 0x1000 => "synthetic",
        ANNOTATION = 0x2000 => "annotation",
        ENUM = 0x4000 => "enum",
        MODULE = 0x8000 => "module",
    }
}

access_flags! {
    FieldAccessFlags {
        PUBLIC = 0x0001 => "public",
        PRIVATE = 0x0002 => "private",
        PROTECTED = 0x0004 => "protected",
        STATIC = 0x0008 => "static",
        FINAL = 0x0010 => "final",
        VOLATILE = 0x0040 => "volatile",
        TRANSIENT = 0x0080 => "transient",
        SYNTHETIC = 0x1000 => "synthetic",
        ENUM = 0x4000 => "enum",
    }
}

access_flags! {
    MethodAccessFlags {
        PUBLIC = 0x0001 => "public",
        PRIVATE = 0x0002 => "private",
        PROTECTED = 0x0004 => "protected",
        STATIC = 0x0008 => "static",
        FINAL = 0x0010 => "final",
        SYNCHRONIZED = 0x0020 => "synchronized",
        BRIDGE = 0x0040 => "bridge",
        VARARGS = 0x0080 => "varargs",
        NATIVE = 0x0100 => "native",
        ABSTRACT = 0x0400 => "abstract",
        STRICT = 0x0800 => "strict",
        SYNTHETIC = 0x1000 => "synthetic",
    }
}

access_flags! {
    InnerClassAccessFlags {
        PUBLIC = 0x0001 => "public",
        PRIVATE = 0x0002 => "private",
        PROTECTED = 0x0004 => "protected",
        STATIC = 0x0008 => "static",
        FINAL = 0x0010 => "final",
        INTERFACE = 0x0200 => "interface",
        ABSTRACT = 0x0400 => "abstract",
        SYNTHETIC = 0x1000 => "synthetic",
        ANNOTATION = 0x2000 => "annotation",
        ENUM = 0x4000 => "enum",
    }
}

access_flags! {
    ParameterAccessFlags {
        FINAL = 0x0010 => "final",
        SYNTHETIC = 0x1000 => "synthetic",
        MANDATED = 0x8000 => "mandated",
    }
}

access_flags! {
    ModuleFlags {
        OPEN = 0x0020 => "open",
        SYNTHETIC = 0x1000 => "synthetic",
        MANDATED = 0x8000 => "mandated",
    }
}

access_flags! {
    RequiresFlags {
        TRANSITIVE = 0x0020 => "transitive",
        STATIC_PHASE = 0x0040 => "static",
        SYNTHETIC = 0x1000 => "synthetic",
        MANDATED = 0x8000 => "mandated",
    }
}

access_flags! {
    /// Flags of `exports` and `opens` directives.
    ExportsFlags {
        SYNTHETIC = 0x1000 => "synthetic",
        MANDATED = 0x8000 => "mandated",
    }
}

#[cfg(test)]
mod access_flags_tests {
    use super::*;

    #[test]
    fn it_should_render_class_flags_in_bit_order() {
        let flags = ClassAccessFlags::from_bits_truncate(0x0021);

        assert_eq!(flags, ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER);
        assert_eq!(flags.to_string(), "public super");
    }

    #[test]
    fn it_should_render_the_shared_bit_per_context() {
        assert_eq!(MethodAccessFlags::from_bits_truncate(0x0029).to_string(), "public static synchronized");
        assert_eq!(FieldAccessFlags::from_bits_truncate(0x0040).to_string(), "volatile");
    }

    #[test]
    fn it_should_render_nothing_for_empty_flags() {
        assert_eq!(FieldAccessFlags::empty().to_string(), "");
    }
}
