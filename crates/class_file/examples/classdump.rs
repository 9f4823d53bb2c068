use std::{env, fs::File};

use jdecode_class_file::{AttributeInfo, ClassFile};
use memmap::Mmap;

fn main() {
    pretty_env_logger::init();

    let path = env::args().nth(1).expect("usage: classdump <path to .class file>");
    let file = File::open(&path).unwrap();
    let mmap = unsafe { Mmap::map(&file).unwrap() };

    let class_file = match ClassFile::parse(&mmap) {
        Ok(class_file) => class_file,
        Err(e) => {
            log::error!("Failed to decode {}: {}", path, e);
            std::process::exit(1);
        }
    };

    println!("Class: {}", class_file.class_name().unwrap_or("<invalid>"));
    println!("  version: {} (Java {})", class_file.version(), class_file.version().release().unwrap_or_default());
    println!("  flags: {}", class_file.access_flags.value);
    println!("  super: {}", class_file.super_class_name().unwrap_or("<invalid>"));
    for name in class_file.interface_names().unwrap_or_default() {
        println!("  implements: {}", name);
    }
    println!();

    println!("Constant pool:");
    for entry in &class_file.constant_pool {
        match class_file.constant_pool.resolve(entry.index) {
            Ok(text) => println!("  #{:<4} {:<18} {}", entry.index, entry.info.tag(), text),
            Err(e) => log::warn!("#{} does not resolve: {}", entry.index, e),
        }
    }
    println!();

    for field in &class_file.fields {
        println!(
            "Field: {} {} {}",
            field.access_flags.value,
            class_file.field_descriptor(field).unwrap_or("?"),
            class_file.field_name(field).unwrap_or("?")
        );
    }

    for method in &class_file.methods {
        println!(
            "Method: {} {}{}",
            method.access_flags.value,
            class_file.method_name(method).unwrap_or("?"),
            class_file.method_descriptor(method).unwrap_or("?")
        );

        let Some(code) = method.attributes.code() else {
            continue;
        };
        println!(
            "  stack={} locals={} code_length={}",
            code.max_stack.value, code.max_locals.value, code.code_length.value
        );
        for instruction in &code.instructions {
            match instruction.pool_index() {
                Some(index) => println!(
                    "  {:>5}: {:<16} #{:<4} // {}",
                    instruction.pc,
                    instruction.mnemonic(),
                    index,
                    class_file.constant_pool.resolve(index).unwrap_or_default()
                ),
                None => println!("  {:>5}: {}", instruction.pc, instruction.mnemonic()),
            }
        }
        for attribute in &code.attributes {
            if let AttributeInfo::StackMapTable { entries, .. } = &attribute.info {
                for frame in entries {
                    println!("  frame {} +{}", frame.name(), frame.offset_delta());
                }
            }
        }
    }
    println!();

    for attribute in &class_file.attributes {
        println!(
            "Attribute: {} ({} bytes at offset {})",
            attribute.name, attribute.length.value, attribute.name_index.offset
        );
    }
}
