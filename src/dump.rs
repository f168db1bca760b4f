use std::io::Write;
use anyhow::{Context, Result};
use raw_class_file::attribute::CodeAttribute;
use raw_class_file::disassemble::disassemble;
use raw_class_file::{access, AttributeInfo, ClassFile, ConstantPool, PoolEntry};

/// Writes a human readable listing of the whole class file.
pub(crate) fn dump(class: &ClassFile, out: &mut impl Write) -> Result<()> {
	let pool = &class.constant_pool;

	writeln!(out, "magic: {:#010x}", ClassFile::MAGIC)?;
	writeln!(out, "version: {}.{}", class.major_version, class.minor_version)?;
	writeln!(out, "access: {:#06x} {}", class.access_flags, access::class_flags(class.access_flags).join(" "))?;
	writeln!(out, "this class: {}", class.name()?)?;
	match class.super_name()? {
		Some(super_name) => writeln!(out, "super class: {super_name}")?,
		None => writeln!(out, "super class: none")?,
	}
	for &interface in &class.interfaces {
		writeln!(out, "interface: {}", pool.get_class_name(interface)?)?;
	}

	writeln!(out, "constant pool count: {}", pool.count())?;
	for (index, _) in pool.iter() {
		writeln!(out, "{:>6} = {}", format!("#{index}"), render_entry(pool, index))?;
	}

	writeln!(out, "fields ({}):", class.fields.len())?;
	for field in &class.fields {
		let name = field.name(pool)?;
		writeln!(out, "  {} {name}: {}", access::field_flags(field.access_flags).join(" "), field.descriptor(pool)?)?;
		if let Some(index) = field.constant_value(pool).with_context(|| format!("in field {name}"))? {
			writeln!(out, "    ConstantValue: #{index} {}", render_entry(pool, index))?;
		}
	}

	writeln!(out, "methods ({}):", class.methods.len())?;
	for method in &class.methods {
		let name = method.name(pool)?;
		let descriptor = method.descriptor(pool)?;
		writeln!(out, "  {} {name}{descriptor}", access::method_flags(method.access_flags).join(" "))?;
		if method.is_abstract() || method.is_native() {
			continue;
		}
		let code = method.code(pool)
			.with_context(|| format!("failed to decode the code of {name}{descriptor}"))?;
		dump_code(pool, &code, out)
			.with_context(|| format!("failed to dump the code of {name}{descriptor}"))?;
	}

	writeln!(out, "attributes ({}):", class.attributes.len())?;
	dump_attributes(pool, &class.attributes, out)?;
	if let Some(source_file) = class.source_file()? {
		writeln!(out, "source file: {source_file}")?;
	}
	Ok(())
}

fn dump_code(pool: &ConstantPool, code: &CodeAttribute, out: &mut impl Write) -> Result<()> {
	writeln!(out, "    max stack: {}, max locals: {}, code length: {}", code.max_stack, code.max_locals, code.code.len())?;
	for instruction in disassemble(&code.code)? {
		writeln!(out, "    {instruction}")?;
	}

	if !code.exception_table.is_empty() {
		writeln!(out, "    exception table:")?;
		for handler in &code.exception_table {
			let catch_type = if handler.is_catch_all() {
				"any".to_owned()
			} else {
				pool.get_class_name(handler.catch_type)?
			};
			writeln!(out, "      {} to {} -> {}: {catch_type}", handler.start_pc, handler.end_pc, handler.handler_pc)?;
		}
	}

	let line_numbers = code.line_numbers(pool)?;
	if !line_numbers.is_empty() {
		writeln!(out, "    line numbers:")?;
		for line in line_numbers {
			writeln!(out, "      line {}: {}", line.line_number, line.start_pc)?;
		}
	}
	Ok(())
}

fn dump_attributes(pool: &ConstantPool, attributes: &[AttributeInfo], out: &mut impl Write) -> Result<()> {
	for attribute in attributes {
		writeln!(out, "  {} ({} bytes)", attribute.name(pool)?, attribute.info.len())?;
	}
	Ok(())
}

/// Renders an entry with the entries it points to resolved, like `Methodref #1.#4 // a/B.c()V`.
fn render_entry(pool: &ConstantPool, index: u16) -> String {
	let entry = match pool.get(index) {
		Ok(entry) => entry,
		Err(e) => return format!("<{e}>"),
	};
	let resolved = |result: Result<String, raw_class_file::PoolError>| {
		result.unwrap_or_else(|e| format!("<{e}>"))
	};
	let name_and_type = |index| {
		resolved(pool.get_name_and_type(index).map(|(name, descriptor)| format!("{name}:{descriptor}")))
	};
	let kind = entry.kind();
	match *entry {
		PoolEntry::Class { name_index } => format!("{kind} #{name_index} // {}", resolved(pool.get_utf8(name_index))),
		PoolEntry::Fieldref { class_index, name_and_type_index }
		| PoolEntry::Methodref { class_index, name_and_type_index }
		| PoolEntry::InterfaceMethodref { class_index, name_and_type_index } => {
			format!("{kind} #{class_index}.#{name_and_type_index} // {}.{}",
				resolved(pool.get_class_name(class_index)), name_and_type(name_and_type_index))
		},
		PoolEntry::String { string_index } => format!("{kind} #{string_index} // {:?}", resolved(pool.get_utf8(string_index))),
		PoolEntry::Integer { bytes } => format!("{kind} {bytes}"),
		PoolEntry::Float { bytes } => format!("{kind} {}f", f32::from_bits(bytes)),
		PoolEntry::Long { bytes } => format!("{kind} {bytes}l"),
		PoolEntry::Double { bytes } => format!("{kind} {}d", f64::from_bits(bytes)),
		PoolEntry::NameAndType { name_index, descriptor_index } => {
			format!("{kind} #{name_index}:#{descriptor_index} // {}:{}",
				resolved(pool.get_utf8(name_index)), resolved(pool.get_utf8(descriptor_index)))
		},
		PoolEntry::Utf8 { .. } => format!("{kind} {:?}", resolved(pool.get_utf8(index))),
		PoolEntry::MethodHandle { reference_kind, reference_index } => {
			let member = pool.get_member_ref(reference_index)
				.map(|member| format!("{}.{}{}", member.class, member.name, member.descriptor))
				.unwrap_or_else(|e| format!("<{e}>"));
			format!("{kind} {reference_kind}:#{reference_index} // {member}")
		},
		PoolEntry::MethodType { descriptor_index } => {
			format!("{kind} #{descriptor_index} // {}", resolved(pool.get_utf8(descriptor_index)))
		},
		PoolEntry::Dynamic { bootstrap_method_attr_index, name_and_type_index }
		| PoolEntry::InvokeDynamic { bootstrap_method_attr_index, name_and_type_index } => {
			format!("{kind} #{bootstrap_method_attr_index}:#{name_and_type_index} // {}", name_and_type(name_and_type_index))
		},
		PoolEntry::Module { name_index } | PoolEntry::Package { name_index } => {
			format!("{kind} #{name_index} // {}", resolved(pool.get_utf8(name_index)))
		},
	}
}
