#![allow(dead_code)]

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use dukevm::{Interpreter, VmConfig};
use raw_class_file::attribute::{CodeAttribute, ExceptionHandler};
use raw_class_file::{flags, AttributeInfo, ClassFile, ConstantPool, FieldInfo, MethodInfo, PoolEntry};

const CONCAT_FACTORY_DESCRIPTOR: &str = "(Ljava/lang/invoke/MethodHandles$Lookup;Ljava/lang/String;\
	Ljava/lang/invoke/MethodType;Ljava/lang/String;[Ljava/lang/Object;)Ljava/lang/invoke/CallSite;";
const REF_INVOKE_STATIC: u8 = 6;

/// Assembles a class file for the tests, going through the binary format once in [`ClassBuilder::build`].
pub struct ClassBuilder {
	pool: ConstantPool,
	this_class: u16,
	super_class: u16,
	fields: Vec<FieldInfo>,
	methods: Vec<MethodInfo>,
	bootstrap_methods: Vec<(u16, Vec<u16>)>,
}

impl ClassBuilder {
	pub fn new(name: &str) -> ClassBuilder {
		let mut builder = ClassBuilder {
			pool: ConstantPool::new(),
			this_class: 0,
			super_class: 0,
			fields: Vec::new(),
			methods: Vec::new(),
			bootstrap_methods: Vec::new(),
		};
		builder.this_class = builder.class(name);
		builder.super_class = builder.class("java/lang/Object");
		builder
	}

	fn push(&mut self, entry: PoolEntry) -> u16 {
		self.pool.push(entry).expect("the constant pool should have room")
	}

	pub fn utf8(&mut self, string: &str) -> u16 {
		self.push(PoolEntry::utf8(string))
	}

	pub fn class(&mut self, name: &str) -> u16 {
		let name_index = self.utf8(name);
		self.push(PoolEntry::Class { name_index })
	}

	pub fn string(&mut self, string: &str) -> u16 {
		let string_index = self.utf8(string);
		self.push(PoolEntry::String { string_index })
	}

	pub fn integer(&mut self, value: i32) -> u16 {
		self.push(PoolEntry::Integer { bytes: value })
	}

	pub fn float(&mut self, value: f32) -> u16 {
		self.push(PoolEntry::Float { bytes: value.to_bits() })
	}

	pub fn long(&mut self, value: i64) -> u16 {
		self.push(PoolEntry::Long { bytes: value })
	}

	pub fn double(&mut self, value: f64) -> u16 {
		self.push(PoolEntry::Double { bytes: value.to_bits() })
	}

	pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
		let name_index = self.utf8(name);
		let descriptor_index = self.utf8(descriptor);
		self.push(PoolEntry::NameAndType { name_index, descriptor_index })
	}

	pub fn method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
		let class_index = self.class(class);
		let name_and_type_index = self.name_and_type(name, descriptor);
		self.push(PoolEntry::Methodref { class_index, name_and_type_index })
	}

	pub fn field_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
		let class_index = self.class(class);
		let name_and_type_index = self.name_and_type(name, descriptor);
		self.push(PoolEntry::Fieldref { class_index, name_and_type_index })
	}

	/// Adds a `makeConcatWithConstants` call site, giving the `InvokeDynamic` index.
	pub fn concat_call_site(&mut self, recipe: &str, descriptor: &str, constants: &[&str]) -> u16 {
		let factory = self.method_ref("java/lang/invoke/StringConcatFactory", "makeConcatWithConstants", CONCAT_FACTORY_DESCRIPTOR);
		let handle = self.push(PoolEntry::MethodHandle { reference_kind: REF_INVOKE_STATIC, reference_index: factory });
		let mut arguments = vec![self.string(recipe)];
		for constant in constants {
			arguments.push(self.string(constant));
		}
		let bootstrap_method_attr_index = self.bootstrap_methods.len() as u16;
		self.bootstrap_methods.push((handle, arguments));

		let name_and_type_index = self.name_and_type("makeConcatWithConstants", descriptor);
		self.push(PoolEntry::InvokeDynamic { bootstrap_method_attr_index, name_and_type_index })
	}

	pub fn field(&mut self, access_flags: u16, name: &str, descriptor: &str, constant_value: Option<u16>) -> &mut ClassBuilder {
		let name_index = self.utf8(name);
		let descriptor_index = self.utf8(descriptor);
		let mut attributes = Vec::new();
		if let Some(index) = constant_value {
			let attribute_name = self.utf8("ConstantValue");
			attributes.push(AttributeInfo { name_index: attribute_name, info: index.to_be_bytes().to_vec() });
		}
		self.fields.push(FieldInfo { access_flags, name_index, descriptor_index, attributes });
		self
	}

	pub fn method(&mut self, access_flags: u16, name: &str, descriptor: &str, code: CodeAttribute) -> &mut ClassBuilder {
		let name_index = self.utf8(name);
		let descriptor_index = self.utf8(descriptor);
		let code_name = self.utf8("Code");
		self.methods.push(MethodInfo {
			access_flags,
			name_index,
			descriptor_index,
			attributes: vec![AttributeInfo { name_index: code_name, info: code.encode() }],
		});
		self
	}

	pub fn static_method(&mut self, name: &str, descriptor: &str, max_stack: u16, max_locals: u16, code: Vec<u8>) -> &mut ClassBuilder {
		self.method(flags::ACC_PUBLIC | flags::ACC_STATIC, name, descriptor, code_attribute(max_stack, max_locals, code, Vec::new()))
	}

	pub fn build(&mut self) -> ClassFile {
		let mut attributes = Vec::new();
		if !self.bootstrap_methods.is_empty() {
			let mut info = Vec::new();
			info.extend_from_slice(&(self.bootstrap_methods.len() as u16).to_be_bytes());
			for (method_ref, arguments) in &self.bootstrap_methods {
				info.extend_from_slice(&method_ref.to_be_bytes());
				info.extend_from_slice(&(arguments.len() as u16).to_be_bytes());
				for argument in arguments {
					info.extend_from_slice(&argument.to_be_bytes());
				}
			}
			let name_index = self.utf8("BootstrapMethods");
			attributes.push(AttributeInfo { name_index, info });
		}

		let class = ClassFile {
			minor_version: 0,
			major_version: 61,
			constant_pool: self.pool.clone(),
			access_flags: flags::ACC_PUBLIC | flags::ACC_SUPER,
			this_class: self.this_class,
			super_class: self.super_class,
			interfaces: Vec::new(),
			fields: self.fields.clone(),
			methods: self.methods.clone(),
			attributes,
		};
		let bytes = class.to_bytes().expect("the built class should be writable");
		ClassFile::load(&bytes).expect("the built class should load")
	}
}

pub fn code_attribute(max_stack: u16, max_locals: u16, code: Vec<u8>, exception_table: Vec<ExceptionHandler>) -> CodeAttribute {
	CodeAttribute { max_stack, max_locals, code, exception_table, attributes: Vec::new() }
}

/// Collects what the interpreted program prints.
#[derive(Clone, Default)]
pub struct Output(Rc<RefCell<Vec<u8>>>);

impl Output {
	pub fn contents(&self) -> String {
		String::from_utf8(self.0.borrow().clone()).expect("output should be UTF-8")
	}
}

impl Write for Output {
	fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
		self.0.borrow_mut().write(buf)
	}

	fn flush(&mut self) -> std::io::Result<()> {
		Ok(())
	}
}

pub fn interpreter(class: ClassFile) -> (Interpreter, Output) {
	interpreter_with(class, VmConfig::default())
}

pub fn interpreter_with(class: ClassFile, config: VmConfig) -> (Interpreter, Output) {
	let output = Output::default();
	let interpreter = Interpreter::new(class, config)
		.expect("the interpreter should start")
		.with_output(Box::new(output.clone()));
	(interpreter, output)
}

/// Big endian bytes of a branch offset, for writing bytecode by hand.
pub fn offset(offset: i16) -> [u8; 2] {
	offset.to_be_bytes()
}

pub fn index(index: u16) -> [u8; 2] {
	index.to_be_bytes()
}
