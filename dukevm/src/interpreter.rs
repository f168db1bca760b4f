use std::io::Write;
use std::rc::Rc;
use indexmap::IndexMap;
use log::{debug, info, log_enabled, trace, Level};
use raw_class_file::attribute::BootstrapMethod;
use raw_class_file::descriptor::FieldType;
use raw_class_file::disassemble::disassemble;
use raw_class_file::{ClassFile, DecodeError, PoolEntry};
use crate::config::VmConfig;
use crate::dispatch::{DispatchTable, Flow};
use crate::error::{Fault, FaultSite, VmError};
use crate::frame::Frame;
use crate::heap::Heap;
use crate::method::Method;
use crate::resolve::ResolvedMethodHandle;
use crate::value::{Handle, Value};

/// An interpreter session for one loaded class.
///
/// The session owns the class file, the dispatch table and the heap. Methods of the class are run with
/// [`Interpreter::run`], calls to other methods of the class recurse into new frames, calls to a few well known
/// library methods are answered by native bridges.
pub struct Interpreter {
	pub(crate) class: ClassFile,
	pub(crate) class_name: String,
	pub(crate) super_name: Option<String>,
	table: DispatchTable,
	pub(crate) heap: Heap,
	config: VmConfig,
	/// Decoded methods, by their index in the class file.
	methods: Vec<Option<Rc<Method>>>,
	/// Resolved `Methodref`, `InterfaceMethodref` and `InvokeDynamic` entries, by their pool index.
	pub(crate) resolved: IndexMap<u16, ResolvedMethodHandle>,
	pub(crate) bootstrap_methods: Vec<BootstrapMethod>,
	pub(crate) statics: IndexMap<String, Value>,
	strings: IndexMap<String, Handle>,
	system_out: Option<Handle>,
	pub(crate) out: Box<dyn Write>,
	depth: usize,
	initialized: bool,
}

impl Interpreter {
	/// Starts a session, writing program output to stdout.
	pub fn new(class: ClassFile, config: VmConfig) -> Result<Interpreter, VmError> {
		let class_name = class.name()?;
		let super_name = class.super_name()?;
		let bootstrap_methods = class.bootstrap_methods()?;

		let mut interpreter = Interpreter {
			class_name,
			super_name,
			table: DispatchTable::new(),
			heap: Heap::with_capacity(config.initial_heap_capacity),
			methods: vec![None; class.methods.len()],
			resolved: IndexMap::new(),
			bootstrap_methods,
			statics: IndexMap::new(),
			strings: IndexMap::new(),
			system_out: None,
			out: Box::new(std::io::stdout()),
			depth: 0,
			initialized: false,
			class,
			config,
		};
		interpreter.initialize_statics()?;

		info!("loaded class {} with {} methods", interpreter.class_name, interpreter.class.methods.len());

		Ok(interpreter)
	}

	/// Sends everything the program prints to `out` instead of stdout.
	pub fn with_output(mut self, out: Box<dyn Write>) -> Interpreter {
		self.out = out;
		self
	}

	pub fn class(&self) -> &ClassFile {
		&self.class
	}

	pub fn class_name(&self) -> &str {
		&self.class_name
	}

	pub fn heap(&self) -> &Heap {
		&self.heap
	}

	pub fn config(&self) -> &VmConfig {
		&self.config
	}

	pub fn table(&self) -> &DispatchTable {
		&self.table
	}

	/// The current value of a static field of the class.
	pub fn get_static(&self, name: &str) -> Option<Value> {
		self.statics.get(name).copied()
	}

	/// Allocates a `java/lang/String[]` holding the given strings, as passed to `main`.
	pub fn new_string_array(&mut self, strings: &[String]) -> Result<Value, VmError> {
		let length = i32::try_from(strings.len()).map_err(|_| VmError::HeapExhausted)?;
		let array = self.heap.allocate_references(length, "java/lang/String".to_owned())?;
		for (i, string) in strings.iter().enumerate() {
			let string = self.heap.allocate_string(string.clone())?;
			self.heap.array_mut(Some(array))?.store(i as i32, Value::Reference(Some(string)))?;
		}
		Ok(Value::Reference(Some(array)))
	}

	/// Renders a value of the given type the way `String.valueOf` would.
	pub fn display(&self, value: Value, field_type: &FieldType) -> Result<String, VmError> {
		crate::native::to_java_string(self, value, field_type)
	}

	/// Sets static fields to their `ConstantValue`, or to zero.
	fn initialize_statics(&mut self) -> Result<(), VmError> {
		for i in 0..self.class.fields.len() {
			let field = &self.class.fields[i];
			if !field.is_static() {
				continue;
			}
			let pool = &self.class.constant_pool;
			let name = field.name(pool)?;
			let field_type = FieldType::parse(&field.descriptor(pool)?)?;

			let value = match field.constant_value(pool)? {
				Some(index) => match pool.get(index)? {
					PoolEntry::Integer { bytes } => Value::Int(*bytes),
					PoolEntry::Long { bytes } => Value::Long(*bytes),
					PoolEntry::Float { bytes } => Value::Float(f32::from_bits(*bytes)),
					PoolEntry::Double { bytes } => Value::Double(f64::from_bits(*bytes)),
					PoolEntry::String { .. } => {
						let string = pool.get_string(index)?;
						Value::Reference(Some(self.intern(string)?))
					},
					entry => return Err(VmError::UnsupportedConstant { index, kind: entry.kind() }),
				},
				None => Value::default_for(&field_type),
			};
			self.statics.insert(name, value);
		}
		Ok(())
	}

	/// Gives the string object for a string constant, the same one each time.
	pub(crate) fn intern(&mut self, string: String) -> Result<Handle, VmError> {
		if let Some(&handle) = self.strings.get(&string) {
			return Ok(handle);
		}
		let handle = self.heap.allocate_string(string.clone())?;
		self.strings.insert(string, handle);
		Ok(handle)
	}

	/// The object `java/lang/System.out` refers to.
	pub(crate) fn system_out(&mut self) -> Result<Handle, VmError> {
		match self.system_out {
			Some(handle) => Ok(handle),
			None => {
				let handle = self.heap.allocate_instance("java/io/PrintStream".to_owned())?;
				self.system_out = Some(handle);
				Ok(handle)
			},
		}
	}

	/// Gives the decoded method at `index` in the class file, decoding its `Code` attribute on first use.
	pub(crate) fn method(&mut self, index: usize) -> Result<Rc<Method>, VmError> {
		if let Some(Some(method)) = self.methods.get(index) {
			return Ok(method.clone());
		}
		let info = self.class.methods.get(index)
			.ok_or_else(|| DecodeError::MissingCode { method: format!("#{index}") })?;
		let method = Rc::new(Method::load(&self.class, index, info)?);
		debug!("decoded method {}: max_stack {}, max_locals {}, {} bytes of code",
			method.signature(), method.code.max_stack, method.code.max_locals, method.code.code.len());
		self.methods[index] = Some(method.clone());
		Ok(method)
	}

	pub(crate) fn find_method(&mut self, name: &str, descriptor: &str) -> Result<Option<Rc<Method>>, VmError> {
		match self.class.find_method(name, descriptor)? {
			Some((index, _)) => self.method(index).map(Some),
			None => Ok(None),
		}
	}

	/// Runs `<clinit>`, if the class has one and it didn't run yet.
	fn initialize(&mut self) -> Result<(), Fault> {
		if self.initialized {
			return Ok(());
		}
		self.initialized = true;
		if let Some(method) = self.find_method("<clinit>", "()V")? {
			debug!("running static initializer");
			self.invoke(method, &[])?;
		}
		Ok(())
	}

	/// Runs the method with the given name and descriptor to completion.
	///
	/// `arguments` fill the local variables from slot `0` on, for instance methods the first argument is `this`.
	/// Gives the returned value, or `None` for `void` methods.
	pub fn run(&mut self, name: &str, descriptor: &str, arguments: &[Value]) -> Result<Option<Value>, Fault> {
		self.initialize()?;

		let method = self.find_method(name, descriptor)?
			.ok_or_else(|| DecodeError::MissingCode { method: format!("{name}{descriptor}") })?;

		if self.config.disassemble_before_run && log_enabled!(Level::Debug) {
			debug!("disassembly of {}:", method.signature());
			for instruction in disassemble(&method.code.code)? {
				debug!("{instruction}");
			}
		}

		let result = self.invoke(method, arguments);
		self.out.flush()?;
		result
	}

	/// Runs a method of the class in a new frame.
	pub(crate) fn invoke(&mut self, method: Rc<Method>, arguments: &[Value]) -> Result<Option<Value>, Fault> {
		if self.depth >= self.config.max_call_depth {
			return Err(VmError::CallDepthExceeded { max: self.config.max_call_depth }.into());
		}

		let mut frame = Frame::new(method);
		frame.locals.store_arguments(arguments)?;

		self.depth += 1;
		debug!("entering {} at depth {}", frame.method.signature(), self.depth);
		let result = self.execute(&mut frame);
		debug!("leaving {} at depth {}", frame.method.signature(), self.depth);
		self.depth -= 1;

		result
	}

	/// The fetch, decode, execute loop of one frame.
	fn execute(&mut self, frame: &mut Frame) -> Result<Option<Value>, Fault> {
		// the instruction that ran, for a trace when the next fetch falls off the end of the code
		let mut previous = (frame.pc, raw_class_file::insn::nop);
		loop {
			let pc = frame.pc;
			let opcode = match frame.opcode() {
				Ok(opcode) => opcode,
				Err(error) => {
					let (pc, opcode) = previous;
					let mut fault = Fault::from(error);
					fault.trace.push(FaultSite {
						method: frame.method.signature(),
						opcode,
						pc,
						stack_depth: frame.stack.depth(),
					});
					return Err(fault);
				},
			};
			previous = (pc, opcode);
			trace!("{} {pc:>5}: {} (stack depth {})",
				frame.method.name, raw_class_file::insn::mnemonic(opcode).unwrap_or("<unknown>"), frame.stack.depth());

			let handler = self.table.get(opcode);
			match handler(self, frame) {
				Ok(Flow::Continue) => {},
				Ok(Flow::Return(value)) => return Ok(value),
				Err(mut fault) => {
					if let Some(handler_pc) = self.find_handler(frame, pc, &mut fault) {
						debug!("{} at pc {pc} in {} is handled at pc {handler_pc}", fault.error, frame.method.signature());
						frame.stack.clear();
						frame.stack.push_reference(fault.thrown)?;
						frame.pc = handler_pc as usize;
						continue;
					}

					fault.trace.push(FaultSite {
						method: frame.method.signature(),
						opcode,
						pc,
						stack_depth: frame.stack.depth(),
					});
					return Err(fault);
				},
			}
		}
	}
}
