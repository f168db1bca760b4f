//! A bytecode interpreter for a single class file.
//!
//! An [`Interpreter`] is created from a [`ClassFile`](raw_class_file::ClassFile) loaded with [`raw_class_file`] and
//! runs its methods. Instructions are executed through a [`DispatchTable`] of handler functions indexed by opcode.
//! Calls between methods of the class run in new frames, a handful of library methods (printing, string
//! concatenation, the constructors of the builtin exceptions) are answered natively.
//!
//! ```
//! use dukevm::{Interpreter, Value, VmConfig};
//! use raw_class_file::attribute::CodeAttribute;
//! use raw_class_file::{flags, insn, AttributeInfo, ClassFile, ConstantPool, MethodInfo, PoolEntry};
//!
//! let mut pool = ConstantPool::new();
//! let name = pool.push(PoolEntry::utf8("Adder")).unwrap();
//! let this_class = pool.push(PoolEntry::Class { name_index: name }).unwrap();
//! let method_name = pool.push(PoolEntry::utf8("add")).unwrap();
//! let descriptor = pool.push(PoolEntry::utf8("(II)I")).unwrap();
//! let code_name = pool.push(PoolEntry::utf8("Code")).unwrap();
//!
//! let code = CodeAttribute {
//! 	max_stack: 2,
//! 	max_locals: 2,
//! 	code: vec![insn::iload_0, insn::iload_1, insn::iadd, insn::ireturn],
//! 	exception_table: Vec::new(),
//! 	attributes: Vec::new(),
//! };
//! let class = ClassFile {
//! 	minor_version: 0,
//! 	major_version: 52,
//! 	constant_pool: pool,
//! 	access_flags: flags::ACC_PUBLIC,
//! 	this_class,
//! 	super_class: 0,
//! 	interfaces: Vec::new(),
//! 	fields: Vec::new(),
//! 	methods: vec![MethodInfo {
//! 		access_flags: flags::ACC_PUBLIC | flags::ACC_STATIC,
//! 		name_index: method_name,
//! 		descriptor_index: descriptor,
//! 		attributes: vec![AttributeInfo { name_index: code_name, info: code.encode() }],
//! 	}],
//! 	attributes: Vec::new(),
//! };
//!
//! let mut interpreter = Interpreter::new(class, VmConfig::default())?;
//! let result = interpreter.run("add", "(II)I", &[Value::Int(40), Value::Int(2)])?;
//! assert_eq!(result, Some(Value::Int(42)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod dispatch;
mod error;
mod exception;
mod frame;
mod heap;
mod instructions;
mod interpreter;
mod method;
mod native;
mod resolve;
mod stack;
mod value;

pub use config::VmConfig;
pub use dispatch::{DispatchTable, Flow, Handler};
pub use error::{Fault, FaultSite, VmError};
pub use frame::{Frame, Locals};
pub use heap::{Array, ElementType, Elements, Heap, HeapObject, Instance};
pub use interpreter::Interpreter;
pub use method::Method;
pub use native::NativeBridge;
pub use resolve::ResolvedMethodHandle;
pub use stack::{OperandStack, Slot};
pub use value::{Handle, Value};
