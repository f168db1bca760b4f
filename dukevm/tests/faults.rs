mod common;

use pretty_assertions::assert_eq;
use dukevm::{FaultSite, HeapObject, Value, VmConfig, VmError};
use raw_class_file::insn;
use common::{index, interpreter, interpreter_with, offset, ClassBuilder};

#[test]
fn array_store_out_of_bounds() {
	let class = ClassBuilder::new("Main")
		.static_method("run", "()V", 3, 1, vec![
			insn::iconst_5, insn::newarray, 10, // int[5]
			insn::astore_0,
			insn::aload_0, insn::bipush, 10, insn::iconst_1, insn::iastore,
			insn::r#return,
		])
		.build();
	let (mut interpreter, _) = interpreter(class);

	let fault = interpreter.run("run", "()V", &[]).unwrap_err();
	assert!(matches!(fault.error, VmError::ArrayIndexOutOfBounds { index: 10, length: 5 }), "{fault}");
	assert_eq!(fault.trace.len(), 1);
	assert_eq!(fault.trace[0].opcode, insn::iastore);
	assert_eq!(fault.trace[0].pc, 8);
	assert_eq!(fault.trace[0].method, "run()V");

	let arrays: Vec<_> = interpreter.heap().iter()
		.filter_map(|(_, object)| match object {
			HeapObject::Array(array) => Some(array),
			_ => None,
		})
		.collect();
	assert_eq!(arrays.len(), 1);
	assert_eq!(arrays[0].length(), 5);
	for i in 0..5 {
		assert_eq!(arrays[0].load(i).unwrap(), Value::Int(0));
	}
}

#[test]
fn division_by_zero() {
	let class = ClassBuilder::new("Main")
		.static_method("idiv", "(II)I", 2, 2, vec![insn::iload_0, insn::iload_1, insn::idiv, insn::ireturn])
		.static_method("lrem", "(JJ)J", 2, 4, vec![insn::lload_0, insn::lload_2, insn::lrem, insn::lreturn])
		.build();
	let (mut interpreter, _) = interpreter(class);

	let fault = interpreter.run("idiv", "(II)I", &[Value::Int(1), Value::Int(0)]).unwrap_err();
	assert!(matches!(fault.error, VmError::DivisionByZero));
	assert_eq!(fault.error.exception_class(), Some("java/lang/ArithmeticException"));
	assert_eq!(fault.trace[0].pc, 2);

	let fault = interpreter.run("lrem", "(JJ)J", &[Value::Long(1), Value::Long(0)]).unwrap_err();
	assert!(matches!(fault.error, VmError::DivisionByZero));
}

#[test]
fn stack_overflow() {
	let class = ClassBuilder::new("Main")
		.static_method("run", "()I", 1, 0, vec![insn::iconst_1, insn::iconst_1, insn::iadd, insn::ireturn])
		.build();
	let (mut interpreter, _) = interpreter(class);

	let fault = interpreter.run("run", "()I", &[]).unwrap_err();
	assert!(matches!(fault.error, VmError::StackOverflow { max: 1 }));
	assert_eq!(fault.trace[0].pc, 1);
	assert_eq!(fault.trace[0].stack_depth, 1);
}

#[test]
fn stack_underflow_and_category_mismatch() {
	let class = ClassBuilder::new("Main")
		.static_method("underflow", "()I", 1, 0, vec![insn::iadd, insn::ireturn])
		.static_method("mismatch", "()I", 2, 0, vec![insn::lconst_1, insn::ireturn])
		.static_method("pop", "()V", 2, 0, vec![insn::lconst_1, insn::pop, insn::r#return])
		.build();
	let (mut interpreter, _) = interpreter(class);

	assert!(matches!(interpreter.run("underflow", "()I", &[]).unwrap_err().error, VmError::StackUnderflow));
	assert!(matches!(interpreter.run("mismatch", "()I", &[]).unwrap_err().error, VmError::CategoryMismatch { expected: 1 }));
	assert!(matches!(interpreter.run("pop", "()V", &[]).unwrap_err().error, VmError::CategoryMismatch { .. }));
}

#[test]
fn negative_array_size() {
	let class = ClassBuilder::new("Main")
		.static_method("run", "()V", 1, 0, vec![insn::iconst_m1, insn::newarray, 10, insn::pop, insn::r#return])
		.build();
	let (mut interpreter, _) = interpreter(class);

	let fault = interpreter.run("run", "()V", &[]).unwrap_err();
	assert!(matches!(fault.error, VmError::NegativeArraySize { size: -1 }));
	assert!(interpreter.heap().is_empty());
}

#[test]
fn unknown_opcodes() {
	let class = ClassBuilder::new("Main")
		.static_method("breakpoint", "()V", 0, 0, vec![insn::breakpoint])
		.static_method("jsr", "()V", 1, 0, [&[insn::jsr][..], &offset(3), &[insn::r#return]].concat())
		.static_method("unassigned", "()V", 0, 0, vec![0xe0])
		.build();
	let (mut interpreter, _) = interpreter(class);

	assert!(matches!(interpreter.run("breakpoint", "()V", &[]).unwrap_err().error, VmError::UnknownOpcode { opcode: 0xca }));
	assert!(matches!(interpreter.run("jsr", "()V", &[]).unwrap_err().error, VmError::UnknownOpcode { opcode: 0xa8 }));
	assert!(matches!(interpreter.run("unassigned", "()V", &[]).unwrap_err().error, VmError::UnknownOpcode { opcode: 0xe0 }));
}

#[test]
fn branch_out_of_code() {
	let class = ClassBuilder::new("Main")
		.static_method("backwards", "()V", 0, 0, [&[insn::nop, insn::goto][..], &offset(-2)].concat())
		.static_method("fall_off", "()V", 0, 0, vec![insn::nop])
		.build();
	let (mut interpreter, _) = interpreter(class);

	assert!(matches!(interpreter.run("backwards", "()V", &[]).unwrap_err().error, VmError::PcOutOfRange { pc: -1, length: 4 }));

	let fault = interpreter.run("fall_off", "()V", &[]).unwrap_err();
	assert!(matches!(fault.error, VmError::PcOutOfRange { pc: 1, length: 1 }));
	assert_eq!(fault.trace, vec![FaultSite { method: "fall_off()V".to_owned(), opcode: insn::nop, pc: 0, stack_depth: 0 }]);
}

#[test]
fn null_references() {
	let class = ClassBuilder::new("Main")
		.static_method("length", "()I", 1, 0, vec![insn::aconst_null, insn::arraylength, insn::ireturn])
		.static_method("throw", "()V", 1, 0, vec![insn::aconst_null, insn::athrow])
		.build();
	let (mut interpreter, _) = interpreter(class);

	let fault = interpreter.run("length", "()I", &[]).unwrap_err();
	assert!(matches!(fault.error, VmError::NullReference));
	assert_eq!(fault.error.exception_class(), Some("java/lang/NullPointerException"));
	assert!(matches!(interpreter.run("throw", "()V", &[]).unwrap_err().error, VmError::NullReference));
}

#[test]
fn class_cast() {
	let mut builder = ClassBuilder::new("Main");
	let string = builder.string("text");
	let integer = builder.class("java/lang/Integer");
	let object = builder.class("java/lang/Object");
	let bad = [&[insn::ldc, string as u8, insn::checkcast][..], &index(integer), &[insn::areturn]].concat();
	let good = [&[insn::ldc, string as u8, insn::checkcast][..], &index(object), &[insn::areturn]].concat();
	let instance = [&[insn::ldc, string as u8, insn::instanceof][..], &index(integer), &[insn::ireturn]].concat();
	let class = builder
		.static_method("bad", "()Ljava/lang/Object;", 1, 0, bad)
		.static_method("good", "()Ljava/lang/Object;", 1, 0, good)
		.static_method("instance", "()I", 1, 0, instance)
		.build();
	let (mut interpreter, _) = interpreter(class);

	let fault = interpreter.run("bad", "()Ljava/lang/Object;", &[]).unwrap_err();
	match fault.error {
		VmError::ClassCast { from, to } => {
			assert_eq!(from, "java/lang/String");
			assert_eq!(to, "java/lang/Integer");
		},
		error => panic!("expected a class cast error, got {error}"),
	}
	assert!(matches!(interpreter.run("good", "()Ljava/lang/Object;", &[]).unwrap(), Some(Value::Reference(Some(_)))));
	assert_eq!(interpreter.run("instance", "()I", &[]).unwrap(), Some(Value::Int(0)));
}

#[test]
fn call_depth() {
	let mut builder = ClassBuilder::new("Main");
	let recurse = builder.method_ref("Main", "recurse", "()V");
	let code = [&[insn::invokestatic][..], &index(recurse), &[insn::r#return]].concat();
	let class = builder
		.static_method("recurse", "()V", 0, 0, code)
		.build();
	let config = VmConfig { max_call_depth: 100, ..VmConfig::default() };
	let (mut interpreter, _) = interpreter_with(class, config);

	let fault = interpreter.run("recurse", "()V", &[]).unwrap_err();
	assert!(matches!(fault.error, VmError::CallDepthExceeded { max: 100 }));
	assert_eq!(fault.trace.len(), 100);
	assert!(fault.trace.iter().all(|site| site.opcode == insn::invokestatic && site.method == "recurse()V"));
}

#[test]
fn unresolved_method() {
	let mut builder = ClassBuilder::new("Main");
	let max = builder.method_ref("java/lang/Math", "max", "(II)I");
	let code = [&[insn::iconst_1, insn::iconst_2, insn::invokestatic][..], &index(max), &[insn::ireturn]].concat();
	let class = builder
		.static_method("run", "()I", 2, 0, code)
		.build();
	let (mut interpreter, _) = interpreter(class);

	match interpreter.run("run", "()I", &[]).unwrap_err().error {
		VmError::UnresolvedMethod { class, name, descriptor } => {
			assert_eq!(class, "java/lang/Math");
			assert_eq!(name, "max");
			assert_eq!(descriptor, "(II)I");
		},
		error => panic!("expected an unresolved method, got {error}"),
	}
}

#[test]
fn missing_method() {
	let class = ClassBuilder::new("Main")
		.static_method("run", "()V", 0, 0, vec![insn::r#return])
		.build();
	let (mut interpreter, _) = interpreter(class);

	assert!(matches!(interpreter.run("run", "()I", &[]).unwrap_err().error, VmError::Decode(_)));
}
