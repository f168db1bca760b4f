mod common;

use pretty_assertions::assert_eq;
use dukevm::Value;
use raw_class_file::insn;
use common::{index, interpreter, offset, ClassBuilder};

#[test]
fn add_constants() {
	let class = ClassBuilder::new("Main")
		.static_method("run", "()I", 2, 0, vec![insn::iconst_1, insn::iconst_2, insn::iadd, insn::ireturn])
		.build();
	let (mut interpreter, _) = interpreter(class);

	assert_eq!(interpreter.run("run", "()I", &[]).unwrap(), Some(Value::Int(3)));
}

#[test]
fn double_constants_keep_their_bits() {
	let mut builder = ClassBuilder::new("Main");
	let pi = builder.double(std::f64::consts::PI);
	let nan = builder.double(f64::from_bits(0x7ff8_0000_dead_beef));
	let pi = [&[insn::ldc2_w][..], &index(pi), &[insn::dreturn]].concat();
	let nan = [&[insn::ldc2_w][..], &index(nan), &[insn::dreturn]].concat();
	let class = builder
		.static_method("pi", "()D", 1, 0, pi)
		.static_method("nan", "()D", 1, 0, nan)
		.build();
	let (mut interpreter, _) = interpreter(class);

	match interpreter.run("pi", "()D", &[]).unwrap() {
		Some(Value::Double(value)) => assert_eq!(value.to_bits(), std::f64::consts::PI.to_bits()),
		other => panic!("expected a double, got {other:?}"),
	}
	match interpreter.run("nan", "()D", &[]).unwrap() {
		Some(Value::Double(value)) => assert_eq!(value.to_bits(), 0x7ff8_0000_dead_beef),
		other => panic!("expected a double, got {other:?}"),
	}
}

#[test]
fn pool_constants() {
	let mut builder = ClassBuilder::new("Main");
	let big = builder.integer(100_000);
	let half = builder.float(0.5);
	let long = builder.long(-1 << 40);
	let int = [&[insn::ldc_w][..], &index(big), &[insn::bipush, 0xfe, insn::iadd, insn::ireturn]].concat();
	let float = vec![insn::ldc, half as u8, insn::fconst_2, insn::fmul, insn::freturn];
	let long = [&[insn::ldc2_w][..], &index(long), &[insn::lconst_1, insn::lsub, insn::lreturn]].concat();
	let class = builder
		.static_method("int", "()I", 2, 0, int)
		.static_method("float", "()F", 2, 0, float)
		.static_method("long", "()J", 2, 0, long)
		.static_method("short", "()I", 1, 0, vec![insn::sipush, 0x80, 0x00, insn::ireturn])
		.build();
	let (mut interpreter, _) = interpreter(class);

	assert_eq!(interpreter.run("int", "()I", &[]).unwrap(), Some(Value::Int(99_998)));
	assert_eq!(interpreter.run("float", "()F", &[]).unwrap(), Some(Value::Float(1.0)));
	assert_eq!(interpreter.run("long", "()J", &[]).unwrap(), Some(Value::Long((-1 << 40) - 1)));
	assert_eq!(interpreter.run("short", "()I", &[]).unwrap(), Some(Value::Int(-32768)));
}

#[test]
fn integer_arithmetic() {
	let class = ClassBuilder::new("Main")
		.static_method("div", "(II)I", 2, 2, vec![insn::iload_0, insn::iload_1, insn::idiv, insn::ireturn])
		.static_method("rem", "(II)I", 2, 2, vec![insn::iload_0, insn::iload_1, insn::irem, insn::ireturn])
		.static_method("shr", "(II)I", 2, 2, vec![insn::iload_0, insn::iload_1, insn::iushr, insn::ireturn])
		.static_method("mul", "(JJ)J", 2, 4, vec![insn::lload_0, insn::lload_2, insn::lmul, insn::lreturn])
		.static_method("lshl", "(JI)J", 2, 3, vec![insn::lload_0, insn::iload_2, insn::lshl, insn::lreturn])
		.build();
	let (mut interpreter, _) = interpreter(class);

	assert_eq!(interpreter.run("div", "(II)I", &[Value::Int(7), Value::Int(2)]).unwrap(), Some(Value::Int(3)));
	assert_eq!(interpreter.run("div", "(II)I", &[Value::Int(-7), Value::Int(2)]).unwrap(), Some(Value::Int(-3)));
	assert_eq!(interpreter.run("div", "(II)I", &[Value::Int(i32::MIN), Value::Int(-1)]).unwrap(), Some(Value::Int(i32::MIN)));
	assert_eq!(interpreter.run("rem", "(II)I", &[Value::Int(-7), Value::Int(2)]).unwrap(), Some(Value::Int(-1)));
	assert_eq!(interpreter.run("shr", "(II)I", &[Value::Int(-1), Value::Int(60)]).unwrap(), Some(Value::Int(0xf)));
	assert_eq!(interpreter.run("mul", "(JJ)J", &[Value::Long(i64::MAX), Value::Long(2)]).unwrap(), Some(Value::Long(-2)));
	assert_eq!(interpreter.run("lshl", "(JI)J", &[Value::Long(1), Value::Int(65)]).unwrap(), Some(Value::Long(2)));
}

#[test]
fn floating_point_division() {
	let class = ClassBuilder::new("Main")
		.static_method("div", "(DD)D", 2, 4, vec![insn::dload_0, insn::dload_2, insn::ddiv, insn::dreturn])
		.static_method("rem", "(DD)D", 2, 4, vec![insn::dload_0, insn::dload_2, insn::drem, insn::dreturn])
		.static_method("f2i", "(F)I", 1, 1, vec![insn::fload_0, insn::f2i, insn::ireturn])
		.build();
	let (mut interpreter, _) = interpreter(class);

	let div = |interpreter: &mut dukevm::Interpreter, a: f64, b: f64| match interpreter.run("div", "(DD)D", &[Value::Double(a), Value::Double(b)]).unwrap() {
		Some(Value::Double(value)) => value,
		other => panic!("expected a double, got {other:?}"),
	};
	assert_eq!(div(&mut interpreter, 1.0, 0.0), f64::INFINITY);
	assert_eq!(div(&mut interpreter, -1.0, 0.0), f64::NEG_INFINITY);
	assert!(div(&mut interpreter, 0.0, 0.0).is_nan());

	assert_eq!(interpreter.run("rem", "(DD)D", &[Value::Double(-5.5), Value::Double(2.0)]).unwrap(), Some(Value::Double(-1.5)));
	assert_eq!(interpreter.run("f2i", "(F)I", &[Value::Float(f32::NAN)]).unwrap(), Some(Value::Int(0)));
	assert_eq!(interpreter.run("f2i", "(F)I", &[Value::Float(1e20)]).unwrap(), Some(Value::Int(i32::MAX)));
}

#[test]
fn comparisons_with_nan() {
	let class = ClassBuilder::new("Main")
		.static_method("dcmpg", "(DD)I", 2, 4, vec![insn::dload_0, insn::dload_2, insn::dcmpg, insn::ireturn])
		.static_method("dcmpl", "(DD)I", 2, 4, vec![insn::dload_0, insn::dload_2, insn::dcmpl, insn::ireturn])
		.static_method("fcmpl", "(FF)I", 2, 2, vec![insn::fload_0, insn::fload_1, insn::fcmpl, insn::ireturn])
		.static_method("fcmpg", "(FF)I", 2, 2, vec![insn::fload_0, insn::fload_1, insn::fcmpg, insn::ireturn])
		.static_method("lcmp", "(JJ)I", 2, 4, vec![insn::lload_0, insn::lload_2, insn::lcmp, insn::ireturn])
		.build();
	let (mut interpreter, _) = interpreter(class);

	let nan = Value::Double(f64::NAN);
	let one = Value::Double(1.0);
	assert_eq!(interpreter.run("dcmpg", "(DD)I", &[nan, one]).unwrap(), Some(Value::Int(1)));
	assert_eq!(interpreter.run("dcmpl", "(DD)I", &[nan, one]).unwrap(), Some(Value::Int(-1)));
	assert_eq!(interpreter.run("dcmpg", "(DD)I", &[one, nan]).unwrap(), Some(Value::Int(1)));
	assert_eq!(interpreter.run("dcmpl", "(DD)I", &[one, nan]).unwrap(), Some(Value::Int(-1)));
	assert_eq!(interpreter.run("dcmpg", "(DD)I", &[nan, nan]).unwrap(), Some(Value::Int(1)));
	assert_eq!(interpreter.run("dcmpl", "(DD)I", &[nan, nan]).unwrap(), Some(Value::Int(-1)));
	assert_eq!(interpreter.run("dcmpg", "(DD)I", &[one, one]).unwrap(), Some(Value::Int(0)));
	assert_eq!(interpreter.run("dcmpl", "(DD)I", &[one, Value::Double(2.0)]).unwrap(), Some(Value::Int(-1)));
	assert_eq!(interpreter.run("fcmpl", "(FF)I", &[Value::Float(2.0), Value::Float(f32::NAN)]).unwrap(), Some(Value::Int(-1)));
	assert_eq!(interpreter.run("fcmpg", "(FF)I", &[Value::Float(2.0), Value::Float(f32::NAN)]).unwrap(), Some(Value::Int(1)));
	assert_eq!(interpreter.run("fcmpg", "(FF)I", &[Value::Float(f32::NAN), Value::Float(f32::NAN)]).unwrap(), Some(Value::Int(1)));
	assert_eq!(interpreter.run("lcmp", "(JJ)I", &[Value::Long(5), Value::Long(-5)]).unwrap(), Some(Value::Int(1)));
}

#[test]
fn branches() {
	let abs = [
		&[insn::iload_0, insn::ifge][..], &offset(6),
		&[insn::iload_0, insn::ineg, insn::ireturn],
		&[insn::iload_0, insn::ireturn],
	].concat();
	// sum of 1..=n, counting n down
	let sum = [
		&[insn::iconst_0, insn::istore_1][..],
		&[insn::iload_0, insn::ifle], &offset(13),
		&[insn::iload_1, insn::iload_0, insn::iadd, insn::istore_1],
		&[insn::iinc, 0, 0xff],
		&[insn::goto], &offset(-11),
		&[insn::iload_1, insn::ireturn],
	].concat();
	let class = ClassBuilder::new("Main")
		.static_method("abs", "(I)I", 1, 1, abs)
		.static_method("sum", "(I)I", 2, 2, sum)
		.build();
	let (mut interpreter, _) = interpreter(class);

	assert_eq!(interpreter.run("abs", "(I)I", &[Value::Int(-5)]).unwrap(), Some(Value::Int(5)));
	assert_eq!(interpreter.run("abs", "(I)I", &[Value::Int(3)]).unwrap(), Some(Value::Int(3)));
	assert_eq!(interpreter.run("sum", "(I)I", &[Value::Int(10)]).unwrap(), Some(Value::Int(55)));
	assert_eq!(interpreter.run("sum", "(I)I", &[Value::Int(0)]).unwrap(), Some(Value::Int(0)));
}

#[test]
fn switches() {
	// the switch opcode is at pc 1, so two bytes of padding follow it
	let table = [
		&[insn::iload_0, insn::tableswitch, 0, 0][..],
		&36i32.to_be_bytes(),
		&1i32.to_be_bytes(),
		&3i32.to_be_bytes(),
		&27i32.to_be_bytes(),
		&30i32.to_be_bytes(),
		&33i32.to_be_bytes(),
		&[insn::bipush, 10, insn::ireturn],
		&[insn::bipush, 20, insn::ireturn],
		&[insn::bipush, 30, insn::ireturn],
		&[insn::iconst_m1, insn::ireturn],
	].concat();
	let lookup = [
		&[insn::iload_0, insn::lookupswitch, 0, 0][..],
		&31i32.to_be_bytes(),
		&2i32.to_be_bytes(),
		&(-5i32).to_be_bytes(),
		&27i32.to_be_bytes(),
		&100i32.to_be_bytes(),
		&29i32.to_be_bytes(),
		&[insn::iconst_1, insn::ireturn],
		&[insn::iconst_2, insn::ireturn],
		&[insn::iconst_0, insn::ireturn],
	].concat();
	let class = ClassBuilder::new("Main")
		.static_method("table", "(I)I", 1, 1, table)
		.static_method("lookup", "(I)I", 1, 1, lookup)
		.build();
	let (mut interpreter, _) = interpreter(class);

	for (input, expected) in [(0, -1), (1, 10), (2, 20), (3, 30), (4, -1), (i32::MIN, -1)] {
		assert_eq!(interpreter.run("table", "(I)I", &[Value::Int(input)]).unwrap(), Some(Value::Int(expected)), "table({input})");
	}
	for (input, expected) in [(-5, 1), (100, 2), (0, 0), (99, 0)] {
		assert_eq!(interpreter.run("lookup", "(I)I", &[Value::Int(input)]).unwrap(), Some(Value::Int(expected)), "lookup({input})");
	}
}

#[test]
fn stack_shuffling() {
	let class = ClassBuilder::new("Main")
		.static_method("swap", "()I", 2, 0, vec![insn::iconst_1, insn::iconst_2, insn::swap, insn::isub, insn::ireturn])
		.static_method("dup2", "()I", 4, 0, vec![insn::lconst_1, insn::dup2, insn::ladd, insn::l2i, insn::ireturn])
		.static_method("dup_x1", "()I", 3, 0, vec![
			insn::iconst_5, insn::iconst_2, insn::dup_x1, // 2 5 2
			insn::isub, // 2 3
			insn::imul, // 6
			insn::ireturn,
		])
		.static_method("dup2_x1", "()J", 3, 0, vec![
			insn::iconst_3, insn::lconst_1, insn::dup2_x1, // 1L 3 1L
			insn::pop2, insn::pop, // 1L
			insn::lreturn,
		])
		.build();
	let (mut interpreter, _) = interpreter(class);

	assert_eq!(interpreter.run("swap", "()I", &[]).unwrap(), Some(Value::Int(1)));
	assert_eq!(interpreter.run("dup2", "()I", &[]).unwrap(), Some(Value::Int(2)));
	assert_eq!(interpreter.run("dup_x1", "()I", &[]).unwrap(), Some(Value::Int(6)));
	assert_eq!(interpreter.run("dup2_x1", "()J", &[]).unwrap(), Some(Value::Long(1)));
}

#[test]
fn wide_locals() {
	let code = [
		&[insn::sipush][..], &1234i16.to_be_bytes(),
		&[insn::wide, insn::istore, 0x01, 0x00],
		&[insn::wide, insn::iinc, 0x01, 0x00], &1000i16.to_be_bytes(),
		&[insn::wide, insn::iload, 0x01, 0x00],
		&[insn::ireturn],
	].concat();
	let class = ClassBuilder::new("Main")
		.static_method("run", "()I", 1, 300, code)
		.build();
	let (mut interpreter, _) = interpreter(class);

	assert_eq!(interpreter.run("run", "()I", &[]).unwrap(), Some(Value::Int(2234)));
}

#[test]
fn conversions() {
	let class = ClassBuilder::new("Main")
		.static_method("i2b", "(I)I", 1, 1, vec![insn::iload_0, insn::i2b, insn::ireturn])
		.static_method("i2c", "(I)I", 1, 1, vec![insn::iload_0, insn::i2c, insn::ireturn])
		.static_method("l2i", "(J)I", 2, 2, vec![insn::lload_0, insn::l2i, insn::ireturn])
		.static_method("d2l", "(D)J", 2, 2, vec![insn::dload_0, insn::d2l, insn::lreturn])
		.build();
	let (mut interpreter, _) = interpreter(class);

	assert_eq!(interpreter.run("i2b", "(I)I", &[Value::Int(200)]).unwrap(), Some(Value::Int(-56)));
	assert_eq!(interpreter.run("i2c", "(I)I", &[Value::Int(-1)]).unwrap(), Some(Value::Int(0xffff)));
	assert_eq!(interpreter.run("l2i", "(J)I", &[Value::Long(0x1_0000_0002)]).unwrap(), Some(Value::Int(2)));
	assert_eq!(interpreter.run("d2l", "(D)J", &[Value::Double(-2.9)]).unwrap(), Some(Value::Long(-2)));
	assert_eq!(interpreter.run("d2l", "(D)J", &[Value::Double(f64::NEG_INFINITY)]).unwrap(), Some(Value::Long(i64::MIN)));
}
