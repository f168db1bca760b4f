//! Primitive conversions.
//!
//! Floating point to integer conversions saturate and turn NaN into zero, which is exactly what `as` does.

use raw_class_file::insn;
use crate::dispatch::DispatchTable;

macro_rules! convert {
	($table:ident, $opcode:expr, $pop:ident => $push:ident, |$value:ident| $conversion:expr) => {
		$table.set($opcode, |_, frame| {
			let $value = frame.stack.$pop()?;
			frame.stack.$push($conversion)?;
			Ok(frame.advance(1))
		});
	};
}

pub(super) fn register(table: &mut DispatchTable) {
	convert!(table, insn::i2l, pop_int => push_long, |value| value as i64);
	convert!(table, insn::i2f, pop_int => push_float, |value| value as f32);
	convert!(table, insn::i2d, pop_int => push_double, |value| value as f64);
	convert!(table, insn::l2i, pop_long => push_int, |value| value as i32);
	convert!(table, insn::l2f, pop_long => push_float, |value| value as f32);
	convert!(table, insn::l2d, pop_long => push_double, |value| value as f64);
	convert!(table, insn::f2i, pop_float => push_int, |value| value as i32);
	convert!(table, insn::f2l, pop_float => push_long, |value| value as i64);
	convert!(table, insn::f2d, pop_float => push_double, |value| value as f64);
	convert!(table, insn::d2i, pop_double => push_int, |value| value as i32);
	convert!(table, insn::d2l, pop_double => push_long, |value| value as i64);
	convert!(table, insn::d2f, pop_double => push_float, |value| value as f32);
	convert!(table, insn::i2b, pop_int => push_int, |value| value as i8 as i32);
	convert!(table, insn::i2c, pop_int => push_int, |value| value as u16 as i32);
	convert!(table, insn::i2s, pop_int => push_int, |value| value as i16 as i32);
}
