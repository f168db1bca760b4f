//! The instruction handlers, one module per instruction family.
//!
//! Every module has a `register` function putting its handlers into the [`DispatchTable`]. Opcodes no module
//! registers keep trapping with [`VmError::UnknownOpcode`](crate::VmError::UnknownOpcode), these are `jsr`, `ret`,
//! `multianewarray`, `breakpoint`, `impdep1`, `impdep2` and the unassigned ones.

use crate::dispatch::DispatchTable;

mod arrays;
mod compare;
mod constants;
mod control;
mod conversions;
mod invoke;
mod locals;
mod math;
mod objects;
mod operand;

pub(crate) fn register(table: &mut DispatchTable) {
	constants::register(table);
	locals::register(table);
	operand::register(table);
	math::register(table);
	conversions::register(table);
	compare::register(table);
	control::register(table);
	arrays::register(table);
	objects::register(table);
	invoke::register(table);
}
