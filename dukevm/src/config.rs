/// Settings of an [`Interpreter`](crate::Interpreter) session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmConfig {
	/// How many frames may be active at once before [`VmError::CallDepthExceeded`](crate::VmError::CallDepthExceeded).
	pub max_call_depth: usize,
	/// The number of heap objects to reserve space for up front.
	pub initial_heap_capacity: usize,
	/// Log a disassembly of the method passed to [`Interpreter::run`](crate::Interpreter::run) before running it.
	pub disassemble_before_run: bool,
}

impl Default for VmConfig {
	fn default() -> Self {
		VmConfig {
			max_call_depth: 512,
			initial_heap_capacity: 64,
			disassemble_before_run: false,
		}
	}
}
