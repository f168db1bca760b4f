use std::rc::Rc;
use log::debug;
use raw_class_file::descriptor::MethodDescriptor;
use raw_class_file::{DecodeError, PoolEntry, PoolError};
use crate::error::VmError;
use crate::interpreter::Interpreter;
use crate::method::Method;
use crate::native::{format_floating, NativeBridge};

const STRING_CONCAT_FACTORY: &str = "java/lang/invoke/StringConcatFactory";

/// What an invoke instruction calls.
#[derive(Debug, Clone)]
pub enum ResolvedMethodHandle {
	/// A method of the loaded class, run in a new frame.
	Interpreted(Rc<Method>),
	Native {
		descriptor: MethodDescriptor,
		bridge: NativeBridge,
	},
}

impl ResolvedMethodHandle {
	pub fn descriptor(&self) -> &MethodDescriptor {
		match self {
			ResolvedMethodHandle::Interpreted(method) => &method.parsed_descriptor,
			ResolvedMethodHandle::Native { descriptor, .. } => descriptor,
		}
	}
}

impl Interpreter {
	/// Resolves the `Methodref` or `InterfaceMethodref` at `index`.
	///
	/// Methods of the loaded class resolve to themselves, methods of other classes to a [`NativeBridge`]. The result
	/// is cached, a second resolution of the same index doesn't touch the constant pool.
	pub(crate) fn resolve_method(&mut self, index: u16) -> Result<ResolvedMethodHandle, VmError> {
		if let Some(handle) = self.resolved.get(&index) {
			return Ok(handle.clone());
		}

		let member = self.class.constant_pool.get_member_ref(index)?;
		let handle = if member.class == self.class_name {
			self.find_method(&member.name, &member.descriptor)?
				.map(ResolvedMethodHandle::Interpreted)
		} else {
			None
		};
		let handle = match handle {
			Some(handle) => handle,
			None => match NativeBridge::lookup(&member.class, &member.name, &member.descriptor) {
				Some(bridge) => ResolvedMethodHandle::Native {
					descriptor: MethodDescriptor::parse(&member.descriptor)?,
					bridge,
				},
				None => return Err(VmError::UnresolvedMethod {
					class: member.class,
					name: member.name,
					descriptor: member.descriptor,
				}),
			},
		};

		debug!("resolved #{index} {}.{}{} to {handle:?}", member.class, member.name, member.descriptor);
		self.resolved.insert(index, handle.clone());
		Ok(handle)
	}

	/// Resolves the `InvokeDynamic` at `index` by running its bootstrap method.
	///
	/// Only the string concatenation bootstraps of `java/lang/invoke/StringConcatFactory` are known.
	pub(crate) fn resolve_dynamic(&mut self, index: u16) -> Result<ResolvedMethodHandle, VmError> {
		if let Some(handle) = self.resolved.get(&index) {
			return Ok(handle.clone());
		}

		let pool = &self.class.constant_pool;
		let (bootstrap_index, name, descriptor) = pool.get_invoke_dynamic(index)?;
		let bootstrap = self.bootstrap_methods.get(bootstrap_index as usize)
			.ok_or_else(|| DecodeError::MalformedAttribute {
				attribute: "BootstrapMethods",
				reason: format!("no bootstrap method {bootstrap_index} for call site #{index}"),
			})?;
		let reference_index = match pool.get(bootstrap.method_ref)? {
			PoolEntry::MethodHandle { reference_index, .. } => *reference_index,
			entry => return Err(PoolError::UnexpectedTag {
				index: bootstrap.method_ref,
				expected: "MethodHandle",
				found: entry.kind(),
			}.into()),
		};
		let factory = pool.get_member_ref(reference_index)?;
		let parsed_descriptor = MethodDescriptor::parse(&descriptor)?;

		let bridge = match (factory.class.as_str(), factory.name.as_str()) {
			(STRING_CONCAT_FACTORY, "makeConcatWithConstants") => {
				let (recipe, constants) = bootstrap.arguments.split_first()
					.ok_or_else(|| DecodeError::MalformedAttribute {
						attribute: "BootstrapMethods",
						reason: format!("makeConcatWithConstants for call site #{index} has no recipe"),
					})?;
				let recipe = pool.get_string(*recipe)?;
				let mut texts = Vec::with_capacity(constants.len());
				for &constant in constants {
					texts.push(constant_text(self, constant)?);
				}
				NativeBridge::Concat { recipe, constants: texts }
			},
			(STRING_CONCAT_FACTORY, "makeConcat") => NativeBridge::Concat {
				recipe: "\u{1}".repeat(parsed_descriptor.parameters.len()),
				constants: Vec::new(),
			},
			_ => return Err(VmError::UnresolvedMethod {
				class: factory.class.clone(),
				name: format!("{} (bootstrapping {name})", factory.name),
				descriptor: factory.descriptor.clone(),
			}),
		};

		let handle = ResolvedMethodHandle::Native { descriptor: parsed_descriptor, bridge };
		debug!("resolved call site #{index} {name}{descriptor} to {handle:?}");
		self.resolved.insert(index, handle.clone());
		Ok(handle)
	}
}

/// The text a static bootstrap argument stands for in a concatenation.
fn constant_text(interpreter: &Interpreter, index: u16) -> Result<String, VmError> {
	let pool = &interpreter.class.constant_pool;
	Ok(match pool.get(index)? {
		PoolEntry::String { .. } => pool.get_string(index)?,
		PoolEntry::Integer { bytes } => bytes.to_string(),
		PoolEntry::Long { bytes } => bytes.to_string(),
		PoolEntry::Float { bytes } => format_floating(f32::from_bits(*bytes)),
		PoolEntry::Double { bytes } => format_floating(f64::from_bits(*bytes)),
		entry => return Err(VmError::UnsupportedConstant { index, kind: entry.kind() }),
	})
}
