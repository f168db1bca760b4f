use raw_class_file::attribute::CodeAttribute;
use raw_class_file::descriptor::MethodDescriptor;
use raw_class_file::{ClassFile, DecodeError, MethodInfo};

/// A method of the loaded class, with its `Code` attribute decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
	/// The index into [`ClassFile::methods`].
	pub index: usize,
	pub name: String,
	pub descriptor: String,
	pub parsed_descriptor: MethodDescriptor,
	pub is_static: bool,
	pub code: CodeAttribute,
}

impl Method {
	pub(crate) fn load(class: &ClassFile, index: usize, info: &MethodInfo) -> Result<Method, DecodeError> {
		let pool = &class.constant_pool;
		let name = info.name(pool)?;
		let descriptor = info.descriptor(pool)?;
		let parsed_descriptor = MethodDescriptor::parse(&descriptor)?;
		let code = info.code(pool)?;
		Ok(Method {
			index,
			name,
			descriptor,
			parsed_descriptor,
			is_static: info.is_static(),
			code,
		})
	}

	/// The name and descriptor, like `main([Ljava/lang/String;)V`.
	pub fn signature(&self) -> String {
		format!("{}{}", self.name, self.descriptor)
	}
}
