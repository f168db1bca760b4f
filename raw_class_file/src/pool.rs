use java_string::JavaString;
use crate::reader::ClassRead;
use crate::writer::ClassWrite;
use crate::error::{LoadError, PoolError};

pub mod tag {
	pub const UTF8: u8 = 1;
	pub const INTEGER: u8 = 3;
	pub const FLOAT: u8 = 4;
	pub const LONG: u8 = 5;
	pub const DOUBLE: u8 = 6;
	pub const CLASS: u8 = 7;
	pub const STRING: u8 = 8;
	pub const FIELDREF: u8 = 9;
	pub const METHODREF: u8 = 10;
	pub const INTERFACE_METHODREF: u8 = 11;
	pub const NAME_AND_TYPE: u8 = 12;
	pub const METHOD_HANDLE: u8 = 15;
	pub const METHOD_TYPE: u8 = 16;
	pub const DYNAMIC: u8 = 17;
	pub const INVOKE_DYNAMIC: u8 = 18;
	pub const MODULE: u8 = 19;
	pub const PACKAGE: u8 = 20;
}

/// One constant pool entry.
///
/// `Float` and `Double` keep the raw bit pattern, so that reading and writing a pool never changes a NaN payload.
///
/// This graph shows what depends (has an index to of a type) on what:
/// ```txt
/// Long  Double  Utf8  Integer  Float
///      __________/\_______________
///     /      /     \    \         \
/// String  Class  NameAndType  MethodType
///           |      |      \
///           Fieldref    InvokeDynamic
///           Methodref
///       InterfaceMethodref
///              |
///         MethodHandle
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PoolEntry {
	Class { name_index: u16 },
	Fieldref { class_index: u16, name_and_type_index: u16 },
	Methodref { class_index: u16, name_and_type_index: u16 },
	InterfaceMethodref { class_index: u16, name_and_type_index: u16 },
	String { string_index: u16 },
	Integer { bytes: i32 },
	Float { bytes: u32 },
	Long { bytes: i64 },
	Double { bytes: u64 },
	NameAndType { name_index: u16, descriptor_index: u16 },
	Utf8 { bytes: Vec<u8> },
	MethodHandle { reference_kind: u8, reference_index: u16 },
	MethodType { descriptor_index: u16 },
	Dynamic { bootstrap_method_attr_index: u16, name_and_type_index: u16 },
	InvokeDynamic { bootstrap_method_attr_index: u16, name_and_type_index: u16 },
	Module { name_index: u16 },
	Package { name_index: u16 },
}

impl PoolEntry {
	pub fn utf8(string: &str) -> PoolEntry {
		PoolEntry::Utf8 { bytes: JavaString::from(string).to_modified_utf8().into_owned() }
	}

	pub fn tag(&self) -> u8 {
		match self {
			PoolEntry::Class { .. } => tag::CLASS,
			PoolEntry::Fieldref { .. } => tag::FIELDREF,
			PoolEntry::Methodref { .. } => tag::METHODREF,
			PoolEntry::InterfaceMethodref { .. } => tag::INTERFACE_METHODREF,
			PoolEntry::String { .. } => tag::STRING,
			PoolEntry::Integer { .. } => tag::INTEGER,
			PoolEntry::Float { .. } => tag::FLOAT,
			PoolEntry::Long { .. } => tag::LONG,
			PoolEntry::Double { .. } => tag::DOUBLE,
			PoolEntry::NameAndType { .. } => tag::NAME_AND_TYPE,
			PoolEntry::Utf8 { .. } => tag::UTF8,
			PoolEntry::MethodHandle { .. } => tag::METHOD_HANDLE,
			PoolEntry::MethodType { .. } => tag::METHOD_TYPE,
			PoolEntry::Dynamic { .. } => tag::DYNAMIC,
			PoolEntry::InvokeDynamic { .. } => tag::INVOKE_DYNAMIC,
			PoolEntry::Module { .. } => tag::MODULE,
			PoolEntry::Package { .. } => tag::PACKAGE,
		}
	}

	pub fn kind(&self) -> &'static str {
		match self {
			PoolEntry::Class { .. } => "Class",
			PoolEntry::Fieldref { .. } => "Fieldref",
			PoolEntry::Methodref { .. } => "Methodref",
			PoolEntry::InterfaceMethodref { .. } => "InterfaceMethodref",
			PoolEntry::String { .. } => "String",
			PoolEntry::Integer { .. } => "Integer",
			PoolEntry::Float { .. } => "Float",
			PoolEntry::Long { .. } => "Long",
			PoolEntry::Double { .. } => "Double",
			PoolEntry::NameAndType { .. } => "NameAndType",
			PoolEntry::Utf8 { .. } => "Utf8",
			PoolEntry::MethodHandle { .. } => "MethodHandle",
			PoolEntry::MethodType { .. } => "MethodType",
			PoolEntry::Dynamic { .. } => "Dynamic",
			PoolEntry::InvokeDynamic { .. } => "InvokeDynamic",
			PoolEntry::Module { .. } => "Module",
			PoolEntry::Package { .. } => "Package",
		}
	}

	/// `Long` and `Double` take up two indices in the constant pool.
	pub fn is_wide(&self) -> bool {
		matches!(self, PoolEntry::Long { .. } | PoolEntry::Double { .. })
	}

	fn read(reader: &mut impl ClassRead, index: u16) -> Result<PoolEntry, LoadError> {
		Ok(match reader.read_u8()? {
			tag::CLASS => PoolEntry::Class { name_index: reader.read_u16()? },
			tag::FIELDREF => PoolEntry::Fieldref {
				class_index: reader.read_u16()?,
				name_and_type_index: reader.read_u16()?,
			},
			tag::METHODREF => PoolEntry::Methodref {
				class_index: reader.read_u16()?,
				name_and_type_index: reader.read_u16()?,
			},
			tag::INTERFACE_METHODREF => PoolEntry::InterfaceMethodref {
				class_index: reader.read_u16()?,
				name_and_type_index: reader.read_u16()?,
			},
			tag::STRING => PoolEntry::String { string_index: reader.read_u16()? },
			tag::INTEGER => PoolEntry::Integer { bytes: reader.read_i32()? },
			tag::FLOAT => PoolEntry::Float { bytes: reader.read_u32()? },
			tag::LONG => PoolEntry::Long { bytes: reader.read_i64()? },
			tag::DOUBLE => PoolEntry::Double { bytes: reader.read_u64()? },
			tag::NAME_AND_TYPE => PoolEntry::NameAndType {
				name_index: reader.read_u16()?,
				descriptor_index: reader.read_u16()?,
			},
			tag::UTF8 => {
				let length = reader.read_u16_as_usize()?;
				PoolEntry::Utf8 { bytes: reader.read_u8_vec(length)? }
			},
			tag::METHOD_HANDLE => PoolEntry::MethodHandle {
				reference_kind: reader.read_u8()?,
				reference_index: reader.read_u16()?,
			},
			tag::METHOD_TYPE => PoolEntry::MethodType { descriptor_index: reader.read_u16()? },
			tag::DYNAMIC => PoolEntry::Dynamic {
				bootstrap_method_attr_index: reader.read_u16()?,
				name_and_type_index: reader.read_u16()?,
			},
			tag::INVOKE_DYNAMIC => PoolEntry::InvokeDynamic {
				bootstrap_method_attr_index: reader.read_u16()?,
				name_and_type_index: reader.read_u16()?,
			},
			tag::MODULE => PoolEntry::Module { name_index: reader.read_u16()? },
			tag::PACKAGE => PoolEntry::Package { name_index: reader.read_u16()? },
			tag => return Err(LoadError::BadConstantTag { index, tag }),
		})
	}

	fn write(&self, writer: &mut impl ClassWrite) -> std::io::Result<()> {
		writer.write_u8(self.tag())?;
		match self {
			PoolEntry::Class { name_index } => writer.write_u16(*name_index),
			PoolEntry::Fieldref { class_index, name_and_type_index } |
			PoolEntry::Methodref { class_index, name_and_type_index } |
			PoolEntry::InterfaceMethodref { class_index, name_and_type_index } => {
				writer.write_u16(*class_index)?;
				writer.write_u16(*name_and_type_index)
			},
			PoolEntry::String { string_index } => writer.write_u16(*string_index),
			PoolEntry::Integer { bytes } => writer.write_i32(*bytes),
			PoolEntry::Float { bytes } => writer.write_u32(*bytes),
			PoolEntry::Long { bytes } => writer.write_i64(*bytes),
			PoolEntry::Double { bytes } => writer.write_u64(*bytes),
			PoolEntry::NameAndType { name_index, descriptor_index } => {
				writer.write_u16(*name_index)?;
				writer.write_u16(*descriptor_index)
			},
			PoolEntry::Utf8 { bytes } => {
				writer.write_usize_as_u16(bytes.len())?;
				writer.write_u8_slice(bytes)
			},
			PoolEntry::MethodHandle { reference_kind, reference_index } => {
				writer.write_u8(*reference_kind)?;
				writer.write_u16(*reference_index)
			},
			PoolEntry::MethodType { descriptor_index } => writer.write_u16(*descriptor_index),
			PoolEntry::Dynamic { bootstrap_method_attr_index, name_and_type_index } |
			PoolEntry::InvokeDynamic { bootstrap_method_attr_index, name_and_type_index } => {
				writer.write_u16(*bootstrap_method_attr_index)?;
				writer.write_u16(*name_and_type_index)
			},
			PoolEntry::Module { name_index } | PoolEntry::Package { name_index } => writer.write_u16(*name_index),
		}
	}

	fn len(&self) -> usize {
		1 + match self {
			PoolEntry::Class { .. } | PoolEntry::String { .. } | PoolEntry::MethodType { .. } |
			PoolEntry::Module { .. } | PoolEntry::Package { .. } => 2,
			PoolEntry::MethodHandle { .. } => 3,
			PoolEntry::Long { .. } | PoolEntry::Double { .. } => 8,
			PoolEntry::Utf8 { bytes } => 2 + bytes.len(),
			_ => 4,
		}
	}
}

/// Which kind of member reference a [`MemberRef`] was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
	Field,
	Method,
	InterfaceMethod,
}

/// A fully resolved `Fieldref`, `Methodref` or `InterfaceMethodref`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberRef {
	pub kind: MemberKind,
	pub class: String,
	pub name: String,
	pub descriptor: String,
}

/// The constant pool of a class file, indexed from `1`.
///
/// Slot `0` and the slot following each `Long`/`Double` entry hold no entry; looking them up gives
/// [`PoolError::Reserved`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConstantPool {
	entries: Vec<Option<PoolEntry>>,
}

impl ConstantPool {
	pub fn new() -> ConstantPool {
		ConstantPool { entries: vec![None] }
	}

	/// Appends an entry and returns its index. Wide entries also take the following index.
	///
	/// Fails if the entry can't be written to a class file: the pool count must fit a `u16`, and so must the
	/// length of a `Utf8` entry.
	pub fn push(&mut self, entry: PoolEntry) -> Result<u16, PoolError> {
		if let PoolEntry::Utf8 { bytes } = &entry {
			if bytes.len() > u16::MAX as usize {
				return Err(PoolError::Utf8TooLong { length: bytes.len() });
			}
		}
		if self.entries.is_empty() {
			self.entries.push(None);
		}
		let slots = if entry.is_wide() { 2 } else { 1 };
		if self.entries.len() + slots > u16::MAX as usize {
			return Err(PoolError::Full { max: u16::MAX - 1 });
		}
		let index = self.entries.len() as u16;
		self.entries.push(Some(entry));
		if slots == 2 {
			self.entries.push(None);
		}
		Ok(index)
	}

	/// The `constant_pool_count` item: one more than the highest index.
	pub fn count(&self) -> u16 {
		self.entries.len().max(1) as u16
	}

	pub fn get(&self, index: u16) -> Result<&PoolEntry, PoolError> {
		match self.entries.get(index as usize) {
			Some(Some(entry)) => Ok(entry),
			Some(None) => Err(PoolError::Reserved { index }),
			None => Err(PoolError::OutOfRange { index, count: self.count() }),
		}
	}

	/// Iterates over all usable entries, with their index.
	pub fn iter(&self) -> impl Iterator<Item=(u16, &PoolEntry)> {
		self.entries.iter()
			.enumerate()
			.filter_map(|(index, entry)| entry.as_ref().map(|entry| (index as u16, entry)))
	}

	fn unexpected(index: u16, expected: &'static str, found: &PoolEntry) -> PoolError {
		PoolError::UnexpectedTag { index, expected, found: found.kind() }
	}

	pub fn get_utf8_bytes(&self, index: u16) -> Result<&[u8], PoolError> {
		match self.get(index)? {
			PoolEntry::Utf8 { bytes } => Ok(bytes),
			entry => Err(Self::unexpected(index, "Utf8", entry)),
		}
	}

	pub fn get_utf8(&self, index: u16) -> Result<String, PoolError> {
		let bytes = self.get_utf8_bytes(index)?;
		JavaString::from_modified_utf8(bytes.to_vec())
			.ok()
			.and_then(|string| string.as_str().ok().map(str::to_owned))
			.ok_or(PoolError::InvalidUtf8 { index })
	}

	pub fn get_class_name(&self, index: u16) -> Result<String, PoolError> {
		match self.get(index)? {
			PoolEntry::Class { name_index } => self.get_utf8(*name_index),
			entry => Err(Self::unexpected(index, "Class", entry)),
		}
	}

	/// Like [`ConstantPool::get_class_name`], but index `0` gives `None`, as for the `super_class` of `java/lang/Object`.
	pub fn get_optional_class_name(&self, index: u16) -> Result<Option<String>, PoolError> {
		if index == 0 {
			Ok(None)
		} else {
			self.get_class_name(index).map(Some)
		}
	}

	/// Resolves a `String` entry to its contents.
	pub fn get_string(&self, index: u16) -> Result<String, PoolError> {
		match self.get(index)? {
			PoolEntry::String { string_index } => self.get_utf8(*string_index),
			entry => Err(Self::unexpected(index, "String", entry)),
		}
	}

	pub fn get_integer(&self, index: u16) -> Result<i32, PoolError> {
		match self.get(index)? {
			PoolEntry::Integer { bytes } => Ok(*bytes),
			entry => Err(Self::unexpected(index, "Integer", entry)),
		}
	}

	pub fn get_float(&self, index: u16) -> Result<f32, PoolError> {
		match self.get(index)? {
			PoolEntry::Float { bytes } => Ok(f32::from_bits(*bytes)),
			entry => Err(Self::unexpected(index, "Float", entry)),
		}
	}

	pub fn get_long(&self, index: u16) -> Result<i64, PoolError> {
		match self.get(index)? {
			PoolEntry::Long { bytes } => Ok(*bytes),
			entry => Err(Self::unexpected(index, "Long", entry)),
		}
	}

	pub fn get_double(&self, index: u16) -> Result<f64, PoolError> {
		match self.get(index)? {
			PoolEntry::Double { bytes } => Ok(f64::from_bits(*bytes)),
			entry => Err(Self::unexpected(index, "Double", entry)),
		}
	}

	/// Returns the `(name, descriptor)` of a `NameAndType` entry.
	pub fn get_name_and_type(&self, index: u16) -> Result<(String, String), PoolError> {
		match self.get(index)? {
			PoolEntry::NameAndType { name_index, descriptor_index } => {
				Ok((self.get_utf8(*name_index)?, self.get_utf8(*descriptor_index)?))
			},
			entry => Err(Self::unexpected(index, "NameAndType", entry)),
		}
	}

	/// Resolves any of `Fieldref`, `Methodref` and `InterfaceMethodref`.
	pub fn get_member_ref(&self, index: u16) -> Result<MemberRef, PoolError> {
		let (kind, class_index, name_and_type_index) = match *self.get(index)? {
			PoolEntry::Fieldref { class_index, name_and_type_index } => (MemberKind::Field, class_index, name_and_type_index),
			PoolEntry::Methodref { class_index, name_and_type_index } => (MemberKind::Method, class_index, name_and_type_index),
			PoolEntry::InterfaceMethodref { class_index, name_and_type_index } => {
				(MemberKind::InterfaceMethod, class_index, name_and_type_index)
			},
			ref entry => return Err(Self::unexpected(index, "Fieldref, Methodref or InterfaceMethodref", entry)),
		};
		let class = self.get_class_name(class_index)?;
		let (name, descriptor) = self.get_name_and_type(name_and_type_index)?;
		Ok(MemberRef { kind, class, name, descriptor })
	}

	/// Returns the `(bootstrap_method_attr_index, name, descriptor)` of an `InvokeDynamic` entry.
	pub fn get_invoke_dynamic(&self, index: u16) -> Result<(u16, String, String), PoolError> {
		match *self.get(index)? {
			PoolEntry::InvokeDynamic { bootstrap_method_attr_index, name_and_type_index } => {
				let (name, descriptor) = self.get_name_and_type(name_and_type_index)?;
				Ok((bootstrap_method_attr_index, name, descriptor))
			},
			ref entry => Err(Self::unexpected(index, "InvokeDynamic", entry)),
		}
	}

	pub(crate) fn read(reader: &mut impl ClassRead) -> Result<ConstantPool, LoadError> {
		let count = reader.read_u16()?;
		if count == 0 {
			return Err(LoadError::EmptyConstantPoolCount);
		}

		let mut entries = Vec::with_capacity(count as usize);
		entries.push(None);

		let mut index = 1;
		while index < count { // indexing is from 1
			let entry = PoolEntry::read(reader, index)?;
			if entry.is_wide() {
				if index + 1 >= count {
					return Err(LoadError::WideEntryAtEnd { index });
				}
				entries.push(Some(entry));
				entries.push(None);
				index += 2;
			} else {
				entries.push(Some(entry));
				index += 1;
			}
		}

		Ok(ConstantPool { entries })
	}

	pub(crate) fn write(&self, writer: &mut impl ClassWrite) -> std::io::Result<()> {
		writer.write_usize_as_u16(self.entries.len().max(1))?;
		for (_, entry) in self.iter() {
			entry.write(writer)?;
		}
		Ok(())
	}

	/// Serializes `constant_pool_count` and all the entries, exactly as they appear in a class file.
	pub fn to_bytes(&self) -> std::io::Result<Vec<u8>> {
		let mut vec = Vec::with_capacity(self.length());
		self.write(&mut vec)?;
		Ok(vec)
	}

	pub fn length(&self) -> usize {
		2 + self.iter().map(|(_, entry)| entry.len()).sum::<usize>()
	}

	/// Checks that every entry only refers to in-range entries of the right kind.
	pub(crate) fn validate(&self) -> Result<(), LoadError> {
		fn check(result: Result<(), PoolError>, index: u16) -> Result<(), LoadError> {
			result.map_err(|source| LoadError::InvalidPoolIndex {
				location: format!("constant pool entry #{index}"),
				source,
			})
		}

		for (index, entry) in self.iter() {
			let result = match *entry {
				PoolEntry::Class { name_index } |
				PoolEntry::Module { name_index } |
				PoolEntry::Package { name_index } => self.get_utf8_bytes(name_index).map(drop),
				PoolEntry::String { string_index } => self.get_utf8_bytes(string_index).map(drop),
				PoolEntry::MethodType { descriptor_index } => self.get_utf8_bytes(descriptor_index).map(drop),
				PoolEntry::NameAndType { name_index, descriptor_index } => {
					self.get_utf8_bytes(name_index)
						.and_then(|_| self.get_utf8_bytes(descriptor_index))
						.map(drop)
				},
				PoolEntry::Fieldref { class_index, name_and_type_index } |
				PoolEntry::Methodref { class_index, name_and_type_index } |
				PoolEntry::InterfaceMethodref { class_index, name_and_type_index } => {
					self.expect(class_index, "Class", |e| matches!(e, PoolEntry::Class { .. }))
						.and_then(|_| self.expect(name_and_type_index, "NameAndType", |e| matches!(e, PoolEntry::NameAndType { .. })))
				},
				PoolEntry::Dynamic { name_and_type_index, .. } |
				PoolEntry::InvokeDynamic { name_and_type_index, .. } => {
					self.expect(name_and_type_index, "NameAndType", |e| matches!(e, PoolEntry::NameAndType { .. }))
				},
				PoolEntry::MethodHandle { reference_index, .. } => {
					self.expect(reference_index, "Fieldref, Methodref or InterfaceMethodref", |e| matches!(e,
						PoolEntry::Fieldref { .. } | PoolEntry::Methodref { .. } | PoolEntry::InterfaceMethodref { .. }
					))
				},
				PoolEntry::Integer { .. } | PoolEntry::Float { .. } | PoolEntry::Long { .. } |
				PoolEntry::Double { .. } | PoolEntry::Utf8 { .. } => Ok(()),
			};
			check(result, index)?;
		}
		Ok(())
	}

	fn expect(&self, index: u16, expected: &'static str, predicate: impl FnOnce(&PoolEntry) -> bool) -> Result<(), PoolError> {
		let entry = self.get(index)?;
		if predicate(entry) {
			Ok(())
		} else {
			Err(Self::unexpected(index, expected, entry))
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use crate::error::PoolError;
	use crate::pool::{ConstantPool, MemberKind, MemberRef, PoolEntry};

	fn pool() -> ConstantPool {
		let mut pool = ConstantPool::new();
		pool.push(PoolEntry::utf8("org/example/Main")).unwrap();          // 1
		pool.push(PoolEntry::Class { name_index: 1 }).unwrap();            // 2
		pool.push(PoolEntry::Long { bytes: -1 }).unwrap();                 // 3, 4
		pool.push(PoolEntry::utf8("run")).unwrap();                        // 5
		pool.push(PoolEntry::utf8("()J")).unwrap();                        // 6
		pool.push(PoolEntry::NameAndType { name_index: 5, descriptor_index: 6 }).unwrap(); // 7
		pool.push(PoolEntry::Methodref { class_index: 2, name_and_type_index: 7 }).unwrap(); // 8
		pool.push(PoolEntry::Double { bytes: 2.75f64.to_bits() }).unwrap(); // 9, 10
		pool
	}

	#[test]
	fn wide_entries_take_two_indices() {
		let pool = pool();
		assert_eq!(pool.count(), 11);
		assert_eq!(pool.get_long(3), Ok(-1));
		assert_eq!(pool.get(4), Err(PoolError::Reserved { index: 4 }));
		assert_eq!(pool.get_double(9).map(f64::to_bits), Ok(2.75f64.to_bits()));
		assert_eq!(pool.get(10), Err(PoolError::Reserved { index: 10 }));
		assert_eq!(pool.get(11), Err(PoolError::OutOfRange { index: 11, count: 11 }));
		assert_eq!(pool.get(0), Err(PoolError::Reserved { index: 0 }));
	}

	#[test]
	fn iter_skips_reserved_slots() {
		let indices: Vec<u16> = pool().iter().map(|(i, _)| i).collect();
		assert_eq!(indices, vec![1, 2, 3, 5, 6, 7, 8, 9]);
	}

	#[test]
	fn resolves_member_refs() {
		let pool = pool();
		assert_eq!(pool.get_member_ref(8), Ok(MemberRef {
			kind: MemberKind::Method,
			class: "org/example/Main".to_owned(),
			name: "run".to_owned(),
			descriptor: "()J".to_owned(),
		}));
		assert_eq!(pool.get_class_name(1), Err(PoolError::UnexpectedTag { index: 1, expected: "Class", found: "Utf8" }));
	}

	#[test]
	fn validate_rejects_dangling_references() {
		let mut pool = pool();
		assert_eq!(pool.validate(), Ok(()));
		pool.push(PoolEntry::Class { name_index: 4 }).unwrap();
		assert!(pool.validate().is_err());
	}

	#[test]
	fn modified_utf8_null() {
		let mut pool = ConstantPool::new();
		let index = pool.push(PoolEntry::Utf8 { bytes: vec![b'a', 0xc0, 0x80, b'b'] }).unwrap();
		assert_eq!(pool.get_utf8(index), Ok("a\0b".to_owned()));
		assert_eq!(PoolEntry::utf8("a\0b"), PoolEntry::Utf8 { bytes: vec![b'a', 0xc0, 0x80, b'b'] });
	}

	#[test]
	fn push_rejects_what_can_not_be_written() {
		let mut pool = ConstantPool::new();
		assert_eq!(pool.push(PoolEntry::Utf8 { bytes: vec![b'a'; 70000] }), Err(PoolError::Utf8TooLong { length: 70000 }));
		assert_eq!(pool.count(), 1);
		assert_eq!(pool.push(PoolEntry::Utf8 { bytes: vec![b'a'; 65535] }), Ok(1));

		for _ in 2..65534 {
			pool.push(PoolEntry::Integer { bytes: 0 }).unwrap();
		}
		assert_eq!(pool.count(), 65534);
		assert_eq!(pool.push(PoolEntry::Long { bytes: 0 }), Err(PoolError::Full { max: 65534 }));
		assert_eq!(pool.push(PoolEntry::Integer { bytes: 7 }), Ok(65534));
		assert_eq!(pool.push(PoolEntry::Integer { bytes: 8 }), Err(PoolError::Full { max: 65534 }));
		assert_eq!(pool.count(), 65535);

		let bytes = pool.to_bytes().unwrap();
		assert_eq!(bytes.len(), pool.length());
		assert_eq!(&bytes[..2], &[0xff, 0xff]);
	}
}
