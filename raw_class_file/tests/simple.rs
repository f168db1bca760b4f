use pretty_assertions::assert_eq;
use raw_class_file::{AttributeInfo, ClassFile, ConstantPool, DecodeError, FieldInfo, flags, LoadError, MethodInfo, PoolEntry, PoolError};
use raw_class_file::attribute::CodeAttribute;
use raw_class_file::insn;

fn class() -> ClassFile {
	let mut pool = ConstantPool::new();
	pool.push(PoolEntry::utf8("ThisClass")).unwrap();                 // 1
	pool.push(PoolEntry::Class { name_index: 1 }).unwrap();           // 2
	pool.push(PoolEntry::utf8("ThatClass")).unwrap();                 // 3
	pool.push(PoolEntry::Class { name_index: 3 }).unwrap();           // 4
	pool.push(PoolEntry::utf8("ThisInterface")).unwrap();             // 5
	pool.push(PoolEntry::Class { name_index: 5 }).unwrap();           // 6
	pool.push(PoolEntry::utf8("thisField")).unwrap();                 // 7
	pool.push(PoolEntry::utf8("J")).unwrap();                         // 8
	pool.push(PoolEntry::utf8("ConstantValue")).unwrap();             // 9
	pool.push(PoolEntry::Long { bytes: 0x0123_4567_89ab_cdef }).unwrap(); // 10, 11
	pool.push(PoolEntry::utf8("thatField")).unwrap();                 // 12
	pool.push(PoolEntry::utf8("F")).unwrap();                         // 13
	pool.push(PoolEntry::Float { bytes: 42.3456f32.to_bits() }).unwrap(); // 14
	pool.push(PoolEntry::utf8("thisMethod")).unwrap();                // 15
	pool.push(PoolEntry::utf8("()D")).unwrap();                       // 16
	pool.push(PoolEntry::utf8("Code")).unwrap();                      // 17
	pool.push(PoolEntry::Double { bytes: 2.75f64.to_bits() }).unwrap(); // 18, 19
	pool.push(PoolEntry::utf8("abstractMethod")).unwrap();            // 20
	pool.push(PoolEntry::utf8("SourceFile")).unwrap();                // 21
	pool.push(PoolEntry::utf8("ThisClass.java")).unwrap();            // 22

	let code = CodeAttribute {
		max_stack: 2,
		max_locals: 0,
		code: vec![insn::ldc2_w, 0, 18, insn::dreturn],
		exception_table: vec![],
		attributes: vec![],
	};

	ClassFile {
		minor_version: 0,
		major_version: 52,
		constant_pool: pool,
		access_flags: flags::ACC_PUBLIC | flags::ACC_SUPER,
		this_class: 2,
		super_class: 4,
		interfaces: vec![6],
		fields: vec![
			FieldInfo {
				access_flags: flags::ACC_STATIC | flags::ACC_FINAL,
				name_index: 7,
				descriptor_index: 8,
				attributes: vec![AttributeInfo { name_index: 9, info: vec![0, 10] }],
			},
			FieldInfo {
				access_flags: 0,
				name_index: 12,
				descriptor_index: 13,
				attributes: vec![],
			},
		],
		methods: vec![
			MethodInfo {
				access_flags: flags::ACC_STATIC,
				name_index: 15,
				descriptor_index: 16,
				attributes: vec![AttributeInfo { name_index: 17, info: code.encode() }],
			},
			MethodInfo {
				access_flags: flags::ACC_ABSTRACT,
				name_index: 20,
				descriptor_index: 16,
				attributes: vec![],
			},
		],
		attributes: vec![AttributeInfo { name_index: 21, info: vec![0, 22] }],
	}
}

#[test]
fn round_trip() {
	let class = class();
	let bytes = class.to_bytes().unwrap();
	assert_eq!(bytes.len(), class.length());
	assert_eq!(&bytes[0..4], &[0xca, 0xfe, 0xba, 0xbe]);

	let class_2 = ClassFile::load(&bytes).unwrap();
	assert_eq!(class_2, class);
	assert_eq!(class_2.to_bytes().unwrap(), bytes);
}

#[test]
fn constant_pool_round_trip() {
	let bytes = class().to_bytes().unwrap();
	let class = ClassFile::load(&bytes).unwrap();

	// the pool starts right after the magic and the two versions
	let pool_bytes = class.constant_pool.to_bytes().unwrap();
	assert_eq!(pool_bytes, &bytes[8..8 + pool_bytes.len()]);
}

#[test]
fn wide_entries_reserve_the_next_index() {
	let class = ClassFile::load(&class().to_bytes().unwrap()).unwrap();
	let pool = &class.constant_pool;

	assert_eq!(pool.count(), 23);
	assert_eq!(pool.get_long(10), Ok(0x0123_4567_89ab_cdef));
	assert_eq!(pool.get(11), Err(PoolError::Reserved { index: 11 }));
	assert_eq!(pool.get_double(18).map(f64::to_bits), Ok(2.75f64.to_bits()));
	assert_eq!(pool.get(19), Err(PoolError::Reserved { index: 19 }));
	assert_eq!(pool.get_utf8(20), Ok("abstractMethod".to_owned()));
}

#[test]
fn accessors() {
	let class = class();
	assert_eq!(class.name(), Ok("ThisClass".to_owned()));
	assert_eq!(class.super_name(), Ok(Some("ThatClass".to_owned())));
	assert_eq!(class.source_file(), Ok(Some("ThisClass.java".to_owned())));
	assert_eq!(class.fields[0].constant_value(&class.constant_pool), Ok(Some(10)));
	assert_eq!(class.fields[1].constant_value(&class.constant_pool), Ok(None));
	assert_eq!(class.bootstrap_methods(), Ok(vec![]));

	let code = class.code_of("thisMethod", "()D").unwrap();
	assert_eq!(code.code, vec![insn::ldc2_w, 0, 18, insn::dreturn]);

	assert_eq!(
		class.code_of("abstractMethod", "()D"),
		Err(DecodeError::MissingCode { method: "abstractMethod()D".to_owned() })
	);
	assert_eq!(
		class.code_of("thisMethod", "()V"),
		Err(DecodeError::MissingCode { method: "thisMethod()V".to_owned() })
	);
}

#[test]
fn bad_magic() {
	let mut bytes = class().to_bytes().unwrap();
	bytes[3] = 0xbf;
	assert_eq!(ClassFile::load(&bytes), Err(LoadError::BadMagic(0xcafebabf)));
}

#[test]
fn bad_constant_tag() {
	let mut bytes = class().to_bytes().unwrap();
	// the tag of entry #1
	bytes[10] = 2;
	assert_eq!(ClassFile::load(&bytes), Err(LoadError::BadConstantTag { index: 1, tag: 2 }));
}

#[test]
fn truncated() {
	let bytes = class().to_bytes().unwrap();
	for len in [0, 3, 9, 40, bytes.len() - 1] {
		assert!(
			matches!(ClassFile::load(&bytes[..len]), Err(LoadError::Truncated { .. })),
			"loading the first {len} bytes should fail as truncated"
		);
	}
}

#[test]
fn trailing_bytes() {
	let mut bytes = class().to_bytes().unwrap();
	bytes.extend_from_slice(&[0, 0]);
	assert_eq!(ClassFile::load(&bytes), Err(LoadError::TrailingBytes { count: 2 }));
}

#[test]
fn invalid_references() {
	let mut class = class();
	class.this_class = 1;
	assert!(matches!(
		ClassFile::load(&class.to_bytes().unwrap()),
		Err(LoadError::InvalidPoolIndex { source: PoolError::UnexpectedTag { index: 1, .. }, .. })
	));

	let mut class = self::class();
	class.methods[0].descriptor_index = 11;
	assert!(matches!(
		ClassFile::load(&class.to_bytes().unwrap()),
		Err(LoadError::InvalidPoolIndex { source: PoolError::Reserved { index: 11 }, .. })
	));

	let mut class = self::class();
	class.super_class = 200;
	assert!(matches!(
		ClassFile::load(&class.to_bytes().unwrap()),
		Err(LoadError::InvalidPoolIndex { source: PoolError::OutOfRange { index: 200, count: 23 }, .. })
	));
}

#[test]
fn wide_entry_at_the_end() {
	// magic, version, a pool count of 2 with a single long in it
	let mut bytes = vec![0xca, 0xfe, 0xba, 0xbe, 0, 0, 0, 52, 0, 2, 5];
	bytes.extend_from_slice(&[0; 8]);
	assert_eq!(ClassFile::load(&bytes), Err(LoadError::WideEntryAtEnd { index: 1 }));
}

#[test]
fn oversized_parts_fail_to_write() {
	let mut class = class();
	assert_eq!(
		class.constant_pool.push(PoolEntry::Utf8 { bytes: vec![b'a'; 70000] }),
		Err(PoolError::Utf8TooLong { length: 70000 })
	);
	assert_eq!(class.constant_pool.count(), 23);

	class.interfaces = vec![6; 70000];
	let error = class.to_bytes().unwrap_err();
	assert_eq!(error.kind(), std::io::ErrorKind::InvalidInput);

	let mut class = self::class();
	class.methods[0].attributes = vec![AttributeInfo { name_index: 21, info: vec![0, 22] }; 65536];
	assert!(class.to_bytes().is_err());
}
