//! Rendering of `access_flags` items as the keywords they stand for.
//!
//! Several flags share a bit, so the meaning depends on what the flags belong to.

use crate::flags::*;

const CLASS: &[(u16, &str)] = &[
	(ACC_PUBLIC,     "public"),
	(ACC_FINAL,      "final"),
	(ACC_SUPER,      "super"),
	(ACC_INTERFACE,  "interface"),
	(ACC_ABSTRACT,   "abstract"),
	(ACC_SYNTHETIC,  "synthetic"),
	(ACC_ANNOTATION, "annotation"),
	(ACC_ENUM,       "enum"),
	(ACC_MODULE,     "module"),
];

const FIELD: &[(u16, &str)] = &[
	(ACC_PUBLIC,    "public"),
	(ACC_PRIVATE,   "private"),
	(ACC_PROTECTED, "protected"),
	(ACC_STATIC,    "static"),
	(ACC_FINAL,     "final"),
	(ACC_VOLATILE,  "volatile"),
	(ACC_TRANSIENT, "transient"),
	(ACC_SYNTHETIC, "synthetic"),
	(ACC_ENUM,      "enum"),
];

const METHOD: &[(u16, &str)] = &[
	(ACC_PUBLIC,       "public"),
	(ACC_PRIVATE,      "private"),
	(ACC_PROTECTED,    "protected"),
	(ACC_STATIC,       "static"),
	(ACC_FINAL,        "final"),
	(ACC_SYNCHRONIZED, "synchronized"),
	(ACC_BRIDGE,       "bridge"),
	(ACC_VARARGS,      "varargs"),
	(ACC_NATIVE,       "native"),
	(ACC_ABSTRACT,     "abstract"),
	(ACC_STRICT,       "strict"),
	(ACC_SYNTHETIC,    "synthetic"),
];

fn render(table: &[(u16, &'static str)], access_flags: u16) -> Vec<&'static str> {
	table.iter()
		.filter(|(flag, _)| access_flags & flag != 0)
		.map(|(_, name)| *name)
		.collect()
}

pub fn class_flags(access_flags: u16) -> Vec<&'static str> {
	render(CLASS, access_flags)
}

pub fn field_flags(access_flags: u16) -> Vec<&'static str> {
	render(FIELD, access_flags)
}

pub fn method_flags(access_flags: u16) -> Vec<&'static str> {
	render(METHOD, access_flags)
}
