use std::path::{Path, PathBuf};

/// Result of a typed option read.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
	Text(String),
	Bool(bool),
	Int(i64),
	Float(f64),
	List(Vec<String>),
	Path(PathBuf),
}

impl OptionValue {
	pub fn as_str(&self) -> Option<&str> {
		match self {
			OptionValue::Text(value) => Some(value),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			OptionValue::Bool(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			OptionValue::Int(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_float(&self) -> Option<f64> {
		match self {
			OptionValue::Float(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[String]> {
		match self {
			OptionValue::List(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_path(&self) -> Option<&Path> {
		match self {
			OptionValue::Path(path) => Some(path),
			_ => None,
		}
	}
}

/// Converts a textual value to a boolean.
///
/// Numeric strings use numeric truthiness; otherwise `yes`, `true`,
/// `enabled` and `on` are true, `no`, `false`, `disabled` and `off` are
/// false, case-insensitively. Anything else yields `default`.
pub fn as_bool(value: &str, default: bool) -> bool {
	let value = value.trim();
	if let Ok(number) = value.parse::<f64>() {
		return number != 0.0;
	}
	match value.to_ascii_lowercase().as_str() {
		"yes" | "true" | "enabled" | "on" => true,
		"no" | "false" | "disabled" | "off" => false,
		_ => default,
	}
}
