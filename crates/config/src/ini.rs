//! Ini document model: the textual format underneath [`Configuration`].
//!
//! Parsing accepts `[section]` headers, `key = value` or `key: value`
//! assignments, full-line `#`/`;` comments, and indented continuation lines
//! that extend the previous value. Section and key names are
//! case-sensitive. Serialization is canonical: sections and keys in
//! lexicographic order, values with embedded newlines re-indented as
//! continuations, so that two documents with the same contents produce
//! byte-identical text.
//!
//! [`Configuration`]: crate::store::Configuration

use indexmap::IndexMap;

use crate::error::ConfigError;

/// Leading marker line written to every serialized document.
const CODING_MARKER: &str = "# -*- coding: utf-8 -*-";

/// An in-memory ini document, preserving insertion order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IniDocument {
	sections: IndexMap<String, IndexMap<String, String>>,
}

impl IniDocument {
	/// Parses ini text. `path` is only used in error messages.
	pub fn parse(text: &str, path: &str) -> Result<Self, ConfigError> {
		let parse_error = |line: usize, message: &str| ConfigError::Parse {
			path: path.to_owned(),
			line,
			message: message.to_owned(),
		};
		let mut doc = IniDocument::default();
		let mut current: Option<String> = None;
		let mut last_key: Option<String> = None;
		for (index, raw) in text.lines().enumerate() {
			let line = index + 1;
			let trimmed = raw.trim();
			if trimmed.is_empty() {
				last_key = None;
				continue;
			}
			if raw.starts_with([' ', '\t']) && !trimmed.starts_with(['#', ';']) {
				// Continuation of the previous value.
				let (Some(section), Some(key)) = (&current, &last_key) else {
					return Err(parse_error(line, "continuation line without a preceding key"));
				};
				if let Some(value) = doc.get_mut(section, key) {
					value.push('\n');
					value.push_str(trimmed);
				}
				continue;
			}
			if trimmed.starts_with(['#', ';']) {
				last_key = None;
				continue;
			}
			if let Some(rest) = trimmed.strip_prefix('[') {
				let Some(name) = rest.strip_suffix(']') else {
					return Err(parse_error(line, "unterminated section header"));
				};
				doc.sections.entry(name.to_owned()).or_default();
				current = Some(name.to_owned());
				last_key = None;
				continue;
			}
			let Some(section) = &current else {
				return Err(parse_error(line, "key/value pair before any section header"));
			};
			let Some(delim) = trimmed.find(['=', ':']) else {
				return Err(parse_error(line, "expected \"key = value\""));
			};
			let key = trimmed[..delim].trim_end();
			if key.is_empty() {
				return Err(parse_error(line, "empty key"));
			}
			let value = trimmed[delim + 1..].trim_start();
			doc.set(section, key, value);
			last_key = Some(key.to_owned());
		}
		Ok(doc)
	}

	/// Serializes to canonical ini text.
	pub fn serialize(&self) -> String {
		let mut out = String::new();
		out.push_str(CODING_MARKER);
		out.push_str("\n\n");
		let mut names: Vec<&str> = self.sections.keys().map(String::as_str).collect();
		names.sort_unstable();
		for name in names {
			out.push_str(&format!("[{name}]\n"));
			let Some(section) = self.sections.get(name) else {
				continue;
			};
			let mut keys: Vec<&str> = section.keys().map(String::as_str).collect();
			keys.sort_unstable();
			for key in keys {
				if let Some(value) = section.get(key) {
					let value = value.replace('\n', "\n\t");
					out.push_str(&format!("{key} = {value}\n"));
				}
			}
			out.push('\n');
		}
		out
	}

	/// Returns the stored value, if any.
	pub fn get(&self, section: &str, key: &str) -> Option<&str> {
		self.sections
			.get(section)
			.and_then(|options| options.get(key))
			.map(String::as_str)
	}

	fn get_mut(&mut self, section: &str, key: &str) -> Option<&mut String> {
		self.sections
			.get_mut(section)
			.and_then(|options| options.get_mut(key))
	}

	/// Stores a value, creating the section if needed.
	pub fn set(&mut self, section: &str, key: &str, value: &str) {
		self.sections
			.entry(section.to_owned())
			.or_default()
			.insert(key.to_owned(), value.to_owned());
	}

	/// Removes a key, returning its previous value. The section itself is
	/// kept even when it becomes empty.
	pub fn remove(&mut self, section: &str, key: &str) -> Option<String> {
		self.sections
			.get_mut(section)
			.and_then(|options| options.shift_remove(key))
	}

	pub fn has_section(&self, section: &str) -> bool {
		self.sections.contains_key(section)
	}

	pub fn has_option(&self, section: &str, key: &str) -> bool {
		self.sections
			.get(section)
			.is_some_and(|options| options.contains_key(key))
	}

	/// Section names in insertion order.
	pub fn sections(&self) -> impl Iterator<Item = &str> {
		self.sections.keys().map(String::as_str)
	}

	/// Keys of a section in insertion order.
	pub fn keys(&self, section: &str) -> impl Iterator<Item = &str> {
		self.sections
			.get(section)
			.into_iter()
			.flat_map(|options| options.keys().map(String::as_str))
	}
}
