use std::any::TypeId;

use crate::error::ConfigError;
use crate::option::value::{OptionValue, as_bool};
use crate::store::Configuration;

/// The value type of an option, driving normalization and typed reads.
#[derive(Debug, Clone, Copy)]
pub enum OptionKind {
	Text,
	Bool,
	Int,
	Float,
	List {
		/// Accepted separators; the first one is used when normalizing.
		sep: &'static [&'static str],
		keep_empty: bool,
	},
	Choice {
		/// Allowed values; the first one is the implied default.
		choices: &'static [&'static str],
	},
	Path,
	/// The short name of one enabled implementer of an interface.
	Extension {
		interface: fn() -> TypeId,
		interface_name: &'static str,
	},
	/// An ordered comma list of implementer short names.
	OrderedExtensions {
		interface: fn() -> TypeId,
		interface_name: &'static str,
		/// Whether implementers absent from the list are appended.
		include_missing: bool,
	},
}

/// Static declaration of one configuration option.
#[derive(Debug, Clone, Copy)]
pub struct OptionDef {
	pub section: &'static str,
	pub name: &'static str,
	pub kind: OptionKind,
	/// Raw default, normalized when the declaration is registered.
	pub default: &'static str,
	pub doc: &'static str,
	/// Dotted name of the owning component, if any. Drives the
	/// component-manager and prefix filters of the registry.
	pub owner: Option<&'static str>,
}

impl OptionDef {
	pub const fn text(
		section: &'static str,
		name: &'static str,
		default: &'static str,
		doc: &'static str,
	) -> Self {
		Self::with_kind(section, name, OptionKind::Text, default, doc)
	}

	pub const fn bool(
		section: &'static str,
		name: &'static str,
		default: &'static str,
		doc: &'static str,
	) -> Self {
		Self::with_kind(section, name, OptionKind::Bool, default, doc)
	}

	pub const fn int(
		section: &'static str,
		name: &'static str,
		default: &'static str,
		doc: &'static str,
	) -> Self {
		Self::with_kind(section, name, OptionKind::Int, default, doc)
	}

	pub const fn float(
		section: &'static str,
		name: &'static str,
		default: &'static str,
		doc: &'static str,
	) -> Self {
		Self::with_kind(section, name, OptionKind::Float, default, doc)
	}

	pub const fn list(
		section: &'static str,
		name: &'static str,
		default: &'static str,
		sep: &'static [&'static str],
		keep_empty: bool,
		doc: &'static str,
	) -> Self {
		Self::with_kind(section, name, OptionKind::List { sep, keep_empty }, default, doc)
	}

	/// Declares a choice option. The default is the first choice.
	pub const fn choice(
		section: &'static str,
		name: &'static str,
		choices: &'static [&'static str],
		doc: &'static str,
	) -> Self {
		Self::with_kind(section, name, OptionKind::Choice { choices }, choices[0], doc)
	}

	pub const fn path(
		section: &'static str,
		name: &'static str,
		default: &'static str,
		doc: &'static str,
	) -> Self {
		Self::with_kind(section, name, OptionKind::Path, default, doc)
	}

	/// Declares an extension option. `interface` must return the `TypeId`
	/// of the interface object type, e.g. `|| TypeId::of::<dyn ITaxProvider>()`.
	pub const fn extension(
		section: &'static str,
		name: &'static str,
		default: &'static str,
		interface: fn() -> TypeId,
		interface_name: &'static str,
		doc: &'static str,
	) -> Self {
		Self::with_kind(
			section,
			name,
			OptionKind::Extension {
				interface,
				interface_name,
			},
			default,
			doc,
		)
	}

	pub const fn ordered_extensions(
		section: &'static str,
		name: &'static str,
		default: &'static str,
		interface: fn() -> TypeId,
		interface_name: &'static str,
		include_missing: bool,
		doc: &'static str,
	) -> Self {
		Self::with_kind(
			section,
			name,
			OptionKind::OrderedExtensions {
				interface,
				interface_name,
				include_missing,
			},
			default,
			doc,
		)
	}

	const fn with_kind(
		section: &'static str,
		name: &'static str,
		kind: OptionKind,
		default: &'static str,
		doc: &'static str,
	) -> Self {
		Self {
			section,
			name,
			kind,
			default,
			doc,
			owner: None,
		}
	}

	/// Attributes the option to a component by dotted name.
	pub const fn owned_by(mut self, owner: &'static str) -> Self {
		self.owner = Some(owner);
		self
	}

	/// Brings a raw value into the canonical textual form of this option's
	/// kind, so that defaults and file contents compare equal when they
	/// mean the same thing. Normalization never fails; values that do not
	/// parse pass through unchanged and are rejected on read instead.
	pub fn normalize(&self, value: &str) -> String {
		match self.kind {
			OptionKind::Bool => {
				let keyword = if as_bool(value, false) { "enabled" } else { "disabled" };
				keyword.to_owned()
			}
			OptionKind::Int => {
				let trimmed = value.trim();
				if trimmed.is_empty() {
					"0".to_owned()
				} else {
					match trimmed.parse::<i64>() {
						Ok(number) => number.to_string(),
						Err(_) => value.to_owned(),
					}
				}
			}
			OptionKind::Float => {
				let trimmed = value.trim();
				if trimmed.is_empty() {
					"0.0".to_owned()
				} else {
					match trimmed.parse::<f64>() {
						Ok(number) => format!("{number:?}"),
						Err(_) => value.to_owned(),
					}
				}
			}
			OptionKind::List { sep, keep_empty } => {
				let joiner = sep.first().copied().unwrap_or(",");
				split_and_trim(value, sep, keep_empty).join(joiner)
			}
			OptionKind::Text
			| OptionKind::Choice { .. }
			| OptionKind::Path
			| OptionKind::Extension { .. }
			| OptionKind::OrderedExtensions { .. } => value.to_owned(),
		}
	}

	/// Reads the option's value from a configuration store.
	///
	/// Extension-flavored options read as text here; their component
	/// resolution lives in [`crate::extension`].
	pub fn read(&self, config: &Configuration) -> Result<OptionValue, ConfigError> {
		match self.kind {
			OptionKind::Text
			| OptionKind::Extension { .. }
			| OptionKind::OrderedExtensions { .. } => {
				Ok(OptionValue::Text(config.get(self.section, self.name, self.default)))
			}
			OptionKind::Bool => Ok(OptionValue::Bool(config.getbool(
				self.section,
				self.name,
				self.default,
			))),
			OptionKind::Int => Ok(OptionValue::Int(config.getint(
				self.section,
				self.name,
				self.default,
			)?)),
			OptionKind::Float => Ok(OptionValue::Float(config.getfloat(
				self.section,
				self.name,
				self.default,
			)?)),
			OptionKind::List { sep, keep_empty } => Ok(OptionValue::List(config.getlist(
				self.section,
				self.name,
				self.default,
				sep,
				keep_empty,
			))),
			OptionKind::Choice { choices } => {
				let value = config.get(self.section, self.name, self.default);
				let value = value.trim().to_owned();
				if choices.contains(&value.as_str()) {
					Ok(OptionValue::Text(value))
				} else {
					let mut sorted: Vec<&str> = choices.to_vec();
					sorted.sort_unstable();
					let choices = sorted
						.iter()
						.map(|choice| format!("\"{choice}\""))
						.collect::<Vec<_>>()
						.join(", ");
					Err(ConfigError::Choice {
						section: self.section.to_owned(),
						key: self.name.to_owned(),
						choices,
						value,
					})
				}
			}
			OptionKind::Path => Ok(OptionValue::Path(config.getpath(
				self.section,
				self.name,
				self.default,
			))),
		}
	}
}

/// Splits on whichever separator matches leftmost; on a tie, the one
/// listed first wins. This mirrors leftmost-first alternation, so
/// `"a||b"` split on `["|", "||"]` yields `["a", "", "b"]`.
pub(crate) fn split_any<'v>(value: &'v str, seps: &[&str]) -> Vec<&'v str> {
	let mut items = Vec::new();
	let mut rest = value;
	loop {
		let mut earliest: Option<(usize, usize)> = None;
		for sep in seps {
			if sep.is_empty() {
				continue;
			}
			if let Some(pos) = rest.find(sep)
				&& earliest.is_none_or(|(best, _)| pos < best)
			{
				earliest = Some((pos, sep.len()));
			}
		}
		match earliest {
			Some((pos, len)) => {
				items.push(&rest[..pos]);
				rest = &rest[pos + len..];
			}
			None => {
				items.push(rest);
				return items;
			}
		}
	}
}

pub(crate) fn split_and_trim<'v>(value: &'v str, seps: &[&str], keep_empty: bool) -> Vec<&'v str> {
	if value.is_empty() {
		return Vec::new();
	}
	let seps = if seps.is_empty() { &[","][..] } else { seps };
	split_any(value, seps)
		.into_iter()
		.map(str::trim)
		.filter(|item| keep_empty || !item.is_empty())
		.collect()
}
