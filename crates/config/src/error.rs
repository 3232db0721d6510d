use thiserror::Error;

/// Errors raised by configuration parsing, typed reads, and persistence.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The ini text could not be parsed.
	#[error("error parsing {path}, line {line}: {message}")]
	Parse {
		/// Path of the offending file, or a placeholder for in-memory text.
		path: String,
		/// One-based line number.
		line: usize,
		/// What was wrong with the line.
		message: String,
	},

	/// A stored value could not be converted to the requested type.
	#[error("[{section}] {key}: expected {expected}, got \"{value}\"")]
	Value {
		section: String,
		key: String,
		/// Human name of the expected type, e.g. `"integer"`.
		expected: &'static str,
		value: String,
	},

	/// A stored value is not one of the declared choices.
	#[error("[{section}] {key}: expected one of ({choices}), got \"{value}\"")]
	Choice {
		section: String,
		key: String,
		/// The allowed values, sorted and quoted.
		choices: String,
		value: String,
	},

	/// A configured implementation name does not resolve to an enabled
	/// component.
	#[error(
		"cannot find an implementation of the \"{interface}\" interface named \"{value}\"; \
		 check that the component is enabled or update [{section}] {key}"
	)]
	MissingExtension {
		interface: &'static str,
		section: String,
		key: String,
		value: String,
	},

	/// Filesystem access failed.
	#[error(transparent)]
	Io(#[from] std::io::Error),

	/// Component activation failed while resolving an extension option.
	#[error(transparent)]
	Component(#[from] girder_component::ComponentError),
}
