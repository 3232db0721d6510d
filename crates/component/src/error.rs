use thiserror::Error;

use crate::def::BoxError;

/// Errors raised by component activation.
#[derive(Debug, Error)]
pub enum ComponentError {
	/// The requested class was never registered as a component.
	#[error("component \"{name}\" is not registered")]
	NotRegistered {
		/// Dotted name of the requested component.
		name: &'static str,
	},

	/// The component's constructor failed.
	#[error("unable to instantiate component \"{name}\": {source}")]
	Instantiation {
		/// Dotted name of the component being constructed.
		name: &'static str,
		/// The underlying constructor error.
		#[source]
		source: BoxError,
	},
}
