use std::any::TypeId;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::def::ComponentDef;
use crate::error::ComponentError;
use crate::manager::ComponentManager;

/// Typed accessor for the enabled, activated implementers of an interface.
///
/// Every read recomputes the list against the manager's current registry
/// and enablement state; nothing is cached at this layer, so enablement or
/// configuration changes between reads are observed immediately.
pub struct ExtensionPoint<I: ?Sized + 'static> {
	_interface: PhantomData<fn() -> Box<I>>,
}

impl<I: ?Sized + 'static> ExtensionPoint<I> {
	/// Creates the extension point.
	pub const fn new() -> Self {
		Self {
			_interface: PhantomData,
		}
	}

	/// Returns the live instances implementing the interface, in interface
	/// registration order. Disabled implementers are skipped.
	pub fn extensions(&self, manager: &ComponentManager) -> Result<Vec<Arc<I>>, ComponentError> {
		Ok(self
			.extensions_with_defs(manager)?
			.into_iter()
			.map(|(_, instance)| instance)
			.collect())
	}

	/// Like [`ExtensionPoint::extensions`], but pairing each instance with
	/// its component definition. Used by extension-aware configuration
	/// options that match implementers by name.
	pub fn extensions_with_defs(
		&self,
		manager: &ComponentManager,
	) -> Result<Vec<(&'static ComponentDef, Arc<I>)>, ComponentError> {
		let mut out = Vec::new();
		for imp in manager.registry().implementers_of(TypeId::of::<I>()) {
			let Some(instance) = manager.instance(imp.def)? else {
				continue;
			};
			match (imp.binding.cast)(instance).downcast::<Arc<I>>() {
				Ok(typed) => out.push((imp.def, *typed)),
				// A binding registered under the wrong interface TypeId.
				Err(_) => debug_assert!(false, "interface binding produced a foreign type"),
			}
		}
		Ok(out)
	}
}

impl<I: ?Sized + 'static> Default for ExtensionPoint<I> {
	fn default() -> Self {
		Self::new()
	}
}

impl<I: ?Sized + 'static> Clone for ExtensionPoint<I> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<I: ?Sized + 'static> Copy for ExtensionPoint<I> {}

impl<I: ?Sized + 'static> core::fmt::Debug for ExtensionPoint<I> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		write!(f, "<ExtensionPoint {}>", std::any::type_name::<I>())
	}
}
