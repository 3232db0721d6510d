use std::any::{Any, TypeId};
use std::sync::Arc;

use crate::manager::ComponentManager;

/// Boxed error type used by component constructors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Trait implemented by every activatable component.
///
/// Implementations are generated by the [`component!`](crate::component!)
/// macro; the only required method exists so that the manager and the
/// per-interface casts can recover the concrete type from an
/// `Arc<dyn Component>`.
pub trait Component: Any + Send + Sync {
	/// Converts the component into an erased `Arc` suitable for downcasting.
	fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Trait tying a concrete component type to its static definition.
pub trait RegisteredComponent: Component {
	/// Returns the definition emitted by the `component!` macro.
	fn def() -> &'static ComponentDef;
}

/// Static definition of a component class.
///
/// The dotted `name` doubles as the component's identity in configuration
/// (enablement rules, extension option values match on the final segment).
pub struct ComponentDef {
	/// Fully qualified dotted name, e.g. `"girder.tax.flat_tax"`.
	pub name: &'static str,
	/// Returns the `TypeId` of the concrete component type.
	pub type_id: fn() -> TypeId,
	/// No-argument lifecycle hook; the manager reference allows reentrant
	/// resolution of collaborators during construction.
	pub ctor: fn(&ComponentManager) -> Result<Arc<dyn Component>, BoxError>,
	/// Interfaces this component declares to implement.
	pub implements: &'static [InterfaceBinding],
}

impl ComponentDef {
	/// Returns the final segment of the dotted name.
	pub fn short_name(&self) -> &'static str {
		self.name.rsplit('.').next().unwrap_or(self.name)
	}
}

impl core::fmt::Debug for ComponentDef {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("ComponentDef")
			.field("name", &self.name)
			.field("implements", &self.implements)
			.finish()
	}
}

/// Binding between a component class and one interface it implements.
///
/// The `cast` function receives the activated instance and returns a boxed
/// `Arc<dyn I>` for the bound interface; extension points downcast the box
/// back to the typed `Arc`.
pub struct InterfaceBinding {
	/// Returns the `TypeId` of the interface object type (`dyn I`).
	pub interface: fn() -> TypeId,
	/// Interface name as written at the declaration site.
	pub interface_name: &'static str,
	/// Casts the erased instance to a boxed `Arc<dyn I>`.
	pub cast: fn(Arc<dyn Component>) -> Box<dyn Any + Send + Sync>,
}

impl core::fmt::Debug for InterfaceBinding {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_tuple("InterfaceBinding")
			.field(&self.interface_name)
			.finish()
	}
}

/// Wrapper for `inventory::collect!`.
pub struct ComponentReg(pub &'static ComponentDef);

inventory::collect!(ComponentReg);
