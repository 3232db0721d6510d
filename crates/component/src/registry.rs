use std::any::TypeId;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::def::{ComponentDef, ComponentReg, InterfaceBinding};

/// A component class together with the binding for one interface it
/// implements.
#[derive(Clone, Copy)]
pub struct Implementer {
	/// The implementing component class.
	pub def: &'static ComponentDef,
	pub(crate) binding: &'static InterfaceBinding,
}

#[derive(Default)]
struct RegistryInner {
	components: Vec<&'static ComponentDef>,
	by_type: FxHashMap<TypeId, &'static ComponentDef>,
	implementers: FxHashMap<TypeId, Vec<Implementer>>,
}

/// Process-wide ledger of component definitions.
///
/// The default registry is populated once from link-time submissions (see
/// [`ComponentRegistry::global`]); tests construct their own instances to
/// keep registration state isolated. The ledger is append-only: the first
/// registration of a `TypeId` wins and later ones are ignored, matching
/// declaration-time semantics.
pub struct ComponentRegistry {
	inner: RwLock<RegistryInner>,
}

static GLOBAL: LazyLock<Arc<ComponentRegistry>> = LazyLock::new(|| {
	let registry = ComponentRegistry::new();
	for reg in inventory::iter::<ComponentReg> {
		registry.register(reg.0);
	}
	Arc::new(registry)
});

impl ComponentRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self {
			inner: RwLock::new(RegistryInner::default()),
		}
	}

	/// Returns the process-wide registry, seeded from `component!`
	/// declarations on first access.
	pub fn global() -> Arc<ComponentRegistry> {
		GLOBAL.clone()
	}

	/// Records a component definition.
	///
	/// The class is appended to the interface list of every interface it
	/// declares, deduplicated, preserving first-registration order.
	pub fn register(&self, def: &'static ComponentDef) {
		let mut inner = self.inner.write();
		let type_id = (def.type_id)();
		if inner.by_type.contains_key(&type_id) {
			return;
		}
		inner.by_type.insert(type_id, def);
		inner.components.push(def);
		for binding in def.implements {
			let list = inner.implementers.entry((binding.interface)()).or_default();
			if !list.iter().any(|imp| std::ptr::eq(imp.def, def)) {
				list.push(Implementer { def, binding });
			}
		}
		trace!(component = def.name, "registered component");
	}

	/// Returns whether a component with the given `TypeId` is known.
	pub fn contains(&self, type_id: TypeId) -> bool {
		self.inner.read().by_type.contains_key(&type_id)
	}

	/// Returns the definition registered for the given `TypeId`.
	pub fn get(&self, type_id: TypeId) -> Option<&'static ComponentDef> {
		self.inner.read().by_type.get(&type_id).copied()
	}

	/// Looks up a definition by its fully qualified dotted name.
	pub fn find_by_name(&self, name: &str) -> Option<&'static ComponentDef> {
		self.inner
			.read()
			.components
			.iter()
			.find(|def| def.name == name)
			.copied()
	}

	/// Returns all registered definitions in registration order.
	pub fn components(&self) -> Vec<&'static ComponentDef> {
		self.inner.read().components.clone()
	}

	/// Returns the ordered implementers of the given interface.
	pub fn implementers_of(&self, interface: TypeId) -> Vec<Implementer> {
		self.inner
			.read()
			.implementers
			.get(&interface)
			.cloned()
			.unwrap_or_default()
	}
}

impl Default for ComponentRegistry {
	fn default() -> Self {
		Self::new()
	}
}
