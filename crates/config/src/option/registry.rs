use std::sync::{Arc, LazyLock};

use girder_component::ComponentManager;
use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::trace;

use crate::option::def::OptionDef;

/// Wrapper for `inventory::collect!`.
pub struct OptionReg(pub &'static OptionDef);

inventory::collect!(OptionReg);

struct OptionEntry {
	def: &'static OptionDef,
	/// The declared default, normalized once at registration so that a
	/// default read and a file read of the same value compare equal.
	default: String,
}

/// Ordered ledger of option declarations, keyed by `(section, name)`.
///
/// The process-wide default is seeded from `inventory` submissions on
/// first access; tests construct their own instances to isolate
/// registration state. Declaring the same `(section, name)` twice keeps
/// the later declaration.
pub struct OptionRegistry {
	inner: RwLock<IndexMap<(String, String), OptionEntry>>,
}

static GLOBAL: LazyLock<Arc<OptionRegistry>> = LazyLock::new(|| {
	let registry = OptionRegistry::new();
	for reg in inventory::iter::<OptionReg> {
		registry.register(reg.0);
	}
	Arc::new(registry)
});

impl OptionRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self {
			inner: RwLock::new(IndexMap::new()),
		}
	}

	/// Returns the process-wide registry, seeded from `OptionReg`
	/// submissions on first access.
	pub fn global() -> Arc<OptionRegistry> {
		GLOBAL.clone()
	}

	/// Records a declaration, replacing any previous one for the same
	/// `(section, name)`.
	pub fn register(&self, def: &'static OptionDef) {
		let default = def.normalize(def.default);
		self.inner
			.write()
			.insert((def.section.to_owned(), def.name.to_owned()), OptionEntry {
				def,
				default,
			});
		trace!(section = def.section, name = def.name, "registered option");
	}

	pub fn contains(&self, section: &str, name: &str) -> bool {
		self.inner
			.read()
			.contains_key(&(section.to_owned(), name.to_owned()))
	}

	/// Returns the declaration for a key, if any.
	pub fn lookup(&self, section: &str, name: &str) -> Option<&'static OptionDef> {
		self.inner
			.read()
			.get(&(section.to_owned(), name.to_owned()))
			.map(|entry| entry.def)
	}

	/// Returns the normalized default for a key, if declared.
	pub fn default_for(&self, section: &str, name: &str) -> Option<String> {
		self.inner
			.read()
			.get(&(section.to_owned(), name.to_owned()))
			.map(|entry| entry.default.clone())
	}

	/// Normalizes a value per the declaration for the key; undeclared keys
	/// pass through unchanged.
	pub fn normalize(&self, section: &str, name: &str, value: &str) -> String {
		match self.lookup(section, name) {
			Some(def) => def.normalize(value),
			None => value.to_owned(),
		}
	}

	/// Section names that have at least one declaration, first-seen order.
	pub fn sections(&self) -> Vec<String> {
		let inner = self.inner.read();
		let mut names = Vec::new();
		for (section, _) in inner.keys() {
			if !names.contains(section) {
				names.push(section.clone());
			}
		}
		names
	}

	/// Declared key names of one section, in declaration order.
	pub fn keys(&self, section: &str) -> Vec<String> {
		self.inner
			.read()
			.keys()
			.filter(|(declared, _)| declared == section)
			.map(|(_, name)| name.clone())
			.collect()
	}

	/// Declarations with their normalized defaults, in declaration order.
	///
	/// With a manager, declarations owned by a component that is not
	/// enabled in the manager's scope are dropped. Ownerless declarations
	/// and owners unknown to the manager's registry are always kept.
	pub fn options(
		&self,
		manager: Option<&ComponentManager>,
	) -> Vec<(&'static OptionDef, String)> {
		let entries: Vec<(&'static OptionDef, String)> = self
			.inner
			.read()
			.values()
			.map(|entry| (entry.def, entry.default.clone()))
			.collect();
		let Some(manager) = manager else {
			return entries;
		};
		entries
			.into_iter()
			.filter(|(def, _)| match def.owner {
				Some(owner) => match manager.registry().find_by_name(owner) {
					Some(component) => manager.is_enabled(component),
					None => true,
				},
				None => true,
			})
			.collect()
	}
}

impl Default for OptionRegistry {
	fn default() -> Self {
		Self::new()
	}
}
