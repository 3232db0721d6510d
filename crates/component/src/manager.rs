use std::any::{Any, TypeId};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::def::{Component, ComponentDef, RegisteredComponent};
use crate::error::ComponentError;
use crate::registry::ComponentRegistry;

/// Hook deciding whether a component class may be activated in a manager's
/// scope.
pub trait EnablementPolicy: Send + Sync {
	/// Returns `Some(true)` if the class is enabled, `Some(false)` if it was
	/// disabled explicitly, and `None` if neither. A class that is neither
	/// enabled nor disabled explicitly is not available.
	fn is_component_enabled(&self, def: &ComponentDef) -> Option<bool>;
}

/// Default policy: every class is enabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultEnablement;

impl EnablementPolicy for DefaultEnablement {
	fn is_component_enabled(&self, _def: &ComponentDef) -> Option<bool> {
		Some(true)
	}
}

/// Opaque manager-scoped collaborators, keyed by type.
///
/// The manager injects these into components indirectly: a constructor can
/// read them through [`ComponentManager::ambient`]. Typical contents are a
/// deployment-unit name or a logging handle.
#[derive(Default)]
pub struct AmbientValues {
	values: FxHashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl AmbientValues {
	/// Stores a value, replacing any previous value of the same type.
	pub fn insert<T: Any + Send + Sync>(&mut self, value: Arc<T>) {
		self.values.insert(TypeId::of::<T>(), value);
	}

	/// Retrieves a value by type.
	pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		self.values
			.get(&TypeId::of::<T>())
			.cloned()
			.and_then(|value| value.downcast::<T>().ok())
	}
}

type ActivationHook = Box<dyn Fn(&Arc<dyn Component>) + Send + Sync>;

#[derive(Default)]
struct ManagerState {
	/// `None` marks a force-disabled class whose instance was evicted, so a
	/// repeated request consistently resolves to no instance.
	instances: FxHashMap<TypeId, Option<Arc<dyn Component>>>,
	enabled: FxHashMap<TypeId, bool>,
}

/// Owner of a scope of activated component instances.
///
/// Instances are created lazily on first access and live until the manager
/// is dropped. Enablement decisions are memoized per manager; two managers
/// over the same registry never share instances.
pub struct ComponentManager {
	registry: Arc<ComponentRegistry>,
	policy: Box<dyn EnablementPolicy>,
	activation: Option<ActivationHook>,
	ambient: AmbientValues,
	state: Mutex<ManagerState>,
}

impl ComponentManager {
	/// Creates a manager over the process-wide registry with the default
	/// enablement policy.
	pub fn new() -> Self {
		Self::with_registry(ComponentRegistry::global())
	}

	/// Creates a manager over an explicit registry.
	pub fn with_registry(registry: Arc<ComponentRegistry>) -> Self {
		Self {
			registry,
			policy: Box::new(DefaultEnablement),
			activation: None,
			ambient: AmbientValues::default(),
			state: Mutex::new(ManagerState::default()),
		}
	}

	/// Replaces the enablement policy.
	pub fn with_policy(mut self, policy: impl EnablementPolicy + 'static) -> Self {
		self.policy = Box::new(policy);
		self
	}

	/// Installs an activation hook, run after construction and before the
	/// instance is cached.
	pub fn with_activation(
		mut self,
		hook: impl Fn(&Arc<dyn Component>) + Send + Sync + 'static,
	) -> Self {
		self.activation = Some(Box::new(hook));
		self
	}

	/// Adds a manager-scoped ambient value.
	pub fn with_ambient<T: Any + Send + Sync>(mut self, value: Arc<T>) -> Self {
		self.ambient.insert(value);
		self
	}

	/// Returns the ambient value bag.
	pub fn ambient(&self) -> &AmbientValues {
		&self.ambient
	}

	/// Returns the registry this manager resolves against.
	pub fn registry(&self) -> &Arc<ComponentRegistry> {
		&self.registry
	}

	/// Pre-binds an instance for the given definition.
	///
	/// This is the "manager is itself a component" case: the instance
	/// resolves without going through the generic construction path.
	pub fn adopt_self(&self, def: &ComponentDef, instance: Arc<dyn Component>) {
		self.state
			.lock()
			.instances
			.insert((def.type_id)(), Some(instance));
	}

	/// Returns whether an instance for the class is currently activated.
	pub fn is_active(&self, def: &ComponentDef) -> bool {
		matches!(
			self.state.lock().instances.get(&(def.type_id)()),
			Some(Some(_))
		)
	}

	/// Returns whether the class is enabled in this scope, memoizing the
	/// policy's answer.
	pub fn is_enabled(&self, def: &ComponentDef) -> bool {
		let type_id = (def.type_id)();
		if let Some(&enabled) = self.state.lock().enabled.get(&type_id) {
			return enabled;
		}
		let enabled = self.policy.is_component_enabled(def) == Some(true);
		self.state.lock().enabled.insert(type_id, enabled);
		enabled
	}

	/// Forces a class to be enabled.
	pub fn enable<C: RegisteredComponent>(&self) {
		self.enable_def(C::def());
	}

	/// Forces a class to be enabled. A disable sentinel left by an earlier
	/// [`ComponentManager::disable`] is cleared so the class can activate
	/// again.
	pub fn enable_def(&self, def: &ComponentDef) {
		let type_id = (def.type_id)();
		let mut state = self.state.lock();
		state.enabled.insert(type_id, true);
		if matches!(state.instances.get(&type_id), Some(None)) {
			state.instances.remove(&type_id);
		}
	}

	/// Forces a class to be disabled, evicting any cached instance so a
	/// subsequent resolution does not observe a stale activated object.
	pub fn disable<C: RegisteredComponent>(&self) {
		self.disable_def(C::def());
	}

	/// Forces a class to be disabled. See [`ComponentManager::disable`].
	pub fn disable_def(&self, def: &ComponentDef) {
		let type_id = (def.type_id)();
		let mut state = self.state.lock();
		state.enabled.insert(type_id, false);
		state.instances.insert(type_id, None);
	}

	/// Activates the component for the given definition, or returns the
	/// existing instance if the component has already been activated.
	///
	/// A disabled class resolves to `Ok(None)`. No lock is held while the
	/// constructor runs, so construction may reenter the manager; the
	/// instance is cached only after the activation hook has run.
	pub fn instance(
		&self,
		def: &ComponentDef,
	) -> Result<Option<Arc<dyn Component>>, ComponentError> {
		let type_id = (def.type_id)();
		// Cache first: an adopted instance resolves without consulting the
		// enablement policy, and a disable sentinel short-circuits too.
		if let Some(slot) = self.state.lock().instances.get(&type_id) {
			return Ok(slot.clone());
		}
		if !self.is_enabled(def) {
			return Ok(None);
		}
		if !self.registry.contains(type_id) {
			return Err(ComponentError::NotRegistered { name: def.name });
		}
		let instance = (def.ctor)(self).map_err(|source| ComponentError::Instantiation {
			name: def.name,
			source,
		})?;
		if let Some(hook) = &self.activation {
			hook(&instance);
		}
		debug!(component = def.name, "activated component");
		self.state
			.lock()
			.instances
			.insert(type_id, Some(instance.clone()));
		Ok(Some(instance))
	}

	/// Typed variant of [`ComponentManager::instance`].
	pub fn get<C: RegisteredComponent>(&self) -> Result<Option<Arc<C>>, ComponentError> {
		Ok(self
			.instance(C::def())?
			.and_then(|component| component.as_any_arc().downcast::<C>().ok()))
	}
}

impl Default for ComponentManager {
	fn default() -> Self {
		Self::new()
	}
}
