//! Options whose values name component implementations.
//!
//! An extension option stores the short class name of one implementer of
//! an interface; an ordered-extensions option stores a comma list of short
//! names. Resolution happens at read time against the manager's current
//! enablement state, so a component that is disabled after the value was
//! written simply stops resolving.

use std::any::TypeId;
use std::sync::Arc;

use girder_component::{ComponentDef, ComponentManager, ExtensionPoint, PrefixRules};

use crate::error::ConfigError;
use crate::option::{OptionDef, OptionKind, as_bool};
use crate::store::Configuration;

fn interface_label<I: ?Sized + 'static>(def: &OptionDef) -> &'static str {
	match def.kind {
		OptionKind::Extension {
			interface,
			interface_name,
		}
		| OptionKind::OrderedExtensions {
			interface,
			interface_name,
			..
		} => {
			debug_assert_eq!(interface(), TypeId::of::<I>());
			interface_name
		}
		_ => std::any::type_name::<I>(),
	}
}

/// Resolves an extension option to the one enabled implementer whose
/// [`ComponentDef::short_name`] matches the stored value.
pub fn extension_component<I: ?Sized + 'static>(
	def: &'static OptionDef,
	config: &Configuration,
	manager: &ComponentManager,
) -> Result<Arc<I>, ConfigError> {
	let value = config.get(def.section, def.name, def.default);
	let point = ExtensionPoint::<I>::new();
	for (component, instance) in point.extensions_with_defs(manager)? {
		if component.short_name() == value {
			return Ok(instance);
		}
	}
	Err(ConfigError::MissingExtension {
		interface: interface_label::<I>(def),
		section: def.section.to_owned(),
		key: def.name.to_owned(),
		value,
	})
}

/// Resolves an ordered-extensions option.
///
/// The stored comma list of short names comes first, in configured order;
/// with `include_missing`, the remaining enabled implementers follow in
/// registration order. A configured name that matches no enabled
/// implementer is an error listing the offenders, sorted.
pub fn ordered_extensions<I: ?Sized + 'static>(
	def: &'static OptionDef,
	config: &Configuration,
	manager: &ComponentManager,
) -> Result<Vec<Arc<I>>, ConfigError> {
	let include_missing = match def.kind {
		OptionKind::OrderedExtensions {
			include_missing, ..
		} => include_missing,
		_ => true,
	};
	let configured = config.getlist(def.section, def.name, def.default, &[","], false);
	let available = ExtensionPoint::<I>::new().extensions_with_defs(manager)?;

	let mut missing: Vec<&str> = configured
		.iter()
		.map(String::as_str)
		.filter(|name| {
			!available
				.iter()
				.any(|(component, _)| component.short_name() == *name)
		})
		.collect();
	if !missing.is_empty() {
		missing.sort_unstable();
		missing.dedup();
		return Err(ConfigError::MissingExtension {
			interface: interface_label::<I>(def),
			section: def.section.to_owned(),
			key: def.name.to_owned(),
			value: missing.join(", "),
		});
	}

	let mut out: Vec<Arc<I>> = Vec::new();
	let mut taken: Vec<&'static ComponentDef> = Vec::new();
	for name in &configured {
		for (component, instance) in &available {
			if component.short_name() == name.as_str()
				&& !taken.iter().any(|seen| std::ptr::eq(*seen, *component))
			{
				taken.push(component);
				out.push(instance.clone());
			}
		}
	}
	if include_missing {
		for (component, instance) in &available {
			if !taken.iter().any(|seen| std::ptr::eq(*seen, *component)) {
				out.push(instance.clone());
			}
		}
	}
	Ok(out)
}

/// Builds component enablement rules from the `[components]` section.
///
/// Each entry maps a dotted name or `.*` prefix pattern to a boolean
/// spelled the usual configuration ways.
pub fn component_rules(config: &Configuration) -> PrefixRules {
	let mut rules = PrefixRules::new();
	for (pattern, value) in config.section("components").options(None) {
		rules.add(&pattern, as_bool(&value, false));
	}
	rules
}
