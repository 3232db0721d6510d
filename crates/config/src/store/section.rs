use std::path::PathBuf;

use girder_component::ComponentManager;

use crate::error::ConfigError;
use crate::store::Configuration;

/// Thin view over one section of a [`Configuration`].
///
/// All reads delegate to the owning store and therefore see the full
/// resolution chain, not just this layer's data.
#[derive(Debug)]
pub struct Section<'a> {
	config: &'a Configuration,
	name: String,
}

impl<'a> Section<'a> {
	pub(crate) fn new(config: &'a Configuration, name: &str) -> Self {
		Self {
			config,
			name: name.to_owned(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn get(&self, key: &str, default: &str) -> String {
		self.config.get(&self.name, key, default)
	}

	pub fn getbool(&self, key: &str, default: &str) -> bool {
		self.config.getbool(&self.name, key, default)
	}

	pub fn getint(&self, key: &str, default: &str) -> Result<i64, ConfigError> {
		self.config.getint(&self.name, key, default)
	}

	pub fn getfloat(&self, key: &str, default: &str) -> Result<f64, ConfigError> {
		self.config.getfloat(&self.name, key, default)
	}

	pub fn getlist(&self, key: &str, default: &str, sep: &[&str], keep_empty: bool) -> Vec<String> {
		self.config.getlist(&self.name, key, default, sep, keep_empty)
	}

	pub fn getpath(&self, key: &str, default: &str) -> PathBuf {
		self.config.getpath(&self.name, key, default)
	}

	pub fn set(&self, key: &str, value: &str) {
		self.config.set(&self.name, key, value);
	}

	pub fn remove(&self, key: &str) {
		self.config.remove(&self.name, key);
	}

	/// Whether the key is defined here or in a parent, or, with
	/// `defaults`, declared in the option registry.
	pub fn contains(&self, key: &str, defaults: bool) -> bool {
		self.config.has_option(&self.name, key, defaults)
	}

	/// Key names in first-seen order: own data, then parents, then
	/// registered declarations (filtered by owner enablement when a
	/// manager is given).
	pub fn keys(&self, manager: Option<&ComponentManager>) -> Vec<String> {
		let mut keys = Vec::new();
		self.config.explicit_keys(&self.name, &mut keys);
		for (def, _) in self.config.registry().options(manager) {
			if def.section == self.name && !keys.iter().any(|seen| seen == def.name) {
				keys.push(def.name.to_owned());
			}
		}
		keys
	}

	/// `(key, resolved value)` pairs for every key in [`Section::keys`].
	pub fn options(&self, manager: Option<&ComponentManager>) -> Vec<(String, String)> {
		self.keys(manager)
			.into_iter()
			.map(|key| {
				let value = self.get(&key, "");
				(key, value)
			})
			.collect()
	}
}
