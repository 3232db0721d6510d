//! Layered configuration store.
//!
//! A [`Configuration`] wraps one ini file plus the chain of parents named
//! by its `[inherit] file` entry. Reads resolve through four layers in
//! order: the store's own data, the first parent that defines the key
//! (recursively), the registered option default, and finally the caller's
//! default. Writes always target the topmost store and become durable only
//! through [`Configuration::save`], which persists the minimal diff
//! against the inherited and registered defaults.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use girder_component::ComponentManager;
use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::ConfigError;
use crate::file::{wait_for_file_mtime_change, write_atomic};
use crate::ini::IniDocument;
use crate::option::{OptionRegistry, as_bool, split_and_trim};

mod section;

pub use section::Section;

#[cfg(test)]
mod tests;

#[derive(Default)]
struct Inner {
	/// Current contents, including unsaved mutations.
	data: IniDocument,
	/// Snapshot of the last parsed or persisted state; failed saves roll
	/// back to it.
	pristine: IniDocument,
	parents: Vec<Arc<Configuration>>,
	last_mtime: Option<SystemTime>,
	/// Resolved values. Only successful resolutions land here; a fall
	/// through to the caller's default is never cached.
	cache: FxHashMap<(String, String), String>,
}

/// One layer of ini configuration, backed by a file or transient.
pub struct Configuration {
	filename: Option<PathBuf>,
	registry: Arc<OptionRegistry>,
	inner: RwLock<Inner>,
}

impl Configuration {
	/// Opens a configuration file, parsing it and its inheritance chain.
	/// A missing file yields an empty store that picks the file up once
	/// it appears.
	pub fn new(path: impl Into<PathBuf>) -> Result<Arc<Self>, ConfigError> {
		Self::with_registry(path, OptionRegistry::global())
	}

	/// Like [`Configuration::new`] with an explicit option registry.
	pub fn with_registry(
		path: impl Into<PathBuf>,
		registry: Arc<OptionRegistry>,
	) -> Result<Arc<Self>, ConfigError> {
		let config = Arc::new(Self {
			filename: Some(path.into()),
			registry,
			inner: RwLock::new(Inner::default()),
		});
		config.parse_if_needed(false)?;
		Ok(config)
	}

	/// Creates an in-memory store with no backing file. `save` is a no-op
	/// and reparse checks never fire.
	pub fn transient() -> Arc<Self> {
		Self::transient_with_registry(OptionRegistry::global())
	}

	/// Like [`Configuration::transient`] with an explicit option registry.
	pub fn transient_with_registry(registry: Arc<OptionRegistry>) -> Arc<Self> {
		Arc::new(Self {
			filename: None,
			registry,
			inner: RwLock::new(Inner::default()),
		})
	}

	pub fn filename(&self) -> Option<&Path> {
		self.filename.as_deref()
	}

	pub fn registry(&self) -> &Arc<OptionRegistry> {
		&self.registry
	}

	/// The current parent chain, nearest first.
	pub fn parents(&self) -> Vec<Arc<Configuration>> {
		self.inner.read().parents.clone()
	}

	/// Replaces the parent chain of a transient store.
	pub fn set_parents(&self, parents: Vec<Arc<Configuration>>) {
		let mut inner = self.inner.write();
		inner.parents = parents;
		inner.cache.clear();
	}

	/// Re-reads the backing file when its mtime has changed, or always
	/// with `force`; otherwise asks the parents to do the same. Returns
	/// whether anything was reloaded.
	///
	/// The new text is parsed into a fresh document first, so a parse
	/// error leaves the previously loaded state intact. A reload replaces
	/// the pristine snapshot, recomputes the parent chain from
	/// `[inherit] file` and drops the resolve cache.
	pub fn parse_if_needed(&self, force: bool) -> Result<bool, ConfigError> {
		let Some(filename) = &self.filename else {
			return Ok(false);
		};
		let modified = match fs::metadata(filename) {
			Ok(meta) => meta.modified()?,
			Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
			Err(err) => return Err(err.into()),
		};
		if !force && self.inner.read().last_mtime == Some(modified) {
			let parents = self.inner.read().parents.clone();
			let mut changed = false;
			for parent in &parents {
				changed |= parent.parse_if_needed(force)?;
			}
			return Ok(changed);
		}
		let text = fs::read_to_string(filename)?;
		let doc = IniDocument::parse(&text, &filename.display().to_string())?;
		let parents = self.load_parents(&doc, filename)?;
		let mut inner = self.inner.write();
		inner.pristine = doc.clone();
		inner.data = doc;
		inner.parents = parents;
		inner.last_mtime = Some(modified);
		inner.cache.clear();
		debug!(path = %filename.display(), "parsed configuration");
		Ok(true)
	}

	fn load_parents(
		&self,
		doc: &IniDocument,
		filename: &Path,
	) -> Result<Vec<Arc<Configuration>>, ConfigError> {
		let Some(inherit) = doc.get("inherit", "file") else {
			return Ok(Vec::new());
		};
		let base = match filename.parent() {
			Some(dir) if !dir.as_os_str().is_empty() => dir,
			_ => Path::new("."),
		};
		let mut parents = Vec::new();
		for name in split_and_trim(inherit, &[","], false) {
			parents.push(Configuration::with_registry(
				base.join(name),
				self.registry.clone(),
			)?);
		}
		Ok(parents)
	}

	/// Resolves a value: own data, then the first parent defining the
	/// key, then the registered default, then `default`. The first three
	/// outcomes are cached per key; the caller's default is not.
	pub fn get(&self, section: &str, key: &str, default: &str) -> String {
		let cache_key = (section.to_owned(), key.to_owned());
		if let Some(cached) = self.inner.read().cache.get(&cache_key) {
			return cached.clone();
		}
		let resolved = self
			.get_explicit(section, key)
			.or_else(|| self.registry.default_for(section, key));
		match resolved {
			Some(value) => {
				self.inner.write().cache.insert(cache_key, value.clone());
				value
			}
			None => default.to_owned(),
		}
	}

	/// Resolves through own data and parents only, skipping registered
	/// defaults. An empty stored value counts as defined and shadows the
	/// parents.
	pub fn get_explicit(&self, section: &str, key: &str) -> Option<String> {
		let inner = self.inner.read();
		if let Some(value) = inner.data.get(section, key) {
			return Some(value.to_owned());
		}
		let parents = inner.parents.clone();
		drop(inner);
		parents
			.iter()
			.find_map(|parent| parent.get_explicit(section, key))
	}

	pub fn getbool(&self, section: &str, key: &str, default: &str) -> bool {
		as_bool(&self.get(section, key, default), false)
	}

	/// An empty resolved value reads as 0.
	pub fn getint(&self, section: &str, key: &str, default: &str) -> Result<i64, ConfigError> {
		let value = self.get(section, key, default);
		let value = value.trim();
		if value.is_empty() {
			return Ok(0);
		}
		value.parse().map_err(|_| ConfigError::Value {
			section: section.to_owned(),
			key: key.to_owned(),
			expected: "integer",
			value: value.to_owned(),
		})
	}

	/// An empty resolved value reads as 0.0.
	pub fn getfloat(&self, section: &str, key: &str, default: &str) -> Result<f64, ConfigError> {
		let value = self.get(section, key, default);
		let value = value.trim();
		if value.is_empty() {
			return Ok(0.0);
		}
		value.parse().map_err(|_| ConfigError::Value {
			section: section.to_owned(),
			key: key.to_owned(),
			expected: "float",
			value: value.to_owned(),
		})
	}

	/// Splits the resolved value on whichever separator matches leftmost,
	/// trims the items and, unless `keep_empty`, drops empty ones.
	pub fn getlist(
		&self,
		section: &str,
		key: &str,
		default: &str,
		sep: &[&str],
		keep_empty: bool,
	) -> Vec<String> {
		let value = self.get(section, key, default);
		split_and_trim(&value, sep, keep_empty)
			.into_iter()
			.map(str::to_owned)
			.collect()
	}

	/// Resolves a filesystem path. An empty value yields the caller's
	/// default untouched; a relative value is taken relative to the
	/// configuration file's directory. Existing paths are canonicalized,
	/// others lexically normalized.
	pub fn getpath(&self, section: &str, key: &str, default: &str) -> PathBuf {
		let value = self.get(section, key, default);
		if value.is_empty() {
			return PathBuf::from(default);
		}
		let path = Path::new(&value);
		let resolved = if path.is_absolute() {
			path.to_path_buf()
		} else {
			match self.filename.as_deref().and_then(Path::parent) {
				Some(dir) if !dir.as_os_str().is_empty() => dir.join(path),
				_ => path.to_path_buf(),
			}
		};
		resolved
			.canonicalize()
			.unwrap_or_else(|_| normalize_lexically(&resolved))
	}

	/// Stores a value in the topmost layer. Not durable until `save`.
	pub fn set(&self, section: &str, key: &str, value: &str) {
		let mut inner = self.inner.write();
		inner.data.set(section, key, value);
		inner.cache.remove(&(section.to_owned(), key.to_owned()));
	}

	/// Removes a key from the topmost layer, unmasking any inherited or
	/// registered value.
	pub fn remove(&self, section: &str, key: &str) {
		let mut inner = self.inner.write();
		inner.data.remove(section, key);
		inner.cache.remove(&(section.to_owned(), key.to_owned()));
	}

	/// Returns a view over one section.
	pub fn section<'a>(&'a self, name: &str) -> Section<'a> {
		Section::new(self, name)
	}

	/// All known section names, sorted: own data, parents, and sections
	/// with registered options, the latter filtered by owner enablement
	/// when a manager is given.
	pub fn sections(&self, manager: Option<&ComponentManager>) -> Vec<String> {
		let mut names = BTreeSet::new();
		self.collect_sections(&mut names);
		for (def, _) in self.registry.options(manager) {
			names.insert(def.section.to_owned());
		}
		names.into_iter().collect()
	}

	fn collect_sections(&self, out: &mut BTreeSet<String>) {
		let inner = self.inner.read();
		for section in inner.data.sections() {
			out.insert(section.to_owned());
		}
		let parents = inner.parents.clone();
		drop(inner);
		for parent in parents {
			parent.collect_sections(out);
		}
	}

	/// Whether the key is defined in this store or a parent, or, with
	/// `defaults`, declared in the option registry.
	pub fn has_option(&self, section: &str, key: &str, defaults: bool) -> bool {
		self.has_explicit(section, key) || (defaults && self.registry.contains(section, key))
	}

	fn has_explicit(&self, section: &str, key: &str) -> bool {
		let inner = self.inner.read();
		if inner.data.has_option(section, key) {
			return true;
		}
		let parents = inner.parents.clone();
		drop(inner);
		parents
			.iter()
			.any(|parent| parent.has_explicit(section, key))
	}

	pub(crate) fn explicit_keys(&self, section: &str, out: &mut Vec<String>) {
		let inner = self.inner.read();
		for key in inner.data.keys(section) {
			if !out.iter().any(|seen| seen == key) {
				out.push(key.to_owned());
			}
		}
		let parents = inner.parents.clone();
		drop(inner);
		for parent in parents {
			parent.explicit_keys(section, out);
		}
	}

	/// Registered defaults grouped by section, normalized, filtered by
	/// owner enablement when a manager is given.
	pub fn defaults(
		&self,
		manager: Option<&ComponentManager>,
	) -> IndexMap<String, IndexMap<String, String>> {
		let mut out: IndexMap<String, IndexMap<String, String>> = IndexMap::new();
		for (def, default) in self.registry.options(manager) {
			out.entry(def.section.to_owned())
				.or_default()
				.insert(def.name.to_owned(), default);
		}
		out
	}

	/// Materializes registered defaults into the store for every declared
	/// key the store's own data does not define. `component` narrows the
	/// work to options owned by components under a dotted name prefix,
	/// with an optional trailing `.*`, matched segment-wise and
	/// case-insensitively.
	pub fn set_defaults(&self, manager: Option<&ComponentManager>, component: Option<&str>) {
		let filter: Vec<String> = match component {
			Some(pattern) => {
				let pattern = pattern.strip_suffix(".*").unwrap_or(pattern);
				pattern
					.to_ascii_lowercase()
					.split('.')
					.map(str::to_owned)
					.collect()
			}
			None => Vec::new(),
		};
		for (def, default) in self.registry.options(manager) {
			if !filter.is_empty() {
				let Some(owner) = def.owner else {
					continue;
				};
				let owner = owner.to_ascii_lowercase();
				let segments: Vec<&str> = owner.split('.').collect();
				if segments.len() < filter.len()
					|| !filter
						.iter()
						.zip(&segments)
						.all(|(want, have)| want == have)
				{
					continue;
				}
			}
			if !self.inner.read().data.has_option(def.section, def.name) {
				self.set(def.section, def.name, &default);
			}
		}
	}

	/// Persists the minimal diff to the backing file.
	///
	/// An entry is written only when its normalized value differs from
	/// the nearest parent's value or, when no parent defines the key,
	/// from the registered default. The write goes through an atomic
	/// temp-file replace after forcing a visible mtime change, so watchers
	/// notice. On any error the in-memory data reverts to the pristine
	/// snapshot before the error propagates; on success the snapshot
	/// advances to the saved state. A transient store saves nothing.
	pub fn save(&self) -> Result<(), ConfigError> {
		let Some(filename) = &self.filename else {
			return Ok(());
		};
		match self.write_out(filename) {
			Ok(()) => {
				let mut inner = self.inner.write();
				let data = inner.data.clone();
				inner.pristine = data;
				if let Ok(meta) = fs::metadata(filename) {
					inner.last_mtime = meta.modified().ok();
				}
				Ok(())
			}
			Err(err) => {
				let mut inner = self.inner.write();
				let pristine = inner.pristine.clone();
				inner.data = pristine;
				inner.cache.clear();
				Err(err)
			}
		}
	}

	fn write_out(&self, filename: &Path) -> Result<(), ConfigError> {
		let text = {
			let inner = self.inner.read();
			let parents = inner.parents.clone();
			let mut doc = IniDocument::default();
			for section in inner.data.sections() {
				for key in inner.data.keys(section) {
					let Some(value) = inner.data.get(section, key) else {
						continue;
					};
					let own = self.registry.normalize(section, key, value);
					let baseline = parents
						.iter()
						.find_map(|parent| parent.get_explicit(section, key))
						.map(|inherited| self.registry.normalize(section, key, &inherited))
						.or_else(|| self.registry.default_for(section, key));
					if baseline.as_deref() == Some(own.as_str()) {
						continue;
					}
					doc.set(section, key, &own);
				}
			}
			doc.serialize()
		};
		wait_for_file_mtime_change(filename)?;
		write_atomic(filename, text.as_bytes())?;
		debug!(path = %filename.display(), "saved configuration");
		Ok(())
	}

	/// Forces a visible mtime change on the backing file, so other
	/// processes watching it reparse.
	pub fn touch(&self) -> Result<(), ConfigError> {
		if let Some(filename) = &self.filename {
			wait_for_file_mtime_change(filename)?;
		}
		Ok(())
	}

	/// Mutates the underlying document without invalidating the resolve
	/// cache. Exists to pin down the cache coherency contract.
	#[cfg(test)]
	pub(crate) fn set_raw(&self, section: &str, key: &str, value: &str) {
		self.inner.write().data.set(section, key, value);
	}
}

impl core::fmt::Debug for Configuration {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		match &self.filename {
			Some(filename) => write!(f, "<Configuration {}>", filename.display()),
			None => write!(f, "<Configuration transient>"),
		}
	}
}

/// Resolves `.` and `..` components textually, without touching the
/// filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
	let mut out = PathBuf::new();
	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
					&& out.pop();
				if !popped && !path.has_root() {
					out.push("..");
				}
			}
			other => out.push(other.as_os_str()),
		}
	}
	out
}
