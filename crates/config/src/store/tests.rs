use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::file::wait_for_file_mtime_change;
use crate::option::{OptionDef, OptionRegistry};
use crate::store::Configuration;

fn empty_registry() -> Arc<OptionRegistry> {
	Arc::new(OptionRegistry::new())
}

fn transient() -> Arc<Configuration> {
	Configuration::transient_with_registry(empty_registry())
}

#[test]
fn test_get_set_remove() {
	let config = transient();
	assert_eq!(config.get("a", "option", "fallback"), "fallback");
	config.set("a", "option", "x");
	assert_eq!(config.get("a", "option", "fallback"), "x");
	config.remove("a", "option");
	assert_eq!(config.get("a", "option", "fallback"), "fallback");
}

#[test]
fn test_child_shadows_parent() {
	let parent = transient();
	parent.set("a", "option", "inherited");
	parent.set("a", "other", "kept");
	let child = transient();
	child.set_parents(vec![parent]);
	assert_eq!(child.get("a", "option", ""), "inherited");
	child.set("a", "option", "own");
	assert_eq!(child.get("a", "option", ""), "own");
	// An empty own value still shadows the parent.
	child.set("a", "other", "");
	assert_eq!(child.get("a", "other", "fallback"), "");
}

#[test]
fn test_remove_falls_through_to_parent() {
	let parent = transient();
	parent.set("a", "option", "inherited");
	let child = transient();
	child.set_parents(vec![parent]);
	child.set("a", "option", "own");
	assert_eq!(child.get("a", "option", ""), "own");
	child.remove("a", "option");
	assert_eq!(child.get("a", "option", ""), "inherited");
}

#[test]
fn test_first_parent_wins() {
	let near = transient();
	near.set("a", "option", "near");
	let far = transient();
	far.set("a", "option", "far");
	far.set("a", "extra", "only far");
	let child = transient();
	child.set_parents(vec![near, far]);
	assert_eq!(child.get("a", "option", ""), "near");
	assert_eq!(child.get("a", "extra", ""), "only far");
}

#[test]
fn test_registry_default_resolution() {
	static OPT: OptionDef = OptionDef::bool("a", "flag", "yes", "");
	let registry = empty_registry();
	registry.register(&OPT);
	let config = Configuration::transient_with_registry(registry);
	// The registered default is normalized and beats the caller's.
	assert_eq!(config.get("a", "flag", "whatever"), "enabled");
	config.set("a", "flag", "no");
	assert_eq!(config.get("a", "flag", ""), "no");
}

#[test]
fn test_caller_default_is_not_cached() {
	let config = transient();
	assert_eq!(config.get("a", "option", "first"), "first");
	assert_eq!(config.get("a", "option", "second"), "second");
}

#[test]
fn test_resolved_values_are_cached() {
	let config = transient();
	config.set("a", "option", "x");
	assert_eq!(config.get("a", "option", ""), "x");
	// A raw mutation that bypasses set() is invisible until the key is
	// invalidated through the public mutators.
	config.set_raw("a", "option", "mutated");
	assert_eq!(config.get("a", "option", ""), "x");
	config.set("a", "option", "mutated");
	assert_eq!(config.get("a", "option", ""), "mutated");
}

#[test]
fn test_getbool_spellings() {
	let config = transient();
	for (value, expected) in [
		("yes", true),
		("True", true),
		("enabled", true),
		("on", true),
		("1", true),
		("-1", true),
		("no", false),
		("False", false),
		("disabled", false),
		("off", false),
		("0", false),
		("0.0", false),
		("junk", false),
	] {
		config.set("a", "flag", value);
		assert_eq!(config.getbool("a", "flag", ""), expected, "{value}");
	}
	assert!(config.getbool("a", "missing", "yes"));
	assert!(!config.getbool("a", "missing", ""));
}

#[test]
fn test_getint() {
	let config = transient();
	assert_eq!(config.getint("a", "missing", "").unwrap(), 0);
	assert_eq!(config.getint("a", "missing", "42").unwrap(), 42);
	config.set("a", "count", " -7 ");
	assert_eq!(config.getint("a", "count", "").unwrap(), -7);
	config.set("a", "count", "4.2");
	let err = config.getint("a", "count", "").unwrap_err();
	assert_eq!(err.to_string(), "[a] count: expected integer, got \"4.2\"");
}

#[test]
fn test_getfloat() {
	let config = transient();
	assert_eq!(config.getfloat("a", "missing", "").unwrap(), 0.0);
	config.set("a", "ratio", "2.5");
	assert_eq!(config.getfloat("a", "ratio", "").unwrap(), 2.5);
	config.set("a", "ratio", "two and a half");
	assert!(matches!(
		config.getfloat("a", "ratio", ""),
		Err(ConfigError::Value { .. })
	));
}

#[test]
fn test_getlist() {
	let config = transient();
	assert!(config.getlist("a", "missing", "", &[","], false).is_empty());
	config.set("a", "items", " a , b ,, c ");
	assert_eq!(
		config.getlist("a", "items", "", &[","], false),
		vec!["a", "b", "c"]
	);
	assert_eq!(
		config.getlist("a", "items", "", &[","], true),
		vec!["a", "b", "", "c"]
	);
	config.set("a", "items", "42 foo,bar||baz,||blah");
	assert_eq!(
		config.getlist("a", "items", "", &[" ", ",", "||"], true),
		vec!["42", "foo", "bar", "baz", "", "blah"]
	);
}

#[test]
fn test_getpath() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("conf.ini");
	fs::write(&path, "[a]\nrelative = sub/../other\n").unwrap();
	let config = Configuration::with_registry(&path, empty_registry()).unwrap();
	// An empty stored value returns the caller's default untouched.
	config.set("a", "empty", "");
	assert_eq!(
		config.getpath("a", "empty", "unchanged/./default"),
		Path::new("unchanged/./default")
	);
	// A caller default for a missing key resolves like a stored value.
	assert_eq!(
		config.getpath("a", "missing", "fallback"),
		dir.path().join("fallback")
	);
	// Relative values resolve against the file's directory; the missing
	// target is normalized lexically.
	assert_eq!(config.getpath("a", "relative", ""), dir.path().join("other"));
	// An existing target is canonicalized.
	config.set("a", "here", ".");
	assert_eq!(
		config.getpath("a", "here", ""),
		dir.path().canonicalize().unwrap()
	);
}

#[test]
fn test_file_round_trip() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("conf.ini");
	fs::write(&path, "[a]\noption = x\n").unwrap();
	let config = Configuration::with_registry(&path, empty_registry()).unwrap();
	assert_eq!(config.get("a", "option", ""), "x");
	config.set("a", "option", "y");
	config.set("b", "naïve", "Москва");
	config.save().unwrap();

	let reloaded = Configuration::with_registry(&path, empty_registry()).unwrap();
	assert_eq!(reloaded.get("a", "option", ""), "y");
	assert_eq!(reloaded.get("b", "naïve", ""), "Москва");
}

#[test]
fn test_missing_file_is_empty() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("absent.ini");
	let config = Configuration::with_registry(&path, empty_registry()).unwrap();
	assert_eq!(config.get("a", "option", "fallback"), "fallback");
	assert!(!config.parse_if_needed(false).unwrap());
}

#[test]
fn test_parse_error_reported() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("broken.ini");
	fs::write(&path, "[unterminated\n").unwrap();
	assert!(matches!(
		Configuration::with_registry(&path, empty_registry()),
		Err(ConfigError::Parse { line: 1, .. })
	));
}

#[test]
fn test_reparse_on_mtime_change() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("conf.ini");
	fs::write(&path, "[a]\noption = old\n").unwrap();
	let config = Configuration::with_registry(&path, empty_registry()).unwrap();
	assert_eq!(config.get("a", "option", ""), "old");

	fs::write(&path, "[a]\noption = new\n").unwrap();
	wait_for_file_mtime_change(&path).unwrap();
	assert!(config.parse_if_needed(false).unwrap());
	assert_eq!(config.get("a", "option", ""), "new");
	// Unchanged since the reload.
	assert!(!config.parse_if_needed(false).unwrap());
}

#[test]
fn test_failed_reparse_keeps_previous_state() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("conf.ini");
	fs::write(&path, "[a]\noption = good\n").unwrap();
	let config = Configuration::with_registry(&path, empty_registry()).unwrap();

	fs::write(&path, "[broken\n").unwrap();
	wait_for_file_mtime_change(&path).unwrap();
	assert!(config.parse_if_needed(false).is_err());
	assert_eq!(config.get("a", "option", ""), "good");
}

#[test]
fn test_inherit_file_chain() {
	let dir = tempfile::tempdir().unwrap();
	fs::write(
		dir.path().join("site.ini"),
		"[a]\noption = site\nextra = only site\n",
	)
	.unwrap();
	let child_path = dir.path().join("conf.ini");
	fs::write(
		&child_path,
		"[inherit]\nfile = site.ini\n\n[a]\noption = child\n",
	)
	.unwrap();
	let config = Configuration::with_registry(&child_path, empty_registry()).unwrap();
	assert_eq!(config.get("a", "option", ""), "child");
	assert_eq!(config.get("a", "extra", ""), "only site");
	assert_eq!(config.parents().len(), 1);
}

#[test]
fn test_save_omits_values_matching_parent() {
	let dir = tempfile::tempdir().unwrap();
	fs::write(dir.path().join("site.ini"), "[a]\noption = x\n").unwrap();
	let child_path = dir.path().join("conf.ini");
	fs::write(&child_path, "[inherit]\nfile = site.ini\n").unwrap();
	let config = Configuration::with_registry(&child_path, empty_registry()).unwrap();
	config.set("a", "option", "x");
	config.set("b", "option", "y");
	config.save().unwrap();

	let saved = fs::read_to_string(&child_path).unwrap();
	assert!(!saved.contains("[a]"), "saved:\n{saved}");
	assert!(saved.contains("[b]\noption = y\n"), "saved:\n{saved}");
	assert!(saved.contains("[inherit]\nfile = site.ini\n"), "saved:\n{saved}");
}

#[test]
fn test_save_omits_values_matching_registry_default() {
	static FLAG: OptionDef = OptionDef::bool("a", "flag", "yes", "");
	let registry = empty_registry();
	registry.register(&FLAG);
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("conf.ini");
	let config = Configuration::with_registry(&path, registry).unwrap();
	// "true" normalizes to "enabled", equal to the registered default.
	config.set("a", "flag", "true");
	config.set("a", "other", "kept");
	config.save().unwrap();

	let saved = fs::read_to_string(&path).unwrap();
	assert!(!saved.contains("flag"), "saved:\n{saved}");
	assert!(saved.contains("other = kept"), "saved:\n{saved}");
}

#[test]
fn test_save_is_idempotent() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("conf.ini");
	let config = Configuration::with_registry(&path, empty_registry()).unwrap();
	config.set("b", "zebra", "1");
	config.set("a", "option", "x");
	config.save().unwrap();
	let first = fs::read_to_string(&path).unwrap();
	config.save().unwrap();
	let second = fs::read_to_string(&path).unwrap();
	assert_eq!(first, second);
	assert_eq!(
		first,
		"# -*- coding: utf-8 -*-\n\n[a]\noption = x\n\n[b]\nzebra = 1\n\n"
	);
}

#[test]
fn test_save_failure_reverts_to_pristine() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("no_such_dir").join("conf.ini");
	let config = Configuration::with_registry(&path, empty_registry()).unwrap();
	config.set("a", "option", "doomed");
	assert_eq!(config.get("a", "option", ""), "doomed");
	assert!(config.save().is_err());
	// The unsaved mutation is gone and the cache with it.
	assert_eq!(config.get("a", "option", "fallback"), "fallback");
}

#[test]
fn test_transient_save_is_noop() {
	let config = transient();
	config.set("a", "option", "x");
	config.save().unwrap();
	assert_eq!(config.get("a", "option", ""), "x");
}

#[test]
fn test_sections_and_has_option() {
	static OPT: OptionDef = OptionDef::text("registered", "opt", "", "");
	let registry = empty_registry();
	registry.register(&OPT);
	let parent = Configuration::transient_with_registry(registry.clone());
	parent.set("inherited", "option", "x");
	let config = Configuration::transient_with_registry(registry);
	config.set_parents(vec![parent]);
	config.set("own", "option", "y");
	assert_eq!(
		config.sections(None),
		vec!["inherited", "own", "registered"]
	);
	assert!(config.has_option("own", "option", false));
	assert!(config.has_option("inherited", "option", false));
	assert!(!config.has_option("registered", "opt", false));
	assert!(config.has_option("registered", "opt", true));
	assert!(!config.has_option("own", "absent", true));
}

#[test]
fn test_defaults() {
	static FLAG: OptionDef = OptionDef::bool("a", "flag", "yes", "");
	static COUNT: OptionDef = OptionDef::int("a", "count", "", "");
	let registry = empty_registry();
	registry.register(&FLAG);
	registry.register(&COUNT);
	let config = Configuration::transient_with_registry(registry);
	let defaults = config.defaults(None);
	assert_eq!(defaults["a"]["flag"], "enabled");
	assert_eq!(defaults["a"]["count"], "0");
}

#[test]
fn test_set_defaults() {
	static FLAG: OptionDef = OptionDef::bool("a", "flag", "yes", "");
	static COUNT: OptionDef = OptionDef::int("a", "count", "3", "");
	let registry = empty_registry();
	registry.register(&FLAG);
	registry.register(&COUNT);
	let config = Configuration::transient_with_registry(registry);
	config.set("a", "count", "12");
	config.set_defaults(None, None);
	// Keys the store already defines are left alone.
	assert_eq!(config.get_explicit("a", "count").as_deref(), Some("12"));
	assert_eq!(config.get_explicit("a", "flag").as_deref(), Some("enabled"));
}

#[test]
fn test_set_defaults_writes_inherited_keys() {
	static FLAG: OptionDef = OptionDef::bool("a", "flag", "yes", "");
	let registry = empty_registry();
	registry.register(&FLAG);
	let parent = Configuration::transient_with_registry(registry.clone());
	parent.set("a", "flag", "no");
	let child = Configuration::transient_with_registry(registry);
	child.set_parents(vec![parent]);
	child.set_defaults(None, None);
	// Only the child's own data counts; a key defined solely by a parent
	// is still materialized with the registered default.
	assert_eq!(child.get_explicit("a", "flag").as_deref(), Some("enabled"));
}

#[test]
fn test_set_defaults_component_filter() {
	static OWNED: OptionDef =
		OptionDef::text("a", "owned", "from tax", "").owned_by("girder.tax.flat_tax");
	static OTHER: OptionDef =
		OptionDef::text("a", "other", "from accounting", "").owned_by("girder.accounting.ledger");
	static FREE: OptionDef = OptionDef::text("a", "free", "unowned", "");
	let registry = empty_registry();
	registry.register(&OWNED);
	registry.register(&OTHER);
	registry.register(&FREE);
	let config = Configuration::transient_with_registry(registry);
	config.set_defaults(None, Some("Girder.Tax.*"));
	assert_eq!(config.get_explicit("a", "owned").as_deref(), Some("from tax"));
	assert!(config.get_explicit("a", "other").is_none());
	// Ownerless options are only materialized without a filter.
	assert!(config.get_explicit("a", "free").is_none());
	config.set_defaults(None, None);
	assert_eq!(config.get_explicit("a", "free").as_deref(), Some("unowned"));
}

#[test]
fn test_section_view() {
	static REGISTERED: OptionDef = OptionDef::text("a", "registered", "default", "");
	let registry = empty_registry();
	registry.register(&REGISTERED);
	let parent = Configuration::transient_with_registry(registry.clone());
	parent.set("a", "inherited", "from parent");
	let config = Configuration::transient_with_registry(registry);
	config.set_parents(vec![parent]);
	config.set("a", "own", "mine");

	let section = config.section("a");
	assert_eq!(section.get("own", ""), "mine");
	assert!(section.contains("inherited", false));
	assert!(section.contains("registered", true));
	assert!(!section.contains("registered", false));
	assert_eq!(section.keys(None), vec!["own", "inherited", "registered"]);
	assert_eq!(
		section.options(None),
		vec![
			("own".to_owned(), "mine".to_owned()),
			("inherited".to_owned(), "from parent".to_owned()),
			("registered".to_owned(), "default".to_owned()),
		]
	);
}

#[test]
fn test_touch_forces_reparse_detection() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("conf.ini");
	fs::write(&path, "[a]\noption = x\n").unwrap();
	let config = Configuration::with_registry(&path, empty_registry()).unwrap();
	config.touch().unwrap();
	assert!(config.parse_if_needed(false).unwrap());
}
