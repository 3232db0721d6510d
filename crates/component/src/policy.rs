use crate::def::ComponentDef;
use crate::manager::EnablementPolicy;

struct Rule {
	segments: Vec<String>,
	wildcard: bool,
	enabled: bool,
}

impl Rule {
	/// Match score against a dotted name, higher is more specific. Exact
	/// patterns outrank a wildcard of the same depth.
	fn score(&self, name: &[&str]) -> Option<usize> {
		if self.wildcard {
			if name.len() >= self.segments.len()
				&& self
					.segments
					.iter()
					.zip(name)
					.all(|(pat, seg)| pat == seg)
			{
				Some(2 * self.segments.len())
			} else {
				None
			}
		} else if self.segments.len() == name.len()
			&& self.segments.iter().zip(name).all(|(pat, seg)| pat == seg)
		{
			Some(2 * self.segments.len() + 1)
		} else {
			None
		}
	}
}

/// Enablement rules over dotted component names.
///
/// A rule is either an exact name (`girder.tax.flat_tax`) or a prefix
/// pattern ending in `.*` (`girder.tax.*`); the bare pattern `*` matches
/// every component. When several rules match, the most specific one wins;
/// among equally specific rules, the one added last wins. Matching is
/// case-insensitive.
#[derive(Default)]
pub struct PrefixRules {
	rules: Vec<Rule>,
	fallback: Option<bool>,
}

impl PrefixRules {
	/// Creates an empty rule set. With no matching rule and no fallback,
	/// [`PrefixRules::evaluate`] returns `None`, which a manager treats as
	/// not available.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the verdict used when no rule matches.
	pub fn with_fallback(mut self, fallback: Option<bool>) -> Self {
		self.fallback = fallback;
		self
	}

	/// Adds a rule.
	pub fn add(&mut self, pattern: &str, enabled: bool) {
		let pattern = pattern.to_ascii_lowercase();
		let mut segments: Vec<String> = pattern.split('.').map(str::to_owned).collect();
		let wildcard = segments.last().is_some_and(|seg| seg == "*");
		if wildcard {
			segments.pop();
		}
		self.rules.push(Rule {
			segments,
			wildcard,
			enabled,
		});
	}

	/// Evaluates the rules against a dotted name, ignoring the fallback.
	pub fn evaluate(&self, name: &str) -> Option<bool> {
		let name = name.to_ascii_lowercase();
		let segments: Vec<&str> = name.split('.').collect();
		let mut best: Option<(usize, bool)> = None;
		for rule in &self.rules {
			if let Some(score) = rule.score(&segments) {
				// Later rules win ties.
				if best.is_none_or(|(top, _)| score >= top) {
					best = Some((score, rule.enabled));
				}
			}
		}
		best.map(|(_, enabled)| enabled)
	}
}

impl EnablementPolicy for PrefixRules {
	fn is_component_enabled(&self, def: &ComponentDef) -> Option<bool> {
		self.evaluate(def.name).or(self.fallback)
	}
}
