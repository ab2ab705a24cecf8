//! Text normalization of identity fields.
//!
//! A chain is an ordered list of rewrite rules applied one after another to
//! the raw first field of a note. Rules see the output of the rules before
//! them, so order matters. Chains are plain data and can be loaded from a
//! rule file.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `<ruby><rb>base</rb><rt ...>reading</rt></ruby>` → `base`
static RUBY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<ruby><rb>(.*?)</rb><rt[^>]*>.*?</rt></ruby>").unwrap());

/// Miswritten characters and mistypes found in the legacy source deck.
pub const LEGACY_TYPOS: &[(&str, &str)] = &[
    ("逹", "達"),
    ("晚", "晩"),
    ("友逢", "友達"),
    ("意昧", "意味"),
    // kyujitai form trips up tokenizers; use the shinjitai one
    ("鷗", "鴎"),
    ("傾", "斜め"),
    ("頸", "頚"),
    // ヶ cannot carry furigana
    ("ヶ月", "箇月"),
    ("悲しみした", "悲しみました"),
];

/// Doubled words and okurigana slips in the legacy source deck.
pub const LEGACY_OKURIGANA: &[(&str, &str)] = &[
    ("と共にと共に", "と共に"),
    ("係係らず", "係わらず"),
    ("多多", "多い"),
];

/// Authoring notes left inside the legacy source deck's first field.
pub const LEGACY_ANNOTATIONS: &[&str] = &["(literally no example with you) ", "(e-stem) "];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Rule {
    /// Collapse ruby annotations to their base text.
    StripRuby,
    /// Replace every occurrence of `from` with `to`.
    Replace { from: String, to: String },
    /// Delete every occurrence of `text`.
    Remove { text: String },
}

impl Rule {
    pub fn replace(from: &str, to: &str) -> Self {
        Rule::Replace {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn remove(text: &str) -> Self {
        Rule::Remove {
            text: text.to_string(),
        }
    }

    pub fn apply(&self, text: &str) -> String {
        match self {
            Rule::StripRuby => RUBY.replace_all(text, "${1}").into_owned(),
            Rule::Replace { from, to } => replace_literal(text, from, to),
            Rule::Remove { text: needle } => replace_literal(text, needle, ""),
        }
    }
}

fn replace_literal(text: &str, from: &str, to: &str) -> String {
    // str::replace on an empty pattern would interleave `to` between chars
    if from.is_empty() {
        text.to_string()
    } else {
        text.replace(from, to)
    }
}

fn default_disambiguate() -> bool {
    true
}

/// An ordered rule chain plus whether repeated results get numbered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerChain {
    #[serde(default = "default_disambiguate")]
    pub disambiguate: bool,
    #[serde(default, rename = "rule")]
    pub rules: Vec<Rule>,
}

impl Default for NormalizerChain {
    fn default() -> Self {
        Self::verbatim()
    }
}

impl NormalizerChain {
    /// No rewriting: the raw first field is the identity.
    pub fn verbatim() -> Self {
        Self {
            disambiguate: true,
            rules: Vec::new(),
        }
    }

    /// Ruby stripping, typo table, okurigana table, annotation removal.
    pub fn legacy_source() -> Self {
        let mut rules = vec![Rule::StripRuby];
        rules.extend(LEGACY_TYPOS.iter().map(|(from, to)| Rule::replace(from, to)));
        rules.extend(
            LEGACY_OKURIGANA
                .iter()
                .map(|(from, to)| Rule::replace(from, to)),
        );
        rules.extend(LEGACY_ANNOTATIONS.iter().map(|text| Rule::remove(text)));
        Self {
            disambiguate: true,
            rules,
        }
    }

    pub fn normalize(&self, raw: &str) -> String {
        self.rules
            .iter()
            .fold(raw.to_string(), |text, rule| rule.apply(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbatim_is_identity() {
        let chain = NormalizerChain::verbatim();
        let raw = "<ruby><rb>猫</rb><rt>ねこ</rt></ruby> (e-stem) 逹";
        assert_eq!(chain.normalize(raw), raw);
    }

    #[test]
    fn test_strip_ruby_keeps_base_text() {
        let text = "<ruby><rb>日本</rb><rt class=\"r\">にほん</rt></ruby>語と<ruby><rb>猫</rb><rt>ねこ</rt></ruby>";
        assert_eq!(Rule::StripRuby.apply(text), "日本語と猫");
    }

    #[test]
    fn test_strip_ruby_leaves_unmatched_markup() {
        let text = "<ruby>猫<rt>ねこ</rt></ruby>";
        assert_eq!(Rule::StripRuby.apply(text), text);
    }

    #[test]
    fn test_legacy_typos_fixed() {
        let chain = NormalizerChain::legacy_source();
        assert_eq!(chain.normalize("友逢"), "友達");
        assert_eq!(chain.normalize("意昧"), "意味");
        assert_eq!(chain.normalize("3ヶ月"), "3箇月");
        assert_eq!(chain.normalize("鷗"), "鴎");
    }

    #[test]
    fn test_legacy_okurigana_fixed() {
        let chain = NormalizerChain::legacy_source();
        assert_eq!(chain.normalize("と共にと共に"), "と共に");
        assert_eq!(chain.normalize("にも係係らず"), "にも係わらず");
        assert_eq!(chain.normalize("多多"), "多い");
    }

    #[test]
    fn test_legacy_annotations_removed() {
        let chain = NormalizerChain::legacy_source();
        assert_eq!(chain.normalize("(e-stem) ば"), "ば");
        assert_eq!(chain.normalize("(literally no example with you) から"), "から");
        // without the trailing space the note is not an annotation
        assert_eq!(chain.normalize("(e-stem)ば"), "(e-stem)ば");
    }

    #[test]
    fn test_legacy_chain_runs_in_order() {
        let chain = NormalizerChain::legacy_source();
        let raw = "(e-stem) <ruby><rb>友逢</rb><rt>ともだち</rt></ruby>と共にと共に";
        assert_eq!(chain.normalize(raw), "友達と共に");
    }

    #[test]
    fn test_later_rules_see_earlier_output() {
        let chain = NormalizerChain {
            disambiguate: true,
            rules: vec![Rule::replace("a", "b"), Rule::replace("bb", "c")],
        };
        assert_eq!(chain.normalize("ab"), "c");
    }

    #[test]
    fn test_empty_pattern_is_noop() {
        assert_eq!(Rule::replace("", "x").apply("abc"), "abc");
        assert_eq!(Rule::remove("").apply("abc"), "abc");
    }

    #[test]
    fn test_chain_from_toml() {
        let chain: NormalizerChain = toml::from_str(
            r#"
[[rule]]
kind = "strip-ruby"

[[rule]]
kind = "replace"
from = "逹"
to = "達"

[[rule]]
kind = "remove"
text = "(e-stem) "
"#,
        )
        .unwrap();
        assert!(chain.disambiguate);
        assert_eq!(
            chain.rules,
            vec![
                Rule::StripRuby,
                Rule::replace("逹", "達"),
                Rule::remove("(e-stem) ")
            ]
        );
    }

    #[test]
    fn test_chain_from_toml_defaults() {
        let chain: NormalizerChain = toml::from_str("disambiguate = false").unwrap();
        assert!(!chain.disambiguate);
        assert!(chain.rules.is_empty());
    }
}
