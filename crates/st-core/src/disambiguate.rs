use std::collections::HashSet;

/// Makes repeated strings unique by numbering later occurrences.
///
/// The first occurrence of a string keeps its bare form; each later one
/// becomes `"<item> (n)"` with the smallest `n >= 1` this instance has not
/// produced yet. State is per instance: build one per deck, never share.
#[derive(Debug, Default)]
pub struct Disambiguator {
    seen: HashSet<String>,
}

impl Disambiguator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, item: &str) -> String {
        let mut candidate = item.to_string();
        let mut n = 0u64;
        while self.seen.contains(&candidate) {
            n += 1;
            candidate = format!("{item} ({n})");
        }
        self.seen.insert(candidate.clone());
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn run(items: &[&str]) -> Vec<String> {
        let mut d = Disambiguator::new();
        items.iter().map(|i| d.process(i)).collect()
    }

    #[test]
    fn test_repeats_are_numbered() {
        assert_eq!(run(&["X", "X", "X"]), vec!["X", "X (1)", "X (2)"]);
    }

    #[test]
    fn test_distinct_items_unchanged() {
        assert_eq!(run(&["a", "b", "c"]), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_suffix_skips_literal_collision() {
        // "A (1)" is already taken by a raw value, so the repeat of "A" moves on
        assert_eq!(run(&["A (1)", "A", "A"]), vec!["A (1)", "A", "A (2)"]);
    }

    #[test]
    fn test_first_seen_wins() {
        assert_eq!(run(&["b", "a", "b", "a"]), vec!["b", "a", "b (1)", "a (1)"]);
    }

    #[test]
    fn test_instances_are_independent() {
        let mut first = Disambiguator::new();
        let mut second = Disambiguator::new();
        assert_eq!(first.process("猫"), "猫");
        assert_eq!(second.process("猫"), "猫");
        assert_eq!(first.process("猫"), "猫 (1)");
        assert_eq!(second.process("猫"), "猫 (1)");
        assert_eq!(first.process("猫"), "猫 (2)");
    }

    proptest! {
        #[test]
        fn prop_output_unique(items in prop::collection::vec("[ab]{0,2}( \\(1\\))?", 0..40)) {
            let mut d = Disambiguator::new();
            let out: Vec<String> = items.iter().map(|i| d.process(i)).collect();
            let distinct: HashSet<&String> = out.iter().collect();
            prop_assert_eq!(distinct.len(), out.len());
        }

        #[test]
        fn prop_first_occurrence_kept(items in prop::collection::vec("[abc]{1,2}", 0..40)) {
            let mut d = Disambiguator::new();
            let mut firsts = HashSet::new();
            for item in &items {
                let out = d.process(item);
                if firsts.insert(item.clone()) {
                    prop_assert_eq!(&out, item);
                }
            }
        }

        #[test]
        fn prop_distinct_input_is_identity(items in prop::collection::hash_set("[a-z]{1,6}", 0..30)) {
            let items: Vec<String> = items.into_iter().collect();
            let mut d = Disambiguator::new();
            let out: Vec<String> = items.iter().map(|i| d.process(i)).collect();
            prop_assert_eq!(out, items);
        }
    }
}
