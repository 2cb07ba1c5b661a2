use std::collections::HashSet;

/// Insertion-ordered set of strings
///
/// Enumeration follows first insertion and never depends on hashing, so two
/// passes over the same input always produce the same sequence.
#[derive(Clone, Debug, Default)]
pub struct OrderedStringSet {
    items: Vec<String>,
    index: HashSet<String>,
}

impl OrderedStringSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, ignoring it if already present
    pub fn add(&mut self, value: &str) {
        if self.index.insert(value.to_string()) {
            self.items.push(value.to_string());
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.index.contains(value)
    }

    /// Distinct values in first-insertion order
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn into_items(self) -> Vec<String> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for OrderedStringSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.add(value);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut set = OrderedStringSet::new();
        set.add("a");
        set.add("a");
        assert_eq!(set.len(), 1);
        assert!(set.contains("a"));
        assert!(!set.contains("b"));
    }

    #[test]
    fn test_items_keep_first_insertion_order() {
        let set: OrderedStringSet = ["zeta", "alpha", "zeta", "mid", "alpha"].into_iter().collect();
        assert_eq!(set.items(), ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_empty_string_is_a_member() {
        let mut set = OrderedStringSet::new();
        set.add("");
        assert!(set.contains(""));
        assert_eq!(set.into_items(), vec![String::new()]);
    }
}
