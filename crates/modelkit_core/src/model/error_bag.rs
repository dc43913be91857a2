//! Validation error bag.

use std::collections::BTreeMap;

/// Named validation failures, grouped by attribute.
///
/// Contents are only meaningful right after a validation run; mutations of
/// the model do not refresh them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBag {
    messages: BTreeMap<String, Vec<String>>,
}

impl ErrorBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `message` to the sequence for `attribute`.
    pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<String>) {
        self.messages
            .entry(attribute.into())
            .or_default()
            .push(message.into());
    }

    /// Returns messages recorded for `attribute`, in insertion order.
    pub fn on(&self, attribute: &str) -> &[String] {
        self.messages
            .get(attribute)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of messages across all attributes.
    pub fn size(&self) -> usize {
        self.messages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Attribute names with at least one message, sorted.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }

    /// Returns `"<attribute> <message>"` lines, sorted by attribute.
    pub fn full_messages(&self) -> Vec<String> {
        self.messages
            .iter()
            .flat_map(|(attribute, messages)| {
                messages
                    .iter()
                    .map(move |message| format!("{attribute} {message}"))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorBag;

    #[test]
    fn add_groups_messages_per_attribute() {
        let mut errors = ErrorBag::new();
        errors.add("title", "can't be blank");
        errors.add("title", "is too short");
        errors.add("body", "is required");

        assert_eq!(errors.on("title"), ["can't be blank", "is too short"]);
        assert_eq!(errors.on("body"), ["is required"]);
        assert!(errors.on("missing").is_empty());
    }

    #[test]
    fn size_counts_messages_not_attributes() {
        let mut errors = ErrorBag::new();
        assert_eq!(errors.size(), 0);
        errors.add("a", "one");
        errors.add("a", "two");
        errors.add("b", "three");
        assert_eq!(errors.size(), 3);
        assert_eq!(errors.attributes().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn clear_and_full_messages() {
        let mut errors = ErrorBag::new();
        errors.add("title", "can't be blank");
        assert_eq!(errors.full_messages(), vec!["title can't be blank"]);

        errors.clear();
        assert!(errors.is_empty());
        assert_eq!(errors.size(), 0);
    }
}
