use std::collections::BTreeMap;

use super::tags::TagId;
use super::tiff::ByteOrder;
use super::value::TagValue;

/// The tag directory of one image: tag id → value, in ascending tag order.
///
/// Keys are unique; inserting an existing tag replaces its value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Directory {
    order: ByteOrder,
    entries: BTreeMap<TagId, TagValue>,
}

impl Directory {
    /// An empty little-endian directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty directory for a TIFF structure of the given byte order.
    pub fn with_byte_order(order: ByteOrder) -> Self {
        Self { order, entries: BTreeMap::new() }
    }

    /// Byte order the passthrough values are stored in.
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    pub fn get(&self, tag: TagId) -> Option<&TagValue> {
        self.entries.get(&tag)
    }

    pub fn contains(&self, tag: TagId) -> bool {
        self.entries.contains_key(&tag)
    }

    /// Set a value, returning the previous one.
    pub fn insert(&mut self, tag: TagId, value: TagValue) -> Option<TagValue> {
        self.entries.insert(tag, value)
    }

    pub fn remove(&mut self, tag: TagId) -> Option<TagValue> {
        self.entries.remove(&tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TagId, &TagValue)> + '_ {
        self.entries.iter().map(|(tag, value)| (*tag, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Directory {
    type Item = (TagId, &'a TagValue);
    type IntoIter = Box<dyn Iterator<Item = (TagId, &'a TagValue)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl FromIterator<(TagId, TagValue)> for Directory {
    /// Collects into a little-endian directory; later duplicates win.
    fn from_iter<I: IntoIterator<Item = (TagId, TagValue)>>(iter: I) -> Self {
        Self { order: ByteOrder::default(), entries: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterates_in_tag_order() {
        let mut dir = Directory::new();
        dir.insert(TagId(315), TagValue::Text("b".into()));
        dir.insert(TagId(270), TagValue::Text("a".into()));
        let tags: Vec<TagId> = dir.iter().map(|(t, _)| t).collect();
        assert_eq!(tags, [TagId(270), TagId(315)]);
    }

    #[test]
    fn insert_replaces() {
        let mut dir = Directory::new();
        assert!(dir.insert(TagId(1), TagValue::Text("a".into())).is_none());
        let prev = dir.insert(TagId(1), TagValue::Text("b".into()));
        assert_eq!(prev, Some(TagValue::Text("a".into())));
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn collect_keeps_last_duplicate() {
        let dir: Directory = vec![
            (TagId(999), TagValue::Text("A".into())),
            (TagId(999), TagValue::Text("B".into())),
        ]
        .into_iter()
        .collect();
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.get(TagId(999)), Some(&TagValue::Text("B".into())));
    }
}
