use std::collections::{BTreeMap, HashMap};

use crate::config::{EditorConfig, EditorMode};
use crate::exif::{Directory, Error, TagId, TagValue};

/// Edits to apply in one batch: tag → new text.
pub type Edits = BTreeMap<TagId, String>;

/// How an editable entry is stored, and therefore how its text is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// Stored as text; the new text is stored as is.
    Text,
    /// Stored as raw bytes; the new text is stored as its UTF-8 bytes.
    RawBytes,
}

impl TextKind {
    fn to_value(self, text: &str) -> TagValue {
        match self {
            TextKind::Text => TagValue::Text(text.to_string()),
            TextKind::RawBytes => TagValue::RawBytes(text.as_bytes().to_vec()),
        }
    }
}

/// A directory entry offered for editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableEntry {
    pub tag: TagId,
    pub text: String,
    pub kind: TextKind,
}

impl EditableEntry {
    pub fn was_raw_bytes(&self) -> bool {
        self.kind == TextKind::RawBytes
    }
}

/// Decide whether a value can be edited as text.
///
/// Byte values qualify only when they are valid UTF-8; anything else is
/// left out so that binary data is never rewritten through a lossy string.
pub fn as_editable(tag: TagId, value: &TagValue) -> Option<EditableEntry> {
    match value {
        TagValue::Text(text) => Some(EditableEntry { tag, text: text.clone(), kind: TextKind::Text }),
        TagValue::RawBytes(bytes) => std::str::from_utf8(bytes).ok().map(|text| EditableEntry {
            tag,
            text: text.to_string(),
            kind: TextKind::RawBytes,
        }),
        TagValue::Other(_) => None,
    }
}

/// Offers a subset of directory entries for editing and applies edits to
/// them without changing how each entry is stored.
pub trait EntryEditor {
    /// The entries this editor exposes for `dir`. Call again to restart.
    fn editable<'a>(&'a self, dir: &'a Directory) -> Box<dyn Iterator<Item = EditableEntry> + 'a>;

    /// Apply one edit, returning the updated directory.
    fn apply_edit(&self, dir: &Directory, tag: TagId, text: &str) -> Result<Directory, Error> {
        let mut edits = Edits::new();
        edits.insert(tag, text.to_string());
        self.apply_bulk_edit(dir, &edits)
    }

    /// Apply every edit, or none of them: if any tag is not editable the
    /// batch fails with [`Error::InvalidTag`].
    fn apply_bulk_edit(&self, dir: &Directory, edits: &Edits) -> Result<Directory, Error> {
        apply_checked(self, dir, edits)
    }
}

fn apply_checked<E: EntryEditor + ?Sized>(
    editor: &E,
    dir: &Directory,
    edits: &Edits,
) -> Result<Directory, Error> {
    let kinds: HashMap<TagId, TextKind> = editor.editable(dir).map(|e| (e.tag, e.kind)).collect();
    if let Some(tag) = edits.keys().find(|tag| !kinds.contains_key(*tag)) {
        return Err(Error::InvalidTag(*tag));
    }

    let mut updated = dir.clone();
    for (tag, text) in edits {
        updated.insert(*tag, kinds[tag].to_value(text));
    }
    log::debug!("Applied {} edit(s)", edits.len());
    Ok(updated)
}

/// Exposes every text-like entry the directory holds.
#[derive(Debug, Default)]
pub struct DynamicEditor;

impl EntryEditor for DynamicEditor {
    fn editable<'a>(&'a self, dir: &'a Directory) -> Box<dyn Iterator<Item = EditableEntry> + 'a> {
        Box::new(dir.iter().filter_map(|(tag, value)| as_editable(tag, value)))
    }
}

/// Exposes a fixed list of fields, like a form with one line per tag.
///
/// Fields missing from the directory are offered empty and are created as
/// text when edited to something non-empty; leaving one empty keeps it
/// absent. Fields present with a non-text value are left out.
#[derive(Debug, Clone)]
pub struct FixedFieldEditor {
    tags: Vec<TagId>,
}

impl FixedFieldEditor {
    pub fn new(tags: Vec<TagId>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let tags = tags.into_iter().filter(|t| seen.insert(*t)).collect();
        Self { tags }
    }

    pub fn tags(&self) -> &[TagId] {
        &self.tags
    }
}

impl EntryEditor for FixedFieldEditor {
    fn editable<'a>(&'a self, dir: &'a Directory) -> Box<dyn Iterator<Item = EditableEntry> + 'a> {
        Box::new(self.tags.iter().filter_map(move |&tag| match dir.get(tag) {
            Some(value) => as_editable(tag, value),
            None => Some(EditableEntry { tag, text: String::new(), kind: TextKind::Text }),
        }))
    }

    fn apply_bulk_edit(&self, dir: &Directory, edits: &Edits) -> Result<Directory, Error> {
        let edits: Edits = edits
            .iter()
            .filter(|(tag, text)| !(text.is_empty() && self.tags.contains(tag) && !dir.contains(**tag)))
            .map(|(tag, text)| (*tag, text.clone()))
            .collect();
        apply_checked(self, dir, &edits)
    }
}

/// Build the editor selected by the configuration.
pub fn editor_for(config: &EditorConfig) -> Box<dyn EntryEditor> {
    match config.mode {
        EditorMode::Dynamic => Box::new(DynamicEditor),
        EditorMode::Fixed => Box::new(FixedFieldEditor::new(
            config.fixed_tags.iter().copied().map(TagId).collect(),
        )),
    }
}
