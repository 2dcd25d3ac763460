//! Load → edit → commit orchestration for one image at a time.
//!
//! A [`MetadataSession`] reads a file through a [`ContainerStore`], decodes
//! its tag directory once, lets the configured editor change it, and writes
//! the result back in a single store write.
//!
//! ```rust,no_run
//! use exif_edit::config::Config;
//! use exif_edit::editor::Edits;
//! use exif_edit::exif::TagId;
//! use exif_edit::session::MetadataSession;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut session = MetadataSession::from_config(&Config::default());
//! session.load("photo.jpg")?;
//!
//! for entry in session.current_entries() {
//!     println!("{} ({}): {}", entry.name, entry.tag, entry.text);
//! }
//!
//! let mut edits = Edits::new();
//! edits.insert(TagId(270), "Harbour at dawn".into());
//! session.commit(&edits)?;
//! # Ok(())
//! # }
//! ```

use std::borrow::Cow;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::Config;
use crate::editor::{editor_for, EditableEntry, Edits, EntryEditor};
use crate::error::{CommitError, LoadError};
use crate::exif::{decode_or_empty, encode, name_of, Directory, TagId};

/// Where container bytes come from and go to.
pub trait ContainerStore {
    /// Read the whole container.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace the container. Either every byte lands or the previous
    /// content stays in place.
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// Filesystem store. Writes go to a temporary file next to the target which
/// is then renamed over it.
#[derive(Debug, Clone, Default)]
pub struct FsStore {
    /// Copy the target to `<name>.<ext>.bak` before the first rewrite.
    pub backup_originals: bool,
}

impl FsStore {
    pub fn new(backup_originals: bool) -> Self {
        Self { backup_originals }
    }
}

impl ContainerStore for FsStore {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        if self.backup_originals && path.is_file() {
            if let Err(e) = keep_original(path) {
                log::warn!("No backup of {}, rewriting anyway: {e}", path.display());
            }
        }

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(bytes)?;
        if let Ok(meta) = std::fs::metadata(path) {
            file.as_file().set_permissions(meta.permissions())?;
        }
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| e.error)?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

/// `photo.jpg` → `photo.jpg.bak`.
fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}

/// Copy the file as it was before this tool first touched it. An existing
/// backup is left alone, so repeated commits keep the true original.
fn keep_original(path: &Path) -> io::Result<()> {
    let backup = backup_path(path);
    if backup.exists() {
        return Ok(());
    }
    std::fs::copy(path, &backup)?;
    log::debug!("Kept original of {} as {}", path.display(), backup.display());
    Ok(())
}

/// One directory entry prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryView {
    pub tag: TagId,
    pub name: Cow<'static, str>,
    pub text: String,
}

#[derive(Debug)]
struct Loaded {
    path: PathBuf,
    original: Vec<u8>,
    directory: Directory,
}

/// Holds at most one loaded image and its decoded directory.
pub struct MetadataSession<S: ContainerStore = FsStore> {
    store: S,
    editor: Box<dyn EntryEditor>,
    loaded: Option<Loaded>,
}

impl MetadataSession<FsStore> {
    /// Filesystem session with the editor and backup policy from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(FsStore::new(config.output.backup_originals), editor_for(&config.editor))
    }
}

impl<S: ContainerStore> MetadataSession<S> {
    pub fn new(store: S, editor: Box<dyn EntryEditor>) -> Self {
        Self { store, editor, loaded: None }
    }

    /// Read and decode `path`, replacing whatever was loaded before.
    ///
    /// A container without a tag directory loads as an empty directory.
    /// On error the previous session is kept.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let path = path.as_ref();
        let original = self.store.read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let directory = decode_or_empty(&original).map_err(|e| LoadError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        log::info!("Loaded {} ({} entries)", path.display(), directory.len());
        self.loaded = Some(Loaded { path: path.to_path_buf(), original, directory });
        Ok(())
    }

    /// Every entry of the loaded directory, with its registry name and a
    /// display rendering of its value. Empty when nothing is loaded.
    pub fn current_entries(&self) -> impl Iterator<Item = EntryView> + '_ {
        self.loaded.iter().flat_map(|loaded| {
            let order = loaded.directory.byte_order();
            loaded.directory.iter().map(move |(tag, value)| EntryView {
                tag,
                name: name_of(tag),
                text: value.display(order),
            })
        })
    }

    /// The entries the configured editor offers for the loaded directory.
    pub fn editable_entries(&self) -> Vec<EditableEntry> {
        match &self.loaded {
            Some(loaded) => self.editor.editable(&loaded.directory).collect(),
            None => Vec::new(),
        }
    }

    /// Apply `edits` and write the image back.
    ///
    /// The new container is decoded again before writing and must yield
    /// the edited directory. Nothing in memory changes unless the write
    /// succeeds.
    pub fn commit(&mut self, edits: &Edits) -> Result<(), CommitError> {
        let loaded = self.loaded.as_ref().ok_or(CommitError::NothingLoaded)?;
        let updated = self.editor.apply_bulk_edit(&loaded.directory, edits)?;
        let bytes = encode(&loaded.original, &updated)?;

        let reread = decode_or_empty(&bytes)?;
        if reread != updated {
            return Err(CommitError::Encode(
                "re-reading the encoded directory gave different entries".into(),
            ));
        }

        if bytes == loaded.original {
            log::info!("No changes to write for {}", loaded.path.display());
        } else {
            self.store.write(&loaded.path, &bytes).map_err(|source| CommitError::Io {
                path: loaded.path.clone(),
                source,
            })?;
            log::info!("Committed {} edit(s) to {}", edits.len(), loaded.path.display());
        }

        if let Some(loaded) = self.loaded.as_mut() {
            loaded.original = bytes;
            loaded.directory = reread;
        }
        Ok(())
    }

    /// Forget the loaded image.
    pub fn clear(&mut self) {
        self.loaded = None;
    }

    pub fn path(&self) -> Option<&Path> {
        self.loaded.as_ref().map(|l| l.path.as_path())
    }

    pub fn directory(&self) -> Option<&Directory> {
        self.loaded.as_ref().map(|l| &l.directory)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn editor(&self) -> &dyn EntryEditor {
        self.editor.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
