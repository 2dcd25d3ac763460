//! # exif-edit
//!
//! View and edit the text entries of an image's EXIF tag directory while
//! leaving everything else in the file as it was.
//!
//! ## Quick Start
//!
//! The session module handles the full load → edit → commit flow:
//!
//! ```rust,no_run
//! use exif_edit::config::Config;
//! use exif_edit::editor::Edits;
//! use exif_edit::exif::tags::ARTIST;
//! use exif_edit::session::MetadataSession;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Some("exif-edit.json".as_ref()))?;
//!     let mut session = MetadataSession::from_config(&config);
//!
//!     session.load("photo.jpg")?;
//!     for entry in session.editable_entries() {
//!         println!("{}: {}", entry.tag, entry.text);
//!     }
//!
//!     let mut edits = Edits::new();
//!     edits.insert(ARTIST, "Jane Doe".into());
//!     session.commit(&edits)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! The codec and editors work on bytes and directories without touching
//! the filesystem:
//!
//! ```rust,no_run
//! use exif_edit::editor::{DynamicEditor, EntryEditor};
//! use exif_edit::exif::{decode_or_empty, encode, TagId};
//!
//! fn main() -> anyhow::Result<()> {
//!     let bytes = std::fs::read("photo.jpg")?;
//!     let dir = decode_or_empty(&bytes)?;
//!     let dir = DynamicEditor.apply_edit(&dir, TagId(270), "New description")?;
//!     let rewritten = encode(&bytes, &dir)?;
//!     std::fs::write("copy.jpg", rewritten)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Formats
//!
//! | Format | Where the directory lives |
//! |--------|---------------------------|
//! | JPEG (`.jpg`, `.jpeg`) | APP1 `Exif` segment |
//! | PNG (`.png`) | `eXIf` chunk |
//! | WebP (`.webp`) | `EXIF` chunk |
//! | TIFF (`.tif`, `.tiff`) | the file itself |
//!
//! ## Modules
//!
//! - [`config`]: Configuration types and loading/saving
//! - [`editor`]: Which entries are editable and how edits are applied
//! - [`error`]: Error types
//! - [`exif`]: Tag directory codec and tag registry
//! - [`images`]: Image file discovery
//! - [`session`]: Load → edit → commit orchestration

pub mod config;
pub mod editor;
pub mod error;
pub mod exif;
pub mod images;
pub mod session;

pub use error::{CommitError, Error, LoadError};
pub use session::MetadataSession;
