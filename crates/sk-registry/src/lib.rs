//! # sk-registry
//!
//! The registry document, its store, and its only writer.
//!
//! - [`RegistryStore`] parses and atomically saves the JSON document.
//! - [`RegistryUpdater`] wraps every mutation in a lock-guarded
//!   read-modify-write cycle. Nothing else in the workspace writes the file.
//! - [`manifest`] reads SKILL.md frontmatter, [`layout`] owns the path
//!   conventions, and [`SyncReport`] describes filesystem drift.

pub mod audit;
pub mod document;
pub mod draft;
pub mod error;
pub mod layout;
mod lock;
pub mod manifest;
pub mod store;
pub mod updater;

pub use audit::{MissingFiles, StaleHealth, SyncReport};
pub use document::{MigrationStatus, RegistryDocument};
pub use draft::EntryDraft;
pub use error::RegistryError;
pub use manifest::SkillManifest;
pub use store::RegistryStore;
pub use updater::{RegistryUpdater, UpsertOutcome};
