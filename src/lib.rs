//! Core of the `trash` utility.
//!
//! Files are moved into a trash store under content- and time-derived names,
//! and a flat metadata log records where each one came from so it can be
//! listed, restored or purged later. The command line front end lives in the
//! `trash-rs` crate and drives [`TrashBin`].

pub mod config;
pub mod errors;
pub mod fs;
pub mod helpers;
pub mod identifier;
pub mod listing;
pub mod log;
pub mod models;
pub mod ops;
pub mod prompt;
pub mod store;

/// Crate version, shown in listings.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use config::TrashConfig;
pub use errors::{CoreError, Result};
pub use fs::{FileSystem, RealFileSystem};
pub use helpers::{
    absolute_path,
    display_deleted_at,
    sanitize_user_path,
    serialize_system_time,
    DELETED_AT_FORMAT,
    DISPLAY_TIME_FORMAT,
};
pub use identifier::generate_identifier;
pub use listing::render_listing;
pub use log::MetadataLog;
pub use models::{
    AdmitReport,
    AuditReport,
    CommandKind,
    ExitStatusLike,
    PurgeOutcome,
    RestoreOutcome,
    TrashEntry,
};
pub use ops::TrashBin;
pub use prompt::{parse_selection, ConsolePrompt, Prompt};
pub use store::TrashStore;

/// Re-export a small stable API surface for front ends.
pub mod prelude {
    pub use crate::{
        config::TrashConfig,
        errors::{CoreError, Result},
        fs::{FileSystem, RealFileSystem},
        models::*,
        ops::TrashBin,
        prompt::{ConsolePrompt, Prompt},
    };
}
