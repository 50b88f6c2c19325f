//! File actions module.
//!
//! # Deletion
//!
//! The delete module provides safe file deletion with:
//! - Move to system trash (default, recoverable)
//! - Permanent deletion (requires explicit configuration)
//! - A sink that removes duplicates as the engine confirms them
//! - Verification that the canonical copy still exists
//!
//! ```no_run
//! use dedupe::actions::{DeleteConfig, DeleteOutput};
//! use dedupe::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let mut sink = DeleteOutput::new(std::io::stdout(), DeleteConfig::trash());
//! let finder = DuplicateFinder::with_defaults();
//! finder.find_duplicates(Path::new("."), &mut sink).unwrap();
//! println!("{}", sink.result().summary());
//! ```

pub mod delete;

// Re-export commonly used types
pub use delete::{
    delete_duplicate, delete_to_trash, permanent_delete, BatchDeleteResult, DeleteConfig,
    DeleteError, DeleteOutput, DeleteResult,
};
