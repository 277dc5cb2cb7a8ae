//! `namesub` rewrites brand and product names throughout a large source tree
//! and can undo the rewrite exactly.
//!
//! It provides the core logic for the `namesub` command-line tool but can also
//! be used as a library. The main components are:
//!
//! - `rules`: The ordered regex pipeline, including the protection rules that
//!   keep certain phrases intact, and its built-in self-check.
//! - `eligibility` and `scanner`: Which files in a tree are candidates.
//! - `transformer`: Rewrites one file, recording its original first.
//! - `orchestrator`: Runs the transformer over a whole tree in parallel.
//! - `archive` and `restorer`: The `.tar.gz` snapshot of originals and its
//!   extraction back over the tree.
//!
//! Files are processed in parallel with Rayon; the only state shared between
//! workers is the snapshot archive, which serializes its appends.

pub mod archive;
pub mod cli;
pub mod config;
pub mod eligibility;
pub mod errors;
pub mod orchestrator;
pub mod report;
pub mod restorer;
pub mod rules;
pub mod scanner;
pub mod transformer;

// Re-export main types for easier access by library users.
pub use archive::SnapshotArchive;
pub use eligibility::EligibilityFilter;
pub use errors::{Error, Result};
pub use rules::{RuleSet, TextRule};
pub use scanner::TreeScanner;
pub use transformer::FileTransformer;
