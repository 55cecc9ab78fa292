//! Schema-driven validation, defaulting and repair of work-item front matter.
//!
//! Work items are markdown files with a YAML block between `---` lines. A
//! project's `.docket/config.yaml` declares the configurable fields; it is
//! compiled once into a [`schema::Schema`] that every validator, resolver
//! and fixer borrows for the duration of a run.

pub mod config;
pub mod dates;
pub mod defaults;
pub mod error;
pub mod field;
pub mod fixer;
pub mod frontmatter;
pub mod io;
pub mod paths;
pub mod repair;
pub mod report;
pub mod schema;
pub mod uri;
pub mod validator;
pub mod value;
pub mod writer;

pub use error::{DocketError, Result};
