//! # KNECTAR Common Library
//!
//! Shared code for the KNECTAR site service and its tools:
//! - Menu tree model, loading and page lookup
//! - Technology label canonicalization
//! - Project list filtering (category and technology facets)
//! - Edit-mode gate (session records in key/value storage)
//! - HTTP client for the site backend
//! - Text-to-speech helpers (cache keys, speech text)

pub mod client;
pub mod edit;
pub mod error;
pub mod filter;
pub mod menu;
pub mod tech;
pub mod tts;
pub mod url;

pub use error::{Error, Result};
pub use menu::{MenuNode, MenuTree};
