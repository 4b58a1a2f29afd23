//! # versecache Architecture
//!
//! versecache is a **verse-indexed text store**: a persistent, random-access
//! cache that maps every verse of a numbering scheme (a *versification*) to
//! its text, and rebuilds structured documents for arbitrary verse ranges.
//! It is a library first; the `versecache` binary is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs)                               │
//! │  - Parses arguments, formats output, installs logging       │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Opens the cache directory from its cache.json            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - init, put, import, get, check, info                      │
//! │  - Returns CmdResult with data and messages                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (cache.rs, builder.rs, store/, versification/)        │
//! │  - VerseCache: offset index + text blob behind one mutex    │
//! │  - DocumentBuilder: ranges ⇄ Document trees                 │
//! │  - Versifications: verse reference ⇄ ordinal                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Using the core directly
//!
//! ```no_run
//! use std::sync::Arc;
//! use versecache::cache::VerseCache;
//! use versecache::passage::Passage;
//! use versecache::versification::{Versifications, VersificationProvider};
//!
//! # fn main() -> versecache::error::Result<()> {
//! let registry = Versifications::new();
//! let kjv = registry.versification("KJV")?;
//! let cache = VerseCache::open("/var/cache/kjv", Arc::clone(&kjv))?;
//! cache.load()?;
//!
//! let passage = Passage::parse(&kjv, "Gen 1:1-3")?;
//! let result = cache.get_data(&passage)?;
//! println!("{}", result.document.plain_text());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - **[`api`]**: Facade used by the CLI
//! - **[`commands`]**: One module per CLI command
//! - **[`cache`]**: The cache controller
//! - **[`builder`]** / **[`document`]**: The document model and its builder
//! - **[`passage`]**: Verse ranges and their textual syntax
//! - **[`store`]**: On-disk index and data file formats
//! - **[`versification`]**: Numbering schemes and the registry
//! - **[`config`]**: Per-cache `cache.json`
//! - **[`error`]**: Error types

pub mod api;
pub mod builder;
pub mod cache;
pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod passage;
pub mod store;
pub mod versification;

#[cfg(test)]
pub(crate) mod test_utils;
