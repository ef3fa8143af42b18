//! Versioned AgilityBook documents with scripted configuration migration.
//!
//! A document is an XML tree rooted at `AgilityBook`. It holds the calendar,
//! the training log, the venue configuration, info lists and every dog with
//! its trials and runs. Records name configuration entries by string, so a
//! configuration update replays [`action::ConfigAction`]s that rename or
//! delete entries and carry the change through all dependent records.
//!
//! # Examples
//!
//! Loading a document and applying a migration script:
//! ```
//! use arbook::{
//!     action::{ActionList, ActionLog, ConfigAction},
//!     book::RecordBook,
//!     element::Element,
//!     error::ErrorLog,
//!     localization::English,
//! };
//!
//! let xml = r#"<AgilityBook Book="15.3"><Configuration version="4"><Venue Name="NADAC"/></Configuration></AgilityBook>"#;
//! let tree = Element::from_xml_str(xml).expect("parse");
//! let mut errors = ErrorLog::new();
//! let mut book = RecordBook::load(&tree, &mut errors, &English).expect("load");
//! assert_eq!(book.config.venues.len(), 1);
//!
//! let script: ActionList = [ConfigAction::RenameVenue {
//!     version: 5,
//!     old: "NADAC".into(),
//!     new: "NADAC Agility".into(),
//! }]
//! .into_iter()
//! .collect();
//! let mut info = String::new();
//! let changes = script.apply(&mut book.config, &mut book.dogs, &mut info, &mut ActionLog::new(), &English);
//! assert_eq!(changes, 1);
//! assert!(book.config.find_venue("NADAC Agility").is_some());
//! ```

#![deny(missing_docs)]

/// Configuration actions and their application to dog records.
pub mod action;
/// Document root, file I/O and configuration merge fixups.
pub mod book;
/// Calendar entries and the training log.
pub mod calendar;
/// Venue rules and configuration lists.
pub mod config;
/// Dogs, trials, runs and other per-dog records.
pub mod dog;
/// Generic labeled tree with typed attributes and XML I/O.
pub mod element;
/// Error types and load diagnostics.
pub mod error;
/// Club, judge and location notes.
pub mod info;
/// User-facing text.
pub mod localization;
/// Scoring-style translation and title-point calculators.
pub mod scoring;
/// Shared primitive types and enums.
pub mod types;
