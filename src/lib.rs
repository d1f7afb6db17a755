//! sekisho: a security-hardened Markdown parser.
//!
//! One document in, one deterministic snapshot out. The pipeline extracts
//! semantic structure (sections, paragraphs, lists, tables, code, links,
//! images, math, footnotes) while enforcing a layered security policy:
//! size and recursion budgets, URL scheme allowlists, scriptless XSS
//! detection, multi-round path-traversal decoding, data-URI budgets,
//! prompt-injection scans, and Unicode spoofing detection. Snapshots
//! serialize byte-stably for RAG pipelines and embedding stores.
//!
//! ```
//! use sekisho::{ParseOptions, SecurityProfile, parse};
//!
//! let snapshot = parse(
//!     "# Title\n\nHello [home](https://example.com).\n",
//!     SecurityProfile::Moderate,
//!     &ParseOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(snapshot.structure.sections[0].title, "Title");
//! assert!(!snapshot.metadata.embedding_blocked);
//! ```

pub mod config;
pub mod encoding;
pub mod error;
pub mod extract;
pub mod frontmatter;
pub mod parser;
pub mod security;
pub mod snapshot;
pub mod text;
pub mod token;

pub use config::{ParseOptions, Preset, SecurityProfile};
pub use error::{ParseError, ParseResult, SecurityErrorKind, SizeUnit};
pub use parser::{ValidationReport, parse, parse_file, validate_content};
pub use snapshot::Snapshot;
