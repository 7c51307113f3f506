//! `mtx_core` is the engine behind the `mtx` model transformer. It applies an
//! ordered list of mutation operations to a tree-shaped document (JSON, YAML
//! or TOML) using a small path language, and reports how many locations each
//! operation touched.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Path string
//!   → Lexer (logos tokens: identifiers, quoted keys, brackets, `*`, `**`)
//!   → Parser (ordered Segments)
//!   → Resolver (ordered Locations against the current document)
//!   → Guard (maxTargets / exactTargets)
//!   → Executor (set, replace, copy, move, insert, append, merge, remove)
//!   → Session (strict / non-strict continuation, TransformReport)
//! ```
//!
//! ## Path Syntax
//!
//! | Form | Meaning |
//! |------|---------|
//! | `site.name` | object properties |
//! | `items[0]` | array index |
//! | `items[*].tags` | every element of `items` |
//! | `meta['x.y']['z[0]']` | quoted keys containing dots, brackets or spaces |
//! | `**.enabled` | `enabled` at any depth, including the current node |
//!
//! ## Key Types
//!
//! - [`Node`]: A document node: object, array or scalar.
//! - [`PathExpr`]: A parsed path expression.
//! - [`Location`]: A resolved address inside a document.
//! - [`Operation`]: One mutation request.
//! - [`TransformSession`]: Applies operations with strict or non-strict
//!   semantics.
//! - [`TransformReport`]: Per-operation outcome, serialized as
//!   `OperationsTotal` / `OperationsSucceeded` / `OperationsFailed` /
//!   `Operations`.
//! - [`MtxConfig`]: Configuration loaded from `mtx.toml`.
//!
//! ## Quick Start
//!
//! ```rust
//! use mtx_core::Operation;
//! use mtx_core::transform;
//! use serde_json::json;
//!
//! let document = json!({ "items": [{ "id": 1 }], "draft": true }).into();
//! let operations = [
//! 	Operation::append("items", json!({ "id": 2 })),
//! 	Operation::remove("draft"),
//! ];
//!
//! let result = transform(document, &operations, true);
//! assert!(result.success);
//! assert_eq!(result.report.operations_succeeded(), 2);
//! ```

pub use config::*;
pub use document::*;
pub use error::*;
pub use executor::*;
pub use format::*;
pub use guard::*;
pub use location::*;
pub use operation::*;
pub use parser::*;
pub use report::*;
pub use resolver::*;
pub use session::*;
pub use task::*;

pub mod config;
mod document;
#[allow(unused_assignments)]
mod error;
mod executor;
mod format;
mod guard;
pub(crate) mod lexer;
mod location;
mod operation;
mod parser;
mod report;
mod resolver;
mod session;
mod task;

#[cfg(test)]
mod __fixtures;
