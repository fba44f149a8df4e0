//! # Code Index Parser
//!
//! Language parsers that walk a source file's syntax tree and populate the
//! relational store: symbols, import aliases, and reference edges. Each
//! concrete parser implements a strict two-phase contract — every file's
//! `extract_definitions` must commit before any file's `extract_references`
//! runs, since callee resolution depends on aliases and symbols defined
//! elsewhere in the project.

mod context;
mod error;
mod imports;
mod python;

pub use context::ParseContext;
pub use error::{ParserError, Result};
pub use python::PythonParser;

/// A parser for one source language, operating on one file per
/// `ParseContext`.
pub trait Parser {
    /// The language this parser handles, e.g. `"python"`.
    fn language(&self) -> &'static str;

    /// Creates symbols, definition reference edges, and import aliases for
    /// the file in `ctx`. Must not assume any other file's definitions
    /// exist yet.
    fn extract_definitions(&self, ctx: &mut ParseContext) -> Result<()>;

    /// Creates reference edges between the file's symbols and symbols
    /// defined elsewhere in the project. Only valid to call once every
    /// file's `extract_definitions` has committed.
    fn extract_references(&self, ctx: &mut ParseContext) -> Result<()>;
}
