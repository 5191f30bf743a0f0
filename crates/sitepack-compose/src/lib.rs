//! Page-generation command composition.
//!
//! This crate builds the command line that invokes the external static page
//! generator (`make-pages.py`) after an asset build. It only composes the
//! command; running it is the job of the hook runner.

pub mod command;

pub use command::{compose, Composer, PageCommand, DEFAULT_INTERPRETER, DEFAULT_SCRIPT};
