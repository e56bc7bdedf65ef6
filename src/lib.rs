//! Translator from the stack-based VM language to Hack assembly.
//!
//! - `parser` turns cleaned source lines into [`Command`]s.
//! - `translator` lowers each command to Hack instructions, with help from
//!   `segment` (addressing), `label` (unique jump targets), `templates`
//!   (shared stack fragments) and `protocol` (call/return frames).
//! - `driver` reads units, threads the [`Counter`] across them and writes
//!   the program.

pub mod ast;
pub mod config;
pub mod driver;
pub mod error;
pub mod label;
pub mod parser;
pub mod protocol;
pub mod segment;
pub mod templates;
pub mod translator;

pub use ast::Command;
pub use config::{BootstrapMode, Options, Truthiness};
pub use driver::{translate_program, translate_unit, Unit};
pub use error::{CommandError, TranslateError, TranslateResult};
pub use label::Counter;
pub use translator::Translator;

/// Translate the source of a single unit named `unit`, with no bootstrap.
pub fn translate_source(
    unit: &str,
    source: &str,
    options: Options,
) -> TranslateResult<Vec<String>> {
    let unit = Unit::new(unit, source);
    translate_unit(&unit, Counter::default(), options).map(|(instructions, _)| instructions)
}
