//! Reading translation units, translating a whole program and writing the result.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use snafu::{OptionExt, ResultExt};

use crate::config::{BootstrapMode, Options};
use crate::error::{
    CommandSnafu, NoSourcesSnafu, ReadSourceSnafu, TranslateResult, UnitNameSnafu,
    WriteOutputSnafu,
};
use crate::label::Counter;
use crate::parser::{clean_lines, parse_command};
use crate::protocol;
use crate::translator::Translator;

/// Name of the unit whose presence turns on the automatic bootstrap.
const SYS_UNIT: &str = "Sys";

/// One `.vm` source; `name` qualifies its static symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub name: String,
    pub source: String,
}

impl Unit {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Unit {
            name: name.into(),
            source: source.into(),
        }
    }
}

fn is_vm_file(path: &Path) -> bool {
    path.is_file() && path.extension().and_then(OsStr::to_str) == Some("vm")
}

fn unit_name(path: &Path) -> TranslateResult<String> {
    path.file_stem()
        .and_then(OsStr::to_str)
        .map(str::to_string)
        .context(UnitNameSnafu { path })
}

fn read_unit(path: &Path) -> TranslateResult<Unit> {
    let source = fs::read_to_string(path).context(ReadSourceSnafu { path })?;
    Ok(Unit::new(unit_name(path)?, source))
}

/// Load a single `.vm` file, or every `.vm` file of a directory in name order.
pub fn load_units(path: &Path) -> TranslateResult<Vec<Unit>> {
    if !path.is_dir() {
        return Ok(vec![read_unit(path)?]);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(path).context(ReadSourceSnafu { path })? {
        let entry = entry.context(ReadSourceSnafu { path })?;
        let file = entry.path();
        if is_vm_file(&file) {
            files.push(file);
        }
    }
    files.sort();

    if files.is_empty() {
        return NoSourcesSnafu { path }.fail();
    }
    files.iter().map(|file| read_unit(file)).collect()
}

/// `Prog.vm` becomes `Prog.asm`; directory `Prog/` becomes `Prog/Prog.asm`.
pub fn default_output_path(input: &Path) -> TranslateResult<PathBuf> {
    if input.is_dir() {
        let name = input
            .canonicalize()
            .context(ReadSourceSnafu { path: input })?
            .file_name()
            .and_then(OsStr::to_str)
            .map(str::to_string)
            .context(UnitNameSnafu { path: input })?;
        Ok(input.join(format!("{name}.asm")))
    } else {
        Ok(input.with_extension("asm"))
    }
}

/// Translate one unit starting at `counter`, returning its lines and the
/// counter the next unit starts from.
pub fn translate_unit(
    unit: &Unit,
    mut counter: Counter,
    options: Options,
) -> TranslateResult<(Vec<String>, Counter)> {
    debug!("translating unit {} from counter {}", unit.name, counter);

    let mut translator = Translator::new(&unit.name, options);
    let mut instructions = Vec::new();

    for (line, text) in clean_lines(&unit.source) {
        let context = CommandSnafu {
            unit: unit.name.as_str(),
            line,
            text,
        };
        let command = parse_command(text).context(context)?;
        let (translated, next) = translator
            .translate_command(&command, counter)
            .context(context)?;
        instructions.extend(translated);
        counter = next;
    }

    Ok((instructions, counter))
}

fn wants_bootstrap(units: &[Unit], mode: BootstrapMode) -> bool {
    match mode {
        BootstrapMode::Always => true,
        BootstrapMode::Never => false,
        BootstrapMode::Auto => units.iter().any(|unit| unit.name == SYS_UNIT),
    }
}

/// Translate a whole program. One counter runs across the bootstrap and
/// every unit so generated labels never repeat.
pub fn translate_program(units: &[Unit], options: Options) -> TranslateResult<Vec<String>> {
    let mut counter = Counter::default();
    let mut instructions = Vec::new();

    if wants_bootstrap(units, options.bootstrap) {
        debug!("emitting bootstrap");
        if options.annotate {
            instructions.push("// bootstrap".to_string());
        }
        instructions.extend(protocol::bootstrap(counter));
        counter = counter.next();
    }

    for unit in units {
        let (translated, next) = translate_unit(unit, counter, options)?;
        instructions.extend(translated);
        counter = next;
    }

    Ok(instructions)
}

pub fn write_output(path: &Path, instructions: &[String]) -> TranslateResult<()> {
    let file = File::create(path).context(WriteOutputSnafu { path })?;
    let mut out = BufWriter::new(file);
    for instruction in instructions {
        writeln!(out, "{}", instruction).context(WriteOutputSnafu { path })?;
    }
    out.flush().context(WriteOutputSnafu { path })
}

/// Translate `input` (file or directory) and write the program, returning
/// the path written.
pub fn run(input: &Path, output: Option<&Path>, options: Options) -> TranslateResult<PathBuf> {
    let units = load_units(input)?;
    info!("translating {} unit(s) from {}", units.len(), input.display());

    let instructions = translate_program(&units, options)?;

    let outfile = match output {
        Some(path) => path.to_path_buf(),
        None => default_output_path(input)?,
    };
    write_output(&outfile, &instructions)?;
    info!(
        "wrote {} lines to {}",
        instructions.len(),
        outfile.display()
    );

    Ok(outfile)
}
