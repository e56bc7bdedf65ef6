use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use log::{error, LevelFilter};

use vm2hack::driver;
use vm2hack::{BootstrapMode, Options, Truthiness};

#[derive(Parser, Debug)]
#[command(
    name = "vm2hack",
    version,
    about = "Translate stack-machine VM code into Hack assembly"
)]
struct Cli {
    /// A .vm file, or a directory whose .vm files form one program.
    input: PathBuf,

    /// Output file. Defaults to Prog.asm beside Prog.vm, or Dir/Dir.asm.
    #[arg(short = 'o', long = "outfile", value_name = "FILE")]
    output: Option<PathBuf>,

    /// When to emit the SP=256 / call Sys.init preamble.
    #[arg(long, value_enum, default_value_t = BootstrapMode::Auto)]
    bootstrap: BootstrapMode,

    /// Which popped values make if-goto jump.
    #[arg(long = "if-goto", value_enum, default_value_t = Truthiness::NonZero)]
    truthiness: Truthiness,

    /// Do not head each block with the VM command it came from.
    #[arg(long = "no-comments", action = ArgAction::SetTrue)]
    no_comments: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only report errors.
    #[arg(short = 'q', long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,
}

impl Cli {
    fn level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    fn options(&self) -> Options {
        Options {
            truthiness: self.truthiness,
            bootstrap: self.bootstrap,
            annotate: !self.no_comments,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.level())
        .parse_default_env()
        .init();

    match driver::run(&cli.input, cli.output.as_deref(), cli.options()) {
        Ok(outfile) => {
            if !cli.quiet {
                println!("written to {}", outfile.display());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
