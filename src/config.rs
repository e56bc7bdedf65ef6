//! Translation settings chosen by the program driver.

use clap::ValueEnum;

/// How `if-goto` decides whether the popped value is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Truthiness {
    /// Branch on any non-zero value, so the canonical true (-1) is taken.
    #[default]
    NonZero,
    /// Branch only on values strictly greater than zero.
    Positive,
}

impl Truthiness {
    pub fn jump(self) -> &'static str {
        match self {
            Truthiness::NonZero => "JNE",
            Truthiness::Positive => "JGT",
        }
    }
}

/// Whether to prefix the program with `SP=256; call Sys.init 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BootstrapMode {
    /// Only when one of the units is named `Sys`.
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub truthiness: Truthiness,
    pub bootstrap: BootstrapMode,
    /// Head each translated block with a `// <command>` line.
    pub annotate: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            truthiness: Truthiness::default(),
            bootstrap: BootstrapMode::default(),
            annotate: true,
        }
    }
}
