use clap::{ColorChoice, Parser};
use std::io::IsTerminal as _;

#[derive(Parser, Debug, Clone)]
pub struct Options {
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    #[arg(long, global = true, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,
}
impl Options {
    /// Whether log output on stderr should be colored.
    pub fn use_color(&self) -> bool {
        match self.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => std::io::stderr().is_terminal(),
        }
    }

    pub(crate) fn logging(&self) -> crate::logging::Options {
        crate::logging::Options {
            verbose: self.verbose,
            color: self.use_color(),
        }
    }
}
