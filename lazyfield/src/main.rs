mod execute;
mod logging;
mod options;
mod plan;
mod resolve;

use anyhow::Result;
use clap::{CommandFactory as _, Parser, Subcommand};
use options::Options;
use std::process::exit;

fn main() {
    let args = Args::parse();
    handle_result(run_args(args));
}

fn run_args(args: Args) -> Result<()> {
    match &args.command {
        Commands::Resolve(subargs) => {
            let mut logger = logging::set_up(&args.options.logging())?;
            let r = resolve::resolve(subargs);
            logger.tear_down()?;
            r
        }
        Commands::GenerateMan => (|| {
            let cmd = Args::command();
            let man = clap_mangen::Man::new(cmd);
            let mut buffer: Vec<u8> = Default::default();
            man.render(&mut buffer)?;
            println!("{}", String::from_utf8(buffer)?);
            Ok(())
        })(),
        Commands::GenerateMarkdown => {
            let opts = clap_markdown::MarkdownOptions::new().show_footer(false);
            let markdown: String = clap_markdown::help_markdown_custom::<Args>(&opts);
            println!("{}", markdown);
            Ok(())
        }
        Commands::GenerateCompletion { shell } => {
            let mut cmd = Args::command();
            clap_complete::generate(*shell, &mut cmd, "lazyfield", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn handle_result(r: Result<()>) {
    match r {
        Ok(()) => {}
        Err(e) => {
            eprintln!("lazyfield error: {:?}", e);
            exit(1);
        }
    }
}

/// lazyfield: resolve field plans through deferred values
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    options: Options,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a field plan and print the result envelope as JSON
    #[command()]
    Resolve(resolve::Args),

    /// Generate markdown documentation for lazyfield
    #[command(hide = true)]
    GenerateMarkdown,

    /// Generate a manpage for lazyfield
    #[command(hide = true)]
    GenerateMan,

    /// Generate shell completion for lazyfield
    #[command(hide = true)]
    GenerateCompletion {
        /// The shell to generate completion for
        #[arg(long)]
        shell: clap_complete::Shell,
    },
}
