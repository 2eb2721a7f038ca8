use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use rill::diagnostics::render_error;

#[derive(Parser)]
#[command(name = "rillc", version, about = "The Rill compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a .rill source file to a native binary
    Compile {
        /// Source file path
        file: PathBuf,
        /// Output binary path
        #[arg(short, long, default_value = "a.out")]
        output: PathBuf,
        /// Target triple for the emitted object (defaults to the host)
        #[arg(long)]
        target: Option<String>,
    },
    /// Compile and run a .rill source file
    Run {
        /// Source file path
        file: PathBuf,
        /// Target triple for the emitted object (defaults to the host)
        #[arg(long)]
        target: Option<String>,
    },
    /// Lower a .rill source file and print the entry procedure's IR
    EmitIr {
        /// Source file path
        file: PathBuf,
        /// Target triple for ISA setup (defaults to the host)
        #[arg(long)]
        target: Option<String>,
    },
}

fn read_source(file: &Path) -> String {
    std::fs::read_to_string(file).unwrap_or_else(|e| {
        eprintln!("error: failed to read {}: {e}", file.display());
        std::process::exit(1);
    })
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile { file, output, target } => {
            let source = read_source(&file);
            if let Err(err) = rill::compile(&source, &output, target.as_deref()) {
                render_error(&source, &file.to_string_lossy(), &err);
                std::process::exit(1);
            }
        }
        Commands::Run { file, target } => {
            let source = read_source(&file);
            let tmp = std::env::temp_dir().join(format!("rill_run_{}", std::process::id()));
            if let Err(err) = rill::compile(&source, &tmp, target.as_deref()) {
                render_error(&source, &file.to_string_lossy(), &err);
                std::process::exit(1);
            }

            let status = std::process::Command::new(&tmp)
                .status()
                .unwrap_or_else(|e| {
                    eprintln!("error: could not run compiled binary: {e}");
                    std::process::exit(1);
                });

            let _ = std::fs::remove_file(&tmp);

            if !status.success() {
                std::process::exit(status.code().unwrap_or(1));
            }
        }
        Commands::EmitIr { file, target } => {
            let source = read_source(&file);
            match rill::compile_to_clif(&source, target.as_deref()) {
                Ok(clif) => print!("{clif}"),
                Err(err) => {
                    render_error(&source, &file.to_string_lossy(), &err);
                    std::process::exit(1);
                }
            }
        }
    }
}
