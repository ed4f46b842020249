/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use clap::Subcommand;
use mcc::errors::CompilerError;
use mcc::file_reader::NativeFileReader;

#[derive(ClapParser)]
#[clap(version = "0.1.0", author = "Connor Nolan")]
struct Opts {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct StageArgs {
    /// Input source files; if none are given, source is read from stdin.
    files: Vec<PathBuf>,
    /// Write the artifact here instead of stdout.
    #[clap(short, long)]
    output: Option<PathBuf>,
    /// Suppress the stage-timing log lines.
    #[clap(short, long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Pretty-print the parsed AST.
    Ast(StageArgs),
    /// Print the symbol table's scope tree.
    Symtab(StageArgs),
    /// Run semantic analysis only.
    Check(StageArgs),
    /// Print the three-address IR listing.
    Ir(StageArgs),
    /// Print the control-flow graph as Graphviz `dot`.
    Cfg(StageArgs),
    /// Run the full pipeline and print x86-32 assembly.
    Asm(StageArgs),
}

fn main() -> ExitCode {
    let opts = Opts::parse();

    let args = match &opts.command {
        Commands::Ast(a) | Commands::Symtab(a) | Commands::Check(a) | Commands::Ir(a) | Commands::Cfg(a) | Commands::Asm(a) => a,
    };
    init_logging(args.quiet);

    let stage: fn(&str, &str) -> Result<String, CompilerError> = match &opts.command {
        Commands::Ast(_) => mcc::run_ast,
        Commands::Symtab(_) => mcc::run_symtab,
        Commands::Check(_) => mcc::run_check,
        Commands::Ir(_) => mcc::run_ir,
        Commands::Cfg(_) => mcc::run_cfg,
        Commands::Asm(_) => mcc::run_asm,
    };
    let is_check = matches!(opts.command, Commands::Check(_));

    match run(stage, args) {
        Ok(text) => {
            // `check` only prints its "OK" artifact when not quiet.
            let text = if is_check && args.quiet { "" } else { &text };
            if let Err(e) = write_output(args.output.as_deref(), text) {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(quiet: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if quiet {
        builder.filter_level(log::LevelFilter::Error);
    }
    builder.init();
}

/// Compiles each input file as an independent translation unit through
/// `stage`, concatenating the results (separated by a `filename:` header
/// when more than one file is given).
fn run(stage: fn(&str, &str) -> Result<String, CompilerError>, args: &StageArgs) -> Result<String, CompilerError> {
    let reader = NativeFileReader;
    let units = read_units(&args.files, &reader)?;

    let mut out = String::new();
    let multiple = units.len() > 1;
    for (name, source) in units {
        if multiple {
            out.push_str(&format!("==> {name} <==\n"));
        }
        out.push_str(&stage(&name, &source)?);
    }
    Ok(out)
}

fn read_units(files: &[PathBuf], reader: &NativeFileReader) -> Result<Vec<(String, String)>, CompilerError> {
    if files.is_empty() {
        return Ok(vec![mcc::read_input(None, reader)?]);
    }
    files.iter().map(|p| mcc::read_input(Some(p.as_path()), reader)).collect()
}

fn write_output(path: Option<&std::path::Path>, text: &str) -> Result<(), CompilerError> {
    match path {
        Some(p) => std::fs::write(p, text).map_err(CompilerError::Io),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}
