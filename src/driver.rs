use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::{generate, parse, tokenize};
use rmc_asm::EmitAsm;

pub const USAGE: &str = "rmc FILE [-o OUTPUT] [-h] [-v] [--lex | --parse | --codegen]

  -o OUTPUT   file to write the assembly to (default: FILE with the extension .asm)
  -h, --help  print this help
  -v          verbose logging, RUST_LOG overrides it
  --lex       print the tokens and stop
  --parse     print the syntax tree and stop
  --codegen   print the generated assembly model and stop";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ArgsError {
    #[error("no input file, use -h to show all flags and help")]
    NoInput,
    #[error("rmc only accepts one input file, got \"{0}\" as well")]
    ExtraInput(String),
    #[error("the flag \"{0}\" was not recognized")]
    UnknownFlag(String),
    #[error("-o needs a file name")]
    MissingOutput,
    #[error("could not find file {0:?}")]
    InputNotFound(PathBuf),
    #[error("the output would overwrite the input file {0:?}")]
    OutputIsInput(PathBuf),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Compile,
    Lex,
    Parse,
    Codegen,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Options {
    pub stage: Stage,
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub verbose: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Run(Options),
}

fn is_flag(string: &str) -> Option<Stage> {
    match string {
        "--lex" => Some(Stage::Lex),
        "--parse" => Some(Stage::Parse),
        "--codegen" => Some(Stage::Codegen),
        _ => None,
    }
}

impl Options {
    /// Expects the arguments without the executable name.
    pub fn parse_args<I>(args: I) -> Result<Command, ArgsError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();

        let mut stage: Stage = Default::default();
        let mut input_file: Option<PathBuf> = None;
        let mut output_file: Option<PathBuf> = None;
        let mut verbose = false;

        while let Some(arg) = args.next() {
            if let Some(found_stage) = is_flag(&arg) {
                stage = found_stage;
                continue;
            }

            match arg.as_str() {
                "-h" | "--help" => return Ok(Command::Help),
                "-v" => verbose = true,
                "-o" => output_file = Some(args.next().ok_or(ArgsError::MissingOutput)?.into()),
                flag if flag.starts_with('-') && flag.len() > 1 => {
                    return Err(ArgsError::UnknownFlag(arg))
                }
                _ if input_file.is_some() => return Err(ArgsError::ExtraInput(arg)),
                _ => input_file = Some(PathBuf::from(arg)),
            }
        }

        let input_file = input_file.ok_or(ArgsError::NoInput)?;
        if !input_file.is_file() {
            return Err(ArgsError::InputNotFound(input_file));
        }

        let output_file = output_file.unwrap_or_else(|| input_file.with_extension("asm"));
        if same_file(&input_file, &output_file) {
            return Err(ArgsError::OutputIsInput(input_file));
        }

        Ok(Command::Run(Self {
            stage,
            input_file,
            output_file,
            verbose,
        }))
    }
}

fn same_file(input: &Path, output: &Path) -> bool {
    if input == output {
        return true;
    }
    match (fs::canonicalize(input), fs::canonicalize(output)) {
        (Ok(input), Ok(output)) => input == output,
        _ => false,
    }
}

/// Logs go to stderr. `RUST_LOG` wins over `-v`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {:?}", path))
}

pub fn run(options: &Options) -> anyhow::Result<()> {
    let source = read_source(&options.input_file)?;
    debug!(file = ?options.input_file, bytes = source.len(), "read source");

    let context = || format!("compiling {:?}", options.input_file);

    match options.stage {
        Stage::Lex => {
            for token in tokenize(&source).with_context(context)? {
                println!("{}\t{:?}", token.loc, token.kind);
            }
        }
        Stage::Parse => {
            let program = parse(&source).with_context(context)?;
            println!("{:#?}", program);
        }
        Stage::Codegen => {
            let program = generate(&source).with_context(context)?;
            println!("{:#?}", program);
        }
        Stage::Compile => {
            let assembly = generate(&source).with_context(context)?.emit(0);
            fs::write(&options.output_file, assembly)
                .with_context(|| format!("writing {:?}", options.output_file))?;
            info!(file = ?options.output_file, "wrote assembly");
        }
    }

    Ok(())
}
