#![forbid(unsafe_code)]
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::{env, ffi, fs, io};

use clap::{value_parser, Arg, ArgAction, ArgGroup};
use lzwpack::{Config, Decoder, Encoder, DEFAULT_CODESIZE, MAX_CODESIZE, MIN_CODESIZE};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() -> CodingResult {
    setup_logging();
    CodingResult::catch_panic(|| {
        let flags =
            Flags::from_args(env::args_os()).unwrap_or_else(|ParamError(err)| err.exit());
        run_coding(flags)
    })
}

fn setup_logging() {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(layer)
        .try_init();
}

fn run_coding(flags: Flags) -> Result<(), io::Error> {
    let config = Config::new(flags.max_code_size)?;
    let input = read_input(&flags.input)?;

    let output = match flags.operation {
        Operation::Encode => Encoder::with_config(config).compress(&input)?,
        Operation::Decode => Decoder::with_config(config).decompress(&input)?,
    };
    write_output(&flags.output, &output)?;

    let (original, compressed) = match flags.operation {
        Operation::Encode => (input.len(), output.len()),
        Operation::Decode => (output.len(), input.len()),
    };
    tracing::info!(
        operation = ?flags.operation,
        original,
        compressed,
        "coding finished"
    );

    let err = io::stderr();
    let mut err = err.lock();
    if flags.stats {
        report_sizes(&mut err, original, compressed)?;
    }
    if !flags.compare.is_empty() {
        report_comparison(&mut err, original, compressed, &flags.compare)?;
    }

    Ok(())
}

fn read_input(input: &Input) -> io::Result<Vec<u8>> {
    match input {
        Input::File(path) => fs::read(path),
        Input::Stdin => {
            let mut data = vec![];
            io::stdin().lock().read_to_end(&mut data)?;
            Ok(data)
        }
    }
}

fn write_output(output: &Output, data: &[u8]) -> io::Result<()> {
    match output {
        Output::File(path) => fs::write(path, data),
        Output::Stdout => {
            let out = io::stdout();
            let mut out = out.lock();
            out.write_all(data)?;
            out.flush()
        }
    }
}

/// `size` as a percentage of `original`.
fn ratio(size: u64, original: usize) -> Option<f64> {
    if original == 0 {
        None
    } else {
        Some(100.0 * size as f64 / original as f64)
    }
}

fn report_sizes(mut out: impl Write, original: usize, compressed: usize) -> io::Result<()> {
    writeln!(out, "Original size: {} bytes", original)?;
    writeln!(out, "Compressed size: {} bytes", compressed)?;
    match ratio(compressed as u64, original) {
        Some(ratio) => writeln!(out, "Compression ratio: {:.2}%", ratio),
        None => writeln!(out, "Compression ratio: n/a"),
    }
}

fn report_comparison(
    mut out: impl Write,
    original: usize,
    compressed: usize,
    files: &[PathBuf],
) -> io::Result<()> {
    writeln!(out, "--- Format Comparison ---")?;
    write_entry(&mut out, "LZW1", compressed as u64, original)?;
    for path in files {
        let label = label_of(path);
        match fs::metadata(path) {
            Ok(meta) => write_entry(&mut out, &label, meta.len(), original)?,
            Err(_) => writeln!(out, "{:<12}: [File not found: {}]", label, path.display())?,
        }
    }
    Ok(())
}

fn write_entry(mut out: impl Write, label: &str, size: u64, original: usize) -> io::Result<()> {
    match ratio(size, original) {
        Some(ratio) => writeln!(out, "{:<12}: {:>8} bytes ({:.2}% of original)", label, size, ratio),
        None => writeln!(out, "{:<12}: {:>8} bytes", label, size),
    }
}

/// The extension in upper case, or the file name if there is none.
fn label_of(path: &Path) -> String {
    path.extension()
        .or_else(|| path.file_name())
        .map(|name| name.to_string_lossy().to_uppercase())
        .unwrap_or_else(|| path.display().to_string())
}

struct Flags {
    input: Input,
    output: Output,
    operation: Operation,
    max_code_size: u8,
    stats: bool,
    compare: Vec<PathBuf>,
}

struct ParamError(clap::Error);

#[derive(Debug)]
enum Input {
    File(PathBuf),
    Stdin,
}

#[derive(Debug)]
enum Output {
    File(PathBuf),
    Stdout,
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Encode,
    Decode,
}

impl Default for Flags {
    fn default() -> Flags {
        Flags {
            input: Input::Stdin,
            output: Output::Stdout,
            operation: Operation::Encode,
            max_code_size: DEFAULT_CODESIZE,
            stats: false,
            compare: vec![],
        }
    }
}

fn command() -> clap::Command {
    clap::Command::new("lzw")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compress and decompress LZW1 streams")
        .arg(
            Arg::new("decode")
                .short('d')
                .long("decode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("encode")
                .short('e')
                .long("encode")
                .action(ArgAction::SetTrue),
        )
        .group(
            ArgGroup::new("operation")
                .args(["decode", "encode"])
                .multiple(false)
                .required(true),
        )
        .arg(
            Arg::new("max_code_size")
                .short('w')
                .long("max-code-size")
                .help("Dictionary limit in bits, both sides must agree")
                .value_parser(
                    value_parser!(u8).range(i64::from(MIN_CODESIZE)..=i64::from(MAX_CODESIZE)),
                ),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output file, stdout if missing")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Print original and compressed sizes to stderr")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("compare")
                .long("compare")
                .help("Compare the compressed size against another file")
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("file")
                .help("Filepath or '-' for stdin")
                .default_value("-")
                .value_parser(value_parser!(PathBuf)),
        )
}

impl Flags {
    fn from_args(args: impl Iterator<Item = ffi::OsString>) -> Result<Self, ParamError> {
        let mut flags = Flags::default();
        let matches = command().try_get_matches_from(args).map_err(ParamError)?;

        if matches.get_flag("decode") {
            flags.operation = Operation::Decode;
        } else if matches.get_flag("encode") {
            flags.operation = Operation::Encode;
        }

        if let Some(&size) = matches.get_one::<u8>("max_code_size") {
            flags.max_code_size = size;
        }

        if let Some(path) = matches.get_one::<PathBuf>("output") {
            flags.output = Output::File(path.clone());
        }

        flags.stats = matches.get_flag("stats");
        flags.compare = matches
            .get_many::<PathBuf>("compare")
            .map(|paths| paths.cloned().collect())
            .unwrap_or_default();

        match matches.get_one::<PathBuf>("file") {
            None => flags.input = Input::Stdin,
            Some(p) if *p == PathBuf::from("-") => flags.input = Input::Stdin,
            Some(p) => flags.input = Input::File(p.clone()),
        }

        Ok(flags)
    }
}

enum CodingResult {
    Ok,
    Err(io::Error),
    Panic,
}

impl CodingResult {
    fn catch_panic(op: fn() -> Result<(), io::Error>) -> Self {
        std::panic::catch_unwind(|| match op() {
            Ok(()) => CodingResult::Ok,
            Err(err) => CodingResult::Err(err),
        })
        .unwrap_or(CodingResult::Panic)
    }
}

impl std::process::Termination for CodingResult {
    fn report(self) -> std::process::ExitCode {
        match self {
            CodingResult::Ok => std::process::ExitCode::SUCCESS,
            CodingResult::Err(err) => {
                eprintln!("{}", err);
                std::process::ExitCode::FAILURE
            }
            CodingResult::Panic => {
                eprintln!(
                    "The process failed irrecoverably! This should never happen and is a bug."
                );
                std::process::ExitCode::from(128)
            }
        }
    }
}
