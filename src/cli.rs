// Command-line interface for jsondelta.
//
// Explicit subcommands and long-form options over the engine:
// diff, merge, hidden-key splitting and build configuration.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use serde_json::{Value, json};

use crate::delta::{self, ARRAY_MARKER, DELETED_KEYS, HIDDEN_MARKER, MAX_ARRAY_GROWTH};
use crate::engine::{self, DecodeOptions, EncodeOptions};

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// JSON delta encoder/merger.
#[derive(Parser, Debug)]
#[command(
    name = "jsondelta",
    version,
    about = "Compute and apply JSON deltas",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compute the delta from a source document to a target document.
    Diff(DiffArgs),
    /// Apply a delta to a source document.
    Merge(MergeArgs),
    /// Split hidden keys out of a document.
    Hidden(HiddenArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Args, Debug)]
struct DiffArgs {
    /// Source (original) document.
    #[arg(long, short = 's', value_hint = ValueHint::FilePath)]
    source: PathBuf,

    /// Target document (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Delta output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Check/compute only (do not write output).
    #[arg(long = "check-only")]
    no_output: bool,

    /// Leave hidden keys out of the delta.
    #[arg(long = "strip-hidden")]
    strip_hidden: bool,

    /// Pretty-print the delta.
    #[arg(long)]
    pretty: bool,

    /// Target document (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Delta output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct MergeArgs {
    /// Source (original) document.
    #[arg(long, short = 's', value_hint = ValueHint::FilePath)]
    source: PathBuf,

    /// Delta document (default: stdin).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Merged output file (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Remove hidden keys from the source before merging.
    #[arg(long = "strip-hidden")]
    strip_hidden: bool,

    /// Pretty-print the merged document.
    #[arg(long)]
    pretty: bool,

    /// Delta document (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Merged output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct HiddenArgs {
    /// Input document (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Visible document output (default: stdout).
    #[arg(long, value_hint = ValueHint::FilePath)]
    visible: Option<PathBuf>,

    /// Hidden keys output (default: discarded).
    #[arg(long, value_hint = ValueHint::FilePath)]
    hidden: Option<PathBuf>,

    /// Pretty-print the outputs.
    #[arg(long)]
    pretty: bool,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Diff,
    Merge,
    Hidden,
    Config,
}

#[derive(Debug)]
struct Options {
    command: Command,
    use_stdout: bool,
    force: bool,
    quiet: bool,
    verbose: u8,
    no_output: bool,
    strip_hidden: bool,
    pretty: bool,
    source_file: Option<PathBuf>,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    hidden_file: Option<PathBuf>,
    json_output: bool,
}

impl Options {
    fn new(command: Command, cli_flags: (bool, bool, u8, bool)) -> Self {
        let (force, quiet, verbose, json_output) = cli_flags;
        Self {
            command,
            use_stdout: false,
            force,
            quiet,
            verbose,
            no_output: false,
            strip_hidden: false,
            pretty: false,
            source_file: None,
            input_file: None,
            output_file: None,
            hidden_file: None,
            json_output,
        }
    }
}

fn resolve_options(cli: Cli) -> Options {
    let flags = (cli.force, cli.quiet, cli.verbose.min(2), cli.json_output);

    match cli.command {
        Cmd::Diff(args) => Options {
            use_stdout: args.stdout,
            no_output: args.no_output,
            strip_hidden: args.strip_hidden,
            pretty: args.pretty,
            source_file: Some(args.source),
            input_file: args.input.or(args.input_pos),
            output_file: args.output.or(args.output_pos),
            ..Options::new(Command::Diff, flags)
        },
        Cmd::Merge(args) => Options {
            use_stdout: args.stdout,
            strip_hidden: args.strip_hidden,
            pretty: args.pretty,
            source_file: Some(args.source),
            input_file: args.input.or(args.input_pos),
            output_file: args.output.or(args.output_pos),
            ..Options::new(Command::Merge, flags)
        },
        Cmd::Hidden(args) => Options {
            pretty: args.pretty,
            input_file: args.input,
            output_file: args.visible,
            hidden_file: args.hidden,
            ..Options::new(Command::Hidden, flags)
        },
        Cmd::Config => Options::new(Command::Config, flags),
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("jsondelta".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

// ---------------------------------------------------------------------------
// Shared I/O
// ---------------------------------------------------------------------------

fn read_source(path: &Path) -> Result<Vec<u8>, i32> {
    std::fs::read(path).map_err(|e| {
        eprintln!("jsondelta: source file: {}: {e}", path.display());
        1
    })
}

/// Read the input file, or stdin when none is given.
fn read_input(path: Option<&Path>) -> Result<Vec<u8>, i32> {
    let mut data = Vec::new();
    let result = match path {
        Some(path) => File::open(path).and_then(|mut f| f.read_to_end(&mut data)),
        None => io::stdin().lock().read_to_end(&mut data),
    };
    match result {
        Ok(_) => Ok(data),
        Err(e) => {
            match path {
                Some(path) => eprintln!("jsondelta: input file: {}: {e}", path.display()),
                None => eprintln!("jsondelta: stdin: {e}"),
            }
            Err(1)
        }
    }
}

/// Open `path` for writing (refusing to clobber without `--force`), or
/// stdout when no path is given.
fn open_output(path: Option<&Path>, force: bool) -> Result<Box<dyn Write>, i32> {
    match path {
        None => Ok(Box::new(BufWriter::with_capacity(
            BUF_SIZE,
            io::stdout().lock(),
        ))),
        Some(path) => {
            if path.exists() && !force {
                eprintln!(
                    "jsondelta: output file exists, use -f to overwrite: {}",
                    path.display()
                );
                return Err(1);
            }
            match File::create(path) {
                Ok(f) => Ok(Box::new(BufWriter::with_capacity(BUF_SIZE, f))),
                Err(e) => {
                    eprintln!("jsondelta: output file: {}: {e}", path.display());
                    Err(1)
                }
            }
        }
    }
}

fn write_output(path: Option<&Path>, force: bool, data: &[u8]) -> Result<(), i32> {
    let mut writer = open_output(path, force)?;
    writer
        .write_all(data)
        .and_then(|()| writer.flush())
        .map_err(|e| {
            eprintln!("jsondelta: write error: {e}");
            1
        })
}

fn output_path(opts: &Options) -> Option<&Path> {
    if opts.use_stdout {
        None
    } else {
        opts.output_file.as_deref()
    }
}

fn render(value: &Value, pretty: bool) -> Result<Vec<u8>, serde_json::Error> {
    if pretty {
        let mut out = serde_json::to_vec_pretty(value)?;
        out.push(b'\n');
        Ok(out)
    } else {
        serde_json::to_vec(value)
    }
}

fn report_json(stats: Value) {
    eprintln!("{stats}");
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("jsondelta version {version} (Rust)");

    let file_io = cfg!(feature = "file-io") as u8;

    eprintln!("FILE_IO={file_io}");
    eprintln!("ARRAY_MARKER={ARRAY_MARKER}");
    eprintln!("HIDDEN_MARKER={HIDDEN_MARKER}");
    eprintln!("DELETED_KEYS={DELETED_KEYS}");
    eprintln!("MAX_ARRAY_GROWTH={MAX_ARRAY_GROWTH}");

    0
}

// ---------------------------------------------------------------------------
// Diff command
// ---------------------------------------------------------------------------

fn cmd_diff(opts: &Options) -> i32 {
    let Some(source_path) = opts.source_file.as_deref() else {
        eprintln!("jsondelta: diff: --source is required");
        return 1;
    };
    let source = match read_source(source_path) {
        Ok(data) => data,
        Err(code) => return code,
    };
    let target = match read_input(opts.input_file.as_deref()) {
        Ok(data) => data,
        Err(code) => return code,
    };

    let encode_opts = EncodeOptions {
        strip_hidden: opts.strip_hidden,
        pretty: opts.pretty,
    };
    let mut delta = Vec::new();
    let changed = match engine::encode_with_options(&source, &target, &mut delta, &encode_opts) {
        Ok(changed) => changed,
        Err(e) => {
            eprintln!("jsondelta: diff: {e}");
            return 1;
        }
    };

    if opts.no_output {
        if !opts.quiet {
            let verdict = if changed { "documents differ" } else { "documents are identical" };
            eprintln!("jsondelta: {verdict} (delta size: {})", delta.len());
        }
    } else if let Err(code) = write_output(output_path(opts), opts.force, &delta) {
        return code;
    }

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "jsondelta: diff: source size: {}, target size: {}, delta size: {}",
            source.len(),
            target.len(),
            delta.len()
        );
    }

    if opts.json_output {
        report_json(json!({
            "command": "diff",
            "source_size": source.len(),
            "target_size": target.len(),
            "delta_size": delta.len(),
            "changed": changed,
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Merge command
// ---------------------------------------------------------------------------

fn cmd_merge(opts: &Options) -> i32 {
    let Some(source_path) = opts.source_file.as_deref() else {
        eprintln!("jsondelta: merge: --source is required");
        return 1;
    };
    let source = match read_source(source_path) {
        Ok(data) => data,
        Err(code) => return code,
    };
    let delta = match read_input(opts.input_file.as_deref()) {
        Ok(data) => data,
        Err(code) => return code,
    };

    let decode_opts = DecodeOptions {
        strip_hidden: opts.strip_hidden,
        pretty: opts.pretty,
    };
    let merged = match engine::decode_with_options(&source, &delta, &decode_opts) {
        Ok(merged) => merged,
        Err(e) => {
            eprintln!("jsondelta: merge: {e}");
            return 1;
        }
    };

    if let Err(code) = write_output(output_path(opts), opts.force, &merged) {
        return code;
    }

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "jsondelta: merge: source size: {}, delta size: {}, output size: {}",
            source.len(),
            delta.len(),
            merged.len()
        );
    }

    if opts.json_output {
        report_json(json!({
            "command": "merge",
            "source_size": source.len(),
            "delta_size": delta.len(),
            "output_size": merged.len(),
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Hidden command
// ---------------------------------------------------------------------------

fn cmd_hidden(opts: &Options) -> i32 {
    let input = match read_input(opts.input_file.as_deref()) {
        Ok(data) => data,
        Err(code) => return code,
    };
    let mut document: Value = match serde_json::from_slice(&input) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("jsondelta: hidden: invalid input document: {e}");
            return 1;
        }
    };

    let hidden = delta::extract_hidden(&mut document);

    let rendered = render(&document, opts.pretty).and_then(|visible| {
        let hidden_bytes = match &hidden {
            Some(hidden) => render(hidden, opts.pretty)?,
            None => Vec::new(),
        };
        Ok((visible, hidden_bytes))
    });
    let (visible, hidden_bytes) = match rendered {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("jsondelta: hidden: {e}");
            return 1;
        }
    };

    if let Err(code) = write_output(opts.output_file.as_deref(), opts.force, &visible) {
        return code;
    }
    if let Some(path) = opts.hidden_file.as_deref() {
        if let Err(code) = write_output(Some(path), opts.force, &hidden_bytes) {
            return code;
        }
    } else if hidden.is_some() {
        log::info!("hidden keys found but discarded (use --hidden to keep them)");
    }

    if opts.json_output {
        report_json(json!({
            "command": "hidden",
            "input_size": input.len(),
            "visible_size": visible.len(),
            "hidden_size": hidden_bytes.len(),
            "hidden_found": hidden.is_some(),
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let mut opts = resolve_options(cli);

    let default_filter = if opts.quiet {
        "error"
    } else {
        match opts.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    // Warn if -c overrides output filename.
    if opts.use_stdout && !opts.quiet {
        if let Some(path) = opts.output_file.take() {
            eprintln!(
                "jsondelta: warning: -c option overrides output filename: {}",
                path.display()
            );
        }
    }

    let exit_code = match opts.command {
        Command::Diff => cmd_diff(&opts),
        Command::Merge => cmd_merge(&opts),
        Command::Hidden => cmd_hidden(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
