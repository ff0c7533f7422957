use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use glob::glob;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

use cavecrawler_core::{MemorySource, Report, SensorKind, SensorKinds, SessionConfig};

const EXAMPLES: &str = "Examples:\n  cavecrawler capture decode serial.bin -o report.json\n  cavecrawler decode serial.bin --stdout --pretty\n  cavecrawler capture decode 'logs/run-*.bin' --only odometry --stdout";

#[derive(Parser, Debug)]
#[command(name = "cavecrawler")]
#[command(version = version_string())]
#[command(
    about = "Offline decoder for Cave Crawler serial captures (odometry, ultra lidar, XV lidar).",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on raw serial captures.
    Capture {
        #[command(subcommand)]
        command: CaptureCommands,
    },
    /// Shorthand for `capture decode`.
    Decode(DecodeArgs),
}

#[derive(Subcommand, Debug)]
enum CaptureCommands {
    /// Decode a capture and write a versioned JSON report.
    #[command(alias = "replay")]
    #[command(after_help = EXAMPLES)]
    Decode(DecodeArgs),
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Path (or glob matching one file) of the raw byte capture
    input: PathBuf,

    /// Output report path (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    report: Option<PathBuf>,

    /// Write JSON report to stdout
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code if checksum failures or desync bytes occurred
    #[arg(long)]
    strict: bool,

    /// Session configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay the capture in chunks of this many bytes
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Accumulation buffer capacity in bytes
    #[arg(long)]
    capacity: Option<usize>,

    /// Device id stamped on ultra lidar records
    #[arg(long)]
    device_id: Option<u8>,

    /// Emit only these sensor kinds (comma separated)
    #[arg(long, value_enum, value_delimiter = ',')]
    only: Vec<KindArg>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "snake_case")]
enum KindArg {
    Odometry,
    UltraLidar,
    XvLidar,
}

impl From<KindArg> for SensorKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Odometry => SensorKind::Odometry,
            KindArg::UltraLidar => SensorKind::UltraLidar,
            KindArg::XvLidar => SensorKind::XvLidar,
        }
    }
}

fn version_string() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("CAVECRAWLER_BUILD_COMMIT"),
        " ",
        env!("CAVECRAWLER_BUILD_DATE"),
        ")"
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Capture { command } => match command {
            CaptureCommands::Decode(args) => cmd_capture_decode(args),
        },
        Commands::Decode(args) => cmd_capture_decode(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

fn cmd_capture_decode(args: DecodeArgs) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&args.input)?;
    validate_input_file(&resolved_input)?;
    let report_path = if args.stdout {
        None
    } else {
        Some(args.report.clone().ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };
    if let Some(report_path) = report_path.as_ref() {
        ensure_distinct_output(&resolved_input, report_path)?;
    }

    let config = build_config(&args)?;
    let mut rep = decode(&resolved_input, args.chunk_size, &config)?;
    rep.generated_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("failed to format report timestamp")?;
    let json = serialize_report(&rep, args.pretty, args.compact)?;

    match report_path {
        None => print!("{}", json),
        Some(report_path) => {
            if let Some(parent) = report_path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&report_path, json)
                .with_context(|| format!("Failed to write report: {}", report_path.display()))?;
            if !args.quiet {
                eprintln!("OK: report written -> {}", report_path.display());
            }
        }
    }

    if !args.quiet {
        print_diagnostics(&rep);
    }
    if args.strict && rep.diagnostics.saw_corruption() {
        return Err(CliError::new(
            format!(
                "stream corruption detected ({} checksum failures, {} desync bytes)",
                rep.diagnostics.checksum_failures, rep.diagnostics.desync_bytes
            ),
            Some("inspect the diagnostics section of the report".to_string()),
        ));
    }
    Ok(())
}

fn build_config(args: &DecodeArgs) -> Result<SessionConfig, CliError> {
    let mut config = match args.config.as_ref() {
        Some(path) => SessionConfig::from_path(path).map_err(|err| {
            CliError::new(
                format!("invalid config {}: {}", path.display(), err),
                Some("config is a JSON object; unknown fields are rejected".to_string()),
            )
        })?,
        None => SessionConfig::default(),
    };
    if let Some(capacity) = args.capacity {
        config.buffer_capacity = capacity;
    }
    if let Some(device_id) = args.device_id {
        config.device_id = device_id;
    }
    if !args.only.is_empty() {
        let kinds: Vec<SensorKind> = args.only.iter().copied().map(Into::into).collect();
        config.kinds = SensorKinds::only(&kinds);
    }
    if args.chunk_size == Some(0) {
        return Err(CliError::new(
            "chunk size must be at least 1",
            Some("omit --chunk-size to read the file directly".to_string()),
        ));
    }
    config
        .validate()
        .map_err(|err| CliError::new(format!("invalid configuration: {}", err), None))?;
    debug!(?config, "session configuration");
    Ok(config)
}

fn decode(
    input: &Path,
    chunk_size: Option<usize>,
    config: &SessionConfig,
) -> Result<Report, CliError> {
    let rep = match chunk_size {
        None => cavecrawler_core::decode_capture_file(input, config)
            .context("capture decoding failed")?,
        Some(chunk_size) => {
            let bytes = fs::read(input)
                .with_context(|| format!("Failed to read input file: {}", input.display()))?;
            let source = MemorySource::chunked(&bytes, chunk_size);
            cavecrawler_core::decode_source(&input.display().to_string(), source, config)
                .context("capture decoding failed")?
        }
    };
    Ok(rep)
}

fn serialize_report(rep: &Report, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn print_diagnostics(rep: &Report) {
    let stats = &rep.diagnostics;
    if !stats.saw_corruption() && stats.ultra_sequence_gaps == 0 {
        return;
    }
    eprintln!("Diagnostics:");
    eprintln!("  checksum failures: {}", stats.checksum_failures);
    eprintln!("  desync bytes: {}", stats.desync_bytes);
    if stats.ultra_sequence_gaps > 0 {
        eprintln!(
            "  ultra sequence gaps: {} ({} capsules lost)",
            stats.ultra_sequence_gaps, stats.ultra_lost_capsules
        );
    }
}

fn ensure_distinct_output(input: &Path, report_path: &Path) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let parent = match report_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // Output directory may not exist yet; nothing to compare against then.
    let Ok(report_dir) = fs::canonicalize(parent) else {
        return Ok(());
    };
    let file_name = report_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path"))?;
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a raw serial capture file".to_string()),
        ));
    }
    if !is_capture_input(input) {
        return Err(CliError::new(
            format!("input is not a file or character device: {}", input.display()),
            Some("pass a raw serial capture file or a serial device".to_string()),
        ));
    }
    Ok(())
}

/// Regular files and, on unix, character devices (serial lines).
fn is_capture_input(input: &Path) -> bool {
    let Ok(meta) = fs::metadata(input) else {
        return false;
    };
    if meta.is_file() {
        return true;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;
        if meta.file_type().is_char_device() {
            return true;
        }
    }
    false
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    if matches.len() > 1 {
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let more = if matches.len() > 3 { ", ..." } else { "" };
        return Err(CliError::new(
            format!(
                "multiple files match pattern '{}' ({} matches); matches: {}{}",
                pattern,
                matches.len(),
                listed,
                more
            ),
            Some("pass a single capture file, or run once per file".to_string()),
        ));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
