use std::fs;
use std::io::{ErrorKind, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use ballsync_core::{
    Config, PollOutcome, Report, Session, TcpSource, encode_frame, make_report, parse_record,
};
use clap::{Args, Parser, Subcommand};
use log::{debug, info, warn};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("BALLSYNC_BUILD_COMMIT"),
    " ",
    env!("BALLSYNC_BUILD_DATE"),
    ")"
);

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "ballsync")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Receive tracked-ball positions over TCP and map them onto a target plane.",
    long_about = None,
    after_help = "Examples:\n  ballsync receive --config viewer.json --stdout\n  ballsync receive --host 10.0.0.5 --port 9003 -o report.json\n  ballsync serve --input balls.txt --port 9003 --interval-ms 500"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect to a sender and apply position updates until it disconnects.
    Receive(ReceiveArgs),
    /// Accept one receiver and send a record file as a frame every interval.
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct ReceiveArgs {
    /// JSON configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured server address
    #[arg(long)]
    host: Option<String>,

    /// Override the configured server port
    #[arg(long)]
    port: Option<u16>,

    /// Delay between poll cycles in milliseconds
    #[arg(long, default_value_t = 16)]
    interval_ms: u64,

    /// Stop after this many poll cycles
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Output report path (JSON)
    #[arg(short = 'o', long)]
    report: Option<PathBuf>,

    /// Write JSON report to stdout
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Text file with one record per line
    #[arg(short, long)]
    input: PathBuf,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to listen on (0 picks a free port)
    #[arg(long, default_value_t = ballsync_core::config::DEFAULT_SERVER_PORT)]
    port: u16,

    /// Delay between batches in milliseconds
    #[arg(long, default_value_t = 500)]
    interval_ms: u64,

    /// Stop after sending this many batches
    #[arg(long)]
    count: Option<u64>,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let quiet = match &cli.command {
        Commands::Receive(args) => args.quiet,
        Commands::Serve(args) => args.quiet,
    };
    init_logging(quiet);

    let result = install_stop_flag().and_then(|stop| match cli.command {
        Commands::Receive(args) => cmd_receive(args, &stop),
        Commands::Serve(args) => cmd_serve(args, &stop),
    });

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
        CliError::new(format!("{err:#}"), None)
    }
}

fn init_logging(quiet: bool) {
    let default_filter = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();
}

fn install_stop_flag() -> Result<Arc<AtomicBool>, CliError> {
    let stop = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&stop);
    ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst))
        .context("Failed to install Ctrl-C handler")?;
    Ok(stop)
}

fn cmd_receive(args: ReceiveArgs, stop: &AtomicBool) -> Result<(), CliError> {
    let mut config = match &args.config {
        Some(path) => Config::load(path).map_err(|err| {
            CliError::new(
                err.to_string(),
                Some("expected a camelCase JSON object, e.g. {\"serverPort\": 9003}".to_string()),
            )
        })?,
        None => Config::default(),
    };
    if let Some(host) = args.host {
        config.server_address = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }
    config
        .validate()
        .map_err(|err| CliError::new(err.to_string(), None))?;

    let mut source =
        TcpSource::connect(&config.server_address, config.server_port).map_err(|err| {
            CliError::new(
                err.to_string(),
                Some("start the sender first; the receiver does not retry".to_string()),
            )
        })?;
    let peer = source.peer_addr().to_string();
    info!("connected to {peer}");

    let mut targets = config.target_table();
    let mut session = Session::new(config.mapper());
    let interval = Duration::from_millis(args.interval_ms);
    let mut cycles = 0u64;

    loop {
        if stop.load(Ordering::SeqCst) {
            info!("interrupted, stopping");
            break;
        }
        match session
            .poll(&mut source, &mut targets)
            .context("Receive cycle failed")?
        {
            PollOutcome::Disconnected => {
                info!("connection to {peer} closed");
                break;
            }
            PollOutcome::Idle => {}
            PollOutcome::Processed(summary) => debug!(
                "cycle: {} frames, {} updates applied, {} records skipped",
                summary.frames, summary.applied_updates, summary.invalid_records
            ),
        }
        cycles += 1;
        if args.max_cycles.is_some_and(|max| cycles >= max) {
            info!("reached {cycles} cycles, stopping");
            break;
        }
        thread::sleep(interval);
    }

    let report = make_report(&peer, session.stats(), &targets);
    let json = serialize_report(&report, args.pretty)?;

    if args.stdout {
        println!("{json}");
    } else if let Some(path) = args.report.as_ref() {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory: {}", parent.display())
                })?;
            }
        }
        fs::write(path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        if !args.quiet {
            eprintln!("OK: report written -> {}", path.display());
        }
    }

    if !args.quiet {
        let stats = report.stats;
        eprintln!(
            "OK: {} frames, {} updates applied, {} ignored, {} records skipped, {} resyncs",
            stats.frames,
            stats.applied_updates,
            stats.ignored_updates,
            stats.invalid_records,
            stats.resyncs
        );
    }
    Ok(())
}

fn serialize_report(report: &Report, pretty: bool) -> Result<String, CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    };
    json.context("JSON serialization failed").map_err(Into::into)
}

fn cmd_serve(args: ServeArgs, stop: &AtomicBool) -> Result<(), CliError> {
    let text = fs::read_to_string(&args.input).map_err(|err| {
        CliError::new(
            format!("cannot read input {}: {err}", args.input.display()),
            Some("pass a text file with one record per line".to_string()),
        )
    })?;
    let batch = build_batch(&text);
    if batch.is_empty() {
        return Err(CliError::new(
            format!("input has no records: {}", args.input.display()),
            Some("expected lines like 'Ball0, id:0, X:12.00, Y:34.00, color:red'".to_string()),
        ));
    }
    let frame = encode_frame(batch.as_bytes()).map_err(|err| {
        CliError::new(
            format!("batch cannot be framed: {err}"),
            Some("split the input into smaller files".to_string()),
        )
    })?;

    let listener = TcpListener::bind((args.bind.as_str(), args.port))
        .with_context(|| format!("Failed to listen on {}:{}", args.bind, args.port))?;
    let local = listener
        .local_addr()
        .context("Failed to resolve listening address")?;
    eprintln!("listening on {local}");

    let Some((mut stream, client)) = accept_client(&listener, stop)? else {
        info!("interrupted before a client connected");
        if !args.quiet {
            eprintln!("OK: 0 batches sent");
        }
        return Ok(());
    };
    info!("client connected: {client}");

    let interval = Duration::from_millis(args.interval_ms);
    let mut sent = 0u64;
    while !stop.load(Ordering::SeqCst) {
        match stream.write_all(&frame).and_then(|()| stream.flush()) {
            Ok(()) => {}
            Err(err) if is_client_gone(&err) => {
                info!("client {client} disconnected");
                break;
            }
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context(format!("Failed to send batch to {client}"))
                    .into());
            }
        }
        sent += 1;
        debug!("sent batch {sent} ({} bytes)", frame.len());
        if args.count.is_some_and(|count| sent >= count) {
            break;
        }
        thread::sleep(interval);
    }

    if !args.quiet {
        eprintln!("OK: {sent} batches sent -> {client}");
    }
    Ok(())
}

/// Wait for one client, returning `None` if a stop is requested first.
fn accept_client(
    listener: &TcpListener,
    stop: &AtomicBool,
) -> Result<Option<(TcpStream, SocketAddr)>, CliError> {
    listener
        .set_nonblocking(true)
        .context("Failed to configure listener")?;
    while !stop.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, client)) => {
                stream
                    .set_nonblocking(false)
                    .context("Failed to configure client stream")?;
                return Ok(Some((stream, client)));
            }
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context("Failed to accept a client")
                    .into());
            }
        }
    }
    Ok(None)
}

/// Join the non-empty lines of `text` into one newline-terminated batch,
/// warning about lines a receiver would skip.
fn build_batch(text: &str) -> String {
    let mut batch = String::new();
    for line in text.lines().map(str::trim_end).filter(|line| !line.is_empty()) {
        if let Err(err) = parse_record(line) {
            warn!("record {line:?} will be skipped by receivers: {err}");
        }
        batch.push_str(line);
        batch.push('\n');
    }
    batch
}

fn is_client_gone(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
    )
}

#[cfg(test)]
mod tests {
    use super::build_batch;

    #[test]
    fn build_batch_drops_blank_lines() {
        let batch = build_batch("Ball0, id:0, X:1, Y:2, color:red\r\n\n  \nBall1, id:1, X:3, Y:4, color:blue");
        assert_eq!(
            batch,
            "Ball0, id:0, X:1, Y:2, color:red\nBall1, id:1, X:3, Y:4, color:blue\n"
        );
    }

    #[test]
    fn build_batch_keeps_invalid_lines() {
        let batch = build_batch("not a record\n");
        assert_eq!(batch, "not a record\n");
    }
}
