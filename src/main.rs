//! Command-line entry point: view a cell-update stream from stdin or a file.

use anyhow::Context;
use blockview::{headless, Config, Engine, HaltReason, Summary};
use crossterm::tty::IsTty;
use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(argh::FromArgs)]
/// Live terminal display for a cell-update byte stream
struct Args {
    #[argh(option, default = "40")]
    /// grid width in cells
    width: u16,

    #[argh(option, default = "30")]
    /// grid height in cells
    height: u16,

    #[argh(option, default = "2")]
    /// terminal columns per cell
    cell_size: u16,

    #[argh(option, default = "2")]
    /// blank terminal cells around the grid
    margin: u16,

    #[argh(option, default = "String::from(\"PONG\")")]
    /// terminal window title
    title: String,

    #[argh(option, default = "1")]
    /// milliseconds between decode batches
    step_interval_ms: u64,

    #[argh(option)]
    /// read the stream from this file instead of stdin
    input: Option<PathBuf>,

    #[argh(option)]
    /// write logs to this file (interactive mode otherwise logs to stderr only when it is redirected)
    log_file: Option<PathBuf>,

    #[argh(switch)]
    /// decode without a display, logging to stderr
    headless: bool,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            grid_width: self.width,
            grid_height: self.height,
            cell_size: self.cell_size,
            margin: self.margin,
            title: self.title.clone(),
            step_interval: Duration::from_millis(self.step_interval_ms.max(1)),
            ..Config::default()
        }
    }

    fn log_target(&self, stderr_is_tty: bool) -> LogTarget<'_> {
        match &self.log_file {
            Some(path) => LogTarget::File(path),
            None if self.headless || !stderr_is_tty => LogTarget::Stderr,
            // Anything printed would land on top of the display.
            None => LogTarget::Discard,
        }
    }
}

/// Default directives when `RUST_LOG` is unset: per-record notices from the
/// viewer, everything else at info.
const DEFAULT_FILTER: &str = "info,blockview=debug";

/// Where log lines go.
#[derive(Debug, PartialEq, Eq)]
enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
    Discard,
}

fn init_logging(args: &Args) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match args.log_target(io::stderr().is_tty()) {
        LogTarget::File(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        LogTarget::Stderr => builder.with_writer(io::stderr).init(),
        LogTarget::Discard => builder.with_writer(io::sink).init(),
    }

    Ok(())
}

fn open_file(path: &Path) -> anyhow::Result<File> {
    File::open(path).with_context(|| format!("failed to open {}", path.display()))
}

fn open_stream(args: &Args) -> anyhow::Result<Box<dyn io::Read + Send>> {
    Ok(match &args.input {
        Some(path) => Box::new(open_file(path)?),
        None => Box::new(io::stdin()),
    })
}

fn report(summary: &Summary) {
    let ended = match summary.halt_reason {
        Some(HaltReason::Terminated) => "exit signal received".to_string(),
        Some(HaltReason::ShortRead { got }) => format!("stream cut short ({got} stray bytes)"),
        None => "display closed while streaming".to_string(),
    };
    info!(
        drawn = summary.stats.drawn,
        out_of_bounds = summary.stats.out_of_bounds,
        "{ended}"
    );
}

fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();
    init_logging(&args)?;

    let config = args.config();
    config.validate().context("invalid configuration")?;

    let summary = match (args.headless, &args.input) {
        (true, Some(path)) => {
            headless::run_blocking(&config, open_file(path)?).context("headless run failed")?
        }
        (true, None) => headless::run(&config, io::stdin()).context("headless run failed")?,
        (false, _) => {
            let mut engine = Engine::with_config(config, open_stream(&args)?)
                .context("failed to start display")?;
            engine.run()
        }
    };

    report(&summary);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use argh::FromArgs;

    fn args(flags: &[&str]) -> Args {
        Args::from_args(&["blockview"], flags).unwrap()
    }

    #[test]
    fn test_interactive_logs_to_redirected_stderr() {
        let interactive = args(&[]);
        assert_eq!(interactive.log_target(false), LogTarget::Stderr);
        assert_eq!(interactive.log_target(true), LogTarget::Discard);
    }

    #[test]
    fn test_headless_always_logs_to_stderr() {
        let headless = args(&["--headless"]);
        assert_eq!(headless.log_target(true), LogTarget::Stderr);
        assert_eq!(headless.log_target(false), LogTarget::Stderr);
    }

    #[test]
    fn test_log_file_wins() {
        let logged = args(&["--log-file", "view.log"]);
        assert_eq!(logged.log_target(true), LogTarget::File(Path::new("view.log")));
        let logged = args(&["--headless", "--log-file", "view.log"]);
        assert_eq!(logged.log_target(false), LogTarget::File(Path::new("view.log")));
    }

    #[test]
    fn test_default_filter_shows_draw_notices() {
        let filter = EnvFilter::try_new(DEFAULT_FILTER).unwrap();
        assert!(filter.to_string().contains("blockview=debug"));
    }
}
