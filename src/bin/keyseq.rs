// Keyseq CLI
// Validates keymap files and prints the actions typed in a terminal

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use parking_lot::Mutex;

use keyseq_core::config::TIMEOUT_RANGE_MS;
use keyseq_core::{
    keyboard_event_from_crossterm, subscribe, Callback, Config, EventTarget, KeyboardEvent,
    Platform,
};

/// Idle poll interval when no timer is pending
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Keyboard shortcut and key sequence tester
#[derive(Parser, Debug)]
#[command(name = "keyseq")]
#[command(version)]
#[command(about = "Match keyboard shortcuts and key sequences typed in a terminal", long_about = None)]
struct Args {
    /// TOML keymap file (defaults to ~/.config/keyseq/keymap.toml)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Validate the keymap, print the parsed bindings and exit
    #[arg(long)]
    check_config: bool,

    /// Override the sequence timeout in milliseconds
    #[arg(short, long, value_name = "MS")]
    timeout: Option<u64>,

    /// Override the platform used for `$mod` (apple or other)
    #[arg(short, long, value_name = "PLATFORM")]
    platform: Option<Platform>,

    /// Binding that exits listen mode
    #[arg(short, long, value_name = "BINDING", default_value = "Control+c")]
    quit: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Main application state
struct Application {
    config: Config,
    args: Args,
    /// Flag to signal the event loop to stop
    running: Arc<AtomicBool>,
}

impl Application {
    fn new(args: Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Config::from_toml_path(path)
                .with_context(|| format!("failed to load keymap {}", path.display()))?,
            None => Config::load_default().context("failed to load default keymap")?,
        };

        if let Some(ms) = args.timeout {
            if !TIMEOUT_RANGE_MS.contains(&ms) {
                bail!(
                    "--timeout must be {}-{}ms, got {}",
                    TIMEOUT_RANGE_MS.start(),
                    TIMEOUT_RANGE_MS.end(),
                    ms
                );
            }
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(platform) = args.platform {
            config.platform = Some(platform);
        }

        Ok(Self {
            config,
            args,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Print the effective options and every parsed binding
    fn validate(&self) -> Result<()> {
        let options = self.config.options();
        println!("Configuration is valid");
        println!(
            "timeout: {}ms, event: {}, platform: {}",
            options.timeout.as_millis(),
            options.event,
            options.platform
        );
        for (binding, action) in self.config.parsed_bindings() {
            let kind = if binding.is_sequence() { "sequence" } else { "chord" };
            println!("  {:<24} {:<8} -> {}", binding.to_string(), kind, action);
        }
        Ok(())
    }

    /// Listen to the terminal until the quit binding fires
    fn run(&self) -> Result<()> {
        if self.config.bindings.is_empty() {
            log::warn!("No bindings configured; only the quit binding is active");
        }

        let fired: Arc<Mutex<Vec<String>>> = Arc::default();
        let mut map = self.config.binding_map(|action| {
            let fired = Arc::clone(&fired);
            let action = action.to_string();
            let callback: Callback = Box::new(move |_: &KeyboardEvent| {
                fired.lock().push(action.clone());
            });
            callback
        });
        let running = Arc::clone(&self.running);
        map.insert(
            self.args.quit.clone(),
            Box::new(move |_: &KeyboardEvent| running.store(false, Ordering::SeqCst)),
        );

        let target = EventTarget::new();
        let _subscription = subscribe(&target, map, self.config.options());

        println!("Listening; press {} to quit", self.args.quit);
        let _raw = RawModeGuard::enable()?;
        let mut stdout = io::stdout();

        while self.running.load(Ordering::SeqCst) {
            let wait = target
                .next_deadline()
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                .unwrap_or(IDLE_POLL)
                .min(IDLE_POLL);

            if event::poll(wait)? {
                if let Event::Key(key) = event::read()? {
                    match keyboard_event_from_crossterm(&key) {
                        Some(keyboard) => target.dispatch(&keyboard.into()),
                        None => log::debug!("Unmapped terminal key: {:?}", key.code),
                    }
                }
            }
            target.poll_timers();

            let actions: Vec<String> = fired.lock().drain(..).collect();
            for action in actions {
                write!(stdout, "{}\r\n", action)?;
            }
            stdout.flush()?;
        }
        Ok(())
    }
}

/// Keeps the terminal in raw mode while alive
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            log::error!("Failed to restore terminal: {}", err);
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let app = Application::new(args)?;

    if app.args.check_config {
        return app.validate();
    }

    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["keyseq", "--config", "/tmp/keymap.toml"]);

        assert_eq!(args.config, Some(PathBuf::from("/tmp/keymap.toml")));
        assert!(!args.check_config);
        assert!(!args.verbose);
        assert_eq!(args.timeout, None);
        assert_eq!(args.platform, None);
        assert_eq!(args.quit, "Control+c");
    }

    #[test]
    fn test_args_with_options() {
        let args = Args::parse_from([
            "keyseq",
            "--check-config",
            "--timeout",
            "750",
            "--platform",
            "apple",
            "--quit",
            "Escape Escape",
            "-v",
        ]);

        assert!(args.check_config);
        assert!(args.verbose);
        assert_eq!(args.timeout, Some(750));
        assert_eq!(args.platform, Some(Platform::Apple));
        assert_eq!(args.quit, "Escape Escape");
    }

    #[test]
    fn test_timeout_override_validated() {
        let path = std::env::temp_dir().join(format!("keyseq-cli-{}.toml", std::process::id()));
        std::fs::write(&path, "[bindings]\n\"g g\" = \"top\"\n").unwrap();

        let args = Args::parse_from([
            "keyseq",
            "--config",
            path.to_str().unwrap(),
            "--timeout",
            "5",
        ]);
        assert!(Application::new(args).is_err());

        let args = Args::parse_from([
            "keyseq",
            "--config",
            path.to_str().unwrap(),
            "--timeout",
            "400",
            "--platform",
            "other",
        ]);
        let app = Application::new(args).unwrap();
        assert_eq!(app.config.timeout, Duration::from_millis(400));
        assert_eq!(app.config.options().platform, Platform::Other);

        std::fs::remove_file(&path).unwrap();
    }
}
