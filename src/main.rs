//! scrolltap - system-wide scroll and click filter for macOS
//!
//! Reclassifies scroll events by originating device and rewrites their
//! payloads before they reach any application.

#[cfg(target_os = "macos")]
fn main() -> anyhow::Result<()> {
    macos::run()
}

#[cfg(not(target_os = "macos"))]
fn main() -> anyhow::Result<()> {
    anyhow::bail!("scrolltap only runs on macOS (CGEventTap is a macOS facility)")
}

#[cfg(target_os = "macos")]
mod macos {
    use scrolltap::app::cli::{Cli, Commands};
    use scrolltap::app::config::FilterConfig;
    use scrolltap::engine::FilterEngine;
    use scrolltap::tap::event_tap::{RunLoopHandle, TapLifecycle};
    use scrolltap::tap::permissions;
    use scrolltap::time::timebase::MachTimebase;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tracing::{error, info, warn};
    use tracing_subscriber::EnvFilter;

    pub fn run() -> anyhow::Result<()> {
        // Parse CLI arguments first so --verbose can set the log level
        let cli = Cli::parse_args();

        let default_level = if cli.verbose { "debug" } else { "info" };
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(default_level)),
            )
            .init();

        MachTimebase::init();

        let config = FilterConfig::default();
        config.validate()?;

        match cli.command.unwrap_or(Commands::Run) {
            Commands::Run => run_filter(&config),
            Commands::Check { prompt } => run_check(prompt),
            Commands::Config => {
                println!("{}", config.to_toml()?);
                Ok(())
            }
        }
    }

    fn run_filter(config: &FilterConfig) -> anyhow::Result<()> {
        info!(
            reverse_vertical = config.reverse_vertical,
            reverse_horizontal = config.reverse_horizontal,
            scroll_step = config.scroll_step,
            "starting scroll filter"
        );

        let engine = FilterEngine::new(config);
        let mut taps = TapLifecycle::new(engine);

        if let Err(e) = taps.start() {
            error!("failed to activate event taps: {e}");
            if matches!(e, scrolltap::Error::PermissionDenied) {
                warn!(
                    "enable scrolltap under System Settings > Privacy & Security > Accessibility"
                );
            }
            // Taps never activated: terminal startup failure, exit non-zero
            return Err(e.into());
        }

        // Termination signals stop the run loop exactly once; the guard
        // flag protects against repeated signals racing the teardown.
        let run_loop = RunLoopHandle::current();
        let stopping = Arc::new(AtomicBool::new(false));
        {
            let stopping = Arc::clone(&stopping);
            ctrlc::set_handler(move || {
                if !stopping.swap(true, Ordering::SeqCst) {
                    run_loop.stop();
                }
            })?;
        }

        info!("filter running; press Ctrl+C to stop");

        // Blocks for the process lifetime; returns after the signal handler
        // stops the loop
        RunLoopHandle::run();

        taps.stop();
        info!("shut down cleanly");
        Ok(())
    }

    fn run_check(prompt: bool) -> anyhow::Result<()> {
        let trusted = if prompt {
            permissions::request_trust()
        } else {
            permissions::is_trusted()
        };

        if trusted {
            println!("accessibility permission granted");
            Ok(())
        } else {
            println!("accessibility permission not granted");
            std::process::exit(1);
        }
    }
}
