//! Tracing initialisation for QuestionCrafter binaries.
//!
//! Call [`init_tracing`] once at program start. Later calls are ignored
//! because the global subscriber can only be installed once per process.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose events follow the requested level; everything else,
/// including the HTTP client, stays at `warn`.
const OWN_CRATES: [&str; 3] = [
    "questioncrafter_core",
    "questioncrafter_library",
    "questioncrafter",
];

/// Filter used when `RUST_LOG` is not set.
fn default_directives(level: Level) -> String {
    let mut directives = String::from("warn");
    for krate in OWN_CRATES {
        directives.push_str(&format!(",{krate}={level}"));
    }
    directives
}

/// Initialise the global tracing subscriber.
///
/// * `json`: emit newline-delimited JSON log lines.
/// * `level`: verbosity for QuestionCrafter's own crates when `RUST_LOG` is
///   not set.
///
/// Unlike a plain fmt subscriber this writes to stderr, so the JSON results
/// the CLI prints on stdout stay machine-readable.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .ok();
    }
}
