//! Diagnostics for the `cellfeed` binary.
//!
//! Replayed events own stdout, so all logging goes to stderr. The filter is
//! taken from the first of these that parses:
//!
//! 1. `CELLFEED_LOG`
//! 2. `RUST_LOG`
//! 3. `-v` / `-q`
//!
//! Colour is used when stderr is a terminal and `NO_COLOR` is unset.

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const ENV_VAR: &str = "CELLFEED_LOG";

/// How chatty the binary is when no filter comes from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    /// `-v` wins over `-q`.
    pub const fn from_flags(verbose: bool, quiet: bool) -> Self {
        if verbose {
            Self::Verbose
        } else if quiet {
            Self::Quiet
        } else {
            Self::Normal
        }
    }

    /// Filter directives used when the environment sets none. Verbose mode
    /// opens up the cellfeed crates only; dependencies stay at `warn`.
    pub const fn directives(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "warn,cellfeed=debug,cellfeed_cli=debug",
        }
    }
}

pub fn init(verbosity: Verbosity) {
    let color = std::env::var_os("NO_COLOR").is_none()
        && std::io::IsTerminal::is_terminal(&std::io::stderr());

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .without_time()
        .compact();

    let filter = select_filter(
        std::env::var(ENV_VAR).ok().as_deref(),
        std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(),
        verbosity,
    );

    tracing_subscriber::registry().with(filter).with(layer).init();
}

/// Pick the filter from the two environment values and the CLI flags.
/// A value that does not parse is skipped.
fn select_filter(own: Option<&str>, rust_log: Option<&str>, verbosity: Verbosity) -> EnvFilter {
    [own, rust_log]
        .into_iter()
        .flatten()
        .find_map(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(verbosity.directives()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_wins_over_quiet() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn test_filter_precedence() {
        let filter = select_filter(Some("cellfeed=trace"), Some("info"), Verbosity::Quiet);
        assert_eq!(filter.to_string(), "cellfeed=trace");

        let filter = select_filter(None, Some("info"), Verbosity::Quiet);
        assert_eq!(filter.to_string(), "info");

        let filter = select_filter(None, None, Verbosity::Quiet);
        assert_eq!(filter.to_string(), "error");
    }

    #[test]
    fn test_unparseable_directives_are_skipped() {
        let filter = select_filter(Some("cellfeed=loud"), None, Verbosity::Normal);
        assert_eq!(filter.to_string(), "warn");
    }
}
