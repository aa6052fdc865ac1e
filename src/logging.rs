//! Log setup with secret redaction.
//!
//! Every formatted line goes through [`RedactingWriter`] before reaching
//! stdout, so bot tokens embedded in request URLs and OAuth header values
//! never end up in the log.

// lazy_regex! statics go through once_cell
#![allow(clippy::non_std_lazy_statics)]

use lazy_regex::lazy_regex;
use std::io::{self, Write};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info,homework_status_bot=debug";

/// Bot token inside a Bot API URL: `https://api.telegram.org/bot<token>/`
static RE_BOT_URL_TOKEN: lazy_regex::Lazy<regex::Regex> =
    lazy_regex!(r"(https?://[^/]+/bot)([0-9]+:[A-Za-z0-9_-]+)");

/// Bare bot token
static RE_BOT_TOKEN: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"[0-9]{8,10}:[A-Za-z0-9_-]{35}");

/// OAuth authorization header value
static RE_OAUTH: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"(OAuth\s+)[A-Za-z0-9_.\-]+");

/// Masks every known secret pattern in `input`.
#[must_use]
pub fn redact(input: &str) -> String {
    let output = RE_BOT_URL_TOKEN.replace_all(input, "$1[TELEGRAM_TOKEN]");
    let output = RE_BOT_TOKEN.replace_all(&output, "[TELEGRAM_TOKEN]");
    RE_OAUTH.replace_all(&output, "${1}[MASKED]").into_owned()
}

/// Writer that masks secrets before forwarding to the inner writer
pub struct RedactingWriter<W: Write> {
    inner: W,
}

impl<W: Write> RedactingWriter<W> {
    /// Wrap `inner`
    pub const fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        self.inner.write_all(redact(&s).as_bytes())?;
        // The caller only needs to know its whole buffer was consumed.
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter<F> {
    make_inner: F,
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for RedactingMakeWriter<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = RedactingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new((self.make_inner)())
    }
}

/// Installs the global subscriber: timestamp, level and message per line on stdout.
pub fn init_logging() {
    let make_writer = RedactingMakeWriter {
        make_inner: io::stdout,
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(make_writer),
        )
        .init();
}
