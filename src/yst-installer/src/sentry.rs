use sentry::types::Dsn;
use sentry::ClientOptions;
use std::str::FromStr;
use tracing::warn;

pub struct Sentry;

impl Sentry {
    /// Initializes Sentry when a DSN is configured.
    /// Returns a guard to keep Sentry active for the program's lifetime.
    pub fn setup(dsn: Option<&str>) -> Option<sentry::ClientInitGuard> {
        if cfg!(test) {
            return None;
        }

        let dsn = dsn.map(str::trim).filter(|dsn| !dsn.is_empty())?;
        let dsn = match Dsn::from_str(dsn) {
            Ok(dsn) => dsn,
            Err(err) => {
                warn!(error = %err, "ignoring invalid Sentry DSN");
                return None;
            }
        };

        let guard = sentry::init(ClientOptions {
            dsn: Some(dsn),
            release: sentry::release_name!(),
            ..Default::default()
        });

        Self::add_tag("type", "installer");
        Some(guard)
    }

    /// Adds a tag (key-value pair) to the Sentry event for short, string-based metadata.
    pub fn add_tag(key: &str, value: &str) {
        if cfg!(test) {
            return;
        }
        sentry::configure_scope(|scope| {
            scope.set_tag(key, value);
        });
    }

    /// Captures a message event in Sentry with the specified level.
    pub fn capture_message(message: &str, level: sentry::Level) {
        if cfg!(test) {
            return;
        }
        sentry::capture_message(message, level);
    }
}
