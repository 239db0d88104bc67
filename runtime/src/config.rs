//! Process-wide configuration, resolved once at startup.
//!
//! Values come from the environment first; CLI flags then override
//! individual fields. The resulting [`ServiceConfig`] is immutable and
//! shared behind an `Arc` for the lifetime of the process.

use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default budget for the classification and static fetches.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default budget for a dynamic render, enforced by the caller.
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("cannot locate the current executable: {0}")]
    CurrentExe(#[from] std::io::Error),
}

/// Which rendering collaborator backs the dynamic path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RendererBackend {
    /// Isolated subprocess per render.
    Process,
    /// Shared in-process headless Chromium.
    Chromium,
}

impl FromStr for RendererBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "process" => Ok(Self::Process),
            "chromium" => Ok(Self::Chromium),
            other => Err(format!("expected 'process' or 'chromium', got '{other}'")),
        }
    }
}

/// Program and leading arguments for the subprocess renderer.
///
/// The target URL is appended as the final argument at spawn time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl RendererCommand {
    /// Parse a whitespace-separated command line such as
    /// `node puppeteer_scraper.js`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let program = PathBuf::from(parts.next()?);
        Some(Self {
            program,
            args: parts.map(str::to_string).collect(),
        })
    }

    /// The built-in renderer: this executable's `render` subcommand.
    pub fn builtin() -> Result<Self, ConfigError> {
        Ok(Self {
            program: std::env::current_exe()?,
            args: vec!["render".to_string()],
        })
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: IpAddr,
    pub port: u16,
    pub fetch_timeout: Duration,
    pub render_timeout: Duration,
    pub renderer: RendererBackend,
    pub renderer_command: RendererCommand,
    /// Explicit Chromium binary; auto-detected when `None`.
    pub chromium_path: Option<PathBuf>,
}

impl ServiceConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = parse_var(&lookup, "HOST")?.unwrap_or(IpAddr::from([0, 0, 0, 0]));
        let port = parse_var(&lookup, "PORT")?.unwrap_or(DEFAULT_PORT);
        let fetch_timeout = parse_var::<u64, _>(&lookup, "SCRAPER_FETCH_TIMEOUT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT);
        let render_timeout = parse_var::<u64, _>(&lookup, "SCRAPER_RENDER_TIMEOUT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_RENDER_TIMEOUT);
        let renderer = parse_var(&lookup, "SCRAPER_RENDERER")?.unwrap_or(RendererBackend::Process);

        let renderer_command = match lookup("SCRAPER_RENDERER_CMD") {
            Some(line) => RendererCommand::parse(&line).ok_or_else(|| ConfigError::Invalid {
                var: "SCRAPER_RENDERER_CMD",
                value: line.clone(),
                reason: "empty command".to_string(),
            })?,
            None => RendererCommand::builtin()?,
        };

        let chromium_path = lookup("SCRAPER_CHROMIUM_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            host,
            port,
            fetch_timeout,
            render_timeout,
            renderer,
            renderer_command,
            chromium_path,
        })
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                var,
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = ServiceConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.host, IpAddr::from([0, 0, 0, 0]));
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(10));
        assert_eq!(cfg.render_timeout, Duration::from_secs(20));
        assert_eq!(cfg.renderer, RendererBackend::Process);
        assert_eq!(cfg.renderer_command.args, vec!["render".to_string()]);
        assert!(cfg.chromium_path.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let cfg = ServiceConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("SCRAPER_RENDER_TIMEOUT_MS", "1500"),
            ("SCRAPER_RENDERER", "Chromium"),
            ("SCRAPER_RENDERER_CMD", "node  puppeteer_scraper.js"),
        ]))
        .unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.host, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(cfg.render_timeout, Duration::from_millis(1500));
        assert_eq!(cfg.renderer, RendererBackend::Chromium);
        assert_eq!(cfg.renderer_command.program, PathBuf::from("node"));
        assert_eq!(cfg.renderer_command.args, vec!["puppeteer_scraper.js"]);
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let err = ServiceConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_blank_renderer_command_rejected() {
        let err =
            ServiceConfig::from_lookup(lookup_from(&[("SCRAPER_RENDERER_CMD", "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "SCRAPER_RENDERER_CMD", .. }));
    }
}
