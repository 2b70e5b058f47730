//! Configuration management for the scan server

use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crate::raster::DEFAULT_DPI;

/// Lowest accepted rendering density
pub const MIN_DPI: u32 = 36;
/// Highest accepted rendering density
pub const MAX_DPI: u32 = 600;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Request body limit in megabytes
    pub max_upload_mb: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    pub dpi: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                max_upload_mb: 50,
            },
            scan: ScanConfig { dpi: DEFAULT_DPI },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparseable values keep defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let dpi: u32 = parse_or(&lookup, "SCAN_DPI", defaults.scan.dpi);
        let clamped = dpi.clamp(MIN_DPI, MAX_DPI);
        if clamped != dpi {
            tracing::warn!("SCAN_DPI={} outside {}..={}, using {}", dpi, MIN_DPI, MAX_DPI, clamped);
        }

        Config {
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_or(&lookup, "SERVER_PORT", defaults.server.port),
                max_upload_mb: parse_or(&lookup, "MAX_UPLOAD_MB", defaults.server.max_upload_mb),
            },
            scan: ScanConfig { dpi: clamped },
        }
    }

    /// Body limit in bytes
    pub fn max_upload_bytes(&self) -> usize {
        self.server.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {}={:?}, using default {}", key, raw, default);
            default
        }),
        None => default,
    }
}
