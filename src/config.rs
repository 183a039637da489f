//! Startup configuration: command-line flags backed by environment variables.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use clap::Parser;

use crate::component_a::processor::OverrunPolicy;
use crate::error::{Error, Result};

#[derive(Parser, Debug, Clone)]
#[command(name = "soft_rts", about = "Soft real-time event pipeline", version)]
pub struct Config {
    #[arg(long, env = "SERVER_PORT", default_value_t = 8080, help = "HTTP port")]
    pub port: u16,

    #[arg(
        long,
        env = "SERVER_HOST",
        default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        help = "HTTP bind address"
    )]
    pub bind_host: IpAddr,

    #[arg(long, env = "EVENT_INTERVAL_MS", default_value_t = 50, help = "Event generation interval (ms)")]
    pub interval_ms: u64,

    #[arg(long, env = "EVENT_DEADLINE_MS", default_value_t = 100, help = "Per-event deadline budget (ms)")]
    pub deadline_ms: u64,

    #[arg(
        long,
        env = "EVENT_BUFFER_SIZE",
        default_value_t = 100,
        help = "Capacity of the generator and delivery queues"
    )]
    pub buffer_size: usize,

    #[arg(long, env = "PROCESSOR_WORK_MS", default_value_t = 50, help = "Simulated work duration (ms)")]
    pub work_ms: u64,

    #[arg(
        long,
        env = "PROCESSOR_OVERRUN_POLICY",
        value_enum,
        default_value_t = OverrunPolicy::Abort,
        help = "Fate of work that misses its deadline"
    )]
    pub overrun_policy: OverrunPolicy,

    #[arg(
        long,
        env = "SHUTDOWN_GRACE_MS",
        default_value_t = 5_000,
        help = "Grace period for the HTTP server to close (ms)"
    )]
    pub shutdown_grace_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            interval_ms: 50,
            deadline_ms: 100,
            buffer_size: 100,
            work_ms: 50,
            overrun_policy: OverrunPolicy::Abort,
            shutdown_grace_ms: 5_000,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(Error::InvalidConfig("event interval must be non-zero".into()));
        }
        if self.buffer_size == 0 {
            return Err(Error::InvalidConfig("buffer size must be non-zero".into()));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_host, self.port)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    pub fn work_duration(&self) -> Duration {
        Duration::from_millis(self.work_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_parser_defaults() {
        let parsed = Config::try_parse_from(["soft_rts"]).unwrap();
        let d = Config::default();
        assert_eq!(parsed.port, d.port);
        assert_eq!(parsed.interval(), Duration::from_millis(50));
        assert_eq!(parsed.deadline(), Duration::from_millis(100));
        assert_eq!(parsed.buffer_size, 100);
        assert_eq!(parsed.work_duration(), Duration::from_millis(50));
        assert_eq!(parsed.overrun_policy, OverrunPolicy::Abort);
        assert_eq!(parsed.shutdown_grace(), Duration::from_secs(5));
    }

    #[test]
    fn flags_override_defaults() {
        let cfg = Config::try_parse_from([
            "soft_rts",
            "--port",
            "9090",
            "--work-ms",
            "120",
            "--overrun-policy",
            "detach",
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr().port(), 9090);
        assert_eq!(cfg.work_duration(), Duration::from_millis(120));
        assert_eq!(cfg.overrun_policy, OverrunPolicy::Detach);
    }

    #[test]
    fn zero_buffer_is_rejected() {
        let cfg = Config {
            buffer_size: 0,
            ..Config::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let cfg = Config {
            interval_ms: 0,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }
}
