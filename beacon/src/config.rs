use std::net::SocketAddr;
use std::str::FromStr;
use std::time;

use envconfig::Envconfig;

#[derive(Envconfig, Clone)]
pub struct Config {
    #[envconfig(default = "false")]
    pub print_sink: bool,

    #[envconfig(default = "127.0.0.1:3000")]
    pub address: SocketAddr,

    #[envconfig(default = "http://www.google-analytics.com/collect")]
    pub collector_endpoint: String,

    // Bounds the outbound POST so a slow collector can never pile up
    // detached delivery tasks indefinitely.
    #[envconfig(default = "5000")]
    pub delivery_timeout: EnvMsDuration,

    #[envconfig(default = "https://github.com/andelf/ga-beacon")]
    pub redirect_url: String,

    #[envconfig(default = "true")]
    pub export_prometheus: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct EnvMsDuration(pub time::Duration);

#[derive(Debug, PartialEq, Eq)]
pub struct ParseEnvMsDurationError;

impl FromStr for EnvMsDuration {
    type Err = ParseEnvMsDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ms = s.parse::<u64>().map_err(|_| ParseEnvMsDurationError)?;

        Ok(EnvMsDuration(time::Duration::from_millis(ms)))
    }
}
