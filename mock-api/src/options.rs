//! Mock server options

use std::time::Duration;

use clap::Parser;

use crate::driver::Schedule;

#[derive(Debug, Clone, Parser)]
#[command(name = "backend-im-mock-api")]
#[command(about = "Mock Backend.im API for local development")]
#[command(version)]
pub struct MockOptions {
    /// Address to listen on
    #[arg(long, env = "MOCK_API_ADDR", default_value = "0.0.0.0:8080")]
    pub addr: String,

    /// Seconds each stage lasts when polled
    #[arg(long, default_value_t = 3)]
    pub step_secs: u64,

    /// Seconds between streamed frames
    #[arg(long, default_value_t = 2)]
    pub cadence_secs: u64,

    /// Simulated code generation latency, in seconds
    #[arg(long, default_value_t = 2)]
    pub generate_delay_secs: u64,

    /// Log filter directive
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl MockOptions {
    pub fn schedule(&self) -> Schedule {
        Schedule {
            step: Duration::from_secs(self.step_secs),
            cadence: Duration::from_secs(self.cadence_secs),
            generate_delay: Duration::from_secs(self.generate_delay_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = MockOptions::try_parse_from(["backend-im-mock-api"]).unwrap();
        assert_eq!(options.schedule(), Schedule::default());
        assert!(!options.log_json);
    }
}
