use clap::Parser;
use std::net::{IpAddr, SocketAddr};

/// Process settings. Model settings come from the environment, see
/// `sentiment_classifiers::ModelConfig`.
#[derive(Parser, Debug)]
#[command(name = "sentiment-service")]
#[command(author, version, about = "Sentiment analysis HTTP service", long_about = None)]
pub struct Cli {
    /// Listen address
    #[arg(short = 'l', long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Listen port
    #[arg(short = 'P', long, env = "PORT", default_value = "8000")]
    pub port: u16,

    /// Maximum concurrent model inferences (defaults to the CPU count)
    #[arg(long, env = "MAX_CONCURRENT_PREDICTIONS")]
    pub max_concurrent_predictions: Option<usize>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
