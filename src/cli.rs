use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(version, about = "Play chess against your pet", long_about = None)]
pub struct Cli {
    /// TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Name the pet answers to in status messages
    #[arg(short, long)]
    pub pet_name: Option<String>,

    /// Milliseconds the pet "thinks" before moving
    #[arg(short, long)]
    pub delay_ms: Option<u64>,

    /// Seed for the pet's random choices
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Start from this FEN instead of the standard position
    #[arg(short, long)]
    pub fen: Option<String>,

    /// Log level, e.g. "debug" (RUST_LOG overrides)
    #[arg(short, long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Command-line values win over whatever the config file says.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(name) = &self.pet_name {
            config.pet_name = name.clone();
        }
        if let Some(delay) = self.delay_ms {
            config.opponent_delay_ms = delay;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["pawsitive-chess", "--pet-name", "Mochi", "--delay-ms", "0"]);
        let mut config = Config::default();
        cli.apply_to(&mut config);
        assert_eq!(config.pet_name, "Mochi");
        assert_eq!(config.opponent_delay_ms, 0);
        assert_eq!(config.seed, None);
        assert_eq!(config.log_level, "info");
    }
}
