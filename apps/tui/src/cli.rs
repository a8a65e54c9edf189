use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "ip_tracker", version, about = "IP Address Tracker")]
pub struct CliArgs {
    /// Address to look up first instead of the remembered one
    #[arg(value_name = "IP")]
    pub address: Option<String>,

    /// Look up once, print the result and exit
    #[arg(long)]
    pub headless: bool,

    /// Print the headless result as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Override database path
    #[arg(long, value_name = "PATH")]
    pub db: Option<String>,

    /// Override the geolocation API key
    #[arg(long = "api-key", value_name = "KEY")]
    pub api_key: Option<String>,

    /// Forget the remembered address before starting
    #[arg(long)]
    pub forget: bool,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(db) = &self.db {
            std::env::set_var("DATABASE_NAME", db);
        }
        if let Some(key) = &self.api_key {
            std::env::set_var("GEO_API_KEY", key);
        }
    }
}
