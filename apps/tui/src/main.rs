use clap::Parser;
use color_eyre::Result;
use ip_tracker::cli::CliArgs;
use ip_tracker::config::init_app_config;
use ip_tracker::geo::GeoClient;
use ip_tracker::logging::{init_logger, LogTarget};
use ip_tracker::{event, terminal, App};
use log::{info, warn};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();

    let settings = init_app_config()?;

    // Headless output shares the terminal with logs; the UI owns it otherwise.
    let headless = args.headless || !is_terminal();
    let log_target = if headless {
        LogTarget::Stderr
    } else {
        LogTarget::File(settings.log_file.clone())
    };
    init_logger(args.debug, &log_target)?;

    if settings.tracker.api_key.is_empty() {
        warn!("GEO_API_KEY is not set, lookups will be rejected by the provider");
    }

    let client = GeoClient::new(settings.tracker.clone(), settings.lookup_timeout)?;
    let mut app = App::new(&settings, Arc::new(client));

    if let Err(e) = app.initialize_db().await {
        warn!("Error initializing database: {e}");
        warn!("Will continue without remembering queries");
    }

    if args.forget {
        app.actions.forget_last_query().await?;
        info!("Forgot the remembered address");
    }

    if headless {
        return event::run_headless(&mut app, args.address, args.json).await;
    }

    let mut terminal = terminal::setup_terminal()?;

    let result = event::run(&mut terminal, &mut app, args.address).await;

    terminal::cleanup_terminal_state(true, true);

    result
}

// Check if we're running in a terminal
fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
