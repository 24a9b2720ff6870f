use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vegscope_earthengine::Client;
use vegscope_geocode::Nominatim;
use vegscope_ndvi::Analyzer;
use vegscope_server::{router, start_session_sweeper, AppState, Imagery, ServerConfig, SessionStore};

#[derive(Parser)]
#[command(name = "vegscope")]
#[command(about = "Sentinel-2 NDVI vegetation analysis in the browser", long_about = None)]
struct Args {
    /// Address to listen on (overrides VEGSCOPE_BIND)
    #[arg(short, long)]
    bind: Option<String>,

    /// Secrets file with an [earthengine] table (overrides VEGSCOPE_SECRETS)
    #[arg(long)]
    secrets: Option<PathBuf>,

    /// Service-account JSON key (overrides VEGSCOPE_KEY_FILE)
    #[arg(long)]
    key_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = ServerConfig::from_env()?;
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    if let Some(secrets) = args.secrets {
        config.secrets_path = secrets;
    }
    if let Some(key_file) = args.key_file {
        config.key_file = key_file;
    }

    let imagery = match init_earth_engine(&config).await {
        Ok(client) => {
            tracing::info!(
                "Earth Engine ready (project {}, account {})",
                client.project(),
                client.service_account()
            );
            Imagery::Ready(Analyzer::new(Arc::new(client)))
        }
        Err(e) => {
            tracing::error!("Error initialising Earth Engine: {:#}", e);
            Imagery::Unavailable(format!("{e:#}"))
        }
    };

    let geocoder = Nominatim::new(&config.user_agent).context("building geocoder client")?;
    let sessions = Arc::new(SessionStore::new(config.session_ttl));
    let state = Arc::new(AppState::new(imagery, Arc::new(geocoder), sessions.clone()));

    tokio::spawn(start_session_sweeper(sessions));

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("binding {}", config.bind_address))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

async fn init_earth_engine(config: &ServerConfig) -> Result<Client> {
    let key = config.credential_source().load()?;
    let client = Client::new(key, config.ee_project.clone(), &config.user_agent)?;
    client
        .authenticate()
        .await
        .context("exchanging service-account assertion")?;
    Ok(client)
}
