use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use sign_mapping::{FileSource, MappingCache};
use sign_resolver::{CachingResolver, MatchConfig, PrefixResolver, SignSequencer};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

use signseq_server::{AppState, router};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_MAPPING: &str = "mapping.json";
const DEFAULT_ASSETS_DIR: &str = "public";
const DEFAULT_ASSET_BASE_URL: &str = "/assets/";
const DEFAULT_MAX_TEXT_CHARS: usize = 2000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config();
    info!("binding to {}:{}", config.host, config.port);
    info!("using sign mapping at {}", config.mapping_path.display());
    info!(
        "serving assets from {} as {}",
        config.assets_dir.display(),
        config.asset_base_url
    );
    info!(
        "phrase window {} tokens, partial slack {} chars",
        config.matching.max_phrase_len, config.matching.partial_max_extra_chars
    );
    if config.disable_cache {
        info!("cache headers disabled");
    }

    let mappings = Arc::new(MappingCache::new(FileSource::new(&config.mapping_path)));
    let start = Instant::now();
    let mapping = mappings.load().await;
    if mapping.is_empty() {
        warn!("sign mapping is empty; every token will be reported as missing");
    }
    info!("mapping ready in {} ms", start.elapsed().as_millis());

    let resolver = CachingResolver::new(PrefixResolver::new(config.asset_base_url.clone()));
    let sequencer = SignSequencer::new(mappings, resolver).with_config(config.matching);
    let warmed = sequencer.preload_assets().await;
    info!("pre-resolved {warmed} asset urls");

    let assets_dir = config.assets_dir.exists().then(|| config.assets_dir.clone());
    if assets_dir.is_none() {
        warn!(
            "assets directory {} not found; static asset route disabled",
            config.assets_dir.display()
        );
    }

    let state = AppState {
        sequencer: Arc::new(sequencer),
        max_text_chars: config.max_text_chars,
        disable_cache: config.disable_cache,
        assets_dir,
    };

    let app = router(state).layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Clone)]
struct Config {
    host: String,
    port: u16,
    mapping_path: PathBuf,
    assets_dir: PathBuf,
    asset_base_url: String,
    max_text_chars: usize,
    matching: MatchConfig,
    disable_cache: bool,
}

fn load_config() -> Config {
    let mut disable_cache = false;
    let mut cli_mapping: Option<PathBuf> = None;
    let mut cli_assets_dir: Option<PathBuf> = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--no-cache" => disable_cache = true,
            "--mapping" => {
                if let Some(path) = args.next() {
                    cli_mapping = Some(PathBuf::from(path));
                }
            }
            "--assets-dir" => {
                if let Some(path) = args.next() {
                    cli_assets_dir = Some(PathBuf::from(path));
                }
            }
            _ => {
                if let Some(path) = arg.strip_prefix("--mapping=") {
                    cli_mapping = Some(PathBuf::from(path));
                } else if let Some(path) = arg.strip_prefix("--assets-dir=") {
                    cli_assets_dir = Some(PathBuf::from(path));
                }
            }
        }
    }

    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let mapping_path = cli_mapping
        .or_else(|| env::var("MAPPING_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MAPPING));
    let assets_dir = cli_assets_dir
        .or_else(|| env::var("ASSETS_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR));
    let asset_base_url =
        env::var("ASSET_BASE_URL").unwrap_or_else(|_| DEFAULT_ASSET_BASE_URL.to_string());
    let max_text_chars = positive_env("MAX_TEXT_CHARS").unwrap_or(DEFAULT_MAX_TEXT_CHARS);

    let defaults = MatchConfig::default();
    let matching = MatchConfig {
        max_phrase_len: positive_env("MAX_PHRASE_LEN").unwrap_or(defaults.max_phrase_len),
        partial_max_extra_chars: env::var("PARTIAL_MAX_EXTRA_CHARS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.partial_max_extra_chars),
        ..defaults
    };

    Config {
        host,
        port,
        mapping_path,
        assets_dir,
        asset_base_url,
        max_text_chars,
        matching,
        disable_cache,
    }
}

fn positive_env(name: &str) -> Option<usize> {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
