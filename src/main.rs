use clap::{Parser, Subcommand};
use resize_cache::config::{self, AppConfig};
use resize_cache::imaging::supported_extensions;
use resize_cache::server::{self, AppState};
use resize_cache::service::{Resizer, ServiceConfig};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked; a few bytes for the life of the process
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "resize-cache")]
#[command(about = "HTTP image resizing service with an on-disk cache")]
#[command(long_about = "\
HTTP image resizing service with an on-disk cache

Serves resized variants of the images in a source directory. Each variant is
generated on first request and stored in a cache directory; later requests
for the same file and size are served from disk.

Endpoints:

  GET  /image/{filename}?width=W&height=H   resized image (1..=4000 px)
  GET  /images                               JSON list of stored images
  POST /upload                               multipart field 'image' (JPEG, ≤ 5MB)

Cache entries are named {base}_{W}x{H}.{ext}, e.g. cat_300x200.jpg.
They are never invalidated; delete the cache directory to regenerate.

Logging is controlled by RUST_LOG (default: resize_cache=info).

Run 'resize-cache gen-config' to generate a documented resize-cache.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (missing file = stock defaults)
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Flags that override the config file for a single run.
#[derive(clap::Args, Clone, Default)]
struct ServeArgs {
    /// Address to listen on, e.g. 0.0.0.0:8080
    #[arg(long)]
    bind: Option<String>,

    /// Directory of original images
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Directory for generated variants
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

impl ServeArgs {
    fn apply(self, config: &mut AppConfig) {
        if let Some(bind) = self.bind {
            config.server.bind = bind;
        }
        if let Some(dir) = self.source_dir {
            config.storage.source_dir = dir;
        }
        if let Some(dir) = self.cache_dir {
            config.storage.cache_dir = dir;
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve(ServeArgs),
    /// Load and validate the config, then print the resolved settings
    Check(ServeArgs),
    /// Print a stock resize-cache.toml with all options documented
    GenConfig,
}

fn resolve(path: &std::path::Path, args: ServeArgs) -> Result<AppConfig, config::ConfigError> {
    let mut config = config::load_config(path)?;
    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => {
            init_tracing();
            let config = resolve(&cli.config, args)?;
            serve(config).await?;
        }
        Command::Check(args) => {
            let config = resolve(&cli.config, args)?;
            println!("==> Config is valid ({})", cli.config.display());
            print!("{}", toml::to_string_pretty(&config)?);
            println!(
                "# effective max_concurrent = {}",
                config::effective_concurrency(&config.processing)
            );
            println!(
                "# resizable extensions: {}",
                supported_extensions().collect::<Vec<_>>().join(", ")
            );
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over the default filter.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("resize_cache=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn serve(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.bind_addr()?;
    let service_config = ServiceConfig::from_app_config(&config);
    let resizer = Resizer::with_rust_backend(service_config.clone());
    resizer.bootstrap().await?;

    let app = server::router(AppState::new(resizer.clone()));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        version = version_string(),
        addr = %listener.local_addr()?,
        source_dir = %resizer.sources().root().display(),
        cache_dir = %resizer.cache().root().display(),
        max_concurrent = service_config.max_concurrent,
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(cache = %resizer.cache().stats(), "stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "cannot listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
