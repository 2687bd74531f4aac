use std::ffi::OsStr;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use copilot_api::{build_router, AppState};
use copilot_core::defaults;

const DEFAULT_FILTER: &str = "copilot_api=debug,copilot_inference=info,tower_http=debug";
const DEFAULT_LOG_FILE: &str = "copilot-api.log";

/// Log output settings.
///
/// - `LOG_FORMAT`: "json" or "text" (default "text")
/// - `LOG_FILE`: daily-rotated log file; stdout when unset
/// - `LOG_ANSI`: force ANSI colors on or off
/// - `RUST_LOG`: env filter
struct LogSettings {
    json: bool,
    file: Option<PathBuf>,
    ansi: Option<bool>,
}

impl LogSettings {
    fn from_env() -> Self {
        Self {
            json: std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")),
            file: std::env::var_os("LOG_FILE").map(PathBuf::from),
            ansi: std::env::var("LOG_ANSI")
                .ok()
                .map(|v| v == "true" || v == "1"),
        }
    }
}

/// Directory and file-name prefix for the rolling appender.
fn log_file_parts(path: &Path) -> (&Path, &OsStr) {
    let dir = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let name = path.file_name().unwrap_or(OsStr::new(DEFAULT_LOG_FILE));
    (dir, name)
}

/// Install the global subscriber. Keep the returned guard alive so buffered
/// file output is flushed on shutdown.
fn init_tracing(settings: &LogSettings) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (writer, guard) = match settings.file {
        Some(ref path) => {
            let (dir, name) = log_file_parts(path);
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, name));
            (BoxMakeWriter::new(writer), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    // Colors only make sense on a terminal
    let ansi = settings.ansi.unwrap_or(settings.file.is_none());
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi);

    let registry = tracing_subscriber::registry().with(filter);
    if settings.json {
        registry.with(layer.json()).init();
    } else {
        registry.with(layer).init();
    }

    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_settings = LogSettings::from_env();
    let _log_guard = init_tracing(&log_settings);
    info!(
        json = log_settings.json,
        log_file = ?log_settings.file,
        "Logging initialized"
    );

    // Fails fast when NOTION_TOKEN is missing
    let state = AppState::from_env()?;
    info!(
        models = state.pipeline.gateway().registry().models().len(),
        default_model = defaults::MODEL_SELECTOR,
        "Inference gateway ready"
    );

    let host = std::env::var("HOST").unwrap_or_else(|_| defaults::SERVER_HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(defaults::SERVER_PORT);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Startup copilot listening");
    axum::serve(listener, build_router(state)).await?;

    Ok(())
}
