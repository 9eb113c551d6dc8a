use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use volley::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Volley game server")]
struct Args {
    /// Address to bind to
    #[arg(short = 'H', long, env = "VOLLEY_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "VOLLEY_PORT", default_value_t = 8080)]
    port: u16,

    /// HTTP path upgraded to a WebSocket
    #[arg(long, env = "VOLLEY_PATH", default_value = "/game")]
    path: String,

    /// Simulation ticks per second
    #[arg(short, long, env = "VOLLEY_TICK_RATE", default_value_t = TickConfig::DEFAULT_TICK_RATE_HZ)]
    tick_rate: u32,

    /// Points needed to win a game
    #[arg(long, env = "VOLLEY_MAX_SCORE", default_value_t = GameRules::default().max_score)]
    max_score: u32,

    /// Close connections idle for this many seconds (0 disables)
    #[arg(long, env = "VOLLEY_IDLE_TIMEOUT", default_value_t = 0)]
    idle_timeout: u64,

    /// Emit JSON log lines
    #[arg(long, env = "VOLLEY_LOG_JSON")]
    log_json: bool,
}

/// Installs the global subscriber. `RUST_LOG` overrides `default_filter`.
fn init_tracing(default_filter: &str, log_json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    if log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), VolleyError> {
    let args = Args::parse();
    init_tracing("volley=info,volley_game=info,volley_transport=info", args.log_json);

    let config = ServerConfig {
        bind_addr: format!("{}:{}", args.host, args.port),
        path: args.path,
        tick: TickConfig::with_rate(args.tick_rate),
        rules: GameRules {
            max_score: args.max_score,
            ..GameRules::default()
        },
        idle_timeout: (args.idle_timeout > 0).then(|| Duration::from_secs(args.idle_timeout)),
        ..ServerConfig::default()
    };

    let server = VolleyServer::builder().config(config).build().await?;
    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await
}
