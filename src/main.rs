use harpoonium::books::Outcome;
use harpoonium::config::{Cli, Command, Config, default_config_path};
use harpoonium::context::AppContext;
use harpoonium::unpack_error;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // a .env in the working directory may carry HARPOONIUM_* overrides
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = args
        .config_path
        .map(std::path::PathBuf::from)
        .unwrap_or_else(default_config_path);

    let cfg = Config::new(&config_path.to_string_lossy()).unwrap_or_else(|e| {
        tracing::error!(error = %e, path = ?config_path, "failed to load config file");
        std::process::exit(1);
    });
    let ctx = AppContext::from_config(&cfg).unwrap_or_else(|e| {
        tracing::error!(error = %unpack_error(&e), "failed to setup book service client");
        std::process::exit(1);
    });

    tokio::select! {
        result = run(&ctx, args.command) => {
            if let Err(err) = result {
                tracing::error!(error = %err, "command failed");
                std::process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            tracing::info!("ctrl+c signal received, aborting");
            std::process::exit(130);
        }
    }
}

async fn run(ctx: &AppContext, command: Command) -> anyhow::Result<()> {
    let shelf = &ctx.books;
    let session_user = |user: Option<String>| user.or_else(|| ctx.user_id().map(str::to_string));

    let outcomes = match command {
        Command::Catalog => vec![shelf.fetch_all_books().await],
        Command::Subscribed { user } => {
            vec![shelf.fetch_subscribed_books(session_user(user).as_deref()).await]
        }
        Command::Tweets { user } => {
            vec![shelf.fetch_subscribed_tweets(session_user(user).as_deref()).await]
        }
        Command::Subscribe { book_id, user } => {
            ctx.subscribe_by_id(book_id, session_user(user).as_deref()).await
        }
        Command::Unsubscribe { book_id, user } => {
            ctx.unsubscribe_by_id(book_id, session_user(user).as_deref()).await
        }
        Command::Load { user } => {
            let load = shelf.load_session(session_user(user).as_deref()).await;
            vec![load.catalog, load.subscribed, load.tweets]
        }
    };

    println!("{}", serde_json::to_string_pretty(&shelf.snapshot())?);

    if outcomes.iter().all(Outcome::is_skipped) {
        tracing::warn!("no user id given, nothing to do");
    }
    if let Some(err) = outcomes.iter().find_map(Outcome::error) {
        anyhow::bail!("book service request failed: {}", unpack_error(err));
    }
    Ok(())
}
