use clap::Parser;
use tracing_subscriber::EnvFilter;
use usp_canvas::cli::{
    find_project, handle_add, handle_delete, handle_history, handle_import, handle_init,
    handle_reorder, handle_reset, handle_save, handle_show, handle_update, Cli, Commands,
};

fn init_tracing() {
    // RUST_LOG wins; otherwise the project's log_filter, otherwise warnings only.
    let fallback = find_project()
        .map(|(_, config)| config.log_filter)
        .unwrap_or_else(|_| "warn".to_string());
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    let strategy = cli.strategy;
    let result = match cli.command {
        Commands::Init => handle_init().await,
        Commands::Add {
            kind,
            content,
            rating,
            related,
            json,
        } => handle_add(strategy, kind, content, rating, related, json).await,
        Commands::Update {
            kind,
            id,
            content,
            rating,
            related,
        } => handle_update(strategy, kind, id, content, rating, related).await,
        Commands::Delete { kind, id } => handle_delete(strategy, kind, id).await,
        Commands::Reorder { kind, ids } => handle_reorder(strategy, kind, ids).await,
        Commands::Show { json } => handle_show(strategy, json).await,
        Commands::Save { is_final } => handle_save(strategy, is_final).await,
        Commands::History { json } => handle_history(strategy, json).await,
        Commands::Import { file, kind } => handle_import(strategy, file, kind).await,
        Commands::Reset { remote, force } => handle_reset(strategy, remote, force).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
