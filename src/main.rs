use std::sync::Arc;

use clap::Parser;

use cses_ide::catalog::ProblemCatalog;
use cses_ide::config::{CliArgs, Config};
use cses_ide::engine::JudgeEngine;
use cses_ide::web_server::build_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = CliArgs::parse();
    let Config {
        server: server_config,
        judge: judge_config,
    } = cli.to_config().expect("Failed to load configuration");

    let problems_dir = judge_config.problems_dir();
    let catalog = ProblemCatalog::load(&problems_dir, judge_config.default_time_limit())
        .expect("Failed to load problem catalog");
    log::info!(
        "loaded {} problems from {}",
        catalog.len(),
        problems_dir.display()
    );

    let catalog = Arc::new(catalog);
    let engine = Arc::new(
        JudgeEngine::new(&judge_config, catalog.clone()).expect("Failed to build judge engine"),
    );

    // ======= PREPARATION END, EXECUTION START =======

    let server = build_server(server_config, catalog, engine).expect("Failed to build server");

    let server_handle = server.handle();
    let server_task = actix_web::rt::spawn(server);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            log::info!("Ctrl-c received, shutting down...");
        }
        res_server = server_task => {
            log::error!("Server terminated unexpectedly: {:?}", res_server);
        }
    }

    server_handle.stop(true).await;
    log::info!("Shutdown complete");
    Ok(())
}
