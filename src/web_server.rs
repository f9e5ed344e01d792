use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, dev::Server, middleware, web};

use crate::catalog::ProblemCatalog;
use crate::config::ServerConfig;
use crate::engine::JudgeEngine;
use crate::routes::{
    get_problem_handler, json_error_handler, list_problems_handler, run_handler, submit_handler,
};

pub fn build_server(
    config: ServerConfig,
    catalog: Arc<ProblemCatalog>,
    engine: Arc<JudgeEngine>,
) -> std::io::Result<Server> {
    let catalog = web::Data::from(catalog);
    let engine = web::Data::from(engine);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(catalog.clone())
            .app_data(engine.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .wrap(middleware::Logger::default())
            // The browser UI is served from another origin
            .wrap(Cors::permissive())
            .service(list_problems_handler)
            .service(get_problem_handler)
            .service(run_handler)
            .service(submit_handler)
    })
    .bind((
        config.bind_address.unwrap_or("127.0.0.1".to_string()),
        config.bind_port.unwrap_or(3001),
    ))?
    .run();

    Ok(server)
}
