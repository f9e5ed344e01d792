use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;

use super::ErrorResponseWithMessage;
use crate::catalog::{Problem, ProblemCatalog};

/// Listing entry: deliberately omits the (potentially large) description
#[derive(Serialize)]
pub struct ProblemSummary {
    pub id: String,
    pub title: String,
    pub difficulty: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetail {
    pub id: String,
    pub title: String,
    pub difficulty: String,
    pub description: String,
    /// Effective per-case limit in seconds
    pub time_limit: f64,
}

impl From<&Problem> for ProblemSummary {
    fn from(problem: &Problem) -> Self {
        Self {
            id: problem.id.clone(),
            title: problem.meta.title.clone(),
            difficulty: problem.meta.difficulty.clone(),
        }
    }
}

impl From<&Problem> for ProblemDetail {
    fn from(problem: &Problem) -> Self {
        Self {
            id: problem.id.clone(),
            title: problem.meta.title.clone(),
            difficulty: problem.meta.difficulty.clone(),
            description: problem.meta.description.clone(),
            time_limit: problem.time_limit().as_secs_f64(),
        }
    }
}

#[get("/api/problems")]
pub async fn list_problems_handler(catalog: web::Data<ProblemCatalog>) -> impl Responder {
    let summaries: Vec<ProblemSummary> =
        catalog.problems().iter().map(ProblemSummary::from).collect();
    HttpResponse::Ok().json(summaries)
}

#[get("/api/problems/{problem_id}")]
pub async fn get_problem_handler(
    catalog: web::Data<ProblemCatalog>,
    path: web::Path<String>,
) -> impl Responder {
    let problem_id = path.into_inner();

    match catalog.get(&problem_id) {
        Some(problem) => HttpResponse::Ok().json(ProblemDetail::from(problem)),
        None => HttpResponse::NotFound().json(ErrorResponseWithMessage {
            reason: "ERR_NOT_FOUND",
            code: 3,
            message: format!("Problem {problem_id} not found."),
        }),
    }
}
