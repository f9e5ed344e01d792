use actix_web::{HttpResponse, Responder, post, web};
use serde::{Deserialize, Serialize};

use super::{ErrorResponse, ErrorResponseWithMessage};
use crate::engine::{JudgeEngine, Verdict};

#[derive(Deserialize, Debug)]
pub struct RunRequest {
    pub code: String,
    #[serde(default)]
    pub input: String,
}

#[derive(Serialize, Debug)]
pub struct RunResponse {
    pub output: String,
    pub error: bool,
}

#[derive(Deserialize, Debug)]
pub struct SubmitRequest {
    pub code: String,
}

#[derive(Serialize, Debug)]
pub struct SubmitResponse {
    pub verdict: &'static str,
    #[serde(rename = "testCase", skip_serializing_if = "Option::is_none")]
    pub test_case: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl From<Verdict> for SubmitResponse {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Accepted => Self {
                verdict: "Accepted",
                test_case: None,
                diagnostic: None,
            },
            Verdict::WrongAnswer(case) => Self {
                verdict: "Wrong Answer",
                test_case: Some(case),
                diagnostic: None,
            },
            Verdict::TimeLimitExceeded(case) => Self {
                verdict: "Time Limit Exceeded",
                test_case: Some(case),
                diagnostic: None,
            },
            Verdict::RuntimeError { case, diagnostic } => Self {
                verdict: "Runtime Error",
                test_case: Some(case),
                diagnostic: Some(diagnostic),
            },
            Verdict::CompilationError(diagnostic) => Self {
                verdict: "Compilation Error",
                test_case: None,
                diagnostic: Some(diagnostic),
            },
        }
    }
}

#[post("/api/run")]
pub async fn run_handler(
    engine: web::Data<JudgeEngine>,
    body: web::Json<RunRequest>,
) -> impl Responder {
    if body.code.trim().is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            reason: "ERR_INVALID_ARGUMENT",
            code: 1,
        });
    }

    match engine.evaluate_run(&body.code, &body.input).await {
        Ok(report) => HttpResponse::Ok().json(RunResponse {
            output: report.output,
            error: report.error,
        }),
        Err(e) => {
            log::error!("run request failed: {e:#}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_INTERNAL",
                code: 6,
            })
        }
    }
}

#[post("/api/submit/{problem_id}")]
pub async fn submit_handler(
    engine: web::Data<JudgeEngine>,
    path: web::Path<String>,
    body: web::Json<SubmitRequest>,
) -> impl Responder {
    let problem_id = path.into_inner();

    if body.code.trim().is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            reason: "ERR_INVALID_ARGUMENT",
            code: 1,
        });
    }

    match engine.evaluate_submission(&body.code, &problem_id).await {
        Ok(Some(verdict)) => HttpResponse::Ok().json(SubmitResponse::from(verdict)),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponseWithMessage {
            reason: "ERR_NOT_FOUND",
            code: 3,
            message: format!("Problem {problem_id} not found."),
        }),
        Err(e) => {
            log::error!("submission to {problem_id} failed: {e:#}");
            HttpResponse::InternalServerError().json(ErrorResponse {
                reason: "ERR_INTERNAL",
                code: 6,
            })
        }
    }
}
