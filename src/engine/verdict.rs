use std::sync::Arc;
use std::time::Duration;

use crate::catalog::ProblemCatalog;
use crate::config::JudgeConfig;

use super::compile::{CompileOutcome, compile};
use super::runner::{RunOutcome, run};
use super::workspace::WorkspaceManager;

/// Final categorical judgment of a submission. Indices are 1-based and name
/// the first failing test case; later cases are never executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    WrongAnswer(usize),
    TimeLimitExceeded(usize),
    RuntimeError { case: usize, diagnostic: String },
    CompilationError(String),
}

/// Result of a single run request: the text to show and whether it is an
/// error rather than program output.
#[derive(Debug)]
pub struct RunReport {
    pub output: String,
    pub error: bool,
}

/// Judges untrusted source against ad-hoc input (run mode) or a problem's
/// test cases (submit mode). One freshly compiled workspace per request,
/// released on every exit path; the catalog is injected once at construction
/// and never mutated.
pub struct JudgeEngine {
    workspaces: WorkspaceManager,
    catalog: Arc<ProblemCatalog>,
    compile_command: Vec<String>,
    run_timeout: Duration,
}

impl JudgeEngine {
    pub fn new(config: &JudgeConfig, catalog: Arc<ProblemCatalog>) -> anyhow::Result<Self> {
        let workspaces = WorkspaceManager::new(config.scratch_dir()?)?;
        log::info!(
            "judge engine ready, scratch directory {}",
            workspaces.scratch_root().display()
        );

        Ok(Self {
            workspaces,
            catalog,
            compile_command: config.compile_command(),
            run_timeout: config.run_timeout(),
        })
    }

    /// Compiles and runs the source once against the supplied stdin payload.
    pub async fn evaluate_run(&self, source: &str, stdin: &str) -> anyhow::Result<RunReport> {
        let ws = self.workspaces.acquire();
        ws.materialize_source(source)?;

        if let CompileOutcome::Failed(diagnostics) =
            compile(&self.compile_command, ws.source_path(), ws.artifact_path()).await?
        {
            return Ok(RunReport {
                output: diagnostics,
                error: true,
            });
        }

        let report = match run(ws.artifact_path(), stdin, self.run_timeout).await? {
            RunOutcome::TimedOut => RunReport {
                output: format!(
                    "Time limit exceeded ({} seconds)",
                    self.run_timeout.as_secs()
                ),
                error: true,
            },
            RunOutcome::Killed => RunReport {
                output: "Process was terminated by a signal".to_string(),
                error: true,
            },
            RunOutcome::Completed {
                exit_code,
                stdout,
                stderr,
            } => {
                if exit_code == 0 {
                    RunReport {
                        output: stdout,
                        error: false,
                    }
                } else {
                    RunReport {
                        output: runtime_diagnostic(exit_code, &stderr),
                        error: true,
                    }
                }
            }
        };

        Ok(report)
    }

    /// Judges the source against every test case of `problem_id`, stopping at
    /// the first failure. `None` signals an unknown problem; no workspace is
    /// allocated in that case.
    pub async fn evaluate_submission(
        &self,
        source: &str,
        problem_id: &str,
    ) -> anyhow::Result<Option<Verdict>> {
        let Some(problem) = self.catalog.get(problem_id) else {
            return Ok(None);
        };
        let time_limit = problem.time_limit();

        let ws = self.workspaces.acquire();
        ws.materialize_source(source)?;

        if let CompileOutcome::Failed(diagnostics) =
            compile(&self.compile_command, ws.source_path(), ws.artifact_path()).await?
        {
            return Ok(Some(Verdict::CompilationError(diagnostics)));
        }

        for case in problem.test_cases() {
            let verdict = match run(ws.artifact_path(), &case.input, time_limit).await? {
                RunOutcome::TimedOut => Some(Verdict::TimeLimitExceeded(case.index)),
                RunOutcome::Killed => Some(Verdict::RuntimeError {
                    case: case.index,
                    diagnostic: "Process was terminated by a signal".to_string(),
                }),
                RunOutcome::Completed {
                    exit_code,
                    stdout,
                    stderr,
                } => {
                    if exit_code != 0 {
                        Some(Verdict::RuntimeError {
                            case: case.index,
                            diagnostic: runtime_diagnostic(exit_code, &stderr),
                        })
                    } else if !outputs_match(&stdout, &case.expected) {
                        Some(Verdict::WrongAnswer(case.index))
                    } else {
                        None
                    }
                }
            };

            if let Some(verdict) = verdict {
                log::info!("submission to {problem_id} failed: {verdict:?}");
                return Ok(Some(verdict));
            }
        }

        Ok(Some(Verdict::Accepted))
    }
}

fn runtime_diagnostic(exit_code: i32, stderr: &str) -> String {
    if stderr.trim().is_empty() {
        format!("Process exited with code {exit_code}")
    } else {
        stderr.to_string()
    }
}

/// Canonicalizes program output before comparison: line endings collapse to
/// LF and leading/trailing whitespace is ignored. Everything in between is
/// compared exactly.
fn normalize_output(text: &str) -> String {
    text.replace("\r\n", "\n").trim().to_string()
}

fn outputs_match(actual: &str, expected: &str) -> bool {
    normalize_output(actual) == normalize_output(expected)
}
