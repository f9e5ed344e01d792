use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, ensure};
use tokio::process::Command;

/// Result of one compiler invocation.
#[derive(Debug)]
pub enum CompileOutcome {
    Succeeded,
    /// Non-zero compiler exit; carries the compiler's stderr verbatim
    Failed(String),
}

/// Invokes the external compiler and waits for it to exit.
///
/// `command` is a template whose `%INPUT%`/`%OUTPUT%` placeholders are
/// substituted with the source and artifact paths. The artifact must not be
/// used when `Failed` is returned. Compilation itself is not bounded by a
/// timeout; a single bounded-size source file is assumed to compile quickly.
pub async fn compile(
    command: &[String],
    source_path: &Path,
    artifact_path: &Path,
) -> anyhow::Result<CompileOutcome> {
    ensure!(!command.is_empty(), "empty compile command");

    let source = source_path.to_string_lossy();
    let artifact = artifact_path.to_string_lossy();
    let argv = render_command(command, &source, &artifact);

    let output = Command::new(&argv[0])
        .args(&argv[1..])
        .stdin(Stdio::null())
        .output()
        .await
        .with_context(|| format!("failed to run compiler {}", argv[0]))?;

    if output.status.success() {
        Ok(CompileOutcome::Succeeded)
    } else {
        let diagnostics = String::from_utf8_lossy(&output.stderr).into_owned();
        Ok(CompileOutcome::Failed(diagnostics))
    }
}

/// Applies template substitutions to the compile command arguments
fn render_command(template: &[String], source: &str, artifact: &str) -> Vec<String> {
    let mut mapping = HashMap::<&str, &str>::new();
    mapping.insert("%INPUT%", source);
    mapping.insert("%OUTPUT%", artifact);

    template
        .iter()
        .map(|s| {
            let mut t = s.clone();
            for (k, v) in mapping.iter() {
                t = t.replace(k, v);
            }
            t
        })
        .collect()
}
