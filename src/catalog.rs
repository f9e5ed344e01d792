use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;

/// Problem metadata as stored in `problem.json` inside a problem directory.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProblemMeta {
    pub title: String,
    pub difficulty: String,
    pub description: String,
    /// Per-case wall-clock limit in seconds; absent means the catalog default
    pub time_limit: Option<f64>,
}

/// One (input, expected output) pair of a problem, evaluated in index order.
#[derive(Debug, Clone)]
pub struct TestCase {
    /// 1-based position within the problem's ordered case sequence
    pub index: usize,
    pub input: String,
    pub expected: String,
}

#[derive(Debug, Clone)]
pub struct Problem {
    pub id: String,
    pub meta: ProblemMeta,
    time_limit: Duration,
    cases: Vec<TestCase>,
}

impl Problem {
    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    pub fn test_cases(&self) -> &[TestCase] {
        &self.cases
    }
}

/// Read-only problem catalog, loaded once at startup and shared behind an
/// `Arc` afterwards. Layout on disk:
///
/// ```text
/// <problems_dir>/<problem-id>/problem.json
/// <problems_dir>/<problem-id>/tests/<n>.in
/// <problems_dir>/<problem-id>/tests/<n>.out
/// ```
///
/// Test cases are ordered by the number embedded in their file names, so
/// `2.in` comes before `10.in`.
#[derive(Debug, Clone)]
pub struct ProblemCatalog {
    problems: Vec<Problem>,
}

impl ProblemCatalog {
    pub fn load(problems_dir: &Path, default_time_limit: Duration) -> anyhow::Result<Self> {
        let mut problems = Vec::new();

        let entries = fs::read_dir(problems_dir).with_context(|| {
            format!("failed to read problems directory {}", problems_dir.display())
        })?;

        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }

            let id = entry.file_name().to_string_lossy().into_owned();
            let problem = load_problem(&entry.path(), id, default_time_limit)?;
            log::debug!(
                "loaded problem {} with {} test cases",
                problem.id,
                problem.cases.len()
            );
            problems.push(problem);
        }

        // Stable listing order regardless of directory iteration order
        problems.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(Self { problems })
    }

    pub fn get(&self, id: &str) -> Option<&Problem> {
        self.problems.iter().find(|p| p.id == id)
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}

fn load_problem(dir: &Path, id: String, default_time_limit: Duration) -> anyhow::Result<Problem> {
    let meta_path = dir.join("problem.json");
    let file = fs::File::open(&meta_path)
        .with_context(|| format!("failed to open {}", meta_path.display()))?;
    let meta: ProblemMeta = serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("failed to parse {}", meta_path.display()))?;

    let time_limit = meta
        .time_limit
        .map(Duration::from_secs_f64)
        .unwrap_or(default_time_limit);

    let cases = load_test_cases(&dir.join("tests"))
        .with_context(|| format!("failed to load test cases of problem {id}"))?;

    Ok(Problem {
        id,
        meta,
        time_limit,
        cases,
    })
}

fn load_test_cases(tests_dir: &Path) -> anyhow::Result<Vec<TestCase>> {
    let mut numbers: Vec<u32> = Vec::new();

    for entry in fs::read_dir(tests_dir)
        .with_context(|| format!("failed to read {}", tests_dir.display()))?
    {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("in") {
            continue;
        }
        let stem = path.file_stem().unwrap_or_default().to_string_lossy();
        match stem.parse::<u32>() {
            Ok(n) => numbers.push(n),
            Err(_) => bail!("input file {} has no numeric name", path.display()),
        }
    }

    numbers.sort_unstable();

    let mut cases = Vec::with_capacity(numbers.len());
    for (position, n) in numbers.iter().enumerate() {
        let input_path = tests_dir.join(format!("{n}.in"));
        let answer_path = tests_dir.join(format!("{n}.out"));

        let input = fs::read_to_string(&input_path)
            .with_context(|| format!("failed to read {}", input_path.display()))?;
        let expected = fs::read_to_string(&answer_path).with_context(|| {
            format!(
                "input {} has no readable answer file {}",
                input_path.display(),
                answer_path.display()
            )
        })?;

        cases.push(TestCase {
            index: position + 1,
            input,
            expected,
        });
    }

    Ok(cases)
}
