pub mod error {
    #[allow(unused_imports)]
    pub(crate) use anyhow::{anyhow, bail, ensure, Context as _};
    pub use anyhow::{Error, Result};
}
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chill_judgeclient::{Executor, Judge, Judge0Client, Sleeper};
use chrono::{DateTime, Local};
use colored::{Color, Colorize};
use crossterm::terminal;
use error::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{Config, Credentials};
use crate::judging::{
    FsTestcase, Outcome, RunOutput, SubmissionJudge, SubmissionResult, TestCase, TestCaseResult,
};
use crate::style;

pub fn init_config(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = dir.as_ref().join(Config::FILENAME);
    fsutil::create_new_with_mkdir(&path, Config::example_toml())
        .with_context(|| format!("Failed to create {}", Config::FILENAME))?;
    Ok(path)
}

/// Wires a Judge0 client into a `SubmissionJudge` according to `cfg`.
pub fn build_judge(cfg: &Config, cred: &Credentials) -> Result<SubmissionJudge<Judge0Client>> {
    let client =
        Judge0Client::new(cfg.judge0_config(cred)).context("Failed to set up judge client")?;
    let executor = Executor::new(client)
        .languages(cfg.language_table())
        .poll_policy(cfg.poll_policy());
    Ok(SubmissionJudge::new(executor)
        .limits(cfg.limits())
        .concurrency(cfg.submit.concurrency))
}

/// `--lang` wins; otherwise the first `[[lang]]` glob matching the file name.
pub fn determine_language(
    cfg: &Config,
    program_file: impl AsRef<Path>,
    lang: Option<&str>,
) -> Result<String> {
    if let Some(lang) = lang {
        return Ok(lang.to_owned());
    }
    let filename = program_file
        .as_ref()
        .file_name()
        .with_context(|| format!("Not a file: {:?}", program_file.as_ref()))?
        .to_string_lossy();
    cfg.find_lang_for_filename(&filename)
        .map(str::to_owned)
        .with_context(|| {
            format!(
                "Unconfigured language for filename '{}' (No entry matched glob in `[[lang]]`; use --lang)",
                filename
            )
        })
}

pub fn load_testcases(testcase_dir: impl AsRef<Path>) -> Result<Vec<(String, TestCase)>> {
    let testcase_dir = testcase_dir.as_ref();
    let found = FsTestcase::enumerate(testcase_dir).context("Failed to find testcase")?;
    if found.is_empty() {
        bail!(
            "No testcases found in {} (expected NAME.in / NAME.out pairs)",
            testcase_dir.to_string_lossy()
        );
    }
    found
        .into_iter()
        .map(|t| {
            let tc = t.load().context("Failed to load testcase")?;
            Ok((t.name().to_owned(), tc))
        })
        .collect()
}

fn spinner(msg: String) -> ProgressBar {
    let style = ProgressStyle::default_spinner()
        .template("{spinner} {msg} [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let bar = ProgressBar::new_spinner().with_style(style).with_message(msg);
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Judges `program_file` without printing anything.
pub async fn judge_testcases<J: Judge, S: Sleeper>(
    judge: &SubmissionJudge<J, S>,
    program_file: impl AsRef<Path>,
    language: &str,
    testcases: &[(String, TestCase)],
) -> Result<SubmissionResult> {
    let program_file = program_file.as_ref();
    let source_code = fsutil::read_to_string(program_file)?;
    let cases: Vec<TestCase> = testcases.iter().map(|(_, tc)| tc.clone()).collect();

    judge
        .run_test_cases(&source_code, language, &cases)
        .await
        .with_context(|| format!("Failed to judge {:?} (lang='{}')", program_file, language))
}

/// Same as [`judge_testcases`], with a spinner and the per-testcase report.
pub async fn do_test<J: Judge, S: Sleeper>(
    judge: &SubmissionJudge<J, S>,
    program_file: impl AsRef<Path>,
    language: &str,
    testcases: &[(String, TestCase)],
) -> Result<SubmissionResult> {
    let program_file = program_file.as_ref();

    let bar = spinner(format!(
        "Judging {} ({}) on {} testcase(s) ...",
        program_file.to_string_lossy(),
        language,
        testcases.len()
    ));
    let res = judge_testcases(judge, program_file, language, testcases).await;
    bar.finish_and_clear();
    let result = res?;

    for ((name, _), r) in testcases.iter().zip(&result.test_results) {
        println!(
            "{}",
            format!(
                "Testcase {} ... {}{} [{}ms, {}KB]",
                name,
                style::judge_icon(r.outcome),
                " ".repeat(3usize.saturating_sub(r.outcome.to_string().len())),
                r.execution_time_ms.round(),
                r.memory_used_kb,
            )
            .cyan()
        );
    }
    print!("\n");

    testcases
        .iter()
        .zip(&result.test_results)
        .filter(|(_, r)| !r.passed)
        .for_each(|((name, _), r)| print_test_result_detail(name, r));

    print_test_result_summary(&result);
    Ok(result)
}

pub async fn do_run<J: Judge, S: Sleeper>(
    judge: &SubmissionJudge<J, S>,
    program_file: impl AsRef<Path>,
    language: &str,
    stdin: &str,
) -> Result<RunOutput> {
    let program_file = program_file.as_ref();
    let source_code = fsutil::read_to_string(program_file)?;

    let bar = spinner(format!(
        "Running {} ({}) ...",
        program_file.to_string_lossy(),
        language
    ));
    let res = judge.run_code(&source_code, language, stdin).await;
    bar.finish_and_clear();

    res.with_context(|| format!("Failed to run {:?} (lang='{}')", program_file, language))
}

pub fn print_run_output(out: &RunOutput) {
    let (cols, _) = terminal::size().unwrap_or((40, 40));
    let cols = cols as usize;

    println!(
        "{} [{}ms, {}KB]",
        out.status.bright_yellow().bold(),
        out.execution_time_ms.round(),
        out.memory_used_kb
    );
    if !out.compile_output.is_empty() {
        print_sub_title("[compile-output]", cols);
        print!("{}", out.compile_output);
    }
    print_sub_title("[stdout]", cols);
    print_lines(&out.stdout.lines().collect::<Vec<_>>(), &out.stdout);
    if !out.stderr.is_empty() {
        print_sub_title("[stderr]", cols);
        print!("{}", out.stderr);
    }
}

/// Writes `result` as `<dir>/<stem>-<timestamp>.json` and returns the path.
pub fn save_result(
    result: &SubmissionResult,
    dir: impl AsRef<Path>,
    program_file: impl AsRef<Path>,
    now: DateTime<Local>,
) -> Result<PathBuf> {
    let stem = program_file
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "submission".to_owned());
    let path = dir
        .as_ref()
        .join(format!("{}-{}.json", stem, now.format("%Y%m%d-%H%M%S")));
    fsutil::write_json_pretty_with_mkdir(&path, result).context("Failed to save result")?;
    Ok(path)
}

fn print_test_result_summary(result: &SubmissionResult) {
    let bar = "-".repeat(5);
    print!("{} ", bar);

    let count: BTreeMap<String, (Outcome, usize)> =
        result
            .test_results
            .iter()
            .fold(BTreeMap::new(), |mut count, r| {
                count.entry(r.outcome.to_string()).or_insert((r.outcome, 0)).1 += 1;
                count
            });

    let num_total_test = result.total_test_cases;
    let num_passed = result.passed_test_cases;
    let num_failed = num_total_test - num_passed;

    if result.is_accepted() {
        let msg = format!("All {} tests passed ✨", num_total_test);
        print!("{}", msg.green());
    } else {
        let summary_msg = if num_passed > 0 {
            format!("{}/{} tests failed 💣", num_failed, num_total_test)
        } else {
            format!("All {} tests failed 💀", num_total_test)
        };

        let detail_msg = count
            .values()
            .filter(|(outcome, _)| *outcome != Outcome::Accepted)
            .map(|&(outcome, cnt)| {
                format!(
                    "{}{}{}",
                    style::judge_icon(outcome),
                    "x".dimmed(),
                    cnt.to_string().bold().bright_white(),
                )
            })
            .collect::<Vec<String>>()
            .join(", ");

        print!("{} ({})", summary_msg.bright_red(), detail_msg);
    }

    println!(
        " {} {} score={} time={}ms memory={}KB",
        bar,
        style::status_badge(result.status),
        result.total_score.to_string().bold(),
        result.execution_time.round(),
        result.memory_used,
    );
}

const BOLD_LINE: &str = "━";
const THIN_LINE: &str = "─";

fn print_sub_title(s: &str, cols: usize) {
    println!(
        "{}{}",
        s.cyan().bold(),
        THIN_LINE
            .repeat(cols.saturating_sub(s.len() + 1))
            .bright_black(),
    )
}

fn print_lines(lines: &[&str], entire_str: &str) {
    if lines.is_empty() {
        println!("{}", "<EMPTY>".magenta().dimmed());
        return;
    }
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim_end();
        print!("{}", trimmed);

        let num_trailing_whitespace = line.len() - trimmed.len();
        if num_trailing_whitespace > 0 {
            print!(
                "{}{}",
                " ".repeat(num_trailing_whitespace).on_red(),
                "(Trailing whitespace)".bright_red().bold()
            );
        }

        let is_last_line = i + 1 == lines.len();
        if is_last_line && !entire_str.ends_with('\n') {
            print!("{}", " Missing new line ".on_yellow().black().bold());
        }

        println!();
    }
}

pub fn print_test_result_detail(name: &str, res: &TestCaseResult) {
    let (cols, _) = terminal::size().unwrap_or((40, 40));
    let cols = cols as usize;

    let bold_bar = BOLD_LINE.repeat(cols).blue().bold();

    println!(
        "\n{}: {} {} [{}ms]\n{}",
        name.color(Color::BrightYellow).bold(),
        style::judge_icon(res.outcome),
        res.status,
        res.execution_time_ms.round(),
        bold_bar,
    );

    print_sub_title("[expected]", cols);
    print_lines(
        &res.expected_output.lines().collect::<Vec<_>>(),
        &res.expected_output,
    );

    let output_title = match res.outcome {
        Outcome::CompilationError => "[compile-output]",
        Outcome::RuntimeError => "[stderr]",
        _ => "[stdout]",
    };
    print_sub_title(output_title, cols);
    print_lines(
        &res.actual_output.lines().collect::<Vec<_>>(),
        &res.actual_output,
    );

    println!("{}", bold_bar);
}
