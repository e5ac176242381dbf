use chill_judgeclient::{
    status_id, Error as JudgeError, Executor, Judge, LanguageEntry, LanguageTable, Limits,
    Sleeper, TokioSleeper,
};
use futures::stream::{self, StreamExt as _};

use super::{
    classify::{self, classify},
    error::*,
    result::*,
    testcase::TestCase,
};

/// Combines per-test results into the overall verdict.
///
/// Status precedence: accepted if every case passed, otherwise compilation
/// error, runtime error, time limit exceeded, wrong answer (first match wins).
/// Memory is the peak across cases and time is the sum. An empty list yields
/// a `pending` result with score 0.
pub fn aggregate(test_results: Vec<TestCaseResult>) -> SubmissionResult {
    let total = test_results.len() as u32;
    let passed = test_results.iter().filter(|r| r.passed).count() as u32;
    let any = |outcome: Outcome| test_results.iter().any(|r| r.outcome == outcome);

    let status = if total == 0 {
        SubmissionStatus::Pending
    } else if passed == total {
        SubmissionStatus::Accepted
    } else if any(Outcome::CompilationError) {
        SubmissionStatus::CompilationError
    } else if any(Outcome::RuntimeError) {
        SubmissionStatus::RuntimeError
    } else if any(Outcome::TimeLimitExceeded) {
        SubmissionStatus::TimeLimitExceeded
    } else {
        SubmissionStatus::WrongAnswer
    };

    let total_score = if total == 0 {
        0
    } else {
        (passed as f64 / total as f64 * 100.0).round() as u32
    };
    let execution_time = test_results.iter().map(|r| r.execution_time_ms).sum();
    let memory_used = test_results
        .iter()
        .map(|r| r.memory_used_kb)
        .max()
        .unwrap_or(0);

    SubmissionResult {
        status,
        test_results,
        total_score,
        execution_time,
        memory_used,
        passed_test_cases: passed,
        total_test_cases: total,
    }
}

/// Runs submissions against the judge and reports verdicts.
pub struct SubmissionJudge<J, S = TokioSleeper> {
    executor: Executor<J, S>,
    limits: Limits,
    concurrency: usize,
}

impl<J: Judge, S: Sleeper> SubmissionJudge<J, S> {
    pub fn new(executor: Executor<J, S>) -> Self {
        Self {
            executor,
            limits: Limits::default(),
            concurrency: 1,
        }
    }

    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Number of test cases in flight at once. Results keep input order regardless.
    pub fn concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    pub fn languages(&self) -> &LanguageTable {
        self.executor.get_languages()
    }

    pub fn supported_languages(&self) -> Vec<LanguageEntry> {
        self.languages().supported_languages()
    }

    pub fn language_id(&self, name: &str) -> Option<u32> {
        self.languages().language_id(name)
    }

    fn resolve_language(&self, language: &str) -> Result<u32> {
        self.language_id(language)
            .ok_or_else(|| Error::UnsupportedLanguage(language.to_owned()))
    }

    pub async fn run_test_cases(
        &self,
        source_code: &str,
        language: &str,
        test_cases: &[TestCase],
    ) -> Result<SubmissionResult> {
        let language_id = self.resolve_language(language)?;
        if test_cases.is_empty() {
            return Err(Error::NoTestCases);
        }
        log::info!(
            "Judging {} test case(s) in {} (id={})",
            test_cases.len(),
            language,
            language_id
        );

        let runs: Vec<_> = stream::iter(test_cases.iter().enumerate())
            .map(|(i, tc)| self.run_test_case(i, source_code, language_id, tc))
            .buffered(self.concurrency)
            .collect()
            .await;

        // Only an unreachable judge on every case aborts the run; HTTP error
        // statuses stay isolated as `System Error` results.
        let judge_unreachable = runs
            .iter()
            .all(|(_, err)| matches!(err, Some(JudgeError::JudgeUnavailable(_))));
        let (test_results, errors): (Vec<_>, Vec<_>) = runs.into_iter().unzip();
        if judge_unreachable {
            if let Some(err) = errors.into_iter().flatten().next() {
                return Err(Error::Judge(err));
            }
        }

        let result = aggregate(test_results);
        log::info!(
            "Verdict: {} ({}/{} passed, score {})",
            result.status,
            result.passed_test_cases,
            result.total_test_cases,
            result.total_score
        );
        Ok(result)
    }

    /// Judge failures are converted into a `System Error` result; the error
    /// is handed back so the caller can tell total unavailability apart.
    async fn run_test_case(
        &self,
        index: usize,
        source_code: &str,
        language_id: u32,
        tc: &TestCase,
    ) -> (TestCaseResult, Option<JudgeError>) {
        match self
            .executor
            .execute_code(source_code, &tc.input, language_id, self.limits)
            .await
        {
            Ok(res) => {
                let classified = classify(&res, &tc.input, &tc.expected_output);
                log::debug!("Test case #{}: {}", index + 1, classified.status);
                (classified, None)
            }
            Err(e) => {
                log::warn!("Test case #{}: {}: {}", index + 1, classify::SYSTEM_ERROR, e);
                (classify::system_error(&tc.input, &tc.expected_output), Some(e))
            }
        }
    }

    /// Single execution with custom stdin, as the editor's "Run" button does.
    pub async fn run_code(
        &self,
        source_code: &str,
        language: &str,
        stdin: &str,
    ) -> Result<RunOutput> {
        let language_id = self.resolve_language(language)?;
        let res = self
            .executor
            .execute_code(source_code, stdin, language_id, self.limits)
            .await?;

        let status = if status_id::is_pending(res.status.id) {
            classify::POLLING_TIMEOUT.to_owned()
        } else {
            res.status.description.clone()
        };
        Ok(RunOutput {
            status,
            status_id: res.status.id,
            stdout: res.decoded_stdout()?,
            stderr: res.decoded_stderr()?,
            compile_output: res.decoded_compile_output()?,
            execution_time_ms: res.time_ms(),
            memory_used_kb: res.memory_kb(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use async_trait::async_trait;
    use chill_judgeclient::{
        decode, encode, ExecutionRequest, ExecutionResult, Status, StatusCode, SubmissionToken,
    };
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
        time::Duration,
    };

    #[derive(Clone)]
    enum Reply {
        Judged {
            id: u32,
            stdout: &'static str,
            stderr: &'static str,
            compile_output: &'static str,
            time: &'static str,
            memory: u64,
        },
        /// Submission rejected with an HTTP error status.
        Rejected,
        /// Submission accepted, then polling answers 500.
        FetchFails,
        /// Judge cannot be reached at all.
        Unreachable,
    }

    async fn transport_error() -> chill_judgeclient::Error {
        let err = chill_judgeclient::http::Client::new(Default::default(), None, None)
            .unwrap()
            .get("not a url")
            .send()
            .await
            .unwrap_err();
        chill_judgeclient::Error::JudgeUnavailable(err)
    }

    fn api_error(status: StatusCode) -> chill_judgeclient::Error {
        chill_judgeclient::Error::JudgeApi {
            status,
            requested_url: "http://judge.test/submissions".into(),
        }
    }

    fn judged(id: u32, stdout: &'static str, memory: u64) -> Reply {
        Reply::Judged {
            id,
            stdout,
            stderr: "",
            compile_output: "",
            time: "0.010",
            memory,
        }
    }

    fn description(id: u32) -> &'static str {
        match id {
            1 => "In Queue",
            2 => "Processing",
            3 => "Accepted",
            4 => "Wrong Answer",
            5 => "Time Limit Exceeded",
            6 => "Compilation Error",
            7..=12 => "Runtime Error (NZEC)",
            _ => "Internal Error",
        }
    }

    /// Replies according to the submitted stdin.
    struct ScriptedJudge {
        replies: HashMap<&'static str, Reply>,
        tokens: Mutex<HashMap<String, Reply>>,
        submits: AtomicUsize,
        submitted_stdin: Mutex<Vec<String>>,
    }

    impl ScriptedJudge {
        fn new(replies: impl IntoIterator<Item = (&'static str, Reply)>) -> Self {
            Self {
                replies: replies.into_iter().collect(),
                tokens: Mutex::new(HashMap::new()),
                submits: AtomicUsize::new(0),
                submitted_stdin: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Judge for &ScriptedJudge {
        async fn create_submission(
            &self,
            req: &ExecutionRequest,
        ) -> chill_judgeclient::Result<SubmissionToken> {
            let n = self.submits.fetch_add(1, Ordering::SeqCst);
            let stdin = decode(&req.stdin).unwrap();
            self.submitted_stdin.lock().unwrap().push(stdin.clone());
            let reply = self.replies.get(stdin.as_str()).cloned().unwrap();
            match reply {
                Reply::Rejected => return Err(api_error(StatusCode::SERVICE_UNAVAILABLE)),
                Reply::Unreachable => return Err(transport_error().await),
                _ => {}
            }
            let token = format!("tok-{}", n);
            self.tokens.lock().unwrap().insert(token.clone(), reply);
            Ok(SubmissionToken { token })
        }

        async fn fetch_submission(
            &self,
            token: &str,
        ) -> chill_judgeclient::Result<ExecutionResult> {
            let reply = self.tokens.lock().unwrap().get(token).cloned().unwrap();
            if let Reply::FetchFails = reply {
                return Err(api_error(StatusCode::INTERNAL_SERVER_ERROR));
            }
            let Reply::Judged {
                id,
                stdout,
                stderr,
                compile_output,
                time,
                memory,
            } = reply
            else {
                unreachable!()
            };
            Ok(ExecutionResult {
                token: token.into(),
                status: Status {
                    id,
                    description: description(id).into(),
                },
                stdout: Some(encode(stdout)),
                stderr: Some(encode(stderr)),
                compile_output: Some(encode(compile_output)),
                time: Some(time.into()),
                memory: Some(memory),
            })
        }
    }

    struct NoSleep;

    #[async_trait]
    impl Sleeper for NoSleep {
        async fn sleep(&self, _dur: Duration) {}
    }

    fn service(judge: &ScriptedJudge) -> SubmissionJudge<&ScriptedJudge, NoSleep> {
        SubmissionJudge::new(Executor::new(judge).sleeper(NoSleep))
    }

    fn result_with(outcomes: &[(bool, Outcome, f64, u64)]) -> Vec<TestCaseResult> {
        outcomes
            .iter()
            .map(|&(passed, outcome, time, memory)| TestCaseResult {
                input: String::new(),
                expected_output: String::new(),
                actual_output: String::new(),
                passed,
                execution_time_ms: time,
                memory_used_kb: memory,
                status: outcome.to_string(),
                outcome,
            })
            .collect()
    }

    #[test]
    fn compilation_error_dominates_runtime_error() {
        use Outcome::*;
        let r = aggregate(result_with(&[
            (false, RuntimeError, 1.0, 10),
            (false, CompilationError, 1.0, 10),
        ]));
        assert_eq!(r.status, SubmissionStatus::CompilationError);
    }

    #[test]
    fn status_precedence_order() {
        use Outcome::*;
        let status_of = |xs: &[(bool, Outcome, f64, u64)]| aggregate(result_with(xs)).status;

        assert_eq!(
            status_of(&[(false, TimeLimitExceeded, 0.0, 0), (false, RuntimeError, 0.0, 0)]),
            SubmissionStatus::RuntimeError
        );
        assert_eq!(
            status_of(&[(false, WrongAnswer, 0.0, 0), (false, TimeLimitExceeded, 0.0, 0)]),
            SubmissionStatus::TimeLimitExceeded
        );
        assert_eq!(
            status_of(&[(true, Accepted, 0.0, 0), (false, WrongAnswer, 0.0, 0)]),
            SubmissionStatus::WrongAnswer
        );
        assert_eq!(
            status_of(&[(false, SystemError, 0.0, 0), (false, Unknown, 0.0, 0)]),
            SubmissionStatus::WrongAnswer
        );
        assert_eq!(
            status_of(&[(true, Accepted, 0.0, 0), (true, Accepted, 0.0, 0)]),
            SubmissionStatus::Accepted
        );
    }

    #[test]
    fn memory_is_peak_and_time_is_sum() {
        use Outcome::*;
        let r = aggregate(result_with(&[
            (true, Accepted, 12.0, 1000),
            (true, Accepted, 30.0, 4000),
        ]));
        assert_eq!(r.memory_used, 4000);
        assert_eq!(r.execution_time, 42.0);
    }

    #[test]
    fn score_is_rounded_percentage() {
        use Outcome::*;
        for total in 1..=9u32 {
            for passed in 0..=total {
                let xs: Vec<_> = (0..total)
                    .map(|i| {
                        if i < passed {
                            (true, Accepted, 0.0, 0)
                        } else {
                            (false, WrongAnswer, 0.0, 0)
                        }
                    })
                    .collect();
                let r = aggregate(result_with(&xs));
                let want = (100.0 * passed as f64 / total as f64).round() as u32;
                assert_eq!(r.total_score, want);
                assert!(r.total_score <= 100);
                assert_eq!(r.passed_test_cases, passed);
                assert_eq!(r.total_test_cases, total);
                assert_eq!(r.is_accepted(), passed == total);
            }
        }
    }

    #[test]
    fn empty_results_are_pending() {
        let r = aggregate(vec![]);
        assert_eq!(r.status, SubmissionStatus::Pending);
        assert_eq!(r.total_score, 0);
        assert_eq!(r.memory_used, 0);
    }

    #[tokio::test]
    async fn all_accepted_scores_100() {
        let judge = ScriptedJudge::new([
            ("1", judged(3, "1\n", 900)),
            ("2", judged(3, "4\n", 1200)),
            ("3", judged(3, "9", 800)),
        ]);
        let cases = [
            TestCase::new("1", "1"),
            TestCase::new("2", "4"),
            TestCase::new("3", "9\n"),
        ];

        let r = service(&judge)
            .run_test_cases("n=int(input());print(n*n)", "python", &cases)
            .await
            .unwrap();

        assert_eq!(r.status, SubmissionStatus::Accepted);
        assert_eq!(r.total_score, 100);
        assert_eq!((r.passed_test_cases, r.total_test_cases), (3, 3));
        assert_eq!(r.memory_used, 1200);
        assert_eq!(r.execution_time, 30.0);
        assert!(r.test_results.iter().all(|t| t.status == "Accepted"));
    }

    #[tokio::test]
    async fn unsupported_language_is_rejected_before_any_call() {
        let judge = ScriptedJudge::new([]);
        let err = service(&judge)
            .run_test_cases("DISPLAY 'HI'.", "cobol", &[TestCase::new("", "HI")])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UnsupportedLanguage(lang) if lang == "cobol"));
        assert_eq!(judge.submits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_test_case_list_is_rejected() {
        let judge = ScriptedJudge::new([]);
        let err = service(&judge)
            .run_test_cases("print(1)", "python", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoTestCases));
        assert_eq!(judge.submits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn judge_failure_on_one_case_is_isolated() {
        let judge = ScriptedJudge::new([
            ("a", judged(3, "A", 100)),
            ("b", Reply::Rejected),
            ("c", judged(3, "C", 100)),
        ]);
        let cases = [
            TestCase::new("a", "A"),
            TestCase::new("b", "B"),
            TestCase::new("c", "C"),
        ];

        let r = service(&judge)
            .run_test_cases("print(input().upper())", "python", &cases)
            .await
            .unwrap();

        assert_eq!(judge.submits.load(Ordering::SeqCst), 3);
        assert_eq!(r.status, SubmissionStatus::WrongAnswer);
        assert_eq!(r.passed_test_cases, 2);
        assert_eq!(r.total_score, 67);
        assert_eq!(r.test_results[1].status, "System Error");
        assert_eq!(r.test_results[1].outcome, Outcome::SystemError);
        assert!(!r.test_results[1].passed);
    }

    #[tokio::test]
    async fn unreachable_judge_on_every_case_propagates() {
        let judge = ScriptedJudge::new([("x", Reply::Unreachable), ("y", Reply::Unreachable)]);
        let err = service(&judge)
            .run_test_cases(
                "print(1)",
                "python",
                &[TestCase::new("x", "1"), TestCase::new("y", "1")],
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Judge(chill_judgeclient::Error::JudgeUnavailable(_))
        ));
        assert_eq!(judge.submits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn poll_error_on_single_case_is_system_error() {
        let judge = ScriptedJudge::new([("1", Reply::FetchFails)]);
        let r = service(&judge)
            .run_test_cases("print(1)", "python", &[TestCase::new("1", "1")])
            .await
            .unwrap();

        assert_eq!(r.total_test_cases, 1);
        assert_eq!(r.passed_test_cases, 0);
        assert_eq!(r.total_score, 0);
        assert_eq!(r.status, SubmissionStatus::WrongAnswer);
        assert_eq!(r.test_results[0].status, "System Error");
        assert_eq!(r.test_results[0].outcome, Outcome::SystemError);
    }

    #[tokio::test]
    async fn api_errors_on_every_case_still_aggregate() {
        let judge = ScriptedJudge::new([
            ("x", Reply::Rejected),
            ("y", Reply::FetchFails),
            ("z", Reply::Unreachable),
        ]);
        let cases = [
            TestCase::new("x", "1"),
            TestCase::new("y", "1"),
            TestCase::new("z", "1"),
        ];

        let r = service(&judge)
            .run_test_cases("print(1)", "python", &cases)
            .await
            .unwrap();

        assert_eq!(r.total_score, 0);
        assert!(r
            .test_results
            .iter()
            .all(|t| t.outcome == Outcome::SystemError && t.status == "System Error"));
    }

    #[tokio::test]
    async fn mixed_outcomes_keep_input_order_with_concurrency() {
        let judge = ScriptedJudge::new([
            ("1", judged(3, "1", 10)),
            (
                "2",
                Reply::Judged {
                    id: 6,
                    stdout: "",
                    stderr: "",
                    compile_output: "error: expected ';'",
                    time: "0",
                    memory: 0,
                },
            ),
            (
                "3",
                Reply::Judged {
                    id: 11,
                    stdout: "",
                    stderr: "panicked",
                    compile_output: "",
                    time: "0.002",
                    memory: 20,
                },
            ),
            ("4", judged(5, "", 30)),
        ]);
        let cases: Vec<_> = ["1", "2", "3", "4"]
            .into_iter()
            .map(|s| TestCase::new(s, s))
            .collect();

        let r = service(&judge)
            .concurrency(4)
            .run_test_cases("int main(){}", "cpp", &cases)
            .await
            .unwrap();

        let inputs: Vec<_> = r.test_results.iter().map(|t| t.input.as_str()).collect();
        assert_eq!(inputs, ["1", "2", "3", "4"]);
        assert_eq!(r.status, SubmissionStatus::CompilationError);
        assert_eq!(r.test_results[1].actual_output, "error: expected ';'");
        assert_eq!(r.test_results[2].actual_output, "panicked");
        assert_eq!(r.test_results[3].outcome, Outcome::TimeLimitExceeded);
        assert_eq!(r.memory_used, 30);
        assert_eq!(r.total_score, 25);
    }

    #[tokio::test]
    async fn sequential_run_submits_in_input_order() {
        let judge = ScriptedJudge::new([
            ("z", judged(4, "no", 1)),
            ("y", judged(4, "no", 1)),
            ("x", judged(4, "no", 1)),
        ]);
        let cases = [
            TestCase::new("z", "yes"),
            TestCase::new("y", "yes"),
            TestCase::new("x", "yes"),
        ];

        let r = service(&judge)
            .run_test_cases("", "go", &cases)
            .await
            .unwrap();

        assert_eq!(*judge.submitted_stdin.lock().unwrap(), ["z", "y", "x"]);
        assert_eq!(r.status, SubmissionStatus::WrongAnswer);
        assert_eq!(r.total_score, 0);
    }

    #[tokio::test]
    async fn run_code_decodes_outputs() {
        let judge = ScriptedJudge::new([(
            "world",
            Reply::Judged {
                id: 3,
                stdout: "hello world\n",
                stderr: "warn\n",
                compile_output: "",
                time: "0.5",
                memory: 512,
            },
        )]);

        let out = service(&judge)
            .run_code("console.log('hello ' + input)", "JavaScript", "world")
            .await
            .unwrap();

        assert_eq!(out.status, "Accepted");
        assert_eq!(out.status_id, 3);
        assert_eq!(out.stdout, "hello world\n");
        assert_eq!(out.stderr, "warn\n");
        assert_eq!(out.compile_output, "");
        assert_eq!(out.execution_time_ms, 500.0);
        assert_eq!(out.memory_used_kb, 512);
    }

    #[tokio::test]
    async fn run_code_propagates_judge_errors() {
        let judge = ScriptedJudge::new([("x", Reply::Rejected)]);
        let err = service(&judge)
            .run_code("print(1)", "python", "x")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Judge(_)));
    }

    #[test]
    fn language_queries_delegate_to_table() {
        let judge = ScriptedJudge::new([]);
        let s = service(&judge);
        assert_eq!(s.language_id("rust"), Some(73));
        assert_eq!(s.language_id("cobol"), None);
        assert_eq!(s.supported_languages().len(), 9);
    }
}
