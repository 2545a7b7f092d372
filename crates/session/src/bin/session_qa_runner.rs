use std::env;
use std::time::Duration;

use snafu::{OptionExt, ResultExt, Snafu};

use sdm_session::{
    ChatMessage, DEFAULT_REPLY_LATENCY, ManagerConfig, MessageId, MessageRole, ReplyPlan,
    SessionError, SessionId, SessionManager, SettingsStore, classify, init_tracing,
};

const CHART_PROMPT: &str = "Give SDM PIE chart and bar graph for last annual maintenance";
const REPLY_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
struct RunnerArgs {
    scenario: Scenario,
    latency: Duration,
}

#[derive(Debug, Clone, Copy)]
enum Scenario {
    IdRoundtrip,
    IdInvalid,
    ImplicitSession,
    TitleFreeze,
    ChartReply,
    CannedReplies,
    PendingGate,
    InterleavedTarget,
    TeardownCancel,
    UnknownSelect,
    EndToEnd,
    All,
}

impl Scenario {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "id_roundtrip" => Some(Self::IdRoundtrip),
            "id_invalid" => Some(Self::IdInvalid),
            "implicit_session" => Some(Self::ImplicitSession),
            "title_freeze" => Some(Self::TitleFreeze),
            "chart_reply" => Some(Self::ChartReply),
            "canned_replies" => Some(Self::CannedReplies),
            "pending_gate" => Some(Self::PendingGate),
            "interleaved_target" => Some(Self::InterleavedTarget),
            "teardown_cancel" => Some(Self::TeardownCancel),
            "unknown_select" => Some(Self::UnknownSelect),
            "end_to_end" => Some(Self::EndToEnd),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::IdRoundtrip => "id_roundtrip",
            Self::IdInvalid => "id_invalid",
            Self::ImplicitSession => "implicit_session",
            Self::TitleFreeze => "title_freeze",
            Self::ChartReply => "chart_reply",
            Self::CannedReplies => "canned_replies",
            Self::PendingGate => "pending_gate",
            Self::InterleavedTarget => "interleaved_target",
            Self::TeardownCancel => "teardown_cancel",
            Self::UnknownSelect => "unknown_select",
            Self::EndToEnd => "end_to_end",
            Self::All => "all",
        }
    }
}

#[derive(Debug, Snafu)]
enum RunnerError {
    #[snafu(display("missing required --scenario argument"))]
    MissingScenario { stage: &'static str },
    #[snafu(display("missing value for argument '{arg}'"))]
    MissingArgumentValue {
        stage: &'static str,
        arg: &'static str,
    },
    #[snafu(display("unknown scenario '{raw}'"))]
    UnknownScenario { stage: &'static str, raw: String },
    #[snafu(display("unknown argument '{raw}'"))]
    UnknownArgument { stage: &'static str, raw: String },
    #[snafu(display("invalid latency '{raw}': {source}"))]
    InvalidLatency {
        stage: &'static str,
        raw: String,
        source: std::num::ParseIntError,
    },
    #[snafu(display("session operation failed: {source}"))]
    SessionOperation {
        stage: &'static str,
        source: SessionError,
    },
    #[snafu(display("reply did not arrive within {waited_ms} ms"))]
    ReplyTimeout { stage: &'static str, waited_ms: u128 },
    #[snafu(display("scenario '{scenario}' failed: {reason}"))]
    ScenarioFailed {
        stage: &'static str,
        scenario: &'static str,
        reason: String,
    },
}

type RunnerResult<T> = Result<T, RunnerError>;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing(&SettingsStore::load().settings().log_filter);

    if let Err(error) = run().await {
        println!("runner_ok=false");
        eprintln!("runner_error={error}");
        std::process::exit(1);
    }
}

async fn run() -> RunnerResult<()> {
    let args = parse_args(env::args().skip(1))?;
    println!("scenario={}", args.scenario.name());
    println!("latency_ms={}", args.latency.as_millis());
    let config = ManagerConfig::default().with_reply_latency(args.latency);

    match args.scenario {
        Scenario::IdRoundtrip => run_id_roundtrip(),
        Scenario::IdInvalid => run_id_invalid(),
        Scenario::ImplicitSession => run_implicit_session(config).await,
        Scenario::TitleFreeze => run_title_freeze(config).await,
        Scenario::ChartReply => run_chart_reply(config).await,
        Scenario::CannedReplies => run_canned_replies(),
        Scenario::PendingGate => run_pending_gate(config).await,
        Scenario::InterleavedTarget => run_interleaved_target(config).await,
        Scenario::TeardownCancel => run_teardown_cancel(config).await,
        Scenario::UnknownSelect => run_unknown_select(config).await,
        Scenario::EndToEnd => run_end_to_end(config).await,
        Scenario::All => run_all(config).await,
    }
}

fn parse_args(args: impl IntoIterator<Item = String>) -> RunnerResult<RunnerArgs> {
    let mut scenario = None;
    let mut latency = DEFAULT_REPLY_LATENCY;
    let mut pending = args.into_iter();

    while let Some(argument) = pending.next() {
        match argument.as_str() {
            "--scenario" => {
                let value = pending.next().context(MissingArgumentValueSnafu {
                    stage: "parse-args-scenario-value",
                    arg: "--scenario",
                })?;

                let parsed = Scenario::parse(&value).context(UnknownScenarioSnafu {
                    stage: "parse-args-scenario",
                    raw: value,
                })?;
                scenario = Some(parsed);
            }
            "--latency-ms" => {
                let value = pending.next().context(MissingArgumentValueSnafu {
                    stage: "parse-args-latency-value",
                    arg: "--latency-ms",
                })?;
                let millis = value.parse::<u64>().context(InvalidLatencySnafu {
                    stage: "parse-args-latency",
                    raw: value.clone(),
                })?;
                latency = Duration::from_millis(millis);
            }
            _ => {
                return UnknownArgumentSnafu {
                    stage: "parse-args",
                    raw: argument,
                }
                .fail();
            }
        }
    }

    Ok(RunnerArgs {
        scenario: scenario.context(MissingScenarioSnafu {
            stage: "parse-args-scenario-required",
        })?,
        latency,
    })
}

fn manager(config: ManagerConfig, stage: &'static str) -> RunnerResult<SessionManager> {
    SessionManager::for_current_runtime(config).context(SessionOperationSnafu { stage })
}

/// Waits on the published snapshots until no reply is pending.
async fn wait_for_reply(manager: &SessionManager, stage: &'static str) -> RunnerResult<()> {
    let budget = manager.config().reply_latency + REPLY_GRACE;
    let mut updates = manager.subscribe();
    let settled = tokio::time::timeout(budget, updates.wait_for(|store| !store.is_pending()));

    match settled.await {
        Ok(Ok(_)) => Ok(()),
        _ => ReplyTimeoutSnafu {
            stage,
            waited_ms: budget.as_millis(),
        }
        .fail(),
    }
}

fn check(
    condition: bool,
    stage: &'static str,
    scenario: &'static str,
    reason: &str,
) -> RunnerResult<()> {
    if condition {
        return Ok(());
    }
    ScenarioFailedSnafu {
        stage,
        scenario,
        reason: reason.to_string(),
    }
    .fail()
}

fn describe(message: &ChatMessage) -> String {
    let role = match message.role {
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    };
    format!(
        "{role}:charts={}:chars={}",
        message.has_charts,
        message.content.chars().count()
    )
}

fn run_id_roundtrip() -> RunnerResult<()> {
    let session_id = SessionId::new_v7();
    let message_id = MessageId::new_v7();
    let session_ok = session_id.to_string().parse::<SessionId>().ok() == Some(session_id);
    let message_ok = message_id.to_string().parse::<MessageId>().ok() == Some(message_id);

    println!("session_id_roundtrip={session_ok}");
    println!("message_id_roundtrip={message_ok}");
    check(
        session_ok && message_ok,
        "scenario-id-roundtrip",
        "id_roundtrip",
        "an id did not survive display and parse",
    )?;
    println!("runner_ok=true");
    Ok(())
}

fn run_id_invalid() -> RunnerResult<()> {
    let invalid_input = "not-a-valid-uuid";
    let invalid_id_error = matches!(
        SessionId::parse(invalid_input),
        Err(SessionError::InvalidId { .. })
    ) && matches!(
        MessageId::parse(invalid_input),
        Err(SessionError::InvalidId { .. })
    );

    println!("invalid_id_error={invalid_id_error}");
    check(
        invalid_id_error,
        "scenario-id-invalid",
        "id_invalid",
        "an id wrapper accepted malformed UUID input",
    )?;
    println!("runner_ok=true");
    Ok(())
}

async fn run_implicit_session(config: ManagerConfig) -> RunnerResult<()> {
    let mut manager = manager(config, "scenario-implicit-session-manager")?;
    let receipt = manager
        .send_message("hello there")
        .context(SessionOperationSnafu {
            stage: "scenario-implicit-session-send",
        })?;

    let store = manager.snapshot();
    println!("created_session={}", receipt.created_session);
    println!("session_count={}", store.sessions().len());
    println!("active_matches={}", store.active_session_id() == Some(receipt.session_id));
    check(
        receipt.created_session
            && store.sessions().len() == 1
            && store.active_session_id() == Some(receipt.session_id),
        "scenario-implicit-session-verify",
        "implicit_session",
        "send without an active session must create and activate exactly one",
    )?;

    wait_for_reply(&manager, "scenario-implicit-session-wait").await?;
    println!("runner_ok=true");
    Ok(())
}

async fn run_title_freeze(config: ManagerConfig) -> RunnerResult<()> {
    let mut manager = manager(config, "scenario-title-freeze-manager")?;
    let first_prompt = "x".repeat(80);
    manager
        .send_message(&first_prompt)
        .context(SessionOperationSnafu {
            stage: "scenario-title-freeze-first-send",
        })?;
    wait_for_reply(&manager, "scenario-title-freeze-first-wait").await?;
    manager
        .send_message("a different prompt")
        .context(SessionOperationSnafu {
            stage: "scenario-title-freeze-second-send",
        })?;

    let title = manager.read(|store| {
        store
            .active_session()
            .map(|session| session.title.clone())
            .unwrap_or_default()
    });
    println!("title_chars={}", title.chars().count());
    check(
        title == "x".repeat(50),
        "scenario-title-freeze-verify",
        "title_freeze",
        "title must be the first 50 characters of the first prompt",
    )?;

    wait_for_reply(&manager, "scenario-title-freeze-second-wait").await?;
    println!("runner_ok=true");
    Ok(())
}

async fn run_chart_reply(config: ManagerConfig) -> RunnerResult<()> {
    let mut manager = manager(config, "scenario-chart-reply-manager")?;
    manager
        .send_message(CHART_PROMPT)
        .context(SessionOperationSnafu {
            stage: "scenario-chart-reply-send",
        })?;
    wait_for_reply(&manager, "scenario-chart-reply-wait").await?;

    let reply = manager.read(|store| {
        store
            .active_session()
            .and_then(|session| session.last_message().cloned())
    });
    let chart_reply = reply.as_ref().is_some_and(|message| {
        message.role == MessageRole::Assistant && message.has_charts && message.content.is_empty()
    });
    if let Some(message) = reply.as_ref() {
        println!("reply={}", describe(message));
    }
    println!("chart_reply={chart_reply}");
    check(
        chart_reply,
        "scenario-chart-reply-verify",
        "chart_reply",
        "chart prompt must yield an empty assistant message with charts",
    )?;
    println!("runner_ok=true");
    Ok(())
}

fn run_canned_replies() -> RunnerResult<()> {
    let cases = [
        (CHART_PROMPT, ReplyPlan::Chart),
        ("Show me incident trends", ReplyPlan::Trends),
        ("What are the top issues?", ReplyPlan::TopIssues),
        ("Generate resolution report", ReplyPlan::ResolutionPerformance),
        ("hello", ReplyPlan::Generic),
    ];

    for (prompt, expected) in cases {
        let plan = classify(prompt);
        println!("classify[{prompt}]={}", plan.name());
        check(
            plan == expected,
            "scenario-canned-replies-verify",
            "canned_replies",
            &format!("prompt '{prompt}' classified as {}", plan.name()),
        )?;
    }

    println!("runner_ok=true");
    Ok(())
}

async fn run_pending_gate(config: ManagerConfig) -> RunnerResult<()> {
    let mut manager = manager(config, "scenario-pending-gate-manager")?;
    manager.send_message("hello").context(SessionOperationSnafu {
        stage: "scenario-pending-gate-first-send",
    })?;
    let before = manager.snapshot();
    let second = manager.send_message("world");
    let rejected = matches!(second, Err(SessionError::ReplyPending { .. }));
    let unchanged = manager.snapshot() == before;

    println!("second_send_rejected={rejected}");
    println!("store_unchanged={unchanged}");
    check(
        rejected && unchanged,
        "scenario-pending-gate-verify",
        "pending_gate",
        "a send while pending must be rejected without mutation",
    )?;

    wait_for_reply(&manager, "scenario-pending-gate-wait").await?;
    let messages = manager.read(|store| {
        store
            .active_session()
            .map(|session| session.messages.len())
            .unwrap_or(0)
    });
    println!("message_count={messages}");
    check(
        messages == 2,
        "scenario-pending-gate-count",
        "pending_gate",
        "exactly one user and one assistant message expected",
    )?;
    println!("runner_ok=true");
    Ok(())
}

async fn run_interleaved_target(config: ManagerConfig) -> RunnerResult<()> {
    let mut manager = manager(config, "scenario-interleaved-target-manager")?;
    let session_a = manager.create_session();
    manager
        .send_message("Show me incident trends")
        .context(SessionOperationSnafu {
            stage: "scenario-interleaved-target-send",
        })?;
    let session_b = manager.create_session();
    manager
        .select_session(session_b)
        .context(SessionOperationSnafu {
            stage: "scenario-interleaved-target-select",
        })?;
    wait_for_reply(&manager, "scenario-interleaved-target-wait").await?;

    let store = manager.snapshot();
    let a_count = store
        .session(session_a)
        .map(|session| session.messages.len())
        .unwrap_or(0);
    let b_count = store
        .session(session_b)
        .map(|session| session.messages.len())
        .unwrap_or(usize::MAX);
    let still_on_b = store.active_session_id() == Some(session_b);

    println!("session_a_messages={a_count}");
    println!("session_b_messages={b_count}");
    println!("active_is_b={still_on_b}");
    check(
        a_count == 2 && b_count == 0 && still_on_b,
        "scenario-interleaved-target-verify",
        "interleaved_target",
        "reply must land on the originating session without changing selection",
    )?;
    println!("runner_ok=true");
    Ok(())
}

async fn run_teardown_cancel(config: ManagerConfig) -> RunnerResult<()> {
    let mut manager = manager(config, "scenario-teardown-cancel-manager")?;
    let mut updates = manager.subscribe();
    manager.send_message("hello").context(SessionOperationSnafu {
        stage: "scenario-teardown-cancel-send",
    })?;
    let _ = updates.borrow_and_update();

    drop(manager);
    tokio::time::sleep(config.reply_latency + Duration::from_millis(100)).await;

    let changed = updates.has_changed().unwrap_or(false);
    let messages = updates
        .borrow()
        .sessions()
        .first()
        .map(|session| session.messages.len())
        .unwrap_or(0);
    println!("changed_after_teardown={changed}");
    println!("message_count={messages}");
    check(
        !changed && messages == 1,
        "scenario-teardown-cancel-verify",
        "teardown_cancel",
        "no reply may be applied after the manager is dropped",
    )?;
    println!("runner_ok=true");
    Ok(())
}

async fn run_unknown_select(config: ManagerConfig) -> RunnerResult<()> {
    let mut manager = manager(config, "scenario-unknown-select-manager")?;
    let known = manager.create_session();
    let outcome = manager.select_session(SessionId::new_v7());
    let rejected = matches!(outcome, Err(SessionError::UnknownSession { .. }));
    let unchanged = manager.read(|store| store.active_session_id()) == Some(known);

    println!("unknown_select_rejected={rejected}");
    println!("active_unchanged={unchanged}");
    check(
        rejected && unchanged,
        "scenario-unknown-select-verify",
        "unknown_select",
        "selecting an unknown session must be rejected without mutation",
    )?;
    println!("runner_ok=true");
    Ok(())
}

async fn run_end_to_end(config: ManagerConfig) -> RunnerResult<()> {
    let mut manager = manager(config, "scenario-end-to-end-manager")?;
    manager
        .send_message(CHART_PROMPT)
        .context(SessionOperationSnafu {
            stage: "scenario-end-to-end-send",
        })?;
    wait_for_reply(&manager, "scenario-end-to-end-wait").await?;

    let store = manager.snapshot();
    let transcript: Vec<String> = store
        .sessions()
        .iter()
        .flat_map(|session| session.messages.iter().map(describe))
        .collect();
    for (index, line) in transcript.iter().enumerate() {
        println!("message[{index}]={line}");
    }
    let ok = store.sessions().len() == 1
        && transcript.len() == 2
        && store
            .active_session()
            .is_some_and(|session| session.messages[1].has_charts);
    check(
        ok,
        "scenario-end-to-end-verify",
        "end_to_end",
        "expected one session with a user message and a chart reply",
    )?;
    println!("runner_ok=true");
    Ok(())
}

async fn run_all(config: ManagerConfig) -> RunnerResult<()> {
    run_id_roundtrip()?;
    run_id_invalid()?;
    run_implicit_session(config).await?;
    run_title_freeze(config).await?;
    run_chart_reply(config).await?;
    run_canned_replies()?;
    run_pending_gate(config).await?;
    run_interleaved_target(config).await?;
    run_teardown_cancel(config).await?;
    run_unknown_select(config).await?;
    run_end_to_end(config).await?;

    println!("all_passed=true");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_scenario_and_latency() {
        let parsed = parse_args(args(&["--scenario", "pending_gate", "--latency-ms", "20"]))
            .expect("valid args");
        assert_eq!(parsed.scenario.name(), "pending_gate");
        assert_eq!(parsed.latency, Duration::from_millis(20));
    }

    #[test]
    fn latency_defaults_to_manager_default() {
        let parsed = parse_args(args(&["--scenario", "all"])).expect("valid args");
        assert_eq!(parsed.latency, DEFAULT_REPLY_LATENCY);
    }

    #[test]
    fn rejects_bad_invocations() {
        assert!(matches!(
            parse_args(args(&[])),
            Err(RunnerError::MissingScenario { .. })
        ));
        assert!(matches!(
            parse_args(args(&["--scenario", "nope"])),
            Err(RunnerError::UnknownScenario { .. })
        ));
        assert!(matches!(
            parse_args(args(&["--scenario", "all", "--latency-ms", "soon"])),
            Err(RunnerError::InvalidLatency { .. })
        ));
        assert!(matches!(
            parse_args(args(&["--verbose"])),
            Err(RunnerError::UnknownArgument { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn all_scenarios_pass_on_virtual_time() {
        let config = ManagerConfig::default().with_reply_latency(Duration::from_millis(30));
        run_all(config).await.expect("every scenario passes");
    }
}
