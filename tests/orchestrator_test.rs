//! Orchestrator integration tests
//!
//! Drives complete hotspot sessions against the in-memory fakes with a
//! manual clock, so multi-minute hotspot windows run instantly.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use hotspot_connect::clients::fake::{
    Deployment, FakeChat, FakeDeployer, FakeDirectory, FakePresence, FakeTicketIssuer,
    OperatorTurn,
};
use hotspot_connect::config::HotspotConfig;
use hotspot_connect::orchestrator::messages;
use hotspot_connect::orchestrator::{
    Collaborators, DurationSource, ManualClock, Orchestrator, RunOutcome, Session, SessionState,
    MAX_DURATION_MINUTES,
};
use hotspot_connect::HotspotError;

const BOT: &str = "bot@example.com";
const OPS: &str = "ops@example.com";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Harness {
    chat: Arc<FakeChat>,
    tickets: Arc<FakeTicketIssuer>,
    presence: Arc<FakePresence>,
    directory: Arc<FakeDirectory>,
    deployer: Arc<FakeDeployer>,
    clock: Arc<ManualClock>,
}

impl Harness {
    fn new(
        script: Vec<OperatorTurn>,
        presence: FakePresence,
        directory: FakeDirectory,
        deployer: FakeDeployer,
    ) -> Self {
        Self {
            chat: Arc::new(FakeChat::new(BOT).with_script(script)),
            tickets: Arc::new(FakeTicketIssuer::new()),
            presence: Arc::new(presence),
            directory: Arc::new(directory),
            deployer: Arc::new(deployer),
            clock: Arc::new(ManualClock::new(start())),
        }
    }

    /// Operator at 10.1.1.1 (WLC-1 / D100), enable job succeeds
    fn standard(script: Vec<OperatorTurn>) -> Self {
        Self::new(
            script,
            FakePresence::new().with_client(OPS, "10.1.1.1"),
            FakeDirectory::new().with_device("10.1.1.1", "WLC-1", "D100"),
            FakeDeployer::new().with_statuses("J1", &["SUCCESS"]),
        )
    }

    /// Replace the chat fake, e.g. with one that fails
    fn with_chat(mut self, chat: FakeChat) -> Self {
        self.chat = Arc::new(chat);
        self
    }

    fn orchestrator(&self, settings: HotspotConfig) -> Orchestrator {
        let collaborators = Collaborators {
            chat: self.chat.clone(),
            tickets: self.tickets.clone(),
            presence: self.presence.clone(),
            directory: self.directory.clone(),
            deployer: self.deployer.clone(),
        };
        Orchestrator::new(collaborators, settings, "HotSpot-Connect").with_clock(self.clock.clone())
    }
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
}

fn say(text: &str) -> OperatorTurn {
    OperatorTurn::say(text, OPS)
}

fn secs(values: &[u64]) -> Vec<Duration> {
    values.iter().copied().map(Duration::from_secs).collect()
}

async fn completed(orchestrator: &mut Orchestrator) -> Session {
    match orchestrator.run_once().await.expect("run succeeds") {
        RunOutcome::Completed(session) => *session,
        RunOutcome::NoActivation => panic!("expected a completed session"),
    }
}

// ---------------------------------------------------------------------------
// Full sessions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_full_session_enables_and_disables_hotspot() {
    let harness = Harness::standard(vec![say("/E"), say("5")]);
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());

    let session = completed(&mut orchestrator).await;

    assert_eq!(session.requester, OPS);
    assert_eq!(session.channel_id, "room-1");
    assert_eq!(session.duration_seconds(), Some(300));
    assert_eq!(session.controller_address.as_deref(), Some("10.1.1.1"));
    assert!(!session.used_fallback_controller);
    assert_eq!(session.controller_hostname.as_deref(), Some("WLC-1"));
    assert_eq!(session.device_id.as_deref(), Some("D100"));

    let enable = session.enable_job.as_ref().expect("enable job recorded");
    assert_eq!(enable.job_name, "J1");
    assert_eq!(enable.status.as_ref().map(|s| s.as_str()), Some("SUCCESS"));
    assert_eq!(session.disable_job.as_deref(), Some("J2"));

    assert_eq!(
        harness.deployer.deployments(),
        vec![
            Deployment {
                device: "WLC-1".to_string(),
                template: "EnableSSID".to_string(),
                job_name: "J1".to_string(),
            },
            Deployment {
                device: "WLC-1".to_string(),
                template: "DisableSSID".to_string(),
                job_name: "J2".to_string(),
            },
        ]
    );
    assert_eq!(harness.deployer.status_queries(), vec!["J1".to_string()]);

    // poll, poll, settle, hotspot window
    assert_eq!(harness.clock.sleeps(), secs(&[5, 5, 20, 300]));
    assert_eq!(session.started_at, start() + chrono::Duration::seconds(5));
    assert_eq!(
        session.expires_at,
        Some(start() + chrono::Duration::seconds(330))
    );

    assert_eq!(orchestrator.state(), SessionState::Idle);
    assert!(orchestrator.session().is_none());
}

#[tokio::test]
async fn test_full_session_chat_transcript() {
    let harness = Harness::standard(vec![say("/E"), say("5")]);
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());

    completed(&mut orchestrator).await;

    assert_eq!(
        harness.chat.posted("room-1"),
        vec![
            messages::INSTRUCTIONS.to_string(),
            messages::READY.to_string(),
            messages::DURATION_PROMPT.to_string(),
            messages::job_status("SUCCESS"),
            messages::availability(5),
            messages::THUMBS_UP.to_string(),
            messages::DISABLED.to_string(),
            messages::FAREWELL.to_string(),
        ]
    );
}

#[tokio::test]
async fn test_session_visits_every_state_in_order() {
    let harness = Harness::standard(vec![say("/E"), say("1")]);
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());

    let session = completed(&mut orchestrator).await;

    assert_eq!(
        session.visited(),
        &[
            SessionState::Idle,
            SessionState::AwaitingDuration,
            SessionState::Provisioning,
            SessionState::Active,
            SessionState::Deprovisioning,
            SessionState::Idle,
        ]
    );
    assert!(session.is_finished());
}

#[tokio::test]
async fn test_existing_room_is_reused() {
    let harness = Harness::standard(vec![say("/E"), say("5")]);
    let chat = Arc::new(
        FakeChat::new(BOT)
            .with_room("HotSpot-Connect", "R-existing")
            .with_script(vec![say("/E"), say("5")]),
    );
    let collaborators = Collaborators {
        chat: chat.clone(),
        tickets: harness.tickets.clone(),
        presence: harness.presence.clone(),
        directory: harness.directory.clone(),
        deployer: harness.deployer.clone(),
    };
    let mut orchestrator = Orchestrator::new(collaborators, HotspotConfig::default(), "HotSpot-Connect")
        .with_clock(harness.clock.clone());

    let session = completed(&mut orchestrator).await;
    assert_eq!(session.channel_id, "R-existing");
    assert_eq!(orchestrator.room_id(), Some("R-existing"));
}

// ---------------------------------------------------------------------------
// Idle handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_unrecognized_input_reposts_instructions() {
    let harness = Harness::standard(vec![say("hello"), say("/E"), say("5")]);
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());

    let session = completed(&mut orchestrator).await;
    assert_eq!(session.requester, OPS);

    let posted = harness.chat.posted("room-1");
    assert_eq!(
        &posted[..6],
        &[
            messages::INSTRUCTIONS.to_string(),
            messages::READY.to_string(),
            messages::NOT_UNDERSTOOD.to_string(),
            messages::INSTRUCTIONS.to_string(),
            messages::READY.to_string(),
            messages::DURATION_PROMPT.to_string(),
        ]
    );
}

#[tokio::test]
async fn test_silence_keeps_waiting_for_activation() {
    let harness = Harness::standard(vec![
        OperatorTurn::silent(),
        OperatorTurn::silent(),
        say("/E"),
        say("5"),
    ]);
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());

    completed(&mut orchestrator).await;

    // three idle polls before activation
    assert_eq!(harness.clock.sleeps()[..3], secs(&[5, 5, 5])[..]);
    assert_eq!(
        harness
            .chat
            .posted("room-1")
            .iter()
            .filter(|m| *m == messages::READY)
            .count(),
        1
    );
}

#[tokio::test]
async fn test_activation_command_is_exact_match() {
    let harness = Harness::standard(vec![say("/e"), say(" /E")]);
    let settings = HotspotConfig {
        idle_timeout_secs: 10,
        ..HotspotConfig::default()
    };
    let mut orchestrator = harness.orchestrator(settings);

    let outcome = orchestrator.run_once().await.unwrap();
    assert!(matches!(outcome, RunOutcome::NoActivation));
    assert_eq!(
        harness
            .chat
            .posted("room-1")
            .iter()
            .filter(|m| *m == messages::NOT_UNDERSTOOD)
            .count(),
        2
    );
}

#[tokio::test]
async fn test_idle_timeout_returns_no_activation() {
    let harness = Harness::standard(Vec::new());
    let settings = HotspotConfig {
        idle_timeout_secs: 15,
        ..HotspotConfig::default()
    };
    let mut orchestrator = harness.orchestrator(settings);

    let outcome = orchestrator.run_once().await.unwrap();

    assert!(matches!(outcome, RunOutcome::NoActivation));
    assert_eq!(harness.clock.sleeps(), secs(&[5, 5, 5]));
    assert_eq!(orchestrator.state(), SessionState::Idle);
    assert!(harness.deployer.deployments().is_empty());
    assert!(harness.presence.queries().is_empty());
}

// ---------------------------------------------------------------------------
// Duration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_no_duration_answer_uses_default() {
    let harness = Harness::standard(vec![
        say("/E"),
        OperatorTurn::silent(),
        OperatorTurn::silent(),
    ]);
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());

    let session = completed(&mut orchestrator).await;

    let duration = session.duration.expect("duration recorded");
    assert_eq!(duration.minutes, 30);
    assert_eq!(duration.source, DurationSource::NoAnswer);
    // activation poll, two duration polls, settle, 30 minute window
    assert_eq!(harness.clock.sleeps(), secs(&[5, 5, 5, 20, 1800]));
    assert!(harness
        .chat
        .posted("room-1")
        .contains(&messages::availability(30)));
}

#[tokio::test]
async fn test_malformed_duration_uses_default() {
    for reply in ["abc", "0", "-5", "2.5"] {
        let harness = Harness::standard(vec![say("/E"), say(reply)]);
        let mut orchestrator = harness.orchestrator(HotspotConfig::default());

        let session = completed(&mut orchestrator).await;
        let duration = session.duration.expect("duration recorded");
        assert_eq!(duration.minutes, 30, "reply {:?}", reply);
        assert_eq!(duration.source, DurationSource::Malformed, "reply {:?}", reply);
    }
}

#[tokio::test]
async fn test_oversized_duration_uses_default() {
    let harness = Harness::standard(vec![say("/E"), say("999999999999")]);
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());

    let session = completed(&mut orchestrator).await;

    let duration = session.duration.expect("duration recorded");
    assert_eq!(duration.minutes, 30);
    assert_eq!(duration.source, DurationSource::Malformed);
    assert_eq!(harness.clock.sleeps().last(), Some(&Duration::from_secs(1800)));
    assert_eq!(
        session.expires_at,
        Some(start() + chrono::Duration::seconds(30 + 1800))
    );
    assert_eq!(session.disable_job.as_deref(), Some("J2"));
}

#[tokio::test]
async fn test_longest_duration_is_accepted() {
    let harness = Harness::standard(vec![say("/E"), say("10080")]);
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());

    let session = completed(&mut orchestrator).await;

    assert_eq!(session.duration_seconds(), Some(MAX_DURATION_MINUTES * 60));
    assert_eq!(
        session.expires_at,
        Some(start() + chrono::Duration::seconds(30) + chrono::Duration::weeks(1))
    );
}

#[tokio::test]
async fn test_duration_reply_is_trimmed() {
    let harness = Harness::standard(vec![say("/E"), say(" 12 \n")]);
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());

    let session = completed(&mut orchestrator).await;
    assert_eq!(session.duration_seconds(), Some(720));
}

#[tokio::test]
async fn test_configured_default_duration() {
    let harness = Harness::standard(vec![say("/E")]);
    let settings = HotspotConfig {
        default_duration_minutes: 2,
        ..HotspotConfig::default()
    };
    let mut orchestrator = harness.orchestrator(settings);

    let session = completed(&mut orchestrator).await;
    assert_eq!(session.duration_seconds(), Some(120));
}

// ---------------------------------------------------------------------------
// Provisioning
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_unlocated_requester_uses_fallback_controller() {
    let harness = Harness::new(
        vec![say("/E"), say("5")],
        FakePresence::new(),
        FakeDirectory::new().with_device("172.16.1.26", "WLC-FALLBACK", "D1"),
        FakeDeployer::new().with_statuses("J1", &["SUCCESS"]),
    );
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());

    let session = completed(&mut orchestrator).await;

    assert!(session.used_fallback_controller);
    assert_eq!(session.controller_address.as_deref(), Some("172.16.1.26"));
    assert_eq!(session.controller_hostname.as_deref(), Some("WLC-FALLBACK"));
    assert_eq!(harness.presence.queries(), vec![OPS.to_string()]);
    assert_eq!(harness.deployer.deployments()[0].device, "WLC-FALLBACK");

    let posted = harness.chat.posted("room-1");
    let prompt = posted
        .iter()
        .position(|m| m == messages::DURATION_PROMPT)
        .unwrap();
    assert_eq!(posted[prompt + 1], messages::NOT_CONNECTED);
}

#[tokio::test]
async fn test_rejected_ticket_is_reissued_once() {
    let harness = Harness::new(
        vec![say("/E"), say("5")],
        FakePresence::new().with_client(OPS, "10.1.1.1"),
        FakeDirectory::new()
            .with_device("10.1.1.1", "WLC-1", "D100")
            .rejecting_ticket("ticket-1"),
        FakeDeployer::new().with_statuses("J1", &["SUCCESS"]),
    );
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());

    let session = completed(&mut orchestrator).await;

    assert_eq!(session.controller_hostname.as_deref(), Some("WLC-1"));
    assert_eq!(harness.tickets.issued(), 2);
    assert_eq!(
        harness.directory.hostname_calls(),
        vec![
            ("10.1.1.1".to_string(), "ticket-1".to_string()),
            ("10.1.1.1".to_string(), "ticket-2".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_ticket_rejected_twice_fails_the_run() {
    let harness = Harness::new(
        vec![say("/E"), say("5")],
        FakePresence::new().with_client(OPS, "10.1.1.1"),
        FakeDirectory::new()
            .with_device("10.1.1.1", "WLC-1", "D100")
            .rejecting_ticket("ticket-1")
            .rejecting_ticket("ticket-2"),
        FakeDeployer::new().with_statuses("J1", &["SUCCESS"]),
    );
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());

    let err = orchestrator.run_once().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HotspotError>(),
        Some(HotspotError::TicketRejected(_))
    ));
    assert_eq!(harness.tickets.issued(), 2);
    assert_eq!(orchestrator.state(), SessionState::Idle);
    assert!(orchestrator.session().is_none());
    assert!(harness.deployer.deployments().is_empty());
}

#[tokio::test]
async fn test_next_run_succeeds_after_fatal_error() {
    let harness = Harness::new(
        vec![say("/E"), say("5"), say("/E"), say("5")],
        FakePresence::new().with_client(OPS, "10.1.1.1"),
        FakeDirectory::new()
            .with_device("10.1.1.1", "WLC-1", "D100")
            .rejecting_ticket("ticket-1")
            .rejecting_ticket("ticket-2"),
        FakeDeployer::new().with_statuses("J1", &["SUCCESS"]),
    );
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());

    assert!(orchestrator.run_once().await.is_err());
    assert_eq!(orchestrator.state(), SessionState::Idle);

    let session = completed(&mut orchestrator).await;

    assert_eq!(session.controller_hostname.as_deref(), Some("WLC-1"));
    assert_eq!(session.disable_job.as_deref(), Some("J2"));
    // the rejected ticket is not carried into the next session
    assert_eq!(harness.tickets.issued(), 3);
    assert_eq!(
        harness.directory.hostname_calls().last(),
        Some(&("10.1.1.1".to_string(), "ticket-3".to_string()))
    );
}

#[tokio::test]
async fn test_each_session_gets_a_fresh_ticket() {
    let harness = Harness::new(
        vec![say("/E"), say("1"), say("/E"), say("1")],
        FakePresence::new().with_client(OPS, "10.1.1.1"),
        FakeDirectory::new().with_device("10.1.1.1", "WLC-1", "D100"),
        FakeDeployer::new()
            .with_statuses("J1", &["SUCCESS"])
            .with_statuses("J3", &["SUCCESS"]),
    );
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());

    let first = completed(&mut orchestrator).await;
    let second = completed(&mut orchestrator).await;

    assert_ne!(first.id, second.id);
    assert_eq!(second.enable_job.as_ref().map(|j| j.job_name.as_str()), Some("J3"));
    assert_eq!(second.disable_job.as_deref(), Some("J4"));
    assert_eq!(harness.tickets.issued(), 2);
    let tickets: Vec<String> = harness
        .directory
        .hostname_calls()
        .into_iter()
        .map(|(_, ticket)| ticket)
        .collect();
    assert_eq!(tickets, vec!["ticket-1".to_string(), "ticket-2".to_string()]);
}

#[tokio::test]
async fn test_unknown_controller_fails_the_run() {
    let harness = Harness::new(
        vec![say("/E"), say("5")],
        FakePresence::new().with_client(OPS, "10.9.9.9"),
        FakeDirectory::new(),
        FakeDeployer::new(),
    );
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());

    let err = orchestrator.run_once().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HotspotError>(),
        Some(HotspotError::NotFound(_))
    ));
    assert_eq!(orchestrator.state(), SessionState::Idle);
    assert!(orchestrator.session().is_none());
    assert!(harness.deployer.deployments().is_empty());
}

// ---------------------------------------------------------------------------
// Chat transport failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_chat_failure_while_idle_is_fatal() {
    // instructions, ready prompt, one poll; the second poll fails
    let harness = Harness::standard(Vec::new())
        .with_chat(FakeChat::new(BOT).failing_after(3));
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());

    let err = orchestrator.run_once().await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<HotspotError>(),
        Some(HotspotError::Api { status: 503, .. })
    ));
    assert_eq!(orchestrator.state(), SessionState::Idle);
    assert!(orchestrator.session().is_none());
    assert_eq!(harness.clock.sleeps(), secs(&[5, 5]));
    assert!(harness.presence.queries().is_empty());
}

#[tokio::test]
async fn test_chat_failure_while_awaiting_duration_resets_session() {
    // instructions, ready prompt, "/E" fetch, duration prompt; the duration poll fails
    let harness = Harness::standard(Vec::new()).with_chat(
        FakeChat::new(BOT)
            .with_script(vec![say("/E"), say("/E"), say("5")])
            .failing_after(4),
    );
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());

    let err = orchestrator.run_once().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HotspotError>(),
        Some(HotspotError::Api { status: 503, .. })
    ));
    assert_eq!(orchestrator.state(), SessionState::Idle);
    assert!(orchestrator.session().is_none());
    assert!(harness.deployer.deployments().is_empty());

    harness.chat.recover();
    let session = completed(&mut orchestrator).await;

    assert_eq!(session.duration_seconds(), Some(300));
    assert_eq!(session.enable_job.as_ref().map(|j| j.job_name.as_str()), Some("J1"));
    assert_eq!(session.disable_job.as_deref(), Some("J2"));
}

// ---------------------------------------------------------------------------
// Job status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_job_status_is_queried_once_by_default() {
    let harness = Harness::new(
        vec![say("/E"), say("5")],
        FakePresence::new().with_client(OPS, "10.1.1.1"),
        FakeDirectory::new().with_device("10.1.1.1", "WLC-1", "D100"),
        FakeDeployer::new().with_statuses("J1", &["SCHEDULED", "SUCCESS"]),
    );
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());

    let session = completed(&mut orchestrator).await;

    assert_eq!(harness.deployer.status_queries(), vec!["J1".to_string()]);
    let status = session.enable_job.and_then(|j| j.status).unwrap();
    assert_eq!(status.as_str(), "SCHEDULED");
    assert!(harness
        .chat
        .posted("room-1")
        .contains(&messages::job_status("SCHEDULED")));
    // the session carries on regardless of the reported status
    assert_eq!(session.disable_job.as_deref(), Some("J2"));
}

#[tokio::test]
async fn test_job_status_polls_until_terminal() {
    let harness = Harness::new(
        vec![say("/E"), say("5")],
        FakePresence::new().with_client(OPS, "10.1.1.1"),
        FakeDirectory::new().with_device("10.1.1.1", "WLC-1", "D100"),
        FakeDeployer::new().with_statuses("J1", &["SCHEDULED", "RUNNING", "SUCCESS"]),
    );
    let settings = HotspotConfig {
        status_poll_attempts: 5,
        ..HotspotConfig::default()
    };
    let mut orchestrator = harness.orchestrator(settings);

    let session = completed(&mut orchestrator).await;

    assert_eq!(harness.deployer.status_queries().len(), 3);
    assert_eq!(harness.clock.sleeps(), secs(&[5, 5, 20, 20, 20, 300]));
    let status = session.enable_job.and_then(|j| j.status).unwrap();
    assert_eq!(status.as_str(), "SUCCESS");
}

#[tokio::test]
async fn test_job_status_polling_is_bounded() {
    let harness = Harness::new(
        vec![say("/E"), say("5")],
        FakePresence::new().with_client(OPS, "10.1.1.1"),
        FakeDirectory::new().with_device("10.1.1.1", "WLC-1", "D100"),
        FakeDeployer::new().with_statuses("J1", &["SCHEDULED"]),
    );
    let settings = HotspotConfig {
        status_poll_attempts: 2,
        ..HotspotConfig::default()
    };
    let mut orchestrator = harness.orchestrator(settings);

    let session = completed(&mut orchestrator).await;

    assert_eq!(harness.deployer.status_queries().len(), 2);
    let status = session.enable_job.and_then(|j| j.status).unwrap();
    assert_eq!(status.as_str(), "SCHEDULED");
}

#[tokio::test]
async fn test_failed_job_status_is_reported_verbatim() {
    let harness = Harness::new(
        vec![say("/E"), say("5")],
        FakePresence::new().with_client(OPS, "10.1.1.1"),
        FakeDirectory::new().with_device("10.1.1.1", "WLC-1", "D100"),
        FakeDeployer::new().with_statuses("J1", &["FAILURE"]),
    );
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());

    completed(&mut orchestrator).await;

    assert!(harness
        .chat
        .posted("room-1")
        .contains(&"HotSpot FAILURE".to_string()));
}

#[tokio::test]
async fn test_custom_templates() {
    let harness = Harness::standard(vec![say("/E"), say("5")]);
    let settings = HotspotConfig {
        enable_template: "GuestOn".to_string(),
        disable_template: "GuestOff".to_string(),
        ..HotspotConfig::default()
    };
    let mut orchestrator = harness.orchestrator(settings);

    completed(&mut orchestrator).await;

    let templates: Vec<String> = harness
        .deployer
        .deployments()
        .into_iter()
        .map(|d| d.template)
        .collect();
    assert_eq!(templates, vec!["GuestOn".to_string(), "GuestOff".to_string()]);
}

// ---------------------------------------------------------------------------
// Activation guard and room lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_second_activation_is_rejected_while_session_runs() {
    let harness = Harness::standard(Vec::new());
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());
    orchestrator.open_room().await.unwrap();

    let first_id = orchestrator.activate(OPS).unwrap().id;
    assert_eq!(orchestrator.state(), SessionState::AwaitingDuration);

    let err = orchestrator.activate("other@example.com").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HotspotError>(),
        Some(HotspotError::SessionInProgress(_))
    ));
    assert_eq!(orchestrator.session().map(|s| s.id), Some(first_id));
    assert_eq!(orchestrator.session().map(|s| s.requester.as_str()), Some(OPS));
}

#[tokio::test]
async fn test_activation_requires_open_room() {
    let harness = Harness::standard(Vec::new());
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());

    let err = orchestrator.activate(OPS).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HotspotError>(),
        Some(HotspotError::Config(_))
    ));
}

#[tokio::test]
async fn test_open_room_invites_members_once() {
    let harness = Harness::standard(Vec::new());
    let mut orchestrator = harness
        .orchestrator(HotspotConfig::default())
        .with_invitees(vec!["a@example.com".to_string(), "b@example.com".to_string()]);

    let id = orchestrator.open_room().await.unwrap();
    let again = orchestrator.open_room().await.unwrap();

    assert_eq!(id, again);
    assert_eq!(
        harness.chat.members(&id),
        vec!["a@example.com".to_string(), "b@example.com".to_string()]
    );
}

#[tokio::test]
async fn test_close_room_deletes_opened_room() {
    let harness = Harness::standard(Vec::new());
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());

    // nothing opened yet
    orchestrator.close_room().await.unwrap();
    assert!(harness.chat.deleted_rooms().is_empty());

    let id = orchestrator.open_room().await.unwrap();
    orchestrator.close_room().await.unwrap();

    assert_eq!(harness.chat.deleted_rooms(), vec![id]);
    assert!(orchestrator.room_id().is_none());
}

#[tokio::test]
async fn test_session_report_serializes() {
    let harness = Harness::standard(vec![say("/E"), say("5")]);
    let mut orchestrator = harness.orchestrator(HotspotConfig::default());

    let session = completed(&mut orchestrator).await;
    let report = serde_json::to_value(&session).unwrap();

    assert_eq!(report["state"], "idle");
    assert_eq!(report["controller_hostname"], "WLC-1");
    assert_eq!(report["enable_job"]["job_name"], "J1");
    assert_eq!(report["duration"]["minutes"], 5);
    assert_eq!(report["duration"]["source"], "operator");
}
