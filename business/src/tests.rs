//! End-to-end session resolution scenarios over a scripted fetcher.

use std::sync::Arc;

use agrilink_states::{StateCtx, Time};
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::{
    FetchState, FlowStatus, LoginFlow, LoginForm, MarketConfig, MockFetcher, ProfileLookup,
    ProfileSync, RegisterFlow, RegisterForm, ResolveSessionCommand, Role, Session, SessionCompute,
    SessionEvent, SessionMetadata, SessionNotifier, SessionStore, SessionUser, SignInCommand,
    SignOutCommand, SignUpCommand, UserProfile, json_response, poll_session_events,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
}

fn session() -> Session {
    Session {
        access_token: "jwt".to_owned(),
        user: SessionUser {
            id: "u-1".to_owned(),
            email: "amina@example.com".to_owned(),
            user_metadata: SessionMetadata {
                full_name: Some("Amina".to_owned()),
                role: None,
                country: None,
            },
        },
    }
}

fn profile_row() -> UserProfile {
    UserProfile {
        id: "u-1".to_owned(),
        email: "stale@example.com".to_owned(),
        full_name: "Amina Hassan".to_owned(),
        role: Role::Importer,
        country: "Egypt".to_owned(),
        phone: None,
        company_name: None,
        is_banned: false,
        created_at: t0(),
        updated_at: t0(),
    }
}

fn harness(config: MarketConfig, stored: Option<Session>, mock: Arc<MockFetcher>) -> StateCtx {
    let mut ctx = StateCtx::new();
    ctx.add_state(Time::at(t0()));
    ctx.add_state(config);
    ctx.add_state(SessionStore { session: stored });
    ctx.add_state(ProfileLookup::default());
    ctx.add_state(SessionNotifier::default());
    ctx.add_state(LoginForm::default());
    ctx.add_state(RegisterForm::default());
    ctx.add_state(FetchState::new(mock));
    ctx.record_compute(SessionCompute::default());
    ctx.record_compute(ProfileSync);
    ctx.record_compute(LoginFlow::default());
    ctx.record_compute(RegisterFlow::default());
    ctx
}

fn frame(ctx: &mut StateCtx) {
    ctx.sync_computes();
    ctx.run_computed();
    ctx.sync_computes();
}

fn advance(ctx: &mut StateCtx, seconds: i64) {
    ctx.update_state::<Time>(|time| *time.as_mut() += Duration::seconds(seconds));
    frame(ctx);
}

fn binding(ctx: &StateCtx) -> SessionCompute {
    ctx.cached::<SessionCompute>().cloned().unwrap()
}

#[test]
fn no_stored_session_resolves_logged_out_without_network() {
    let mock = Arc::new(MockFetcher::new());
    let mut ctx = harness(MarketConfig::default(), None, mock.clone());

    assert!(binding(&ctx).loading);
    ctx.dispatch::<ResolveSessionCommand>();
    frame(&mut ctx);

    let session = binding(&ctx);
    assert!(session.user.is_none());
    assert!(!session.loading);
    assert_eq!(mock.request_count(), 0);
}

#[test]
fn session_check_failure_resolves_logged_out() {
    let mock = Arc::new(MockFetcher::new());
    mock.push_response(Err("offline".to_owned()));
    let mut ctx = harness(MarketConfig::default(), Some(session()), mock.clone());

    ctx.dispatch::<ResolveSessionCommand>();
    frame(&mut ctx);

    let resolved = binding(&ctx);
    assert!(resolved.user.is_none());
    assert!(!resolved.loading);
    assert_eq!(mock.request_count(), 1);
}

#[test]
fn resolved_profile_keeps_the_session_email() {
    let mock = Arc::new(MockFetcher::new());
    mock.push_response(json_response(
        200,
        &serde_json::to_string(&session().user).unwrap(),
    ));
    mock.push_response(json_response(
        200,
        &serde_json::to_string(&profile_row()).unwrap(),
    ));
    let mut ctx = harness(MarketConfig::default(), Some(session()), mock.clone());

    ctx.dispatch::<ResolveSessionCommand>();
    frame(&mut ctx);
    frame(&mut ctx);

    let resolved = binding(&ctx);
    let user = resolved.user.expect("profile should resolve");
    assert_eq!(user.full_name, "Amina Hassan");
    assert_eq!(user.role, Role::Importer);
    // The session, not the table row, owns the email.
    assert_eq!(user.email, "amina@example.com");
    assert!(!resolved.loading);
}

#[test]
fn missing_profile_retries_with_backoff_then_falls_back() {
    let mock = Arc::new(MockFetcher::new());
    mock.push_response(json_response(
        200,
        &serde_json::to_string(&session().user).unwrap(),
    ));
    for _ in 0..3 {
        mock.push_response(json_response(406, r#"{"message":"no rows"}"#));
    }
    let mut ctx = harness(MarketConfig::default(), Some(session()), mock.clone());

    ctx.dispatch::<ResolveSessionCommand>();
    frame(&mut ctx);
    // First miss schedules a retry; still loading, nothing resolved yet.
    assert!(binding(&ctx).loading);
    assert_eq!(mock.request_count(), 2);

    // Too early for the 1s retry.
    frame(&mut ctx);
    assert_eq!(mock.request_count(), 2);

    advance(&mut ctx, 1);
    assert_eq!(mock.request_count(), 3);

    // Second retry waits 2s more.
    advance(&mut ctx, 1);
    assert_eq!(mock.request_count(), 3);
    advance(&mut ctx, 2);
    assert_eq!(mock.request_count(), 4);

    let resolved = binding(&ctx);
    let user = resolved.user.expect("fallback profile expected");
    assert_eq!(user.full_name, "Amina");
    assert_eq!(user.role, Role::Farmer);
    assert_eq!(user.country, "Unknown");
    assert_eq!(user.email, "amina@example.com");
    assert!(!resolved.loading);

    // The fallback is synthesized only; it is never written back.
    assert!(mock.requests().iter().all(|request| request.method == "GET"));
}

#[test]
fn fallback_uses_placeholder_name_without_metadata() {
    let mut bare = session();
    bare.user.user_metadata = SessionMetadata::default();

    let mock = Arc::new(MockFetcher::new());
    mock.push_response(json_response(
        200,
        &serde_json::to_string(&bare.user).unwrap(),
    ));
    mock.push_response(Err("offline".to_owned()));
    let mut ctx = harness(MarketConfig::default(), Some(bare), mock);

    ctx.dispatch::<ResolveSessionCommand>();
    frame(&mut ctx);
    frame(&mut ctx);

    // A non-miss lookup error falls back immediately, no retries.
    let user = binding(&ctx).user.expect("fallback profile expected");
    assert_eq!(user.full_name, "User");
    assert_eq!(user.country, "Unknown");
}

#[test]
fn demo_mode_resolves_synchronously_without_network() {
    let mock = Arc::new(MockFetcher::new());
    let mut ctx = harness(MarketConfig::demo(), Some(session()), mock.clone());

    ctx.dispatch::<ResolveSessionCommand>();
    frame(&mut ctx);

    let resolved = binding(&ctx);
    assert_eq!(resolved.user, Some(crate::demo_user()));
    assert!(!resolved.loading);
    assert_eq!(mock.request_count(), 0);
}

#[test]
fn sign_in_publishes_session_and_resolves_profile() {
    let mock = Arc::new(MockFetcher::new());
    mock.push_response(json_response(200, &serde_json::to_string(&session()).unwrap()));
    mock.push_response(json_response(
        200,
        &serde_json::to_string(&profile_row()).unwrap(),
    ));
    let mut ctx = harness(MarketConfig::default(), None, mock.clone());
    let subscription = ctx.state_ref::<SessionNotifier>().unwrap().subscribe();

    ctx.update_state::<LoginForm>(|form| {
        form.email = "amina@example.com".to_owned();
        form.password = "secret".to_owned();
    });
    ctx.dispatch::<SignInCommand>();
    poll_session_events(&ctx, &subscription);
    frame(&mut ctx);
    frame(&mut ctx);

    assert_eq!(
        ctx.cached::<LoginFlow>().unwrap().status,
        FlowStatus::Succeeded
    );
    assert_eq!(
        ctx.state_ref::<SessionStore>().unwrap().access_token(),
        Some("jwt")
    );
    assert_eq!(
        binding(&ctx).user.map(|user| user.full_name),
        Some("Amina Hassan".to_owned())
    );
    let token_request = &mock.requests()[0];
    assert!(token_request.url.ends_with("/token?grant_type=password"));
    assert!(token_request.body_text().contains("\"amina@example.com\""));
}

#[test]
fn bad_credentials_fail_the_login_flow() {
    let mock = Arc::new(MockFetcher::new());
    mock.push_response(json_response(
        400,
        r#"{"error_description":"Invalid login credentials"}"#,
    ));
    let mut ctx = harness(MarketConfig::default(), None, mock);

    ctx.dispatch::<SignInCommand>();
    frame(&mut ctx);

    assert_eq!(
        ctx.cached::<LoginFlow>().unwrap().status,
        FlowStatus::Failed("Invalid login credentials".to_owned())
    );
    assert!(binding(&ctx).loading);
}

#[test]
fn password_mismatch_is_caught_before_any_request() {
    let mock = Arc::new(MockFetcher::new());
    let mut ctx = harness(MarketConfig::default(), None, mock.clone());

    ctx.update_state::<RegisterForm>(|form| {
        form.password = "one".to_owned();
        form.confirm_password = "two".to_owned();
    });
    ctx.dispatch::<SignUpCommand>();
    frame(&mut ctx);

    assert_eq!(
        ctx.cached::<RegisterFlow>().unwrap().status,
        FlowStatus::Failed("Passwords do not match".to_owned())
    );
    assert_eq!(mock.request_count(), 0);
}

#[test]
fn sign_out_resets_the_binding_even_when_revoke_fails() {
    let mock = Arc::new(MockFetcher::new());
    mock.push_response(Err("offline".to_owned()));
    let mut ctx = harness(MarketConfig::default(), Some(session()), mock.clone());
    let subscription = ctx.state_ref::<SessionNotifier>().unwrap().subscribe();

    ctx.dispatch::<SignOutCommand>();
    poll_session_events(&ctx, &subscription);
    frame(&mut ctx);

    assert_eq!(mock.request_count(), 1);
    assert!(ctx.state_ref::<SessionStore>().unwrap().session.is_none());
    let resolved = binding(&ctx);
    assert!(resolved.user.is_none());
    assert!(!resolved.loading);
}

#[test]
fn dropped_subscription_is_pruned_on_emit() {
    let notifier = SessionNotifier::default();
    let kept = notifier.subscribe();
    let dropped = notifier.subscribe();
    drop(dropped);

    notifier.emit(SessionEvent::SignedOut);
    assert_eq!(notifier.subscriber_count(), 1);
    assert_eq!(kept.try_next(), Some(SessionEvent::SignedOut));
}
