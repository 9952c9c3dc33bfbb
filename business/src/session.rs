//! Session resolution: turns the auth provider's session into the single
//! reactive `{user, loading}` binding the whole UI reads.
//!
//! Resolution is a small state machine:
//!
//! - [`ResolveSessionCommand`] runs once at startup. Demo builds resolve
//!   synchronously to the fixed demo profile. Otherwise the stored session
//!   (if any) is validated against the auth provider; failures fail open to
//!   logged-out, never to an error the UI has to handle.
//! - A validated session schedules a [`ProfileLookup`]. The [`ProfileSync`]
//!   compute performs the lookup, retrying a missing row a bounded number of
//!   times with backoff; the `users` row is created by a backend trigger and
//!   may not exist yet when the session lands. After the last miss a
//!   fallback profile is synthesized from session metadata and never written
//!   back.
//! - Live session changes arrive on the [`SessionNotifier`] feed. Sign-in
//!   re-enters the profile lookup; sign-out resets the binding to `None`.
//!
//! `loading` stays `true` from startup until the first resolution finishes,
//! whichever path it takes.

use std::any::{Any, TypeId};
use std::sync::{Arc, Mutex};

use agrilink_states::{
    Command, Compute, ComputeDeps, ComputeStage, Dep, State, StateCtx, Time, Updater, assign_impl,
};
use chrono::{DateTime, Duration, Utc};
use log::{error, info, warn};

use crate::models::{Role, Session, UserProfile};
use crate::query::{Query, QueryError, row};
use crate::{FetchState, MarketConfig, demo_user};

/// How many times a missing profile row is re-queried before falling back.
pub const PROFILE_LOOKUP_MAX_ATTEMPTS: u32 = 3;

fn backoff(attempt: u32) -> Duration {
    // 1s, 2s, 4s.
    Duration::seconds(1 << attempt.min(8))
}

/// The reactive session binding: `user` plus a `loading` flag that stays
/// `true` until the first full resolution completes.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCompute {
    pub user: Option<UserProfile>,
    pub loading: bool,
}

impl Default for SessionCompute {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

impl SessionCompute {
    fn ready(user: Option<UserProfile>) -> Self {
        Self {
            user,
            loading: false,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }
}

impl Compute for SessionCompute {
    fn deps(&self) -> ComputeDeps {
        // Cache updated by commands and the profile sync; no derived deps.
        (&[], &[])
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) -> ComputeStage {
        ComputeStage::Finished
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// The session as last seen by this client (set on sign-in, cleared on
/// sign-out). The token is what table queries send as the bearer.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    pub session: Option<Session>,
}

impl SessionStore {
    pub fn access_token(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.access_token.as_str())
    }
}

impl State for SessionStore {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// A scheduled (or in-flight) profile lookup for a fresh session.
#[derive(Debug, Clone, Default)]
pub struct ProfileLookup {
    pub pending: Option<PendingLookup>,
}

#[derive(Debug, Clone)]
pub struct PendingLookup {
    pub session: Session,
    pub attempt: u32,
    pub next_attempt_at: DateTime<Utc>,
    in_flight: bool,
}

impl PendingLookup {
    fn first(session: Session, now: DateTime<Utc>) -> Self {
        Self {
            session,
            attempt: 0,
            next_attempt_at: now,
            in_flight: false,
        }
    }
}

impl State for ProfileLookup {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// Synthesizes the never-persisted fallback profile from session metadata.
fn fallback_profile(session: &Session, now: DateTime<Utc>) -> UserProfile {
    let metadata = &session.user.user_metadata;
    UserProfile {
        id: session.user.id.clone(),
        email: session.user.email.clone(),
        full_name: metadata
            .full_name
            .clone()
            .unwrap_or_else(|| "User".to_owned()),
        role: metadata.role.unwrap_or_default(),
        country: metadata
            .country
            .clone()
            .unwrap_or_else(|| "Unknown".to_owned()),
        phone: None,
        company_name: None,
        is_banned: false,
        created_at: now,
        updated_at: now,
    }
}

/// Initial resolution, dispatched once at startup.
#[derive(Debug, Default)]
pub struct ResolveSessionCommand;

impl Command for ResolveSessionCommand {
    fn run(&self, deps: Dep<'_>, updater: Updater) {
        let config = deps.get_state_ref::<MarketConfig>();
        if config.demo_mode {
            info!("demo mode: resolving to the demo profile");
            updater.set(SessionCompute::ready(Some(demo_user())));
            return;
        }

        let store = deps.get_state_ref::<SessionStore>();
        let Some(session) = store.session.clone() else {
            updater.set(SessionCompute::ready(None));
            return;
        };

        let now = *deps.get_state_ref::<Time>().as_ref();
        let fetch = deps.get_state_ref::<FetchState>();
        let mut request = ehttp::Request::get(format!("{}/user", config.auth_url()));
        request.headers.insert("apikey", &config.anon_key);
        request
            .headers
            .insert("Authorization", format!("Bearer {}", session.access_token));

        fetch.fetch(
            request,
            Box::new(move |result| match result {
                Ok(response) if response.status == 200 => {
                    match serde_json::from_slice::<crate::SessionUser>(&response.bytes) {
                        Ok(user) => {
                            let session = Session {
                                access_token: session.access_token,
                                user,
                            };
                            updater.set(ProfileLookup {
                                pending: Some(PendingLookup::first(session, now)),
                            });
                        }
                        Err(err) => {
                            error!("session check: bad user payload: {err}");
                            updater.set(SessionCompute::ready(None));
                        }
                    }
                }
                Ok(response) => {
                    info!("session check: no active session (status {})", response.status);
                    updater.set(SessionStore::default());
                    updater.set(SessionCompute::ready(None));
                }
                Err(err) => {
                    error!("session check failed: {err}");
                    updater.set(SessionCompute::ready(None));
                }
            }),
        );
    }
}

/// Performs due profile lookups; re-runs whenever `Time` or the lookup
/// schedule changes.
#[derive(Debug, Default)]
pub struct ProfileSync;

impl Compute for ProfileSync {
    fn deps(&self) -> ComputeDeps {
        const STATE_IDS: [TypeId; 4] = [
            TypeId::of::<Time>(),
            TypeId::of::<MarketConfig>(),
            TypeId::of::<FetchState>(),
            TypeId::of::<ProfileLookup>(),
        ];
        (&STATE_IDS, &[])
    }

    fn compute(&self, deps: Dep<'_>, updater: Updater) -> ComputeStage {
        let lookup = deps.get_state_ref::<ProfileLookup>();
        let Some(pending) = lookup.pending.clone() else {
            return ComputeStage::Finished;
        };
        let now = *deps.get_state_ref::<Time>().as_ref();
        if pending.in_flight || now < pending.next_attempt_at {
            return ComputeStage::Finished;
        }

        // Mark the attempt in flight before issuing it, so the next frame
        // does not fire a duplicate while the response is outstanding.
        updater.set(ProfileLookup {
            pending: Some(PendingLookup {
                in_flight: true,
                ..pending.clone()
            }),
        });

        let config = deps.get_state_ref::<MarketConfig>();
        let fetch = deps.get_state_ref::<FetchState>();
        let request = Query::from("users")
            .select("*")
            .eq("id", &pending.session.user.id)
            .single()
            .build(config, Some(&pending.session.access_token));

        info!(
            "profile lookup for {} (attempt {})",
            pending.session.user.id,
            pending.attempt + 1
        );

        fetch.fetch(
            request,
            Box::new(move |result| match row::<UserProfile>(result) {
                Ok(mut profile) => {
                    // The session is the authority on the email address.
                    profile.email = pending.session.user.email.clone();
                    updater.set(SessionCompute::ready(Some(profile)));
                    updater.set(ProfileLookup::default());
                }
                Err(QueryError::NotFound) if pending.attempt + 1 < PROFILE_LOOKUP_MAX_ATTEMPTS => {
                    let attempt = pending.attempt + 1;
                    warn!(
                        "no profile row for {} yet, retry {attempt} scheduled",
                        pending.session.user.id
                    );
                    updater.set(ProfileLookup {
                        pending: Some(PendingLookup {
                            next_attempt_at: now + backoff(pending.attempt),
                            attempt,
                            in_flight: false,
                            session: pending.session,
                        }),
                    });
                }
                Err(err) => {
                    warn!(
                        "profile lookup for {} gave up ({err}), using fallback profile",
                        pending.session.user.id
                    );
                    updater.set(SessionCompute::ready(Some(fallback_profile(
                        &pending.session,
                        now,
                    ))));
                    updater.set(ProfileLookup::default());
                }
            }),
        );
        ComputeStage::Pending
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// A login or logout observed by the auth commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(Session),
    SignedOut,
}

/// Process-wide session change feed.
///
/// Auth commands publish here; the app holds one [`SessionSubscription`] and
/// drains it every frame. Dropping a subscription unsubscribes it; closed
/// receivers are pruned on the next emit.
#[derive(Debug, Clone, Default)]
pub struct SessionNotifier {
    subscribers: Arc<Mutex<Vec<flume::Sender<SessionEvent>>>>,
}

impl SessionNotifier {
    pub fn subscribe(&self) -> SessionSubscription {
        let (send, recv) = flume::unbounded();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(send);
        }
        SessionSubscription { recv }
    }

    pub fn emit(&self, event: SessionEvent) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|subscriber| subscriber.send(event.clone()).is_ok());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .map(|subscribers| subscribers.len())
            .unwrap_or(0)
    }
}

impl State for SessionNotifier {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// Receiving end of the session feed; dropping it releases the
/// subscription.
#[derive(Debug)]
pub struct SessionSubscription {
    recv: flume::Receiver<SessionEvent>,
}

impl SessionSubscription {
    pub fn try_next(&self) -> Option<SessionEvent> {
        self.recv.try_recv().ok()
    }
}

/// Applies one feed event to the context.
pub fn apply_session_event(ctx: &StateCtx, event: SessionEvent) {
    let updater = ctx.updater();
    match event {
        SessionEvent::SignedIn(session) => {
            info!("session change: signed in as {}", session.user.email);
            let now = ctx
                .state_ref::<Time>()
                .map(|time| *time.as_ref())
                .unwrap_or_default();
            updater.set(SessionStore {
                session: Some(session.clone()),
            });
            updater.set(ProfileLookup {
                pending: Some(PendingLookup::first(session, now)),
            });
        }
        SessionEvent::SignedOut => {
            info!("session change: signed out");
            updater.set(SessionStore::default());
            updater.set(ProfileLookup::default());
            updater.set(SessionCompute::ready(None));
        }
    }
}

/// Drains the subscription; call once per frame.
pub fn poll_session_events(ctx: &StateCtx, subscription: &SessionSubscription) {
    while let Some(event) = subscription.try_next() {
        apply_session_event(ctx, event);
    }
}
