//! Sign-in, sign-up and sign-out against the hosted auth endpoints.
//!
//! Form states hold what the user typed; flow caches hold where the attempt
//! stands so pages can disable buttons and show inline errors. Successful
//! logins are published on the [`SessionNotifier`] feed and the session
//! resolver picks them up from there; the commands never touch the
//! `{user, loading}` binding directly (demo mode excepted).

use std::any::Any;

use agrilink_states::{Command, Compute, ComputeDeps, ComputeStage, Dep, State, Updater, assign_impl};
use log::{error, info};
use serde_json::json;

use crate::models::Session;
use crate::query::{QueryError, row, set_header};
use crate::session::{SessionCompute, SessionEvent, SessionNotifier, SessionStore};
use crate::{FetchState, MarketConfig, demo_user};

/// Where an auth attempt stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FlowStatus {
    #[default]
    Idle,
    Pending,
    Failed(String),
    Succeeded,
}

impl FlowStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn error(&self) -> Option<&str> {
        if let Self::Failed(message) = self {
            Some(message)
        } else {
            None
        }
    }
}

macro_rules! flow_cache {
    ($name:ident) => {
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            pub status: FlowStatus,
        }

        impl Compute for $name {
            fn deps(&self) -> ComputeDeps {
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
    };
}

flow_cache!(LoginFlow);
flow_cache!(RegisterFlow);

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl State for LoginForm {
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

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: crate::Role,
    pub country: String,
}

impl State for RegisterForm {
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

fn flow_error(err: QueryError) -> String {
    match err {
        QueryError::Network(message) => format!("Network error: {message}"),
        QueryError::NotFound => "Invalid credentials".to_owned(),
        QueryError::Status { message, .. } => message,
        QueryError::Decode(message) => format!("Unexpected response: {message}"),
    }
}

/// Password sign-in with the contents of [`LoginForm`].
#[derive(Debug, Default)]
pub struct SignInCommand;

impl Command for SignInCommand {
    fn run(&self, deps: Dep<'_>, updater: Updater) {
        let config = deps.get_state_ref::<MarketConfig>();
        if config.demo_mode {
            updater.set(SessionCompute {
                user: Some(demo_user()),
                loading: false,
            });
            updater.set(LoginFlow {
                status: FlowStatus::Succeeded,
            });
            return;
        }

        let form = deps.get_state_ref::<LoginForm>();
        updater.set(LoginFlow {
            status: FlowStatus::Pending,
        });

        let body = json!({ "email": form.email, "password": form.password });
        let mut request = ehttp::Request::post(
            format!("{}/token?grant_type=password", config.auth_url()),
            body.to_string().into_bytes(),
        );
        request.headers.insert("apikey", &config.anon_key);
        set_header(&mut request.headers, "Content-Type", "application/json");

        let notifier = deps.get_state_ref::<SessionNotifier>().clone();
        let fetch = deps.get_state_ref::<FetchState>();
        fetch.fetch(
            request,
            Box::new(move |result| match row::<Session>(result) {
                Ok(session) => {
                    info!("signed in as {}", session.user.email);
                    updater.set(LoginFlow {
                        status: FlowStatus::Succeeded,
                    });
                    notifier.emit(SessionEvent::SignedIn(session));
                }
                Err(err) => {
                    updater.set(LoginFlow {
                        status: FlowStatus::Failed(flow_error(err)),
                    });
                }
            }),
        );
    }
}

/// Account creation with the contents of [`RegisterForm`].
#[derive(Debug, Default)]
pub struct SignUpCommand;

impl Command for SignUpCommand {
    fn run(&self, deps: Dep<'_>, updater: Updater) {
        let form = deps.get_state_ref::<RegisterForm>();
        if form.password != form.confirm_password {
            // Caught locally, no request goes out.
            updater.set(RegisterFlow {
                status: FlowStatus::Failed("Passwords do not match".to_owned()),
            });
            return;
        }
        updater.set(RegisterFlow {
            status: FlowStatus::Pending,
        });

        let config = deps.get_state_ref::<MarketConfig>();
        let body = json!({
            "email": form.email,
            "password": form.password,
            "data": {
                "full_name": form.full_name,
                "role": form.role,
                "country": form.country,
            },
        });
        let mut request = ehttp::Request::post(
            format!("{}/signup", config.auth_url()),
            body.to_string().into_bytes(),
        );
        request.headers.insert("apikey", &config.anon_key);
        set_header(&mut request.headers, "Content-Type", "application/json");

        let notifier = deps.get_state_ref::<SessionNotifier>().clone();
        let fetch = deps.get_state_ref::<FetchState>();
        fetch.fetch(
            request,
            Box::new(move |result| match result {
                Ok(response) if response.ok => {
                    updater.set(RegisterFlow {
                        status: FlowStatus::Succeeded,
                    });
                    // Instances without email confirmation return the session
                    // right away; sign in on the spot when they do.
                    if let Ok(session) = serde_json::from_slice::<Session>(&response.bytes) {
                        notifier.emit(SessionEvent::SignedIn(session));
                    }
                }
                other => {
                    if let Err(err) = row::<Session>(other) {
                        updater.set(RegisterFlow {
                            status: FlowStatus::Failed(flow_error(err)),
                        });
                    }
                }
            }),
        );
    }
}

/// Sign-out. The local session is dropped even when the revoke call fails.
#[derive(Debug, Default)]
pub struct SignOutCommand;

impl Command for SignOutCommand {
    fn run(&self, deps: Dep<'_>, _updater: Updater) {
        let notifier = deps.get_state_ref::<SessionNotifier>().clone();
        let config = deps.get_state_ref::<MarketConfig>();
        let store = deps.get_state_ref::<SessionStore>();

        if let Some(token) = store.access_token() {
            let mut request =
                ehttp::Request::post(format!("{}/logout", config.auth_url()), Vec::new());
            request.headers.insert("apikey", &config.anon_key);
            request
                .headers
                .insert("Authorization", format!("Bearer {token}"));
            deps.get_state_ref::<FetchState>().fetch(
                request,
                Box::new(|result| {
                    if let Err(err) = result {
                        error!("sign-out revoke failed: {err}");
                    }
                }),
            );
        }
        notifier.emit(SessionEvent::SignedOut);
    }
}

/// Authorization URL for a third-party OAuth provider.
pub fn oauth_authorize_url(config: &MarketConfig, provider: &str, redirect_to: &str) -> String {
    format!(
        "{}/authorize?provider={provider}&redirect_to={}",
        config.auth_url(),
        urlencoding::encode(redirect_to)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oauth_url_encodes_redirect() {
        let config = MarketConfig::new("https://api.agrilink.example".to_owned(), "k".to_owned());
        let url = oauth_authorize_url(&config, "google", "https://app.agrilink.example/listings");
        assert_eq!(
            url,
            "https://api.agrilink.example/auth/v1/authorize?provider=google&redirect_to=https%3A%2F%2Fapp.agrilink.example%2Flistings"
        );
    }

    #[test]
    fn flow_status_error_accessor() {
        assert_eq!(FlowStatus::Failed("nope".to_owned()).error(), Some("nope"));
        assert_eq!(FlowStatus::Succeeded.error(), None);
        assert!(FlowStatus::Pending.is_pending());
    }
}
