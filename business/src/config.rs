use std::any::Any;

use agrilink_states::{State, assign_impl};
use ustr::Ustr;

/// Backend endpoints and keys for the hosted auth + table service.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub project_url: String,
    /// Public (anon) API key sent with every request.
    pub anon_key: String,
    /// Demo build: the session resolver short-circuits to a fixed demo
    /// profile and never talks to the network.
    pub demo_mode: bool,
}

impl MarketConfig {
    pub fn new(project_url: String, anon_key: String) -> Self {
        Self {
            project_url,
            anon_key,
            demo_mode: false,
        }
    }

    pub fn demo() -> Self {
        Self {
            demo_mode: true,
            ..Self::new("https://placeholder.agrilink.example".to_owned(), String::new())
        }
    }

    /// Base URL of the auth endpoints (`signup`, `token`, `user`, ...).
    pub fn auth_url(&self) -> Ustr {
        Ustr::from(&format!("{}/auth/v1", self.project_url))
    }

    /// Base URL of the table endpoints.
    pub fn rest_url(&self) -> Ustr {
        Ustr::from(&format!("{}/rest/v1", self.project_url))
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        if cfg!(feature = "env_demo") {
            Self::demo()
        } else {
            Self::new(
                "https://api.agrilink.example".to_owned(),
                "public-anon-key".to_owned(),
            )
        }
    }
}

impl State for MarketConfig {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_urls() {
        let config = MarketConfig::new(
            "https://api.agrilink.example".to_owned(),
            "key".to_owned(),
        );
        assert_eq!(
            config.auth_url(),
            Ustr::from("https://api.agrilink.example/auth/v1")
        );
        assert_eq!(
            config.rest_url(),
            Ustr::from("https://api.agrilink.example/rest/v1")
        );
        assert!(!config.demo_mode);
    }

    #[test]
    fn test_demo_config() {
        let config = MarketConfig::demo();
        assert!(config.demo_mode);
    }
}
