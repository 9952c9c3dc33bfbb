use std::any::Any;

use agrilink_states::{State, assign_impl};

/// Which page the app is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Route {
    #[default]
    Listings,
    Login,
    Register,
    Profile,
    Admin,
}

impl Route {
    pub fn title(self) -> &'static str {
        match self {
            Self::Listings => "Browse Listings",
            Self::Login => "Sign In",
            Self::Register => "Create Account",
            Self::Profile => "My Profile",
            Self::Admin => "Admin Dashboard",
        }
    }

    /// Pages that require a signed-in user.
    pub fn requires_auth(self) -> bool {
        matches!(self, Self::Profile | Self::Admin)
    }
}

impl State for Route {
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
    fn default_route_is_listings() {
        assert_eq!(Route::default(), Route::Listings);
    }

    #[test]
    fn protected_routes() {
        assert!(Route::Admin.requires_auth());
        assert!(Route::Profile.requires_auth());
        assert!(!Route::Listings.requires_auth());
        assert!(!Route::Login.requires_auth());
    }
}
