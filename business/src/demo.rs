use chrono::{TimeZone, Utc};

use crate::models::{Role, UserProfile};

/// Fixed profile demo builds resolve to without touching the network.
pub fn demo_user() -> UserProfile {
    let joined = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default();
    UserProfile {
        id: "demo-user".to_owned(),
        email: "demo@agrilink.example".to_owned(),
        full_name: "Demo User".to_owned(),
        role: Role::Admin,
        country: "UAE".to_owned(),
        phone: None,
        company_name: Some("AgriLink Demo".to_owned()),
        is_banned: false,
        created_at: joined,
        updated_at: joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_user_is_an_admin() {
        let user = demo_user();
        assert_eq!(user.role, Role::Admin);
        assert!(!user.is_banned);
    }
}
