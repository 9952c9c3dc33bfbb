//! Smoke-renders the record table through egui_kittest.

use agrilink_business::{Product, Role, UserProfile};
use agrilink_ui::widgets::{
    PRODUCT_COLUMNS, RecordTableState, TableKind, USER_COLUMNS, record_table,
};
use chrono::{Duration, TimeZone, Utc};
use egui_kittest::Harness;
use egui_kittest::kittest::Queryable;

fn users(count: usize) -> Vec<UserProfile> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|index| UserProfile {
            id: format!("u-{index}"),
            email: format!("user{index}@agrilink.example"),
            full_name: format!("User {index}"),
            role: Role::Farmer,
            country: "Kenya".to_owned(),
            phone: None,
            company_name: None,
            is_banned: false,
            created_at: base + Duration::days(index as i64),
            updated_at: base + Duration::days(index as i64),
        })
        .collect()
}

#[test]
fn renders_first_page_of_a_three_page_table() {
    let rows = users(23);
    let mut table_state = RecordTableState::default();

    let mut harness = Harness::new_ui(|ui| {
        record_table(ui, &mut table_state, USER_COLUMNS, &rows, TableKind::Users);
    });
    harness.run();

    harness.get_by_label("Page 1 of 3");
    harness.get_by_label("User 0");
    drop(harness);

    assert_eq!(table_state.page.page, 0);
}

#[test]
fn user_status_column_shows_the_ban_state() {
    let mut rows = users(2);
    rows[1].is_banned = true;
    let mut table_state = RecordTableState::default();

    let mut harness = Harness::new_ui(|ui| {
        record_table(ui, &mut table_state, USER_COLUMNS, &rows, TableKind::Users);
    });
    harness.run();

    harness.get_by_label("active");
    harness.get_by_label("banned");
}

#[test]
fn custom_renderer_overrides_the_default_cell_policy() {
    let listed = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let rows = vec![Product {
        id: "p-1".to_owned(),
        farmer_id: "f-1".to_owned(),
        title: "Sesame".to_owned(),
        description: String::new(),
        price_per_unit: 2.5,
        currency: "USD".to_owned(),
        unit: "crates".to_owned(),
        quantity_available: 40.0,
        category: "Grains".to_owned(),
        country: "Nigeria".to_owned(),
        images: Vec::new(),
        is_approved: true,
        created_at: listed,
        updated_at: listed,
    }];
    let mut table_state = RecordTableState::default();

    let mut harness = Harness::new_ui(|ui| {
        record_table(
            ui,
            &mut table_state,
            PRODUCT_COLUMNS,
            &rows,
            TableKind::Products,
        );
    });
    harness.run();

    // The quantity column renders with the per-row unit, not the bare number.
    harness.get_by_label("40 crates");
}
