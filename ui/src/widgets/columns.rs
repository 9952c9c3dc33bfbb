//! [`TableRecord`] impls and column layouts for the admin tables.

use agrilink_business::{Product, UserProfile};
use egui::Ui;

use super::badge::banned_badge;
use super::record_table::{CellValue, ColumnSpec, RecordTableState, TableRecord};

pub const USER_COLUMNS: &[ColumnSpec<UserProfile>] = &[
    ColumnSpec::new("full_name", "Name"),
    ColumnSpec::new("email", "Email"),
    ColumnSpec::new("role", "Role"),
    ColumnSpec::new("country", "Country"),
    ColumnSpec::rendered("is_banned", "Status", banned_cell),
    ColumnSpec::new("created_at", "Joined"),
];

pub const PRODUCT_COLUMNS: &[ColumnSpec<Product>] = &[
    ColumnSpec::new("title", "Title"),
    ColumnSpec::new("category", "Category"),
    ColumnSpec::new("country", "Country"),
    ColumnSpec::new("price", "Price"),
    ColumnSpec::rendered("quantity", "Quantity", quantity_cell),
    ColumnSpec::new("is_approved", "Status"),
    ColumnSpec::new("created_at", "Listed"),
];

// The default Bool policy renders approved/pending; a ban needs its own
// labels.
fn banned_cell(ui: &mut Ui, value: &CellValue, _user: &UserProfile) {
    banned_badge(ui, *value == CellValue::Bool(true));
}

// Quantities are meaningless without the per-row unit.
fn quantity_cell(ui: &mut Ui, value: &CellValue, product: &Product) {
    if let CellValue::Number(quantity) = value {
        ui.monospace(format!("{quantity} {}", product.unit));
    }
}

impl TableRecord for UserProfile {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn cell(&self, column: &str) -> CellValue {
        match column {
            "full_name" => CellValue::Text(self.full_name.clone()),
            "email" => CellValue::Text(self.email.clone()),
            "role" => CellValue::Role(self.role),
            "country" => CellValue::Text(self.country.clone()),
            "is_banned" => CellValue::Bool(self.is_banned),
            "company_name" => self
                .company_name
                .clone()
                .map(CellValue::Text)
                .unwrap_or(CellValue::Empty),
            "created_at" => CellValue::Timestamp(self.created_at),
            _ => CellValue::Empty,
        }
    }
}

impl TableRecord for Product {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn cell(&self, column: &str) -> CellValue {
        match column {
            "title" => CellValue::Text(self.title.clone()),
            "category" => CellValue::Text(self.category.clone()),
            "country" => CellValue::Text(self.country.clone()),
            "price" => CellValue::Money {
                amount: self.price_per_unit,
                currency: self.currency.clone(),
            },
            "quantity" => CellValue::Number(self.quantity_available),
            "is_approved" => CellValue::Bool(self.is_approved),
            "created_at" => CellValue::Timestamp(self.created_at),
            _ => CellValue::Empty,
        }
    }
}

/// Sort and page positions of the two admin tables, kept across frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminTablesState {
    pub users: RecordTableState,
    pub products: RecordTableState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrilink_business::Role;
    use chrono::Utc;

    #[test]
    fn user_cells_are_typed() {
        let user = UserProfile {
            id: "u-1".to_owned(),
            email: "a@b.example".to_owned(),
            full_name: "Amina".to_owned(),
            role: Role::Importer,
            country: "Egypt".to_owned(),
            phone: None,
            company_name: None,
            is_banned: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(user.cell("role"), CellValue::Role(Role::Importer));
        assert_eq!(user.cell("is_banned"), CellValue::Bool(false));
        assert_eq!(user.cell("company_name"), CellValue::Empty);
        assert_eq!(user.cell("nonsense"), CellValue::Empty);
        assert_eq!(user.record_id(), "u-1");
    }
}
