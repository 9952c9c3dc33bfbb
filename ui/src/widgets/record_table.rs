//! Generic sortable, paginated record table.
//!
//! Works over anything implementing [`TableRecord`]: a record exposes typed
//! [`CellValue`]s per column key, and the table handles header-click sorting,
//! fixed-size pages and the per-row action buttons. Actions are returned to
//! the caller instead of mutating anything here; the widget owns only its
//! sort column and page index.

use std::cmp::Ordering;

use agrilink_business::Role;
use chrono::{DateTime, Utc};
use egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use super::badge::{role_badge, status_badge};

pub const ITEMS_PER_PAGE: usize = 10;

/// A typed cell, so columns sort by value rather than by display text.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Role(Role),
    Money { amount: f64, currency: String },
}

impl CellValue {
    /// Natural ordering within a variant; values of different shapes (or
    /// different currencies) do not reorder under a stable sort.
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (Self::Number(a), Self::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            (Self::Role(a), Self::Role(b)) => a.as_str().cmp(b.as_str()),
            (
                Self::Money { amount, currency },
                Self::Money {
                    amount: other_amount,
                    currency: other_currency,
                },
            ) if currency == other_currency => {
                amount.partial_cmp(other_amount).unwrap_or(Ordering::Equal)
            }
            _ => Ordering::Equal,
        }
    }
}

pub trait TableRecord {
    fn record_id(&self) -> &str;
    fn cell(&self, column: &str) -> CellValue;
}

/// Custom cell renderer: gets the typed value plus the whole row.
pub type CellRenderer<R> = fn(&mut Ui, &CellValue, &R);

pub struct ColumnSpec<R> {
    pub key: &'static str,
    pub label: &'static str,
    pub sortable: bool,
    /// Consulted before the default cell policy when present. Sorting still
    /// uses the raw [`CellValue`].
    pub render: Option<CellRenderer<R>>,
}

impl<R> ColumnSpec<R> {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            sortable: true,
            render: None,
        }
    }

    pub const fn unsortable(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            sortable: false,
            render: None,
        }
    }

    pub const fn rendered(
        key: &'static str,
        label: &'static str,
        render: CellRenderer<R>,
    ) -> Self {
        Self {
            key,
            label,
            sortable: true,
            render: Some(render),
        }
    }
}

impl<R> Clone for ColumnSpec<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for ColumnSpec<R> {}

/// Which column drives the ordering, and which way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    pub column: Option<&'static str>,
    pub ascending: bool,
}

impl SortState {
    /// A click on the active column flips the direction; a click on any
    /// other column starts over ascending.
    pub fn toggle(&mut self, column: &'static str) {
        if self.column == Some(column) {
            self.ascending = !self.ascending;
        } else {
            self.column = Some(column);
            self.ascending = true;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageState {
    pub page: usize,
}

impl PageState {
    pub fn page_count(row_count: usize) -> usize {
        row_count.div_ceil(ITEMS_PER_PAGE).max(1)
    }

    /// Keeps the page index valid after rows were removed.
    pub fn clamp(&mut self, row_count: usize) {
        self.page = self.page.min(Self::page_count(row_count) - 1);
    }

    pub fn bounds(&self, row_count: usize) -> std::ops::Range<usize> {
        let start = (self.page * ITEMS_PER_PAGE).min(row_count);
        let end = (start + ITEMS_PER_PAGE).min(row_count);
        start..end
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordTableState {
    pub sort: SortState,
    pub page: PageState,
}

/// What the user asked to do to a row. The caller owns the consequences.
#[derive(Debug, Clone, PartialEq)]
pub enum RowAction<R> {
    Delete(R),
    Approve(R),
    Reject(R),
}

/// Which action set the rightmost column offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Users,
    Products,
}

/// Stable sort of row references by the active column.
pub fn sort_rows<'a, R: TableRecord>(rows: &mut [&'a R], sort: &SortState) {
    let Some(column) = sort.column else {
        return;
    };
    rows.sort_by(|a, b| {
        let ordering = a.cell(column).compare(&b.cell(column));
        if sort.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

fn header_label<R>(spec: &ColumnSpec<R>, sort: &SortState) -> String {
    if sort.column == Some(spec.key) {
        let arrow = if sort.ascending { "⬆" } else { "⬇" };
        format!("{} {arrow}", spec.label)
    } else {
        spec.label.to_owned()
    }
}

fn cell_ui(ui: &mut Ui, value: &CellValue) {
    match value {
        CellValue::Empty => {
            ui.weak("—");
        }
        CellValue::Text(text) => {
            ui.label(text);
        }
        CellValue::Number(number) => {
            ui.monospace(format!("{number}"));
        }
        CellValue::Bool(value) => {
            status_badge(ui, *value);
        }
        CellValue::Timestamp(timestamp) => {
            ui.label(timestamp.format("%b %d, %Y").to_string());
        }
        CellValue::Role(role) => {
            role_badge(ui, *role);
        }
        CellValue::Money { amount, currency } => {
            ui.monospace(format!("{amount:.2} {currency}"));
        }
    }
}

fn row_actions<R: TableRecord + Clone>(
    ui: &mut Ui,
    record: &R,
    kind: TableKind,
) -> Option<RowAction<R>> {
    let mut action = None;
    match kind {
        TableKind::Users => {
            if ui.small_button("Delete").clicked() {
                action = Some(RowAction::Delete(record.clone()));
            }
        }
        TableKind::Products => {
            if record.cell("is_approved") == CellValue::Bool(false) {
                if ui.small_button("Approve").clicked() {
                    action = Some(RowAction::Approve(record.clone()));
                }
                if ui.small_button("Reject").clicked() {
                    action = Some(RowAction::Reject(record.clone()));
                }
            }
            if ui.small_button("Delete").clicked() {
                action = Some(RowAction::Delete(record.clone()));
            }
        }
    }
    action
}

/// Renders one page of `rows` and returns the action clicked this frame,
/// if any.
pub fn record_table<R: TableRecord + Clone>(
    ui: &mut Ui,
    table_state: &mut RecordTableState,
    columns: &[ColumnSpec<R>],
    rows: &[R],
    kind: TableKind,
) -> Option<RowAction<R>> {
    let mut ordered: Vec<&R> = rows.iter().collect();
    sort_rows(&mut ordered, &table_state.sort);
    table_state.page.clamp(ordered.len());
    let visible = &ordered[table_state.page.bounds(ordered.len())];

    let mut action = None;
    let mut clicked_column = None;

    TableBuilder::new(ui)
        .striped(true)
        .columns(Column::auto().resizable(true), columns.len())
        .column(Column::remainder())
        .header(22.0, |mut header| {
            for spec in columns {
                header.col(|ui| {
                    let label = header_label(spec, &table_state.sort);
                    if spec.sortable {
                        if ui.button(RichText::new(label).strong()).clicked() {
                            clicked_column = Some(spec.key);
                        }
                    } else {
                        ui.label(RichText::new(label).strong());
                    }
                });
            }
            header.col(|ui| {
                ui.label(RichText::new("Actions").strong());
            });
        })
        .body(|mut body| {
            for record in visible {
                body.row(20.0, |mut row| {
                    for spec in columns {
                        row.col(|ui| {
                            let value = record.cell(spec.key);
                            match spec.render {
                                Some(render) => render(ui, &value, *record),
                                None => cell_ui(ui, &value),
                            }
                        });
                    }
                    row.col(|ui| {
                        if let Some(clicked) = row_actions(ui, *record, kind) {
                            action = Some(clicked);
                        }
                    });
                });
            }
        });

    if let Some(column) = clicked_column {
        table_state.sort.toggle(column);
    }

    pager(ui, &mut table_state.page, ordered.len());
    action
}

fn pager(ui: &mut Ui, page: &mut PageState, row_count: usize) {
    let page_count = PageState::page_count(row_count);
    if page_count <= 1 {
        return;
    }
    ui.horizontal(|ui| {
        if ui
            .add_enabled(page.page > 0, egui::Button::new("Previous"))
            .clicked()
        {
            page.page -= 1;
        }
        ui.label(format!("Page {} of {page_count}", page.page + 1));
        if ui
            .add_enabled(page.page + 1 < page_count, egui::Button::new("Next"))
            .clicked()
        {
            page.page += 1;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Listing {
        id: &'static str,
        title: &'static str,
        price: f64,
    }

    impl TableRecord for Listing {
        fn record_id(&self) -> &str {
            self.id
        }

        fn cell(&self, column: &str) -> CellValue {
            match column {
                "title" => CellValue::Text(self.title.to_owned()),
                "price" => CellValue::Money {
                    amount: self.price,
                    currency: "USD".to_owned(),
                },
                _ => CellValue::Empty,
            }
        }
    }

    fn listings() -> Vec<Listing> {
        vec![
            Listing { id: "a", title: "Dates", price: 3.0 },
            Listing { id: "b", title: "Olives", price: 1.0 },
            Listing { id: "c", title: "Figs", price: 2.0 },
        ]
    }

    fn ids(rows: &[&Listing]) -> Vec<&'static str> {
        rows.iter().map(|row| row.id).collect()
    }

    #[test]
    fn sorts_ascending_then_descending() {
        let rows = listings();
        let mut refs: Vec<&Listing> = rows.iter().collect();

        let mut sort = SortState::default();
        sort.toggle("price");
        sort_rows(&mut refs, &sort);
        assert_eq!(ids(&refs), ["b", "c", "a"]);

        sort.toggle("price");
        sort_rows(&mut refs, &sort);
        assert_eq!(ids(&refs), ["a", "c", "b"]);
    }

    #[test]
    fn third_click_returns_to_ascending() {
        let mut sort = SortState::default();
        sort.toggle("price");
        sort.toggle("price");
        sort.toggle("price");
        assert_eq!(sort.column, Some("price"));
        assert!(sort.ascending);
    }

    #[test]
    fn switching_column_resets_to_ascending() {
        let mut sort = SortState::default();
        sort.toggle("price");
        sort.toggle("price");
        assert!(!sort.ascending);

        sort.toggle("title");
        assert_eq!(sort.column, Some("title"));
        assert!(sort.ascending);
    }

    #[test]
    fn equal_and_incomparable_cells_keep_row_order() {
        let rows = vec![
            Listing { id: "a", title: "Dates", price: 2.0 },
            Listing { id: "b", title: "Olives", price: 2.0 },
            Listing { id: "c", title: "Figs", price: 2.0 },
        ];
        let mut refs: Vec<&Listing> = rows.iter().collect();
        let sort = SortState {
            column: Some("price"),
            ascending: true,
        };
        sort_rows(&mut refs, &sort);
        assert_eq!(ids(&refs), ["a", "b", "c"]);

        // A column nobody implements compares Equal everywhere.
        let sort = SortState {
            column: Some("missing"),
            ascending: false,
        };
        sort_rows(&mut refs, &sort);
        assert_eq!(ids(&refs), ["a", "b", "c"]);
    }

    #[test]
    fn different_currencies_do_not_reorder() {
        let usd = CellValue::Money {
            amount: 1.0,
            currency: "USD".to_owned(),
        };
        let eur = CellValue::Money {
            amount: 9.0,
            currency: "EUR".to_owned(),
        };
        assert_eq!(usd.compare(&eur), Ordering::Equal);
    }

    #[test]
    fn twenty_three_rows_make_three_pages() {
        assert_eq!(PageState::page_count(23), 3);
        let page = PageState { page: 2 };
        assert_eq!(page.bounds(23), 20..23);
    }

    #[test]
    fn page_index_clamps_after_rows_shrink() {
        let mut page = PageState { page: 2 };
        page.clamp(15);
        assert_eq!(page.page, 1);
        assert_eq!(page.bounds(15), 10..15);
    }

    #[test]
    fn empty_table_is_a_single_page() {
        assert_eq!(PageState::page_count(0), 1);
        let mut page = PageState { page: 4 };
        page.clamp(0);
        assert_eq!(page.page, 0);
        assert_eq!(page.bounds(0), 0..0);
    }
}
