mod badge;
mod columns;
mod listing_detail;
mod message_panel;
mod nav;
mod product_card;
pub mod record_table;

pub use badge::{banned_badge, role_badge, status_badge};
pub use columns::{AdminTablesState, PRODUCT_COLUMNS, USER_COLUMNS};
pub use listing_detail::listing_detail;
pub use message_panel::message_panel;
pub use nav::top_nav;
pub use product_card::{CardClick, product_card};
pub use record_table::{
    CellRenderer, CellValue, ColumnSpec, ITEMS_PER_PAGE, PageState, RecordTableState, RowAction,
    SortState, TableKind, TableRecord, record_table, sort_rows,
};
