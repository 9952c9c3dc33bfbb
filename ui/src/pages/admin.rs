//! Admin dashboard: stat counters plus the user and product tables.

use agrilink_business::{
    AdminProductsCompute, AdminStats, FetchAdminProductsCommand, FetchMessagesCommand,
    FetchUsersCommand, MessagesCompute, Remote, SessionCompute, UsersCompute, approve_product,
    delete_product, delete_user, reject_product,
};
use egui::{Color32, RichText, Ui};

use crate::state::State;
use crate::widgets::{PRODUCT_COLUMNS, RowAction, TableKind, USER_COLUMNS, record_table};

fn stat(ui: &mut Ui, label: &str, value: usize) {
    egui::Frame::group(ui.style())
        .inner_margin(egui::Margin::symmetric(12, 8))
        .show(ui, |ui| {
            ui.vertical(|ui| {
                ui.label(RichText::new(value.to_string()).heading());
                ui.label(RichText::new(label).color(Color32::GRAY).small());
            });
        });
}

fn fetch_once(state: &mut State) {
    if state
        .ctx
        .cached::<UsersCompute>()
        .is_some_and(|cache| cache.result.is_idle())
    {
        state.ctx.dispatch::<FetchUsersCommand>();
    }
    if state
        .ctx
        .cached::<AdminProductsCompute>()
        .is_some_and(|cache| cache.result.is_idle())
    {
        state.ctx.dispatch::<FetchAdminProductsCommand>();
    }
    if state
        .ctx
        .cached::<MessagesCompute>()
        .is_some_and(|cache| cache.result.is_idle())
    {
        state.ctx.dispatch::<FetchMessagesCommand>();
    }
}

pub fn admin(state: &mut State, ui: &mut Ui) {
    let session = state.ctx.cached::<SessionCompute>().cloned().unwrap_or_default();
    if session.loading {
        ui.spinner();
        return;
    }
    if !session.is_admin() {
        ui.label("This page needs an administrator account.");
        return;
    }

    fetch_once(state);

    ui.heading("Admin Dashboard");
    ui.add_space(8.0);

    let stats = state.ctx.cached::<AdminStats>().copied().unwrap_or_default();
    ui.horizontal(|ui| {
        stat(ui, "Users", stats.total_users);
        stat(ui, "Products", stats.total_products);
        stat(ui, "Pending approval", stats.pending_products);
        stat(ui, "Messages", stats.total_messages);
    });
    ui.add_space(12.0);

    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.collapsing(RichText::new("Users").strong(), |ui| {
            let users = state.ctx.cached::<UsersCompute>().cloned().unwrap_or_default();
            match &users.result {
                Remote::Idle | Remote::Pending => {
                    ui.spinner();
                }
                Remote::Failed(message) => {
                    ui.label(RichText::new(message).color(Color32::from_rgb(220, 53, 69)));
                }
                Remote::Ready(rows) => {
                    let action = record_table(
                        ui,
                        &mut state.tables.users,
                        USER_COLUMNS,
                        rows,
                        TableKind::Users,
                    );
                    if let Some(RowAction::Delete(user)) = action {
                        delete_user(&state.ctx, &user);
                    }
                }
            }
        });

        ui.collapsing(RichText::new("Products").strong(), |ui| {
            let products = state
                .ctx
                .cached::<AdminProductsCompute>()
                .cloned()
                .unwrap_or_default();
            match &products.result {
                Remote::Idle | Remote::Pending => {
                    ui.spinner();
                }
                Remote::Failed(message) => {
                    ui.label(RichText::new(message).color(Color32::from_rgb(220, 53, 69)));
                }
                Remote::Ready(rows) => {
                    let action = record_table(
                        ui,
                        &mut state.tables.products,
                        PRODUCT_COLUMNS,
                        rows,
                        TableKind::Products,
                    );
                    match action {
                        Some(RowAction::Approve(product)) => approve_product(&state.ctx, &product),
                        Some(RowAction::Reject(product)) => reject_product(&state.ctx, &product),
                        Some(RowAction::Delete(product)) => delete_product(&state.ctx, &product),
                        None => {}
                    }
                }
            }
        });
    });
}
