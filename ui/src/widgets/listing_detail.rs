//! Modal detail window for a single listing, with the seller's profile.

use agrilink_business::{
    Product, Remote, SellerCompute, SessionCompute, close_listing, open_thread,
};
use agrilink_states::StateCtx;
use egui::{Align2, Color32, RichText, Vec2};

pub fn listing_detail(ctx: &mut StateCtx, egui_ctx: &egui::Context, product: &Product) {
    let seller = ctx.cached::<SellerCompute>().cloned().unwrap_or_default();
    let can_contact = ctx
        .cached::<SessionCompute>()
        .and_then(|session| session.user.as_ref())
        .is_some_and(|user| user.id != product.farmer_id);

    let mut close = false;
    let mut contact = false;

    egui::Window::new(&product.title)
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
        .show(egui_ctx, |ui| {
            ui.label(
                RichText::new(format!("{} · {}", product.category, product.country))
                    .color(Color32::GRAY)
                    .small(),
            );
            ui.add_space(4.0);
            ui.monospace(format!(
                "{:.2} {} / {}",
                product.price_per_unit, product.currency, product.unit
            ));
            ui.label(format!(
                "{} {} available",
                product.quantity_available, product.unit
            ));
            if !product.description.is_empty() {
                ui.add_space(6.0);
                ui.label(&product.description);
            }

            ui.separator();
            ui.label(RichText::new("Seller").strong());
            match &seller.result {
                Remote::Idle | Remote::Pending => {
                    ui.spinner();
                }
                Remote::Failed(message) => {
                    ui.label(RichText::new(message).color(Color32::from_rgb(220, 53, 69)));
                }
                Remote::Ready(profile) => {
                    ui.label(&profile.full_name);
                    if let Some(company) = &profile.company_name {
                        ui.label(RichText::new(company).color(Color32::GRAY).small());
                    }
                    ui.label(RichText::new(&profile.country).color(Color32::GRAY).small());
                }
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if can_contact && ui.button("Contact seller").clicked() {
                    contact = true;
                }
                if ui.button("Close").clicked() {
                    close = true;
                }
            });
        });

    if contact {
        open_thread(ctx, product);
    }
    if close {
        close_listing(ctx);
    }
}
