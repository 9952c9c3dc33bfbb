//! One listing on the browse page.

use agrilink_business::Product;
use egui::{Color32, RichText, Ui};

/// What the user clicked on a card this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CardClick {
    #[default]
    None,
    /// Open the listing's detail view.
    Details,
    /// Open the message thread with the seller.
    Contact,
}

pub fn product_card(ui: &mut Ui, product: &Product, can_contact: bool) -> CardClick {
    let mut clicked = CardClick::None;
    egui::Frame::group(ui.style())
        .inner_margin(egui::Margin::same(10))
        .show(ui, |ui| {
            ui.set_width(260.0);
            ui.label(RichText::new(&product.title).strong());
            ui.label(
                RichText::new(format!("{} · {}", product.category, product.country))
                    .color(Color32::GRAY)
                    .small(),
            );
            ui.add_space(4.0);
            if !product.description.is_empty() {
                ui.label(RichText::new(&product.description).small());
                ui.add_space(4.0);
            }
            ui.monospace(format!(
                "{:.2} {} / {}",
                product.price_per_unit, product.currency, product.unit
            ));
            ui.label(
                RichText::new(format!(
                    "{} {} available",
                    product.quantity_available, product.unit
                ))
                .small(),
            );
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                if ui.button("Details").clicked() {
                    clicked = CardClick::Details;
                }
                if can_contact && ui.button("Contact seller").clicked() {
                    clicked = CardClick::Contact;
                }
            });
        });
    clicked
}
