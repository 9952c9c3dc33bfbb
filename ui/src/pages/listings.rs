//! Public browse page: filter bar over the approved-listings cache.

use agrilink_business::{
    CATEGORIES, COUNTRIES, FetchListingsCommand, ListingFilters, ListingsCompute, MessageThread,
    Product, Remote, SelectedListing, SessionCompute, open_listing, open_thread,
};
use egui::{Color32, RichText, Ui};

use crate::state::State;
use crate::widgets::{CardClick, listing_detail, message_panel, product_card};

fn filter_bar(state: &mut State, ui: &mut Ui) {
    let ctx = &mut state.ctx;
    ui.horizontal_wrapped(|ui| {
        ctx.update_state::<ListingFilters>(|filters| {
            ui.label("Search:");
            ui.add(egui::TextEdit::singleline(&mut filters.search).desired_width(160.0));

            egui::ComboBox::from_label("Category")
                .selected_text(filters.category.as_deref().unwrap_or("All"))
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut filters.category, None, "All");
                    for category in CATEGORIES {
                        ui.selectable_value(
                            &mut filters.category,
                            Some((*category).to_owned()),
                            *category,
                        );
                    }
                });

            egui::ComboBox::from_label("Country")
                .selected_text(filters.country.as_deref().unwrap_or("All"))
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut filters.country, None, "All");
                    for country in COUNTRIES {
                        ui.selectable_value(
                            &mut filters.country,
                            Some((*country).to_owned()),
                            *country,
                        );
                    }
                });

            let mut bounded_min = filters.price_min.is_some();
            if ui.checkbox(&mut bounded_min, "Min price").changed() {
                filters.price_min = bounded_min.then_some(0.0);
            }
            if let Some(min) = &mut filters.price_min {
                ui.add(egui::DragValue::new(min).speed(0.1).range(0.0..=f64::MAX));
            }

            let mut bounded_max = filters.price_max.is_some();
            if ui.checkbox(&mut bounded_max, "Max price").changed() {
                filters.price_max = bounded_max.then_some(100.0);
            }
            if let Some(max) = &mut filters.price_max {
                ui.add(egui::DragValue::new(max).speed(0.1).range(0.0..=f64::MAX));
            }

            if !filters.is_empty() && ui.button("Clear").clicked() {
                *filters = ListingFilters::default();
            }
        });
    });
}

pub fn listings(state: &mut State, ui: &mut Ui) {
    if state
        .ctx
        .cached::<ListingsCompute>()
        .is_some_and(|cache| cache.result.is_idle())
    {
        state.ctx.dispatch::<FetchListingsCommand>();
    }

    ui.heading("Browse Listings");
    ui.add_space(6.0);
    filter_bar(state, ui);
    ui.separator();

    let cache = state.ctx.cached::<ListingsCompute>().cloned().unwrap_or_default();
    match &cache.result {
        Remote::Idle | Remote::Pending => {
            ui.spinner();
            return;
        }
        Remote::Failed(message) => {
            ui.label(RichText::new(message).color(Color32::from_rgb(220, 53, 69)));
            if ui.button("Retry").clicked() {
                state.ctx.dispatch::<FetchListingsCommand>();
            }
            return;
        }
        Remote::Ready(_) => {}
    }
    let products = cache.result.value().map(Vec::as_slice).unwrap_or_default();

    let filters = state.ctx.state_ref::<ListingFilters>().cloned().unwrap_or_default();
    let visible = filters.apply(products);
    if visible.is_empty() {
        ui.label(RichText::new("No listings match these filters").color(Color32::GRAY).italics());
    }

    let session = state.ctx.cached::<SessionCompute>().cloned().unwrap_or_default();
    let own_id = session.user.as_ref().map(|user| user.id.clone());

    let mut contact: Option<Product> = None;
    let mut details: Option<Product> = None;
    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.horizontal_wrapped(|ui| {
            for product in visible {
                let can_contact =
                    own_id.as_deref().is_some_and(|id| id != product.farmer_id);
                match product_card(ui, product, can_contact) {
                    CardClick::Contact => contact = Some(product.clone()),
                    CardClick::Details => details = Some(product.clone()),
                    CardClick::None => {}
                }
            }
        });
    });
    if let Some(product) = contact {
        open_thread(&state.ctx, &product);
    }
    if let Some(product) = details {
        open_listing(&state.ctx, &product);
    }

    let selected = state.ctx.state_ref::<SelectedListing>().cloned().unwrap_or_default();
    if let Some(product_id) = &selected.product_id
        && let Some(product) = products.iter().find(|product| product.id == *product_id)
    {
        let product = product.clone();
        let egui_ctx = ui.ctx().clone();
        listing_detail(&mut state.ctx, &egui_ctx, &product);
    }

    let thread = state.ctx.cached::<MessageThread>().cloned().unwrap_or_default();
    if let Some(product_id) = &thread.product_id
        && let Some(product) = products.iter().find(|product| product.id == *product_id)
    {
        let product = product.clone();
        let egui_ctx = ui.ctx().clone();
        message_panel(&mut state.ctx, &egui_ctx, &product);
    }
}
