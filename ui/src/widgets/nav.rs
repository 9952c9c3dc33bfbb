//! Top navigation bar: route switcher plus the session corner.

use agrilink_business::{Route, SessionCompute, SignOutCommand};
use agrilink_states::StateCtx;
use egui::Ui;

fn route_button(ctx: &mut StateCtx, ui: &mut Ui, route: Route) {
    let current = ctx.state_ref::<Route>().copied().unwrap_or_default();
    if ui.selectable_label(current == route, route.title()).clicked() {
        ctx.update_state::<Route>(|state| *state = route);
    }
}

pub fn top_nav(ctx: &mut StateCtx, ui: &mut Ui) {
    ui.label(egui::RichText::new("AgriLink").strong());
    ui.separator();

    route_button(ctx, ui, Route::Listings);

    let session = ctx.cached::<SessionCompute>().cloned().unwrap_or_default();
    if session.is_signed_in() {
        route_button(ctx, ui, Route::Profile);
    }
    if session.is_admin() {
        route_button(ctx, ui, Route::Admin);
    }

    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
        if session.loading {
            ui.spinner();
            return;
        }
        match &session.user {
            Some(user) => {
                if ui.button("Sign out").clicked() {
                    ctx.dispatch::<SignOutCommand>();
                }
                ui.label(&user.full_name);
            }
            None => {
                route_button(ctx, ui, Route::Register);
                route_button(ctx, ui, Route::Login);
            }
        }
    });
}
