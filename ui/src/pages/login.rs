use agrilink_business::{
    FlowStatus, LoginFlow, LoginForm, MarketConfig, Route, SignInCommand, oauth_authorize_url,
};
use egui::{Color32, RichText, Ui};

use crate::state::State;

pub fn login(state: &mut State, ui: &mut Ui) {
    let ctx = &mut state.ctx;
    let flow = ctx.cached::<LoginFlow>().cloned().unwrap_or_default();

    // A finished sign-in lands back on the listings.
    if flow.status == FlowStatus::Succeeded {
        ctx.updater().set(LoginFlow::default());
        ctx.update_state::<Route>(|route| *route = Route::Listings);
        return;
    }

    ui.heading("Sign In");
    ui.add_space(8.0);

    let mut submit = false;
    ctx.update_state::<LoginForm>(|form| {
        egui::Grid::new("login_form").num_columns(2).show(ui, |ui| {
            ui.label("Email:");
            ui.text_edit_singleline(&mut form.email);
            ui.end_row();
            ui.label("Password:");
            let response = ui.add(egui::TextEdit::singleline(&mut form.password).password(true));
            if response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter)) {
                submit = true;
            }
            ui.end_row();
        });
    });

    if let Some(message) = flow.status.error() {
        ui.add_space(4.0);
        ui.label(RichText::new(message).color(Color32::from_rgb(220, 53, 69)));
    }

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        if ui
            .add_enabled(!flow.status.is_pending(), egui::Button::new("Sign in"))
            .clicked()
        {
            submit = true;
        }
        if flow.status.is_pending() {
            ui.spinner();
        }
    });

    if let Some(config) = ctx.state_ref::<MarketConfig>() {
        ui.add_space(8.0);
        ui.hyperlink_to(
            "Continue with Google",
            oauth_authorize_url(config, "google", "https://app.agrilink.example/"),
        );
    }

    ui.add_space(8.0);
    if ui.link("No account yet? Register").clicked() {
        ctx.update_state::<Route>(|route| *route = Route::Register);
    }

    if submit {
        ctx.dispatch::<SignInCommand>();
    }
}
