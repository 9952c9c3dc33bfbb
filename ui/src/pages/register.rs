use agrilink_business::{
    COUNTRIES, FlowStatus, RegisterFlow, RegisterForm, Role, Route, SignUpCommand,
};
use egui::{Color32, RichText, Ui};

use crate::state::State;

pub fn register(state: &mut State, ui: &mut Ui) {
    let ctx = &mut state.ctx;
    let flow = ctx.cached::<RegisterFlow>().cloned().unwrap_or_default();

    ui.heading("Create Account");
    ui.add_space(8.0);

    if flow.status == FlowStatus::Succeeded {
        ui.label(
            RichText::new("Account created. Check your inbox to confirm your email.")
                .color(Color32::from_rgb(34, 139, 34)),
        );
        ui.add_space(8.0);
        if ui.button("Go to sign in").clicked() {
            ctx.updater().set(RegisterFlow::default());
            ctx.update_state::<Route>(|route| *route = Route::Login);
        }
        return;
    }

    let mut submit = false;
    ctx.update_state::<RegisterForm>(|form| {
        egui::Grid::new("register_form").num_columns(2).show(ui, |ui| {
            ui.label("Full name:");
            ui.text_edit_singleline(&mut form.full_name);
            ui.end_row();

            ui.label("Email:");
            ui.text_edit_singleline(&mut form.email);
            ui.end_row();

            ui.label("I am a:");
            egui::ComboBox::from_id_salt("register_role")
                .selected_text(form.role.as_str())
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut form.role, Role::Farmer, "farmer");
                    ui.selectable_value(&mut form.role, Role::Importer, "importer");
                });
            ui.end_row();

            ui.label("Country:");
            egui::ComboBox::from_id_salt("register_country")
                .selected_text(if form.country.is_empty() {
                    "Select"
                } else {
                    &form.country
                })
                .show_ui(ui, |ui| {
                    for country in COUNTRIES {
                        ui.selectable_value(
                            &mut form.country,
                            (*country).to_owned(),
                            *country,
                        );
                    }
                });
            ui.end_row();

            ui.label("Password:");
            ui.add(egui::TextEdit::singleline(&mut form.password).password(true));
            ui.end_row();

            ui.label("Confirm password:");
            ui.add(egui::TextEdit::singleline(&mut form.confirm_password).password(true));
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
            .add_enabled(!flow.status.is_pending(), egui::Button::new("Create account"))
            .clicked()
        {
            submit = true;
        }
        if flow.status.is_pending() {
            ui.spinner();
        }
    });

    ui.add_space(8.0);
    if ui.link("Already registered? Sign in").clicked() {
        ctx.update_state::<Route>(|route| *route = Route::Login);
    }

    if submit {
        ctx.dispatch::<SignUpCommand>();
    }
}
