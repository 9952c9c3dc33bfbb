use agrilink_business::{
    FetchInboxCommand, FetchMyProductsCommand, FlowStatus, InboxCompute, MyProductsCompute, Product,
    ProfileFlow, ProfileForm, Remote, Role, Route, SessionCompute, UpdateProfileCommand,
    delete_my_product, format_relative_time,
};
use agrilink_states::{StateCtx, Time};
use egui::{Color32, RichText, Ui};

use crate::state::State;
use crate::widgets::{role_badge, status_badge};

pub fn profile(state: &mut State, ui: &mut Ui) {
    let ctx = &mut state.ctx;
    let session = ctx.cached::<SessionCompute>().cloned().unwrap_or_default();

    if session.loading {
        ui.spinner();
        return;
    }
    let Some(user) = session.user else {
        ui.label("Sign in to manage your profile.");
        if ui.link("Go to sign in").clicked() {
            ctx.update_state::<Route>(|route| *route = Route::Login);
        }
        return;
    };

    ui.heading("My Profile");
    ui.add_space(4.0);
    ui.horizontal(|ui| {
        ui.label(RichText::new(&user.email).color(Color32::GRAY));
        role_badge(ui, user.role);
    });
    ui.add_space(8.0);

    // First visit with an untouched form: start from the stored profile.
    let untouched = ctx
        .state_ref::<ProfileForm>()
        .is_some_and(|form| form.full_name.is_empty() && form.country.is_empty());
    if untouched {
        ctx.update_state::<ProfileForm>(|form| *form = ProfileForm::from_profile(&user));
    }

    let mut save = false;
    ctx.update_state::<ProfileForm>(|form| {
        egui::Grid::new("profile_form").num_columns(2).show(ui, |ui| {
            ui.label("Full name:");
            ui.text_edit_singleline(&mut form.full_name);
            ui.end_row();
            ui.label("Country:");
            ui.text_edit_singleline(&mut form.country);
            ui.end_row();
            ui.label("Phone:");
            ui.text_edit_singleline(&mut form.phone);
            ui.end_row();
            ui.label("Company:");
            ui.text_edit_singleline(&mut form.company_name);
            ui.end_row();
        });
    });

    let flow = ctx.cached::<ProfileFlow>().cloned().unwrap_or_default();
    match &flow.status {
        FlowStatus::Failed(message) => {
            ui.add_space(4.0);
            ui.label(RichText::new(message).color(Color32::from_rgb(220, 53, 69)));
        }
        FlowStatus::Succeeded => {
            ui.add_space(4.0);
            ui.label(RichText::new("Profile saved").color(Color32::from_rgb(34, 139, 34)));
        }
        FlowStatus::Idle | FlowStatus::Pending => {}
    }

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        if ui
            .add_enabled(!flow.status.is_pending(), egui::Button::new("Save"))
            .clicked()
        {
            save = true;
        }
        if flow.status.is_pending() {
            ui.spinner();
        }
        if ui.button("Reset").clicked() {
            ctx.updater().set(ProfileForm::from_profile(&user));
            ctx.updater().set(ProfileFlow::default());
        }
    });

    if save {
        ctx.dispatch::<UpdateProfileCommand>();
    }

    if user.role == Role::Farmer {
        ui.add_space(12.0);
        ui.separator();
        my_listings(ctx, ui);
    }

    ui.add_space(12.0);
    ui.separator();
    inbox(ctx, ui);
}

fn my_listings(ctx: &mut StateCtx, ui: &mut Ui) {
    if ctx
        .cached::<MyProductsCompute>()
        .is_some_and(|cache| cache.result.is_idle())
    {
        ctx.dispatch::<FetchMyProductsCommand>();
    }

    ui.heading("My Listings");
    let cache = ctx.cached::<MyProductsCompute>().cloned().unwrap_or_default();
    match &cache.result {
        Remote::Idle | Remote::Pending => {
            ui.spinner();
            return;
        }
        Remote::Failed(message) => {
            ui.label(RichText::new(message).color(Color32::from_rgb(220, 53, 69)));
            if ui.button("Retry").clicked() {
                ctx.dispatch::<FetchMyProductsCommand>();
            }
            return;
        }
        Remote::Ready(products) if products.is_empty() => {
            ui.label(RichText::new("No listings yet").color(Color32::GRAY).italics());
            return;
        }
        Remote::Ready(_) => {}
    }

    let mut delete: Option<Product> = None;
    for product in cache.records() {
        ui.horizontal(|ui| {
            ui.label(RichText::new(&product.title).strong());
            ui.monospace(format!(
                "{:.2} {} / {}",
                product.price_per_unit, product.currency, product.unit
            ));
            status_badge(ui, product.is_approved);
            if ui.button("Delete").clicked() {
                delete = Some(product.clone());
            }
        });
    }
    if let Some(product) = delete {
        delete_my_product(ctx, &product);
    }
}

fn inbox(ctx: &mut StateCtx, ui: &mut Ui) {
    if ctx
        .cached::<InboxCompute>()
        .is_some_and(|cache| cache.result.is_idle())
    {
        ctx.dispatch::<FetchInboxCommand>();
    }

    ui.heading("Inbox");
    let cache = ctx.cached::<InboxCompute>().cloned().unwrap_or_default();
    let now = ctx
        .state_ref::<Time>()
        .map(|time| *time.as_ref())
        .unwrap_or_default();
    match &cache.result {
        Remote::Idle | Remote::Pending => {
            ui.spinner();
        }
        Remote::Failed(message) => {
            ui.label(RichText::new(message).color(Color32::from_rgb(220, 53, 69)));
            if ui.button("Retry").clicked() {
                ctx.dispatch::<FetchInboxCommand>();
            }
        }
        Remote::Ready(messages) if messages.is_empty() => {
            ui.label(RichText::new("No messages yet").color(Color32::GRAY).italics());
        }
        Remote::Ready(messages) => {
            for message in messages {
                ui.label(
                    RichText::new(format_relative_time(message.created_at, now))
                        .color(Color32::GRAY)
                        .small(),
                );
                ui.label(&message.content);
                ui.add_space(6.0);
            }
        }
    }
}
