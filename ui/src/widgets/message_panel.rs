//! Modal conversation window for the open message thread.

use agrilink_business::{
    MessageDraft, MessageThread, Product, Remote, SessionCompute, close_thread, format_relative_time,
    send_message,
};
use agrilink_states::{StateCtx, Time};
use egui::{Align2, Color32, RichText, Vec2};

pub fn message_panel(ctx: &mut StateCtx, egui_ctx: &egui::Context, product: &Product) {
    let thread = ctx.cached::<MessageThread>().cloned().unwrap_or_default();
    let now = ctx
        .state_ref::<Time>()
        .map(|time| *time.as_ref())
        .unwrap_or_default();
    let own_id = ctx
        .cached::<SessionCompute>()
        .and_then(|session| session.user.as_ref().map(|user| user.id.clone()))
        .unwrap_or_default();

    let mut close = false;
    let mut send = false;

    egui::Window::new(format!("Messages · {}", product.title))
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
        .show(egui_ctx, |ui| {
            match &thread.result {
                Remote::Idle | Remote::Pending => {
                    ui.spinner();
                }
                Remote::Failed(message) => {
                    ui.label(RichText::new(message).color(Color32::from_rgb(220, 53, 69)));
                }
                Remote::Ready(messages) if messages.is_empty() => {
                    ui.label(RichText::new("No messages yet").color(Color32::GRAY).italics());
                }
                Remote::Ready(messages) => {
                    egui::ScrollArea::vertical().max_height(240.0).show(ui, |ui| {
                        for message in messages {
                            let mine = message.sender_id == own_id;
                            let heading = if mine { "You" } else { "Seller" };
                            ui.label(
                                RichText::new(format!(
                                    "{heading} · {}",
                                    format_relative_time(message.created_at, now)
                                ))
                                .color(Color32::GRAY)
                                .small(),
                            );
                            ui.label(&message.content);
                            ui.add_space(6.0);
                        }
                    });
                }
            }

            ui.separator();
            ui.horizontal(|ui| {
                ctx.update_state::<MessageDraft>(|draft| {
                    ui.text_edit_singleline(&mut draft.content);
                });
                let has_draft = ctx
                    .state_ref::<MessageDraft>()
                    .is_some_and(|draft| !draft.content.trim().is_empty());
                if ui.add_enabled(has_draft, egui::Button::new("Send")).clicked() {
                    send = true;
                }
                if ui.button("Close").clicked() {
                    close = true;
                }
            });
        });

    if send {
        send_message(ctx, product);
    }
    if close {
        close_thread(ctx);
    }
}
