//! Small colored pills for roles and approval status.

use agrilink_business::Role;
use egui::{Color32, RichText, Ui};

fn badge(ui: &mut Ui, text: &str, fill: Color32) {
    egui::Frame::NONE
        .fill(fill)
        .inner_margin(egui::Margin::symmetric(6, 2))
        .corner_radius(4.0)
        .show(ui, |ui| {
            ui.label(RichText::new(text).color(Color32::WHITE).small());
        });
}

pub fn role_badge(ui: &mut Ui, role: Role) {
    let fill = match role {
        Role::Farmer => Color32::from_rgb(34, 139, 34),
        Role::Importer => Color32::from_rgb(30, 100, 200),
        Role::Admin => Color32::from_rgb(120, 60, 180),
    };
    badge(ui, role.as_str(), fill);
}

pub fn status_badge(ui: &mut Ui, approved: bool) {
    if approved {
        badge(ui, "approved", Color32::from_rgb(34, 139, 34));
    } else {
        badge(ui, "pending", Color32::from_rgb(200, 140, 20));
    }
}

pub fn banned_badge(ui: &mut Ui, banned: bool) {
    if banned {
        badge(ui, "banned", Color32::from_rgb(200, 50, 50));
    } else {
        badge(ui, "active", Color32::from_rgb(34, 139, 34));
    }
}
