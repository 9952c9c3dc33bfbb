use agrilink_business::{Route, SessionCompute, poll_session_events};
use agrilink_states::Time;
use chrono::Utc;

use crate::{pages, state::State, widgets};

pub struct AgriLinkApp {
    state: State,
}

impl AgriLinkApp {
    /// Called once before the first frame.
    pub fn new(state: State) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }
}

impl eframe::App for AgriLinkApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let state = &mut self.state;

        // Advance the virtual clock, then apply everything that arrived
        // since the last frame before anything reads the context.
        state.ctx.update_state::<Time>(|time| *time.as_mut() = Utc::now());
        poll_session_events(&state.ctx, &state.session_events);
        state.ctx.sync_computes();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                widgets::top_nav(&mut state.ctx, ui);
            });
        });

        let mut route = state
            .ctx
            .state_ref::<Route>()
            .copied()
            .unwrap_or_default();
        let session = state
            .ctx
            .cached::<SessionCompute>()
            .cloned()
            .unwrap_or_default();
        if route.requires_auth() && !session.loading && session.user.is_none() {
            route = Route::Login;
            state.ctx.update_state::<Route>(|route| *route = Route::Login);
        }
        egui::CentralPanel::default().show(ctx, |ui| match route {
            Route::Listings => pages::listings(state, ui),
            Route::Login => pages::login(state, ui),
            Route::Register => pages::register(state, ui),
            Route::Profile => pages::profile(state, ui),
            Route::Admin => pages::admin(state, ui),
        });

        // Run background jobs
        state.ctx.run_computed();

        // Retry backoff and relative timestamps depend on wall time.
        ctx.request_repaint_after(std::time::Duration::from_millis(500));
    }
}
