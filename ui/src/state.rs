use agrilink_business::{
    AdminProductsCompute, AdminStats, FetchState, InboxCompute, ListingFilters, ListingsCompute,
    LoginFlow, LoginForm, MarketConfig, MessageDraft, MessageThread, MessagesCompute,
    MyProductsCompute, ProfileFlow, ProfileForm, ProfileLookup, ProfileSync, RegisterFlow,
    RegisterForm, ResolveSessionCommand, Route, SelectedListing, SellerCompute, SessionCompute,
    SessionNotifier, SessionStore, SessionSubscription, UsersCompute,
};
use agrilink_states::{StateCtx, Time};

/// The main application state.
///
/// Holds the business [`StateCtx`] plus the session feed subscription the
/// frame loop drains, and the purely visual state of the record tables.
pub struct State {
    /// The state context for business logic.
    pub ctx: StateCtx,
    /// Receiving end of the session change feed.
    pub session_events: SessionSubscription,
    /// Sort and page positions of the admin tables.
    pub tables: crate::widgets::AdminTablesState,
}

fn register(ctx: &mut StateCtx, config: MarketConfig, fetch: FetchState) {
    ctx.add_state(Time::default());
    ctx.add_state(config);
    ctx.add_state(fetch);
    ctx.add_state(Route::default());
    ctx.add_state(SessionStore::default());
    ctx.add_state(ProfileLookup::default());
    ctx.add_state(SessionNotifier::default());
    ctx.add_state(LoginForm::default());
    ctx.add_state(RegisterForm::default());
    ctx.add_state(ProfileForm::default());
    ctx.add_state(ListingFilters::default());
    ctx.add_state(SelectedListing::default());
    ctx.add_state(MessageDraft::default());

    ctx.record_compute(SessionCompute::default());
    ctx.record_compute(ProfileSync::default());
    ctx.record_compute(LoginFlow::default());
    ctx.record_compute(RegisterFlow::default());
    ctx.record_compute(ProfileFlow::default());
    ctx.record_compute(ListingsCompute::default());
    ctx.record_compute(SellerCompute::default());
    ctx.record_compute(MyProductsCompute::default());
    ctx.record_compute(InboxCompute::default());
    ctx.record_compute(UsersCompute::default());
    ctx.record_compute(AdminProductsCompute::default());
    ctx.record_compute(MessagesCompute::default());
    ctx.record_compute(MessageThread::default());
    ctx.record_compute(AdminStats::default());
}

impl Default for State {
    fn default() -> Self {
        Self::with_config(MarketConfig::default(), FetchState::default())
    }
}

impl State {
    pub fn with_config(config: MarketConfig, fetch: FetchState) -> Self {
        let mut ctx = StateCtx::new();
        register(&mut ctx, config, fetch);

        let session_events = ctx
            .state_ref::<SessionNotifier>()
            .map(SessionNotifier::subscribe)
            .expect("SessionNotifier was just registered");

        ctx.dispatch::<ResolveSessionCommand>();

        Self {
            ctx,
            session_events,
            tables: crate::widgets::AdminTablesState::default(),
        }
    }
}
