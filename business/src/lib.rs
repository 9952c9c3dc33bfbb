//! Domain logic for the AgriLink marketplace client.
//!
//! Everything here is backend-agnostic UI plumbing: states and computes for
//! session resolution, listings, admin management and messaging, plus the
//! query builder for the hosted table API. Rendering lives in `agrilink-ui`.

mod admin;
mod auth;
mod config;
mod demo;
mod fetch;
mod listings;
mod messages;
mod models;
mod profile;
mod query;
mod remote;
mod route;
mod session;

#[cfg(test)]
mod tests;

pub use admin::{
    AdminProductsCompute, AdminStats, FetchAdminProductsCommand, FetchMessagesCommand,
    FetchUsersCommand, MessagesCompute, UsersCompute, approve_product, delete_product, delete_user,
    reject_product,
};
pub use auth::{
    FlowStatus, LoginFlow, LoginForm, RegisterFlow, RegisterForm, SignInCommand, SignOutCommand,
    SignUpCommand, oauth_authorize_url,
};
pub use config::MarketConfig;
pub use demo::demo_user;
pub use fetch::{EhttpFetcher, FetchState};
#[cfg(any(test, feature = "test-utils"))]
pub use fetch::{MockFetcher, RecordedRequest, json_response, status_response};
pub use listings::{
    CATEGORIES, COUNTRIES, FetchListingsCommand, ListingFilters, ListingsCompute, SelectedListing,
    SellerCompute, close_listing, open_listing,
};
pub use messages::{
    MessageDraft, MessageThread, close_thread, format_relative_time, open_thread, send_message,
};
pub use models::{Message, Product, Role, Session, SessionMetadata, SessionUser, UserProfile};
pub use profile::{
    FetchInboxCommand, FetchMyProductsCommand, InboxCompute, MyProductsCompute, ProfileFlow,
    ProfileForm, UpdateProfileCommand, delete_my_product,
};
pub use query::{Direction, Query, QueryError, row, rows};
pub use route::Route;
pub use session::{
    PROFILE_LOOKUP_MAX_ATTEMPTS, PendingLookup, ProfileLookup, ProfileSync, ResolveSessionCommand,
    SessionCompute,
    SessionEvent, SessionNotifier, SessionStore, SessionSubscription, apply_session_event,
    poll_session_events,
};

pub use remote::Remote;
