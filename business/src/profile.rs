//! Profile page data: the edit form and its save command, a farmer's own
//! listings with delete, and the message inbox.
//!
//! The save command patches the `users` row and refreshes the session
//! binding from the echoed row.

use std::any::Any;

use agrilink_states::{
    Command, Compute, ComputeDeps, ComputeStage, Dep, State, StateCtx, Updater, assign_impl,
};
use log::{error, warn};

use crate::auth::FlowStatus;
use crate::models::{Message, Product, UserProfile};
use crate::query::{Direction, Query, row, rows};
use crate::remote::Remote;
use crate::session::{SessionCompute, SessionStore};
use crate::{FetchState, MarketConfig};

/// Editable profile fields.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub full_name: String,
    pub country: String,
    pub phone: String,
    pub company_name: String,
}

impl ProfileForm {
    /// Seeds the form from the signed-in profile.
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            full_name: profile.full_name.clone(),
            country: profile.country.clone(),
            phone: profile.phone.clone().unwrap_or_default(),
            company_name: profile.company_name.clone().unwrap_or_default(),
        }
    }
}

impl State for ProfileForm {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// Where the last save attempt stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFlow {
    pub status: FlowStatus,
}

impl Compute for ProfileFlow {
    fn deps(&self) -> ComputeDeps {
        (&[], &[])
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) -> ComputeStage {
        ComputeStage::Finished
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// Saves [`ProfileForm`] to the `users` row of the signed-in user.
#[derive(Debug, Default)]
pub struct UpdateProfileCommand;

impl Command for UpdateProfileCommand {
    fn run(&self, deps: Dep<'_>, updater: Updater) {
        let session = deps.get_compute_ref::<SessionCompute>();
        let Some(user) = session.user.clone() else {
            warn!("profile update without a signed-in user");
            return;
        };
        updater.set(ProfileFlow {
            status: FlowStatus::Pending,
        });

        let form = deps.get_state_ref::<ProfileForm>();
        let changes = serde_json::json!({
            "full_name": form.full_name,
            "country": form.country,
            "phone": blank_to_null(&form.phone),
            "company_name": blank_to_null(&form.company_name),
        });
        let config = deps.get_state_ref::<MarketConfig>();
        let store = deps.get_state_ref::<SessionStore>();
        let request = Query::from("users")
            .update(changes)
            .eq("id", &user.id)
            .single()
            .build(config, store.access_token());

        deps.get_state_ref::<FetchState>().fetch(
            request,
            Box::new(move |result| match row::<UserProfile>(result) {
                Ok(mut profile) => {
                    profile.email = user.email;
                    updater.set(SessionCompute {
                        user: Some(profile),
                        loading: false,
                    });
                    updater.set(ProfileFlow {
                        status: FlowStatus::Succeeded,
                    });
                }
                Err(err) => {
                    warn!("profile update failed: {err}");
                    updater.set(ProfileFlow {
                        status: FlowStatus::Failed(err.to_string()),
                    });
                }
            }),
        );
    }
}

/// A farmer's own listings, approved or not, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MyProductsCompute {
    pub result: Remote<Vec<Product>>,
}

impl MyProductsCompute {
    pub fn records(&self) -> &[Product] {
        self.result.value().map(Vec::as_slice).unwrap_or_default()
    }
}

impl Compute for MyProductsCompute {
    fn deps(&self) -> ComputeDeps {
        (&[], &[])
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) -> ComputeStage {
        ComputeStage::Finished
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// Loads the signed-in farmer's listings into [`MyProductsCompute`].
#[derive(Debug, Default)]
pub struct FetchMyProductsCommand;

impl Command for FetchMyProductsCommand {
    fn run(&self, deps: Dep<'_>, updater: Updater) {
        let session = deps.get_compute_ref::<SessionCompute>();
        let Some(user) = session.user.clone() else {
            warn!("own-listings fetch without a signed-in user");
            return;
        };
        updater.set(MyProductsCompute {
            result: Remote::Pending,
        });
        let config = deps.get_state_ref::<MarketConfig>();
        let store = deps.get_state_ref::<SessionStore>();
        let request = Query::from("products")
            .select("*")
            .eq("farmer_id", &user.id)
            .order("created_at", Direction::Descending)
            .build(config, store.access_token());
        deps.get_state_ref::<FetchState>().fetch(
            request,
            Box::new(move |result| match rows::<Product>(result) {
                Ok(products) => updater.set(MyProductsCompute {
                    result: Remote::Ready(products),
                }),
                Err(err) => {
                    warn!("own-listings fetch failed: {err}");
                    updater.set(MyProductsCompute {
                        result: Remote::Failed(err.to_string()),
                    });
                }
            }),
        );
    }
}

/// Removes one of the farmer's own listings, then drops it from the cache
/// once the backend confirms the delete.
pub fn delete_my_product(ctx: &StateCtx, product: &Product) {
    let (Some(config), Some(store), Some(fetch)) = (
        ctx.state_ref::<MarketConfig>(),
        ctx.state_ref::<SessionStore>(),
        ctx.state_ref::<FetchState>(),
    ) else {
        return;
    };
    let request = Query::from("products")
        .delete()
        .eq("id", &product.id)
        .build(config, store.access_token());
    let mut records = ctx
        .cached::<MyProductsCompute>()
        .map(|cache| cache.records().to_vec())
        .unwrap_or_default();
    let id = product.id.clone();
    let updater = ctx.updater();
    fetch.fetch(
        request,
        Box::new(move |result| match result {
            Ok(response) if response.ok => {
                records.retain(|record| record.id != id);
                updater.set(MyProductsCompute {
                    result: Remote::Ready(records),
                });
            }
            Ok(response) => error!("listing delete failed with status {}", response.status),
            Err(err) => error!("listing delete failed: {err}"),
        }),
    );
}

/// Messages addressed to the signed-in user, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboxCompute {
    pub result: Remote<Vec<Message>>,
}

impl InboxCompute {
    pub fn records(&self) -> &[Message] {
        self.result.value().map(Vec::as_slice).unwrap_or_default()
    }
}

impl Compute for InboxCompute {
    fn deps(&self) -> ComputeDeps {
        (&[], &[])
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) -> ComputeStage {
        ComputeStage::Finished
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// Loads the signed-in user's received messages into [`InboxCompute`].
#[derive(Debug, Default)]
pub struct FetchInboxCommand;

impl Command for FetchInboxCommand {
    fn run(&self, deps: Dep<'_>, updater: Updater) {
        let session = deps.get_compute_ref::<SessionCompute>();
        let Some(user) = session.user.clone() else {
            warn!("inbox fetch without a signed-in user");
            return;
        };
        updater.set(InboxCompute {
            result: Remote::Pending,
        });
        let config = deps.get_state_ref::<MarketConfig>();
        let store = deps.get_state_ref::<SessionStore>();
        let request = Query::from("messages")
            .select("*")
            .eq("receiver_id", &user.id)
            .order("created_at", Direction::Descending)
            .build(config, store.access_token());
        deps.get_state_ref::<FetchState>().fetch(
            request,
            Box::new(move |result| match rows::<Message>(result) {
                Ok(messages) => updater.set(InboxCompute {
                    result: Remote::Ready(messages),
                }),
                Err(err) => {
                    warn!("inbox fetch failed: {err}");
                    updater.set(InboxCompute {
                        result: Remote::Failed(err.to_string()),
                    });
                }
            }),
        );
    }
}

fn blank_to_null(value: &str) -> serde_json::Value {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::Value::String(trimmed.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo_user;

    #[test]
    fn form_seeds_from_profile() {
        let form = ProfileForm::from_profile(&demo_user());
        assert_eq!(form.full_name, "Demo User");
        assert_eq!(form.company_name, "AgriLink Demo");
        assert_eq!(form.phone, "");
    }

    #[test]
    fn blank_optional_fields_become_null() {
        assert_eq!(blank_to_null("  "), serde_json::Value::Null);
        assert_eq!(
            blank_to_null(" +20 100 "),
            serde_json::Value::String("+20 100".to_owned())
        );
    }
}
