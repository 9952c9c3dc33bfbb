//! Admin dashboard data: caches of every user, product and message, the
//! derived stat counters, and the moderation actions.
//!
//! Moderation follows persist-then-refresh: the mutation goes out first and
//! the local cache is only rewritten once the backend confirms it. A failed
//! call leaves the table untouched.

use std::any::{Any, TypeId};

use agrilink_states::{
    Command, Compute, ComputeDeps, ComputeStage, Dep, StateCtx, Updater, assign_impl,
};
use log::{error, warn};

use crate::models::{Message, Product, UserProfile};
use crate::query::{Direction, Query, rows};
use crate::remote::Remote;
use crate::session::SessionStore;
use crate::{FetchState, MarketConfig};

macro_rules! table_cache {
    ($name:ident, $record:ty) => {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            pub result: Remote<Vec<$record>>,
        }

        impl $name {
            pub fn records(&self) -> &[$record] {
                self.result.value().map(Vec::as_slice).unwrap_or_default()
            }
        }

        impl Compute for $name {
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
    };
}

table_cache!(UsersCompute, UserProfile);
table_cache!(AdminProductsCompute, Product);
table_cache!(MessagesCompute, Message);

macro_rules! fetch_table_command {
    ($name:ident, $cache:ident, $record:ty, $table:literal) => {
        #[derive(Debug, Default)]
        pub struct $name;

        impl Command for $name {
            fn run(&self, deps: Dep<'_>, updater: Updater) {
                updater.set($cache {
                    result: Remote::Pending,
                });
                let config = deps.get_state_ref::<MarketConfig>();
                let store = deps.get_state_ref::<SessionStore>();
                let request = Query::from($table)
                    .select("*")
                    .order("created_at", Direction::Descending)
                    .build(config, store.access_token());
                deps.get_state_ref::<FetchState>().fetch(
                    request,
                    Box::new(move |result| match rows::<$record>(result) {
                        Ok(records) => updater.set($cache {
                            result: Remote::Ready(records),
                        }),
                        Err(err) => {
                            warn!(concat!($table, " fetch failed: {}"), err);
                            updater.set($cache {
                                result: Remote::Failed(err.to_string()),
                            });
                        }
                    }),
                );
            }
        }
    };
}

fetch_table_command!(FetchUsersCommand, UsersCompute, UserProfile, "users");
fetch_table_command!(
    FetchAdminProductsCommand,
    AdminProductsCompute,
    Product,
    "products"
);
fetch_table_command!(FetchMessagesCommand, MessagesCompute, Message, "messages");

/// Headline counters at the top of the dashboard, derived from the three
/// table caches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminStats {
    pub total_users: usize,
    pub total_products: usize,
    pub pending_products: usize,
    pub total_messages: usize,
}

impl AdminStats {
    fn derive(
        users: &UsersCompute,
        products: &AdminProductsCompute,
        messages: &MessagesCompute,
    ) -> Self {
        let pending_products = products
            .records()
            .iter()
            .filter(|product| !product.is_approved)
            .count();
        Self {
            total_users: users.records().len(),
            total_products: products.records().len(),
            pending_products,
            total_messages: messages.records().len(),
        }
    }
}

impl Compute for AdminStats {
    fn deps(&self) -> ComputeDeps {
        const COMPUTE_IDS: [TypeId; 3] = [
            TypeId::of::<UsersCompute>(),
            TypeId::of::<AdminProductsCompute>(),
            TypeId::of::<MessagesCompute>(),
        ];
        (&[], &COMPUTE_IDS)
    }

    fn compute(&self, deps: Dep<'_>, updater: Updater) -> ComputeStage {
        let stats = Self::derive(
            deps.get_compute_ref::<UsersCompute>(),
            deps.get_compute_ref::<AdminProductsCompute>(),
            deps.get_compute_ref::<MessagesCompute>(),
        );
        updater.set(stats);
        ComputeStage::Pending
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

fn moderation_request(ctx: &StateCtx, query: &Query) -> Option<ehttp::Request> {
    let config = ctx.state_ref::<MarketConfig>()?;
    let token = ctx
        .state_ref::<SessionStore>()
        .and_then(SessionStore::access_token);
    Some(query.build(config, token))
}

pub fn approve_product(ctx: &StateCtx, product: &Product) {
    let query = Query::from("products")
        .update(serde_json::json!({ "is_approved": true }))
        .eq("id", &product.id);
    let Some(request) = moderation_request(ctx, &query) else {
        return;
    };
    let Some(fetch) = ctx.state_ref::<FetchState>() else {
        return;
    };
    let mut records = ctx
        .cached::<AdminProductsCompute>()
        .map(|cache| cache.records().to_vec())
        .unwrap_or_default();
    let id = product.id.clone();
    let updater = ctx.updater();
    fetch.fetch(
        request,
        Box::new(move |result| match rows::<Product>(result) {
            Ok(_) => {
                for record in &mut records {
                    if record.id == id {
                        record.is_approved = true;
                    }
                }
                updater.set(AdminProductsCompute {
                    result: Remote::Ready(records),
                });
            }
            Err(err) => error!("product approval update failed: {err}"),
        }),
    );
}

/// Rejection removes the listing outright rather than leaving it pending.
pub fn reject_product(ctx: &StateCtx, product: &Product) {
    delete_product(ctx, product);
}

pub fn delete_product(ctx: &StateCtx, product: &Product) {
    let query = Query::from("products").delete().eq("id", &product.id);
    let Some(request) = moderation_request(ctx, &query) else {
        return;
    };
    let Some(fetch) = ctx.state_ref::<FetchState>() else {
        return;
    };
    let mut records = ctx
        .cached::<AdminProductsCompute>()
        .map(|cache| cache.records().to_vec())
        .unwrap_or_default();
    let id = product.id.clone();
    let updater = ctx.updater();
    fetch.fetch(
        request,
        Box::new(move |result| match result {
            Ok(response) if response.ok => {
                records.retain(|record| record.id != id);
                updater.set(AdminProductsCompute {
                    result: Remote::Ready(records),
                });
            }
            Ok(response) => error!("product delete failed with status {}", response.status),
            Err(err) => error!("product delete failed: {err}"),
        }),
    );
}

pub fn delete_user(ctx: &StateCtx, user: &UserProfile) {
    let query = Query::from("users").delete().eq("id", &user.id);
    let Some(request) = moderation_request(ctx, &query) else {
        return;
    };
    let Some(fetch) = ctx.state_ref::<FetchState>() else {
        return;
    };
    let mut records = ctx
        .cached::<UsersCompute>()
        .map(|cache| cache.records().to_vec())
        .unwrap_or_default();
    let id = user.id.clone();
    let updater = ctx.updater();
    fetch.fetch(
        request,
        Box::new(move |result| match result {
            Ok(response) if response.ok => {
                records.retain(|record| record.id != id);
                updater.set(UsersCompute {
                    result: Remote::Ready(records),
                });
            }
            Ok(response) => error!("user delete failed with status {}", response.status),
            Err(err) => error!("user delete failed: {err}"),
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: &str, approved: bool) -> Product {
        Product {
            id: id.to_owned(),
            farmer_id: "f-1".to_owned(),
            title: id.to_owned(),
            description: String::new(),
            price_per_unit: 1.0,
            currency: "USD".to_owned(),
            unit: "kg".to_owned(),
            quantity_available: 1.0,
            category: "Grains".to_owned(),
            country: "Kenya".to_owned(),
            images: Vec::new(),
            is_approved: approved,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn stats_count_pending_products() {
        let products = AdminProductsCompute {
            result: Remote::Ready(vec![product("a", true), product("b", false), product("c", false)]),
        };
        let stats = AdminStats::derive(&UsersCompute::default(), &products, &MessagesCompute::default());
        assert_eq!(stats.total_products, 3);
        assert_eq!(stats.pending_products, 2);
        assert_eq!(stats.total_users, 0);
    }

    #[test]
    fn stats_on_unfetched_caches_are_zero() {
        let stats = AdminStats::derive(
            &UsersCompute::default(),
            &AdminProductsCompute::default(),
            &MessagesCompute::default(),
        );
        assert_eq!(stats, AdminStats::default());
    }
}
