//! Public produce listings: the approved-products cache, the client-side
//! filters the browse page applies on top of it, and the detail view of a
//! single listing with its seller profile.

use std::any::Any;

use agrilink_states::{
    Command, Compute, ComputeDeps, ComputeStage, Dep, State, StateCtx, Updater, assign_impl,
};
use log::warn;

use crate::models::{Product, UserProfile};
use crate::query::{Direction, Query, row, rows};
use crate::remote::Remote;
use crate::session::SessionStore;
use crate::{FetchState, MarketConfig};

pub const CATEGORIES: &[&str] = &["Fruits", "Vegetables", "Grains", "Oils", "Spices", "Nuts"];

pub const COUNTRIES: &[&str] = &[
    "Egypt",
    "Morocco",
    "Ghana",
    "Kenya",
    "Nigeria",
    "UAE",
    "Saudi Arabia",
    "Qatar",
];

/// Cache of approved listings, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingsCompute {
    pub result: Remote<Vec<Product>>,
}

impl Compute for ListingsCompute {
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

#[derive(Debug, Default)]
pub struct FetchListingsCommand;

impl Command for FetchListingsCommand {
    fn run(&self, deps: Dep<'_>, updater: Updater) {
        updater.set(ListingsCompute {
            result: Remote::Pending,
        });
        let config = deps.get_state_ref::<MarketConfig>();
        let store = deps.get_state_ref::<SessionStore>();
        let request = Query::from("products")
            .select("*")
            .eq("is_approved", "true")
            .order("created_at", Direction::Descending)
            .build(config, store.access_token());
        deps.get_state_ref::<FetchState>().fetch(
            request,
            Box::new(move |result| match rows::<Product>(result) {
                Ok(products) => updater.set(ListingsCompute {
                    result: Remote::Ready(products),
                }),
                Err(err) => {
                    warn!("listings fetch failed: {err}");
                    updater.set(ListingsCompute {
                        result: Remote::Failed(err.to_string()),
                    });
                }
            }),
        );
    }
}

/// Which listing's detail view is open, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedListing {
    pub product_id: Option<String>,
}

impl State for SelectedListing {
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

/// Profile of the farmer behind the open listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SellerCompute {
    pub result: Remote<UserProfile>,
}

impl Compute for SellerCompute {
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

/// Opens the detail view for `product` and fetches its seller's profile.
pub fn open_listing(ctx: &StateCtx, product: &Product) {
    let updater = ctx.updater();
    updater.set(SelectedListing {
        product_id: Some(product.id.clone()),
    });
    updater.set(SellerCompute {
        result: Remote::Pending,
    });
    let (Some(config), Some(store), Some(fetch)) = (
        ctx.state_ref::<MarketConfig>(),
        ctx.state_ref::<SessionStore>(),
        ctx.state_ref::<FetchState>(),
    ) else {
        return;
    };
    let request = Query::from("users")
        .select("*")
        .eq("id", &product.farmer_id)
        .single()
        .build(config, store.access_token());
    fetch.fetch(
        request,
        Box::new(move |result| match row::<UserProfile>(result) {
            Ok(seller) => updater.set(SellerCompute {
                result: Remote::Ready(seller),
            }),
            Err(err) => {
                warn!("seller profile fetch failed: {err}");
                updater.set(SellerCompute {
                    result: Remote::Failed(err.to_string()),
                });
            }
        }),
    );
}

pub fn close_listing(ctx: &StateCtx) {
    ctx.updater().set(SelectedListing::default());
    ctx.updater().set(SellerCompute::default());
}

/// What the browse page is filtering by. Applied client-side over the
/// cached listings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilters {
    pub search: String,
    pub category: Option<String>,
    pub country: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

impl ListingFilters {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn matches(&self, product: &Product) -> bool {
        if !self.search.is_empty() {
            let needle = self.search.to_lowercase();
            if !product.title.to_lowercase().contains(&needle)
                && !product.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(category) = &self.category
            && product.category != *category
        {
            return false;
        }
        if let Some(country) = &self.country
            && product.country != *country
        {
            return false;
        }
        if let Some(min) = self.price_min
            && product.price_per_unit < min
        {
            return false;
        }
        if let Some(max) = self.price_max
            && product.price_per_unit > max
        {
            return false;
        }
        true
    }

    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|product| self.matches(product)).collect()
    }
}

impl State for ListingFilters {
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(title: &str, category: &str, country: &str, price: f64) -> Product {
        Product {
            id: title.to_owned(),
            farmer_id: "f-1".to_owned(),
            title: title.to_owned(),
            description: String::new(),
            price_per_unit: price,
            currency: "USD".to_owned(),
            unit: "kg".to_owned(),
            quantity_available: 100.0,
            category: category.to_owned(),
            country: country.to_owned(),
            images: Vec::new(),
            is_approved: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_filters_keep_everything() {
        let products = vec![
            product("Dates", "Fruits", "Egypt", 4.0),
            product("Olive Oil", "Oils", "Morocco", 12.0),
        ];
        assert_eq!(ListingFilters::default().apply(&products).len(), 2);
    }

    #[test]
    fn search_is_case_insensitive() {
        let products = vec![
            product("Medjool Dates", "Fruits", "Egypt", 4.0),
            product("Olive Oil", "Oils", "Morocco", 12.0),
        ];
        let filters = ListingFilters {
            search: "dates".to_owned(),
            ..Default::default()
        };
        let filtered = filters.apply(&products);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "Medjool Dates");
    }

    #[test]
    fn price_range_is_inclusive() {
        let products = vec![
            product("Cheap", "Grains", "Kenya", 1.0),
            product("Mid", "Grains", "Kenya", 5.0),
            product("Dear", "Grains", "Kenya", 9.0),
        ];
        let filters = ListingFilters {
            price_min: Some(1.0),
            price_max: Some(5.0),
            ..Default::default()
        };
        let filtered = filters.apply(&products);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn category_and_country_combine() {
        let products = vec![
            product("Dates", "Fruits", "Egypt", 4.0),
            product("Mangoes", "Fruits", "Kenya", 3.0),
            product("Millet", "Grains", "Kenya", 2.0),
        ];
        let filters = ListingFilters {
            category: Some("Fruits".to_owned()),
            country: Some("Kenya".to_owned()),
            ..Default::default()
        };
        let filtered = filters.apply(&products);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "Mangoes");
    }
}
