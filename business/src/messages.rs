//! Buyer/seller messaging: one open thread at a time, tied to a product.
//!
//! Sending is insert-then-append: the message row goes to the backend and
//! the echoed row is appended to the open thread once the insert succeeds.

use std::any::Any;

use agrilink_states::{Compute, ComputeDeps, ComputeStage, Dep, State, StateCtx, Updater, assign_impl};
use chrono::{DateTime, Utc};
use log::{error, warn};

use crate::models::{Message, Product};
use crate::query::{Direction, Query, row, rows};
use crate::remote::Remote;
use crate::session::{SessionCompute, SessionStore};
use crate::{FetchState, MarketConfig};

/// The message being typed into the open thread.
#[derive(Debug, Clone, Default)]
pub struct MessageDraft {
    pub content: String,
}

impl State for MessageDraft {
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

/// The currently open conversation, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageThread {
    pub product_id: Option<String>,
    pub result: Remote<Vec<Message>>,
}

impl MessageThread {
    pub fn is_open(&self) -> bool {
        self.product_id.is_some()
    }

    pub fn messages(&self) -> &[Message] {
        self.result.value().map(Vec::as_slice).unwrap_or_default()
    }
}

impl Compute for MessageThread {
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

/// Opens the thread for `product` and fetches its history, oldest first.
pub fn open_thread(ctx: &StateCtx, product: &Product) {
    let updater = ctx.updater();
    updater.set(MessageThread {
        product_id: Some(product.id.clone()),
        result: Remote::Pending,
    });
    let (Some(config), Some(store), Some(fetch)) = (
        ctx.state_ref::<MarketConfig>(),
        ctx.state_ref::<SessionStore>(),
        ctx.state_ref::<FetchState>(),
    ) else {
        return;
    };
    let request = Query::from("messages")
        .select("*")
        .eq("product_id", &product.id)
        .order("created_at", Direction::Ascending)
        .build(config, store.access_token());
    let product_id = product.id.clone();
    fetch.fetch(
        request,
        Box::new(move |result| match rows::<Message>(result) {
            Ok(messages) => updater.set(MessageThread {
                product_id: Some(product_id),
                result: Remote::Ready(messages),
            }),
            Err(err) => {
                warn!("message history fetch failed: {err}");
                updater.set(MessageThread {
                    product_id: Some(product_id),
                    result: Remote::Failed(err.to_string()),
                });
            }
        }),
    );
}

pub fn close_thread(ctx: &StateCtx) {
    ctx.updater().set(MessageThread::default());
    ctx.updater().set(MessageDraft::default());
}

/// Sends the current draft to the product's farmer.
pub fn send_message(ctx: &StateCtx, product: &Product) {
    let Some(draft) = ctx.state_ref::<MessageDraft>() else {
        return;
    };
    let content = draft.content.trim().to_owned();
    if content.is_empty() {
        return;
    }
    let Some(sender_id) = ctx
        .cached::<SessionCompute>()
        .and_then(|session| session.user.as_ref())
        .map(|user| user.id.clone())
    else {
        warn!("send_message without a signed-in user");
        return;
    };
    let (Some(config), Some(store), Some(fetch)) = (
        ctx.state_ref::<MarketConfig>(),
        ctx.state_ref::<SessionStore>(),
        ctx.state_ref::<FetchState>(),
    ) else {
        return;
    };
    let request = Query::from("messages")
        .insert(serde_json::json!({
            "product_id": product.id,
            "sender_id": sender_id,
            "receiver_id": product.farmer_id,
            "content": content,
        }))
        .single()
        .build(config, store.access_token());

    let thread = ctx.cached::<MessageThread>().cloned().unwrap_or_default();
    let updater = ctx.updater();
    fetch.fetch(
        request,
        Box::new(move |result| match row::<Message>(result) {
            Ok(message) => {
                let mut messages = thread.messages().to_vec();
                messages.push(message);
                updater.set(MessageThread {
                    product_id: thread.product_id,
                    result: Remote::Ready(messages),
                });
                updater.set(MessageDraft::default());
            }
            Err(err) => error!("message send failed: {err}"),
        }),
    );
}

/// Short human timestamp for message bubbles.
pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(timestamp);
    if elapsed.num_minutes() < 1 {
        "Just now".to_owned()
    } else if elapsed.num_hours() < 1 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_days() < 1 {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed.num_days() < 7 {
        format!("{}d ago", elapsed.num_days())
    } else {
        timestamp.format("%b %d, %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn relative_time_buckets() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(format_relative_time(now - Duration::seconds(30), now), "Just now");
        assert_eq!(format_relative_time(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_relative_time(now - Duration::hours(3), now), "3h ago");
        assert_eq!(format_relative_time(now - Duration::days(2), now), "2d ago");
        assert_eq!(
            format_relative_time(now - Duration::days(30), now),
            "May 16, 2025"
        );
    }

    #[test]
    fn closed_thread_has_no_messages() {
        let thread = MessageThread::default();
        assert!(!thread.is_open());
        assert!(thread.messages().is_empty());
    }
}
