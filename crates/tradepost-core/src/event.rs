//! Change notifications published by the document store.
//!
//! Every durable write produces one event carrying the full post-write
//! document (or the id, for removals). Subscribers rebuild their view of
//! the world by folding events into [`crate::state::MarketState`].

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::ad::SystemAd;
use crate::message::Message;
use crate::offer::BarterOffer;
use crate::taxonomy::Taxonomy;
use crate::user::UserProfile;

/// One document-level change, as observed on a store subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// A profile was created or replaced.
    UserPut { user: UserProfile },
    /// A profile was deleted.
    UserRemoved { id: String },
    /// An offer was created or replaced.
    OfferPut { offer: BarterOffer },
    /// An offer was deleted.
    OfferRemoved { id: String },
    /// A message was created or replaced.
    MessagePut { message: Message },
    /// A message was deleted.
    MessageRemoved { id: String },
    /// An ad was created or replaced.
    AdPut { ad: SystemAd },
    /// An ad was deleted.
    AdRemoved { id: String },
    /// The shared taxonomy document changed; carries the whole document.
    TaxonomySet { taxonomy: Taxonomy },
}

/// Source of change notifications.
///
/// Implemented by every store backend. Receivers that fall behind see
/// `RecvError::Lagged` and should resynchronize from a fresh snapshot.
pub trait ChangeFeed: Send + Sync {
    /// Opens a new subscription starting at the current write position.
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}
