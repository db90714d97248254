//! In-process document store.
//!
//! Backs tests and development deployments. Keeps every collection in one
//! lock so multi-document operations (the category reassignment batch)
//! commit or fail as a unit, and publishes a change event after each
//! mutation, mirroring the hosted store's realtime subscriptions.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::sync::RwLock;

use tradepost_core::ad::{AdRepository, SystemAd};
use tradepost_core::error::{MarketError, Result};
use tradepost_core::event::{ChangeEvent, ChangeFeed};
use tradepost_core::message::{Message, MessageRepository};
use tradepost_core::offer::{BarterOffer, OfferRepository, OfferStatus, Rating};
use tradepost_core::taxonomy::{Taxonomy, TaxonomyChange, TaxonomyRepository, TaxonomySeed};
use tradepost_core::user::{ProfilePatch, UserProfile, UserRepository};

/// Mutable document collections, all behind one lock.
#[derive(Debug, Default)]
struct Collections {
    users: BTreeMap<String, UserProfile>,
    offers: BTreeMap<String, BarterOffer>,
    messages: BTreeMap<String, Message>,
    ads: BTreeMap<String, SystemAd>,
    taxonomy: Option<Taxonomy>,
}

/// An in-memory document store with a broadcast change feed.
pub struct MemoryStore {
    collections: RwLock<Collections>,
    events: broadcast::Sender<ChangeEvent>,
}

impl MemoryStore {
    /// Creates an empty store.
    ///
    /// The feed buffers up to `capacity` events per subscriber before a
    /// slow receiver starts lagging.
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self {
            collections: RwLock::new(Collections::default()),
            events,
        }
    }

    fn publish(&self, event: ChangeEvent) {
        // a send with no subscribers is fine; nobody is watching yet
        let _ = self.events.send(event);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(256)
    }
}

impl ChangeFeed for MemoryStore {
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserProfile>> {
        Ok(self.collections.read().await.users.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<UserProfile>> {
        Ok(self.collections.read().await.users.values().cloned().collect())
    }

    async fn save(&self, user: &UserProfile) -> Result<()> {
        self.collections
            .write()
            .await
            .users
            .insert(user.id.clone(), user.clone());
        self.publish(ChangeEvent::UserPut { user: user.clone() });
        Ok(())
    }

    async fn apply_patch(&self, user_id: &str, patch: &ProfilePatch) -> Result<UserProfile> {
        let mut collections = self.collections.write().await;
        let user = collections
            .users
            .get(user_id)
            .ok_or_else(|| MarketError::not_found("User", user_id))?;

        let merged = user.with_patch_applied(patch);
        collections.users.insert(user_id.to_string(), merged.clone());
        drop(collections);

        self.publish(ChangeEvent::UserPut {
            user: merged.clone(),
        });
        Ok(merged)
    }

    async fn stage_pending_update(&self, user_id: &str, patch: &ProfilePatch) -> Result<()> {
        let mut collections = self.collections.write().await;
        let user = collections
            .users
            .get_mut(user_id)
            .ok_or_else(|| MarketError::not_found("User", user_id))?;

        user.pending_update = Some(patch.clone());
        let updated = user.clone();
        drop(collections);

        self.publish(ChangeEvent::UserPut { user: updated });
        Ok(())
    }

    async fn clear_pending_update(&self, user_id: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        let user = collections
            .users
            .get_mut(user_id)
            .ok_or_else(|| MarketError::not_found("User", user_id))?;

        user.pending_update = None;
        let updated = user.clone();
        drop(collections);

        self.publish(ChangeEvent::UserPut { user: updated });
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let removed = self.collections.write().await.users.remove(id);
        if removed.is_some() {
            self.publish(ChangeEvent::UserRemoved { id: id.to_string() });
        }
        Ok(())
    }

    async fn find_by_main_field(&self, main_field: &str) -> Result<Vec<UserProfile>> {
        Ok(self
            .collections
            .read()
            .await
            .users
            .values()
            .filter(|u| u.main_field == main_field)
            .cloned()
            .collect())
    }

    async fn set_main_field(&self, user_ids: &[String], new_field: &str) -> Result<()> {
        let mut collections = self.collections.write().await;

        // validate the whole batch before touching anything
        for id in user_ids {
            if !collections.users.contains_key(id) {
                return Err(MarketError::not_found("User", id.clone()));
            }
        }

        let mut updated = Vec::with_capacity(user_ids.len());
        for id in user_ids {
            if let Some(user) = collections.users.get_mut(id) {
                user.main_field = new_field.to_string();
                updated.push(user.clone());
            }
        }
        drop(collections);

        for user in updated {
            self.publish(ChangeEvent::UserPut { user });
        }
        Ok(())
    }
}

#[async_trait]
impl OfferRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<BarterOffer>> {
        Ok(self.collections.read().await.offers.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<BarterOffer>> {
        Ok(self.collections.read().await.offers.values().cloned().collect())
    }

    async fn save(&self, offer: &BarterOffer) -> Result<()> {
        self.collections
            .write()
            .await
            .offers
            .insert(offer.id.clone(), offer.clone());
        self.publish(ChangeEvent::OfferPut {
            offer: offer.clone(),
        });
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let removed = self.collections.write().await.offers.remove(id);
        if removed.is_some() {
            self.publish(ChangeEvent::OfferRemoved { id: id.to_string() });
        }
        Ok(())
    }

    async fn set_status(&self, id: &str, status: OfferStatus) -> Result<()> {
        let mut collections = self.collections.write().await;
        let offer = collections
            .offers
            .get_mut(id)
            .ok_or_else(|| MarketError::not_found("Offer", id))?;

        offer.status = status;
        let updated = offer.clone();
        drop(collections);

        self.publish(ChangeEvent::OfferPut { offer: updated });
        Ok(())
    }

    async fn set_ratings(&self, id: &str, ratings: &[Rating], average: f64) -> Result<()> {
        let mut collections = self.collections.write().await;
        let offer = collections
            .offers
            .get_mut(id)
            .ok_or_else(|| MarketError::not_found("Offer", id))?;

        offer.ratings = ratings.to_vec();
        offer.average_rating = average;
        let updated = offer.clone();
        drop(collections);

        self.publish(ChangeEvent::OfferPut { offer: updated });
        Ok(())
    }

    async fn find_created_before(&self, threshold: DateTime<Utc>) -> Result<Vec<BarterOffer>> {
        let mut stale: Vec<BarterOffer> = self
            .collections
            .read()
            .await
            .offers
            .values()
            .filter(|o| o.created_at < threshold)
            .cloned()
            .collect();
        stale.sort_by_key(|o| o.created_at);
        Ok(stale)
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Message>> {
        Ok(self.collections.read().await.messages.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Message>> {
        Ok(self
            .collections
            .read()
            .await
            .messages
            .values()
            .cloned()
            .collect())
    }

    async fn save(&self, message: &Message) -> Result<()> {
        self.collections
            .write()
            .await
            .messages
            .insert(message.id.clone(), message.clone());
        self.publish(ChangeEvent::MessagePut {
            message: message.clone(),
        });
        Ok(())
    }

    async fn mark_read(&self, id: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        let message = collections
            .messages
            .get_mut(id)
            .ok_or_else(|| MarketError::not_found("Message", id))?;

        message.is_read = true;
        let updated = message.clone();
        drop(collections);

        self.publish(ChangeEvent::MessagePut { message: updated });
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let removed = self.collections.write().await.messages.remove(id);
        if removed.is_some() {
            self.publish(ChangeEvent::MessageRemoved { id: id.to_string() });
        }
        Ok(())
    }
}

#[async_trait]
impl AdRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<SystemAd>> {
        Ok(self.collections.read().await.ads.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<SystemAd>> {
        Ok(self.collections.read().await.ads.values().cloned().collect())
    }

    async fn save(&self, ad: &SystemAd) -> Result<()> {
        self.collections
            .write()
            .await
            .ads
            .insert(ad.id.clone(), ad.clone());
        self.publish(ChangeEvent::AdPut { ad: ad.clone() });
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let removed = self.collections.write().await.ads.remove(id);
        if removed.is_some() {
            self.publish(ChangeEvent::AdRemoved { id: id.to_string() });
        }
        Ok(())
    }
}

#[async_trait]
impl TaxonomyRepository for MemoryStore {
    async fn load_or_seed(&self, seed: &TaxonomySeed) -> Result<Taxonomy> {
        let mut collections = self.collections.write().await;
        if let Some(taxonomy) = &collections.taxonomy {
            return Ok(taxonomy.clone());
        }

        let seeded = seed.into_taxonomy();
        collections.taxonomy = Some(seeded.clone());
        drop(collections);

        tracing::info!("[MemoryStore] taxonomy document seeded");
        self.publish(ChangeEvent::TaxonomySet {
            taxonomy: seeded.clone(),
        });
        Ok(seeded)
    }

    async fn apply(&self, changes: &[TaxonomyChange]) -> Result<Taxonomy> {
        let mut collections = self.collections.write().await;
        let mut taxonomy = collections.taxonomy.clone().unwrap_or_default();
        taxonomy.apply(changes);
        collections.taxonomy = Some(taxonomy.clone());
        drop(collections);

        self.publish(ChangeEvent::TaxonomySet {
            taxonomy: taxonomy.clone(),
        });
        Ok(taxonomy)
    }
}
