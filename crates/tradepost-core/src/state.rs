//! Materialized market state.
//!
//! A single state container rebuilt purely by folding [`ChangeEvent`]s, so
//! every workflow can be tested against plain data with no I/O attached.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::access::Principal;
use crate::ad::SystemAd;
use crate::event::ChangeEvent;
use crate::message::Message;
use crate::offer::{BarterOffer, OfferStatus};
use crate::taxonomy::Taxonomy;
use crate::user::UserProfile;

/// Everything a running deployment knows, keyed by document id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketState {
    pub users: BTreeMap<String, UserProfile>,
    pub offers: BTreeMap<String, BarterOffer>,
    pub messages: BTreeMap<String, Message>,
    pub ads: BTreeMap<String, SystemAd>,
    pub taxonomy: Taxonomy,
}

impl MarketState {
    /// Folds one change into the state. The only mutation path.
    pub fn apply(&mut self, event: ChangeEvent) {
        match event {
            ChangeEvent::UserPut { user } => {
                self.users.insert(user.id.clone(), user);
            }
            ChangeEvent::UserRemoved { id } => {
                self.users.remove(&id);
            }
            ChangeEvent::OfferPut { offer } => {
                self.offers.insert(offer.id.clone(), offer);
            }
            ChangeEvent::OfferRemoved { id } => {
                self.offers.remove(&id);
            }
            ChangeEvent::MessagePut { message } => {
                self.messages.insert(message.id.clone(), message);
            }
            ChangeEvent::MessageRemoved { id } => {
                self.messages.remove(&id);
            }
            ChangeEvent::AdPut { ad } => {
                self.ads.insert(ad.id.clone(), ad);
            }
            ChangeEvent::AdRemoved { id } => {
                self.ads.remove(&id);
            }
            ChangeEvent::TaxonomySet { taxonomy } => {
                self.taxonomy = taxonomy;
            }
        }
    }

    /// Messages addressed to `user_id` and not yet read.
    pub fn unread_count(&self, user_id: &str) -> usize {
        self.messages
            .values()
            .filter(|m| m.is_unread_for(user_id))
            .count()
    }

    /// Offers listed on a member's profile page.
    ///
    /// The profile owner and admins see every status; everyone else sees
    /// only offers stored as active.
    pub fn offers_for_profile(
        &self,
        profile_id: &str,
        viewer: Option<&Principal>,
    ) -> Vec<&BarterOffer> {
        let privileged = viewer
            .map(|v| v.is_admin() || v.id == profile_id)
            .unwrap_or(false);

        self.offers
            .values()
            .filter(|o| o.profile_id == profile_id)
            .filter(|o| privileged || o.status == OfferStatus::Active)
            .collect()
    }

    /// Approved categories, sorted, for pickers and ad targeting.
    pub fn available_categories(&self) -> Vec<String> {
        self.taxonomy.approved_categories.iter().cloned().collect()
    }

    /// Approved interests, sorted.
    pub fn available_interests(&self) -> Vec<String> {
        self.taxonomy.approved_interests.iter().cloned().collect()
    }

    /// Active ads eligible for `viewer` browsing `context_categories`.
    pub fn ads_for(
        &self,
        viewer: Option<&UserProfile>,
        context_categories: &BTreeSet<String>,
    ) -> Vec<&SystemAd> {
        self.ads
            .values()
            .filter(|ad| ad.matches(viewer, context_categories))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::{ExpertiseLevel, Role};
    use chrono::Utc;

    fn user(id: &str, role: Role) -> UserProfile {
        UserProfile {
            id: id.to_string(),
            name: id.to_string(),
            email: None,
            role,
            avatar_url: String::new(),
            portfolio_url: String::new(),
            portfolio_images: Vec::new(),
            expertise: ExpertiseLevel::Mid,
            main_field: "General".to_string(),
            interests: BTreeSet::new(),
            bio: None,
            joined_at: Utc::now(),
            pending_update: None,
        }
    }

    fn offer(id: &str, owner: &str, status: OfferStatus) -> BarterOffer {
        BarterOffer {
            id: id.to_string(),
            profile_id: owner.to_string(),
            profile: user(owner, Role::User),
            title: id.to_string(),
            offered_service: String::new(),
            requested_service: String::new(),
            location: String::new(),
            description: String::new(),
            tags: BTreeSet::new(),
            duration_type: crate::offer::DurationType::Ongoing,
            expiration_date: None,
            status,
            created_at: Utc::now(),
            ratings: Vec::new(),
            average_rating: 0.0,
        }
    }

    #[test]
    fn test_apply_put_then_remove() {
        let mut state = MarketState::default();

        state.apply(ChangeEvent::UserPut {
            user: user("u-1", Role::User),
        });
        assert!(state.users.contains_key("u-1"));

        state.apply(ChangeEvent::UserRemoved {
            id: "u-1".to_string(),
        });
        assert!(state.users.is_empty());
    }

    #[test]
    fn test_put_replaces_existing_document() {
        let mut state = MarketState::default();
        state.apply(ChangeEvent::OfferPut {
            offer: offer("o-1", "u-1", OfferStatus::Pending),
        });
        state.apply(ChangeEvent::OfferPut {
            offer: offer("o-1", "u-1", OfferStatus::Active),
        });

        assert_eq!(state.offers.len(), 1);
        assert_eq!(state.offers["o-1"].status, OfferStatus::Active);
    }

    #[test]
    fn test_unread_count_ignores_read_and_foreign_messages() {
        let mut state = MarketState::default();
        let mut message = Message {
            id: "m-1".to_string(),
            sender_id: "u-1".to_string(),
            receiver_id: "u-2".to_string(),
            sender_name: String::new(),
            receiver_name: String::new(),
            subject: String::new(),
            content: String::new(),
            sent_at: Utc::now(),
            is_read: false,
        };
        state.apply(ChangeEvent::MessagePut {
            message: message.clone(),
        });

        assert_eq!(state.unread_count("u-2"), 1);
        assert_eq!(state.unread_count("u-1"), 0);

        message.is_read = true;
        state.apply(ChangeEvent::MessagePut { message });
        assert_eq!(state.unread_count("u-2"), 0);
    }

    #[test]
    fn test_profile_page_visibility() {
        let mut state = MarketState::default();
        state.apply(ChangeEvent::OfferPut {
            offer: offer("o-1", "u-1", OfferStatus::Active),
        });
        state.apply(ChangeEvent::OfferPut {
            offer: offer("o-2", "u-1", OfferStatus::Pending),
        });
        state.apply(ChangeEvent::OfferPut {
            offer: offer("o-3", "u-2", OfferStatus::Active),
        });

        let guest = state.offers_for_profile("u-1", None);
        assert_eq!(guest.len(), 1);
        assert_eq!(guest[0].id, "o-1");

        let owner = Principal::new("u-1", Role::User);
        assert_eq!(state.offers_for_profile("u-1", Some(&owner)).len(), 2);

        let admin = Principal::new("a-1", Role::Admin);
        assert_eq!(state.offers_for_profile("u-1", Some(&admin)).len(), 2);

        let stranger = Principal::new("u-3", Role::User);
        assert_eq!(state.offers_for_profile("u-1", Some(&stranger)).len(), 1);
    }

    #[test]
    fn test_taxonomy_set_replaces_document() {
        let mut state = MarketState::default();
        let mut taxonomy = Taxonomy::default();
        taxonomy.approved_categories.insert("Design".to_string());

        state.apply(ChangeEvent::TaxonomySet { taxonomy });

        assert_eq!(state.available_categories(), vec!["Design".to_string()]);
    }
}
