//! End-to-end workflow tests against the in-memory store.
//!
//! Wires the real services to `MemoryStore` and `MemoryAuthProvider` and
//! walks the moderation scenarios: taxonomy gatekeeping and resolution,
//! the profile update gate, the offer review lifecycle, discovery, and
//! retention cleanup.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use tradepost_application::{
    load_market_state, AccountService, MessageService, OfferService, ProfileService,
    StateProjector, TaxonomyService,
};
use tradepost_core::access::Principal;
use tradepost_core::config::MarketConfig;
use tradepost_core::discovery::{search_offers, OfferFilter, SortMode};
use tradepost_core::event::ChangeFeed;
use tradepost_core::offer::{DurationType, OfferChanges, OfferDraft, OfferRepository, OfferStatus};
use tradepost_core::taxonomy::TaxonomySeed;
use tradepost_core::user::{ProfilePatch, Registration, Role, UserProfile, UserRepository};
use tradepost_infrastructure::{MemoryAuthProvider, MemoryStore};

const ADMIN_EMAIL: &str = "ops@example.com";

struct Market {
    store: Arc<MemoryStore>,
    accounts: AccountService,
    profiles: ProfileService,
    offers: OfferService,
    messages: MessageService,
    taxonomy: Arc<TaxonomyService>,
}

fn market() -> Market {
    let store = Arc::new(MemoryStore::default());
    let auth = Arc::new(MemoryAuthProvider::new());
    let config = MarketConfig {
        admin_email: Some(ADMIN_EMAIL.to_string()),
        ..Default::default()
    };

    let taxonomy = Arc::new(TaxonomyService::new(
        store.clone(),
        store.clone(),
        config.taxonomy_seed.clone(),
    ));

    Market {
        accounts: AccountService::new(auth, store.clone(), taxonomy.clone(), config),
        profiles: ProfileService::new(store.clone(), taxonomy.clone()),
        offers: OfferService::new(store.clone(), store.clone(), taxonomy.clone()),
        messages: MessageService::new(store.clone(), store.clone()),
        taxonomy,
        store,
    }
}

async fn register(market: &Market, name: &str, email: &str, main_field: &str) -> UserProfile {
    let mut registration = Registration::new(name, email, "hunter22");
    registration.main_field = Some(main_field.to_string());
    market.accounts.register(registration).await.unwrap()
}

fn draft(title: &str) -> OfferDraft {
    OfferDraft {
        title: title.to_string(),
        offered_service: "Portrait photography".to_string(),
        requested_service: "Logo design".to_string(),
        location: "Haifa".to_string(),
        description: "One studio session".to_string(),
        tags: BTreeSet::new(),
        duration_type: DurationType::Ongoing,
        expiration_date: None,
    }
}

#[tokio::test]
async fn test_admin_email_gets_admin_role() {
    let market = market();

    let admin = register(&market, "Ops", ADMIN_EMAIL, "General").await;
    let member = register(&market, "Dana", "dana@example.com", "General").await;

    assert_eq!(admin.role, Role::Admin);
    assert_eq!(member.role, Role::User);
}

#[tokio::test]
async fn test_registration_stages_novel_field_for_review() {
    let market = market();

    register(&market, "Dana", "dana@example.com", "Falconry").await;

    let taxonomy = market.taxonomy.current().await.unwrap();
    assert!(taxonomy.pending_categories.contains("Falconry"));
    assert!(!taxonomy.approved_categories.contains("Falconry"));
}

#[tokio::test]
async fn test_taxonomy_resolution_round() {
    let market = market();
    let admin = Principal::from_profile(&register(&market, "Ops", ADMIN_EMAIL, "General").await);

    market.taxonomy.propose_category("Falconry").await;
    market.taxonomy.propose_category("Beekeeping").await;

    let after_approve = market
        .taxonomy
        .approve_category(&admin, "Falconry")
        .await
        .unwrap();
    assert!(after_approve.approved_categories.contains("Falconry"));
    assert!(!after_approve.pending_categories.contains("Falconry"));

    // approved values never re-enter pending
    market.taxonomy.propose_category("Falconry").await;
    let taxonomy = market.taxonomy.current().await.unwrap();
    assert!(!taxonomy.pending_categories.contains("Falconry"));

    let after_reject = market
        .taxonomy
        .reject_category(&admin, "Beekeeping")
        .await
        .unwrap();
    assert!(!after_reject.pending_categories.contains("Beekeeping"));
    assert!(!after_reject.approved_categories.contains("Beekeeping"));
}

#[tokio::test]
async fn test_interest_rejection_reaches_into_approved_set() {
    let market = market();
    let admin = Principal::from_profile(&register(&market, "Ops", ADMIN_EMAIL, "General").await);

    market.taxonomy.propose_interest("Foraging").await;
    market
        .taxonomy
        .approve_interest(&admin, "Foraging")
        .await
        .unwrap();

    let taxonomy = market
        .taxonomy
        .reject_interest(&admin, "Foraging")
        .await
        .unwrap();
    assert!(!taxonomy.approved_interests.contains("Foraging"));
    assert!(!taxonomy.pending_interests.contains("Foraging"));

    // category rejection has no such reach
    market.taxonomy.propose_category("Foraging").await;
    market
        .taxonomy
        .approve_category(&admin, "Foraging")
        .await
        .unwrap();
    let taxonomy = market
        .taxonomy
        .reject_category(&admin, "Foraging")
        .await
        .unwrap();
    assert!(taxonomy.approved_categories.contains("Foraging"));
}

#[tokio::test]
async fn test_member_edit_waits_for_admin_approval() {
    let market = market();
    let admin = Principal::from_profile(&register(&market, "Ops", ADMIN_EMAIL, "General").await);
    let dana = register(&market, "Dana", "dana@example.com", "Photography").await;
    let actor = Principal::from_profile(&dana);

    let patch = ProfilePatch {
        bio: Some("Ten years behind the camera".to_string()),
        main_field: Some("Video Editing".to_string()),
        ..Default::default()
    };
    market
        .profiles
        .submit_update(&actor, &dana.id, &patch)
        .await
        .unwrap();

    // canonical fields untouched, patch staged
    let staged = UserRepository::find_by_id(market.store.as_ref(), &dana.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(staged.main_field, "Photography");
    assert!(staged.bio.is_none());
    assert_eq!(staged.pending_update.as_ref(), Some(&patch));

    let merged = market
        .profiles
        .approve_update(&admin, &dana.id)
        .await
        .unwrap();
    assert_eq!(merged.main_field, "Video Editing");
    assert_eq!(merged.bio.as_deref(), Some("Ten years behind the camera"));
    assert!(merged.pending_update.is_none());

    // approving again is harmless
    let unchanged = market
        .profiles
        .approve_update(&admin, &dana.id)
        .await
        .unwrap();
    assert_eq!(unchanged, merged);
}

#[tokio::test]
async fn test_rejected_edit_leaves_no_trace() {
    let market = market();
    let admin = Principal::from_profile(&register(&market, "Ops", ADMIN_EMAIL, "General").await);
    let dana = register(&market, "Dana", "dana@example.com", "Photography").await;
    let actor = Principal::from_profile(&dana);

    let patch = ProfilePatch {
        name: Some("D.".to_string()),
        ..Default::default()
    };
    market
        .profiles
        .submit_update(&actor, &dana.id, &patch)
        .await
        .unwrap();
    market.profiles.reject_update(&admin, &dana.id).await.unwrap();

    let stored = UserRepository::find_by_id(market.store.as_ref(), &dana.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Dana");
    assert!(stored.pending_update.is_none());
}

#[tokio::test]
async fn test_admin_edit_applies_directly() {
    let market = market();
    let admin = Principal::from_profile(&register(&market, "Ops", ADMIN_EMAIL, "General").await);
    let dana = register(&market, "Dana", "dana@example.com", "Photography").await;

    let patch = ProfilePatch {
        name: Some("Dana L.".to_string()),
        ..Default::default()
    };
    market
        .profiles
        .submit_update(&admin, &dana.id, &patch)
        .await
        .unwrap();

    let stored = UserRepository::find_by_id(market.store.as_ref(), &dana.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Dana L.");
    assert!(stored.pending_update.is_none());
}

#[tokio::test]
async fn test_offer_review_lifecycle() {
    let market = market();
    let admin = Principal::from_profile(&register(&market, "Ops", ADMIN_EMAIL, "General").await);
    let dana = register(&market, "Dana", "dana@example.com", "Photography").await;
    let noa = register(&market, "Noa", "noa@example.com", "Copywriting").await;
    let owner = Principal::from_profile(&dana);
    let rater = Principal::from_profile(&noa);

    // member offers start pending
    let offer = market.offers.create(&owner, draft("Headshots")).await.unwrap();
    assert_eq!(offer.status, OfferStatus::Pending);

    market.offers.approve(&admin, &offer.id).await.unwrap();

    // re-rating replaces, never stacks
    market.offers.rate(&rater, &offer.id, 3).await.unwrap();
    let rated = market.offers.rate(&rater, &offer.id, 5).await.unwrap();
    assert_eq!(rated.ratings.len(), 1);
    assert_eq!(rated.average_rating, 5.0);

    // owners cannot score their own offer
    let denied = market.offers.rate(&owner, &offer.id, 5).await.unwrap_err();
    assert!(denied.is_access_denied());

    // a member edit lands back in review with social proof cleared,
    // whatever status it asks for
    let changes = OfferChanges {
        title: Some("Headshots, studio or outdoor".to_string()),
        status: Some(OfferStatus::Active),
        ..Default::default()
    };
    let edited = market
        .offers
        .update(&owner, &offer.id, &changes)
        .await
        .unwrap();
    assert_eq!(edited.status, OfferStatus::Pending);
    assert!(edited.ratings.is_empty());
    assert_eq!(edited.average_rating, 0.0);

    // the same edit by an admin keeps the supplied status
    let admin_edit = market
        .offers
        .update(&admin, &offer.id, &changes)
        .await
        .unwrap();
    assert_eq!(admin_edit.status, OfferStatus::Active);
}

#[tokio::test]
async fn test_offer_snapshot_does_not_follow_profile_changes() {
    let market = market();
    let admin = Principal::from_profile(&register(&market, "Ops", ADMIN_EMAIL, "General").await);
    let dana = register(&market, "Dana", "dana@example.com", "Photography").await;
    let owner = Principal::from_profile(&dana);

    let offer = market.offers.create(&owner, draft("Headshots")).await.unwrap();

    let patch = ProfilePatch {
        main_field: Some("Video Editing".to_string()),
        ..Default::default()
    };
    market
        .profiles
        .submit_update(&admin, &dana.id, &patch)
        .await
        .unwrap();

    let stored = OfferRepository::find_by_id(market.store.as_ref(), &offer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.profile.main_field, "Photography");
}

#[tokio::test]
async fn test_reassign_folds_near_duplicate_category() {
    let market = market();
    let admin = Principal::from_profile(&register(&market, "Ops", ADMIN_EMAIL, "General").await);

    for email in ["a@example.com", "b@example.com", "c@example.com"] {
        register(&market, "Member", email, "Design").await;
    }
    register(&market, "Other", "d@example.com", "Copywriting").await;

    let count = market
        .taxonomy
        .reassign_category(&admin, "Design", "Graphic Design")
        .await
        .unwrap();
    assert_eq!(count, 3);

    let moved = market
        .store
        .find_by_main_field("Graphic Design")
        .await
        .unwrap();
    assert_eq!(moved.len(), 3);
    assert!(market.store.find_by_main_field("Design").await.unwrap().is_empty());

    let taxonomy = market.taxonomy.current().await.unwrap();
    assert!(!taxonomy.pending_categories.contains("Design"));
}

#[tokio::test]
async fn test_discovery_hides_unreviewed_offers_from_strangers() {
    let market = market();
    let admin_profile = register(&market, "Ops", ADMIN_EMAIL, "General").await;
    let admin = Principal::from_profile(&admin_profile);
    let dana = register(&market, "Dana", "dana@example.com", "Photography").await;
    let noa = register(&market, "Noa", "noa@example.com", "Copywriting").await;
    let owner = Principal::from_profile(&dana);

    let approved = market.offers.create(&owner, draft("Approved")).await.unwrap();
    market.offers.approve(&admin, &approved.id).await.unwrap();
    let pending = market.offers.create(&owner, draft("Pending")).await.unwrap();
    let rejected = market.offers.create(&owner, draft("Rejected")).await.unwrap();
    market.offers.reject(&admin, &rejected.id).await.unwrap();

    let all = OfferRepository::list_all(market.store.as_ref()).await.unwrap();
    let filter = OfferFilter::default();

    let stranger_view = search_offers(&all, Some(&noa), &filter, SortMode::Newest);
    let titles: Vec<&str> = stranger_view.iter().map(|o| o.title.as_str()).collect();
    assert_eq!(titles, vec!["Approved"]);

    let owner_view = search_offers(&all, Some(&dana), &filter, SortMode::Newest);
    assert_eq!(owner_view.len(), 3);

    let admin_view = search_offers(&all, Some(&admin_profile), &filter, SortMode::Newest);
    assert_eq!(admin_view.len(), 3);

    let _ = pending;
}

#[tokio::test]
async fn test_deadline_sort_puts_dated_offers_first() {
    let market = market();
    let admin = Principal::from_profile(&register(&market, "Ops", ADMIN_EMAIL, "General").await);
    let dana = register(&market, "Dana", "dana@example.com", "Photography").await;
    let owner = Principal::from_profile(&dana);
    let t = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();

    // A: newer, no deadline; B: older, with deadline
    let a = market.offers.create(&owner, draft("A")).await.unwrap();
    let mut b_draft = draft("B");
    b_draft.duration_type = DurationType::OneTime;
    b_draft.expiration_date = Some(t + Duration::days(5));
    let b = market.offers.create(&owner, b_draft).await.unwrap();
    for offer in [&a, &b] {
        market.offers.approve(&admin, &offer.id).await.unwrap();
    }

    let all = OfferRepository::list_all(market.store.as_ref()).await.unwrap();
    let sorted = search_offers(&all, None, &OfferFilter::default(), SortMode::Deadline);
    let titles: Vec<&str> = sorted.iter().map(|o| o.title.as_str()).collect();
    assert_eq!(titles, vec!["B", "A"]);
}

#[tokio::test]
async fn test_bulk_delete_reports_count_and_spares_recent_offers() {
    let market = market();
    let admin = Principal::from_profile(&register(&market, "Ops", ADMIN_EMAIL, "General").await);
    let dana = register(&market, "Dana", "dana@example.com", "Photography").await;
    let owner = Principal::from_profile(&dana);

    let old_a = market.offers.create(&owner, draft("Old A")).await.unwrap();
    let old_b = market.offers.create(&owner, draft("Old B")).await.unwrap();
    let recent = market.offers.create(&owner, draft("Recent")).await.unwrap();

    // the threshold sits after the first two creations
    let threshold = Utc::now() + Duration::seconds(1);
    let mut stale_recent = recent.clone();
    stale_recent.created_at = threshold + Duration::days(1);
    OfferRepository::save(market.store.as_ref(), &stale_recent)
        .await
        .unwrap();

    let deleted = market
        .offers
        .delete_older_than(&admin, threshold)
        .await
        .unwrap();
    assert_eq!(deleted, 2);

    let remaining = OfferRepository::list_all(market.store.as_ref()).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, recent.id);

    let _ = (old_a, old_b);
}

#[tokio::test]
async fn test_projector_tracks_workflow_writes() {
    let market = market();
    let initial = load_market_state(market.store.as_ref(), &TaxonomySeed::default())
        .await
        .unwrap();
    assert!(initial.users.is_empty());
    assert!(!initial.taxonomy.approved_categories.is_empty());

    let projector = StateProjector::spawn(initial, market.store.as_ref() as &dyn ChangeFeed);
    let state = projector.state();

    let dana = register(&market, "Dana", "dana@example.com", "Photography").await;
    let noa = register(&market, "Noa", "noa@example.com", "Copywriting").await;
    market
        .messages
        .send(Some(&dana), &noa.id, "Trade?", "Headshots for copy")
        .await
        .unwrap();

    for _ in 0..200 {
        if state.read().await.unread_count(&noa.id) == 1 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let snapshot = state.read().await;
    assert!(snapshot.users.contains_key(&dana.id));
    assert_eq!(snapshot.unread_count(&noa.id), 1);
    assert_eq!(snapshot.unread_count(&dana.id), 0);
    drop(snapshot);

    projector.shutdown().await;
}
