//! Offer discovery: visibility, filtering, and ranking.
//!
//! Pure functions over in-memory offer lists. The caller brings the
//! offers (usually from [`crate::state::MarketState`]), the viewer, and
//! the active filter; nothing here touches storage.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::offer::{BarterOffer, DurationType, OfferStatus};
use crate::user::UserProfile;

/// Active filter selections. The default matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferFilter {
    /// Free-text search across title, both services, description, and tags.
    #[serde(default)]
    pub search: String,
    /// Narrower keyword match across title and the two services only.
    /// Independent of `search`; both can be active at once.
    #[serde(default)]
    pub keyword: String,
    /// Substring match on the offer location.
    #[serde(default)]
    pub location: String,
    /// `None` means any duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<DurationType>,
    /// Category chips; an offer matches if its snapshot field or any tag
    /// is selected. Empty means no category filter.
    #[serde(default)]
    pub categories: BTreeSet<String>,
}

impl OfferFilter {
    pub fn is_unfiltered(&self) -> bool {
        *self == OfferFilter::default()
    }
}

/// Ranking applied after filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortMode {
    /// Offers with an expiration date first, soonest first.
    Deadline,
    /// Highest average rating first.
    Rating,
    /// Most recently created first.
    #[default]
    Newest,
}

/// Filters and ranks `offers` for `viewer`.
///
/// Visibility comes first: offers not stored as active are shown only to
/// their owner and to admins. Every sort mode falls through to
/// newest-first on ties; identical creation times fall through further to
/// a personalized relevance score when a viewer is signed in and no
/// category filter is active. Remaining ties keep their input order.
pub fn search_offers<'a>(
    offers: &'a [BarterOffer],
    viewer: Option<&UserProfile>,
    filter: &OfferFilter,
    sort: SortMode,
) -> Vec<&'a BarterOffer> {
    let mut result: Vec<&BarterOffer> = offers
        .iter()
        .filter(|offer| is_visible(offer, viewer))
        .filter(|offer| matches_filter(offer, filter))
        .collect();

    let personalize = viewer.filter(|_| filter.categories.is_empty());

    result.sort_by(|a, b| {
        match sort {
            SortMode::Deadline => match (a.expiration_date, b.expiration_date) {
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (Some(da), Some(db)) if da != db => return da.cmp(&db),
                _ => {}
            },
            SortMode::Rating => {
                if a.average_rating != b.average_rating {
                    return b.average_rating.total_cmp(&a.average_rating);
                }
            }
            SortMode::Newest => {}
        }

        match b.created_at.cmp(&a.created_at) {
            Ordering::Equal => {}
            unequal => return unequal,
        }

        if let Some(viewer) = personalize {
            return relevance(b, viewer).cmp(&relevance(a, viewer));
        }
        Ordering::Equal
    });

    result
}

/// Offers stored as anything but active are private to owner and admins.
/// Expiry is a display concern and never hides an offer here.
fn is_visible(offer: &BarterOffer, viewer: Option<&UserProfile>) -> bool {
    if offer.status == OfferStatus::Active {
        return true;
    }
    viewer
        .map(|v| v.is_admin() || offer.is_owned_by(&v.id))
        .unwrap_or(false)
}

fn matches_filter(offer: &BarterOffer, filter: &OfferFilter) -> bool {
    if !filter.search.is_empty() {
        let query = filter.search.to_lowercase();
        let hit = contains_ci(&offer.title, &query)
            || contains_ci(&offer.offered_service, &query)
            || contains_ci(&offer.requested_service, &query)
            || contains_ci(&offer.description, &query)
            || offer.tags.iter().any(|t| contains_ci(t, &query));
        if !hit {
            return false;
        }
    }

    if !filter.keyword.is_empty() {
        let query = filter.keyword.to_lowercase();
        let hit = contains_ci(&offer.title, &query)
            || contains_ci(&offer.offered_service, &query)
            || contains_ci(&offer.requested_service, &query);
        if !hit {
            return false;
        }
    }

    if !filter.location.is_empty() && !contains_ci(&offer.location, &filter.location.to_lowercase())
    {
        return false;
    }

    if let Some(duration) = filter.duration {
        if offer.duration_type != duration {
            return false;
        }
    }

    if !filter.categories.is_empty() {
        let hit = filter.categories.contains(&offer.profile.main_field)
            || offer.tags.iter().any(|t| filter.categories.contains(t));
        if !hit {
            return false;
        }
    }

    true
}

/// `query` must already be lowercased.
fn contains_ci(haystack: &str, query: &str) -> bool {
    haystack.to_lowercase().contains(query)
}

/// Personalized tiebreak score: a request for the viewer's own field
/// weighs double a tag overlapping their interests.
fn relevance(offer: &BarterOffer, viewer: &UserProfile) -> u8 {
    let field_hit = offer.requested_service.contains(&viewer.main_field);
    let interest_hit = offer.tags.iter().any(|t| viewer.interests.contains(t));
    u8::from(field_hit) * 2 + u8::from(interest_hit)
}
