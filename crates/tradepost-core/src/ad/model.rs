//! Sponsored ad domain model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::user::UserProfile;

/// An admin-managed sponsored placement, stored in the `systemAds`
/// collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemAd {
    pub id: String,
    pub image_url: String,
    pub title: String,
    pub description: String,
    /// Call-to-action label, e.g. "Learn more"
    pub cta_text: String,
    pub link_url: String,
    /// Professions the ad targets; empty means untargeted.
    #[serde(default)]
    pub target_categories: BTreeSet<String>,
    /// Interests the ad targets; empty means untargeted.
    #[serde(default)]
    pub target_interests: BTreeSet<String>,
    /// Optional disclosure line shown under the ad.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_label: Option<String>,
    pub is_active: bool,
}

impl SystemAd {
    /// Whether this ad should be shown to `viewer` while they browse
    /// `context_categories`.
    ///
    /// Inactive ads never show. An ad with no targeting at all shows to
    /// everyone; otherwise one overlap suffices, either a targeted
    /// category against the viewer's field or the browsing context, or a
    /// targeted interest against the viewer's interests.
    pub fn matches(&self, viewer: Option<&UserProfile>, context_categories: &BTreeSet<String>) -> bool {
        if !self.is_active {
            return false;
        }
        if self.target_categories.is_empty() && self.target_interests.is_empty() {
            return true;
        }

        let category_hit = self.target_categories.iter().any(|c| {
            context_categories.contains(c)
                || viewer.map(|v| v.main_field == *c).unwrap_or(false)
        });
        let interest_hit = viewer
            .map(|v| self.target_interests.intersection(&v.interests).next().is_some())
            .unwrap_or(false);

        category_hit || interest_hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::{ExpertiseLevel, Role};
    use chrono::Utc;

    fn viewer(main_field: &str, interests: &[&str]) -> UserProfile {
        UserProfile {
            id: "u-1".to_string(),
            name: "Dana".to_string(),
            email: None,
            role: Role::User,
            avatar_url: String::new(),
            portfolio_url: String::new(),
            portfolio_images: Vec::new(),
            expertise: ExpertiseLevel::Mid,
            main_field: main_field.to_string(),
            interests: interests.iter().map(|s| s.to_string()).collect(),
            bio: None,
            joined_at: Utc::now(),
            pending_update: None,
        }
    }

    fn ad(categories: &[&str], interests: &[&str]) -> SystemAd {
        SystemAd {
            id: "ad-1".to_string(),
            image_url: String::new(),
            title: "Studio space".to_string(),
            description: String::new(),
            cta_text: "Book now".to_string(),
            link_url: "https://example.com".to_string(),
            target_categories: categories.iter().map(|s| s.to_string()).collect(),
            target_interests: interests.iter().map(|s| s.to_string()).collect(),
            sub_label: None,
            is_active: true,
        }
    }

    #[test]
    fn test_untargeted_ad_shows_to_everyone() {
        let ad = ad(&[], &[]);
        assert!(ad.matches(None, &BTreeSet::new()));
    }

    #[test]
    fn test_inactive_ad_never_shows() {
        let mut ad = ad(&[], &[]);
        ad.is_active = false;
        assert!(!ad.matches(Some(&viewer("Photography", &[])), &BTreeSet::new()));
    }

    #[test]
    fn test_category_targeting_matches_viewer_field_or_context() {
        let ad = ad(&["Photography"], &[]);

        assert!(ad.matches(Some(&viewer("Photography", &[])), &BTreeSet::new()));

        let context: BTreeSet<String> = ["Photography".to_string()].into_iter().collect();
        assert!(ad.matches(None, &context));

        assert!(!ad.matches(Some(&viewer("Carpentry", &[])), &BTreeSet::new()));
    }

    #[test]
    fn test_interest_targeting_needs_signed_in_viewer() {
        let ad = ad(&[], &["Music"]);

        assert!(ad.matches(Some(&viewer("General", &["Music"])), &BTreeSet::new()));
        assert!(!ad.matches(None, &BTreeSet::new()));
    }
}
