//! Capability gate for workflow entry points.
//!
//! Every privileged operation passes through [`authorize`] exactly once, at
//! the workflow boundary, so the trust rules live in one auditable place
//! instead of scattered role checks.

use crate::error::{MarketError, Result};
use crate::user::{Role, UserProfile};

/// The acting identity, as established by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub role: Role,
}

impl Principal {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Principal {
            id: id.into(),
            role,
        }
    }

    pub fn from_profile(profile: &UserProfile) -> Self {
        Principal {
            id: profile.id.clone(),
            role: profile.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A privileged operation paired with the resource it touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<'a> {
    /// Approve, reject, or reassign taxonomy values.
    ModerateTaxonomy,
    /// Submit a profile edit for `target_id`.
    UpdateProfile { target_id: &'a str },
    /// Approve or reject another member's staged profile patch.
    ResolveProfileUpdate,
    /// Remove a member account's profile document.
    DeleteUser,
    /// Edit the content of an offer owned by `owner_id`.
    EditOffer { owner_id: &'a str },
    /// Write an offer's moderation status directly.
    SetOfferStatus,
    /// Delete an offer owned by `owner_id`.
    DeleteOffer { owner_id: &'a str },
    /// Bulk-delete offers by age.
    PurgeOffers,
    /// Score an offer owned by `owner_id`.
    RateOffer { owner_id: &'a str },
    /// Flag a message addressed to `receiver_id` as read.
    MarkMessageRead { receiver_id: &'a str },
    /// Create, edit, or delete sponsored ads.
    ManageAds,
}

impl Action<'_> {
    fn name(&self) -> &'static str {
        match self {
            Action::ModerateTaxonomy => "moderate taxonomy",
            Action::UpdateProfile { .. } => "update profile",
            Action::ResolveProfileUpdate => "resolve profile update",
            Action::DeleteUser => "delete user",
            Action::EditOffer { .. } => "edit offer",
            Action::SetOfferStatus => "set offer status",
            Action::DeleteOffer { .. } => "delete offer",
            Action::PurgeOffers => "purge offers",
            Action::RateOffer { .. } => "rate offer",
            Action::MarkMessageRead { .. } => "mark message read",
            Action::ManageAds => "manage ads",
        }
    }
}

/// Checks whether `principal` may perform `action`.
///
/// # Returns
///
/// - `Ok(())`: Allowed
/// - `Err(MarketError::AccessDenied)`: Denied, with the action named
pub fn authorize(principal: &Principal, action: &Action) -> Result<()> {
    let allowed = match action {
        Action::ModerateTaxonomy
        | Action::ResolveProfileUpdate
        | Action::DeleteUser
        | Action::SetOfferStatus
        | Action::PurgeOffers
        | Action::ManageAds => principal.is_admin(),

        Action::UpdateProfile { target_id } => {
            principal.is_admin() || principal.id == *target_id
        }
        Action::EditOffer { owner_id } | Action::DeleteOffer { owner_id } => {
            principal.is_admin() || principal.id == *owner_id
        }

        // Owners never score their own offers, admins included.
        Action::RateOffer { owner_id } => principal.id != *owner_id,

        Action::MarkMessageRead { receiver_id } => principal.id == *receiver_id,
    };

    if allowed {
        Ok(())
    } else {
        let reason = if principal.is_admin() {
            "not permitted for this resource"
        } else {
            "requires admin role or ownership"
        };
        Err(MarketError::access_denied(action.name(), reason))
    }
}
