//! Domain types shared across the authoring client.
//!
//! Identifiers are assigned by the backend and travel as opaque strings.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Backend identifier of an event
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Wrap a backend-assigned identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backend identifier of a bookable time slot
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(String);

impl SlotId {
    /// Wrap a backend-assigned identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity-provider identifier of a user
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap an identity-provider identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Catalogue values
// ============================================================================

/// Event category tag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Hands-on workshop
    Workshop,
    /// Training session
    Training,
    /// Seminar
    Seminar,
    /// Conference
    Conference,
    /// Networking meetup
    Networking,
    /// Team building activity
    TeamBuilding,
    /// Beach cleanup
    BeachCleanup,
    /// Tree planting
    Reforestation,
    /// Wildlife conservation
    WildlifeConservation,
}

impl Category {
    /// Every category, in catalogue order
    pub const ALL: [Self; 9] = [
        Self::Workshop,
        Self::Training,
        Self::Seminar,
        Self::Conference,
        Self::Networking,
        Self::TeamBuilding,
        Self::BeachCleanup,
        Self::Reforestation,
        Self::WildlifeConservation,
    ];

    /// Value sent over the wire (`BEACH_CLEANUP`)
    #[must_use]
    pub const fn wire_value(self) -> &'static str {
        match self {
            Self::Workshop => "WORKSHOP",
            Self::Training => "TRAINING",
            Self::Seminar => "SEMINAR",
            Self::Conference => "CONFERENCE",
            Self::Networking => "NETWORKING",
            Self::TeamBuilding => "TEAM_BUILDING",
            Self::BeachCleanup => "BEACH_CLEANUP",
            Self::Reforestation => "REFORESTATION",
            Self::WildlifeConservation => "WILDLIFE_CONSERVATION",
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Workshop => "Workshop",
            Self::Training => "Training",
            Self::Seminar => "Seminar",
            Self::Conference => "Conference",
            Self::Networking => "Networking",
            Self::TeamBuilding => "Team Building",
            Self::BeachCleanup => "Beach Cleanup",
            Self::Reforestation => "Reforestation",
            Self::WildlifeConservation => "Wildlife Conservation",
        }
    }

    /// Parse a wire value; unknown tags yield `None`
    #[must_use]
    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.wire_value() == value)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Publication status of an event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Saved but not visible to attendees
    #[default]
    Draft,
    /// Visible and bookable
    Published,
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => f.write_str("draft"),
            Self::Published => f.write_str("published"),
        }
    }
}

// ============================================================================
// Callers
// ============================================================================

/// Role attached to an authenticated user
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Organizer allowed to author events
    Coach,
    /// Attendee
    #[default]
    User,
}

impl UserRole {
    /// Interpret the identity provider's role attribute; absent or unknown means `User`
    #[must_use]
    pub fn from_attribute(attribute: Option<&str>) -> Self {
        match attribute {
            Some("coach") => Self::Coach,
            _ => Self::User,
        }
    }
}

/// Resolved identity of the caller, as reported by the auth collaborator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// Identity-provider user id
    pub id: UserId,
    /// Name shown to attendees
    pub display_name: String,
    /// Role used for route gating
    pub role: UserRole,
}

impl CallerIdentity {
    /// Build an identity with the given role
    #[must_use]
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: UserId::new(id),
            display_name: display_name.into(),
            role,
        }
    }

    /// Shorthand for an organizer identity
    #[must_use]
    pub fn coach(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(id, display_name, UserRole::Coach)
    }
}
