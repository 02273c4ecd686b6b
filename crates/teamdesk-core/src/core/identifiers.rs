// crates/teamdesk-core/src/core/identifiers.rs
// ============================================================================
// Module: Teamdesk Identifiers
// Description: Canonical opaque identifiers for Teamdesk entities.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde, uuid
// ============================================================================

//! ## Overview
//! Every persisted entity is addressed by an opaque string identifier. The
//! wrappers below keep organization, user, project and task identifiers from
//! being mixed up at call sites while serializing as bare strings on the wire.
//! New identifiers are random UUID v4 strings; identifiers read back from
//! storage or requests are accepted verbatim.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Declares an opaque string identifier type.
macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from an existing value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generates a fresh random identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

string_identifier!(
    /// User (principal) identifier.
    ///
    /// # Invariants
    /// - Stable for the lifetime of the user, independent of the login provider.
    UserId
);

string_identifier!(
    /// Organization (tenant) identifier.
    OrganizationId
);

string_identifier!(
    /// Membership row identifier.
    MembershipId
);

string_identifier!(
    /// Invite row identifier.
    InviteId
);

string_identifier!(
    /// Project identifier.
    ProjectId
);

string_identifier!(
    /// Task identifier.
    TaskId
);

string_identifier!(
    /// Task attachment identifier.
    AttachmentId
);

string_identifier!(
    /// Activity record identifier.
    ActivityId
);
