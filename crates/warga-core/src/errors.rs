//! Unified error system for Warga
//!
//! Every engine operation reports failures through [`WargaError`]. Callers
//! that need a machine-readable classification use [`WargaError::kind`];
//! the `Display` output is the human-readable reason.

use crate::effects::{StorageError, TimeError};
use serde::{Deserialize, Serialize};

/// Machine-readable classification of a [`WargaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Role name is not one of user/moderator/admin
    InvalidRole,
    /// Temporary point grant outside the allowed range
    InvalidAmount,
    /// Level outside the role's tier catalog
    InvalidLevel,
    /// Moderator tier outside the moderator catalog
    InvalidTier,
    /// Reason text is empty
    MissingReason,
    /// Badge id is not part of the generated catalog
    UnknownBadge,
    /// Badge scope does not match the user's domicile
    BadgeNotEligible,
    /// Badge already has as many active holders as it allows
    CapacityExceeded,
    /// Target user record does not exist
    UserNotFound,
    /// Role state machine does not allow the transition
    InvalidTransition,
    /// Malformed geography or postal code input
    InvalidGeography,
    /// Invalid configuration
    Config,
    /// Storage collaborator failed
    Storage,
    /// Record could not be encoded or decoded
    Serialization,
    /// Concurrent writers kept winning the optimistic update
    Conflict,
    /// Clock collaborator failed
    Time,
}

/// Unified error type for all Warga operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum WargaError {
    /// Unknown role name.
    #[error("invalid role: {role}")]
    InvalidRole {
        /// The rejected role name
        role: String,
    },

    /// Point grant out of range.
    #[error("invalid amount {amount}: temporary grants must be between {min} and {max} points")]
    InvalidAmount {
        /// Requested amount
        amount: i64,
        /// Lowest accepted amount
        min: i64,
        /// Highest accepted amount
        max: i64,
    },

    /// Level outside the catalog for a role.
    #[error("invalid level {level} for role {role}: expected 1..={max}")]
    InvalidLevel {
        /// Role whose catalog was consulted
        role: String,
        /// Requested level
        level: u8,
        /// Highest level in the catalog
        max: u8,
    },

    /// Moderator tier outside the moderator catalog.
    #[error("invalid moderator tier {tier}: expected 1..={max}")]
    InvalidTier {
        /// Requested tier
        tier: u8,
        /// Highest moderator tier
        max: u8,
    },

    /// Every grant must carry a reason for the audit trail.
    #[error("a non-empty reason is required")]
    MissingReason,

    /// Badge id not in the catalog.
    #[error("unknown badge {badge_id}")]
    UnknownBadge {
        /// The unknown badge id
        badge_id: String,
    },

    /// Geographic scope mismatch.
    #[error("badge {badge_id} is not available to this user: {reason}")]
    BadgeNotEligible {
        /// The badge in question
        badge_id: String,
        /// Which scope field failed
        reason: String,
    },

    /// Badge capacity exhausted.
    #[error("badge {badge_id} cannot be assigned: {reason}")]
    CapacityExceeded {
        /// The badge in question
        badge_id: String,
        /// Human-readable explanation
        reason: String,
    },

    /// User record missing from storage.
    #[error("user {user_id} not found")]
    UserNotFound {
        /// The missing user
        user_id: String,
    },

    /// Role transition not allowed from the current role.
    #[error("cannot {action} a user whose role is {from}")]
    InvalidTransition {
        /// Current role of the user
        from: String,
        /// Attempted transition
        action: String,
    },

    /// Bad geography data or lookup input.
    #[error("invalid geography: {message}")]
    InvalidGeography {
        /// Description of the problem
        message: String,
    },

    /// Bad configuration.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Storage failure.
    #[error("storage error: {message}")]
    Storage {
        /// Underlying storage message
        message: String,
    },

    /// Encoding failure.
    #[error("serialization error: {message}")]
    Serialization {
        /// Underlying codec message
        message: String,
    },

    /// Optimistic update kept losing.
    #[error("write conflict on {key} after {attempts} attempts")]
    Conflict {
        /// Contended key
        key: String,
        /// Attempts made
        attempts: u32,
    },

    /// Clock failure.
    #[error("time error: {message}")]
    Time {
        /// Underlying clock message
        message: String,
    },
}

impl WargaError {
    /// Machine-readable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRole { .. } => ErrorKind::InvalidRole,
            Self::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            Self::InvalidLevel { .. } => ErrorKind::InvalidLevel,
            Self::InvalidTier { .. } => ErrorKind::InvalidTier,
            Self::MissingReason => ErrorKind::MissingReason,
            Self::UnknownBadge { .. } => ErrorKind::UnknownBadge,
            Self::BadgeNotEligible { .. } => ErrorKind::BadgeNotEligible,
            Self::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            Self::UserNotFound { .. } => ErrorKind::UserNotFound,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::InvalidGeography { .. } => ErrorKind::InvalidGeography,
            Self::Config { .. } => ErrorKind::Config,
            Self::Storage { .. } => ErrorKind::Storage,
            Self::Serialization { .. } => ErrorKind::Serialization,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Time { .. } => ErrorKind::Time,
        }
    }

    /// Create an invalid role error
    pub fn invalid_role(role: impl Into<String>) -> Self {
        Self::InvalidRole { role: role.into() }
    }

    /// Create a missing reason error
    pub fn missing_reason() -> Self {
        Self::MissingReason
    }

    /// Create an unknown badge error
    pub fn unknown_badge(badge_id: impl Into<String>) -> Self {
        Self::UnknownBadge {
            badge_id: badge_id.into(),
        }
    }

    /// Create a badge eligibility error
    pub fn badge_not_eligible(badge_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BadgeNotEligible {
            badge_id: badge_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a capacity exceeded error
    pub fn capacity_exceeded(badge_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CapacityExceeded {
            badge_id: badge_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a user not found error
    pub fn user_not_found(user_id: impl ToString) -> Self {
        Self::UserNotFound {
            user_id: user_id.to_string(),
        }
    }

    /// Create an invalid transition error
    pub fn invalid_transition(from: impl Into<String>, action: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            action: action.into(),
        }
    }

    /// Create an invalid geography error
    pub fn invalid_geography(message: impl Into<String>) -> Self {
        Self::InvalidGeography {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Whether the error was raised by input validation, before any write.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::Storage | ErrorKind::Serialization | ErrorKind::Conflict | ErrorKind::Time
        )
    }
}

impl From<StorageError> for WargaError {
    fn from(err: StorageError) -> Self {
        Self::Storage {
            message: err.to_string(),
        }
    }
}

impl From<TimeError> for WargaError {
    fn from(err: TimeError) -> Self {
        Self::Time {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for WargaError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

/// Result alias used across Warga crates
pub type WargaResult<T> = Result<T, WargaError>;
