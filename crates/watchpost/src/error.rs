use thiserror::Error;

use crate::introspect::EntityId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Entity {0} is no longer valid")]
    InvalidEntity(EntityId),

    #[error("Unknown entity: {0}")]
    UnknownEntity(EntityId),

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Failed to read {member}: {message}")]
    MemberRead { member: String, message: String },

    #[error("Member {0} is not readable")]
    MemberNotReadable(String),

    #[error("Host panicked: {0}")]
    HostPanic(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The host destroyed the entity; callers skip it without reporting.
    pub fn is_invalid_entity(&self) -> bool {
        matches!(self, Error::InvalidEntity(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_entity_classification() {
        assert!(Error::InvalidEntity(EntityId(7)).is_invalid_entity());
        assert!(!Error::UnknownEntity(EntityId(7)).is_invalid_entity());
        assert!(
            !Error::MemberRead {
                member: "Health".to_string(),
                message: "boom".to_string()
            }
            .is_invalid_entity()
        );
    }

    #[test]
    fn test_member_read_message() {
        let err = Error::MemberRead {
            member: "EnergyCurrent".to_string(),
            message: "NullReferenceException".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to read EnergyCurrent: NullReferenceException"
        );
    }
}
