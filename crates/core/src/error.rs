use crate::evidence::EvidenceViolation;
use crate::status::TicketStatus;
use crate::types::DbId;

/// Domain error taxonomy shared by the workflow engine and the API layer.
///
/// Every variant is caller-visible and synchronous; nothing in the core
/// retries or swallows. `DependencyUnavailable` is the only class a caller
/// might reasonably retry verbatim.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Ticket {ticket_id} is in a terminal status and cannot be modified")]
    TicketClosed { ticket_id: DbId },

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: TicketStatus,
        to: TicketStatus,
    },

    #[error("Evidence rejected: {0}")]
    EvidenceRejected(EvidenceViolation),

    #[error("Missing required custom fields: {}", format_ids(.0))]
    MissingRequiredFields(Vec<DbId>),

    #[error("Ticket is already in area {area_id}")]
    SameArea { area_id: DbId },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),
}

fn format_ids(ids: &[DbId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message_lists_ids() {
        let err = CoreError::MissingRequiredFields(vec![3, 7]);
        assert_eq!(err.to_string(), "Missing required custom fields: 3, 7");
    }

    #[test]
    fn test_invalid_transition_message_names_both_statuses() {
        let err = CoreError::InvalidTransition {
            from: TicketStatus::Resolvido,
            to: TicketStatus::Novo,
        };
        assert!(err.to_string().contains("resolvido"));
        assert!(err.to_string().contains("novo"));
    }
}
