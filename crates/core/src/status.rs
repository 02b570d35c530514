//! Ticket status vocabulary and the fixed transition rule table.
//!
//! The six statuses form a directed graph; `encerrado` is the only terminal
//! node. Organizations may define custom board columns that map onto these
//! keys for display, but the graph itself never changes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Novo,
    EmAnalise,
    AguardandoCliente,
    EmExecucao,
    Resolvido,
    Encerrado,
}

/// All statuses, in display order.
pub const ALL_STATUSES: &[TicketStatus] = &[
    TicketStatus::Novo,
    TicketStatus::EmAnalise,
    TicketStatus::AguardandoCliente,
    TicketStatus::EmExecucao,
    TicketStatus::Resolvido,
    TicketStatus::Encerrado,
];

impl TicketStatus {
    /// The status key as stored in the database and exchanged over the API.
    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Novo => "novo",
            TicketStatus::EmAnalise => "em_analise",
            TicketStatus::AguardandoCliente => "aguardando_cliente",
            TicketStatus::EmExecucao => "em_execucao",
            TicketStatus::Resolvido => "resolvido",
            TicketStatus::Encerrado => "encerrado",
        }
    }

    /// Parse a status key, rejecting anything outside the six defined values.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "novo" => Ok(TicketStatus::Novo),
            "em_analise" => Ok(TicketStatus::EmAnalise),
            "aguardando_cliente" => Ok(TicketStatus::AguardandoCliente),
            "em_execucao" => Ok(TicketStatus::EmExecucao),
            "resolvido" => Ok(TicketStatus::Resolvido),
            "encerrado" => Ok(TicketStatus::Encerrado),
            other => Err(CoreError::Validation(format!(
                "Invalid ticket status '{other}'. Must be one of: novo, em_analise, \
                 aguardando_cliente, em_execucao, resolvido, encerrado"
            ))),
        }
    }

    /// Statuses reachable from `self` in a single transition.
    pub fn allowed_targets(self) -> &'static [TicketStatus] {
        match self {
            TicketStatus::Novo => &[TicketStatus::EmAnalise, TicketStatus::EmExecucao],
            TicketStatus::EmAnalise => {
                &[TicketStatus::EmExecucao, TicketStatus::AguardandoCliente]
            }
            TicketStatus::AguardandoCliente => &[TicketStatus::EmAnalise],
            TicketStatus::EmExecucao => {
                &[TicketStatus::Resolvido, TicketStatus::AguardandoCliente]
            }
            TicketStatus::Resolvido => &[TicketStatus::Encerrado],
            TicketStatus::Encerrado => &[],
        }
    }

    /// Whether this status admits no further transitions.
    pub fn is_terminal(self) -> bool {
        self.allowed_targets().is_empty()
    }

    /// Whether the edge `from -> to` exists in the rule table.
    pub fn can_transition(self, to: TicketStatus) -> bool {
        self.allowed_targets().contains(&to)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_all_six_statuses() {
        for status in ALL_STATUSES {
            assert_eq!(TicketStatus::parse(status.as_str()).unwrap(), *status);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        let result = TicketStatus::parse("cancelado");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid ticket status"));
    }

    #[test]
    fn test_parse_rejects_empty_string() {
        assert!(TicketStatus::parse("").is_err());
    }

    #[test]
    fn test_encerrado_is_the_only_terminal_status() {
        for status in ALL_STATUSES {
            assert_eq!(
                status.is_terminal(),
                *status == TicketStatus::Encerrado,
                "terminality of {status}"
            );
        }
    }

    #[test]
    fn test_edge_set_matches_rule_table() {
        use TicketStatus::*;
        let expected: &[(TicketStatus, &[TicketStatus])] = &[
            (Novo, &[EmAnalise, EmExecucao]),
            (EmAnalise, &[EmExecucao, AguardandoCliente]),
            (AguardandoCliente, &[EmAnalise]),
            (EmExecucao, &[Resolvido, AguardandoCliente]),
            (Resolvido, &[Encerrado]),
            (Encerrado, &[]),
        ];
        for (from, targets) in expected {
            assert_eq!(from.allowed_targets(), *targets);
        }
    }

    #[test]
    fn test_non_edges_are_rejected_exhaustively() {
        for from in ALL_STATUSES {
            for to in ALL_STATUSES {
                let in_table = from.allowed_targets().contains(to);
                assert_eq!(from.can_transition(*to), in_table);
            }
        }
    }

    #[test]
    fn test_no_self_transitions_exist() {
        for status in ALL_STATUSES {
            assert!(!status.can_transition(*status));
        }
    }

    #[test]
    fn test_resolvido_cannot_reopen_to_novo() {
        assert!(!TicketStatus::Resolvido.can_transition(TicketStatus::Novo));
    }

    #[test]
    fn test_serde_round_trip_uses_snake_case_keys() {
        let json = serde_json::to_string(&TicketStatus::AguardandoCliente).unwrap();
        assert_eq!(json, "\"aguardando_cliente\"");
        let back: TicketStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TicketStatus::AguardandoCliente);
    }
}
