//! Board (queue) projection.
//!
//! Partitions a ticket collection into ordered status columns for kanban
//! display and computes per-column aggregates. Pure function of its inputs;
//! tickets are never mutated. Custom column sets relabel or recolor the six
//! status keys for display; they never add edges to the transition graph.

use serde::Serialize;

use crate::sla::SlaTier;
use crate::status::{TicketStatus, ALL_STATUSES};
use crate::types::DbId;

/// A column definition: a status key plus display label and color.
#[derive(Debug, Clone)]
pub struct BoardColumnSpec {
    pub key: TicketStatus,
    pub label: String,
    pub color: Option<String>,
}

/// The default six-status column set with Portuguese display labels.
pub fn default_columns() -> Vec<BoardColumnSpec> {
    ALL_STATUSES
        .iter()
        .map(|status| BoardColumnSpec {
            key: *status,
            label: default_label(*status).to_string(),
            color: None,
        })
        .collect()
}

fn default_label(status: TicketStatus) -> &'static str {
    match status {
        TicketStatus::Novo => "Novo",
        TicketStatus::EmAnalise => "Em análise",
        TicketStatus::AguardandoCliente => "Aguardando cliente",
        TicketStatus::EmExecucao => "Em execução",
        TicketStatus::Resolvido => "Resolvido",
        TicketStatus::Encerrado => "Encerrado",
    }
}

/// The slice of a ticket the projection needs.
#[derive(Debug, Clone)]
pub struct BoardTicket {
    pub id: DbId,
    pub status: TicketStatus,
    pub sla_tier: SlaTier,
    pub vip: bool,
}

/// One projected column with its aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnProjection {
    pub status: TicketStatus,
    pub label: String,
    pub color: Option<String>,
    pub count: usize,
    pub ticket_ids: Vec<DbId>,
    /// Non-terminal tickets in this column whose SLA tier is risco or
    /// quebrado.
    pub sla_at_risk: usize,
    /// Tickets belonging to VIP clients.
    pub vip_count: usize,
}

/// Partition `tickets` into the given columns, preserving column order and
/// the input order of tickets within each column.
pub fn project(columns: &[BoardColumnSpec], tickets: &[BoardTicket]) -> Vec<ColumnProjection> {
    columns
        .iter()
        .map(|column| {
            let members: Vec<&BoardTicket> = tickets
                .iter()
                .filter(|t| t.status == column.key)
                .collect();
            let sla_at_risk = members
                .iter()
                .filter(|t| !t.status.is_terminal() && t.sla_tier != SlaTier::Ok)
                .count();
            let vip_count = members.iter().filter(|t| t.vip).count();
            ColumnProjection {
                status: column.key,
                label: column.label.clone(),
                color: column.color.clone(),
                count: members.len(),
                ticket_ids: members.iter().map(|t| t.id).collect(),
                sla_at_risk,
                vip_count,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(id: DbId, status: TicketStatus, tier: SlaTier, vip: bool) -> BoardTicket {
        BoardTicket { id, status, sla_tier: tier, vip }
    }

    #[test]
    fn test_default_columns_cover_all_statuses_in_order() {
        let columns = default_columns();
        assert_eq!(columns.len(), 6);
        let keys: Vec<TicketStatus> = columns.iter().map(|c| c.key).collect();
        assert_eq!(keys, ALL_STATUSES.to_vec());
    }

    #[test]
    fn test_tickets_partition_into_their_status_columns() {
        let tickets = vec![
            ticket(1, TicketStatus::Novo, SlaTier::Ok, false),
            ticket(2, TicketStatus::EmExecucao, SlaTier::Ok, false),
            ticket(3, TicketStatus::Novo, SlaTier::Ok, false),
        ];
        let projected = project(&default_columns(), &tickets);
        assert_eq!(projected[0].count, 2);
        assert_eq!(projected[0].ticket_ids, vec![1, 3]);
        assert_eq!(projected[3].count, 1);
        assert_eq!(projected[3].ticket_ids, vec![2]);
        assert_eq!(projected[5].count, 0);
    }

    #[test]
    fn test_sla_at_risk_counts_risco_and_quebrado() {
        let tickets = vec![
            ticket(1, TicketStatus::EmAnalise, SlaTier::Ok, false),
            ticket(2, TicketStatus::EmAnalise, SlaTier::Risco, false),
            ticket(3, TicketStatus::EmAnalise, SlaTier::Quebrado, false),
        ];
        let projected = project(&default_columns(), &tickets);
        assert_eq!(projected[1].sla_at_risk, 2);
    }

    #[test]
    fn test_terminal_tickets_excluded_from_at_risk_aggregate() {
        // A closed ticket with a frozen quebrado tier is not "at risk".
        let tickets = vec![ticket(1, TicketStatus::Encerrado, SlaTier::Quebrado, false)];
        let projected = project(&default_columns(), &tickets);
        assert_eq!(projected[5].count, 1);
        assert_eq!(projected[5].sla_at_risk, 0);
    }

    #[test]
    fn test_vip_count_per_column() {
        let tickets = vec![
            ticket(1, TicketStatus::Novo, SlaTier::Ok, true),
            ticket(2, TicketStatus::Novo, SlaTier::Ok, false),
            ticket(3, TicketStatus::Resolvido, SlaTier::Ok, true),
        ];
        let projected = project(&default_columns(), &tickets);
        assert_eq!(projected[0].vip_count, 1);
        assert_eq!(projected[4].vip_count, 1);
    }

    #[test]
    fn test_custom_columns_restrict_and_relabel() {
        let columns = vec![
            BoardColumnSpec {
                key: TicketStatus::Novo,
                label: "Entrada".to_string(),
                color: Some("#FF8800".to_string()),
            },
            BoardColumnSpec {
                key: TicketStatus::EmExecucao,
                label: "Atendimento".to_string(),
                color: None,
            },
        ];
        let tickets = vec![
            ticket(1, TicketStatus::Novo, SlaTier::Ok, false),
            ticket(2, TicketStatus::Resolvido, SlaTier::Ok, false),
        ];
        let projected = project(&columns, &tickets);
        assert_eq!(projected.len(), 2);
        assert_eq!(projected[0].label, "Entrada");
        assert_eq!(projected[0].color.as_deref(), Some("#FF8800"));
        assert_eq!(projected[0].count, 1);
        // Resolvido has no column in this custom set, so ticket 2 is not shown.
        assert_eq!(projected[1].count, 0);
    }

    #[test]
    fn test_empty_ticket_collection_projects_empty_columns() {
        let projected = project(&default_columns(), &[]);
        assert!(projected.iter().all(|c| c.count == 0 && c.ticket_ids.is_empty()));
    }
}
