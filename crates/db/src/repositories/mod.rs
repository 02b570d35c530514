//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` for single-statement reads, or `&mut PgConnection` for steps
//! that must run inside a caller-owned transaction.

pub mod area_repo;
pub mod attachment_repo;
pub mod board_column_repo;
pub mod custom_field_repo;
pub mod history_repo;
pub mod lookup_repo;
pub mod sla_policy_repo;
pub mod ticket_repo;
pub mod user_repo;

pub use area_repo::AreaRepo;
pub use attachment_repo::AttachmentRepo;
pub use board_column_repo::BoardColumnRepo;
pub use custom_field_repo::CustomFieldRepo;
pub use history_repo::HistoryRepo;
pub use lookup_repo::{CategoryRepo, ClientRepo, ProductRepo};
pub use sla_policy_repo::SlaPolicyRepo;
pub use ticket_repo::TicketRepo;
pub use user_repo::UserRepo;
