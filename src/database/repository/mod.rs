//! SQL access, one repository per feature.
//!
//! Each feature exposes a trait (the seam services depend on) and a
//! PostgreSQL implementation over a shared `PgPool`. Lookups return
//! `Ok(None)` for missing rows; deletes report whether a row was removed.

pub mod category;
pub mod division;
pub mod ticket;
pub mod ticket_attachment;
pub mod ticket_resolution;
pub mod user;

pub use category::{CategoryRepository, PgCategoryRepository};
pub use division::{DivisionRepository, PgDivisionRepository};
pub use ticket::{PgTicketRepository, TicketRepository};
pub use ticket_attachment::{PgTicketAttachmentRepository, TicketAttachmentRepository};
pub use ticket_resolution::{PgTicketResolutionRepository, TicketResolutionRepository};
pub use user::{PgUserRepository, UserRepository};
