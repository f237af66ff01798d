pub mod category;
pub mod division;
pub mod ticket;
pub mod ticket_attachment;
pub mod ticket_resolution;
pub mod user;

pub use category::{Category, CategoryListFilter};
pub use division::{Division, DivisionListFilter};
pub use ticket::{NewTicket, Priority, Ticket, TicketChanges, TicketListFilter, DEFAULT_STATUS};
pub use ticket_attachment::{FileType, NewTicketAttachment, TicketAttachment, TicketAttachmentListFilter};
pub use ticket_resolution::{TicketResolution, TicketResolutionListFilter};
pub use user::{NewUser, Role, User, UserChanges, UserListFilter, UserWithDivision};
