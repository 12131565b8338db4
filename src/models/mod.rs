pub mod notification;
pub mod ticket;

pub use notification::Notification;
pub use ticket::{Assignment, TicketSnapshot};
