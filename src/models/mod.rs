pub mod booking;
pub mod caller;
pub mod catalog;
pub mod slot;
pub mod user;

pub use booking::{Booking, BookingStatus};
pub use caller::Caller;
pub use catalog::{Faq, ServiceItem};
pub use slot::{AvailabilitySlot, SlotStatus};
pub use user::User;
