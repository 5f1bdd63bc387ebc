pub mod activity_log;
pub mod appointment;
pub mod enums;
pub mod filters;
pub mod medicine;
pub mod notification;
pub mod patient;

pub use activity_log::*;
pub use appointment::*;
pub use filters::*;
pub use medicine::*;
pub use notification::*;
pub use patient::*;
