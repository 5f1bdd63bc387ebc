pub mod appointments;
pub mod health;
pub mod logs;
pub mod medicines;
pub mod notifications;
pub mod patients;
pub mod users;
