pub mod dispatch;
pub mod models;

pub use models::Notification;
