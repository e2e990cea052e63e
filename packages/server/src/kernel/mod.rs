// Kernel: infrastructure shared by all domains.

pub mod deps;
pub mod push;
pub mod scheduled_tasks;
pub mod traits;

pub use deps::ServerDeps;
pub use push::{ExpoPushService, NoopPushService};
pub use traits::BasePushNotificationService;
