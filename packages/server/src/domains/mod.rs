// Domain modules. Each domain owns its models and actions.

pub mod bookings;
pub mod customers;
pub mod matching;
pub mod members;
pub mod notifications;
pub mod trainers;
