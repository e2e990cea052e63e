// Silverbell - API server for the senior-care personal training marketplace
//
// Customers book trainers directly or through the "recommended" flow:
// eligible trainers are scored, notified, and race to claim the booking;
// bookings that time out fall back to manual admin matching.
//
// Architecture follows domain-driven design: domains/* hold models and
// actions, kernel/* holds infrastructure, server/* holds the HTTP layer.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
