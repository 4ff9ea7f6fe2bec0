pub mod docs;
pub mod extract;
pub mod health;
pub mod metrics;
pub mod users;
