pub mod dispatch;
pub mod health;
pub mod index;
pub mod match_cmd;
pub mod schema;
pub mod shared;
pub mod strategy;
pub mod verify;
