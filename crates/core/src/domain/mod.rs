pub mod caller;
pub mod conversation;
pub mod platform;
