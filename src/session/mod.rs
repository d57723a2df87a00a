pub mod authorization;
pub mod company;
pub mod identity;
pub mod orchestrator;

pub use identity::Principal;
