mod audit_event;
mod branch;
mod company;
mod permission;
mod refresh_token;
mod role;
mod super_admin;
mod user;

pub use audit_event::AuditEvent;
pub use branch::Branch;
pub use company::Company;
pub use permission::Permission;
pub use refresh_token::RefreshToken;
pub use role::Role;
pub use super_admin::SuperAdmin;
pub use user::User;
