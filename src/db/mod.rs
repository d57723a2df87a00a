pub mod audit;
pub mod branches;
pub mod companies;
pub mod company_access;
pub mod refresh_tokens;
pub mod roles;
pub mod seed;
pub mod super_admins;
pub mod user_roles;
pub mod users;
