pub mod auth;
pub mod users;
pub mod tenancy;
pub mod sectors;
pub mod origins;
pub mod rbac;
pub mod conversations;
pub mod leads;
