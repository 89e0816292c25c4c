pub mod auth;
pub mod tenancy;
pub mod rbac;
pub mod sectors;
pub mod origins;
pub mod conversations;
pub mod leads;
