pub mod auth;
pub mod permission_service;
pub mod user_service;
pub mod sector_service;
pub mod origin_service;
pub mod rbac_service;
pub mod conversation_service;
pub mod lead_service;

#[cfg(test)]
pub(crate) mod test_support;
