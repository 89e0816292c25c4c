pub mod user_repo;
pub use user_repo::{UserDirectory, UserRepository};
pub mod tenancy_repo;
pub use tenancy_repo::CompanyRepository;
pub mod rbac_repo;
pub use rbac_repo::{GrantStore, PermissionStore, RbacRepository};
pub mod sector_repo;
pub use sector_repo::SectorRepository;
pub mod origin_repo;
pub use origin_repo::OriginRepository;
pub mod conversation_repo;
pub use conversation_repo::{ConversationRepository, ConversationStore};
pub mod lead_repo;
pub use lead_repo::{LeadRepository, LeadStore};
