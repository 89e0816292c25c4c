// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::users::list_users,
        handlers::users::create_user,

        // --- Tenancy ---
        handlers::tenancy::get_my_company,

        // --- Sectors ---
        handlers::sectors::list_sectors,
        handlers::sectors::create_sector,
        handlers::sectors::get_sector,
        handlers::sectors::list_sector_members,

        // --- Origins ---
        handlers::origins::list_channels,
        handlers::origins::create_channel,
        handlers::origins::list_origins,
        handlers::origins::create_origin,
        handlers::origins::get_origin,

        // --- RBAC ---
        handlers::rbac::my_permissions,
        handlers::rbac::list_sector_grants,
        handlers::rbac::upsert_sector_grant,
        handlers::rbac::delete_sector_grant,
        handlers::rbac::list_origin_grants,
        handlers::rbac::upsert_origin_grant,
        handlers::rbac::delete_origin_grant,

        // --- Conversations ---
        handlers::conversations::list_conversations,
        handlers::conversations::transfer_conversation,
        handlers::conversations::take_conversation,
        handlers::conversations::resolve_conversation,
        handlers::conversations::close_conversation,

        // --- Leads ---
        handlers::leads::list_leads,
        handlers::leads::update_lead,
        handlers::leads::assign_lead,
        handlers::leads::convert_lead,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::LoginUserPayload,
            models::auth::CreateUserPayload,
            models::auth::AuthResponse,

            // --- Tenancy ---
            models::tenancy::CompanyPlan,
            models::tenancy::Company,

            // --- RBAC ---
            models::rbac::UserRole,
            models::rbac::AccessScope,
            models::rbac::SectorGrant,
            models::rbac::OriginGrant,
            models::rbac::UpsertSectorGrantPayload,
            models::rbac::UpsertOriginGrantPayload,
            models::rbac::EffectivePermissions,

            // --- Sectors ---
            models::sectors::Sector,
            models::sectors::SectorMember,
            models::sectors::CreateSectorPayload,

            // --- Origins ---
            models::origins::ChannelKind,
            models::origins::OriginChannel,
            models::origins::Origin,
            models::origins::CreateChannelPayload,
            models::origins::CreateOriginPayload,

            // --- Conversations ---
            models::conversations::ConversationStatus,
            models::conversations::ConversationPriority,
            models::conversations::Conversation,
            models::conversations::TransferConversationPayload,

            // --- Leads ---
            models::leads::Lead,
            models::leads::UpdateLeadPayload,
            models::leads::AssignLeadPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação"),
        (name = "Users", description = "Usuários da empresa"),
        (name = "Tenancy", description = "Empresa do usuário"),
        (name = "Sectors", description = "Setores de atendimento"),
        (name = "Origins", description = "Canais e origens de leads"),
        (name = "RBAC", description = "Permissões granulares por setor e origem"),
        (name = "Conversations", description = "Atendimento de conversas"),
        (name = "Leads", description = "Leads capturados pelas origens")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/api/auth/login",
            "/api/users/me",
            "/api/sectors/{id}",
            "/api/permissions/me",
            "/api/permissions/origins/{user_id}/{origin_id}",
            "/api/conversations/{id}/take",
            "/api/leads/{id}/assign",
        ] {
            assert!(paths.contains_key(path), "{path}");
        }
        assert!(doc.components.unwrap().security_schemes.contains_key("api_jwt"));
    }
}
