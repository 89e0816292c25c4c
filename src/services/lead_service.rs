// src/services/lead_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{LeadStore, UserDirectory},
    models::{
        auth::User,
        leads::{Lead, LeadFilter, UpdateLeadPayload},
    },
    services::permission_service::PermissionService,
};

#[derive(Clone)]
pub struct LeadService {
    repo: Arc<dyn LeadStore>,
    users: Arc<dyn UserDirectory>,
    permissions: PermissionService,
}

impl LeadService {
    pub fn new(
        repo: Arc<dyn LeadStore>,
        users: Arc<dyn UserDirectory>,
        permissions: PermissionService,
    ) -> Self {
        Self {
            repo,
            users,
            permissions,
        }
    }

    pub async fn list_leads(&self, user: &User, filter: &LeadFilter) -> Result<Vec<Lead>, AppError> {
        let Some(company_id) = user.company_id else {
            return Ok(Vec::new());
        };

        let visible = self.permissions.permitted_origin_ids(user).await?;
        self.repo.list_visible(company_id, &visible, filter).await
    }

    pub async fn update_lead(&self, user: &User, id: i64, payload: UpdateLeadPayload) -> Result<Lead, AppError> {
        payload.validate()?;
        let lead = self.load_visible(user, id).await?;
        self.permissions.require_edit_origin(user, lead.origin_id).await?;

        self.repo.update(lead.id, &payload).await
    }

    /// Atribui o lead a um usuário ativo da mesma empresa.
    pub async fn assign_lead(&self, user: &User, id: i64, assignee_id: Uuid) -> Result<Lead, AppError> {
        let lead = self.load_visible(user, id).await?;
        self.permissions.require_assign_origin(user, lead.origin_id).await?;

        if self
            .users
            .find_active_in_company(assignee_id, lead.company_id)
            .await?
            .is_none()
        {
            return Err(AppError::UserNotFound);
        }

        let assigned = self.repo.assign(lead.id, assignee_id).await?;
        tracing::info!(user_id = %user.id, lead_id = id, %assignee_id, "lead atribuído");
        Ok(assigned)
    }

    pub async fn convert_lead(&self, user: &User, id: i64) -> Result<Lead, AppError> {
        let lead = self.load_visible(user, id).await?;
        self.permissions.require_edit_origin(user, lead.origin_id).await?;

        if lead.converted {
            return Ok(lead);
        }

        let converted = self.repo.mark_converted(lead.id).await?;
        tracing::info!(user_id = %user.id, lead_id = id, origin_id = lead.origin_id, "lead convertido");
        Ok(converted)
    }

    async fn load_visible(&self, user: &User, id: i64) -> Result<Lead, AppError> {
        let not_found = || AppError::ResourceNotFound(format!("lead {}", id));

        let company_id = user.company_id.ok_or_else(not_found)?;
        let lead = self
            .repo
            .find_in_company(id, company_id)
            .await?
            .ok_or_else(not_found)?;

        if !self.permissions.can_view_origin(user, lead.origin_id).await? {
            return Err(not_found());
        }
        Ok(lead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rbac::tests::user_with;
    use crate::services::test_support::{FakeLeadStore, FakePermissionStore, FakeUserDirectory};

    struct Fixture {
        service: LeadService,
        leads: Arc<FakeLeadStore>,
    }

    fn fixture(permissions: FakePermissionStore, leads: FakeLeadStore, users: FakeUserDirectory) -> Fixture {
        let leads = Arc::new(leads);
        Fixture {
            service: LeadService::new(
                leads.clone(),
                Arc::new(users),
                PermissionService::new(Arc::new(permissions)),
            ),
            leads,
        }
    }

    fn notes(text: &str) -> UpdateLeadPayload {
        UpdateLeadPayload {
            contact_name: None,
            contact_phone: None,
            notes: Some(text.to_string()),
        }
    }

    #[tokio::test]
    async fn view_only_comercial_cannot_update_assign_or_convert() {
        let company = Uuid::new_v4();
        let user = user_with("comercial", Some(company));
        let colleague = user_with("comercial", Some(company));
        let fx = fixture(
            FakePermissionStore::default()
                .origin(7, company)
                .origin_grant(user.id, 7, true, false, false),
            FakeLeadStore::default().lead(1, company, 7),
            FakeUserDirectory::default().user(&user).user(&colleague),
        );

        assert!(matches!(
            fx.service.update_lead(&user, 1, notes("ligar amanhã")).await,
            Err(AppError::AuthorizationDenied(_))
        ));
        assert!(matches!(
            fx.service.assign_lead(&user, 1, colleague.id).await,
            Err(AppError::AuthorizationDenied(_))
        ));
        assert!(matches!(
            fx.service.convert_lead(&user, 1).await,
            Err(AppError::AuthorizationDenied(_))
        ));

        let stored = fx.leads.get(1).await.unwrap();
        assert_eq!(stored.notes, None);
        assert_eq!(stored.assigned_to, None);
        assert!(!stored.converted);
    }

    #[tokio::test]
    async fn edit_grant_does_not_allow_assignment() {
        let company = Uuid::new_v4();
        let user = user_with("comercial", Some(company));
        let colleague = user_with("comercial", Some(company));
        let fx = fixture(
            FakePermissionStore::default()
                .origin(7, company)
                .origin_grant(user.id, 7, false, true, false),
            FakeLeadStore::default().lead(1, company, 7),
            FakeUserDirectory::default().user(&colleague),
        );

        let updated = fx.service.update_lead(&user, 1, notes("cliente quente")).await.unwrap();
        assert_eq!(updated.notes.as_deref(), Some("cliente quente"));

        assert!(matches!(
            fx.service.assign_lead(&user, 1, colleague.id).await,
            Err(AppError::AuthorizationDenied(_))
        ));
    }

    #[tokio::test]
    async fn assignee_must_be_active_in_the_same_company() {
        let company = Uuid::new_v4();
        let user = user_with("comercial", Some(company));
        let colleague = user_with("comercial", Some(company));
        let outsider = user_with("comercial", Some(Uuid::new_v4()));
        let mut inactive = user_with("comercial", Some(company));
        inactive.is_active = false;
        let fx = fixture(
            FakePermissionStore::default()
                .origin(7, company)
                .origin_grant(user.id, 7, false, false, true),
            FakeLeadStore::default().lead(1, company, 7),
            FakeUserDirectory::default()
                .user(&colleague)
                .user(&outsider)
                .user(&inactive),
        );

        for assignee in [outsider.id, inactive.id, Uuid::new_v4()] {
            assert!(matches!(
                fx.service.assign_lead(&user, 1, assignee).await,
                Err(AppError::UserNotFound)
            ));
        }
        assert_eq!(fx.leads.get(1).await.unwrap().assigned_to, None);

        let assigned = fx.service.assign_lead(&user, 1, colleague.id).await.unwrap();
        assert_eq!(assigned.assigned_to, Some(colleague.id));
    }

    #[tokio::test]
    async fn conversion_is_idempotent() {
        let company = Uuid::new_v4();
        let user = user_with("comercial", Some(company));
        let fx = fixture(
            FakePermissionStore::default()
                .origin(7, company)
                .origin_grant(user.id, 7, true, true, false),
            FakeLeadStore::default().lead(1, company, 7),
            FakeUserDirectory::default(),
        );

        let first = fx.service.convert_lead(&user, 1).await.unwrap();
        let second = fx.service.convert_lead(&user, 1).await.unwrap();

        assert!(first.converted);
        assert!(first.converted_at.is_some());
        assert_eq!(first.converted_at, second.converted_at);
    }

    #[tokio::test]
    async fn leads_of_invisible_origins_answer_not_found() {
        let company = Uuid::new_v4();
        let comercial = user_with("comercial", Some(company));
        let administrativo = user_with("administrativo", Some(company));
        let fx = fixture(
            FakePermissionStore::default()
                .origin(7, company)
                .origin(8, company)
                .origin_grant(comercial.id, 7, true, true, true),
            FakeLeadStore::default().lead(1, company, 7).lead(2, company, 8),
            FakeUserDirectory::default(),
        );

        assert!(matches!(
            fx.service.update_lead(&comercial, 2, notes("x")).await,
            Err(AppError::ResourceNotFound(_))
        ));
        assert!(matches!(
            fx.service.convert_lead(&administrativo, 1).await,
            Err(AppError::ResourceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn listing_applies_the_origin_filter() {
        let company = Uuid::new_v4();
        let other_company = Uuid::new_v4();
        let comercial = user_with("comercial", Some(company));
        let direcao = user_with("direcao", Some(company));
        let fx = fixture(
            FakePermissionStore::default()
                .origin(7, company)
                .origin(8, company)
                .origin(9, other_company)
                .origin_grant(comercial.id, 7, true, false, false),
            FakeLeadStore::default()
                .lead(1, company, 7)
                .lead(2, company, 8)
                .lead(3, other_company, 9),
            FakeUserDirectory::default(),
        );
        let filter = LeadFilter {
            origin_id: None,
            converted: None,
            utm_source: None,
            utm_campaign: None,
        };

        let ids = |list: Vec<Lead>| list.into_iter().map(|l| l.id).collect::<Vec<_>>();
        assert_eq!(ids(fx.service.list_leads(&comercial, &filter).await.unwrap()), vec![1]);
        assert_eq!(ids(fx.service.list_leads(&direcao, &filter).await.unwrap()), vec![1, 2]);
    }
}
