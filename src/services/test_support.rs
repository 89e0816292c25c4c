// src/services/test_support.rs

// Portas em memória com a mesma semântica das consultas SQL.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ConversationStore, GrantStore, LeadStore, PermissionStore, UserDirectory},
    models::{
        auth::User,
        conversations::{Conversation, ConversationFilter, ConversationPriority, ConversationStatus},
        leads::{Lead, LeadFilter, UpdateLeadPayload},
        rbac::{OriginGrant, SectorGrant},
    },
    services::permission_service::{VisibleOrigins, VisibleSectors},
};

// ---
// Permissões (leitura + escrita)
// ---

#[derive(Default)]
pub(crate) struct FakePermissionStore {
    sectors: HashMap<i64, Uuid>,
    origins: HashMap<i64, Uuid>,
    sector_grants: Mutex<HashMap<(Uuid, i64), (bool, bool)>>,
    origin_grants: Mutex<HashMap<(Uuid, i64), (bool, bool, bool)>>,
    unavailable: bool,
}

impl FakePermissionStore {
    fn check(&self) -> Result<(), AppError> {
        if self.unavailable {
            return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    /// Toda consulta falha como banco fora do ar.
    pub(crate) fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub(crate) fn sector(mut self, id: i64, company: Uuid) -> Self {
        self.sectors.insert(id, company);
        self
    }

    pub(crate) fn origin(mut self, id: i64, company: Uuid) -> Self {
        self.origins.insert(id, company);
        self
    }

    pub(crate) fn sector_grant(mut self, user: Uuid, sector: i64, may_serve: bool, may_view: bool) -> Self {
        self.sector_grants.get_mut().insert((user, sector), (may_serve, may_view));
        self
    }

    pub(crate) fn origin_grant(mut self, user: Uuid, origin: i64, view: bool, edit: bool, assign: bool) -> Self {
        self.origin_grants.get_mut().insert((user, origin), (view, edit, assign));
        self
    }

    pub(crate) async fn sector_grant_count(&self) -> usize {
        self.sector_grants.lock().await.len()
    }

    pub(crate) async fn origin_grant_count(&self) -> usize {
        self.origin_grants.lock().await.len()
    }
}

#[async_trait]
impl PermissionStore for FakePermissionStore {
    async fn company_sector_ids(&self, company_id: Uuid) -> Result<Vec<i64>, AppError> {
        self.check()?;
        Ok(self.sectors.iter().filter(|(_, c)| **c == company_id).map(|(id, _)| *id).collect())
    }

    async fn company_origin_ids(&self, company_id: Uuid) -> Result<Vec<i64>, AppError> {
        self.check()?;
        Ok(self.origins.iter().filter(|(_, c)| **c == company_id).map(|(id, _)| *id).collect())
    }

    async fn granted_sector_ids(&self, user_id: Uuid) -> Result<Vec<i64>, AppError> {
        self.check()?;
        Ok(self
            .sector_grants
            .lock()
            .await
            .iter()
            .filter(|((u, _), (serve, view))| *u == user_id && (*serve || *view))
            .map(|((_, s), _)| *s)
            .collect())
    }

    async fn granted_origin_ids(&self, user_id: Uuid) -> Result<Vec<i64>, AppError> {
        self.check()?;
        Ok(self
            .origin_grants
            .lock()
            .await
            .iter()
            .filter(|((u, _), (v, e, a))| *u == user_id && (*v || *e || *a))
            .map(|((_, o), _)| *o)
            .collect())
    }

    async fn find_sector_grant(
        &self,
        user_id: Uuid,
        sector_id: i64,
    ) -> Result<Option<SectorGrant>, AppError> {
        self.check()?;
        let grants = self.sector_grants.lock().await;
        Ok(grants.get(&(user_id, sector_id)).map(|(may_serve, may_view)| SectorGrant {
            user_id,
            sector_id,
            may_serve: *may_serve,
            may_view: *may_view,
            created_at: Utc::now(),
        }))
    }

    async fn find_origin_grant(
        &self,
        user_id: Uuid,
        origin_id: i64,
    ) -> Result<Option<OriginGrant>, AppError> {
        self.check()?;
        let grants = self.origin_grants.lock().await;
        Ok(grants.get(&(user_id, origin_id)).map(|(v, e, a)| OriginGrant {
            user_id,
            origin_id,
            may_view: *v,
            may_edit: *e,
            may_assign: *a,
            created_at: Utc::now(),
        }))
    }

    async fn sector_in_company(&self, sector_id: i64, company_id: Uuid) -> Result<bool, AppError> {
        self.check()?;
        Ok(self.sectors.get(&sector_id) == Some(&company_id))
    }

    async fn origin_in_company(&self, origin_id: i64, company_id: Uuid) -> Result<bool, AppError> {
        self.check()?;
        Ok(self.origins.get(&origin_id) == Some(&company_id))
    }
}

#[async_trait]
impl GrantStore for FakePermissionStore {
    async fn upsert_sector_grant(
        &self,
        user_id: Uuid,
        sector_id: i64,
        may_serve: bool,
        may_view: bool,
    ) -> Result<SectorGrant, AppError> {
        self.check()?;
        self.sector_grants
            .lock()
            .await
            .insert((user_id, sector_id), (may_serve, may_view));

        Ok(SectorGrant {
            user_id,
            sector_id,
            may_serve,
            may_view,
            created_at: Utc::now(),
        })
    }

    async fn delete_sector_grant(&self, user_id: Uuid, sector_id: i64) -> Result<bool, AppError> {
        self.check()?;
        Ok(self.sector_grants.lock().await.remove(&(user_id, sector_id)).is_some())
    }

    async fn list_sector_grants(&self, company_id: Uuid) -> Result<Vec<SectorGrant>, AppError> {
        self.check()?;
        let mut grants: Vec<SectorGrant> = self
            .sector_grants
            .lock()
            .await
            .iter()
            .filter(|((_, sector_id), _)| self.sectors.get(sector_id) == Some(&company_id))
            .map(|((user_id, sector_id), (may_serve, may_view))| SectorGrant {
                user_id: *user_id,
                sector_id: *sector_id,
                may_serve: *may_serve,
                may_view: *may_view,
                created_at: Utc::now(),
            })
            .collect();
        grants.sort_by_key(|g| (g.sector_id, g.user_id));
        Ok(grants)
    }

    async fn upsert_origin_grant(
        &self,
        user_id: Uuid,
        origin_id: i64,
        may_view: bool,
        may_edit: bool,
        may_assign: bool,
    ) -> Result<OriginGrant, AppError> {
        self.check()?;
        self.origin_grants
            .lock()
            .await
            .insert((user_id, origin_id), (may_view, may_edit, may_assign));

        Ok(OriginGrant {
            user_id,
            origin_id,
            may_view,
            may_edit,
            may_assign,
            created_at: Utc::now(),
        })
    }

    async fn delete_origin_grant(&self, user_id: Uuid, origin_id: i64) -> Result<bool, AppError> {
        self.check()?;
        Ok(self.origin_grants.lock().await.remove(&(user_id, origin_id)).is_some())
    }

    async fn list_origin_grants(&self, company_id: Uuid) -> Result<Vec<OriginGrant>, AppError> {
        self.check()?;
        let mut grants: Vec<OriginGrant> = self
            .origin_grants
            .lock()
            .await
            .iter()
            .filter(|((_, origin_id), _)| self.origins.get(origin_id) == Some(&company_id))
            .map(|((user_id, origin_id), (v, e, a))| OriginGrant {
                user_id: *user_id,
                origin_id: *origin_id,
                may_view: *v,
                may_edit: *e,
                may_assign: *a,
                created_at: Utc::now(),
            })
            .collect();
        grants.sort_by_key(|g| (g.origin_id, g.user_id));
        Ok(grants)
    }
}

// ---
// Usuários
// ---

#[derive(Default)]
pub(crate) struct FakeUserDirectory {
    users: HashMap<Uuid, User>,
}

impl FakeUserDirectory {
    pub(crate) fn user(mut self, user: &User) -> Self {
        self.users.insert(user.id, user.clone());
        self
    }
}

#[async_trait]
impl UserDirectory for FakeUserDirectory {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.get(&id).cloned())
    }

    async fn find_active_in_company(
        &self,
        id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .get(&id)
            .filter(|u| u.company_id == Some(company_id) && u.is_active)
            .cloned())
    }
}

// ---
// Conversas
// ---

#[derive(Default)]
pub(crate) struct FakeConversationStore {
    conversations: Mutex<HashMap<i64, Conversation>>,
}

impl FakeConversationStore {
    pub(crate) fn conversation(
        mut self,
        id: i64,
        company_id: Uuid,
        sector_id: Option<i64>,
        status: ConversationStatus,
    ) -> Self {
        let now = Utc::now();
        self.conversations.get_mut().insert(
            id,
            Conversation {
                id,
                company_id,
                sector_id,
                attendant_id: None,
                chat_id: format!("55119999{id:05}@s.whatsapp.net"),
                customer_number: format!("+55119999{id:05}"),
                status,
                priority: ConversationPriority::Media,
                subject: None,
                started_at: now,
                attended_at: None,
                resolved_at: None,
                closed_at: None,
                updated_at: now,
            },
        );
        self
    }

    pub(crate) async fn get(&self, id: i64) -> Option<Conversation> {
        self.conversations.lock().await.get(&id).cloned()
    }
}

#[async_trait]
impl ConversationStore for FakeConversationStore {
    async fn list_visible(
        &self,
        company_id: Uuid,
        visible: &VisibleSectors,
        filter: &ConversationFilter,
    ) -> Result<Vec<Conversation>, AppError> {
        let mut found: Vec<Conversation> = self
            .conversations
            .lock()
            .await
            .values()
            .filter(|c| c.company_id == company_id)
            .filter(|c| match c.sector_id {
                Some(sector_id) => visible.contains(sector_id),
                None => visible.includes_unassigned(),
            })
            .filter(|c| filter.status.is_none_or(|s| c.status == s))
            .filter(|c| filter.sector_id.is_none_or(|s| c.sector_id == Some(s)))
            .cloned()
            .collect();
        found.sort_by_key(|c| c.id);
        Ok(found)
    }

    async fn find_in_company(
        &self,
        id: i64,
        company_id: Uuid,
    ) -> Result<Option<Conversation>, AppError> {
        Ok(self
            .conversations
            .lock()
            .await
            .get(&id)
            .filter(|c| c.company_id == company_id)
            .cloned())
    }

    async fn transfer(&self, id: i64, sector_id: i64) -> Result<Option<Conversation>, AppError> {
        let mut conversations = self.conversations.lock().await;
        let Some(conversation) = conversations.get_mut(&id) else {
            return Ok(None);
        };
        if conversation.status == ConversationStatus::Fechado {
            return Ok(None);
        }

        conversation.sector_id = Some(sector_id);
        conversation.attendant_id = None;
        conversation.status = ConversationStatus::Aguardando;
        conversation.updated_at = Utc::now();
        Ok(Some(conversation.clone()))
    }

    async fn update_status(
        &self,
        id: i64,
        expected: ConversationStatus,
        next: ConversationStatus,
        attendant_id: Option<Uuid>,
    ) -> Result<Option<Conversation>, AppError> {
        let mut conversations = self.conversations.lock().await;
        let Some(conversation) = conversations.get_mut(&id) else {
            return Ok(None);
        };
        if conversation.status != expected {
            return Ok(None);
        }

        let now = Utc::now();
        conversation.status = next;
        conversation.attendant_id = attendant_id.or(conversation.attendant_id);
        match next {
            ConversationStatus::EmAtendimento => conversation.attended_at = Some(now),
            ConversationStatus::Resolvido => conversation.resolved_at = Some(now),
            ConversationStatus::Fechado => conversation.closed_at = Some(now),
            ConversationStatus::Aguardando => {}
        }
        conversation.updated_at = now;
        Ok(Some(conversation.clone()))
    }
}

// ---
// Leads
// ---

#[derive(Default)]
pub(crate) struct FakeLeadStore {
    leads: Mutex<HashMap<i64, Lead>>,
}

impl FakeLeadStore {
    pub(crate) fn lead(mut self, id: i64, company_id: Uuid, origin_id: i64) -> Self {
        self.leads.get_mut().insert(
            id,
            Lead {
                id,
                company_id,
                origin_id,
                contact_name: Some(format!("Contato {id}")),
                contact_phone: None,
                utm_source: Some("facebook".to_string()),
                utm_medium: None,
                utm_campaign: None,
                utm_term: None,
                utm_content: None,
                notes: None,
                assigned_to: None,
                converted: false,
                converted_at: None,
                registered_at: Utc::now(),
            },
        );
        self
    }

    pub(crate) async fn get(&self, id: i64) -> Option<Lead> {
        self.leads.lock().await.get(&id).cloned()
    }

    async fn modify(&self, id: i64, change: impl FnOnce(&mut Lead)) -> Result<Lead, AppError> {
        let mut leads = self.leads.lock().await;
        let lead = leads.get_mut(&id).ok_or(AppError::DatabaseError(sqlx::Error::RowNotFound))?;
        change(lead);
        Ok(lead.clone())
    }
}

#[async_trait]
impl LeadStore for FakeLeadStore {
    async fn list_visible(
        &self,
        company_id: Uuid,
        visible: &VisibleOrigins,
        filter: &LeadFilter,
    ) -> Result<Vec<Lead>, AppError> {
        let mut found: Vec<Lead> = self
            .leads
            .lock()
            .await
            .values()
            .filter(|l| l.company_id == company_id && visible.contains(l.origin_id))
            .filter(|l| filter.origin_id.is_none_or(|o| l.origin_id == o))
            .filter(|l| filter.converted.is_none_or(|c| l.converted == c))
            .cloned()
            .collect();
        found.sort_by_key(|l| l.id);
        Ok(found)
    }

    async fn find_in_company(&self, id: i64, company_id: Uuid) -> Result<Option<Lead>, AppError> {
        Ok(self
            .leads
            .lock()
            .await
            .get(&id)
            .filter(|l| l.company_id == company_id)
            .cloned())
    }

    async fn update(&self, id: i64, payload: &UpdateLeadPayload) -> Result<Lead, AppError> {
        self.modify(id, |lead| {
            if let Some(name) = &payload.contact_name {
                lead.contact_name = Some(name.clone());
            }
            if let Some(phone) = &payload.contact_phone {
                lead.contact_phone = Some(phone.clone());
            }
            if let Some(notes) = &payload.notes {
                lead.notes = Some(notes.clone());
            }
        })
        .await
    }

    async fn assign(&self, id: i64, user_id: Uuid) -> Result<Lead, AppError> {
        self.modify(id, |lead| lead.assigned_to = Some(user_id)).await
    }

    async fn mark_converted(&self, id: i64) -> Result<Lead, AppError> {
        self.modify(id, |lead| {
            lead.converted = true;
            lead.converted_at = lead.converted_at.or(Some(Utc::now()));
        })
        .await
    }
}
