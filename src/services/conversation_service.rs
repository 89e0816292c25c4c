// src/services/conversation_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::ConversationStore,
    models::{
        auth::User,
        conversations::{Conversation, ConversationAction, ConversationFilter},
    },
    services::permission_service::PermissionService,
};

#[derive(Clone)]
pub struct ConversationService {
    repo: Arc<dyn ConversationStore>,
    permissions: PermissionService,
}

impl ConversationService {
    pub fn new(repo: Arc<dyn ConversationStore>, permissions: PermissionService) -> Self {
        Self { repo, permissions }
    }

    pub async fn list_conversations(
        &self,
        user: &User,
        filter: &ConversationFilter,
    ) -> Result<Vec<Conversation>, AppError> {
        let Some(company_id) = user.company_id else {
            return Ok(Vec::new());
        };

        let visible = self.permissions.permitted_sector_ids(user).await?;
        self.repo.list_visible(company_id, &visible, filter).await
    }

    /// Transfere para outro setor. Quem transfere precisa poder atender
    /// o setor atual e o destino.
    pub async fn transfer(&self, user: &User, id: i64, target_sector_id: i64) -> Result<Conversation, AppError> {
        let conversation = self.load_visible(user, id).await?;
        self.require_serve_current(user, &conversation).await?;
        self.permissions.require_serve_sector(user, target_sector_id).await?;

        let transferred = self
            .repo
            .transfer(conversation.id, target_sector_id)
            .await?
            .ok_or_else(|| AppError::InvalidStateTransition(format!("conversa {} está fechada", id)))?;

        tracing::info!(
            user_id = %user.id,
            conversation_id = id,
            from = ?conversation.sector_id,
            to = target_sector_id,
            "conversa transferida"
        );
        Ok(transferred)
    }

    pub async fn take(&self, user: &User, id: i64) -> Result<Conversation, AppError> {
        self.apply(user, id, ConversationAction::Take).await
    }

    pub async fn resolve(&self, user: &User, id: i64) -> Result<Conversation, AppError> {
        self.apply(user, id, ConversationAction::Resolve).await
    }

    pub async fn close(&self, user: &User, id: i64) -> Result<Conversation, AppError> {
        self.apply(user, id, ConversationAction::Close).await
    }

    async fn apply(&self, user: &User, id: i64, action: ConversationAction) -> Result<Conversation, AppError> {
        let conversation = self.load_visible(user, id).await?;
        self.require_serve_current(user, &conversation).await?;

        let next = conversation.status.apply(action).ok_or_else(|| {
            AppError::InvalidStateTransition(format!(
                "{:?} não é permitido em {:?}",
                action, conversation.status
            ))
        })?;

        let attendant = match action {
            ConversationAction::Take => Some(user.id),
            ConversationAction::Resolve | ConversationAction::Close => None,
        };

        // None aqui = outra requisição mudou o status antes de nós
        let updated = self
            .repo
            .update_status(conversation.id, conversation.status, next, attendant)
            .await?
            .ok_or_else(|| AppError::InvalidStateTransition(format!("conversa {} foi alterada", id)))?;

        tracing::info!(user_id = %user.id, conversation_id = id, ?action, status = ?updated.status, "status da conversa alterado");
        Ok(updated)
    }

    // Ações exigem poder atender o setor atual. Sem setor: só a direção.
    async fn require_serve_current(&self, user: &User, conversation: &Conversation) -> Result<(), AppError> {
        match conversation.sector_id {
            Some(sector_id) => self.permissions.require_serve_sector(user, sector_id).await,
            None => self.permissions.require_full_access(user).map(|_| ()),
        }
    }

    // Conversa de outra empresa ou de setor invisível: 404.
    async fn load_visible(&self, user: &User, id: i64) -> Result<Conversation, AppError> {
        let not_found = || AppError::ResourceNotFound(format!("conversa {}", id));

        let company_id = user.company_id.ok_or_else(not_found)?;
        let conversation = self
            .repo
            .find_in_company(id, company_id)
            .await?
            .ok_or_else(not_found)?;

        let visible = self.permissions.permitted_sector_ids(user).await?;
        let is_visible = match conversation.sector_id {
            Some(sector_id) => visible.contains(sector_id),
            None => visible.includes_unassigned(),
        };

        if !is_visible {
            return Err(not_found());
        }
        Ok(conversation)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::models::conversations::ConversationStatus::*;
    use crate::models::rbac::tests::user_with;
    use crate::services::test_support::{FakeConversationStore, FakePermissionStore};

    struct Fixture {
        service: ConversationService,
        conversations: Arc<FakeConversationStore>,
    }

    fn fixture(permissions: FakePermissionStore, conversations: FakeConversationStore) -> Fixture {
        let conversations = Arc::new(conversations);
        Fixture {
            service: ConversationService::new(
                conversations.clone(),
                PermissionService::new(Arc::new(permissions)),
            ),
            conversations,
        }
    }

    fn no_filter() -> ConversationFilter {
        ConversationFilter {
            status: None,
            sector_id: None,
        }
    }

    #[tokio::test]
    async fn transfer_out_of_view_only_sector_is_denied() {
        let company = Uuid::new_v4();
        let user = user_with("administrativo", Some(company));
        let fx = fixture(
            FakePermissionStore::default()
                .sector(1, company)
                .sector(2, company)
                .sector_grant(user.id, 1, false, true)
                .sector_grant(user.id, 2, true, false),
            FakeConversationStore::default().conversation(10, company, Some(1), EmAtendimento),
        );

        let result = fx.service.transfer(&user, 10, 2).await;

        assert!(matches!(result, Err(AppError::AuthorizationDenied(_))));
        let stored = fx.conversations.get(10).await.unwrap();
        assert_eq!(stored.sector_id, Some(1));
        assert_eq!(stored.status, EmAtendimento);
    }

    #[tokio::test]
    async fn transfer_to_sector_without_serve_grant_is_denied() {
        let company = Uuid::new_v4();
        let user = user_with("administrativo", Some(company));
        let fx = fixture(
            FakePermissionStore::default()
                .sector(1, company)
                .sector(2, company)
                .sector_grant(user.id, 1, true, true)
                .sector_grant(user.id, 2, false, true),
            FakeConversationStore::default().conversation(10, company, Some(1), Aguardando),
        );

        assert!(matches!(
            fx.service.transfer(&user, 10, 2).await,
            Err(AppError::AuthorizationDenied(_))
        ));
        assert_eq!(fx.conversations.get(10).await.unwrap().sector_id, Some(1));
    }

    #[tokio::test]
    async fn transfer_between_served_sectors_requeues_the_conversation() {
        let company = Uuid::new_v4();
        let user = user_with("administrativo", Some(company));
        let fx = fixture(
            FakePermissionStore::default()
                .sector(1, company)
                .sector(2, company)
                .sector_grant(user.id, 1, true, false)
                .sector_grant(user.id, 2, true, false),
            FakeConversationStore::default().conversation(10, company, Some(1), Aguardando),
        );
        fx.service.take(&user, 10).await.unwrap();

        let moved = fx.service.transfer(&user, 10, 2).await.unwrap();

        assert_eq!(moved.sector_id, Some(2));
        assert_eq!(moved.status, Aguardando);
        assert_eq!(moved.attendant_id, None);
    }

    #[tokio::test]
    async fn transfer_of_unassigned_conversation_requires_full_access() {
        let company = Uuid::new_v4();
        let direcao = user_with("direcao", Some(company));
        let administrativo = user_with("administrativo", Some(company));
        let fx = fixture(
            FakePermissionStore::default()
                .sector(2, company)
                .sector_grant(administrativo.id, 2, true, true),
            FakeConversationStore::default().conversation(10, company, None, Aguardando),
        );

        // Sem setor a conversa nem aparece para quem não é direção
        assert!(matches!(
            fx.service.transfer(&administrativo, 10, 2).await,
            Err(AppError::ResourceNotFound(_))
        ));

        let moved = fx.service.transfer(&direcao, 10, 2).await.unwrap();
        assert_eq!(moved.sector_id, Some(2));
    }

    #[tokio::test]
    async fn closed_conversation_cannot_be_transferred() {
        let company = Uuid::new_v4();
        let direcao = user_with("direcao", Some(company));
        let fx = fixture(
            FakePermissionStore::default().sector(1, company).sector(2, company),
            FakeConversationStore::default().conversation(10, company, Some(1), Fechado),
        );

        assert!(matches!(
            fx.service.transfer(&direcao, 10, 2).await,
            Err(AppError::InvalidStateTransition(_))
        ));
    }

    #[tokio::test]
    async fn view_only_user_cannot_take_resolve_or_close() {
        let company = Uuid::new_v4();
        let user = user_with("administrativo", Some(company));
        let fx = fixture(
            FakePermissionStore::default()
                .sector(1, company)
                .sector_grant(user.id, 1, false, true),
            FakeConversationStore::default()
                .conversation(10, company, Some(1), Aguardando)
                .conversation(11, company, Some(1), EmAtendimento),
        );

        assert!(matches!(fx.service.take(&user, 10).await, Err(AppError::AuthorizationDenied(_))));
        assert!(matches!(fx.service.resolve(&user, 11).await, Err(AppError::AuthorizationDenied(_))));
        assert!(matches!(fx.service.close(&user, 10).await, Err(AppError::AuthorizationDenied(_))));
        assert!(matches!(fx.service.close(&user, 11).await, Err(AppError::AuthorizationDenied(_))));

        assert_eq!(fx.conversations.get(10).await.unwrap().status, Aguardando);
        assert_eq!(fx.conversations.get(11).await.unwrap().status, EmAtendimento);
    }

    #[tokio::test]
    async fn serving_user_walks_the_status_machine() {
        let company = Uuid::new_v4();
        let user = user_with("administrativo", Some(company));
        let fx = fixture(
            FakePermissionStore::default()
                .sector(1, company)
                .sector_grant(user.id, 1, true, false),
            FakeConversationStore::default().conversation(10, company, Some(1), Aguardando),
        );

        assert!(matches!(
            fx.service.resolve(&user, 10).await,
            Err(AppError::InvalidStateTransition(_))
        ));

        let taken = fx.service.take(&user, 10).await.unwrap();
        assert_eq!(taken.status, EmAtendimento);
        assert_eq!(taken.attendant_id, Some(user.id));
        assert!(taken.attended_at.is_some());

        assert!(matches!(
            fx.service.take(&user, 10).await,
            Err(AppError::InvalidStateTransition(_))
        ));

        assert_eq!(fx.service.resolve(&user, 10).await.unwrap().status, Resolvido);
        let closed = fx.service.close(&user, 10).await.unwrap();
        assert_eq!(closed.status, Fechado);
        assert_eq!(closed.attendant_id, Some(user.id));

        assert!(matches!(
            fx.service.close(&user, 10).await,
            Err(AppError::InvalidStateTransition(_))
        ));
    }

    #[tokio::test]
    async fn invisible_conversations_answer_not_found() {
        let company = Uuid::new_v4();
        let other_company = Uuid::new_v4();
        let administrativo = user_with("administrativo", Some(company));
        let comercial = user_with("comercial", Some(company));
        let direcao = user_with("direcao", Some(company));
        let fx = fixture(
            FakePermissionStore::default()
                .sector(1, company)
                .sector(2, company)
                .sector(9, other_company)
                .sector_grant(administrativo.id, 1, true, true),
            FakeConversationStore::default()
                .conversation(20, company, Some(2), Aguardando)
                .conversation(90, other_company, Some(9), Aguardando),
        );

        for action in [ConversationAction::Take, ConversationAction::Close] {
            assert!(matches!(
                fx.service.apply(&administrativo, 20, action).await,
                Err(AppError::ResourceNotFound(_))
            ));
            assert!(matches!(
                fx.service.apply(&comercial, 20, action).await,
                Err(AppError::ResourceNotFound(_))
            ));
        }
        assert!(matches!(
            fx.service.transfer(&administrativo, 20, 1).await,
            Err(AppError::ResourceNotFound(_))
        ));
        assert!(matches!(
            fx.service.take(&direcao, 90).await,
            Err(AppError::ResourceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn listing_applies_the_sector_filter() {
        let company = Uuid::new_v4();
        let other_company = Uuid::new_v4();
        let administrativo = user_with("administrativo", Some(company));
        let direcao = user_with("direcao", Some(company));
        let comercial = user_with("comercial", Some(company));
        let fx = fixture(
            FakePermissionStore::default()
                .sector(1, company)
                .sector(2, company)
                .sector(9, other_company)
                .sector_grant(administrativo.id, 1, false, true),
            FakeConversationStore::default()
                .conversation(10, company, Some(1), Aguardando)
                .conversation(11, company, Some(1), Resolvido)
                .conversation(20, company, Some(2), Aguardando)
                .conversation(30, company, None, Aguardando)
                .conversation(90, other_company, Some(9), Aguardando),
        );

        let ids = |list: Vec<Conversation>| list.into_iter().map(|c| c.id).collect::<Vec<_>>();

        let listed = fx.service.list_conversations(&administrativo, &no_filter()).await.unwrap();
        assert_eq!(ids(listed), vec![10, 11]);

        let listed = fx.service.list_conversations(&direcao, &no_filter()).await.unwrap();
        assert_eq!(ids(listed), vec![10, 11, 20, 30]);

        let waiting = ConversationFilter {
            status: Some(Aguardando),
            sector_id: None,
        };
        let listed = fx.service.list_conversations(&administrativo, &waiting).await.unwrap();
        assert_eq!(ids(listed), vec![10]);

        assert!(fx.service.list_conversations(&comercial, &no_filter()).await.unwrap().is_empty());
    }
}
