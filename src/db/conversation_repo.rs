// src/db/conversation_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::conversations::{Conversation, ConversationFilter, ConversationStatus},
    services::permission_service::VisibleSectors,
};

const CONVERSATION_COLUMNS: &str = r#"
    id, company_id, sector_id, attendant_id, chat_id, customer_number,
    status, priority, subject, started_at, attended_at, resolved_at,
    closed_at, updated_at
"#;

/// Porta das conversas usada pelo `ConversationService`.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Conversas da empresa nos setores visíveis.
    /// Conversas sem setor só entram quando o filtro permite (direção).
    async fn list_visible(
        &self,
        company_id: Uuid,
        visible: &VisibleSectors,
        filter: &ConversationFilter,
    ) -> Result<Vec<Conversation>, AppError>;

    async fn find_in_company(
        &self,
        id: i64,
        company_id: Uuid,
    ) -> Result<Option<Conversation>, AppError>;

    /// Move a conversa para outro setor e a devolve para a fila.
    /// `None` se ela foi fechada no meio do caminho.
    async fn transfer(&self, id: i64, sector_id: i64) -> Result<Option<Conversation>, AppError>;

    /// Troca o status somente se ele ainda for `expected`.
    /// Duas requisições concorrentes não aplicam a mesma transição duas vezes.
    async fn update_status(
        &self,
        id: i64,
        expected: ConversationStatus,
        next: ConversationStatus,
        attendant_id: Option<Uuid>,
    ) -> Result<Option<Conversation>, AppError>;
}

#[derive(Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationStore for ConversationRepository {
    async fn list_visible(
        &self,
        company_id: Uuid,
        visible: &VisibleSectors,
        filter: &ConversationFilter,
    ) -> Result<Vec<Conversation>, AppError> {
        if visible.is_empty() && !visible.includes_unassigned() {
            return Ok(Vec::new());
        }

        let conversations = sqlx::query_as::<_, Conversation>(&format!(
            r#"
            SELECT {CONVERSATION_COLUMNS}
            FROM conversations
            WHERE company_id = $1
              AND (sector_id = ANY($2) OR ($3 AND sector_id IS NULL))
              AND ($4::conversation_status IS NULL OR status = $4)
              AND ($5::BIGINT IS NULL OR sector_id = $5)
            ORDER BY started_at DESC
            "#
        ))
        .bind(company_id)
        .bind(visible.ids())
        .bind(visible.includes_unassigned())
        .bind(filter.status)
        .bind(filter.sector_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(conversations)
    }

    async fn find_in_company(
        &self,
        id: i64,
        company_id: Uuid,
    ) -> Result<Option<Conversation>, AppError> {
        let conversation = sqlx::query_as::<_, Conversation>(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1 AND company_id = $2"
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conversation)
    }

    async fn transfer(&self, id: i64, sector_id: i64) -> Result<Option<Conversation>, AppError> {
        let conversation = sqlx::query_as::<_, Conversation>(&format!(
            r#"
            UPDATE conversations
            SET sector_id = $2,
                attendant_id = NULL,
                status = 'AGUARDANDO',
                updated_at = NOW()
            WHERE id = $1 AND status <> 'FECHADO'
            RETURNING {CONVERSATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(sector_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conversation)
    }

    async fn update_status(
        &self,
        id: i64,
        expected: ConversationStatus,
        next: ConversationStatus,
        attendant_id: Option<Uuid>,
    ) -> Result<Option<Conversation>, AppError> {
        let conversation = sqlx::query_as::<_, Conversation>(&format!(
            r#"
            UPDATE conversations
            SET status = $3,
                attendant_id = COALESCE($4, attendant_id),
                attended_at = CASE WHEN $3 = 'EM_ATENDIMENTO'::conversation_status
                                   THEN NOW() ELSE attended_at END,
                resolved_at = CASE WHEN $3 = 'RESOLVIDO'::conversation_status
                                   THEN NOW() ELSE resolved_at END,
                closed_at = CASE WHEN $3 = 'FECHADO'::conversation_status
                                 THEN NOW() ELSE closed_at END,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {CONVERSATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(expected)
        .bind(next)
        .bind(attendant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conversation)
    }
}
