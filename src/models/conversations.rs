// src/models/conversations.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// Mapeia o CREATE TYPE conversation_status do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "conversation_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationStatus {
    Aguardando,
    EmAtendimento,
    Resolvido,
    Fechado,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "conversation_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationPriority {
    Baixa,
    Media,
    Alta,
    Urgente,
}

/// Ação de atendimento sobre uma conversa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationAction {
    /// Atendente assume a conversa.
    Take,
    Resolve,
    Close,
}

impl ConversationStatus {
    /// Próximo status para a ação, ou `None` se a transição não é permitida.
    pub fn apply(self, action: ConversationAction) -> Option<Self> {
        match (self, action) {
            (Self::Aguardando, ConversationAction::Take) => Some(Self::EmAtendimento),
            (Self::EmAtendimento, ConversationAction::Resolve) => Some(Self::Resolvido),
            (Self::Fechado, ConversationAction::Close) => None,
            (_, ConversationAction::Close) => Some(Self::Fechado),
            _ => None,
        }
    }
}

// Conversa de WhatsApp com um cliente
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: i64,
    #[schema(ignore)]
    pub company_id: Uuid,

    pub sector_id: Option<i64>,
    pub attendant_id: Option<Uuid>,

    #[schema(example = "5511999998888@s.whatsapp.net")]
    pub chat_id: String,
    #[schema(example = "+5511999998888")]
    pub customer_number: String,

    pub status: ConversationStatus,
    pub priority: ConversationPriority,
    pub subject: Option<String>,

    pub started_at: DateTime<Utc>,
    pub attended_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ConversationFilter {
    pub status: Option<ConversationStatus>,
    pub sector_id: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferConversationPayload {
    #[schema(example = 5)]
    pub sector_id: i64,
}
