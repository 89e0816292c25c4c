// src/services/permission_service.rs

use std::collections::BTreeSet;
use std::marker::PhantomData;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PermissionStore,
    models::{
        auth::User,
        rbac::{AccessScope, EffectivePermissions},
    },
};

// ---
// Filtro de visibilidade
// ---

/// Tipo de recurso filtrado (setor ou origem).
pub trait ResourceKind: Send + Sync + 'static {
    fn label() -> &'static str;
}

#[derive(Debug, Clone, Copy)]
pub struct SectorResource;
impl ResourceKind for SectorResource {
    fn label() -> &'static str { "setor" }
}

#[derive(Debug, Clone, Copy)]
pub struct OriginResource;
impl ResourceKind for OriginResource {
    fn label() -> &'static str { "origem" }
}

/// Conjunto de IDs visíveis para um usuário.
///
/// Só o `PermissionService` constrói este tipo, e as listagens dos
/// repositórios exigem um. Assim não existe consulta de listagem sem filtro.
#[derive(Debug, Clone)]
pub struct Visible<R: ResourceKind> {
    scope: AccessScope,
    ids: BTreeSet<i64>,
    _kind: PhantomData<R>,
}

pub type VisibleSectors = Visible<SectorResource>;
pub type VisibleOrigins = Visible<OriginResource>;

impl<R: ResourceKind> Visible<R> {
    fn new(scope: AccessScope, ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            scope,
            ids: ids.into_iter().collect(),
            _kind: PhantomData,
        }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// IDs em ordem crescente, prontos para `= ANY($n)`.
    pub fn ids(&self) -> Vec<i64> {
        self.ids.iter().copied().collect()
    }

    /// Registros sem setor/origem só aparecem para a direção.
    pub fn includes_unassigned(&self) -> bool {
        self.scope == AccessScope::FullAccess
    }
}

#[derive(Debug, Clone, Copy)]
enum OriginAction {
    Edit,
    Assign,
}

// ---
// Resolvedor de visibilidade + portão de ações
// ---
#[derive(Clone)]
pub struct PermissionService {
    store: Arc<dyn PermissionStore>,
}

impl PermissionService {
    pub fn new(store: Arc<dyn PermissionStore>) -> Self {
        Self { store }
    }

    pub fn classify(&self, user: &User) -> AccessScope {
        AccessScope::classify(user)
    }

    // =========================================================================
    //  RESOLVEDOR (listagens)
    // =========================================================================

    /// Setores que o usuário pode ver.
    pub async fn permitted_sector_ids(&self, user: &User) -> Result<VisibleSectors, AppError> {
        let scope = self.classify(user);

        let ids = match scope {
            AccessScope::FullAccess => match user.company_id {
                Some(company_id) => self.store.company_sector_ids(company_id).await?,
                None => Vec::new(),
            },
            AccessScope::SectorScoped => self.store.granted_sector_ids(user.id).await?,
            AccessScope::OriginScoped | AccessScope::NoAccess => Vec::new(),
        };

        tracing::debug!(user_id = %user.id, ?scope, count = ids.len(), "setores visíveis resolvidos");
        Ok(Visible::new(scope, ids))
    }

    /// Origens que o usuário pode ver.
    pub async fn permitted_origin_ids(&self, user: &User) -> Result<VisibleOrigins, AppError> {
        let scope = self.classify(user);

        let ids = match scope {
            AccessScope::FullAccess => match user.company_id {
                Some(company_id) => self.store.company_origin_ids(company_id).await?,
                None => Vec::new(),
            },
            AccessScope::OriginScoped => self.store.granted_origin_ids(user.id).await?,
            AccessScope::SectorScoped | AccessScope::NoAccess => Vec::new(),
        };

        tracing::debug!(user_id = %user.id, ?scope, count = ids.len(), "origens visíveis resolvidas");
        Ok(Visible::new(scope, ids))
    }

    // =========================================================================
    //  PORTÃO DE AÇÕES (mutações)
    // =========================================================================

    pub async fn can_serve_sector(&self, user: &User, sector_id: i64) -> Result<bool, AppError> {
        match self.classify(user) {
            AccessScope::FullAccess => self.sector_in_user_company(user, sector_id).await,
            AccessScope::SectorScoped => Ok(self
                .store
                .find_sector_grant(user.id, sector_id)
                .await?
                .is_some_and(|grant| grant.may_serve)),
            AccessScope::OriginScoped | AccessScope::NoAccess => Ok(false),
        }
    }

    pub async fn can_edit_origin(&self, user: &User, origin_id: i64) -> Result<bool, AppError> {
        self.check_origin(user, origin_id, OriginAction::Edit).await
    }

    pub async fn can_assign_origin(&self, user: &User, origin_id: i64) -> Result<bool, AppError> {
        self.check_origin(user, origin_id, OriginAction::Assign).await
    }

    pub async fn can_view_sector(&self, user: &User, sector_id: i64) -> Result<bool, AppError> {
        Ok(self.permitted_sector_ids(user).await?.contains(sector_id))
    }

    pub async fn can_view_origin(&self, user: &User, origin_id: i64) -> Result<bool, AppError> {
        Ok(self.permitted_origin_ids(user).await?.contains(origin_id))
    }

    async fn check_origin(
        &self,
        user: &User,
        origin_id: i64,
        action: OriginAction,
    ) -> Result<bool, AppError> {
        match self.classify(user) {
            AccessScope::FullAccess => self.origin_in_user_company(user, origin_id).await,
            AccessScope::OriginScoped => {
                let grant = self.store.find_origin_grant(user.id, origin_id).await?;
                Ok(grant.is_some_and(|g| match action {
                    OriginAction::Edit => g.may_edit,
                    OriginAction::Assign => g.may_assign,
                }))
            }
            AccessScope::SectorScoped | AccessScope::NoAccess => Ok(false),
        }
    }

    // A direção tem acesso total, mas só dentro da própria empresa.
    async fn sector_in_user_company(&self, user: &User, sector_id: i64) -> Result<bool, AppError> {
        match user.company_id {
            Some(company_id) => self.store.sector_in_company(sector_id, company_id).await,
            None => Ok(false),
        }
    }

    async fn origin_in_user_company(&self, user: &User, origin_id: i64) -> Result<bool, AppError> {
        match user.company_id {
            Some(company_id) => self.store.origin_in_company(origin_id, company_id).await,
            None => Ok(false),
        }
    }

    // =========================================================================
    //  VARIANTES "require_*" (para handlers e serviços)
    // =========================================================================

    pub async fn require_serve_sector(&self, user: &User, sector_id: i64) -> Result<(), AppError> {
        if self.can_serve_sector(user, sector_id).await? {
            return Ok(());
        }
        Err(deny::<SectorResource>(user, "atender", sector_id))
    }

    pub async fn require_edit_origin(&self, user: &User, origin_id: i64) -> Result<(), AppError> {
        if self.can_edit_origin(user, origin_id).await? {
            return Ok(());
        }
        Err(deny::<OriginResource>(user, "editar", origin_id))
    }

    pub async fn require_assign_origin(&self, user: &User, origin_id: i64) -> Result<(), AppError> {
        if self.can_assign_origin(user, origin_id).await? {
            return Ok(());
        }
        Err(deny::<OriginResource>(user, "atribuir", origin_id))
    }

    /// Somente a direção administra cadastros e permissões.
    /// Devolve a empresa do usuário, que passa a ser o escopo da operação.
    pub fn require_full_access(&self, user: &User) -> Result<Uuid, AppError> {
        match (self.classify(user), user.company_id) {
            (AccessScope::FullAccess, Some(company_id)) => Ok(company_id),
            _ => Err(AppError::AuthorizationDenied(format!(
                "usuário {} não tem acesso total",
                user.id
            ))),
        }
    }

    pub async fn effective_permissions(&self, user: &User) -> Result<EffectivePermissions, AppError> {
        let sectors = self.permitted_sector_ids(user).await?;
        let origins = self.permitted_origin_ids(user).await?;

        Ok(EffectivePermissions {
            scope: self.classify(user),
            sector_ids: sectors.ids(),
            origin_ids: origins.ids(),
        })
    }
}

fn deny<R: ResourceKind>(user: &User, action: &str, id: i64) -> AppError {
    AppError::AuthorizationDenied(format!(
        "usuário {} não pode {} {} {}",
        user.id,
        action,
        R::label(),
        id
    ))
}
