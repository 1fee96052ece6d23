//! Role catalog repository functions.

use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::adapters::roles_sea as roles_adapter;
use crate::entities::roles;
use crate::entities::roles::Team;
use crate::errors::domain::{DomainError, InfraErrorKind, NotFoundKind};

/// Immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub team: Team,
    pub abilities: Vec<String>,
}

/// Add a role to the catalog. Used for seeding fixtures; catalog management
/// lives outside this crate.
pub async fn create_role<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    name: &str,
    slug: &str,
    team: Team,
    abilities: &[&str],
) -> Result<Role, DomainError> {
    let abilities_json = serde_json::to_string(abilities).map_err(|e| {
        DomainError::infra(
            InfraErrorKind::Other("Serialization".to_string()),
            format!("failed to encode abilities: {e}"),
        )
    })?;
    let dto = roles_adapter::RoleCreate::new(name, slug, team, abilities_json);
    let role = roles_adapter::create_role(conn, dto).await?;
    Role::try_from(role)
}

pub async fn require_role<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    role_id: i64,
) -> Result<Role, DomainError> {
    let role = roles_adapter::find_by_id(conn, role_id)
        .await?
        .ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Role, format!("Role {role_id} not found"))
        })?;
    Role::try_from(role)
}

/// Load the given roles; `NotFound(Role)` names the first id that is missing.
pub async fn require_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    role_ids: &[i64],
) -> Result<Vec<Role>, DomainError> {
    let rows = roles_adapter::find_by_ids(conn, role_ids).await?;
    if let Some(missing) = role_ids
        .iter()
        .find(|id| !rows.iter().any(|row| row.id == **id))
    {
        return Err(DomainError::not_found(
            NotFoundKind::Role,
            format!("Role {missing} not found"),
        ));
    }
    rows.into_iter().map(Role::try_from).collect()
}

pub async fn find_by_slug<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    slug: &str,
) -> Result<Option<Role>, DomainError> {
    roles_adapter::find_by_slug(conn, slug)
        .await?
        .map(Role::try_from)
        .transpose()
}

pub async fn list_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<Role>, DomainError> {
    let rows = roles_adapter::find_all(conn).await?;
    rows.into_iter().map(Role::try_from).collect()
}

impl TryFrom<roles::Model> for Role {
    type Error = DomainError;

    fn try_from(model: roles::Model) -> Result<Self, Self::Error> {
        let abilities: Vec<String> = serde_json::from_str(&model.abilities).map_err(|e| {
            DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("role {} has malformed abilities: {e}", model.id),
            )
        })?;
        Ok(Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            team: model.team,
            abilities,
        })
    }
}
