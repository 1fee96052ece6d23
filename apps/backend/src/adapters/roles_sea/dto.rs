//! DTOs for roles_sea adapter.

use crate::entities::roles::Team;

/// DTO for seeding a catalog role.
#[derive(Debug, Clone)]
pub struct RoleCreate {
    pub name: String,
    pub slug: String,
    pub team: Team,
    /// Already-encoded JSON array of ability names.
    pub abilities_json: String,
}

impl RoleCreate {
    pub fn new(
        name: impl Into<String>,
        slug: impl Into<String>,
        team: Team,
        abilities_json: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            team,
            abilities_json: abilities_json.into(),
        }
    }
}
