pub mod game_roles;
pub mod games;
pub mod players;
pub mod roles;

pub use game_roles::Entity as GameRoles;
pub use game_roles::Model as GameRoleRow;
pub use games::Entity as Games;
pub use games::Model as GameRow;
pub use players::Entity as Players;
pub use players::Model as PlayerRow;
pub use roles::Entity as Roles;
pub use roles::Model as RoleRow;
