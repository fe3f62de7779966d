//! SeaORM entity definitions

pub mod policy;
pub mod role;
pub mod role_policy;
pub mod user;
pub mod user_role;

pub use policy::Entity as Policy;
pub use role::Entity as Role;
pub use role_policy::Entity as RolePolicy;
pub use user::Entity as User;
pub use user_role::Entity as UserRole;
