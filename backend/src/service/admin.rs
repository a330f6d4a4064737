//! Groups, roles, users and navigation nodes.

use async_trait::async_trait;

use super::error::ServiceResult;
use crate::model::{Group, Node, Role, User};

#[async_trait]
pub trait GroupService: Send + Sync {
    async fn insert_group(&self, group: Group) -> ServiceResult<Group>;
    async fn update_group(&self, group: Group) -> ServiceResult<Group>;
    async fn get_groups(&self) -> ServiceResult<Vec<Group>>;
    async fn get_group(&self, name: &str) -> ServiceResult<Group>;
    async fn delete_group(&self, name: &str) -> ServiceResult<()>;
}

#[async_trait]
pub trait RoleService: Send + Sync {
    async fn insert_role(&self, role: Role) -> ServiceResult<Role>;
    async fn update_role(&self, role: Role) -> ServiceResult<Role>;
    async fn get_roles(&self) -> ServiceResult<Vec<Role>>;
    async fn get_role(&self, name: &str) -> ServiceResult<Role>;
    async fn delete_role(&self, name: &str) -> ServiceResult<()>;
}

/// Service trait for locally managed user accounts.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn list_users(&self) -> ServiceResult<Vec<User>>;

    async fn get_user(&self, username: &str) -> ServiceResult<User>;

    async fn add_user(&self, user: User) -> ServiceResult<()>;

    async fn update_user_groups(&self, username: &str, groups: Vec<String>) -> ServiceResult<()>;

    async fn remove_user(&self, username: &str) -> ServiceResult<()>;

    /// Replace the password with a random one and return it.
    async fn new_password(&self, username: &str) -> ServiceResult<String>;

    /// Change the password after checking the old one.
    async fn update_password(&self, username: &str, old_password: &str, new_password: &str) -> ServiceResult<()>;

    async fn add_limited_group(&self, username: &str) -> ServiceResult<()>;

    async fn remove_limited_group(&self, username: &str) -> ServiceResult<()>;

    /// Check credentials and return the matching user.
    ///
    /// Fails with [`ErrorKind::InvalidPassword`](super::ErrorKind::InvalidPassword)
    /// when the user is unknown or the password does not match.
    async fn verify_credentials(&self, username: &str, password: &str) -> ServiceResult<User>;
}

#[async_trait]
pub trait NodeService: Send + Sync {
    async fn get_nodes(&self) -> ServiceResult<Vec<Node>>;
    async fn get_node(&self, name: &str) -> ServiceResult<Node>;
    async fn add_node(&self, node: Node) -> ServiceResult<Node>;
    async fn update_node(&self, node: Node) -> ServiceResult<Node>;
    async fn delete_node(&self, name: &str) -> ServiceResult<()>;
}
