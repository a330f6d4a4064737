use async_trait::async_trait;

use super::{not_found, LocalData, LocalService};
use crate::model::admin::{LIMITED_GROUP, SUPER_USER};
use crate::model::{Group, Node, Role, User};
use crate::service::error::{ErrorKind, ServiceError, ServiceResult};
use crate::service::{GroupService, NodeService, RoleService, UserService};

const GENERATED_PASSWORD_LEN: usize = 16;

fn duplicated(name: &str) -> ServiceError {
    ServiceError::new(ErrorKind::Duplicated).with_message(name.to_string())
}

impl LocalData {
    fn user_mut(&mut self, username: &str) -> ServiceResult<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.username == username)
            .ok_or_else(|| not_found(ErrorKind::UserNotFound, username))
    }
}

// ==================== Groups ====================

#[async_trait]
impl GroupService for LocalService {
    async fn insert_group(&self, group: Group) -> ServiceResult<Group> {
        self.record("insert_group", format!("{:?}", group))?;
        let mut data = self.data.write();
        if data.groups.iter().any(|g| g.name == group.name) {
            return Err(duplicated(&group.name));
        }
        data.groups.push(group.clone());
        Ok(group)
    }

    async fn update_group(&self, group: Group) -> ServiceResult<Group> {
        self.record("update_group", format!("{:?}", group))?;
        let mut data = self.data.write();
        let stored = data
            .groups
            .iter_mut()
            .find(|g| g.name == group.name)
            .ok_or_else(|| not_found(ErrorKind::GroupNotFound, &group.name))?;
        *stored = group.clone();
        Ok(group)
    }

    async fn get_groups(&self) -> ServiceResult<Vec<Group>> {
        self.record("get_groups", String::new())?;
        Ok(self.data.read().groups.clone())
    }

    async fn get_group(&self, name: &str) -> ServiceResult<Group> {
        self.record("get_group", format!("{:?}", name))?;
        self.data
            .read()
            .groups
            .iter()
            .find(|g| g.name == name)
            .cloned()
            .ok_or_else(|| not_found(ErrorKind::GroupNotFound, name))
    }

    async fn delete_group(&self, name: &str) -> ServiceResult<()> {
        self.record("delete_group", format!("{:?}", name))?;
        let mut data = self.data.write();
        let before = data.groups.len();
        data.groups.retain(|g| g.name != name);
        if data.groups.len() == before {
            return Err(not_found(ErrorKind::GroupNotFound, name));
        }
        Ok(())
    }
}

// ==================== Roles ====================

#[async_trait]
impl RoleService for LocalService {
    async fn insert_role(&self, role: Role) -> ServiceResult<Role> {
        self.record("insert_role", format!("{:?}", role))?;
        let mut data = self.data.write();
        if data.roles.iter().any(|r| r.name == role.name) {
            return Err(duplicated(&role.name));
        }
        data.roles.push(role.clone());
        Ok(role)
    }

    async fn update_role(&self, role: Role) -> ServiceResult<Role> {
        self.record("update_role", format!("{:?}", role))?;
        let mut data = self.data.write();
        let stored = data
            .roles
            .iter_mut()
            .find(|r| r.name == role.name)
            .ok_or_else(|| not_found(ErrorKind::RoleNotFound, &role.name))?;
        *stored = role.clone();
        Ok(role)
    }

    async fn get_roles(&self) -> ServiceResult<Vec<Role>> {
        self.record("get_roles", String::new())?;
        Ok(self.data.read().roles.clone())
    }

    async fn get_role(&self, name: &str) -> ServiceResult<Role> {
        self.record("get_role", format!("{:?}", name))?;
        self.data
            .read()
            .roles
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| not_found(ErrorKind::RoleNotFound, name))
    }

    async fn delete_role(&self, name: &str) -> ServiceResult<()> {
        self.record("delete_role", format!("{:?}", name))?;
        let mut data = self.data.write();
        let before = data.roles.len();
        data.roles.retain(|r| r.name != name);
        if data.roles.len() == before {
            return Err(not_found(ErrorKind::RoleNotFound, name));
        }
        Ok(())
    }
}

// ==================== Users ====================

#[async_trait]
impl UserService for LocalService {
    async fn list_users(&self) -> ServiceResult<Vec<User>> {
        self.record("list_users", String::new())?;
        Ok(self.data.read().users.clone())
    }

    async fn get_user(&self, username: &str) -> ServiceResult<User> {
        self.record("get_user", format!("{:?}", username))?;
        self.data
            .read()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| not_found(ErrorKind::UserNotFound, username))
    }

    async fn add_user(&self, user: User) -> ServiceResult<()> {
        // The password stays out of the call log.
        self.record("add_user", format!("{:?}, {:?}", user.username, user.groups))?;
        let mut data = self.data.write();
        if data.users.iter().any(|u| u.username == user.username) {
            return Err(duplicated(&user.username));
        }
        data.users.push(user);
        Ok(())
    }

    async fn update_user_groups(&self, username: &str, groups: Vec<String>) -> ServiceResult<()> {
        self.record("update_user_groups", format!("{:?}, {:?}", username, groups))?;
        self.data.write().user_mut(username)?.groups = groups;
        Ok(())
    }

    async fn remove_user(&self, username: &str) -> ServiceResult<()> {
        self.record("remove_user", format!("{:?}", username))?;
        if username == SUPER_USER {
            return Err(ServiceError::new(ErrorKind::SuperUserCannotBeDeleted));
        }
        let mut data = self.data.write();
        let before = data.users.len();
        data.users.retain(|u| u.username != username);
        if data.users.len() == before {
            return Err(not_found(ErrorKind::UserNotFound, username));
        }
        Ok(())
    }

    async fn new_password(&self, username: &str) -> ServiceResult<String> {
        self.record("new_password", format!("{:?}", username))?;
        let password: String = uuid::Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(GENERATED_PASSWORD_LEN)
            .collect();
        self.data.write().user_mut(username)?.password = password.clone();
        Ok(password)
    }

    async fn update_password(&self, username: &str, old_password: &str, new_password: &str) -> ServiceResult<()> {
        self.record("update_password", format!("{:?}", username))?;
        let mut data = self.data.write();
        let user = data.user_mut(username)?;
        if user.password != old_password {
            return Err(ServiceError::new(ErrorKind::InvalidPassword));
        }
        user.password = new_password.to_string();
        Ok(())
    }

    async fn add_limited_group(&self, username: &str) -> ServiceResult<()> {
        self.record("add_limited_group", format!("{:?}", username))?;
        let mut data = self.data.write();
        let user = data.user_mut(username)?;
        if !user.groups.iter().any(|g| g == LIMITED_GROUP) {
            user.groups.push(LIMITED_GROUP.to_string());
        }
        Ok(())
    }

    async fn remove_limited_group(&self, username: &str) -> ServiceResult<()> {
        self.record("remove_limited_group", format!("{:?}", username))?;
        let mut data = self.data.write();
        data.user_mut(username)?.groups.retain(|g| g != LIMITED_GROUP);
        Ok(())
    }

    async fn verify_credentials(&self, username: &str, password: &str) -> ServiceResult<User> {
        self.record("verify_credentials", format!("{:?}", username))?;
        self.data
            .read()
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .cloned()
            .ok_or_else(|| ServiceError::new(ErrorKind::InvalidPassword))
    }
}

// ==================== Nodes ====================

#[async_trait]
impl NodeService for LocalService {
    async fn get_nodes(&self) -> ServiceResult<Vec<Node>> {
        self.record("get_nodes", String::new())?;
        Ok(self.data.read().nodes.clone())
    }

    async fn get_node(&self, name: &str) -> ServiceResult<Node> {
        self.record("get_node", format!("{:?}", name))?;
        self.data
            .read()
            .nodes
            .iter()
            .find(|n| n.name == name)
            .cloned()
            .ok_or_else(|| not_found(ErrorKind::NodeNotFound, name))
    }

    async fn add_node(&self, node: Node) -> ServiceResult<Node> {
        self.record("add_node", format!("{:?}", node))?;
        let mut data = self.data.write();
        if data.nodes.iter().any(|n| n.name == node.name) {
            return Err(duplicated(&node.name));
        }
        data.nodes.push(node.clone());
        Ok(node)
    }

    async fn update_node(&self, node: Node) -> ServiceResult<Node> {
        self.record("update_node", format!("{:?}", node))?;
        let mut data = self.data.write();
        let stored = data
            .nodes
            .iter_mut()
            .find(|n| n.name == node.name)
            .ok_or_else(|| not_found(ErrorKind::NodeNotFound, &node.name))?;
        *stored = node.clone();
        Ok(node)
    }

    async fn delete_node(&self, name: &str) -> ServiceResult<()> {
        self.record("delete_node", format!("{:?}", name))?;
        let mut data = self.data.write();
        let before = data.nodes.len();
        data.nodes.retain(|n| n.name != name);
        if data.nodes.len() == before {
            return Err(not_found(ErrorKind::NodeNotFound, name));
        }
        Ok(())
    }
}
