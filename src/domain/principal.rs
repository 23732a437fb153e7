use super::PrincipalId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Customer,
}

impl Role {
    pub fn is_elevated(self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// An authenticated caller, as handed over by the auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: PrincipalId,
    pub role: Role,
}

impl Principal {
    pub fn admin(id: PrincipalId) -> Self {
        Self { id, role: Role::Admin }
    }

    pub fn customer(id: PrincipalId) -> Self {
        Self {
            id,
            role: Role::Customer,
        }
    }

    /// Admins see every order; everyone else only their own.
    pub fn can_view(&self, owner_id: PrincipalId) -> bool {
        self.role.is_elevated() || self.id == owner_id
    }
}
