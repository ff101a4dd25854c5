// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Allowed-role sets for route groups.

use std::fmt;

use wardrobe_core::types::Role;

/// A small, fixed set of roles a route accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSet {
    user: bool,
    admin: bool,
}

impl RoleSet {
    /// Administrators only.
    pub const ADMIN: Self = Self {
        user: false,
        admin: true,
    };

    /// Any signed-in account.
    pub const SHOPPER: Self = Self {
        user: true,
        admin: true,
    };

    /// Builds a set from explicit roles.
    pub fn of(roles: &[Role]) -> Self {
        roles.iter().fold(
            Self {
                user: false,
                admin: false,
            },
            |mut set, role| {
                match role {
                    Role::User => set.user = true,
                    Role::Admin => set.admin = true,
                }
                set
            },
        )
    }

    /// Returns `true` if `role` is allowed.
    pub fn contains(&self, role: Role) -> bool {
        match role {
            Role::User => self.user,
            Role::Admin => self.admin,
        }
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [Role::User, Role::Admin]
            .into_iter()
            .filter(|role| self.contains(*role))
            .map(|role| role.as_str())
            .collect();
        write!(f, "{}", names.join("|"))
    }
}
