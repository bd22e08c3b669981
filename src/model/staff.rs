//! A person the kitchen knows about: chefs and waiters who take orders,
//! admins who dispatch them, and customers who place them.
//!
//! # Capacity
//! `current_active_orders` is private. The only way to move it is
//! through [`crate::engine::ledger`], which pairs every change with the
//! transition or queue promotion that caused it.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::engine::EngineError;

/// Type-safe identifier for staff members and customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StaffId(pub u32);

impl From<u32> for StaffId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for StaffId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "staff_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Chef,
    Waiter,
    Admin,
    Customer,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Chef => "CHEF",
            Role::Waiter => "WAITER",
            Role::Admin => "ADMIN",
            Role::Customer => "CUSTOMER",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffMember {
    pub id: StaffId,
    pub name: String,
    pub role: Role,
    pub enabled: bool,
    pub is_available: bool,
    max_active_orders: u32,
    current_active_orders: u32,
}

/// Payload for registering a new staff member or customer.
#[derive(Debug, Clone, Deserialize)]
pub struct StaffCreate {
    pub name: String,
    pub role: Role,
    pub max_active_orders: u32,
}

impl StaffCreate {
    pub fn new(name: impl Into<String>, role: Role, max_active_orders: u32) -> Self {
        Self {
            name: name.into(),
            role,
            max_active_orders,
        }
    }
}

impl StaffMember {
    /// Builds a staff member from a registration payload.
    ///
    /// # Errors
    /// Rejects blank names and a capacity ceiling of zero: a member who can
    /// never accept an order would sit in every rotation and queue forever.
    pub fn from_create(id: StaffId, params: StaffCreate) -> Result<Self, EngineError> {
        let name = params.name.trim().to_string();
        if name.is_empty() {
            return Err(EngineError::Validation("staff name must not be empty".into()));
        }
        if params.max_active_orders == 0 {
            return Err(EngineError::Validation(format!(
                "max_active_orders must be at least 1 for {}",
                name
            )));
        }
        Ok(Self {
            id,
            name,
            role: params.role,
            enabled: true,
            is_available: true,
            max_active_orders: params.max_active_orders,
            current_active_orders: 0,
        })
    }

    pub fn max_active_orders(&self) -> u32 {
        self.max_active_orders
    }

    pub fn current_active_orders(&self) -> u32 {
        self.current_active_orders
    }

    pub fn can_accept_order(&self) -> bool {
        self.enabled && self.is_available && self.current_active_orders < self.max_active_orders
    }

    pub(crate) fn increment_active_orders(&mut self) {
        self.current_active_orders += 1;
    }

    /// Floored at zero.
    pub(crate) fn decrement_active_orders(&mut self) {
        self.current_active_orders = self.current_active_orders.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_create_rejects_zero_capacity() {
        let result = StaffMember::from_create(StaffId(1), StaffCreate::new("Remy", Role::Chef, 0));
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_from_create_rejects_blank_name() {
        let result = StaffMember::from_create(StaffId(1), StaffCreate::new("   ", Role::Chef, 2));
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_can_accept_order_requires_all_flags() {
        let mut chef =
            StaffMember::from_create(StaffId(1), StaffCreate::new("Remy", Role::Chef, 1)).unwrap();
        assert!(chef.can_accept_order());

        chef.enabled = false;
        assert!(!chef.can_accept_order());
        chef.enabled = true;

        chef.is_available = false;
        assert!(!chef.can_accept_order());
        chef.is_available = true;

        chef.increment_active_orders();
        assert!(!chef.can_accept_order());
    }

    #[test]
    fn test_decrement_never_goes_negative() {
        let mut chef =
            StaffMember::from_create(StaffId(1), StaffCreate::new("Remy", Role::Chef, 1)).unwrap();
        chef.decrement_active_orders();
        assert_eq!(chef.current_active_orders(), 0);
    }
}
