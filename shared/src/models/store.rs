//! Store models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A physical shop location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gstin: Option<String>,
    pub is_active: bool,
}

/// User-to-store assignment. Non-admin users can only operate stores they
/// are assigned to; at most one assignment per user carries `is_default`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStore {
    pub user_id: Uuid,
    pub store_id: Uuid,
    pub is_default: bool,
}
