//! Supplier models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input for creating or updating a supplier
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SupplierInput {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub contact_info: String,
}
