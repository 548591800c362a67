//! Account model for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Account record stored in the accounts collection, keyed by email
/// (case-sensitive).
///
/// The password is stored and compared verbatim. Existing preview accounts
/// depend on that, so hardening it is an explicit compatibility break, not
/// a drop-in fix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Opaque stable handle, assigned at creation and never reused
    pub id: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    /// Cumulative reward balance
    pub points: u32,
}

/// Minimal `{id, email}` view returned by signup and login.
///
/// Names and points only load after the OTP or intake step completes.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AccountView {
    pub id: String,
    pub email: String,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            email: account.email.clone(),
        }
    }
}

/// Partial update applied field-by-field to a stored account.
///
/// Only the fields present are merged; there is no key-driven dynamic
/// merge. An email change migrates the storage key.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}
