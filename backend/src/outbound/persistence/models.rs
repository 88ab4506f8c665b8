//! Internal Diesel row structs for the `accounts` table.
//!
//! These never leave the persistence layer; the repository converts them to
//! domain types and rejects rows that violate domain invariants.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::accounts;

/// Row struct for reading from the accounts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: Uuid,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password_digest: String,
    pub profile_complete: bool,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    #[expect(dead_code, reason = "selected for audit queries, not mapped to the domain")]
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "selected for audit queries, not mapped to the domain")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating account records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub(crate) struct NewAccountRow<'a> {
    pub id: Uuid,
    pub display_name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub password_digest: &'a str,
}

/// Changeset applied by profile completion.
///
/// `treat_none_as_null` so a missing avatar or bio clears the column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = accounts)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProfileChangeset<'a> {
    pub avatar_url: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub profile_complete: bool,
}
