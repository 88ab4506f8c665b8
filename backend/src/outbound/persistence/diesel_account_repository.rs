//! PostgreSQL-backed `AccountRepository` implementation using Diesel ORM.
//!
//! Uniqueness of email and phone is enforced by partial unique indexes. A
//! violation is reported by index name and mapped to
//! [`AccountPersistenceError::UniqueViolation`] for the matching field.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{AccountPersistenceError, AccountRepository};
use crate::domain::{
    Account, AccountId, AccountParts, AvatarRef, Bio, DisplayName, EmailAddress, IdentifierKind,
    NewAccount, PasswordDigest, PhoneNumber, ProfileUpdate, StoredAccount,
};

use super::models::{AccountRow, NewAccountRow, ProfileChangeset};
use super::pool::{DbPool, PoolError};
use super::schema::accounts;

const EMAIL_UNIQUE: &str = "accounts_email_unique";
const PHONE_UNIQUE: &str = "accounts_phone_unique";

/// Diesel-backed implementation of the `AccountRepository` port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AccountPersistenceError {
    AccountPersistenceError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> AccountPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            match info.constraint_name() {
                Some(EMAIL_UNIQUE) => AccountPersistenceError::unique_violation(IdentifierKind::Email),
                Some(PHONE_UNIQUE) => AccountPersistenceError::unique_violation(IdentifierKind::Phone),
                _ => AccountPersistenceError::query("unique constraint violated"),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            AccountPersistenceError::connection("database connection error")
        }
        DieselError::NotFound => AccountPersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => AccountPersistenceError::query("database query error"),
        _ => AccountPersistenceError::query("database error"),
    }
}

fn corrupt_row(id: uuid::Uuid, column: &str) -> AccountPersistenceError {
    debug!(account_id = %id, column, "stored account row failed validation");
    AccountPersistenceError::query(format!("stored account has invalid {column}"))
}

/// Convert a row into the domain record, re-validating every column.
fn row_to_stored(row: AccountRow) -> Result<StoredAccount, AccountPersistenceError> {
    let id = row.id;
    let display_name =
        DisplayName::new(&row.display_name).map_err(|_| corrupt_row(id, "display_name"))?;
    let email = row
        .email
        .map(EmailAddress::parse_canonical)
        .transpose()
        .map_err(|_| corrupt_row(id, "email"))?;
    let phone = row
        .phone
        .map(PhoneNumber::parse_canonical)
        .transpose()
        .map_err(|_| corrupt_row(id, "phone"))?;
    let avatar = row
        .avatar_url
        .as_deref()
        .map(AvatarRef::parse)
        .transpose()
        .map_err(|_| corrupt_row(id, "avatar_url"))?;
    let bio = row
        .bio
        .map(Bio::new)
        .transpose()
        .map_err(|_| corrupt_row(id, "bio"))?;

    let account = Account::from_parts(AccountParts {
        id: AccountId::from_uuid(id),
        display_name,
        email,
        phone,
        profile_complete: row.profile_complete,
        avatar,
        bio,
    })
    .map_err(|_| corrupt_row(id, "email/phone"))?;
    Ok(StoredAccount::new(
        account,
        PasswordDigest::new(row.password_digest),
    ))
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn find_by_id(
        &self,
        id: &AccountId,
    ) -> Result<Option<StoredAccount>, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AccountRow> = accounts::table
            .find(id.as_uuid())
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_stored).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredAccount>, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AccountRow> = accounts::table
            .filter(accounts::email.eq(email.as_str()))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_stored).transpose()
    }

    async fn find_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<StoredAccount>, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AccountRow> = accounts::table
            .filter(accounts::phone.eq(phone.as_str()))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_stored).transpose()
    }

    async fn create(&self, account: &NewAccount) -> Result<StoredAccount, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewAccountRow {
            id: *account.id().as_uuid(),
            display_name: account.display_name().as_str(),
            email: account.email().map(EmailAddress::as_str),
            phone: account.phone().map(PhoneNumber::as_str),
            password_digest: account.password_digest().as_str(),
        };
        let row = diesel::insert_into(accounts::table)
            .values(&new_row)
            .returning(AccountRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_stored(row)
    }

    async fn update_profile(
        &self,
        id: &AccountId,
        update: &ProfileUpdate,
    ) -> Result<Option<StoredAccount>, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = ProfileChangeset {
            avatar_url: update.avatar.as_ref().map(AvatarRef::as_str),
            bio: update.bio.as_ref().map(Bio::as_str),
            profile_complete: true,
        };
        let row: Option<AccountRow> = diesel::update(accounts::table.find(id.as_uuid()))
            .set(&changes)
            .returning(AccountRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_stored).transpose()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::Utc;
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    struct ConstraintInfo(Option<&'static str>);

    impl DatabaseErrorInformation for ConstraintInfo {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            Some("accounts")
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.0
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn unique_violation(constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(ConstraintInfo(constraint)),
        )
    }

    fn row() -> AccountRow {
        AccountRow {
            id: uuid::Uuid::new_v4(),
            display_name: "Ada".to_owned(),
            email: Some("ada@example.com".to_owned()),
            phone: Some("250781234567".to_owned()),
            password_digest: "$argon2id$stub".to_owned(),
            profile_complete: true,
            avatar_url: Some("https://cdn.example.com/ada.png".to_owned()),
            bio: Some("hello".to_owned()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    #[case(Some(EMAIL_UNIQUE), AccountPersistenceError::unique_violation(IdentifierKind::Email))]
    #[case(Some(PHONE_UNIQUE), AccountPersistenceError::unique_violation(IdentifierKind::Phone))]
    #[case(Some("accounts_pkey"), AccountPersistenceError::query("unique constraint violated"))]
    #[case(None, AccountPersistenceError::query("unique constraint violated"))]
    fn unique_violations_map_by_index_name(
        #[case] constraint: Option<&'static str>,
        #[case] expected: AccountPersistenceError,
    ) {
        assert_eq!(map_diesel_error(unique_violation(constraint)), expected);
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(repo_err, AccountPersistenceError::Connection { .. }));
        assert!(repo_err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let repo_err = map_diesel_error(DieselError::NotFound);
        assert_eq!(repo_err, AccountPersistenceError::query("record not found"));
    }

    #[rstest]
    fn row_converts_to_stored_account() {
        let stored = row_to_stored(row()).expect("valid row");
        let account = stored.account();
        assert_eq!(account.phone().map(PhoneNumber::as_str), Some("250781234567"));
        assert!(account.profile_complete());
        assert_eq!(stored.password_digest().as_str(), "$argon2id$stub");
    }

    #[rstest]
    fn non_canonical_email_row_is_rejected() {
        let mut bad = row();
        bad.email = Some("Ada@Example.com".to_owned());
        let err = row_to_stored(bad).expect_err("invalid row");
        assert_eq!(err, AccountPersistenceError::query("stored account has invalid email"));
    }

    #[rstest]
    fn row_without_identifiers_is_rejected() {
        let mut bad = row();
        bad.email = None;
        bad.phone = None;
        assert!(row_to_stored(bad).is_err());
    }
}
