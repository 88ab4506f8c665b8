//! Diesel table definitions for the PostgreSQL schema.
//!
//! Must match `backend/migrations` exactly; regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Forum accounts.
    ///
    /// `email` and `phone` hold canonical identifiers and carry partial unique
    /// indexes (`accounts_email_unique`, `accounts_phone_unique`).
    accounts (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name (max 64 characters).
        display_name -> Varchar,
        /// Canonical lowercase email address.
        email -> Nullable<Varchar>,
        /// Canonical digits-only phone number.
        phone -> Nullable<Varchar>,
        /// Argon2 PHC digest.
        password_digest -> Text,
        /// Whether profile completion has run.
        profile_complete -> Bool,
        /// Avatar URL from the upload service.
        avatar_url -> Nullable<Text>,
        /// Profile bio (max 500 characters).
        bio -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp (maintained by trigger).
        updated_at -> Timestamptz,
    }
}
