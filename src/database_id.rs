//! Database ID type definitions.
//!
//! IDs are opaque text keys. Rows created without an explicit ID are given a
//! random 32 hex-digit key by the database.

/// The ID of a [crate::User].
pub type UserId = String;
/// The ID of a [crate::Category].
pub type CategoryId = String;
/// The ID of a [crate::Payment].
pub type PaymentId = String;
/// The ID of a [crate::Transaction].
pub type TransactionId = String;

/// The number of rows changed by an update or delete.
///
/// Updates and deletes match rows by ID, so this is zero when the ID does not
/// exist. Callers should not assume it is exactly one.
pub type RowsAffected = usize;

/// The SQL expression used as the default value of ID columns.
pub(crate) const GENERATED_ID_SQL: &str = "lower(hex(randomblob(16)))";
