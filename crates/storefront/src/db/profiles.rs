//! User profile repository.

use sqlx::PgPool;

use filament_shop_core::{Address, AddressBook, Email, Role, UserProfile, UserProfileId};

use super::RepositoryError;

/// Internal row type for profile queries.
#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: String,
    name: String,
    email: String,
    role: String,
    addresses: serde_json::Value,
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = RepositoryError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        let addresses: Vec<Address> = serde_json::from_value(row.addresses).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid addresses for profile {}: {e}", row.id))
        })?;

        Ok(Self {
            id: UserProfileId::new(row.id),
            name: row.name,
            email,
            role,
            addresses: AddressBook::new(addresses),
        })
    }
}

/// Repository for user profile database operations.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a profile by its email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<UserProfile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT id, name, email, role, addresses
            FROM storefront.user_profile
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserProfile::try_from).transpose()
    }

    /// Create a profile with an empty address book.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        role: Role,
    ) -> Result<UserProfile, RepositoryError> {
        let id = UserProfileId::generate();
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            INSERT INTO storefront.user_profile (id, name, email, role, addresses)
            VALUES ($1, $2, $3, $4, '[]'::jsonb)
            RETURNING id, name, email, role, addresses
            ",
        )
        .bind(id.as_str())
        .bind(name)
        .bind(email.as_str())
        .bind(role.to_string())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Overwrite a profile's address list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no profile has this ID.
    pub async fn save_addresses(
        &self,
        id: &UserProfileId,
        addresses: &AddressBook,
    ) -> Result<(), RepositoryError> {
        let encoded = serde_json::to_value(addresses)
            .map_err(|e| RepositoryError::DataCorruption(format!("encode addresses: {e}")))?;

        let result = sqlx::query(
            r"
            UPDATE storefront.user_profile
            SET addresses = $2, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .bind(encoded)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
