use shared::{Bank, UpdateBankRequest};
use thiserror::Error;
use tracing::{info, warn};

use crate::db::{BankChanges, DbConnection, NewBank, PersistenceError};

/// Column width of the original `NVARCHAR(255)` schema
pub const MAX_FIELD_LENGTH: usize = 255;

/// Outcomes callers of [`BankService`] must handle besides success
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BankError {
    /// Caller input was rejected; retrying the same input will fail again
    #[error("{0}")]
    Validation(String),

    #[error("Bank {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub type BankResult<T> = Result<T, BankError>;

/// Validation and business rules for bank records, in front of the store
#[derive(Clone)]
pub struct BankService {
    db: DbConnection,
}

impl BankService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Create a bank from untrimmed caller input
    pub async fn create_bank(&self, name: &str, location: &str) -> BankResult<Bank> {
        info!("Creating bank: name={}, location={}", name, location);

        let new_bank = NewBank {
            name: validate_field("name", name)?,
            location: validate_field("location", location)?,
        };

        let bank = self.db.insert_bank(&new_bank).await?;

        info!("Created bank: {} with ID: {}", bank.name, bank.id);
        Ok(bank)
    }

    pub async fn get_bank(&self, id: i64) -> BankResult<Bank> {
        info!("Getting bank: {}", id);

        match self.db.get_bank(id).await? {
            Some(bank) => Ok(bank),
            None => {
                warn!("Bank not found: {}", id);
                Err(BankError::NotFound(id))
            }
        }
    }

    pub async fn list_banks(&self) -> BankResult<Vec<Bank>> {
        let banks = self.db.list_banks().await?;
        info!("Found {} banks", banks.len());
        Ok(banks)
    }

    /// Update the supplied fields and return the stored result.
    ///
    /// Input is validated before the store is consulted, so an invalid body
    /// for a missing id reports the validation problem.
    pub async fn update_bank(&self, id: i64, request: UpdateBankRequest) -> BankResult<Bank> {
        info!("Updating bank: {}", id);

        if request.name.is_none() && request.location.is_none() {
            return Err(BankError::Validation(
                "At least one of name or location must be provided".to_string(),
            ));
        }

        let changes = BankChanges {
            name: request.name.as_deref().map(|n| validate_field("name", n)).transpose()?,
            location: request
                .location
                .as_deref()
                .map(|l| validate_field("location", l))
                .transpose()?,
        };

        if !self.db.update_bank(id, &changes).await? {
            warn!("Bank not found for update: {}", id);
            return Err(BankError::NotFound(id));
        }

        // a concurrent delete between the update and this read surfaces as NotFound
        let bank = self.get_bank(id).await?;

        info!("Updated bank: {} with ID: {}", bank.name, bank.id);
        Ok(bank)
    }

    /// Delete a bank; deleting the same id twice reports NotFound the second time
    pub async fn delete_bank(&self, id: i64) -> BankResult<()> {
        info!("Deleting bank: {}", id);

        if !self.db.delete_bank(id).await? {
            warn!("Bank not found for deletion: {}", id);
            return Err(BankError::NotFound(id));
        }

        info!("Deleted bank with ID: {}", id);
        Ok(())
    }
}

/// Trim a required text field and check it is non-empty and fits the column
fn validate_field(field: &str, value: &str) -> BankResult<String> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        warn!("Validation failed: {} is required", field);
        return Err(BankError::Validation(format!("Bank {} is required", field)));
    }

    if trimmed.chars().count() > MAX_FIELD_LENGTH {
        warn!("Validation failed: {} too long", field);
        return Err(BankError::Validation(format!(
            "Bank {} cannot exceed {} characters",
            field, MAX_FIELD_LENGTH
        )));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test() -> BankService {
        let db = DbConnection::in_memory().await.expect("Failed to create test database");
        BankService::new(db)
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let service = setup_test().await;

        let pairs = [
            ("Wells Fargo", "San Francisco, CA"),
            ("Bank of America", "Charlotte, NC"),
            ("JPMorgan Chase", "New York, NY"),
        ];

        for (name, location) in pairs {
            let created = service.create_bank(name, location).await.expect("Failed to create bank");
            let fetched = service.get_bank(created.id).await.expect("Failed to get bank");
            assert_eq!(fetched.name, name);
            assert_eq!(fetched.location, location);
            assert_eq!(fetched.id, created.id);
        }
    }

    #[tokio::test]
    async fn test_create_trims_input() {
        let service = setup_test().await;

        let bank = service.create_bank("  Padded Bank ", "\tPadded City\n").await.unwrap();
        assert_eq!(bank.name, "Padded Bank");
        assert_eq!(bank.location, "Padded City");
    }

    #[tokio::test]
    async fn test_create_rejects_empty_fields() {
        let service = setup_test().await;

        let err = service.create_bank("", "City").await.unwrap_err();
        assert_eq!(err, BankError::Validation("Bank name is required".to_string()));

        let err = service.create_bank("Name", "   ").await.unwrap_err();
        assert_eq!(err, BankError::Validation("Bank location is required".to_string()));

        let banks = service.list_banks().await.unwrap();
        assert!(banks.is_empty(), "No row should have been inserted");
    }

    #[tokio::test]
    async fn test_create_rejects_overlong_fields() {
        let service = setup_test().await;

        let long_name = "x".repeat(MAX_FIELD_LENGTH + 1);
        let err = service.create_bank(&long_name, "City").await.unwrap_err();
        assert!(matches!(err, BankError::Validation(_)));

        let max_name = "x".repeat(MAX_FIELD_LENGTH);
        assert!(service.create_bank(&max_name, "City").await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_names_allowed() {
        let service = setup_test().await;

        let first = service.create_bank("Twin Bank", "East").await.unwrap();
        let second = service.create_bank("Twin Bank", "West").await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_missing_ids_report_not_found() {
        let service = setup_test().await;

        assert_eq!(service.get_bank(404).await.unwrap_err(), BankError::NotFound(404));

        let request = UpdateBankRequest {
            name: Some("Ghost".to_string()),
            location: None,
        };
        assert_eq!(
            service.update_bank(404, request).await.unwrap_err(),
            BankError::NotFound(404)
        );

        assert_eq!(service.delete_bank(404).await.unwrap_err(), BankError::NotFound(404));
    }

    #[tokio::test]
    async fn test_list_after_creates() {
        let service = setup_test().await;
        assert!(service.list_banks().await.unwrap().is_empty());

        for i in 0..5 {
            service
                .create_bank(&format!("Bank {}", i), "Test City")
                .await
                .unwrap();
        }

        let banks = service.list_banks().await.unwrap();
        assert_eq!(banks.len(), 5);
        for bank in &banks {
            let fetched = service.get_bank(bank.id).await.unwrap();
            assert_eq!(&fetched, bank);
        }
    }

    #[tokio::test]
    async fn test_update_single_field() {
        let service = setup_test().await;
        let bank = service.create_bank("Bank of America", "Charlotte, NC").await.unwrap();

        let request = UpdateBankRequest {
            name: None,
            location: Some(" Charlotte, North Carolina ".to_string()),
        };
        let updated = service.update_bank(bank.id, request).await.unwrap();

        assert_eq!(updated.name, "Bank of America");
        assert_eq!(updated.location, "Charlotte, North Carolina");
        assert!(updated.updated_at >= bank.updated_at);
    }

    #[tokio::test]
    async fn test_update_validation() {
        let service = setup_test().await;
        let bank = service.create_bank("Stable", "Place").await.unwrap();

        let err = service
            .update_bank(bank.id, UpdateBankRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BankError::Validation(_)));

        let request = UpdateBankRequest {
            name: Some("".to_string()),
            location: Some("Elsewhere".to_string()),
        };
        let err = service.update_bank(bank.id, request).await.unwrap_err();
        assert_eq!(err, BankError::Validation("Bank name is required".to_string()));

        // nothing changed
        let fetched = service.get_bank(bank.id).await.unwrap();
        assert_eq!(fetched.location, "Place");
    }

    #[tokio::test]
    async fn test_delete_is_durable() {
        let service = setup_test().await;
        let bank = service.create_bank("Short Lived", "Nowhere").await.unwrap();

        service.delete_bank(bank.id).await.expect("Failed to delete bank");

        assert_eq!(service.get_bank(bank.id).await.unwrap_err(), BankError::NotFound(bank.id));
        assert_eq!(
            service.delete_bank(bank.id).await.unwrap_err(),
            BankError::NotFound(bank.id)
        );
    }

    #[tokio::test]
    async fn test_store_failure_is_persistence_error() {
        let db = DbConnection::in_memory().await.unwrap();
        let service = BankService::new(db.clone());
        db.close().await;

        let err = service.list_banks().await.unwrap_err();
        assert!(matches!(err, BankError::Persistence(PersistenceError::Unavailable(_))));
    }
}
