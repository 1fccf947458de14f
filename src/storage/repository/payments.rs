// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

//! Payment ledger repository.
//!
//! Ledger entries are keyed by the processor's transaction identifier, so a
//! repeated confirmation of the same session overwrites the existing entry
//! instead of appending a second one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DocumentStorage, StorageError, StorageResult};

/// Persisted payment ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoredPayment {
    /// Processor transaction identifier (unique, the upsert key).
    pub transaction_id: String,
    /// The application whose fee this payment settles.
    pub application_id: String,
    /// Scholarship name snapshot for receipts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scholarship_name: Option<String>,
    /// University name snapshot for receipts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university_name: Option<String>,
    /// Amount in major currency units.
    pub amount: f64,
    /// ISO currency code.
    pub currency: String,
    /// Payer email reported by the processor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_email: Option<String>,
    /// Settlement status (`paid` for ledgered entries).
    pub status: String,
    /// When the payment settled.
    pub paid_at: DateTime<Utc>,
}

/// Repository for the payment ledger.
pub struct PaymentRepository<'a> {
    storage: &'a DocumentStorage,
}

impl<'a> PaymentRepository<'a> {
    /// Create repository.
    pub fn new(storage: &'a DocumentStorage) -> Self {
        Self { storage }
    }

    /// Check if a ledger entry exists for a transaction.
    pub fn exists(&self, transaction_id: &str) -> bool {
        self.storage
            .exists(self.storage.paths().payment(transaction_id))
    }

    /// Get a ledger entry by transaction ID.
    pub fn get(&self, transaction_id: &str) -> StorageResult<StoredPayment> {
        let path = self.storage.paths().payment(transaction_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!(
                "Payment {transaction_id}"
            )));
        }
        self.storage.read_json(path)
    }

    /// Insert-or-refresh the entry for a transaction id.
    ///
    /// The write is keyed by the transaction id, so duplicate confirmations
    /// converge on a single document (last write wins).
    pub fn upsert(&self, payment: &StoredPayment) -> StorageResult<()> {
        self.storage.write_json(
            self.storage.paths().payment(&payment.transaction_id),
            payment,
        )
    }

    /// List the full ledger, newest first.
    pub fn list_all(&self) -> StorageResult<Vec<StoredPayment>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().payments_dir(), "json")?;

        let mut payments = Vec::new();
        for id in ids {
            if let Ok(record) = self.get(&id) {
                payments.push(record);
            }
        }

        payments.sort_by(|a, b| b.paid_at.cmp(&a.paid_at));
        Ok(payments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use std::env;
    use std::fs;

    fn test_storage() -> DocumentStorage {
        let test_dir = env::temp_dir().join(format!("test-payment-repo-{}", uuid::Uuid::new_v4()));
        let paths = StoragePaths::new(&test_dir);
        let mut storage = DocumentStorage::new(paths);
        storage.initialize().expect("initialize test storage");
        storage
    }

    fn cleanup(storage: &DocumentStorage) {
        let _ = fs::remove_dir_all(storage.paths().root());
    }

    fn sample(transaction_id: &str, amount: f64) -> StoredPayment {
        StoredPayment {
            transaction_id: transaction_id.to_string(),
            application_id: "app-1".to_string(),
            scholarship_name: Some("MIT Fellowship".to_string()),
            university_name: Some("MIT".to_string()),
            amount,
            currency: "USD".to_string(),
            payer_email: Some("student@example.com".to_string()),
            status: "paid".to_string(),
            paid_at: Utc::now(),
        }
    }

    #[test]
    fn upsert_and_get_payment() {
        let storage = test_storage();
        let repo = PaymentRepository::new(&storage);

        repo.upsert(&sample("pi_123", 25.0)).expect("upsert payment");
        let loaded = repo.get("pi_123").expect("get payment");
        assert_eq!(loaded.amount, 25.0);

        cleanup(&storage);
    }

    #[test]
    fn repeated_upsert_keeps_one_entry() {
        let storage = test_storage();
        let repo = PaymentRepository::new(&storage);

        repo.upsert(&sample("pi_123", 25.0)).expect("first upsert");
        repo.upsert(&sample("pi_123", 25.0)).expect("second upsert");

        let all = repo.list_all().expect("list");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].transaction_id, "pi_123");

        cleanup(&storage);
    }

    #[test]
    fn get_missing_payment_errors() {
        let storage = test_storage();
        let repo = PaymentRepository::new(&storage);
        let err = repo.get("missing").expect_err("missing should fail");
        assert!(matches!(err, StorageError::NotFound(_)));
        cleanup(&storage);
    }
}
