//! Key-value persistence for clients, invoices, settings, and the invoice
//! counter.
//!
//! The storage model mirrors the original single-blob layout: each
//! collection serializes to one JSON string under a fixed key, and saves
//! are full overwrites with no partial-patch semantics at the blob level.
//! A missing or corrupt blob degrades to the empty/default value rather
//! than failing the caller; only genuine I/O errors surface as
//! [`StoreError`].

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::{
    BillingError, Client, CounterStore, Discount, Invoice, InvoiceNumberGenerator, InvoiceStatus,
    LineItem, Settings, validate_client, validate_invoice,
};

/// Collection keys, kept byte-compatible with the original storage layout.
pub const CLIENTS_KEY: &str = "invoice_clients";
pub const INVOICES_KEY: &str = "invoice_invoices";
pub const SETTINGS_KEY: &str = "invoice_settings";
pub const COUNTER_KEY: &str = "invoice_counter";

/// Errors from the persistence layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The record being persisted failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("numbering error: {0}")]
    Numbering(String),

    #[error("{collection} record not found: {id}")]
    NotFound {
        collection: &'static str,
        id: String,
    },
}

/// Minimal synchronous key-value surface, the shape of the original
/// browser-local storage: string keys, string blobs.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Partial update for a client record. `None` fields are left untouched;
/// the id and creation stamp are always preserved.
#[derive(Debug, Clone, Default)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    /// `Some(None)` clears the tax id.
    pub tax_id: Option<Option<String>>,
}

/// Partial update for an invoice. Merged fields trigger a totals
/// recomposition and revalidation before the save.
#[derive(Debug, Clone, Default)]
pub struct InvoicePatch {
    pub client_id: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub items: Option<Vec<LineItem>>,
    pub tax_rate: Option<Decimal>,
    /// `Some(None)` removes the discount.
    pub discount: Option<Option<Discount>>,
    pub status: Option<InvoiceStatus>,
    /// `Some(None)` clears the notes.
    pub notes: Option<Option<String>>,
}

/// Full data snapshot for backup and restore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataExport {
    pub clients: Vec<Client>,
    pub invoices: Vec<Invoice>,
    pub settings: Settings,
    pub counter: u64,
    pub exported_at: DateTime<Utc>,
}

/// CRUD repository over a [`KvStore`], covering the four collections and
/// the invoice-number counter.
pub struct Repository<S> {
    store: S,
}

impl<S: KvStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn load<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StoreError> {
        match self.store.get(key)? {
            None => Ok(T::default()),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => Ok(value),
                Err(err) => {
                    warn!(key, %err, "corrupt collection blob, falling back to default");
                    Ok(T::default())
                }
            },
        }
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        self.store.set(key, &serde_json::to_string(value)?)
    }

    // ---- clients ----

    pub fn clients(&self) -> Result<Vec<Client>, StoreError> {
        self.load(CLIENTS_KEY)
    }

    pub fn client(&self, id: &str) -> Result<Option<Client>, StoreError> {
        Ok(self.clients()?.into_iter().find(|c| c.id == id))
    }

    /// Validate and persist a new client, assigning an id and creation
    /// stamp.
    pub fn add_client(&self, mut client: Client) -> Result<Client, StoreError> {
        let report = validate_client(&client);
        if !report.is_valid() {
            return Err(StoreError::Validation(report.messages().join("; ")));
        }
        if client.id.is_empty() {
            client.id = Uuid::new_v4().to_string();
        }
        client.created_at = Utc::now();
        client.updated_at = None;

        let mut clients = self.clients()?;
        clients.push(client.clone());
        self.save(CLIENTS_KEY, &clients)?;
        debug!(id = %client.id, "client added");
        Ok(client)
    }

    /// Merge a partial update into an existing client. Preserves the id,
    /// stamps the update time, and revalidates the merged record.
    pub fn update_client(&self, id: &str, patch: ClientPatch) -> Result<Client, StoreError> {
        let mut clients = self.clients()?;
        let client = clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::NotFound {
                collection: "client",
                id: id.to_string(),
            })?;

        if let Some(name) = patch.name {
            client.name = name;
        }
        if let Some(email) = patch.email {
            client.email = email;
        }
        if let Some(address) = patch.address {
            client.address = address;
        }
        if let Some(tax_id) = patch.tax_id {
            client.tax_id = tax_id;
        }

        let report = validate_client(client);
        if !report.is_valid() {
            return Err(StoreError::Validation(report.messages().join("; ")));
        }
        client.updated_at = Some(Utc::now());

        let updated = client.clone();
        self.save(CLIENTS_KEY, &clients)?;
        debug!(id = %updated.id, "client updated");
        Ok(updated)
    }

    /// Hard delete. Invoices referencing this client keep their dangling
    /// `client_id`; there is no cascade. Returns whether a record was
    /// removed.
    pub fn delete_client(&self, id: &str) -> Result<bool, StoreError> {
        let mut clients = self.clients()?;
        let before = clients.len();
        clients.retain(|c| c.id != id);
        if clients.len() == before {
            return Ok(false);
        }
        self.save(CLIENTS_KEY, &clients)?;
        debug!(id, "client deleted");
        Ok(true)
    }

    // ---- invoices ----

    pub fn invoices(&self) -> Result<Vec<Invoice>, StoreError> {
        self.load(INVOICES_KEY)
    }

    pub fn invoice(&self, id: &str) -> Result<Option<Invoice>, StoreError> {
        Ok(self.invoices()?.into_iter().find(|inv| inv.id == id))
    }

    /// Validate and persist a new invoice. Assigns an id, a generated
    /// invoice number when none was provided, and the creation stamp.
    /// Totals are recomposed before the save. Validation runs before the
    /// counter increments, so a rejected draft never burns a number.
    pub fn add_invoice(&self, mut invoice: Invoice) -> Result<Invoice, StoreError> {
        invoice.recalculate();
        let report = validate_invoice(&invoice);
        if !report.is_valid() {
            return Err(StoreError::Validation(report.messages().join("; ")));
        }

        if invoice.id.is_empty() {
            invoice.id = Uuid::new_v4().to_string();
        }
        if invoice.number.is_empty() {
            invoice.number = self.next_invoice_number()?;
        }
        invoice.created_at = Utc::now();
        invoice.updated_at = None;

        let mut invoices = self.invoices()?;
        invoices.push(invoice.clone());
        self.save(INVOICES_KEY, &invoices)?;
        debug!(id = %invoice.id, number = %invoice.number, "invoice added");
        Ok(invoice)
    }

    /// Merge a partial update into an existing invoice, recompose totals,
    /// revalidate, and save.
    pub fn update_invoice(&self, id: &str, patch: InvoicePatch) -> Result<Invoice, StoreError> {
        let mut invoices = self.invoices()?;
        let invoice = invoices
            .iter_mut()
            .find(|inv| inv.id == id)
            .ok_or_else(|| StoreError::NotFound {
                collection: "invoice",
                id: id.to_string(),
            })?;

        if let Some(client_id) = patch.client_id {
            invoice.client_id = client_id;
        }
        if let Some(issue_date) = patch.issue_date {
            invoice.issue_date = issue_date;
        }
        if let Some(due_date) = patch.due_date {
            invoice.due_date = due_date;
        }
        if let Some(items) = patch.items {
            invoice.items = items;
        }
        if let Some(tax_rate) = patch.tax_rate {
            invoice.tax_rate = tax_rate;
        }
        if let Some(discount) = patch.discount {
            invoice.discount = discount;
        }
        if let Some(status) = patch.status {
            invoice.status = status;
        }
        if let Some(notes) = patch.notes {
            invoice.notes = notes;
        }

        invoice.recalculate();
        let report = validate_invoice(invoice);
        if !report.is_valid() {
            return Err(StoreError::Validation(report.messages().join("; ")));
        }
        invoice.updated_at = Some(Utc::now());

        let updated = invoice.clone();
        self.save(INVOICES_KEY, &invoices)?;
        debug!(id = %updated.id, "invoice updated");
        Ok(updated)
    }

    pub fn set_invoice_status(
        &self,
        id: &str,
        status: InvoiceStatus,
    ) -> Result<Invoice, StoreError> {
        self.update_invoice(
            id,
            InvoicePatch {
                status: Some(status),
                ..InvoicePatch::default()
            },
        )
    }

    /// Hard delete; returns whether a record was removed.
    pub fn delete_invoice(&self, id: &str) -> Result<bool, StoreError> {
        let mut invoices = self.invoices()?;
        let before = invoices.len();
        invoices.retain(|inv| inv.id != id);
        if invoices.len() == before {
            return Ok(false);
        }
        self.save(INVOICES_KEY, &invoices)?;
        debug!(id, "invoice deleted");
        Ok(true)
    }

    // ---- settings ----

    /// Company settings, falling back to defaults when unset.
    pub fn settings(&self) -> Result<Settings, StoreError> {
        self.load(SETTINGS_KEY)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        self.save(SETTINGS_KEY, settings)
    }

    // ---- numbering ----

    fn counter(&self) -> KvCounter<'_, S> {
        KvCounter { store: &self.store }
    }

    /// Consume the next invoice number, incrementing the persisted counter.
    pub fn next_invoice_number(&self) -> Result<String, StoreError> {
        InvoiceNumberGenerator::new(self.counter())
            .generate()
            .map_err(|e| StoreError::Numbering(e.to_string()))
    }

    /// The number the next invoice would get, without consuming it.
    pub fn preview_invoice_number(&self) -> Result<String, StoreError> {
        InvoiceNumberGenerator::new(self.counter())
            .preview()
            .map_err(|e| StoreError::Numbering(e.to_string()))
    }

    /// Explicit counter reset; never called implicitly.
    pub fn reset_invoice_counter(&self, value: u64) -> Result<(), StoreError> {
        InvoiceNumberGenerator::new(self.counter())
            .reset(value)
            .map_err(|e| StoreError::Numbering(e.to_string()))
    }

    // ---- backup ----

    pub fn export_data(&self) -> Result<DataExport, StoreError> {
        Ok(DataExport {
            clients: self.clients()?,
            invoices: self.invoices()?,
            settings: self.settings()?,
            counter: self.counter().read()?,
            exported_at: Utc::now(),
        })
    }

    /// Restore a snapshot, overwriting every collection.
    pub fn import_data(&self, data: &DataExport) -> Result<(), StoreError> {
        self.save(CLIENTS_KEY, &data.clients)?;
        self.save(INVOICES_KEY, &data.invoices)?;
        self.save_settings(&data.settings)?;
        self.store.set(COUNTER_KEY, &data.counter.to_string())?;
        debug!(
            clients = data.clients.len(),
            invoices = data.invoices.len(),
            "data imported"
        );
        Ok(())
    }

    /// Remove every collection, including the counter.
    pub fn clear_all(&self) -> Result<(), StoreError> {
        self.store.remove(CLIENTS_KEY)?;
        self.store.remove(INVOICES_KEY)?;
        self.store.remove(SETTINGS_KEY)?;
        self.store.remove(COUNTER_KEY)?;
        Ok(())
    }
}

/// [`CounterStore`] adapter over a key-value store.
///
/// `compare_and_swap` here is check-then-set: it is race-free only to the
/// extent the backing store is single-writer, which holds for both stores
/// in this crate (one process, mutex inside). A multi-process backend
/// would need to implement the trait with a genuinely atomic primitive.
struct KvCounter<'a, S> {
    store: &'a S,
}

impl<S: KvStore> KvCounter<'_, S> {
    fn read(&self) -> Result<u64, StoreError> {
        match self.store.get(COUNTER_KEY)? {
            None => Ok(0),
            Some(raw) => match raw.trim().parse() {
                Ok(value) => Ok(value),
                Err(_) => {
                    warn!(%raw, "corrupt invoice counter, falling back to 0");
                    Ok(0)
                }
            },
        }
    }
}

impl<S: KvStore> CounterStore for KvCounter<'_, S> {
    fn get(&self) -> Result<u64, BillingError> {
        self.read().map_err(|e| BillingError::CounterStore(e.to_string()))
    }

    fn set(&self, value: u64) -> Result<(), BillingError> {
        self.store
            .set(COUNTER_KEY, &value.to_string())
            .map_err(|e| BillingError::CounterStore(e.to_string()))
    }

    fn compare_and_swap(&self, current: u64, new: u64) -> Result<bool, BillingError> {
        if self.get()? != current {
            return Ok(false);
        }
        self.set(new)?;
        Ok(true)
    }
}
