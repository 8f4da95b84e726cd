#![cfg(feature = "store")]

use billcraft::core::*;
use billcraft::store::*;
use chrono::NaiveDate;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn repo() -> Repository<MemoryStore> {
    Repository::new(MemoryStore::new())
}

fn draft_client() -> Client {
    ClientBuilder::new("Acme Traders", "billing@acme.example", "12 Market Road, Pune")
        .tax_id("22AAAAA0000A1Z5")
        .build_unchecked()
}

fn draft_invoice(client_id: &str) -> Invoice {
    InvoiceBuilder::new("", client_id, date(2026, 8, 1), date(2026, 8, 31))
        .add_item(LineItem::new("Consulting", dec!(10), dec!(150)))
        .tax_rate(dec!(18))
        .build_unchecked()
}

// --- Clients ---

#[test]
fn add_client_assigns_id_and_created_at() {
    let repo = repo();
    let client = repo.add_client(draft_client()).unwrap();
    assert!(!client.id.is_empty());
    assert!(client.updated_at.is_none());

    let loaded = repo.client(&client.id).unwrap().unwrap();
    assert_eq!(loaded, client);
}

#[test]
fn add_client_rejects_invalid() {
    let repo = repo();
    let client = ClientBuilder::new("", "bad-email", "").build_unchecked();
    let err = repo.add_client(client).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert!(repo.clients().unwrap().is_empty());
}

#[test]
fn update_client_merges_and_stamps() {
    let repo = repo();
    let client = repo.add_client(draft_client()).unwrap();

    let updated = repo
        .update_client(
            &client.id,
            ClientPatch {
                email: Some("accounts@acme.example".into()),
                tax_id: Some(None),
                ..ClientPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.id, client.id);
    assert_eq!(updated.name, client.name);
    assert_eq!(updated.email, "accounts@acme.example");
    assert_eq!(updated.tax_id, None);
    assert_eq!(updated.created_at, client.created_at);
    assert!(updated.updated_at.is_some());
}

#[test]
fn update_missing_client_is_not_found() {
    let err = repo().update_client("nope", ClientPatch::default()).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[test]
fn delete_client_is_hard_and_non_cascading() {
    let repo = repo();
    let client = repo.add_client(draft_client()).unwrap();
    let invoice = repo.add_invoice(draft_invoice(&client.id)).unwrap();

    assert!(repo.delete_client(&client.id).unwrap());
    assert!(!repo.delete_client(&client.id).unwrap());
    assert!(repo.client(&client.id).unwrap().is_none());

    // The invoice survives with a dangling client reference.
    let survivor = repo.invoice(&invoice.id).unwrap().unwrap();
    assert_eq!(survivor.client_id, client.id);
}

// --- Invoices ---

#[test]
fn add_invoice_generates_number_and_totals() {
    let repo = repo();
    let invoice = repo.add_invoice(draft_invoice("client-1")).unwrap();

    assert!(!invoice.id.is_empty());
    assert!(is_valid_invoice_number(&invoice.number));
    assert_eq!(extract_counter(&invoice.number), Some(1));
    assert_eq!(invoice.status, InvoiceStatus::Unpaid);
    assert_eq!(invoice.totals.unwrap().total, dec!(1770.00));

    let second = repo.add_invoice(draft_invoice("client-1")).unwrap();
    assert_eq!(extract_counter(&second.number), Some(2));
    assert_ne!(invoice.number, second.number);
}

#[test]
fn supplied_invoice_number_is_kept() {
    let repo = repo();
    let mut draft = draft_invoice("client-1");
    draft.number = "INV-2026-9000".into();
    let invoice = repo.add_invoice(draft).unwrap();
    assert_eq!(invoice.number, "INV-2026-9000");
    // The counter was untouched
    assert_eq!(
        extract_counter(&repo.preview_invoice_number().unwrap()),
        Some(1)
    );
}

#[test]
fn rejected_invoice_burns_no_number() {
    let repo = repo();
    let mut draft = draft_invoice("client-1");
    draft.items.clear();
    assert!(matches!(
        repo.add_invoice(draft).unwrap_err(),
        StoreError::Validation(_)
    ));
    assert_eq!(
        extract_counter(&repo.preview_invoice_number().unwrap()),
        Some(1)
    );
}

#[test]
fn update_invoice_recomposes_totals() {
    let repo = repo();
    let invoice = repo.add_invoice(draft_invoice("client-1")).unwrap();

    let updated = repo
        .update_invoice(
            &invoice.id,
            InvoicePatch {
                items: Some(vec![LineItem::new("Reduced scope", dec!(1), dec!(100))]),
                discount: Some(Some(Discount::fixed(dec!(10)))),
                tax_rate: Some(dec!(10)),
                ..InvoicePatch::default()
            },
        )
        .unwrap();

    // subtotal 100, discount 10, tax on 90 = 9, total 99
    assert_eq!(updated.totals.unwrap().total, dec!(99.00));
    assert!(updated.updated_at.is_some());
    assert_eq!(updated.number, invoice.number);
}

#[test]
fn update_rejects_invalid_merge() {
    let repo = repo();
    let invoice = repo.add_invoice(draft_invoice("client-1")).unwrap();
    let err = repo
        .update_invoice(
            &invoice.id,
            InvoicePatch {
                due_date: Some(date(2026, 7, 1)),
                ..InvoicePatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[test]
fn status_toggle() {
    let repo = repo();
    let invoice = repo.add_invoice(draft_invoice("client-1")).unwrap();
    let paid = repo
        .set_invoice_status(&invoice.id, InvoiceStatus::Paid)
        .unwrap();
    assert_eq!(paid.status, InvoiceStatus::Paid);
}

#[test]
fn delete_invoice() {
    let repo = repo();
    let invoice = repo.add_invoice(draft_invoice("client-1")).unwrap();
    assert!(repo.delete_invoice(&invoice.id).unwrap());
    assert!(!repo.delete_invoice(&invoice.id).unwrap());
    assert!(repo.invoices().unwrap().is_empty());
}

// --- Settings ---

#[test]
fn settings_fall_back_to_defaults() {
    let repo = repo();
    let settings = repo.settings().unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.default_tax_rate, dec!(18));

    let mut custom = settings;
    custom.company_name = "Billcraft Ltd".into();
    custom.currency_symbol = "₹".into();
    repo.save_settings(&custom).unwrap();
    assert_eq!(repo.settings().unwrap(), custom);
}

// --- Numbering through the repository ---

#[test]
fn preview_has_no_side_effect() {
    let repo = repo();
    let first = repo.preview_invoice_number().unwrap();
    let second = repo.preview_invoice_number().unwrap();
    assert_eq!(first, second);
    assert_eq!(repo.next_invoice_number().unwrap(), first);
}

#[test]
fn counter_reset_is_explicit() {
    let repo = repo();
    repo.next_invoice_number().unwrap();
    repo.next_invoice_number().unwrap();
    repo.reset_invoice_counter(0).unwrap();
    assert_eq!(
        extract_counter(&repo.next_invoice_number().unwrap()),
        Some(1)
    );
}

// --- Fallbacks ---

#[test]
fn corrupt_collection_degrades_to_empty() {
    let store = MemoryStore::new();
    store.set(CLIENTS_KEY, "{ not json").unwrap();
    store.set(COUNTER_KEY, "many").unwrap();

    let repo = Repository::new(store);
    assert!(repo.clients().unwrap().is_empty());
    // Corrupt counter restarts from zero
    assert_eq!(
        extract_counter(&repo.next_invoice_number().unwrap()),
        Some(1)
    );
}

// --- Backup ---

#[test]
fn export_import_round_trip() {
    let source = repo();
    let client = source.add_client(draft_client()).unwrap();
    source.add_invoice(draft_invoice(&client.id)).unwrap();
    let snapshot = source.export_data().unwrap();
    assert_eq!(snapshot.counter, 1);

    let target = repo();
    target.import_data(&snapshot).unwrap();
    assert_eq!(target.clients().unwrap(), snapshot.clients);
    assert_eq!(target.invoices().unwrap(), snapshot.invoices);
    assert_eq!(target.settings().unwrap(), snapshot.settings);
    // Counter continues where the snapshot left off
    assert_eq!(
        extract_counter(&target.next_invoice_number().unwrap()),
        Some(2)
    );
}

#[test]
fn clear_all_removes_everything() {
    let repo = repo();
    let client = repo.add_client(draft_client()).unwrap();
    repo.add_invoice(draft_invoice(&client.id)).unwrap();
    repo.clear_all().unwrap();

    assert!(repo.clients().unwrap().is_empty());
    assert!(repo.invoices().unwrap().is_empty());
    assert_eq!(repo.settings().unwrap(), Settings::default());
    assert_eq!(
        extract_counter(&repo.next_invoice_number().unwrap()),
        Some(1)
    );
}

// --- File-backed store ---

#[test]
fn json_file_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("billcraft.json");

    let client = {
        let repo = Repository::new(JsonFileStore::new(&path));
        repo.add_client(draft_client()).unwrap()
    };

    let reopened = Repository::new(JsonFileStore::new(&path));
    let loaded = reopened.client(&client.id).unwrap().unwrap();
    assert_eq!(loaded, client);
}

#[test]
fn json_file_store_tolerates_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("billcraft.json");
    std::fs::write(&path, "not json at all").unwrap();

    let repo = Repository::new(JsonFileStore::new(&path));
    assert!(repo.clients().unwrap().is_empty());
    // Writes recover the file
    repo.add_client(draft_client()).unwrap();
    assert_eq!(repo.clients().unwrap().len(), 1);
}
