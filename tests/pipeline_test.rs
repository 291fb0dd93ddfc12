//! End-to-end tests for the statement pipeline, running against the in-memory clients.

use lopdf::Document;
use statement_mailer::mail::{Mailer, TestMailer};
use statement_mailer::run::{process_period, RunReport};
use statement_mailer::store::{ObjectStore, SeedRow, TestStore};
use statement_mailer::{Config, Period};
use std::sync::Arc;

const DATA_KEY: &str = "transactions/month=2025-11/cust_id=C1/part-0000.parquet";
const OUTPUT_KEY: &str = "emails-data/month=2025-11/C1_statement_2025-11.pdf";

fn test_config() -> Config {
    serde_json::from_str(r#"{"bucket": "test-bucket", "sender": "statements@bank.example"}"#)
        .unwrap()
}

fn period() -> Period {
    "2025-11".parse().unwrap()
}

fn row(date: &str, description: &str, amount: f64, balance: f64) -> SeedRow {
    SeedRow {
        customer_id: "C1".to_string(),
        first_name: "Priya".to_string(),
        email_id: "priya@example.com".to_string(),
        phone_no: "1234567890".to_string(),
        account_id: "ACC-77".to_string(),
        transaction_date: date.to_string(),
        description: description.to_string(),
        amount,
        availablebalance: balance,
    }
}

fn seeded_store() -> TestStore {
    let store = TestStore::new();
    store
        .put_parquet(
            DATA_KEY,
            &[
                row("2025-11-05", "Salary Credit", 500.0, 1500.0),
                row("2025-11-12", "Card Payment", -200.0, 1300.0),
            ],
        )
        .unwrap();
    store
}

async fn run(config: &Config, store: &Arc<TestStore>, mailer: &Arc<TestMailer>) -> RunReport {
    process_period(
        config,
        store.clone() as Arc<dyn ObjectStore>,
        Some(mailer.clone() as Arc<dyn Mailer>),
        period(),
    )
    .await
    .unwrap()
}

fn output_keys(store: &TestStore) -> Vec<String> {
    store
        .keys()
        .into_iter()
        .filter(|key| key.starts_with("emails-data/"))
        .collect()
}

#[tokio::test]
async fn test_end_to_end_statement() {
    let config = test_config();
    let store = Arc::new(seeded_store());
    let mailer = Arc::new(TestMailer::new());

    let report = run(&config, &store, &mailer).await;

    assert_eq!(1, report.customers());
    assert_eq!(1, report.rendered());
    assert_eq!(1, report.uploaded());
    assert_eq!(1, report.emailed());
    assert_eq!(0, report.skipped());
    assert_eq!(0, report.failed());

    // The protected statement landed at the expected key.
    let pdf = store.object(OUTPUT_KEY).expect("statement not uploaded");
    assert_eq!(
        Some("application/pdf".to_string()),
        store.content_type(OUTPUT_KEY)
    );

    // The statement requires the derived password, the last four digits of the phone number.
    let mut locked = Document::load_mem(&pdf).unwrap();
    assert!(locked.is_encrypted());
    assert!(locked.decrypt("0000").is_err());

    let mut document = Document::load_mem(&pdf).unwrap();
    document.decrypt("7890").unwrap();
    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    let text = document.extract_text(&pages).unwrap();
    assert!(text.contains("Monthly Bank Statement"));
    assert!(text.contains("Account Holder: Priya"));
    assert!(text.contains("Account No: ACC-77"));
    assert!(text.contains("Statement Period: 2025-11"));
    assert!(text.contains("Total Credits: 500.00"));
    assert!(text.contains("Total Debits: 200.00"));
    assert!(text.contains("Closing Balance: 1,300.00"));
    assert!(text.contains("Salary Credit"));
    assert!(text.contains("Card Payment"));

    // The email went to the customer with the statement attached.
    let sent = mailer.sent();
    assert_eq!(1, sent.len());
    assert_eq!("priya@example.com", sent[0].to);
    let raw = String::from_utf8_lossy(&sent[0].raw);
    assert!(raw.contains("Subject: Your Monthly Bank Statement - 2025-11"));
    assert!(raw.contains("C1_statement_2025-11.pdf"));
    assert!(raw.contains("Dear Priya,"));
    assert!(raw.contains("the password has been sent separately"));
}

#[tokio::test]
async fn test_customer_without_data_is_skipped() {
    let config = test_config();
    let store = TestStore::new();
    store.insert(
        "transactions/month=2025-11/cust_id=C9/_SUCCESS",
        Vec::new(),
        "application/octet-stream",
    );
    let store = Arc::new(store);
    let mailer = Arc::new(TestMailer::new());

    let report = run(&config, &store, &mailer).await;

    assert_eq!(1, report.customers());
    assert_eq!(1, report.skipped());
    assert_eq!(0, report.rendered());
    assert_eq!(0, report.failed());
    assert!(output_keys(&store).is_empty());
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn test_multiple_data_files_merge_into_one_statement() {
    let config = test_config();
    let store = TestStore::new();
    store
        .put_parquet(
            "transactions/month=2025-11/cust_id=C1/part-0001.parquet",
            &[row("2025-11-12", "Card Payment", -200.0, 1300.0)],
        )
        .unwrap();
    store
        .put_parquet(
            "transactions/month=2025-11/cust_id=C1/part-0000.parquet",
            &[row("2025-11-05", "Salary Credit", 500.0, 1500.0)],
        )
        .unwrap();
    let store = Arc::new(store);
    let mailer = Arc::new(TestMailer::new());

    let report = run(&config, &store, &mailer).await;

    assert_eq!(1, report.rendered());
    let pdf = store.object(OUTPUT_KEY).unwrap();
    let mut document = Document::load_mem(&pdf).unwrap();
    document.decrypt("7890").unwrap();
    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    let text = document.extract_text(&pages).unwrap();
    assert!(text.contains("Salary Credit"));
    assert!(text.contains("Card Payment"));
    assert!(text.contains("Closing Balance: 1,300.00"));
}

#[tokio::test]
async fn test_rerun_overwrites_previous_output() {
    let config = test_config();
    let store = Arc::new(seeded_store());
    let mailer = Arc::new(TestMailer::new());

    let first = run(&config, &store, &mailer).await;
    let second = run(&config, &store, &mailer).await;

    assert_eq!(1, first.uploaded());
    assert_eq!(1, second.uploaded());
    assert_eq!(vec![OUTPUT_KEY.to_string()], output_keys(&store));
}

#[tokio::test]
async fn test_upload_failure_still_emails() {
    let config = test_config();
    let store = Arc::new(seeded_store());
    store.set_fail_puts(true);
    let mailer = Arc::new(TestMailer::new());

    let report = run(&config, &store, &mailer).await;

    assert_eq!(1, report.rendered());
    assert_eq!(0, report.uploaded());
    assert_eq!(1, report.emailed());
    assert_eq!(0, report.failed());
    assert!(output_keys(&store).is_empty());
    assert_eq!(1, mailer.sent().len());
}

#[tokio::test]
async fn test_customer_without_email_address_is_not_emailed() {
    let config = test_config();
    let store = TestStore::new();
    let mut bad_email = row("2025-11-05", "Salary Credit", 500.0, 1500.0);
    bad_email.email_id = "not-an-address".to_string();
    store.put_parquet(DATA_KEY, &[bad_email]).unwrap();
    let store = Arc::new(store);
    let mailer = Arc::new(TestMailer::new());

    let report = run(&config, &store, &mailer).await;

    assert_eq!(1, report.rendered());
    assert_eq!(1, report.uploaded());
    assert_eq!(0, report.emailed());
    assert_eq!(0, report.failed());
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn test_without_mailer_still_uploads() {
    let config = test_config();
    let store = Arc::new(seeded_store());

    let report = process_period(
        &config,
        store.clone() as Arc<dyn ObjectStore>,
        None,
        period(),
    )
    .await
    .unwrap();

    assert_eq!(1, report.rendered());
    assert_eq!(1, report.uploaded());
    assert_eq!(0, report.emailed());
    assert!(store.object(OUTPUT_KEY).is_some());
}

#[tokio::test]
async fn test_upload_toggle_off_still_emails() {
    let config: Config = serde_json::from_str(
        r#"{"bucket": "test-bucket", "sender": "statements@bank.example", "upload_to_store": false}"#,
    )
    .unwrap();
    let store = Arc::new(seeded_store());
    let mailer = Arc::new(TestMailer::new());

    let report = run(&config, &store, &mailer).await;

    assert_eq!(1, report.rendered());
    assert_eq!(0, report.uploaded());
    assert_eq!(1, report.emailed());
    assert!(output_keys(&store).is_empty());
}
