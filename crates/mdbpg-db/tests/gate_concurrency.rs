//! Gate capacity observed through the stores

mod common;

use common::{MemoryDocumentDriver, MemoryRelationalDriver, document_target, postgres_config, shared};
use mdbpg_db::document::DocumentStore;
use mdbpg_db::relational::RelationalStore;
use mdbpg_db::{GateConfig, Record, record};
use rstest::rstest;
use std::sync::Arc;
use std::time::Duration;

const DELAY: Duration = Duration::from_millis(20);

#[rstest]
#[case::serialized(GateConfig::bounded(1), 1)]
#[case::bounded_three(GateConfig::bounded(3), 3)]
#[case::non_positive_uses_default(GateConfig::bounded(0), 10)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_relational_calls_never_exceed_capacity(#[case] gate: GateConfig, #[case] capacity: usize) {
	// Arrange
	let driver = shared(
		MemoryRelationalDriver::new()
			.with_table("TESTTBL")
			.with_delay(DELAY),
	);
	let store = Arc::new(RelationalStore::new(postgres_config(), gate, driver.clone()));

	// Act
	let mut handles = Vec::new();
	for i in 0..16 {
		let store = store.clone();
		handles.push(tokio::spawn(async move {
			store.insert("TESTTBL", record! { "i" => i }).await
		}));
	}
	for handle in handles {
		assert!(handle.await.unwrap());
	}

	// Assert
	assert_eq!(driver.calls(), 16);
	assert!(
		driver.tracker.peak() <= capacity,
		"peak {} exceeded capacity {}",
		driver.tracker.peak(),
		capacity
	);
	assert_eq!(store.gate().available(), Some(capacity));
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_document_unlimited_gate_overlaps_calls() {
	// Arrange
	let driver = shared(MemoryDocumentDriver::new().with_delay(Duration::from_millis(100)));
	let store = Arc::new(DocumentStore::new(
		document_target(),
		GateConfig::unlimited(),
		driver.clone(),
	));

	// Act
	let mut handles = Vec::new();
	for _ in 0..8 {
		let store = store.clone();
		handles.push(tokio::spawn(async move {
			store.find("TESTCOL", &Record::new()).await
		}));
	}
	for handle in handles {
		assert_eq!(handle.await.unwrap(), Some(Vec::new()));
	}

	// Assert
	assert!(store.gate().is_unlimited());
	assert!(driver.tracker.peak() > 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_document_calls_serialize_at_capacity_one() {
	// Arrange
	let driver = shared(MemoryDocumentDriver::new().with_delay(DELAY));
	let store = Arc::new(DocumentStore::new(
		document_target(),
		GateConfig::bounded(1),
		driver.clone(),
	));

	// Act
	let mut handles = Vec::new();
	for i in 0..8 {
		let store = store.clone();
		handles.push(tokio::spawn(async move {
			store.insert("TESTCOL", record! { "i" => i }).await
		}));
	}
	for handle in handles {
		assert!(handle.await.unwrap());
	}

	// Assert
	assert_eq!(driver.calls(), 8);
	assert_eq!(driver.tracker.peak(), 1);
	assert_eq!(store.gate().available(), Some(1));
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_permit_returned_after_backend_failure() {
	// Arrange
	let driver = shared(MemoryRelationalDriver::new().with_delay(DELAY));
	let store = RelationalStore::new(postgres_config(), GateConfig::bounded(2), driver.clone());

	// Act: table does not exist, every call fails in the driver
	for _ in 0..5 {
		assert_eq!(store.find("MISSING", &Record::new()).await, None);
	}

	// Assert
	assert_eq!(driver.calls(), 5);
	assert_eq!(store.gate().available(), Some(2));
}
