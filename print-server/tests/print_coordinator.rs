mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{RecordingDriver, SEPARATOR_NAME, Workspace, coordinator};
use label_printer::PrintError;
use print_server::printing::SeparatorOutcome;
use print_server::{AuditStatus, MemoryAuditLog, PrintRequest, SubmitError};

#[tokio::test]
async fn test_submit_prints_main_then_separator() {
    let ws = Workspace::new();
    ws.add_sku("ABC123", 5.0, 5.0);
    ws.add_separator();

    let driver = Arc::new(RecordingDriver::new());
    let audit = Arc::new(MemoryAuditLog::new());
    let coord = coordinator(driver.clone(), audit.clone());

    let report = coord
        .submit(&PrintRequest::new("ABC123", 3), "Label-7x5", &ws.settings(true))
        .await
        .unwrap();

    assert_eq!(report.document.display_name, "ABC123.pdf");
    assert!(matches!(report.separator, SeparatorOutcome::Printed { .. }));

    let calls = driver.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].document_name, "ABC123.pdf");
    assert_eq!(calls[0].copies, 3);
    assert!((calls[0].offset_x_pt - 28.346).abs() < 0.1);
    assert_eq!(calls[1].document_name, SEPARATOR_NAME);
    assert_eq!(calls[1].copies, 1);
    // Separator reuses the main job's geometry
    assert_eq!(calls[0].offset_x_pt, calls[1].offset_x_pt);

    let entries = audit.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].status, AuditStatus::Printed);
    assert_eq!(entries[0].quantity, 3);
    assert_eq!(entries[0].printer, "Label-7x5");
    assert_eq!(entries[1].status, AuditStatus::SeparatorPrinted);
    assert_eq!(entries[1].document_name, SEPARATOR_NAME);
}

#[tokio::test]
async fn test_zero_quantity_never_reaches_driver() {
    let ws = Workspace::new();
    ws.add_sku("ABC123", 5.0, 5.0);

    let driver = Arc::new(RecordingDriver::new());
    let audit = Arc::new(MemoryAuditLog::new());
    let coord = coordinator(driver.clone(), audit.clone());

    let err = coord
        .submit(&PrintRequest::new("ABC123", 0), "Label-7x5", &ws.settings(true))
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::InvalidQuantity));
    assert!(driver.calls().is_empty());
    assert!(audit.entries().is_empty());
}

#[tokio::test]
async fn test_missing_document_never_reaches_driver() {
    let ws = Workspace::new();

    let driver = Arc::new(RecordingDriver::new());
    let audit = Arc::new(MemoryAuditLog::new());
    let coord = coordinator(driver.clone(), audit.clone());

    let err = coord
        .submit(&PrintRequest::new("NOPE", 1), "Label-7x5", &ws.settings(true))
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::Document(PrintError::NotFound(_))));
    assert!(driver.calls().is_empty());
}

#[tokio::test]
async fn test_unconfigured_document_root() {
    let ws = Workspace::new();
    ws.add_sku("ABC123", 5.0, 5.0);

    let driver = Arc::new(RecordingDriver::new());
    let coord = coordinator(driver.clone(), Arc::new(MemoryAuditLog::new()));

    let mut settings = ws.settings(false);
    settings.document_root_dir = None;

    let err = coord
        .submit(&PrintRequest::new("ABC123", 1), "Label-7x5", &settings)
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::Document(PrintError::NotFound(_))));
    assert!(driver.calls().is_empty());
}

#[tokio::test]
async fn test_missing_driver_blocks_printing() {
    let ws = Workspace::new();
    ws.add_sku("ABC123", 5.0, 5.0);

    let driver = Arc::new(RecordingDriver::new().missing());
    let audit = Arc::new(MemoryAuditLog::new());
    let coord = coordinator(driver.clone(), audit.clone());

    let err = coord
        .submit(&PrintRequest::new("ABC123", 1), "Label-7x5", &ws.settings(true))
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::DriverNotFound(_)));
    assert!(driver.calls().is_empty());
    assert!(audit.entries().is_empty());
}

#[tokio::test]
async fn test_main_failure_skips_separator() {
    let ws = Workspace::new();
    ws.add_sku("ABC123", 5.0, 5.0);
    ws.add_separator();

    let driver = Arc::new(RecordingDriver::new().failing("ABC123.pdf"));
    let audit = Arc::new(MemoryAuditLog::new());
    let coord = coordinator(driver.clone(), audit.clone());

    let err = coord
        .submit(&PrintRequest::new("ABC123", 2), "Label-7x5", &ws.settings(true))
        .await
        .unwrap_err();

    match err {
        SubmitError::DriverFailed(outcome) => {
            assert_eq!(outcome.document_name, "ABC123.pdf");
            assert!(outcome.diagnostic_text.contains("undefinedfilename"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(driver.calls().len(), 1);
    assert!(audit.entries().is_empty());
}

#[tokio::test]
async fn test_separator_failure_still_succeeds() {
    let ws = Workspace::new();
    ws.add_sku("ABC123", 5.0, 5.0);
    ws.add_separator();

    let driver = Arc::new(RecordingDriver::new().failing(SEPARATOR_NAME));
    let audit = Arc::new(MemoryAuditLog::new());
    let coord = coordinator(driver.clone(), audit.clone());

    let report = coord
        .submit(&PrintRequest::new("ABC123", 1), "Label-7x5", &ws.settings(true))
        .await
        .unwrap();

    assert!(matches!(report.separator, SeparatorOutcome::Failed { .. }));
    assert_eq!(driver.calls().len(), 2);

    let entries = audit.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, AuditStatus::Printed);
}

#[tokio::test]
async fn test_separator_skipped_when_disabled_or_missing() {
    let ws = Workspace::new();
    ws.add_sku("ABC123", 5.0, 5.0);

    let driver = Arc::new(RecordingDriver::new());
    let coord = coordinator(driver.clone(), Arc::new(MemoryAuditLog::new()));
    let request = PrintRequest::new("ABC123", 1);

    let report = coord
        .submit(&request, "Label-7x5", &ws.settings(false))
        .await
        .unwrap();
    assert!(matches!(report.separator, SeparatorOutcome::Disabled));

    // Enabled, but the separator file was never written
    let report = coord
        .submit(&request, "Label-7x5", &ws.settings(true))
        .await
        .unwrap();
    assert!(matches!(report.separator, SeparatorOutcome::Missing { .. }));

    let mut settings = ws.settings(true);
    settings.separator_dir = None;
    let report = coord.submit(&request, "Label-7x5", &settings).await.unwrap();
    assert!(matches!(report.separator, SeparatorOutcome::NotConfigured));

    assert!(
        driver
            .calls()
            .iter()
            .all(|call| call.document_name == "ABC123.pdf")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_printer_jobs_never_overlap() {
    let ws = Workspace::new();
    ws.add_sku("A", 5.0, 5.0);
    ws.add_sku("B", 6.0, 4.0);
    ws.add_separator();

    let driver = Arc::new(RecordingDriver::new().with_delay(Duration::from_millis(100)));
    let coord = Arc::new(coordinator(driver.clone(), Arc::new(MemoryAuditLog::new())));
    let settings = ws.settings(true);

    let req_a = PrintRequest::new("A", 1);
    let req_b = PrintRequest::new("B", 1);
    let (a, b) = tokio::join!(
        coord.submit(&req_a, "Label-7x5", &settings),
        coord.submit(&req_b, "Label-7x5", &settings),
    );
    a.unwrap();
    b.unwrap();

    let calls = driver.calls();
    assert_eq!(calls.len(), 4);
    for (i, first) in calls.iter().enumerate() {
        for second in &calls[i + 1..] {
            assert!(
                !first.overlaps(second),
                "{} overlapped {}",
                first.document_name,
                second.document_name
            );
        }
    }

    // Each request's separator directly follows its own main job
    assert_ne!(calls[0].document_name, SEPARATOR_NAME);
    assert_eq!(calls[1].document_name, SEPARATOR_NAME);
    assert_ne!(calls[2].document_name, SEPARATOR_NAME);
    assert_eq!(calls[3].document_name, SEPARATOR_NAME);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_different_printers_run_concurrently() {
    let ws = Workspace::new();
    ws.add_sku("A", 5.0, 5.0);

    let driver = Arc::new(RecordingDriver::new().with_delay(Duration::from_millis(300)));
    let coord = Arc::new(coordinator(driver.clone(), Arc::new(MemoryAuditLog::new())));
    let settings = ws.settings(false);
    let request = PrintRequest::new("A", 1);

    let (a, b) = tokio::join!(
        coord.submit(&request, "Label-Left", &settings),
        coord.submit(&request, "Label-Right", &settings),
    );
    a.unwrap();
    b.unwrap();

    let calls = driver.calls();
    assert_eq!(calls.len(), 2);
    assert_ne!(calls[0].printer, calls[1].printer);
    assert!(calls[0].overlaps(&calls[1]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_dropped_caller_does_not_cancel_running_job() {
    let ws = Workspace::new();
    ws.add_sku("A", 5.0, 5.0);
    ws.add_sku("B", 5.0, 5.0);
    ws.add_separator();

    let driver = Arc::new(RecordingDriver::new().with_delay(Duration::from_millis(300)));
    let audit = Arc::new(MemoryAuditLog::new());
    let coord = coordinator(driver.clone(), audit.clone());
    let settings = ws.settings(true);

    // Caller gives up while the main job is still running
    let abandoned = tokio::time::timeout(
        Duration::from_millis(100),
        coord.submit(&PrintRequest::new("A", 2), "Label-7x5", &settings),
    )
    .await;
    assert!(abandoned.is_err());

    // The printer stays locked until the abandoned job and its separator finish
    let report = coord
        .submit(&PrintRequest::new("B", 1), "Label-7x5", &settings)
        .await
        .unwrap();
    assert_eq!(report.document.display_name, "B.pdf");

    let calls = driver.calls();
    let names: Vec<&str> = calls.iter().map(|c| c.document_name.as_str()).collect();
    assert_eq!(names, ["A.pdf", SEPARATOR_NAME, "B.pdf", SEPARATOR_NAME]);
    assert!(!calls[1].overlaps(&calls[2]));

    let entries = audit.entries();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].document_name, "A.pdf");
    assert_eq!(entries[0].quantity, 2);
    assert_eq!(entries[1].status, AuditStatus::SeparatorPrinted);
}
