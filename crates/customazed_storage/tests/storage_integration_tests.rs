//! Integration tests for upload planning and execution.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use customazed_storage::{
    ArtifactUploader, BlobContainer, BlobUploader, DisabledUploader, MockTransport, PlannerState,
    StorageError, UploadStatus,
};
use customazed_template::{
    HashNamespace, LookupDomain, TemplateError, TemplateResult, TemplateSession, ValueLookup,
};
use tempfile::tempdir;

struct NoValues;

impl ValueLookup for NoValues {
    fn lookup(&self, _domain: LookupDomain, key: &str) -> TemplateResult<String> {
        Err(TemplateError::Lookup(format!("Key {:?} not found", key)))
    }
}

fn write_file(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

fn uploader(transport: &MockTransport) -> BlobUploader {
    let container = BlobContainer::for_account("mystore", "scripts").unwrap();
    BlobUploader::new(container, "p1", Arc::new(transport.clone()))
}

#[tokio::test]
async fn test_duplicate_registrations_transfer_once() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a.sh", "echo a");
    let b = write_file(dir.path(), "b.ps1", "Write-Host b");

    let transport = MockTransport::new();
    let mut up = uploader(&transport);

    let url_a = up.add(&a).unwrap();
    let url_b = up.add(&b).unwrap();
    assert_eq!(up.add(&a).unwrap(), url_a);
    assert_ne!(url_a, url_b);
    assert_eq!(up.pending_count(), 2);

    assert_eq!(up.execute().await.unwrap(), 2);
    assert_eq!(up.state(), PlannerState::Done);
    assert_eq!(up.pending_count(), 0);

    let puts = transport.puts();
    assert_eq!(puts.len(), 2);
    assert_eq!(puts[0].url, url_a);
    assert_eq!(puts[0].body, b"echo a");
    assert_eq!(puts[1].url, url_b);
    assert!(puts[1].url.ends_with("/b.ps1"));
}

#[tokio::test]
async fn test_second_execute_is_noop() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a.sh", "echo a");

    let transport = MockTransport::new();
    let mut up = uploader(&transport);
    up.add(&a).unwrap();

    assert_eq!(up.execute().await.unwrap(), 1);
    assert_eq!(up.execute().await.unwrap(), 0);
    assert_eq!(transport.put_count(), 1);
}

#[tokio::test]
async fn test_registration_after_execute_uploads_only_new_files() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a.sh", "echo a");
    let b = write_file(dir.path(), "b.sh", "echo b");

    let transport = MockTransport::new();
    let mut up = uploader(&transport);
    up.add(&a).unwrap();
    up.execute().await.unwrap();

    up.add(&a).unwrap();
    up.add(&b).unwrap();
    assert_eq!(up.state(), PlannerState::Planning);
    assert_eq!(up.execute().await.unwrap(), 1);
    assert_eq!(transport.put_count(), 2);
}

#[tokio::test]
async fn test_failed_transfer_leaves_rest_pending() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a.sh", "echo a");
    let b = write_file(dir.path(), "b.sh", "echo b");
    let c = write_file(dir.path(), "c.sh", "echo c");

    let transport = MockTransport::new().fail_matching("b.sh");
    let mut up = uploader(&transport);
    for source in [&a, &b, &c] {
        up.add(source).unwrap();
    }

    let err = up.execute().await.unwrap_err();
    assert!(matches!(err, StorageError::Transfer { .. }));
    let statuses: Vec<UploadStatus> = up.entries().iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        vec![
            UploadStatus::Transferred,
            UploadStatus::Pending,
            UploadStatus::Pending
        ]
    );

    transport.clear_failure();
    assert_eq!(up.execute().await.unwrap(), 2);
    assert_eq!(transport.put_count(), 3);
}

#[tokio::test]
async fn test_template_uploads_execute_after_render() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a.sh", "echo a");
    let b = write_file(dir.path(), "b.ps1", "Write-Host b");

    let transport = MockTransport::new();
    let mut up = uploader(&transport);
    let template = format!(
        "{{{{upload {:?}}}}} {{{{upload {:?}}}}} {{{{upload {:?}}}}}",
        a, b, a
    );

    let rendered = {
        let session = TemplateSession::standard(
            &NoValues,
            up.as_registry(),
            HashNamespace::from_seed("storage-test"),
        );
        session.execute(&template).unwrap()
    };

    let urls: Vec<&str> = rendered.split(' ').collect();
    assert_eq!(urls.len(), 3);
    assert_eq!(urls[0], urls[2]);
    assert_eq!(transport.put_count(), 0);
    assert_eq!(up.pending_count(), 2);

    assert_eq!(up.execute().await.unwrap(), 2);
    assert_eq!(transport.put_count(), 2);
}

#[tokio::test]
async fn test_disabled_uploader_marks_template() {
    let mut up = DisabledUploader::new("upload: forbidden in customazed.json");
    let rendering = {
        let session = TemplateSession::standard(
            &NoValues,
            up.as_registry(),
            HashNamespace::from_seed("storage-test"),
        );
        session.render(r#"url={{upload "a.sh"}}"#)
    };

    assert_eq!(
        rendering.output,
        "url=<ERROR:upload: forbidden in customazed.json>"
    );
    assert!(matches!(
        rendering.error,
        Some(TemplateError::UploadDisabled(_))
    ));
    assert_eq!(up.file_count(), 0);
    assert!(matches!(
        up.execute().await,
        Err(StorageError::UploadsForbidden(_))
    ));
}
