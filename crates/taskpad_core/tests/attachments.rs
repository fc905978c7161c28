mod support;

use std::fs;
use support::{FakePicker, Harness, NOW_MS};
use taskpad_core::{
    load_tasks, AttachmentError, AttachmentManager, Capability, PortError, StoreError, TaskDraft,
};

#[test]
fn persist_to_task_copies_into_task_scoped_directory() {
    let documents = tempfile::tempdir().unwrap();
    let sources = tempfile::tempdir().unwrap();
    let source = sources.path().join("receipt.pdf");
    fs::write(&source, b"pdf-bytes").unwrap();

    let manager = AttachmentManager::local(
        documents.path(),
        Box::new(FakePicker::returning(Ok(None))),
    );
    let stored = manager
        .persist_to_task(1234, &format!("file://{}", source.display()))
        .unwrap();

    assert_eq!(
        stored,
        documents.path().join("tasks").join("1234").join("receipt.pdf")
    );
    assert_eq!(fs::read(&stored).unwrap(), b"pdf-bytes");
    assert!(source.exists(), "source must be copied, not moved");
}

#[test]
fn repeated_attachments_reuse_directory_and_overwrite_same_name() {
    let documents = tempfile::tempdir().unwrap();
    let sources = tempfile::tempdir().unwrap();
    let first_dir = sources.path().join("first");
    let second_dir = sources.path().join("second");
    fs::create_dir_all(&first_dir).unwrap();
    fs::create_dir_all(&second_dir).unwrap();
    fs::write(first_dir.join("notes.txt"), b"old").unwrap();
    fs::write(second_dir.join("notes.txt"), b"new").unwrap();

    let manager = AttachmentManager::local(
        documents.path(),
        Box::new(FakePicker::returning(Ok(None))),
    );
    let first = manager
        .persist_to_task(7, first_dir.join("notes.txt").to_str().unwrap())
        .unwrap();
    let second = manager
        .persist_to_task(7, second_dir.join("notes.txt").to_str().unwrap())
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"new");
}

#[test]
fn source_without_file_name_is_rejected() {
    let documents = tempfile::tempdir().unwrap();
    let manager = AttachmentManager::local(
        documents.path(),
        Box::new(FakePicker::returning(Ok(None))),
    );

    let err = manager.persist_to_task(1, "file:///cache/").unwrap_err();
    assert!(matches!(err, AttachmentError::InvalidSource(_)));
    assert!(!manager.task_directory(1).exists());
}

#[test]
fn missing_source_reports_io_error() {
    let documents = tempfile::tempdir().unwrap();
    let manager = AttachmentManager::local(
        documents.path(),
        Box::new(FakePicker::returning(Ok(None))),
    );

    let err = manager
        .persist_to_task(1, "/definitely/not/here/missing.bin")
        .unwrap_err();
    assert!(matches!(err, AttachmentError::Io { .. }));
}

#[test]
fn attach_file_copies_pick_and_records_path() {
    let mut h = Harness::new();
    let task = h.store.add(TaskDraft::new("Taxes", NOW_MS)).unwrap().task;
    let sources = tempfile::tempdir().unwrap();
    let source = sources.path().join("w2.pdf");
    fs::write(&source, b"w2").unwrap();
    h.picker.pick_path(&source);

    let updated = h.store.attach_file(task.id).unwrap().unwrap();

    let expected = h
        .documents
        .path()
        .join("tasks")
        .join(task.id.to_string())
        .join("w2.pdf");
    assert_eq!(
        updated.attached_file.as_deref(),
        Some(expected.display().to_string().as_str())
    );
    assert_eq!(fs::read(&expected).unwrap(), b"w2");
    assert_eq!(load_tasks(&h.durable)[0], updated);
}

#[test]
fn dismissed_picker_leaves_task_unchanged() {
    let mut h = Harness::new();
    let task = h.store.add(TaskDraft::new("Taxes", NOW_MS)).unwrap().task;

    assert_eq!(h.store.attach_file(task.id).unwrap(), None);

    h.picker.set(Err(PortError::Cancelled));
    assert_eq!(h.store.attach_file(task.id).unwrap(), None);
    assert_eq!(h.store.get(task.id), Some(&task));
}

#[test]
fn denied_file_access_is_capability_denied() {
    let mut h = Harness::new();
    let task = h.store.add(TaskDraft::new("Taxes", NOW_MS)).unwrap().task;
    h.picker.set(Err(PortError::Denied));

    let err = h.store.attach_file(task.id).unwrap_err();
    assert!(matches!(err, StoreError::CapabilityDenied(Capability::Files)));
    assert_eq!(h.store.get(task.id), Some(&task));
}

#[test]
fn attachments_are_orphaned_after_delete() {
    let mut h = Harness::new();
    let task = h.store.add(TaskDraft::new("Visa", NOW_MS)).unwrap().task;
    let sources = tempfile::tempdir().unwrap();
    let source = sources.path().join("passport.jpg");
    fs::write(&source, b"jpg").unwrap();
    h.picker.pick_path(&source);
    let updated = h.store.attach_file(task.id).unwrap().unwrap();

    h.store.delete(task.id).unwrap();

    let stored = updated.attached_file.unwrap();
    assert!(std::path::Path::new(&stored).exists());
}

#[test]
fn attach_file_on_unknown_task_does_not_prompt() {
    let mut h = Harness::new();
    h.picker.set(Err(PortError::Denied));

    let err = h.store.attach_file(5).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(5)));
}

#[test]
fn reattaching_the_stored_copy_keeps_its_content() {
    let mut h = Harness::new();
    let task = h.store.add(TaskDraft::new("Audit", NOW_MS)).unwrap().task;
    let sources = tempfile::tempdir().unwrap();
    let source = sources.path().join("report.pdf");
    fs::write(&source, b"pdf-bytes").unwrap();
    h.picker.pick_path(&source);
    let first = h.store.attach_file(task.id).unwrap().unwrap();
    let stored = std::path::PathBuf::from(first.attached_file.clone().unwrap());

    h.picker.pick_path(&stored);
    let second = h.store.attach_file(task.id).unwrap().unwrap();

    assert_eq!(second.attached_file, first.attached_file);
    assert_eq!(fs::read(&stored).unwrap(), b"pdf-bytes");
}

#[test]
fn percent_encoded_file_uri_is_decoded_before_copy() {
    let documents = tempfile::tempdir().unwrap();
    let sources = tempfile::tempdir().unwrap();
    let source = sources.path().join("My Doc.pdf");
    fs::write(&source, b"doc").unwrap();
    let uri = format!(
        "file://{}/My%20Doc.pdf",
        sources.path().display().to_string().replace(' ', "%20")
    );

    let manager = AttachmentManager::local(
        documents.path(),
        Box::new(FakePicker::returning(Ok(None))),
    );
    let stored = manager.persist_to_task(3, &uri).unwrap();

    assert_eq!(stored, manager.task_directory(3).join("My Doc.pdf"));
    assert_eq!(fs::read(&stored).unwrap(), b"doc");
}
