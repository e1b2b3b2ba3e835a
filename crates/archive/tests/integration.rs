//! Integration tests for lazy archive extraction

#[cfg(test)]
mod tests {
    use grab_archive::{extract, Extractor};
    use grab_errors::{ArchiveError, Error};
    use grab_events::{channel, AppEvent, EventReceiver, ExtractEvent};
    use std::io::Write;
    use std::path::Path;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;

    /// Write a zip at `path` with the given files and directories
    fn write_zip(path: &Path, files: &[(&str, &[u8])], dirs: &[&str]) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        for dir in dirs {
            writer.add_directory(*dir, options).unwrap();
        }
        for (name, data) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    fn drain(rx: &mut EventReceiver) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(message) = rx.try_recv() {
            events.push(message.event);
        }
        events
    }

    fn started(events: &[AppEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, AppEvent::Extract(ExtractEvent::Started { .. })))
            .count()
    }

    #[tokio::test]
    async fn test_extracts_whole_archive_next_to_itself() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_zip(&archive, &[("a", b"alpha"), ("b/c", b"gamma")], &["b/"]);

        let (tx, mut rx) = channel();
        let extractor = Extractor::new().with_event_sender(tx);

        let path = extractor.extract(&archive, "a").await.unwrap();
        assert_eq!(path, dir.path().join("a"));
        assert_eq!(std::fs::read(&path).unwrap(), b"alpha");
        // Entries other than the selected one are extracted too
        assert_eq!(std::fs::read(dir.path().join("b/c")).unwrap(), b"gamma");

        let events = drain(&mut rx);
        assert_eq!(started(&events), 1);
        assert!(events.iter().any(|e| matches!(
            e,
            AppEvent::Extract(ExtractEvent::Completed { entries: 3, .. })
        )));
    }

    #[tokio::test]
    async fn test_existing_path_skips_extraction() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_zip(&archive, &[("a", b"alpha"), ("b/c", b"gamma")], &[]);

        let (tx, mut rx) = channel();
        let extractor = Extractor::new().with_event_sender(tx);

        extractor.extract(&archive, "a").await.unwrap();
        std::fs::write(dir.path().join("a"), b"edited").unwrap();
        std::fs::remove_file(dir.path().join("b/c")).unwrap();
        drain(&mut rx);

        let path = extractor.extract(&archive, "a").await.unwrap();
        assert_eq!(path, dir.path().join("a"));

        // Presence is the only check: edited content stays, missing siblings stay missing
        assert_eq!(std::fs::read(&path).unwrap(), b"edited");
        assert!(!dir.path().join("b/c").exists());

        let events = drain(&mut rx);
        assert_eq!(started(&events), 0);
        assert!(events
            .iter()
            .any(|e| matches!(e, AppEvent::Extract(ExtractEvent::CacheHit { .. }))));
    }

    #[tokio::test]
    async fn test_existing_directory_counts_as_present() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_zip(&archive, &[("tools/run", b"#!/bin/sh")], &["tools/"]);
        std::fs::create_dir(dir.path().join("tools")).unwrap();

        let (tx, mut rx) = channel();
        let path = Extractor::new()
            .with_event_sender(tx)
            .extract(&archive, "tools")
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("tools"));
        assert!(!dir.path().join("tools/run").exists());
        assert_eq!(started(&drain(&mut rx)), 0);
    }

    #[tokio::test]
    async fn test_unrelated_files_are_preserved_and_collisions_overwritten() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_zip(&archive, &[("a", b"alpha"), ("b", b"beta")], &[]);
        std::fs::write(dir.path().join("b"), b"old beta").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"keep me").unwrap();

        extract(&archive, "a").await.unwrap();

        assert_eq!(std::fs::read(dir.path().join("b")).unwrap(), b"beta");
        assert_eq!(
            std::fs::read(dir.path().join("notes.txt")).unwrap(),
            b"keep me"
        );
        assert!(archive.exists());
    }

    #[tokio::test]
    async fn test_corrupt_archive_fails() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("broken.zip");
        std::fs::write(&archive, b"this is not a zip file").unwrap();

        let (tx, mut rx) = channel();
        let err = Extractor::new()
            .with_event_sender(tx)
            .extract(&archive, "a")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Archive(ArchiveError::ExtractionFailed { .. })
        ));
        assert!(drain(&mut rx)
            .iter()
            .any(|e| matches!(e, AppEvent::Extract(ExtractEvent::Failed { .. }))));
    }

    #[tokio::test]
    async fn test_missing_archive_fails() {
        let dir = tempdir().unwrap();
        let err = extract(&dir.path().join("absent.zip"), "a")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Archive(ArchiveError::ExtractionFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_selected_path_absent_from_archive() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_zip(&archive, &[("a", b"alpha")], &[]);

        let path = extract(&archive, "missing").await.unwrap();
        assert_eq!(path, dir.path().join("missing"));
        assert!(!path.exists());
        assert!(dir.path().join("a").exists());
    }

    #[tokio::test]
    async fn test_rejects_escaping_selection() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_zip(&archive, &[("a", b"alpha")], &[]);

        let err = extract(&archive, "../a").await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert!(!dir.path().join("a").exists());
    }

    #[tokio::test]
    async fn test_nested_selection_extracts_siblings() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_zip(&archive, &[("a", b"alpha"), ("b/c", b"gamma")], &[]);

        let path = extract(&archive, "b/c").await.unwrap();
        assert_eq!(path, dir.path().join("b").join("c"));
        assert_eq!(std::fs::read(&path).unwrap(), b"gamma");
        assert_eq!(std::fs::read(dir.path().join("a")).unwrap(), b"alpha");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_read_only_entries_are_replaced_on_reextraction() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        {
            let file = std::fs::File::create(&archive).unwrap();
            let mut writer = zip::ZipWriter::new(file);
            let options = SimpleFileOptions::default().unix_permissions(0o555);
            writer.start_file("bin/tool", options).unwrap();
            writer.write_all(b"#!/bin/sh").unwrap();
            writer.finish().unwrap();
        }

        // The selected path never appears, so every call extracts again
        extract(&archive, "missing").await.unwrap();
        extract(&archive, "missing").await.unwrap();

        let tool = dir.path().join("bin/tool");
        assert_eq!(std::fs::read(&tool).unwrap(), b"#!/bin/sh");
        let mode = std::fs::metadata(&tool).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o555);
    }

    #[tokio::test]
    async fn test_events_are_correlated_by_archive() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_zip(&archive, &[("a", b"alpha")], &[]);

        let (tx, mut rx) = channel();
        let extractor = Extractor::new().with_event_sender(tx);
        extractor.extract(&archive, "a").await.unwrap();
        extractor.extract(&archive, "a").await.unwrap();

        let expected = archive.display().to_string();
        let mut seen = 0;
        while let Ok(message) = rx.try_recv() {
            assert_eq!(message.meta.correlation_id.as_deref(), Some(expected.as_str()));
            seen += 1;
        }
        // Started and Completed, then CacheHit
        assert_eq!(seen, 3);
    }
}
