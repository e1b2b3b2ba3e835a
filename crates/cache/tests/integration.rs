//! Integration tests for the download cache

#[cfg(test)]
mod tests {
    use grab_cache::*;
    use grab_errors::{DigestError, Error, NetworkError, StorageError};
    use grab_events::{channel, AppEvent, CacheEvent, DownloadEvent, EventReceiver};
    use grab_hash::Hash;
    use grab_net::NetClient;
    use httpmock::prelude::*;
    use tempfile::{tempdir, TempDir};

    fn fetcher(dir: &TempDir) -> Fetcher {
        Fetcher::new(dir.path().join("cache"), NetClient::with_defaults().unwrap())
    }

    fn drain(rx: &mut EventReceiver) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(message) = rx.try_recv() {
            events.push(message.event);
        }
        events
    }

    #[tokio::test]
    async fn test_second_fetch_is_a_cache_hit() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/x.zip");
                then.status(200).body("payload");
            })
            .await;

        let dir = tempdir().unwrap();
        let (tx, mut rx) = channel();
        let fetcher = fetcher(&dir).with_event_sender(tx);
        let digest = Hash::from_data(b"payload").to_hex();
        let url = server.url("/x.zip");

        let first = fetcher.fetch("x.zip", &url, &digest).await.unwrap();
        assert_eq!(first, dir.path().join("cache").join("x.zip"));
        assert_eq!(grab_hash::digest(&first).await.unwrap(), digest);
        assert_eq!(mock.hits_async().await, 1);

        let events = drain(&mut rx);
        assert!(events
            .iter()
            .any(|e| matches!(e, AppEvent::Cache(CacheEvent::Miss { .. }))));
        assert!(events
            .iter()
            .any(|e| matches!(e, AppEvent::Download(DownloadEvent::Progress { .. }))));
        assert!(events
            .iter()
            .any(|e| matches!(e, AppEvent::Download(DownloadEvent::Completed { .. }))));
        assert!(events
            .iter()
            .any(|e| matches!(e, AppEvent::Cache(CacheEvent::Verified { .. }))));

        let second = fetcher.fetch("x.zip", &url, &digest).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(mock.hits_async().await, 1);

        let events = drain(&mut rx);
        assert!(events.iter().any(AppEvent::is_cache_hit));
        assert!(!events
            .iter()
            .any(|e| matches!(e, AppEvent::Download(_))));
    }

    #[tokio::test]
    async fn test_lowercase_digest_matches_cached_file() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/lower");
                then.status(200).body("payload");
            })
            .await;

        let dir = tempdir().unwrap();
        let fetcher = fetcher(&dir);
        let digest = Hash::from_data(b"payload").to_hex().to_lowercase();
        let url = server.url("/lower");

        fetcher.fetch("lower.bin", &url, &digest).await.unwrap();
        fetcher.fetch("lower.bin", &url, &digest).await.unwrap();
        assert_eq!(mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn test_corrupted_cache_file_is_replaced() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/data.bin");
                then.status(200).body("payload");
            })
            .await;

        let dir = tempdir().unwrap();
        let (tx, mut rx) = channel();
        let fetcher = fetcher(&dir).with_event_sender(tx);
        let cache_root = fetcher.cache_root().to_path_buf();
        tokio::fs::create_dir_all(&cache_root).await.unwrap();
        tokio::fs::write(cache_root.join("data.bin"), b"corrupted bytes")
            .await
            .unwrap();

        let path = fetcher
            .fetch_hash("data.bin", &server.url("/data.bin"), Hash::from_data(b"payload"))
            .await
            .unwrap();

        assert_eq!(mock.hits_async().await, 1);
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"payload");
        assert!(drain(&mut rx).iter().any(|e| matches!(
            e,
            AppEvent::Cache(CacheEvent::Stale { actual, .. })
                if *actual == Hash::from_data(b"corrupted bytes").to_hex()
        )));
    }

    #[tokio::test]
    async fn test_digest_mismatch_keeps_file_and_refetches() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/evil.bin");
                then.status(200).body("tampered");
            })
            .await;

        let dir = tempdir().unwrap();
        let fetcher = fetcher(&dir);
        let expected = Hash::from_data(b"payload");
        let url = server.url("/evil.bin");

        let err = fetcher
            .fetch_hash("evil.bin", &url, expected)
            .await
            .unwrap_err();
        match &err {
            Error::Digest(DigestError::Mismatch {
                expected: e,
                actual,
                ..
            }) => {
                assert_eq!(*e, expected.to_hex());
                assert_eq!(*actual, Hash::from_data(b"tampered").to_hex());
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // The mismatching download stays on disk
        let cached = fetcher.cache_root().join("evil.bin");
        assert_eq!(tokio::fs::read(&cached).await.unwrap(), b"tampered");

        // ...and is detected and downloaded again on the next call
        let err = fetcher
            .fetch_hash("evil.bin", &url, expected)
            .await
            .unwrap_err();
        assert!(err.is_digest_mismatch());
        assert_eq!(mock.hits_async().await, 2);
    }

    #[tokio::test]
    async fn test_transfer_failure_is_not_retried() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/down");
                then.status(503);
            })
            .await;

        let dir = tempdir().unwrap();
        let fetcher = fetcher(&dir);
        let err = fetcher
            .fetch_hash("down.bin", &server.url("/down"), Hash::from_data(b"x"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Network(NetworkError::HttpError { status: 503, .. })
        ));
        assert_eq!(mock.hits_async().await, 1);
        assert!(!fetcher.cache_root().join("down.bin").exists());
    }

    #[tokio::test]
    async fn test_invalid_inputs_fail_before_network() {
        let dir = tempdir().unwrap();
        let fetcher = fetcher(&dir);

        let err = fetcher
            .fetch("x.zip", "http://127.0.0.1:9/x.zip", "not-hex")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Digest(DigestError::InvalidHex { .. })));

        let digest = Hash::from_data(b"x").to_hex();
        let err = fetcher
            .fetch("../escape.zip", "http://127.0.0.1:9/x.zip", &digest)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Storage(StorageError::InvalidPath { .. })
        ));
    }

    #[tokio::test]
    async fn test_cache_hit_without_network() {
        let dir = tempdir().unwrap();
        let fetcher = fetcher(&dir);
        tokio::fs::create_dir_all(fetcher.cache_root()).await.unwrap();
        tokio::fs::write(fetcher.cache_root().join("offline.bin"), b"payload")
            .await
            .unwrap();

        // Nothing listens on the discard port; a hit must not try to connect
        let path = fetcher
            .fetch_hash(
                "offline.bin",
                "http://127.0.0.1:9/offline.bin",
                Hash::from_data(b"payload"),
            )
            .await
            .unwrap();
        assert_eq!(path, fetcher.cache_root().join("offline.bin"));
    }

    #[tokio::test]
    async fn test_cache_events_are_correlated_by_filename() {
        let dir = tempdir().unwrap();
        let (tx, mut rx) = channel();
        let fetcher = fetcher(&dir).with_event_sender(tx);
        tokio::fs::create_dir_all(fetcher.cache_root()).await.unwrap();
        tokio::fs::write(fetcher.cache_root().join("tagged.bin"), b"payload")
            .await
            .unwrap();

        fetcher
            .fetch_hash(
                "tagged.bin",
                "http://127.0.0.1:9/tagged.bin",
                Hash::from_data(b"payload"),
            )
            .await
            .unwrap();

        let message = rx.try_recv().unwrap();
        assert!(message.event.is_cache_hit());
        assert_eq!(message.meta.correlation_id.as_deref(), Some("tagged.bin"));
    }
}
