use anyhow::Result;
use bytes::Bytes;
use futures::stream;
use lanshare_rs::services::storage::DiskStorage;
use lanshare_rs::ShareError;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::AsyncReadExt;

fn ok_chunks(parts: Vec<&'static [u8]>) -> impl futures::Stream<Item = Result<Bytes, ShareError>> {
    stream::iter(parts.into_iter().map(|p| Ok(Bytes::from_static(p))))
}

async fn count_dir_entries(dir: &std::path::Path) -> Result<usize> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut count = 0;
    while entries.next_entry().await?.is_some() {
        count += 1;
    }
    Ok(count)
}

#[tokio::test]
async fn test_put_get_round_trip() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = DiskStorage::new(temp_dir.path()).await?;

    let (handle, written) = storage.put(ok_chunks(vec![b"hello ", b"world"])).await?;
    assert_eq!(written, 11);

    let mut file = storage.get(&handle).await?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).await?;
    assert_eq!(buf, b"hello world");

    assert_eq!(storage.size(&handle).await?, 11);

    Ok(())
}

#[tokio::test]
async fn test_put_empty_stream() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = DiskStorage::new(temp_dir.path()).await?;

    let (handle, written) = storage.put(ok_chunks(vec![])).await?;
    assert_eq!(written, 0);
    assert_eq!(storage.size(&handle).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_failed_stream_leaves_no_blob() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = DiskStorage::new(temp_dir.path()).await?;

    let failing = stream::iter(vec![
        Ok(Bytes::from_static(b"partial data")),
        Err(ShareError::BadRequest("connection reset".to_string())),
    ]);
    let result = storage.put(failing).await;
    assert!(result.is_err());

    // No blob and no temp file may survive a failed transfer
    assert_eq!(count_dir_entries(temp_dir.path()).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_get_after_blob_removed_is_not_found() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = DiskStorage::new(temp_dir.path()).await?;

    let (handle, _) = storage.put(ok_chunks(vec![b"ephemeral"])).await?;

    // Wipe the blob behind the store's back
    let mut entries = tokio::fs::read_dir(temp_dir.path()).await?;
    while let Some(entry) = entries.next_entry().await? {
        tokio::fs::remove_file(entry.path()).await?;
    }

    let err = storage.get(&handle).await.unwrap_err();
    assert!(matches!(err, ShareError::NotFound));
    let err = storage.size(&handle).await.unwrap_err();
    assert!(matches!(err, ShareError::NotFound));

    Ok(())
}

#[tokio::test]
async fn test_concurrent_reads_do_not_interfere() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = Arc::new(DiskStorage::new(temp_dir.path()).await?);

    let data: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
    let (handle, written) = storage
        .put(stream::iter(vec![Ok::<_, ShareError>(Bytes::from(data.clone()))]))
        .await?;
    assert_eq!(written, data.len() as u64);

    let mut tasks = Vec::new();
    for _ in 0..2 {
        let storage = storage.clone();
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move {
            let mut file = storage.get(&handle).await.unwrap();
            let mut buf = Vec::new();
            file.read_to_end(&mut buf).await.unwrap();
            buf
        }));
    }

    for task in tasks {
        let buf = task.await?;
        assert_eq!(buf, data);
    }

    Ok(())
}

#[tokio::test]
async fn test_concurrent_puts_are_independent() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = Arc::new(DiskStorage::new(temp_dir.path()).await?);

    let mut tasks = Vec::new();
    for i in 0..4u8 {
        let storage = storage.clone();
        tasks.push(tokio::spawn(async move {
            let content = vec![i; 4096];
            let (handle, written) = storage
                .put(stream::iter(vec![Ok::<_, ShareError>(Bytes::from(content))]))
                .await
                .unwrap();
            (handle, written, i)
        }));
    }

    for task in tasks {
        let (handle, written, i) = task.await?;
        assert_eq!(written, 4096);
        let mut file = storage.get(&handle).await?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).await?;
        assert_eq!(buf, vec![i; 4096]);
    }

    Ok(())
}
