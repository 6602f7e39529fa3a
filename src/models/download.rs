use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use uuid::Uuid;

use super::store::ContentStore;

#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    Pending,
    Downloading,
    Paused,
    Completed,
    Failed,
}

/// Entry in the download center. The transfer is simulated; nothing is
/// actually fetched.
#[derive(Clone, Serialize, Debug)]
pub struct DownloadItem {
    pub id: Uuid,
    pub name: String,
    pub size: u64,
    pub downloaded: u64,
    /// Bytes per second while downloading.
    pub speed: u64,
    pub status: DownloadStatus,
    pub url: String,
    pub thumbnail: Option<String>,
    pub category: Option<String>,
}

impl DownloadItem {
    pub fn progress(&self) -> f64 {
        if self.size == 0 {
            return 0.0;
        }
        (self.downloaded as f64 / self.size as f64) * 100.0
    }

    /// Advance the mock transfer by one tick.
    pub fn tick(&mut self, elapsed: Duration) {
        if self.status != DownloadStatus::Downloading {
            return;
        }

        let step = (self.speed as f64 * elapsed.as_secs_f64()) as u64;
        self.downloaded = (self.downloaded + step).min(self.size);

        if self.downloaded >= self.size {
            self.status = DownloadStatus::Completed;
            self.speed = 0;
        }
    }
}

pub async fn list_downloads(store: &ContentStore) -> Vec<DownloadItem> {
    store.downloads.read().await.clone()
}

/// Combined speed of everything currently downloading.
pub async fn total_speed(store: &ContentStore) -> u64 {
    store
        .downloads
        .read()
        .await
        .iter()
        .filter(|item| item.status == DownloadStatus::Downloading)
        .map(|item| item.speed)
        .sum()
}

/// One step of the progress simulator, applied to every active item.
pub async fn advance_downloads(store: &ContentStore, elapsed: Duration) {
    let mut downloads = store.downloads.write().await;
    for item in downloads.iter_mut() {
        item.tick(elapsed);
    }
}

fn find_mut(downloads: &mut [DownloadItem], id: Uuid) -> Result<&mut DownloadItem> {
    downloads
        .iter_mut()
        .find(|item| item.id == id)
        .ok_or_else(|| anyhow::anyhow!("download not found"))
}

/// Start a pending download or resume a paused one.
pub async fn resume_download(store: &ContentStore, id: Uuid) -> Result<DownloadItem> {
    let mut downloads = store.downloads.write().await;
    let item = find_mut(&mut downloads, id)?;

    match item.status {
        DownloadStatus::Pending | DownloadStatus::Paused => {
            item.status = DownloadStatus::Downloading;
            Ok(item.clone())
        }
        _ => Err(anyhow::anyhow!("download is not startable")),
    }
}

pub async fn pause_download(store: &ContentStore, id: Uuid) -> Result<DownloadItem> {
    let mut downloads = store.downloads.write().await;
    let item = find_mut(&mut downloads, id)?;

    if item.status != DownloadStatus::Downloading {
        return Err(anyhow::anyhow!("download is not running"));
    }
    item.status = DownloadStatus::Paused;

    Ok(item.clone())
}

/// Cancelling removes the item entirely.
pub async fn cancel_download(store: &ContentStore, id: Uuid) -> Result<()> {
    let mut downloads = store.downloads.write().await;
    let before = downloads.len();
    downloads.retain(|item| item.id != id);

    if downloads.len() == before {
        return Err(anyhow::anyhow!("download not found"));
    }
    Ok(())
}

/// Failed downloads restart from zero.
pub async fn retry_download(store: &ContentStore, id: Uuid) -> Result<DownloadItem> {
    let mut downloads = store.downloads.write().await;
    let item = find_mut(&mut downloads, id)?;

    if item.status != DownloadStatus::Failed {
        return Err(anyhow::anyhow!("download has not failed"));
    }
    item.downloaded = 0;
    item.status = DownloadStatus::Downloading;

    Ok(item.clone())
}

pub async fn clear_completed_downloads(store: &ContentStore) -> i64 {
    let mut downloads = store.downloads.write().await;
    let before = downloads.len();
    downloads.retain(|item| item.status != DownloadStatus::Completed);
    (before - downloads.len()) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::store::test_store;

    fn item(size: u64, downloaded: u64, speed: u64, status: DownloadStatus) -> DownloadItem {
        DownloadItem {
            id: Uuid::new_v4(),
            name: "file.pdf".to_string(),
            size,
            downloaded,
            speed,
            status,
            url: "/downloads/file.pdf".to_string(),
            thumbnail: None,
            category: None,
        }
    }

    #[test]
    fn tick_advances_by_speed() {
        let mut download = item(1000, 0, 100, DownloadStatus::Downloading);
        download.tick(Duration::from_secs(1));
        assert_eq!(download.downloaded, 100);
        assert_eq!(download.status, DownloadStatus::Downloading);
        assert!((download.progress() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tick_completes_at_the_size_boundary() {
        let mut download = item(1000, 950, 100, DownloadStatus::Downloading);
        download.tick(Duration::from_secs(1));
        assert_eq!(download.downloaded, 1000);
        assert_eq!(download.status, DownloadStatus::Completed);
        assert_eq!(download.speed, 0);
    }

    #[test]
    fn tick_ignores_inactive_items() {
        for status in [
            DownloadStatus::Pending,
            DownloadStatus::Paused,
            DownloadStatus::Completed,
            DownloadStatus::Failed,
        ] {
            let mut download = item(1000, 10, 100, status);
            download.tick(Duration::from_secs(1));
            assert_eq!(download.downloaded, 10);
            assert_eq!(download.status, status);
        }
    }

    #[tokio::test]
    async fn pause_resume_round_trip() {
        let store = test_store();
        let running = list_downloads(&store)
            .await
            .into_iter()
            .find(|item| item.status == DownloadStatus::Downloading)
            .unwrap();

        let paused = pause_download(&store, running.id).await.unwrap();
        assert_eq!(paused.status, DownloadStatus::Paused);

        let resumed = resume_download(&store, running.id).await.unwrap();
        assert_eq!(resumed.status, DownloadStatus::Downloading);
    }

    #[tokio::test]
    async fn retry_restarts_a_failed_download() {
        let store = test_store();
        let failed = list_downloads(&store)
            .await
            .into_iter()
            .find(|item| item.status == DownloadStatus::Failed)
            .unwrap();

        let retried = retry_download(&store, failed.id).await.unwrap();
        assert_eq!(retried.status, DownloadStatus::Downloading);
        assert_eq!(retried.downloaded, 0);

        assert!(retry_download(&store, failed.id).await.is_err());
    }

    #[tokio::test]
    async fn clear_completed_removes_only_completed() {
        let store = test_store();
        let completed = list_downloads(&store)
            .await
            .iter()
            .filter(|item| item.status == DownloadStatus::Completed)
            .count() as i64;
        assert!(completed > 0);

        assert_eq!(clear_completed_downloads(&store).await, completed);
        assert!(list_downloads(&store)
            .await
            .iter()
            .all(|item| item.status != DownloadStatus::Completed));
    }

    #[tokio::test]
    async fn cancel_removes_the_item() {
        let store = test_store();
        let any = list_downloads(&store).await[0].clone();

        cancel_download(&store, any.id).await.unwrap();
        assert!(cancel_download(&store, any.id).await.is_err());
    }
}
