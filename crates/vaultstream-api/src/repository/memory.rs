use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;
use vaultstream_core::{AppError, VideoRecord, VideoRepository};

/// Process-local record store. Records do not survive a restart.
#[derive(Default)]
pub struct InMemoryVideoRepository {
    videos: RwLock<HashMap<Uuid, VideoRecord>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn create_video(&self, record: VideoRecord) -> Result<VideoRecord, AppError> {
        let mut videos = self.videos.write().await;
        if videos.contains_key(&record.id) {
            return Err(AppError::Database(format!(
                "video {} already exists",
                record.id
            )));
        }
        videos.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        Ok(self.videos.read().await.get(&id).cloned())
    }

    async fn update_video(&self, record: &VideoRecord) -> Result<(), AppError> {
        match self.videos.write().await.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(AppError::Database(format!("video {} not found", record.id))),
        }
    }

    async fn list_videos(&self, user_id: Uuid) -> Result<Vec<VideoRecord>, AppError> {
        let mut owned: Vec<VideoRecord> = self
            .videos
            .read()
            .await
            .values()
            .filter(|video| video.is_owned_by(user_id))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn delete_video(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.videos.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_get_update() {
        let repo = InMemoryVideoRepository::new();
        let record = VideoRecord::new(Uuid::new_v4(), "Boots".to_string(), String::new());
        let id = record.id;

        repo.create_video(record).await.unwrap();
        let mut stored = repo.get_video(id).await.unwrap().unwrap();
        stored.video_url = Some("local,landscape/x.mp4".to_string());
        repo.update_video(&stored).await.unwrap();

        let reloaded = repo.get_video(id).await.unwrap().unwrap();
        assert_eq!(reloaded.video_url.as_deref(), Some("local,landscape/x.mp4"));
    }

    #[tokio::test]
    async fn test_list_filters_by_owner_and_delete_removes() {
        let repo = InMemoryVideoRepository::new();
        let owner = Uuid::new_v4();
        let first = VideoRecord::new(owner, "First".to_string(), String::new());
        let mut second = VideoRecord::new(owner, "Second".to_string(), String::new());
        second.created_at = first.created_at + chrono::Duration::seconds(1);
        let foreign = VideoRecord::new(Uuid::new_v4(), "Other".to_string(), String::new());

        repo.create_video(first.clone()).await.unwrap();
        repo.create_video(second.clone()).await.unwrap();
        repo.create_video(foreign).await.unwrap();

        let titles: Vec<String> = repo
            .list_videos(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|video| video.title)
            .collect();
        assert_eq!(titles, vec!["Second".to_string(), "First".to_string()]);

        assert!(repo.delete_video(first.id).await.unwrap());
        assert!(!repo.delete_video(first.id).await.unwrap());
        assert_eq!(repo.list_videos(owner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_records() {
        let repo = InMemoryVideoRepository::new();
        assert!(repo.get_video(Uuid::new_v4()).await.unwrap().is_none());

        let ghost = VideoRecord::new(Uuid::new_v4(), "Ghost".to_string(), String::new());
        assert!(matches!(
            repo.update_video(&ghost).await,
            Err(AppError::Database(_))
        ));
    }
}
