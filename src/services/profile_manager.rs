//! 档案服务
//!
//! 负责用户八字档案的创建、查询与删除。每位用户最多一份档案。

use async_trait::async_trait;
use std::sync::Arc;

use crate::bazi::BirthMoment;
use crate::error::{AppError, Result};
use crate::models::bazi_profile::BaziProfile;
use crate::storage::repository::ProfileRepository;

/// 创建档案的输入
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub moment: BirthMoment,
    pub birth_location: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

/// 档案服务 trait
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// 创建档案；已存在时拒绝
    async fn create(&self, user_id: &str, request: NewProfile) -> Result<BaziProfile>;

    /// 获取用户档案
    async fn get_by_user(&self, user_id: &str) -> Result<Option<BaziProfile>>;

    /// 删除用户档案
    async fn delete_by_user(&self, user_id: &str) -> Result<bool>;
}

/// 档案服务实现
pub struct ProfileServiceImpl {
    repository: Arc<dyn ProfileRepository>,
}

impl ProfileServiceImpl {
    /// 创建新的服务实例
    pub fn new(repository: Arc<dyn ProfileRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ProfileService for ProfileServiceImpl {
    async fn create(&self, user_id: &str, request: NewProfile) -> Result<BaziProfile> {
        request.moment.validate()?;

        // 一人一档：已有档案时拒绝重复创建
        if self.repository.get_by_user_id(user_id).await?.is_some() {
            return Err(AppError::Conflict(
                "BaZi profile already exists. Delete it before creating a new one.".to_string(),
            ));
        }

        let profile = BaziProfile::new(user_id, &request.moment).with_location(
            request.birth_location,
            request.longitude,
            request.latitude,
        );

        tracing::info!("Creating BaZi profile for user {}", user_id);
        self.repository.create(&profile).await
    }

    async fn get_by_user(&self, user_id: &str) -> Result<Option<BaziProfile>> {
        self.repository.get_by_user_id(user_id).await
    }

    async fn delete_by_user(&self, user_id: &str) -> Result<bool> {
        self.repository.delete_by_user_id(user_id).await
    }
}

/// 创建档案服务
pub fn create_profile_service(repository: Arc<dyn ProfileRepository>) -> Box<dyn ProfileService> {
    Box::new(ProfileServiceImpl::new(repository))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bazi::Gender;
    use crate::storage::repository::MockProfileRepository;

    fn new_profile_request() -> NewProfile {
        NewProfile {
            moment: BirthMoment::new(2000, 1, 15, 14, 30, Gender::Male),
            birth_location: None,
            longitude: None,
            latitude: None,
        }
    }

    #[tokio::test]
    async fn test_create_profile() {
        let mut repo = MockProfileRepository::new();
        repo.expect_get_by_user_id().returning(|_| Ok(None));
        repo.expect_create().returning(|p| Ok(p.clone()));

        let service = ProfileServiceImpl::new(Arc::new(repo));
        let profile = service.create("user_1", new_profile_request()).await.unwrap();

        assert_eq!(profile.user_id, "user_1");
        assert_eq!(profile.chart.bazi_string.split(' ').count(), 4);
    }

    #[tokio::test]
    async fn test_duplicate_profile_is_rejected() {
        let mut repo = MockProfileRepository::new();
        repo.expect_get_by_user_id().returning(|user_id| {
            let moment = BirthMoment::new(2000, 1, 15, 14, 30, Gender::Male);
            Ok(Some(BaziProfile::new(user_id, &moment)))
        });

        let service = ProfileServiceImpl::new(Arc::new(repo));
        let result = service.create("user_1", new_profile_request()).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_invalid_birth_moment_is_rejected() {
        let repo = MockProfileRepository::new();
        let service = ProfileServiceImpl::new(Arc::new(repo));

        let mut request = new_profile_request();
        request.moment.month = 13;
        let result = service.create("user_1", request).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
