use sqlx::PgPool;
use tonic::{Request, Response, Status};

use crate::proto::health::{
    health_check_response::ServingStatus, health_server::Health, HealthCheckRequest,
    HealthCheckResponse,
};

/// Fully qualified name of the item service, as clients pass it in `service`.
pub const ASSET_ITEMS_SERVICE_NAME: &str = "assets.items.AssetItems";

/// Reports SERVING while the database answers.
#[derive(Debug, Default, Clone)]
pub struct HealthServiceImpl {
    pool: Option<PgPool>,
}

impl HealthServiceImpl {
    pub fn new(pool: Option<PgPool>) -> Self {
        Self { pool }
    }

    async fn status_for(&self, service: &str) -> ServingStatus {
        if !service.is_empty() && service != ASSET_ITEMS_SERVICE_NAME {
            return ServingStatus::ServiceUnknown;
        }

        let Some(pool) = &self.pool else {
            return ServingStatus::Serving;
        };
        match sqlx::query("SELECT 1").execute(pool).await {
            Ok(_) => ServingStatus::Serving,
            Err(e) => {
                tracing::warn!("Health check database ping failed: {}", e);
                ServingStatus::NotServing
            }
        }
    }
}

#[tonic::async_trait]
impl Health for HealthServiceImpl {
    async fn check(
        &self,
        request: Request<HealthCheckRequest>,
    ) -> Result<Response<HealthCheckResponse>, Status> {
        let status = self.status_for(&request.into_inner().service).await;
        Ok(Response::new(HealthCheckResponse {
            status: status.into(),
        }))
    }

    type WatchStream = tokio_stream::wrappers::ReceiverStream<Result<HealthCheckResponse, Status>>;

    async fn watch(
        &self,
        request: Request<HealthCheckRequest>,
    ) -> Result<Response<Self::WatchStream>, Status> {
        let status = self.status_for(&request.into_inner().service).await;
        let (tx, rx) = tokio::sync::mpsc::channel(1);

        tokio::spawn(async move {
            let _ = tx
                .send(Ok(HealthCheckResponse {
                    status: status.into(),
                }))
                .await;
        });

        Ok(Response::new(tokio_stream::wrappers::ReceiverStream::new(rx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_check_without_database() {
        let health = HealthServiceImpl::new(None);
        let res = health
            .check(Request::new(HealthCheckRequest {
                service: String::new(),
            }))
            .await
            .unwrap();
        assert_eq!(res.into_inner().status, ServingStatus::Serving as i32);
    }

    #[tokio::test]
    async fn test_unknown_service() {
        let health = HealthServiceImpl::new(None);
        let res = health
            .check(Request::new(HealthCheckRequest {
                service: "other.Service".to_string(),
            }))
            .await
            .unwrap();
        assert_eq!(res.into_inner().status, ServingStatus::ServiceUnknown as i32);
    }
}
