#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_assets::clock::FixedClock;
use rust_assets::db::{AssetItemStore, MemoryAssetItemStore, EXTERNAL_CODE_CONSTRAINT};
use rust_assets::models::{AssetItemChanges, AssetItemModel, NewAssetItem};
use rust_assets::qr::{PngQrEncoder, QrEncoder};
use rust_assets::services::{AssetItemsService, CreateItemsRequest};
use rust_assets::{AppError, AppResult};

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
}

pub fn now() -> NaiveDateTime {
    today().and_hms_opt(14, 30, 0).unwrap()
}

pub struct TestContext {
    pub store: MemoryAssetItemStore,
    pub service: AssetItemsService,
}

/// Service over an empty in-memory store with the clock pinned to [`now`].
pub fn setup() -> TestContext {
    let store = MemoryAssetItemStore::new();
    let service =
        AssetItemsService::new(Arc::new(store.clone())).with_clock(Arc::new(FixedClock(now())));
    TestContext { store, service }
}

pub async fn create_one(service: &AssetItemsService, name: &str) -> AssetItemModel {
    let mut outcome = service
        .create_items(CreateItemsRequest {
            name: name.to_string(),
            count: 1,
            ..Default::default()
        })
        .await
        .expect("create should succeed");
    outcome.created.remove(0)
}

pub async fn create_under(
    service: &AssetItemsService,
    name: &str,
    parent_id: &str,
) -> AssetItemModel {
    let mut outcome = service
        .create_items(CreateItemsRequest {
            name: name.to_string(),
            count: 1,
            parent_id: Some(parent_id.to_string()),
            ..Default::default()
        })
        .await
        .expect("create should succeed");
    outcome.created.remove(0)
}

/// Encoder that fails on its `fail_on`-th call (1-indexed).
pub struct FailingEncoder {
    calls: AtomicUsize,
    fail_on: usize,
}

impl FailingEncoder {
    pub fn new(fail_on: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on,
        }
    }
}

impl QrEncoder for FailingEncoder {
    fn encode_png(&self, content: &str) -> AppResult<Vec<u8>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(AppError::Encoder("unsupported content".to_string()));
        }
        PngQrEncoder::default().encode_png(content)
    }
}

/// Store that rejects the first `collisions` creates with a code collision.
pub struct CollidingStore {
    inner: MemoryAssetItemStore,
    collisions: AtomicUsize,
    pub attempts: AtomicUsize,
}

impl CollidingStore {
    pub fn new(inner: MemoryAssetItemStore, collisions: usize) -> Self {
        Self {
            inner,
            collisions: AtomicUsize::new(collisions),
            attempts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AssetItemStore for CollidingStore {
    async fn create(&self, item: NewAssetItem) -> AppResult<AssetItemModel> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.collisions.load(Ordering::SeqCst);
        if remaining > 0 {
            self.collisions.store(remaining - 1, Ordering::SeqCst);
            return Err(AppError::ConstraintViolation(
                EXTERNAL_CODE_CONSTRAINT.to_string(),
            ));
        }
        self.inner.create(item).await
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<AssetItemModel>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_qr_code(&self, qr_code: &str) -> AppResult<Option<AssetItemModel>> {
        self.inner.find_by_qr_code(qr_code).await
    }

    async fn find_by_external_code(&self, code: &str) -> AppResult<Option<AssetItemModel>> {
        self.inner.find_by_external_code(code).await
    }

    async fn list_children(&self, parent_id: Option<&str>) -> AppResult<Vec<AssetItemModel>> {
        self.inner.list_children(parent_id).await
    }

    async fn update(&self, id: &str, changes: AssetItemChanges) -> AppResult<AssetItemModel> {
        self.inner.update(id, changes).await
    }

    async fn set_parent(&self, id: &str, parent_id: Option<&str>) -> AppResult<AssetItemModel> {
        self.inner.set_parent(id, parent_id).await
    }
}

/// Store where another operator retires the item between lookup and write.
///
/// The first `find_by_qr_code` decommissions the item on `retired_on` and
/// still hands back the snapshot taken before that write.
pub struct ConcurrentlyRetiredStore {
    inner: MemoryAssetItemStore,
    retired_on: NaiveDate,
    pending: AtomicUsize,
}

impl ConcurrentlyRetiredStore {
    pub fn new(inner: MemoryAssetItemStore, retired_on: NaiveDate) -> Self {
        Self {
            inner,
            retired_on,
            pending: AtomicUsize::new(1),
        }
    }
}

#[async_trait]
impl AssetItemStore for ConcurrentlyRetiredStore {
    async fn create(&self, item: NewAssetItem) -> AppResult<AssetItemModel> {
        self.inner.create(item).await
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<AssetItemModel>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_qr_code(&self, qr_code: &str) -> AppResult<Option<AssetItemModel>> {
        let snapshot = self.inner.find_by_qr_code(qr_code).await?;
        if let Some(item) = snapshot.as_ref() {
            if self.pending.swap(0, Ordering::SeqCst) == 1 {
                self.inner
                    .update(
                        &item.id,
                        AssetItemChanges {
                            decommission_date: Some(self.retired_on),
                            append_note: Some("Decommission reason: first".to_string()),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
        }
        Ok(snapshot)
    }

    async fn find_by_external_code(&self, code: &str) -> AppResult<Option<AssetItemModel>> {
        self.inner.find_by_external_code(code).await
    }

    async fn list_children(&self, parent_id: Option<&str>) -> AppResult<Vec<AssetItemModel>> {
        self.inner.list_children(parent_id).await
    }

    async fn update(&self, id: &str, changes: AssetItemChanges) -> AppResult<AssetItemModel> {
        self.inner.update(id, changes).await
    }

    async fn set_parent(&self, id: &str, parent_id: Option<&str>) -> AppResult<AssetItemModel> {
        self.inner.set_parent(id, parent_id).await
    }
}
