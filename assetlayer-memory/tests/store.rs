use std::{
    collections::HashSet,
    io,
    pin::Pin,
    task::{Context, Poll},
};

use assetlayer_core::{
    backend::AssetBackend,
    error::{ArtefactKind, StoreError},
    query::{AssetFilter, AssetQuery, Condition, SortOrder},
    record::{Record, RecordExt},
};
use assetlayer_memory::InMemoryStore;
use bson::{Bson, doc};
use futures::io::{AsyncRead, Cursor};

fn names(records: &[Record]) -> Vec<&str> {
    records
        .iter()
        .map(|record| record.get_str("name").unwrap_or("?"))
        .collect()
}

async fn seeded() -> InMemoryStore {
    let store = InMemoryStore::new();

    for asset in [
        doc! { "name": "Liberty Core", "type": "feature", "state": "published",
               "description": "The web profile runtime", "tags": ["web", "core"],
               "provider": { "name": "IBM" } },
        doc! { "name": "Servlet", "type": "feature", "state": "draft",
               "description": "Servlet support for the web profile",
               "provider": { "name": "IBM" } },
        doc! { "name": "Admin Center", "type": "tool", "state": "published",
               "shortDescription": "Web based administration",
               "provider": { "name": "Acme" } },
        doc! { "name": "Samples", "type": "sample", "state": "published",
               "description": "Liberty samples for the beta" },
    ] {
        store.create_asset(asset).await.unwrap();
    }

    store
}

struct FailingReader;

impl AsyncRead for FailingReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream closed")))
    }
}

#[tokio::test]
async fn asset_crud_round_trip() {
    let store = InMemoryStore::new();

    let created = store
        .create_asset(doc! { "name": "Liberty Core", "version": 1 })
        .await
        .unwrap();
    let id = created.record_id().unwrap().to_string();

    assert_eq!(created.get_str("name").unwrap(), "Liberty Core");
    assert_eq!(store.retrieve_asset(&id).await.unwrap(), created);

    let updated = store
        .update_asset(&id, doc! { "name": "Liberty Core", "version": 2 })
        .await
        .unwrap();

    assert_eq!(updated.record_id(), Some(id.as_str()));
    assert_eq!(store.retrieve_asset(&id).await.unwrap().get_i32("version").unwrap(), 2);

    store.delete_asset(&id).await.unwrap();

    let err = store.retrieve_asset(&id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { kind: ArtefactKind::Asset, .. }));

    // Deleting again is a no-op.
    store.delete_asset(&id).await.unwrap();
}

#[tokio::test]
async fn returned_records_are_copies() {
    let store = InMemoryStore::new();

    let mut created = store.create_asset(doc! { "name": "original" }).await.unwrap();
    let id = created.record_id().unwrap().to_string();
    created.insert("name", "changed");

    let mut fetched = store.retrieve_asset(&id).await.unwrap();
    assert_eq!(fetched.get_str("name").unwrap(), "original");

    fetched.insert("name", "changed again");
    let all = store.retrieve_all_assets().await.unwrap();
    assert_eq!(names(&all), vec!["original"]);
}

#[tokio::test]
async fn unfiltered_query_returns_everything_in_creation_order() {
    let store = seeded().await;

    let all = store.query_assets(AssetQuery::new()).await.unwrap();

    assert_eq!(names(&all), vec!["Liberty Core", "Servlet", "Admin Center", "Samples"]);
    assert_eq!(store.count_assets(&[], None).await.unwrap(), 4);
}

#[tokio::test]
async fn filters_are_and_combined_and_conditions_or_combined() {
    let store = seeded().await;

    let query = AssetQuery::builder()
        .filter(AssetFilter::eq("state", "published"))
        .filter(AssetFilter::eq("type", "feature").or(Condition::equals("tool")))
        .build();

    let found = store.query_assets(query.clone()).await.unwrap();

    assert_eq!(names(&found), vec!["Liberty Core", "Admin Center"]);
    assert_eq!(store.count_assets(&query.filters, None).await.unwrap(), 2);

    let narrower = AssetQuery::builder()
        .filters(query.filters)
        .filter(AssetFilter::eq("provider.name", "IBM"))
        .build();

    assert_eq!(names(&store.query_assets(narrower).await.unwrap()), vec!["Liberty Core"]);
}

#[tokio::test]
async fn not_equals_includes_records_without_the_attribute() {
    let store = seeded().await;

    let query = AssetQuery::builder()
        .filter(AssetFilter::ne("provider.name", "IBM"))
        .build();

    assert_eq!(names(&store.query_assets(query).await.unwrap()), vec!["Admin Center", "Samples"]);
}

#[tokio::test]
async fn search_orders_by_score_and_hides_it() {
    let store = seeded().await;

    let query = AssetQuery::builder().search("web profile").build();
    let found = store.query_assets(query).await.unwrap();

    // Two hits each for the first two, one for the admin tool.
    assert_eq!(names(&found), vec!["Liberty Core", "Servlet", "Admin Center"]);
    assert!(found.iter().all(|asset| !asset.contains_key("$matchScore")));
    assert_eq!(store.count_assets(&[], Some("web profile")).await.unwrap(), 3);
}

#[tokio::test]
async fn search_with_phrases_and_negations() {
    let store = seeded().await;

    let phrase = store
        .query_assets(AssetQuery::builder().search("\"servlet support\"").build())
        .await
        .unwrap();
    assert_eq!(names(&phrase), vec!["Servlet"]);

    let negated = store
        .query_assets(AssetQuery::builder().search("liberty -beta").build())
        .await
        .unwrap();
    assert_eq!(names(&negated), vec!["Liberty Core"]);
}

#[tokio::test]
async fn explicit_sort_overrides_score_order() {
    let store = seeded().await;

    let query = AssetQuery::builder()
        .search("web")
        .sort("name", SortOrder::Ascending)
        .build();

    let found = store.query_assets(query).await.unwrap();

    assert_eq!(names(&found), vec!["Admin Center", "Liberty Core", "Servlet"]);
}

#[tokio::test]
async fn sort_then_paginate() {
    let store = seeded().await;

    let page = store
        .query_assets(
            AssetQuery::builder()
                .sort("name", SortOrder::Descending)
                .paginate(1, 2)
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(names(&page), vec!["Samples", "Liberty Core"]);

    let past_end = store
        .query_assets(AssetQuery::builder().paginate(10, 5).build())
        .await
        .unwrap();
    assert!(past_end.is_empty());

    let tail = store
        .query_assets(AssetQuery::builder().paginate(3, 10).build())
        .await
        .unwrap();
    assert_eq!(names(&tail), vec!["Samples"]);
}

#[tokio::test]
async fn distinct_values_skip_absent_and_duplicates() {
    let store = seeded().await;

    let providers = store.distinct_values("provider.name", &[], None).await.unwrap();
    assert_eq!(providers, vec![Bson::from("IBM"), Bson::from("Acme")]);

    let published = store
        .distinct_values("type", &[AssetFilter::eq("state", "published")], Some("liberty"))
        .await
        .unwrap();
    assert_eq!(published, vec![Bson::from("feature"), Bson::from("sample")]);
}

#[tokio::test]
async fn attachment_metadata_lifecycle() {
    let store = InMemoryStore::new();

    let first = store
        .create_attachment_metadata(doc! { "assetId": "a1", "name": "readme.txt" })
        .await
        .unwrap();
    store
        .create_attachment_metadata(doc! { "_id": "given", "assetId": "a1", "name": "license.txt" })
        .await
        .unwrap();
    store
        .create_attachment_metadata(doc! { "assetId": "a2", "name": "other.txt" })
        .await
        .unwrap();

    let first_id = first.record_id().unwrap().to_string();
    assert_eq!(store.retrieve_attachment_metadata(&first_id).await.unwrap(), first);
    assert_eq!(
        store.retrieve_attachment_metadata("given").await.unwrap().get_str("name").unwrap(),
        "license.txt"
    );

    let for_a1 = store.find_attachments_for_asset("a1").await.unwrap();
    assert_eq!(for_a1.len(), 2);
    assert!(store.find_attachments_for_asset("missing").await.unwrap().is_empty());

    store.delete_attachment_metadata(&first_id).await.unwrap();

    let err = store.retrieve_attachment_metadata(&first_id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { kind: ArtefactKind::Attachment, .. }));
}

#[tokio::test]
async fn attachment_content_lifecycle() {
    let store = InMemoryStore::new();
    let mut upload = Cursor::new(b"hello attachment".to_vec());

    let stored = store
        .create_attachment_content("hello.txt", "text/plain", &mut upload)
        .await
        .unwrap();
    assert_eq!(stored.length, 16);

    let content = store.retrieve_attachment_content(&stored.id).await.unwrap();
    assert_eq!(content.name, "hello.txt");
    assert_eq!(content.content_type, "text/plain");
    assert_eq!(&*content.content, b"hello attachment");

    store.delete_attachment_content(&stored.id).await.unwrap();

    let err = store.retrieve_attachment_content(&stored.id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { kind: ArtefactKind::AttachmentContent, .. }));
}

#[tokio::test]
async fn failed_upload_reports_persistence_error() {
    let store = InMemoryStore::new();

    let err = store
        .create_attachment_content("broken.bin", "application/octet-stream", &mut FailingReader)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Persistence(_)));
}

#[tokio::test]
async fn ids_are_shared_across_mappings() {
    let store = InMemoryStore::new();

    let asset = store.create_asset(doc! {}).await.unwrap();
    let attachment = store.create_attachment_metadata(doc! {}).await.unwrap();
    let content = store
        .create_attachment_content("a", "b", &mut Cursor::new(Vec::new()))
        .await
        .unwrap();

    let ids = [asset.record_id().unwrap(), attachment.record_id().unwrap(), content.id.as_str()];

    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 3);
    assert!(ids.iter().all(|id| id.len() == 24));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_get_unique_ids() {
    let store = InMemoryStore::new();

    let handles = (0..16)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                let mut ids = Vec::new();
                for j in 0..25 {
                    let created = store
                        .create_asset(doc! { "name": format!("asset-{i}-{j}") })
                        .await
                        .unwrap();
                    ids.push(created.record_id().unwrap().to_string());
                }
                ids
            })
        })
        .collect::<Vec<_>>();

    let mut ids = HashSet::new();
    for handle in handles {
        ids.extend(handle.await.unwrap());
    }

    assert_eq!(ids.len(), 400);
    assert_eq!(store.count_assets(&[], None).await.unwrap(), 400);
}
