use assetlayer::{
    config::StoreConfig,
    memory::InMemoryStore,
    prelude::*,
};
use bson::{Bson, doc};
use futures::io::Cursor;

async fn store_with_features(count: usize) -> AssetStore<InMemoryStore> {
    let store = assetlayer::open_store(&StoreConfig::default()).await.unwrap();

    for i in 0..count {
        store
            .create_asset(doc! { "name": format!("feature {i}"), "type": "feature" })
            .await
            .unwrap();
    }
    store
        .create_asset(doc! { "name": "a tool", "type": "tool" })
        .await
        .unwrap();

    store
}

#[tokio::test]
async fn open_store_honours_the_id_start() {
    let config = StoreConfig { id_start: 41, ..StoreConfig::default() };
    let store = assetlayer::open_store(&config).await.unwrap();

    let created = store.create_asset(doc! { "name": "first" }).await.unwrap();

    assert_eq!(created.record_id(), Some("00000000000000000000002a"));
}

#[tokio::test]
async fn query_page_reports_the_total_count() {
    let store = store_with_features(5).await;

    let page = store
        .query_page(
            AssetQuery::builder()
                .filter(AssetFilter::eq("type", "feature"))
                .paginate(3, 10)
                .build(),
        )
        .await
        .unwrap();

    assert_eq!(page.count, 5);
    assert_eq!(page.items.len(), 2);
    assert!(!page.has_more());

    let first = store
        .query_page(
            AssetQuery::builder()
                .filter(AssetFilter::eq("type", "feature"))
                .paginate(0, 2)
                .build(),
        )
        .await
        .unwrap();

    assert!(first.has_more());
    assert_eq!(first.next(), Some(PaginationOptions::new(2, 2)));
}

#[tokio::test]
async fn attachment_with_content_is_linked_to_its_asset() {
    let store = store_with_features(1).await;
    let asset = store.retrieve_all_assets().await.unwrap().remove(0);
    let asset_id = asset.record_id().unwrap();

    let attachment = store
        .create_attachment_with_content(
            asset_id,
            doc! { "type": "CONTENT", "description": "the binary" },
            "feature.esa",
            "application/octet-stream",
            &mut Cursor::new(vec![7u8; 128]),
        )
        .await
        .unwrap();

    assert_eq!(attachment.get_str("assetId").unwrap(), asset_id);
    assert_eq!(attachment.get_str("name").unwrap(), "feature.esa");
    assert_eq!(attachment.get_str("contentType").unwrap(), "application/octet-stream");
    assert_eq!(attachment.get("size"), Some(&Bson::Int64(128)));
    assert_eq!(attachment.get_str("description").unwrap(), "the binary");

    let content_id = attachment.get_str("gridFSId").unwrap();
    let content = store.retrieve_attachment_content(content_id).await.unwrap();
    assert_eq!(content.len(), 128);

    let found = store.find_attachments_for_asset(asset_id).await.unwrap();
    assert_eq!(found, vec![attachment.clone()]);
}

#[tokio::test]
async fn attachment_for_missing_asset_is_rejected() {
    let store = store_with_features(0).await;

    let err = store
        .create_attachment_with_content(
            "000000000000000000000fff",
            doc! {},
            "orphan.txt",
            "text/plain",
            &mut Cursor::new(b"orphan".to_vec()),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::NotFound { kind: ArtefactKind::Asset, .. }));
}

#[tokio::test]
async fn deleting_an_asset_removes_its_attachments() {
    let store = store_with_features(2).await;
    let assets = store.retrieve_all_assets().await.unwrap();
    let doomed = assets[0].record_id().unwrap();
    let kept = assets[1].record_id().unwrap();

    let mut content_ids = Vec::new();
    for (asset_id, name) in [(doomed, "a.txt"), (doomed, "b.txt"), (kept, "c.txt")] {
        let attachment = store
            .create_attachment_with_content(
                asset_id,
                doc! {},
                name,
                "text/plain",
                &mut Cursor::new(name.as_bytes().to_vec()),
            )
            .await
            .unwrap();
        content_ids.push(attachment.get_str("gridFSId").unwrap().to_string());
    }

    store.delete_asset_with_attachments(doomed).await.unwrap();

    assert!(store.retrieve_asset(doomed).await.unwrap_err().is_not_found());
    assert!(store.find_attachments_for_asset(doomed).await.unwrap().is_empty());
    assert!(store.retrieve_attachment_content(&content_ids[0]).await.unwrap_err().is_not_found());
    assert!(store.retrieve_attachment_content(&content_ids[1]).await.unwrap_err().is_not_found());

    assert_eq!(store.find_attachments_for_asset(kept).await.unwrap().len(), 1);
    assert!(store.retrieve_attachment_content(&content_ids[2]).await.is_ok());
}

#[tokio::test]
async fn dyn_store_round_trip() {
    let store = store_with_features(1).await;
    let dyn_store = store.into_dyn();

    let created = dyn_store
        .as_store()
        .create_asset(doc! { "name": "via dyn" })
        .await
        .unwrap();

    let typed = dyn_store.as_static::<InMemoryStore>().unwrap();
    assert_eq!(
        typed.retrieve_asset(created.record_id().unwrap()).await.unwrap(),
        created
    );

    let store = dyn_store.into_static::<InMemoryStore>().unwrap();
    assert_eq!(store.count_assets(&[], None).await.unwrap(), 3);

    store.shutdown().await.unwrap();
}

#[tokio::test]
async fn json_records_can_be_stored_and_returned() {
    let store = store_with_features(0).await;
    let record = record_from_json(serde_json_value()).unwrap();

    let created = store.create_asset(record).await.unwrap();
    let json = record_to_json(&created).unwrap();

    assert_eq!(json["name"], "from json");
    assert_eq!(json["wlpInformation"]["visibility"], "PUBLIC");
}

fn serde_json_value() -> serde_json::Value {
    serde_json::json!({
        "name": "from json",
        "wlpInformation": { "visibility": "PUBLIC" },
    })
}
