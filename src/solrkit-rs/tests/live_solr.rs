//! End-to-end tests against a running Solr core.
//!
//! Run with: SOLR_URL=http://localhost:8983/solr/<core> cargo test -- --ignored

use chrono::NaiveDate;
use solrkit_rs::{
    escape_term, AddOptions, Client, ClientConfig, Document, FieldValue, Query,
};

fn client() -> Client {
    let mut config = ClientConfig::from_env();
    config.ping_path = "admin/ping".to_string();
    Client::with_config(config).expect("client")
}

fn unique_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn by_id(id: &str) -> String {
    format!("id:{}", escape_term(id))
}

#[tokio::test]
#[ignore = "requires a running Solr core at SOLR_URL"]
async fn test_add_commit_search_roundtrip() {
    let client = client();
    client.ping().await.unwrap();

    let id = unique_id();
    client
        .add(Document::new().with_field("id", id.as_str()))
        .await
        .unwrap();
    client.commit().await.unwrap();

    let r = client.search(by_id(&id)).await.unwrap();
    assert_eq!(r.results.num_found, 1, "added document not found");
    assert_eq!(r.results.docs[0].get_str("id"), Some(id.as_str()));

    client.delete([id.as_str()]).await.unwrap();
    client.commit().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Solr core at SOLR_URL"]
async fn test_null_field_is_not_stored() {
    let client = client();
    let id = unique_id();
    let doc = Document::new()
        .with_field("id", id.as_str())
        .with_field("title_s", FieldValue::Null);

    client.add(doc).await.unwrap();
    client.commit().await.unwrap();

    let r = client.search(by_id(&id)).await.unwrap();
    assert!(!r.results.docs[0].contains("title_s"));
}

#[tokio::test]
#[ignore = "requires a running Solr core at SOLR_URL"]
async fn test_dates_multi_values_and_unicode() {
    let client = client();
    let id = unique_id();
    let at = NaiveDate::from_ymd_opt(2010, 1, 1)
        .unwrap()
        .and_hms_micro_opt(23, 59, 59, 999)
        .unwrap();
    let doc = Document::new()
        .with_field("id", id.as_str())
        .with_field("test1_dt", at)
        .with_field("test2_dt", NaiveDate::from_ymd_opt(2010, 1, 1).unwrap())
        .with_field("links_ss", vec!["a", "b", "c"])
        .with_field("title_s", "カカシ外伝～戦場のボーイズライフ ☝☜")
        .with_field("flag_b", true);

    client.add(doc).await.unwrap();
    client.commit().await.unwrap();

    let r = client.search(by_id(&id)).await.unwrap();
    let doc = &r.results.docs[0];
    assert_eq!(doc.get_str("test1_dt"), Some("2010-01-01T23:59:59Z"));
    assert_eq!(doc.get_str("test2_dt"), Some("2010-01-01T00:00:00Z"));
    assert_eq!(
        doc.get("links_ss"),
        Some(&FieldValue::Multi(vec!["a".into(), "b".into(), "c".into()]))
    );
    assert_eq!(doc.get_str("title_s"), Some("カカシ外伝～戦場のボーイズライフ ☝☜"));
    assert_eq!(doc.get_bool("flag_b"), Some(true));
}

#[tokio::test]
#[ignore = "requires a running Solr core at SOLR_URL"]
async fn test_add_without_overwrite_keeps_original() {
    let client = client();
    let id = unique_id();

    client
        .add(Document::new().with_field("id", id.as_str()).with_field("name_s", "first"))
        .await
        .unwrap();
    client.commit().await.unwrap();

    client
        .add_with_options(
            vec![Document::new().with_field("id", id.as_str()).with_field("name_s", "second")],
            AddOptions::default().overwrite(false),
        )
        .await
        .unwrap();
    client.commit().await.unwrap();

    let r = client.search(by_id(&id)).await.unwrap();
    assert!(r
        .results
        .docs
        .iter()
        .any(|d| d.get_str("name_s") == Some("first")));
}

#[tokio::test]
#[ignore = "requires a running Solr core at SOLR_URL"]
async fn test_rollback_discards_pending_add() {
    let client = client();
    let id = unique_id();

    client
        .add(Document::new().with_field("id", id.as_str()))
        .await
        .unwrap();
    client.rollback().await.unwrap();
    client.commit().await.unwrap();

    let r = client.search(by_id(&id)).await.unwrap();
    assert_eq!(r.results.num_found, 0, "rollback did not discard the add");
}

#[tokio::test]
#[ignore = "requires a running Solr core at SOLR_URL"]
async fn test_delete_by_query_and_optimize() {
    let client = client();
    let name = unique_id().replace('-', "");
    let docs: Vec<Document> = (0..5)
        .map(|_| {
            Document::new()
                .with_field("id", unique_id())
                .with_field("name_s", name.as_str())
        })
        .collect();

    client.add_all(docs).await.unwrap();
    client.optimize().await.unwrap();

    let query = Query::new(format!("name_s:{}", name)).fields("id,score").rows(10);
    let r = client.search(query).await.unwrap();
    assert_eq!(r.results.num_found, 5);
    assert!(r.results.docs.iter().all(|d| d.contains("score")));

    client
        .delete_by_query(format!("name_s:{}", name))
        .await
        .unwrap();
    client.commit().await.unwrap();

    let r = client.search(format!("name_s:{}", name)).await.unwrap();
    assert_eq!(r.results.num_found, 0);
}
