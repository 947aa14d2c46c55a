//! Credential operation tests against a scripted daemon.

use serde_json::json;

use formvault_client::ClientError;
use formvault_core::{KeyData, Passphrase, Record, SearchData, Tag};
use formvault_integration_tests::client_and_daemon;

fn login_record(key: &str) -> Record {
    Record::new(key)
        .with_field("username", "bob")
        .with_field("password", "hunter2")
}

#[tokio::test]
async fn test_put_then_get_round_trip() {
    let (client, mut daemon) = client_and_daemon();
    let record = login_record("example.com/login");

    let script = tokio::spawn(async move {
        let put = daemon.expect(Tag::Put).await;
        let stored: Record = serde_json::from_value(put.data.unwrap()).unwrap();
        assert_eq!(stored.key, "example.com/login");
        daemon.reply_ok(put.id.unwrap()).await;

        let get = daemon.expect(Tag::Get).await;
        daemon
            .reply(get.id.unwrap(), Tag::Form, json!(stored))
            .await;
    });

    client.put(&record).await.unwrap();
    let fetched = client
        .get("example.com/login", &Passphrase::new("pw"))
        .await
        .unwrap();
    assert_eq!(fetched.fields, record.fields);

    script.await.unwrap();
}

#[tokio::test]
async fn test_update_rename_puts_before_removing_old_key() {
    let (client, mut daemon) = client_and_daemon();
    let renamed = login_record("example.com/signin");

    let script = tokio::spawn(async move {
        // The write must come first so a failure between the two steps
        // can strand the old record but never lose the new one.
        let put = daemon.expect(Tag::Put).await;
        let stored: Record = serde_json::from_value(put.data.unwrap()).unwrap();
        assert_eq!(stored.key, "example.com/signin");
        daemon.reply_ok(put.id.unwrap()).await;

        let remove = daemon.expect(Tag::Remove).await;
        let data: KeyData = serde_json::from_value(remove.data.unwrap()).unwrap();
        assert_eq!(data.key, "example.com/login");
        daemon.reply_ok(remove.id.unwrap()).await;
    });

    client.update("example.com/login", &renamed).await.unwrap();
    script.await.unwrap();
}

#[tokio::test]
async fn test_update_same_key_sends_no_remove() {
    let (client, mut daemon) = client_and_daemon();
    let record = login_record("example.com/login");

    let script = tokio::spawn(async move {
        let put = daemon.expect(Tag::Put).await;
        daemon.reply_ok(put.id.unwrap()).await;

        // The next request must be the sentinel LIST, not a REMOVE.
        let sentinel = daemon.expect(Tag::List).await;
        daemon
            .reply(sentinel.id.unwrap(), Tag::Forms, json!([]))
            .await;
    });

    client.update("example.com/login", &record).await.unwrap();
    client.list().await.unwrap();
    script.await.unwrap();
}

#[tokio::test]
async fn test_update_failed_put_sends_no_remove() {
    let (client, mut daemon) = client_and_daemon();
    let renamed = login_record("example.com/signin");

    let script = tokio::spawn(async move {
        let put = daemon.expect(Tag::Put).await;
        daemon.reply_error(put.id.unwrap(), "disk full").await;

        // No REMOVE may follow a failed write; the old record is the
        // only copy left.
        let sentinel = daemon.expect(Tag::List).await;
        daemon
            .reply(sentinel.id.unwrap(), Tag::Forms, json!([]))
            .await;
    });

    let err = client
        .update("example.com/login", &renamed)
        .await
        .unwrap_err();
    match err {
        ClientError::Remote(payload) => assert_eq!(payload, json!("disk full")),
        other => panic!("expected Remote error, got {other:?}"),
    }

    client.list().await.unwrap();
    script.await.unwrap();
}

#[tokio::test]
async fn test_update_remove_failure_reports_partial_update() {
    let (client, mut daemon) = client_and_daemon();
    let renamed = login_record("example.com/signin");

    let script = tokio::spawn(async move {
        let put = daemon.expect(Tag::Put).await;
        daemon.reply_ok(put.id.unwrap()).await;

        let remove = daemon.expect(Tag::Remove).await;
        daemon.reply_error(remove.id.unwrap(), "key locked").await;
    });

    let err = client
        .update("example.com/login", &renamed)
        .await
        .unwrap_err();
    match err {
        ClientError::PartialUpdate { old_key, source } => {
            assert_eq!(old_key, "example.com/login");
            assert!(matches!(*source, ClientError::Remote(_)));
        }
        other => panic!("expected PartialUpdate, got {other:?}"),
    }

    script.await.unwrap();
}

#[tokio::test]
async fn test_search_with_no_matches_returns_empty() {
    let (client, mut daemon) = client_and_daemon();

    let script = tokio::spawn(async move {
        let search = daemon.expect(Tag::Search).await;
        let data: SearchData = serde_json::from_value(search.data.unwrap()).unwrap();
        assert_eq!(data.query, "example.com");
        daemon
            .reply(search.id.unwrap(), Tag::Forms, json!([]))
            .await;
    });

    // Empty result set is a successful outcome, not an error; the UI
    // renders it as "No saved forms".
    let records = client.search("example.com").await.unwrap();
    assert!(records.is_empty());
    script.await.unwrap();
}

#[tokio::test]
async fn test_list_returns_summaries_without_fields() {
    let (client, mut daemon) = client_and_daemon();

    let script = tokio::spawn(async move {
        let list = daemon.expect(Tag::List).await;
        daemon
            .reply(
                list.id.unwrap(),
                Tag::Forms,
                json!([{"key": "example.com/login"}, {"key": "example.org"}]),
            )
            .await;
    });

    let records = client.list().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].key, "example.com/login");
    assert!(records[0].fields.is_empty());
    script.await.unwrap();
}

#[tokio::test]
async fn test_remove_acknowledged() {
    let (client, mut daemon) = client_and_daemon();

    let script = tokio::spawn(async move {
        let remove = daemon.expect(Tag::Remove).await;
        let data: KeyData = serde_json::from_value(remove.data.unwrap()).unwrap();
        assert_eq!(data.key, "example.com/login");
        daemon.reply_ok(remove.id.unwrap()).await;
    });

    client.remove("example.com/login").await.unwrap();
    script.await.unwrap();
}
