//! Overlapping calls must resolve to their own replies.
//!
//! The legacy extension matched replies to whichever listener was
//! still registered, so overlapping calls could receive each other's
//! results. Correlation ids route by request instead; these tests pin
//! that behavior down.

use serde_json::json;

use formvault_core::{GetData, Passphrase, Record, Tag};
use formvault_integration_tests::client_and_daemon;

#[tokio::test]
async fn test_overlapping_gets_each_receive_their_own_record() {
    let (client, mut daemon) = client_and_daemon();

    let script = tokio::spawn(async move {
        let first = daemon.expect(Tag::Get).await;
        let second = daemon.expect(Tag::Get).await;

        let first_key: GetData = serde_json::from_value(first.data.clone().unwrap()).unwrap();
        let second_key: GetData = serde_json::from_value(second.data.clone().unwrap()).unwrap();

        // Answer in reverse arrival order; routing must not care.
        daemon
            .reply(
                second.id.unwrap(),
                Tag::Form,
                json!(Record::new(&second_key.key).with_field("site", &second_key.key)),
            )
            .await;
        daemon
            .reply(
                first.id.unwrap(),
                Tag::Form,
                json!(Record::new(&first_key.key).with_field("site", &first_key.key)),
            )
            .await;
    });

    let passphrase = Passphrase::new("pw");
    let (a, b) = tokio::join!(
        client.get("example.com/a", &passphrase),
        client.get("example.org/b", &passphrase),
    );

    assert_eq!(a.unwrap().key, "example.com/a");
    assert_eq!(b.unwrap().key, "example.org/b");
    script.await.unwrap();
}

#[tokio::test]
async fn test_overlapping_mixed_operations_do_not_cross() {
    let (client, mut daemon) = client_and_daemon();

    let script = tokio::spawn(async move {
        let search = daemon.expect(Tag::Search).await;
        let get = daemon.expect(Tag::Get).await;

        // The GET resolves first even though SEARCH was sent first.
        daemon
            .reply(
                get.id.unwrap(),
                Tag::Form,
                json!(Record::new("example.com").with_field("password", "secret")),
            )
            .await;
        daemon
            .reply(search.id.unwrap(), Tag::Forms, json!([{"key": "example.com"}]))
            .await;
    });

    let passphrase = Passphrase::new("pw");
    let (found, fetched) = tokio::join!(
        client.search("example.com"),
        client.get("example.com", &passphrase),
    );

    assert_eq!(found.unwrap().len(), 1);
    assert_eq!(fetched.unwrap().fields[0].value, "secret");
    script.await.unwrap();
}
