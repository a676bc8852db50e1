use rushfiles_core::{RushFilesClient, ShareConfig};
use rushfiles_provider::{ProviderError, RfPath, RushFilesProvider};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> RushFilesProvider {
    let client = RushFilesClient::with_base_urls(
        &server.uri(),
        &server.uri(),
        ShareConfig {
            share_id: "share1".into(),
            domain: "rushfiles.example".into(),
            token: "test-token".into(),
            device_id: "device-1".into(),
        },
    )
    .unwrap();
    RushFilesProvider::new(client)
}

#[tokio::test]
async fn create_folder_sends_directory_attributes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/shares/share1/files"))
        .and(body_partial_json(json!({
            "ClientJournalEventType": 0,
            "DeviceId": "device-1",
            "RfVirtualFile": {
                "PublicName": "docs",
                "ParrentId": "share1",
                "EndOfFile": 0,
                "Attributes": 16
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Data": { "ClientJournalEvent": { "RfVirtualFile": {
                "InternalName": "id-docs", "PublicName": "docs", "IsFile": false, "Attributes": 16
            } } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(&server);
    let target = RfPath::root("share1").child("docs", None, true);
    let folder = provider.create_folder(&target).await.unwrap();

    assert_eq!(folder.id, "id-docs");
    assert_eq!(folder.name, "docs");
    assert_eq!(folder.path().to_string(), "/docs/");
}

#[tokio::test]
async fn create_folder_over_an_existing_entry_is_a_naming_conflict() {
    let server = MockServer::start().await;

    let provider = provider(&server);
    let target = RfPath::root("share1").child("docs", Some("id-docs".into()), true);
    let err = provider.create_folder(&target).await.unwrap_err();

    assert!(matches!(err, ProviderError::NamingConflict(_)));
}

#[tokio::test]
async fn create_folder_requires_a_folder_path() {
    let server = MockServer::start().await;

    let provider = provider(&server);
    let target = RfPath::root("share1").child("docs", None, false);
    let err = provider.create_folder(&target).await.unwrap_err();

    assert!(matches!(err, ProviderError::NotAFolder(_)));
}

#[tokio::test]
async fn listing_maps_children_with_their_paths() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/shares/share1/virtualfiles/id-docs/children"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Data": [
                { "InternalName": "id-a", "PublicName": "a.txt", "IsFile": true, "EndOfFile": 4 },
                { "InternalName": "id-sub", "PublicName": "sub", "IsFile": false }
            ]
        })))
        .mount(&server)
        .await;

    let provider = provider(&server);
    let target = RfPath::root("share1").child("docs", Some("id-docs".into()), true);
    let children = provider.list(&target).await.unwrap();

    assert_eq!(children.len(), 2);
    assert!(children[0].is_file());
    assert_eq!(children[0].path().to_string(), "/docs/a.txt");
    assert!(!children[1].is_file());
    assert_eq!(children[1].path().identifier(), Some("id-sub"));
}

#[tokio::test]
async fn listing_an_unknown_folder_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/shares/share1/virtualfiles/id-gone/children"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let provider = provider(&server);
    let target = RfPath::root("share1").child("gone", Some("id-gone".into()), true);
    let err = provider.list(&target).await.unwrap_err();

    assert!(matches!(err, ProviderError::NotFound(_)));
}
