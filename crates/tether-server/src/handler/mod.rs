//! HTTP handlers for folders, items, files and OAuth events.
//!
//! Every resource handler first dispatches through the registered hooks
//! and falls through to the native resources when none claims the
//! request.

mod error;
mod folders;
mod items;
mod oauth;
pub mod request;
pub mod response;

use axum::Router;

pub use crate::handler::error::{Error, ErrorKind, Result};
use crate::service::ServiceState;

#[inline]
async fn handler() -> Result<()> {
    Err(ErrorKind::NotFound.into_error())
}

/// Returns a [`Router`] with all routes and a not-found fallback.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .merge(folders::routes())
        .merge(items::routes())
        .merge(oauth::routes())
        .fallback(handler)
}

#[cfg(test)]
mod test {
    use axum::http::{HeaderValue, StatusCode, header};
    use axum_test::TestServer;
    use serde_json::{Value, json};
    use tether_core::bridge::{TRANSFER_SCOPE, endpoint_root_id};
    use tether_core::credential::UserCredential;
    use tether_core::hooks::ParentType;
    use tether_core::mock::{MockDataPlane, MockTransfer};
    use tether_core::transfer::{EndpointSummary, RemoteEntry};
    use tether_core::{
        BridgeConfig, CredentialService, DataPlaneService, InMemoryCredentialStore, RemoteBridge,
        TransferService, UserId, VirtualId,
    };

    use crate::extract::HOST_USER_HEADER;
    use crate::handler::routes;
    use crate::service::{HookRegistry, InMemoryResources, NativeService, ServiceState};

    const BIG_FILE_SIZE: usize = 200_000;

    struct Fixture {
        server: TestServer,
        private_folder: String,
        native_item: String,
        transfer: MockTransfer,
    }

    fn user(id: &'static str) -> HeaderValue {
        HeaderValue::from_static(id)
    }

    /// Returns a [`TestServer`] with one native folder for `u-1` and one
    /// remote endpoint `u-1` holds tokens for.
    async fn create_test_server() -> anyhow::Result<Fixture> {
        let native = InMemoryResources::new();
        let private = native
            .create_folder("u-1", ParentType::User, "Private")
            .await;
        let item = native
            .create_item(&private.id, "notes.txt", "native", Some("text/plain"))
            .await;

        let transfer = MockTransfer::new()
            .with_endpoints(vec![EndpointSummary::new("ep-1", "Shared")])
            .with_listing(
                "ep-1",
                "~",
                vec![RemoteEntry::dir("data"), RemoteEntry::file("a.txt", 5)],
            )
            .with_listing(
                "ep-1",
                "~/data",
                vec![RemoteEntry::file("big.bin", BIG_FILE_SIZE as u64)],
            );
        let data_plane = MockDataPlane::new()
            .with_file("ep-1", "a.txt", "hello", Some("text/plain"))
            .with_file("ep-1", "data/big.bin", vec![3u8; BIG_FILE_SIZE], None);

        let credentials = CredentialService::new(InMemoryCredentialStore::new());
        let credential = UserCredential::new(Some("transfer".into()), Some("https".into()));
        credentials.put(&UserId::new("u-1"), credential).await?;

        let bridge = RemoteBridge::new(
            BridgeConfig::default(),
            TransferService::new(transfer.clone()),
            DataPlaneService::new(data_plane),
            credentials,
        );

        let state = ServiceState::new(
            HookRegistry::new().with_hook(bridge),
            NativeService::new(native),
            BridgeConfig::default(),
        );
        let server = TestServer::new(routes().with_state(state))?;

        Ok(Fixture {
            server,
            private_folder: private.id,
            native_item: item.id,
            transfer,
        })
    }

    fn ids(body: &Value) -> Vec<&str> {
        body.as_array()
            .map(|nodes| nodes.iter().filter_map(|n| n["_id"].as_str()).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn handlers() -> anyhow::Result<()> {
        let fixture = create_test_server().await?;
        assert!(fixture.server.is_running());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() -> anyhow::Result<()> {
        let fixture = create_test_server().await?;
        let response = fixture.server.get("/collection").await;
        response.assert_status_not_found();
        assert_eq!(response.json::<Value>()["name"], "not_found");
        Ok(())
    }

    #[tokio::test]
    async fn user_root_lists_native_then_endpoints() -> anyhow::Result<()> {
        let fixture = create_test_server().await?;

        let response = fixture
            .server
            .get("/folder")
            .add_query_param("parentId", "u-1")
            .add_query_param("parentType", "user")
            .add_header(HOST_USER_HEADER, user("u-1"))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        let root = endpoint_root_id("ep-1");
        assert_eq!(ids(&body), [fixture.private_folder.as_str(), root.as_str()]);
        assert_eq!(body[1]["name"], "Shared");
        assert_eq!(body[1]["remoteFolder"], true);
        assert!(body[0].get("remoteFolder").is_none());

        Ok(())
    }

    #[tokio::test]
    async fn anonymous_root_is_native_only() -> anyhow::Result<()> {
        let fixture = create_test_server().await?;

        let response = fixture
            .server
            .get("/folder")
            .add_query_param("parentId", "u-1")
            .add_query_param("parentType", "user")
            .await;

        let body: Value = response.json();
        assert_eq!(ids(&body), [fixture.private_folder.as_str()]);
        assert_eq!(fixture.transfer.calls(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn remote_folders_and_items_are_listed() -> anyhow::Result<()> {
        let fixture = create_test_server().await?;
        let root = endpoint_root_id("ep-1");

        let folders: Value = fixture
            .server
            .get("/folder")
            .add_query_param("parentId", &root)
            .add_header(HOST_USER_HEADER, user("u-1"))
            .await
            .json();
        assert_eq!(ids(&folders), [VirtualId::folder("ep-1", "~/data").encode()]);
        assert_eq!(folders[0]["remotePath"], "~/data");

        let items: Value = fixture
            .server
            .get("/item")
            .add_query_param("folderId", &root)
            .add_header(HOST_USER_HEADER, user("u-1"))
            .await
            .json();
        assert_eq!(ids(&items), [VirtualId::item("ep-1", "~/a.txt", 5).encode()]);
        assert_eq!(items[0]["remoteFile"], true);
        assert_eq!(items[0]["size"], 5);

        Ok(())
    }

    #[tokio::test]
    async fn missing_query_parameter_is_bad_request() -> anyhow::Result<()> {
        let fixture = create_test_server().await?;
        let response = fixture.server.get("/item").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_identifier_is_bad_request() -> anyhow::Result<()> {
        let fixture = create_test_server().await?;

        let response = fixture.server.get("/folder/globus:not-json").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["name"], "malformed_identifier");

        let response = fixture
            .server
            .get("/item/globus:not-json/download")
            .add_header(HOST_USER_HEADER, user("u-1"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = fixture
            .server
            .get("/folder")
            .add_query_param("parentId", "globus:!!corrupt!!")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["name"], "malformed_identifier");

        let response = fixture
            .server
            .get("/item")
            .add_query_param("folderId", "globus:!!corrupt!!")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["name"], "malformed_identifier");

        Ok(())
    }

    #[tokio::test]
    async fn foreign_identifiers_fall_through() -> anyhow::Result<()> {
        let fixture = create_test_server().await?;

        let response = fixture
            .server
            .get(&format!("/folder/{}", fixture.private_folder))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["name"], "Private");

        let response = fixture
            .server
            .get(&format!("/folder/{}/details", fixture.private_folder))
            .await;
        assert_eq!(response.json::<Value>(), json!({"nFolders": 0, "nItems": 1}));

        let response = fixture.server.get("/folder/ffffffffffffffffffffffff").await;
        response.assert_status_not_found();

        Ok(())
    }

    #[tokio::test]
    async fn remote_details_are_synthesized() -> anyhow::Result<()> {
        let fixture = create_test_server().await?;
        let item = VirtualId::item("ep-1", "~/data/big.bin", BIG_FILE_SIZE as u64);
        let folder = VirtualId::folder("ep-1", "~/data");

        let detail: Value = fixture
            .server
            .get(&format!("/item/{}", item.encode()))
            .add_header(HOST_USER_HEADER, user("u-1"))
            .await
            .json();
        assert_eq!(detail["name"], "big.bin");
        assert_eq!(detail["folderId"], folder.encode());
        assert_eq!(detail["baseParentType"], "user");

        let files: Value = fixture
            .server
            .get(&format!("/item/{}/files", item.encode()))
            .await
            .json();
        assert_eq!(files[0]["itemId"], item.encode());
        assert_eq!(files[0]["exts"], json!(["bin"]));

        let details: Value = fixture
            .server
            .get(&format!("/folder/{}/details", folder.encode()))
            .await
            .json();
        assert_eq!(details, json!({"nFolders": null, "nItems": null}));
        assert_eq!(fixture.transfer.calls(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn remote_download_streams_content() -> anyhow::Result<()> {
        let fixture = create_test_server().await?;
        let item = VirtualId::item("ep-1", "~/a.txt", 5).encode();

        let response = fixture
            .server
            .get(&format!("/item/{item}/download"))
            .add_header(HOST_USER_HEADER, user("u-1"))
            .await;
        response.assert_status_ok();
        assert_eq!(response.text(), "hello");
        assert_eq!(
            response.header(header::CONTENT_DISPOSITION),
            "attachment; filename=\"a.txt\""
        );
        assert_eq!(response.header(header::CONTENT_TYPE), "text/plain");

        let response = fixture
            .server
            .get(&format!("/file/{item}/download"))
            .add_query_param("contentDisposition", "inline")
            .add_header(HOST_USER_HEADER, user("u-1"))
            .await;
        assert_eq!(response.header(header::CONTENT_DISPOSITION), "inline");

        Ok(())
    }

    #[tokio::test]
    async fn large_download_is_complete() -> anyhow::Result<()> {
        let fixture = create_test_server().await?;
        let item = VirtualId::item("ep-1", "~/data/big.bin", BIG_FILE_SIZE as u64).encode();

        let response = fixture
            .server
            .get(&format!("/item/{item}/download"))
            .add_header(HOST_USER_HEADER, user("u-1"))
            .await;
        response.assert_status_ok();
        assert_eq!(response.as_bytes().len(), BIG_FILE_SIZE);
        assert!(response.as_bytes().iter().all(|b| *b == 3));

        Ok(())
    }

    #[tokio::test]
    async fn refused_download_reports_upstream_status() -> anyhow::Result<()> {
        let fixture = create_test_server().await?;
        let item = VirtualId::item("ep-1", "~/missing.txt", 1).encode();

        let response = fixture
            .server
            .get(&format!("/item/{item}/download"))
            .add_header(HOST_USER_HEADER, user("u-1"))
            .await;
        response.assert_status(StatusCode::BAD_GATEWAY);

        let body: Value = response.json();
        assert_eq!(body["name"], "bad_gateway");
        assert_eq!(body["upstreamStatus"], 404);

        Ok(())
    }

    #[tokio::test]
    async fn native_download_is_served() -> anyhow::Result<()> {
        let fixture = create_test_server().await?;

        let response = fixture
            .server
            .get(&format!("/item/{}/download", fixture.native_item))
            .await;
        response.assert_status_ok();
        assert_eq!(response.text(), "native");
        assert_eq!(
            response.header(header::CONTENT_DISPOSITION),
            "attachment; filename=\"notes.txt\""
        );

        Ok(())
    }

    #[tokio::test]
    async fn scopes_are_published_for_the_provider() -> anyhow::Result<()> {
        let fixture = create_test_server().await?;

        let body: Value = fixture.server.get("/oauth/globus/scopes").await.json();
        assert_eq!(body["provider"], "globus");
        assert_eq!(body["scopes"][0], TRANSFER_SCOPE);

        let response = fixture.server.get("/oauth/google/scopes").await;
        response.assert_status_not_found();

        Ok(())
    }

    #[tokio::test]
    async fn oauth_callback_captures_tokens() -> anyhow::Result<()> {
        let fixture = create_test_server().await?;
        let list_root = || {
            fixture
                .server
                .get("/folder")
                .add_query_param("parentId", "u-2")
                .add_query_param("parentType", "user")
                .add_header(HOST_USER_HEADER, user("u-2"))
        };

        let before: Value = list_root().await.json();
        assert!(ids(&before).is_empty());

        let response = fixture
            .server
            .post("/oauth/callback")
            .add_header(HOST_USER_HEADER, user("u-2"))
            .json(&json!({
                "provider": "globus",
                "user": "u-2",
                "token": {
                    "access_token": "auth",
                    "resource_server": "auth.globus.org",
                    "expires_in": 172800,
                    "token_type": "Bearer",
                    "other_tokens": [
                        {"access_token": "transfer", "resource_server": "transfer.api.globus.org"},
                        {"access_token": "https", "resource_server": "petrel_https_server"}
                    ]
                }
            }))
            .await;
        response.assert_status(StatusCode::NO_CONTENT);

        let after: Value = list_root().await.json();
        assert_eq!(ids(&after), [endpoint_root_id("ep-1")]);

        Ok(())
    }

    #[tokio::test]
    async fn malformed_oauth_event_is_bad_request() -> anyhow::Result<()> {
        let fixture = create_test_server().await?;
        let response = fixture
            .server
            .post("/oauth/callback")
            .json(&json!({"provider": "globus"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn oauth_callback_for_another_user_is_forbidden() -> anyhow::Result<()> {
        let fixture = create_test_server().await?;
        let event = json!({
            "provider": "globus",
            "user": "u-1",
            "token": {"resource_server": "auth.globus.org"}
        });

        let response = fixture
            .server
            .post("/oauth/callback")
            .add_header(HOST_USER_HEADER, user("u-2"))
            .json(&event)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = fixture.server.post("/oauth/callback").json(&event).await;
        response.assert_status(StatusCode::FORBIDDEN);

        let root: Value = fixture
            .server
            .get("/folder")
            .add_query_param("parentId", "u-1")
            .add_query_param("parentType", "user")
            .add_header(HOST_USER_HEADER, user("u-1"))
            .await
            .json();
        assert!(ids(&root).contains(&endpoint_root_id("ep-1").as_str()));

        Ok(())
    }

    #[tokio::test]
    async fn camel_case_token_set_is_rejected() -> anyhow::Result<()> {
        let fixture = create_test_server().await?;
        let response = fixture
            .server
            .post("/oauth/callback")
            .add_header(HOST_USER_HEADER, user("u-1"))
            .json(&json!({
                "provider": "globus",
                "user": "u-1",
                "token": {
                    "accessToken": "auth",
                    "resourceServer": "auth.globus.org",
                    "otherTokens": []
                }
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let root: Value = fixture
            .server
            .get("/folder")
            .add_query_param("parentId", "u-1")
            .add_query_param("parentType", "user")
            .add_header(HOST_USER_HEADER, user("u-1"))
            .await
            .json();
        assert!(ids(&root).contains(&endpoint_root_id("ep-1").as_str()));

        Ok(())
    }
}
