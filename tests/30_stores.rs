mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn create_takes_owner_from_token() -> Result<()> {
    let app = common::TestApp::new()?;
    let tokens = app.register("store_owner").await?;

    let res = app
        .request(
            Method::POST,
            "/stores",
            Some(json!({ "name": "Osh Bazaar", "description": "shoes", "ownerID": "00000000-0000-0000-0000-000000000000" })),
            Some(&tokens.access),
        )
        .await?;

    assert_eq!(res.status, StatusCode::CREATED);
    let me = app.get("/auth/me", &tokens.access).await?;
    assert_eq!(res.data()["ownerID"], me.data()["id"]);
    assert_eq!(res.data()["owner"]["username"], "store_owner");
    Ok(())
}

#[tokio::test]
async fn create_validates_name() -> Result<()> {
    let app = common::TestApp::new()?;
    let tokens = app.register("store_owner").await?;

    let res = app
        .request(Method::POST, "/stores", Some(json!({ "name": "ab" })), Some(&tokens.access))
        .await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["field_errors"]["name"].is_string());
    Ok(())
}

#[tokio::test]
async fn list_defaults_and_paging_bounds() -> Result<()> {
    let app = common::TestApp::new()?;
    let tokens = app.register("store_owner").await?;
    for i in 0..12 {
        app.create_store(&tokens.access, &format!("Store {:02}", i), "").await?;
    }

    let first_page = app.get("/stores", &tokens.access).await?;
    assert_eq!(first_page.status, StatusCode::OK);
    assert_eq!(first_page.data().as_array().map(Vec::len), Some(10));

    let second_page = app.get("/stores?pageNumber=2", &tokens.access).await?;
    assert_eq!(second_page.data().as_array().map(Vec::len), Some(2));

    for size in ["0", "1000"] {
        let res = app.get(&format!("/stores?pageSize={}", size), &tokens.access).await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "pageSize={}", size);
        assert!(res.body["field_errors"]["pageSize"].is_string());
    }

    let far_page = app
        .get("/stores?pageNumber=100000000000000000&pageSize=100", &tokens.access)
        .await?;
    assert_eq!(far_page.status, StatusCode::BAD_REQUEST);
    assert!(far_page.body["field_errors"]["pageNumber"].is_string());

    let bad_sort = app.get("/stores?sortBy=password", &tokens.access).await?;
    assert_eq!(bad_sort.status, StatusCode::BAD_REQUEST);
    assert!(bad_sort.body["field_errors"]["sortBy"].is_string());
    Ok(())
}

#[tokio::test]
async fn list_sorts_by_name() -> Result<()> {
    let app = common::TestApp::new()?;
    let tokens = app.register("store_owner").await?;
    for name in ["Bravo", "Alpha", "Charlie"] {
        app.create_store(&tokens.access, name, "").await?;
    }

    let res = app.get("/stores?sortBy=name&sortOrder=asc", &tokens.access).await?;

    let names: Vec<&str> = res
        .data()
        .as_array()
        .map(|stores| stores.iter().filter_map(|s| s["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, ["Alpha", "Bravo", "Charlie"]);
    Ok(())
}

#[tokio::test]
async fn list_filters_by_owner_and_text() -> Result<()> {
    let app = common::TestApp::new()?;
    let alice = app.register("alice_owner").await?;
    let bob = app.register("bob_owner_1").await?;
    app.create_store(&alice.access, "Leather Goods", "belts and bags").await?;
    app.create_store(&alice.access, "Fresh Fruit", "apples").await?;
    let bobs = app.create_store(&bob.access, "Bob Leather", "").await?;

    let res = app.get("/stores?text=leather", &alice.access).await?;
    assert_eq!(res.data().as_array().map(Vec::len), Some(2));

    let owner_id = bobs["ownerID"].as_str().unwrap_or_default();
    let res = app
        .get(&format!("/stores?text=leather&ownerID={}", owner_id), &alice.access)
        .await?;
    let found = res.data().as_array().cloned().unwrap_or_default();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["name"], "Bob Leather");
    Ok(())
}

#[tokio::test]
async fn update_rules() -> Result<()> {
    let app = common::TestApp::new()?;
    let owner = app.register("store_owner").await?;
    let stranger = app.register("stranger_1").await?;
    let store = app.create_store(&owner.access, "Old Name", "desc").await?;
    let uri = format!("/stores/{}", common::id_of(&store)?);

    let empty = app.request(Method::PATCH, &uri, Some(json!({})), Some(&owner.access)).await?;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert!(empty.body["field_errors"]["changes"].is_string());

    let foreign = app
        .request(Method::PATCH, &uri, Some(json!({ "name": "Hijacked" })), Some(&stranger.access))
        .await?;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let ok = app
        .request(Method::PATCH, &uri, Some(json!({ "name": "New Name" })), Some(&owner.access))
        .await?;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.data()["name"], "New Name");
    assert_eq!(ok.data()["description"], "desc");
    Ok(())
}

#[tokio::test]
async fn delete_then_get_is_not_found() -> Result<()> {
    let app = common::TestApp::new()?;
    let owner = app.register("store_owner").await?;
    let store = app.create_store(&owner.access, "Short Lived", "").await?;
    let uri = format!("/stores/{}", common::id_of(&store)?);

    assert_eq!(app.get(&uri, &owner.access).await?.status, StatusCode::OK);

    let deleted = app.request(Method::DELETE, &uri, None, Some(&owner.access)).await?;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    assert_eq!(app.get(&uri, &owner.access).await?.status, StatusCode::NOT_FOUND);
    let again = app.request(Method::DELETE, &uri, None, Some(&owner.access)).await?;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn malformed_id_is_bad_request() -> Result<()> {
    let app = common::TestApp::new()?;
    let owner = app.register("store_owner").await?;

    let res = app.get("/stores/not-a-uuid", &owner.access).await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], "BAD_REQUEST");
    Ok(())
}
