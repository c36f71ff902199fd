//! UserService end to end against a real backend.

use std::sync::Arc;

use userbase::{Pagination, User, service::USERS_PATH};

use crate::helpers::*;

#[tokio::test]
async fn test_load_reflects_store() {
    let (_store, service) = setup(5).await;

    service.load(None).await.expect("Failed to load users");

    assert_eq!(service.count(), 5);
    let snapshot = service.snapshot();
    assert_eq!(snapshot.len(), 5);
    assert_eq!(snapshot[0].username, "user0");
    assert!(snapshot[0].active);
    assert!(!snapshot[1].active);
}

#[tokio::test]
async fn test_load_with_pagination() {
    let (_store, service) = setup(5).await;

    service
        .load(Some(&Pagination::page(2, 2)))
        .await
        .expect("Failed to load page");

    let names: Vec<_> = service
        .snapshot()
        .iter()
        .map(|u| u.username.clone())
        .collect();
    assert_eq!(names, vec!["user2", "user3"]);
}

#[tokio::test]
async fn test_add_then_load() {
    let (store, service) = setup(0).await;

    let created = service
        .add(&User::new("newbie", "newbie@example.com", "s3cret"))
        .await
        .expect("Failed to add user")
        .into_json()
        .expect("Failed to decode created user");

    assert_eq!(created["owner"], ADMIN);
    assert!(created["id"].is_string());
    assert!(created.get("password").is_none());
    // add does not touch the cache
    assert_eq!(service.count(), 0);
    assert_eq!(store.len(USERS_PATH), 1);

    service.load(None).await.expect("Failed to load users");
    let user = &service.snapshot()[0];
    assert_eq!(user.username, "newbie");
    assert_eq!(user.owner.as_deref(), Some(ADMIN));
    assert_eq!(user.created_by.as_deref(), Some(ADMIN));
    assert!(user.created_at.is_some());
    assert_eq!(user.password, None);
}

#[tokio::test]
async fn test_update_persists_and_republishes() {
    let (_store, service) = setup(3).await;
    service.load(None).await.expect("Failed to load users");
    let before = service.snapshot();

    let mut user = User::clone(&before[2]);
    user.verified = true;
    user.role = Some("editor".to_string());
    service.update(&user).await.expect("Failed to update user");

    let after = service.snapshot();
    assert!(!after.ptr_eq(&before));
    assert!(after[2].verified);

    let raw = service.get("id-2").await.expect("Failed to get user");
    assert_eq!(raw["role"], "editor");
    assert_eq!(raw["verified"], true);
    assert_eq!(raw["modifiedBy"], ADMIN);
}

#[tokio::test]
async fn test_delete_removes_from_store_and_cache() {
    let (store, service) = setup(3).await;
    service.load(None).await.expect("Failed to load users");
    let target = service.snapshot()[1].clone();

    let deleted = service.delete(&target).await.expect("Failed to delete user");

    assert!(deleted.deleted);
    assert!(!deleted.deleting);
    assert_eq!(service.count(), 2);
    assert_eq!(store.len(USERS_PATH), 2);
    assert!(service.get("id-1").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_delete_unknown_user_fails_without_touching_cache() {
    let (_store, service) = setup(2).await;
    service.load(None).await.expect("Failed to load users");

    let stranger = Arc::new(User::default().with_id("X"));
    let err = service.delete(&stranger).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(service.count(), 2);
}

#[tokio::test]
async fn test_get_does_not_touch_cache() {
    let (_store, service) = setup(2).await;
    service.load(None).await.expect("Failed to load users");
    let before = service.snapshot();

    let raw = service.get("id-0").await.expect("Failed to get user");

    assert_eq!(raw["username"], "user0");
    assert_eq!(service.count(), 2);
    assert!(service.snapshot().ptr_eq(&before));
}
