use std::time::Duration;

use gateway_core::{Announcement, AnnouncementQuery, PlayerHistoryEntry, ServerRecord};
use gateway_store::{GatewayStore, MemoryStore, StoreError, TimeoutStore};

fn notice(notice_type: i32, priority: i32, title: &str, end_time: i64) -> Announcement {
    Announcement {
        notice_type,
        priority,
        title: title.to_string(),
        is_enable: 1,
        start_time: 0,
        end_time,
        ..Default::default()
    }
}

#[tokio::test]
async fn announcements_are_loaded_by_priority_then_id() {
    let store = MemoryStore::new();
    store.create_announcement(notice(1, 5, "a", 100)).await.unwrap();
    store.create_announcement(notice(1, 7, "b", 100)).await.unwrap();
    store.create_announcement(notice(1, 5, "c", 100)).await.unwrap();
    // already ended
    store.create_announcement(notice(1, 9, "d", 10)).await.unwrap();

    let loaded = store.load_announcements(50).await.unwrap();
    let titles: Vec<&str> = loaded.iter().map(|n| n.title.as_str()).collect();

    assert_eq!(titles, vec!["b", "c", "a"]);
}

#[tokio::test]
async fn announcement_crud_round_trip() {
    let store = MemoryStore::new();
    let created = store.create_announcement(notice(2, 1, "maintenance", 100)).await.unwrap();
    assert_eq!(created.id, 1);
    assert!(created.created_at > 0);

    let mut edited = created.clone();
    edited.title = "maintenance tonight".to_string();
    store.update_announcement(edited).await.unwrap();

    let found = store.find_announcement(created.id).await.unwrap().unwrap();
    assert_eq!(found.title, "maintenance tonight");
    assert_eq!(found.created_at, created.created_at);

    store.delete_announcement(created.id).await.unwrap();
    assert!(store.find_announcement(created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn updating_missing_announcement_is_not_found() {
    let store = MemoryStore::new();
    let missing = Announcement {
        id: 42,
        ..Default::default()
    };

    let err = store.update_announcement(missing).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn announcement_listing_filters_and_pages_newest_first() {
    let store = MemoryStore::new();
    for i in 0..12 {
        let mut n = notice(if i % 2 == 0 { 1 } else { 2 }, 0, &format!("notice {i}"), 100);
        n.is_enable = if i < 10 { 1 } else { 0 };
        store.create_announcement(n).await.unwrap();
    }

    let first = store
        .list_announcements(&AnnouncementQuery::default())
        .await
        .unwrap();
    assert_eq!(first.total, 12);
    assert_eq!(first.page, 1);
    assert_eq!(first.page_size, 10);
    assert_eq!(first.list.len(), 10);
    assert_eq!(first.list[0].id, 12);

    let second = store
        .list_announcements(&AnnouncementQuery {
            page: 2,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(second.list.len(), 2);
    assert_eq!(second.list[1].id, 1);

    let typed_and_enabled = store
        .list_announcements(&AnnouncementQuery {
            notice_type: 1,
            is_enable: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(typed_and_enabled.total, 5);

    let by_title = store
        .list_announcements(&AnnouncementQuery {
            title: "notice 1".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    // "notice 1", "notice 10", "notice 11"
    assert_eq!(by_title.total, 3);
}

#[tokio::test]
async fn announcement_listing_past_the_end_is_empty() {
    let store = MemoryStore::new();
    store.create_announcement(notice(1, 0, "only", 100)).await.unwrap();

    let page = store
        .list_announcements(&AnnouncementQuery {
            page: i64::MAX / 2,
            page_size: 1000,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert!(page.list.is_empty());
    assert_eq!(page.page_size, AnnouncementQuery::MAX_PAGE_SIZE);
}

#[tokio::test]
async fn batch_delete_removes_only_listed_ids() {
    let store = MemoryStore::new();
    for i in 0..4 {
        store.create_announcement(notice(1, i, "n", 100)).await.unwrap();
    }

    store.delete_announcements(&[1, 3, 99]).await.unwrap();

    let page = store
        .list_announcements(&AnnouncementQuery::default())
        .await
        .unwrap();
    let ids: Vec<u64> = page.list.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![4, 2]);
}

#[tokio::test]
async fn player_history_moves_latest_server_to_front() {
    let store = MemoryStore::new();
    store
        .record_player_login("acc-1", PlayerHistoryEntry::new(1, 1, 100))
        .await
        .unwrap();
    store
        .record_player_login("acc-1", PlayerHistoryEntry::new(1, 2, 200))
        .await
        .unwrap();

    let mut again = PlayerHistoryEntry::new(1, 1, 100);
    again.level = Some(30);
    store.record_player_login("acc-1", again).await.unwrap();

    let history = store.get_user_history("acc-1").await.unwrap();
    assert_eq!(history.player_list.len(), 2);
    assert_eq!(history.player_list[0].game_id, 1);
    assert_eq!(history.player_list[0].level, Some(30));
    assert_eq!(history.player_list[1].game_id, 2);
}

#[tokio::test]
async fn unknown_account_has_empty_history() {
    let store = MemoryStore::new();

    let history = store.get_user_history("nobody").await.unwrap();
    assert_eq!(history.account_id, "nobody");
    assert!(history.player_list.is_empty());

    // no row to update
    store.set_user_state("nobody", 1).await.unwrap();
    assert_eq!(store.get_user_history("nobody").await.unwrap().state, 0);
}

#[tokio::test]
async fn user_state_is_updated_for_known_account() {
    let store = MemoryStore::new();
    store
        .record_player_login("acc-2", PlayerHistoryEntry::new(1, 1, 1))
        .await
        .unwrap();

    store.set_user_state("acc-2", 1).await.unwrap();

    assert_eq!(store.get_user_history("acc-2").await.unwrap().state, 1);
}

#[tokio::test]
async fn whitelist_upsert_is_idempotent() {
    let store = MemoryStore::new();
    store.upsert_whitelist_ip("sgame", "10.0.0.1").await.unwrap();
    store.upsert_whitelist_ip("sgame", "10.0.0.1").await.unwrap();
    store.upsert_whitelist_ip("sgame", "10.0.0.2").await.unwrap();

    let ips = store.load_whitelist_group("sgame").await.unwrap();
    assert_eq!(ips, vec!["10.0.0.1", "10.0.0.2"]);
}

#[tokio::test]
async fn whitelist_replace_drops_previous_entries() {
    let store = MemoryStore::new();
    store.upsert_whitelist_ip("out", "1.1.1.1").await.unwrap();
    store.upsert_whitelist_ip("sgame", "2.2.2.2").await.unwrap();

    store
        .replace_whitelist_group("out", &["3.3.3.3".to_string(), "10.0.0.0/8".to_string()])
        .await
        .unwrap();
    store.delete_whitelist_ip("sgame", "2.2.2.2").await.unwrap();

    let groups = store.load_all_whitelist_groups().await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups["out"], vec!["3.3.3.3", "10.0.0.0/8"]);
    assert!(store.load_whitelist_group("sgame").await.unwrap().is_empty());
}

#[tokio::test]
async fn unavailable_store_fails_every_call() {
    let store = MemoryStore::with_servers([ServerRecord::new(1, 1)]);
    store.set_available(false);

    assert!(store.load_server_list().await.is_err());
    assert!(store.health_check().await.is_err());

    store.clear_faults();
    assert!(store.health_check().await.is_ok());
}

#[tokio::test]
async fn injected_fault_targets_one_operation() {
    let store = MemoryStore::new();
    store.fail_on("load_whitelist_group");

    let err = store.load_whitelist_group("sgame").await.unwrap_err();
    assert!(err.is_transient());
    assert!(store.load_all_whitelist_groups().await.is_ok());
    assert_eq!(store.call_count("load_whitelist_group"), 1);
}

#[tokio::test(start_paused = true)]
async fn timeout_wrapper_bounds_slow_store() {
    let inner = MemoryStore::new();
    inner.set_latency(Some(Duration::from_secs(30)));
    let store = TimeoutStore::new(inner, Duration::from_secs(3));

    let err = store.load_announcements(0).await.unwrap_err();

    assert!(matches!(err, StoreError::Timeout { millis: 3000 }));
    let gateway = err.into_gateway("load_announcements");
    assert!(gateway.is_store());
}
