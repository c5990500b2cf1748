// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[tokio::test]
async fn same_name_is_exclusive() {
    let locks = TalkLocks::new();
    let name = TalkName::from("a");
    let guard = locks.lock(&name).await;
    assert_eq!(guard.name(), &name);
    assert!(locks.try_lock(&name).is_none());
    drop(guard);
    assert!(locks.try_lock(&name).is_some());
}

#[tokio::test]
async fn different_names_do_not_contend() {
    let locks = TalkLocks::new();
    let _a = locks.lock(&TalkName::from("a")).await;
    let b = tokio::time::timeout(Duration::from_secs(1), locks.lock(&TalkName::from("b"))).await;
    assert!(b.is_ok());
}

#[tokio::test]
async fn waiter_acquires_after_release() {
    let locks = TalkLocks::new();
    let name = TalkName::from("a");
    let guard = locks.lock(&name).await;

    let waiter = {
        let locks = locks.clone();
        let name = name.clone();
        tokio::spawn(async move {
            let _g = locks.lock(&name).await;
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());

    drop(guard);
    tokio::time::timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
}

#[tokio::test]
async fn idle_entries_are_pruned() {
    let locks = TalkLocks::new();
    for n in 0..10 {
        let _g = locks.lock(&TalkName::from(format!("t{n}"))).await;
    }
    let _last = locks.lock(&TalkName::from("last")).await;
    assert_eq!(locks.len(), 1);
}
