// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fm-storage: durable talk documents with per-name exclusive access

mod fs;
mod locks;
mod memory;
mod store;

pub use fs::{FsTalkStore, CURRENT_TALK_VERSION};
pub use locks::{TalkGuard, TalkLocks};
pub use memory::MemoryTalkStore;
pub use store::{StoreError, TalkStore};
