// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{LocalShellProvider, Shell, ShellError, ShellProvider, SshShellProvider};
use fm_core::ShellInfo;
use std::sync::Arc;

/// Host name that, together with an empty key, selects the daemon host.
pub const LOCAL_HOST: &str = "localhost";

/// Routes keyless `localhost` descriptors to [`LocalShellProvider`] and
/// everything else to [`SshShellProvider`].
#[derive(Debug, Clone, Default)]
pub struct ShellRouter {
    ssh: SshShellProvider,
    local: LocalShellProvider,
}

impl ShellRouter {
    pub fn new(ssh: SshShellProvider, local: LocalShellProvider) -> Self {
        Self { ssh, local }
    }

    pub fn is_local(info: &ShellInfo) -> bool {
        info.host == LOCAL_HOST && info.key.trim().is_empty()
    }
}

impl ShellProvider for ShellRouter {
    fn connect(&self, info: &ShellInfo) -> Result<Arc<dyn Shell>, ShellError> {
        if Self::is_local(info) {
            self.local.connect(info)
        } else {
            self.ssh.connect(info)
        }
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
