// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn default_ceilings() {
    let t = Timeouts::default();
    assert_eq!(t.kill_after, Duration::from_secs(3_600));
    assert_eq!(t.drop_after, Duration::from_secs(864_000));
    assert_eq!(t.dismount_after, t.drop_after);
}

#[test]
fn default_scripts_use_placeholders() {
    let s = Scripts::default();
    assert!(s.check.contains("{dir}"));
    assert!(s.kill.contains("{container}"));
    assert!(s.stop.contains("{container}"));
    assert!(s.inspect.contains("{dir}") && s.inspect.contains("{container}"));
}

#[test]
fn start_options_setters() {
    let opts = StartOptions::default()
        .banner("custom 1.0")
        .keyring(b"KEYRING".to_vec())
        .assets(vec![Asset::new("settings.xml", "<x/>")]);
    assert_eq!(opts.banner, "custom 1.0");
    assert_eq!(opts.keyring.as_deref(), Some(&b"KEYRING"[..]));
    assert_eq!(opts.assets[0].name, "settings.xml");
}

#[test]
fn default_banner_names_the_version() {
    assert!(StartOptions::default().banner.starts_with("foreman "));
    assert_eq!(LifecycleConfig::default().marker, "FOREMAN");
}
