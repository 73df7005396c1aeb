//! Tests for allowed directory value objects

use mcpfs_domain::{AllowedDirectories, AllowedDirectory};
use std::path::Path;

#[test]
fn test_relative_path_rejected() {
    assert!(AllowedDirectory::new("relative/dir").is_err());
}

#[test]
fn test_unnormalised_path_rejected() {
    assert!(AllowedDirectory::new("/srv/data/../etc").is_err());
    assert!(AllowedDirectory::new("/srv/./data").is_err());
    assert!(AllowedDirectory::new("/srv/data/.").is_err());
    assert!(AllowedDirectory::new("/srv/.hidden/data").is_ok());
}

#[test]
fn test_contains_is_component_wise() {
    let dir = AllowedDirectory::new("/srv/a").expect("absolute path");

    assert!(dir.contains(Path::new("/srv/a")));
    assert!(dir.contains(Path::new("/srv/a/b/c.txt")));
    assert!(!dir.contains(Path::new("/srv/ab")));
    assert!(!dir.contains(Path::new("/srv")));
}

#[test]
fn test_from_entries_drops_duplicates_keeping_order() {
    let a = AllowedDirectory::new("/srv/a").unwrap();
    let b = AllowedDirectory::new("/srv/b").unwrap();

    let dirs = AllowedDirectories::from_entries(vec![a.clone(), b.clone(), a.clone()]);

    assert_eq!(dirs.len(), 2);
    let collected: Vec<_> = dirs.iter().cloned().collect();
    assert_eq!(collected, vec![a, b]);
}

#[test]
fn test_permits_checks_every_entry() {
    let dirs = AllowedDirectories::from_entries(vec![
        AllowedDirectory::new("/srv/a").unwrap(),
        AllowedDirectory::new("/srv/b").unwrap(),
    ]);

    assert!(dirs.permits(Path::new("/srv/b/file")));
    assert!(!dirs.permits(Path::new("/srv/c/file")));
    assert!(!AllowedDirectories::empty().permits(Path::new("/srv/a")));
}

#[test]
fn test_display_is_comma_separated() {
    let dirs = AllowedDirectories::from_entries(vec![
        AllowedDirectory::new("/tmp/a").unwrap(),
        AllowedDirectory::new("/tmp/b").unwrap(),
    ]);

    assert_eq!(dirs.to_string(), "/tmp/a, /tmp/b");
}

#[test]
fn test_split_env_value_skips_empty_segments() {
    let raw = AllowedDirectories::split_env_value("/tmp/a::/tmp/b: ");
    assert_eq!(raw, vec!["/tmp/a".to_string(), "/tmp/b".to_string()]);

    assert!(AllowedDirectories::split_env_value("").is_empty());
}
