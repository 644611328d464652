use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

fn scratch_path(name: &str) -> PathBuf {
    static SEQ: AtomicUsize = AtomicUsize::new(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir()
        .join(format!("pinboard-storage-{}-{seq}", std::process::id()))
        .join(name)
}

#[test]
fn memory_storage_round_trip_and_clear() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.load().unwrap(), None);
    storage.store("tok").unwrap();
    assert_eq!(storage.load().unwrap().as_deref(), Some("tok"));
    storage.clear().unwrap();
    storage.clear().unwrap();
    assert_eq!(storage.load().unwrap(), None);
}

#[test]
fn memory_storage_with_token_preloads() {
    let storage = MemoryStorage::with_token("seed");
    assert_eq!(storage.load().unwrap().as_deref(), Some("seed"));
}

#[test]
fn file_storage_missing_file_is_none() {
    let storage = FileStorage::new(scratch_path("token"));
    assert_eq!(storage.load().unwrap(), None);
}

#[test]
fn file_storage_creates_parent_and_trims() {
    let path = scratch_path("nested/token");
    let storage = FileStorage::new(&path);
    storage.store("abc.def.ghi").unwrap();
    assert!(path.exists());
    std::fs::write(&path, "abc.def.ghi\n").unwrap();
    assert_eq!(storage.load().unwrap().as_deref(), Some("abc.def.ghi"));
    storage.clear().unwrap();
    assert!(!path.exists());
    storage.clear().unwrap();
}

#[test]
fn file_storage_blank_file_is_none() {
    let path = scratch_path("token");
    let storage = FileStorage::new(&path);
    storage.store("   ").unwrap();
    assert_eq!(storage.load().unwrap(), None);
    storage.clear().unwrap();
}

#[cfg(unix)]
#[test]
fn file_storage_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;
    let path = scratch_path("token");
    let storage = FileStorage::new(&path);
    storage.store("secret").unwrap();
    let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
    storage.clear().unwrap();
}
