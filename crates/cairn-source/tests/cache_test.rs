use std::time::Duration;

use cairn_source::{Cache, CacheError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Payload {
    name: String,
    deps: Vec<String>,
}

fn payload() -> Payload {
    Payload {
        name: "serde".to_string(),
        deps: vec!["serde_derive".to_string()],
    }
}

#[test]
fn set_then_get_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let cache = Cache::new(Some(dir.path().to_path_buf()), Duration::from_secs(60)).unwrap();

    cache.set("crates:serde", &payload()).unwrap();
    let got: Option<Payload> = cache.get("crates:serde").unwrap();
    assert_eq!(got, Some(payload()));
}

#[test]
fn missing_keys_are_a_plain_miss() {
    let dir = tempfile::tempdir().unwrap();
    let cache = Cache::new(Some(dir.path().to_path_buf()), Duration::from_secs(60)).unwrap();

    let got: Option<Payload> = cache.get("never-set").unwrap();
    assert_eq!(got, None);
}

#[test]
fn expiry_is_distinct_from_a_miss() {
    let dir = tempfile::tempdir().unwrap();
    let cache = Cache::new(Some(dir.path().to_path_buf()), Duration::from_nanos(1)).unwrap();

    cache.set("crates:serde", &payload()).unwrap();
    std::thread::sleep(Duration::from_millis(20));

    match cache.get::<Payload>("crates:serde") {
        Err(CacheError::Expired) => {}
        other => panic!("expected Expired, got {other:?}"),
    }
}

#[test]
fn zero_ttl_never_expires() {
    let dir = tempfile::tempdir().unwrap();
    let cache = Cache::new(Some(dir.path().to_path_buf()), Duration::ZERO).unwrap();

    cache.set("crates:serde", &payload()).unwrap();
    std::thread::sleep(Duration::from_millis(5));
    let got: Option<Payload> = cache.get("crates:serde").unwrap();
    assert_eq!(got, Some(payload()));
}

#[test]
fn keys_are_content_addressed() {
    let dir = tempfile::tempdir().unwrap();
    let cache = Cache::new(Some(dir.path().to_path_buf()), Duration::from_secs(60)).unwrap();

    cache.set("key/with/slashes and spaces", &payload()).unwrap();
    let got: Option<Payload> = cache.get("key/with/slashes and spaces").unwrap();
    assert_eq!(got, Some(payload()));

    // Only hashed filenames land on disk.
    for entry in std::fs::read_dir(dir.path()).unwrap() {
        let name = entry.unwrap().file_name();
        let name = name.to_string_lossy();
        assert_eq!(name.len(), 64, "unexpected cache file {name}");
        assert!(name.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

#[test]
fn corrupted_entries_surface_as_decode_errors() {
    let dir = tempfile::tempdir().unwrap();
    let cache = Cache::new(Some(dir.path().to_path_buf()), Duration::from_secs(60)).unwrap();

    cache.set("crates:serde", &payload()).unwrap();
    for entry in std::fs::read_dir(dir.path()).unwrap() {
        std::fs::write(entry.unwrap().path(), b"{broken").unwrap();
    }

    assert!(matches!(
        cache.get::<Payload>("crates:serde"),
        Err(CacheError::Decode(_))
    ));
}
