use std::sync::Arc;
use std::thread;

use gosub_cookie_store::config::CookieStoreConfig;
use gosub_cookie_store::cookies::{
    Cookie, CookiePolicy, CookieRequest, CookieStore, SqliteCookieStore, SuffixList,
};

const NOW: i64 = 1_700_000_000;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Returns everything it is asked about.
struct AcceptAll;

impl CookiePolicy for AcceptAll {
    fn domain_return_ok(&self, _domain: &str, _request: &CookieRequest) -> bool {
        true
    }

    fn path_return_ok(&self, _path: &str, _request: &CookieRequest) -> bool {
        true
    }

    fn return_ok(&self, _cookie: &Cookie, _request: &CookieRequest) -> bool {
        true
    }
}

fn permissive_store() -> SqliteCookieStore {
    SqliteCookieStore::with_collaborators(
        CookieStoreConfig::in_memory(),
        Arc::new(AcceptAll),
        Arc::new(SuffixList::default()),
    )
    .unwrap()
}

fn cookie(domain: &str, path: &str, name: &str) -> Cookie {
    let mut c = Cookie::new(name, Some("v"), domain);
    c.path = path.to_string();
    c
}

fn request(url: &str) -> CookieRequest {
    CookieRequest::parse(url).unwrap().at(NOW)
}

fn names(cookies: &[Cookie]) -> Vec<String> {
    cookies.iter().map(|c| c.name.clone()).collect()
}

/// Serialized form of a cookie without its store-assigned id.
fn without_id(cookie: &Cookie) -> serde_json::Value {
    let mut value = serde_json::to_value(cookie).unwrap();
    if let Some(map) = value.as_object_mut() {
        map.remove("id");
    }
    value
}

#[test]
fn every_field_survives_storage() {
    init_logging();
    let store = permissive_store();

    let mut full = Cookie::new("sid", Some("s3cr3t"), ".example.com");
    full.version = 1;
    full.port = Some("443".into());
    full.port_specified = true;
    full.domain_specified = true;
    full.domain_initial_dot = true;
    full.path = "/account".into();
    full.path_specified = true;
    full.secure = true;
    full.expires = Some(NOW + 3600);
    full.discard = false;
    full.comment = Some("login".into());
    full.comment_url = Some("https://example.com/about-cookies".into());
    full.rfc2109 = true;
    full.extensions.insert("HttpOnly".into(), None);
    full.extensions.insert("SameSite".into(), Some("Lax".into()));

    let absent = Cookie::new("flag", None, ".example.com");
    let empty = Cookie::new("blank", Some(""), ".example.com");

    let ids = store.insert_many(&[full.clone(), absent.clone(), empty.clone()]).unwrap();
    let found = store.cookies_for_domain(".example.com", &request("https://example.com/")).unwrap();

    assert_eq!(found.len(), 3);
    assert_eq!(found.iter().map(|c| c.id().unwrap()).collect::<Vec<_>>(), ids);
    assert_eq!(without_id(&found[0]), without_id(&full));
    assert_eq!(without_id(&found[1]), without_id(&absent));
    assert_eq!(without_id(&found[2]), without_id(&empty));
    assert_eq!(found[1].value, None);
    assert_eq!(found[2].value.as_deref(), Some(""));
    assert!(found[0].has_extension("HttpOnly"));
    assert_eq!(found[0].extension("SameSite"), Some(Some("Lax")));
}

#[test]
fn scoped_delete_is_idempotent() {
    init_logging();
    let store = SqliteCookieStore::in_memory().unwrap();
    store
        .insert_many(&[cookie("example.com", "/", "a"), cookie("example.com", "/", "b")])
        .unwrap();

    assert_eq!(store.clear(Some("example.com"), Some("/"), Some("a")).unwrap(), 1);
    let after_first: Vec<_> = store.scan().unwrap().map(|c| c.unwrap()).collect();
    assert_eq!(store.clear(Some("example.com"), Some("/"), Some("a")).unwrap(), 0);
    let after_second: Vec<_> = store.scan().unwrap().map(|c| c.unwrap()).collect();
    assert_eq!(after_first, after_second);

    assert_eq!(store.clear(Some("example.com"), None, None).unwrap(), 1);
    assert_eq!(store.clear(Some("example.com"), None, None).unwrap(), 0);
}

#[test]
fn clear_requires_enclosing_scope() {
    let store = SqliteCookieStore::in_memory().unwrap();
    store.set_cookie(&cookie("example.com", "/", "a")).unwrap();

    assert!(store.clear(None, Some("/"), None).unwrap_err().is_validation());
    assert!(store.clear(Some("example.com"), None, Some("a")).unwrap_err().is_validation());
    assert!(store.clear(None, None, Some("a")).unwrap_err().is_validation());
    assert_eq!(store.len().unwrap(), 1);

    assert_eq!(store.clear(None, None, None).unwrap(), 1);
    assert!(CookieStore::is_empty(&store).unwrap());
}

#[test]
fn expiry_sweep_is_monotonic() {
    init_logging();
    let store = SqliteCookieStore::in_memory().unwrap();
    let mut a = cookie("example.com", "/", "a");
    a.expires = Some(NOW - 50);
    let mut b = cookie("example.com", "/", "b");
    b.expires = Some(NOW);
    store.insert_many(&[a, b]).unwrap();

    assert_eq!(store.delete_expired_before(NOW - 50).unwrap(), 1);
    let left: Vec<_> = store.scan().unwrap().map(|c| c.unwrap().name).collect();
    assert_eq!(left, vec!["b"]);

    assert_eq!(store.delete_expired_before(NOW).unwrap(), 1);
    assert!(CookieStore::is_empty(&store).unwrap());
}

#[test]
fn wall_clock_sweep_keeps_future_cookies() {
    let store = SqliteCookieStore::in_memory().unwrap();
    let mut past = cookie("example.com", "/", "past");
    past.expires = Some(1);
    let mut future = cookie("example.com", "/", "future");
    future.expires = Some(i64::MAX);
    let forever = cookie("example.com", "/", "forever");
    store.insert_many(&[past, future, forever]).unwrap();

    assert_eq!(store.clear_expired_cookies().unwrap(), 1);
    assert_eq!(store.len().unwrap(), 2);
}

#[test]
fn session_cookies_are_discarded_alone() {
    let store = SqliteCookieStore::in_memory().unwrap();
    let session = cookie("example.com", "/", "session");
    let mut kept = cookie("example.com", "/", "kept");
    kept.discard = false;
    kept.expires = Some(NOW + 10);
    store.insert_many(&[session, kept]).unwrap();

    assert_eq!(store.delete_session_cookies().unwrap(), 1);
    let left: Vec<_> = store.scan().unwrap().map(|c| c.unwrap().name).collect();
    assert_eq!(left, vec!["kept"]);
}

#[test]
fn registry_scoped_cookies_never_leak() {
    init_logging();
    let store = permissive_store();
    store
        .insert_many(&[cookie("com", "/", "registry"), cookie(".com", "/", "dotted"), cookie("example.com", "/", "own")])
        .unwrap();

    for url in ["https://example.com/", "https://www.example.com/", "https://shop.other.com/", "https://com/"] {
        let found = store.cookies_for_request(&request(url)).unwrap();
        assert!(
            found.iter().all(|c| c.domain != "com" && c.domain != ".com"),
            "{url} got {:?}",
            names(&found)
        );
    }
}

#[test]
fn request_lookup_narrows_to_registrable_domain() {
    let store = SqliteCookieStore::in_memory().unwrap();
    store
        .insert_many(&[cookie("example.com", "/", "parent"), cookie("a.example.com", "/", "child")])
        .unwrap();

    let found = store.cookies_for_request(&request("https://a.example.com/")).unwrap();
    assert_eq!(names(&found), vec!["parent", "child"]);

    assert!(store.cookies_for_request(&request("https://other.com/")).unwrap().is_empty());
}

#[test]
fn domain_lookup_checks_path_containment() {
    let store = SqliteCookieStore::in_memory().unwrap();
    store
        .insert_many(&[cookie("example.com", "/", "a"), cookie("example.com", "/foo/bar", "c")])
        .unwrap();

    let deep = store.cookies_for_domain("example.com", &request("https://example.com/foo/bar")).unwrap();
    assert_eq!(names(&deep), vec!["a", "c"]);

    let root = store.cookies_for_domain("example.com", &request("https://example.com/")).unwrap();
    assert_eq!(names(&root), vec!["a"]);
}

#[test]
fn scan_yields_every_record_once() {
    init_logging();
    let config = CookieStoreConfig::builder().in_memory().page_size(64).build().unwrap();
    let store = SqliteCookieStore::open(config).unwrap();
    let batch: Vec<Cookie> = (0..300).map(|i| cookie(&format!("host{i}.example.com"), "/", &format!("c{i}"))).collect();
    let ids = store.insert_many(&batch).unwrap();

    let scanned: Vec<Cookie> = store.scan().unwrap().map(|c| c.unwrap()).collect();
    assert_eq!(scanned.len(), 300);
    assert_eq!(scanned.iter().map(|c| c.id().unwrap()).collect::<Vec<_>>(), ids);

    let boxed: Vec<_> = CookieStore::scan(&store).unwrap().collect::<Result<_, _>>().unwrap();
    assert_eq!(boxed, scanned);
}

#[test]
fn file_store_is_shared_between_threads() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteCookieStore::open(CookieStoreConfig::file(dir.path().join("cookies.db"))).unwrap());

    let workers: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..25 {
                    store.set_cookie(&cookie(&format!("t{t}.example.com"), "/", &format!("c{i}"))).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(store.len().unwrap(), 100);
    let found = store.cookies_for_request(&request("https://t2.example.com/")).unwrap();
    assert_eq!(found.len(), 25);
}

#[test]
fn store_works_through_a_trait_object() {
    let store: Box<dyn CookieStore> = Box::new(SqliteCookieStore::in_memory().unwrap());
    store.set_cookie(&cookie("example.com", "/", "a")).unwrap();
    assert_eq!(store.len().unwrap(), 1);
    assert_eq!(store.cookies_for_request(&request("http://example.com/")).unwrap().len(), 1);
    assert_eq!(store.delete_all().unwrap(), 1);
}
