use super::*;
use crate::guard::AuthGuard;
use crate::routes::Navigation;
use crate::storage::MemoryStorage;
use std::sync::atomic::{AtomicUsize, Ordering};

fn router() -> (Router, SessionStore, Arc<Navigation>) {
    let session = SessionStore::new(MemoryStorage::new());
    let nav = Arc::new(Navigation::default());
    let guard = Arc::new(AuthGuard::new(session.clone(), nav.clone()));
    (Router::new(session.clone(), nav.clone(), guard), session, nav)
}

struct CountingGuard {
    calls: AtomicUsize,
}

impl Guard for CountingGuard {
    fn can_enter(&self, _target: Route) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        true
    }
}

#[test]
fn public_routes_enter_without_session() {
    let (router, _session, nav) = router();

    assert_eq!(router.open("/login"), NavigationOutcome::Entered(Route::Login));
    assert_eq!(router.open("/"), NavigationOutcome::Entered(Route::Landing));
    assert_eq!(nav.current(), Route::Landing);
}

#[test]
fn protected_route_redirects_anonymous_user() {
    let (router, _session, nav) = router();

    assert_eq!(
        router.open("/u"),
        NavigationOutcome::Redirected { requested: Some(Route::Dashboard), to: Route::Login }
    );
    assert_eq!(nav.current(), Route::Login);
    assert!(!nav.history().contains(&Route::Dashboard));
}

#[test]
fn protected_route_enters_with_session() {
    let (router, session, nav) = router();
    session.save("abc123", Some("a@b.com")).unwrap();

    assert_eq!(router.open("/u/chat"), NavigationOutcome::Entered(Route::Dashboard));
    assert_eq!(nav.current(), Route::Dashboard);
}

#[test]
fn unknown_path_redirects_to_landing() {
    let (router, _session, nav) = router();
    nav.navigate(Route::Login);

    assert_eq!(router.open("/missing"), NavigationOutcome::Redirected { requested: None, to: Route::Landing });
    assert_eq!(nav.current(), Route::Landing);
}

#[test]
fn guard_only_consulted_for_protected_routes() {
    let session = SessionStore::new(MemoryStorage::new());
    let nav = Arc::new(Navigation::default());
    let guard = Arc::new(CountingGuard { calls: AtomicUsize::new(0) });
    let router = Router::new(session, nav, guard.clone());

    router.open("/");
    router.open("/login");
    assert_eq!(guard.calls.load(Ordering::SeqCst), 0);

    router.open("/u");
    assert_eq!(guard.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn logout_clears_session_and_returns_to_landing() {
    let (router, session, nav) = router();
    session.save("abc123", Some("a@b.com")).unwrap();
    router.open("/u");

    assert_eq!(router.logout().unwrap(), Route::Landing);
    assert!(!session.has_valid_token());
    assert!(session.identity().is_none());
    assert_eq!(nav.current(), Route::Landing);
}

#[test]
fn logout_when_anonymous_is_harmless() {
    let (router, session, nav) = router();
    assert_eq!(router.logout().unwrap(), Route::Landing);
    assert!(!session.has_valid_token());
    assert_eq!(nav.history(), vec![Route::Landing]);
}
