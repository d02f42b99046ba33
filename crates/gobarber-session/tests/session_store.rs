use async_trait::async_trait;
use gobarber_session::{
    AuthBackend, AuthState, BackendError, Credentials, SessionError, SessionStore, SignInResponse,
    UserProfile, TOKEN_KEY, USER_KEY,
};
use gobarber_storage::{Database, KeyValueStore, MemoryStore};
use parking_lot::Mutex;
use std::sync::Arc;

/// Accepts exactly one email/password pair.
struct StubBackend {
    email: String,
    password: String,
    token: String,
    user: UserProfile,
    calls: Mutex<usize>,
}

impl StubBackend {
    fn new() -> Self {
        Self {
            email: "jane@example.com".to_string(),
            password: "123456".to_string(),
            token: "jwt-token".to_string(),
            user: UserProfile::new("u1", "Jane Doe", "jane@example.com")
                .with_avatar_url("http://localhost:3333/files/jane.png"),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl AuthBackend for StubBackend {
    async fn create_session(
        &self,
        credentials: &Credentials,
    ) -> Result<SignInResponse, BackendError> {
        *self.calls.lock() += 1;
        if credentials.email == self.email && credentials.password == self.password {
            Ok(SignInResponse {
                token: self.token.clone(),
                user: self.user.clone(),
            })
        } else {
            Err(BackendError::Rejected {
                status: 401,
                message: "Incorrect email/password combination.".to_string(),
            })
        }
    }
}

struct OfflineBackend;

#[async_trait]
impl AuthBackend for OfflineBackend {
    async fn create_session(&self, _: &Credentials) -> Result<SignInResponse, BackendError> {
        Err(BackendError::Transport("connection refused".to_string()))
    }
}

fn good_credentials() -> Credentials {
    Credentials::new("jane@example.com", "123456")
}

fn store_over(storage: Arc<dyn KeyValueStore>) -> (SessionStore, Arc<StubBackend>) {
    let backend = Arc::new(StubBackend::new());
    let store = SessionStore::new(storage, backend.clone());
    (store, backend)
}

#[tokio::test]
async fn test_sign_in_then_restart_restores_same_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gobarber.db");

    {
        let (store, backend) = store_over(Arc::new(Database::open(&path).unwrap()));
        store.sign_in(&good_credentials()).await.unwrap();
        assert_eq!(backend.calls(), 1);
    }

    // New process: fresh database handle, fresh store
    let (restored, backend) = store_over(Arc::new(Database::open(&path).unwrap()));
    assert_eq!(backend.calls(), 0);
    assert_eq!(restored.token().as_deref(), Some("jwt-token"));
    assert_eq!(restored.current_user(), Some(StubBackend::new().user));
}

#[tokio::test]
async fn test_sign_in_writes_both_keys() {
    let storage = MemoryStore::new();
    let (store, _) = store_over(Arc::new(storage.clone()));

    store.sign_in(&good_credentials()).await.unwrap();

    assert_eq!(
        storage.get_item(TOKEN_KEY).unwrap().as_deref(),
        Some("jwt-token")
    );
    let raw_user = storage.get_item(USER_KEY).unwrap().unwrap();
    let user: UserProfile = serde_json::from_str(&raw_user).unwrap();
    assert_eq!(user.id, "u1");
}

#[tokio::test]
async fn test_sign_out_twice_matches_once() {
    let storage = MemoryStore::new();
    let (store, _) = store_over(Arc::new(storage.clone()));
    store.sign_in(&good_credentials()).await.unwrap();

    store.sign_out();
    let once = store.state();
    let stored_once = storage.len();

    store.sign_out();
    assert_eq!(store.state(), once);
    assert_eq!(store.state(), AuthState::Unauthenticated);
    assert_eq!(storage.len(), stored_once);
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_update_user_keeps_token() {
    let storage = MemoryStore::new();
    let (store, _) = store_over(Arc::new(storage.clone()));
    store.sign_in(&good_credentials()).await.unwrap();

    let renamed = UserProfile::new("u1", "Jane Smith", "jane.smith@example.com");
    store.update_user(renamed.clone()).unwrap();

    assert_eq!(store.token().as_deref(), Some("jwt-token"));
    assert_eq!(store.current_user(), Some(renamed.clone()));
    assert_eq!(
        storage.get_item(TOKEN_KEY).unwrap().as_deref(),
        Some("jwt-token")
    );
    let persisted: UserProfile =
        serde_json::from_str(&storage.get_item(USER_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(persisted, renamed);
}

#[tokio::test]
async fn test_update_user_while_signed_out_is_rejected() {
    let storage = MemoryStore::new();
    let (store, _) = store_over(Arc::new(storage.clone()));

    let err = store
        .update_user(UserProfile::new("u1", "Jane", "jane@example.com"))
        .unwrap_err();

    assert!(matches!(err, SessionError::InvalidState(_)));
    assert_eq!(store.state(), AuthState::Unauthenticated);
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_token_and_user_move_together() {
    let (store, _) = store_over(Arc::new(MemoryStore::new()));
    let paired = |s: &SessionStore| s.token().is_some() == s.current_user().is_some();

    assert!(paired(&store));
    store.sign_in(&good_credentials()).await.unwrap();
    assert!(paired(&store));
    store
        .update_user(UserProfile::new("u1", "J", "j@example.com"))
        .unwrap();
    assert!(paired(&store));
    let _ = store.sign_in(&Credentials::new("x@y.com", "nope")).await;
    assert!(paired(&store));
    store.sign_out();
    assert!(paired(&store));
    let _ = store.update_user(UserProfile::new("u1", "J", "j@example.com"));
    assert!(paired(&store));
}

#[tokio::test]
async fn test_corrupt_storage_restores_signed_out() {
    let storage = MemoryStore::new();
    storage.set_item(TOKEN_KEY, "abc").unwrap();
    storage.set_item(USER_KEY, "{not valid json").unwrap();

    let (store, _) = store_over(Arc::new(storage));

    assert_eq!(store.state(), AuthState::Unauthenticated);
    assert!(store.current_user().is_none());
}

#[tokio::test]
async fn test_rejected_sign_in_leaves_no_state() {
    let storage = MemoryStore::new();
    let (store, backend) = store_over(Arc::new(storage.clone()));

    let err = store
        .sign_in(&Credentials::new("a@b.com", "wrong"))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::AuthenticationFailed(_)));
    assert_eq!(backend.calls(), 1);
    assert!(store.current_user().is_none());
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_rejected_sign_in_keeps_previous_session() {
    let (store, _) = store_over(Arc::new(MemoryStore::new()));
    store.sign_in(&good_credentials()).await.unwrap();
    let before = store.state();

    assert!(store
        .sign_in(&Credentials::new("jane@example.com", "wrong"))
        .await
        .is_err());
    assert_eq!(store.state(), before);
}

#[tokio::test]
async fn test_transport_failure_is_network_error() {
    let storage = MemoryStore::new();
    let store = SessionStore::new(Arc::new(storage.clone()), Arc::new(OfflineBackend));

    let err = store.sign_in(&good_credentials()).await.unwrap_err();

    assert!(matches!(err, SessionError::Network(_)));
    assert!(!store.is_authenticated());
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_listeners_see_each_mutation() {
    let (store, _) = store_over(Arc::new(MemoryStore::new()));
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&seen);
    let id = store.on_change(move |state| sink.lock().push(state.to_string()));

    store.sign_in(&good_credentials()).await.unwrap();
    store
        .update_user(UserProfile::new("u1", "J", "j@example.com"))
        .unwrap();
    store.sign_out();
    // Already signed out: nothing changes, nothing is announced
    store.sign_out();
    // Failed sign-in does not notify either
    let _ = store.sign_in(&Credentials::new("a@b.com", "wrong")).await;

    assert_eq!(
        *seen.lock(),
        vec!["authenticated", "authenticated", "unauthenticated"]
    );

    assert!(store.unsubscribe(id));
    assert!(!store.unsubscribe(id));
    store.sign_in(&good_credentials()).await.unwrap();
    assert_eq!(seen.lock().len(), 3);
}

#[tokio::test]
async fn test_listener_may_read_store() {
    let (store, _) = store_over(Arc::new(MemoryStore::new()));
    let observed = Arc::new(Mutex::new(None));

    let reader = store.clone();
    let sink = Arc::clone(&observed);
    store.on_change(move |_| {
        *sink.lock() = reader.current_user().map(|u| u.name);
    });

    store.sign_in(&good_credentials()).await.unwrap();
    assert_eq!(observed.lock().as_deref(), Some("Jane Doe"));
}

#[tokio::test]
async fn test_clones_share_state() {
    let (store, _) = store_over(Arc::new(MemoryStore::new()));
    let other = store.clone();

    store.sign_in(&good_credentials()).await.unwrap();
    assert!(other.is_authenticated());

    other.sign_out();
    assert!(!store.is_authenticated());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mutations_keep_pairing() {
    let storage = MemoryStore::new();
    let (store, _) = store_over(Arc::new(storage.clone()));

    let mut handles = Vec::new();
    for i in 0..32 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            match i % 3 {
                0 => {
                    let _ = store.sign_in(&good_credentials()).await;
                }
                1 => store.sign_out(),
                _ => {
                    let _ = store.update_user(UserProfile::new("u1", "J", "j@example.com"));
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let state = store.state();
    assert_eq!(state.token().is_some(), state.user().is_some());

    // Whatever the final state, storage agrees with memory
    let restored = AuthState::restore(&storage);
    assert_eq!(restored.is_authenticated(), state.is_authenticated());
    assert_eq!(restored.token(), state.token());
}

/// Memory-backed storage whose writes to chosen keys can be made to fail.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    failing_sets: Mutex<Vec<&'static str>>,
    failing_removes: Mutex<Vec<&'static str>>,
}

impl FlakyStore {
    fn fail_set(&self, key: &'static str) {
        self.failing_sets.lock().push(key);
    }

    fn fail_remove(&self, key: &'static str) {
        self.failing_removes.lock().push(key);
    }

    fn refused(key: &str) -> gobarber_storage::StorageError {
        std::io::Error::other(format!("write refused for {key}")).into()
    }
}

impl KeyValueStore for FlakyStore {
    fn get_item(&self, key: &str) -> gobarber_storage::Result<Option<String>> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> gobarber_storage::Result<()> {
        if self.failing_sets.lock().iter().any(|k| *k == key) {
            return Err(Self::refused(key));
        }
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> gobarber_storage::Result<()> {
        if self.failing_removes.lock().iter().any(|k| *k == key) {
            return Err(Self::refused(key));
        }
        self.inner.remove_item(key)
    }
}

/// Issues `token-of-<name>` for any `<name>@example.com`.
struct DirectoryBackend;

#[async_trait]
impl AuthBackend for DirectoryBackend {
    async fn create_session(
        &self,
        credentials: &Credentials,
    ) -> Result<SignInResponse, BackendError> {
        let name = credentials
            .email
            .split('@')
            .next()
            .unwrap_or_default()
            .to_string();
        Ok(SignInResponse {
            token: format!("token-of-{name}"),
            user: UserProfile::new(&name, &name, &credentials.email),
        })
    }
}

fn login(name: &str) -> Credentials {
    Credentials::new(&format!("{name}@example.com"), "123456")
}

/// A restart may lose the session, but never restores one memory did not hold.
fn assert_restart_agrees(storage: &FlakyStore, memory: &AuthState) {
    let restored = AuthState::restore(storage);
    if restored.is_authenticated() {
        assert_eq!(&restored, memory);
    }
}

#[tokio::test]
async fn test_failed_token_write_never_mixes_sessions() {
    let storage = Arc::new(FlakyStore::default());
    let store = SessionStore::new(storage.clone(), Arc::new(DirectoryBackend));

    store.sign_in(&login("alice")).await.unwrap();
    storage.fail_set(TOKEN_KEY);
    store.sign_in(&login("bob")).await.unwrap();

    assert_eq!(store.token().as_deref(), Some("token-of-bob"));
    assert_eq!(store.current_user().map(|u| u.id), Some("bob".to_string()));

    let restored = AuthState::restore(storage.as_ref());
    assert!(!restored.is_authenticated());
    assert_restart_agrees(&storage, &store.state());
}

#[tokio::test]
async fn test_failed_user_write_never_mixes_sessions() {
    let storage = Arc::new(FlakyStore::default());
    let store = SessionStore::new(storage.clone(), Arc::new(DirectoryBackend));

    store.sign_in(&login("alice")).await.unwrap();
    storage.fail_set(USER_KEY);
    store.sign_in(&login("bob")).await.unwrap();

    assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);
    assert_restart_agrees(&storage, &store.state());
}

#[tokio::test]
async fn test_failed_update_drops_stale_profile() {
    let storage = Arc::new(FlakyStore::default());
    let store = SessionStore::new(storage.clone(), Arc::new(DirectoryBackend));

    store.sign_in(&login("alice")).await.unwrap();
    storage.fail_set(USER_KEY);
    store
        .update_user(UserProfile::new("alice", "Alice Liddell", "alice@example.com"))
        .unwrap();

    assert_eq!(
        store.current_user().map(|u| u.name),
        Some("Alice Liddell".to_string())
    );
    assert_eq!(store.token().as_deref(), Some("token-of-alice"));
    assert_restart_agrees(&storage, &store.state());
}

#[tokio::test]
async fn test_sign_out_with_stuck_token_still_logs_out_on_restart() {
    let storage = Arc::new(FlakyStore::default());
    let store = SessionStore::new(storage.clone(), Arc::new(DirectoryBackend));

    store.sign_in(&login("alice")).await.unwrap();
    storage.fail_remove(TOKEN_KEY);
    store.sign_out();

    assert!(!store.is_authenticated());
    assert!(storage.get_item(TOKEN_KEY).unwrap().is_some());
    assert!(!AuthState::restore(storage.as_ref()).is_authenticated());
}
