use super::{
    local::LocalStore,
    remote::RemoteStore,
    Identity,
    ReviewStore,
};
use crate::{
    core::{
        FukushuError,
        Lesson,
        Settings,
    },
    srs::item::ReviewItem,
};

/// One logical persistence interface over two physical backends.
///
/// Item and lesson operations dispatch once per call: identified callers go
/// to the sync server (when one is configured), everyone else to the local
/// store. Settings are special-cased because they keep a local mirror warm
/// regardless of where the authoritative copy lives.
pub struct StorageGateway {
    local: LocalStore,
    remote_base_url: Option<String>,
}

impl StorageGateway {
    pub fn new(local: LocalStore, remote_base_url: Option<String>) -> Self {
        let remote_base_url = remote_base_url.filter(|url| !url.is_empty());
        StorageGateway { local, remote_base_url }
    }

    pub fn local_only(local: LocalStore) -> Self {
        StorageGateway::new(local, None)
    }

    fn remote_for(&self, identity: &Identity) -> Option<RemoteStore> {
        match (&self.remote_base_url, identity.account_id()) {
            (Some(base_url), Some(account)) => Some(RemoteStore::new(base_url, account)),
            _ => None,
        }
    }

    /// The backend for this call.
    fn store_for(&self, identity: &Identity) -> Box<dyn ReviewStore> {
        match self.remote_for(identity) {
            Some(remote) => Box::new(remote),
            None => Box::new(self.local.clone()),
        }
    }

    /// Local-first settings read. Identified callers also try the remote
    /// copy; on success it is merged over the local value and the local
    /// mirror rewritten. A remote failure is logged and swallowed, so this
    /// never fails and never blocks on freshness.
    pub async fn load_settings(&self, identity: &Identity) -> Settings {
        let mut settings = self.local.load_settings_or_default();

        if let Some(remote) = self.remote_for(identity) {
            match remote.load_settings().await {
                Ok(Some(cloud)) => {
                    settings.merge(cloud);
                    if let Err(e) = self.local.write_settings(&settings) {
                        eprintln!("Failed to rewrite local settings mirror: {}", e);
                    }
                }
                Ok(None) => {}
                Err(e) => eprintln!("Settings sync fetch failed: {}", e),
            }
        }

        settings
    }

    /// Writes the local mirror unconditionally; the remote write is
    /// best-effort and a failure there is logged, not surfaced.
    pub async fn save_settings(
        &self,
        identity: &Identity,
        settings: &Settings,
    ) -> Result<(), FukushuError> {
        self.local.write_settings(settings)?;

        if let Some(remote) = self.remote_for(identity) {
            if let Err(e) = remote.save_settings(settings).await {
                eprintln!("Settings cloud save failed: {}", e);
            }
        }

        Ok(())
    }

    /// Idempotent per lesson id in both modes. Unlike the settings sync
    /// paths, a remote batch failure here is a hard error: a partial archive
    /// would orphan review items, so the caller must see it.
    pub async fn archive_lesson(
        &self,
        identity: &Identity,
        lesson: &Lesson,
        now: i64,
    ) -> Result<bool, FukushuError> {
        self.store_for(identity).archive_lesson(lesson, now).await
    }

    pub async fn due_items(
        &self,
        identity: &Identity,
        now: i64,
    ) -> Result<Vec<ReviewItem>, FukushuError> {
        self.store_for(identity).due_items(now).await
    }

    pub async fn update_item(
        &self,
        identity: &Identity,
        item: &ReviewItem,
    ) -> Result<(), FukushuError> {
        self.store_for(identity).update_item(item).await
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::BTreeMap,
        io::{
            Read,
            Write,
        },
        net::{
            TcpListener,
            TcpStream,
        },
        sync::{
            Arc,
            Mutex,
        },
        thread,
    };

    use serde_json::{
        json,
        Value,
    };
    use tempfile::TempDir;

    use super::*;
    use crate::{
        core::{
            models::{
                FuriganaSegment,
                JlptLevel,
                VocabFragment,
            },
            settings::TtsProvider,
        },
        srs::engine::{
            grade,
            ReviewQuality,
            DAY_MS,
        },
        storage::remote::{
            ITEMS_COLLECTION,
            LESSONS_COLLECTION,
            SETTINGS_COLLECTION,
            SETTINGS_DOC_ID,
        },
    };

    // Nothing listens here, so every remote call fails fast with a
    // connection error. That is exactly the degraded path under test.
    const DEAD_SERVER: &str = "http://127.0.0.1:9";

    fn lesson(id: &str, vocab_count: usize) -> Lesson {
        Lesson {
            id: id.to_string(),
            topic: "counting".to_string(),
            level: JlptLevel::N5,
            title: Vec::new(),
            vocabulary: (0..vocab_count)
                .map(|i| VocabFragment {
                    word: vec![FuriganaSegment { text: format!("w{}", i), furigana: None }],
                    reading: format!("w{}", i),
                    meaning: "m".to_string(),
                    grammar_tag: String::new(),
                    example: None,
                })
                .collect(),
            grammar: Vec::new(),
            created_at: 0,
        }
    }

    #[tokio::test]
    async fn anonymous_callers_use_the_local_store() {
        let tmp = TempDir::new().unwrap();
        let gateway = StorageGateway::new(
            LocalStore::with_dir(tmp.path().to_path_buf()),
            Some(DEAD_SERVER.to_string()),
        );

        // Remote is configured but the caller is anonymous, so nothing ever
        // touches the network and the archive lands locally.
        assert!(gateway.archive_lesson(&Identity::Anonymous, &lesson("abc", 2), 50).await.unwrap());
        let due = gateway.due_items(&Identity::Anonymous, 50).await.unwrap();
        assert_eq!(due.len(), 2);
    }

    #[tokio::test]
    async fn load_settings_survives_remote_fetch_failure() {
        let tmp = TempDir::new().unwrap();
        let gateway = StorageGateway::new(
            LocalStore::with_dir(tmp.path().to_path_buf()),
            Some(DEAD_SERVER.to_string()),
        );
        let user = Identity::Account("user-1".to_string());

        let mut settings = Settings::default();
        settings.user_name = "Aki".to_string();
        gateway.save_settings(&user, &settings).await.unwrap();

        // The fetch against the dead server fails; the previously saved
        // local settings still come back, not an error.
        let loaded = gateway.load_settings(&user).await;
        assert_eq!(loaded.user_name, "Aki");
    }

    #[tokio::test]
    async fn load_settings_defaults_when_nothing_is_stored() {
        let tmp = TempDir::new().unwrap();
        let gateway = StorageGateway::local_only(LocalStore::with_dir(tmp.path().to_path_buf()));

        let loaded = gateway.load_settings(&Identity::Anonymous).await;
        assert_eq!(loaded, Settings::default());
    }

    #[tokio::test]
    async fn save_settings_does_not_surface_remote_failure() {
        let tmp = TempDir::new().unwrap();
        let gateway = StorageGateway::new(
            LocalStore::with_dir(tmp.path().to_path_buf()),
            Some(DEAD_SERVER.to_string()),
        );
        let user = Identity::Account("user-1".to_string());

        let result = gateway.save_settings(&user, &Settings::default()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn identified_archive_failure_is_hard() {
        let tmp = TempDir::new().unwrap();
        let gateway = StorageGateway::new(
            LocalStore::with_dir(tmp.path().to_path_buf()),
            Some(DEAD_SERVER.to_string()),
        );
        let user = Identity::Account("user-1".to_string());

        let result = gateway.archive_lesson(&user, &lesson("abc", 1), 50).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn identified_caller_without_sync_config_stays_local() {
        let tmp = TempDir::new().unwrap();
        let gateway = StorageGateway::local_only(LocalStore::with_dir(tmp.path().to_path_buf()));
        let user = Identity::Account("user-1".to_string());

        assert!(gateway.archive_lesson(&user, &lesson("abc", 1), 50).await.unwrap());
        assert_eq!(gateway.due_items(&user, 50).await.unwrap().len(), 1);
    }

    type DocumentMap = BTreeMap<(String, String), Value>;

    /// Minimal in-memory sync server speaking the action/params envelope,
    /// backed by one document map. Records the action of every request.
    struct MockSyncServer {
        base_url: String,
        actions: Arc<Mutex<Vec<String>>>,
        documents: Arc<Mutex<DocumentMap>>,
    }

    impl MockSyncServer {
        fn start() -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let base_url = format!("http://{}", listener.local_addr().unwrap());
            let actions: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
            let documents: Arc<Mutex<DocumentMap>> = Arc::new(Mutex::new(BTreeMap::new()));

            let thread_actions = Arc::clone(&actions);
            let thread_documents = Arc::clone(&documents);
            thread::spawn(move || {
                for stream in listener.incoming() {
                    let Ok(mut stream) = stream else { break };
                    let request: Value =
                        serde_json::from_str(&read_request_body(&mut stream)).unwrap();
                    let action = request["action"].as_str().unwrap_or_default().to_string();
                    thread_actions.lock().unwrap().push(action.clone());

                    let result =
                        handle_action(&action, &request["params"], &thread_documents);
                    let payload = json!({ "result": result, "error": null }).to_string();
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        payload.len(),
                        payload
                    );
                    let _ = stream.write_all(response.as_bytes());
                }
            });

            MockSyncServer { base_url, actions, documents }
        }

        fn actions(&self) -> Vec<String> {
            self.actions.lock().unwrap().clone()
        }

        fn put_document(&self, collection: &str, id: &str, data: Value) {
            self.documents
                .lock()
                .unwrap()
                .insert((collection.to_string(), id.to_string()), data);
        }

        fn document_count(&self, collection: &str) -> usize {
            self.documents.lock().unwrap().keys().filter(|(c, _)| c == collection).count()
        }
    }

    fn handle_action(action: &str, params: &Value, documents: &Arc<Mutex<DocumentMap>>) -> Value {
        let mut documents = documents.lock().unwrap();
        let key = |params: &Value| {
            (
                params["collection"].as_str().unwrap_or_default().to_string(),
                params["id"].as_str().unwrap_or_default().to_string(),
            )
        };

        match action {
            "getDocument" => documents.get(&key(params)).cloned().unwrap_or(Value::Null),
            "setDocument" => {
                let data = params["data"].clone();
                let slot = documents.entry(key(params)).or_insert(Value::Null);
                if params["merge"].as_bool().unwrap_or(false) && slot.is_object() {
                    let fields = slot.as_object_mut().unwrap();
                    for (name, value) in data.as_object().cloned().unwrap_or_default() {
                        fields.insert(name, value);
                    }
                } else {
                    *slot = data;
                }
                Value::Bool(true)
            }
            "queryDocuments" => {
                let collection = params["collection"].as_str().unwrap_or_default();
                let field = params["field"].as_str().unwrap_or_default();
                let max = params["max"].as_i64().unwrap_or(0);
                Value::Array(
                    documents
                        .iter()
                        .filter(|((c, _), doc)| {
                            c == collection && doc[field].as_i64().unwrap_or(0) <= max
                        })
                        .map(|(_, doc)| doc.clone())
                        .collect(),
                )
            }
            "commitBatch" => {
                for write in params["writes"].as_array().cloned().unwrap_or_default() {
                    documents.insert(
                        (
                            write["collection"].as_str().unwrap_or_default().to_string(),
                            write["id"].as_str().unwrap_or_default().to_string(),
                        ),
                        write["data"].clone(),
                    );
                }
                Value::Bool(true)
            }
            _ => Value::Null,
        }
    }

    fn read_request_body(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];

        let header_end = loop {
            let n = stream.read(&mut chunk).unwrap();
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|window| window == b"\r\n\r\n") {
                break pos + 4;
            }
            assert!(n > 0, "connection closed before request headers ended");
        };

        let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
        let content_length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = stream.read(&mut chunk).unwrap();
            assert!(n > 0, "connection closed before request body ended");
            buf.extend_from_slice(&chunk[..n]);
        }

        String::from_utf8_lossy(&buf[header_end..header_end + content_length]).to_string()
    }

    #[tokio::test]
    async fn identified_archive_skips_the_batch_for_an_existing_lesson() {
        let tmp = TempDir::new().unwrap();
        let server = MockSyncServer::start();
        let gateway = StorageGateway::new(
            LocalStore::with_dir(tmp.path().to_path_buf()),
            Some(server.base_url.clone()),
        );
        let user = Identity::Account("user-1".to_string());

        assert!(gateway.archive_lesson(&user, &lesson("abc", 2), 50).await.unwrap());
        assert!(!gateway.archive_lesson(&user, &lesson("abc", 2), 60).await.unwrap());

        // The second call stops at the lesson-id pre-check; no second batch.
        assert_eq!(server.actions(), vec!["getDocument", "commitBatch", "getDocument"]);
        assert_eq!(server.document_count(LESSONS_COLLECTION), 1);
        assert_eq!(server.document_count(ITEMS_COLLECTION), 2);
    }

    #[tokio::test]
    async fn remote_settings_merge_over_local_and_rewrite_the_mirror() {
        let tmp = TempDir::new().unwrap();
        let server = MockSyncServer::start();
        server.put_document(
            SETTINGS_COLLECTION,
            SETTINGS_DOC_ID,
            json!({ "user_name": "Cloud", "gemini_key": "k-1" }),
        );

        let local = LocalStore::with_dir(tmp.path().to_path_buf());
        let gateway = StorageGateway::new(local.clone(), Some(server.base_url.clone()));
        let user = Identity::Account("user-1".to_string());

        let loaded = gateway.load_settings(&user).await;
        assert_eq!(loaded.user_name, "Cloud");
        assert_eq!(loaded.gemini_key, "k-1");
        // Fields absent from the remote document keep their defaults.
        assert_eq!(loaded.tts_provider, TtsProvider::Browser);

        // The local mirror was rewritten with the merged value.
        let mirrored = local.load_settings_or_default();
        assert_eq!(mirrored.user_name, "Cloud");
        assert_eq!(mirrored.gemini_key, "k-1");
    }

    #[tokio::test]
    async fn identified_review_round_trip_through_the_sync_server() {
        let tmp = TempDir::new().unwrap();
        let server = MockSyncServer::start();
        let gateway = StorageGateway::new(
            LocalStore::with_dir(tmp.path().to_path_buf()),
            Some(server.base_url.clone()),
        );
        let user = Identity::Account("user-1".to_string());

        gateway.archive_lesson(&user, &lesson("abc", 1), 100).await.unwrap();

        let item = gateway.due_items(&user, 100).await.unwrap().remove(0);
        assert_eq!(item.id, "vocab-abc-0");

        let graded = grade(&item, ReviewQuality::Good, 100);
        gateway.update_item(&user, &graded).await.unwrap();

        assert!(gateway.due_items(&user, graded.due_at - 1).await.unwrap().is_empty());
        let due = gateway.due_items(&user, graded.due_at).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].level, 1);
        assert_eq!(due[0].due_at, 100 + DAY_MS);
    }
}
