//! Integration test: feedback generation and detached dispatch with a fake model.

use async_trait::async_trait;
use contact_journal_core::feedback::{CompletionRequest, DEFAULT_FEEDBACK};
use contact_journal_core::{
    ConfigService, FeedbackDispatcher, FeedbackError, FeedbackGenerator, FeedbackJob,
    FeedbackModel, InsightType, InteractionRecord, JournalRecord, JournalStore, StorageScope,
};
use serde_json::json;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Returns a canned reply and records every request it receives.
struct FakeModel {
    reply: Result<String, ()>,
    seen: Mutex<Vec<CompletionRequest>>,
}

impl FakeModel {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err(()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedbackModel for FakeModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, FeedbackError> {
        self.seen.lock().unwrap().push(request.clone());
        self.reply.clone().map_err(|_| FeedbackError::Api {
            status: 502,
            body: "upstream down".to_string(),
        })
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    store: Arc<JournalStore>,
    configs: Arc<ConfigService>,
    prompts: std::path::PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let configs_dir = dir.path().join("configs");
    let prompts = dir.path().join("prompts");
    std::fs::create_dir_all(&configs_dir).unwrap();
    std::fs::create_dir_all(&prompts).unwrap();

    write_tenant(&configs_dir, "social", json!({ "promptTemplate": "general" }));
    write_tenant(&configs_dir, "recovery", json!({ "promptTemplate": "recovery" }));
    write_tenant(&configs_dir, "quiet", json!({ "enabled": false }));

    std::fs::write(
        prompts.join("recovery.md"),
        "```yaml\nmodel: test/recovery-model\ntemperature: 0.2\nmax_tokens: 90\n```\n\n## System Prompt\n\nSupport recovery gently.\n",
    )
    .unwrap();

    let data = dir.path().join("data");
    Fixture {
        store: Arc::new(JournalStore::new(&data)),
        configs: Arc::new(ConfigService::new(&configs_dir, &data, "social", Duration::from_secs(300))),
        prompts,
        _dir: dir,
    }
}

fn write_tenant(dir: &Path, id: &str, ai: serde_json::Value) {
    let doc = json!({
        "appId": id,
        "appName": id,
        "interactions": [{ "id": "met", "label": "Met New Person", "icon": "👋" }],
        "comfortLevels": [{ "id": "neutral", "label": "Neutral", "color": "gray" }],
        "theme": { "primary": "#111", "secondary": "#222" },
        "ai": ai
    });
    std::fs::write(dir.join(format!("{id}.json")), doc.to_string()).unwrap();
}

impl Fixture {
    fn generator(&self, model: Option<Arc<dyn FeedbackModel>>) -> FeedbackGenerator {
        FeedbackGenerator::new(
            Arc::clone(&self.store),
            Arc::clone(&self.configs),
            model,
            &self.prompts,
            20,
        )
    }

    async fn log(&self, scope: &StorageScope, kind: &str) -> FeedbackJob {
        let interaction = InteractionRecord::new(kind, "Neutral", None);
        self.store
            .append(scope, "u1", &JournalRecord::Interaction(interaction.clone()))
            .await
            .unwrap();
        FeedbackJob {
            user_key: "u1".to_string(),
            user_name: "Alex".to_string(),
            scope: scope.clone(),
            interaction,
        }
    }
}

#[tokio::test]
async fn feedback_is_appended_for_the_interaction() {
    let fx = fixture();
    let scope = StorageScope::Tenant("recovery".to_string());
    let model = FakeModel::replying(r#"{"feedback":"One day at a time.","insightType":"milestone"}"#);
    let generator = fx.generator(Some(model.clone()));

    fx.log(&scope, "Met New Person").await;
    let job = fx.log(&scope, "Did a Favor").await;
    let record = generator.generate(&job).await.unwrap().unwrap();

    assert_eq!(record.related_to, vec![job.interaction.id.clone()]);
    assert_eq!(record.insight_type, InsightType::Milestone);

    let records = fx.store.read_all(&scope, "u1").await.unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2], JournalRecord::Feedback(record));

    let requests = model.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, "test/recovery-model");
    assert_eq!(requests[0].max_tokens, 90);
    assert_eq!(requests[0].system, "Support recovery gently.");
    assert!(requests[0].user.contains("User: Alex"));
    assert!(requests[0].user.contains("Recent interactions (last 2):"));
}

#[tokio::test]
async fn history_is_capped_to_the_limit() {
    let fx = fixture();
    let scope = StorageScope::Global;
    let model = FakeModel::replying(r#"{"feedback":"ok"}"#);
    let generator = FeedbackGenerator::new(
        Arc::clone(&fx.store),
        Arc::clone(&fx.configs),
        Some(model.clone() as Arc<dyn FeedbackModel>),
        &fx.prompts,
        3,
    );

    let mut last = None;
    for i in 0..6 {
        last = Some(fx.log(&scope, &format!("kind-{i}")).await);
    }
    generator.generate(&last.unwrap()).await.unwrap();

    let user = &model.requests()[0].user;
    assert!(user.contains("Recent interactions (last 3):"));
    assert!(!user.contains("kind-2 (Neutral)"));
    assert!(user.contains("kind-3 (Neutral)"));
    // General template file is absent, so the built-in fallback is used.
    assert_eq!(model.requests()[0].model, "openai/gpt-4o");
}

#[tokio::test]
async fn missing_feedback_field_uses_default_message() {
    let fx = fixture();
    let scope = StorageScope::Global;
    let generator = fx.generator(Some(FakeModel::replying(r#"{"insightType":"observation"}"#)));

    let job = fx.log(&scope, "Met New Person").await;
    let record = generator.generate(&job).await.unwrap().unwrap();
    assert_eq!(record.feedback, DEFAULT_FEEDBACK);
    assert_eq!(record.insight_type, InsightType::Encouragement);
}

#[tokio::test]
async fn skipped_without_model_or_when_tenant_disables_ai() {
    let fx = fixture();

    let job = fx.log(&StorageScope::Global, "Met New Person").await;
    assert!(fx.generator(None).generate(&job).await.unwrap().is_none());

    let quiet = StorageScope::Tenant("quiet".to_string());
    let model = FakeModel::replying(r#"{"feedback":"hi"}"#);
    let job = fx.log(&quiet, "Met New Person").await;
    assert!(fx.generator(Some(model.clone())).generate(&job).await.unwrap().is_none());
    assert!(model.requests().is_empty());
    assert_eq!(fx.store.read_all(&quiet, "u1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn model_failure_surfaces_as_error_and_writes_nothing() {
    let fx = fixture();
    let scope = StorageScope::Global;
    let job = fx.log(&scope, "Met New Person").await;

    let err = fx.generator(Some(FakeModel::failing())).generate(&job).await.unwrap_err();
    assert!(matches!(err, FeedbackError::Api { status: 502, .. }));

    let err = fx
        .generator(Some(FakeModel::replying("not json at all")))
        .generate(&job)
        .await
        .unwrap_err();
    assert!(matches!(err, FeedbackError::MalformedResponse(_)));

    assert_eq!(fx.store.read_all(&scope, "u1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn dispatcher_runs_jobs_detached() {
    let fx = fixture();
    let scope = StorageScope::Tenant("social".to_string());
    let generator = Arc::new(fx.generator(Some(FakeModel::replying(
        r#"{"feedback":"Keep it up","insightType":"encouragement"}"#,
    ))));
    let (dispatcher, _worker) = FeedbackDispatcher::start(generator, 8);

    let job = fx.log(&scope, "Met New Person").await;
    assert!(dispatcher.dispatch(job));

    let mut feedback = None;
    for _ in 0..100 {
        let records = fx.store.read_all(&scope, "u1").await.unwrap();
        if let Some(JournalRecord::Feedback(f)) = records.get(1) {
            feedback = Some(f.clone());
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(feedback.unwrap().feedback, "Keep it up");
}

#[tokio::test]
async fn failing_jobs_do_not_stop_the_worker() {
    let fx = fixture();
    let scope = StorageScope::Global;
    let generator = Arc::new(fx.generator(Some(FakeModel::failing())));
    let (dispatcher, worker) = FeedbackDispatcher::start(generator, 1);

    assert!(dispatcher.dispatch(fx.log(&scope, "a").await));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(dispatcher.dispatch(fx.log(&scope, "b").await));

    drop(dispatcher);
    tokio::time::timeout(Duration::from_secs(2), worker)
        .await
        .unwrap()
        .unwrap();
}
