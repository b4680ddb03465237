use prreviewer::models::PullRequestContext;
use prreviewer::{Config, Error, PipelineConfig, ReviewPipeline};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REVIEWS_PATH: &str = "/repos/octo/app/pulls/7/reviews";

fn pr() -> PullRequestContext {
    PullRequestContext {
        owner: "octo".into(),
        repo: "app".into(),
        number: 7,
        head_sha: "abc123".into(),
        title: "Add helpers".into(),
        body: Some("Small helpers".into()),
    }
}

fn config(github: &MockServer, azure: &MockServer) -> Config {
    let vars = [
        ("GITHUB_TOKEN", "ghs_test".to_string()),
        ("GITHUB_API_URL", github.uri()),
        ("AZURE_OPENAI_ENDPOINT", azure.uri()),
        ("AZURE_OPENAI_KEY", "key".to_string()),
        ("AZURE_OPENAI_DEPLOYMENT", "gpt-4o".to_string()),
    ];
    Config::from_lookup(|name| {
        vars.iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.clone())
    })
    .unwrap()
}

fn pr_file(name: &str) -> Value {
    json!({
        "filename": name,
        "status": "modified",
        "additions": 1,
        "deletions": 0,
        "patch": "@@ -1,2 +1,3 @@\n import os\n+value = compute()\n print(value)"
    })
}

fn completion(line: u32, body: &str) -> Value {
    let content = json!({
        "comments": [{"line": line, "severity": "warning", "category": "bug", "body": body}]
    });
    json!({"choices": [{"message": {"content": content.to_string()}}]})
}

async fn mount_files(github: &MockServer, names: &[&str]) {
    let files: Vec<Value> = names.iter().map(|n| pr_file(n)).collect();
    Mock::given(method("GET"))
        .and(path("/repos/octo/app/pulls/7/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(files))
        .mount(github)
        .await;
}

async fn mount_review_endpoint(github: &MockServer) {
    Mock::given(method("POST"))
        .and(path(REVIEWS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .mount(github)
        .await;
}

async fn posted_review(github: &MockServer) -> Option<Value> {
    let requests = github.received_requests().await.unwrap_or_default();
    requests
        .iter()
        .find(|r| r.method.as_str() == "POST" && r.url.path() == REVIEWS_PATH)
        .map(|r| serde_json::from_slice(&r.body).unwrap())
}

#[tokio::test]
async fn test_default_excludes_dispatch_only_source_file() {
    let github = MockServer::start().await;
    let azure = MockServer::start().await;
    mount_files(&github, &["a.py", "README.md"]).await;
    mount_review_endpoint(&github).await;

    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt-4o/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(2, "Handle a None result")))
        .expect(1)
        .mount(&azure)
        .await;

    let config = config(&github, &azure);
    let pipeline = ReviewPipeline::from_config(&config, PipelineConfig::from(&config)).unwrap();
    let report = pipeline.run(&pr()).await.unwrap();

    assert_eq!(report.files_changed, 2);
    assert_eq!(report.files_excluded, 1);
    assert_eq!(report.files_reviewed, 1);
    assert!(report.published);

    let review = posted_review(&github).await.expect("review was posted");
    assert_eq!(review["commit_id"], "abc123");
    assert_eq!(review["event"], "COMMENT");
    let comments = review["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["path"], "a.py");
    assert_eq!(comments[0]["line"], 2);
    assert!(comments[0]["body"].as_str().unwrap().contains("Handle a None result"));
}

#[tokio::test]
async fn test_backend_failure_drops_only_that_file() {
    let github = MockServer::start().await;
    let azure = MockServer::start().await;
    mount_files(&github, &["a.py", "b.py", "c.py"]).await;
    mount_review_endpoint(&github).await;

    Mock::given(method("POST"))
        .and(body_string_contains("## File: b.py"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .with_priority(1)
        .mount(&azure)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(2, "Check the return value")))
        .mount(&azure)
        .await;

    let config = config(&github, &azure);
    let pipeline = ReviewPipeline::from_config(&config, PipelineConfig::from(&config)).unwrap();
    let report = pipeline.run(&pr()).await.unwrap();

    assert_eq!(report.failed_files, vec!["b.py".to_string()]);
    assert_eq!(report.comments_published, 2);

    let review = posted_review(&github).await.expect("review was posted");
    let mut paths: Vec<&str> = review["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["path"].as_str().unwrap())
        .collect();
    paths.sort();
    assert_eq!(paths, vec!["a.py", "c.py"]);
    assert!(review["body"].as_str().unwrap().contains("`b.py`"));
}

#[tokio::test]
async fn test_nothing_posted_without_findings() {
    let github = MockServer::start().await;
    let azure = MockServer::start().await;
    mount_files(&github, &["a.py"]).await;
    Mock::given(method("POST"))
        .and(path(REVIEWS_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&github)
        .await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"choices": [{"message": {"content": "{\"comments\": []}"}}]})),
        )
        .mount(&azure)
        .await;

    let config = config(&github, &azure);
    let pipeline = ReviewPipeline::from_config(&config, PipelineConfig::from(&config)).unwrap();
    let report = pipeline.run(&pr()).await.unwrap();

    assert_eq!(report.comments_found, 0);
    assert!(!report.published);
}

#[tokio::test]
async fn test_dry_run_does_not_post() {
    let github = MockServer::start().await;
    let azure = MockServer::start().await;
    mount_files(&github, &["a.py"]).await;
    Mock::given(method("POST"))
        .and(path(REVIEWS_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&github)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(2, "Name this better")))
        .mount(&azure)
        .await;

    let config = config(&github, &azure);
    let pipeline_config = PipelineConfig {
        dry_run: true,
        ..PipelineConfig::from(&config)
    };
    let pipeline = ReviewPipeline::from_config(&config, pipeline_config).unwrap();
    let report = pipeline.run(&pr()).await.unwrap();

    assert_eq!(report.comments_published, 1);
    assert!(!report.published);
}

#[tokio::test]
async fn test_rejected_review_fails_the_run() {
    let github = MockServer::start().await;
    let azure = MockServer::start().await;
    mount_files(&github, &["a.py"]).await;
    Mock::given(method("POST"))
        .and(path(REVIEWS_PATH))
        .respond_with(ResponseTemplate::new(422).set_body_string("Unprocessable Entity"))
        .mount(&github)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(2, "Guard this")))
        .mount(&azure)
        .await;

    let config = config(&github, &azure);
    let pipeline = ReviewPipeline::from_config(&config, PipelineConfig::from(&config)).unwrap();
    let err = pipeline.run(&pr()).await.unwrap_err();

    assert!(matches!(err, Error::Publish(_)));
}

#[tokio::test]
async fn test_ollama_backend_reviews_and_posts() {
    let github = MockServer::start().await;
    let ollama = MockServer::start().await;
    mount_files(&github, &["a.py", "notes.txt"]).await;
    mount_review_endpoint(&github).await;

    let content = json!({
        "comments": [{"line": 3, "severity": "suggestion", "category": "style", "body": "Log instead of print"}]
    });
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"model": "llama3", "stream": false, "format": "json"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3",
            "message": {"role": "assistant", "content": content.to_string()},
            "done": true
        })))
        .expect(1)
        .mount(&ollama)
        .await;

    let vars = [
        ("GITHUB_TOKEN", "ghs_test".to_string()),
        ("GITHUB_API_URL", github.uri()),
        ("AI_BACKEND", "ollama".to_string()),
        ("OLLAMA_HOST", ollama.uri()),
        ("OLLAMA_MODEL", "llama3".to_string()),
    ];
    let config = Config::from_lookup(|name| {
        vars.iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.clone())
    })
    .unwrap();

    let pipeline = ReviewPipeline::from_config(&config, PipelineConfig::from(&config)).unwrap();
    let report = pipeline.run(&pr()).await.unwrap();

    assert_eq!(report.files_excluded, 1);
    assert!(report.published);

    let review = posted_review(&github).await.expect("review was posted");
    let comments = review["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["path"], "a.py");
    assert_eq!(comments[0]["line"], 3);
    assert!(comments[0]["body"].as_str().unwrap().contains("Log instead of print"));
}

#[tokio::test]
async fn test_missing_config_fails_before_network() {
    let github = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&github)
        .await;

    let uri = github.uri();
    let result = Config::from_lookup(|name| match name {
        "GITHUB_API_URL" => Some(uri.clone()),
        "AZURE_OPENAI_ENDPOINT" => Some("http://127.0.0.1:1".to_string()),
        _ => None,
    });

    match result {
        Err(Error::Config(message)) => {
            assert!(message.contains("GITHUB_TOKEN"));
            assert!(message.contains("AZURE_OPENAI_KEY"));
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("configuration without a token must be rejected"),
    }
}
