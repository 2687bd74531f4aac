//! Integration tests for the hosted model path.
//!
//! Runs the gateway against a wiremock server speaking the TGI protocol:
//! health check on load, `/generate` with the rendered prompt and fixed
//! sampling parameters, the prompt echo in the response, and prompt token
//! counts taken from the endpoint's `/tokenize` route.

use std::sync::Arc;

use copilot_core::{Error, GenerationParams, TaskKind, TaskRequest, TextGenerationBackend};
use copilot_inference::{
    normalize, HostedModelLoader, InferenceGateway, ModelRegistry, TgiBackend, TgiConfig,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn healthy(server: &MockServer, selector: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/health", selector)))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

fn gateway(server: &MockServer, token: Option<&str>) -> InferenceGateway {
    let loader = HostedModelLoader::new(server.uri(), token.map(String::from));
    InferenceGateway::new(ModelRegistry::new(), Arc::new(loader))
}

#[tokio::test]
async fn test_generate_sends_rendered_prompt_and_sampling_policy() {
    let server = MockServer::start().await;
    healthy(&server, "zephyr").await;

    Mock::given(method("POST"))
        .and(path("/zephyr/generate"))
        .and(header("Authorization", "Bearer hf_test"))
        .and(body_partial_json(json!({
            "parameters": {
                "temperature": 0.5,
                "top_p": 0.9,
                "do_sample": false,
                "return_full_text": true
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"generated_text": "<|user|>\nidea</s>\n<|assistant|>\nHere you go\n## Workflow\n1. Trigger"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server, Some("hf_test"));
    let raw = gateway
        .generate(TaskKind::Workflow, "Automate vet reminders", "zephyr")
        .await
        .expect("generation should succeed");

    assert_eq!(normalize(&raw), "## Workflow\n1. Trigger");

    let requests = server.received_requests().await.unwrap();
    let generate = requests
        .iter()
        .find(|r| r.url.path() == "/zephyr/generate")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&generate.body).unwrap();
    let inputs = body["inputs"].as_str().unwrap();
    assert!(inputs.starts_with("<|system|>\n"));
    assert!(inputs.ends_with("<|user|>\nAutomate vet reminders</s>\n<|assistant|>\n"));
    let budget = body["parameters"]["max_new_tokens"].as_u64().unwrap();
    assert!((1..=1024).contains(&budget));
}

#[tokio::test]
async fn test_mistral_uses_its_own_endpoint_and_template() {
    let server = MockServer::start().await;
    healthy(&server, "mistral").await;

    Mock::given(method("POST"))
        .and(path("/mistral/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "generated_text": "<s>[INST] sys\n\nidea [/INST] ## Plan\nShip it."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = TaskRequest::new(TaskKind::BusinessCase, "Shoe resale", Some("mistral"));
    let result = gateway(&server, None).run(&request).await.unwrap();

    assert_eq!(result.normalized, "## Plan\nShip it.");
}

#[tokio::test]
async fn test_unhealthy_endpoint_fails_load_and_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zephyr/health"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    healthy(&server, "zephyr").await;

    Mock::given(method("POST"))
        .and(path("/zephyr/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"generated_text": "ok"})))
        .mount(&server)
        .await;

    let gateway = gateway(&server, None);

    let err = gateway
        .generate(TaskKind::PitchDeck, "idea", "zephyr")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Inference(_)));
    assert!(!gateway.cache().is_loaded("HuggingFaceH4/zephyr-7b-beta"));

    let raw = gateway
        .generate(TaskKind::PitchDeck, "idea", "zephyr")
        .await
        .unwrap();
    assert_eq!(raw, "ok");
    assert!(gateway.cache().is_loaded("HuggingFaceH4/zephyr-7b-beta"));
}

#[tokio::test]
async fn test_error_status_surfaces_as_inference_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"error": "Input validation error", "error_type": "validation"})),
        )
        .mount(&server)
        .await;

    let backend = TgiBackend::new(TgiConfig {
        endpoint: server.uri(),
        model_id: "org/model".into(),
        ..TgiConfig::default()
    })
    .unwrap();

    let err = backend
        .generate_text("prompt", &GenerationParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Inference(_)));
    let message = err.to_string();
    assert!(message.contains("422"));
    assert!(message.contains("Input validation error"));
}

#[tokio::test]
async fn test_health_check_reports_unreachable_as_false() {
    let server = MockServer::start().await;
    let backend = TgiBackend::new(TgiConfig {
        endpoint: format!("{}/missing", server.uri()),
        ..TgiConfig::default()
    })
    .unwrap();

    assert!(!backend.health_check().await.unwrap());
}

#[tokio::test]
async fn test_budget_counts_prompt_with_endpoint_tokenizer() {
    let server = MockServer::start().await;
    healthy(&server, "mistral").await;

    // One entry per token, as the server reports them
    let tokens: Vec<serde_json::Value> = (0..3500)
        .map(|i| json!({"id": 16 + i % 10, "text": "1", "start": i, "stop": i + 1}))
        .collect();
    Mock::given(method("POST"))
        .and(path("/mistral/tokenize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/mistral/generate"))
        .and(body_partial_json(json!({"parameters": {"max_new_tokens": 596}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"generated_text": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let raw = gateway(&server, None)
        .generate(TaskKind::BusinessCase, &"1234567890".repeat(300), "mistral")
        .await
        .unwrap();
    assert_eq!(raw, "ok");
}

#[tokio::test]
async fn test_tokenize_sends_rendered_prompt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tokenize"))
        .and(header("Authorization", "Bearer hf_test"))
        .and(body_partial_json(json!({"inputs": "<|user|>\n12345</s>\n<|assistant|>\n"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "text": "<s>", "start": 0, "stop": 0},
            {"id": 28740, "text": "1", "start": 9, "stop": 10}
        ])))
        .mount(&server)
        .await;

    let backend = TgiBackend::new(TgiConfig {
        endpoint: server.uri(),
        api_token: Some("hf_test".into()),
        ..TgiConfig::default()
    })
    .unwrap();

    let count = backend
        .count_tokens("<|user|>\n12345</s>\n<|assistant|>\n")
        .await
        .unwrap();
    assert_eq!(count, Some(2));
}

#[tokio::test]
async fn test_missing_tokenize_route_falls_back_to_local_count() {
    let server = MockServer::start().await;
    healthy(&server, "zephyr").await;

    Mock::given(method("POST"))
        .and(path("/zephyr/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"generated_text": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let backend = TgiBackend::new(TgiConfig {
        endpoint: format!("{}/zephyr", server.uri()),
        ..TgiConfig::default()
    })
    .unwrap();
    assert_eq!(backend.count_tokens("prompt").await.unwrap(), None);

    let raw = gateway(&server, None)
        .generate(TaskKind::Workflow, "idea", "zephyr")
        .await
        .unwrap();
    assert_eq!(raw, "ok");
}

#[tokio::test]
async fn test_tokenize_server_error_is_inference_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tokenize"))
        .respond_with(ResponseTemplate::new(500).set_body_string("tokenizer crashed"))
        .mount(&server)
        .await;

    let backend = TgiBackend::new(TgiConfig {
        endpoint: server.uri(),
        ..TgiConfig::default()
    })
    .unwrap();

    let err = backend.count_tokens("prompt").await.unwrap_err();
    assert!(matches!(err, Error::Inference(_)));
    assert!(err.to_string().contains("500"));
}
