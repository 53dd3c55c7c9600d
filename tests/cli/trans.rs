use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::{CONTROLLER, CliTest};

fn chat_response(content: serde_json::Value) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-4o-mini",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content.to_string() },
                "finish_reason": "stop"
            }
        ]
    })
}

/// A project whose config points the AI client at `server`.
fn project(server: &MockServer) -> Result<CliTest> {
    let test = CliTest::with_file("app/Http/Controllers/PostController.php", CONTROLLER)?;
    test.write_file(
        ".langsweeprc.json",
        &json!({
            "toLanguages": ["es"],
            "ai": { "provider": "custom", "apiUrl": server.uri() },
            "translation": { "maxRetries": 1, "retryDelaySecs": 0 }
        })
        .to_string(),
    )?;
    Ok(test)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_find_and_translate() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(json!({
            "Save": "Guardar",
            "Shared Message": "Mensaje compartido"
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let test = project(&server)?;
    let output = test
        .find_command()
        .arg("--trans")
        .env("LANGSWEEP_AI_API_KEY", "sk-test")
        .output()?;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8(output.stdout)?,
        "✓ application: scanned 1 file, found 2 strings, 2 new in lang/en.json\n\
         ✓ application: translated 2 strings into es\n"
    );
    assert_eq!(
        test.read_file("lang/es.json")?,
        "{\n    \"Save\": \"Guardar\",\n    \"Shared Message\": \"Mensaje compartido\"\n}\n"
    );

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_api_key_flag_wins_over_environment() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-flag"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(json!({
            "Save": "Guardar"
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let test = project(&server)?;
    test.write_file("lang/en.json", "{\n    \"Save\": \"Save\"\n}\n")?;

    let output = test
        .trans_command()
        .args(["--api-key", "sk-flag"])
        .env("LANGSWEEP_AI_API_KEY", "sk-env")
        .output()?;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        test.read_file("lang/es.json")?,
        "{\n    \"Save\": \"Guardar\"\n}\n"
    );

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_trans_only_sends_missing_strings() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(json!({
            "Shared Message": "Mensaje compartido"
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let test = project(&server)?;
    test.write_file(
        "lang/en.json",
        "{\n    \"Save\": \"Save\",\n    \"Shared Message\": \"Shared Message\"\n}\n",
    )?;
    test.write_file("lang/es.json", "{\n    \"Save\": \"Guardar\"\n}\n")?;

    let output = test.trans_command().output()?;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        test.read_file("lang/es.json")?,
        "{\n    \"Save\": \"Guardar\",\n    \"Shared Message\": \"Mensaje compartido\"\n}\n"
    );

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_trans_up_to_date_makes_no_calls() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let test = project(&server)?;
    test.write_file("lang/en.json", "{\n    \"Save\": \"Save\"\n}\n")?;
    test.write_file("lang/es.json", "{\n    \"Save\": \"Guardar\"\n}\n")?;

    let output = test.trans_command().output()?;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8(output.stdout)?,
        "✓ application: es is up to date\n"
    );

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_trans_reports_gaps() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(json!({
            "Save": "Guardar"
        }))))
        .mount(&server)
        .await;

    let test = project(&server)?;
    test.write_file(
        "lang/en.json",
        "{\n    \"Save\": \"Save\",\n    \"Shared Message\": \"Shared Message\"\n}\n",
    )?;

    let output = test.trans_command().output()?;

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8(output.stdout)?,
        "✓ application: translated 1 string into es\n\
         warning: 1 string was left untranslated for es in application\n  \
         ✘ \"Shared Message\"\n"
    );
    assert_eq!(
        test.read_file("lang/es.json")?,
        "{\n    \"Save\": \"Guardar\"\n}\n"
    );

    Ok(())
}

#[test]
fn test_trans_without_target_languages() -> Result<()> {
    let test = CliTest::with_file(".langsweeprc.json", r#"{ "toLanguages": [] }"#)?;

    let output = test.trans_command().output()?;
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("No target languages configured"), "{stderr}");

    Ok(())
}
