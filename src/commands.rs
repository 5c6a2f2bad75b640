//! Command implementations behind the `sheetbridge` binary.

use anyhow::{Context, Result, anyhow};
use log::info;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;

use crate::api::{ApiResult, QueryParams, SheetsApi};
use crate::http::{Scheduler, Transport};

/// Runs the connectivity probe. Returns whether it succeeded.
pub async fn ping<T: Transport, S: Scheduler, W: Write>(
    api: &SheetsApi<T, S>,
    out: &mut W,
) -> Result<bool> {
    let status = api.test_connection().await;
    info!("Connection probe: success={}", status.success);
    write_json(out, &status)?;
    Ok(status.success)
}

/// Runs an arbitrary action. `data` is a JSON document sent as payload;
/// `params` are `KEY=VALUE` query pairs.
pub async fn call<T: Transport, S: Scheduler, W: Write>(
    api: &SheetsApi<T, S>,
    action: &str,
    data: Option<&str>,
    params: &[String],
    out: &mut W,
) -> Result<()> {
    let payload = data
        .map(|d| serde_json::from_str::<Value>(d).context("Failed to parse --data as JSON"))
        .transpose()?;
    let query = parse_params(params)?;

    let result = api.request(action, payload, &query).await?;
    print_result(out, &result)
}

/// Parses `KEY=VALUE` strings into query parameters.
pub fn parse_params(params: &[String]) -> Result<QueryParams> {
    params
        .iter()
        .map(|param| {
            let (key, value) = param
                .split_once('=')
                .ok_or_else(|| anyhow!("Invalid parameter '{}': expected KEY=VALUE", param))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(anyhow!("Invalid parameter '{}': empty key", param));
            }
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}

pub fn print_result<W: Write>(out: &mut W, result: &ApiResult) -> Result<()> {
    write_json(out, result)
}

fn write_json<W: Write, V: Serialize>(out: &mut W, value: &V) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("Failed to write output")?;
    writeln!(out).context("Failed to write output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::error::ApiError;
    use mockito::Matcher;

    fn api(url: &str) -> SheetsApi {
        SheetsApi::new(ClientConfig::new(&format!("{}/exec", url), "clerk@example.com").unwrap())
            .unwrap()
    }

    #[test]
    fn test_parse_params() {
        let params = vec!["status=pending".to_string(), "note=a=b".to_string()];
        let query = parse_params(&params).unwrap();
        assert_eq!(query.get("status").map(String::as_str), Some("pending"));
        assert_eq!(query.get("note").map(String::as_str), Some("a=b"));
    }

    #[test]
    fn test_parse_params_invalid() {
        assert!(parse_params(&["nokey".to_string()]).is_err());
        assert!(parse_params(&["=value".to_string()]).is_err());
    }

    #[tokio::test]
    async fn test_call_posts_data() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/exec")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("action".into(), "addItem".into()),
                Matcher::UrlEncoded("warehouse".into(), "north".into()),
            ]))
            .match_body(Matcher::Json(serde_json::json!({"name": "Crate"})))
            .with_status(200)
            .with_body(r#"{"success": true, "itemId": "I-9"}"#)
            .create_async()
            .await;

        let mut out = Vec::new();
        call(
            &api(&server.url()),
            "addItem",
            Some(r#"{"name": "Crate"}"#),
            &["warehouse=north".to_string()],
            &mut out,
        )
        .await
        .unwrap();

        mock.assert_async().await;
        let printed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(printed["itemId"], "I-9");
        assert_eq!(printed["success"], true);
    }

    #[tokio::test]
    async fn test_call_rejects_bad_json_before_sending() {
        let server = mockito::Server::new_async().await;
        let mut out = Vec::new();

        let err = call(&api(&server.url()), "addItem", Some("{oops"), &[], &mut out)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("--data"));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_call_propagates_application_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/exec")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"success": false, "message": "Unknown action"}"#)
            .create_async()
            .await;

        let mut out = Vec::new();
        let err = call(&api(&server.url()), "bogus", None, &[], &mut out)
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<ApiError>(),
            Some(&ApiError::Application("Unknown action".to_string()))
        );
    }

    #[tokio::test]
    async fn test_ping() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/exec")
            .match_query(Matcher::UrlEncoded("action".into(), "getItems".into()))
            .with_status(200)
            .with_body(r#"{"success": true, "items": []}"#)
            .create_async()
            .await;

        let mut out = Vec::new();
        let ok = ping(&api(&server.url()), &mut out).await.unwrap();

        assert!(ok);
        let printed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(printed["success"], true);
        assert_eq!(printed["status"], 200);
    }
}
