//! `kcadmin request`: send an arbitrary realm-relative request.

use std::fs;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Value, json};

use kcadmin_core::{Body, Dispatch, Method, Outcome, Request};

use crate::cli::ConnectionArgs;
use crate::connection;
use crate::output;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, DELETE)
    pub method: Method,

    /// Realm-relative path, e.g. /groups
    pub path: String,

    /// JSON body, or @FILE to read it from a file
    #[arg(long, short)]
    pub data: Option<String>,

    /// Send --data as-is with this content type instead of as JSON
    #[arg(long, requires = "data")]
    pub content_type: Option<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "query", short, value_parser = parse_key_value)]
    pub query: Vec<(String, String)>,
}

pub async fn run(args: RequestArgs, connection: &ConnectionArgs) -> Result<()> {
    let client = connection::connect(connection)?;

    let mut request = Request::new(args.method, args.path);
    for (key, value) in args.query {
        request = request.query(key, value);
    }
    if let Some(data) = args.data {
        let data = read_data(&data)?;
        let body = match args.content_type {
            Some(content_type) => Body::raw(data, content_type),
            None => {
                let value: Value = serde_json::from_str(&data).context("--data is not valid JSON")?;
                Body::Json(value)
            }
        };
        request = request.body(body);
    }

    let outcome: Outcome<Value> = client.request(request).await.context("Request failed")?;
    match outcome {
        Outcome::Value(value) => output::json_pretty(&value),
        Outcome::Created { id, body } => {
            output::success(&format!("Created {}", id));
            output::json_pretty(&body.unwrap_or_else(|| json!({ "id": id })))
        }
        Outcome::Empty => {
            output::success("No content");
            Ok(())
        }
    }
}

fn read_data(data: &str) -> Result<String> {
    match data.strip_prefix('@') {
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read {}", path)),
        None => Ok(data.to_string()),
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_parsing() {
        assert_eq!(
            parse_key_value("q=role:admin").unwrap(),
            ("q".to_string(), "role:admin".to_string())
        );
        assert_eq!(
            parse_key_value("search=").unwrap(),
            ("search".to_string(), String::new())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn data_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.json");
        fs::write(&path, r#"{"name":"eng"}"#).unwrap();

        let data = read_data(&format!("@{}", path.display())).unwrap();
        assert_eq!(data, r#"{"name":"eng"}"#);
        assert_eq!(read_data("{}").unwrap(), "{}");
    }
}
