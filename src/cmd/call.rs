//! `courier call`: perform one remote call from the command line.
//!
//! Startup runs in a fixed order: logging, config load and validation,
//! transport, then the call itself. The normalized response is printed
//! as text or JSON; an unreachable upstream exits non-zero.

use std::time::Duration;

use crate::cli::{CallArgs, OutputFormat};
use crate::client::{Courier, Params, Response, Verb};
use crate::config::sources;
use crate::error::CourierError;
use crate::logging;

pub async fn execute(args: CallArgs) -> Result<(), CourierError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let source = sources::resolve(args.config.as_deref()).await?;
    let (config, version) = source.load().await?;
    tracing::info!(
        source = source.name(),
        version = version.short(),
        remotes = config.remotes.len(),
        "config loaded"
    );

    let courier = Courier::new(config)?;
    let verb = args.method.to_verb();
    let params = build_params(verb, &args)?;

    let mut client = courier.client().insecure_skip_verify(args.insecure);
    for raw in &args.headers {
        let (name, value) = split_header(raw)?;
        client = client.header(name, value);
    }
    if let Some(ms) = args.timeout {
        client = client.set_timeout(Duration::from_millis(ms));
    }
    if let Some(id) = &args.correlation_id {
        client = client.correlation_id(id.clone());
    }

    let response = client.call(verb, &args.remote, &args.path, params).await;
    print_response(&response, &args.output);

    if response.is_unreachable() {
        return Err(CourierError::RemoteUnreachable {
            remote: args.remote,
        });
    }
    Ok(())
}

fn build_params(verb: Verb, args: &CallArgs) -> Result<Params, CourierError> {
    let pairs = args
        .data
        .iter()
        .map(String::as_str)
        .map(split_pair)
        .collect::<Result<Vec<_>, _>>()?;

    if verb != Verb::PostJson {
        return Ok(Params::capture(&pairs));
    }

    match &args.body {
        Some(raw) => {
            let value: serde_json::Value =
                serde_json::from_str(raw).map_err(|e| CourierError::InvalidArgument {
                    arg: "--body".into(),
                    message: e.to_string(),
                })?;
            Ok(Params::capture(&value))
        }
        None => {
            let object: serde_json::Map<String, serde_json::Value> = pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), serde_json::Value::from(v)))
                .collect();
            Ok(Params::capture(&object))
        }
    }
}

fn split_pair(raw: &str) -> Result<(&str, &str), CourierError> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| CourierError::InvalidArgument {
            arg: "--data".into(),
            message: format!("'{raw}' is not KEY=VALUE"),
        })
}

fn split_header(raw: &str) -> Result<(&str, &str), CourierError> {
    raw.split_once(':')
        .map(|(name, value)| (name.trim(), value.trim()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| CourierError::InvalidArgument {
            arg: "--header".into(),
            message: format!("'{raw}' is not 'Name: value'"),
        })
}

fn print_response(response: &Response, format: &OutputFormat) {
    match format {
        OutputFormat::Text => {
            println!("HTTP {}", response.http_status());
            if let Some(code) = response.code() {
                println!("code: {code}");
            }
            println!("{}", response.body());
        }
        OutputFormat::Json => {
            let body = serde_json::from_str::<serde_json::Value>(response.body())
                .unwrap_or_else(|_| serde_json::Value::from(response.body()));
            println!(
                "{}",
                serde_json::json!({
                    "httpStatus": response.http_status(),
                    "body": body,
                })
            );
        }
    }
}
