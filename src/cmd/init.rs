//! `courier init`: generate a starter configuration file.

use std::path::PathBuf;

use crate::cli::{ConfigFormat, InitArgs};
use crate::error::CourierError;

pub fn execute(args: &InitArgs) -> Result<(), CourierError> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("courier.{}", args.format.extension())));

    if output.exists() {
        return Err(CourierError::FileExists { path: output });
    }

    std::fs::write(&output, template(&args.format))?;
    println!("Created {}", output.display());
    Ok(())
}

#[must_use]
pub const fn template(format: &ConfigFormat) -> &'static str {
    match format {
        ConfigFormat::Yaml => YAML_TEMPLATE,
        ConfigFormat::Json => JSON_TEMPLATE,
        ConfigFormat::Toml => TOML_TEMPLATE,
    }
}

const YAML_TEMPLATE: &str = r#"# Courier config
#
# remotes: logical name -> candidate base addresses, one picked per call.
# httpTimeout: per-remote timeouts in ms, keyed by request path or "default".
# Calls with no matching entry wait 3000 ms.

debug: false
enableMetrics: false

remotes:
  users:
    - "http://localhost:8081"
    - "http://localhost:8082"

httpTimeout:
  users:
    default: 1000
    # /users/search: 5000
"#;

const JSON_TEMPLATE: &str = r#"{
  "debug": false,
  "enableMetrics": false,
  "remotes": {
    "users": ["http://localhost:8081", "http://localhost:8082"]
  },
  "httpTimeout": {
    "users": { "default": 1000 }
  }
}
"#;

const TOML_TEMPLATE: &str = r#"# Courier config
#
# remotes: logical name -> candidate base addresses, one picked per call.
# httpTimeout: per-remote timeouts in ms, keyed by request path or "default".

debug = false
enableMetrics = false

[remotes]
users = ["http://localhost:8081", "http://localhost:8082"]

[httpTimeout.users]
default = 1000
# "/users/search" = 5000
"#;
