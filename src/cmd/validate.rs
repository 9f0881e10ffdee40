//! `courier validate`: check a configuration file for errors.
//!
//! Parses and validates the config file, reporting results in either
//! human-readable text or machine-readable JSON format.

use crate::cli::{OutputFormat, ValidateArgs};
use crate::config::sources::parse_config_str;
use crate::config::validation;
use crate::error::CourierError;

pub fn execute(args: &ValidateArgs) -> Result<(), CourierError> {
    let path = &args.config;
    if !path.exists() {
        return Err(CourierError::ConfigFileNotFound { path: path.clone() });
    }

    let content = std::fs::read_to_string(path)?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let config = parse_config_str(ext, &content, &path.display().to_string())?;

    if let Err(errors) = validation::validate(&config) {
        match args.format {
            OutputFormat::Text => {
                eprintln!("\u{2717} {} has {} errors\n", path.display(), errors.len());
                for error in &errors {
                    eprintln!("{error}");
                }
            }
            OutputFormat::Json => {
                let listed: Vec<serde_json::Value> = errors
                    .iter()
                    .map(|e| {
                        serde_json::json!({
                            "remote": e.remote,
                            "field": e.field,
                            "message": e.message,
                            "suggestion": e.suggestion,
                        })
                    })
                    .collect();
                println!("{}", serde_json::json!({ "valid": false, "errors": listed }));
            }
        }
        return Err(CourierError::ConfigValidation { errors });
    }

    match args.format {
        OutputFormat::Text => println!(
            "\u{2713} {}",
            validation::format_validation_report(&path.display().to_string(), &config)
        ),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "valid": true,
                "remotes": config.remotes.len(),
                "addresses": config.total_addresses(),
            })
        ),
    }
    Ok(())
}
