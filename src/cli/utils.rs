use std::io::Read;

use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::database::record::Record;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(response), Some(Value::Object(data))) = (response.as_object_mut(), data) {
                response.extend(data);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(output_format: &OutputFormat, collection_name: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    collection_name: []
                }))?
            );
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Output a list of records, one summary line each in text mode
pub fn output_records(
    output_format: &OutputFormat,
    collection_name: &str,
    records: &[Record],
    summary: fn(&Record) -> String,
) -> anyhow::Result<()> {
    if records.is_empty() {
        return output_empty_collection(output_format, collection_name, &format!("No {} found", collection_name.replace('_', " ")));
    }

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: records }))?);
        }
        OutputFormat::Text => {
            for record in records {
                println!("{}", summary(record));
            }
        }
    }
    Ok(())
}

/// Output a single record with every attribute in text mode
pub fn output_record(output_format: &OutputFormat, item_name: &str, record: &Record) -> anyhow::Result<()> {
    let output = record.to_api_output();

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ item_name: output }))?);
        }
        OutputFormat::Text => {
            if let Value::Object(fields) = output {
                let width = fields.keys().map(String::len).max().unwrap_or(0);
                for (key, value) in fields {
                    let value = match value {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    println!("{:width$}  {}", key, value, width = width);
                }
            }
        }
    }
    Ok(())
}

/// JSON object given inline, or read from stdin when absent
pub fn read_attributes(inline: Option<String>) -> anyhow::Result<Value> {
    let raw = match inline {
        Some(raw) => raw,
        None => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            raw
        }
    };

    let value: Value = serde_json::from_str(&raw).map_err(|e| anyhow::anyhow!("Invalid JSON attributes: {}", e))?;
    if !value.is_object() {
        anyhow::bail!("Attributes must be a JSON object");
    }
    Ok(value)
}
