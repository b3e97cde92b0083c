use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Render field-keyed validation failures one per line
pub fn format_field_errors(fields: &Value) -> String {
    match fields.as_object() {
        Some(map) => {
            let mut lines: Vec<String> = map
                .iter()
                .map(|(field, message)| format!("  {}: {}", field, message.as_str().unwrap_or_default()))
                .collect();
            lines.sort();
            lines.join("\n")
        }
        None => fields.to_string(),
    }
}
