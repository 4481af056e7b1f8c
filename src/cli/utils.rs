use serde_json::{json, Value};

use crate::api::Column;
use crate::cli::OutputFormat;

/// Widest a table cell gets before it is cut
const MAX_CELL_WIDTH: usize = 48;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(target)) = (data, response.as_object_mut()) {
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

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
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

/// Output a collection as a table (text) or an array under its name (JSON)
pub fn output_table(
    output_format: &OutputFormat,
    collection_name: &str,
    columns: &[Column],
    rows: &[Value],
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    collection_name: rows
                }))?
            );
        }
        OutputFormat::Text => {
            print!("{}", render_table(columns, rows));
        }
    }
    Ok(())
}

/// Output a single record as `key: value` lines (text) or an object (JSON)
pub fn output_record(output_format: &OutputFormat, record: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
        OutputFormat::Text => match record {
            Value::Object(map) => {
                let width = map.keys().map(|k| k.len()).max().unwrap_or(0);
                for (key, value) in map {
                    println!("{:width$}  {}", key, cell(value), width = width);
                }
            }
            other => println!("{}", cell(other)),
        },
    }
    Ok(())
}

pub fn render_table(columns: &[Column], rows: &[Value]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|c| clip(&cell(&row[c.key]))).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let headers: Vec<&str> = columns.iter().map(|c| c.header).collect();
    out.push_str(&table_line(&headers, &widths));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&table_line(&rule.iter().map(String::as_str).collect::<Vec<_>>(), &widths));
    for row in &cells {
        out.push_str(&table_line(&row.iter().map(String::as_str).collect::<Vec<_>>(), &widths));
    }
    out
}

fn table_line(values: &[&str], widths: &[usize]) -> String {
    let padded: Vec<String> = values
        .iter()
        .zip(widths)
        .map(|(v, w)| format!("{:w$}", v, w = *w))
        .collect();
    format!("{}\n", padded.join("  ").trim_end())
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(cell).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

fn clip(text: &str) -> String {
    let single_line = text.replace(['\n', '\r'], " ");
    if single_line.chars().count() <= MAX_CELL_WIDTH {
        return single_line;
    }
    let mut out: String = single_line.chars().take(MAX_CELL_WIDTH - 3).collect();
    out.push_str("...");
    out
}
