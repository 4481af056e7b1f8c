use async_trait::async_trait;
use clap::Subcommand;
use serde_json::{json, Value};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::api::payload::{FieldValue, FileUpload};
use crate::api::resource::{RecordId, Resource};
use crate::cli::config::CliContext;
use crate::cli::utils::{output_empty_collection, output_error, output_record, output_success, output_table};
use crate::cli::OutputFormat;
use crate::controller::{AssumeYes, Banner, Confirmation, FormController, ListController};
use crate::error::ApiError;
use crate::form::{FieldKind, FormSchema};

#[derive(Subcommand)]
pub enum ResourceCommands {
    #[command(about = "List all records")]
    List,

    #[command(about = "Show one record")]
    Show {
        #[arg(help = "Record ID")]
        id: RecordId,
    },

    #[command(about = "Create a record")]
    Create {
        #[arg(long = "set", value_name = "KEY=VALUE", help = "Field value; repeat for list fields such as tags")]
        set: Vec<String>,
        #[arg(long = "file", value_name = "KEY=PATH", help = "Attach a file to a file field")]
        file: Vec<String>,
    },

    #[command(about = "Update a record; unset fields keep their stored values")]
    Update {
        #[arg(help = "Record ID")]
        id: RecordId,
        #[arg(long = "set", value_name = "KEY=VALUE", help = "Field value; repeat for list fields such as tags")]
        set: Vec<String>,
        #[arg(long = "file", value_name = "KEY=PATH", help = "Replace a stored file")]
        file: Vec<String>,
    },

    #[command(about = "Delete a record")]
    Delete {
        #[arg(help = "Record ID")]
        id: RecordId,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

pub async fn handle<R: Resource>(cmd: ResourceCommands, ctx: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut controller = ListController::<R>::new(ctx.config.clone(), ctx.store(), ctx.navigator());

    let result = match cmd {
        ResourceCommands::List => list(&mut controller, &output_format).await,
        ResourceCommands::Show { id } => {
            let record = controller.activate()?.find(id).await?;
            output_record(&output_format, &serde_json::to_value(record)?)
        }
        ResourceCommands::Create { set, file } => {
            let mut form = controller.create_form()?;
            apply_assignments(&mut form, &set, &file)?;
            save(&mut controller, &mut form, &output_format).await
        }
        ResourceCommands::Update { id, set, file } => {
            let mut form = controller.edit_form(id).await?;
            apply_assignments(&mut form, &set, &file)?;
            save(&mut controller, &mut form, &output_format).await
        }
        ResourceCommands::Delete { id, yes } => {
            let deleted = if yes {
                controller.remove(id, &AssumeYes).await?
            } else {
                controller.remove(id, &StdinConfirmation).await?
            };
            if deleted {
                output_success(
                    &output_format,
                    &format!("{} deleted successfully!", R::LABEL),
                    Some(json!({ "id": id })),
                )
            } else {
                output_success(&output_format, "Delete cancelled", Some(json!({ "id": id, "deleted": false })))
            }
        }
    };

    controller.teardown();
    result
}

async fn list<R: Resource>(controller: &mut ListController<R>, output_format: &OutputFormat) -> anyhow::Result<()> {
    controller.mount().await?;

    let rows = controller.state().rows().unwrap_or_default();
    if rows.is_empty() {
        return output_empty_collection(output_format, R::NAME, &format!("No {} found", R::NAME));
    }

    let rows = rows.iter().map(serde_json::to_value).collect::<Result<Vec<Value>, _>>()?;
    output_table(output_format, R::NAME, R::columns(), &rows)
}

async fn save<R: Resource>(
    controller: &mut ListController<R>,
    form: &mut FormController<R>,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    match controller.save(form).await {
        Ok(record) => {
            let message = match form.banner() {
                Some(Banner::Success(message)) => message.clone(),
                _ => format!("{} saved", R::LABEL),
            };
            output_success(output_format, &message, Some(json!({ "id": R::record_id(&record) })))
        }
        Err(err @ ApiError::ValidationFailed { .. }) => {
            report_field_errors(form, &err, output_format)?;
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

fn report_field_errors<R: Resource>(form: &FormController<R>, err: &ApiError, output_format: &OutputFormat) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => output_error(output_format, &err.user_message(), Some(err.error_code())),
        OutputFormat::Text => {
            for (field, message) in form.state().errors() {
                eprintln!("  {}: {}", field, message);
            }
            Ok(())
        }
    }
}

/// Apply `--set key=value` and `--file key=path` arguments to a form.
///
/// Repeating a list field's key builds up the list; the first `--set` for a
/// list field replaces whatever the edit form was prefilled with.
pub fn apply_assignments<R: Resource>(form: &mut FormController<R>, set: &[String], files: &[String]) -> anyhow::Result<()> {
    let mut replaced_lists: Vec<String> = Vec::new();

    for assignment in set {
        let (key, raw) = parse_assignment(assignment)?;
        let value = match field_kind(form.schema(), &key) {
            Some(FieldKind::RelationSet) => {
                let mut items = match form.state().value(&key) {
                    Some(FieldValue::List(items)) if replaced_lists.contains(&key) => items.clone(),
                    _ => Vec::new(),
                };
                items.extend(raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from));
                replaced_lists.push(key.clone());
                FieldValue::List(items)
            }
            Some(FieldKind::Flag) => FieldValue::Bool(parse_flag(&raw)?),
            Some(FieldKind::File) => anyhow::bail!("'{}' is a file field, use --file {}=<path>", key, key),
            Some(_) => FieldValue::Text(raw),
            None => {
                tracing::warn!("'{}' is not a known {} field, sending it as given", key, R::LABEL);
                FieldValue::Text(raw)
            }
        };
        form.set(&key, value);
    }

    for assignment in files {
        let (key, path) = parse_assignment(assignment)?;
        let upload = FileUpload::from_path(Path::new(&path))
            .map_err(|e| anyhow::anyhow!("Cannot read '{}': {}", path, e))?;
        form.attach(&key, upload);
    }

    Ok(())
}

fn field_kind<'a>(schema: &'a FormSchema, key: &str) -> Option<&'a FieldKind> {
    schema.get(key).map(|f| &f.kind)
}

pub fn parse_assignment(assignment: &str) -> anyhow::Result<(String, String)> {
    match assignment.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => anyhow::bail!("Expected KEY=VALUE, got '{}'", assignment),
    }
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" | "" => Ok(false),
        other => anyhow::bail!("Expected yes/no, got '{}'", other),
    }
}

/// Prompts on stderr and reads `y`/`yes` from stdin
struct StdinConfirmation;

#[async_trait]
impl Confirmation for StdinConfirmation {
    async fn confirm(&self, prompt: &str) -> bool {
        let mut stderr = tokio::io::stderr();
        if stderr.write_all(format!("{} [y/N] ", prompt).as_bytes()).await.is_err() {
            return false;
        }
        let _ = stderr.flush().await;

        let mut line = String::new();
        match BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
            Ok(_) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                tracing::warn!("Could not read confirmation: {}", e);
                false
            }
        }
    }
}
