use std::io::Write;

use anyhow::{Result, anyhow};
use todolist_app::{CreateTaskInput, TaskService, ViewConfig, ViewQueryBuilder, render_cards};
use todolist_core::{Clock, ViewQuery};
use todolist_store::KeyValueStore;
use tracing::debug;

use crate::{Command, LsFormat};

mod table;

use table::render_task_table;

/// Execute one subcommand against `service`, writing user output to `out`.
pub fn run<S, C>(
    command: Command,
    service: &mut TaskService<S, C>,
    defaults: &ViewConfig,
    out: &mut impl Write,
) -> Result<()>
where
    S: KeyValueStore,
    C: Clock,
{
    match command {
        Command::Add {
            description,
            date,
            time,
            priority,
        } => {
            let task = service.add(CreateTaskInput {
                description,
                date,
                time,
                priority,
            })?;
            writeln!(out, "created task: {} ({})", task.id, task.description)?;
        }
        Command::Ls {
            filters,
            sort,
            search,
            format,
        } => {
            let query = build_query(defaults, filters, sort, search)?;
            let narrowed = !query.filter.is_empty() || query.search.is_some();
            let tasks = service.project(&query)?;
            debug!(?format, shown = tasks.len(), sort = ?query.sort, "listing tasks");

            match format {
                LsFormat::Table if tasks.is_empty() => {
                    if narrowed {
                        writeln!(out, "No tasks matched the provided filters")?;
                    } else {
                        writeln!(out, "No tasks found")?;
                    }
                }
                LsFormat::Table => render_task_table(&tasks, out)?,
                LsFormat::Json => {
                    serde_json::to_writer_pretty(&mut *out, &tasks)?;
                    writeln!(out)?;
                }
                LsFormat::Html => write!(out, "{}", render_cards(&tasks))?,
            }
        }
        Command::Toggle { task } => {
            let id = service.resolve(&task)?;
            let toggled = service.toggle(id)?;
            writeln!(out, "{}: {}", toggled.id, toggled.status)?;
        }
        Command::Rm { task } => {
            let id = service.resolve(&task)?;
            let removed = service.delete(id)?;
            writeln!(out, "deleted task: {} ({})", removed.id, removed.description)?;
        }
        Command::Show { task } => {
            let id = service.resolve(&task)?;
            let task = service.get(id)?;
            serde_json::to_writer_pretty(&mut *out, &task)?;
            writeln!(out)?;
        }
    }

    Ok(())
}

/// Flags win over `[view]` defaults; each is replaced as a whole, not merged.
fn build_query(
    defaults: &ViewConfig,
    filters: Vec<String>,
    sort: Option<String>,
    search: Option<String>,
) -> Result<ViewQuery> {
    let filters = if filters.is_empty() {
        defaults.filters.clone()
    } else {
        filters
    };
    let sort = sort.or_else(|| defaults.sort.clone());

    ViewQueryBuilder::new()
        .with_filters(&filters)
        .and_then(|builder| builder.with_sort(sort.as_deref()))
        .map(|builder| builder.with_text(search).build())
        .map_err(|err| anyhow!(err.describe_user_facing()))
}
