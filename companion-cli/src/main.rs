use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use companion_api::{ApiClient, DoseLogRequest, FetchGuard, TaskPatch};
use companion_core::model::VIRTUAL_ID_MARKER;
use companion_core::time::{day_offset, local_day, local_to_utc};
use companion_core::{
    BucketPolicy, Buckets, ChangeBus, ChangeTopic, DoseStatus, EditScope, Priority, ScheduleItem,
    Task, ViewMode, bucket, expand_medication, expand_recurring_task, virtual_task_id,
};

mod config;
mod render;
mod state;

#[derive(Parser, Debug)]
#[command(name = "companion", version, about = "CareCompanion caregiver CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage ~/.companion/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Fetch and print the derived schedule
    Schedule {
        /// View mode: today, all, or pending
        #[arg(long, default_value = "today")]
        view: String,

        /// Days to fetch, starting today (ignored by the today view's
        /// medication schedule, which is always a single day)
        #[arg(long, default_value_t = 7)]
        days: i64,
    },

    /// Edit one occurrence or its whole series
    Edit {
        /// Task id, virtual occurrence id, or a template id with --date
        id: String,

        /// Occurrence date (YYYY-MM-DD) when `id` is a bare template id
        #[arg(long)]
        date: Option<NaiveDate>,

        /// occurrence (just this instance) or series (the template)
        #[arg(long, default_value = "occurrence")]
        scope: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// low, medium, or high
        #[arg(long)]
        priority: Option<String>,

        /// New due time, local wall clock: "YYYY-MM-DD HH:MM"
        #[arg(long)]
        due: Option<String>,
    },

    /// Delete one occurrence (a virtual one is materialized first)
    Delete {
        id: String,

        /// Occurrence date (YYYY-MM-DD) when `id` is a bare template id
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Complete one occurrence (a virtual one is materialized first)
    Complete {
        /// Task id, virtual occurrence id, or a template id with --date
        id: String,

        /// Completion notes
        #[arg(long)]
        notes: Option<String>,

        /// Occurrence date (YYYY-MM-DD) when `id` is a bare template id
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Medication actions
    Meds {
        #[command(subcommand)]
        command: MedsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
}

#[derive(Subcommand, Debug)]
enum MedsCommand {
    /// Log a dose for a schedule slot
    Log {
        /// Medication id
        id: String,

        /// Schedule slot being logged, HH:MM
        #[arg(long)]
        time: String,

        /// given, missed, or refused
        #[arg(long)]
        status: String,

        #[arg(long)]
        notes: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
        },

        Command::Schedule { view, days } => {
            let cfg = config::load_config()?;
            let client = api_client(&cfg);
            let view = parse_view(&view)?;
            if days < 1 {
                bail!("--days must be at least 1");
            }
            let buckets = load_schedule(&client, &cfg, view, days, &FetchGuard::new()).await?;
            render::print_buckets(&buckets, Utc::now(), cfg.timezone()?);
        }

        Command::Edit {
            id,
            date,
            scope,
            title,
            description,
            priority,
            due,
        } => {
            let cfg = config::load_config()?;
            let client = api_client(&cfg);
            let scope = parse_scope(&scope)?;
            let tz = cfg.timezone()?;

            let patch = TaskPatch {
                title,
                description,
                priority: priority.as_deref().map(parse_priority).transpose()?,
                due_date: due.as_deref().map(|s| parse_local(s, tz)).transpose()?,
                ..Default::default()
            };

            let id = qualify_id(id, date);
            let occurrence = find_task(&client, &cfg, &id)
                .await?
                .unwrap_or_else(|| Task::new(id.clone(), id.clone()));

            let updated = client
                .apply_write(&occurrence, scope, &patch)
                .await
                .with_context(|| format!("editing {}", occurrence.id))?;
            println!("Updated: {} ({})", updated.title, updated.id);
        }

        Command::Delete { id, date } => {
            let cfg = config::load_config()?;
            let client = api_client(&cfg);

            let id = qualify_id(id, date);
            let occurrence = find_task(&client, &cfg, &id)
                .await?
                .unwrap_or_else(|| Task::new(id.clone(), id.clone()));

            client
                .delete_occurrence(&occurrence)
                .await
                .with_context(|| format!("deleting {}", occurrence.id))?;
            println!("Deleted: {}", occurrence.id);
        }

        Command::Complete { id, notes, date } => {
            let cfg = config::load_config()?;
            let client = api_client(&cfg);

            // After any successful write the schedule is refetched from
            // scratch, never patched; the bus carries that contract.
            let bus = ChangeBus::new();
            let dirty = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&dirty);
            let _sub = bus.subscribe(Some(ChangeTopic::Tasks), move |_| {
                flag.store(true, Ordering::SeqCst);
            });

            let id = qualify_id(id, date);
            let occurrence = find_task(&client, &cfg, &id)
                .await?
                .unwrap_or_else(|| Task::new(id.clone(), id.clone()));

            let done = client
                .complete_occurrence(&occurrence, notes.as_deref())
                .await
                .with_context(|| format!("completing {}", occurrence.id))?;
            println!("Completed: {} ({})", done.title, done.id);
            bus.publish(ChangeTopic::Tasks);

            if dirty.swap(false, Ordering::SeqCst) {
                let buckets =
                    load_schedule(&client, &cfg, ViewMode::Today, 1, &FetchGuard::new()).await?;
                println!();
                render::print_buckets(&buckets, Utc::now(), cfg.timezone()?);
            }
        }

        Command::Meds { command } => match command {
            MedsCommand::Log {
                id,
                time,
                status,
                notes,
            } => {
                let cfg = config::load_config()?;
                let client = api_client(&cfg);

                // Validates the slot format before it goes on the wire.
                companion_core::time::parse_schedule_time(&time)?;
                let log = DoseLogRequest {
                    scheduled_time: time,
                    status: parse_dose_status(&status)?,
                    notes,
                };
                client
                    .log_dose(&id, &log)
                    .await
                    .with_context(|| format!("logging dose for {id}"))?;
                println!("Logged {} for medication {id}", log.scheduled_time);
            }
        },
    }

    Ok(())
}

fn api_client(cfg: &config::Config) -> ApiClient {
    ApiClient::new(cfg.api.base_url.clone(), cfg.api.token.clone())
}

/// A bare template id plus `--date` names one projected occurrence; build
/// its virtual id. Ids that already carry the marker pass through.
fn qualify_id(id: String, date: Option<NaiveDate>) -> String {
    match date {
        Some(d) if !id.contains(VIRTUAL_ID_MARKER) => virtual_task_id(&id, d),
        _ => id,
    }
}

fn parse_scope(s: &str) -> Result<EditScope> {
    match s {
        "occurrence" => Ok(EditScope::Occurrence),
        "series" => Ok(EditScope::Series),
        other => bail!("unknown scope '{other}' (expected occurrence or series)"),
    }
}

fn parse_priority(s: &str) -> Result<Priority> {
    match s {
        "low" => Ok(Priority::Low),
        "medium" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        other => bail!("unknown priority '{other}' (expected low, medium, or high)"),
    }
}

/// Parse a local wall-clock "YYYY-MM-DD HH:MM" in the configured timezone.
fn parse_local(s: &str, tz: chrono_tz::Tz) -> Result<chrono::DateTime<Utc>> {
    let ndt = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M")
        .map_err(|e| anyhow::anyhow!("invalid local datetime '{s}': {e}"))?;
    local_to_utc(ndt.date(), ndt.time(), tz)
        .ok_or_else(|| anyhow::anyhow!("ambiguous or invalid local time (DST?): {s}"))
}

fn parse_view(s: &str) -> Result<ViewMode> {
    match s {
        "today" => Ok(ViewMode::Today),
        "all" => Ok(ViewMode::All),
        "pending" => Ok(ViewMode::Pending),
        other => bail!("unknown view '{other}' (expected today, all, or pending)"),
    }
}

fn parse_dose_status(s: &str) -> Result<DoseStatus> {
    match s {
        "given" => Ok(DoseStatus::Given),
        "missed" => Ok(DoseStatus::Missed),
        "refused" => Ok(DoseStatus::Refused),
        other => bail!("unknown dose status '{other}' (expected given, missed, or refused)"),
    }
}

/// Fetch everything the view needs and derive its buckets.
///
/// Tasks come back with backend-projected virtual occurrences; any template
/// that still carries its recurrence rule is expanded client-side too, and
/// the stable occurrence ids make the overlap safe to dedupe.
async fn load_schedule(
    client: &ApiClient,
    cfg: &config::Config,
    view: ViewMode,
    days: i64,
    guard: &FetchGuard,
) -> Result<Buckets> {
    let tz = cfg.timezone()?;
    let now = Utc::now();
    let start = local_day(now, tz);
    let end = day_offset(start, days - 1);

    let token = guard.begin();
    let tasks = client
        .fetch_care_tasks(start, end, true)
        .await
        .context("fetching care tasks")?;

    let mut items: Vec<ScheduleItem> = Vec::new();

    if view == ViewMode::Today {
        let entries = client
            .todays_medication_schedule(&cfg.api.patient_id)
            .await
            .context("fetching today's medication schedule")?;
        items.extend(entries.iter().map(ScheduleItem::from_dose));
    } else {
        let meds = client
            .list_medications()
            .await
            .context("fetching medications")?;
        for med in &meds {
            items.extend(expand_medication(med, start, end, tz));
        }
    }

    if !guard.is_current(token) {
        bail!("discarding stale fetch; a newer one superseded it");
    }

    let mut seen: HashSet<String> = HashSet::new();
    for task in &tasks {
        if task.is_recurrence_template {
            for occurrence in expand_recurring_task(task, start, end) {
                if seen.insert(occurrence.id.clone()) {
                    items.push(ScheduleItem::from_task(&occurrence));
                }
            }
        } else if seen.insert(task.id.clone()) {
            items.push(ScheduleItem::from_task(task));
        }
    }

    let policy = BucketPolicy {
        proximity_minutes: cfg.display.proximity_minutes,
    };
    Ok(bucket(&items, now, view, tz, policy))
}

/// Look the task up in the current fetch window so completions show real
/// titles. Missing is fine; the id alone still resolves a write target.
async fn find_task(
    client: &ApiClient,
    cfg: &config::Config,
    id: &str,
) -> Result<Option<Task>> {
    let tz = cfg.timezone()?;
    let start = local_day(Utc::now(), tz);
    let end = day_offset(start, 60);
    let tasks = client
        .fetch_care_tasks(start, end, true)
        .await
        .context("fetching care tasks")?;
    Ok(tasks.into_iter().find(|t| t.id == id))
}
