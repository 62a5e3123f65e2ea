use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use claimflow::config::AppConfig;
use claimflow::gate::{FeatureGate, GateOutcome, GatedPage};
use claimflow::profile::{FlagName, SubscriptionTier};
use claimflow::progress::{derive_progress, Stage};
use claimflow::sync::{HttpProfileApi, Synchronizer};
use claimflow::AppContext;

#[derive(Parser)]
#[command(
    name = "claimflow",
    about = "ClaimGuide workflow engine — inspect and mutate local workflow state",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Data directory for the store file and config
    #[arg(long, env = "CLAIMFLOW_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CLAIMFLOW_LOG")]
    log: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "CLAIMFLOW_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Show completion flags, derived progress, and per-page gate outcomes.
    Status,
    /// Show the stored profile record as JSON.
    Show,
    /// Update profile fields (merge into the stored record, then save).
    Set {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        zip_code: Option<String>,
    },
    /// Mark a workflow stage complete.
    ///
    /// Names: personal-info, service-history, medical-conditions.
    Flag { name: String },
    /// Set the subscription tier (payment-return side channel).
    ///
    /// Tiers: starter, pro, deluxe, business.
    Tier { tier: String },
    /// List notifications; `--unread` shows only unread ones.
    Notifications {
        #[arg(long)]
        unread: bool,
    },
    /// Mark a notification read, or all of them with `--all`.
    Read {
        id: Option<String>,
        #[arg(long)]
        all: bool,
    },
    /// Fetch the remote profile and overlay it on local state.
    Sync,
    /// Delete the stored profile, flags, and notifications (account reset).
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;

    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| AppConfig::default().data_dir);
    let mut config = AppConfig::load(&AppContext::config_path(&data_dir))?;
    config.data_dir = data_dir;
    let ctx = AppContext::open(config)?;

    match args.command {
        Command::Status => status(&ctx),
        Command::Show => show(&ctx),
        Command::Set {
            first_name,
            last_name,
            email,
            phone,
            address,
            city,
            state,
            zip_code,
        } => {
            let mut record = ctx.store.load().unwrap_or_default();
            let fields = [
                (&mut record.first_name, first_name),
                (&mut record.last_name, last_name),
                (&mut record.email, email),
                (&mut record.phone, phone),
                (&mut record.address, address),
                (&mut record.city, city),
                (&mut record.state, state),
                (&mut record.zip_code, zip_code),
            ];
            for (slot, value) in fields {
                if let Some(v) = value {
                    *slot = v;
                }
            }
            ctx.store.save(&record);
            ctx.bus.publish_workflow_changed();
            println!(
                "profile saved ({})",
                if record.is_complete() { "complete" } else { "incomplete" }
            );
            // Best-effort push; local state is already authoritative.
            let api = HttpProfileApi::new(&ctx.config)?;
            Synchronizer::new(api, ctx.store.clone(), ctx.bus.clone())
                .push(&record)
                .await;
            Ok(())
        }
        Command::Flag { name } => {
            let flag: FlagName = name.parse().map_err(anyhow::Error::msg)?;
            ctx.store.set_flag(flag);
            ctx.bus.publish_workflow_changed();
            println!("{flag} set");
            Ok(())
        }
        Command::Tier { tier } => {
            let tier: SubscriptionTier = tier.parse().map_err(anyhow::Error::msg)?;
            ctx.store.set_subscription_tier(tier);
            ctx.bus.publish_workflow_changed();
            println!("subscription tier set to {tier}");
            Ok(())
        }
        Command::Notifications { unread } => {
            for n in ctx.notifications.list() {
                if unread && n.read {
                    continue;
                }
                let marker = if n.read { " " } else { "*" };
                println!("{marker} {}  [{}] {} — {}", n.id, n.created_at.to_rfc3339(), n.title, n.message);
            }
            println!("{} unread", ctx.notifications.unread_count());
            Ok(())
        }
        Command::Read { id, all } => {
            if all {
                ctx.notifications.mark_all_read();
            } else if let Some(id) = id {
                ctx.notifications.mark_read(&id);
            } else {
                anyhow::bail!("pass a notification id or --all");
            }
            Ok(())
        }
        Command::Sync => {
            let api = HttpProfileApi::new(&ctx.config)?;
            let outcome = Synchronizer::new(api, ctx.store.clone(), ctx.bus.clone())
                .refresh()
                .await;
            println!("sync: {outcome:?}");
            Ok(())
        }
        Command::Reset => {
            ctx.reset();
            info!("account state cleared");
            println!("local state reset");
            Ok(())
        }
    }
}

fn status(ctx: &AppContext) -> Result<()> {
    let record = ctx.store.load();
    let flags = ctx.store.flags();
    let progress = derive_progress(&flags);

    match &record {
        Some(r) => println!(
            "profile: {} {} <{}> — {} tier, {}",
            r.first_name,
            r.last_name,
            r.email,
            r.subscription_tier,
            if r.is_complete() { "complete" } else { "incomplete" }
        ),
        None => println!("profile: (none saved)"),
    }

    println!(
        "flags:   personalInfo={} serviceHistory={} medicalConditions={}",
        flags.personal_info_complete,
        flags.service_history_complete,
        flags.medical_conditions_complete
    );

    for stage in Stage::ALL {
        let mark = if progress.stage_unlocked(stage) { "open" } else { "locked" };
        println!("stage:   {:<20} {}", stage.title(), mark);
    }

    let gate = FeatureGate::new(ctx.store.clone());
    for page in [
        GatedPage::ServiceHistory,
        GatedPage::MedicalConditions,
        GatedPage::ClaimBuilder,
        GatedPage::LayStatement,
        GatedPage::BuddyStatement,
        GatedPage::Coaching,
    ] {
        match gate.evaluate(page) {
            GateOutcome::Allow => println!("gate:    {:<20} allow", page.title()),
            GateOutcome::Blocked { redirect, .. } => {
                println!("gate:    {:<20} blocked → {}", page.title(), redirect.route())
            }
        }
    }
    Ok(())
}

fn show(ctx: &AppContext) -> Result<()> {
    match ctx.store.load() {
        Some(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        None => println!("(no profile saved)"),
    }
    Ok(())
}

fn init_tracing(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log.as_deref().unwrap_or("info")));

    match &args.log_file {
        Some(path) => {
            let dir = path.parent().unwrap_or(std::path::Path::new("."));
            let file = path
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "claimflow.log".to_string());
            let appender = tracing_appender::rolling::daily(dir, file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(appender)
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}
