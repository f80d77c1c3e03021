//! Vaultup CLI - local Vault dev environment provisioner
//!
//! Usage: vaultup <COMMAND>
//!
//! Commands:
//!   up      Provision the local dev instance
//!   down    Tear everything back down
//!   doctor  Run the preflight checks and report

use anyhow::Result;
use clap::{Parser, Subcommand};

use vaultup::{
    ensure_ready, run_preflight, CheckStatus, PreflightMode, PreflightReport, ProvisionWorkflow,
    Settings, ShellRunner, StepOutcome, TeardownWorkflow, VaultupError, WorkflowReport,
};

/// Vaultup - local Vault dev environment provisioner
#[derive(Parser, Debug)]
#[command(name = "vaultup")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output line-delimited JSON events
    #[arg(long, default_value = "false")]
    json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Provision the dev instance (layout, certs, hosts entry, trust, container)
    Up {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Show the step plan without mutating anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Tear down everything `up` created, including local data
    Down {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Show the step plan without mutating anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Run the preflight checks and print a report
    Doctor,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    ctrlc::set_handler(|| {
        eprintln!("\ninterrupted - partially applied state may remain; run `vaultup down` to clean up");
        std::process::exit(130);
    })?;

    match cli.command {
        Commands::Up { yes, dry_run } => cmd_up(yes, dry_run, cli.json, cli.verbose),
        Commands::Down { yes, dry_run } => cmd_down(yes, dry_run, cli.json, cli.verbose),
        Commands::Doctor => cmd_doctor(cli.json),
    }
}

fn cmd_up(yes: bool, dry_run: bool, json: bool, verbose: u8) -> Result<()> {
    let root = std::env::current_dir()?;
    let settings = Settings::load(&root)?;
    let runner = ShellRunner::new();
    let workflow = ProvisionWorkflow::new(&runner, &root, settings.clone());

    if !json {
        println!("🔐 Vaultup Up");
        println!("Project: {}", root.display());
        println!("Hostname: {}", settings.hostname);
        println!("Image: {} (host port {})", settings.image, settings.host_port);
    }

    if dry_run {
        render_plan("up", &workflow.plan(), json);
        return Ok(());
    }

    let report = run_preflight(&runner, &settings, PreflightMode::Provision);
    render_preflight(&report, json);
    ensure_ready(&report)?;

    if !confirm("Provision the local Vault dev instance?", yes, json)? {
        println!("Aborted.");
        return Ok(());
    }

    let report = workflow.execute()?;
    render_report("up", &report, json, verbose);

    if !json {
        println!();
        println!("✅ vault is starting at https://{}:{}", settings.hostname, settings.host_port);
        println!("   export VAULT_ADDR=https://{}:{}", settings.hostname, settings.host_port);
        println!("   export VAULT_CACERT={}", root.join("certs/vault.crt").display());
    }
    Ok(())
}

fn cmd_down(yes: bool, dry_run: bool, json: bool, verbose: u8) -> Result<()> {
    let root = std::env::current_dir()?;
    let settings = Settings::load(&root)?;
    let runner = ShellRunner::new();
    let workflow = TeardownWorkflow::new(&runner, &root, settings.clone());

    if !json {
        println!("🧹 Vaultup Down");
        println!("Project: {}", root.display());
    }

    if dry_run {
        render_plan("down", &workflow.plan(), json);
        return Ok(());
    }

    let report = run_preflight(&runner, &settings, PreflightMode::Teardown);
    render_preflight(&report, json);
    ensure_ready(&report)?;

    if !confirm(
        "Tear down the dev instance and permanently delete its local data?",
        yes,
        json,
    )? {
        println!("Aborted.");
        return Ok(());
    }

    let report = workflow.execute()?;
    render_report("down", &report, json, verbose);

    if !json {
        println!();
        println!("✅ teardown complete");
    }
    Ok(())
}

fn cmd_doctor(json: bool) -> Result<()> {
    let root = std::env::current_dir()?;
    let settings = Settings::load(&root)?;
    let runner = ShellRunner::new();

    if !json {
        println!("🩺 Vaultup Doctor");
        println!();
    }

    let report = run_preflight(&runner, &settings, PreflightMode::Provision);
    render_preflight(&report, json);

    if !json {
        println!();
        println!(
            "Summary: {} passed, {} warnings, {} errors",
            report.passes(),
            report.warnings(),
            report.errors()
        );
    }

    if !report.is_success() {
        if !json {
            println!();
            println!("🔴 Doctor found issues. Fix the errors and re-run.");
        }
        std::process::exit(1);
    }
    Ok(())
}

/// Ask before mutating. `--yes` skips the prompt; without a terminal the
/// run aborts rather than blocking on a read that can never answer.
fn confirm(prompt: &str, yes: bool, json: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    use is_terminal::IsTerminal;
    if json || !std::io::stdin().is_terminal() {
        eprintln!("confirmation required but stdin is not a terminal; pass --yes to proceed");
        return Err(VaultupError::Aborted.into());
    }
    Ok(dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

fn render_plan(workflow: &str, plan: &[&str], json: bool) {
    if json {
        let event = serde_json::json!({
            "event": "plan",
            "workflow": workflow,
            "steps": plan,
        });
        println!("{event}");
    } else {
        println!("\nDry run - steps that would execute:");
        for (i, step) in plan.iter().enumerate() {
            println!("  {}. {}", i + 1, step);
        }
    }
}

fn render_preflight(report: &PreflightReport, json: bool) {
    if json {
        for check in &report.checks {
            let status = match check.status {
                CheckStatus::Pass => "pass",
                CheckStatus::Warning => "warning",
                CheckStatus::Error => "error",
            };
            let event = serde_json::json!({
                "event": "preflight",
                "name": check.name,
                "status": status,
                "message": check.message,
            });
            println!("{event}");
        }
        return;
    }
    println!();
    for check in &report.checks {
        println!("  {} {} - {}", check.status, check.name, check.message);
        if let Some(rec) = &check.recommendation {
            println!("    ↳ {rec}");
        }
    }
}

fn render_report(workflow: &str, report: &WorkflowReport, json: bool, verbose: u8) {
    if json {
        for step in &report.steps {
            let event = serde_json::json!({
                "event": "step",
                "workflow": workflow,
                "name": step.name,
                "status": step.outcome.status(),
                "message": step.outcome.message(),
            });
            println!("{event}");
        }
        let event = serde_json::json!({
            "event": "complete",
            "workflow": workflow,
            "warnings": report.warnings(),
            "failures": report.failures(),
        });
        println!("{event}");
        return;
    }
    println!();
    for step in &report.steps {
        println!("  {} {}", step.outcome.icon(), step.name);
        let message = step.outcome.message();
        let show_detail = verbose > 0 || !matches!(step.outcome, StepOutcome::Done(_));
        if !message.is_empty() && show_detail {
            println!("    ↳ {message}");
        }
    }
}
