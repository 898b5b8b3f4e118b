//! PrintLab CLI - Command-line interface for the PrintLab daemon
//!
//! Students submit and confirm jobs; staff log in to review the queue.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9640";

#[derive(Parser)]
#[command(name = "printlab")]
#[command(about = "3D Print Lab CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "PRINTLAB_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// Staff session token (from `printlab login`)
    #[arg(long, env = "PRINTLAB_SESSION")]
    session: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a print request
    Submit {
        /// Student name
        #[arg(long)]
        name: String,

        /// Student email
        #[arg(long)]
        email: String,

        /// Discipline or department
        #[arg(long)]
        discipline: String,

        /// Class or project (optional)
        #[arg(long)]
        class_project: Option<String>,

        /// Print method: filament or resin
        #[arg(short, long)]
        method: String,

        /// Color choice
        #[arg(short, long)]
        color: String,

        /// Path to the model file
        file: String,
    },

    /// Open a staff session
    Login {
        /// Staff password
        #[arg(short, long)]
        password: String,

        /// Name to record in the session
        #[arg(long, default_value = "staff")]
        name: String,
    },

    /// Close the current staff session
    Logout,

    /// List jobs (staff)
    List {
        /// Filter by status (e.g. pending, approved, printing)
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Price and approve a pending job (staff)
    Approve {
        /// Job ID
        job_id: i64,

        /// Estimated material weight in grams
        #[arg(short, long)]
        weight: f64,

        /// Estimated print time in hours
        #[arg(short, long)]
        time: f64,
    },

    /// Reject a pending job (staff)
    Reject {
        /// Job ID
        job_id: i64,

        /// Reason shown to the student
        #[arg(short, long)]
        reason: String,
    },

    /// Move a job to a later stage (staff)
    SetStatus {
        /// Job ID
        job_id: i64,

        /// New status: queued, printing, completed or picked_up
        status: String,
    },

    /// Confirm or cancel an approved job via its emailed token
    Confirm {
        /// Confirmation token from the email link
        token: String,

        /// Cancel instead of confirming
        #[arg(long)]
        cancel: bool,
    },

    /// Show the audit trail for a job (staff)
    Audit {
        /// Job ID
        job_id: i64,
    },
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize)]
struct JobRow {
    id: i64,
    student_name: String,
    print_method: String,
    color: String,
    status: String,
    cost: Option<f64>,
    original_filename: String,
}

#[derive(Tabled)]
struct JobLine {
    id: i64,
    student: String,
    method: String,
    color: String,
    status: String,
    cost: String,
    file: String,
}

impl From<JobRow> for JobLine {
    fn from(job: JobRow) -> Self {
        Self {
            id: job.id,
            student: job.student_name,
            method: job.print_method,
            color: job.color,
            status: job.status,
            cost: job
                .cost
                .map(|c| format!("${:.2}", c))
                .unwrap_or_else(|| "-".to_string()),
            file: job.original_filename,
        }
    }
}

#[derive(Deserialize)]
struct AuditRow {
    action: String,
    old_status: Option<String>,
    new_status: Option<String>,
    details: Option<String>,
    timestamp: i64,
}

#[derive(Tabled)]
struct AuditLine {
    action: String,
    transition: String,
    details: String,
    timestamp: i64,
}

impl From<AuditRow> for AuditLine {
    fn from(entry: AuditRow) -> Self {
        let transition = match (entry.old_status, entry.new_status) {
            (Some(from), Some(to)) => format!("{} -> {}", from, to),
            (None, Some(to)) => to,
            _ => "-".to_string(),
        };
        Self {
            action: entry.action,
            transition,
            details: entry.details.unwrap_or_default(),
            timestamp: entry.timestamp,
        }
    }
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

fn require_session(session: Option<String>) -> Result<String> {
    session.context("Staff session required: run `printlab login` and export PRINTLAB_SESSION")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Submit {
            name,
            email,
            discipline,
            class_project,
            method,
            color,
            file,
        } => {
            let file_path = std::fs::canonicalize(&file)
                .with_context(|| format!("File not found: {}", file))?;

            let params = json!({
                "student_name": name,
                "student_email": email,
                "discipline": discipline,
                "class_project": class_project,
                "print_method": method,
                "color": color,
                "file_path": file_path,
            });

            let result = call_rpc(&cli.rpc_url, "job.submit.v1", params).await?;

            println!("{}", "✓ Print request submitted".green().bold());
            println!(
                "  Job #{} is now {}. Watch your email for pricing.",
                result["job_id"], result["status"]
            );
        }

        Commands::Login { password, name } => {
            let params = json!({ "password": password, "staff_name": name });
            let result = call_rpc(&cli.rpc_url, "staff.login.v1", params).await?;

            let token = result["session_token"]
                .as_str()
                .context("No session token in response")?;

            println!("{}", "✓ Logged in".green().bold());
            println!("  export PRINTLAB_SESSION={}", token);
        }

        Commands::Logout => {
            let session = require_session(cli.session)?;
            call_rpc(
                &cli.rpc_url,
                "staff.logout.v1",
                json!({ "session_token": session }),
            )
            .await?;

            println!("{}", "✓ Logged out".green().bold());
        }

        Commands::List { status } => {
            let session = require_session(cli.session)?;
            let params = json!({ "session_token": session, "status": status });

            let result = call_rpc(&cli.rpc_url, "job.list.v1", params).await?;
            let jobs: Vec<JobRow> = serde_json::from_value(result["jobs"].clone())?;

            if jobs.is_empty() {
                println!("{}", "No jobs found".yellow());
            } else {
                let lines: Vec<JobLine> = jobs.into_iter().map(Into::into).collect();
                println!("{}", Table::new(lines));
            }
        }

        Commands::Approve {
            job_id,
            weight,
            time,
        } => {
            let session = require_session(cli.session)?;
            let params = json!({
                "session_token": session,
                "job_id": job_id,
                "weight_grams": weight,
                "time_hours": time,
            });

            let result = call_rpc(&cli.rpc_url, "job.approve.v1", params).await?;

            println!("{}", format!("✓ Job {} approved", job_id).green().bold());
            println!(
                "  Quoted cost: ${:.2}",
                result["cost"].as_f64().unwrap_or(0.0)
            );
        }

        Commands::Reject { job_id, reason } => {
            let session = require_session(cli.session)?;
            let params = json!({
                "session_token": session,
                "job_id": job_id,
                "reason": reason,
            });

            call_rpc(&cli.rpc_url, "job.reject.v1", params).await?;

            println!("{}", format!("✓ Job {} rejected", job_id).green().bold());
        }

        Commands::SetStatus { job_id, status } => {
            let session = require_session(cli.session)?;
            let params = json!({
                "session_token": session,
                "job_id": job_id,
                "status": status,
            });

            let result = call_rpc(&cli.rpc_url, "job.set_status.v1", params).await?;

            println!(
                "{}",
                format!("✓ Job {} is now {}", job_id, result["status"])
                    .green()
                    .bold()
            );
        }

        Commands::Confirm { token, cancel } => {
            let action = if cancel { "cancel" } else { "confirm" };
            let params = json!({ "token": token, "action": action });

            let result = call_rpc(&cli.rpc_url, "job.confirm.v1", params).await?;

            if cancel {
                println!(
                    "{}",
                    format!("✓ Job {} cancelled", result["job_id"]).yellow().bold()
                );
            } else {
                println!(
                    "{}",
                    format!("✓ Job {} confirmed, it will be queued for printing", result["job_id"])
                        .green()
                        .bold()
                );
            }
        }

        Commands::Audit { job_id } => {
            let session = require_session(cli.session)?;
            let params = json!({ "session_token": session, "job_id": job_id });

            let result = call_rpc(&cli.rpc_url, "job.audit.v1", params).await?;
            let entries: Vec<AuditRow> = serde_json::from_value(result["entries"].clone())?;

            if entries.is_empty() {
                println!("{}", "No audit entries".yellow());
            } else {
                println!("{}", format!("Audit trail for job {}", job_id).cyan().bold());
                let lines: Vec<AuditLine> = entries.into_iter().map(Into::into).collect();
                println!("{}", Table::new(lines));
            }
        }
    }

    Ok(())
}
