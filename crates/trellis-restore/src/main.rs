use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use kube::config::{KubeConfigOptions, Kubeconfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use trellis_gardener::client::KubeShootClient;
use trellis_restore::{BackupReader, KubeClusterAccess, OutputWriter, RestoreWorkflow};

/// Restore shoots from pre-mutation backups.
#[derive(Parser)]
#[command(name = "trellis-restore")]
struct Args {
    /// Kubeconfig for the Gardener project cluster.
    #[arg(long)]
    garden_kubeconfig: PathBuf,

    /// Kubeconfig for the control plane holding runtime kubeconfig secrets.
    #[arg(long)]
    control_plane_kubeconfig: PathBuf,

    /// Root directory of the backup snapshots.
    #[arg(long)]
    backup_dir: PathBuf,

    /// Directory the results report is written into.
    #[arg(long)]
    output_dir: PathBuf,

    /// File with one runtime id per line.
    #[arg(long)]
    runtime_ids: PathBuf,

    /// Gardener project namespace, e.g. garden-hazel.
    #[arg(long)]
    shoot_namespace: String,

    /// Namespace on the control plane with the kubeconfig secrets.
    #[arg(long, default_value = "trellis-system")]
    control_plane_namespace: String,

    #[arg(long, default_value = "trellis")]
    field_manager: String,

    #[arg(long, default_value_t = 20)]
    timeout_seconds: u64,

    /// Classify and report only; mutate nothing.
    #[arg(long)]
    dry_run: bool,

    /// Leave cluster role bindings out of the restore.
    #[arg(long)]
    skip_crbs: bool,

    /// Leave OpenIDConnect resources out of the restore.
    #[arg(long)]
    skip_oidc: bool,
}

async fn client_from_kubeconfig(path: &Path) -> Result<kube::Client, Box<dyn std::error::Error>> {
    let kubeconfig = Kubeconfig::read_from(path)?;
    let config =
        kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;
    Ok(kube::Client::try_from(config)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let ids_text = std::fs::read_to_string(&args.runtime_ids)?;
    let runtime_ids: Vec<String> = ids_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();
    info!(count = runtime_ids.len(), "read runtime ids");

    let garden = client_from_kubeconfig(&args.garden_kubeconfig).await?;
    let control_plane = client_from_kubeconfig(&args.control_plane_kubeconfig).await?;

    let shoot_client = Arc::new(KubeShootClient::new(
        garden,
        &args.shoot_namespace,
        &args.field_manager,
        Duration::from_secs(args.timeout_seconds),
    ));
    let cluster_access = Arc::new(KubeClusterAccess::new(
        control_plane,
        &args.control_plane_namespace,
    ));
    let reader = BackupReader::new(&args.backup_dir, !args.skip_crbs, !args.skip_oidc);

    let workflow = RestoreWorkflow::new(shoot_client, cluster_access, reader, args.dry_run);
    let results = workflow.run(&runtime_ids).await?;

    let writer = OutputWriter::new(&args.output_dir)?;
    let report = writer.save(&results)?;

    info!(
        succeeded = results.succeeded,
        failed = results.failed,
        skipped = results.skipped,
        update_detected = results.update_detected,
        "restore completed"
    );
    println!(
        "Restore completed. Succeeded: {}, Failed: {}, Skipped: {}, Update detected: {}",
        results.succeeded, results.failed, results.skipped, results.update_detected
    );
    println!("Results saved in: {}", report.display());

    Ok(())
}
