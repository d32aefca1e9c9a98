use chrono::Utc;
use scribe::{NodeConfig, NodeOptions, RoleEvent};
use slog::Drain;
use std::error::Error;
use std::fs::OpenOptions;
use std::path::PathBuf;

/// Node binary: `scribe <node-id> <cluster-file> [data-root]`.
///
/// Runs one cluster node until ctrl-c, logging role changes. Set
/// `SCRIBE_LOG_DIR` to log to a timestamped file instead of stdout.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let my_node_id: u32 = args
        .next()
        .ok_or("usage: scribe <node-id> <cluster-file> [data-root]")?
        .parse()?;
    let cluster_file = PathBuf::from(args.next().ok_or("usage: scribe <node-id> <cluster-file> [data-root]")?);
    let data_root = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("./scribe-data"));

    let logger = match std::env::var_os("SCRIBE_LOG_DIR") {
        Some(dir) => create_root_logger_for_file(PathBuf::from(dir), my_node_id)?,
        None => create_root_logger_for_stdout(my_node_id),
    };

    let cluster_members = scribe::load_cluster_file(&cluster_file)?;
    slog::info!(logger, "Starting node {} of a {}-node cluster", my_node_id, cluster_members.len());

    let mut node = scribe::try_create_node(NodeConfig {
        my_node_id,
        cluster_members,
        data_directory: data_root,
        info_logger: logger.clone(),
        options: NodeOptions::default(),
    })
    .await?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                slog::info!(logger, "Shutting down");
                return Ok(());
            }
            event = node.events.next_event() => match event {
                Some(RoleEvent::Leader) => slog::info!(logger, "This node is now the leader"),
                Some(RoleEvent::Backup { leader_id: Some(id) }) => {
                    slog::info!(logger, "Following leader {}", id)
                }
                Some(RoleEvent::Backup { leader_id: None }) => {
                    slog::info!(logger, "No leader known, election pending")
                }
                None => return Ok(()),
            },
        }
    }
}

fn create_root_logger_for_file(directory: PathBuf, node_id: u32) -> Result<slog::Logger, Box<dyn Error>> {
    std::fs::create_dir_all(&directory)?;
    let now = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    let log_path = directory.join(format!("node-{}_{}.log", node_id, now));
    let file = OpenOptions::new().create(true).write(true).truncate(true).open(log_path)?;

    let decorator = slog_term::PlainDecorator::new(file);
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    Ok(slog::Logger::root(drain, slog::o!("NodeId" => node_id)))
}

fn create_root_logger_for_stdout(node_id: u32) -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    slog::Logger::root(drain, slog::o!("NodeId" => node_id))
}
