use scribe::{MemberInfo, NodeConfig, NodeOptions, Operation, RoleEvent, ScribeNode};
use slog::Drain;
use std::error::Error;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use tokio::time::{Duration, Instant};

#[tokio::test]
async fn three_node_cluster_elects_highest_id() -> Result<(), Box<dyn Error>> {
    let nodes = boot_cluster(3, 7000, "elect-highest").await?;

    for node in &nodes {
        wait_for_known_leader(node, 2, Duration::from_secs(10)).await;
    }
    assert_eq!(nodes[2].events.current_role(), RoleEvent::Leader);

    Ok(())
}

#[tokio::test]
async fn failover_to_next_highest_id() -> Result<(), Box<dyn Error>> {
    let mut nodes = boot_cluster(3, 7100, "failover").await?;
    for node in &nodes {
        wait_for_known_leader(node, 2, Duration::from_secs(10)).await;
    }

    // Kill the leader; the survivors should settle on node 1.
    let dead_leader = nodes.pop().unwrap();
    drop(dead_leader);

    for node in &nodes {
        wait_for_known_leader(node, 1, Duration::from_secs(10)).await;
    }
    assert_eq!(nodes[1].events.current_role(), RoleEvent::Leader);

    Ok(())
}

#[tokio::test]
async fn operations_replicate_to_every_backup() -> Result<(), Box<dyn Error>> {
    let nodes = boot_cluster(3, 7200, "replication").await?;
    for node in &nodes {
        wait_for_known_leader(node, 2, Duration::from_secs(10)).await;
    }

    let leader = &nodes[2];
    leader.execute(Operation::insert(0, "Hola", "alice")).await?;
    leader.execute(Operation::insert(4, " mundo", "bob")).await?;

    let expected = leader.current_snapshot();
    assert_eq!(expected.content, "Hola mundo");

    for node in &nodes {
        wait_for_content(node, "Hola mundo", Duration::from_secs(10)).await;

        // Converged means equal clocks too: neither side is newer.
        let snapshot = node.current_snapshot();
        assert!(!snapshot.clock.is_newer_than(&expected.clock));
        assert!(!expected.clock.is_newer_than(&snapshot.clock));
    }

    Ok(())
}

#[tokio::test]
async fn backup_forwards_writes_to_the_leader() -> Result<(), Box<dyn Error>> {
    let nodes = boot_cluster(3, 7300, "forwarding").await?;
    for node in &nodes {
        wait_for_known_leader(node, 2, Duration::from_secs(10)).await;
    }

    // Write through a backup; it must land on the leader and replicate back.
    nodes[0].execute(Operation::insert(0, "via backup", "alice")).await?;

    for node in &nodes {
        wait_for_content(node, "via backup", Duration::from_secs(10)).await;
    }

    Ok(())
}

#[tokio::test]
async fn single_node_cluster_edits_alone() -> Result<(), Box<dyn Error>> {
    let nodes = boot_cluster(1, 7400, "single").await?;
    let node = &nodes[0];
    wait_for_known_leader(node, 0, Duration::from_secs(10)).await;

    node.execute(Operation::insert(0, "Hola", "alice")).await?;
    node.execute(Operation::insert(4, " mundo", "bob")).await?;
    assert_eq!(node.current_snapshot().content, "Hola mundo");

    node.execute(Operation::delete(0, 5, "alice")).await?;
    assert_eq!(node.current_snapshot().content, "mundo");

    node.execute(Operation::replace(0, 5, "globo", "bob")).await?;
    assert_eq!(node.current_snapshot().content, "globo");

    Ok(())
}

#[tokio::test]
async fn late_client_gets_snapshot_then_updates() -> Result<(), Box<dyn Error>> {
    let nodes = boot_cluster(1, 7500, "late-client").await?;
    let node = &nodes[0];
    wait_for_known_leader(node, 0, Duration::from_secs(10)).await;

    node.execute(Operation::insert(0, "early edit", "alice")).await?;

    let mut updates = node.subscribe("late-joiner");
    let first = updates.recv().await.expect("initial snapshot");
    assert_eq!(first.content, "early edit");

    node.execute(Operation::insert(10, "!", "alice")).await?;
    let second = updates.recv().await.expect("live update");
    assert_eq!(second.content, "early edit!");

    Ok(())
}

#[tokio::test]
async fn node_restart_recovers_document() -> Result<(), Box<dyn Error>> {
    let data_root = test_data_root("restart");

    let nodes = boot_cluster_in(1, 7600, &data_root).await?;
    wait_for_known_leader(&nodes[0], 0, Duration::from_secs(10)).await;
    nodes[0].execute(Operation::insert(0, "durable", "alice")).await?;
    let before = nodes[0].current_snapshot();
    drop(nodes);

    // Give the old server a moment to release the port.
    tokio::time::sleep(Duration::from_millis(500)).await;

    let reborn = boot_cluster_in(1, 7600, &data_root).await?;
    assert_eq!(reborn[0].current_snapshot(), before);

    Ok(())
}

// ------- Harness --------

async fn boot_cluster(num_members: u32, port_base: u16, tag: &str) -> Result<Vec<ScribeNode>, Box<dyn Error>> {
    boot_cluster_in(num_members, port_base, &test_data_root(tag)).await
}

async fn boot_cluster_in(
    num_members: u32,
    port_base: u16,
    data_root: &Path,
) -> Result<Vec<ScribeNode>, Box<dyn Error>> {
    let mut nodes = Vec::with_capacity(num_members as usize);
    for id in 0..num_members {
        nodes.push(scribe::try_create_node(config(id, num_members, port_base, data_root)).await?);
    }
    Ok(nodes)
}

fn config(id: u32, num_members: u32, port_base: u16, data_root: &Path) -> NodeConfig {
    let cluster_members = (0..num_members).map(|i| member_info(port_base, i)).collect();

    NodeConfig {
        my_node_id: id,
        cluster_members,
        data_directory: data_root.to_path_buf(),
        info_logger: create_root_logger_for_stdout(id),
        options: NodeOptions {
            heartbeat_interval: Some(Duration::from_millis(200)),
            failure_threshold: Some(2),
            peer_rpc_timeout: Some(Duration::from_millis(500)),
            election_probe_timeout: Some(Duration::from_millis(150)),
            leader_announcement_wait: Some(Duration::from_millis(600)),
            ..NodeOptions::default()
        },
    }
}

fn member_info(port_base: u16, id: u32) -> MemberInfo {
    MemberInfo {
        node_id: id,
        ip_addr: Ipv4Addr::from([127, 0, 0, 1]),
        rpc_port: port_base + id as u16,
    }
}

fn test_data_root(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("scribe-cluster-{}-{}", tag, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

async fn wait_for_known_leader(node: &ScribeNode, expected_leader: u32, timeout: Duration) {
    let deadline = Instant::now() + timeout;

    loop {
        let converged = match node.events.current_role() {
            RoleEvent::Leader => true,
            RoleEvent::Backup {
                leader_id: Some(leader),
            } => leader == expected_leader,
            RoleEvent::Backup { leader_id: None } => false,
        };
        if converged {
            return;
        }

        assert!(
            Instant::now() < deadline,
            "Timed out waiting for leader {} to be known",
            expected_leader
        );
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

async fn wait_for_content(node: &ScribeNode, expected: &str, timeout: Duration) {
    let deadline = Instant::now() + timeout;

    while node.current_snapshot().content != expected {
        assert!(
            Instant::now() < deadline,
            "Timed out waiting for content '{}'; have '{}'",
            expected,
            node.current_snapshot().content
        );
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

fn create_root_logger_for_stdout(node_id: u32) -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    slog::Logger::root(drain, slog::o!("NodeId" => node_id))
}
