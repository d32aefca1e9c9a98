use crate::cluster::membership::{NodeId, NodeMetadata};
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

/// Parse the static membership file: one `id=host:port` entry per line,
/// `#`-comments and blank lines ignored. Malformed lines are an error; a
/// half-read cluster is worse than no cluster.
pub(crate) fn parse_cluster_config(text: &str) -> Result<Vec<NodeMetadata>, ClusterFileError> {
    let mut members = Vec::new();

    for (line_index, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        members.push(parse_member_line(line).map_err(|reason| ClusterFileError::MalformedLine {
            line_number: line_index + 1,
            line: line.to_string(),
            reason,
        })?);
    }

    Ok(members)
}

pub(crate) fn load_cluster_file(path: &Path) -> Result<Vec<NodeMetadata>, ClusterFileError> {
    let text = fs::read_to_string(path).map_err(|e| ClusterFileError::Unreadable {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_cluster_config(&text)
}

fn parse_member_line(line: &str) -> Result<NodeMetadata, &'static str> {
    let mut id_and_addr = line.splitn(2, '=');
    let id_part = id_and_addr.next().unwrap_or("");
    let addr_part = id_and_addr.next().ok_or("missing '='")?;

    let id = id_part.trim().parse::<u32>().map_err(|_| "node id is not a u32")?;

    let mut host_and_port = addr_part.rsplitn(2, ':');
    let port_part = host_and_port.next().unwrap_or("");
    let host_part = host_and_port.next().ok_or("missing ':' before port")?;

    let ip_addr = host_part.trim().parse::<Ipv4Addr>().map_err(|_| "host is not an IPv4 address")?;
    let rpc_port = port_part.trim().parse::<u16>().map_err(|_| "port is not a u16")?;

    Ok(NodeMetadata {
        id: NodeId::new(id),
        ip_addr,
        rpc_port,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ClusterFileError {
    #[error("Can't read cluster file '{path}': {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },
    #[error("Cluster file line {line_number} ('{line}') is malformed: {reason}")]
    MalformedLine {
        line_number: usize,
        line: String,
        reason: &'static str,
    },
}
