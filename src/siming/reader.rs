//! Siming graph back to a round action model.
//!
//! Graphs say more than tokens can, so this is best effort. Node keys give
//! the round and order, `text_doc` gives the token, and edges into the
//! restart nodes give the restart tokens.

use crate::rounds::RoundActionModel;
use crate::rounds::token::{
    DEFAULT_WAIT_MS, EXTRA_PREFIX, RESTART_FULL, RESTART_MANUAL, RESTART_PREFIX, WAIT_PREFIX,
};
use crate::siming::{RESTART_FULL_KEY, RESTART_MANUAL_KEY, SimingGraph, SimingNode};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static ACTION_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^回合(\d+)行动(\d+)$").expect("action key regex"));

static DETECTION_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^检测回合(\d+)$").expect("detection key regex"));

static BASIC_DOC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d[普大下]$").expect("basic doc regex"));

pub fn siming_graph_to_round_actions(graph: &SimingGraph) -> RoundActionModel {
    let mut model = RoundActionModel::new();

    // action nodes in (round, order) order
    let mut action_nodes: Vec<(u32, u32, &SimingNode)> = graph
        .iter()
        .filter_map(|(key, node)| {
            let caps = ACTION_KEY_RE.captures(key)?;
            let round = caps[1].parse().ok()?;
            let order = caps[2].parse().ok()?;
            Some((round, order, node))
        })
        .collect();
    action_nodes.sort_by_key(|(round, order, _)| (*round, *order));

    for (round, _, node) in &action_nodes {
        match recover_token(node) {
            Some(token) => model.push(*round, token),
            None => debug!(round, "Siming node carries neither text_doc nor action, skipped"),
        }
    }

    // a restart on the detection node goes first in its round
    for (key, node) in graph {
        let Some(round) = DETECTION_KEY_RE
            .captures(key)
            .and_then(|caps| caps[1].parse::<u32>().ok())
        else {
            continue;
        };
        if let Some(token) = restart_token(node) {
            model.push_front(round, token);
        }
    }

    // a restart on an action node goes last
    for (round, _, node) in &action_nodes {
        if let Some(token) = restart_token(node) {
            model.push(*round, token);
        }
    }

    model.normalized()
}

fn recover_token(node: &SimingNode) -> Option<String> {
    let doc = node.text_doc.as_deref().map(str::trim).filter(|d| !d.is_empty());
    let Some(doc) = doc else {
        return node.action.as_ref().map(|a| a.as_str().to_string());
    };

    if BASIC_DOC_RE.is_match(doc) {
        return Some(doc.to_string());
    }
    if let Some(rest) = doc.strip_prefix("再动") {
        return Some(format!("{}{}", EXTRA_PREFIX, rest));
    }
    let token = match doc {
        "等待" => format!(
            "{}{}{}",
            EXTRA_PREFIX,
            WAIT_PREFIX,
            node.post_delay.unwrap_or(DEFAULT_WAIT_MS)
        ),
        "左侧目标" | "右侧目标" => format!("{}{}", EXTRA_PREFIX, doc),
        other => other.to_string(),
    };
    Some(token)
}

fn restart_token(node: &SimingNode) -> Option<String> {
    if node.next.iter().any(|n| n == RESTART_FULL_KEY) {
        Some(format!("{}{}", RESTART_PREFIX, RESTART_FULL))
    } else if node.next.iter().any(|n| n == RESTART_MANUAL_KEY) {
        Some(format!("{}{}", RESTART_PREFIX, RESTART_MANUAL))
    } else {
        None
    }
}
