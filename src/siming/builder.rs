use crate::rounds::RoundActionModel;
use crate::rounds::token::Token;
use crate::siming::templates::{self, template_key};
use crate::siming::{
    ActionDelays, CONFIG_KEY, RESTART_FULL_KEY, RESTART_MANUAL_KEY, SimingGraph, SimingNode,
    VICTORY_KEY, action_key, detection_key,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Compiles a round action model into a Siming graph.
///
/// Compiling the same model twice gives identical graphs.
pub struct SimingCompiler {
    delays: ActionDelays,
    templates: BTreeMap<String, SimingNode>,
}

impl SimingCompiler {
    pub fn new(delays: ActionDelays) -> Self {
        Self {
            delays,
            templates: templates::action_templates(&delays),
        }
    }

    pub fn compile(&self, model: &RoundActionModel) -> SimingGraph {
        let mut graph = SimingGraph::new();
        let rounds: Vec<(u32, &[String])> = model.rounds().collect();

        for (idx, (round, tokens)) in rounds.iter().enumerate() {
            // the last round exits to victory, every other round to the next detection node
            let exit_key = rounds
                .get(idx + 1)
                .map(|(next_round, _)| detection_key(*next_round))
                .unwrap_or_else(|| VICTORY_KEY.to_string());

            self.compile_round(&mut graph, *round, tokens, &exit_key);
        }

        // fixed nodes are emitted once, used or not
        for (key, node) in templates::fixed_nodes() {
            graph.insert(key.to_string(), node);
        }
        graph.insert(CONFIG_KEY.to_string(), self.delays.config_node());

        debug!(
            rounds = rounds.len(),
            nodes = graph.len(),
            "Compiled round actions into siming graph"
        );
        graph
    }

    fn compile_round(
        &self,
        graph: &mut SimingGraph,
        round: u32,
        tokens: &[String],
        exit_key: &str,
    ) {
        let head_key = detection_key(round);
        graph.insert(head_key.clone(), templates::detection_node(round));

        // node that still needs an outgoing edge
        let mut cursor = head_key;
        let mut emitted = 0usize;

        for (pos, raw) in tokens.iter().enumerate() {
            let token = Token::parse(raw.trim());

            if token.is_restart() {
                let target = match token {
                    Token::RestartManual => RESTART_MANUAL_KEY,
                    _ => RESTART_FULL_KEY,
                };
                link(graph, &cursor, target);
                let dropped = tokens.len() - pos - 1;
                if dropped > 0 {
                    warn!(
                        round,
                        dropped,
                        "Tokens after a restart are unreachable and were dropped"
                    );
                }
                return;
            }

            emitted += 1;
            let key = action_key(round, emitted);
            graph.insert(key.clone(), self.action_node(&token));
            link(graph, &cursor, &key);
            cursor = key;
        }

        link(graph, &cursor, exit_key);
    }

    fn action_node(&self, token: &Token) -> SimingNode {
        let mut node = match token {
            Token::Basic { slot, mv } | Token::Again { slot, mv } => self
                .templates
                .get(&template_key(*slot, *mv))
                .cloned()
                .unwrap_or_default(),
            Token::Wait { ms } => templates::wait_node(*ms),
            Token::SwitchLeft => templates::switch_node(true),
            Token::SwitchRight => templates::switch_node(false),
            Token::RestartFull | Token::RestartManual | Token::Unknown(_) => {
                SimingNode::default()
            }
        };
        node.text_doc = Some(text_doc(token));
        node
    }
}

/// The reader recovers tokens from this.
fn text_doc(token: &Token) -> String {
    match token {
        Token::Basic { slot, mv } => format!("{}{}", slot, mv.as_char()),
        Token::Again { slot, mv } => format!("再动{}{}", slot, mv.as_char()),
        Token::Wait { .. } => "等待".to_string(),
        Token::SwitchLeft => "左侧目标".to_string(),
        Token::SwitchRight => "右侧目标".to_string(),
        other => other.to_string(),
    }
}

fn link(graph: &mut SimingGraph, from: &str, to: &str) {
    if let Some(node) = graph.get_mut(from) {
        node.push_next(to);
    }
}

pub fn build_siming_graph(model: &RoundActionModel, delays: &ActionDelays) -> SimingGraph {
    SimingCompiler::new(*delays).compile(model)
}
