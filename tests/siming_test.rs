use maa_copilot::rounds::RoundActionModel;
use maa_copilot::siming::builder::{SimingCompiler, build_siming_graph};
use maa_copilot::siming::reader::siming_graph_to_round_actions;
use maa_copilot::siming::templates::{BACK_TEMPLATE, SLOT_ANCHORS, action_templates};
use maa_copilot::siming::{
    ActionDelays, CONFIG_KEY, NodeAction, RESTART_FULL_KEY, RESTART_MANUAL_KEY, Recognition,
    SimingGraph, SimingNode, VICTORY_KEY, dangling_edges, detection_key,
};
use serde_json::json;

fn sample_model() -> RoundActionModel {
    RoundActionModel::from_value(&json!({
        "1": [
            ["1普"],
            ["额外:2大"],
            ["额外:等待:700"],
            ["额外:左侧目标"],
            ["重开:左上角"]
        ],
        "2": [["5下"], ["额外:右侧目标"], ["自定义指令"]],
        "3": [["重开:全灭"]],
        "4": [["3普"]]
    }))
}

/// Follows the single edge out of each node until the round exits.
fn walk(graph: &SimingGraph, round: u32, exit: &str) -> String {
    let mut key = detection_key(round);
    for _ in 0..64 {
        let node = graph.get(&key).unwrap_or_else(|| panic!("missing node {}", key));
        assert_eq!(node.next.len(), 1, "{} should have exactly one edge", key);
        key = node.next[0].clone();
        if key == exit || key == RESTART_FULL_KEY || key == RESTART_MANUAL_KEY {
            return key;
        }
    }
    panic!("round {} never left its chain", round);
}

#[test]
fn test_restart_token_placement() {
    let model = RoundActionModel::from_value(&json!({ "1": [["1普"], ["重开:全灭"]] }));
    let graph = build_siming_graph(&model, &ActionDelays::default());
    assert!(graph["回合1行动1"].next.contains(&RESTART_FULL_KEY.to_string()));
    assert!(!graph.contains_key("回合1行动2"));
}

#[test]
fn test_build_is_byte_identical() {
    let model = sample_model();
    let delays = ActionDelays::default();
    let first = serde_json::to_string(&build_siming_graph(&model, &delays)).unwrap();
    let second = serde_json::to_string(&build_siming_graph(&model, &delays)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_every_round_reaches_a_sink() {
    let graph = build_siming_graph(&sample_model(), &ActionDelays::default());
    assert!(dangling_edges(&graph).is_empty());

    assert_eq!(walk(&graph, 1, &detection_key(2)), RESTART_MANUAL_KEY);
    assert_eq!(walk(&graph, 2, &detection_key(3)), detection_key(3));
    assert_eq!(walk(&graph, 3, &detection_key(4)), RESTART_FULL_KEY);
    assert_eq!(walk(&graph, 4, VICTORY_KEY), VICTORY_KEY);
}

#[test]
fn test_fixed_nodes_are_emitted_once() {
    let graph = build_siming_graph(&RoundActionModel::new(), &ActionDelays::default());
    assert!(graph.contains_key(VICTORY_KEY));
    assert!(graph.contains_key(RESTART_FULL_KEY));
    assert!(graph.contains_key(CONFIG_KEY));

    let manual = &graph[RESTART_MANUAL_KEY];
    assert_eq!(manual.recognition, Some(Recognition::TemplateMatch));
    assert_eq!(manual.template.as_deref(), Some(BACK_TEMPLATE));
    assert_eq!(
        manual.next,
        vec![RESTART_FULL_KEY.to_string(), RESTART_MANUAL_KEY.to_string()]
    );
}

#[test]
fn test_detection_and_action_nodes() {
    let delays = ActionDelays {
        attack: 1000,
        ultimate: 4000,
        defense: 2000,
    };
    let graph = SimingCompiler::new(delays).compile(&sample_model());

    let detect = &graph["检测回合2"];
    assert_eq!(detect.recognition, Some(Recognition::Ocr));
    assert_eq!(detect.expected, Some(vec!["回合2".to_string()]));
    assert_eq!(detect.next, vec!["回合2行动1".to_string()]);

    let click = &graph["回合1行动1"];
    assert_eq!(click.action, Some(NodeAction::Click));
    assert_eq!(click.text_doc.as_deref(), Some("1普"));
    assert_eq!(click.post_delay, Some(1000));
    let target = click.target.unwrap();
    assert_eq!([target[0] + target[2] / 2, target[1] + target[3] / 2], SLOT_ANCHORS[0]);

    let swipe = &graph["回合1行动2"];
    assert_eq!(swipe.action, Some(NodeAction::Swipe));
    assert_eq!(swipe.text_doc.as_deref(), Some("再动2大"));
    assert_eq!(swipe.post_delay, Some(4000));

    let wait = &graph["回合1行动3"];
    assert_eq!(wait.action, Some(NodeAction::DoNothing));
    assert_eq!(wait.post_delay, Some(700));

    assert_eq!(ActionDelays::from_graph(&graph), Some(delays));
}

#[test]
fn test_reverse_recovers_the_model() {
    let model = sample_model();
    let graph = build_siming_graph(&model, &ActionDelays::default());
    assert_eq!(siming_graph_to_round_actions(&graph), model);
}

#[test]
fn test_fifteen_templates_with_calibrated_geometry() {
    let templates = action_templates(&ActionDelays::default());
    assert_eq!(templates.len(), 15);

    let click = &templates["3号位普攻"];
    assert_eq!(click.target, Some([580, 480, 120, 160]));

    let up = &templates["1号位上拉"];
    assert_eq!(up.begin, Some([274, 550, 20, 20]));
    assert_eq!(up.end, Some([274, 430, 20, 20]));
    assert_eq!(up.post_delay, Some(5000));

    let down = &templates["5号位下拉"];
    assert_eq!(down.end, Some([986, 670, 20, 20]));
}

#[test]
fn test_empty_round_links_straight_to_next_detection() {
    let mut model = RoundActionModel::new();
    model.ensure_round(1);
    model.push(2, "1普");
    let graph = build_siming_graph(&model, &ActionDelays::default());
    assert_eq!(graph["检测回合1"].next, vec!["检测回合2".to_string()]);
    assert_eq!(graph["回合2行动1"].next, vec![VICTORY_KEY.to_string()]);
}

#[test]
fn test_delays_round_trip_through_config_node() {
    let delays = ActionDelays {
        attack: 1200,
        ultimate: 4000,
        defense: 800,
    };
    let mut graph = SimingGraph::new();
    graph.insert(CONFIG_KEY.to_string(), delays.config_node());
    assert_eq!(ActionDelays::from_graph(&graph), Some(delays));
}

#[test]
fn test_finds_dangling_edges() {
    let mut graph = SimingGraph::new();
    let mut node = SimingNode::default();
    node.push_next("不存在");
    node.push_next(VICTORY_KEY);
    graph.insert("a".to_string(), node);
    graph.insert(VICTORY_KEY.to_string(), SimingNode::default());
    assert_eq!(
        dangling_edges(&graph),
        vec![("a".to_string(), "不存在".to_string())]
    );
}

#[test]
fn test_reader_falls_back_to_action_name_without_text_doc() {
    let mut graph = SimingGraph::new();
    graph.insert(
        "回合1行动1".to_string(),
        SimingNode {
            action: Some(NodeAction::Click),
            ..Default::default()
        },
    );
    let model = siming_graph_to_round_actions(&graph);
    assert_eq!(model.round(1), Some(&["Click".to_string()][..]));
}

#[test]
fn test_reader_orders_by_numeric_round_and_action() {
    let mut graph = SimingGraph::new();
    let nodes = [("回合10行动1", "1普"), ("回合2行动2", "2大"), ("回合2行动1", "3下")];
    for (key, doc) in nodes {
        graph.insert(
            key.to_string(),
            SimingNode {
                text_doc: Some(doc.to_string()),
                ..Default::default()
            },
        );
    }
    let model = siming_graph_to_round_actions(&graph);
    let flat: Vec<(u32, Vec<String>)> =
        model.rounds().map(|(r, t)| (r, t.to_vec())).collect();
    assert_eq!(
        flat,
        vec![
            (2, vec!["3下".to_string(), "2大".to_string()]),
            (10, vec!["1普".to_string()]),
        ]
    );
}
