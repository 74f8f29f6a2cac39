use maa_copilot::editor::history::{Checkpoint, History};

fn history(limit: usize) -> History<String> {
    History::new(Checkpoint::new(String::new(), "init"), limit)
}

fn typed(text: &str, key: Option<&str>) -> impl FnOnce(&String) -> Option<Checkpoint<String>> {
    let text = text.to_string();
    let key = key.map(str::to_string);
    move |_| {
        let checkpoint = Checkpoint::new(text, "输入");
        Some(match key {
            Some(key) => checkpoint.squash(key),
            None => checkpoint,
        })
    }
}

#[test]
fn test_same_squash_key_collapses_into_one_step() {
    let mut history = history(20);
    assert!(history.commit(typed("a", Some("title"))));
    assert!(history.commit(typed("ab", Some("title"))));
    assert!(history.commit(typed("abc", Some("title"))));

    assert_eq!(history.len(), 2);
    assert_eq!(history.state(), "abc");
    assert!(history.undo());
    assert_eq!(history.state(), "");
    assert!(!history.can_undo());
}

#[test]
fn test_different_or_missing_keys_make_separate_steps() {
    let mut history = history(20);
    history.commit(typed("a", Some("title")));
    history.commit(typed("ab", Some("details")));
    history.commit(typed("abc", None));
    history.commit(typed("abcd", None));
    history.commit(typed("abcde", Some("")));
    history.commit(typed("abcdef", Some("")));
    assert_eq!(history.len(), 7);
}

#[test]
fn test_noop_commits_are_discarded() {
    let mut history = history(20);
    assert!(!history.commit(|_| None));
    assert!(!history.commit(|current| Some(Checkpoint::new(current.clone(), "same"))));
    assert_eq!(history.len(), 1);
}

#[test]
fn test_limit_evicts_oldest_entries() {
    let limit = 5;
    let k = 3;
    let mut history = history(limit);
    for i in 0..(limit + k) {
        history.commit(typed(&i.to_string(), None));
    }
    assert_eq!(history.len(), limit);
    assert_eq!(history.state(), &(limit + k - 1).to_string());

    let mut steps = 0;
    while history.undo() {
        steps += 1;
    }
    assert_eq!(steps, limit - 1);
    // the oldest kept state is the one after commit k
    assert_eq!(history.state(), &(k).to_string());
}

#[test]
fn test_undo_redo_boundaries_are_noops() {
    let mut history = history(20);
    assert!(!history.undo());
    assert!(!history.redo());

    history.commit(typed("a", None));
    history.commit(typed("b", None));
    assert!(history.undo());
    assert!(history.undo());
    assert!(!history.undo());
    assert!(history.redo());
    assert_eq!(history.state(), "a");

    // committing after an undo drops the redo branch
    history.commit(typed("c", None));
    assert!(!history.can_redo());
    assert_eq!(history.labels().count(), 3);
}

#[test]
fn test_reset_clears_everything() {
    let mut history = history(20);
    history.commit(typed("a", None));
    history.commit(typed("b", None));
    history.reset(Checkpoint::new("新文档".to_string(), "导入"));
    assert_eq!(history.len(), 1);
    assert!(!history.can_undo());
    assert!(!history.can_redo());
    assert_eq!(history.current().label, "导入");
}
