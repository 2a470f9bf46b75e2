use crate::common::{block, item};
use note_babel::note::extract_keywords;
use note_babel::{ElementType, Node};

#[test]
fn test_prefix_words_collapse_into_longer_word() {
    let nodes = vec![Node::paragraph("cat caterpillar")];
    assert_eq!(extract_keywords(&nodes), vec!["CATERPILLAR"]);
}

#[test]
fn test_stop_words_and_single_letters_dropped() {
    let nodes = vec![Node::paragraph("The fox and a dog x")];
    assert_eq!(extract_keywords(&nodes), vec!["DOG", "FOX"]);
}

#[test]
fn test_words_do_not_join_across_blocks() {
    let nodes = vec![
        Node::paragraph("rain"),
        block(ElementType::BulletedList, vec![item(vec![Node::text("bow")])]),
    ];
    assert_eq!(extract_keywords(&nodes), vec!["BOW", "RAIN"]);
}

#[test]
fn test_inner_punctuation_kept() {
    let nodes = vec![Node::paragraph("don't re-use snake_case")];
    assert_eq!(
        extract_keywords(&nodes),
        vec!["DON'T", "RE-USE", "SNAKE_CASE"]
    );
}
