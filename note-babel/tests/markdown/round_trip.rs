//! Markdown round trips
//!
//! A normalized tree written as Markdown and read back must come out unchanged.

use crate::common::{
    block, cell, header_cell, item, markdown_round_trip, marked, row, task,
};
use note_babel::{is_normalized, Element, ElementType, Mark, Node};

fn assert_round_trip(nodes: Vec<Node>) {
    assert!(is_normalized(&nodes), "fixture must be normalized: {nodes:#?}");
    let back = markdown_round_trip(&nodes);
    assert_eq!(
        back,
        nodes,
        "markdown was:\n{}",
        note_babel::serialize_markdown(&nodes, false)
    );
}

fn para(children: Vec<Node>) -> Node {
    block(ElementType::Paragraph, children)
}

#[test]
fn test_empty_document() {
    assert_round_trip(vec![Node::paragraph("")]);
}

#[test]
fn test_paragraphs_and_headings() {
    assert_round_trip(vec![
        block(ElementType::HeadingOne, vec![Node::text("Top")]),
        Node::paragraph("First paragraph."),
        block(ElementType::HeadingTwo, vec![Node::text("Middle")]),
        Node::paragraph("Second paragraph."),
        block(ElementType::HeadingThree, vec![Node::text("Bottom")]),
    ]);
}

#[test]
fn test_hard_break_inside_paragraph() {
    assert_round_trip(vec![Node::paragraph("line one\nline two")]);
}

#[test]
fn test_emphasis() {
    assert_round_trip(vec![para(vec![
        Node::text("plain "),
        marked("italic", &[Mark::Italic]),
        Node::text(" and "),
        marked("bold", &[Mark::Bold]),
        Node::text(" and "),
        marked("both", &[Mark::Bold, Mark::Italic]),
        Node::text(" end"),
    ])]);
}

#[test]
fn test_inline_code_with_backticks() {
    assert_round_trip(vec![para(vec![
        Node::text("run "),
        marked("a`b", &[Mark::Code]),
        Node::text(" then "),
        marked("`edge", &[Mark::Code]),
        Node::text(" done"),
    ])]);
}

#[test]
fn test_superscript_and_subscript() {
    assert_round_trip(vec![para(vec![
        Node::text("H"),
        marked("2", &[Mark::Subscript]),
        Node::text("O and E = mc"),
        marked("2", &[Mark::Superscript]),
    ])]);
}

#[test]
fn test_underline_and_strikethrough() {
    assert_round_trip(vec![para(vec![
        Node::text("an "),
        marked("underlined", &[Mark::Underline]),
        Node::text(" and a "),
        marked("struck", &[Mark::Strikethrough]),
        Node::text(" word"),
    ])]);
}

#[test]
fn test_deleted_and_inserted() {
    assert_round_trip(vec![para(vec![
        Node::text("it was "),
        marked("old", &[Mark::Deleted]),
        Node::text(", now "),
        marked("new", &[Mark::Inserted]),
    ])]);
}

#[test]
fn test_underline_around_italic() {
    assert_round_trip(vec![para(vec![
        Node::text("x "),
        marked("both", &[Mark::Underline, Mark::Italic]),
        Node::text(" y"),
    ])]);
}

#[test]
fn test_nested_block_quotes() {
    assert_round_trip(vec![block(
        ElementType::Quote,
        vec![
            Node::paragraph("outer"),
            block(ElementType::Quote, vec![Node::paragraph("inner")]),
            Node::paragraph("outer again"),
        ],
    )]);
}

#[test]
fn test_simple_lists() {
    assert_round_trip(vec![
        block(
            ElementType::BulletedList,
            vec![item(vec![Node::text("one")]), item(vec![Node::text("two")])],
        ),
        Node::paragraph("between"),
        block(
            ElementType::NumberedList,
            vec![item(vec![Node::text("first")]), item(vec![Node::text("second")])],
        ),
    ]);
}

#[test]
fn test_task_list() {
    assert_round_trip(vec![block(
        ElementType::TaskList,
        vec![
            task(true, vec![Node::text("done")]),
            task(false, vec![Node::text("todo")]),
        ],
    )]);
}

#[test]
fn test_sequence_list() {
    assert_round_trip(vec![block(
        ElementType::SequenceList,
        vec![
            task(true, vec![Node::text("step one")]),
            task(false, vec![Node::text("step two")]),
        ],
    )]);
}

#[test]
fn test_numbered_list_nested_in_task_list() {
    assert_round_trip(vec![block(
        ElementType::TaskList,
        vec![
            task(
                true,
                vec![
                    Node::paragraph("parent"),
                    block(
                        ElementType::NumberedList,
                        vec![item(vec![Node::text("first")]), item(vec![Node::text("second")])],
                    ),
                ],
            ),
            task(false, vec![Node::text("sibling")]),
        ],
    )]);
}

#[test]
fn test_task_list_nested_in_numbered_list() {
    assert_round_trip(vec![block(
        ElementType::NumberedList,
        vec![item(vec![
            Node::paragraph("parent"),
            block(
                ElementType::TaskList,
                vec![
                    task(false, vec![Node::text("sub one")]),
                    task(true, vec![Node::text("sub two")]),
                ],
            ),
        ])],
    )]);
}

#[test]
fn test_adjacent_lists_stay_separate() {
    assert_round_trip(vec![
        block(ElementType::BulletedList, vec![item(vec![Node::text("a")])]),
        block(ElementType::BulletedList, vec![item(vec![Node::text("b")])]),
        block(ElementType::BulletedList, vec![item(vec![Node::text("c")])]),
    ]);
}

#[test]
fn test_list_inside_quote() {
    assert_round_trip(vec![block(
        ElementType::Quote,
        vec![block(
            ElementType::BulletedList,
            vec![item(vec![Node::text("quoted")]), item(vec![Node::text("items")])],
        )],
    )]);
}

#[test]
fn test_table() {
    assert_round_trip(vec![block(
        ElementType::Table,
        vec![
            row(vec![header_cell("Name"), header_cell("Qty")]),
            row(vec![cell("apples"), cell("3")]),
            row(vec![cell("a|b"), cell("two\nlines")]),
        ],
    )]);
}

#[test]
fn test_table_inside_quote() {
    assert_round_trip(vec![block(
        ElementType::Quote,
        vec![block(
            ElementType::Table,
            vec![
                row(vec![header_cell("A"), header_cell("B")]),
                row(vec![cell("1"), cell("2")]),
            ],
        )],
    )]);
}

#[test]
fn test_images() {
    let plain: Node = Element::new(ElementType::Image, vec![Node::text("a cat")])
        .with_url("https://example.com/cat.png")
        .into();
    let titled: Node = Element::new(ElementType::Image, vec![Node::text("a dog")])
        .with_url("https://example.com/dog.png")
        .with_title(Some("Rex".to_string()))
        .into();
    assert_round_trip(vec![plain, Node::paragraph("caption"), titled]);
}

#[test]
fn test_links() {
    let link: Node = Element::new(ElementType::Link, vec![Node::text("the site")])
        .with_url("https://example.com/page")
        .into();
    assert_round_trip(vec![para(vec![
        Node::text("see "),
        link,
        Node::text(" for more"),
    ])]);
}

#[test]
fn test_thematic_break() {
    assert_round_trip(vec![
        Node::paragraph("above"),
        Node::empty(ElementType::ThematicBreak),
        Node::paragraph("below"),
    ]);
}

#[test]
fn test_code_blocks() {
    assert_round_trip(vec![
        block(
            ElementType::Code,
            vec![Node::text("fn main() {\n    println!(\"hi\");\n}")],
        ),
        block(
            ElementType::Code,
            vec![Node::text("a fence inside:\n```\nstill code")],
        ),
    ]);
}
