//! Import tests for HTML (HTML → note tree)

use crate::common::{block, cell, header_cell, item, marked, row, task};
use note_babel::{deserialize_html, is_normalized, ElementType, Mark, Node, Substitutions};

fn parse(html: &str) -> Vec<Node> {
    deserialize_html(html, &mut Substitutions::new())
}

#[test]
fn test_full_document_body() {
    let nodes = parse(concat!(
        "<!DOCTYPE html><html><head><title>ignored</title><style>p{}</style></head><body>",
        "<h1>Trip</h1>",
        "<p>Pack <strong>light</strong>.</p>",
        "<ul><li>passport</li><li>charger</li></ul>",
        "<hr>",
        "</body></html>",
    ));
    assert_eq!(
        nodes,
        vec![
            block(ElementType::HeadingOne, vec![Node::text("Trip")]),
            block(
                ElementType::Paragraph,
                vec![
                    Node::text("Pack "),
                    marked("light", &[Mark::Bold]),
                    Node::text("."),
                ]
            ),
            block(
                ElementType::BulletedList,
                vec![
                    item(vec![Node::text("passport")]),
                    item(vec![Node::text("charger")]),
                ]
            ),
            Node::empty(ElementType::ThematicBreak),
        ]
    );
    assert!(is_normalized(&nodes));
}

#[test]
fn test_fragment_with_bare_text_is_wrapped() {
    let nodes = parse("loose text<p>then a paragraph</p>");
    assert_eq!(
        nodes,
        vec![
            Node::paragraph("loose text"),
            Node::paragraph("then a paragraph"),
        ]
    );
}

#[test]
fn test_empty_input() {
    assert_eq!(parse(""), vec![Node::paragraph("")]);
}

#[test]
fn test_table_with_header_row() {
    let nodes = parse(
        "<table><tr><th>Name</th><th>Age</th></tr><tr><td>Ada</td><td>36</td></tr></table>",
    );
    assert_eq!(
        nodes,
        vec![block(
            ElementType::Table,
            vec![
                row(vec![header_cell("Name"), header_cell("Age")]),
                row(vec![cell("Ada"), cell("36")]),
            ]
        )]
    );
}

#[test]
fn test_ragged_table_is_padded() {
    let nodes = parse("<table><tr><td>a</td><td>b</td></tr><tr><td>c</td></tr></table>");
    let rows = nodes[0].children();
    assert_eq!(rows[1].children().len(), 2);
    assert_eq!(rows[1].children()[1], Node::empty(ElementType::TableCell));
}

#[test]
fn test_padding_keeps_header_row() {
    let nodes = parse(concat!(
        "<table><tr><th>A</th><th>B</th></tr>",
        "<tr><td>1</td><td>2</td><td>3</td></tr></table>",
    ));
    let rows = nodes[0].children();
    assert_eq!(
        rows[0],
        row(vec![header_cell("A"), header_cell("B"), header_cell("")])
    );
    assert!(rows[0].as_element().unwrap().is_header_row());
}

#[test]
fn test_empty_trailing_header_cell_stays_bold() {
    let nodes = parse("<table><tr><th>A</th><th></th></tr><tr><td>1</td><td>2</td></tr></table>");
    assert!(nodes[0].children()[0].as_element().unwrap().is_header_row());
}

#[test]
fn test_blocks_in_link_do_not_nest_paragraphs() {
    let nodes = parse("<a href=\"https://x.example\"><p>a</p>b</a>");
    let link = Node::Element(
        note_babel::Element::new(ElementType::Link, vec![Node::text("b")])
            .with_url("https://x.example"),
    );
    assert_eq!(
        nodes,
        vec![
            Node::paragraph("a"),
            block(ElementType::Paragraph, vec![link]),
        ]
    );
    assert!(is_normalized(&nodes));
}

#[test]
fn test_task_list_from_checkboxes() {
    let nodes = parse(concat!(
        "<ul class=\"contains-task-list\">",
        "<li><input type=\"checkbox\" checked>call</li>",
        "<li><input type=\"checkbox\">write</li>",
        "</ul>",
    ));
    assert_eq!(
        nodes,
        vec![block(
            ElementType::TaskList,
            vec![
                task(true, vec![Node::text("call")]),
                task(false, vec![Node::text("write")]),
            ]
        )]
    );
}

#[test]
fn test_blob_images_are_registered() {
    let mut substitutions = Substitutions::new();
    let nodes = deserialize_html(
        "<p>before</p><img src=\"blob:https://app.test/1f2e\" alt=\"photo\">",
        &mut substitutions,
    );
    assert!(nodes[1].is_kind(ElementType::Image));
    assert_eq!(
        substitutions.pending().collect::<Vec<_>>(),
        vec!["blob:https://app.test/1f2e"]
    );
}

#[test]
fn test_inline_marks_from_synonyms() {
    let nodes = parse("<p><b>b</b><i>i</i><kbd>k</kbd><strike>s</strike></p>");
    assert_eq!(
        nodes[0].children(),
        &[
            marked("b", &[Mark::Bold]),
            marked("i", &[Mark::Italic]),
            marked("k", &[Mark::Code]),
            marked("s", &[Mark::Strikethrough]),
        ]
    );
}
