//! Export tests for HTML (note tree → HTML), including trips back through the parser

use crate::common::{block, cell, header_cell, item, marked, row, task};
use note_babel::{
    deserialize_html, is_normalized, serialize_html, Element, ElementType, Mark, Node,
    Substitutions,
};

fn html_round_trip(nodes: &[Node]) -> Vec<Node> {
    let html = serialize_html(nodes, &Substitutions::new());
    deserialize_html(&html, &mut Substitutions::new())
}

#[test]
fn test_simple_blocks() {
    let nodes = vec![
        block(ElementType::HeadingTwo, vec![Node::text("Title")]),
        Node::paragraph("a < b & c"),
    ];
    assert_eq!(
        serialize_html(&nodes, &Substitutions::new()),
        "<h2>Title</h2><p>a &lt; b &amp; c</p>"
    );
}

#[test]
fn test_round_trip_document() {
    let link: Node = Element::new(ElementType::Link, vec![Node::text("docs")])
        .with_url("https://example.com/docs")
        .with_title(Some("Docs".to_string()))
        .into();
    let image: Node = Element::new(ElementType::Image, vec![Node::text("logo")])
        .with_url("https://example.com/logo.png")
        .into();
    let nodes = vec![
        block(ElementType::HeadingOne, vec![Node::text("Notes")]),
        block(
            ElementType::Paragraph,
            vec![
                Node::text("see "),
                link,
                Node::text(" and "),
                marked("mind", &[Mark::Italic, Mark::Underline]),
                Node::text("\nnext line"),
            ],
        ),
        block(ElementType::Quote, vec![Node::paragraph("quoted")]),
        block(
            ElementType::NumberedList,
            vec![item(vec![
                Node::paragraph("outer"),
                block(
                    ElementType::TaskList,
                    vec![
                        task(true, vec![Node::text("done")]),
                        task(false, vec![Node::text("open")]),
                    ],
                ),
            ])],
        ),
        block(
            ElementType::Table,
            vec![
                row(vec![header_cell("K"), header_cell("V")]),
                row(vec![cell("x"), cell("1")]),
            ],
        ),
        block(ElementType::Code, vec![Node::text("  indented\n<tag>")]),
        image,
        Node::empty(ElementType::ThematicBreak),
    ];
    assert!(is_normalized(&nodes));
    assert_eq!(html_round_trip(&nodes), nodes);
}

#[test]
fn test_padded_header_row_keeps_th() {
    let html = serialize_html(
        &deserialize_html(
            "<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td><td>3</td></tr></table>",
            &mut Substitutions::new(),
        ),
        &Substitutions::new(),
    );
    assert_eq!(
        html,
        concat!(
            "<table><tr><th>A</th><th>B</th><th></th></tr>",
            "<tr><td>1</td><td>2</td><td>3</td></tr></table>",
        )
    );
}

#[test]
fn test_link_around_paragraph_saves_stably() {
    let first = serialize_html(
        &deserialize_html(
            "<a href=\"https://x.example\"><p>a</p>b</a>",
            &mut Substitutions::new(),
        ),
        &Substitutions::new(),
    );
    assert_eq!(first, "<p>a</p><p><a href=\"https://x.example\">b</a></p>");
    let second = serialize_html(
        &deserialize_html(&first, &mut Substitutions::new()),
        &Substitutions::new(),
    );
    assert_eq!(second, first);
}

#[test]
fn test_line_breaks_written_as_void_br() {
    let html = serialize_html(&[Node::paragraph("a\nb")], &Substitutions::new());
    assert_eq!(html, "<p>a<br>b</p>");
    for input in ["<p>a<br>b</p>", "<p>a<br />b</p>"] {
        assert_eq!(
            deserialize_html(input, &mut Substitutions::new()),
            vec![Node::paragraph("a\nb")]
        );
    }
}

#[test]
fn test_blob_image_resolution() {
    let image: Node = Element::new(ElementType::Image, vec![Node::text("pic")])
        .with_url("blob:https://app.test/77")
        .into();
    let nodes = vec![image];

    let unresolved = serialize_html(&nodes, &Substitutions::new());
    assert_eq!(unresolved, "");

    let substitutions: Substitutions = [(
        "blob:https://app.test/77".to_string(),
        "data:image/png;base64,AAAA".to_string(),
    )]
    .into_iter()
    .collect();
    let resolved = serialize_html(&nodes, &substitutions);
    assert_eq!(
        resolved,
        "<img src=\"data:image/png;base64,AAAA\" alt=\"pic\">"
    );
}
