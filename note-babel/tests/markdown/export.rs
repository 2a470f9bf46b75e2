//! Export tests for Markdown (note tree → Markdown)

use crate::common::{block, cell, header_cell, item, marked, row, task};
use note_babel::{serialize_markdown, Element, ElementType, Mark, Node};

#[test]
fn test_full_document() {
    let nodes = vec![
        block(ElementType::HeadingOne, vec![Node::text("Groceries")]),
        block(
            ElementType::Paragraph,
            vec![
                Node::text("Buy "),
                marked("fresh", &[Mark::Bold]),
                Node::text(" bread."),
            ],
        ),
        block(
            ElementType::TaskList,
            vec![
                task(true, vec![Node::text("milk")]),
                task(false, vec![Node::text("eggs")]),
            ],
        ),
        block(ElementType::Quote, vec![Node::paragraph("keep receipts")]),
        block(ElementType::Code, vec![Node::text("let x = 1;")]),
        Node::empty(ElementType::ThematicBreak),
        block(
            ElementType::Table,
            vec![
                row(vec![header_cell("Item"), header_cell("Price")]),
                row(vec![cell("bread"), cell("2")]),
            ],
        ),
    ];

    let expected = concat!(
        "# Groceries\n",
        "\n",
        "Buy **fresh** bread.\n",
        "\n",
        "*   [x] milk\n",
        "*   [ ] eggs\n",
        "\n",
        "> keep receipts\n",
        "\n",
        "```\n",
        "let x = 1;\n",
        "```\n",
        "\n",
        "---------\n",
        "\n",
        "| Item | Price |\n",
        "| --- | --- |\n",
        "| bread | 2 |\n",
    );
    assert_eq!(serialize_markdown(&nodes, false), expected);
}

#[test]
fn test_nested_list_indentation() {
    let nodes = vec![block(
        ElementType::NumberedList,
        vec![item(vec![
            Node::paragraph("outer"),
            block(
                ElementType::BulletedList,
                vec![item(vec![Node::text("inner")])],
            ),
        ])],
    )];
    assert_eq!(serialize_markdown(&nodes, false), "1.  outer\n    *   inner\n");
}

#[test]
fn test_data_url_image_replacement() {
    let image: Node = Element::new(ElementType::Image, vec![Node::text("")])
        .with_url("data:image/png;base64,iVBORw0KGgo=")
        .with_title(Some("chart".to_string()))
        .into();
    let nodes = vec![image];

    assert_eq!(serialize_markdown(&nodes, true), "chart\n");
    assert_eq!(
        serialize_markdown(&nodes, false),
        "![](data:image/png;base64,iVBORw0KGgo= \"chart\")\n"
    );
}

#[test]
fn test_heading_line_breaks_become_spaces() {
    let nodes = vec![block(
        ElementType::HeadingTwo,
        vec![Node::text("two\nlines")],
    )];
    assert_eq!(serialize_markdown(&nodes, false), "## two lines\n");
}
