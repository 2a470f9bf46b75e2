use note_babel::normalize::{normalize_node, NormalizeStep};
use note_babel::{
    is_normalized, normalize, serialize_html, serialize_markdown, Element, ElementType, Mark,
    Marks, Node, Substitutions,
};
use proptest::prelude::*;

const KINDS: [ElementType; 17] = [
    ElementType::Paragraph,
    ElementType::HeadingOne,
    ElementType::HeadingTwo,
    ElementType::HeadingThree,
    ElementType::Quote,
    ElementType::Code,
    ElementType::BulletedList,
    ElementType::NumberedList,
    ElementType::TaskList,
    ElementType::SequenceList,
    ElementType::ListItem,
    ElementType::Table,
    ElementType::TableRow,
    ElementType::TableCell,
    ElementType::Image,
    ElementType::Link,
    ElementType::ThematicBreak,
];

fn arb_leaf() -> impl Strategy<Value = Node> {
    ("[a-c \n]{0,4}", any::<bool>(), any::<bool>()).prop_map(|(text, bold, code)| {
        let marks = Marks {
            bold,
            code,
            ..Marks::default()
        };
        Node::marked(text, marks)
    })
}

fn arb_node() -> impl Strategy<Value = Node> {
    arb_leaf().prop_recursive(4, 40, 4, |inner| {
        (
            prop::option::weighted(0.9, prop::sample::select(KINDS.to_vec())),
            prop::option::of(any::<bool>()),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(kind, checked, children)| {
                let mut element = match kind {
                    Some(kind) => Element::new(kind, children),
                    None => Element::untyped(children),
                };
                if kind == Some(ElementType::ListItem) {
                    element = element.with_checked(checked);
                }
                if kind == Some(ElementType::Link) {
                    element = element.with_url("https://example.com");
                }
                Node::Element(element)
            })
    })
}

fn arb_tree() -> impl Strategy<Value = Vec<Node>> {
    prop::collection::vec(arb_node(), 0..5)
}

fn has_list_item_outside_list(nodes: &[Node], parent_is_list: bool) -> bool {
    nodes.iter().any(|node| {
        (node.is_kind(ElementType::ListItem) && !parent_is_list)
            || has_list_item_outside_list(
                node.children(),
                node.kind().is_some_and(ElementType::is_list),
            )
    })
}

fn has_mixed_children(nodes: &[Node]) -> bool {
    let mixed = nodes.iter().any(Node::is_inline) && nodes.iter().any(Node::is_block);
    mixed
        || nodes
            .iter()
            .any(|node| has_mixed_children(node.children()))
}

fn has_misplaced_table_part(nodes: &[Node], parent: Option<ElementType>) -> bool {
    nodes.iter().any(|node| {
        let kind = node.kind();
        let misplaced = match parent {
            Some(ElementType::Table) => kind != Some(ElementType::TableRow),
            Some(ElementType::TableRow) => kind != Some(ElementType::TableCell),
            _ => matches!(
                kind,
                Some(ElementType::TableRow) | Some(ElementType::TableCell)
            ),
        };
        misplaced || has_misplaced_table_part(node.children(), kind)
    })
}

fn has_ragged_table(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| {
        let ragged = node.is_kind(ElementType::Table)
            && node
                .children()
                .windows(2)
                .any(|pair| pair[0].children().len() != pair[1].children().len());
        ragged || has_ragged_table(node.children())
    })
}

fn has_block_in_text_block(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| {
        let text_block = node
            .kind()
            .is_some_and(|kind| kind == ElementType::Paragraph || kind.is_heading());
        (text_block && node.children().iter().any(Node::is_block))
            || has_block_in_text_block(node.children())
    })
}

proptest! {
    #[test]
    fn normalize_reaches_a_fixed_point(tree in arb_tree()) {
        let mut nodes = tree;
        normalize(&mut nodes);
        prop_assert!(is_normalized(&nodes));

        let before = nodes.clone();
        prop_assert_eq!(normalize(&mut nodes), 0);
        prop_assert_eq!(nodes, before);
    }

    #[test]
    fn normalized_trees_hold_the_structural_invariants(tree in arb_tree()) {
        let mut nodes = tree;
        normalize(&mut nodes);
        prop_assert!(!nodes.is_empty());
        prop_assert!(nodes.iter().all(Node::is_block));
        prop_assert!(!has_list_item_outside_list(&nodes, false));
        prop_assert!(!has_mixed_children(&nodes));
        prop_assert!(!has_misplaced_table_part(&nodes, None));
        prop_assert!(!has_ragged_table(&nodes));
        prop_assert!(!has_block_in_text_block(&nodes));
    }

    #[test]
    fn serializers_accept_any_normalized_tree(tree in arb_tree()) {
        let mut nodes = tree;
        normalize(&mut nodes);
        let html = serialize_html(&nodes, &Substitutions::new());
        let markdown = serialize_markdown(&nodes, false);
        prop_assert!(markdown.is_empty() || markdown.ends_with('\n'));
        prop_assert!(!html.contains("<div>"));
    }
}

#[test]
fn test_normalize_node_repairs_one_container() {
    let mut nodes = vec![
        Node::paragraph("intro"),
        Node::element(
            ElementType::Quote,
            vec![
                Node::element(ElementType::ListItem, vec![Node::text("a")]),
                Node::element(ElementType::ListItem, vec![Node::text("b")]),
            ],
        ),
    ];

    let mut steps = 0;
    while let NormalizeStep::Retry(_) = normalize_node(&mut nodes, &[1]) {
        steps += 1;
    }
    assert_eq!(steps, 1);
    assert_eq!(
        nodes[1].children(),
        &[Node::element(
            ElementType::BulletedList,
            vec![
                Node::element(ElementType::ListItem, vec![Node::text("a")]),
                Node::element(ElementType::ListItem, vec![Node::text("b")]),
            ],
        )]
    );
    assert!(is_normalized(&nodes));
}

#[test]
fn test_untyped_root_nodes_become_paragraphs() {
    let mut nodes = vec![Node::Element(Element::untyped(vec![Node::text("x")]))];
    normalize(&mut nodes);
    assert_eq!(nodes, vec![Node::paragraph("x")]);
}

#[test]
fn test_header_row_survives_padding() {
    let bold = Marks::default().with(Mark::Bold);
    let cell = |text: Node| Node::element(ElementType::TableCell, vec![text]);
    let mut nodes = vec![Node::element(
        ElementType::Table,
        vec![
            Node::element(
                ElementType::TableRow,
                vec![cell(Node::marked("A", bold))],
            ),
            Node::element(
                ElementType::TableRow,
                vec![cell(Node::text("1")), cell(Node::text("2"))],
            ),
        ],
    )];
    normalize(&mut nodes);
    let rows = nodes[0].children();
    assert!(rows[0].as_element().unwrap().is_header_row());
    assert_eq!(rows[0].children().len(), rows[1].children().len());
    assert!(!has_ragged_table(&nodes));
}

#[test]
fn test_paragraph_holding_blocks_is_split() {
    let image: Node = Element::new(ElementType::Image, vec![Node::text("")])
        .with_url("https://example.com/a.png")
        .into();
    let mut nodes = vec![Node::element(
        ElementType::Paragraph,
        vec![Node::text("a"), Node::paragraph("b"), image.clone()],
    )];
    normalize(&mut nodes);
    assert_eq!(
        nodes,
        vec![Node::paragraph("a"), Node::paragraph("b"), image]
    );
    assert!(!has_block_in_text_block(&nodes));
}
