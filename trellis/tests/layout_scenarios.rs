//! End-to-end layout scenarios.
//!
//! Each test builds a small tree through the public API, runs measure,
//! layout and paint, and checks the rectangles that come out. Paint output is
//! recorded with [`DisplayList`] instead of a real backend.

use trellis::layout::alignment::Align;
use trellis::layout::{flow, metrics, sizing};
use trellis::{
    Color, DisplayList, GridItem, Grid, IntoWidgetRef, Leaf, LinearBox, MainAxisAlignment, Padding,
    Panel, Rect, Sizing, SizingSpec, UniformFlow, Widget, WidgetRef, same_widget, tree,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn leaf(width: Sizing) -> WidgetRef {
    Leaf::new(0, 10).width(width).into_widget_ref()
}

fn widths(children: &[WidgetRef]) -> Vec<i32> {
    children
        .iter()
        .map(|c| c.borrow().layout_rect().map_or(-1, |r| r.width))
        .collect()
}

#[test]
fn fixed_then_two_flex_children_split_the_rest() {
    init_tracing();
    let children = vec![
        leaf(Sizing::fixed(50.0)),
        leaf(Sizing::flex(1.0)),
        leaf(Sizing::flex(1.0)),
    ];
    let mut row = LinearBox::row().with_children(children.clone());
    row.layout(200, 10).unwrap();
    assert_eq!(widths(&children), vec![50, 75, 75]);
}

#[test]
fn overflowing_fixed_child_keeps_its_size() {
    let children = vec![leaf(Sizing::fixed(60.0)), leaf(Sizing::flex(1.0))];
    let mut row = LinearBox::row().with_children(children.clone());
    row.layout(50, 10).unwrap();
    assert_eq!(widths(&children), vec![60, 0]);
}

#[test]
fn flex_allocation_fills_usable_space_exactly() {
    for available in [100, 137, 251, 999] {
        let children = vec![
            leaf(Sizing::flex(1.0)),
            leaf(Sizing::fixed(30.0)),
            leaf(Sizing::flex(2.0)),
            leaf(Sizing::flex(3.0)),
        ];
        let mut row = LinearBox::row().gap(5).with_children(children.clone());
        row.layout(available, 10).unwrap();
        let total: i32 = widths(&children).iter().sum();
        assert_eq!(total + 3 * 5, available, "available = {available}");
    }
}

#[test]
fn space_between_offsets() {
    let offsets = metrics::distribute_main_axis_offsets(&[40, 40], 100, 0, MainAxisAlignment::SpaceBetween);
    assert_eq!(offsets, vec![0, 60]);
}

#[test]
fn align_offset_stays_within_bounds() {
    for align in [Align::Start, Align::Center, Align::End, Align::Stretch] {
        for (container, child) in [(100, 0), (100, 33), (100, 100), (7, 2)] {
            let offset = metrics::align_offset(container, child, align);
            assert!((0..=container - child).contains(&offset), "{align:?} {container} {child}");
        }
    }
}

#[test]
fn spanning_item_tops_up_auto_rows() {
    let tall = GridItem::at(0..=1, 0).child(Leaf::new(10, 80)).into_widget_ref();
    let lower = GridItem::at(1, 0).into_widget_ref();
    let mut grid = Grid::new()
        .rows([Sizing::Auto, Sizing::Auto])
        .columns([Sizing::fixed(50.0)])
        .child(tall.clone())
        .child(lower.clone());
    let pref = grid.preferred_size(None, None).unwrap();
    assert_eq!(pref.height, 80);
    grid.layout(50, 80).unwrap();
    assert_eq!(lower.borrow().layout_rect(), Some(Rect::new(0, 40, 50, 40)));
}

#[test]
fn uniform_flow_column_count_from_max_width() {
    let tiles = UniformFlow::new().max_column_width(100).main_gap(10);
    assert_eq!(tiles.resolve_columns(6, 330), 3);
}

#[test]
fn flow_partition_is_a_pure_function() {
    let widths = [30, 50, 20, 70, 10, 40];
    let first = flow::partition_lines(&widths, Some(100), 5);
    for _ in 0..3 {
        assert_eq!(flow::partition_lines(&widths, Some(100), 5), first);
    }
    assert_eq!(first.iter().map(|r| r.len()).sum::<usize>(), widths.len());
}

#[test]
fn sizing_parse_is_idempotent() {
    for raw in [
        SizingSpec::from(0),
        SizingSpec::from(12.5),
        SizingSpec::from("auto"),
        SizingSpec::from(" 40% "),
        SizingSpec::Unset,
    ] {
        let once = sizing::parse(raw.clone(), None).unwrap();
        assert_eq!(sizing::parse(once, None).unwrap(), once, "{raw:?}");
    }
}

#[test]
fn padding_normalization_is_idempotent() {
    for padding in [Padding::parse(4), Padding::parse((3, 7)), Padding::parse((1, 2, 3, 4))] {
        let once = padding.unwrap();
        assert_eq!(Padding::parse(once).unwrap(), once);
    }
}

#[test]
fn sizing_and_padding_read_from_json_templates() {
    let specs: Vec<SizingSpec> = serde_json::from_str(r#"[40, "50%", "auto", null]"#).unwrap();
    let parsed: Vec<Sizing> = specs.into_iter().map(|s| sizing::parse(s, None).unwrap()).collect();
    assert_eq!(
        parsed,
        vec![Sizing::Fixed(40.0), Sizing::Flex(50.0), Sizing::Auto, Sizing::Auto]
    );

    let padding: trellis::layout::PaddingSpec = serde_json::from_str("[8, 4]").unwrap();
    assert_eq!(Padding::parse(padding).unwrap().as_tuple(), (8, 4, 8, 4));
}

#[test]
fn painted_tree_records_rects_and_hit_tests() {
    init_tracing();
    let label = Leaf::new(20, 10).fill(Color::WHITE).into_widget_ref();
    let card = Panel::new()
        .background(Color::rgb(1.0, 0.0, 0.0))
        .width(Sizing::fixed(100.0))
        .height(Sizing::fixed(40.0))
        .child(label.clone())
        .into_widget_ref();
    let root = LinearBox::column()
        .padding(Padding::all(10))
        .child(card.clone())
        .into_widget_ref();
    tree::mount(&root);

    let mut list = DisplayList::new();
    root.borrow_mut().paint(&mut list, 0, 0, 200, 200).unwrap();
    assert_eq!(
        list.filled_rects(),
        vec![Rect::new(10, 10, 100, 40), Rect::new(10, 10, 20, 10)]
    );

    let hit = root.borrow().hit_test(15, 15).expect("label hit");
    assert!(same_widget(&hit, &label));
    let hit = root.borrow().hit_test(90, 40).expect("card hit");
    assert!(same_widget(&hit, &card));
    assert!(root.borrow().hit_test(150, 150).is_none());
}

#[test]
fn invalidated_child_forces_parent_relayout() {
    let child = Leaf::new(30, 10).into_widget_ref();
    let root = LinearBox::row().child(child.clone()).into_widget_ref();
    tree::mount(&root);

    let mut list = DisplayList::new();
    root.borrow_mut().paint(&mut list, 0, 0, 100, 10).unwrap();
    assert!(!root.borrow().base().needs_layout());

    child.borrow_mut().set_width(Sizing::fixed(45.0));
    assert!(root.borrow().base().needs_layout());
    root.borrow_mut().paint(&mut list, 0, 0, 100, 10).unwrap();
    assert_eq!(child.borrow().layout_rect().map(|r| r.width), Some(45));
}
