use crate::config::RenderOptions;
use crate::interaction::ViewTransform;
use crate::layout::{PositionedNode, PositionedTree};
use crate::scene::{Element, NodeHandle, Scene};
use crate::theme::Theme;

const SHADOW_FILTER_ID: &str = "drop-shadow";
const LINK_STROKE_WIDTH: f32 = 2.0;
const NODE_STROKE_WIDTH: f32 = 3.0;
const LABEL_GAP: f32 = 4.0;

/// Builds the scene for one laid-out tree. `None` renders an empty frame at
/// canvas size. Entrance animations are attached to the final elements, so
/// the returned scene is already the settled end state.
pub fn render_scene(
    positioned: Option<&PositionedTree>,
    options: &RenderOptions,
    transform: &ViewTransform,
) -> Scene {
    let options = options.sanitized();
    let theme = Theme::resolve(&options);
    let Some(tree) = positioned.filter(|tree| !tree.nodes.is_empty()) else {
        let mut scene = Scene::empty(options.width, options.height, &theme.background);
        scene.set_view_transform(transform);
        return scene;
    };

    let mut scene = Scene::empty(tree.width, tree.height, &theme.background);
    scene.defs = render_defs(tree, &options);

    let mut links = Element::new("g").attr("class", "links");
    for (parent, child) in tree.links() {
        links.push(render_link(parent, child, &theme, &options));
    }

    let mut nodes = Element::new("g").attr("class", "nodes");
    for (idx, node) in tree.nodes.iter().enumerate() {
        nodes.push(render_node(idx, node, &theme, &options));
        scene.handles.push(NodeHandle {
            member: node.member.clone(),
            x: node.x,
            y: node.y,
            radius: options.node_radius,
        });
    }

    scene.viewport.push(links);
    scene.viewport.push(nodes);
    scene.set_view_transform(transform);
    scene
}

fn render_defs(tree: &PositionedTree, options: &RenderOptions) -> Element {
    let mut defs = Element::new("defs").child(
        Element::new("filter")
            .attr("id", SHADOW_FILTER_ID)
            .attr("x", "-50%")
            .attr("y", "-50%")
            .attr("width", "200%")
            .attr("height", "200%")
            .child(
                Element::new("feDropShadow")
                    .attr("dx", 0)
                    .attr("dy", 2)
                    .attr("stdDeviation", 3)
                    .attr("flood-opacity", 0.3),
            ),
    );
    if options.show_photos {
        for (idx, node) in tree.nodes.iter().enumerate() {
            if node.member.photo.is_none() {
                continue;
            }
            defs.push(
                Element::new("clipPath").attr("id", clip_id(idx)).child(
                    Element::new("circle")
                        .attr("cx", 0)
                        .attr("cy", 0)
                        .attr("r", fmt_num(options.node_radius)),
                ),
            );
        }
    }
    defs
}

fn clip_id(idx: usize) -> String {
    format!("clip-node-{idx}")
}

/// Vertical-tangent cubic from the parent center to the child center.
pub fn link_path(parent: (f32, f32), child: (f32, f32)) -> String {
    let mid_y = (parent.1 + child.1) / 2.0;
    format!(
        "M {:.2} {:.2} C {:.2} {:.2}, {:.2} {:.2}, {:.2} {:.2}",
        parent.0, parent.1, parent.0, mid_y, child.0, mid_y, child.0, child.1
    )
}

fn render_link(
    parent: &PositionedNode,
    child: &PositionedNode,
    theme: &Theme,
    options: &RenderOptions,
) -> Element {
    let path = Element::new("path")
        .attr("class", "link")
        .attr("data-source", &parent.member.id)
        .attr("data-target", &child.member.id)
        .attr("d", link_path((parent.x, parent.y), (child.x, child.y)))
        .attr("fill", "none")
        .attr("stroke", &theme.line_color)
        .attr("stroke-width", fmt_num(LINK_STROKE_WIDTH))
        .attr("opacity", 1);
    with_entrance(path, "opacity", 0.0, 1.0, options.animation_duration)
}

fn render_node(idx: usize, node: &PositionedNode, theme: &Theme, options: &RenderOptions) -> Element {
    let member = &node.member;
    let radius = options.node_radius;
    let mut group = Element::new("g")
        .attr("class", "node")
        .attr("data-id", &member.id)
        .attr(
            "transform",
            format!("translate({:.2},{:.2})", node.x, node.y),
        );

    let circle = Element::new("circle")
        .attr("r", fmt_num(radius))
        .attr("fill", theme.node_fill(member.gender))
        .attr("stroke", &theme.node_stroke)
        .attr("stroke-width", fmt_num(NODE_STROKE_WIDTH))
        .attr("filter", format!("url(#{SHADOW_FILTER_ID})"));
    group.push(with_entrance(circle, "r", 0.0, radius, options.animation_duration));

    if options.show_photos
        && let Some(photo) = member.photo.as_deref()
    {
        group.push(
            Element::new("image")
                .attr("class", "photo")
                .attr("xlink:href", photo)
                .attr("x", fmt_num(-radius))
                .attr("y", fmt_num(-radius))
                .attr("width", fmt_num(radius * 2.0))
                .attr("height", fmt_num(radius * 2.0))
                .attr("preserveAspectRatio", "xMidYMid slice")
                .attr("clip-path", format!("url(#{})", clip_id(idx))),
        );
    }

    let line_height = theme.font_size + LABEL_GAP;
    let mut label_y = radius + line_height;
    group.push(label(
        "name",
        &member.name,
        label_y,
        theme.font_size,
        &theme.text_color,
        theme,
    )
    .attr("font-weight", "bold"));

    if options.show_dates
        && let Some(lifespan) = member.lifespan_label()
    {
        label_y += line_height;
        group.push(label(
            "dates",
            &lifespan,
            label_y,
            theme.font_size * 0.85,
            &theme.secondary_text_color,
            theme,
        ));
    }

    if options.show_occupation
        && let Some(occupation) = member.occupation.as_deref()
    {
        label_y += line_height;
        group.push(
            label(
                "occupation",
                occupation,
                label_y,
                theme.font_size * 0.85,
                &theme.secondary_text_color,
                theme,
            )
            .attr("font-style", "italic"),
        );
    }

    group
}

fn label(class: &str, text: &str, y: f32, size: f32, fill: &str, theme: &Theme) -> Element {
    Element::new("text")
        .attr("class", format!("label {class}"))
        .attr("x", 0)
        .attr("y", fmt_num(y))
        .attr("text-anchor", "middle")
        .attr("font-family", &theme.font_family)
        .attr("font-size", fmt_num(size))
        .attr("fill", fill)
        .text(text)
}

/// Appends a SMIL entrance animation; zero duration leaves the element static.
fn with_entrance(
    element: Element,
    attribute: &'static str,
    from: f32,
    to: f32,
    duration_ms: u32,
) -> Element {
    if duration_ms == 0 {
        return element;
    }
    element.child(
        Element::new("animate")
            .attr("attributeName", attribute)
            .attr("from", fmt_num(from))
            .attr("to", fmt_num(to))
            .attr("dur", format!("{duration_ms}ms"))
            .attr("fill", "freeze"),
    )
}

fn fmt_num(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::build_hierarchy;
    use crate::layout::compute_layout;
    use crate::model::{FamilyGraph, FamilyMember, Gender};

    fn family() -> Vec<FamilyMember> {
        let mut root = FamilyMember::new("1", "Alice <Root>");
        root.birth_date = Some("1900-01-01".into());
        root.death_date = Some("1980-05-05".into());
        root.gender = Some(Gender::Female);
        root.photo = Some("https://example.com/alice.jpg".into());
        let mut child = FamilyMember::new("2", "Bob").with_parents(["1"]);
        child.occupation = Some("Carpenter".into());
        child.gender = Some(Gender::Male);
        let grandchild = FamilyMember::new("3", "Cleo").with_parents(["2"]);
        vec![root, child, grandchild]
    }

    fn render_with(options: &RenderOptions) -> Scene {
        let graph = FamilyGraph::from_members(family());
        let tree = build_hierarchy(&graph).unwrap();
        let layout = compute_layout(&tree, options);
        render_scene(Some(&layout), options, &ViewTransform::identity())
    }

    #[test]
    fn draws_one_group_per_node_and_one_link_per_edge() {
        let scene = render_with(&RenderOptions::default());
        assert_eq!(scene.node_count(), 3);
        assert_eq!(scene.link_count(), 2);
        assert_eq!(scene.handles.len(), 3);
    }

    #[test]
    fn links_are_drawn_before_nodes() {
        let svg = render_with(&RenderOptions::default()).to_svg_string();
        let links = svg.find("class=\"links\"").unwrap();
        let nodes = svg.find("class=\"nodes\"").unwrap();
        let defs = svg.find("<defs>").unwrap();
        assert!(defs < links && links < nodes);
    }

    #[test]
    fn labels_are_escaped_and_dates_formatted() {
        let svg = render_with(&RenderOptions::default()).to_svg_string();
        assert!(svg.contains("Alice &lt;Root&gt;"));
        assert!(!svg.contains("<Root>"));
        assert!(svg.contains("b. 1900-01-01 - d. 1980-05-05"));
    }

    #[test]
    fn feature_toggles_control_optional_elements() {
        let scene = render_with(&RenderOptions::default());
        let svg = scene.to_svg_string();
        assert!(svg.contains("clip-node-0"));
        assert!(svg.contains("class=\"photo\""));
        assert!(!svg.contains("Carpenter"));

        let scene = render_with(&RenderOptions {
            show_photos: false,
            show_dates: false,
            show_occupation: true,
            ..Default::default()
        });
        let svg = scene.to_svg_string();
        assert!(!svg.contains("clipPath"));
        assert!(!svg.contains("b. 1900"));
        assert!(svg.contains("Carpenter"));
    }

    #[test]
    fn entrance_animation_targets_final_values() {
        let svg = render_with(&RenderOptions::default()).to_svg_string();
        assert!(svg.contains(
            "<animate attributeName=\"r\" from=\"0\" to=\"30\" dur=\"750ms\" fill=\"freeze\"/>"
        ));
        assert!(svg.contains("attributeName=\"opacity\""));
        assert!(svg.contains("<circle r=\"30\""));

        let still = render_with(&RenderOptions {
            animation_duration: 0,
            ..Default::default()
        });
        assert!(!still.to_svg_string().contains("<animate"));
    }

    #[test]
    fn colors_follow_scheme() {
        let svg = render_with(&RenderOptions {
            color_scheme: crate::theme::ColorScheme::Vintage,
            ..Default::default()
        })
        .to_svg_string();
        assert!(svg.contains("#CD853F"));
        assert!(svg.contains("#FDF5E6"));
    }

    #[test]
    fn missing_tree_renders_empty_canvas() {
        let options = RenderOptions::default();
        let scene = render_scene(None, &options, &ViewTransform::identity());
        assert_eq!(scene.node_count(), 0);
        assert_eq!(scene.width, options.width);
        assert!(scene.to_svg_string().contains("<svg"));
    }

    #[test]
    fn link_path_is_a_vertical_cubic() {
        assert_eq!(
            link_path((10.0, 0.0), (30.0, 100.0)),
            "M 10.00 0.00 C 10.00 50.00, 30.00 50.00, 30.00 100.00"
        );
    }

    #[test]
    fn fmt_num_trims_integral_values() {
        assert_eq!(fmt_num(30.0), "30");
        assert_eq!(fmt_num(11.9), "11.9");
    }
}
