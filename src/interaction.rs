use crate::model::FamilyMember;
use crate::scene::{Scene, escape_xml};

pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 4.0;
/// Tooltip offset from the pointer, in screen pixels.
const TOOLTIP_OFFSET: (f32, f32) = (10.0, -28.0);

/// Pan/zoom applied to the viewport group: `screen = graph * k + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub k: f32,
    pub x: f32,
    pub y: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ViewTransform {
    pub const fn identity() -> Self {
        Self {
            k: 1.0,
            x: 0.0,
            y: 0.0,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    pub fn screen_to_graph(&self, sx: f32, sy: f32) -> (f32, f32) {
        ((sx - self.x) / self.k, (sy - self.y) / self.k)
    }

    pub fn graph_to_screen(&self, gx: f32, gy: f32) -> (f32, f32) {
        (gx * self.k + self.x, gy * self.k + self.y)
    }

    pub fn to_svg(&self) -> String {
        format!("translate({:.2},{:.2}) scale({:.4})", self.x, self.y, self.k)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipLine {
    pub label: Option<&'static str>,
    pub text: String,
}

/// The single detail popup of a visualization. Content is kept as plain
/// text; markup is produced only through `to_html`, which escapes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tooltip {
    pub visible: bool,
    pub node_id: Option<String>,
    pub x: f32,
    pub y: f32,
    pub lines: Vec<TooltipLine>,
}

impl Tooltip {
    fn show(&mut self, member: &FamilyMember, pointer: (f32, f32)) {
        self.visible = true;
        self.node_id = Some(member.id.clone());
        self.x = pointer.0 + TOOLTIP_OFFSET.0;
        self.y = pointer.1 + TOOLTIP_OFFSET.1;
        self.lines = tooltip_lines(member);
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.node_id = None;
        self.lines.clear();
    }

    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| match line.label {
                Some(label) => format!("{label}: {}", line.text),
                None => line.text.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_html(&self) -> String {
        let mut html = format!(
            "<div class=\"family-tree-tooltip\" style=\"left: {:.0}px; top: {:.0}px; opacity: {}\">",
            self.x,
            self.y,
            if self.visible { 1 } else { 0 }
        );
        for (idx, line) in self.lines.iter().enumerate() {
            if idx > 0 {
                html.push_str("<br/>");
            }
            match line.label {
                Some(label) => html.push_str(&format!("{label}: {}", escape_xml(&line.text))),
                None => html.push_str(&format!("<strong>{}</strong>", escape_xml(&line.text))),
            }
        }
        html.push_str("</div>");
        html
    }
}

fn tooltip_lines(member: &FamilyMember) -> Vec<TooltipLine> {
    let mut lines = vec![TooltipLine {
        label: None,
        text: member.name.clone(),
    }];
    let fields = [
        ("Born", member.birth_date.as_ref()),
        ("Died", member.death_date.as_ref()),
        ("Occupation", member.occupation.as_ref()),
        ("Location", member.location.as_ref()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            lines.push(TooltipLine {
                label: Some(label),
                text: value.clone(),
            });
        }
    }
    lines
}

/// Owns the view transform and the tooltip of one visualization.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionController {
    transform: ViewTransform,
    tooltip: Tooltip,
    zoom_enabled: bool,
}

impl InteractionController {
    pub fn new(zoom_enabled: bool) -> Self {
        Self {
            transform: ViewTransform::identity(),
            tooltip: Tooltip::default(),
            zoom_enabled,
        }
    }

    pub fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn hide_tooltip(&mut self) {
        self.tooltip.hide();
    }

    pub fn set_zoom_enabled(&mut self, enabled: bool) {
        self.zoom_enabled = enabled;
    }

    /// Scales by `factor` around the screen point `anchor`, clamped to
    /// [`MIN_SCALE`, `MAX_SCALE`]. Returns whether the transform changed.
    pub fn zoom_by(&mut self, factor: f32, anchor: (f32, f32)) -> bool {
        if !self.zoom_enabled || !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let k = (self.transform.k * factor).clamp(MIN_SCALE, MAX_SCALE);
        let (gx, gy) = self.transform.screen_to_graph(anchor.0, anchor.1);
        let next = ViewTransform {
            k,
            x: anchor.0 - gx * k,
            y: anchor.1 - gy * k,
        };
        let changed = next != self.transform;
        self.transform = next;
        changed
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) -> bool {
        if !self.zoom_enabled || !dx.is_finite() || !dy.is_finite() {
            return false;
        }
        self.transform.x += dx;
        self.transform.y += dy;
        dx != 0.0 || dy != 0.0
    }

    /// Shows the tooltip for `id` next to the node's on-screen position, or
    /// hides it when the id is not drawn.
    pub fn click_node(&mut self, scene: Option<&Scene>, id: &str) -> bool {
        let Some(handle) = scene.and_then(|scene| scene.handle(id)) else {
            self.tooltip.hide();
            return false;
        };
        let pointer = self.transform.graph_to_screen(handle.x, handle.y);
        self.tooltip.show(&handle.member, pointer);
        true
    }

    /// Screen-space click. A hit opens the node's tooltip at the pointer; a
    /// background click hides it. Returns the id of the hit node.
    pub fn click_at(&mut self, scene: Option<&Scene>, sx: f32, sy: f32) -> Option<String> {
        let (gx, gy) = self.transform.screen_to_graph(sx, sy);
        let hit = scene.and_then(|scene| {
            scene
                .handles
                .iter()
                .rev()
                .find(|handle| handle.contains(gx, gy))
        });
        match hit {
            Some(handle) => {
                self.tooltip.show(&handle.member, (sx, sy));
                Some(handle.id().to_string())
            }
            None => {
                self.tooltip.hide();
                None
            }
        }
    }

    pub fn reset(&mut self) {
        self.transform = ViewTransform::identity();
        self.tooltip.hide();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::NodeHandle;

    fn scene_with(member: FamilyMember, x: f32, y: f32) -> Scene {
        let mut scene = Scene::empty(400.0, 400.0, "#fff");
        scene.handles.push(NodeHandle {
            member,
            x,
            y,
            radius: 20.0,
        });
        scene
    }

    #[test]
    fn zoom_clamps_to_bounds() {
        let mut controller = InteractionController::new(true);
        controller.zoom_by(100.0, (0.0, 0.0));
        assert_eq!(controller.transform().k, MAX_SCALE);
        controller.zoom_by(1e-6, (0.0, 0.0));
        assert_eq!(controller.transform().k, MIN_SCALE);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut controller = InteractionController::new(true);
        controller.pan_by(15.0, -5.0);
        let anchor = (120.0, 80.0);
        let before = controller.transform().screen_to_graph(anchor.0, anchor.1);
        controller.zoom_by(2.0, anchor);
        let after = controller.transform().screen_to_graph(anchor.0, anchor.1);
        assert!((before.0 - after.0).abs() < 1e-3);
        assert!((before.1 - after.1).abs() < 1e-3);
    }

    #[test]
    fn disabled_zoom_ignores_gestures() {
        let mut controller = InteractionController::new(false);
        assert!(!controller.zoom_by(2.0, (0.0, 0.0)));
        assert!(!controller.pan_by(5.0, 5.0));
        assert!(controller.transform().is_identity());
    }

    #[test]
    fn invalid_zoom_factor_is_ignored() {
        let mut controller = InteractionController::new(true);
        assert!(!controller.zoom_by(f32::NAN, (0.0, 0.0)));
        assert!(!controller.zoom_by(-1.0, (0.0, 0.0)));
        assert!(controller.transform().is_identity());
    }

    #[test]
    fn click_node_shows_tooltip_near_node() {
        let mut member = FamilyMember::new("a", "Ann");
        member.birth_date = Some("1950".into());
        member.location = Some("Oslo".into());
        let scene = scene_with(member, 100.0, 50.0);
        let mut controller = InteractionController::new(true);
        assert!(controller.click_node(Some(&scene), "a"));
        let tooltip = controller.tooltip();
        assert!(tooltip.visible);
        assert_eq!((tooltip.x, tooltip.y), (110.0, 22.0));
        assert_eq!(tooltip.plain_text(), "Ann\nBorn: 1950\nLocation: Oslo");
    }

    #[test]
    fn background_click_hides_tooltip() {
        let scene = scene_with(FamilyMember::new("a", "Ann"), 100.0, 100.0);
        let mut controller = InteractionController::new(true);
        assert_eq!(controller.click_at(Some(&scene), 105.0, 95.0).as_deref(), Some("a"));
        assert!(controller.tooltip().visible);
        assert_eq!(controller.click_at(Some(&scene), 300.0, 300.0), None);
        assert!(!controller.tooltip().visible);
    }

    #[test]
    fn hit_test_respects_view_transform() {
        let scene = scene_with(FamilyMember::new("a", "Ann"), 100.0, 100.0);
        let mut controller = InteractionController::new(true);
        controller.zoom_by(2.0, (0.0, 0.0));
        assert_eq!(controller.click_at(Some(&scene), 105.0, 95.0), None);
        assert_eq!(controller.click_at(Some(&scene), 200.0, 200.0).as_deref(), Some("a"));
    }

    #[test]
    fn tooltip_markup_escapes_user_fields() {
        let mut member = FamilyMember::new("x", "<script>alert(1)</script>");
        member.occupation = Some("\"Chef\" & <b>owner</b>".into());
        let scene = scene_with(member, 0.0, 0.0);
        let mut controller = InteractionController::new(true);
        controller.click_node(Some(&scene), "x");
        let html = controller.tooltip().to_html();
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&quot;Chef&quot; &amp; &lt;b&gt;owner&lt;/b&gt;"));
    }

    #[test]
    fn unknown_node_hides_tooltip() {
        let scene = scene_with(FamilyMember::new("a", "Ann"), 0.0, 0.0);
        let mut controller = InteractionController::new(true);
        controller.click_node(Some(&scene), "a");
        assert!(!controller.click_node(Some(&scene), "missing"));
        assert!(!controller.tooltip().visible);
    }

    #[test]
    fn reset_restores_identity() {
        let mut controller = InteractionController::new(true);
        controller.zoom_by(3.0, (10.0, 10.0));
        controller.reset();
        assert!(controller.transform().is_identity());
    }
}
