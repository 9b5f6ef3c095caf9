use serde::Serialize;

use crate::assets::image_for_panel;
use crate::constants::TEXT_SLOTS;
use crate::model::Panel;

/// Offset in meters as kilometers with a decimal comma: 1500 -> "1,5".
pub fn format_offset(meters: f64) -> String {
    format!("{}", meters / 1000.0).replace('.', ",")
}

pub fn format_side(side: &str) -> &'static str {
    match side {
        "L" => "Li",
        "R" => "Re",
        _ => "",
    }
}

/// Road badge colouring, keyed by the first letter of the road code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoadStyle {
    Highway,
    Provincial,
    CityRing,
    Other(char),
}

impl RoadStyle {
    pub fn for_road(road_id: &str) -> Option<Self> {
        let first = road_id.chars().next()?.to_lowercase().next()?;
        Some(match first {
            'a' => RoadStyle::Highway,
            'n' => RoadStyle::Provincial,
            's' => RoadStyle::CityRing,
            other => RoadStyle::Other(other),
        })
    }

    pub fn css_class(&self) -> String {
        let letter = match self {
            RoadStyle::Highway => 'a',
            RoadStyle::Provincial => 'n',
            RoadStyle::CityRing => 's',
            RoadStyle::Other(c) => *c,
        };
        format!("road_{}", letter)
    }
}

/// Kilometer post shown under the panel text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HectoBadge {
    pub road: String,
    pub offset: String,
    pub side: String,
    pub style: RoadStyle,
}

impl HectoBadge {
    /// Badge for a panel, if it has a road code and a non-negative offset.
    pub fn for_panel(panel: &Panel) -> Option<Self> {
        let road = panel.road_id.as_deref().filter(|r| !r.is_empty())?;
        let offset = panel.road_offset.filter(|o| *o >= 0.0)?;

        Some(Self {
            road: road.to_string(),
            offset: format_offset(offset),
            side: format_side(panel.road_side.as_deref().unwrap_or_default()).to_string(),
            style: RoadStyle::for_road(road)?,
        })
    }
}

/// Fixed-shape sidebar contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetailView {
    pub name: String,
    pub organization: String,
    pub text_lines: [String; TEXT_SLOTS],
    pub hecto: Option<HectoBadge>,
    pub image_src: String,
    pub image_hidden: bool,
    pub working: bool,
}

impl DetailView {
    /// Overwrite every slot from `panel`. Rendering the same panel twice
    /// yields the same view.
    pub fn render(&mut self, panel: &Panel) {
        self.name = panel.name.clone();
        self.organization = panel.organization.clone();
        self.text_lines = text_slots(panel.text.as_deref());
        self.hecto = HectoBadge::for_panel(panel);
        self.image_src = image_for_panel(&panel.id);
        self.image_hidden = false;
        self.working = panel.is_working();
    }
}

fn text_slots(text: Option<&[String]>) -> [String; TEXT_SLOTS] {
    let mut slots: [String; TEXT_SLOTS] = Default::default();
    for (slot, line) in slots.iter_mut().zip(text.unwrap_or_default()) {
        slot.clone_from(line);
    }
    slots
}
