use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::HashSet;

use crate::constants::{CLOSE_BUTTON_ELEMENT_ID, MAP_ELEMENT_ID, SIDEBAR_ELEMENT_ID};
use crate::dataset::fetch_dataset;
use crate::detail::DetailView;
use crate::gesture::{SwipeDismiss, SwipeOutcome, ViewTransform};
use crate::layer::{set_icon_zoom_effect, MapView, MarkerLayer};
use crate::marker::build_markers;
use crate::model::{Dataset, PanelId};
use crate::registry::PanelRegistry;
use crate::settings::Settings;
use crate::zoom::ZoomEffect;

/// The page the viewer is mounted into
#[derive(Debug, Clone)]
pub struct HostPage {
    elements: HashSet<String>,
    pub map_library: bool,
}

impl HostPage {
    pub fn new<I, S>(elements: I, map_library: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            elements: elements.into_iter().map(Into::into).collect(),
            map_library,
        }
    }

    /// Page with the map, the sidebar and its close button
    pub fn standard() -> Self {
        Self::new([MAP_ELEMENT_ID, SIDEBAR_ELEMENT_ID, CLOSE_BUTTON_ELEMENT_ID], true)
    }

    pub fn has_element(&self, id: &str) -> bool {
        self.elements.contains(id)
    }
}

/// Host events, already reduced to what the viewer cares about
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    PanelSelected(PanelId),
    ZoomChanged(f64),
    TouchStart(f64),
    TouchMove(f64),
    TouchEnd(f64),
    CloseClicked,
    IconFailed(PanelId),
}

#[derive(Debug, Clone, Serialize)]
pub struct Sidebar {
    pub visible: bool,
    pub detail: DetailView,
    pub swipe: SwipeDismiss,
    #[serde(skip)]
    shown: Option<PanelId>,
}

/// Counts reported after the dataset has been applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub registered: usize,
    pub markers: usize,
    pub skipped: usize,
}

/// Everything the viewer owns for one page session.
#[derive(Debug)]
pub struct Session {
    settings: Settings,
    registry: PanelRegistry,
    map: MapView,
    layer: MarkerLayer,
    sidebar: Sidebar,
    has_close_button: bool,
    // Set by the first load, successful or not
    loaded: Option<LoadSummary>,
}

impl Session {
    /// Mount on `host`. Fails when the page lacks the map container, the map
    /// library or the sidebar.
    pub fn setup(host: &HostPage, settings: Settings) -> Result<Self> {
        if !host.has_element(MAP_ELEMENT_ID) {
            bail!("Map element not found");
        }
        if !host.map_library {
            bail!("Map library not found");
        }
        if !host.has_element(SIDEBAR_ELEMENT_ID) {
            bail!("Sidebar element not found");
        }

        let effect = ZoomEffect::at(settings.default_zoom, settings.clamp_opacity);
        let map = MapView::new(&settings);
        tracing::debug!(
            "Map ready at {:?}, zoom {}, tiles {}",
            map.center,
            map.zoom,
            map.tile_url
        );

        Ok(Self {
            registry: PanelRegistry::new(),
            map,
            layer: MarkerLayer::new(effect.opacity),
            sidebar: Sidebar {
                visible: false,
                detail: DetailView::default(),
                swipe: SwipeDismiss::default(),
                shown: None,
            },
            has_close_button: host.has_element(CLOSE_BUTTON_ELEMENT_ID),
            loaded: None,
            settings,
        })
    }

    /// Fetch the dataset once and populate the map. A failed fetch is logged
    /// and leaves the map empty; later calls return the first result.
    pub async fn load(&mut self) -> LoadSummary {
        if let Some(summary) = self.loaded {
            return summary;
        }
        match fetch_dataset(&self.settings.data_dir).await {
            Ok(dataset) => self.apply_dataset(dataset),
            Err(e) => {
                tracing::error!("❌ Could not load panel data: {:#}", e);
                let summary = LoadSummary::default();
                self.loaded = Some(summary);
                summary
            }
        }
    }

    /// Populate the registry and attach all markers in one batch. Only the
    /// first dataset is applied.
    pub fn apply_dataset(&mut self, dataset: Dataset) -> LoadSummary {
        if let Some(summary) = self.loaded {
            tracing::warn!("Panel data already loaded, ignoring another dataset");
            return summary;
        }

        if let Some(updated) = dataset.date_updated {
            tracing::info!("📅 Panel data last updated {}", updated);
        }

        let overwritten = self.registry.register(dataset.drips);
        if overwritten > 0 {
            tracing::warn!("{} panel record(s) shared an id with an earlier one", overwritten);
        }

        let probe_dir = self
            .settings
            .probe_images
            .then_some(self.settings.data_dir.as_path());
        let mut batch = build_markers(&self.registry, probe_dir);

        // Size the icons once before they are attached
        let effect = self.zoom_effect(self.map.zoom);
        self.layer.set_opacity(effect.opacity);
        crate::layer::scale_markers(&mut batch.markers, effect.scale);

        let summary = LoadSummary {
            registered: self.registry.len(),
            markers: batch.markers.len(),
            skipped: batch.skipped + dataset.rejected,
        };
        self.layer.add_layers(batch.markers);
        self.loaded = Some(summary);

        tracing::info!("🗺️  Added {} displays to the map", summary.markers);
        if summary.skipped > 0 {
            tracing::info!(
                "   {} record(s) skipped: undecodable, or without a usable position or image",
                summary.skipped
            );
        }
        summary
    }

    /// Apply one host event.
    pub fn dispatch(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::PanelSelected(id) => self.select_panel(&id)?,
            AppEvent::ZoomChanged(zoom) => {
                let effect = self.zoom_effect(zoom);
                set_icon_zoom_effect(effect, &mut self.map, &mut self.layer);
            }
            AppEvent::TouchStart(y) => self.sidebar.swipe.touch_start(y),
            AppEvent::TouchMove(y) => self.sidebar.swipe.touch_move(y),
            AppEvent::TouchEnd(y) => {
                if self.sidebar.swipe.touch_end(y) == Some(SwipeOutcome::Dismissed) {
                    self.sidebar.visible = false;
                }
            }
            AppEvent::CloseClicked => {
                if self.has_close_button {
                    self.sidebar.visible = false;
                }
            }
            AppEvent::IconFailed(id) => {
                if !self.layer.hide_marker(&id) {
                    tracing::debug!("Icon failure for panel {} without a marker", id);
                }
                if self.sidebar.shown.as_ref() == Some(&id) {
                    self.sidebar.detail.image_hidden = true;
                }
            }
        }
        Ok(())
    }

    fn select_panel(&mut self, id: &PanelId) -> Result<()> {
        let Some(panel) = self.registry.lookup(id) else {
            bail!("Panel {} is not in the registry", id);
        };

        self.sidebar.detail.render(panel);
        // A marker already known to lack its image keeps the detail image hidden too
        if self.layer.marker_for(id).is_some_and(|m| m.hidden) {
            self.sidebar.detail.image_hidden = true;
        }
        self.sidebar.shown = Some(id.clone());
        self.sidebar.swipe.reset();
        self.sidebar.visible = true;
        Ok(())
    }

    fn zoom_effect(&self, zoom: f64) -> ZoomEffect {
        ZoomEffect::at(zoom, self.settings.clamp_opacity)
    }

    pub fn registry(&self) -> &PanelRegistry {
        &self.registry
    }

    pub fn map(&self) -> &MapView {
        &self.map
    }

    pub fn layer(&self) -> &MarkerLayer {
        &self.layer
    }

    pub fn sidebar(&self) -> &Sidebar {
        &self.sidebar
    }

    pub fn snapshot(&self) -> ViewSnapshot<'_> {
        ViewSnapshot {
            zoom_level: &self.map.zoom_attribute,
            layer_opacity: self.layer.opacity,
            markers: self.layer.markers().len(),
            visible_markers: self.layer.visible_count(),
            sidebar_visible: self.sidebar.visible,
            detail: self.sidebar.visible.then_some(&self.sidebar.detail),
            sidebar_transform: self.sidebar.swipe.transform(),
        }
    }
}

/// Compact view state for printing
#[derive(Debug, Serialize)]
pub struct ViewSnapshot<'a> {
    pub zoom_level: &'a str,
    pub layer_opacity: f64,
    pub markers: usize,
    pub visible_markers: usize,
    pub sidebar_visible: bool,
    pub detail: Option<&'a DetailView>,
    pub sidebar_transform: &'a ViewTransform,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LooseNumber, Panel};

    fn placed(id: &str) -> Panel {
        let mut panel = Panel::new(id);
        panel.name = format!("Panel {}", id);
        panel.lat = Some(LooseNumber::Text("52.0".into()));
        panel.lon = Some(LooseNumber::Text("5.0".into()));
        panel.image_width = Some(LooseNumber::Number(36.0));
        panel.image_height = Some(LooseNumber::Number(36.0));
        panel
    }

    fn session_with(panels: Vec<Panel>) -> Session {
        let mut session = Session::setup(&HostPage::standard(), Settings::default()).unwrap();
        session.apply_dataset(Dataset::new(panels));
        session
    }

    #[test]
    fn setup_requires_map_library_and_sidebar() {
        let settings = Settings::default();

        let err = Session::setup(&HostPage::new(["sidebar"], true), settings.clone()).unwrap_err();
        assert_eq!(err.to_string(), "Map element not found");

        let err = Session::setup(&HostPage::new(["map", "sidebar"], false), settings.clone()).unwrap_err();
        assert_eq!(err.to_string(), "Map library not found");

        let err = Session::setup(&HostPage::new(["map"], true), settings.clone()).unwrap_err();
        assert_eq!(err.to_string(), "Sidebar element not found");

        assert!(Session::setup(&HostPage::new(["map", "sidebar"], true), settings).is_ok());
    }

    #[test]
    fn initial_opacity_follows_default_zoom() {
        let session = Session::setup(&HostPage::standard(), Settings::default()).unwrap();
        assert_eq!(session.layer().opacity, crate::zoom::opacity(9.0));
        assert_eq!(session.map().zoom_attribute, "9");
    }

    #[test]
    fn icons_are_sized_before_attach() {
        let session = session_with(vec![placed("a")]);
        let icon = &session.layer().markers()[0].icon;
        assert_eq!(icon.size.width, 18.0);
        assert_eq!(icon.anchor.x, 9.0);
    }

    #[test]
    fn selecting_a_panel_shows_the_sidebar() {
        let mut session = session_with(vec![placed("a"), placed("b")]);
        session.dispatch(AppEvent::PanelSelected("b".into())).unwrap();

        assert!(session.sidebar().visible);
        assert_eq!(session.sidebar().detail.name, "Panel b");

        session.dispatch(AppEvent::CloseClicked).unwrap();
        assert!(!session.sidebar().visible);
    }

    #[test]
    fn unknown_panel_is_rejected_without_touching_the_view() {
        let mut session = session_with(vec![placed("a")]);
        assert!(session.dispatch(AppEvent::PanelSelected("zzz".into())).is_err());
        assert!(!session.sidebar().visible);
        assert_eq!(session.sidebar().detail, DetailView::default());
    }

    #[test]
    fn swipe_dismisses_and_reselect_resets() {
        let mut session = session_with(vec![placed("a")]);
        session.dispatch(AppEvent::PanelSelected("a".into())).unwrap();

        for event in [AppEvent::TouchStart(10.0), AppEvent::TouchMove(300.0), AppEvent::TouchEnd(300.0)] {
            session.dispatch(event).unwrap();
        }
        assert!(!session.sidebar().visible);

        session.dispatch(AppEvent::PanelSelected("a".into())).unwrap();
        assert!(session.sidebar().visible);
        assert_eq!(session.sidebar().swipe.state(), crate::gesture::GestureState::Idle);

        for event in [AppEvent::TouchStart(10.0), AppEvent::TouchEnd(160.0)] {
            session.dispatch(event).unwrap();
        }
        assert!(session.sidebar().visible);
    }

    #[test]
    fn icon_failure_hides_marker_and_open_detail_image() {
        let mut session = session_with(vec![placed("a"), placed("b")]);
        session.dispatch(AppEvent::PanelSelected("a".into())).unwrap();
        session.dispatch(AppEvent::IconFailed("a".into())).unwrap();

        assert!(session.sidebar().detail.image_hidden);
        assert_eq!(session.layer().visible_count(), 1);

        session.dispatch(AppEvent::PanelSelected("b".into())).unwrap();
        assert!(!session.sidebar().detail.image_hidden);
        session.dispatch(AppEvent::PanelSelected("a".into())).unwrap();
        assert!(session.sidebar().detail.image_hidden);
    }

    #[test]
    fn second_dataset_does_not_attach_markers_again() {
        let mut session = session_with(vec![placed("a"), placed("b")]);
        let summary = session.apply_dataset(Dataset::new(vec![placed("c")]));

        assert_eq!(summary.markers, 2);
        assert_eq!(session.layer().markers().len(), 2);
        assert_eq!(session.registry().len(), 2);
        assert!(session.registry().lookup(&"c".into()).is_none());
    }

    #[test]
    fn rejected_records_count_as_skipped() {
        let mut session = Session::setup(&HostPage::standard(), Settings::default()).unwrap();
        let mut dataset = Dataset::new(vec![placed("a"), Panel::new("no-position")]);
        dataset.rejected = 2;

        let summary = session.apply_dataset(dataset);
        assert_eq!(summary, LoadSummary { registered: 2, markers: 1, skipped: 3 });
    }

    #[test]
    fn close_button_is_optional() {
        let mut session =
            Session::setup(&HostPage::new(["map", "sidebar"], true), Settings::default()).unwrap();
        session.apply_dataset(Dataset::new(vec![placed("a")]));
        session.dispatch(AppEvent::PanelSelected("a".into())).unwrap();
        session.dispatch(AppEvent::CloseClicked).unwrap();
        assert!(session.sidebar().visible);
    }
}
