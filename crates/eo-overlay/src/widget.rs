//! The overlay component: render-surface construction, link wiring and the
//! `Active -> Dismissed` lifecycle.

use crate::config::OverlayConfig;
use crate::content::OverlayContent;
use crate::descriptor::ErrorDescriptor;
use crate::registry::OVERLAY_ID;
use crate::template;
use crate::template::LINK_CLASS;
use crate::template::Region;
use crate::text;
use crate::text::TextSegment;
use eo_core::OverlayError;
use eo_core::OverlayResult;
use eo_dom::ComponentHost;
use eo_dom::Document;
use eo_dom::Event;
use eo_dom::EventKind;
use eo_dom::ListenerId;
use eo_dom::NodeId;
use eo_dom::ShadowRootMode;
use eo_html::FragmentParser;
use eo_net::EditorLauncher;
use eo_net::EditorRequest;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Active,
    Dismissed,
}

impl OverlayState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Dismissed => "dismissed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DismissTrigger {
    Backdrop,
    Escape,
    Close,
}

impl DismissTrigger {
    fn as_str(self) -> &'static str {
        match self {
            Self::Backdrop => "backdrop",
            Self::Escape => "escape",
            Self::Close => "close",
        }
    }
}

#[derive(Debug)]
struct Lifecycle {
    state: OverlayState,
    element: NodeId,
    listeners: Vec<ListenerId>,
}

impl Lifecycle {
    fn new(element: NodeId) -> Self {
        Self {
            state: OverlayState::Active,
            element,
            listeners: Vec::new(),
        }
    }

    /// The only way out of `Active`. Later calls find the state already
    /// flipped and do nothing.
    fn dismiss(&mut self, document: &mut Document, trigger: DismissTrigger) -> bool {
        if self.state == OverlayState::Dismissed {
            return false;
        }
        self.state = OverlayState::Dismissed;

        let detached = document.detach(self.element);
        self.release(document);
        tracing::debug!(
            trigger = trigger.as_str(),
            detached,
            "overlay dismissed"
        );
        true
    }

    fn release(&mut self, document: &mut Document) {
        for id in self.listeners.drain(..) {
            document.remove_event_listener(id);
        }
    }
}

type SharedLifecycle = Rc<RefCell<Lifecycle>>;

#[derive(Debug)]
enum Presence {
    Visual {
        element: NodeId,
        root: NodeId,
        lifecycle: SharedLifecycle,
    },
    /// No page to draw into; only the derived text is kept.
    Inert(OverlayContent),
}

/// Everything link and dismissal handlers capture.
struct Wiring {
    base: String,
    links: bool,
    launcher: Rc<dyn EditorLauncher>,
    lifecycle: SharedLifecycle,
}

/// Full-viewport error panel. Built against a page it owns a host element
/// with an isolated render surface; the caller inserts
/// [`OverlayWidget::element`] wherever the page expects it.
#[derive(Debug)]
pub struct OverlayWidget {
    presence: Presence,
    links_enabled: bool,
}

impl OverlayWidget {
    /// Builds the widget. Host failures are logged and leave an inert widget
    /// behind; construction itself never fails.
    pub fn new(
        host: &mut dyn ComponentHost,
        descriptor: ErrorDescriptor,
        config: &OverlayConfig,
        launcher: Rc<dyn EditorLauncher>,
    ) -> Self {
        let content = OverlayContent::from_descriptor(descriptor);
        let links_enabled = config.links;

        let Some(document) = host.document() else {
            tracing::debug!("no page document available; overlay is inert");
            return Self {
                presence: Presence::Inert(content),
                links_enabled,
            };
        };

        let element = document.create_element(OVERLAY_ID);
        let lifecycle = Rc::new(RefCell::new(Lifecycle::new(element)));
        let wiring = Wiring {
            base: eo_net::normalize_base(&config.base),
            links: links_enabled,
            launcher,
            lifecycle: Rc::clone(&lifecycle),
        };

        let presence = match build_surface(document, element, &content, &wiring) {
            Ok(root) => Presence::Visual {
                element,
                root,
                lifecycle,
            },
            Err(error) => {
                tracing::warn!(%error, "failed to build overlay surface");
                lifecycle.borrow_mut().release(document);
                Presence::Inert(content)
            }
        };

        Self {
            presence,
            links_enabled,
        }
    }

    /// Host element to insert into the page. `None` when inert.
    pub fn element(&self) -> Option<NodeId> {
        match &self.presence {
            Presence::Visual { element, .. } => Some(*element),
            Presence::Inert(_) => None,
        }
    }

    /// Shadow root holding the stylesheet and panel.
    pub fn render_root(&self) -> Option<NodeId> {
        match &self.presence {
            Presence::Visual { root, .. } => Some(*root),
            Presence::Inert(_) => None,
        }
    }

    pub fn is_visual(&self) -> bool {
        matches!(self.presence, Presence::Visual { .. })
    }

    pub fn links_enabled(&self) -> bool {
        self.links_enabled
    }

    /// Region texts of an inert widget.
    pub fn inert_content(&self) -> Option<&OverlayContent> {
        match &self.presence {
            Presence::Inert(content) => Some(content),
            Presence::Visual { .. } => None,
        }
    }

    pub fn state(&self) -> OverlayState {
        match &self.presence {
            Presence::Visual { lifecycle, .. } => lifecycle.borrow().state,
            Presence::Inert(_) => OverlayState::Active,
        }
    }

    /// Dismisses the widget. Safe to call repeatedly, before mounting, or
    /// after a click or Escape already dismissed it.
    pub fn close(&self, host: &mut dyn ComponentHost) {
        let Presence::Visual { lifecycle, .. } = &self.presence else {
            return;
        };
        if let Some(document) = host.document() {
            lifecycle
                .borrow_mut()
                .dismiss(document, DismissTrigger::Close);
        }
    }

    /// Element of `region` inside the render surface.
    pub fn region(&self, document: &Document, region: Region) -> Option<NodeId> {
        document.query_selector(self.render_root()?, region.selector())
    }

    /// Displayed text of `region`.
    pub fn region_text(&self, document: &Document, region: Region) -> String {
        match &self.presence {
            Presence::Visual { .. } => self
                .region(document, region)
                .map(|id| document.text_content(id))
                .unwrap_or_default(),
            Presence::Inert(content) => content.text(region).to_owned(),
        }
    }

    /// Activatable link elements inside `region`, in display order.
    pub fn links(&self, document: &Document, region: Region) -> Vec<NodeId> {
        self.region(document, region)
            .map(|id| document.query_selector_all(id, &format!("a.{LINK_CLASS}")))
            .unwrap_or_default()
    }
}

fn build_surface(
    document: &mut Document,
    element: NodeId,
    content: &OverlayContent,
    wiring: &Wiring,
) -> OverlayResult<NodeId> {
    let root = document.attach_shadow(element, ShadowRootMode::Open)?;
    FragmentParser.parse_into(document, root, &template::markup())?;

    fill_region(document, root, Region::Plugin, content.text(Region::Plugin), false, wiring)?;
    fill_region(document, root, Region::MessageBody, &content.message, false, wiring)?;
    if let Some(file) = &content.file {
        let links = wiring.links && file.linkable;
        fill_region(document, root, Region::File, &file.text, links, wiring)?;
    }
    fill_region(document, root, Region::Frame, content.text(Region::Frame), false, wiring)?;
    fill_region(document, root, Region::Stack, content.text(Region::Stack), wiring.links, wiring)?;

    let window = find(document, root, ".window")?;
    listen(document, wiring, window, EventKind::Click, |_, event| {
        event.stop_propagation();
    })?;

    let lifecycle = Rc::clone(&wiring.lifecycle);
    listen(document, wiring, element, EventKind::Click, move |document, _| {
        lifecycle
            .borrow_mut()
            .dismiss(document, DismissTrigger::Backdrop);
    })?;

    let lifecycle = Rc::clone(&wiring.lifecycle);
    let page = document.root();
    listen(document, wiring, page, EventKind::KeyDown, move |document, event| {
        if event.is_key("Escape") {
            lifecycle
                .borrow_mut()
                .dismiss(document, DismissTrigger::Escape);
        }
    })?;

    Ok(root)
}

fn fill_region(
    document: &mut Document,
    root: NodeId,
    region: Region,
    value: &str,
    links: bool,
    wiring: &Wiring,
) -> OverlayResult<()> {
    let target = find(document, root, region.selector())?;
    document.set_text_content(target, "")?;

    for segment in text::segments(value, links) {
        match segment {
            TextSegment::Plain(span) => {
                let node = document.create_text_node(span);
                document.append_child(target, node)?;
            }
            TextSegment::File(reference) => {
                let link = document.create_element("a");
                document.set_attribute(link, "class", LINK_CLASS)?;
                let label = document.create_text_node(reference.label);
                document.append_child(link, label)?;
                document.append_child(target, link)?;

                let request = EditorRequest::new(&wiring.base, reference.path);
                let launcher = Rc::clone(&wiring.launcher);
                listen(document, wiring, link, EventKind::Click, move |_, _| {
                    launcher.launch(request.clone());
                })?;
            }
        }
    }
    Ok(())
}

fn find(document: &Document, root: NodeId, selector: &str) -> OverlayResult<NodeId> {
    document.query_selector(root, selector).ok_or_else(|| {
        OverlayError::new(
            "overlay.template.missing_region",
            format!("render surface has no `{selector}` element"),
        )
    })
}

fn listen<F>(
    document: &mut Document,
    wiring: &Wiring,
    target: NodeId,
    kind: EventKind,
    handler: F,
) -> OverlayResult<ListenerId>
where
    F: Fn(&mut Document, &mut Event) + 'static,
{
    let id = document.add_event_listener(target, kind, handler)?;
    wiring.lifecycle.borrow_mut().listeners.push(id);
    Ok(id)
}
