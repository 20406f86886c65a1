use rastra_core::NodeId;
use rastra_foundation::{GestureListener, PointerEvent, PointerEventKind};
use rastra_ui_graphics::Point;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Shared record of `(listener, event kind)` deliveries.
pub type ListenerLog = Rc<RefCell<Vec<(NodeId, PointerEventKind)>>>;

/// Listener over an axis-aligned box that records what it receives.
pub struct TestListener {
    id: NodeId,
    z_index: Cell<i32>,
    claims: Cell<bool>,
    origin: Point,
    extent: Point,
    log: ListenerLog,
}

impl TestListener {
    /// A listener covering everything.
    pub fn new(id: NodeId, z_index: i32, claims: bool, log: &ListenerLog) -> Rc<Self> {
        Self::with_bounds(
            id,
            z_index,
            claims,
            Point::new(f32::MIN / 2.0, f32::MIN / 2.0),
            Point::new(f32::MAX, f32::MAX),
            log,
        )
    }

    /// A listener accepting hits in `[origin, origin + extent)`.
    pub fn with_bounds(
        id: NodeId,
        z_index: i32,
        claims: bool,
        origin: Point,
        extent: Point,
        log: &ListenerLog,
    ) -> Rc<Self> {
        Rc::new(Self {
            id,
            z_index: Cell::new(z_index),
            claims: Cell::new(claims),
            origin,
            extent,
            log: log.clone(),
        })
    }

    pub fn set_z_index(&self, z_index: i32) {
        self.z_index.set(z_index);
    }

    pub fn set_claims(&self, claims: bool) {
        self.claims.set(claims);
    }
}

impl GestureListener for TestListener {
    fn node_id(&self) -> NodeId {
        self.id
    }

    fn z_index(&self) -> i32 {
        self.z_index.get()
    }

    fn hit_test(&self, position: Point) -> bool {
        position.x >= self.origin.x
            && position.y >= self.origin.y
            && position.x < self.origin.x + self.extent.x
            && position.y < self.origin.y + self.extent.y
    }

    fn on_pointer_event(&self, event: &PointerEvent) -> bool {
        self.log.borrow_mut().push((self.id, event.kind));
        self.claims.get()
    }
}
