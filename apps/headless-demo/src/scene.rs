//! A grid of cards that repaint into cached surfaces and react to taps.

use rastra_core::{NodeId, TrackedNode};
use rastra_foundation::{GestureListener, PointerEvent, PointerEventKind};
use rastra_render_common::{SurfaceCacheManager, SurfaceKey};
use rastra_render_pixels::{PixelsBackend, Rgba};
use rastra_ui_graphics::{Dp, Point, ScaledSize};
use std::cell::Cell;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

pub const DENSITY: f32 = 2.625;
const COLUMNS: usize = 4;
const CARD_WIDTH: Dp = Dp(96.0);
const CARD_HEIGHTS: [Dp; 3] = [Dp(48.0), Dp(72.0), Dp(120.0)];
const GUTTER: f32 = 8.0;

#[derive(Clone)]
pub struct Card {
    id: NodeId,
    size: ScaledSize,
    origin: Point,
    repaints: Arc<AtomicU32>,
}

impl Card {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn repaints(&self) -> u32 {
        self.repaints.load(Ordering::Relaxed)
    }

    /// Paints this card into a surface borrowed from `surfaces`.
    pub fn paint(&self, surfaces: &SurfaceCacheManager<PixelsBackend>, tint: Rgba) {
        let Some(key) = SurfaceKey::from_scaled(&self.size) else {
            log::warn!("card {} has no finite pixel size", self.id);
            return;
        };

        match surfaces.get_surface(key.width, key.height) {
            Ok(mut surface) => {
                let inset = (key.width / 8).max(1);
                surface.fill_rect(
                    inset,
                    inset,
                    key.width.saturating_sub(2 * inset),
                    key.height.saturating_sub(2 * inset),
                    tint,
                );
                self.repaints.fetch_add(1, Ordering::Relaxed);
                surfaces.return_surface(surface);
            }
            Err(error) => log::warn!("card {} skipped caching: {error}", self.id),
        }
    }

    fn contains(&self, position: Point) -> bool {
        let width = self.size.units.width;
        let height = self.size.units.height;
        position.x >= self.origin.x
            && position.y >= self.origin.y
            && position.x < self.origin.x + width
            && position.y < self.origin.y + height
    }
}

impl TrackedNode for Card {
    fn node_id(&self) -> NodeId {
        self.id
    }
}

/// Lays out `count` cards in a fixed-width grid.
pub fn build_cards(count: usize) -> Vec<Card> {
    (0..count)
        .map(|index| {
            let height = CARD_HEIGHTS[index % CARD_HEIGHTS.len()];
            let column = (index % COLUMNS) as f32;
            let row = (index / COLUMNS) as f32;
            Card {
                id: index + 1,
                size: ScaledSize::from_dp(CARD_WIDTH, height, DENSITY),
                origin: Point::new(
                    column * (CARD_WIDTH.0 + GUTTER),
                    row * (CARD_HEIGHTS[2].0 + GUTTER),
                ),
                repaints: Arc::new(AtomicU32::new(0)),
            }
        })
        .collect()
}

/// Pointer side of a card. Cards stacked later are drawn on top.
pub struct CardListener {
    card: Card,
    z_index: i32,
    taps: Cell<u32>,
}

impl CardListener {
    pub fn new(card: Card, z_index: i32) -> Self {
        Self {
            card,
            z_index,
            taps: Cell::new(0),
        }
    }

    pub fn taps(&self) -> u32 {
        self.taps.get()
    }
}

impl GestureListener for CardListener {
    fn node_id(&self) -> NodeId {
        self.card.id
    }

    fn z_index(&self) -> i32 {
        self.z_index
    }

    fn hit_test(&self, position: Point) -> bool {
        self.card.contains(position)
    }

    fn on_pointer_event(&self, event: &PointerEvent) -> bool {
        if event.kind == PointerEventKind::Up {
            self.taps.set(self.taps.get() + 1);
        }
        true
    }
}

/// Center of `card` in logical units, for synthesizing taps.
pub fn card_center(card: &Card) -> Point {
    Point::new(
        card.origin.x + card.size.units.width / 2.0,
        card.origin.y + card.size.units.height / 2.0,
    )
}
