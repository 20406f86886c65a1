//! Runs the Rastra frame host against a software backend without a window.
//!
//! `RASTRA_FRAMES` sets how many frames to simulate and `RASTRA_CARDS` how
//! many cards the scene holds.

mod scene;

use anyhow::{ensure, Context};
use rastra_app_shell::{FrameHost, HostSettings, PointerRouter};
use rastra_foundation::{PointerButton, PointerButtons, PointerEvent, PointerEventKind};
use rastra_render_common::{DisposalConfig, SurfaceCacheConfig};
use rastra_render_pixels::PixelsBackend;
use scene::{build_cards, card_center, Card, CardListener};
use std::rc::Rc;

const DEFAULT_FRAMES: u64 = 120;
const DEFAULT_CARDS: usize = 12;
const SURFACE_BUDGET_BYTES: usize = 4 * 1024 * 1024;

fn env_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{name} must be a number, got {value:?}")),
        Err(_) => Ok(default),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let frames: u64 = env_or("RASTRA_FRAMES", DEFAULT_FRAMES)?;
    let card_count: usize = env_or("RASTRA_CARDS", DEFAULT_CARDS)?;
    ensure!(card_count > 0, "RASTRA_CARDS must be at least 1");

    let settings = HostSettings::default()
        .with_cache(SurfaceCacheConfig::default().with_min_requests_for_pooling(2))
        .with_disposal(DisposalConfig::default());
    let backend = PixelsBackend::new().with_max_surface_bytes(SURFACE_BUDGET_BYTES);
    let mut host: FrameHost<PixelsBackend, Card> = FrameHost::new(backend, settings);

    let cards = build_cards(card_count);
    let mut router = PointerRouter::new();
    let mut listeners = Vec::with_capacity(cards.len());
    for (z, card) in cards.iter().enumerate() {
        host.attach(card.clone());
        let listener = Rc::new(CardListener::new(card.clone(), z as i32));
        router.register(listener.clone());
        listeners.push(listener);
    }
    log::info!("simulating {frames} frames over {card_count} cards");

    let primary = PointerButtons::NONE.with(PointerButton::Primary);
    for frame in 0..frames {
        // Every third card animates on a staggered cadence; the first one
        // requests twice per frame to exercise coalescing.
        for (index, card) in cards.iter().enumerate().step_by(3) {
            if (frame as usize + index) % 2 != 0 {
                continue;
            }
            let requests = if index == 0 { 2 } else { 1 };
            for _ in 0..requests {
                let surfaces = host.surfaces().clone();
                let painted = card.clone();
                let tint = 0xFF00_0000 | ((frame as u32).wrapping_mul(2_654_435_761) >> 8);
                host.request_repaint(card.id(), move || painted.paint(&surfaces, tint));
            }
        }

        if frame % 10 == 0 {
            let target = &cards[(frame / 10) as usize % cards.len()];
            let position = card_center(target);
            for kind in [PointerEventKind::Down, PointerEventKind::Up] {
                let event = PointerEvent::new(kind, position).with_buttons(primary);
                let outcome = router.route(&event);
                log::debug!(
                    "{kind:?} at {position:?} claimed by {:?} after visiting {:?}",
                    outcome.consumed_by,
                    outcome.visited
                );
            }
        }

        let stats = host.process_frame();
        if stats.frame % 30 == 0 || stats.frame == frames {
            log::info!(
                "frame {}: ran {} repaints, released {} surfaces, {} pending, {} nodes",
                stats.frame,
                stats.actions_run,
                stats.surfaces_released,
                stats.surfaces_pending,
                stats.attached_nodes
            );
        }
    }

    let taps: u32 = listeners.iter().map(|listener| listener.taps()).sum();
    let repaints: u32 = cards.iter().map(|card| card.repaints()).sum();
    let backend = host.surfaces().backend();
    log::info!(
        "{repaints} repaints and {taps} taps used {} surface allocations ({} bytes total)",
        backend.allocated(),
        backend.allocated_bytes()
    );

    host.shutdown();
    Ok(())
}
