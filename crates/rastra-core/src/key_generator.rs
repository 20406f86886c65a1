use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

static COUNTER: AtomicU64 = AtomicU64::new(0);
static NEXT_THREAD_SLOT: AtomicU32 = AtomicU32::new(1);

thread_local! {
    static THREAD_SLOT: u32 = NEXT_THREAD_SLOT.fetch_add(1, Ordering::Relaxed);
}

/// Process-wide source of `u64` keys for [`KeyedActionQueue`](crate::KeyedActionQueue).
pub struct KeyGenerator;

impl KeyGenerator {
    /// Next key from the shared counter. Never returns 0.
    pub fn next() -> u64 {
        COUNTER.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Key whose high 32 bits identify the calling thread and whose low
    /// 32 bits come from the shared counter.
    pub fn next_thread_distributed() -> u64 {
        let slot = THREAD_SLOT.with(|slot| *slot);
        let counter = Self::next() as u32;
        ((slot as u64) << 32) | counter as u64
    }

    /// Packs the low byte of each of the first eight characters of
    /// `semantic` into a key, first character in the lowest byte.
    pub fn encode_semantic(semantic: &str) -> u64 {
        semantic
            .chars()
            .take(8)
            .enumerate()
            .fold(0u64, |key, (index, ch)| {
                key | (((ch as u32) & 0xFF) as u64) << (index * 8)
            })
    }
}
