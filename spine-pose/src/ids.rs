use std::sync::atomic::{AtomicU32, Ordering};

// Process-global so attachments built by independent loaders never collide in deform property ids.
static NEXT_VERTEX_ATTACHMENT_ID: AtomicU32 = AtomicU32::new(0);

/// Allocates a fresh id for a vertex attachment (mesh, path, bounding box, clipping).
pub fn next_vertex_attachment_id() -> u32 {
    NEXT_VERTEX_ATTACHMENT_ID.fetch_add(1, Ordering::Relaxed)
}
