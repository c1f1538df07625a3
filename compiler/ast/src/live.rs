use std::cell::Cell;

thread_local! {
    static LIVE_NODES: Cell<usize> = const { Cell::new(0) };
}

/// Number of tree nodes currently alive on this thread
pub fn live_nodes() -> usize {
    LIVE_NODES.with(Cell::get)
}

/// Carried by every node; bumps the per-thread count on creation, drops it on release
#[derive(Debug)]
pub(crate) struct LiveNode(());

impl LiveNode {
    pub(crate) fn new() -> Self {
        LIVE_NODES.with(|count| count.set(count.get() + 1));
        LiveNode(())
    }
}

impl Clone for LiveNode {
    fn clone(&self) -> Self {
        LiveNode::new()
    }
}

impl Drop for LiveNode {
    fn drop(&mut self) {
        LIVE_NODES.with(|count| count.set(count.get() - 1));
    }
}

impl PartialEq for LiveNode {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl Eq for LiveNode {}
