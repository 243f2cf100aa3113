//! Interned search states addressed by index

use crate::transport::State;
use std::collections::HashMap;

pub type NodeId = usize;

/// Each distinct state is stored once; the search refers to it by `NodeId`
#[derive(Debug, Default)]
pub struct StateArena {
    nodes: Vec<State>,
    index: HashMap<State, NodeId>,
    on_path: Vec<bool>,
}

impl StateArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, state: State) -> NodeId {
        if let Some(&id) = self.index.get(&state) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(state.clone());
        self.on_path.push(false);
        self.index.insert(state, id);
        id
    }

    pub fn get(&self, id: NodeId) -> &State {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the node is on the path currently being explored
    pub fn on_path(&self, id: NodeId) -> bool {
        self.on_path[id]
    }

    pub fn set_on_path(&mut self, id: NodeId, value: bool) {
        self.on_path[id] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Side;

    #[test]
    fn test_intern_deduplicates() {
        let mut arena = StateArena::new();
        let a = arena.intern(State { counts: vec![1, 2], side: Side::Start });
        let b = arena.intern(State { counts: vec![1, 2], side: Side::Target });
        let c = arena.intern(State { counts: vec![1, 2], side: Side::Start });

        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(b).side, Side::Target);
    }

    #[test]
    fn test_path_marks() {
        let mut arena = StateArena::new();
        let a = arena.intern(State::initial(&[1]));
        assert!(!arena.on_path(a));
        arena.set_on_path(a, true);
        assert!(arena.on_path(a));
    }
}
