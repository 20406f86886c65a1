use rastra_core::{NodeId, TrackedNode};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestNode {
    pub id: NodeId,
    pub name: String,
}

impl TestNode {
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl TrackedNode for TestNode {
    fn node_id(&self) -> NodeId {
        self.id
    }
}
