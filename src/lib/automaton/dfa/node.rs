use crate::automaton::AutomatonNode;

/// A node in a DFA. It carries some data of type `T` and a flag indicating
/// whether the node is accepting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DfaNode<T: AutomatonNode> {
    pub accepting: bool,
    pub data: T,
}

impl<T: AutomatonNode> DfaNode<T> {
    pub fn new(accepting: bool, data: T) -> Self {
        DfaNode { accepting, data }
    }

    pub fn accepting(data: T) -> Self {
        DfaNode::new(true, data)
    }

    pub fn non_accepting(data: T) -> Self {
        DfaNode::new(false, data)
    }

    pub fn data(&self) -> &T {
        &self.data
    }
}

impl<T: Default + AutomatonNode> Default for DfaNode<T> {
    fn default() -> Self {
        DfaNode::new(false, T::default())
    }
}
