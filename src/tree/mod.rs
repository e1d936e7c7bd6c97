mod merge;

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

/// A node of the shared opening tree.
///
/// `openings` counts provenance, not identity: one entry is appended per game
/// passing through, so the same name can appear more than once.
#[derive(Debug, Clone)]
pub struct MoveNode {
    /// Short algebraic move text. Empty only on the root sentinel.
    pub san: String,
    /// Origin and destination squares, resolved when the node was created.
    /// Empty on the root.
    pub from: String,
    pub to: String,
    /// Commentary from every game that annotated this move, in arrival order.
    pub comment: Option<String>,
    /// Names of the openings whose games pass through this node.
    pub openings: Vec<String>,
    /// Parent node index (NONE for root). Never owning; only walked for
    /// ancestry checks.
    pub parent: NodeId,
    /// Children in first-seen order, unique by `san` among siblings.
    pub children: Vec<NodeId>,
}

/// The merged opening tree: a prefix tree over move sequences, arena-owned.
///
/// Two games sharing a move prefix share the nodes of that prefix; divergence
/// creates a new child only at the first differing move.
#[derive(Debug)]
pub struct OpeningTree {
    nodes: Vec<MoveNode>,
}

impl OpeningTree {
    pub fn new() -> OpeningTree {
        OpeningTree {
            nodes: vec![MoveNode {
                san: String::new(),
                from: String::new(),
                to: String::new(),
                comment: None,
                openings: Vec::new(),
                parent: NodeId::NONE,
                children: Vec::new(),
            }],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &MoveNode {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MoveNode {
        &mut self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // The root sentinel is always present
        self.nodes.len() <= 1
    }

    /// Allocates a new child of `parent` and links it in place.
    pub fn allocate(&mut self, parent: NodeId, san: String, from: String, to: String) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(MoveNode {
            san,
            from,
            to,
            comment: None,
            openings: Vec::new(),
            parent,
            children: Vec::new(),
        });
        self.get_mut(parent).children.push(id);
        id
    }

    /// Sibling lookup by exact notation string. Two notations resolving to
    /// the same squares stay distinct nodes on purpose.
    pub fn find_child(&self, parent: NodeId, san: &str) -> Option<NodeId> {
        self.get(parent)
            .children
            .iter()
            .copied()
            .find(|&child| self.get(child).san == san)
    }

    /// Appends commentary to a node, concatenating rather than overwriting.
    pub fn append_comment(&mut self, id: NodeId, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let node = self.get_mut(id);
        match &mut node.comment {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(text);
            }
            None => node.comment = Some(text.to_string()),
        }
    }

    /// Node ids from the root (exclusive) down to `id` (inclusive).
    pub fn path_from_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cursor = id;
        while cursor != self.root() {
            path.push(cursor);
            cursor = self.get(cursor).parent;
        }
        path.reverse();
        path
    }

    /// Whether `ancestor` lies on the path from the root to `id` (a node is
    /// not its own ancestor).
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cursor = self.get(id).parent;
        while !cursor.is_none() {
            if cursor == ancestor {
                return true;
            }
            cursor = self.get(cursor).parent;
        }
        false
    }
}

impl Default for OpeningTree {
    fn default() -> Self {
        Self::new()
    }
}
