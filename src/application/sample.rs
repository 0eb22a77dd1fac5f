//! Reference assembly used by the `demo` command and in tests.

use generational_arena::Index;
use tracing::{info, instrument};

use crate::application::render::Named;
use crate::domain::{ItemHandle, ItemId, TreeArena, TreeResult};

/// Plain named part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleItem {
    name: String,
}

impl SampleItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Named for SampleItem {
    fn name(&self) -> String {
        self.name.clone()
    }
}

/// Handles into the sample assembly.
#[derive(Debug, Clone, Copy)]
pub struct SampleAssembly {
    pub root: Index,
    pub assembly_1: Index,
    pub detail_a: Index,
    pub det_a_1: Index,
    pub empty: Index,
    pub assembly_2: Index,
    pub assembly_3: Index,
    /// Identity of the part shared by `Assembly_2` and `Assembly_3`
    pub multi_detail: ItemId,
}

/// Builds the sample structure:
///
/// ```text
/// Root assembly
/// ├── Assembly_1
/// │   ├── Detail_A
/// │   │   ├── Det_A.1
/// │   │   └── Det_A.2
/// │   ├── Detail_B
/// │   │   └── det_B.1
/// │   └── <empty>
/// ├── Assembly_2
/// │   └── MultiDetail_1
/// └── Assembly_3
///     ├── det_X.3
///     └── MultiDetail_1
/// ```
///
/// `Assembly_1` is built as a standalone tree and then moved under the root,
/// so its levels are recomputed on the way.
#[instrument(level = "debug", skip(tree))]
pub fn build_sample_assembly(tree: &mut TreeArena<SampleItem>) -> TreeResult<SampleAssembly> {
    let item = |name: &str| ItemHandle::new(SampleItem::new(name));
    let multi_item = item("MultiDetail_1");
    let multi_detail = multi_item.id();

    let root = tree.create_with_item(item("Root assembly"));

    let assembly_1 = tree.create_with_item(item("Assembly_1"));
    let detail_a = tree.append_new_child(assembly_1, item("Detail_A"))?;
    let detail_b = tree.append_new_child(assembly_1, item("Detail_B"))?;
    tree.append_new_child(detail_b, item("det_B.1"))?;
    let empty = tree.create_empty();
    tree.append_existing_child(assembly_1, empty)?;
    let det_a_1 = tree.append_new_child(detail_a, item("Det_A.1"))?;
    tree.append_new_child(detail_a, item("Det_A.2"))?;
    tree.append_existing_child(root, assembly_1)?;

    let assembly_2 = tree.create_with_item(item("Assembly_2"));
    tree.append_existing_child(root, assembly_2)?;
    let assembly_3 = tree.create_with_item(item("Assembly_3"));
    tree.append_existing_child(root, assembly_3)?;
    tree.append_new_child(assembly_3, item("det_X.3"))?;

    tree.append_new_child(assembly_2, multi_item.clone())?;
    tree.append_new_child(assembly_3, multi_item)?;

    info!(nodes = tree.len(), "sample assembly built");
    Ok(SampleAssembly {
        root,
        assembly_1,
        detail_a,
        det_a_1,
        empty,
        assembly_2,
        assembly_3,
        multi_detail,
    })
}
