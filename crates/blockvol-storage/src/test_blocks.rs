//! Block states used by unit tests.

use crate::state::BlockState;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum TestBlock {
    Air,
    Stone,
    Dirt,
    Grass,
    Numbered(u16),
}

impl BlockState for TestBlock {
    fn air() -> Self {
        TestBlock::Air
    }
}
