/// The item shown by an item carrier.
///
/// Two stacks are the same render state only if material, count and extra
/// data all match.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ItemStack {
    /// Registry id of the item, as the host's network protocol numbers it
    pub item_id: i32,
    pub count: u8,
    /// Opaque, already-encoded item data (NBT/components), if any
    pub data: Option<Vec<u8>>,
}

impl ItemStack {
    pub fn new(item_id: i32, count: u8) -> Self {
        Self {
            item_id,
            count,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
