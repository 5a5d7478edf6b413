mod inventory;
pub use inventory::{Inventory, InventoryItem, InventoryUpdate, InventoryView, NewItem};
