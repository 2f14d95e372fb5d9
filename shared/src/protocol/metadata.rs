use holosync_serde::{ByteReader, ByteWrite, Serde, SerdeErr, VarInt};

use crate::{entity::CarrierKind, item::ItemStack, text::TextComponent};

use super::revision::{MetadataLayout, SerializerIds};

/// Marks the end of a metadata entry list
pub const METADATA_END: u8 = 0xFF;

const FLAG_INVISIBLE: u8 = 0x20;
// small | no base plate | marker
const TEXT_CARRIER_FLAGS: u8 = 0x01 | 0x08 | 0x10;

#[derive(Clone, Debug, PartialEq)]
pub enum MetadataValue {
    Byte(u8),
    VarInt(i32),
    Float(f32),
    String(String),
    /// Chat component JSON, if present
    OptionalChat(Option<String>),
    ItemSlot(Option<ItemStack>),
    Boolean(bool),
}

impl MetadataValue {
    fn serializer_id(&self, ids: &SerializerIds) -> i32 {
        match self {
            MetadataValue::Byte(_) => ids.byte,
            MetadataValue::VarInt(_) => ids.var_int,
            MetadataValue::Float(_) => ids.float,
            MetadataValue::String(_) => ids.string,
            MetadataValue::OptionalChat(_) => ids.optional_chat,
            MetadataValue::ItemSlot(_) => ids.item_slot,
            MetadataValue::Boolean(_) => ids.boolean,
        }
    }

    fn write_value(&self, writer: &mut dyn ByteWrite) -> Result<(), SerdeErr> {
        match self {
            MetadataValue::Byte(value) => value.ser(writer),
            MetadataValue::VarInt(value) => VarInt(*value).ser(writer),
            MetadataValue::Float(value) => value.ser(writer),
            MetadataValue::String(value) => value.ser(writer),
            MetadataValue::OptionalChat(value) => value.ser(writer),
            MetadataValue::ItemSlot(value) => write_slot(value.as_ref(), writer),
            MetadataValue::Boolean(value) => value.ser(writer),
        }
    }

    fn read_value(
        serializer: i32,
        ids: &SerializerIds,
        reader: &mut ByteReader,
    ) -> Result<Self, SerdeErr> {
        let value = if serializer == ids.byte {
            MetadataValue::Byte(u8::de(reader)?)
        } else if serializer == ids.var_int {
            MetadataValue::VarInt(VarInt::de(reader)?.get())
        } else if serializer == ids.float {
            MetadataValue::Float(f32::de(reader)?)
        } else if serializer == ids.string {
            MetadataValue::String(String::de(reader)?)
        } else if serializer == ids.optional_chat {
            MetadataValue::OptionalChat(Option::<String>::de(reader)?)
        } else if serializer == ids.item_slot {
            MetadataValue::ItemSlot(read_slot(reader)?)
        } else if serializer == ids.boolean {
            MetadataValue::Boolean(bool::de(reader)?)
        } else {
            return Err(SerdeErr::UnknownSerializer { id: serializer });
        };
        Ok(value)
    }
}

// present flag, item id, count, then item data (a lone TAG_End when empty)
fn write_slot(item: Option<&ItemStack>, writer: &mut dyn ByteWrite) -> Result<(), SerdeErr> {
    let Some(item) = item.filter(|item| !item.is_empty()) else {
        return false.ser(writer);
    };
    true.ser(writer)?;
    VarInt(item.item_id).ser(writer)?;
    item.count.ser(writer)?;
    match &item.data {
        Some(data) => writer.write_bytes(data),
        None => writer.write_byte(0),
    }
    Ok(())
}

fn read_slot(reader: &mut ByteReader) -> Result<Option<ItemStack>, SerdeErr> {
    if !bool::de(reader)? {
        return Ok(None);
    }
    let item_id = VarInt::de(reader)?.get();
    let count = u8::de(reader)?;
    // item data is opaque to holosync, so only empty data can be read back
    if u8::de(reader)? != 0 {
        return Err(SerdeErr::Unsupported {
            what: "item slot data",
        });
    }
    Ok(Some(ItemStack::new(item_id, count)))
}

#[derive(Clone, Debug, PartialEq)]
pub struct MetadataEntry {
    pub index: u8,
    pub value: MetadataValue,
}

impl MetadataEntry {
    pub fn new(index: u8, value: MetadataValue) -> Self {
        Self { index, value }
    }

    pub fn write(&self, ids: &SerializerIds, writer: &mut dyn ByteWrite) -> Result<(), SerdeErr> {
        self.index.ser(writer)?;
        VarInt(self.value.serializer_id(ids)).ser(writer)?;
        self.value.write_value(writer)
    }

    /// Reads one entry; `None` at the list terminator
    pub fn read(ids: &SerializerIds, reader: &mut ByteReader) -> Result<Option<Self>, SerdeErr> {
        let index = u8::de(reader)?;
        if index == METADATA_END {
            return Ok(None);
        }
        let serializer = VarInt::de(reader)?.get();
        let value = MetadataValue::read_value(serializer, ids, reader)?;
        Ok(Some(Self { index, value }))
    }
}

impl MetadataLayout {
    /// The full entry list describing a carrier's visible state
    pub fn carrier_entries(
        &self,
        kind: CarrierKind,
        invisible: bool,
        name: Option<&TextComponent>,
        item: Option<&ItemStack>,
    ) -> Result<Vec<MetadataEntry>, SerdeErr> {
        let flags = if invisible { FLAG_INVISIBLE } else { 0 };
        let mut entries = vec![
            MetadataEntry::new(self.flags_index, MetadataValue::Byte(flags)),
            self.custom_name_entry(name)?,
            MetadataEntry::new(
                self.custom_name_visible_index,
                MetadataValue::Boolean(name.is_some()),
            ),
            MetadataEntry::new(self.silent_index, MetadataValue::Boolean(true)),
            MetadataEntry::new(self.no_gravity_index, MetadataValue::Boolean(true)),
        ];
        match kind {
            CarrierKind::Text => {
                if let Some(index) = self.text_carrier_flags_index {
                    entries.push(MetadataEntry::new(
                        index,
                        MetadataValue::Byte(TEXT_CARRIER_FLAGS),
                    ));
                }
            }
            CarrierKind::Item => entries.push(self.item_entry(item)),
            CarrierKind::Mount => {}
        }
        Ok(entries)
    }

    /// Just the entries that change when a name changes
    pub fn name_entries(&self, name: Option<&TextComponent>) -> Result<Vec<MetadataEntry>, SerdeErr> {
        Ok(vec![
            self.custom_name_entry(name)?,
            MetadataEntry::new(
                self.custom_name_visible_index,
                MetadataValue::Boolean(name.is_some()),
            ),
        ])
    }

    pub fn item_entry(&self, item: Option<&ItemStack>) -> MetadataEntry {
        MetadataEntry::new(self.item_index, MetadataValue::ItemSlot(item.cloned()))
    }

    fn custom_name_entry(&self, name: Option<&TextComponent>) -> Result<MetadataEntry, SerdeErr> {
        let value = if self.custom_name_is_chat {
            let json = match name {
                Some(name) => Some(name.to_json().map_err(|_| SerdeErr::Unsupported {
                    what: "chat component",
                })?),
                None => None,
            };
            MetadataValue::OptionalChat(json)
        } else {
            MetadataValue::String(name.map(legacy_name).unwrap_or_default())
        };
        Ok(MetadataEntry::new(self.custom_name_index, value))
    }
}

fn legacy_name(name: &TextComponent) -> String {
    let mut legacy = String::new();
    append_legacy(name, &mut legacy);
    legacy
}

fn append_legacy(component: &TextComponent, out: &mut String) {
    if let Some(color) = component.style().color {
        out.push_str(&color.to_legacy());
    }
    out.push_str(component.text());
    for sibling in component.siblings() {
        append_legacy(sibling, out);
    }
}
