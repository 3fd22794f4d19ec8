//! Accumulation and lookup of JPEG-LS mapping tables (LSE types 2 and 3).
//!
//! A mapping table is introduced by an LSE(2) "mapping table specification"
//! segment and may be extended by zero or more LSE(3) "mapping table
//! continuation" segments before it is referenced by a scan. This module
//! only accumulates bytes; interpreting `entry_size`-wide entries is left to
//! the caller (ISO/IEC 14495-1 C.2.4.1.2, Table C.4).

use crate::constants::{
    MAXIMUM_MAPPING_ENTRY_SIZE, MAXIMUM_MAPPING_TABLE_ID, MINIMUM_MAPPING_ENTRY_SIZE,
    MINIMUM_MAPPING_TABLE_ID,
};
use crate::error::JpeglsError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingTable {
    pub table_id: u8,
    pub entry_size: u8,
    pub data: Vec<u8>,
}

impl MappingTable {
    pub fn entry_count(&self) -> usize {
        if self.entry_size == 0 {
            0
        } else {
            self.data.len() / self.entry_size as usize
        }
    }

    pub fn entry(&self, index: usize) -> Option<&[u8]> {
        let size = self.entry_size as usize;
        let start = index.checked_mul(size)?;
        let end = start.checked_add(size)?;
        self.data.get(start..end)
    }
}

/// Accumulates mapping table spec/continuation segments until they are
/// consumed by a scan.
#[derive(Debug, Clone, Default)]
pub struct MappingTableStore {
    tables: Vec<MappingTable>,
}

impl MappingTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, table_id: u8) -> Option<&MappingTable> {
        self.tables.iter().find(|t| t.table_id == table_id)
    }

    /// Handles an LSE(2) mapping table specification segment.
    pub fn add_table_spec(
        &mut self,
        table_id: u8,
        entry_size: u8,
        data: Vec<u8>,
    ) -> Result<(), JpeglsError> {
        if !(MINIMUM_MAPPING_TABLE_ID as u8..=MAXIMUM_MAPPING_TABLE_ID as u8).contains(&table_id) {
            return Err(JpeglsError::InvalidParameterMappingTableId);
        }
        if !(MINIMUM_MAPPING_ENTRY_SIZE as u8..=MAXIMUM_MAPPING_ENTRY_SIZE as u8)
            .contains(&entry_size)
        {
            return Err(JpeglsError::InvalidJpeglsPresetParameterType);
        }

        self.tables.retain(|t| t.table_id != table_id);
        self.tables.push(MappingTable {
            table_id,
            entry_size,
            data,
        });
        Ok(())
    }

    /// Handles an LSE(3) mapping table continuation segment: appends `data`
    /// to the table previously started by an LSE(2) segment.
    pub fn add_continuation(&mut self, table_id: u8, data: &[u8]) -> Result<(), JpeglsError> {
        let table = self
            .tables
            .iter_mut()
            .find(|t| t.table_id == table_id)
            .ok_or(JpeglsError::InvalidParameterMappingTableContinuation)?;
        table.data.extend_from_slice(data);
        Ok(())
    }

    pub fn tables(&self) -> &[MappingTable] {
        &self.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annex_h4_palette_round_trip() {
        let mut store = MappingTableStore::new();
        let palette: Vec<u8> = vec![
            0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x00, 0xFF,
        ];
        store.add_table_spec(5, 3, palette.clone()).unwrap();

        let table = store.get(5).unwrap();
        assert_eq!(table.entry_count(), 4);
        assert_eq!(table.entry(0).unwrap(), &[0xFF, 0xFF, 0xFF]);
        assert_eq!(table.entry(3).unwrap(), &[0x00, 0x00, 0xFF]);
    }

    #[test]
    fn continuation_extends_existing_table() {
        let mut store = MappingTableStore::new();
        store.add_table_spec(1, 1, vec![1, 2, 3]).unwrap();
        store.add_continuation(1, &[4, 5]).unwrap();
        assert_eq!(store.get(1).unwrap().data, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn continuation_without_spec_is_an_error() {
        let mut store = MappingTableStore::new();
        assert!(store.add_continuation(9, &[1]).is_err());
    }
}
