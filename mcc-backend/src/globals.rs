//! Data section of a unit

use log::debug;
use mcc_codegen::DataItem;
use mcc_common::SymbolTable;

/// One data item per global, in symbol table order
pub fn lower_globals(symbols: &dyn SymbolTable) -> Vec<DataItem> {
    symbols
        .globals()
        .into_iter()
        .map(|symbol| {
            let item = DataItem::for_symbol(symbol);
            debug!("global '{}': {}", item.label, item.directive);
            item
        })
        .collect()
}
