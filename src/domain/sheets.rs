pub mod header_index;
