pub mod adapter;
pub mod kv;
pub mod legacy;
pub mod schema;
