pub mod portmap;
