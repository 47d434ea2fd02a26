pub mod effects_root;
